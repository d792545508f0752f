use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::consts::REFLECTION_RECURSION_DEPTH;

/// Parameters controlling how a frame is traced.
///
/// Every field has a default, so a scene file may give only the ones it
/// cares about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum number of rays traced per primary ray, counting the primary
    /// ray itself. A reflective hit at depth `max_depth - 1` is shaded
    /// locally only.
    pub max_depth: usize,

    /// Color returned for rays which hit nothing.
    pub background: Color,

    /// Whether spheres with an emissive color also light the scene.
    pub emissive_lights: bool,

    /// Number of worker threads for parallel rendering; 0 picks one per
    /// core.
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            max_depth: REFLECTION_RECURSION_DEPTH,
            background: Color::black(),
            emissive_lights: false,
            threads: 0,
        }
    }
}

#[test]
fn partial_config_fills_defaults() {
    let cfg: RenderConfig = serde_json::from_str(r#"{ "max_depth": 5 }"#)
        .unwrap();

    assert_eq!(cfg.max_depth, 5);
    assert_eq!(cfg.background, Color::black());
    assert!(!cfg.emissive_lights);
}

#[test]
fn background_reads_as_rgb_triple() {
    let cfg: RenderConfig =
        serde_json::from_str(r#"{ "background": [0.1, 0.2, 0.3] }"#).unwrap();

    assert_eq!(cfg.background, Color::rgb(0.1, 0.2, 0.3));
    assert_eq!(cfg.max_depth, 3);
}
