use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::info;
use serde::{ Serialize, Deserialize };

use crate::camera::Camera;
use crate::color::Color;
use crate::config::RenderConfig;
use crate::consts::{ CANVAS_WIDTH, CANVAS_HEIGHT, DEFAULT_AMBIENT,
    DEFAULT_DIFFUSE, DEFAULT_SPECULAR, DEFAULT_SHININESS };
use crate::context::RenderContext;
use crate::error::{ SceneError, TraceError };
use crate::geometry::Primitive;
use crate::light::{ Material, PointLight };
use crate::pattern::{ MaterialColor, checker };
use crate::vector::Vector3;
use crate::world::Scene;

/// A scene description, as read from JSON.
///
/// Fields are public so callers can override parts of a loaded description
/// (the output size, say) before building a `RenderContext` from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneJson {
    pub camera: CameraJson,

    #[serde(default)]
    pub lights: Vec<LightJson>,

    #[serde(default)]
    pub primitives: Vec<PrimitiveJson>,

    #[serde(default)]
    pub settings: RenderConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraJson {
    pub position: Vector3,
    pub look: Vector3,
    pub field_of_view: f64,
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightJson {
    pub position: Vector3,
    pub color: Color,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrimitiveJson {
    Sphere {
        center: Vector3,
        radius: f64,
        #[serde(default)]
        material: MaterialJson,
    },
    Plane {
        point: Vector3,
        normal: Vector3,
        #[serde(default)]
        material: MaterialJson,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialJson {
    pub color: ColorJson,
    pub specular_color: ColorJson,
    pub emissive: Color,
    pub reflection: f64,
    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,
}

impl Default for MaterialJson {
    fn default() -> MaterialJson {
        MaterialJson {
            color: ColorJson::Constant(Color::white()),
            specular_color: ColorJson::Constant(Color::white()),
            emissive: Color::black(),
            reflection: 0.0,
            ambient: DEFAULT_AMBIENT,
            diffuse: DEFAULT_DIFFUSE,
            specular: DEFAULT_SPECULAR,
            shininess: DEFAULT_SHININESS,
        }
    }
}

/// A material color: an RGB triple or `{ "checker": { .. } }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorJson {
    Constant(Color),
    Checker { checker: CheckerJson },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckerJson {
    pub even: Color,
    pub odd: Color,
    #[serde(default = "default_checker_scale")]
    pub scale: f64,
}

fn default_checker_scale() -> f64 {
    2.0
}

impl From<ColorJson> for MaterialColor {
    fn from(color_json: ColorJson) -> MaterialColor {
        match color_json {
            ColorJson::Constant(c) => MaterialColor::Constant(c),
            ColorJson::Checker { checker: c } => checker(c.even, c.odd, c.scale),
        }
    }
}

impl From<MaterialJson> for Material {
    fn from(m: MaterialJson) -> Material {
        Material {
            diffuse_color: m.color.into(),
            specular_color: m.specular_color.into(),
            emissive: m.emissive,
            reflection: m.reflection,
            ambient: m.ambient,
            diffuse: m.diffuse,
            specular: m.specular,
            shininess: m.shininess,
        }
    }
}

impl TryFrom<PrimitiveJson> for Primitive {
    type Error = TraceError;

    fn try_from(primitive_json: PrimitiveJson) -> Result<Primitive, TraceError> {
        match primitive_json {
            PrimitiveJson::Sphere { center, radius, material } =>
                Primitive::sphere(center, radius, material.into()),
            PrimitiveJson::Plane { point, normal, material } =>
                Primitive::plane(point, normal, material.into()),
        }
    }
}

impl TryFrom<SceneJson> for RenderContext {
    type Error = SceneError;

    fn try_from(scene_json: SceneJson) -> Result<RenderContext, SceneError> {
        let c = scene_json.camera;
        let camera = Camera::new(c.position, c.look, c.field_of_view,
            c.width, c.height)?;

        let mut scene = Scene::empty();
        for light in scene_json.lights {
            scene.add_light(PointLight::new(light.position, light.color));
        }

        for primitive in scene_json.primitives {
            scene.add(Primitive::try_from(primitive)?);
        }

        info!("scene has {} primitives and {} lights",
            scene.primitives.len(), scene.lights.len());

        Ok(RenderContext::new(scene, camera, scene_json.settings))
    }
}

/// Parses a scene description from a JSON string.
pub fn from_json_str(json: &str) -> Result<SceneJson, SceneError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a scene description from a JSON file.
pub fn load(path: &Path) -> Result<SceneJson, SceneError> {
    info!("loading scene from {}", path.display());
    from_json_str(&fs::read_to_string(path)?)
}

fn sphere(center: [f64; 3], radius: f64, color: [f64; 3], specular: [f64; 3],
    reflection: f64) -> PrimitiveJson {
    PrimitiveJson::Sphere {
        center: center.into(),
        radius,
        material: MaterialJson {
            color: ColorJson::Constant(color.into()),
            specular_color: ColorJson::Constant(specular.into()),
            reflection,
            ..Default::default()
        },
    }
}

/// The built-in demo scene.
///
/// Red, purple and blue balls and a glowing yellow one sit on a black and
/// white checkerboard, lit by a white light behind and to the left of the
/// viewer.
pub fn demo() -> SceneJson {
    let glow = PrimitiveJson::Sphere {
        center: Vector3::new(2.8, 0.8, 2.0),
        radius: 0.8,
        material: MaterialJson {
            specular_color: ColorJson::Constant(Color::black()),
            emissive: Color::rgb(1.0, 1.0, 0.2),
            ..Default::default()
        },
    };

    let ground = PrimitiveJson::Plane {
        point: Vector3::zero(),
        normal: Vector3::new(0.0, 1.0, 0.0),
        material: MaterialJson {
            color: ColorJson::Checker {
                checker: CheckerJson {
                    even: Color::white(),
                    odd: Color::black(),
                    scale: default_checker_scale(),
                },
            },
            diffuse: 0.75,
            specular: 0.5,
            reflection: 0.25,
            ..Default::default()
        },
    };

    SceneJson {
        camera: CameraJson {
            position: Vector3::new(0.0, 6.0, 8.0),
            look: Vector3::new(0.0, -0.8, -1.0),
            field_of_view: 60.0,
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        },
        lights: vec![LightJson {
            position: Vector3::new(-10.8, 6.4, 10.0),
            color: Color::white(),
        }],
        primitives: vec![
            sphere([0.0, 2.0, 0.0], 2.0, [0.7, 0.1, 0.1], [0.9, 0.1, 0.1], 0.5),
            sphere([-2.5, 1.0, 2.0], 1.0, [0.7, 0.0, 0.7], [0.9, 0.9, 0.8], 0.5),
            sphere([0.0, 0.5, 3.0], 0.5, [0.0, 0.3, 1.0], [0.0, 0.0, 1.0], 0.0),
            glow,
            ground,
        ],
        settings: Default::default(),
    }
}

#[test]
fn parse_scene_description() {
    let json = r#"{
        "camera": {
            "position": [0, 1, 5], "look": [0, 0, -1],
            "field_of_view": 45, "width": 32, "height": 24
        },
        "lights": [ { "position": [-5, 5, 5], "color": [1, 1, 1] } ],
        "primitives": [
            { "type": "sphere", "center": [0, 1, 0], "radius": 1,
              "material": { "color": [1, 0, 0], "reflection": 0.3 } },
            { "type": "plane", "point": [0, 0, 0], "normal": [0, 2, 0],
              "material": { "color": { "checker": { "even": [1, 1, 1],
                                                     "odd": [0, 0, 0] } } } }
        ],
        "settings": { "max_depth": 4, "emissive_lights": true }
    }"#;

    let ctx = RenderContext::try_from(from_json_str(json).unwrap()).unwrap();

    assert_eq!(ctx.camera.hsize, 32);
    assert_eq!(ctx.camera.vsize, 24);
    assert_eq!(ctx.config.max_depth, 4);
    assert!(ctx.config.emissive_lights);
    assert_eq!(ctx.scene.lights.len(), 1);
    assert_eq!(ctx.scene.primitives.len(), 2);

    let ball = &ctx.scene.primitives[0].material;
    assert_eq!(ball.reflection, 0.3);
    assert_eq!(ball.ambient, DEFAULT_AMBIENT);
    assert_eq!(ball.diffuse_color.color_at(Vector3::zero()), Color::red());

    let ground = &ctx.scene.primitives[1];
    assert_eq!(ground.kind, crate::geometry::PrimitiveKind::Plane {
        normal: Vector3::new(0.0, 1.0, 0.0)
    });
    assert_eq!(ground.material.diffuse_color
        .color_at(Vector3::new(0.25, 0.0, 0.75)), Color::black());
}

#[test]
fn invalid_radius_is_rejected() {
    let json = r#"{
        "camera": { "position": [0, 0, 0], "look": [0, 0, -1],
                    "field_of_view": 60, "width": 4, "height": 4 },
        "primitives": [ { "type": "sphere", "center": [0, 0, -5], "radius": -1 } ]
    }"#;

    let err = RenderContext::try_from(from_json_str(json).unwrap()).unwrap_err();
    assert!(matches!(err,
        SceneError::Invalid(TraceError::InvalidPrimitive(_))));
}

#[test]
fn unknown_primitive_type_fails_to_parse() {
    let json = r#"{
        "camera": { "position": [0, 0, 0], "look": [0, 0, -1],
                    "field_of_view": 60, "width": 4, "height": 4 },
        "primitives": [ { "type": "torus" } ]
    }"#;

    assert!(matches!(from_json_str(json), Err(SceneError::Json(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    assert!(matches!(load(&path), Err(SceneError::Io(_))));
}

#[test]
fn demo_scene_builds() {
    let ctx = RenderContext::try_from(demo()).unwrap();

    assert_eq!(ctx.scene.primitives.len(), 5);
    assert_eq!(ctx.lights().len(), 1);
    assert_eq!(ctx.config.max_depth, 3);
}

#[test]
fn demo_scene_round_trips_through_json() {
    let json = serde_json::to_string(&demo()).unwrap();
    let ctx = RenderContext::try_from(from_json_str(&json).unwrap()).unwrap();

    assert_eq!(ctx.scene.primitives.len(), 5);
    assert_eq!(ctx.camera.field_of_view, 60.0);
}
