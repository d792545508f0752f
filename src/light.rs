use crate::color::Color;
use crate::consts::{ DEFAULT_AMBIENT, DEFAULT_DIFFUSE, DEFAULT_SPECULAR,
    DEFAULT_SHININESS };
use crate::pattern::MaterialColor;
use crate::vector::Vector3;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from. Lights derived from emissive primitives remember the index
/// of that primitive in `source`, so it does not shadow itself.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub position: Vector3,
    pub color: Color,
    pub source: Option<usize>,
}

impl PointLight {
    pub fn new(position: Vector3, color: Color) -> PointLight {
        PointLight { position, color, source: None }
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model; ambient, diffuse,
/// specular and shininess. `reflection` is the fraction of the final color
/// taken from the mirror-reflected ray, and a non-black `emissive` color
/// makes the surface glow regardless of lighting.
#[derive(Clone, Debug)]
pub struct Material {
    pub diffuse_color: MaterialColor,
    pub specular_color: MaterialColor,
    pub emissive: Color,

    pub reflection: f64,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse_color: MaterialColor::Constant(Color::white()),
            specular_color: MaterialColor::Constant(Color::white()),
            emissive: Color::black(),

            reflection: 0.0,

            ambient: DEFAULT_AMBIENT,
            diffuse: DEFAULT_DIFFUSE,
            specular: DEFAULT_SPECULAR,
            shininess: DEFAULT_SHININESS,
        }
    }
}

impl Material {
    /// A material with a constant diffuse color and otherwise default values.
    pub fn colored(color: Color) -> Material {
        Material { diffuse_color: color.into(), ..Default::default() }
    }

    pub fn is_emissive(&self) -> bool {
        !self.emissive.is_black()
    }
}

/// Calculates the light a single point light adds at a surface point.
///
/// Takes a material, a single light, a point, the eye vector (pointing from
/// the point toward the viewer) and the unit surface normal. Returns the
/// diffuse plus Blinn-Phong specular contribution; a shadowed light, or one
/// behind the surface, contributes nothing.
///
/// Ambient and emissive terms are not light-dependent and are added by the
/// caller.
pub fn lighting(m: &Material, light: &PointLight, point: Vector3,
    eyev: Vector3, normalv: Vector3, in_shadow: bool) -> Color {
    if in_shadow {
        return Color::black();
    }

    // Direction to the light source; a light sitting on the point lights
    // nothing.
    let lightv = match (light.position - point).normalize() {
        Ok(v) => v,
        Err(_) => return Color::black(),
    };

    // For the side of the surface with no light, contribute nothing
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal <= 0.0 {
        return Color::black();
    }

    let surface = m.diffuse_color.color_at(point);
    let diffuse = surface * light.color * (m.diffuse * light_dot_normal);

    // Halfway vector between light and eye; degenerate when they oppose
    let specular = match (lightv + eyev).normalize() {
        Ok(halfv) => {
            let factor = halfv.dot(&normalv).max(0.0).powf(m.shininess);
            m.specular_color.color_at(point) * light.color * (m.specular * factor)
        },
        Err(_) => Color::black(),
    };

    diffuse + specular
}

#[test]
fn eye_between_light_and_surface() {
    let m = Material { ambient: 0.0, ..Default::default() };
    let position = Vector3::zero();

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let light = PointLight::new(Vector3::new(0.0, 0.0, -10.0), Color::white());

    // Full diffuse plus a full highlight
    let res = lighting(&m, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(2.0, 2.0, 2.0));
}

#[test]
fn light_at_45_degrees() {
    let m = Material { specular: 0.0, ..Default::default() };
    let position = Vector3::zero();

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let light = PointLight::new(Vector3::new(0.0, 10.0, -10.0), Color::white());

    let res = lighting(&m, &light, position, eyev, normalv, false);
    let k = 2.0f64.sqrt() / 2.0;
    assert_eq!(res, Color::rgb(k, k, k));
}

#[test]
fn eye_across_surface_from_light() {
    let m = Material::default();
    let position = Vector3::zero();

    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let light = PointLight::new(Vector3::new(0.0, 0.0, 10.0), Color::white());

    let res = lighting(&m, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::black());
}

#[test]
fn shadowed_light_contributes_nothing() {
    let m = Material::default();
    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let light = PointLight::new(Vector3::new(0.0, 0.0, -10.0), Color::white());

    let res = lighting(&m, &light, Vector3::zero(), eyev, normalv, true);
    assert_eq!(res, Color::black());
}

#[test]
fn lighting_with_checker_pattern() {
    use crate::pattern::checker;

    let m = Material {
        diffuse_color: checker(Color::white(), Color::black(), 1.0),
        specular: 0.0,
        ..Default::default()
    };

    let eyev = Vector3::new(0.0, 1.0, 0.0);
    let normalv = Vector3::new(0.0, 1.0, 0.0);
    let light = PointLight::new(Vector3::new(0.5, 10.0, 0.5), Color::white());

    let lit = lighting(&m, &light, Vector3::new(0.5, 0.0, 0.5),
        eyev, normalv, false);
    let dark = lighting(&m, &light, Vector3::new(1.5, 0.0, 0.5),
        eyev, normalv, false);

    assert_eq!(lit, Color::white());
    assert_eq!(dark, Color::black());
}
