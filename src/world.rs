use crate::color::Color;
use crate::consts::EPSILON;
use crate::context::TraceStats;
use crate::error::TraceError;
use crate::geometry::{ Primitive, PrimitiveKind };
use crate::intersect::{ Intersection, IntersectionComputation, nearest_hit,
    nearest_hit_excluding };
use crate::light::{ PointLight, lighting };
use crate::ray::Ray;
use crate::vector::Vector3;

/// A scene with primitives and lights.
///
/// Primitives are kept in insertion order; the order only matters for
/// breaking ties between hits at the same distance.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub lights: Vec<PointLight>,
}

impl Scene {
    /// Creates an empty scene with no primitives and no lights.
    pub fn empty() -> Scene {
        Default::default()
    }

    /// Adds a primitive, returning its index.
    pub fn add(&mut self, primitive: Primitive) -> usize {
        self.primitives.push(primitive);
        self.primitives.len() - 1
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    /// Finds the nearest primitive along a ray.
    pub fn intersect(&self, r: &Ray) -> Option<Intersection<'_>> {
        nearest_hit(r, &self.primitives)
    }

    /// Collects the lights used for shading.
    ///
    /// These are the scene's point lights, followed (if `emissive` is set) by
    /// one light at the center of every emissive sphere. Emissive planes have
    /// no center and never act as lights.
    pub fn light_sources(&self, emissive: bool) -> Vec<PointLight> {
        let mut lights = self.lights.clone();

        if emissive {
            lights.extend(self.primitives.iter().enumerate()
                .filter(|(_, p)| p.material.is_emissive())
                .filter(|(_, p)| matches!(p.kind, PrimitiveKind::Sphere { .. }))
                .map(|(i, p)| PointLight {
                    position: p.position,
                    color: p.material.emissive,
                    source: Some(i),
                }));
        }

        lights
    }

    /// Determines whether `light` is blocked when seen from point `p`.
    ///
    /// Only hits closer than the light count; anything behind the light is
    /// ignored, as is the primitive the light belongs to.
    pub fn is_shadowed(&self, p: Vector3, light: &PointLight)
        -> Result<bool, TraceError> {
        let v = light.position - p;
        let distance = v.length();
        if distance <= EPSILON {
            return Ok(false);
        }

        let r = Ray::new(p, v)?;
        let hit = nearest_hit_excluding(&r, &self.primitives, light.source);

        Ok(match hit {
            Some(i) => i.t < distance,
            None => false,
        })
    }

    /// Calculates the local color for a hit, based on shadows and lights.
    ///
    /// This is ambient plus emissive light, plus the diffuse and specular
    /// contribution of every unshadowed light. The result is not clamped.
    pub fn shade_hit(&self, lights: &[PointLight],
        comps: &IntersectionComputation<'_>, stats: &TraceStats)
        -> Result<Color, TraceError> {
        let m = &comps.obj.material;

        let surface = m.diffuse_color.color_at(comps.point);
        let mut color = surface * m.ambient + m.emissive;

        for light in lights {
            stats.count_shadow_ray();
            let in_shadow = self.is_shadowed(comps.over_point, light)?;

            color += lighting(m, light, comps.point, comps.eyev, comps.normalv,
                in_shadow);
        }

        Ok(color)
    }
}

#[cfg(test)]
fn two_sphere_scene() -> Scene {
    use crate::light::Material;

    let mut s = Scene::empty();
    s.add_light(PointLight::new(Vector3::new(-10.0, 10.0, -10.0),
        Color::white()));

    let m1 = Material {
        diffuse: 0.7,
        specular: 0.2,
        ..Material::colored(Color::rgb(0.8, 1.0, 0.6))
    };
    s.add(Primitive::sphere(Vector3::zero(), 1.0, m1).unwrap());
    s.add(Primitive::sphere(Vector3::zero(), 0.5, Default::default()).unwrap());

    s
}

#[test]
fn shadow_collinear_point_and_light() {
    let s = two_sphere_scene();
    let p = Vector3::new(0.0, 10.0, 0.0);

    assert!(!s.is_shadowed(p, &s.lights[0]).unwrap());
}

#[test]
fn shadow_object_between_point_and_light() {
    let s = two_sphere_scene();
    let p = Vector3::new(10.0, -10.0, 10.0);

    assert!(s.is_shadowed(p, &s.lights[0]).unwrap());
}

#[test]
fn shadow_object_behind_light() {
    let s = two_sphere_scene();
    let p = Vector3::new(-20.0, 20.0, -20.0);

    assert!(!s.is_shadowed(p, &s.lights[0]).unwrap());
}

#[test]
fn shadow_object_behind_point() {
    let s = two_sphere_scene();
    let p = Vector3::new(-2.0, 2.0, -2.0);

    assert!(!s.is_shadowed(p, &s.lights[0]).unwrap());
}

#[test]
fn occluder_zeroes_light_contribution() {
    use crate::light::Material;

    let stats = TraceStats::default();
    let mut s = Scene::empty();
    s.add_light(PointLight::new(Vector3::new(0.0, 0.0, -10.0), Color::white()));

    let target = Material { ambient: 0.0, ..Material::colored(Color::white()) };
    s.add(Primitive::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0, target).unwrap());

    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0))
        .unwrap();

    // Lit from the front without the occluder
    let lit = {
        let hit = s.intersect(&r).unwrap();
        let comps = IntersectionComputation::new(&r, &hit).unwrap();
        s.shade_hit(&s.lights, &comps, &stats).unwrap()
    };
    assert!(lit.r > 0.0);

    // An opaque sphere directly between the surface point and the light.
    // The ray starts behind it so the target is still the nearest hit.
    s.add(Primitive::sphere(Vector3::new(0.0, 0.0, -7.0), 1.0,
        Material::default()).unwrap());
    let hit = s.intersect(&r).unwrap();
    assert_eq!(hit.index, 0);

    let comps = IntersectionComputation::new(&r, &hit).unwrap();
    assert!(s.is_shadowed(comps.over_point, &s.lights[0]).unwrap());
    assert_eq!(s.shade_hit(&s.lights, &comps, &stats).unwrap(), Color::black());
}

#[test]
fn shadowed_hit_keeps_ambient_and_emissive() {
    use crate::light::Material;

    let stats = TraceStats::default();
    let mut s = Scene::empty();
    s.add_light(PointLight::new(Vector3::new(0.0, 0.0, -10.0), Color::white()));
    s.add(Primitive::sphere(Vector3::zero(), 1.0, Material::default()).unwrap());

    let m = Material {
        ambient: 0.1,
        emissive: Color::rgb(0.0, 0.0, 0.5),
        ..Material::colored(Color::white())
    };
    s.add(Primitive::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0, m).unwrap());

    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0))
        .unwrap();
    let hit = s.intersect(&r).unwrap();
    assert_eq!(hit.index, 1);

    let comps = IntersectionComputation::new(&r, &hit).unwrap();
    let c = s.shade_hit(&s.lights, &comps, &stats).unwrap();

    assert_eq!(c, Color::rgb(0.1, 0.1, 0.6));
    assert_eq!(stats.shadow_rays(), 1);
}

#[test]
fn emissive_sphere_lights_without_shadowing_itself() {
    use crate::light::Material;

    let stats = TraceStats::default();
    let mut s = Scene::empty();

    let floor = Material { ambient: 0.0, specular: 0.0,
        ..Material::colored(Color::white()) };
    s.add(Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0), floor)
        .unwrap());

    let bulb = Material { emissive: Color::rgb(1.0, 1.0, 0.2),
        ..Default::default() };
    s.add(Primitive::sphere(Vector3::new(0.0, 3.0, 0.0), 0.5, bulb).unwrap());

    assert!(s.light_sources(false).is_empty());
    let lights = s.light_sources(true);
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].source, Some(1));

    // Looking at the floor straight under the bulb
    let r = Ray::new(Vector3::new(1.0, 1.0, 0.0), Vector3::new(-1.0, -1.0, 0.0))
        .unwrap();
    let hit = s.intersect(&r).unwrap();
    assert_eq!(hit.index, 0);

    let comps = IntersectionComputation::new(&r, &hit).unwrap();
    assert!(!s.is_shadowed(comps.over_point, &lights[0]).unwrap());

    let c = s.shade_hit(&lights, &comps, &stats).unwrap();
    assert_eq!(c, Color::rgb(1.0, 1.0, 0.2));
}
