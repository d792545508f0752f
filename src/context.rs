use std::sync::atomic::{ AtomicU64, Ordering };

use crate::camera::Camera;
use crate::color::Color;
use crate::config::RenderConfig;
use crate::error::TraceError;
use crate::intersect::IntersectionComputation;
use crate::light::PointLight;
use crate::ray::Ray;
use crate::world::Scene;

/// Counters of the rays traced for a context.
///
/// Counters are relaxed atomics, so parallel workers can update them without
/// locking; totals are only meaningful once rendering has finished.
#[derive(Debug, Default)]
pub struct TraceStats {
    primary: AtomicU64,
    reflection: AtomicU64,
    shadow: AtomicU64,
}

impl TraceStats {
    pub fn count_primary_ray(&self) {
        self.primary.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_reflection_ray(&self) {
        self.reflection.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_shadow_ray(&self) {
        self.shadow.fetch_add(1, Ordering::Relaxed);
    }

    pub fn primary_rays(&self) -> u64 {
        self.primary.load(Ordering::Relaxed)
    }

    pub fn reflection_rays(&self) -> u64 {
        self.reflection.load(Ordering::Relaxed)
    }

    pub fn shadow_rays(&self) -> u64 {
        self.shadow.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.primary.store(0, Ordering::Relaxed);
        self.reflection.store(0, Ordering::Relaxed);
        self.shadow.store(0, Ordering::Relaxed);
    }
}

/// Everything needed to trace a frame.
///
/// Built once before rendering and only read afterwards, so it can be shared
/// between worker threads by reference.
#[derive(Debug)]
pub struct RenderContext {
    pub scene: Scene,
    pub camera: Camera,
    pub config: RenderConfig,

    lights: Vec<PointLight>,
    stats: TraceStats,
}

impl RenderContext {
    pub fn new(scene: Scene, camera: Camera, config: RenderConfig)
        -> RenderContext {
        let lights = scene.light_sources(config.emissive_lights);

        RenderContext {
            scene,
            camera,
            config,
            lights,
            stats: Default::default(),
        }
    }

    /// The lights used for shading, including emissive spheres if enabled.
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn stats(&self) -> &TraceStats {
        &self.stats
    }

    /// Traces the primary ray through pixel `(x, y)`, `y` counting up from
    /// the bottom of the image.
    pub fn color_for_pixel(&self, x: usize, y: usize) -> Result<Color, TraceError> {
        let ray = self.camera.ray_for_pixel(x, y)?;
        self.stats.count_primary_ray();
        self.trace_ray(&ray, 0)
    }

    /// Determines the color seen along a ray.
    ///
    /// A miss yields the background color. A hit is shaded locally; if the
    /// surface is reflective and `depth + 1 < max_depth`, a mirror ray is
    /// traced one level deeper and blended in by the material's
    /// `reflection`. Once the depth budget is spent, reflective surfaces
    /// return their local color alone.
    pub fn trace_ray(&self, r: &Ray, depth: usize) -> Result<Color, TraceError> {
        let hit = match self.scene.intersect(r) {
            Some(hit) => hit,
            None => return Ok(self.config.background),
        };

        let comps = IntersectionComputation::new(r, &hit)?;
        let local = self.scene.shade_hit(&self.lights, &comps, &self.stats)?;

        let reflection = comps.obj.material.reflection;
        if reflection > 0.0 && depth + 1 < self.config.max_depth {
            self.stats.count_reflection_ray();

            let reflect_ray = Ray::new(comps.over_point, comps.reflectv)?;
            let reflected = self.trace_ray(&reflect_ray, depth + 1)?;

            Ok(Color::lerp(&local, &reflected, reflection))
        } else {
            Ok(local)
        }
    }
}

#[cfg(test)]
mod fixtures {
    use super::*;
    use crate::geometry::Primitive;
    use crate::light::Material;
    use crate::vector::Vector3;

    pub fn camera() -> Camera {
        Camera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0),
            60.0, 4, 4).unwrap()
    }

    pub fn with_depth(scene: Scene, max_depth: usize) -> RenderContext {
        let config = RenderConfig { max_depth, ..Default::default() };
        RenderContext::new(scene, camera(), config)
    }

    /// A perfect mirror at z = 0 facing a red sphere centered at z = 5.
    pub fn mirror_and_sphere() -> Scene {
        let mut s = Scene::empty();
        s.add_light(PointLight::new(Vector3::new(0.0, 2.0, 1.0), Color::white()));

        let mirror = Material { reflection: 1.0, ..Material::colored(Color::green()) };
        s.add(Primitive::plane(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0), mirror)
            .unwrap());

        let red = Material::colored(Color::rgb(0.8, 0.1, 0.1));
        s.add(Primitive::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0, red).unwrap());

        s
    }

    /// Two half-silvered mirrors, blue at z = 0 and red at z = 10, facing
    /// each other.
    pub fn facing_mirrors() -> Scene {
        let mut s = Scene::empty();
        s.add_light(PointLight::new(Vector3::new(0.0, 0.0, 5.0), Color::white()));

        let blue = Material { reflection: 0.5, ..Material::colored(Color::blue()) };
        let red = Material { reflection: 0.5, ..Material::colored(Color::red()) };
        s.add(Primitive::plane(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0), blue)
            .unwrap());
        s.add(Primitive::plane(Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(0.0, 0.0, -1.0), red).unwrap());

        s
    }
}

#[test]
fn ray_miss_returns_background() {
    use crate::vector::Vector3;

    let config = RenderConfig {
        background: Color::rgb(0.2, 0.3, 0.4),
        ..Default::default()
    };
    let ctx = RenderContext::new(Scene::empty(), fixtures::camera(), config);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0)).unwrap();

    assert_eq!(ctx.trace_ray(&r, 0).unwrap(), Color::rgb(0.2, 0.3, 0.4));
}

#[test]
fn full_mirror_shows_reflected_sphere() {
    use crate::consts::EPSILON;
    use crate::vector::Vector3;

    let ctx = fixtures::with_depth(fixtures::mirror_and_sphere(), 3);

    // Straight into the mirror, bouncing back toward the sphere
    let at_mirror = Ray::new(Vector3::new(0.0, 0.0, 2.0),
        Vector3::new(0.0, 0.0, -1.0)).unwrap();
    // The bounce itself, started where the mirror ray would be
    let bounce = Ray::new(Vector3::new(0.0, 0.0, EPSILON),
        Vector3::new(0.0, 0.0, 1.0)).unwrap();

    let seen = ctx.trace_ray(&at_mirror, 0).unwrap();
    let sphere = ctx.trace_ray(&bounce, 1).unwrap();

    assert_eq!(seen, sphere);
    assert!(seen.r > seen.g && seen.r > 0.1);
    assert_eq!(ctx.stats().reflection_rays(), 1);
}

#[test]
fn spent_depth_budget_returns_local_color() {
    use crate::vector::Vector3;

    let ctx = fixtures::with_depth(fixtures::facing_mirrors(), 3);
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0))
        .unwrap();

    let local = {
        let hit = ctx.scene.intersect(&r).unwrap();
        let comps = IntersectionComputation::new(&r, &hit).unwrap();
        ctx.scene.shade_hit(ctx.lights(), &comps, ctx.stats()).unwrap()
    };

    // depth == max_depth - 1: no further bounce
    let c = ctx.trace_ray(&r, 2).unwrap();
    assert_eq!(c, local);
    assert_eq!(ctx.stats().reflection_rays(), 0);

    // One level shallower the mirror blends in its reflection
    let c = ctx.trace_ray(&r, 1).unwrap();
    assert_ne!(c, local);
    assert_eq!(ctx.stats().reflection_rays(), 1);
}

#[test]
fn reflection_count_is_bounded_by_depth() {
    use crate::vector::Vector3;

    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0))
        .unwrap();

    for &(max_depth, bounces) in [(0, 0), (1, 0), (2, 1), (3, 2), (6, 5)].iter() {
        let ctx = fixtures::with_depth(fixtures::facing_mirrors(), max_depth);
        ctx.trace_ray(&r, 0).unwrap();

        assert_eq!(ctx.stats().reflection_rays(), bounces);
        // one shadow ray per hit
        assert_eq!(ctx.stats().shadow_rays(), bounces + 1);
    }
}

#[test]
fn stats_reset() {
    let ctx = fixtures::with_depth(fixtures::mirror_and_sphere(), 3);
    ctx.color_for_pixel(0, 0).unwrap();
    assert_eq!(ctx.stats().primary_rays(), 1);

    ctx.stats().reset();
    assert_eq!(ctx.stats().primary_rays(), 0);
    assert_eq!(ctx.stats().shadow_rays(), 0);
}
