use crate::consts::EPSILON;
use crate::error::TraceError;
use crate::light::Material;
use crate::ray::Ray;
use crate::vector::Vector3;

/// The geometry of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveKind {
    /// A sphere of the given radius, centered on the primitive's position.
    Sphere { radius: f64 },

    /// An infinite plane through the primitive's position, with a unit normal.
    Plane { normal: Vector3 },
}

/// A renderable object: geometry plus a material.
///
/// Primitives are built once, owned by a `Scene` and never mutated while
/// rendering.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub position: Vector3,
    pub material: Material,
}

impl Primitive {
    /// Creates a sphere.
    ///
    /// The radius must be positive and finite, and the material's reflection
    /// within `0.0..=1.0`.
    pub fn sphere(center: Vector3, radius: f64, material: Material)
        -> Result<Primitive, TraceError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(TraceError::InvalidPrimitive(
                format!("sphere radius must be positive, got {}", radius)
            ));
        }

        Self::checked(PrimitiveKind::Sphere { radius }, center, material)
    }

    /// Creates a plane through `point`.
    ///
    /// The normal is normalized here, so callers may pass any non-zero
    /// vector.
    pub fn plane(point: Vector3, normal: Vector3, material: Material)
        -> Result<Primitive, TraceError> {
        let normal = normal.normalize().map_err(|_| {
            TraceError::InvalidPrimitive("plane normal has zero length".into())
        })?;

        Self::checked(PrimitiveKind::Plane { normal }, point, material)
    }

    fn checked(kind: PrimitiveKind, position: Vector3, material: Material)
        -> Result<Primitive, TraceError> {
        if !(0.0..=1.0).contains(&material.reflection) {
            return Err(TraceError::InvalidPrimitive(format!(
                "reflection must lie in [0, 1], got {}", material.reflection
            )));
        }

        Ok(Primitive { kind, position, material })
    }

    /// Distance along `ray` to this primitive, if it is hit in front of the
    /// origin.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        match self.kind {
            PrimitiveKind::Sphere { radius } =>
                intersect_sphere(ray.origin, ray.direction, self.position, radius),
            PrimitiveKind::Plane { normal } =>
                intersect_plane(ray.origin, ray.direction, self.position, normal),
        }
    }

    /// The outward unit normal at a point on the surface.
    pub fn normal_at(&self, point: Vector3) -> Result<Vector3, TraceError> {
        match self.kind {
            PrimitiveKind::Sphere { .. } => (point - self.position).normalize(),
            PrimitiveKind::Plane { normal } => Ok(normal),
        }
    }
}

/// Intersects a ray with a sphere.
///
/// Solves `|o + t d - c|^2 = r^2` and returns the smallest root greater than
/// `EPSILON`, so a ray leaving a sphere's surface does not hit it again at
/// `t ~ 0`.
pub fn intersect_sphere(origin: Vector3, direction: Vector3, center: Vector3,
    radius: f64) -> Option<f64> {
    let sphere_to_ray = origin - center;

    let a = direction.dot(&direction);
    let b = 2.0 * direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - radius * radius;

    let discriminant = b * b - (4.0 * a * c);
    if discriminant < 0.0 || a == 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);

    if t0 > EPSILON {
        Some(t0)
    } else if t1 > EPSILON {
        Some(t1)
    } else {
        None
    }
}

/// Intersects a ray with an infinite plane.
///
/// Rays (nearly) parallel to the plane never hit it, whatever their origin.
pub fn intersect_plane(origin: Vector3, direction: Vector3, point: Vector3,
    normal: Vector3) -> Option<f64> {
    let denom = direction.dot(&normal);
    if denom.abs() < EPSILON {
        return None;
    }

    let t = (point - origin).dot(&normal) / denom;
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

#[test]
fn ray_through_sphere_center_hits_near_side() {
    let origin = Vector3::new(0.0, 0.0, -5.0);
    let direction = Vector3::new(0.0, 0.0, 1.0);
    let center = Vector3::new(0.0, 0.0, 0.0);

    let t = intersect_sphere(origin, direction, center, 1.0);
    assert_eq!(t, Some(4.0));

    let expected = (origin - center).length() - 2.5;
    let t = intersect_sphere(origin, direction, center, 2.5).unwrap();
    assert!(crate::feq(t, expected));
}

#[test]
fn ray_misses_sphere() {
    let t = intersect_sphere(
        Vector3::new(0.0, 2.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zero(), 1.0,
    );

    assert_eq!(t, None);
}

#[test]
fn ray_inside_sphere_hits_far_side() {
    let t = intersect_sphere(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zero(), 1.0,
    );

    assert_eq!(t, Some(1.0));
}

#[test]
fn sphere_behind_ray_is_missed() {
    let t = intersect_sphere(
        Vector3::new(0.0, 0.0, 5.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zero(), 1.0,
    );

    assert_eq!(t, None);
}

#[test]
fn ray_leaving_sphere_surface_does_not_self_intersect() {
    // Starts on the surface, heading outward
    let t = intersect_sphere(
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zero(), 1.0,
    );

    assert_eq!(t, None);
}

#[test]
fn ray_parallel_to_plane_misses() {
    let normal = Vector3::new(0.0, 1.0, 0.0);
    let direction = Vector3::new(1.0, 0.0, 0.0);

    for y in [-1.0, 0.0, 1.0].iter() {
        let origin = Vector3::new(0.0, *y, 0.0);
        assert_eq!(intersect_plane(origin, direction, Vector3::zero(), normal),
            None);
    }
}

#[test]
fn ray_hits_plane_from_above_and_below() {
    let normal = Vector3::new(0.0, 1.0, 0.0);

    let above = intersect_plane(Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0), Vector3::zero(), normal);
    let below = intersect_plane(Vector3::new(0.0, -3.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0), Vector3::zero(), normal);

    assert_eq!(above, Some(1.0));
    assert_eq!(below, Some(3.0));
}

#[test]
fn plane_behind_ray_is_missed() {
    let t = intersect_plane(Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0), Vector3::zero(),
        Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(t, None);
}

#[test]
fn invalid_primitives_are_rejected() {
    let m = Material::default();

    assert!(Primitive::sphere(Vector3::zero(), 0.0, m.clone()).is_err());
    assert!(Primitive::sphere(Vector3::zero(), -1.0, m.clone()).is_err());
    assert!(Primitive::plane(Vector3::zero(), Vector3::zero(), m.clone()).is_err());

    let shiny = Material { reflection: 1.5, ..Default::default() };
    assert!(Primitive::sphere(Vector3::zero(), 1.0, shiny).is_err());
}

#[test]
fn plane_normal_is_normalized() {
    let p = Primitive::plane(Vector3::zero(), Vector3::new(0.0, 5.0, 0.0),
        Material::default()).unwrap();

    assert_eq!(p.kind, PrimitiveKind::Plane { normal: Vector3::new(0.0, 1.0, 0.0) });
}

#[test]
fn sphere_normal_points_outward() {
    let s = Primitive::sphere(Vector3::new(1.0, 0.0, 0.0), 2.0,
        Material::default()).unwrap();

    assert_eq!(s.normal_at(Vector3::new(1.0, 2.0, 0.0)).unwrap(),
        Vector3::new(0.0, 1.0, 0.0));
}
