use crate::consts::EPSILON;
use crate::error::TraceError;
use crate::geometry::Primitive;
use crate::ray::Ray;
use crate::vector::Vector3;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter
/// `t` is the distance from the ray origin, `what` the primitive that was hit
/// and `index` its position in the scene.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Primitive,
    pub index: usize,
}

/// Implements partial equality on an Intersection.
///
/// Two intersections are equal if their offsets `t` are equivalent and they
/// refer to the *same* primitive.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.what, other.what)
    }
}

/// Finds the nearest primitive hit by `ray`.
///
/// Every primitive is tested in order. Among the hits lying within `EPSILON`
/// of the closest distance, the primitive inserted first wins.
pub fn nearest_hit<'a>(ray: &Ray, primitives: &'a [Primitive])
    -> Option<Intersection<'a>> {
    nearest_hit_excluding(ray, primitives, None)
}

/// Like `nearest_hit`, but never reports the primitive at index `skip`.
pub fn nearest_hit_excluding<'a>(ray: &Ray, primitives: &'a [Primitive],
    skip: Option<usize>) -> Option<Intersection<'a>> {
    let hits: Vec<Intersection<'a>> = primitives.iter()
        .enumerate()
        .filter(|&(index, _)| Some(index) != skip)
        .filter_map(|(index, what)| {
            what.intersect(ray).map(|t| Intersection { t, what, index })
        })
        .collect();

    let min_t = hits.iter().map(|h| h.t).fold(f64::INFINITY, f64::min);

    // Hits are in insertion order, so the first one in range is the earliest
    hits.into_iter().find(|h| h.t <= min_t + EPSILON)
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`.
#[derive(Clone, Debug)]
pub struct IntersectionComputation<'a> {
    /// The distance along the ray to the intersection.
    pub t: f64,

    /// The primitive being intersected.
    pub obj: &'a Primitive,

    /// The point where the intersection occurs.
    pub point: Vector3,

    /// A point slightly above the intersected surface. Secondary rays start
    /// here so a surface does not shadow or reflect itself (this causes
    /// "acne").
    pub over_point: Vector3,

    /// The eye vector, pointing from the point back along the ray.
    pub eyev: Vector3,

    /// The unit surface normal, facing the eye.
    pub normalv: Vector3,

    /// The ray direction mirrored across the normal.
    pub reflectv: Vector3,

    /// Whether the ray struck the back of the surface (the normal was
    /// flipped).
    pub inside: bool,
}

impl<'a> IntersectionComputation<'a> {
    pub fn new(r: &Ray, hit: &Intersection<'a>)
        -> Result<IntersectionComputation<'a>, TraceError> {
        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = obj.normal_at(point)?;

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * EPSILON;
        let reflectv = r.direction.reflect(&normalv).normalize()?;

        Ok(IntersectionComputation {
            t, obj,
            point, over_point,
            eyev, normalv, reflectv,
            inside,
        })
    }
}

#[cfg(test)]
fn unit_ray_along_z() -> Ray {
    Ray::new(Vector3::new(0.0, 0.0, -10.0), Vector3::new(0.0, 0.0, 1.0))
        .unwrap()
}

#[test]
fn nearest_of_two_overlapping_spheres() {
    use crate::light::Material;

    let far = Primitive::sphere(Vector3::new(0.0, 0.0, 0.5), 1.0,
        Material::default()).unwrap();
    let near = Primitive::sphere(Vector3::new(0.0, 0.0, 0.0), 1.0,
        Material::default()).unwrap();
    let primitives = vec![far, near];

    let hit = nearest_hit(&unit_ray_along_z(), &primitives).unwrap();
    assert_eq!(hit.index, 1);
    assert!(crate::feq(hit.t, 9.0));
    assert!(std::ptr::eq(hit.what, &primitives[1]));
}

#[test]
fn equal_distance_resolves_to_first_inserted() {
    use crate::light::Material;

    let a = Primitive::sphere(Vector3::zero(), 1.0, Material::default()).unwrap();
    let b = Primitive::plane(Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 0.0, -1.0), Material::default()).unwrap();

    // Both are hit at t = 9
    let first_sphere = vec![a.clone(), b.clone()];
    let first_plane = vec![b, a];

    assert_eq!(nearest_hit(&unit_ray_along_z(), &first_sphere).unwrap().index, 0);
    assert_eq!(nearest_hit(&unit_ray_along_z(), &first_plane).unwrap().index, 0);
    assert!(matches!(
        nearest_hit(&unit_ray_along_z(), &first_plane).unwrap().what.kind,
        crate::geometry::PrimitiveKind::Plane { .. }
    ));
}

#[test]
fn chained_near_ties_resolve_to_earliest_within_range() {
    use crate::light::Material;

    // Hit at t = 9.00008, 9.0 and 8.99995. Each is within EPSILON of its
    // neighbour, but only the last two are within EPSILON of the closest.
    let wall = |z: f64| Primitive::plane(Vector3::new(0.0, 0.0, z),
        Vector3::new(0.0, 0.0, -1.0), Material::default()).unwrap();
    let primitives = vec![wall(-0.99992), wall(-1.0), wall(-1.00005)];

    let hit = nearest_hit(&unit_ray_along_z(), &primitives).unwrap();
    assert_eq!(hit.index, 1);
    assert!(crate::feq(hit.t, 9.0));
}

#[test]
fn empty_scene_has_no_hit() {
    assert!(nearest_hit(&unit_ray_along_z(), &[]).is_none());
}

#[test]
fn excluded_primitive_is_skipped() {
    use crate::light::Material;

    let near = Primitive::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0,
        Material::default()).unwrap();
    let far = Primitive::sphere(Vector3::zero(), 1.0, Material::default()).unwrap();
    let primitives = vec![near, far];

    let hit = nearest_hit_excluding(&unit_ray_along_z(), &primitives, Some(0))
        .unwrap();
    assert_eq!(hit.index, 1);
}

#[test]
fn computation_flips_normal_for_back_face() {
    use crate::light::Material;

    let floor = Primitive::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        Material::default()).unwrap();
    let primitives = vec![floor];

    let r = Ray::new(Vector3::new(0.0, -2.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
        .unwrap();
    let hit = nearest_hit(&r, &primitives).unwrap();
    let comps = IntersectionComputation::new(&r, &hit).unwrap();

    assert!(comps.inside);
    assert_eq!(comps.normalv, Vector3::new(0.0, -1.0, 0.0));
    assert!(comps.over_point.y < 0.0);
    assert_eq!(comps.reflectv, Vector3::new(0.0, -1.0, 0.0));
}

#[test]
fn over_point_sits_above_surface() {
    use crate::light::Material;

    let s = Primitive::sphere(Vector3::zero(), 1.0, Material::default()).unwrap();
    let primitives = vec![s];

    let r = unit_ray_along_z();
    let hit = nearest_hit(&r, &primitives).unwrap();
    let comps = IntersectionComputation::new(&r, &hit).unwrap();

    assert!(!comps.inside);
    assert_eq!(comps.point, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Vector3::new(0.0, 0.0, -1.0));
    assert!(comps.over_point.z < comps.point.z);
}
