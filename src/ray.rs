use crate::vector::Vector3;
use crate::error::TraceError;

/// A ray with a unit-length direction.
///
/// Rays are transient: one is built per pixel, per shadow test and per
/// reflection bounce.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// Fails if `direction` has zero length.
    pub fn new(origin: Vector3, direction: Vector3) -> Result<Ray, TraceError> {
        Ok(Ray { origin, direction: direction.normalize()? })
    }

    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Vector3::new(2.0, 3.0, 4.0),
                Vector3::new(1.0, 0.0, 0.0)
            ).unwrap();

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 3.0, 4.0)).unwrap();

    assert_eq!(r.direction, Vector3::new(0.0, 0.6, 0.8));
}

#[test]
fn ray_with_zero_direction_fails() {
    let r = Ray::new(Vector3::zero(), Vector3::zero());

    assert_eq!(r, Err(TraceError::DegenerateVector));
}
