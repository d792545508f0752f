use crate::consts::EPSILON;
use crate::error::TraceError;
use crate::ray::Ray;
use crate::vector::Vector3;

/// Preferred world "up" when building the camera basis.
const WORLD_UP: Vector3 = Vector3::new(0.0, 1.0, 0.0);

/// Fallback reference for cameras looking straight up or down.
const ALTERNATE_UP: Vector3 = Vector3::new(0.0, 0.0, -1.0);

/// A pinhole camera.
///
/// The orthonormal basis (`forward`, `right`, `up`) is derived once from the
/// look direction and never changes afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant image, in pixels.
    pub hsize: usize,

    /// The vertical size of the resultant image, in pixels.
    pub vsize: usize,

    /// The fixed point every primary ray starts from.
    pub origin: Vector3,

    pub forward: Vector3,
    pub right: Vector3,
    pub up: Vector3,

    /// The vertical field of view, in degrees.
    pub field_of_view: f64,

    /// `tan(field_of_view / 2)`: half the image plane height at distance 1.
    pub half_height: f64,

    /// Width over height.
    pub aspect: f64,
}

impl Camera {
    /// Creates a camera at `origin` looking along `look`.
    ///
    /// `look` need not be unit length. The field of view must lie strictly
    /// between 0 and 180 degrees and both image dimensions must be non-zero.
    pub fn new(origin: Vector3, look: Vector3, field_of_view: f64,
        hsize: usize, vsize: usize) -> Result<Camera, TraceError> {
        if hsize == 0 || vsize == 0 {
            return Err(TraceError::InvalidCamera(
                format!("image size must be positive, got {}x{}", hsize, vsize)
            ));
        }

        if !(field_of_view > 0.0 && field_of_view < 180.0) {
            return Err(TraceError::InvalidCamera(format!(
                "field of view must lie in (0, 180) degrees, got {}",
                field_of_view
            )));
        }

        let (forward, right, up) = Self::build_basis(look)?;

        Ok(Camera {
            hsize,
            vsize,
            origin,
            forward,
            right,
            up,
            field_of_view,
            half_height: (field_of_view.to_radians() / 2.0).tan(),
            aspect: hsize as f64 / vsize as f64,
        })
    }

    /// Derives `(forward, right, up)` from a look direction.
    ///
    /// World up is `+Y`; when looking (nearly) along it, `-Z` is used as the
    /// reference instead, so that a camera looking straight down still has
    /// `-Z` at the top of the image.
    pub fn build_basis(look: Vector3)
        -> Result<(Vector3, Vector3, Vector3), TraceError> {
        let forward = look.normalize()
            .map_err(|_| TraceError::DegenerateBasis)?;

        let reference = if forward.cross(&WORLD_UP).length() > EPSILON {
            WORLD_UP
        } else {
            ALTERNATE_UP
        };

        let right = forward.cross(&reference).normalize()
            .map_err(|_| TraceError::DegenerateBasis)?;
        let up = right.cross(&forward);

        Ok((forward, right, up))
    }

    /// Casts a ray through a continuous image-plane position.
    ///
    /// `x` runs from 0 at the left edge to `hsize` at the right edge, `y`
    /// from 0 at the bottom edge to `vsize` at the top edge.
    pub fn ray_through(&self, x: f64, y: f64) -> Result<Ray, TraceError> {
        let ndc_x = (2.0 * x / self.hsize as f64 - 1.0)
            * self.half_height * self.aspect;
        let ndc_y = (2.0 * y / self.vsize as f64 - 1.0) * self.half_height;

        let direction = self.forward + self.right * ndc_x + self.up * ndc_y;
        Ray::new(self.origin, direction)
    }

    /// Casts a ray through the center of pixel `(px, py)`, `py` counting
    /// rows up from the bottom of the image.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Result<Ray, TraceError> {
        self.ray_through(px as f64 + 0.5, py as f64 + 0.5)
    }
}

#[test]
fn ray_through_center() {
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        90.0, 201, 101).unwrap();
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        90.0, 201, 101).unwrap();
    let r = c.ray_for_pixel(0, 0).unwrap();

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(-0.81513, -0.40757, -0.41164));
}

#[test]
fn ray_from_moved_camera() {
    let origin = Vector3::new(0.0, 2.0, -5.0);
    let c = Camera::new(origin, Vector3::new(1.0, 0.0, -1.0),
        90.0, 201, 101).unwrap();
    let r = c.ray_for_pixel(100, 50).unwrap();

    let k = 2.0f64.sqrt() / 2.0;
    assert_eq!(r.origin, origin);
    assert_eq!(r.direction, Vector3::new(k, 0.0, -k));
}

#[test]
fn basis_is_orthonormal() {
    let (f, r, u) = Camera::build_basis(Vector3::new(0.0, -0.8, -1.0)).unwrap();

    assert!(crate::feq(f.length(), 1.0));
    assert!(crate::feq(r.length(), 1.0));
    assert!(crate::feq(u.length(), 1.0));
    assert!(crate::feq(f.dot(&r), 0.0));
    assert!(crate::feq(f.dot(&u), 0.0));
    assert!(crate::feq(r.dot(&u), 0.0));
    assert!(u.y > 0.0);
}

#[test]
fn looking_straight_down_uses_alternate_reference() {
    let (f, r, u) = Camera::build_basis(Vector3::new(0.0, -3.0, 0.0)).unwrap();

    assert_eq!(f, Vector3::new(0.0, -1.0, 0.0));
    assert_eq!(r, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(u, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn zero_look_direction_is_degenerate() {
    assert_eq!(Camera::build_basis(Vector3::zero()),
        Err(TraceError::DegenerateBasis));
}

#[test]
fn invalid_camera_parameters() {
    let look = Vector3::new(0.0, 0.0, -1.0);

    assert!(Camera::new(Vector3::zero(), look, 0.0, 10, 10).is_err());
    assert!(Camera::new(Vector3::zero(), look, 180.0, 10, 10).is_err());
    assert!(Camera::new(Vector3::zero(), look, 60.0, 0, 10).is_err());
    assert!(Camera::new(Vector3::zero(), look, 60.0, 10, 0).is_err());
}
