use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::vector::Vector3;

/// A function from a world-space point to a color.
pub type ColorFn = dyn Fn(Vector3) -> Color + Send + Sync;

/// A material color: either a constant, or a procedure evaluated at the hit
/// point (a checkerboard, for instance).
#[derive(Clone)]
pub enum MaterialColor {
    Constant(Color),
    Procedural(Arc<ColorFn>),
}

impl MaterialColor {
    pub fn procedural<F>(f: F) -> MaterialColor
    where
        F: Fn(Vector3) -> Color + Send + Sync + 'static,
    {
        MaterialColor::Procedural(Arc::new(f))
    }

    /// Resolves the color at a point.
    pub fn color_at(&self, point: Vector3) -> Color {
        match self {
            MaterialColor::Constant(c) => *c,
            MaterialColor::Procedural(f) => f(point),
        }
    }
}

impl Default for MaterialColor {
    fn default() -> MaterialColor {
        MaterialColor::Constant(Color::white())
    }
}

impl From<Color> for MaterialColor {
    fn from(c: Color) -> MaterialColor {
        MaterialColor::Constant(c)
    }
}

impl fmt::Debug for MaterialColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialColor::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            MaterialColor::Procedural(_) => f.write_str("Procedural(..)"),
        }
    }
}

/// Which cell of a checkerboard laid out on the XZ plane a point falls in.
///
/// `scale` is the number of cells per world unit. Coordinates are truncated
/// toward zero before taking the parity, so the two cells adjacent to each
/// axis share a color.
pub fn checker_parity(p: Vector3, scale: f64) -> bool {
    let cell = |v: f64| ((v * scale).trunc() as i64).rem_euclid(2);
    cell(p.x) == cell(p.z)
}

/// An alternating checkerboard on the XZ plane.
///
/// For a point `(x, y, z)`, the `even` color is used where
/// `int(x * scale) % 2 == int(z * scale) % 2`, and `odd` elsewhere.
pub fn checker(even: Color, odd: Color, scale: f64) -> MaterialColor {
    MaterialColor::procedural(move |p| {
        if checker_parity(p, scale) { even } else { odd }
    })
}

#[test]
fn constant_color_ignores_point() {
    let c = MaterialColor::Constant(Color::red());

    assert_eq!(c.color_at(Vector3::new(0.0, 0.0, 0.0)), Color::red());
    assert_eq!(c.color_at(Vector3::new(5.0, -3.0, 1.0)), Color::red());
}

#[test]
fn checker_is_constant_along_y() {
    let pattern = checker(Color::white(), Color::black(), 2.0);

    assert_eq!(pattern.color_at(Vector3::new(0.1, 0.0, 0.1)), Color::white());
    assert_eq!(pattern.color_at(Vector3::new(0.1, 1.0, 0.1)), Color::white());
    assert_eq!(pattern.color_at(Vector3::new(0.1, 2.0, 0.1)), Color::white());
}

#[test]
fn checker_alternates_along_x_and_z() {
    let pattern = checker(Color::white(), Color::black(), 2.0);

    assert_eq!(pattern.color_at(Vector3::new(0.25, 0.0, 0.25)), Color::white());
    assert_eq!(pattern.color_at(Vector3::new(0.75, 0.0, 0.25)), Color::black());
    assert_eq!(pattern.color_at(Vector3::new(0.75, 0.0, 0.75)), Color::white());
    assert_eq!(pattern.color_at(Vector3::new(1.25, 0.0, 0.75)), Color::black());
}

#[test]
fn checker_truncates_toward_zero() {
    // -0.25 * 2 truncates to 0, the same cell as +0.25
    let pattern = checker(Color::white(), Color::black(), 2.0);

    assert_eq!(pattern.color_at(Vector3::new(-0.25, 0.0, 0.25)), Color::white());
    assert_eq!(pattern.color_at(Vector3::new(-0.75, 0.0, 0.25)), Color::black());
}
