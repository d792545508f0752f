use std::ops::{ Add, AddAssign, Sub, Mul };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. While tracing, components
/// are unbounded so that reflections can blend unclamped energy; they are
/// only clamped to 0.0..=1.0 when written to a `FrameBuffer`.
///
/// # Examples
///
/// Blend a surface color with a reflected color:
///
/// ```
/// # use whitted::color::Color;
/// let local = Color::red();
/// let reflected = Color::blue();
/// let blend = Color::lerp(&local, &reflected, 0.5);
/// assert_eq!(blend, Color::rgb(0.5, 0.0, 0.5));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl From<Color> for [f64; 3] {
    fn from(c: Color) -> [f64; 3] {
        [c.r, c.g, c.b]
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Creates a gray color with all three components equal to `v`.
    pub const fn gray(v: f64) -> Color {
        Color { r: v, g: v, b: v }
    }

    /// The color black.
    pub const fn black() -> Color {
        Color::gray(0.0)
    }

    /// The color white.
    pub const fn white() -> Color {
        Color::gray(1.0)
    }

    /// The color red.
    pub const fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    /// The color green.
    pub const fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    /// The color blue.
    pub const fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// Whether every component is exactly zero.
    ///
    /// Used to decide if a primitive emits light, so no tolerance is applied.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Clamps every component to the range `0.0..=1.0`.
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// The hadamard product multiplies each component of the two colors, and
    /// yields a new color containing those products.
    ///
    /// ```
    /// # use whitted::color::Color;
    /// let yellow = Color::rgb(1.0, 1.0, 0.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// assert_eq!(Color::hadamard(&yellow, &purple), Color::red());
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Linear blend, `(1 - t) * c1 + t * c2`.
    pub fn lerp(c1: &Color, c2: &Color, t: f64) -> Color {
        *c1 * (1.0 - t) + *c2 * t
    }
}

/// Adds two colors together.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

/// Subtracts one color from another.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * 2.0, Color::rgb(2.0, 0.4, 0.8));
    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn clamp_out_of_range() {
    let c = Color::rgb(1.5, -0.25, 0.5);

    assert_eq!(c.clamp(), Color::rgb(1.0, 0.0, 0.5));
}

#[test]
fn black_is_not_emissive() {
    assert!(Color::black().is_black());
    assert!(!Color::rgb(0.0, 0.0, 1e-9).is_black());
}
