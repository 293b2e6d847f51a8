//! Pixel units along the scroll axis.
//!
//! Every scroller works on a single horizontal axis. Offsets, deltas, cell
//! widths and viewport widths are all expressed as [`Px`], a signed integer
//! pixel count. Negative values are normal: a drag to the left produces a
//! negative delta, and the accumulated scroll target of a scroller may run
//! far below zero after a long drag.
//!
//! # Example
//!
//! ```
//! use dateslider::Px;
//!
//! let cell = Px::new(80);
//! let delta = Px::new(-30);
//!
//! assert_eq!((cell + delta).raw(), 50);
//! assert_eq!((cell / 2).raw(), 40);
//! assert_eq!(Px::saturating_from_f64(12.6), Px::new(13));
//! ```

use std::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};

/// A signed pixel distance on the scroll axis.
///
/// Arithmetic between two `Px` values and scaling by an `i32` follow plain
/// integer semantics, including truncating division and a remainder that
/// keeps the sign of the dividend. The scroller's recycling math relies on
/// exactly those semantics.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Px` from a raw pixel count.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw pixel count.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the absolute value as a `u32`.
    ///
    /// ```
    /// use dateslider::Px;
    ///
    /// assert_eq!(Px::new(-5).abs(), 5);
    /// ```
    pub fn abs(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Returns `-1`, `0` or `1` depending on the sign.
    pub fn signum(self) -> i32 {
        self.0.signum()
    }

    /// Converts to `f64` for fractional position math.
    pub fn to_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Creates a `Px` from an `f64`, rounding half away from zero and
    /// saturating at the `i32` bounds. `NaN` maps to zero.
    pub fn saturating_from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Px::ZERO;
        }
        let clamped = value
            .round()
            .clamp(f64::from(i32::MIN), f64::from(i32::MAX));
        Px(clamped as i32)
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Px {
    type Output = Px;

    fn add(self, rhs: Self) -> Self::Output {
        Px(self.0 + rhs.0)
    }
}

impl Sub for Px {
    type Output = Px;

    fn sub(self, rhs: Self) -> Self::Output {
        Px(self.0 - rhs.0)
    }
}

impl Neg for Px {
    type Output = Px;

    fn neg(self) -> Self::Output {
        Px(-self.0)
    }
}

impl Mul<i32> for Px {
    type Output = Px;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl Div<i32> for Px {
    type Output = Px;

    fn div(self, rhs: i32) -> Self::Output {
        Px(self.0 / rhs)
    }
}

/// Number of whole `rhs` widths contained in `self`, truncated toward zero.
impl Div for Px {
    type Output = i32;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl Rem for Px {
    type Output = Px;

    fn rem(self, rhs: Self) -> Self::Output {
        Px(self.0 % rhs.0)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl From<Px> for i32 {
    fn from(px: Px) -> Self {
        px.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_arithmetic() {
        let a = Px(10);
        let b = Px(4);

        assert_eq!(a + b, Px(14));
        assert_eq!(a - b, Px(6));
        assert_eq!(-a, Px(-10));
        assert_eq!(a * 3, Px(30));
        assert_eq!(a / 2, Px(5));
        assert_eq!(a / b, 2);
        assert_eq!(a % b, Px(2));
    }

    #[test]
    fn test_px_remainder_keeps_dividend_sign() {
        assert_eq!(Px(-7) % Px(5), Px(-2));
        assert_eq!(Px(-7) / Px(5), -1);
    }

    #[test]
    fn test_saturating_from_f64() {
        assert_eq!(Px::saturating_from_f64(f64::MAX), Px(i32::MAX));
        assert_eq!(Px::saturating_from_f64(f64::MIN), Px(i32::MIN));
        assert_eq!(Px::saturating_from_f64(100.5), Px(101));
        assert_eq!(Px::saturating_from_f64(-100.5), Px(-101));
        assert_eq!(Px::saturating_from_f64(f64::NAN), Px::ZERO);
    }

    #[test]
    fn test_px_saturating_arithmetic() {
        let max = Px(i32::MAX);
        let min = Px(i32::MIN);
        assert_eq!(max.saturating_add(Px(1)), max);
        assert_eq!(min.saturating_sub(Px(1)), min);
    }

    #[test]
    fn test_px_assign_ops() {
        let mut px = Px(10);
        px += Px(5);
        assert_eq!(px, Px(15));
        px -= Px(20);
        assert_eq!(px, Px(-5));
        assert_eq!(px.abs(), 5);
        assert_eq!(px.signum(), -1);
    }
}
