//! Working precision, carried explicitly into every integration.

use crate::error::PrecisionError;
use crate::traits::Scalar;
use serde::{Deserialize, Serialize};

/// Refinement levels added to `round(log2(digits))` by default.
pub const DEFAULT_EXTRA_LEVELS: usize = 1;

/// Looser level cap; trades evaluations for a little more accuracy.
pub const LOOSE_EXTRA_LEVELS: usize = 2;

const BITS_PER_DIGIT: f64 = 3.321_928_094_887_362_6;

/// Number of significant decimal digits the engine works to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    digits: u32,
}

impl Precision {
    pub fn from_digits(digits: u32) -> Result<Self, PrecisionError> {
        if digits == 0 {
            return Err(PrecisionError::Empty);
        }
        Ok(Self { digits })
    }

    /// Converts a binary precision to the decimal digits it reliably carries.
    pub fn from_bits(bits: u32) -> Result<Self, PrecisionError> {
        if bits == 0 {
            return Err(PrecisionError::Empty);
        }
        let digits = (f64::from(bits) / BITS_PER_DIGIT).round() as i64 - 1;
        Self::from_digits(digits.max(1) as u32)
    }

    /// Full precision of the arithmetic `T`.
    pub fn native<T: Scalar>() -> Self {
        Self {
            digits: T::max_digits().max(1),
        }
    }

    pub fn digits(self) -> u32 {
        self.digits
    }

    /// Binary precision needed to hold `digits` decimal digits.
    pub fn bits(self) -> u32 {
        ((f64::from(self.digits) + 1.0) * BITS_PER_DIGIT).round() as u32
    }

    /// Tolerance for treating two values as equal at this precision:
    /// `2^(4 - bits)`, sixteen units in the last place.
    pub fn tolerance<T: Scalar>(self) -> T {
        T::cast(2.0).powi(4 - self.bits() as i32)
    }

    /// Fails when `T` cannot carry this many digits.
    pub fn check<T: Scalar>(self) -> Result<(), PrecisionError> {
        if self.digits == 0 {
            return Err(PrecisionError::Empty);
        }
        let available = T::max_digits();
        if self.digits > available {
            return Err(PrecisionError::Unsupported {
                requested: self.digits,
                available,
            });
        }
        Ok(())
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::native::<f64>()
    }
}

/// Settings controlling a double-exponential integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadratureSettings {
    pub precision: Precision,
    /// Added to `round(log2(digits))` to obtain the maximum refinement level.
    #[serde(default = "default_extra_levels")]
    pub extra_levels: usize,
}

fn default_extra_levels() -> usize {
    DEFAULT_EXTRA_LEVELS
}

impl QuadratureSettings {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            extra_levels: DEFAULT_EXTRA_LEVELS,
        }
    }

    pub fn native<T: Scalar>() -> Self {
        Self::new(Precision::native::<T>())
    }

    pub fn with_extra_levels(mut self, extra_levels: usize) -> Self {
        self.extra_levels = extra_levels;
        self
    }

    /// Highest refinement level the iteration may reach.
    pub fn max_level(&self) -> usize {
        f64::from(self.precision.digits()).log2().round() as usize + self.extra_levels
    }
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::double_double::DoubleDouble;

    #[test]
    fn bits_convert_like_binary_to_decimal_precision() {
        assert_eq!(Precision::from_bits(53).unwrap().digits(), 15);
        assert_eq!(Precision::from_bits(106).unwrap().digits(), 31);
        assert_eq!(Precision::from_bits(1).unwrap().digits(), 1);
        assert_eq!(Precision::from_digits(15).unwrap().bits(), 53);
        assert_eq!(Precision::from_bits(0), Err(PrecisionError::Empty));
        assert_eq!(Precision::from_digits(0), Err(PrecisionError::Empty));
    }

    #[test]
    fn tolerance_scales_with_the_digits() {
        let native: f64 = Precision::from_digits(15).unwrap().tolerance();
        assert_eq!(native, 2f64.powi(-49));
        let coarse: f64 = Precision::from_digits(6).unwrap().tolerance();
        assert_eq!(coarse, 2f64.powi(-19));
    }

    #[test]
    fn native_precision_follows_the_arithmetic() {
        assert_eq!(Precision::native::<f64>().digits(), 15);
        assert_eq!(Precision::native::<DoubleDouble>().digits(), 31);
    }

    #[test]
    fn check_rejects_digits_beyond_the_arithmetic() {
        let precision = Precision::from_digits(20).unwrap();
        assert_eq!(
            precision.check::<f64>(),
            Err(PrecisionError::Unsupported {
                requested: 20,
                available: 15
            })
        );
        assert!(precision.check::<DoubleDouble>().is_ok());
    }

    #[test]
    fn level_cap_is_rounded_log2_plus_extra() {
        let settings = QuadratureSettings::default();
        assert_eq!(settings.max_level(), 5);
        assert_eq!(settings.with_extra_levels(LOOSE_EXTRA_LEVELS).max_level(), 6);
        assert_eq!(QuadratureSettings::native::<DoubleDouble>().max_level(), 6);
        let coarse = QuadratureSettings::new(Precision::from_digits(5).unwrap());
        assert_eq!(coarse.max_level(), 3);
    }
}
