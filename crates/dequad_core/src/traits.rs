use num_traits::{Float, FloatConst, FromPrimitive};
use std::convert::Infallible;
use std::fmt::{Debug, Display, LowerExp};
use std::marker::PhantomData;

/// A trait for types that can serve as the working arithmetic of the engine.
/// Must support the `Float` surface and the usual constants, print in plain
/// and scientific notation, and convert from f64.
pub trait Scalar: Float + FloatConst + FromPrimitive + Debug + Display + LowerExp + 'static {
    /// Converts an `f64` constant. Unrepresentable values become NaN.
    fn cast(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::nan)
    }

    /// Significant decimal digits carried by the representation.
    fn max_digits() -> u32 {
        (-Self::epsilon().log10()).floor().to_u32().unwrap_or(0)
    }

    /// Equality up to `tolerance`, taken both as an absolute and as a
    /// relative bound.
    fn almost_eq(self, other: Self, tolerance: Self) -> bool {
        let diff = (self - other).abs();
        if diff <= tolerance {
            return true;
        }
        diff <= tolerance * self.abs().max(other.abs())
    }
}

impl<T> Scalar for T where
    T: Float + FloatConst + FromPrimitive + Debug + Display + LowerExp + 'static
{
}

/// A real function of one real variable.
///
/// Evaluation may reject points outside the function's domain; the engine
/// never propagates such errors.
pub trait Integrand<T: Scalar> {
    type Error: Display;

    fn evaluate(&self, x: T) -> Result<T, Self::Error>;
}

impl<T: Scalar, F> Integrand<T> for F
where
    F: Fn(T) -> T,
{
    type Error = Infallible;

    fn evaluate(&self, x: T) -> Result<T, Infallible> {
        Ok(self(x))
    }
}

/// Wraps a closure that reports domain errors through `Result`.
pub struct Fallible<F, E> {
    function: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> Fallible<F, E> {
    pub fn new(function: F) -> Self {
        Self {
            function,
            _error: PhantomData,
        }
    }
}

impl<T: Scalar, E: Display, F> Integrand<T> for Fallible<F, E>
where
    F: Fn(T) -> Result<T, E>,
{
    type Error = E;

    fn evaluate(&self, x: T) -> Result<T, E> {
        (self.function)(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_carries_fifteen_digits() {
        assert_eq!(f64::max_digits(), 15);
    }

    #[test]
    fn almost_eq_uses_absolute_and_relative_tolerance() {
        let tolerance = 2f64.powi(-49);
        assert!(1e-16_f64.almost_eq(0.0, tolerance));
        assert!(!1e-10_f64.almost_eq(0.0, tolerance));
        assert!(1e20_f64.almost_eq(1e20 + 1e5, tolerance));
        assert!(!1.0_f64.almost_eq(1.0 + 1e-12, tolerance));
        assert!(1e-9_f64.almost_eq(0.0, 1e-6));
    }

    #[test]
    fn closures_and_fallible_closures_are_integrands() {
        let square = |x: f64| x * x;
        assert_eq!(square.evaluate(3.0), Ok(9.0));

        let checked =
            Fallible::new(|x: f64| if x > 0.0 { Ok(x.ln()) } else { Err("not positive") });
        assert!(checked.evaluate(1.0).is_ok());
        assert_eq!(checked.evaluate(-1.0), Err("not positive"));
    }
}
