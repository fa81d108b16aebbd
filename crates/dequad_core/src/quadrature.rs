//! Double-exponential quadrature over finite and infinite intervals.
//!
//! The engine refines a trapezoidal sum in the transformed variable, halving
//! the step each level and only evaluating the new abscissas. Iteration stops
//! when the last level contributed about half of the running sum (the
//! signature of a converged trapezoidal rule) or when the level cap is hit.

use crate::error::PrecisionError;
use crate::precision::{Precision, QuadratureSettings};
use crate::traits::{Integrand, Scalar};
use crate::transform::{Transform, Variant};
use log::{debug, trace};
use serde::Serialize;

/// Outcome of one integration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quadrature<T> {
    /// The integral, or zero when roundoff dominated the estimate.
    pub value: T,
    pub error: T,
    /// Total integrand calls, fallbacks included. Always odd for a real run.
    pub evaluations: usize,
    /// Last refinement level visited.
    pub level: usize,
    pub variant: Variant,
    /// Estimate after each completed level; the last entry is the final one.
    pub level_estimates: Vec<T>,
    pub failed_evaluations: usize,
    pub non_normal_evaluations: usize,
    pub roundoff_dominated: bool,
}

impl<T: Scalar> Quadrature<T> {
    fn degenerate(value: T) -> Self {
        Self {
            value,
            error: value,
            evaluations: 0,
            level: 0,
            variant: Variant::TanhSinh,
            level_estimates: Vec::new(),
            failed_evaluations: 0,
            non_normal_evaluations: 0,
            roundoff_dominated: false,
        }
    }
}

/// A guarded integrand value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample<T> {
    /// Zero or a normal number.
    Value(T),
    /// The integrand reported an error.
    Failed,
    /// NaN, infinity or a subnormal number.
    NonNormal,
}

impl<T: Scalar> Sample<T> {
    pub fn of<F: Integrand<T> + ?Sized>(f: &F, x: T) -> Self {
        match f.evaluate(x) {
            Ok(y) if y.is_zero() || y.is_normal() => Sample::Value(y),
            Ok(y) => {
                trace!("non-normal value {} at x = {}", y, x);
                Sample::NonNormal
            }
            Err(err) => {
                trace!("evaluation failed at x = {}: {}", x, err);
                Sample::Failed
            }
        }
    }

    /// The contribution to the sum; fallbacks contribute nothing.
    pub fn contribution(self) -> T {
        match self {
            Sample::Value(y) => y,
            Sample::Failed | Sample::NonNormal => T::zero(),
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    evaluations: usize,
    failed: usize,
    non_normal: usize,
}

impl Tally {
    fn sample<T: Scalar, F: Integrand<T> + ?Sized>(&mut self, f: &F, x: T) -> T {
        self.evaluations += 1;
        let sample = Sample::of(f, x);
        match sample {
            Sample::Value(_) => {}
            Sample::Failed => self.failed += 1,
            Sample::NonNormal => self.non_normal += 1,
        }
        sample.contribution()
    }
}

/// A double-exponential integrator bound to one working precision.
///
/// All precision-derived constants are computed once here, so an engine can
/// be reused for many integrals and shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleExponential<T> {
    settings: QuadratureSettings,
    eps: T,
    eps_centered: T,
    threshold: T,
    tolerance: T,
    max_level: usize,
}

impl<T: Scalar> DoubleExponential<T> {
    /// Fails if `T` cannot carry the requested number of digits.
    pub fn new(settings: QuadratureSettings) -> Result<Self, PrecisionError> {
        settings.precision.check::<T>()?;
        Ok(Self::build(settings))
    }

    pub fn with_digits(digits: u32) -> Result<Self, PrecisionError> {
        Self::new(QuadratureSettings::new(Precision::from_digits(digits)?))
    }

    fn build(settings: QuadratureSettings) -> Self {
        let digits = settings.precision.digits();
        let ten = T::cast(10.0);
        let eps = ten.powi(-(digits as i32));

        // 10^-((digits/2)^2), split so the integer part goes through powi.
        let squared = digits * digits;
        let mut eps_centered = ten.powi(-((squared / 4) as i32));
        if squared % 4 != 0 {
            eps_centered = eps_centered * ten.powf(T::cast(-f64::from(squared % 4) / 4.0));
        }

        Self {
            settings,
            eps,
            eps_centered,
            threshold: ten * eps.sqrt(),
            tolerance: settings.precision.tolerance(),
            max_level: settings.max_level(),
        }
    }

    pub fn settings(&self) -> &QuadratureSettings {
        &self.settings
    }

    pub fn digits(&self) -> u32 {
        self.settings.precision.digits()
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Integrates `f` from `a` to `b`.
    ///
    /// Never fails: a NaN endpoint yields a NaN result, an empty interval a
    /// zero one, and integrand failures contribute zero.
    pub fn integrate<F>(&self, f: &F, a: T, b: T) -> Quadrature<T>
    where
        F: Integrand<T> + ?Sized,
    {
        if a.is_nan() || b.is_nan() {
            return Quadrature::degenerate(T::nan());
        }
        if a == b {
            return Quadrature::degenerate(T::zero());
        }

        let transform = Transform::select(a, b, self.tolerance);
        let eps = if transform.centered_at_zero() {
            self.eps_centered
        } else {
            self.eps
        };
        let exp_t_max = transform.exp_t_max(eps);
        let factor = transform.scale() * T::FRAC_PI_2();
        let two = T::cast(2.0);

        let mut tally = Tally::default();
        let mut level_estimates = Vec::with_capacity(self.max_level + 1);
        let mut sum = T::zero();
        let mut h = two;
        let mut level = 0;
        let mut previous: T;

        loop {
            previous = transform.orient(sum * h * factor);
            if level > 0 {
                level_estimates.push(previous);
            }
            h = h / two;
            let mut exp_t = h.exp();
            let growth = if level > 0 { exp_t * exp_t } else { exp_t };

            let mut level_sum = T::zero();
            loop {
                let node = transform.node(exp_t);
                if !(node.abscissa.is_finite() && node.weight.is_finite()) {
                    trace!("abscissas left the representable range at exp(t) = {}", exp_t);
                    break;
                }
                let (upper, lower) = transform.points(&node);
                let f_upper = tally.sample(f, upper);
                let f_lower = tally.sample(f, lower);
                let term = transform.combine(&node, f_upper, f_lower) * node.cosh_t;
                level_sum = level_sum + term;

                exp_t = exp_t * growth;
                if exp_t > exp_t_max || term.abs() <= (eps * level_sum).abs() {
                    break;
                }
            }

            sum = sum + level_sum;
            if level == 0 {
                sum = sum + tally.sample(f, transform.center_point());
            }
            debug!(
                "{} level {}: sum {}, {} evaluations",
                transform.variant(),
                level,
                sum,
                tally.evaluations
            );

            let converged =
                sum.is_zero() || (two * level_sum.abs() - sum.abs()).abs() < (self.threshold * sum).abs();
            if converged || level == self.max_level {
                break;
            }
            level += 1;
        }

        let mut value = transform.orient(sum * h * factor);
        level_estimates.push(value);
        let mut error = (previous - value).abs();
        let roundoff_dominated = T::cast(10.0) * error >= value.abs();
        if roundoff_dominated {
            error = error + value.abs();
            value = T::zero();
        }
        debug!(
            "{} finished at level {}: {} ± {} after {} evaluations",
            transform.variant(),
            level,
            value,
            error,
            tally.evaluations
        );

        Quadrature {
            value,
            error,
            evaluations: tally.evaluations,
            level,
            variant: transform.variant(),
            level_estimates,
            failed_evaluations: tally.failed,
            non_normal_evaluations: tally.non_normal,
            roundoff_dominated,
        }
    }
}

impl<T: Scalar> Default for DoubleExponential<T> {
    /// Full native precision of `T`.
    fn default() -> Self {
        Self::build(QuadratureSettings::native::<T>())
    }
}

/// Integrates `f` from `a` to `b` at the native precision of `T`.
pub fn integrate<T, F>(f: &F, a: T, b: T) -> Quadrature<T>
where
    T: Scalar,
    F: Integrand<T> + ?Sized,
{
    DoubleExponential::default().integrate(f, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::double_double::DoubleDouble;
    use crate::traits::Fallible;
    use approx::assert_relative_eq;
    use num_traits::{Float, FloatConst};
    use std::f64::consts::PI;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn lorentzian_over_the_real_line_is_pi() {
        let result = integrate(&|x: f64| 1.0 / (1.0 + x * x), -INF, INF);
        assert_eq!(result.variant, Variant::SinhSinh);
        assert_relative_eq!(result.value, PI, max_relative = 1e-10);
        assert!(!result.roundoff_dominated);
    }

    #[test]
    fn decaying_exponential_on_half_line() {
        let result = integrate(&|x: f64| (-3.0 * x).exp(), 0.0, INF);
        assert_eq!(result.variant, Variant::ExpSinh);
        assert_relative_eq!(result.value, 1.0 / 3.0, max_relative = 1e-10);
    }

    #[test]
    fn square_root_on_unit_interval() {
        let result = integrate(&|x: f64| x.sqrt(), 0.0, 1.0);
        assert_eq!(result.variant, Variant::TanhSinh);
        assert_relative_eq!(result.value, 2.0 / 3.0, max_relative = 1e-10);
        assert!(result.error < 1e-6);
    }

    #[test]
    fn shifted_half_line_uses_offset_bound() {
        let result = integrate(&|x: f64| (-x).exp(), 2.0, INF);
        assert_relative_eq!(result.value, (-2.0f64).exp(), max_relative = 1e-10);
    }

    #[test]
    fn roundoff_dominated_zero_carries_the_summed_error() {
        let result = integrate(&|x: f64| x.cos(), -PI, PI);
        assert!(result.roundoff_dominated);
        assert_eq!(result.value, 0.0);
        let n = result.level_estimates.len();
        assert!(n >= 2);
        let last = result.level_estimates[n - 1];
        let before = result.level_estimates[n - 2];
        assert_eq!(result.error, (before - last).abs() + last.abs());
        assert!(result.error < 1e-6);
    }

    #[test]
    fn huge_finite_interval_does_not_overflow() {
        let result = integrate(&|_x: f64| 1.0, 0.0, 1e308);
        assert_eq!(result.variant, Variant::TanhSinh);
        assert!(result.value.is_finite());
        assert_relative_eq!(result.value, 1e308, max_relative = 1e-10);
        assert!(result.error.is_finite());
    }

    #[test]
    fn odd_integrand_sums_to_exact_zero_on_first_level() {
        let result = integrate(&|x: f64| x, -1.0, 1.0);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.error, 0.0);
        assert_eq!(result.level, 0);
        assert_eq!(result.evaluations, 3);
        assert_eq!(result.level_estimates, vec![0.0]);
        assert!(result.roundoff_dominated);
    }

    #[test]
    fn endpoint_singularity_does_not_fail() {
        let result = integrate(&|x: f64| 1.0 / x, 0.0, 1.0);
        assert!(result.value.is_finite());
        assert!(result.error.is_finite());
        assert!(result.value.abs() > 10.0 || result.error > 10.0);
    }

    #[test]
    fn reversing_the_interval_negates_the_result() {
        let f = |x: f64| (-x * x).exp();
        let cases = [(0.0, 2.0), (0.0, INF), (-INF, 1.0), (-INF, INF)];
        for (a, b) in cases {
            let forward = integrate(&f, a, b);
            let backward = integrate(&f, b, a);
            assert_eq!(forward.value, -backward.value, "interval ({a}, {b})");
            assert_eq!(forward.evaluations, backward.evaluations);
            assert_eq!(forward.variant, backward.variant);
        }
    }

    #[test]
    fn gaussian_over_negative_half_line() {
        let result = integrate(&|x: f64| (-x * x).exp(), -INF, 0.0);
        assert_eq!(result.variant, Variant::ExpSinh);
        assert_relative_eq!(result.value, PI.sqrt() / 2.0, max_relative = 1e-10);
    }

    #[test]
    fn degenerate_intervals_short_circuit() {
        let calls = std::cell::Cell::new(0);
        let f = |x: f64| {
            calls.set(calls.get() + 1);
            x
        };

        let empty = integrate(&f, 1.5, 1.5);
        assert_eq!(empty.value, 0.0);
        assert_eq!(empty.error, 0.0);
        assert_eq!(empty.evaluations, 0);
        assert_eq!(empty.level, 0);
        assert_eq!(empty.variant, Variant::TanhSinh);
        assert!(empty.level_estimates.is_empty());

        let undefined = integrate(&f, f64::NAN, 1.0);
        assert!(undefined.value.is_nan());
        assert!(undefined.error.is_nan());
        assert_eq!(undefined.evaluations, 0);
        assert_eq!(undefined.variant, Variant::TanhSinh);
        assert!(undefined.level_estimates.is_empty());

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn level_and_evaluation_invariants() {
        let engine = DoubleExponential::<f64>::default();
        let integrands: [(fn(f64) -> f64, f64, f64); 4] = [
            (|x| x.sqrt(), 0.0, 1.0),
            (|x| 1.0 / (1.0 + x * x), -INF, INF),
            (|x| (-x).exp() * x.sin(), 0.0, INF),
            (|x| x.ln(), 0.0, 1.0),
        ];
        for (f, a, b) in integrands {
            let result = engine.integrate(&f, a, b);
            assert!(result.level <= engine.max_level());
            assert_eq!(result.evaluations % 2, 1);
            assert_eq!(result.level_estimates.len(), result.level + 1);
        }
    }

    #[test]
    fn failed_and_non_normal_samples_are_counted() {
        let checked = Fallible::new(|x: f64| if x < 0.0 { Err("negative") } else { Ok(x) });
        let result = integrate(&checked, -1.0, 1.0);
        assert!(result.failed_evaluations > 0);
        assert_eq!(result.non_normal_evaluations, 0);
        assert!(result.value.is_finite());

        let poisoned = |x: f64| if x > 0.5 { f64::NAN } else { 1.0 };
        let result = integrate(&poisoned, 0.0, 1.0);
        assert!(result.non_normal_evaluations > 0);
        assert_eq!(result.failed_evaluations, 0);
        assert!(result.value.is_finite());
    }

    #[test]
    fn guard_classifies_samples() {
        let f = |x: f64| x;
        assert_eq!(Sample::of(&f, 0.0), Sample::Value(0.0));
        assert_eq!(Sample::of(&f, 2.0), Sample::Value(2.0));
        assert_eq!(Sample::of(&f, f64::INFINITY), Sample::NonNormal);
        assert_eq!(Sample::of(&f, f64::MIN_POSITIVE / 4.0), Sample::NonNormal);
        assert_eq!(Sample::<f64>::Failed.contribution(), 0.0);
    }

    #[test]
    fn precision_is_checked_against_the_arithmetic() {
        assert!(DoubleExponential::<f64>::with_digits(15).is_ok());
        assert_eq!(
            DoubleExponential::<f64>::with_digits(20),
            Err(PrecisionError::Unsupported {
                requested: 20,
                available: 15
            })
        );
        assert_eq!(
            DoubleExponential::<f64>::with_digits(0),
            Err(PrecisionError::Empty)
        );
    }

    #[test]
    fn lower_precision_needs_fewer_evaluations() {
        let f = |x: f64| 1.0 / (1.0 + x * x);
        let coarse = DoubleExponential::<f64>::with_digits(6)
            .expect("6 digits fit in f64")
            .integrate(&f, 0.0, 1.0);
        let fine = integrate(&f, 0.0, 1.0);
        assert!(coarse.evaluations <= fine.evaluations);
        assert_relative_eq!(coarse.value, PI / 4.0, max_relative = 1e-4);
    }

    #[test]
    fn double_double_reaches_beyond_f64() {
        let engine = DoubleExponential::<DoubleDouble>::default();
        assert_eq!(engine.digits(), 31);
        let one = DoubleDouble::from(1.0);
        let result = engine.integrate(
            &|x: DoubleDouble| one / (one + x * x),
            DoubleDouble::from(-INF),
            DoubleDouble::from(INF),
        );
        let error = (result.value - DoubleDouble::PI()).abs();
        assert!(f64::from(error) < 1e-18, "error {error:e}");
    }

    #[test]
    fn result_serializes_with_variant_name() {
        let result = integrate(&|x: f64| x * x, 0.0, 1.0);
        let json = serde_json::to_string(&result).expect("serializable");
        assert!(json.contains("\"variant\":\"tanh-sinh\""));
    }
}
