//! Runs the reference catalog and scores every result by correct digits.

use crate::catalog::ReferenceIntegral;
use crate::quadrature::DoubleExponential;
use crate::traits::Scalar;
use crate::transform::Variant;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::fmt;

/// Decimal digits on which `computed` agrees with `expected`, clamped to
/// `[0, digits]`.
///
/// For a zero reference the count is the magnitude of the residue. A
/// divergent reference scores nothing.
pub fn correct_digits<T: Scalar>(computed: T, expected: T, digits: u32) -> u32 {
    if !expected.is_finite() {
        return 0;
    }
    if expected.is_zero() {
        if computed.is_zero() {
            return digits;
        }
        return clamp_digits(-computed.abs().log10().round(), digits);
    }
    if computed == expected {
        return digits;
    }
    let agreement =
        expected.abs().log10().floor() - (computed - expected).abs().log10().floor();
    clamp_digits(agreement, digits)
}

fn clamp_digits<T: Scalar>(count: T, digits: u32) -> u32 {
    if count.is_nan() || count <= T::zero() {
        return 0;
    }
    count.to_u32().map_or(digits, |count| count.min(digits))
}

/// Result of one catalog record.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub index: usize,
    pub integrand: String,
    pub a: String,
    pub b: String,
    pub variant: Variant,
    pub evaluations: usize,
    pub level: usize,
    pub correct_digits: u32,
    pub reported_error: f64,
    pub true_error: f64,
    /// Computed value in scientific notation at the working precision.
    pub value: String,
    pub expected: String,
}

/// Totals over every case of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariantSummary {
    pub variant: Variant,
    pub evaluations: usize,
    pub correct_digits: u64,
    pub cases: usize,
}

impl VariantSummary {
    fn new(variant: Variant) -> Self {
        Self {
            variant,
            evaluations: 0,
            correct_digits: 0,
            cases: 0,
        }
    }

    /// Percentage of attainable digits reached, averaged over the cases.
    pub fn ratio(&self, digits: u32) -> f64 {
        100.0 * self.correct_digits as f64 / f64::from(digits) / self.cases.max(1) as f64
    }
}

/// Every case report plus per-variant totals.
#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    pub digits: u32,
    pub cases: Vec<CaseReport>,
    pub summaries: [VariantSummary; 3],
}

impl Scorecard {
    pub fn summary(&self, variant: Variant) -> &VariantSummary {
        &self.summaries[variant.index()]
    }

    pub fn total_evaluations(&self) -> usize {
        self.summaries.iter().map(|s| s.evaluations).sum()
    }
}

impl fmt::Display for Scorecard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.digits as usize + 6;
        writeln!(f, "#   TNFE Lvl CD err_r err_t {:<width$} I", "q")?;
        for case in &self.cases {
            writeln!(
                f,
                "{:03} {:04} {:02}  {:02} {:.0e} {:.0e} {:>width$} {}",
                case.index,
                case.evaluations,
                case.level,
                case.correct_digits,
                case.reported_error,
                case.true_error,
                case.value,
                case.expected,
            )?;
        }
        writeln!(f)?;
        for variant in [Variant::SinhSinh, Variant::ExpSinh, Variant::TanhSinh] {
            let summary = self.summary(variant);
            writeln!(
                f,
                "{}: {:05} - {:04} ({:02.0})",
                short_name(variant),
                summary.evaluations,
                summary.correct_digits,
                summary.ratio(self.digits)
            )?;
        }
        Ok(())
    }
}

fn short_name(variant: Variant) -> &'static str {
    match variant {
        Variant::TanhSinh => "TS",
        Variant::ExpSinh => "ES",
        Variant::SinhSinh => "SS",
    }
}

/// Integrates every record with `engine` and scores the results.
///
/// Fails only when a record does not compile.
pub fn run_catalog<T: Scalar>(
    engine: &DoubleExponential<T>,
    records: &[ReferenceIntegral],
) -> Result<Scorecard> {
    let digits = engine.digits();
    let precision = digits.saturating_sub(1) as usize;
    let mut summaries = Variant::ALL.map(VariantSummary::new);
    let mut cases = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let compiled = record
            .compile::<T>()
            .with_context(|| format!("catalog entry {index} ({record}) does not compile"))?;
        let result = engine.integrate(&compiled.integrand, compiled.a, compiled.b);
        let digits_ok = correct_digits(result.value, compiled.expected, digits);

        let summary = &mut summaries[result.variant.index()];
        summary.evaluations += result.evaluations;
        summary.correct_digits += u64::from(digits_ok);
        summary.cases += 1;

        let report = CaseReport {
            index,
            integrand: record.integrand.to_string(),
            a: record.a.to_string(),
            b: record.b.to_string(),
            variant: result.variant,
            evaluations: result.evaluations,
            level: result.level,
            correct_digits: digits_ok,
            reported_error: result.error.to_f64().unwrap_or(f64::NAN),
            true_error: (result.value - compiled.expected)
                .abs()
                .to_f64()
                .unwrap_or(f64::NAN),
            value: format!("{:+.*e}", precision, result.value),
            expected: format!("{:+.*e}", precision, compiled.expected),
        };
        info!(
            "case {:03} [{}] {} evaluations, level {}, {} digits: {}",
            index, report.variant, report.evaluations, report.level, digits_ok, record
        );
        cases.push(report);
    }

    Ok(Scorecard {
        digits,
        cases,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use std::f64::consts::PI;

    #[test]
    fn digits_against_nonzero_reference() {
        assert_eq!(correct_digits(3.14159, PI, 15), 6);
        assert_eq!(correct_digits(PI, PI, 15), 15);
        assert_eq!(correct_digits(PI + 1e-20, PI, 15), 15);
        assert_eq!(correct_digits(-PI, PI, 15), 0);
        assert_eq!(correct_digits(f64::NAN, PI, 15), 0);
        assert_eq!(correct_digits(f64::INFINITY, PI, 15), 0);
    }

    #[test]
    fn digits_against_zero_reference() {
        assert_eq!(correct_digits(0.0, 0.0, 15), 15);
        assert_eq!(correct_digits(1e-3, 0.0, 15), 3);
        assert_eq!(correct_digits(-2e-7, 0.0, 15), 7);
        assert_eq!(correct_digits(1e-20, 0.0, 15), 15);
        assert_eq!(correct_digits(10.0, 0.0, 15), 0);
    }

    #[test]
    fn divergent_reference_scores_nothing() {
        assert_eq!(correct_digits(40.0, f64::INFINITY, 15), 0);
        assert_eq!(correct_digits(0.0, f64::NAN, 15), 0);
    }

    #[test]
    fn ratio_averages_over_cases() {
        let summary = VariantSummary {
            variant: Variant::TanhSinh,
            evaluations: 100,
            correct_digits: 30,
            cases: 2,
        };
        assert_eq!(summary.ratio(15), 100.0);
        assert_eq!(VariantSummary::new(Variant::ExpSinh).ratio(15), 0.0);
    }

    #[test]
    fn full_catalog_run_is_consistent() {
        let engine = DoubleExponential::<f64>::default();
        let scorecard = run_catalog(&engine, CATALOG).expect("catalog compiles");
        assert_eq!(scorecard.cases.len(), CATALOG.len());

        let counted: usize = scorecard.summaries.iter().map(|s| s.cases).sum();
        assert_eq!(counted, CATALOG.len());
        let evaluations: usize = scorecard.cases.iter().map(|c| c.evaluations).sum();
        assert_eq!(evaluations, scorecard.total_evaluations());

        for case in &scorecard.cases {
            assert!(case.correct_digits <= 15);
            assert!(case.level <= engine.max_level());
            assert_eq!(case.evaluations % 2, 1, "case {}", case.index);
        }

        let lorentzian = scorecard
            .cases
            .iter()
            .find(|c| c.integrand == "1/(1 + x**2)" && c.a == "-inf")
            .expect("lorentzian case present");
        assert!(lorentzian.correct_digits >= 12);

        let divergent = scorecard
            .cases
            .iter()
            .find(|c| c.integrand == "1/x")
            .expect("divergent case present");
        assert_eq!(divergent.correct_digits, 0);

        let table = scorecard.to_string();
        assert!(table.starts_with("#   TNFE Lvl CD"));
        assert!(table.contains("\nSS: "));
    }

    #[test]
    fn broken_record_reports_context() {
        let records = [ReferenceIntegral {
            a: "0",
            b: "1",
            expected: "1",
            integrand: "gamma(x)",
        }];
        let engine = DoubleExponential::<f64>::default();
        let err = run_catalog(&engine, &records).expect_err("unknown function");
        let message = format!("{err:#}");
        assert!(message.contains("catalog entry 0"));
        assert!(message.contains("gamma"));
    }
}
