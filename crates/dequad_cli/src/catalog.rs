use crate::Arithmetic;
use anyhow::{Context, Result};
use clap::Parser;
use dequad_core::catalog::CATALOG;
use dequad_core::harness::{run_catalog, Scorecard};
use dequad_core::precision::DEFAULT_EXTRA_LEVELS;
use dequad_core::{DoubleDouble, DoubleExponential, Precision, QuadratureSettings, Scalar};
use log::info;

/// Arguments of the `dequad-catalog` binary.
#[derive(Debug, Parser)]
#[command(name = "dequad-catalog")]
#[command(about = "Integrates the reference catalog and reports correct digits per case and per variant")]
pub struct CatalogArgs {
    /// Decimal digits of the computation
    #[arg(short, long)]
    pub digits: Option<u32>,

    /// Working arithmetic
    #[arg(long, value_enum, default_value_t = Arithmetic::Auto)]
    pub arithmetic: Arithmetic,

    /// Levels allowed beyond round(log2(digits))
    #[arg(long, default_value_t = DEFAULT_EXTRA_LEVELS)]
    pub extra_levels: usize,

    /// Only run the first N catalog entries
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print the scorecard as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the catalog and renders the scorecard.
pub fn run(args: &CatalogArgs) -> Result<String> {
    let requested = args.digits.map(Precision::from_digits).transpose()?;
    let arithmetic = args.arithmetic.resolve(requested);
    let precision = requested.unwrap_or_else(|| arithmetic.native_precision());
    let settings = QuadratureSettings::new(precision).with_extra_levels(args.extra_levels);

    let scorecard = match arithmetic {
        Arithmetic::DoubleDouble => score::<DoubleDouble>(settings, args.limit)?,
        Arithmetic::Auto | Arithmetic::F64 => score::<f64>(settings, args.limit)?,
    };
    info!(
        "{} cases, {} evaluations in total",
        scorecard.cases.len(),
        scorecard.total_evaluations()
    );

    if args.json {
        return serde_json::to_string_pretty(&scorecard).context("serializing scorecard");
    }
    Ok(scorecard.to_string())
}

fn score<T: Scalar>(settings: QuadratureSettings, limit: Option<usize>) -> Result<Scorecard> {
    let digits = settings.precision.digits();
    let engine = DoubleExponential::<T>::new(settings)
        .with_context(|| format!("cannot compute with {digits} digits"))?;
    let records = &CATALOG[..limit.unwrap_or(CATALOG.len()).min(CATALOG.len())];
    run_catalog(&engine, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_the_whole_catalog_in_f64() {
        let args = CatalogArgs::try_parse_from(["dequad-catalog"]).expect("valid arguments");
        assert_eq!(args.digits, None);
        assert_eq!(args.arithmetic, Arithmetic::Auto);
        assert_eq!(args.limit, None);
    }

    #[test]
    fn limited_run_prints_table_and_totals() {
        let args = CatalogArgs::try_parse_from(["dequad-catalog", "--limit", "3", "-d", "12"])
            .expect("valid arguments");
        let output = run(&args).expect("catalog runs");
        assert!(output.starts_with("#   TNFE"));
        assert!(output.contains("\n000 "));
        assert!(output.contains("\n002 "));
        assert!(!output.contains("\n003 "));
        assert!(output.contains("SS: "));
        assert!(output.contains("ES: "));
        assert!(output.contains("TS: "));
    }

    #[test]
    fn json_scorecard_lists_cases() {
        let args = CatalogArgs::try_parse_from(["dequad-catalog", "--limit", "2", "--json"])
            .expect("valid arguments");
        let output = run(&args).expect("catalog runs");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["digits"], 15);
        assert_eq!(value["cases"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["summaries"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn double_double_catalog_prefix() {
        let args = CatalogArgs::try_parse_from([
            "dequad-catalog",
            "--arithmetic",
            "double-double",
            "--limit",
            "1",
        ])
        .expect("valid arguments");
        let output = run(&args).expect("catalog runs");
        assert!(output.contains("\n000 "));
    }
}
