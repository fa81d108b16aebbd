use crate::Arithmetic;
use anyhow::{Context, Result};
use clap::Parser;
use dequad_core::precision::DEFAULT_EXTRA_LEVELS;
use dequad_core::{
    parse_constant, DoubleDouble, DoubleExponential, Expression, Precision, Quadrature,
    QuadratureSettings, Scalar,
};
use log::info;
use serde::Serialize;

/// Arguments of the `dequad` binary.
#[derive(Debug, Parser)]
#[command(name = "dequad")]
#[command(
    about = "Numerically evaluates a definite integral using the double-exponential method (aka tanh-sinh quadrature)"
)]
#[command(
    after_help = "Prints the computed integral, the estimated error and the Total Number of Function Evaluations (TNFE) with the variant used. Endpoints accept expressions such as -inf or pi/2. Use \"--\" before the first argument that starts with \"-\"."
)]
pub struct Args {
    /// Binary precision (bits) of the computation
    #[arg(short, long, conflicts_with = "digits")]
    pub bits: Option<u32>,

    /// Decimal digits of the computation
    #[arg(short, long)]
    pub digits: Option<u32>,

    /// Working arithmetic
    #[arg(long, value_enum, default_value_t = Arithmetic::Auto)]
    pub arithmetic: Arithmetic,

    /// Levels allowed beyond round(log2(digits))
    #[arg(long, default_value_t = DEFAULT_EXTRA_LEVELS)]
    pub extra_levels: usize,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Function of x to integrate, e.g. "2/(1 + x^2)"
    pub function: String,

    /// Lower end of the interval
    pub a: String,

    /// Upper end of the interval
    pub b: String,
}

impl Args {
    /// Precision requested through `--bits` or `--digits`, if any.
    pub fn precision(&self) -> Result<Option<Precision>> {
        let precision = match (self.bits, self.digits) {
            (Some(bits), _) => Some(Precision::from_bits(bits)?),
            (None, Some(digits)) => Some(Precision::from_digits(digits)?),
            (None, None) => None,
        };
        Ok(precision)
    }
}

#[derive(Serialize)]
struct Report<'a, T> {
    function: &'a str,
    a: &'a str,
    b: &'a str,
    arithmetic: Arithmetic,
    digits: u32,
    #[serde(flatten)]
    result: &'a Quadrature<T>,
}

/// Evaluates the integral described by `args` and renders the output.
pub fn run(args: &Args) -> Result<String> {
    let requested = args.precision()?;
    let arithmetic = args.arithmetic.resolve(requested);
    match arithmetic {
        Arithmetic::DoubleDouble => evaluate::<DoubleDouble>(args, requested, arithmetic),
        Arithmetic::Auto | Arithmetic::F64 => evaluate::<f64>(args, requested, arithmetic),
    }
}

fn evaluate<T: Scalar + Serialize>(
    args: &Args,
    requested: Option<Precision>,
    arithmetic: Arithmetic,
) -> Result<String> {
    let precision = requested.unwrap_or_else(|| arithmetic.native_precision());
    let settings = QuadratureSettings::new(precision).with_extra_levels(args.extra_levels);
    let engine = DoubleExponential::<T>::new(settings)
        .with_context(|| format!("cannot compute with {} digits", precision.digits()))?;

    let integrand = Expression::<T>::parse(&args.function)
        .with_context(|| format!("invalid function '{}'", args.function))?;
    let a: T = parse_constant(&args.a)
        .with_context(|| format!("invalid lower limit '{}'", args.a))?;
    let b: T = parse_constant(&args.b)
        .with_context(|| format!("invalid upper limit '{}'", args.b))?;

    info!(
        "integrating {} over [{}, {}] with {} digits",
        args.function,
        a,
        b,
        precision.digits()
    );
    let result = engine.integrate(&integrand, a, b);

    if args.json {
        let report = Report {
            function: &args.function,
            a: &args.a,
            b: &args.b,
            arithmetic,
            digits: precision.digits(),
            result: &result,
        };
        return serde_json::to_string_pretty(&report).context("serializing result");
    }
    Ok(render(&result, precision.digits()))
}

/// The two-line human-readable form.
pub fn render<T: Scalar>(result: &Quadrature<T>, digits: u32) -> String {
    let fraction = digits.saturating_sub(1) as usize;
    format!(
        "I = {:.*e} ± {:.*e}\n\nTNFE = {} ({})",
        fraction, result.value, fraction, result.error, result.evaluations, result.variant
    )
}
