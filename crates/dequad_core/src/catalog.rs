//! Reference integrals with known values.
//!
//! Every field is expression text so that each record can be compiled at any
//! working precision. The set covers the three transforms, integrands with
//! endpoint singularities, integrals that vanish, reversed intervals and one
//! divergent integral.

use crate::error::ExpressionError;
use crate::expression::{parse_constant, Expression};
use crate::precision::Precision;
use crate::traits::Scalar;
use crate::transform::{Transform, Variant};
use std::fmt;

/// One catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceIntegral {
    pub a: &'static str,
    pub b: &'static str,
    /// Exact value; `inf` marks a divergent integral.
    pub expected: &'static str,
    /// Function of `x`.
    pub integrand: &'static str,
}

const fn case(
    a: &'static str,
    b: &'static str,
    expected: &'static str,
    integrand: &'static str,
) -> ReferenceIntegral {
    ReferenceIntegral {
        a,
        b,
        expected,
        integrand,
    }
}

/// A record compiled for the arithmetic `T`.
#[derive(Debug)]
pub struct CompiledIntegral<T: Scalar> {
    pub a: T,
    pub b: T,
    pub expected: T,
    pub integrand: Expression<T>,
}

impl<T: Scalar> CompiledIntegral<T> {
    /// The transform the engine will pick for this interval.
    pub fn variant(&self) -> Variant {
        Transform::select(self.a, self.b, Precision::native::<T>().tolerance()).variant()
    }
}

impl ReferenceIntegral {
    pub fn compile<T: Scalar>(&self) -> Result<CompiledIntegral<T>, ExpressionError> {
        Ok(CompiledIntegral {
            a: parse_constant(self.a)?,
            b: parse_constant(self.b)?,
            expected: parse_constant(self.expected)?,
            integrand: Expression::parse(self.integrand)?,
        })
    }
}

impl fmt::Display for ReferenceIntegral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} over [{}, {}]", self.integrand, self.a, self.b)
    }
}

pub static CATALOG: &[ReferenceIntegral] = &[
    // Whole real line (sinh-sinh).
    case("inf", "-inf", "-2/sqrt(3)", "1/(1 + x**2)/sqrt(3 + 3*x**2)"),
    case("-inf", "inf", "pi/12*ln(2/3)", "x/(9*exp(x) + 4*exp(-x))"),
    case("-inf", "inf", "ln(3)**2/4", "x/(3 + exp(x))/(1 + exp(-x))"),
    case("-inf", "inf", "ln(3)/3", "x*exp(x)/(3 + exp(x))**2"),
    case("-inf", "inf", "-ln(2)", "1 - sqrt(2)*cosh(x)/sqrt(cosh(2*x))"),
    case("-inf", "inf", "pi/3/sin(2*pi/3)", "exp(-2*x)/(1 + exp(-3*x))"),
    case("-inf", "inf", "exp(1/9)*sqrt(pi)/3", "exp(-9*x**2 + 2*x)"),
    case("-inf", "inf", "(3/2)*sqrt(pi/2)*exp(9/2)", "x*exp(-2*x**2 + 2*3*x)"),
    case(
        "-inf",
        "inf",
        "pi**2/3",
        "ln(abs((1 + 2*sqrt(1 + x**2))/(1 - 2*sqrt(1 + x**2))))/sqrt(1 + x**2)",
    ),
    case("-inf", "inf", "2", "1/cosh(x)**2"),
    case("-inf", "inf", "sqrt(pi/3)/6", "x**2*exp(-3*x**2)"),
    case("-inf", "inf", "pi", "1/(1 + x**2)"),
    case("-inf", "inf", "exp(4/9)*sqrt(pi)/3", "exp(-9*x**2 + 4*x)"),
    case("-inf", "inf", "pi/24*ln(4/3)", "x/(9*exp(x) + 16*exp(-x))"),
    case(
        "-inf",
        "inf",
        "ln(3)**2/2",
        "x**2*(exp(x) - 3*exp(-x))/(3 + exp(x))**2/(1 + exp(-x))**2",
    ),
    case("-inf", "inf", "(4/3)*sqrt(pi/3)*exp(16/3)", "x*exp(-3*x**2 + 8*x)"),
    case("-inf", "inf", "pi*3/60", "x*atan(3*x)/(x**2 + 9)/(x**2 + 9)"),
    case("-inf", "inf", "sqrt(pi)/3*exp(-1/9)*sin(8)", "exp(-9*x**2)*sin(2*(x + 4))"),
    case("-inf", "inf", "sqrt(pi)/3*exp(-1/9)*cos(8)", "exp(-9*x**2)*cos(2*(x + 4))"),
    case("-inf", "inf", "pi*ln(1 + 6*abs(sin(5)) + 9)", "ln(9 - 2*3*x*cos(5) + x**2)/(1 + x**2)"),
    case("-inf", "inf", "sqrt(pi/3)", "exp(-3*x**2)"),
    case("-inf", "inf", "sqrt(pi/3)/12", "x**4*exp(-3*x**2)"),
    case("-inf", "inf", "sqrt(pi)/4*exp(-9/64)*sin(15)", "exp(-16*x**2)*sin(3*(x + 5))"),
    case("-inf", "inf", "sqrt(pi)/4*exp(-9/64)*cos(15)", "exp(-16*x**2)*cos(3*(x + 5))"),
    case("-inf", "inf", "pi*(cos(1) + sin(1))/4/exp(1)", "cos(x)/(x**4 + 4)"),
    case("-inf", "inf", "sqrt(pi/3)*exp(-44/12)", "exp(-(3*x**2 + 4*x + 5))"),
    case(
        "-inf",
        "inf",
        "pi*exp(-3*sin(3))*sin(12 + 3*cos(3))",
        "(cos(9) - x*cos(12))/(1 - 2*x*cos(3) + x**2)*cos(3*x)",
    ),
    case("-inf", "inf", "sqrt(pi)", "exp(-(x**2))"),
    case("-inf", "inf", "pi", "x**2/(1 + 4*x + 3*x**2 - 4*x**3 - 2*x**4 + 2*x**5 + x**6)"),

    // Half-infinite intervals (exp-sinh).
    case("inf", "-1", "-exp(5)*sqrt(pi/5)", "exp(-5*x)/sqrt(1 + x)"),
    case("1", "inf", "pi/cos(pi/4)", "(x - 1)**(-1/4)/x"),
    case("1", "inf", "-pi/3/sin(pi/2)*sqrt(3)", "1/(2 - 3*x)/(x - 1)**(1/2)"),
    case("3", "inf", "pi", "1/sqrt(x - 3)/(x - 2)"),
    case("0", "inf", "pi/2", "1/(1 + x**2)"),
    case("0", "inf", "sqrt(pi)", "exp(-x)/sqrt(x)"),
    case("0", "inf", "1/32", "x**2*exp(-4*x)"),
    case("0", "inf", "243/8", "(sqrt(x**2 + 9) - x)**3"),
    case("0", "inf", "1/3", "exp(-3*x)"),
    case("0", "inf", "1 - pi**2/12", "x*exp(-2*x)/(exp(-x) + 1)"),
    case("0", "inf", "ln(3)/3", "ln(x)/(x + 3)**2"),
    case("0", "inf", "pi**2/12", "ln(1 + exp(-x))"),
    case("0", "inf", "-ln(3/4)/3", "ln(1 + x)/(3*x + 4)**2"),
    case("0", "inf", "pi**2/12", "ln(1 + x**2)/x/(1 + x**2)"),
    case("0", "inf", "pi*ln(2)", "ln((1 + x**2)/x)/(1 + x**2)"),
    case("0", "inf", "sqrt(pi/3)", "exp(-3*x)/sqrt(x)"),
    case("0", "inf", "pi", "(ln(1 + 16*x**2) - ln(1 + 9*x**2))/x**2"),
    case("0", "inf", "sqrt(pi)/4", "exp(-4*x**2)"),
    case("0", "inf", "pi**2/6 - 1", "x*exp(-x)/(exp(x) - 1)"),
    case("0", "inf", "ln(2) - (1/2)", "x/(1 + x**2)/sinh(pi*x)"),
    case("0", "inf", "-pi/2", "(1 - x**2)*ln(x)/(1 + x**2)**2"),
    case("0", "inf", "pi**2/6", "ln(1 + x)/x/(1 + x)"),
    case("0", "inf", "pi", "ln(1 + x**2)/x**2"),
    case("0", "inf", "((1/2) + ln(2))*pi/4", "x*exp(-x)*sqrt(1 - exp(-2*x))"),
    case("0", "inf", "6", "(sqrt(x**2 + 4) - x)**3"),
    case("0", "inf", "3/32", "1/(sqrt(x**2 + 4) + x)**3"),
    case("0", "inf", "sqrt(pi/2)/2*exp(-2*sqrt(6))", "exp(-2*x**2 - 3/x**2)"),
    case("0", "inf", "pi**2/12 - (3/4)", "x*exp(-3*x)/(exp(-x) + 1)"),
    case("0", "inf", "2*pi**2/27", "x*(1 - exp(-x))*exp(-x)/(exp(-3*x) + 1)"),
    case("0", "inf", "3*pi/4*(ln(2) - (7/12))", "(x*exp(-2*x))/sqrt(exp(x) - 1)"),
    case("0", "inf", "pi/8*ln(12)", "ln(3*x)/(16 + x**2)"),
    case("0", "inf", "pi**2/16", "x*atan(x)/(1 + x**4)"),

    // Finite intervals (tanh-sinh).
    case("1", "0", "-1/4", "x*ln(1 + x)"),
    case("0", "1", "(pi - 2 + 2*ln(2))/12", "x**2*atan(x)"),
    case("0", "pi/2", "(exp(pi/2) - 1)/2", "exp(x)*cos(x)"),
    case("0", "1", "5*pi**2/96", "atan(sqrt(2 + x**2))/(1 + x**2)/sqrt(2 + x**2)"),
    case("0", "1", "pi", "4/(x**2 + 1)"),
    case("0", "1", "2/pi", "sin(pi*x)"),
    case("0", "1", "-4/9", "sqrt(x)*ln(x)"),
    case("0", "1", "2/3", "sqrt(x)"),
    case("0", "2", "pi", "sqrt(x*(4 - x))"),
    case("0", "1", "pi/4", "sqrt(1 - x**2)"),
    case(
        "-1",
        "1",
        "2.203345731824743771806893505443707840970711051705028816975706641754",
        "sqrt((1 - x**2)*(2 - x))",
    ),
    case("0", "2", "4/3", "sqrt(abs(x - 1))"),
    case("1/128", "257/128", "((129/128)**(3/2) + (127/128)**(3/2))*2/3", "sqrt(abs(x - 1))"),
    case("0", "pi/2", "pi*sqrt(2)/2", "sqrt(tan(x))"),
    case("0", "1", "2", "ln(x)**2"),
    case("0", "pi/2", "-pi*ln(2)/2", "ln(cos(x))"),
    case("0", "1", "-1", "ln(x)"),
    case("0", "1", "2", "1/sqrt(x)"),
    case("0", "e", "0", "ln(x)"),
    case("-128", "128", "0", "x**3*(x**2-47**2)*(x**2-88**2)*(x**2-117**2)"),
    case("-pi", "pi", "0", "cos(x)"),
    case("0", "15", "pi**4/15", "x**3/(exp(x) - 1)"),
    case("-8*pi", "8.5*pi", "1", "cos(x)"),
    case(
        "0",
        "2*pi",
        "-0.1976268077187172613672189604425462167176209935877442769219234953971",
        "ln(1 + x)*sin(10*x)",
    ),
    case("0", "1", "1/2", "cos(ln(x))"),
    case("0", "2", "1.011239090533", "x**(pi/4)*sin(pi/(8 - 4*x))"),
    case(
        "0",
        "1",
        "0.3233674314850376872853210319016270981575283855468855736552649593789637419574556193621185898284113307",
        "cos(ln(x)/x)/x",
    ),
    case("0", "1", "inf", "1/x"),
    case(
        "-128",
        "128",
        "8588888219586658304/315",
        "x**2*(x**2 - 47**2)*(x**2 - 88**2)*(x**2 - 117**2)",
    ),
    case(
        "-128",
        "128",
        "11816497947871281152/315",
        "x**2*(x**2 - 46**2)*(x**2 - 87**2)*(x**2 - 116**2)",
    ),
    case("-1", "1", "2/8", "abs(x)*x**6"),

    // Reversed and shifted intervals of every kind.
    case("inf", "0", "-pi/2", "1/(1 + x**2)"),
    case("-inf", "1", "exp(5)*sqrt(pi/5)", "exp(5*x)/sqrt(1 - x)"),
    case("1", "-inf", "-exp(5)*sqrt(pi/5)", "exp(5*x)/sqrt(1 - x)"),
    case("-1", "inf", "exp(5)*sqrt(pi/5)", "exp(-5*x)/sqrt(1 + x)"),
    case("-inf", "-1", "pi/4", "1/(x**2 + 1)"),
    case("-inf", "inf", "0", "(x - 1)/((x - 1)**2 + 1)**2"),
    case("-inf", "0", "-1/4", "(x - 1)/((x - 1)**2 + 1)**2"),
    case("-inf", "1", "-1/2", "(x - 1)/((x - 1)**2 + 1)**2"),
    case("-inf", "2", "-1/4", "(x - 1)/((x - 1)**2 + 1)**2"),
    case("0", "2", "0", "(x - 1)/((x - 1)**2 + 1)**2"),
    case("0", "1", "-1/4", "(x - 1)/((x - 1)**2 + 1)**2"),

    // Tiny integrands, where only relative accuracy is meaningful.
    case("inf", "-inf", "-2e-30/sqrt(3)", "1e-30/(1 + x**2)/sqrt(3 + 3*x**2)"),
    case("0", "pi", "2e-30", "1e-30*sin(x)"),
    case("inf", "-1", "-1e-30*exp(5)*sqrt(pi/5)", "1e-30*exp(-5*x)/sqrt(1 + x)"),

    // Assorted finite-interval cases, many with endpoint singularities.
    case(
        "pi*4",
        "pi*5",
        "0.002134240777991131240110232369370650561940890093246454073400113711660569572398558456002767541523306133688281981489760809834964047628791269",
        "sin(x)**exp(x)",
    ),
    case(
        "pi*4.25",
        "pi*5",
        "0.002134240777991131240110232369370650561940890093246454073400113711660569572398558456002767541523306133688281981489760809834964047628791269",
        "sin(x)**exp(x)",
    ),
    case("-pi", "pi", "0", "0"),
    case("0", "1", "1/12", "x**3 - 2*x**2 + x"),
    case("0", "1", "ln(2)", "1/(1 + x)"),
    case("0", "1", "pi", "4/(1 + x*x)"),
    case("0", "1", "1", "acos(x)"),
    case(
        "0",
        "1",
        "0.9460830703671830149413533138231796578123379547381117904714547735666870365407979180887021330817407112",
        "sin(x)/x",
    ),
    case(
        "0",
        "1",
        "1.198140234735592207439922492280323878227212663215651558263674952946405214143915670835885556489793389",
        "sqrt(x/(1 - x**2))",
    ),
    case("0", "1", "2", "1/sqrt(1 - x)"),
    case("0", "1", "5", "x**(-0.8)"),
    case("0", "1", "5", "(1 - x)**(-0.8)"),
    case(
        "0",
        "1",
        "1.669253683348146372562859465598093617987986026980694004899654740207363985419052823739382320702550648",
        "1/sqrt(sin(pi*x))",
    ),
    case(
        "0",
        "1",
        "3.604250526330089151536169815574269902046879077863075298569203952881902348266779199510575127257374918",
        "sin(pi*x)**(-0.8)",
    ),
    case("0", "1", "sqrt(pi)", "1/sqrt(-ln(x))"),
    case("0", "1", "sqrt(pi)", "1/sqrt(-ln(1 - x))"),
    case("0", "1", "0", "sin(pi*x*40)"),
    case("0", "1", "atan(5)/5", "1/(1 + 25*x**2)"),
    case("0", "1", "5*atan(1/5)", "1/(1 + 0.04*x**2)"),
    case("0", "1", "sqrt(2)/3", "sqrt(abs(x - 0.5))"),
    case("0", "1", "4.5", "floor(10*x)"),
    case("0", "1", "0.5", "10*x - floor(10*x)"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::double_double::DoubleDouble;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn every_record_compiles_at_both_precisions() {
        for record in CATALOG {
            let narrow = record.compile::<f64>();
            assert!(narrow.is_ok(), "{record}: {:?}", narrow.err());
            let wide = record.compile::<DoubleDouble>();
            assert!(wide.is_ok(), "{record}: {:?}", wide.err());
        }
    }

    #[test]
    fn catalog_covers_every_variant() {
        for variant in Variant::ALL {
            let count = CATALOG
                .iter()
                .filter_map(|record| record.compile::<f64>().ok())
                .filter(|compiled| compiled.variant() == variant)
                .count();
            assert!(count >= 10, "{variant}: only {count} cases");
        }
    }

    #[test]
    fn catalog_includes_zero_and_divergent_integrals() {
        let compiled: Vec<CompiledIntegral<f64>> = CATALOG
            .iter()
            .map(|record| record.compile().expect("valid record"))
            .collect();
        assert!(compiled.iter().any(|c| c.expected == 0.0));
        assert!(compiled.iter().any(|c| c.expected.is_infinite()));
    }

    #[test]
    fn expected_values_are_evaluated() {
        let record = case("-inf", "inf", "pi/3/sin(2*pi/3)", "exp(-2*x)/(1 + exp(-3*x))");
        let compiled = record.compile::<f64>().expect("valid record");
        assert_eq!(compiled.a, f64::NEG_INFINITY);
        assert_relative_eq!(compiled.expected, 2.0 * PI / 27f64.sqrt(), max_relative = 1e-15);
        assert_eq!(compiled.variant(), Variant::SinhSinh);
        assert_eq!(record.to_string(), "exp(-2*x)/(1 + exp(-3*x)) over [-inf, inf]");
    }
}
