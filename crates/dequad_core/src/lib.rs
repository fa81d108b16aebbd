//! The `dequad_core` crate provides double-exponential numerical integration
//! over finite, half-infinite and infinite intervals.
//! It is generic over the working arithmetic, supporting standard `f64` and a
//! double-double type with about 31 significant digits.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction) and `Integrand` (the function being integrated).
//! - **Quadrature**: the `DoubleExponential` engine, bound to one explicit working precision.
//! - **Transform**: tanh-sinh, exp-sinh and sinh-sinh coordinate changes.
//! - **Expression**: a bytecode VM for evaluating user-supplied integrands.
//! - **Catalog / Harness**: reference integrals and correct-digit scoring.
//!
//! ```
//! use dequad_core::integrate;
//!
//! let result = integrate(&|x: f64| (-x * x).exp(), f64::NEG_INFINITY, f64::INFINITY);
//! assert!((result.value - std::f64::consts::PI.sqrt()).abs() < 1e-12);
//! ```
pub mod catalog;
pub mod double_double;
pub mod error;
pub mod expression;
pub mod harness;
pub mod precision;
pub mod quadrature;
pub mod traits;
pub mod transform;

pub use double_double::DoubleDouble;
pub use error::{DomainError, ExpressionError, PrecisionError};
pub use expression::{parse_constant, Expression};
pub use precision::{Precision, QuadratureSettings};
pub use quadrature::{integrate, DoubleExponential, Quadrature, Sample};
pub use traits::{Fallible, Integrand, Scalar};
pub use transform::Variant;
