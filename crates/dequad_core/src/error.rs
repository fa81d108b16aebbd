//! Error types surfaced by the core crate.
//!
//! Numerical trouble inside an integration never becomes an error: failed or
//! non-finite samples are absorbed by the quadrature engine. The types here
//! cover configuration (precision), integrand text that cannot be compiled, and
//! the domain violations reported by compiled integrands.

use thiserror::Error;

/// Invalid working precision for a given arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrecisionError {
    #[error("precision must be at least one decimal digit (or one bit)")]
    Empty,
    #[error("{requested} decimal digits requested but the arithmetic only carries {available}")]
    Unsupported { requested: u32, available: u32 },
}

/// Integrand or endpoint text that could not be turned into bytecode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected ')' but found {0}")]
    UnclosedParenthesis(String),
    #[error("unknown variable or constant '{0}'")]
    UnknownVariable(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("constant expression has no real value: {0}")]
    Undefined(#[from] DomainError),
}

/// A point where a compiled integrand has no real value.
///
/// The quadrature engine treats every variant as a zero contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("logarithm of a negative number")]
    LogOfNegative,
    #[error("square root of a negative number")]
    SqrtOfNegative,
    #[error("non-integer power of a negative number")]
    FractionalPowerOfNegative,
    #[error("inverse sine or cosine of a value outside [-1, 1]")]
    InverseTrigRange,
    #[error("malformed bytecode: operand stack underflow")]
    StackUnderflow,
}

/// A string that does not spell a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{0}' as a number")]
pub struct ParseScalarError(pub String);
