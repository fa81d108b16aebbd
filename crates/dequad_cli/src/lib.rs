//! Command-line front end for `dequad_core`.
//!
//! The binaries only parse arguments and print; everything they do lives in
//! [`integrate`] and [`catalog`] so it can be tested without a process.

pub mod catalog;
pub mod integrate;

use clap::ValueEnum;
use dequad_core::{DoubleDouble, Precision, Scalar};
use serde::Serialize;

/// Working arithmetic selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arithmetic {
    /// `f64` up to its native digits, double-double beyond.
    Auto,
    F64,
    DoubleDouble,
}

impl Arithmetic {
    /// Replaces `Auto` by the narrowest arithmetic that carries `precision`.
    pub fn resolve(self, precision: Option<Precision>) -> Arithmetic {
        match self {
            Arithmetic::Auto => match precision {
                Some(p) if p.digits() > f64::max_digits() => Arithmetic::DoubleDouble,
                _ => Arithmetic::F64,
            },
            chosen => chosen,
        }
    }

    /// Digits carried when no precision is requested.
    pub fn native_precision(self) -> Precision {
        match self {
            Arithmetic::DoubleDouble => Precision::native::<DoubleDouble>(),
            Arithmetic::Auto | Arithmetic::F64 => Precision::native::<f64>(),
        }
    }
}
