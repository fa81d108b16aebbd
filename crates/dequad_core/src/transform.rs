//! The three double-exponential coordinate changes.
//!
//! A finite interval uses tanh-sinh, a half-infinite one exp-sinh and the
//! whole real line sinh-sinh. All three are sampled by the same level walk in
//! [`crate::quadrature`]; this module supplies the per-variant formulas.

use crate::traits::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transform an integration used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    TanhSinh,
    ExpSinh,
    SinhSinh,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::TanhSinh, Variant::ExpSinh, Variant::SinhSinh];

    pub fn name(self) -> &'static str {
        match self {
            Variant::TanhSinh => "tanh-sinh",
            Variant::ExpSinh => "exp-sinh",
            Variant::SinhSinh => "sinh-sinh",
        }
    }

    /// Position in [`Variant::ALL`].
    pub fn index(self) -> usize {
        match self {
            Variant::TanhSinh => 0,
            Variant::ExpSinh => 1,
            Variant::SinhSinh => 2,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transform parameters chosen from the interval endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform<T> {
    /// Finite `[a, b]`: samples `center ± half_width * tanh(π/2 sinh t)`.
    TanhSinh { center: T, half_width: T },
    /// One finite endpoint `center`; `sign` points toward the infinite one.
    ExpSinh {
        center: T,
        sign: T,
        reversed: bool,
        centered_at_zero: bool,
    },
    /// Both endpoints infinite; `sign` is the sign of the upper one.
    SinhSinh { sign: T },
}

/// One abscissa of the walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<T> {
    /// Offset from the center in units of the scale.
    pub abscissa: T,
    pub weight: T,
    /// cosh(t), the derivative of the inner sinh.
    pub cosh_t: T,
}

impl<T: Scalar> Transform<T> {
    /// Picks the transform for finite or infinite, non-NaN endpoints.
    ///
    /// A finite endpoint within `tolerance` of zero (absolute or relative)
    /// counts as centered at zero.
    pub fn select(a: T, b: T, tolerance: T) -> Self {
        let two = T::cast(2.0);
        match (a.is_finite(), b.is_finite()) {
            (true, true) => Transform::TanhSinh {
                center: b / two + a / two,
                half_width: b / two - a / two,
            },
            (true, false) | (false, true) => {
                let reversed = b.is_finite();
                let (center, toward) = if reversed { (b, a) } else { (a, b) };
                Transform::ExpSinh {
                    center,
                    sign: toward.signum(),
                    reversed,
                    centered_at_zero: center.almost_eq(T::zero(), tolerance),
                }
            }
            (false, false) => Transform::SinhSinh { sign: b.signum() },
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Transform::TanhSinh { .. } => Variant::TanhSinh,
            Transform::ExpSinh { .. } => Variant::ExpSinh,
            Transform::SinhSinh { .. } => Variant::SinhSinh,
        }
    }

    pub fn center(&self) -> T {
        match *self {
            Transform::TanhSinh { center, .. } | Transform::ExpSinh { center, .. } => center,
            Transform::SinhSinh { .. } => T::zero(),
        }
    }

    /// Half-width for tanh-sinh, ±1 otherwise.
    pub fn scale(&self) -> T {
        match *self {
            Transform::TanhSinh { half_width, .. } => half_width,
            Transform::ExpSinh { sign, .. } | Transform::SinhSinh { sign } => sign,
        }
    }

    /// Whether the transform is anchored at the origin, which calls for a
    /// tighter sampling cutoff near the asymptote.
    pub fn centered_at_zero(&self) -> bool {
        match *self {
            Transform::TanhSinh { .. } => false,
            Transform::ExpSinh {
                centered_at_zero, ..
            } => centered_at_zero,
            Transform::SinhSinh { .. } => true,
        }
    }

    /// True when the interval was given as (±∞, b) and the result must be
    /// negated.
    pub fn reversed(&self) -> bool {
        matches!(self, Transform::ExpSinh { reversed: true, .. })
    }

    /// Applies the orientation sign to a partial result.
    pub fn orient(&self, value: T) -> T {
        if self.reversed() {
            -value
        } else {
            value
        }
    }

    /// Largest exp(t) the walk may reach for the sampling cutoff `eps`.
    pub fn exp_t_max(&self, eps: T) -> T {
        let two = T::cast(2.0);
        let t_max = match *self {
            Transform::TanhSinh { half_width, .. } => two * T::one().min(half_width.abs()),
            _ if self.centered_at_zero() => eps.sqrt(),
            Transform::ExpSinh { center, .. } => (center * two).recip().abs(),
            Transform::SinhSinh { .. } => eps.sqrt(),
        };
        let mut t_max = (t_max / eps).ln();
        if !matches!(self, Transform::TanhSinh { .. }) {
            t_max = t_max * two;
        }
        t_max / T::FRAC_PI_2()
    }

    /// Abscissa and weights at t = ln(exp_t).
    pub fn node(&self, exp_t: T) -> Node<T> {
        let two = T::cast(2.0);
        let inv_exp_t = exp_t.recip();
        let cosh_t = (exp_t + inv_exp_t) / two;
        let half_pi_sinh_t = T::FRAC_PI_4() * (exp_t - inv_exp_t);
        let e = half_pi_sinh_t.exp();
        match self {
            Transform::TanhSinh { .. } => {
                let inv_e = e.recip();
                let cosh = (e + inv_e) / two;
                Node {
                    abscissa: (e - inv_e) / (e + inv_e),
                    weight: (cosh * cosh).recip(),
                    cosh_t,
                }
            }
            Transform::SinhSinh { .. } => {
                let inv_e = e.recip();
                Node {
                    abscissa: (e - inv_e) / two,
                    weight: (e + inv_e) / two,
                    cosh_t,
                }
            }
            Transform::ExpSinh { .. } => Node {
                abscissa: e,
                weight: e,
                cosh_t,
            },
        }
    }

    /// The two sample points belonging to `node`.
    pub fn points(&self, node: &Node<T>) -> (T, T) {
        let center = self.center();
        let scale = self.scale();
        let upper = center + scale * node.abscissa;
        let lower = match self {
            Transform::ExpSinh { .. } => center + scale / node.abscissa,
            _ => center - scale * node.abscissa,
        };
        (upper, lower)
    }

    /// Weighted contribution of a sample pair, before the cosh(t) factor.
    pub fn combine(&self, node: &Node<T>, upper: T, lower: T) -> T {
        let mirrored = match self {
            Transform::ExpSinh { .. } => lower / node.weight,
            _ => lower * node.weight,
        };
        upper * node.weight + mirrored
    }

    /// The single level-0 sample at t = 0.
    pub fn center_point(&self) -> T {
        match self {
            Transform::ExpSinh { .. } => self.center() + self.scale(),
            _ => self.center(),
        }
    }
}
