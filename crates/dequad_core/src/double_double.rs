use crate::error::ParseScalarError;
use num_traits::{Float, FloatConst, FromPrimitive, Num, One, ToPrimitive, Zero};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};
use std::str::FromStr;
use twofloat::TwoFloat;

/// Double-double arithmetic: an unevaluated sum of two `f64`s giving about
/// 31 significant decimal digits.
///
/// Non-finite results collapse to a plain `f64` value in the high word so that
/// infinities and NaN behave as they do for `f64`.
#[derive(Clone, Copy)]
pub struct DoubleDouble(TwoFloat);

// Constants as (hi, lo) pairs.
const PI: (f64, f64) = (3.141592653589793, 1.2246467991473532e-16);
const E: (f64, f64) = (2.718281828459045, 1.4456468917292502e-16);
const LN_2: (f64, f64) = (0.6931471805599453, 2.3190468138462996e-17);
const LN_10: (f64, f64) = (2.302585092994046, -2.1707562233822494e-16);
const SQRT_2: (f64, f64) = (1.4142135623730951, -9.667293313452913e-17);

// Below this magnitude the power series of exp_m1/ln_1p are used.
const SERIES_CUTOFF: f64 = 1e-3;

// Error-free transforms: the pair sums exactly to a + b (or a * b).
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = TwoFloat::new_add(a, b);
    (sum.hi(), sum.lo())
}

fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let product = TwoFloat::new_mul(a, b);
    (product.hi(), product.lo())
}

// Requires |a| >= |b|.
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    (sum, b - (sum - a))
}

impl DoubleDouble {
    pub fn new(hi: f64, lo: f64) -> Self {
        Self(TwoFloat::new_add(hi, lo))
    }

    pub fn hi(self) -> f64 {
        self.0.hi()
    }

    pub fn lo(self) -> f64 {
        self.0.lo()
    }

    fn from_pair(pair: (f64, f64)) -> Self {
        Self::new(pair.0, pair.1)
    }

    // Normalizes (hi, lo) with |hi| >= |lo|, or falls back to a plain f64
    // when the pair overflowed.
    fn finish(hi: f64, lo: f64, fallback: f64) -> Self {
        let (hi, lo) = quick_two_sum(hi, lo);
        if hi.is_finite() && lo.is_finite() {
            Self::new(hi, lo)
        } else {
            Self::from(fallback)
        }
    }

    /// Multiplies by `2^exponent`, exact unless the result leaves the
    /// normal range.
    fn mul_pow2(self, exponent: i32) -> Self {
        let half = exponent / 2;
        let first = 2f64.powi(half);
        let second = 2f64.powi(exponent - half);
        let hi = self.hi() * first * second;
        if !hi.is_finite() || hi == 0.0 {
            return Self::from(hi);
        }
        Self::new(hi, self.lo() * first * second)
    }

    // Reduces to r in [-pi/4, pi/4] with self = r + quadrant * pi/2 (mod 2pi).
    fn reduce_quarter_turns(self) -> (Self, i64) {
        let two_pi = Self::PI().mul_pow2(1);
        let turns = (self / two_pi).round();
        let r = self - two_pi * turns;
        let half_pi = Self::PI().mul_pow2(-1);
        let quadrant = (r.hi() / half_pi.hi()).round();
        (r - half_pi * Self::from(quadrant), quadrant as i64)
    }

    // Taylor series of sin and cos for |self| <= pi/4.
    fn sin_cos_series(self) -> (Self, Self) {
        let mut sin = Self::zero();
        let mut cos = Self::one();
        let mut term = Self::one();
        for k in 1..=40u32 {
            term = term * self / Self::from(f64::from(k));
            match k % 4 {
                1 => sin += term,
                2 => cos -= term,
                3 => sin -= term,
                _ => cos += term,
            }
            if term.hi().abs() <= 1e-34 * self.hi().abs() {
                break;
            }
        }
        (sin, cos)
    }

    fn scale_by_power_of_ten(self, power: i32) -> Self {
        let ten = Self::from(10.0);
        let mut value = self;
        let mut remaining = power;
        while remaining > 256 {
            value = value * ten.powi(256);
            remaining -= 256;
        }
        while remaining < -256 {
            value = value / ten.powi(256);
            remaining += 256;
        }
        if remaining >= 0 {
            value * ten.powi(remaining)
        } else {
            value / ten.powi(-remaining)
        }
    }

    /// Formats in scientific notation with `fraction_digits` digits after the
    /// decimal point.
    pub fn to_scientific(self, fraction_digits: usize) -> String {
        if !self.is_finite() {
            return format!("{}", self.hi());
        }
        let sign = if self.is_sign_negative() { "-" } else { "" };
        if self.is_zero() {
            let zeros = "0".repeat(fraction_digits);
            return if fraction_digits == 0 {
                format!("{sign}0e0")
            } else {
                format!("{sign}0.{zeros}e0")
            };
        }

        let ten = Self::from(10.0);
        let magnitude = self.abs();
        let mut exponent = magnitude.hi().log10().floor() as i32;
        let mut mantissa = magnitude.scale_by_power_of_ten(-exponent);
        if mantissa >= ten {
            mantissa = mantissa / ten;
            exponent += 1;
        } else if mantissa < Self::one() {
            mantissa = mantissa * ten;
            exponent -= 1;
        }

        let mut digits: Vec<u8> = Vec::with_capacity(fraction_digits + 1);
        for _ in 0..=fraction_digits {
            let digit = mantissa.floor().hi().clamp(0.0, 9.0);
            digits.push(digit as u8);
            mantissa = (mantissa - Self::from(digit)) * ten;
            if mantissa < Self::zero() {
                mantissa = Self::zero();
            }
        }

        if mantissa >= Self::from(5.0) {
            let mut index = digits.len();
            loop {
                if index == 0 {
                    digits.insert(0, 1);
                    digits.pop();
                    exponent += 1;
                    break;
                }
                index -= 1;
                if digits[index] == 9 {
                    digits[index] = 0;
                } else {
                    digits[index] += 1;
                    break;
                }
            }
        }

        let mut text = String::with_capacity(fraction_digits + 8);
        text.push_str(sign);
        text.push(char::from(b'0' + digits[0]));
        if fraction_digits > 0 {
            text.push('.');
            for &digit in &digits[1..] {
                text.push(char::from(b'0' + digit));
            }
        }
        text.push('e');
        text.push_str(&exponent.to_string());
        text
    }

    fn parse_decimal(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let special = match body.to_ascii_lowercase().as_str() {
            "inf" | "infinity" => Some(Self::infinity()),
            "nan" => Some(Self::nan()),
            _ => None,
        };
        if let Some(value) = special {
            return Some(if negative { -value } else { value });
        }

        let (mantissa, exponent) = match body.find(|c| c == 'e' || c == 'E') {
            Some(split) => (&body[..split], body[split + 1..].parse::<i32>().ok()?),
            None => (body, 0),
        };

        let ten = Self::from(10.0);
        let mut value = Self::zero();
        let mut scale = exponent;
        let mut seen_digit = false;
        let mut seen_point = false;
        for c in mantissa.chars() {
            match c {
                '0'..='9' => {
                    let digit = f64::from(c as u8 - b'0');
                    value = value * ten + Self::from(digit);
                    if seen_point {
                        scale -= 1;
                    }
                    seen_digit = true;
                }
                '.' if !seen_point => seen_point = true,
                _ => return None,
            }
        }
        if !seen_digit {
            return None;
        }

        let value = value.scale_by_power_of_ten(scale);
        Some(if negative { -value } else { value })
    }

    // Series for exp(x) - 1 and ln(1 + x) near zero.
    fn series(self, alternating: bool, factorial: bool) -> Self {
        let mut sum = Self::zero();
        let mut power = self;
        let mut denominator = Self::one();
        for n in 1..=16 {
            let term = power / denominator;
            sum = if alternating && n % 2 == 0 {
                sum - term
            } else {
                sum + term
            };
            power = power * self;
            let next = Self::from(f64::from(n + 1));
            denominator = if factorial {
                denominator * next
            } else {
                next
            };
        }
        sum
    }
}

impl From<f64> for DoubleDouble {
    fn from(value: f64) -> Self {
        Self(TwoFloat::from(value))
    }
}

impl From<DoubleDouble> for f64 {
    fn from(value: DoubleDouble) -> Self {
        value.hi() + value.lo()
    }
}

impl fmt::Debug for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoubleDouble({:e}, {:e})", self.hi(), self.lo())
    }
}

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(30);
        f.write_str(&self.to_scientific(digits))
    }
}

impl fmt::LowerExp for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for DoubleDouble {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl FromStr for DoubleDouble {
    type Err = ParseScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s).ok_or_else(|| ParseScalarError(s.to_string()))
    }
}

impl PartialEq for DoubleDouble {
    fn eq(&self, other: &Self) -> bool {
        self.hi() == other.hi() && self.lo() == other.lo()
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi().partial_cmp(&other.hi()) {
            Some(Ordering::Equal) => self.lo().partial_cmp(&other.lo()),
            ordering => ordering,
        }
    }
}

// Arithmetic

impl Add for DoubleDouble {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let fallback = self.hi() + rhs.hi();
        if !(self.is_finite() && rhs.is_finite()) {
            return Self::from(fallback);
        }
        let (s, e) = two_sum(self.hi(), rhs.hi());
        let (t, f) = two_sum(self.lo(), rhs.lo());
        let (s, e) = quick_two_sum(s, e + t);
        Self::finish(s, e + f, fallback)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl Mul for DoubleDouble {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let fallback = self.hi() * rhs.hi();
        if !(self.is_finite() && rhs.is_finite()) {
            return Self::from(fallback);
        }
        let (p, e) = two_prod(self.hi(), rhs.hi());
        Self::finish(p, e + (self.hi() * rhs.lo() + self.lo() * rhs.hi()), fallback)
    }
}

impl Div for DoubleDouble {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi() / rhs.hi();
        if !(self.is_finite() && rhs.is_finite() && q1.is_finite()) || rhs.is_zero() {
            return Self::from(q1);
        }
        // Long division: each partial quotient corrects the remainder.
        let r = self - rhs * Self::from(q1);
        let q2 = r.hi() / rhs.hi();
        let r = r - rhs * Self::from(q2);
        let q3 = r.hi() / rhs.hi();
        Self::finish(q1, q2, q1) + Self::from(q3)
    }
}

impl Rem for DoubleDouble {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        self - rhs * (self / rhs).trunc()
    }
}

impl Neg for DoubleDouble {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for DoubleDouble {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for DoubleDouble {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for DoubleDouble {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
impl DivAssign for DoubleDouble {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}
impl RemAssign for DoubleDouble {
    fn rem_assign(&mut self, rhs: Self) {
        *self = *self % rhs;
    }
}

// num-traits plumbing so DoubleDouble satisfies `Scalar`.

impl Zero for DoubleDouble {
    fn zero() -> Self {
        Self::from(0.0)
    }
    fn is_zero(&self) -> bool {
        self.hi() == 0.0
    }
}

impl One for DoubleDouble {
    fn one() -> Self {
        Self::from(1.0)
    }
}

impl Num for DoubleDouble {
    type FromStrRadixErr = ParseScalarError;
    fn from_str_radix(str: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        if radix == 10 {
            return str.parse();
        }
        i64::from_str_radix(str, radix)
            .ok()
            .and_then(Self::from_i64)
            .ok_or_else(|| ParseScalarError(str.to_string()))
    }
}

impl ToPrimitive for DoubleDouble {
    fn to_i64(&self) -> Option<i64> {
        let t = self.trunc();
        if !t.is_finite() {
            return None;
        }
        i64::try_from(t.hi() as i128 + t.lo() as i128).ok()
    }
    fn to_u64(&self) -> Option<u64> {
        let t = self.trunc();
        if !t.is_finite() {
            return None;
        }
        u64::try_from(t.hi() as i128 + t.lo() as i128).ok()
    }
    fn to_f64(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl FromPrimitive for DoubleDouble {
    fn from_i64(n: i64) -> Option<Self> {
        let hi = n as f64;
        let lo = (i128::from(n) - hi as i128) as f64;
        Some(Self::new(hi, lo))
    }
    fn from_u64(n: u64) -> Option<Self> {
        let hi = n as f64;
        let lo = (i128::from(n) - hi as i128) as f64;
        Some(Self::new(hi, lo))
    }
    fn from_f64(n: f64) -> Option<Self> {
        Some(Self::from(n))
    }
}

impl num_traits::NumCast for DoubleDouble {
    fn from<T: ToPrimitive>(n: T) -> Option<Self> {
        n.to_f64().map(<Self as From<f64>>::from)
    }
}

impl FloatConst for DoubleDouble {
    fn E() -> Self {
        Self::from_pair(E)
    }
    fn FRAC_1_PI() -> Self {
        Self::one() / Self::PI()
    }
    fn FRAC_1_SQRT_2() -> Self {
        Self::SQRT_2() / Self::from(2.0)
    }
    fn FRAC_2_PI() -> Self {
        Self::from(2.0) / Self::PI()
    }
    fn FRAC_2_SQRT_PI() -> Self {
        Self::from(2.0) / Self::PI().sqrt()
    }
    fn FRAC_PI_2() -> Self {
        Self::PI() / Self::from(2.0)
    }
    fn FRAC_PI_3() -> Self {
        Self::PI() / Self::from(3.0)
    }
    fn FRAC_PI_4() -> Self {
        Self::PI() / Self::from(4.0)
    }
    fn FRAC_PI_6() -> Self {
        Self::PI() / Self::from(6.0)
    }
    fn FRAC_PI_8() -> Self {
        Self::PI() / Self::from(8.0)
    }
    fn LN_10() -> Self {
        Self::from_pair(LN_10)
    }
    fn LN_2() -> Self {
        Self::from_pair(LN_2)
    }
    fn LOG10_E() -> Self {
        Self::one() / Self::LN_10()
    }
    fn LOG2_E() -> Self {
        Self::one() / Self::LN_2()
    }
    fn PI() -> Self {
        Self::from_pair(PI)
    }
    fn SQRT_2() -> Self {
        Self::from_pair(SQRT_2)
    }
}

impl Float for DoubleDouble {
    fn nan() -> Self {
        Self::from(f64::NAN)
    }
    fn infinity() -> Self {
        Self::from(f64::INFINITY)
    }
    fn neg_infinity() -> Self {
        Self::from(f64::NEG_INFINITY)
    }
    fn neg_zero() -> Self {
        Self::from(-0.0)
    }
    fn min_value() -> Self {
        Self::from(f64::MIN)
    }
    fn min_positive_value() -> Self {
        Self::from(f64::MIN_POSITIVE)
    }
    fn max_value() -> Self {
        Self::from(f64::MAX)
    }
    fn epsilon() -> Self {
        Self::from(f64::EPSILON * f64::EPSILON)
    }
    fn is_nan(self) -> bool {
        self.hi().is_nan() || self.lo().is_nan()
    }
    fn is_infinite(self) -> bool {
        self.hi().is_infinite()
    }
    fn is_finite(self) -> bool {
        self.hi().is_finite() && self.lo().is_finite()
    }
    fn is_normal(self) -> bool {
        self.hi().is_normal() && self.lo().is_finite()
    }
    fn classify(self) -> std::num::FpCategory {
        self.hi().classify()
    }
    fn floor(self) -> Self {
        let hi = self.hi().floor();
        if hi == self.hi() {
            Self::new(hi, self.lo().floor())
        } else {
            Self::from(hi)
        }
    }
    fn ceil(self) -> Self {
        -(-self).floor()
    }
    fn round(self) -> Self {
        let half = Self::from(0.5);
        if self.is_sign_negative() {
            -(-self + half).floor()
        } else {
            (self + half).floor()
        }
    }
    fn trunc(self) -> Self {
        if self.is_sign_negative() {
            self.ceil()
        } else {
            self.floor()
        }
    }
    fn fract(self) -> Self {
        self - self.trunc()
    }
    fn abs(self) -> Self {
        if self.is_sign_negative() {
            -self
        } else {
            self
        }
    }
    fn signum(self) -> Self {
        Self::from(self.hi().signum())
    }
    fn is_sign_positive(self) -> bool {
        self.hi().is_sign_positive()
    }
    fn is_sign_negative(self) -> bool {
        self.hi().is_sign_negative()
    }
    fn mul_add(self, a: Self, b: Self) -> Self {
        self * a + b
    }
    fn recip(self) -> Self {
        Self::one() / self
    }

    fn powi(self, n: i32) -> Self {
        let mut base = self;
        let mut exponent = n.unsigned_abs();
        let mut result = Self::one();
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exponent >>= 1;
        }
        if n < 0 {
            result.recip()
        } else {
            result
        }
    }

    fn powf(self, n: Self) -> Self {
        if !(self.is_finite() && n.is_finite()) {
            return Self::from(self.hi().powf(n.hi()));
        }
        if n.fract().is_zero() && n.abs() <= Self::from(f64::from(i32::MAX)) {
            if let Some(exponent) = n.to_i64() {
                return self.powi(exponent as i32);
            }
        }
        if self.is_zero() {
            return if n.is_sign_positive() {
                Self::zero()
            } else {
                Self::infinity()
            };
        }
        if self.is_sign_negative() {
            return Self::nan();
        }
        (n * self.ln()).exp()
    }

    fn sqrt(self) -> Self {
        if self.is_zero() || !self.is_finite() || self.is_sign_negative() {
            return Self::from(self.hi().sqrt());
        }
        // One Newton step doubles the digits of the f64 root.
        let root = Self::from(self.hi().sqrt());
        root + (self - root * root) / root.mul_pow2(1)
    }

    fn exp(self) -> Self {
        if !self.is_finite() || self.hi() > 709.7 || self.hi() < -745.0 {
            return Self::from(self.hi().exp());
        }
        if self.is_zero() {
            return Self::one();
        }
        // exp(x) = 2^m exp(r)^512 with |r| <= ln(2)/1024.
        let m = (self.hi() / LN_2.0).round();
        let r = (self - Self::LN_2() * Self::from(m)).mul_pow2(-9);
        let mut s = r;
        let mut term = r;
        for k in 2..=20u32 {
            term = term * r / Self::from(f64::from(k));
            s += term;
            if term.hi().abs() <= 1e-35 * s.hi().abs() {
                break;
            }
        }
        // exp(2r) - 1 = (exp(r) - 1) * (exp(r) + 1)
        let two = Self::from(2.0);
        for _ in 0..9 {
            s = s * (s + two);
        }
        (s + Self::one()).mul_pow2(m as i32)
    }

    fn exp2(self) -> Self {
        (self * Self::LN_2()).exp()
    }
    fn ln(self) -> Self {
        if self.is_zero() || !self.is_finite() || self.is_sign_negative() {
            return Self::from(self.hi().ln());
        }
        // ln(x) = ln(x / 2^k) + k ln(2), the first term by one Newton step
        // on exp(y) = x / 2^k from the f64 logarithm.
        let k = self.hi().log2().floor() as i32;
        let mantissa = self.mul_pow2(-k);
        let y = Self::from(mantissa.hi().ln());
        let y = y + mantissa * (-y).exp() - Self::one();
        y + Self::LN_2() * Self::from(f64::from(k))
    }
    fn log(self, base: Self) -> Self {
        self.ln() / base.ln()
    }
    fn log2(self) -> Self {
        self.ln() / Self::LN_2()
    }
    fn log10(self) -> Self {
        self.ln() / Self::LN_10()
    }

    fn max(self, other: Self) -> Self {
        if self.is_nan() || other > self {
            other
        } else {
            self
        }
    }
    fn min(self, other: Self) -> Self {
        if self.is_nan() || other < self {
            other
        } else {
            self
        }
    }

    fn abs_sub(self, other: Self) -> Self {
        if self <= other {
            Self::zero()
        } else {
            self - other
        }
    }

    fn cbrt(self) -> Self {
        if self.is_zero() || !self.is_finite() {
            return Self::from(self.hi().cbrt());
        }
        let mut root = Self::from(self.hi().cbrt());
        let three = Self::from(3.0);
        root = root - (root.powi(3) - self) / (three * root * root);
        root
    }
    fn hypot(self, other: Self) -> Self {
        (self * self + other * other).sqrt()
    }

    fn sin(self) -> Self {
        self.sin_cos().0
    }
    fn cos(self) -> Self {
        self.sin_cos().1
    }
    fn tan(self) -> Self {
        self.sin() / self.cos()
    }
    fn asin(self) -> Self {
        let one = Self::one();
        self.atan2(((one - self) * (one + self)).sqrt())
    }
    fn acos(self) -> Self {
        let one = Self::one();
        ((one - self) * (one + self)).sqrt().atan2(self)
    }
    fn atan(self) -> Self {
        if self.is_nan() {
            return self;
        }
        if self.is_infinite() {
            return Self::FRAC_PI_2() * self.signum();
        }
        // Newton on sin(y) - x cos(y) = 0 from the f64 estimate.
        let mut y = Self::from(self.hi().atan());
        for _ in 0..2 {
            let (s, c) = y.sin_cos();
            y = y - (s - self * c) / (c + self * s);
        }
        y
    }
    fn atan2(self, other: Self) -> Self {
        let zero = Self::zero();
        if self.is_nan() || other.is_nan() {
            return Self::nan();
        }
        if other.is_zero() {
            return if self > zero {
                Self::FRAC_PI_2()
            } else if self < zero {
                -Self::FRAC_PI_2()
            } else {
                zero
            };
        }
        let base = (self / other).atan();
        if other > zero {
            base
        } else if self.is_sign_negative() {
            base - Self::PI()
        } else {
            base + Self::PI()
        }
    }
    fn sin_cos(self) -> (Self, Self) {
        if !self.is_finite() {
            return (Self::nan(), Self::nan());
        }
        let (r, quadrant) = self.reduce_quarter_turns();
        let (s, c) = r.sin_cos_series();
        match quadrant.rem_euclid(4) {
            0 => (s, c),
            1 => (c, -s),
            2 => (-s, -c),
            _ => (-c, s),
        }
    }

    fn exp_m1(self) -> Self {
        if self.abs() < Self::from(SERIES_CUTOFF) {
            self.series(false, true)
        } else {
            self.exp() - Self::one()
        }
    }
    fn ln_1p(self) -> Self {
        if self.abs() < Self::from(SERIES_CUTOFF) {
            self.series(true, false)
        } else {
            (Self::one() + self).ln()
        }
    }
    fn sinh(self) -> Self {
        let m = self.exp_m1();
        (m + m / (m + Self::one())) / Self::from(2.0)
    }
    fn cosh(self) -> Self {
        let e = self.exp();
        (e + e.recip()) / Self::from(2.0)
    }
    fn tanh(self) -> Self {
        if self.abs() > Self::from(40.0) {
            return self.signum();
        }
        let m = (self * Self::from(2.0)).exp_m1();
        m / (m + Self::from(2.0))
    }
    fn asinh(self) -> Self {
        let a = self.abs();
        let value = (a + (a * a + Self::one()).sqrt()).ln();
        if self.is_sign_negative() {
            -value
        } else {
            value
        }
    }
    fn acosh(self) -> Self {
        (self + (self * self - Self::one()).sqrt()).ln()
    }
    fn atanh(self) -> Self {
        let one = Self::one();
        ((one + self) / (one - self)).ln() / Self::from(2.0)
    }

    fn integer_decode(self) -> (u64, i16, i8) {
        self.hi().integer_decode()
    }
}
