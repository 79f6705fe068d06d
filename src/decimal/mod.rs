//! `BigDecimal`: an immutable fixed-point decimal backed by [`BigInt`].
//!
//! A value is `unscaled * 10^-scale`. Small unscaled values live directly
//! in an `i64` (`int_compact`); once the magnitude would not fit, the
//! value "inflates" into a [`BigInt`] and `int_compact` holds the sentinel
//! `i64::MIN`. `precision`/`to_string` are lazily-computed, single-assignment
//! caches, the same discipline `BigInt`'s four caches follow.

pub mod context;
pub(crate) mod div;
mod format;
mod parse;

use crate::bigint::BigInt;
use crate::error::{ArithmeticError, BigNumError};
use crate::tables;
use context::{MathContext, RoundingMode};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const INFLATED: i64 = i64::MIN;

pub struct BigDecimal {
    int_compact: i64,
    int_val: Option<BigInt>,
    scale: i32,
    precision_cache: OnceLock<u32>,
    string_cache: OnceLock<String>,
}

impl BigDecimal {
    fn from_compact(value: i64, scale: i32) -> Self {
        BigDecimal {
            int_compact: value,
            int_val: None,
            scale,
            precision_cache: OnceLock::new(),
            string_cache: OnceLock::new(),
        }
    }

    /// Picks the compact or inflated representation depending on whether
    /// `value` fits in an `i64` without colliding with the `INFLATED`
    /// sentinel: `i64::MIN` itself must never be a legal compact value, so
    /// it always inflates.
    fn from_bigint(value: BigInt, scale: i32) -> Self {
        if let Some(c) = value.to_i64() {
            if c != INFLATED {
                return Self::from_compact(c, scale);
            }
        }
        BigDecimal {
            int_compact: INFLATED,
            int_val: Some(value),
            scale,
            precision_cache: OnceLock::new(),
            string_cache: OnceLock::new(),
        }
    }

    pub fn zero() -> Self {
        Self::from_compact(0, 0)
    }

    pub fn from_unscaled_bigint(unscaled: BigInt, scale: i32) -> Self {
        Self::from_bigint(unscaled, scale)
    }

    pub fn parse(s: &str) -> Result<Self, BigNumError> {
        parse::parse(s)
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    fn compact(&self) -> Option<i64> {
        if self.int_compact != INFLATED {
            Some(self.int_compact)
        } else {
            None
        }
    }

    pub fn unscaled_value(&self) -> BigInt {
        match self.compact() {
            Some(c) => BigInt::from(c),
            None => self.int_val.clone().expect("inflated BigDecimal always carries int_val"),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self.compact() {
            Some(c) => c == 0,
            None => self.int_val.as_ref().unwrap().is_zero(),
        }
    }

    pub fn signum(&self) -> i32 {
        match self.compact() {
            Some(c) => c.signum() as i32,
            None => self.int_val.as_ref().unwrap().signum(),
        }
    }

    /// Number of decimal digits in `|unscaled_value|`; at least 1 for zero.
    pub fn precision(&self) -> u32 {
        *self.precision_cache.get_or_init(|| precision_of(&self.unscaled_value()))
    }

    pub fn negate(&self) -> Self {
        match self.compact() {
            Some(c) if c != INFLATED && c != i64::MIN => Self::from_compact(-c, self.scale),
            _ => Self::from_bigint(self.unscaled_value().negate(), self.scale),
        }
    }

    /// Attempts the compact-compact rescale-and-add in pure `i64`
    /// arithmetic, falling back to `None` (caller inflates) on any overflow.
    fn try_compact_add(a: i64, a_scale: i32, b: i64, b_scale: i32) -> Option<Self> {
        let max_scale = a_scale.max(b_scale);
        let diff = (max_scale - a_scale.min(b_scale)) as usize;
        let mult = *tables::LONG_TEN_POWERS_TABLE.get(diff)?;
        let (small, big) = if a_scale < b_scale { (a, b) } else { (b, a) };
        let rescaled_small = small.checked_mul(mult)?;
        let sum = rescaled_small.checked_add(big)?;
        Some(Self::from_compact(sum, max_scale))
    }

    /// Preferred scale is `max(a.scale, b.scale)`.
    pub fn add(&self, other: &Self) -> Self {
        let max_scale = self.scale.max(other.scale);
        if let (Some(a), Some(b)) = (self.compact(), other.compact()) {
            if let Some(sum) = Self::try_compact_add(a, self.scale, b, other.scale) {
                return sum;
            }
        }
        let a_unscaled = self.rescaled_unscaled(max_scale);
        let b_unscaled = other.rescaled_unscaled(max_scale);
        Self::from_bigint(a_unscaled.add(&b_unscaled), max_scale)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    fn rescaled_unscaled(&self, target_scale: i32) -> BigInt {
        if target_scale <= self.scale {
            self.unscaled_value()
        } else {
            self.unscaled_value().mul(&tables::big_ten_power((target_scale - self.scale) as u32))
        }
    }

    /// Preferred scale is `a.scale + b.scale`.
    pub fn mul(&self, other: &Self) -> Self {
        let new_scale = self.scale as i64 + other.scale as i64;
        let new_scale = new_scale.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        if let (Some(a), Some(b)) = (self.compact(), other.compact()) {
            if let Some(p) = a.checked_mul(b) {
                return Self::from_compact(p, new_scale);
            }
        }
        Self::from_bigint(self.unscaled_value().mul(&other.unscaled_value()), new_scale)
    }

    /// Division with an explicit result scale and rounding mode: aligns
    /// scales first, shifting whichever side is needed so the exact
    /// `dividend_unscaled / divisor_unscaled` lands on `scale` digits, then
    /// rounds.
    pub fn divide_with_scale(
        &self,
        divisor: &Self,
        scale: i32,
        mode: RoundingMode,
    ) -> Result<Self, BigNumError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero.into());
        }
        if self.is_zero() {
            return Ok(Self::from_compact(0, scale));
        }
        let preferred = self.scale as i64 - divisor.scale as i64;
        let shift = scale as i64 - preferred;

        if let (Some(a), Some(b)) = (self.compact(), divisor.compact()) {
            if let Some(q) = try_compact_divide(a, b, shift, mode)? {
                return Ok(Self::from_compact(q, scale));
            }
        }

        let (num, den) = if shift >= 0 {
            (self.unscaled_value().mul(&tables::big_ten_power(shift as u32)), divisor.unscaled_value())
        } else {
            (self.unscaled_value(), divisor.unscaled_value().mul(&tables::big_ten_power((-shift) as u32)))
        };
        let q = div::divide_and_round_bigint_bigint(&num, &den, mode)?;
        Ok(Self::from_bigint(q, scale))
    }

    /// Exact division: tries increasing scales until the division has no
    /// remainder, failing if none is found within a generous bound (e.g.
    /// `1/3` never terminates and must fail).
    pub fn divide_exact(&self, divisor: &Self) -> Result<Self, BigNumError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero.into());
        }
        if self.is_zero() {
            return Ok(Self::from_compact(0, (self.scale - divisor.scale).max(0)));
        }
        let base_scale = self.scale as i64 - divisor.scale as i64;
        let max_attempts = (self.precision() + divisor.precision()) as i64 + 64;
        for extra in 0..max_attempts {
            let candidate_scale = base_scale + extra;
            if candidate_scale > i32::MAX as i64 {
                break;
            }
            if let Ok(v) =
                self.divide_with_scale(divisor, candidate_scale as i32, RoundingMode::Unnecessary)
            {
                return Ok(v);
            }
        }
        Err(ArithmeticError::RoundingNecessary.into())
    }

    /// Division under a `MathContext`: rounds the quotient to
    /// `context.precision` significant digits (`precision == 0` means exact
    /// division). Widens the dividend by enough powers of ten that the raw
    /// quotient already carries at least `context.precision` digits before
    /// the final rounding pass; see DESIGN.md for the tradeoff against a
    /// normalized `[0.1, 1)` fast kernel.
    pub fn divide(&self, divisor: &Self, context: &MathContext) -> Result<Self, BigNumError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero.into());
        }
        if context.precision == 0 {
            return self.divide_exact(divisor);
        }
        let preferred_scale = self.scale as i64 - divisor.scale as i64;
        if self.is_zero() {
            let scale = preferred_scale.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            return Ok(Self::from_compact(0, scale));
        }

        let dividend_unscaled = self.unscaled_value();
        let divisor_unscaled = divisor.unscaled_value();
        let dividend_digits = precision_of(&dividend_unscaled) as i64;
        let divisor_digits = precision_of(&divisor_unscaled) as i64;

        let mut extra = (context.precision as i64 + 1) - (dividend_digits - divisor_digits);
        if extra < 0 {
            extra = 0;
        }
        loop {
            let scaled_dividend = if extra > 0 {
                dividend_unscaled.mul(&tables::big_ten_power(extra as u32))
            } else {
                dividend_unscaled.clone()
            };
            let (q, r) = scaled_dividend.div_rem(&divisor_unscaled)?;
            if r.is_zero() || precision_of(&q) > context.precision {
                let scale = (preferred_scale + extra).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                let rounded = if r.is_zero() {
                    q
                } else {
                    div::divide_and_round_bigint_bigint(
                        &scaled_dividend,
                        &divisor_unscaled,
                        context.rounding_mode,
                    )?
                };
                let (final_unscaled, final_scale) = div::do_round(rounded, scale, context)?;
                return Ok(Self::from_bigint(final_unscaled, final_scale));
            }
            extra += 1;
        }
    }

    /// Changes the scale, rounding the unscaled value if the new scale is
    /// smaller.
    pub fn set_scale(&self, new_scale: i32, mode: RoundingMode) -> Result<Self, BigNumError> {
        if new_scale == self.scale {
            return Ok(self.clone());
        }
        if self.is_zero() {
            return Ok(Self::from_compact(0, new_scale));
        }
        if new_scale > self.scale {
            let diff = (new_scale - self.scale) as u32;
            let scaled = self.unscaled_value().mul(&tables::big_ten_power(diff));
            return Ok(Self::from_bigint(scaled, new_scale));
        }
        let diff = (self.scale - new_scale) as u32;
        let divisor = tables::big_ten_power(diff);
        let rounded = div::divide_and_round_bigint_bigint(&self.unscaled_value(), &divisor, mode)?;
        Ok(Self::from_bigint(rounded, new_scale))
    }

    /// Removes trailing zeros from the unscaled value, decreasing the scale
    /// to match.
    pub fn strip_trailing_zeros(&self) -> Self {
        if self.is_zero() {
            return Self::from_compact(0, 0);
        }
        let ten = BigInt::from(10u64);
        let mut unscaled = self.unscaled_value();
        let mut scale = self.scale;
        loop {
            let (q, r) = unscaled.div_rem(&ten).expect("10 is non-zero");
            if !r.is_zero() {
                break;
            }
            unscaled = q;
            scale -= 1;
        }
        Self::from_bigint(unscaled, scale)
    }

    /// Equivalent to shifting the decimal point `n` places left: the scale
    /// grows by `n`, re-normalizing to a non-negative scale if that would
    /// otherwise go negative.
    pub fn move_point_left(&self, n: i32) -> Self {
        if n == 0 {
            return self.clone();
        }
        let new_scale = self.scale + n;
        let shifted = Self::from_bigint(self.unscaled_value(), new_scale);
        if new_scale < 0 {
            shifted
                .set_scale(0, RoundingMode::Unnecessary)
                .expect("multiplying by a power of ten is always exact")
        } else {
            shifted
        }
    }

    pub fn move_point_right(&self, n: i32) -> Self {
        self.move_point_left(-n)
    }

    /// Numeric comparison, ignoring scale: distinct from structural
    /// equality, which `strip_trailing_zeros` would otherwise break.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            if let (Some(a), Some(b)) = (self.compact(), other.compact()) {
                return a.cmp(&b);
            }
        }
        if self.signum() != other.signum() {
            return self.signum().cmp(&other.signum());
        }
        let diff = self.scale as i64 - other.scale as i64;
        if diff == 0 {
            self.unscaled_value().cmp(&other.unscaled_value())
        } else if diff > 0 {
            let rescaled_other = other.unscaled_value().mul(&tables::big_ten_power(diff as u32));
            self.unscaled_value().cmp(&rescaled_other)
        } else {
            let rescaled_self = self.unscaled_value().mul(&tables::big_ten_power((-diff) as u32));
            rescaled_self.cmp(&other.unscaled_value())
        }
    }

    pub fn to_plain_string(&self) -> String {
        format::to_string_plain(self)
    }

    pub fn to_scientific_string(&self) -> String {
        self.string_cache.get_or_init(|| format::to_string_scientific(self)).clone()
    }

    pub fn to_engineering_string(&self) -> String {
        format::to_string_engineering(self)
    }

    fn abs_digits(&self) -> String {
        self.unscaled_value().abs().to_radix_string(10)
    }
}

/// `10^n` as a `BigInt`, delegating to the shared append-only cache.
pub(crate) fn pow_of_ten(n: u32) -> BigInt {
    tables::big_ten_power(n)
}

/// Digit count of `|value|`; at least 1 for zero.
pub(crate) fn precision_of(value: &BigInt) -> u32 {
    if value.is_zero() {
        1
    } else {
        value.abs().to_radix_string(10).len() as u32
    }
}

/// Applies `shift` (may be negative) powers of ten to `dividend`/`divisor`
/// in pure `i64`/`i128` arithmetic and rounds, returning `None` if any step
/// would overflow — the compact fast path behind `divide_with_scale`, using
/// the 128-by-64 kernel from `div.rs` when the scale shift pushes the
/// dividend past 64 bits.
fn try_compact_divide(
    dividend: i64,
    divisor: i64,
    shift: i64,
    mode: RoundingMode,
) -> Result<Option<i64>, BigNumError> {
    if shift == 0 {
        return div::divide_and_round_i64_i64(dividend, divisor, mode).map(Some);
    }
    if shift > 0 && (shift as usize) < tables::LONG_TEN_POWERS_TABLE.len() {
        let scaled = (dividend as i128) * (tables::LONG_TEN_POWERS_TABLE[shift as usize] as i128);
        return div::divide_and_round_128_64(scaled, divisor, mode);
    }
    if shift < 0 && ((-shift) as usize) < tables::LONG_TEN_POWERS_TABLE.len() {
        let mult = tables::LONG_TEN_POWERS_TABLE[(-shift) as usize];
        if let Some(new_divisor) = divisor.checked_mul(mult) {
            return div::divide_and_round_i64_i64(dividend, new_divisor, mode).map(Some);
        }
    }
    Ok(None)
}

impl Clone for BigDecimal {
    fn clone(&self) -> Self {
        BigDecimal {
            int_compact: self.int_compact,
            int_val: self.int_val.clone(),
            scale: self.scale,
            precision_cache: OnceLock::new(),
            string_cache: OnceLock::new(),
        }
    }
}

impl fmt::Debug for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigDecimal({})", self.to_scientific_string())
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_scientific_string())
    }
}

impl FromStr for BigDecimal {
    type Err = BigNumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse(s)
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.compare_to(other) == Ordering::Equal
    }
}
impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}
impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bd(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn add_uses_max_scale() {
        let a = bd("1.5");
        let b = bd("2.25");
        let sum = a.add(&b);
        assert_eq!(sum.scale(), 2);
        assert_eq!(sum.to_plain_string(), "3.75");
    }

    #[test]
    fn mul_uses_sum_of_scales() {
        let a = bd("1.50");
        let b = bd("2.5");
        let p = a.mul(&b);
        assert_eq!(p.scale(), 3);
        assert_eq!(p.to_plain_string(), "3.750");
    }

    #[test]
    fn strip_trailing_zeros_is_value_equal() {
        let a = bd("3.7500");
        let stripped = a.strip_trailing_zeros();
        assert_eq!(stripped.compare_to(&a), Ordering::Equal);
        assert_eq!(stripped.to_plain_string(), "3.75");
    }

    #[test]
    fn divide_with_math_context_rounds_to_precision() {
        let a = bd("1");
        let b = bd("3");
        let q = a.divide(&b, &MathContext::new(10, RoundingMode::HalfUp)).unwrap();
        assert_eq!(q.to_plain_string(), "0.3333333333");

        let err = a.divide_exact(&b);
        assert!(err.is_err());
    }

    #[test]
    fn set_scale_rounds_or_truncates() {
        let a = bd("123.456");
        assert_eq!(a.set_scale(1, RoundingMode::HalfEven).unwrap().to_plain_string(), "123.5");
        assert_eq!(a.set_scale(1, RoundingMode::Down).unwrap().to_plain_string(), "123.4");
    }

    #[test]
    fn half_even_rounding_table() {
        let half = MathContext::new(1, RoundingMode::HalfEven);
        assert_eq!(bd("1.5").divide(&bd("1"), &half).unwrap().to_plain_string(), "2");
        assert_eq!(bd("2.5").divide(&bd("1"), &half).unwrap().to_plain_string(), "2");
        assert_eq!(bd("3.5").divide(&bd("1"), &half).unwrap().to_plain_string(), "4");
        assert_eq!(bd("-2.5").divide(&bd("1"), &half).unwrap().to_plain_string(), "-2");
    }

    #[test]
    fn compare_to_ignores_scale() {
        assert_eq!(bd("1.0").compare_to(&bd("1.00")), Ordering::Equal);
        assert!(bd("1.1") > bd("1.05"));
    }

    #[test]
    fn move_point_matches_scale_shift() {
        let a = bd("12.345");
        assert_eq!(a.move_point_right(2).to_plain_string(), "1234.5");
        assert_eq!(a.move_point_left(2).to_plain_string(), "0.12345");
    }

    #[test]
    fn negative_scale_plain_string_pads_zeros() {
        let a = BigDecimal::from_unscaled_bigint(BigInt::from(5i64), -2);
        assert_eq!(a.to_plain_string(), "500");
    }
}
