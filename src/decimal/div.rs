//! Divide-and-round kernels `BigDecimal` division bottoms out in, plus
//! `need_increment`/`do_round`.

use super::context::{MathContext, RoundingMode};
use crate::bigint::BigInt;
use crate::error::{ArithmeticError, BigNumError};
use crate::word;

/// Decides whether `q` should move one step further from zero (`q + qsign`)
/// given the discarded remainder `r` and the rounding mode. `divisor` and
/// `r` are both taken as non-negative magnitudes; `qsign` carries the sign
/// of the true mathematical quotient.
pub(crate) fn need_increment(
    divisor_abs: i64,
    mode: RoundingMode,
    qsign: i64,
    q: i64,
    r: i64,
) -> bool {
    if r == 0 {
        return false;
    }
    match mode {
        RoundingMode::Up => true,
        RoundingMode::Down => false,
        RoundingMode::Ceiling => qsign > 0,
        RoundingMode::Floor => qsign < 0,
        RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
            let cmp = (2 * r.unsigned_abs()).cmp(&divisor_abs.unsigned_abs());
            match cmp {
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => match mode {
                    RoundingMode::HalfDown => false,
                    RoundingMode::HalfUp => true,
                    RoundingMode::HalfEven => q % 2 != 0,
                    _ => unreachable!(),
                },
            }
        }
        RoundingMode::Unnecessary => false,
    }
}

fn need_increment_bigint(
    divisor_abs: &BigInt,
    mode: RoundingMode,
    qsign: i64,
    q: &BigInt,
    r: &BigInt,
) -> bool {
    if r.is_zero() {
        return false;
    }
    match mode {
        RoundingMode::Up => true,
        RoundingMode::Down => false,
        RoundingMode::Ceiling => qsign > 0,
        RoundingMode::Floor => qsign < 0,
        RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
            let twice_r = r.abs().mul(&BigInt::from(2i64));
            let cmp = twice_r.cmp(&divisor_abs.abs());
            match cmp {
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => match mode {
                    RoundingMode::HalfDown => false,
                    RoundingMode::HalfUp => true,
                    RoundingMode::HalfEven => q.is_odd(),
                    _ => unreachable!(),
                },
            }
        }
        RoundingMode::Unnecessary => false,
    }
}

/// `dividend / divisor`, rounded per `mode`. Both `i64`.
pub(crate) fn divide_and_round_i64_i64(
    dividend: i64,
    divisor: i64,
    mode: RoundingMode,
) -> Result<i64, BigNumError> {
    let (r, q) = if dividend < 0 && divisor != 1 && divisor != -1 {
        word::div_rem_neg_long(dividend, divisor)
    } else {
        (dividend % divisor, dividend / divisor)
    };
    let qsign = if (dividend < 0) == (divisor < 0) { 1 } else { -1 };
    if r == 0 {
        return Ok(q);
    }
    if mode == RoundingMode::Unnecessary {
        return Err(ArithmeticError::RoundingNecessary.into());
    }
    if need_increment(divisor, mode, qsign, q, r) {
        Ok(q + qsign)
    } else {
        Ok(q)
    }
}

/// `dividend / divisor`, rounded, where `dividend` is a 128-bit value (the
/// product of two `i64`s, too wide for an `i64` quotient computation but
/// still narrow enough that the whole division fits in a machine register
/// pair). Returns `None` if the exact quotient does not fit in `i64` — the
/// caller falls back to full `BigInt` division.
pub(crate) fn divide_and_round_128_64(
    dividend: i128,
    divisor: i64,
    mode: RoundingMode,
) -> Result<Option<i64>, BigNumError> {
    let d = divisor as i128;
    let q128 = dividend / d;
    let r128 = dividend - q128 * d;
    if q128 > i64::MAX as i128 || q128 < i64::MIN as i128 {
        return Ok(None);
    }
    let q = q128 as i64;
    let r = r128 as i64;
    let qsign = if (dividend < 0) == (divisor < 0) { 1 } else { -1 };
    if r == 0 {
        return Ok(Some(q));
    }
    if mode == RoundingMode::Unnecessary {
        return Err(ArithmeticError::RoundingNecessary.into());
    }
    if need_increment(divisor, mode, qsign, q, r) {
        let incremented = (q as i128) + (qsign as i128);
        if incremented > i64::MAX as i128 || incremented < i64::MIN as i128 {
            return Ok(None);
        }
        Ok(Some(incremented as i64))
    } else {
        Ok(Some(q))
    }
}

pub(crate) fn divide_and_round_bigint_i64(
    dividend: &BigInt,
    divisor: i64,
    mode: RoundingMode,
) -> Result<BigInt, BigNumError> {
    divide_and_round_bigint_bigint(dividend, &BigInt::from(divisor), mode)
}

pub(crate) fn divide_and_round_bigint_bigint(
    dividend: &BigInt,
    divisor: &BigInt,
    mode: RoundingMode,
) -> Result<BigInt, BigNumError> {
    let (q, r) = dividend.div_rem(divisor)?;
    let qsign = if dividend.signum() == divisor.signum() { 1 } else { -1 };
    if r.is_zero() {
        return Ok(q);
    }
    if mode == RoundingMode::Unnecessary {
        return Err(ArithmeticError::RoundingNecessary.into());
    }
    if need_increment_bigint(divisor, mode, qsign, &q, &r) {
        Ok(q.add(&BigInt::from(qsign)))
    } else {
        Ok(q)
    }
}

/// Repeatedly divides `value` down to `context.precision` significant
/// digits. Iterates because a trailing carry (`999 -> 1000`) can add a
/// digit back that itself needs trimming.
pub(crate) fn do_round(
    mut value: BigInt,
    mut scale: i32,
    context: &MathContext,
) -> Result<(BigInt, i32), BigNumError> {
    if context.precision == 0 {
        return Ok((value, scale));
    }
    loop {
        let digits = super::precision_of(&value);
        if digits <= context.precision {
            return Ok((value, scale));
        }
        let drop = digits - context.precision;
        let divisor = super::pow_of_ten(drop);
        value = divide_and_round_bigint_bigint(&value, &divisor, context.rounding_mode)?;
        scale -= drop as i32;
        if super::precision_of(&value) <= context.precision {
            return Ok((value, scale));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i64_division_half_up_rounds_away_from_zero() {
        assert_eq!(divide_and_round_i64_i64(10, 3, RoundingMode::HalfUp).unwrap(), 3);
        assert_eq!(divide_and_round_i64_i64(-10, 3, RoundingMode::HalfUp).unwrap(), -3);
        assert_eq!(divide_and_round_i64_i64(5, 2, RoundingMode::HalfUp).unwrap(), 3);
    }

    #[test]
    fn i64_division_half_even_rounds_to_even() {
        assert_eq!(divide_and_round_i64_i64(5, 2, RoundingMode::HalfEven).unwrap(), 2);
        assert_eq!(divide_and_round_i64_i64(15, 10, RoundingMode::HalfEven).unwrap(), 2);
        assert_eq!(divide_and_round_i64_i64(25, 10, RoundingMode::HalfEven).unwrap(), 2);
    }

    #[test]
    fn i64_division_unnecessary_fails_on_remainder() {
        assert!(divide_and_round_i64_i64(10, 3, RoundingMode::Unnecessary).is_err());
        assert!(divide_and_round_i64_i64(10, 2, RoundingMode::Unnecessary).is_ok());
    }

    #[test]
    fn kernel_128_64_matches_i64_kernel_when_it_fits() {
        let got = divide_and_round_128_64(100i128, 3, RoundingMode::HalfUp).unwrap().unwrap();
        let expected = divide_and_round_i64_i64(100, 3, RoundingMode::HalfUp).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn kernel_128_64_reports_overflow() {
        let huge = (i64::MAX as i128) * 10;
        assert_eq!(divide_and_round_128_64(huge, 1, RoundingMode::Down).unwrap(), None);
    }
}
