//! `BigDecimal` to string layout: plain, scientific, and engineering forms,
//! all starting from the same unsigned digit string and differing only in
//! where the decimal point and any exponent land.

use super::BigDecimal;

/// `coeff_len - 1 - scale`: the power-of-ten exponent the value would carry
/// in normalized scientific notation.
fn adjusted_exponent(digits_len: usize, scale: i32) -> i64 {
    digits_len as i64 - 1 - scale as i64
}

/// Plain (non-exponential) form: always a `sign? digits [. digits]`
/// rendering, zero-padding either side of the point as the scale demands.
pub(super) fn to_string_plain(value: &BigDecimal) -> String {
    let digits = value.abs_digits();
    let scale = value.scale();
    let sign = if value.signum() < 0 { "-" } else { "" };

    if scale == 0 {
        return format!("{sign}{digits}");
    }
    if scale < 0 {
        let zeros = "0".repeat((-scale) as usize);
        return format!("{sign}{digits}{zeros}");
    }
    let scale = scale as usize;
    if digits.len() > scale {
        let split = digits.len() - scale;
        format!("{sign}{}.{}", &digits[..split], &digits[split..])
    } else {
        let zeros = "0".repeat(scale - digits.len());
        format!("{sign}0.{zeros}{digits}")
    }
}

/// Plain when `scale >= 0` and the normalized exponent is `>= -6`,
/// scientific (`d.dddEn`) otherwise.
pub(super) fn to_string_scientific(value: &BigDecimal) -> String {
    let digits = value.abs_digits();
    let scale = value.scale();
    let adjusted = adjusted_exponent(digits.len(), scale);

    if scale >= 0 && adjusted >= -6 {
        return to_string_plain(value);
    }

    let sign = if value.signum() < 0 { "-" } else { "" };
    let mantissa = if digits.len() == 1 {
        digits.clone()
    } else {
        format!("{}.{}", &digits[..1], &digits[1..])
    };
    let exp_sign = if adjusted >= 0 { "+" } else { "" };
    format!("{sign}{mantissa}E{exp_sign}{adjusted}")
}

/// Like scientific, but the exponent is forced to a multiple of 3 by
/// sliding 1-3 digits into the mantissa's integer part.
pub(super) fn to_string_engineering(value: &BigDecimal) -> String {
    let digits = value.abs_digits();
    let scale = value.scale();
    let adjusted = adjusted_exponent(digits.len(), scale);

    if scale >= 0 && adjusted >= -6 {
        return to_string_plain(value);
    }

    let sign = if value.signum() < 0 { "-" } else { "" };
    let rem = adjusted.rem_euclid(3);
    let exp = adjusted - rem;
    let int_digit_count = (rem + 1) as usize;

    let padded_digits = if digits.len() < int_digit_count {
        format!("{}{}", digits, "0".repeat(int_digit_count - digits.len()))
    } else {
        digits
    };
    let (int_part, frac_part) = padded_digits.split_at(int_digit_count);
    let mantissa = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    let exp_sign = if exp >= 0 { "+" } else { "" };
    format!("{sign}{mantissa}E{exp_sign}{exp}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn bd(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn plain_form_handles_positive_and_negative_scale() {
        assert_eq!(to_string_plain(&bd("123.45")), "123.45");
        assert_eq!(to_string_plain(&bd("0.0045")), "0.0045");
    }

    #[test]
    fn scientific_switches_past_threshold() {
        assert_eq!(to_string_scientific(&bd("123.45")), "123.45");
        let tiny = BigDecimal::from_unscaled_bigint(crate::bigint::BigInt::from(1i64), 8);
        assert_eq!(to_string_scientific(&tiny), "1E-8");
    }

    #[test]
    fn engineering_exponent_is_multiple_of_three() {
        let v = BigDecimal::from_unscaled_bigint(crate::bigint::BigInt::from(12345i64), -5);
        assert_eq!(to_string_engineering(&v), "1.2345E+9");
    }

    #[test]
    fn engineering_slides_digits_for_non_multiple_exponent() {
        let tiny = BigDecimal::from_unscaled_bigint(crate::bigint::BigInt::from(1i64), 8);
        assert_eq!(to_string_engineering(&tiny), "10E-9");
    }
}
