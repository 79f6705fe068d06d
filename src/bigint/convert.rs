//! Radix-to-magnitude conversion, including recursive Schönhage base
//! conversion for large magnitudes.

use super::BigInt;
use crate::error::{BigNumError, FormatError};
use crate::mutable::MutableMag;
use crate::tables::{self, MAX_RADIX, MIN_RADIX, SCHOENHAGE_BASE_CONVERSION_THRESHOLD};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::OnceLock;

impl BigInt {
    pub fn parse_radix(s: &str, radix: u32) -> Result<Self, BigNumError> {
        if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
            return Err(FormatError::RadixOutOfRange { radix }.into());
        }
        if s.is_empty() {
            return Err(FormatError::Empty.into());
        }
        let bytes: Vec<char> = s.chars().collect();
        let (sign, digits_start) = match bytes[0] {
            '-' => (-1i8, 1),
            '+' => (1i8, 1),
            _ => (1i8, 0),
        };
        if digits_start >= bytes.len() {
            return Err(FormatError::SignOnly.into());
        }
        let digits = &bytes[digits_start..];
        if digits.is_empty() {
            return Err(FormatError::MissingDigits.into());
        }
        for &ch in digits {
            if ch.to_digit(radix).is_none() {
                return Err(FormatError::InvalidDigit { ch, radix }.into());
            }
        }

        let digits_per_int = tables::DIGITS_PER_INT[radix as usize] as usize;
        let int_radix = tables::INT_RADIX[radix as usize];
        let num_digits = digits.len();
        let first_group_len = {
            let r = num_digits % digits_per_int;
            if r == 0 && num_digits > 0 {
                digits_per_int
            } else {
                r
            }
        };

        let mut acc = MutableMag::zero();
        let mut idx = 0usize;
        let mut group_len = first_group_len;
        while idx < num_digits {
            let group: String = digits[idx..idx + group_len].iter().collect();
            let group_value = u32::from_str_radix(&group, radix)
                .expect("already validated as digits of this radix");
            let multiplier = if group_len == digits_per_int {
                int_radix
            } else {
                radix.pow(group_len as u32)
            };
            acc = acc.mul_word(multiplier).add(&MutableMag::from_u64(group_value as u64));
            idx += group_len;
            group_len = digits_per_int;
        }

        Ok(BigInt::from_mutable(sign, acc))
    }

    /// Formats `|self|` (with a leading `-` for negative values) in the
    /// given radix. Dispatches between the "small" repeated-division path
    /// and recursive Schönhage conversion.
    pub fn to_radix_string(&self, radix: u32) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let digits = if self.mag.len() <= SCHOENHAGE_BASE_CONVERSION_THRESHOLD {
            format_small(&self.abs(), radix)
        } else {
            format_schoenhage(&self.abs(), radix, None)
        };
        if self.sign < 0 {
            format!("-{digits}")
        } else {
            digits
        }
    }
}

fn format_small(value: &BigInt, radix: u32) -> String {
    let digits_per_long = tables::DIGITS_PER_LONG[radix as usize] as usize;
    let divisor = tables::long_radix(radix);
    let mut groups: Vec<String> = Vec::new();
    let mut remaining = value.clone();
    while !remaining.is_zero() {
        let (q, r) = remaining.div_rem(&divisor).expect("divisor is non-zero");
        let r_val = r.to_i64().expect("remainder fits in i64 by construction");
        if q.is_zero() {
            groups.push(radix_digits(r_val as u64, radix));
        } else {
            groups.push(format!(
                "{:0>width$}",
                radix_digits(r_val as u64, radix),
                width = digits_per_long
            ));
        }
        remaining = q;
    }
    groups.reverse();
    groups.concat()
}

fn radix_digits(mut v: u64, radix: u32) -> String {
    if v == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while v > 0 {
        let d = (v % radix as u64) as u32;
        digits.push(std::char::from_digit(d, radix).unwrap());
        v /= radix as u64;
    }
    digits.reverse();
    digits.into_iter().collect()
}

/// Per-radix cache of `radix^(2^k)` powers, append-only and shared across
/// calls.
fn radix_power_cache() -> &'static Mutex<HashMap<u32, Vec<BigInt>>> {
    static CACHE: OnceLock<Mutex<HashMap<u32, Vec<BigInt>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn power_of_radix(radix: u32, k: u32) -> BigInt {
    let mut cache = radix_power_cache().lock().unwrap();
    let entry = cache.entry(radix).or_insert_with(|| vec![BigInt::from(radix as u64)]);
    while entry.len() <= k as usize {
        let last = entry.last().unwrap().clone();
        entry.push(last.square());
    }
    entry[k as usize].clone()
}

/// Recursive Schönhage base conversion: split `value` at `radix^(2^n)`,
/// recurse on quotient and remainder, concatenate with zero-padding so the
/// two halves line up positionally.
fn format_schoenhage(value: &BigInt, radix: u32, digits: Option<usize>) -> String {
    if value.mag.len() <= SCHOENHAGE_BASE_CONVERSION_THRESHOLD {
        let s = format_small(value, radix);
        return match digits {
            Some(d) if s.len() < d => format!("{:0>width$}", s, width = d),
            _ => s,
        };
    }
    let b = value.bit_length() as f64;
    let ln_radix = (radix as f64).ln();
    let n = ((b * std::f64::consts::LN_2 / ln_radix).log2().round() as i64 - 1).max(0) as u32;
    let v = power_of_radix(radix, n);
    let (q, r) = value.div_rem(&v).expect("v is non-zero");
    let split_digits = 1usize << n;
    let hi_digits = digits.map(|d| d.saturating_sub(split_digits));
    let hi = format_schoenhage(&q, radix, hi_digits);
    let lo = format_schoenhage(&r, radix, Some(split_digits));
    format!("{hi}{lo}")
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_radix_string(10))
    }
}

impl FromStr for BigInt {
    type Err = BigNumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::parse_radix(s, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_decimal() {
        let s = "123456789012345678901234567890";
        let v = BigInt::from_str(s).unwrap();
        assert_eq!(v.to_string(), s);
    }

    #[test]
    fn roundtrip_negative() {
        let v = BigInt::from_str("-42").unwrap();
        assert_eq!(v.to_string(), "-42");
    }

    #[test]
    fn roundtrip_hex() {
        let v = BigInt::parse_radix("1a2b3c4d5e6f", 16).unwrap();
        assert_eq!(v.to_radix_string(16), "1a2b3c4d5e6f");
    }

    #[test]
    fn invalid_digit_is_rejected() {
        assert!(BigInt::parse_radix("12a4", 10).is_err());
    }

    #[test]
    fn large_value_uses_schoenhage_path_and_roundtrips() {
        let base = BigInt::from(2i64).pow(30).unwrap();
        let big = base.pow(40).unwrap(); // ~1200 bits, well past the 20-word (640-bit) threshold
        let s = big.to_string();
        let back = BigInt::from_str(&s).unwrap();
        assert_eq!(back, big);
    }

    #[test]
    fn multiplication_matches_known_product() {
        let a = BigInt::from_str("12345678901234567890").unwrap();
        let b = BigInt::from_str("98765432109876543210").unwrap();
        let expected = BigInt::from_str("1219326311370217952237463801111263526900").unwrap();
        assert_eq!(a.mul(&b), expected);
    }
}
