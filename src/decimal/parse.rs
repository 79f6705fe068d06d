//! String to `BigDecimal` parsing: a small character-by-character state
//! machine rather than a regex or split-on-'.'/'e' shortcut, so every
//! malformed input is rejected at the exact character that makes it
//! malformed.

use super::BigDecimal;
use crate::bigint::BigInt;
use crate::error::{BigNumError, FormatError};

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Sign,
    IntegerPart,
    FractionPart,
    ExponentSign,
    ExponentDigits,
}

pub(super) fn parse(s: &str) -> Result<BigDecimal, BigNumError> {
    if s.is_empty() {
        return Err(FormatError::Empty.into());
    }
    let chars: Vec<char> = s.chars().collect();

    let mut state = State::Sign;
    let mut negative = false;
    let mut digits = String::new();
    let mut frac_digit_count: i64 = 0;
    let mut exponent_negative = false;
    let mut exponent_digits = String::new();
    let mut saw_any_digit = false;
    let mut saw_exponent_digit = false;

    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        match state {
            State::Sign => {
                match ch {
                    '-' => {
                        negative = true;
                        i += 1;
                    }
                    '+' => {
                        i += 1;
                    }
                    _ => {}
                }
                state = State::IntegerPart;
            }
            State::IntegerPart => {
                if ch.is_ascii_digit() {
                    digits.push(ch);
                    saw_any_digit = true;
                    i += 1;
                } else if ch == '.' {
                    state = State::FractionPart;
                    i += 1;
                } else if ch == 'e' || ch == 'E' {
                    state = State::ExponentSign;
                    i += 1;
                } else {
                    return Err(FormatError::UnexpectedChar { ch, position: i }.into());
                }
            }
            State::FractionPart => {
                if ch.is_ascii_digit() {
                    digits.push(ch);
                    frac_digit_count += 1;
                    saw_any_digit = true;
                    i += 1;
                } else if ch == 'e' || ch == 'E' {
                    state = State::ExponentSign;
                    i += 1;
                } else {
                    return Err(FormatError::UnexpectedChar { ch, position: i }.into());
                }
            }
            State::ExponentSign => {
                match ch {
                    '-' => {
                        exponent_negative = true;
                        i += 1;
                    }
                    '+' => {
                        i += 1;
                    }
                    _ => {}
                }
                state = State::ExponentDigits;
            }
            State::ExponentDigits => {
                if ch.is_ascii_digit() {
                    exponent_digits.push(ch);
                    saw_exponent_digit = true;
                    i += 1;
                } else {
                    return Err(FormatError::UnexpectedChar { ch, position: i }.into());
                }
            }
        }
    }

    match state {
        State::ExponentSign => return Err(FormatError::MissingDigits.into()),
        State::ExponentDigits if !saw_exponent_digit => {
            return Err(FormatError::MissingDigits.into())
        }
        _ => {}
    }
    if !saw_any_digit {
        return Err(FormatError::MissingDigits.into());
    }

    let signed_exponent: i64 = if exponent_digits.is_empty() {
        0
    } else {
        let magnitude: i64 =
            exponent_digits.parse().map_err(|_| FormatError::ExponentOverflow)?;
        if exponent_negative {
            -magnitude
        } else {
            magnitude
        }
    };

    let scale = frac_digit_count - signed_exponent;
    let scale: i32 =
        scale.try_into().map_err(|_| BigNumError::from(FormatError::ExponentOverflow))?;

    let trimmed = digits.trim_start_matches('0');
    let unscaled = if trimmed.is_empty() {
        BigInt::zero()
    } else {
        BigInt::parse_radix(trimmed, 10)?
    };
    let unscaled = if negative { unscaled.negate() } else { unscaled };

    Ok(BigDecimal::from_unscaled_bigint(unscaled, scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::context::RoundingMode;

    #[test]
    fn parses_plain_decimal() {
        let d = parse("123.456").unwrap();
        assert_eq!(d.scale(), 3);
        assert_eq!(d.to_plain_string(), "123.456");
    }

    #[test]
    fn parses_negative_with_exponent() {
        let d = parse("-1.5e3").unwrap();
        assert_eq!(d.scale(), -2);
        assert_eq!(d.to_plain_string(), "-1500");
    }

    #[test]
    fn parses_leading_plus_and_explicit_exponent_sign() {
        let d = parse("+2.5E+2").unwrap();
        assert_eq!(d.to_plain_string(), "250");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse("").is_err());
    }

    #[test]
    fn rejects_sign_only() {
        assert!(parse("-").is_err());
        assert!(parse("-.").is_err());
    }

    #[test]
    fn rejects_dangling_exponent() {
        assert!(parse("1e").is_err());
        assert!(parse("1e-").is_err());
    }

    #[test]
    fn rejects_unexpected_character() {
        assert!(parse("12a4").is_err());
        assert!(parse("1.2.3").is_err());
    }

    #[test]
    fn zero_with_scale_round_trips() {
        let d = parse("0.00").unwrap();
        assert_eq!(d.scale(), 2);
        assert!(d.is_zero());
        assert_eq!(d.set_scale(0, RoundingMode::Unnecessary).unwrap().to_plain_string(), "0");
    }
}
