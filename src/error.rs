//! Error kinds for the crate's public contract.
//!
//! Three kinds suffice: malformed input, a well-formed operation that
//! cannot produce a mathematically valid result, and an out-of-domain
//! argument. Each gets its own `Display`/`std::error::Error` impl, written
//! by hand rather than reaching for a derive macro.

use std::{error, fmt};

/// Malformed string input: empty, misplaced sign, non-digit character,
/// exponent overflow, radix out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    Empty,
    SignOnly,
    InvalidDigit { ch: char, radix: u32 },
    RadixOutOfRange { radix: u32 },
    ExponentOverflow,
    UnexpectedChar { ch: char, position: usize },
    MissingDigits,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Empty => write!(f, "input string is empty"),
            FormatError::SignOnly => write!(f, "input string contains only a sign"),
            FormatError::InvalidDigit { ch, radix } => {
                write!(f, "character '{ch}' is not a valid digit in radix {radix}")
            }
            FormatError::RadixOutOfRange { radix } => {
                write!(f, "radix {radix} is out of range [2, 36]")
            }
            FormatError::ExponentOverflow => write!(f, "exponent does not fit in scale range"),
            FormatError::UnexpectedChar { ch, position } => {
                write!(f, "unexpected character '{ch}' at position {position}")
            }
            FormatError::MissingDigits => write!(f, "expected at least one digit"),
        }
    }
}

impl error::Error for FormatError {}

/// A well-formed operation whose result is not mathematically defined, or
/// whose exact representation does not exist within the requested
/// constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    DivisionByZero,
    NonPositiveModulus,
    NegativeExponent,
    NotInvertible,
    RoundingNecessary,
    ConversionOutOfRange { type_name: &'static str },
    NegativeSqrt,
    MagnitudeOverflow,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticError::DivisionByZero => write!(f, "division by zero"),
            ArithmeticError::NonPositiveModulus => write!(f, "modulus must be positive"),
            ArithmeticError::NegativeExponent => write!(f, "negative exponent"),
            ArithmeticError::NotInvertible => write!(f, "value has no inverse modulo m"),
            ArithmeticError::RoundingNecessary => {
                write!(f, "rounding necessary but mode is UNNECESSARY")
            }
            ArithmeticError::ConversionOutOfRange { type_name } => {
                write!(f, "value does not fit exactly in {type_name}")
            }
            ArithmeticError::NegativeSqrt => write!(f, "square root of negative value"),
            ArithmeticError::MagnitudeOverflow => {
                write!(f, "result magnitude exceeds the maximum supported length")
            }
        }
    }
}

impl error::Error for ArithmeticError {}

/// An out-of-domain argument to an otherwise well-formed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    NegativeBitIndex,
    NegativeBitCount,
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::NegativeBitIndex => write!(f, "bit index must not be negative"),
            ArgumentError::NegativeBitCount => write!(f, "bit count must not be negative"),
        }
    }
}

impl error::Error for ArgumentError {}

/// Umbrella error type returned at the public API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BigNumError {
    Format(FormatError),
    Arithmetic(ArithmeticError),
    Argument(ArgumentError),
}

impl fmt::Display for BigNumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BigNumError::Format(e) => fmt::Display::fmt(e, f),
            BigNumError::Arithmetic(e) => fmt::Display::fmt(e, f),
            BigNumError::Argument(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl error::Error for BigNumError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            BigNumError::Format(e) => Some(e),
            BigNumError::Arithmetic(e) => Some(e),
            BigNumError::Argument(e) => Some(e),
        }
    }
}

impl From<FormatError> for BigNumError {
    fn from(e: FormatError) -> Self {
        BigNumError::Format(e)
    }
}

impl From<ArithmeticError> for BigNumError {
    fn from(e: ArithmeticError) -> Self {
        BigNumError::Arithmetic(e)
    }
}

impl From<ArgumentError> for BigNumError {
    fn from(e: ArgumentError) -> Self {
        BigNumError::Argument(e)
    }
}

pub type BigNumResult<T> = Result<T, BigNumError>;
