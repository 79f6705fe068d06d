//! Arbitrary-precision signed integer and decimal arithmetic.
//!
//! [`BigInt`] is a sign-magnitude integer of unbounded size; [`BigDecimal`]
//! pairs a `BigInt` unscaled value with a base-10 scale for fixed-point
//! decimal arithmetic. Both are immutable value types: every operation
//! returns a new value rather than mutating `self`, backed internally by
//! the in-place magnitude engine in [`mutable::MutableMag`].
//!
//! Random sampling (probable-prime search, uniform magnitude generation)
//! never reaches for a global RNG: callers inject a [`RandomSource`]
//! (blanket-implemented for any `rand_core::RngCore`) at the call site.

pub mod bigint;
pub mod decimal;
pub mod error;
pub mod rand_source;
mod mutable;
mod tables;
mod word;

#[cfg(feature = "serde")]
mod serde_support;

pub use bigint::BigInt;
pub use decimal::context::{MathContext, RoundingMode};
pub use decimal::BigDecimal;
pub use error::{ArgumentError, ArithmeticError, BigNumError, BigNumResult, FormatError};
pub use rand_source::RandomSource;
