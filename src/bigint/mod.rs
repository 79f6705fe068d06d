//! Arbitrary-precision signed integers.
//!
//! `BigInt` pairs a sign with a big-endian, leading-zero-free magnitude.
//! All arithmetic beyond a handful of machine words routes through
//! [`crate::mutable::MutableMag`]; this module owns the sign bookkeeping,
//! comparisons, small-integer interning, and the lazily-computed caches
//! (`bit_length`, `bit_count`, `lowest_set_bit`, `first_nonzero_int_num`) —
//! the only mutation permitted under an otherwise immutable public
//! contract.

pub mod bits;
pub mod convert;
pub mod mul;
pub mod pow;
pub mod prime;
pub mod sqrt;

use crate::error::{ArithmeticError, BigNumError};
use crate::mutable::MutableMag;
use std::cmp::Ordering;
use std::sync::OnceLock;

const MAX_CONSTANT: i64 = 16;

/// Arbitrary-precision signed integer.
pub struct BigInt {
    pub(crate) sign: i8,
    pub(crate) mag: Vec<u32>,
    bit_length_cache: OnceLock<u64>,
    bit_count_cache: OnceLock<u64>,
    lowest_set_bit_cache: OnceLock<i64>,
    first_nonzero_int_num_cache: OnceLock<i64>,
}

impl BigInt {
    pub(crate) fn from_parts(sign: i8, mut mag: Vec<u32>) -> Self {
        while mag.first() == Some(&0) {
            mag.remove(0);
        }
        let sign = if mag.is_empty() { 0 } else { sign };
        BigInt {
            sign,
            mag,
            bit_length_cache: OnceLock::new(),
            bit_count_cache: OnceLock::new(),
            lowest_set_bit_cache: OnceLock::new(),
            first_nonzero_int_num_cache: OnceLock::new(),
        }
    }

    pub(crate) fn from_mutable(sign: i8, mag: MutableMag) -> Self {
        if mag.is_zero() {
            return Self::zero();
        }
        Self::from_parts(sign, mag.to_be_vec())
    }

    pub(crate) fn as_mutable(&self) -> MutableMag {
        MutableMag::from_be_vec(self.mag.clone())
    }

    pub fn zero() -> Self {
        pos_const(0)
    }
    pub fn one() -> Self {
        pos_const(1)
    }
    pub fn two() -> Self {
        pos_const(2)
    }
    pub fn ten() -> Self {
        pos_const(10)
    }
    pub fn negative_one() -> Self {
        neg_const(1)
    }

    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }
    pub fn signum(&self) -> i32 {
        self.sign as i32
    }
    pub fn is_even(&self) -> bool {
        self.mag.last().map(|w| w & 1 == 0).unwrap_or(true)
    }
    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    pub fn abs(&self) -> Self {
        if self.sign < 0 {
            Self::from_parts(1, self.mag.clone())
        } else {
            self.clone()
        }
    }

    pub fn negate(&self) -> Self {
        Self::from_parts(-self.sign, self.mag.clone())
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        if self.sign == other.sign {
            let sum = self.as_mutable().add(&other.as_mutable());
            Self::from_mutable(self.sign, sum)
        } else {
            let (diff, cmp_sign) = self.as_mutable().subtract(&other.as_mutable());
            // cmp_sign is the sign of (self.mag - other.mag); combine with
            // self's sign to get the result's sign.
            let result_sign = (cmp_sign as i8) * self.sign;
            Self::from_mutable(result_sign, diff)
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let product = mul::multiply_mag(&self.as_mutable(), &other.as_mutable());
        Self::from_mutable(self.sign * other.sign, product)
    }

    pub fn square(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let product = mul::square_mag(&self.as_mutable());
        Self::from_mutable(1, product)
    }

    pub fn divide(&self, divisor: &Self) -> Result<Self, BigNumError> {
        Ok(self.div_rem(divisor)?.0)
    }

    pub fn rem(&self, divisor: &Self) -> Result<Self, BigNumError> {
        Ok(self.div_rem(divisor)?.1)
    }

    /// Truncating division: quotient rounds toward zero, remainder has the
    /// sign of the dividend (or is zero).
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), BigNumError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero.into());
        }
        if self.is_zero() {
            return Ok((Self::zero(), Self::zero()));
        }
        let (q, r) = self.as_mutable().divide(&divisor.as_mutable())?;
        let q = Self::from_mutable(self.sign * divisor.sign, q);
        let r = Self::from_mutable(self.sign, r);
        Ok((q, r))
    }

    /// Euclidean remainder in `[0, modulus)`. Fails if `modulus <= 0`.
    pub fn modulo(&self, modulus: &Self) -> Result<Self, BigNumError> {
        if modulus.sign <= 0 {
            return Err(ArithmeticError::NonPositiveModulus.into());
        }
        let (_, r) = self.div_rem(modulus)?;
        if r.sign < 0 {
            Ok(r.add(modulus))
        } else {
            Ok(r)
        }
    }

    pub fn gcd(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.abs();
        }
        if other.is_zero() {
            return self.abs();
        }
        let g = self.as_mutable().hybrid_gcd(&other.as_mutable());
        Self::from_mutable(1, g)
    }

    pub fn bit_length(&self) -> u64 {
        *self.bit_length_cache.get_or_init(|| self.as_mutable().bit_length())
    }

    /// For `sign >= 0`: popcount of the magnitude. For `sign < 0`: popcount
    /// of the magnitude plus its trailing-zero count, minus one — the
    /// two's-complement bit count.
    pub fn bit_count(&self) -> u64 {
        *self.bit_count_cache.get_or_init(|| {
            let popcount: u64 = self.mag.iter().map(|w| w.count_ones() as u64).sum();
            if self.sign >= 0 {
                popcount
            } else {
                let mut trailing = 0u64;
                for &w in self.mag.iter().rev() {
                    if w == 0 {
                        trailing += 32;
                    } else {
                        trailing += w.trailing_zeros() as u64;
                        break;
                    }
                }
                popcount + trailing - 1
            }
        })
    }

    pub fn lowest_set_bit(&self) -> i64 {
        *self.lowest_set_bit_cache.get_or_init(|| {
            if self.is_zero() {
                return -1;
            }
            let mut bits = 0i64;
            for &w in self.mag.iter().rev() {
                if w == 0 {
                    bits += 32;
                } else {
                    return bits + w.trailing_zeros() as i64;
                }
            }
            bits
        })
    }

    /// Little-endian index (0 = least significant) of the lowest non-zero
    /// magnitude word, or `mag.len()` if zero. The two's-complement bit view
    /// needs this to know where the borrow out of `x - 1` stops.
    pub(crate) fn first_nonzero_int_num(&self) -> i64 {
        *self.first_nonzero_int_num_cache.get_or_init(|| {
            for (i, &w) in self.mag.iter().enumerate().rev() {
                if w != 0 {
                    return (self.mag.len() - 1 - i) as i64;
                }
            }
            self.mag.len() as i64
        })
    }

    pub fn to_i64(&self) -> Option<i64> {
        if self.bit_length() > 63 {
            return None;
        }
        let mag = self.as_mutable().to_u64()?;
        let v = mag as i64;
        Some(if self.sign < 0 { -v } else { v })
    }

    pub fn to_i64_exact(&self) -> Result<i64, BigNumError> {
        self.to_i64()
            .ok_or_else(|| ArithmeticError::ConversionOutOfRange { type_name: "i64" }.into())
    }

    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let mut acc = 0f64;
        for &w in &self.mag {
            acc = acc * 4294967296.0 + w as f64;
        }
        if self.sign < 0 {
            -acc
        } else {
            acc
        }
    }
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        self.sign == other.sign && self.mag == other.mag
    }
}
impl Eq for BigInt {}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.sign != other.sign {
            return self.sign.cmp(&other.sign);
        }
        let mag_cmp = self.as_mutable().cmp_mag(&other.as_mutable());
        if self.sign < 0 {
            mag_cmp.reverse()
        } else {
            mag_cmp
        }
    }
}

impl std::hash::Hash for BigInt {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.sign.hash(state);
        self.mag.hash(state);
    }
}

impl Clone for BigInt {
    fn clone(&self) -> Self {
        Self::from_parts(self.sign, self.mag.clone())
    }
}

impl std::fmt::Debug for BigInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BigInt({})", self.to_radix_string(10))
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for BigInt {
            fn from(v: $t) -> Self {
                let v64 = v as i64;
                if v64 == 0 {
                    return BigInt::zero();
                }
                let sign: i8 = if v64 < 0 { -1 } else { 1 };
                let mag = (v64 as i128).unsigned_abs() as u64;
                BigInt::from_mutable(sign, MutableMag::from_u64(mag))
            }
        })*
    };
}
macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for BigInt {
            fn from(v: $t) -> Self {
                if v == 0 {
                    return BigInt::zero();
                }
                BigInt::from_mutable(1, MutableMag::from_u64(v as u64))
            }
        })*
    };
}
impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

fn pos_const(i: i64) -> BigInt {
    static CACHE: OnceLock<Vec<BigInt>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| {
        (0..=MAX_CONSTANT)
            .map(|n| {
                if n == 0 {
                    BigInt::from_parts(0, vec![])
                } else {
                    BigInt::from_parts(1, vec![n as u32])
                }
            })
            .collect()
    });
    cache[i as usize].clone()
}

fn neg_const(i: i64) -> BigInt {
    pos_const(i).negate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_inverse() {
        let a = BigInt::from(123456789i64);
        let b = BigInt::from(-987654321i64);
        assert_eq!(a.add(&b).sub(&b), a);
    }

    #[test]
    fn ordering_respects_sign() {
        assert!(BigInt::from(-5i64) < BigInt::from(3i64));
        assert!(BigInt::from(-5i64) < BigInt::from(-3i64));
        assert!(BigInt::from(5i64) > BigInt::from(3i64));
    }

    #[test]
    fn div_rem_truncates_toward_zero() {
        let a = BigInt::from(-7i64);
        let b = BigInt::from(2i64);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q, BigInt::from(-3i64));
        assert_eq!(r, BigInt::from(-1i64));
    }

    #[test]
    fn modulo_is_nonnegative() {
        let a = BigInt::from(-7i64);
        let m = BigInt::from(5i64);
        assert_eq!(a.modulo(&m).unwrap(), BigInt::from(3i64));
    }

    #[test]
    fn gcd_matches_known_value() {
        let a = BigInt::from(123456789123456789i64);
        let b = BigInt::from(987654321987654321i64);
        let g = a.gcd(&b);
        assert_eq!(a.rem(&g).unwrap(), BigInt::zero());
        assert_eq!(b.rem(&g).unwrap(), BigInt::zero());
    }

    #[test]
    fn interned_small_constants_share_value() {
        assert_eq!(BigInt::zero(), BigInt::from(0i64));
        assert_eq!(BigInt::one(), BigInt::from(1i64));
        assert_eq!(BigInt::ten(), BigInt::from(10i64));
    }
}
