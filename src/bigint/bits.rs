//! Bitwise operations over the two's-complement view of a `BigInt`.
//!
//! A negative `BigInt` is conceptually infinite two's complement: bit `i`
//! of `-x` is `!bit_i(x - 1)`. We materialize that view word-by-word on
//! demand from the sign-magnitude form rather than storing it.

use super::BigInt;
use crate::error::{ArgumentError, BigNumError};
use crate::mutable::MutableMag;

impl BigInt {
    /// Little-endian two's-complement word at index `n` (0 = least
    /// significant), as if the value had infinitely many sign-extension
    /// words beyond the magnitude.
    fn twos_complement_word(&self, n: usize) -> u32 {
        if self.sign >= 0 {
            return self.mag_word_le(n);
        }
        // -x in two's complement: invert(x - 1). The borrow out of `x - 1`
        // only reaches the lowest non-zero magnitude word; every word above
        // that is simply inverted, and every word below it is zero.
        let f = self.first_nonzero_int_num();
        match (n as i64).cmp(&f) {
            std::cmp::Ordering::Less => 0,
            std::cmp::Ordering::Equal => 0u32.wrapping_sub(self.mag_word_le(n)),
            std::cmp::Ordering::Greater => !self.mag_word_le(n),
        }
    }

    fn mag_word_le(&self, n: usize) -> u32 {
        let len = self.mag.len();
        if n >= len {
            0
        } else {
            self.mag[len - 1 - n]
        }
    }

    pub fn test_bit(&self, bit: u64) -> Result<bool, BigNumError> {
        let word_idx = (bit / 32) as usize;
        let bit_idx = (bit % 32) as u32;
        Ok((self.twos_complement_word(word_idx) >> bit_idx) & 1 == 1)
    }

    fn from_twos_complement_words(words: &[u32]) -> Self {
        // words are little-endian two's complement; determine sign from
        // the top word's high bit (sign-extended beyond words.len() is
        // implied by the caller having included enough words).
        let negative = words.last().map(|w| (w >> 31) & 1 == 1).unwrap_or(false);
        if !negative {
            let be: Vec<u32> = words.iter().rev().copied().collect();
            return BigInt::from_mutable(1, MutableMag::from_be_vec(be));
        }
        // magnitude = invert(words) + 1
        let mut inverted: Vec<u32> = words.iter().map(|w| !w).collect();
        let mut carry = 1u64;
        for w in inverted.iter_mut() {
            let s = *w as u64 + carry;
            *w = s as u32;
            carry = s >> 32;
        }
        let be: Vec<u32> = inverted.iter().rev().copied().collect();
        BigInt::from_mutable(-1, MutableMag::from_be_vec(be))
    }

    pub fn set_bit(&self, bit: u64) -> Result<Self, BigNumError> {
        self.with_bit(bit, |w, mask| w | mask)
    }
    pub fn clear_bit(&self, bit: u64) -> Result<Self, BigNumError> {
        self.with_bit(bit, |w, mask| w & !mask)
    }
    pub fn flip_bit(&self, bit: u64) -> Result<Self, BigNumError> {
        self.with_bit(bit, |w, mask| w ^ mask)
    }

    fn with_bit(&self, bit: u64, f: impl Fn(u32, u32) -> u32) -> Result<Self, BigNumError> {
        let _ = ArgumentError::NegativeBitIndex; // bit is unsigned here; negativity is rejected at the public i32 boundary.
        let word_idx = (bit / 32) as usize;
        let mask = 1u32 << (bit % 32);
        let n_words = (word_idx + 1).max(self.mag.len() + 1);
        let mut words: Vec<u32> = (0..n_words).map(|i| self.twos_complement_word(i)).collect();
        words[word_idx] = f(words[word_idx], mask);
        Ok(Self::from_twos_complement_words(&words))
    }

    fn bitwise(&self, other: &Self, f: impl Fn(u32, u32) -> u32) -> Self {
        let n_words = self.mag.len().max(other.mag.len()) + 1;
        let words: Vec<u32> = (0..n_words)
            .map(|i| f(self.twos_complement_word(i), other.twos_complement_word(i)))
            .collect();
        Self::from_twos_complement_words(&words)
    }

    pub fn and(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a & b)
    }
    pub fn or(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a | b)
    }
    pub fn xor(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a ^ b)
    }
    pub fn and_not(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a & !b)
    }
    pub fn not(&self) -> Self {
        // ~x == -x - 1
        self.negate().sub(&BigInt::one())
    }

    pub fn shift_left(&self, n: i64) -> Self {
        if n < 0 {
            return self.shift_right(-n);
        }
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        let shifted = self.as_mutable().shift_left(n as u64);
        Self::from_mutable(self.sign, shifted)
    }

    pub fn shift_right(&self, n: i64) -> Self {
        if n < 0 {
            return self.shift_left(-n);
        }
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        if self.sign > 0 {
            let shifted = self.as_mutable().shift_right(n as u64);
            return Self::from_mutable(1, shifted);
        }
        // Arithmetic shift right on a negative value: floor(self / 2^n),
        // equivalent to -((-self - 1) >> n) - 1 for two's-complement
        // semantics, computed via magnitude arithmetic.
        let one = BigInt::one();
        let pos = self.negate().sub(&one); // -self - 1 >= 0
        let shifted = pos.as_mutable().shift_right(n as u64);
        Self::from_mutable(1, shifted).negate().sub(&one)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_matches_shift_and_mask() {
        let v = BigInt::from(0b1011i64);
        assert!(v.test_bit(0).unwrap());
        assert!(!v.test_bit(2).unwrap());
        assert!(v.test_bit(3).unwrap());
    }

    #[test]
    fn set_clear_flip_roundtrip() {
        let v = BigInt::from(0i64);
        let s = v.set_bit(5).unwrap();
        assert!(s.test_bit(5).unwrap());
        let c = s.clear_bit(5).unwrap();
        assert_eq!(c, BigInt::zero());
        let f = v.flip_bit(3).unwrap();
        assert_eq!(f, BigInt::from(8i64));
    }

    #[test]
    fn and_or_xor_small_values() {
        let a = BigInt::from(0b1100i64);
        let b = BigInt::from(0b1010i64);
        assert_eq!(a.and(&b), BigInt::from(0b1000i64));
        assert_eq!(a.or(&b), BigInt::from(0b1110i64));
        assert_eq!(a.xor(&b), BigInt::from(0b0110i64));
    }

    #[test]
    fn not_matches_negate_minus_one() {
        let a = BigInt::from(42i64);
        assert_eq!(a.not(), BigInt::from(-43i64));
    }

    #[test]
    fn shift_left_right_roundtrip() {
        let a = BigInt::from(123456789i64);
        let shifted = a.shift_left(40);
        assert_eq!(shifted.shift_right(40), a);
    }

    #[test]
    fn shift_right_negative_is_floor_division() {
        let a = BigInt::from(-7i64);
        assert_eq!(a.shift_right(1), BigInt::from(-4i64));
    }
}
