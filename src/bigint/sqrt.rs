//! `sqrt`/`sqrt_and_remainder`: integer square root via
//! `MutableMag::sqrt`'s Newton iteration, exposed on the signed type.

use super::BigInt;
use crate::error::{ArithmeticError, BigNumError};

impl BigInt {
    /// Largest `s >= 0` with `s*s <= self`. Errors on negative `self`.
    pub fn sqrt(&self) -> Result<Self, BigNumError> {
        Ok(self.sqrt_and_remainder()?.0)
    }

    /// `(s, r)` with `s*s <= self < (s+1)*(s+1)` and `r = self - s*s`.
    pub fn sqrt_and_remainder(&self) -> Result<(Self, Self), BigNumError> {
        if self.sign < 0 {
            return Err(ArithmeticError::NegativeSqrt.into());
        }
        let (s, r) = self.as_mutable().sqrt();
        Ok((Self::from_mutable(1, s), Self::from_mutable(1, r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_square_has_zero_remainder() {
        let (s, r) = BigInt::from(144i64).sqrt_and_remainder().unwrap();
        assert_eq!(s, BigInt::from(12i64));
        assert!(r.is_zero());
    }

    #[test]
    fn nonperfect_square_remainder_matches_definition() {
        let n = BigInt::from(1_000_000_007i64).pow(2).unwrap().add(&BigInt::from(12345i64));
        let (s, r) = n.sqrt_and_remainder().unwrap();
        assert_eq!(s.mul(&s).add(&r), n);
        assert!(s.add(&BigInt::one()).mul(&s.add(&BigInt::one())) > n);
    }

    #[test]
    fn zero_has_zero_sqrt() {
        let (s, r) = BigInt::zero().sqrt_and_remainder().unwrap();
        assert!(s.is_zero());
        assert!(r.is_zero());
    }

    #[test]
    fn negative_is_rejected() {
        assert!(BigInt::from(-1i64).sqrt().is_err());
    }
}
