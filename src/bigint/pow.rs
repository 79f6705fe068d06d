//! `pow`, `mod_pow` (Montgomery odd-modulus path + even-modulus CRT split),
//! and `mod_inverse`.

use super::mul;
use super::BigInt;
use crate::error::{ArithmeticError, BigNumError};
use crate::tables;

impl BigInt {
    pub fn is_one(&self) -> bool {
        self.sign == 1 && self.mag == [1]
    }

    /// Non-negative integer exponentiation. Factors out the trailing-zero
    /// bits of `|self|` up front so repeated squaring runs over the odd
    /// part only, then shifts the accumulated powers of two back in.
    pub fn pow(&self, exponent: u32) -> Result<Self, BigNumError> {
        if exponent == 0 {
            return Ok(Self::one());
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let v = self.lowest_set_bit().max(0) as u64;
        let shift_total = v
            .checked_mul(exponent as u64)
            .ok_or(ArithmeticError::MagnitudeOverflow)?;
        let odd_part = self.shift_right(v as i64).abs();

        let mut result = Self::one();
        let mut base = odd_part;
        let mut e = exponent;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.square();
            }
        }
        if shift_total > 0 {
            result = result.shift_left(shift_total as i64);
        }
        if self.sign < 0 && exponent % 2 == 1 {
            result = result.negate();
        }
        if result.mag.len() > tables::MAX_MAG_LEN {
            return Err(ArithmeticError::MagnitudeOverflow.into());
        }
        Ok(result)
    }

    /// `self^exponent mod modulus`, `modulus > 0`. Negative exponents
    /// require `self` invertible mod `modulus`.
    pub fn mod_pow(&self, exponent: &Self, modulus: &Self) -> Result<Self, BigNumError> {
        if modulus.sign <= 0 {
            return Err(ArithmeticError::NonPositiveModulus.into());
        }
        if modulus.is_one() {
            return Ok(Self::zero());
        }
        if exponent.is_zero() {
            return Ok(Self::one());
        }
        if self.is_zero() {
            return if exponent.sign > 0 {
                Ok(Self::zero())
            } else {
                Err(ArithmeticError::NotInvertible.into())
            };
        }

        let (exponent, invert_result) =
            if exponent.sign < 0 { (exponent.negate(), true) } else { (exponent.clone(), false) };

        let base = self.modulo(modulus)?;
        let result = if modulus.is_odd() {
            odd_mod_pow(&base, &exponent, modulus)
        } else {
            even_mod_pow(&base, &exponent, modulus)?
        };

        if invert_result {
            result.mod_inverse(modulus)
        } else {
            Ok(result)
        }
    }

    /// Modular inverse. An odd modulus goes straight through
    /// [`almost_inverse`] (Schroeppel's almost-inverse algorithm plus the
    /// Newton-Hensel fixup); an even modulus is split into its odd part and
    /// a power of two, inverted separately, and recombined by CRT.
    pub fn mod_inverse(&self, modulus: &Self) -> Result<Self, BigNumError> {
        if modulus.sign <= 0 {
            return Err(ArithmeticError::NonPositiveModulus.into());
        }
        if modulus.is_one() {
            return Ok(Self::zero());
        }
        let a = self.modulo(modulus)?;
        if modulus.is_odd() {
            almost_inverse(&a, modulus)
        } else {
            mod_inverse_even(&a, modulus)
        }
    }
}

/// Schroeppel's "almost inverse" algorithm: finds `c` and `k` with
/// `a*c == 2^k (mod m)` by a binary-gcd-like reduction, then the `fixup`
/// step below turns that into `a^{-1} mod m` by dividing out the `2^k`.
/// Requires `m` odd and `0 <= a < m`.
fn almost_inverse(a: &BigInt, m: &BigInt) -> Result<BigInt, BigNumError> {
    if a.is_zero() {
        return Err(ArithmeticError::NotInvertible.into());
    }

    let mut f = a.clone();
    let mut g = m.clone();
    let mut c = BigInt::one();
    let mut d = BigInt::zero();
    let mut k = f.lowest_set_bit() as u64;
    f = f.shift_right(k as i64);
    d = d.shift_left(k as i64);

    loop {
        if f.is_one() {
            break;
        }
        if f.is_zero() {
            return Err(ArithmeticError::NotInvertible.into());
        }
        if f < g {
            std::mem::swap(&mut f, &mut g);
            std::mem::swap(&mut c, &mut d);
        }
        let four = BigInt::from(4u64);
        if f.modulo(&four)? == g.modulo(&four)? {
            f = f.sub(&g);
            c = c.sub(&d);
        } else {
            f = f.add(&g);
            c = c.add(&d);
        }
        if f.is_zero() {
            return Err(ArithmeticError::NotInvertible.into());
        }
        let shift = f.lowest_set_bit() as u64;
        f = f.shift_right(shift as i64);
        d = d.shift_left(shift as i64);
        k += shift;
    }

    fixup(&c.modulo(m)?, k, m)
}

/// Divides out the `2^k` left over from [`almost_inverse`]: `c` steps down
/// 32 bits at a time via `c <- (c + v*m) / 2^32` with `v` chosen so the low
/// word of `c + v*m` is zero, where `v = (-m^{-1} mod 2^32) * low_word(c)`.
fn fixup(c: &BigInt, k: u64, m: &BigInt) -> Result<BigInt, BigNumError> {
    let r = 0u32.wrapping_sub(inv_mod_2_32(*m.mag.last().unwrap()));
    let mut c = c.clone();
    for _ in 0..(k / 32) {
        let v = r.wrapping_mul(low_word(&c));
        c = c.add(&m.mul(&BigInt::from(v))).shift_right(32);
    }
    let remaining_bits = (k % 32) as u32;
    if remaining_bits != 0 {
        let mask = (1u32 << remaining_bits) - 1;
        let v = r.wrapping_mul(low_word(&c)) & mask;
        c = c.add(&m.mul(&BigInt::from(v))).shift_right(remaining_bits as i64);
    }
    if c >= *m {
        c = c.sub(m);
    }
    Ok(c)
}

fn low_word(v: &BigInt) -> u32 {
    v.mag.last().copied().unwrap_or(0)
}

/// `a^{-1} mod 2^k` by Newton-Hensel doubling: an odd `a` is its own
/// inverse modulo 2, and each iteration of `x <- x*(2 - a*x)` doubles the
/// number of correct low bits.
fn mod_inverse_power_of_two(a: &BigInt, k: u64) -> Result<BigInt, BigNumError> {
    if a.is_even() {
        return Err(ArithmeticError::NotInvertible.into());
    }
    let two = BigInt::from(2u64);
    let mut x = BigInt::one();
    let mut bits = 1u64;
    while bits < k {
        bits = (bits * 2).min(k);
        let modulus = BigInt::one().shift_left(bits as i64);
        x = x.mul(&two.sub(&a.mul(&x))).modulo(&modulus)?;
    }
    Ok(x)
}

/// Even-modulus inverse: split `modulus = m1 * 2^k` with `m1` odd, invert
/// `a` modulo each factor independently, recombine via CRT.
fn mod_inverse_even(a: &BigInt, modulus: &BigInt) -> Result<BigInt, BigNumError> {
    if a.is_even() {
        return Err(ArithmeticError::NotInvertible.into());
    }
    let k = modulus.lowest_set_bit().max(0) as u64;
    let m1 = modulus.shift_right(k as i64);
    let y2 = mod_inverse_power_of_two(a, k)?;
    if m1.is_one() {
        return Ok(y2);
    }
    let m2 = BigInt::one().shift_left(k as i64);
    let y1 = almost_inverse(&a.modulo(&m1)?, &m1)?;
    let m1_inv_mod_m2 = mod_inverse_power_of_two(&m1, k)?;
    let t = y2.sub(&y1).mul(&m1_inv_mod_m2).modulo(&m2)?;
    y1.add(&m1.mul(&t)).modulo(modulus)
}

/// `m^{-1} mod 2^32` for odd `m`, via Newton-Hensel doubling (each
/// iteration doubles the number of correct bits, starting from the 3 bits
/// every odd `m` is self-inverse modulo).
fn inv_mod_2_32(m: u32) -> u32 {
    let mut x = m;
    for _ in 0..4 {
        x = x.wrapping_mul(2u32.wrapping_sub(m.wrapping_mul(x)));
    }
    x
}

fn mont_n0_inv(modulus_low_word: u32) -> u32 {
    0u32.wrapping_sub(inv_mod_2_32(modulus_low_word))
}

fn mont_mul(a: &BigInt, b: &BigInt, modulus: &BigInt, n0_inv: u32) -> BigInt {
    let t = a.mul(b);
    BigInt::from_mutable(1, mul::mont_reduce(&t.as_mutable(), &modulus.as_mutable(), n0_inv))
}

/// Montgomery-form exponentiation with a sliding window of precomputed odd
/// powers.
fn odd_mod_pow(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> BigInt {
    let n0_inv = mont_n0_inv(*modulus.mag.last().unwrap());
    let r_bits = (modulus.mag.len() as u64) * 32;
    let r_mod_m = BigInt::one().shift_left(r_bits as i64).modulo(modulus).unwrap();
    let base_mont = base.mul(&r_mod_m).modulo(modulus).unwrap();

    let w = if *exponent == BigInt::from(65537u64) {
        1
    } else {
        tables::window_bits_for_exponent(exponent.bit_length())
    };
    let table_size = 1usize << (w - 1);
    let sq = mont_mul(&base_mont, &base_mont, modulus, n0_inv);
    let mut table = Vec::with_capacity(table_size);
    table.push(base_mont);
    for i in 1..table_size {
        table.push(mont_mul(&table[i - 1], &sq, modulus, n0_inv));
    }

    let mut accum = r_mod_m; // Montgomery form of 1
    let bit_len = exponent.bit_length();
    if bit_len > 0 {
        let mut i = bit_len as i64 - 1;
        while i >= 0 {
            if !exponent.test_bit(i as u64).unwrap() {
                accum = mont_mul(&accum, &accum, modulus, n0_inv);
                i -= 1;
            } else {
                let mut l = (i - w as i64 + 1).max(0);
                while !exponent.test_bit(l as u64).unwrap() {
                    l += 1;
                }
                for _ in 0..=(i - l) {
                    accum = mont_mul(&accum, &accum, modulus, n0_inv);
                }
                let mut value: u64 = 0;
                for bit_pos in (l..=i).rev() {
                    value = (value << 1) | (exponent.test_bit(bit_pos as u64).unwrap() as u64);
                }
                let idx = ((value - 1) / 2) as usize;
                accum = mont_mul(&accum, &table[idx], modulus, n0_inv);
                i = l - 1;
            }
        }
    }

    BigInt::from_mutable(1, mul::mont_reduce(&accum.as_mutable(), &modulus.as_mutable(), n0_inv))
}

/// Plain square-and-multiply, used only for the power-of-two factor in
/// `even_mod_pow` where Montgomery form buys nothing.
fn plain_mod_pow(
    base: &BigInt,
    exponent: &BigInt,
    modulus: &BigInt,
) -> Result<BigInt, BigNumError> {
    let mut result = BigInt::one().modulo(modulus)?;
    let mut b = base.modulo(modulus)?;
    let bit_len = exponent.bit_length();
    for i in 0..bit_len {
        if exponent.test_bit(i)? {
            result = result.mul(&b).modulo(modulus)?;
        }
        b = b.square().modulo(modulus)?;
    }
    Ok(result)
}

/// Even-modulus exponentiation: split `modulus = odd_part * 2^k`,
/// exponentiate modulo each factor independently, recombine via CRT.
fn even_mod_pow(
    base: &BigInt,
    exponent: &BigInt,
    modulus: &BigInt,
) -> Result<BigInt, BigNumError> {
    let k = modulus.lowest_set_bit().max(0) as u64;
    let m2 = BigInt::one().shift_left(k as i64);
    let m1 = modulus.shift_right(k as i64);

    let r2 = plain_mod_pow(base, exponent, &m2)?;
    if m1.is_one() {
        return Ok(r2);
    }
    let r1 = odd_mod_pow(&base.modulo(&m1)?, exponent, &m1);

    let m2_mod_m1 = m2.modulo(&m1)?;
    let m2_inv = m2_mod_m1.mod_inverse(&m1)?;
    let y = r1.sub(&r2).mul(&m2_inv).modulo(&m1)?;
    r2.add(&m2.mul(&y)).modulo(modulus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_matches_repeated_multiplication() {
        let base = BigInt::from(7i64);
        let mut expected = BigInt::one();
        for _ in 0..13 {
            expected = expected.mul(&base);
        }
        assert_eq!(base.pow(13).unwrap(), expected);
    }

    #[test]
    fn pow_two_to_the_thousand_matches_known_value() {
        let v = BigInt::from(2i64).pow(1000).unwrap();
        let s = v.to_radix_string(10);
        assert_eq!(s.len(), 302);
        assert!(s.starts_with("10715086071862673209"));
    }

    #[test]
    fn mod_pow_odd_modulus_matches_known_value() {
        let base = BigInt::parse_radix("65537", 10).unwrap();
        let exp = BigInt::from(17i64);
        let m = BigInt::parse_radix("1000000007", 10).unwrap();
        assert_eq!(base.mod_pow(&exp, &m).unwrap(), BigInt::parse_radix("372729801", 10).unwrap());
    }

    #[test]
    fn mod_pow_even_modulus_matches_naive() {
        let base = BigInt::from(17i64);
        let exp = BigInt::from(200i64);
        let m = BigInt::from(2_u64.pow(10) * 97);
        let naive = plain_mod_pow(&base, &exp, &m).unwrap();
        assert_eq!(base.mod_pow(&exp, &m).unwrap(), naive);
    }

    #[test]
    fn mod_inverse_round_trips() {
        let a = BigInt::from(17i64);
        let m = BigInt::from(3120i64);
        let inv = a.mod_inverse(&m).unwrap();
        assert_eq!(a.mul(&inv).modulo(&m).unwrap(), BigInt::one());
    }

    #[test]
    fn mod_inverse_fails_when_not_coprime() {
        let a = BigInt::from(6i64);
        let m = BigInt::from(9i64);
        assert!(a.mod_inverse(&m).is_err());
    }
}
