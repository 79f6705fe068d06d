//! Multiplication/squaring dispatch, Karatsuba, 3-way Toom-Cook, exact
//! divide-by-3, and Montgomery reduction.

use super::BigInt;
use crate::mutable::MutableMag;
use crate::tables::{
    KARATSUBA_SQUARE_THRESHOLD, KARATSUBA_THRESHOLD, TOOM_COOK_SQUARE_THRESHOLD,
    TOOM_COOK_THRESHOLD,
};

fn mag_len(m: &MutableMag) -> usize {
    m.to_be_vec().len()
}

/// Dispatches to schoolbook, Karatsuba, or Toom-Cook-3 by operand length.
pub(crate) fn multiply_mag(a: &MutableMag, b: &MutableMag) -> MutableMag {
    let x = mag_len(a);
    let y = mag_len(b);
    if x.min(y) < KARATSUBA_THRESHOLD {
        a.multiply(b)
    } else if x.max(y) < TOOM_COOK_THRESHOLD {
        karatsuba(a, b)
    } else {
        toom_cook_3(a, b)
    }
}

pub(crate) fn square_mag(a: &MutableMag) -> MutableMag {
    let x = mag_len(a);
    if x < KARATSUBA_SQUARE_THRESHOLD {
        a.multiply(a)
    } else if x < TOOM_COOK_SQUARE_THRESHOLD {
        karatsuba(a, a)
    } else {
        toom_cook_3(a, a)
    }
}

fn split_at_low(be: &[u32], low_len: usize) -> (Vec<u32>, Vec<u32>) {
    if be.len() <= low_len {
        (Vec::new(), be.to_vec())
    } else {
        let cut = be.len() - low_len;
        (be[..cut].to_vec(), be[cut..].to_vec())
    }
}

fn karatsuba(a: &MutableMag, b: &MutableMag) -> MutableMag {
    let a_be = a.to_be_vec();
    let b_be = b.to_be_vec();
    let half = (a_be.len().max(b_be.len()) + 1) / 2;
    if half == 0 {
        return a.multiply(b);
    }
    let (a_hi, a_lo) = split_at_low(&a_be, half);
    let (b_hi, b_lo) = split_at_low(&b_be, half);
    let a_hi = MutableMag::from_be_vec(a_hi);
    let a_lo = MutableMag::from_be_vec(a_lo);
    let b_hi = MutableMag::from_be_vec(b_hi);
    let b_lo = MutableMag::from_be_vec(b_lo);

    let p1 = multiply_mag(&a_hi, &b_hi);
    let p2 = multiply_mag(&a_lo, &b_lo);
    let a_sum = a_hi.add(&a_lo);
    let b_sum = b_hi.add(&b_lo);
    let p3 = multiply_mag(&a_sum, &b_sum);
    let (mid, sign) = p3.subtract(&p1.add(&p2));
    debug_assert!(sign >= 0, "karatsuba cross term must be non-negative");

    let shift_bits = (half as u64) * 32;
    p1.shift_left(2 * shift_bits).add(&mid.shift_left(shift_bits)).add(&p2)
}

/// Exact division by 3 via multiplication by `3^{-1} mod 2^32`
/// (`0xAAAAAAAB`), processed least-significant word first with a
/// propagated borrow. Requires `m` to actually be a multiple of 3.
pub(crate) fn exact_divide_by_3(m: &MutableMag) -> MutableMag {
    let be = m.to_be_vec();
    let len = be.len();
    let mut result = vec![0u32; len];
    const INV3: u64 = 0xAAAA_AAAB;
    let mut borrow: i64 = 0;
    for i in (0..len).rev() {
        let x = be[i] as i64;
        let w = x - borrow;
        borrow = if borrow > x { 1 } else { 0 };
        let w = (w as u32) as u64; // reduce mod 2^32, matching the wraparound the trick relies on
        let q = (w.wrapping_mul(INV3)) & 0xFFFF_FFFF;
        result[i] = q as u32;
        if q >= 0x5555_5556 {
            borrow += 1;
            if q >= 0xAAAA_AAAB {
                borrow += 1;
            }
        }
    }
    MutableMag::from_be_vec(result)
}

/// Sign-handling wrapper around [`exact_divide_by_3`] for the Toom-Cook
/// interpolation, whose cross terms can be transiently negative.
fn exact_divide_by_3_signed(v: &BigInt) -> BigInt {
    if v.is_zero() {
        return BigInt::zero();
    }
    let mag = exact_divide_by_3(&v.as_mutable());
    BigInt::from_mutable(v.sign, mag)
}

/// 3-way Toom-Cook, evaluating at `{0, 1, -1, 2, infinity}` and
/// interpolating with signed `BigInt` arithmetic (the cross terms of the
/// interpolation can be transiently negative even though the final
/// reconstructed product cannot).
fn toom_cook_3(a: &MutableMag, b: &MutableMag) -> MutableMag {
    let a_be = a.to_be_vec();
    let b_be = b.to_be_vec();
    let k = (a_be.len().max(b_be.len()) + 2) / 3;
    if k == 0 {
        return a.multiply(b);
    }

    let slice3 = |be: &[u32]| -> (BigInt, BigInt, BigInt) {
        let total = 3 * k;
        let pad = total.saturating_sub(be.len());
        let get = |part: usize| -> BigInt {
            // part 0 = most significant k words (a2) .. part 2 = a0
            let start = part * k;
            let mut out = vec![0u32; k];
            for (i, slot) in out.iter_mut().enumerate() {
                let idx = start + i;
                if idx >= pad {
                    *slot = be[idx - pad];
                }
            }
            BigInt::from_parts(1, out)
        };
        (get(0), get(1), get(2))
    };

    let (a2, a1, a0) = slice3(&a_be);
    let (b2, b1, b0) = slice3(&b_be);

    // Evaluation points.
    let p0 = a0.clone();
    let p1 = a0.add(&a1).add(&a2);
    let pm1 = a0.sub(&a1).add(&a2);
    let p2 = a0.add(&a1.mul(&BigInt::two())).add(&a2.mul(&BigInt::from(4u64)));
    let pinf = a2.clone();

    let q0 = b0.clone();
    let q1 = b0.add(&b1).add(&b2);
    let qm1 = b0.sub(&b1).add(&b2);
    let q2 = b0.add(&b1.mul(&BigInt::two())).add(&b2.mul(&BigInt::from(4u64)));
    let qinf = b2.clone();

    let r0 = p0.mul(&q0);
    let r1 = p1.mul(&q1);
    let rm1 = pm1.mul(&qm1);
    let r2 = p2.mul(&q2);
    let r4 = pinf.mul(&qinf);

    // Standard 5-point interpolation for a degree-4 polynomial.
    let a_ = r1.sub(&r0).sub(&r4); // c1+c2+c3
    let b_ = rm1.sub(&r0).sub(&r4); // -c1+c2-c3
    let c_ = r2.sub(&r0).sub(&r4.mul(&BigInt::from(16u64))); // 2c1+4c2+8c3

    let c2 = a_.add(&b_).div_rem(&BigInt::two()).unwrap().0;
    let e = a_.sub(&b_).div_rem(&BigInt::two()).unwrap().0; // c1+c3
    let d = c_.sub(&c2.mul(&BigInt::from(4u64))).div_rem(&BigInt::two()).unwrap().0; // c1+4c3
    let c3 = exact_divide_by_3_signed(&d.sub(&e));
    let c1 = e.sub(&c3);
    let c0 = r0;
    let c4 = r4;

    let shift_bits = (k as u64) * 32;
    let total = c0
        .add(&c1.shift_left(shift_bits as i64))
        .add(&c2.shift_left((2 * shift_bits) as i64))
        .add(&c3.shift_left((3 * shift_bits) as i64))
        .add(&c4.shift_left((4 * shift_bits) as i64));

    debug_assert!(total.sign >= 0);
    total.as_mutable()
}

/// Montgomery reduction: given `t` (with `t < m * R` where `R = 2^(32*n)`,
/// `n = m.len()`), returns `t * R^{-1} mod m`. `n0_inv` is `-m[n-1]^{-1}
/// mod 2^32` (the precomputed word-level Montgomery inverse).
pub(crate) fn mont_reduce(t: &MutableMag, m: &MutableMag, n0_inv: u32) -> MutableMag {
    let m_be = m.to_be_vec();
    let n = m_be.len();
    let mut acc = t.to_be_vec();
    // Work in little-endian for the word-at-a-time reduction loop.
    acc.reverse();
    acc.resize(acc.len().max(2 * n) + 1, 0);
    let m_le: Vec<u32> = m_be.iter().rev().copied().collect();

    for i in 0..n {
        let u = (acc[i] as u64 * n0_inv as u64) as u32;
        let mut carry: u64 = 0;
        for j in 0..n {
            let sum = acc[i + j] as u64 + (u as u64) * (m_le[j] as u64) + carry;
            acc[i + j] = sum as u32;
            carry = sum >> 32;
        }
        let mut k = i + n;
        while carry > 0 {
            let sum = acc[k] as u64 + carry;
            acc[k] = sum as u32;
            carry = sum >> 32;
            k += 1;
        }
    }

    let mut result_le = acc[n..].to_vec();
    while result_le.last() == Some(&0) {
        result_le.pop();
    }
    let result_be: Vec<u32> = result_le.into_iter().rev().collect();
    let mut r = MutableMag::from_be_vec(result_be);
    if r.cmp_mag(m) != std::cmp::Ordering::Less {
        let (diff, _) = r.subtract(m);
        r = diff;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::BigInt;

    fn mm(words: &[u32]) -> MutableMag {
        MutableMag::from_be_vec(words.to_vec())
    }

    #[test]
    fn karatsuba_matches_schoolbook() {
        let a = mm(&[0x1234_5678, 0x9ABC_DEF0, 0x1111_2222, 0x3333_4444]);
        let b = mm(&[0xAAAA_BBBB, 0xCCCC_DDDD, 0x5555_6666]);
        assert_eq!(karatsuba(&a, &b).to_be_vec(), a.multiply(&b).to_be_vec());
    }

    #[test]
    fn toom_cook_matches_schoolbook() {
        let a_words: Vec<u32> = (0..12u32).map(|i| 0x1000_0001u32.wrapping_mul(i + 1)).collect();
        let b_words: Vec<u32> = (0..9u32).map(|i| 0x2000_0003u32.wrapping_mul(i + 1)).collect();
        let a = mm(&a_words);
        let b = mm(&b_words);
        assert_eq!(toom_cook_3(&a, &b).to_be_vec(), a.multiply(&b).to_be_vec());
    }

    #[test]
    fn exact_divide_by_3_roundtrips() {
        let v = BigInt::from(999_999_999i64).mul(&BigInt::from(3i64));
        let divided = exact_divide_by_3(&v.as_mutable());
        assert_eq!(divided.to_u64(), Some(999_999_999));
    }

    #[test]
    fn mont_reduce_matches_naive_reduction() {
        let m = mm(&[0xFFFF_FFFB]); // a prime close to 2^32
        let r_bits = 32u64;
        let n0_inv = {
            // compute -m^{-1} mod 2^32 via extended Euclid on u64
            let modulus = 1u64 << 32;
            let mword = m.to_be_vec()[0] as u64;
            let mut t = 0i64;
            let mut newt = 1i64;
            let mut r = modulus as i64;
            let mut newr = mword as i64;
            while newr != 0 {
                let q = r / newr;
                let tmp_t = t - q * newt;
                t = newt;
                newt = tmp_t;
                let tmp_r = r - q * newr;
                r = newr;
                newr = tmp_r;
            }
            let inv = ((t % modulus as i64 + modulus as i64) % modulus as i64) as u64;
            (modulus - inv) as u32
        };
        let t = mm(&[0x1234, 0x5678]);
        let reduced = mont_reduce(&t, &m, n0_inv);
        // cross-check against the definition: reduced * R mod m == t mod m
        let r = BigInt::one().as_mutable().shift_left(r_bits);
        let lhs = BigInt::from_mutable(1, reduced.clone())
            .mul(&BigInt::from_mutable(1, r))
            .modulo(&BigInt::from_mutable(1, m.clone()))
            .unwrap();
        let rhs = BigInt::from_mutable(1, t).modulo(&BigInt::from_mutable(1, m)).unwrap();
        assert_eq!(lhs, rhs);
    }
}
