//! In-place unsigned magnitude arithmetic: the workhorse underneath every
//! `BigInt` operation larger than trivial.
//!
//! `MutableMag` is the only mutable type in the crate and
//! never crosses a public API boundary — every `BigInt` arithmetic call
//! owns its scratch `MutableMag` values and discards them on return. The
//! type stores its magnitude big-endian with an `(offset, len)` window
//! into a backing buffer; the classic long-division and schoolbook-multiply
//! kernels below convert to little-endian scratch vectors internally
//! purely because every textbook/Hacker's-Delight presentation of Knuth's
//! Algorithm D indexes least-significant-digit-first; that choice is local
//! to the function body and never leaks into the stored representation.

use crate::error::ArithmeticError;
use crate::word;
use std::cmp::Ordering;

// ---------------------------------------------------------------------
// Little-endian scratch helpers (index 0 = least significant word, no
// trailing zero word except the canonical empty vector for zero).
// ---------------------------------------------------------------------

fn le_trim(mut v: Vec<u32>) -> Vec<u32> {
    while v.last() == Some(&0) {
        v.pop();
    }
    v
}

fn be_to_le(be: &[u32]) -> Vec<u32> {
    let mut v: Vec<u32> = be.iter().rev().copied().collect();
    while v.last() == Some(&0) {
        v.pop();
    }
    v
}

fn le_to_be(mut le: Vec<u32>) -> Vec<u32> {
    while le.last() == Some(&0) {
        le.pop();
    }
    le.reverse();
    le
}

fn le_cmp(a: &[u32], b: &[u32]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for i in (0..a.len()).rev() {
        if a[i] != b[i] {
            return a[i].cmp(&b[i]);
        }
    }
    Ordering::Equal
}

fn le_add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for i in 0..long.len() {
        let s = long[i] as u64 + short.get(i).copied().unwrap_or(0) as u64 + carry;
        out.push(s as u32);
        carry = s >> 32;
    }
    if carry > 0 {
        out.push(carry as u32);
    }
    le_trim(out)
}

/// `a - b`, requires `a >= b`.
fn le_sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    debug_assert!(le_cmp(a, b) != Ordering::Less);
    let mut out = Vec::with_capacity(a.len());
    let mut borrow: i64 = 0;
    for i in 0..a.len() {
        let bv = b.get(i).copied().unwrap_or(0) as i64;
        let diff = a[i] as i64 - bv - borrow;
        if diff < 0 {
            out.push((diff + (1i64 << 32)) as u32);
            borrow = 1;
        } else {
            out.push(diff as u32);
            borrow = 0;
        }
    }
    debug_assert_eq!(borrow, 0);
    le_trim(out)
}

fn le_mul_word(a: &[u32], w: u32) -> Vec<u32> {
    if w == 0 || a.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry = 0u32;
    for &d in a {
        let (lo, hi) = word::mul_add_carry(d, w, 0, carry);
        out.push(lo);
        carry = hi;
    }
    if carry > 0 {
        out.push(carry);
    }
    le_trim(out)
}

/// Schoolbook multiply, O(n*m).
fn le_mul(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u32; a.len() + b.len()];
    for (i, &av) in a.iter().enumerate() {
        if av == 0 {
            continue;
        }
        let mut carry = 0u64;
        for (j, &bv) in b.iter().enumerate() {
            let sum = out[i + j] as u64 + (av as u64) * (bv as u64) + carry;
            out[i + j] = sum as u32;
            carry = sum >> 32;
        }
        let mut k = i + b.len();
        while carry > 0 {
            let sum = out[k] as u64 + carry;
            out[k] = sum as u32;
            carry = sum >> 32;
            k += 1;
        }
    }
    le_trim(out)
}

fn le_shl_bits(a: &[u32], n: u32) -> Vec<u32> {
    if a.is_empty() || n == 0 {
        return a.to_vec();
    }
    let word_shift = (n / 32) as usize;
    let bit_shift = n % 32;
    let mut out = vec![0u32; a.len() + word_shift + 1];
    if bit_shift == 0 {
        out[word_shift..word_shift + a.len()].copy_from_slice(a);
    } else {
        let mut carry = 0u32;
        for (i, &d) in a.iter().enumerate() {
            out[i + word_shift] = (d << bit_shift) | carry;
            carry = d >> (32 - bit_shift);
        }
        out[a.len() + word_shift] = carry;
    }
    le_trim(out)
}

fn le_shr_bits(a: &[u32], n: u32) -> Vec<u32> {
    if a.is_empty() {
        return Vec::new();
    }
    let word_shift = (n / 32) as usize;
    let bit_shift = n % 32;
    if word_shift >= a.len() {
        return Vec::new();
    }
    let src = &a[word_shift..];
    let mut out = vec![0u32; src.len()];
    if bit_shift == 0 {
        out.copy_from_slice(src);
    } else {
        for i in 0..src.len() {
            let lo = src[i] >> bit_shift;
            let hi = if i + 1 < src.len() { src[i + 1] << (32 - bit_shift) } else { 0 };
            out[i] = lo | hi;
        }
    }
    le_trim(out)
}

fn le_divmod_one_word(a: &[u32], d: u32) -> (Vec<u32>, u32) {
    debug_assert!(d != 0);
    if a.is_empty() {
        return (Vec::new(), 0);
    }
    let mut q = vec![0u32; a.len()];
    let mut rem: u32 = 0;
    for i in (0..a.len()).rev() {
        let (qw, r) = word::div_wide(rem, a[i], d);
        q[i] = qw;
        rem = r;
    }
    (le_trim(q), rem)
}

/// Knuth Algorithm D (normalize / estimate-and-correct / multiply-subtract
/// / add-back long division), operating on trimmed little-endian digit
/// vectors. `b.len() >= 2` is required; single-word divisors go through
/// `le_divmod_one_word` instead.
fn le_divmod_knuth(a: &[u32], b: &[u32]) -> (Vec<u32>, Vec<u32>) {
    debug_assert!(b.len() >= 2);
    if le_cmp(a, b) == Ordering::Less {
        return (Vec::new(), a.to_vec());
    }
    let n = b.len();
    let shift = b[n - 1].leading_zeros();
    let mut vn = le_shl_bits(b, shift);
    vn.resize(n, 0); // shifting a normalized top-word-nonzero value by <32 bits never grows length

    let mut un = le_shl_bits(a, shift);
    let m = a.len() - n;
    un.resize(m + n + 1, 0);

    let mut q = vec![0u32; m + 1];

    for j in (0..=m).rev() {
        let top = ((un[j + n] as u64) << 32) | (un[j + n - 1] as u64);
        let mut qhat = top / (vn[n - 1] as u64);
        let mut rhat = top % (vn[n - 1] as u64);
        if qhat > 0xFFFF_FFFF {
            qhat = 0xFFFF_FFFF;
            rhat = top - qhat * (vn[n - 1] as u64);
        }
        while rhat <= 0xFFFF_FFFF
            && n >= 2
            && qhat * (vn[n - 2] as u64) > (rhat << 32) + (un[j + n - 2] as u64)
        {
            qhat -= 1;
            rhat += vn[n - 1] as u64;
        }

        let mut borrow: i64 = 0;
        let mut carry: u64 = 0;
        for i in 0..n {
            let p = qhat * (vn[i] as u64) + carry;
            carry = p >> 32;
            let sub = (p & 0xFFFF_FFFF) as i64 + borrow;
            let diff = un[j + i] as i64 - sub;
            if diff < 0 {
                un[j + i] = (diff + (1i64 << 32)) as u32;
                borrow = 1;
            } else {
                un[j + i] = diff as u32;
                borrow = 0;
            }
        }
        let diff = un[j + n] as i64 - carry as i64 - borrow;
        if diff < 0 {
            un[j + n] = (diff + (1i64 << 32)) as u32;
            // Overestimated qhat: add the divisor back and decrement.
            qhat -= 1;
            let mut c = 0u64;
            for i in 0..n {
                let s = un[j + i] as u64 + vn[i] as u64 + c;
                un[j + i] = s as u32;
                c = s >> 32;
            }
            un[j + n] = un[j + n].wrapping_add(c as u32);
        } else {
            un[j + n] = diff as u32;
        }
        q[j] = qhat as u32;
    }

    let remainder = le_shr_bits(&un[..n], shift);
    (le_trim(q), remainder)
}

fn le_divmod(a: &[u32], b: &[u32]) -> (Vec<u32>, Vec<u32>) {
    if b.is_empty() {
        panic!("division by zero magnitude");
    }
    if b.len() == 1 {
        let (q, r) = le_divmod_one_word(a, b[0]);
        return (q, if r == 0 { Vec::new() } else { vec![r] });
    }
    le_divmod_knuth(a, b)
}

// ---------------------------------------------------------------------
// MutableMag
// ---------------------------------------------------------------------

/// An in-place, big-endian, offset-windowed unsigned magnitude buffer.
#[derive(Clone, Debug)]
pub(crate) struct MutableMag {
    value: Vec<u32>,
    offset: usize,
    len: usize,
}

impl MutableMag {
    pub(crate) fn zero() -> Self {
        MutableMag { value: Vec::new(), offset: 0, len: 0 }
    }

    /// Build from a big-endian word vector, trimming any leading zero words.
    pub(crate) fn from_be_vec(value: Vec<u32>) -> Self {
        let mut m = MutableMag { offset: 0, len: value.len(), value };
        m.normalize();
        m
    }

    pub(crate) fn from_u64(v: u64) -> Self {
        if v == 0 {
            return Self::zero();
        }
        let hi = (v >> 32) as u32;
        let lo = v as u32;
        if hi == 0 {
            Self::from_be_vec(vec![lo])
        } else {
            Self::from_be_vec(vec![hi, lo])
        }
    }

    fn normalize(&mut self) {
        while self.len > 0 && self.value[self.offset] == 0 {
            self.offset += 1;
            self.len -= 1;
        }
        if self.len == 0 {
            self.offset = 0;
        }
    }

    pub(crate) fn as_be(&self) -> &[u32] {
        &self.value[self.offset..self.offset + self.len]
    }

    pub(crate) fn to_be_vec(&self) -> Vec<u32> {
        self.as_be().to_vec()
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn is_one(&self) -> bool {
        self.as_be() == [1]
    }

    pub(crate) fn bit_length(&self) -> u64 {
        if self.is_zero() {
            return 0;
        }
        let be = self.as_be();
        (be.len() as u64 - 1) * 32 + (32 - be[0].leading_zeros() as u64)
    }

    pub(crate) fn is_even(&self) -> bool {
        self.is_zero() || self.as_be()[self.len - 1] & 1 == 0
    }

    pub(crate) fn cmp_mag(&self, other: &Self) -> Ordering {
        le_cmp(&be_to_le(self.as_be()), &be_to_le(other.as_be()))
    }

    pub(crate) fn to_u64(&self) -> Option<u64> {
        if self.bit_length() > 64 {
            return None;
        }
        let be = self.as_be();
        let mut v: u64 = 0;
        for &w in be {
            v = (v << 32) | w as u64;
        }
        Some(v)
    }

    pub(crate) fn add(&self, other: &Self) -> Self {
        let le = le_add(&be_to_le(self.as_be()), &be_to_le(other.as_be()));
        Self::from_be_vec(le_to_be(le))
    }

    /// Computes `|self - other|`, returning the magnitude and the sign of
    /// `self - other` (+1, -1, or 0).
    pub(crate) fn subtract(&self, other: &Self) -> (Self, i32) {
        match self.cmp_mag(other) {
            Ordering::Equal => (Self::zero(), 0),
            Ordering::Greater => {
                let le = le_sub(&be_to_le(self.as_be()), &be_to_le(other.as_be()));
                (Self::from_be_vec(le_to_be(le)), 1)
            }
            Ordering::Less => {
                let le = le_sub(&be_to_le(other.as_be()), &be_to_le(self.as_be()));
                (Self::from_be_vec(le_to_be(le)), -1)
            }
        }
    }

    pub(crate) fn mul_word(&self, w: u32) -> Self {
        let le = le_mul_word(&be_to_le(self.as_be()), w);
        Self::from_be_vec(le_to_be(le))
    }

    /// Schoolbook multiply (the `AlgoMul` dispatch layer above this type
    /// provides Karatsuba/Toom-3 for large operands).
    pub(crate) fn multiply(&self, other: &Self) -> Self {
        let le = le_mul(&be_to_le(self.as_be()), &be_to_le(other.as_be()));
        Self::from_be_vec(le_to_be(le))
    }

    pub(crate) fn shift_left(&self, n: u64) -> Self {
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        let word_shift = (n / 32) as usize;
        let bit_shift = (n % 32) as u32;
        let mut le = le_shl_bits(&be_to_le(self.as_be()), bit_shift);
        le.splice(0..0, std::iter::repeat(0u32).take(word_shift));
        Self::from_be_vec(le_to_be(le))
    }

    pub(crate) fn shift_right(&self, n: u64) -> Self {
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        let total_bits = self.bit_length();
        if n >= total_bits {
            return Self::zero();
        }
        let word_shift = (n / 32) as usize;
        let bit_shift = (n % 32) as u32;
        let mut le = be_to_le(self.as_be());
        if word_shift >= le.len() {
            return Self::zero();
        }
        le.drain(0..word_shift);
        let le = le_shr_bits(&le, bit_shift);
        Self::from_be_vec(le_to_be(le))
    }

    pub(crate) fn test_bit(&self, bit: u64) -> bool {
        let le = be_to_le(self.as_be());
        let word = (bit / 32) as usize;
        if word >= le.len() {
            return false;
        }
        (le[word] >> (bit % 32)) & 1 == 1
    }

    /// Divides by a single word, returning `(quotient, remainder)`.
    pub(crate) fn divide_one_word(&self, divisor: u32) -> Result<(Self, u32), ArithmeticError> {
        if divisor == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        let (q, r) = le_divmod_one_word(&be_to_le(self.as_be()), divisor);
        Ok((Self::from_be_vec(le_to_be(q)), r))
    }

    /// Full magnitude division, dispatching between Knuth's algorithm and
    /// the Burnikel-Ziegler recursive algorithm once both operands cross
    /// the thresholds in `tables.rs`.
    pub(crate) fn divide(&self, other: &Self) -> Result<(Self, Self), ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if other.len == 1 {
            let (q, r) = self.divide_one_word(other.as_be()[0])?;
            let r = if r == 0 { Self::zero() } else { Self::from_be_vec(vec![r]) };
            return Ok((q, r));
        }
        if self.cmp_mag(other) == Ordering::Less {
            return Ok((Self::zero(), self.clone()));
        }
        let use_bz = other.len >= crate::tables::BZ_THRESHOLD
            && self.len - other.len >= crate::tables::BZ_OFFSET;
        if use_bz {
            Ok(self.divide_burnikel_ziegler(other))
        } else {
            let (q, r) = le_divmod_knuth(&be_to_le(self.as_be()), &be_to_le(other.as_be()));
            Ok((Self::from_be_vec(le_to_be(q)), Self::from_be_vec(le_to_be(r))))
        }
    }

    // -------------------------------------------------------------
    // Burnikel-Ziegler recursive division (Algorithms 1-3).
    // -------------------------------------------------------------

    fn divide_burnikel_ziegler(&self, divisor: &Self) -> (Self, Self) {
        let s = divisor.len;
        let m = {
            let ratio = (s as f64) / (crate::tables::BZ_THRESHOLD as f64);
            1usize << (ratio.log2().ceil().max(0.0) as u32)
        };
        let j = s.div_ceil(m);
        let n = j * m;
        let n32 = (n as u64) * 32;
        let sigma = n32.saturating_sub(divisor.bit_length());

        let b_shifted = divisor.shift_left(sigma);
        let a_shifted = self.shift_left(sigma);

        let total_words = a_shifted.len.max(1);
        let t = ((total_words + n - 1) / n).max(2);

        let block = |idx: usize| -> MutableMag {
            // Block `idx` (0 = least significant) of `a_shifted`, padded
            // with leading zeros to exactly `n` words.
            let be = a_shifted.as_be();
            let total_len = t * n;
            let pad = total_len - be.len();
            let start_in_padded = total_len - (idx + 1) * n;
            let mut out = vec![0u32; n];
            for (k, slot) in out.iter_mut().enumerate() {
                let padded_index = start_in_padded + k;
                if padded_index >= pad {
                    *slot = be[padded_index - pad];
                }
            }
            MutableMag::from_be_vec(out)
        };

        let mut z = block(t - 1).shift_left(n32).add(&block(t - 2));
        let mut quotient = MutableMag::zero();
        for i in (1..=t.saturating_sub(2)).rev() {
            let (qi, ri) = z.divide_2n_1n(&b_shifted, n);
            quotient = quotient.shift_left(n32).add(&qi);
            z = ri.shift_left(n32).add(&block(i - 1));
        }
        let (q0, r0) = z.divide_2n_1n(&b_shifted, n);
        quotient = quotient.shift_left(n32).add(&q0);
        let remainder = r0.shift_right(sigma);
        (quotient, remainder)
    }

    /// Algorithm 1: divide a `2n`-word dividend by an `n`-word divisor.
    fn divide_2n_1n(&self, b: &Self, n: usize) -> (Self, Self) {
        if n % 2 == 1 || n < crate::tables::BZ_THRESHOLD {
            let (q, r) = le_divmod(&be_to_le(self.as_be()), &be_to_le(b.as_be()));
            return (Self::from_be_vec(le_to_be(q)), Self::from_be_vec(le_to_be(r)));
        }
        let half = n / 2;
        let half_bits = (half as u64) * 32;
        let be = self.as_be();
        let total_len = 4 * half;
        let pad = total_len.saturating_sub(be.len());
        let get_part = |part_idx_from_top: usize| -> MutableMag {
            let start_in_padded = part_idx_from_top * half;
            let mut out = vec![0u32; half];
            for (k, slot) in out.iter_mut().enumerate() {
                let padded_index = start_in_padded + k;
                if padded_index >= pad {
                    *slot = be[padded_index - pad];
                }
            }
            MutableMag::from_be_vec(out)
        };
        let a1 = get_part(0);
        let a2 = get_part(1);
        let a3 = get_part(2);
        let a4 = get_part(3);

        let a123 = a1.shift_left(2 * half_bits).add(&a2.shift_left(half_bits)).add(&a3);
        let (q1, r1) = a123.divide_3n_2n(b, half);
        let r1a4 = r1.shift_left(half_bits).add(&a4);
        let (q2, r2) = r1a4.divide_3n_2n(b, half);
        let q = q1.shift_left(half_bits).add(&q2);
        (q, r2)
    }

    /// Algorithm 2: divide a `3n`-word dividend by a `2n`-word divisor
    /// `b = (b1, b2)`, each half `n` words.
    fn divide_3n_2n(&self, b: &Self, n: usize) -> (Self, Self) {
        let n_bits = (n as u64) * 32;
        let b_be = b.as_be();
        let pad_b = (2 * n).saturating_sub(b_be.len());
        let b1 = {
            let mut out = vec![0u32; n];
            for (k, slot) in out.iter_mut().enumerate() {
                if k >= pad_b {
                    *slot = b_be[k - pad_b];
                }
            }
            MutableMag::from_be_vec(out)
        };
        let b2 = {
            let mut out = vec![0u32; n];
            for (k, slot) in out.iter_mut().enumerate() {
                let padded_index = n + k;
                if padded_index >= pad_b {
                    *slot = b_be[padded_index - pad_b];
                }
            }
            MutableMag::from_be_vec(out)
        };

        let self_be = self.as_be();
        let pad_a = (3 * n).saturating_sub(self_be.len());
        let get_a = |start: usize, len: usize| -> MutableMag {
            let mut out = vec![0u32; len];
            for (k, slot) in out.iter_mut().enumerate() {
                let padded_index = start + k;
                if padded_index >= pad_a {
                    *slot = self_be[padded_index - pad_a];
                }
            }
            MutableMag::from_be_vec(out)
        };
        let a12 = get_a(0, 2 * n);
        let a3 = get_a(2 * n, n);

        let b1_shifted = b1.shift_left(n_bits);
        let (mut q, mut r) = if a12.cmp_mag(&b1_shifted) == Ordering::Less {
            a12.divide_2n_1n(&b1, n)
        } else {
            let all_ones = MutableMag::from_be_vec(vec![u32::MAX; n]);
            let (diff, _) = a12.subtract(&b1_shifted);
            let r = diff.add(&b1);
            (all_ones, r)
        };

        // r = (r << n_bits) + a3 - q*b2; if negative, add the full divisor
        // back and decrement q, matching the correction step Burnikel and
        // Ziegler describe for Algorithm 2.
        let mut r_ext = r.shift_left(n_bits).add(&a3);
        let qb2 = q.multiply(&b2);
        loop {
            match r_ext.cmp_mag(&qb2) {
                Ordering::Less => {
                    let b_full = b1.shift_left(n_bits).add(&b2);
                    r_ext = r_ext.add(&b_full);
                    let (new_q, _) = q.subtract(&MutableMag::from_u64(1));
                    q = new_q;
                }
                _ => {
                    let (diff, _) = r_ext.subtract(&qb2);
                    r = diff;
                    break;
                }
            }
        }
        (q, r)
    }

    // -------------------------------------------------------------
    // GCD
    // -------------------------------------------------------------

    /// Euclid's algorithm down to comparable operand sizes, then binary
    /// GCD for the tail.
    pub(crate) fn hybrid_gcd(&self, other: &Self) -> Self {
        let (mut a, mut b) = (self.clone(), other.clone());
        if a.is_zero() {
            return b;
        }
        if b.is_zero() {
            return a;
        }
        while a.len.abs_diff(b.len) >= 2 {
            let (hi, lo) = if a.cmp_mag(&b) == Ordering::Less { (&b, &a) } else { (&a, &b) };
            let (_, r) = hi.divide(lo).expect("lo is non-zero here");
            let (new_hi, new_lo) = (lo.clone(), r);
            if a.cmp_mag(&b) == Ordering::Less {
                a = new_lo;
                b = new_hi;
            } else {
                a = new_hi;
                b = new_lo;
            }
            if b.is_zero() {
                return a;
            }
        }
        Self::binary_gcd(&a, &b)
    }

    fn binary_gcd(a: &Self, b: &Self) -> Self {
        if a.is_zero() {
            return b.clone();
        }
        if b.is_zero() {
            return a.clone();
        }
        let mut u = a.clone();
        let mut v = b.clone();
        let shift = u.trailing_zero_bits().min(v.trailing_zero_bits());
        u = u.shift_right(u.trailing_zero_bits());
        v = v.shift_right(v.trailing_zero_bits());
        loop {
            if u.cmp_mag(&v) == Ordering::Greater {
                std::mem::swap(&mut u, &mut v);
            }
            let (diff, _) = v.subtract(&u);
            v = diff;
            if v.is_zero() {
                return u.shift_left(shift);
            }
            v = v.shift_right(v.trailing_zero_bits());
        }
    }

    fn trailing_zero_bits(&self) -> u64 {
        if self.is_zero() {
            return 0;
        }
        let le = be_to_le(self.as_be());
        let mut bits = 0u64;
        for w in &le {
            if *w == 0 {
                bits += 32;
            } else {
                bits += w.trailing_zeros() as u64;
                break;
            }
        }
        bits
    }

    // -------------------------------------------------------------
    // Integer square root (Newton's method).
    // -------------------------------------------------------------

    pub(crate) fn sqrt(&self) -> (Self, Self) {
        if self.is_zero() {
            return (Self::zero(), Self::zero());
        }
        let bl = self.bit_length();
        if bl <= 63 {
            let n = self.to_u64().unwrap();
            let mut x = (n as f64).sqrt() as u64;
            while x > 0 && x.saturating_mul(x) > n {
                x -= 1;
            }
            while (x + 1).saturating_mul(x + 1) <= n {
                x += 1;
            }
            let s = Self::from_u64(x);
            let r = Self::from_u64(n - x * x);
            return (s, r);
        }

        // Large case: shift right by an even bit count so the top part
        // fits a 63-bit f64 seed, seed, then shift the seed back by half
        // that amount and refine with full-width Newton iteration.
        let shift = (bl - 62) & !1u64;
        let shifted = self.shift_right(shift);
        let seed_n = shifted.to_u64().unwrap_or(u64::MAX);
        let seed = ((seed_n as f64).sqrt() as u64).max(1);
        let mut x = Self::from_u64(seed).shift_left(shift / 2);

        loop {
            let (q, _) = self.divide(&x).expect("x is non-zero");
            let sum = x.add(&q);
            let next = sum.shift_right(1);
            if next.cmp_mag(&x) != Ordering::Less {
                break;
            }
            x = next;
        }
        // Newton's iteration above can land one above the true floor when
        // it terminates on equality; nudge down if so.
        while x.multiply(&x).cmp_mag(self) == Ordering::Greater {
            let (diff, _) = x.subtract(&Self::from_u64(1));
            x = diff;
        }
        let r = {
            let (diff, _) = self.subtract(&x.multiply(&x));
            diff
        };
        (x, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mag(words: &[u32]) -> MutableMag {
        MutableMag::from_be_vec(words.to_vec())
    }

    #[test]
    fn add_sub_roundtrip() {
        let a = mag(&[0xFFFF_FFFF, 0xFFFF_FFFF]);
        let b = mag(&[1]);
        let sum = a.add(&b);
        assert_eq!(sum.as_be(), &[1, 0, 0]);
        let (back, sign) = sum.subtract(&b);
        assert_eq!(sign, 1);
        assert_eq!(back.as_be(), a.as_be());
    }

    #[test]
    fn multiply_matches_known_product() {
        let a = mag(&[12345]);
        let b = mag(&[6789]);
        let p = a.multiply(&b);
        assert_eq!(p.to_u64(), Some(12345 * 6789));
    }

    #[test]
    fn divide_one_word_roundtrip() {
        let a = mag(&[0xAAAA_AAAA, 0xBBBB_BBBB]);
        let (q, r) = a.divide_one_word(97).unwrap();
        let back = q.mul_word(97).add(&MutableMag::from_u64(r as u64));
        assert_eq!(back.to_be_vec(), a.to_be_vec());
    }

    #[test]
    fn divide_knuth_identity_small() {
        let a = mag(&[0x1234_5678, 0x9ABC_DEF0, 0x1122_3344]);
        let b = mag(&[0x1000_0000, 1]);
        let (q, r) = a.divide(&b).unwrap();
        let recombined = q.multiply(&b).add(&r);
        assert_eq!(recombined.to_be_vec(), a.to_be_vec());
        assert_eq!(r.cmp_mag(&b), Ordering::Less);
    }

    #[test]
    fn sqrt_perfect_square() {
        let a = mag(&[144]);
        let (s, r) = a.sqrt();
        assert_eq!(s.to_u64(), Some(12));
        assert!(r.is_zero());
    }

    #[test]
    fn sqrt_nonperfect() {
        let a = mag(&[145]);
        let (s, r) = a.sqrt();
        assert_eq!(s.to_u64(), Some(12));
        assert_eq!(r.to_u64(), Some(1));
    }

    #[test]
    fn hybrid_gcd_matches_euclid() {
        let a = mag(&[64]);
        let b = mag(&[58]);
        assert_eq!(a.hybrid_gcd(&b).to_u64(), Some(2));
        let a = mag(&[97]);
        let b = mag(&[89]);
        assert_eq!(a.hybrid_gcd(&b).to_u64(), Some(1));
    }

    #[test]
    fn le_mul_matches_u64() {
        let a = [0x1234_5678u32, 1];
        let b = [0x9ABC_DEF0u32];
        let p = le_mul(&a, &b);
        let expected = 0x1_1234_5678u64 * 0x9ABC_DEF0u64;
        let mut got: u64 = 0;
        for (i, w) in p.iter().enumerate() {
            got += (*w as u64) << (32 * i);
        }
        assert_eq!(got, expected);
    }
}
