//! Shared constant tables and ABI thresholds.
//!
//! These are part of the external contract: radix arithmetic and algorithm
//! dispatch must agree with the values reproduced here, not some other
//! rounding of the same idea.

use crate::bigint::BigInt;
use std::sync::OnceLock;

/// Largest magnitude length (in 32-bit words) we will ever construct.
/// Sized so `bit_length` still fits comfortably inside an `i32`.
pub const MAX_MAG_LEN: usize = (i32::MAX as usize) / 32 + 1;

pub const KARATSUBA_THRESHOLD: usize = 80;
pub const TOOM_COOK_THRESHOLD: usize = 240;
pub const KARATSUBA_SQUARE_THRESHOLD: usize = 128;
pub const TOOM_COOK_SQUARE_THRESHOLD: usize = 216;

pub const BZ_THRESHOLD: usize = 80;
pub const BZ_OFFSET: usize = 40;

pub const SCHOENHAGE_BASE_CONVERSION_THRESHOLD: usize = 20;

pub const MIN_RADIX: u32 = 2;
pub const MAX_RADIX: u32 = 36;

/// Sliding-window size thresholds for Montgomery `mod_pow`, keyed by
/// `bit_length(exponent)`: the window is the smallest `w` whose bound in
/// this table is `>` the exponent's bit length.
pub const MOD_POW_WINDOW_BOUNDS: [(i64, u32); 7] = [
    (7, 1),
    (25, 2),
    (81, 3),
    (241, 4),
    (673, 5),
    (1793, 6),
    (i64::MAX, 7),
];

pub fn window_bits_for_exponent(exponent_bit_length: u64) -> u32 {
    for (bound, w) in MOD_POW_WINDOW_BOUNDS {
        if (exponent_bit_length as i64) < bound {
            return w;
        }
    }
    7
}

/// Number of digits of a given radix that fit in a positive `u32`.
pub const DIGITS_PER_INT: [u32; 37] = [
    0, 0, 30, 19, 15, 13, 11, 11, 10, 9, 9, 8, 8, 8, 8, 7, 7, 7, 7, 7, 7, 7, 6, 6, 6, 6, 6, 6, 6,
    6, 6, 6, 6, 5, 5, 5, 5,
];

/// `radix ^ DIGITS_PER_INT[radix]`, the largest power of `radix` that fits
/// in a `u32`.
pub const INT_RADIX: [u32; 37] = [
    0, 0, 0x4000_0000, 0x4546_b3db, 0x4000_0000, 0x48c2_7395, 0x159f_d800, 0x75db_9c97,
    0x4000_0000, 0x1717_9149, 0x3b9a_ca00, 0x0cc6_db61, 0x19a1_0000, 0x309f_1021, 0x57f6_c100,
    0x0a2f_1b6f, 0x1000_0000, 0x1875_4571, 0x247d_bc80, 0x3547_667b, 0x4c4b_4000, 0x6b5a_6e1d,
    0x06c2_0a40, 0x08d2_d931, 0x0b64_0000, 0x0e8d_4a51, 0x1269_ae40, 0x1717_9149, 0x1cb9_1000,
    0x2374_4899, 0x2b73_a840, 0x34e6_3b41, 0x4000_0000, 0x4cfa_3cc1, 0x5c13_d840, 0x6d91_b519,
    0x39aa_400,
];

/// Number of digits of a given radix that fit in a positive `i64`.
pub const DIGITS_PER_LONG: [u32; 37] = [
    0, 0, 62, 39, 31, 27, 24, 22, 20, 19, 18, 18, 17, 17, 16, 16, 15, 15, 15, 14, 14, 14, 14, 13,
    13, 13, 13, 13, 13, 12, 12, 12, 12, 12, 12, 12, 12,
];

/// `1024 * log2(radix)`, rounded up — used to size the pre-allocated
/// magnitude buffer before parsing a digit string.
pub const BITS_PER_DIGIT: [u64; 37] = [
    0, 0, 1024, 1624, 2048, 2378, 2648, 2875, 3072, 3247, 3402, 3543, 3672, 3790, 3899, 4001,
    4096, 4186, 4271, 4350, 4426, 4498, 4567, 4633, 4696, 4756, 4814, 4870, 4923, 4975, 5025,
    5074, 5120, 5166, 5210, 5253, 5295,
];

/// `radix ^ DIGITS_PER_LONG[radix]`, computed lazily and cached: the values
/// are large enough that hand-transcribing them invites transposition
/// errors, and they are fully determined by `DIGITS_PER_LONG` plus `radix`,
/// so computing them once at first use is exactly as reliable as a
/// hardcoded table while being self-evidently consistent with it.
pub fn long_radix(radix: u32) -> BigInt {
    static CACHE: OnceLock<[OnceLock<BigInt>; 37]> = OnceLock::new();
    let cache = CACHE.get_or_init(|| std::array::from_fn(|_| OnceLock::new()));
    cache[radix as usize]
        .get_or_init(|| BigInt::from(radix as u64).pow(DIGITS_PER_LONG[radix as usize]).unwrap())
        .clone()
}

/// `10^n` for `n` in `0..=18`, the largest range that fits in an `i64`.
pub const LONG_TEN_POWERS_TABLE: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// `10^n` as a `BigInt`, for arbitrary `n`, via an append-only cache grown
/// by repeated multiplication.
pub fn big_ten_power(n: u32) -> BigInt {
    static CACHE: OnceLock<std::sync::Mutex<Vec<BigInt>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| std::sync::Mutex::new(vec![BigInt::one()]));
    let mut table = cache.lock().unwrap();
    while table.len() <= n as usize {
        let next = table.last().unwrap().mul(&BigInt::from(10u64));
        table.push(next);
    }
    table[n as usize].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_radix_matches_digits_per_int() {
        for radix in MIN_RADIX..=MAX_RADIX {
            let expected = (radix as u64).pow(DIGITS_PER_INT[radix as usize]);
            assert_eq!(expected, INT_RADIX[radix as usize] as u64, "radix {radix}");
        }
    }

    #[test]
    fn long_radix_matches_digits_per_long() {
        for radix in MIN_RADIX..=MAX_RADIX {
            let expected = BigInt::from(radix as u64).pow(DIGITS_PER_LONG[radix as usize]).unwrap();
            assert_eq!(expected, long_radix(radix), "radix {radix}");
        }
    }

    #[test]
    fn window_bits_table_matches_bounds() {
        assert_eq!(window_bits_for_exponent(6), 1);
        assert_eq!(window_bits_for_exponent(7), 2);
        assert_eq!(window_bits_for_exponent(24), 2);
        assert_eq!(window_bits_for_exponent(25), 3);
        assert_eq!(window_bits_for_exponent(10_000), 7);
    }
}
