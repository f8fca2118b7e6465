//! `fast64` backend: widening multiply built from native 64-bit halves.
//!
//! Mirrors the source material's `SOFTFLOAT_FAST_INT64` configuration,
//! which represents double-width values as a pair of `u64` words in
//! little-endian logical order and composes wider multiplies from
//! `u64 × u64 → u128` (here, Rust's native `u128` multiply standing in
//! for the hardware-widening-multiply instruction the C source targets).

use super::U256;

#[inline]
pub(super) fn mul128(a: u128, b: u128) -> U256 {
    let (a_hi, a_lo) = (a >> 64, a & u128::from(u64::MAX));
    let (b_hi, b_lo) = (b >> 64, b & u128::from(u64::MAX));

    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_hi = a_hi * b_hi;

    let mask64 = u128::from(u64::MAX);

    // Compose the 256-bit product from the four 128-bit partial products.
    // `cross` collects everything that lands at the 2^64 boundary; its
    // low 64 bits complete the result's low limb and its overflow carries
    // into the high limb alongside the two 2^128-boundary terms.
    let cross = (lo_lo >> 64) + (hi_lo & mask64) + (lo_hi & mask64);
    let lo = (lo_lo & mask64) | (cross << 64);
    let hi = hi_hi + (hi_lo >> 64) + (lo_hi >> 64) + (cross >> 64);

    U256 { hi, lo }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_schoolbook_reference() {
        let cases = [
            (0u128, 0u128),
            (1, 1),
            (u64::MAX as u128, u64::MAX as u128),
            (u128::MAX, u128::MAX),
            (0x1234_5678_9abc_def0_1122_3344_5566_7788, 0xffff_ffff_ffff_ffff),
        ];
        for (a, b) in cases {
            let got = mul128(a, b);
            let want = super::super::slow::mul128(a, b);
            assert_eq!(got, want, "mismatch for {a:#x} * {b:#x}");
        }
    }

    #[test]
    fn max_times_max() {
        let p = mul128(u128::MAX, u128::MAX);
        // (2^128-1)^2 = 2^256 - 2^129 + 1 => hi = 2^128-2, lo = 1
        assert_eq!(p.lo, 1u128);
        assert_eq!(p.hi, u128::MAX - 1);
    }
}
