//! `slow64` backend: widening multiply over arrays of 32-bit limbs.
//!
//! Mirrors the source material's non-`SOFTFLOAT_FAST_INT64` configuration
//! for targets without an efficient native 64-bit multiply: every wide
//! value is treated as an array of `u32` words and combined with a
//! schoolbook long multiplication. `index_word`/`index_multiword` in the
//! original keep this endian-neutral; here the limb arrays are always
//! little-endian internally regardless of host byte order, so no such
//! helper is needed — only the final pack/unpack at the crate boundary
//! cares about host endianness, and that happens in [`crate::format`].

use super::U256;

#[inline]
fn limbs_of(a: u128) -> [u32; 4] {
    [
        a as u32,
        (a >> 32) as u32,
        (a >> 64) as u32,
        (a >> 96) as u32,
    ]
}

#[inline]
fn limbs_to_u256(limbs: [u64; 8]) -> U256 {
    let mut lo: u128 = 0;
    let mut hi: u128 = 0;
    for (i, &limb) in limbs.iter().enumerate() {
        if i < 4 {
            lo |= u128::from(limb) << (32 * i);
        } else {
            hi |= u128::from(limb) << (32 * (i - 4));
        }
    }
    U256 { hi, lo }
}

pub(super) fn mul128(a: u128, b: u128) -> U256 {
    let a_limbs = limbs_of(a);
    let b_limbs = limbs_of(b);
    let mut acc = [0u64; 8];

    for (i, &av) in a_limbs.iter().enumerate() {
        let mut carry: u64 = 0;
        for (j, &bv) in b_limbs.iter().enumerate() {
            let idx = i + j;
            let product = u64::from(av) * u64::from(bv) + acc[idx] + carry;
            acc[idx] = product & 0xFFFF_FFFF;
            carry = product >> 32;
        }
        let mut k = i + b_limbs.len();
        while carry != 0 {
            let sum = acc[k] + carry;
            acc[k] = sum & 0xFFFF_FFFF;
            carry = sum >> 32;
            k += 1;
        }
    }

    limbs_to_u256(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_fast_backend() {
        let cases = [
            (0u128, 0u128),
            (1, 1),
            (u64::MAX as u128, u64::MAX as u128),
            (u128::MAX, u128::MAX),
            (12345, 67890),
        ];
        for (a, b) in cases {
            assert_eq!(mul128(a, b), super::super::fast::mul128(a, b));
        }
    }
}
