//! Square root (§4.5).
//!
//! Folds a parity bit into the mantissa so the remaining exponent is
//! exactly halved, then computes the mantissa's square root exactly via
//! [`crate::mwint::U256::isqrt`], rounding once from the exact
//! quotient-plus-remainder (see that method's doc comment for why no
//! reciprocal-seed Newton iteration is needed).

use super::{decode, encode_finite, invalid_result, propagate_nan, Decoded};
use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::round::{self, RoundParams};

#[must_use]
pub fn sqrt<F: FormatSpec>(a: u128) -> u128 {
    let da = decode::<F>(a);
    if let Some(nan) = propagate_nan::<F>(da, None) {
        return nan;
    }
    let params = RoundParams::of::<F>();

    match da {
        Decoded::Nan { .. } => unreachable!("handled by propagate_nan"),
        Decoded::Zero { sign } => F::zero(sign),
        Decoded::Infinity { sign: false } => F::infinity(false),
        Decoded::Infinity { sign: true } => invalid_result::<F>(),
        Decoded::Finite { sign: true, .. } => invalid_result::<F>(),
        Decoded::Finite {
            sign: false,
            exp,
            sig,
        } => {
            let (sig, exp) = round::normalize(sig, exp);
            let exp_half = exp.div_euclid(2);
            let odd = exp.rem_euclid(2) != 0;
            let sig_adj = if odd { sig.shl(1) } else { sig };

            let numerator = U256 {
                hi: sig_adj.hi,
                lo: 0,
            };
            let root = numerator.isqrt();
            let remainder = numerator.wrapping_sub(U256::mul128(root.lo, root.lo));
            // `numerator` (= sig_adj.hi * 2^128) has mantissa scale 2^126
            // (sig_adj.hi in [2^126, 2^128)); its square root carries half
            // that scale, 2^63, plus CANON/2 = 127 to re-align the result
            // at the canonical bit position for `norm_round_pack`.
            let mut sig_sqrt = root.shl(round::CANON / 2);
            if !remainder.is_zero() {
                sig_sqrt = U256 {
                    hi: sig_sqrt.hi,
                    lo: sig_sqrt.lo | 1,
                };
            }
            encode_finite::<F>(false, round::norm_round_pack(false, exp_half, sig_sqrt, params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::F64Fmt;
    use crate::state::{clear_exception_flags, exception_flags, ExceptionFlags};

    fn clear() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
    }

    #[test]
    fn sqrt_of_four_is_two() {
        clear();
        let four = F64Fmt::pack(false, 1025, 0);
        let two = F64Fmt::pack(false, 1024, 0);
        assert_eq!(sqrt::<F64Fmt>(four), two);
        assert!(exception_flags().is_empty());
    }

    #[test]
    fn sqrt_of_negative_is_invalid() {
        clear();
        let neg_one = F64Fmt::pack(true, 1023, 0);
        let result = sqrt::<F64Fmt>(neg_one);
        assert!(F64Fmt::is_nan(result));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn sqrt_of_positive_zero_is_positive_zero() {
        clear();
        assert_eq!(sqrt::<F64Fmt>(F64Fmt::zero(false)), F64Fmt::zero(false));
    }

    #[test]
    fn sqrt_of_positive_infinity_is_positive_infinity() {
        clear();
        assert_eq!(sqrt::<F64Fmt>(F64Fmt::infinity(false)), F64Fmt::infinity(false));
    }
}
