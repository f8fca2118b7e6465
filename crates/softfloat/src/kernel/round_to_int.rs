//! Round to integral value (§4.5): rounds `a` to the nearest integer
//! representable in the same format, under the current rounding mode.
//!
//! Reuses the exact same guard/round/sticky extraction
//! [`round::round_pack`] performs, just cut at the integer boundary
//! (bit `CANON - exp`) instead of at the format's kept-significand
//! boundary; the rounded integer is then re-normalized and packed
//! through the ordinary [`round::norm_round_pack`] path, which also
//! catches the rare case of an integer too large for the format's own
//! precision (cascading into a second, legitimate rounding there).

use super::{decode, encode_finite, propagate_nan, Decoded};
use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::round::{self, RoundParams};
use crate::state::{self, ExceptionFlags, RoundingMode};

/// `exact`: whether an inexact result should raise `INEXACT` (the
/// distinction between `roundToIntegralExact` and the non-exact
/// `roundToIntegral` operation, §4.5).
#[must_use]
pub fn round_to_int<F: FormatSpec>(a: u128, exact: bool) -> u128 {
    let da = decode::<F>(a);
    if let Some(nan) = propagate_nan::<F>(da, None) {
        return nan;
    }
    let params = RoundParams::of::<F>();

    match da {
        Decoded::Nan { .. } => unreachable!("handled by propagate_nan"),
        Decoded::Zero { sign } => F::zero(sign),
        Decoded::Infinity { sign } => F::infinity(sign),
        Decoded::Finite { sign, exp, sig } => {
            let (sig, exp) = round::normalize(sig, exp);
            let shift = round::CANON as i32 - exp;
            if shift <= 0 {
                // Already integral: exponent puts the ULP at 1 or above.
                return encode_finite::<F>(sign, round::norm_round_pack(sign, exp, sig, params));
            }
            if shift > i32::try_from(round::CANON).unwrap_or(254) + 1 {
                // The integer boundary sits past the last addressable bit
                // of the working register: magnitude is under 1 ULP.
                let rounded = round::round_to_int_far_subnormal(sign, exact, params);
                return encode_finite::<F>(sign, rounded);
            }
            let kept_lsb = shift as u32;
            let round_bit_pos = kept_lsb - 1;
            let round_bit = sig.bit(round_bit_pos);
            let sticky = round::any_bit_below(sig, round_bit_pos);
            let kept_odd = sig.bit(kept_lsb);
            let any_lost = round_bit || sticky;

            if !any_lost {
                return encode_finite::<F>(sign, round::norm_round_pack(sign, exp, sig, params));
            }

            if exact {
                state::raise_flags(ExceptionFlags::INEXACT);
            }

            let rm = state::rounding_mode();
            let round_up = match rm {
                RoundingMode::NearestEven => round_bit && (sticky || kept_odd),
                RoundingMode::NearestMaxMagnitude => round_bit,
                RoundingMode::TowardZero => false,
                RoundingMode::TowardNegative => sign,
                RoundingMode::TowardPositive => !sign,
            };

            let integer_only = sig.shr(kept_lsb).shl(kept_lsb);
            let result_sig = if round_up {
                integer_only.wrapping_add(U256::from_u128(1).shl(kept_lsb))
            } else {
                integer_only
            };

            if result_sig.is_zero() {
                return F::zero(sign);
            }
            encode_finite::<F>(sign, round::norm_round_pack(sign, exp, result_sig, params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::F64Fmt;
    use crate::state::{clear_exception_flags, exception_flags, set_rounding_mode};

    fn clear() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        set_rounding_mode(RoundingMode::NearestEven);
    }

    #[test]
    fn two_point_five_rounds_to_two_under_nearest_even() {
        clear();
        let two_point_five = F64Fmt::pack(false, 1024, 1 << 51); // 1.25 * 2^1
        let two = F64Fmt::pack(false, 1024, 0);
        assert_eq!(round_to_int::<F64Fmt>(two_point_five, true), two);
        assert!(exception_flags().contains(ExceptionFlags::INEXACT));
    }

    #[test]
    fn three_point_five_rounds_to_four_under_nearest_even() {
        clear();
        let three_point_five = F64Fmt::pack(false, 1024, 0b11 << 50); // 1.75 * 2^1
        let four = F64Fmt::pack(false, 1025, 0);
        assert_eq!(round_to_int::<F64Fmt>(three_point_five, true), four);
    }

    #[test]
    fn non_exact_mode_suppresses_inexact_flag() {
        clear();
        let two_point_five = F64Fmt::pack(false, 1024, 1 << 51);
        let two = F64Fmt::pack(false, 1024, 0);
        assert_eq!(round_to_int::<F64Fmt>(two_point_five, false), two);
        assert!(!exception_flags().contains(ExceptionFlags::INEXACT));
    }

    #[test]
    fn already_integral_value_passes_through_unchanged() {
        clear();
        let four = F64Fmt::pack(false, 1025, 0);
        assert_eq!(round_to_int::<F64Fmt>(four, true), four);
        assert!(exception_flags().is_empty());
    }

    #[test]
    fn toward_zero_truncates() {
        clear();
        set_rounding_mode(RoundingMode::TowardZero);
        let one_point_875 = F64Fmt::pack(false, 1023, 0b1110 << 48);
        let one = F64Fmt::pack(false, 1023, 0);
        assert_eq!(round_to_int::<F64Fmt>(one_point_875, true), one);
        set_rounding_mode(RoundingMode::NearestEven);
    }

    #[test]
    fn negative_value_rounds_symmetrically() {
        clear();
        let neg_two_point_five = F64Fmt::pack(true, 1024, 1 << 51);
        let neg_two = F64Fmt::pack(true, 1024, 0);
        assert_eq!(round_to_int::<F64Fmt>(neg_two_point_five, true), neg_two);
    }

    #[test]
    fn smallest_subnormal_rounds_to_zero_under_nearest_even() {
        clear();
        let smallest_subnormal = F64Fmt::pack(false, 0, 1);
        assert_eq!(round_to_int::<F64Fmt>(smallest_subnormal, true), F64Fmt::zero(false));
        assert!(exception_flags().contains(ExceptionFlags::INEXACT));
    }

    #[test]
    fn negative_smallest_subnormal_floors_to_negative_one() {
        clear();
        set_rounding_mode(RoundingMode::TowardNegative);
        let smallest_subnormal = F64Fmt::pack(true, 0, 1);
        let neg_one = F64Fmt::pack(true, 1023, 0);
        assert_eq!(round_to_int::<F64Fmt>(smallest_subnormal, true), neg_one);
        set_rounding_mode(RoundingMode::NearestEven);
    }

    #[test]
    fn positive_smallest_subnormal_ceils_to_one() {
        clear();
        set_rounding_mode(RoundingMode::TowardPositive);
        let smallest_subnormal = F64Fmt::pack(false, 0, 1);
        let one = F64Fmt::pack(false, 1023, 0);
        assert_eq!(round_to_int::<F64Fmt>(smallest_subnormal, true), one);
        set_rounding_mode(RoundingMode::NearestEven);
    }

    #[test]
    fn smallest_subnormal_truncates_to_zero_toward_zero() {
        clear();
        set_rounding_mode(RoundingMode::TowardZero);
        let smallest_subnormal = F64Fmt::pack(false, 0, 1);
        assert_eq!(round_to_int::<F64Fmt>(smallest_subnormal, true), F64Fmt::zero(false));
        set_rounding_mode(RoundingMode::NearestEven);
    }
}
