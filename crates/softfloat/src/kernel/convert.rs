//! Conversions (§4.5): between the four standard-layout formats, between
//! a standard-layout format and extF80, and between any format and the
//! native signed/unsigned integer types.
//!
//! Format-to-format widening/narrowing reuses [`round::norm_round_pack`]
//! exactly like every arithmetic kernel — a conversion is just an
//! operation whose "computation" is the identity. Float-to-integer
//! conversions round the same way, but extract a plain magnitude instead
//! of re-packing a float, and settle range/NaN edge cases against the
//! reference's `ui64_fromNaN`/`i64_fromNaN` sentinel convention: a NaN or
//! an out-of-range value raises `invalid` and saturates to the nearer
//! bound (negative saturates low, everything else saturates high).

use super::{decode, encode_finite, Decoded};
use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::nan::{ActivePolicy, NaNPolicy, NanOperand};
use crate::round::{self, RoundParams, Rounded};
use crate::state::{self, ExceptionFlags, RoundingMode};

/// Converts between two standard-layout formats (widening is always
/// exact; narrowing rounds and may overflow to infinity).
#[must_use]
pub fn convert<FSrc: FormatSpec, FDst: FormatSpec>(raw: u128) -> u128 {
    let d = decode::<FSrc>(raw);
    let params = RoundParams::of::<FDst>();
    match d {
        Decoded::Nan {
            sign,
            trailing,
            signaling,
        } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            let common = ActivePolicy::to_common(NanOperand { sign, trailing }, FSrc::SIG_BITS);
            let quieted = ActivePolicy::from_common(common, FDst::SIG_BITS);
            FDst::pack(quieted.sign, FDst::EXP_ALL_ONES, quieted.trailing)
        }
        Decoded::Zero { sign } => FDst::zero(sign),
        Decoded::Infinity { sign } => FDst::infinity(sign),
        Decoded::Finite { sign, exp, sig } => encode_finite::<FDst>(sign, round::norm_round_pack(sign, exp, sig, params)),
    }
}

/// Decodes an extF80 bit pattern into the shared [`Decoded`] representation.
#[must_use]
pub fn decode_ext80(raw: u128) -> Decoded {
    use crate::format::ext80;
    let (sign, biased_exp, sig) = ext80::unpack(raw);
    if biased_exp == ext80::EXP_ALL_ONES {
        if sig == 1 << 63 {
            Decoded::Infinity { sign }
        } else {
            let signaling = (sig >> 62) & 1 == 0;
            Decoded::Nan {
                sign,
                trailing: u128::from(sig) & ((1u128 << 63) - 1),
                signaling,
            }
        }
    } else if biased_exp == 0 && sig == 0 {
        Decoded::Zero { sign }
    } else {
        let exp = if biased_exp == 0 {
            1 - ext80::BIAS
        } else {
            i32::try_from(biased_exp).unwrap_or(0) - ext80::BIAS
        };
        let shift = round::CANON - (ext80::FRAC_BITS - 1);
        Decoded::Finite {
            sign,
            exp,
            sig: U256::from_u128(u128::from(sig)).shl(shift),
        }
    }
}

/// Packs a rounded finite/overflow result into extF80's explicit-leading-bit
/// layout.
#[must_use]
pub fn encode_ext80_finite(sign: bool, rounded: Rounded) -> u128 {
    use crate::format::ext80;
    match rounded {
        Rounded::Finite { biased_exp, kept } => ext80::pack(sign, biased_exp, kept as u64),
        Rounded::Infinity => ext80::infinity(sign),
        Rounded::MaxFinite => ext80::max_finite(sign),
    }
}

#[must_use]
fn encode_ext80_nan(op: NanOperand) -> u128 {
    use crate::format::ext80;
    let sig = (1u64 << 63) | (op.trailing as u64 & ((1 << 63) - 1));
    ext80::pack(op.sign, ext80::EXP_ALL_ONES, sig)
}

/// Converts a standard-layout format to extF80 (always exact: extF80 has
/// strictly more range and precision than any of the other four formats).
#[must_use]
pub fn to_ext80<FSrc: FormatSpec>(raw: u128) -> u128 {
    use crate::format::ext80;
    let d = decode::<FSrc>(raw);
    let params = RoundParams::ext80();
    match d {
        Decoded::Nan {
            sign,
            trailing,
            signaling,
        } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            let common = ActivePolicy::to_common(NanOperand { sign, trailing }, FSrc::SIG_BITS);
            let quieted = ActivePolicy::from_common(common, ext80::FRAC_BITS - 1);
            encode_ext80_nan(quieted)
        }
        Decoded::Zero { sign } => ext80::zero(sign),
        Decoded::Infinity { sign } => ext80::infinity(sign),
        Decoded::Finite { sign, exp, sig } => encode_ext80_finite(sign, round::norm_round_pack(sign, exp, sig, params)),
    }
}

/// Converts extF80 to a standard-layout format (may round and may
/// overflow, since extF80 has more range and precision than every other
/// format).
#[must_use]
pub fn from_ext80<FDst: FormatSpec>(raw: u128) -> u128 {
    let d = decode_ext80(raw);
    let params = RoundParams::of::<FDst>();
    use crate::format::ext80;
    match d {
        Decoded::Nan {
            sign,
            trailing,
            signaling,
        } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            let common = ActivePolicy::to_common(NanOperand { sign, trailing }, ext80::FRAC_BITS - 1);
            let quieted = ActivePolicy::from_common(common, FDst::SIG_BITS);
            FDst::pack(quieted.sign, FDst::EXP_ALL_ONES, quieted.trailing)
        }
        Decoded::Zero { sign } => FDst::zero(sign),
        Decoded::Infinity { sign } => FDst::infinity(sign),
        Decoded::Finite { sign, exp, sig } => encode_finite::<FDst>(sign, round::norm_round_pack(sign, exp, sig, params)),
    }
}

/// Converts a signed 64-bit integer to `F`, exactly when representable,
/// else rounding per the current mode.
#[must_use]
pub fn int_to_float<F: FormatSpec>(value: i64) -> u128 {
    if value == 0 {
        return F::zero(false);
    }
    magnitude_to_float::<F>(value < 0, u128::from(value.unsigned_abs()))
}

/// Converts an unsigned 64-bit integer to `F`.
#[must_use]
pub fn uint_to_float<F: FormatSpec>(value: u64) -> u128 {
    if value == 0 {
        return F::zero(false);
    }
    magnitude_to_float::<F>(false, u128::from(value))
}

fn magnitude_to_float<F: FormatSpec>(sign: bool, magnitude: u128) -> u128 {
    let bit_len = 128 - magnitude.leading_zeros();
    let exp = i32::try_from(bit_len - 1).unwrap_or(0);
    let shift = round::CANON - (bit_len - 1);
    let sig = U256::from_u128(magnitude).shl(shift);
    let params = RoundParams::of::<F>();
    encode_finite::<F>(sign, round::norm_round_pack(sign, exp, sig, params))
}

/// Rounds a decoded finite value to an exact integer magnitude (no
/// format re-encoding), per the current rounding mode. Returns `None`
/// when the magnitude is guaranteed to exceed `bits` regardless of
/// rounding.
fn round_to_integer_magnitude(sign: bool, exp: i32, sig: U256, bits: u32) -> Option<(u128, bool)> {
    let (sig, exp) = round::normalize(sig, exp);
    if exp >= i32::try_from(bits).unwrap_or(i32::MAX) {
        return None;
    }
    // `exp < bits <= 64 < CANON` bounds `kept_lsb` from below, but a
    // deeply subnormal `exp` (far below zero) still pushes it arbitrarily
    // far above the working register's width, so the round/sticky
    // extraction below must tolerate that rather than assume it never
    // happens.
    let kept_lsb = (round::CANON as i32 - exp) as u32;
    let round_bit_pos = kept_lsb - 1;
    let round_bit = sig.bit(round_bit_pos);
    let sticky = round::any_bit_below(sig, round_bit_pos);
    let kept_odd = sig.bit(kept_lsb);
    let any_lost = round_bit || sticky;
    let rm = state::rounding_mode();
    let round_up = match rm {
        RoundingMode::NearestEven => round_bit && (sticky || kept_odd),
        RoundingMode::NearestMaxMagnitude => round_bit,
        RoundingMode::TowardZero => false,
        RoundingMode::TowardNegative => sign && any_lost,
        RoundingMode::TowardPositive => !sign && any_lost,
    };
    let base = sig.shr(kept_lsb);
    let integer = if round_up { base.wrapping_add(U256::from_u128(1)) } else { base };
    Some((integer.lo, any_lost))
}

/// Converts `F` to the nearest representable `i64`, rounding per the
/// current mode; out-of-range magnitudes and NaNs raise `invalid` and
/// saturate (negative low, everything else high).
#[must_use]
pub fn float_to_i64<F: FormatSpec>(raw: u128) -> i64 {
    let d = decode::<F>(raw);
    match d {
        Decoded::Nan { .. } => {
            state::raise_flags(ExceptionFlags::INVALID);
            i64::MAX
        }
        Decoded::Infinity { sign } => {
            state::raise_flags(ExceptionFlags::INVALID);
            if sign { i64::MIN } else { i64::MAX }
        }
        Decoded::Zero { .. } => 0,
        Decoded::Finite { sign, exp, sig } => match round_to_integer_magnitude(sign, exp, sig, 64) {
            None => {
                state::raise_flags(ExceptionFlags::INVALID);
                if sign { i64::MIN } else { i64::MAX }
            }
            Some((magnitude, any_lost)) => {
                if any_lost {
                    state::raise_flags(ExceptionFlags::INEXACT);
                }
                if sign {
                    if magnitude > 1u128 << 63 {
                        state::raise_flags(ExceptionFlags::INVALID);
                        i64::MIN
                    } else if magnitude == 1u128 << 63 {
                        i64::MIN
                    } else {
                        -(magnitude as i64)
                    }
                } else if magnitude > i64::MAX as u128 {
                    state::raise_flags(ExceptionFlags::INVALID);
                    i64::MAX
                } else {
                    magnitude as i64
                }
            }
        },
    }
}

/// Converts `F` to the nearest representable `u64`. A negative value
/// that rounds to exactly zero is representable (no flag beyond whatever
/// rounding itself raised); any other negative value raises `invalid`
/// and saturates to `0`.
#[must_use]
pub fn float_to_u64<F: FormatSpec>(raw: u128) -> u64 {
    let d = decode::<F>(raw);
    match d {
        Decoded::Nan { .. } => {
            state::raise_flags(ExceptionFlags::INVALID);
            u64::MAX
        }
        Decoded::Infinity { sign } => {
            state::raise_flags(ExceptionFlags::INVALID);
            if sign { 0 } else { u64::MAX }
        }
        Decoded::Zero { .. } => 0,
        Decoded::Finite { sign, exp, sig } => match round_to_integer_magnitude(sign, exp, sig, 64) {
            None => {
                state::raise_flags(ExceptionFlags::INVALID);
                if sign { 0 } else { u64::MAX }
            }
            Some((magnitude, any_lost)) => {
                if sign && magnitude != 0 {
                    state::raise_flags(ExceptionFlags::INVALID);
                    return 0;
                }
                if any_lost {
                    state::raise_flags(ExceptionFlags::INEXACT);
                }
                if magnitude > u128::from(u64::MAX) {
                    state::raise_flags(ExceptionFlags::INVALID);
                    u64::MAX
                } else {
                    magnitude as u64
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{F32Fmt, F64Fmt};
    use crate::state::{clear_exception_flags, exception_flags};

    fn clear() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
    }

    #[test]
    fn widen_f32_to_f64_is_exact() {
        clear();
        let half = F32Fmt::pack(false, 126, 0);
        let result = convert::<F32Fmt, F64Fmt>(half);
        assert_eq!(result, F64Fmt::pack(false, 1022, 0));
        assert!(exception_flags().is_empty());
    }

    #[test]
    fn narrow_f64_to_f32_rounds() {
        clear();
        let one = F64Fmt::pack(false, 1023, 0);
        assert_eq!(convert::<F64Fmt, F32Fmt>(one), F32Fmt::pack(false, 127, 0));
    }

    #[test]
    fn int_to_float_round_trip_small_values() {
        clear();
        assert_eq!(int_to_float::<F64Fmt>(5), F64Fmt::pack(false, 1025, 1 << 50));
        assert_eq!(int_to_float::<F64Fmt>(-5), F64Fmt::pack(true, 1025, 1 << 50));
        assert_eq!(int_to_float::<F64Fmt>(0), F64Fmt::zero(false));
    }

    #[test]
    fn float_to_i64_truncation_range() {
        clear();
        let five = F64Fmt::pack(false, 1025, 1 << 50);
        assert_eq!(float_to_i64::<F64Fmt>(five), 5);
        let neg_five = F64Fmt::pack(true, 1025, 1 << 50);
        assert_eq!(float_to_i64::<F64Fmt>(neg_five), -5);
    }

    #[test]
    fn float_to_u64_of_negative_nonzero_is_invalid() {
        clear();
        let neg_one = F64Fmt::pack(true, 1023, 0);
        assert_eq!(float_to_u64::<F64Fmt>(neg_one), 0);
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn float_to_i64_of_nan_is_invalid_and_saturates_high() {
        clear();
        let nan = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1);
        assert_eq!(float_to_i64::<F64Fmt>(nan), i64::MAX);
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn float_to_i64_of_smallest_subnormal_rounds_to_zero() {
        clear();
        let smallest_subnormal = F64Fmt::pack(false, 0, 1);
        assert_eq!(float_to_i64::<F64Fmt>(smallest_subnormal), 0);
        assert!(exception_flags().contains(ExceptionFlags::INEXACT));
    }

    #[test]
    fn float_to_u64_of_smallest_subnormal_rounds_to_zero() {
        clear();
        let smallest_subnormal = F64Fmt::pack(false, 0, 1);
        assert_eq!(float_to_u64::<F64Fmt>(smallest_subnormal), 0);
        assert!(exception_flags().contains(ExceptionFlags::INEXACT));
    }
}
