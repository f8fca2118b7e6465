//! Rounding and packing (§4.3): the one place every kernel's finite-path
//! computation converges. `round_pack` takes an already-normalized
//! (sign, unbiased exponent, wide significand) triple — leading bit
//! exactly at [`CANON`] — and produces a correctly rounded, packed
//! result, raising `inexact` / `underflow` / `overflow` as it goes.
//! `norm_round_pack` is the variant that normalizes first, for kernels
//! (multiply, FMA, div, sqrt) whose raw significand doesn't start out
//! with the leading bit in canonical position.

use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::state::{self, ExceptionFlags, RoundingMode};

/// Canonical bit position of a normalized value's leading one within a
/// [`U256`] working register. One bit of headroom above it (bit 255)
/// catches the carry-out of a rounding increment or a subnormal rounding
/// up into the smallest normal value; everything below it, down to each
/// format's kept-significand width, is fraction, guard, round, and
/// sticky.
pub const CANON: u32 = 254;

/// Shifts `sig` until its leading one sits at [`CANON`], adjusting `exp`
/// to compensate. A zero significand is left untouched.
#[must_use]
pub fn normalize(mut sig: U256, mut exp: i32) -> (U256, i32) {
    if sig.is_zero() {
        return (sig, exp);
    }
    let current_pos = i32::try_from(255 - sig.leading_zeros()).unwrap_or(0);
    let canon = i32::try_from(CANON).unwrap_or(254);
    match current_pos.cmp(&canon) {
        core::cmp::Ordering::Less => {
            let s = u32::try_from(canon - current_pos).unwrap_or(0);
            sig = sig.shl(s);
            exp -= i32::try_from(s).unwrap_or(0);
        }
        core::cmp::Ordering::Greater => {
            let s = u32::try_from(current_pos - canon).unwrap_or(0);
            sig = sig.shr_jam(s);
            exp += i32::try_from(s).unwrap_or(0);
        }
        core::cmp::Ordering::Equal => {}
    }
    (sig, exp)
}

/// The packable outcome of rounding, before format-specific bit-layout
/// packing is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounded {
    /// A finite value: `biased_exp` is `0` for a subnormal/zero result,
    /// `kept` holds the significand (including the leading bit when the
    /// format stores it explicitly, i.e. extF80).
    Finite { biased_exp: u32, kept: u128 },
    Infinity,
    MaxFinite,
}

/// Format parameters needed purely for rounding, independent of bit
/// layout (so the same function serves both [`crate::format::FormatSpec`]
/// formats and extF80).
#[derive(Clone, Copy, Debug)]
pub struct RoundParams {
    pub exp_bits: u32,
    /// Kept significand bits including the leading one.
    pub frac_bits: u32,
    pub bias: i32,
    /// `true` for extF80: the leading bit is stored explicitly, so it
    /// survives into `kept` rather than being dropped as implicit.
    pub explicit_leading_bit: bool,
}

impl RoundParams {
    #[must_use]
    pub const fn exp_all_ones(self) -> u32 {
        (1 << self.exp_bits) - 1
    }

    /// Parameters for one of the four standard-layout formats.
    #[must_use]
    pub const fn of<F: FormatSpec>() -> Self {
        Self {
            exp_bits: F::EXP_BITS,
            frac_bits: F::FRAC_BITS,
            bias: F::BIAS,
            explicit_leading_bit: false,
        }
    }

    /// Parameters for the 80-bit extended format's explicit-integer-bit
    /// layout, at full (64-bit) significand precision.
    #[must_use]
    pub const fn ext80() -> Self {
        Self::ext80_at(crate::format::ext80::FRAC_BITS)
    }

    /// Parameters for extF80 rounded to a reduced significand width, for
    /// the FPU-control-word-style precision knob in [`crate::state`]:
    /// `frac_bits` is 24/53/64 for single/double/extended precision. The
    /// 64-bit storage width and 15-bit exponent field never shrink; only
    /// where rounding cuts the significand moves. Callers are responsible
    /// for re-justifying the rounded `kept` value to the full storage
    /// width before packing (see `kernel::ext80::pack_finite`).
    #[must_use]
    pub const fn ext80_at(frac_bits: u32) -> Self {
        Self {
            exp_bits: crate::format::ext80::EXP_BITS,
            frac_bits,
            bias: crate::format::ext80::BIAS,
            explicit_leading_bit: true,
        }
    }
}

/// Rounds an already-normalized (leading bit at [`CANON`], or exactly
/// zero) significand to `params` and packs the result.
#[must_use]
pub fn round_pack(sign: bool, exp: i32, sig: U256, params: RoundParams) -> Rounded {
    if sig.is_zero() {
        return Rounded::Finite {
            biased_exp: 0,
            kept: 0,
        };
    }

    let exp_min = 1 - params.bias;
    let mut sig = sig;
    let mut effective_exp = exp;
    let tiny_before = exp < exp_min;
    if tiny_before {
        let deficit = u32::try_from(exp_min - exp).unwrap_or(u32::MAX);
        sig = sig.shr_jam(deficit);
        effective_exp = exp_min;
    }

    let kept_lsb = CANON - params.frac_bits + 1;
    let round_bit_pos = kept_lsb - 1;
    let round_bit = sig.bit(round_bit_pos);
    let sticky = any_bit_below(sig, round_bit_pos);
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

    let mut rounded = if round_up {
        sig.wrapping_add(U256::from_u128(1).shl(kept_lsb))
    } else {
        sig
    };

    if rounded.bit(CANON + 1) {
        rounded = rounded.shr(1);
        effective_exp += 1;
    }

    let is_tiny = match state::tininess_mode() {
        state::TininessMode::BeforeRounding => tiny_before,
        state::TininessMode::AfterRounding => tiny_before && !rounded.bit(CANON),
    };
    if is_tiny && any_lost {
        state::raise_flags(ExceptionFlags::UNDERFLOW);
    }
    if any_lost {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    let has_leading_one = rounded.bit(CANON);
    let biased_exp = if has_leading_one {
        effective_exp + params.bias
    } else {
        0
    };

    if biased_exp >= i32::try_from(params.exp_all_ones()).unwrap_or(i32::MAX) {
        state::raise_flags(ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
        let goes_to_infinity = match rm {
            RoundingMode::NearestEven | RoundingMode::NearestMaxMagnitude => true,
            RoundingMode::TowardZero => false,
            RoundingMode::TowardPositive => !sign,
            RoundingMode::TowardNegative => sign,
        };
        return if goes_to_infinity {
            Rounded::Infinity
        } else {
            Rounded::MaxFinite
        };
    }

    let kept_window = extract_bits(rounded, kept_lsb, params.frac_bits);
    let kept = if params.explicit_leading_bit {
        kept_window
    } else {
        kept_window & ((1u128 << (params.frac_bits - 1)) - 1)
    };

    Rounded::Finite {
        biased_exp: biased_exp.max(0) as u32,
        kept,
    }
}

/// Normalizes, then rounds and packs (§4.3, `norm_round_pack`).
#[must_use]
pub fn norm_round_pack(sign: bool, exp: i32, sig: U256, params: RoundParams) -> Rounded {
    let (sig, exp) = normalize(sig, exp);
    round_pack(sign, exp, sig, params)
}

/// Extracts `width` bits starting at bit `lsb` (inclusive) of a [`U256`],
/// as a `u128`. `width` must be `<= 128` for every caller in this crate
/// (the widest kept-significand field, extF80/F128, is well under that).
fn extract_bits(value: U256, lsb: u32, width: u32) -> u128 {
    let shifted = value.shr(lsb);
    if width >= 128 {
        shifted.lo
    } else {
        shifted.lo & ((1u128 << width) - 1)
    }
}

/// Whether `value` has any nonzero bit strictly below `pos`. Implemented
/// as a shift-down/shift-up round trip rather than `256 - pos` so that a
/// `pos` past the register width (reachable from a deeply subnormal
/// `round_to_int`/`float_to_iN` input, where the integer boundary can sit
/// far beyond [`CANON`]) never underflows the subtraction: `shr`/`shl`
/// already saturate to zero for an out-of-range amount, which is exactly
/// the right answer here, since every occupied bit of a normalized,
/// nonzero significand sits at or below `CANON`.
pub(crate) fn any_bit_below(value: U256, pos: u32) -> bool {
    value.shr(pos).shl(pos) != value
}

/// Rounds a finite, nonzero value whose integer boundary falls past the
/// last addressable bit of the working register (i.e. its magnitude is
/// under 1 ULP at the unit position) to the nearest integer. In this
/// regime the round bit is always 0 and the sticky bit is always 1, so
/// the only two possible outcomes are a signed zero or a signed one.
#[must_use]
pub fn round_to_int_far_subnormal(sign: bool, exact: bool, params: RoundParams) -> Rounded {
    if exact {
        state::raise_flags(ExceptionFlags::INEXACT);
    }
    let round_up = match state::rounding_mode() {
        RoundingMode::NearestEven | RoundingMode::NearestMaxMagnitude | RoundingMode::TowardZero => false,
        RoundingMode::TowardNegative => sign,
        RoundingMode::TowardPositive => !sign,
    };
    if round_up {
        round_pack(sign, 0, U256::from_u128(1).shl(CANON), params)
    } else {
        Rounded::Finite { biased_exp: 0, kept: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{F64Fmt, FormatSpec};
    use crate::state::{clear_exception_flags, exception_flags, set_rounding_mode};

    fn f64_params() -> RoundParams {
        RoundParams::of::<F64Fmt>()
    }

    #[test]
    fn exact_value_rounds_with_no_flags() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        // 1.0 = leading one at CANON, exp = 0 (unbiased for 2^0).
        let sig = U256::from_u128(1).shl(CANON);
        let r = norm_round_pack(false, 0, sig, f64_params());
        assert_eq!(
            r,
            Rounded::Finite {
                biased_exp: 1023,
                kept: 0
            }
        );
        assert!(exception_flags().is_empty());
    }

    #[test]
    fn overflow_rounds_to_infinity_under_nearest_even() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        set_rounding_mode(RoundingMode::NearestEven);
        let sig = U256::from_u128(1).shl(CANON);
        let r = round_pack(false, 100_000, sig, f64_params());
        assert_eq!(r, Rounded::Infinity);
        assert!(exception_flags().contains(ExceptionFlags::OVERFLOW));
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
    }

    #[test]
    fn overflow_rounds_to_max_finite_toward_zero() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        set_rounding_mode(RoundingMode::TowardZero);
        let sig = U256::from_u128(1).shl(CANON);
        let r = round_pack(false, 100_000, sig, f64_params());
        assert_eq!(r, Rounded::MaxFinite);
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        set_rounding_mode(RoundingMode::NearestEven);
    }

    #[test]
    fn subnormal_result_sets_underflow_and_inexact() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        set_rounding_mode(RoundingMode::NearestEven);
        // A value with one extra lost bit, exponent far below exp_min.
        let sig = U256::from_u128(0b11).shl(CANON - 1);
        let r = round_pack(false, -2000, sig, f64_params());
        assert!(matches!(r, Rounded::Finite { biased_exp: 0, .. }));
        assert!(exception_flags().contains(ExceptionFlags::UNDERFLOW));
        assert!(exception_flags().contains(ExceptionFlags::INEXACT));
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
    }

    #[test]
    fn ties_to_even_breaks_toward_zero_lsb() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
        set_rounding_mode(RoundingMode::NearestEven);
        // Leading one, then all zero fraction, then a lone round bit
        // exactly at the halfway point with kept LSB = 0 (even) -> no
        // round up.
        let kept_lsb = CANON - F64Fmt::FRAC_BITS + 1;
        let sig = U256::from_u128(1)
            .shl(CANON)
            .wrapping_add(U256::from_u128(1).shl(kept_lsb - 1));
        let r = norm_round_pack(false, 0, sig, f64_params());
        assert_eq!(
            r,
            Rounded::Finite {
                biased_exp: 1023,
                kept: 0
            }
        );
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
    }
}
