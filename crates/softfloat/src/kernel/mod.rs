//! Operation kernels (§4.5): `classify -> {NaN, infinity, zero, finite}`
//! dispatch shared by every arithmetic operation.
//!
//! [`decode`] turns a format's raw bit pattern into a format-agnostic
//! [`Decoded`] value — finite operands carry a [`crate::mwint::U256`]
//! significand already placed with its leading bit at
//! [`crate::round::CANON`], so every kernel below operates on exactly one
//! shared representation regardless of which of the four standard-layout
//! formats is in play. `extF80`'s distinct memory layout is handled by a
//! parallel `decode_ext80`/`encode_ext80` pair in [`convert`] and
//! kernel-specific ext80 entry points, reusing the same arithmetic cores.

pub mod add_sub;
pub mod compare;
pub mod convert;
pub mod div;
pub mod ext80;
pub mod fma;
pub mod mul;
pub mod rem;
pub mod round_to_int;
pub mod sqrt;

use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::nan::{ActivePolicy, NaNPolicy, NanOperand};
use crate::round::{self, Rounded};
use crate::state::{self, ExceptionFlags};

/// A decoded operand, independent of which format it came from.
#[derive(Clone, Copy, Debug)]
pub enum Decoded {
    Zero { sign: bool },
    Infinity { sign: bool },
    Nan {
        sign: bool,
        trailing: u128,
        signaling: bool,
    },
    /// `sig` has its leading bit at [`round::CANON`]; `exp` is the
    /// matching unbiased exponent, so the value is
    /// `(-1)^sign * (sig / 2^CANON) * 2^exp`.
    Finite { sign: bool, exp: i32, sig: U256 },
}

/// Decodes a standard-layout format's raw bit pattern.
#[must_use]
pub fn decode<F: FormatSpec>(raw: u128) -> Decoded {
    let (sign, biased_exp, trailing) = F::unpack(raw);
    if biased_exp == F::EXP_ALL_ONES {
        if trailing == 0 {
            Decoded::Infinity { sign }
        } else {
            let signaling = (trailing >> (F::SIG_BITS - 1)) & 1 == 0;
            Decoded::Nan {
                sign,
                trailing,
                signaling,
            }
        }
    } else if biased_exp == 0 && trailing == 0 {
        Decoded::Zero { sign }
    } else {
        let (implicit, exp): (u128, i32) = if biased_exp == 0 {
            (0, 1 - F::BIAS)
        } else {
            (1, i32::try_from(biased_exp).unwrap_or(0) - F::BIAS)
        };
        let full = (implicit << F::SIG_BITS) | trailing;
        let shift = round::CANON - (F::FRAC_BITS - 1);
        Decoded::Finite {
            sign,
            exp,
            sig: U256::from_u128(full).shl(shift),
        }
    }
}

/// Packs a rounded finite/overflow result back into a standard-layout
/// format.
#[must_use]
pub fn encode_finite<F: FormatSpec>(sign: bool, rounded: Rounded) -> u128 {
    match rounded {
        Rounded::Finite { biased_exp, kept } => F::pack(sign, biased_exp, kept),
        Rounded::Infinity => F::infinity(sign),
        Rounded::MaxFinite => F::max_finite(sign),
    }
}

#[must_use]
fn encode_nan<F: FormatSpec>(op: NanOperand) -> u128 {
    F::pack(op.sign, F::EXP_ALL_ONES, op.trailing)
}

/// If either operand is NaN, raises `invalid` for any signaling operand
/// and returns the propagated result; otherwise `None`.
#[must_use]
pub fn propagate_nan<F: FormatSpec>(a: Decoded, b: Option<Decoded>) -> Option<u128> {
    let as_nan = |d: Decoded| match d {
        Decoded::Nan {
            sign,
            trailing,
            signaling,
        } => Some((NanOperand { sign, trailing }, signaling)),
        _ => None,
    };
    let nan_a = as_nan(a);
    let nan_b = b.and_then(as_nan);
    if nan_a.is_none() && nan_b.is_none() {
        return None;
    }
    if nan_a.is_some_and(|(_, s)| s) || nan_b.is_some_and(|(_, s)| s) {
        state::raise_flags(ExceptionFlags::INVALID);
    }
    let result = match (nan_a, nan_b) {
        (Some((x, _)), Some((y, _))) => ActivePolicy::propagate_two(x, y, F::SIG_BITS),
        (Some((x, _)), None) | (None, Some((x, _))) => ActivePolicy::propagate_one(x, F::SIG_BITS),
        (None, None) => return None,
    };
    Some(encode_nan::<F>(result))
}

/// Raises `invalid` and returns the format's default quiet NaN: used for
/// operations with no NaN operand but an undefined result (`inf - inf`,
/// `0 * inf`, `0/0`, `sqrt` of a negative, ...).
#[must_use]
pub fn invalid_result<F: FormatSpec>() -> u128 {
    state::raise_flags(ExceptionFlags::INVALID);
    encode_nan::<F>(ActivePolicy::default_nan(F::SIG_BITS))
}

/// `+0` under round-toward-negative, `-0` otherwise: the sign of an exact
/// zero result from a true subtraction of equal magnitudes (§4.5, edge
/// case table).
#[must_use]
pub fn zero_sign_on_exact_cancellation() -> bool {
    matches!(state::rounding_mode(), state::RoundingMode::TowardNegative)
}
