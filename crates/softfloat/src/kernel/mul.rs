//! Multiplication (§4.5).
//!
//! Each operand's significand lives entirely in the high 128-bit limb of
//! its canonical [`crate::mwint::U256`] (the low limb is always zero —
//! see [`super::decode`]), so the 128×128→256 widening primitive gives an
//! exact product in one step; only the final rounding is ever inexact.

use super::{decode, encode_finite, invalid_result, propagate_nan, Decoded};
use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::round::{self, RoundParams};

#[must_use]
pub fn mul<F: FormatSpec>(a: u128, b: u128) -> u128 {
    let da = decode::<F>(a);
    let db = decode::<F>(b);
    if let Some(nan) = propagate_nan::<F>(da, Some(db)) {
        return nan;
    }
    let params = RoundParams::of::<F>();

    match (da, db) {
        (Decoded::Infinity { .. }, Decoded::Zero { .. }) | (Decoded::Zero { .. }, Decoded::Infinity { .. }) => {
            invalid_result::<F>()
        }
        (Decoded::Infinity { sign: sa }, other) | (other, Decoded::Infinity { sign: sa }) => {
            let sb = sign_of(other);
            F::infinity(sa ^ sb)
        }
        (Decoded::Zero { sign: sa }, other) | (other, Decoded::Zero { sign: sa }) => {
            let sb = sign_of(other);
            F::zero(sa ^ sb)
        }
        (
            Decoded::Finite {
                sign: sa,
                exp: ea,
                sig: siga,
            },
            Decoded::Finite {
                sign: sb,
                exp: eb,
                sig: sigb,
            },
        ) => {
            let sign = sa ^ sb;
            let exp = ea + eb;
            let product = U256::mul128(siga.hi, sigb.hi).shl(2);
            encode_finite::<F>(sign, round::norm_round_pack(sign, exp, product, params))
        }
        (Decoded::Nan { .. }, _) | (_, Decoded::Nan { .. }) => unreachable!("handled by propagate_nan above"),
    }
}

fn sign_of(d: Decoded) -> bool {
    match d {
        Decoded::Zero { sign }
        | Decoded::Infinity { sign }
        | Decoded::Nan { sign, .. }
        | Decoded::Finite { sign, .. } => sign,
    }
}
