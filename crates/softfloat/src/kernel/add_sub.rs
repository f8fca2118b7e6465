//! Addition and subtraction (§4.5).
//!
//! Both funnel through one effective-sign-aligned core: subtraction is
//! addition of the second operand with its sign flipped, matching how the
//! reference treats `addF32`/`subF32` as thin wrappers around a shared
//! `addMagsF32`/`subMagsF32` pair.

use super::{decode, encode_finite, invalid_result, propagate_nan, zero_sign_on_exact_cancellation, Decoded};
use crate::format::FormatSpec;
use crate::round::{self, RoundParams};

#[must_use]
pub fn add<F: FormatSpec>(a: u128, b: u128) -> u128 {
    add_sub::<F>(a, b, false)
}

#[must_use]
pub fn sub<F: FormatSpec>(a: u128, b: u128) -> u128 {
    add_sub::<F>(a, b, true)
}

fn add_sub<F: FormatSpec>(a: u128, b: u128, negate_b: bool) -> u128 {
    let da = decode::<F>(a);
    let db = decode::<F>(b);
    if let Some(nan) = propagate_nan::<F>(da, Some(db)) {
        return nan;
    }

    let flip = |s: bool| s ^ negate_b;
    let params = RoundParams::of::<F>();

    match (da, db) {
        (Decoded::Infinity { sign: sa }, Decoded::Infinity { sign: sb }) => {
            if sa == flip(sb) {
                F::infinity(sa)
            } else {
                invalid_result::<F>()
            }
        }
        (Decoded::Infinity { sign }, _) => F::infinity(sign),
        (_, Decoded::Infinity { sign }) => F::infinity(flip(sign)),
        (Decoded::Zero { sign: sa }, Decoded::Zero { sign: sb }) => {
            let sb = flip(sb);
            if sa == sb {
                F::zero(sa)
            } else {
                F::zero(zero_sign_on_exact_cancellation())
            }
        }
        (Decoded::Zero { .. }, Decoded::Finite { sign, exp, sig }) => {
            let sign = flip(sign);
            encode_finite::<F>(sign, round::norm_round_pack(sign, exp, sig, params))
        }
        (Decoded::Finite { sign, exp, sig }, Decoded::Zero { .. }) => {
            encode_finite::<F>(sign, round::norm_round_pack(sign, exp, sig, params))
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
            let sb = flip(sb);
            let (hi_sign, hi_exp, hi_sig, lo_sign, lo_sig) = if ea >= eb {
                (sa, ea, siga, sb, sigb.shr_jam(u32::try_from(ea - eb).unwrap_or(u32::MAX)))
            } else {
                (sb, eb, sigb, sa, siga.shr_jam(u32::try_from(eb - ea).unwrap_or(u32::MAX)))
            };
            if hi_sign == lo_sign {
                let sum = hi_sig.wrapping_add(lo_sig);
                encode_finite::<F>(hi_sign, round::norm_round_pack(hi_sign, hi_exp, sum, params))
            } else {
                match hi_sig.cmp(lo_sig) {
                    core::cmp::Ordering::Equal => F::zero(zero_sign_on_exact_cancellation()),
                    core::cmp::Ordering::Greater => {
                        let diff = hi_sig.wrapping_sub(lo_sig);
                        encode_finite::<F>(hi_sign, round::norm_round_pack(hi_sign, hi_exp, diff, params))
                    }
                    core::cmp::Ordering::Less => {
                        let diff = lo_sig.wrapping_sub(hi_sig);
                        encode_finite::<F>(lo_sign, round::norm_round_pack(lo_sign, hi_exp, diff, params))
                    }
                }
            }
        }
        (Decoded::Nan { .. }, _) | (_, Decoded::Nan { .. }) => unreachable!("handled by propagate_nan above"),
    }
}
