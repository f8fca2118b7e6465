//! Fused multiply-add (§4.5): `a*b + c`, rounded exactly once.
//!
//! The product `a*b` is computed to full, unrounded precision exactly as
//! in [`super::mul`]; it is then aligned against `c` and summed before a
//! single call into [`round::norm_round_pack`], so no intermediate
//! rounding error can creep into the result the way it would computing
//! `mul` then `add` as two separate rounded operations.

use super::{decode, encode_finite, invalid_result, propagate_nan, Decoded};
use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::round::{self, RoundParams};

#[must_use]
pub fn fma<F: FormatSpec>(a: u128, b: u128, c: u128) -> u128 {
    let da = decode::<F>(a);
    let db = decode::<F>(b);
    let dc = decode::<F>(c);

    // The indeterminate-product case must raise invalid and yield the
    // NaN-policy result even when `c` is itself a (non-signaling) NaN, so
    // this has to be checked before either `propagate_nan` call below —
    // otherwise a NaN `c` would short-circuit past it untouched.
    let product_is_invalid = matches!(
        (da, db),
        (Decoded::Infinity { .. }, Decoded::Zero { .. }) | (Decoded::Zero { .. }, Decoded::Infinity { .. })
    );
    if product_is_invalid {
        return invalid_result::<F>();
    }

    if let Some(nan) = propagate_nan::<F>(da, Some(db)) {
        return nan;
    }
    if let Some(nan) = propagate_nan::<F>(dc, None) {
        return nan;
    }
    let params = RoundParams::of::<F>();

    let product_sign = sign_of(da) ^ sign_of(db);
    let product_is_zero = matches!(da, Decoded::Zero { .. }) || matches!(db, Decoded::Zero { .. });
    let product_is_inf = matches!(da, Decoded::Infinity { .. }) || matches!(db, Decoded::Infinity { .. });

    if product_is_inf {
        return match dc {
            Decoded::Infinity { sign: sc } if sc != product_sign => invalid_result::<F>(),
            _ => F::infinity(product_sign),
        };
    }

    if let Decoded::Infinity { sign: sc } = dc {
        return F::infinity(sc);
    }

    if product_is_zero {
        return match dc {
            Decoded::Zero { sign: sc } => {
                if sc == product_sign {
                    F::zero(sc)
                } else {
                    F::zero(super::zero_sign_on_exact_cancellation())
                }
            }
            Decoded::Finite { sign, exp, sig } => encode_finite::<F>(sign, round::norm_round_pack(sign, exp, sig, params)),
            Decoded::Nan { .. } | Decoded::Infinity { .. } => unreachable!("handled above"),
        };
    }

    let (Decoded::Finite { exp: ea, sig: siga, .. }, Decoded::Finite { exp: eb, sig: sigb, .. }) = (da, db) else {
        unreachable!("zero/infinity/nan already dispatched above")
    };

    let product_exp = ea + eb;
    let product_sig = U256::mul128(siga.hi, sigb.hi).shl(2);

    match dc {
        Decoded::Zero { .. } => encode_finite::<F>(
            product_sign,
            round::norm_round_pack(product_sign, product_exp, product_sig, params),
        ),
        Decoded::Finite { sign: sc, exp: ec, sig: sigc } => {
            let (hi_sign, hi_exp, hi_sig, lo_sign, lo_sig) = if product_exp >= ec {
                (
                    product_sign,
                    product_exp,
                    product_sig,
                    sc,
                    sigc.shr_jam(u32::try_from(product_exp - ec).unwrap_or(u32::MAX)),
                )
            } else {
                (
                    sc,
                    ec,
                    sigc,
                    product_sign,
                    product_sig.shr_jam(u32::try_from(ec - product_exp).unwrap_or(u32::MAX)),
                )
            };
            if hi_sign == lo_sign {
                let sum = hi_sig.wrapping_add(lo_sig);
                encode_finite::<F>(hi_sign, round::norm_round_pack(hi_sign, hi_exp, sum, params))
            } else {
                match hi_sig.cmp(lo_sig) {
                    core::cmp::Ordering::Equal => F::zero(super::zero_sign_on_exact_cancellation()),
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
        Decoded::Nan { .. } | Decoded::Infinity { .. } => unreachable!("handled above"),
    }
}

/// `a*b - c`, rounded once: the `subC` variant (§4.5.3), built by flipping
/// `c`'s sign before the ordinary fused multiply-add so the product and
/// the exact-cancellation sign rule are untouched.
#[must_use]
pub fn fma_sub_c<F: FormatSpec>(a: u128, b: u128, c: u128) -> u128 {
    fma::<F>(a, b, flip_sign::<F>(c))
}

/// `c - a*b`, rounded once: the `subProd` variant (§4.5.3), built by
/// flipping one product factor's sign, which flips the product's sign
/// without touching `c`.
#[must_use]
pub fn fma_sub_prod<F: FormatSpec>(a: u128, b: u128, c: u128) -> u128 {
    fma::<F>(flip_sign::<F>(a), b, c)
}

fn flip_sign<F: FormatSpec>(raw: u128) -> u128 {
    raw ^ (1u128 << (F::WIDTH - 1))
}

fn sign_of(d: Decoded) -> bool {
    match d {
        Decoded::Zero { sign }
        | Decoded::Infinity { sign }
        | Decoded::Nan { sign, .. }
        | Decoded::Finite { sign, .. } => sign,
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
    fn two_times_three_plus_one_is_seven() {
        clear();
        let two = F64Fmt::pack(false, 1024, 0);
        let three = F64Fmt::pack(false, 1024, 1 << 51);
        let one = F64Fmt::pack(false, 1023, 0);
        // 7.0 = 1.75 * 2^2 -> trailing = 0b11 in the top two bits of the
        // 52-bit field.
        let expected = F64Fmt::pack(false, 1025, 0b11 << 50);
        assert_eq!(fma::<F64Fmt>(two, three, one), expected);
    }

    #[test]
    fn zero_times_finite_plus_finite_is_identity() {
        clear();
        let zero = F64Fmt::zero(false);
        let x = F64Fmt::pack(false, 1030, 0x1234);
        let c = F64Fmt::pack(false, 1020, 0x5);
        assert_eq!(fma::<F64Fmt>(zero, x, c), c);
    }

    #[test]
    fn sub_c_negates_c_before_fusing() {
        clear();
        let two = F64Fmt::pack(false, 1024, 0);
        let three = F64Fmt::pack(false, 1024, 1 << 51);
        let neg_one = F64Fmt::pack(true, 1023, 0);
        // 2*3 - 1 == 2*3 + (-1).
        assert_eq!(fma_sub_c::<F64Fmt>(two, three, F64Fmt::pack(false, 1023, 0)), fma::<F64Fmt>(two, three, neg_one));
    }

    #[test]
    fn sub_prod_negates_the_product() {
        clear();
        let two = F64Fmt::pack(false, 1024, 0);
        let three = F64Fmt::pack(false, 1024, 1 << 51);
        let one = F64Fmt::pack(false, 1023, 0);
        let neg_two = F64Fmt::pack(true, 1024, 0);
        // 1 - 2*3 == (-2)*3 + 1.
        assert_eq!(fma_sub_prod::<F64Fmt>(two, three, one), fma::<F64Fmt>(neg_two, three, one));
    }

    #[test]
    fn infinity_times_zero_plus_anything_is_invalid() {
        clear();
        let inf = F64Fmt::infinity(false);
        let zero = F64Fmt::zero(false);
        let c = F64Fmt::pack(false, 1020, 0x5);
        let result = fma::<F64Fmt>(inf, zero, c);
        assert!(F64Fmt::is_nan(result));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn infinity_times_zero_plus_a_quiet_nan_is_still_invalid() {
        clear();
        let inf = F64Fmt::infinity(false);
        let zero = F64Fmt::zero(false);
        let quiet_nan_c = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1 << 51);
        let result = fma::<F64Fmt>(inf, zero, quiet_nan_c);
        assert!(F64Fmt::is_nan(result));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }
}
