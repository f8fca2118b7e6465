//! Division (§4.5).
//!
//! Computes the quotient mantissa with an exact [`U256`] long division
//! ([`U256::divmod`]) rather than the reference's reciprocal-seed Newton
//! iteration (see `mwint::recip`'s module doc comment) — the remainder is
//! folded into the low bit of the quotient as a sticky marker before a
//! single [`round::norm_round_pack`] call, so the result is correctly
//! rounded regardless of how the quotient bits were produced.

use super::{decode, encode_finite, invalid_result, propagate_nan, Decoded};
use crate::format::FormatSpec;
use crate::mwint::U256;
use crate::round::{self, RoundParams};
use crate::state::{self, ExceptionFlags};

#[must_use]
pub fn div<F: FormatSpec>(a: u128, b: u128) -> u128 {
    let da = decode::<F>(a);
    let db = decode::<F>(b);
    if let Some(nan) = propagate_nan::<F>(da, Some(db)) {
        return nan;
    }
    let params = RoundParams::of::<F>();
    let sa = sign_of(da);
    let sb = sign_of(db);

    match (da, db) {
        (Decoded::Infinity { .. }, Decoded::Infinity { .. }) => invalid_result::<F>(),
        (Decoded::Zero { .. }, Decoded::Zero { .. }) => invalid_result::<F>(),
        (Decoded::Infinity { .. }, _) => F::infinity(sa ^ sb),
        (_, Decoded::Zero { .. }) => {
            state::raise_flags(ExceptionFlags::DIVIDE_BY_ZERO);
            F::infinity(sa ^ sb)
        }
        (Decoded::Zero { .. }, _) | (_, Decoded::Infinity { .. }) => F::zero(sa ^ sb),
        (
            Decoded::Finite {
                exp: ea, sig: siga, ..
            },
            Decoded::Finite {
                exp: eb, sig: sigb, ..
            },
        ) => {
            let sign = sa ^ sb;
            let (na, ea) = round::normalize(siga, ea);
            let (nb, eb) = round::normalize(sigb, eb);
            let numerator = U256::from_u128(na.hi).shl(127);
            let (quotient, remainder) = numerator.divmod(U256::from_u128(nb.hi));
            let mut sig_q = U256::from_u128(quotient.lo).shl(127);
            if !remainder.is_zero() {
                sig_q = U256 {
                    hi: sig_q.hi,
                    lo: sig_q.lo | 1,
                };
            }
            encode_finite::<F>(sign, round::norm_round_pack(sign, ea - eb, sig_q, params))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::F64Fmt;
    use crate::state::{clear_exception_flags, exception_flags};

    fn clear() {
        clear_exception_flags(ExceptionFlags::from_bits(0x1F));
    }

    #[test]
    fn six_divided_by_two_is_three() {
        clear();
        let six = F64Fmt::pack(false, 1025, 1 << 51);
        let two = F64Fmt::pack(false, 1024, 0);
        let three = F64Fmt::pack(false, 1024, 1 << 51);
        assert_eq!(div::<F64Fmt>(six, two), three);
        assert!(exception_flags().is_empty());
    }

    #[test]
    fn division_by_zero_sets_flag_and_returns_infinity() {
        clear();
        let one = F64Fmt::pack(false, 1023, 0);
        let zero = F64Fmt::zero(false);
        let result = div::<F64Fmt>(one, zero);
        assert_eq!(result, F64Fmt::infinity(false));
        assert!(exception_flags().contains(ExceptionFlags::DIVIDE_BY_ZERO));
    }

    #[test]
    fn zero_over_zero_is_invalid() {
        clear();
        let zero = F64Fmt::zero(false);
        let result = div::<F64Fmt>(zero, zero);
        assert!(F64Fmt::is_nan(result));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }
}
