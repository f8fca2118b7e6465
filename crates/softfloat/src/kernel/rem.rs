//! IEEE remainder (§4.5): `x - n*y` for `n` the integer nearest `x/y`
//! (ties to even), computed exactly regardless of the current rounding
//! mode.
//!
//! The integer part of `x/y` is extracted with the classic bit-serial
//! restoring-division loop (conditional subtract, then shift), exactly
//! the structure the reference uses for `f32_rem`/`f64_rem`; only its
//! least-significant bit (needed to break an exact tie to even) is kept,
//! since the quotient itself is discarded.

use super::{decode, encode_finite, invalid_result, propagate_nan, Decoded};
use crate::format::FormatSpec;
use crate::round::{self, RoundParams};

#[must_use]
pub fn rem<F: FormatSpec>(a: u128, b: u128) -> u128 {
    let da = decode::<F>(a);
    let db = decode::<F>(b);
    if let Some(nan) = propagate_nan::<F>(da, Some(db)) {
        return nan;
    }
    let params = RoundParams::of::<F>();

    match (da, db) {
        (Decoded::Infinity { .. }, _) | (_, Decoded::Zero { .. }) => invalid_result::<F>(),
        (Decoded::Zero { sign }, _) => F::zero(sign),
        (_, Decoded::Infinity { .. }) => a,
        (
            Decoded::Finite {
                sign: sa,
                exp: ea,
                sig: siga,
            },
            Decoded::Finite {
                sign: _,
                exp: eb,
                sig: sigb,
            },
        ) => {
            let (siga, ea) = round::normalize(siga, ea);
            let (sigb, eb) = round::normalize(sigb, eb);

            if eb - ea >= 2 {
                return encode_finite::<F>(sa, round::norm_round_pack(sa, ea, siga, params));
            }

            let (rem0, exp_diff, result_exp) = if ea >= eb {
                (siga, u32::try_from(ea - eb).unwrap_or(0), eb)
            } else {
                (siga.shl(1), 0u32, eb)
            };

            let mut rem = rem0;
            for _ in 0..exp_diff {
                if rem.cmp(sigb) != core::cmp::Ordering::Less {
                    rem = rem.wrapping_sub(sigb);
                }
                rem = rem.shl(1);
            }
            let quotient_lsb_fires = rem.cmp(sigb) != core::cmp::Ordering::Less;
            if quotient_lsb_fires {
                rem = rem.wrapping_sub(sigb);
            }

            let doubled = rem.shl(1);
            let (sign_flip, magnitude) = match doubled.cmp(sigb) {
                core::cmp::Ordering::Less => (false, rem),
                core::cmp::Ordering::Greater => (true, sigb.wrapping_sub(rem)),
                core::cmp::Ordering::Equal => {
                    if quotient_lsb_fires {
                        (true, sigb.wrapping_sub(rem))
                    } else {
                        (false, rem)
                    }
                }
            };

            let sign = sa ^ sign_flip;
            encode_finite::<F>(sign, round::norm_round_pack(sign, result_exp, magnitude, params))
        }
        (Decoded::Nan { .. }, _) | (_, Decoded::Nan { .. }) => unreachable!("handled by propagate_nan above"),
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
    fn five_rem_three_is_negative_one() {
        clear();
        let five = F64Fmt::pack(false, 1025, 1 << 50); // 1.25 * 2^2
        let three = F64Fmt::pack(false, 1024, 1 << 51); // 1.5 * 2^1
        let neg_one = F64Fmt::pack(true, 1023, 0);
        assert_eq!(rem::<F64Fmt>(five, three), neg_one);
    }

    #[test]
    fn rem_by_zero_is_invalid() {
        clear();
        let one = F64Fmt::pack(false, 1023, 0);
        let zero = F64Fmt::zero(false);
        let result = rem::<F64Fmt>(one, zero);
        assert!(F64Fmt::is_nan(result));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn rem_with_infinite_divisor_is_dividend() {
        clear();
        let x = F64Fmt::pack(true, 1030, 0x1234);
        let inf = F64Fmt::infinity(false);
        assert_eq!(rem::<F64Fmt>(x, inf), x);
    }
}
