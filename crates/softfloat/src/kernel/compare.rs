//! Comparison predicates (§4.6, §6): `eq`/`le`/`lt`, each in a quiet and
//! a signaling variant, plus `isSignalingNaN`.
//!
//! Comparisons never round, so they skip [`round::norm_round_pack`]
//! entirely and instead compare the shared [`super::Decoded`]
//! representation directly: sign, then exponent, then the aligned
//! [`crate::mwint::U256`] significand. A NaN operand makes every ordered
//! predicate (`le`, `lt`) false and `eq` false; only the *signaling*
//! variants additionally raise `invalid` for a quiet NaN operand (the
//! quiet variants raise it only for a signaling one), matching the
//! `_signaling`/plain split the reference exposes for `f32_eq`/`f32_le`/
//! `f32_lt`.

use super::{decode, Decoded};
use crate::format::FormatSpec;
use crate::state::{self, ExceptionFlags};

fn ordered_pair<F: FormatSpec>(a: u128, b: u128, invalid_on_quiet: bool) -> Option<(Decoded, Decoded)> {
    let da = decode::<F>(a);
    let db = decode::<F>(b);
    let is_nan = |d: Decoded| matches!(d, Decoded::Nan { .. });
    let is_signaling = |d: Decoded| matches!(d, Decoded::Nan { signaling: true, .. });
    if is_nan(da) || is_nan(db) {
        if is_signaling(da) || is_signaling(db) || (invalid_on_quiet && (is_nan(da) || is_nan(db))) {
            state::raise_flags(ExceptionFlags::INVALID);
        }
        return None;
    }
    Some((da, db))
}

/// Total magnitude/sign ordering over non-NaN decoded operands:
/// `Less`/`Equal`/`Greater`, with `-0 == +0`.
fn compare_finite(a: Decoded, b: Decoded) -> core::cmp::Ordering {
    use core::cmp::Ordering;

    let rank = |d: Decoded| -> (i8, bool, i32, crate::mwint::U256) {
        match d {
            Decoded::Zero { sign } => (0, sign, 0, crate::mwint::U256::ZERO),
            Decoded::Finite { sign, exp, sig } => (1, sign, exp, sig),
            Decoded::Infinity { sign } => (2, sign, 0, crate::mwint::U256::ZERO),
            Decoded::Nan { .. } => unreachable!("NaN operands are filtered before compare_finite"),
        }
    };
    let (ra, sa, ea, siga) = rank(a);
    let (rb, sb, eb, sigb) = rank(b);

    if ra == 0 && rb == 0 {
        return Ordering::Equal;
    }

    let magnitude_order = ra.cmp(&rb).then_with(|| ea.cmp(&eb)).then_with(|| siga.cmp(sigb));
    match (sa, sb) {
        (false, false) => magnitude_order,
        (true, true) => magnitude_order.reverse(),
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
    }
}

fn eq_impl<F: FormatSpec>(a: u128, b: u128, invalid_on_quiet: bool) -> bool {
    match ordered_pair::<F>(a, b, invalid_on_quiet) {
        None => false,
        Some((da, db)) => compare_finite(da, db) == core::cmp::Ordering::Equal,
    }
}

fn le_impl<F: FormatSpec>(a: u128, b: u128, invalid_on_quiet: bool) -> bool {
    match ordered_pair::<F>(a, b, invalid_on_quiet) {
        None => false,
        Some((da, db)) => compare_finite(da, db) != core::cmp::Ordering::Greater,
    }
}

fn lt_impl<F: FormatSpec>(a: u128, b: u128, invalid_on_quiet: bool) -> bool {
    match ordered_pair::<F>(a, b, invalid_on_quiet) {
        None => false,
        Some((da, db)) => compare_finite(da, db) == core::cmp::Ordering::Less,
    }
}

/// Quiet `a == b`: a signaling NaN operand raises `invalid`; a quiet NaN
/// operand just makes the result `false`.
#[must_use]
pub fn eq<F: FormatSpec>(a: u128, b: u128) -> bool {
    eq_impl::<F>(a, b, false)
}

/// Signaling `a == b`: any NaN operand (quiet or signaling) raises
/// `invalid`.
#[must_use]
pub fn eq_signaling<F: FormatSpec>(a: u128, b: u128) -> bool {
    eq_impl::<F>(a, b, true)
}

/// Quiet `a <= b`.
#[must_use]
pub fn le<F: FormatSpec>(a: u128, b: u128) -> bool {
    le_impl::<F>(a, b, true)
}

/// Signaling `a <= b` (identical to the quiet form: `le` always raises
/// `invalid` on any NaN per IEEE 754, so there is no separate quiet
/// variant to distinguish it from).
#[must_use]
pub fn le_signaling<F: FormatSpec>(a: u128, b: u128) -> bool {
    le_impl::<F>(a, b, true)
}

/// Quiet `a < b`.
#[must_use]
pub fn lt<F: FormatSpec>(a: u128, b: u128) -> bool {
    lt_impl::<F>(a, b, true)
}

/// Signaling `a < b` (see [`le_signaling`]: ordered predicates other than
/// `eq` always signal on NaN).
#[must_use]
pub fn lt_signaling<F: FormatSpec>(a: u128, b: u128) -> bool {
    lt_impl::<F>(a, b, true)
}

/// Classification-only predicate: never raises a flag.
#[must_use]
pub fn is_signaling_nan<F: FormatSpec>(a: u128) -> bool {
    F::is_signaling_nan(a)
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
    fn equal_values_compare_equal() {
        clear();
        let one = F64Fmt::pack(false, 1023, 0);
        assert!(eq::<F64Fmt>(one, one));
        assert!(le::<F64Fmt>(one, one));
        assert!(!lt::<F64Fmt>(one, one));
    }

    #[test]
    fn positive_and_negative_zero_compare_equal() {
        clear();
        assert!(eq::<F64Fmt>(F64Fmt::zero(false), F64Fmt::zero(true)));
    }

    #[test]
    fn ordering_respects_sign_and_magnitude() {
        clear();
        let one = F64Fmt::pack(false, 1023, 0);
        let two = F64Fmt::pack(false, 1024, 0);
        let neg_one = F64Fmt::pack(true, 1023, 0);
        assert!(lt::<F64Fmt>(one, two));
        assert!(lt::<F64Fmt>(neg_one, one));
        assert!(le::<F64Fmt>(one, two));
    }

    #[test]
    fn quiet_eq_with_quiet_nan_is_false_without_flag() {
        clear();
        let qnan = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1 << 50);
        let one = F64Fmt::pack(false, 1023, 0);
        assert!(!eq::<F64Fmt>(qnan, one));
        assert!(exception_flags().is_empty());
    }

    #[test]
    fn signaling_eq_with_quiet_nan_raises_invalid() {
        clear();
        let qnan = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1 << 50);
        let one = F64Fmt::pack(false, 1023, 0);
        assert!(!eq_signaling::<F64Fmt>(qnan, one));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn lt_with_signaling_nan_raises_invalid() {
        clear();
        let snan = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1);
        let one = F64Fmt::pack(false, 1023, 0);
        assert!(!lt::<F64Fmt>(snan, one));
        assert!(exception_flags().contains(ExceptionFlags::INVALID));
    }

    #[test]
    fn is_signaling_nan_classifies_correctly() {
        clear();
        let snan = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1);
        let qnan = F64Fmt::pack(false, F64Fmt::EXP_ALL_ONES, 1 << 50);
        assert!(is_signaling_nan::<F64Fmt>(snan));
        assert!(!is_signaling_nan::<F64Fmt>(qnan));
    }
}
