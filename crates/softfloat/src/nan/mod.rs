//! Pluggable NaN-propagation policy.
//!
//! Exactly one of `nan-policy-x86` / `nan-policy-riscv` is compiled in
//! (§4.4); [`ActivePolicy`] aliases to it so kernel code never has to
//! branch on which one is active. Both implement [`NaNPolicy`], so a port
//! adding a further target's policy only has to provide one more impl of
//! this trait — kernel code never changes.
//!
//! Every method here operates on a *trailing*-significand-width view:
//! `sig_bits` is the field width below the implicit/explicit leading one
//! (`FormatSpec::SIG_BITS`, or 63 for extF80's explicit-integer-bit
//! layout). This lets one policy implementation serve all five formats.

pub mod riscv;
pub mod x86;

#[cfg(all(feature = "nan-policy-x86", feature = "nan-policy-riscv"))]
compile_error!("nan-policy-x86 and nan-policy-riscv are mutually exclusive");
#[cfg(not(any(feature = "nan-policy-x86", feature = "nan-policy-riscv")))]
compile_error!("exactly one of nan-policy-x86 / nan-policy-riscv must be enabled");

/// One NaN operand: sign bit plus trailing significand (width implied by
/// the caller's `sig_bits`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NanOperand {
    pub sign: bool,
    pub trailing: u128,
}

/// A policy-neutral carrier for a NaN crossing a format boundary
/// (§3, "NaN common form"). `payload` holds up to 128 bits of the
/// source's trailing significand, left-justified, so narrowing is a
/// truncation and widening is a zero-extension regardless of which
/// policy eventually re-quiets the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommonNan {
    pub sign: bool,
    pub payload: u128,
}

/// A pluggable NaN-propagation policy, selected at compile time (§4.4).
pub trait NaNPolicy {
    /// Sign bit of the canonical default NaN this policy produces for
    /// invalid operations with no NaN operand to propagate.
    const DEFAULT_SIGN: bool;

    /// The canonical default NaN's trailing significand: MSB set, rest
    /// zero, for a format with `sig_bits` trailing bits.
    #[inline]
    #[must_use]
    fn default_trailing(sig_bits: u32) -> u128 {
        1u128 << (sig_bits - 1)
    }

    #[inline]
    #[must_use]
    fn default_nan(sig_bits: u32) -> NanOperand {
        NanOperand {
            sign: Self::DEFAULT_SIGN,
            trailing: Self::default_trailing(sig_bits),
        }
    }

    /// Quiets a single NaN operand (used when exactly one input to a
    /// binary operation is NaN, and when simply passing a NaN through an
    /// operation such as `roundToInt`).
    #[must_use]
    fn propagate_one(operand: NanOperand, sig_bits: u32) -> NanOperand;

    /// Resolves two NaN operands (both inputs NaN) to a single result.
    #[must_use]
    fn propagate_two(a: NanOperand, b: NanOperand, sig_bits: u32) -> NanOperand;

    /// Converts a NaN operand to the policy-neutral common form for an
    /// inter-format transfer.
    #[must_use]
    fn to_common(operand: NanOperand, sig_bits: u32) -> CommonNan {
        CommonNan {
            sign: operand.sign,
            payload: operand.trailing << (128 - sig_bits),
        }
    }

    /// Converts a policy-neutral common-form NaN into this policy's
    /// representation for a format with `sig_bits` trailing bits.
    #[must_use]
    fn from_common(common: CommonNan, sig_bits: u32) -> NanOperand;
}

/// Whichever policy is compiled in. Every per-format kernel function is
/// generic only insofar as it calls through this alias, so switching
/// policies never touches kernel code (§4.4, §9).
#[cfg(feature = "nan-policy-x86")]
pub type ActivePolicy = x86::X86Policy;
#[cfg(feature = "nan-policy-riscv")]
pub type ActivePolicy = riscv::RiscVPolicy;
