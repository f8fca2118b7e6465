//! RISC-V NaN-propagation policy (§4.4).
//!
//! Any NaN result, regardless of which operand(s) produced it or what
//! payload they carried, collapses to the single canonical quiet NaN for
//! the format. Invalid still gets raised by the caller when an input was
//! signaling — this policy only decides the *bit pattern*, never the
//! flags (§4.4, §4.6).

use super::{CommonNan, NaNPolicy, NanOperand};

/// Default NaN: sign 0, top trailing bit 1, rest zero.
#[derive(Clone, Copy, Debug)]
pub struct RiscVPolicy;

impl NaNPolicy for RiscVPolicy {
    const DEFAULT_SIGN: bool = false;

    fn propagate_one(_operand: NanOperand, sig_bits: u32) -> NanOperand {
        Self::default_nan(sig_bits)
    }

    fn propagate_two(_a: NanOperand, _b: NanOperand, sig_bits: u32) -> NanOperand {
        Self::default_nan(sig_bits)
    }

    fn from_common(_common: CommonNan, sig_bits: u32) -> NanOperand {
        Self::default_nan(sig_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_returns_canonical_nan() {
        let weird = NanOperand {
            sign: true,
            trailing: 0x1234,
        };
        let result = RiscVPolicy::propagate_one(weird, 52);
        assert!(!result.sign);
        assert_eq!(result.trailing, 1 << 51);
    }
}
