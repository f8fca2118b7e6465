//! Per-thread global state: rounding mode, exception flags, tininess
//! detection, and extF80 rounding precision (§4.6).
//!
//! Every field here is `thread_local!`, not a process global: conformance
//! testing requires that independent threads see independent state with
//! no coordination cost (§5). The four accessors pairs below
//! (`get_*`/`set_*`, plus `raise_flags`/`clear_flags`) are the *only* way
//! kernel code or a caller touches this state — nothing here needs
//! locking because nothing is shared across threads.

use std::cell::Cell;

/// IEEE 754 rounding mode (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    #[default]
    NearestEven,
    /// Round toward zero.
    TowardZero,
    /// Round toward negative infinity.
    TowardNegative,
    /// Round toward positive infinity.
    TowardPositive,
    /// Round to nearest, ties away from zero (max magnitude).
    NearestMaxMagnitude,
}

/// When to signal underflow for a tiny, inexact result (§3, §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TininessMode {
    /// Tininess is detected by examining the significand before rounding.
    #[default]
    BeforeRounding,
    /// Tininess is detected on the final, rounded result.
    AfterRounding,
}

/// How many significand bits an `extF80` result is rounded to keep,
/// independent of the 64-bit storage width (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExtF80RoundingPrecision {
    P32,
    P64,
    #[default]
    P80,
}

/// The five IEEE 754 exception flags (§7), OR-accumulated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionFlags(u8);

impl ExceptionFlags {
    pub const NONE: Self = Self(0);
    pub const INVALID: Self = Self(1 << 0);
    pub const DIVIDE_BY_ZERO: Self = Self(1 << 1);
    pub const OVERFLOW: Self = Self(1 << 2);
    pub const UNDERFLOW: Self = Self(1 << 3);
    pub const INEXACT: Self = Self(1 << 4);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for ExceptionFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

thread_local! {
    static ROUNDING_MODE: Cell<RoundingMode> = Cell::new(RoundingMode::NearestEven);
    static EXCEPTION_FLAGS: Cell<ExceptionFlags> = Cell::new(ExceptionFlags::NONE);
    static TININESS_MODE: Cell<TininessMode> = Cell::new(TininessMode::BeforeRounding);
    static EXT80_PRECISION: Cell<ExtF80RoundingPrecision> = Cell::new(ExtF80RoundingPrecision::P80);
}

#[must_use]
pub fn rounding_mode() -> RoundingMode {
    ROUNDING_MODE.with(Cell::get)
}

pub fn set_rounding_mode(mode: RoundingMode) {
    ROUNDING_MODE.with(|c| c.set(mode));
}

#[must_use]
pub fn tininess_mode() -> TininessMode {
    TININESS_MODE.with(Cell::get)
}

pub fn set_tininess_mode(mode: TininessMode) {
    TININESS_MODE.with(|c| c.set(mode));
}

#[must_use]
pub fn ext80_rounding_precision() -> ExtF80RoundingPrecision {
    EXT80_PRECISION.with(Cell::get)
}

pub fn set_ext80_rounding_precision(precision: ExtF80RoundingPrecision) {
    EXT80_PRECISION.with(|c| c.set(precision));
}

#[must_use]
pub fn exception_flags() -> ExceptionFlags {
    EXCEPTION_FLAGS.with(Cell::get)
}

/// Clears exactly the flags set in `mask`, leaving the rest untouched
/// (§6, "Get/clear exception flags (clear by OR-clear mask)").
pub fn clear_exception_flags(mask: ExceptionFlags) {
    EXCEPTION_FLAGS.with(|c| c.set(ExceptionFlags::from_bits(c.get().bits() & !mask.bits())));
}

/// Raises `flags` into the accumulator. Write-only from a kernel's
/// perspective: no kernel ever inspects the accumulator it writes to
/// (§7).
pub fn raise_flags(flags: ExceptionFlags) {
    if flags.is_empty() {
        return;
    }
    #[cfg(feature = "trace-rounding")]
    tracing::trace!(flags = flags.bits(), "raising fp exception flags");
    EXCEPTION_FLAGS.with(|c| c.set(c.get().union(flags)));
}
