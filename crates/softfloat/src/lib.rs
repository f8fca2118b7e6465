//! A portable, bit-exact software implementation of IEEE 754-2008 binary
//! floating-point arithmetic.
//!
//! Covers binary16/32/64/128 and the 80-bit Intel extended format
//! (`extF80`), with pluggable NaN-propagation policy (x86/8086 vs
//! RISC-V, selected at compile time — see [`nan`]) and per-thread
//! rounding mode, exception flags, and tininess-detection mode (see
//! [`state`]).
//!
//! # Layout
//!
//! - [`format`]: compile-time bit-layout parameters for each format.
//! - [`mwint`]: the wide working-register integer primitives every
//!   kernel shares.
//! - [`round`]: the single rounding-and-packing convergence point every
//!   kernel's finite path funnels through.
//! - [`nan`]: cross-format NaN propagation, policy-selected at compile
//!   time.
//! - [`state`]: per-thread rounding mode, exception flags, tininess
//!   mode, extF80 rounding precision.
//! - [`kernel`]: `classify -> {NaN, infinity, zero, finite}` dispatch for
//!   every arithmetic operation, generic over [`format::FormatSpec`]
//!   with a parallel extF80-specific module.
//! - [`api`]: the public `<fmt>_<op>` function surface.
//!
//! No function in [`api`] returns a `Result`: exceptional conditions are
//! reported purely through [`state::exception_flags`], matching the
//! hardware FPU semantics this crate emulates.

pub mod api;
pub mod format;
pub mod kernel;
pub mod mwint;
pub mod nan;
pub mod round;
pub mod state;

pub use crate::api::*;
pub use crate::state::{
    clear_exception_flags, exception_flags, ext80_rounding_precision, raise_flags, rounding_mode, set_ext80_rounding_precision,
    set_rounding_mode, set_tininess_mode, tininess_mode, ExceptionFlags, ExtF80RoundingPrecision, RoundingMode, TininessMode,
};
