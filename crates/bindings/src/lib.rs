//! C ABI surface for `softfloat-core`.
//!
//! Exposes binary16/32/64 arithmetic, comparisons, and conversions as
//! `extern "C"` functions operating on the host's native `f16`-shaped
//! `u16`/`f32`/`f64` bit patterns, plus accessors for the per-thread
//! rounding mode and exception-flag state. binary128 and extF80 are left
//! to the Rust API (`softfloat_core::api`): neither format has a stable
//! C-ABI-representable native type to hand a caller across the boundary.
//!
//! Every function here is `#[unsafe(no_mangle)] extern "C"` and panics
//! on nothing; out-of-range rounding-mode/tininess-mode codes fall back
//! to the field's default rather than trapping, since a C caller has no
//! way to catch a Rust panic across the boundary.

use softfloat_core::state::{ExceptionFlags, RoundingMode, TininessMode};
use softfloat_core::{api, state};

macro_rules! c_binary_op {
    ($name:ident, $repr:ty, $op:path) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn $name(a: $repr, b: $repr) -> $repr {
            $op(u128::from(a), u128::from(b)) as $repr
        }
    };
}

macro_rules! c_unary_op {
    ($name:ident, $repr:ty, $op:path) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn $name(a: $repr) -> $repr {
            $op(u128::from(a)) as $repr
        }
    };
}

macro_rules! c_predicate {
    ($name:ident, $repr:ty, $op:path) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn $name(a: $repr, b: $repr) -> bool {
            $op(u128::from(a), u128::from(b))
        }
    };
}

c_binary_op!(softfloat_f32_add, u32, api::f32_add);
c_binary_op!(softfloat_f32_sub, u32, api::f32_sub);
c_binary_op!(softfloat_f32_mul, u32, api::f32_mul);
c_binary_op!(softfloat_f32_div, u32, api::f32_div);
c_binary_op!(softfloat_f32_rem, u32, api::f32_rem);
c_unary_op!(softfloat_f32_sqrt, u32, api::f32_sqrt);
c_predicate!(softfloat_f32_eq, u32, api::f32_eq);
c_predicate!(softfloat_f32_le, u32, api::f32_le);
c_predicate!(softfloat_f32_lt, u32, api::f32_lt);

/// `a*b + c`, rounded once.
#[unsafe(no_mangle)]
pub extern "C" fn softfloat_f32_fma(a: u32, b: u32, c: u32) -> u32 {
    api::f32_fma(u128::from(a), u128::from(b), u128::from(c)) as u32
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_f32_to_i64(a: u32) -> i64 {
    api::f32_to_i64(u128::from(a))
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_i64_to_f32(value: i64) -> u32 {
    api::i64_to_f32(value) as u32
}

c_binary_op!(softfloat_f64_add, u64, api::f64_add);
c_binary_op!(softfloat_f64_sub, u64, api::f64_sub);
c_binary_op!(softfloat_f64_mul, u64, api::f64_mul);
c_binary_op!(softfloat_f64_div, u64, api::f64_div);
c_binary_op!(softfloat_f64_rem, u64, api::f64_rem);
c_unary_op!(softfloat_f64_sqrt, u64, api::f64_sqrt);
c_predicate!(softfloat_f64_eq, u64, api::f64_eq);
c_predicate!(softfloat_f64_le, u64, api::f64_le);
c_predicate!(softfloat_f64_lt, u64, api::f64_lt);

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_f64_fma(a: u64, b: u64, c: u64) -> u64 {
    api::f64_fma(u128::from(a), u128::from(b), u128::from(c)) as u64
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_f64_to_i64(a: u64) -> i64 {
    api::f64_to_i64(u128::from(a))
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_i64_to_f64(value: i64) -> u64 {
    api::i64_to_f64(value) as u64
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_f32_to_f64(a: u32) -> u64 {
    api::f32_to_f64(u128::from(a)) as u64
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_f64_to_f32(a: u64) -> u32 {
    api::f64_to_f32(u128::from(a)) as u32
}

c_binary_op!(softfloat_f16_add, u16, api::f16_add);
c_binary_op!(softfloat_f16_sub, u16, api::f16_sub);
c_binary_op!(softfloat_f16_mul, u16, api::f16_mul);
c_binary_op!(softfloat_f16_div, u16, api::f16_div);

fn rounding_mode_to_code(mode: RoundingMode) -> u32 {
    match mode {
        RoundingMode::NearestEven => 0,
        RoundingMode::TowardZero => 1,
        RoundingMode::TowardNegative => 2,
        RoundingMode::TowardPositive => 3,
        RoundingMode::NearestMaxMagnitude => 4,
    }
}

fn rounding_mode_from_code(code: u32) -> RoundingMode {
    match code {
        1 => RoundingMode::TowardZero,
        2 => RoundingMode::TowardNegative,
        3 => RoundingMode::TowardPositive,
        4 => RoundingMode::NearestMaxMagnitude,
        _ => RoundingMode::NearestEven,
    }
}

/// Returns the calling thread's current rounding mode as a code: `0`
/// nearest-even, `1` toward-zero, `2` toward-negative, `3`
/// toward-positive, `4` nearest-max-magnitude.
#[unsafe(no_mangle)]
pub extern "C" fn softfloat_get_rounding_mode() -> u32 {
    rounding_mode_to_code(state::rounding_mode())
}

/// Sets the calling thread's rounding mode; unrecognized codes set
/// nearest-even.
#[unsafe(no_mangle)]
pub extern "C" fn softfloat_set_rounding_mode(code: u32) {
    state::set_rounding_mode(rounding_mode_from_code(code));
}

/// Returns the calling thread's tininess-detection mode: `0`
/// before-rounding, `1` after-rounding.
#[unsafe(no_mangle)]
pub extern "C" fn softfloat_get_tininess_mode() -> u32 {
    match state::tininess_mode() {
        TininessMode::BeforeRounding => 0,
        TininessMode::AfterRounding => 1,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn softfloat_set_tininess_mode(code: u32) {
    state::set_tininess_mode(if code == 1 {
        TininessMode::AfterRounding
    } else {
        TininessMode::BeforeRounding
    });
}

/// Returns the calling thread's accumulated exception flags as a 5-bit
/// mask: invalid=1, divide-by-zero=2, overflow=4, underflow=8,
/// inexact=16.
#[unsafe(no_mangle)]
pub extern "C" fn softfloat_get_exception_flags() -> u8 {
    state::exception_flags().bits()
}

/// Clears exactly the bits set in `mask` from the accumulated exception
/// flags, leaving the rest untouched.
#[unsafe(no_mangle)]
pub extern "C" fn softfloat_clear_exception_flags(mask: u8) {
    state::clear_exception_flags(ExceptionFlags::from_bits(mask));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_abi_f64_add_matches_rust_api() {
        softfloat_clear_exception_flags(0x1F);
        let one = 0x3FF0_0000_0000_0000u64;
        assert_eq!(softfloat_f64_add(one, one), 0x4000_0000_0000_0000u64);
    }

    #[test]
    fn rounding_mode_round_trips_through_codes() {
        softfloat_set_rounding_mode(1);
        assert_eq!(softfloat_get_rounding_mode(), 1);
        softfloat_set_rounding_mode(0);
        assert_eq!(softfloat_get_rounding_mode(), 0);
    }

    #[test]
    fn exception_flags_round_trip() {
        softfloat_clear_exception_flags(0x1F);
        let zero = 0u32;
        let inf = 0x7F80_0000u32;
        let _ = softfloat_f32_mul(zero, inf);
        assert_ne!(softfloat_get_exception_flags() & 0x01, 0);
        softfloat_clear_exception_flags(0x1F);
        assert_eq!(softfloat_get_exception_flags(), 0);
    }
}
