//! Public operation surface (§6): one function per IEEE operation per
//! format, named `<fmt>_<op>` after the reference's `f32_add`/`f64_mul`/…
//! convention. No function returns a `Result` — every exceptional
//! condition is reported purely through the per-thread flag accumulator
//! in [`crate::state`], exactly like the hardware FPU instructions this
//! crate emulates.
//!
//! Each of the four standard-layout formats gets the same twelve
//! operations generated by [`format_ops!`]; extF80 gets a hand-written
//! block just below since its kernels live in [`crate::kernel::ext80`]
//! rather than behind the generic [`crate::format::FormatSpec`] bound.

use crate::format::{F128Fmt, F16, F32Fmt, F64Fmt};
use crate::kernel;

macro_rules! format_ops {
    ($fmt:ty, $prefix:ident) => {
        ::paste::paste! {
            #[doc = concat!("Adds two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _add>](a: u128, b: u128) -> u128 {
                kernel::add_sub::add::<$fmt>(a, b)
            }

            #[doc = concat!("Subtracts two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _sub>](a: u128, b: u128) -> u128 {
                kernel::add_sub::sub::<$fmt>(a, b)
            }

            #[doc = concat!("Multiplies two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _mul>](a: u128, b: u128) -> u128 {
                kernel::mul::mul::<$fmt>(a, b)
            }

            #[doc = concat!("Fused multiply-add for ", stringify!($prefix), ": `a*b + c`, one rounding.")]
            #[must_use]
            pub fn [<$prefix _fma>](a: u128, b: u128, c: u128) -> u128 {
                kernel::fma::fma::<$fmt>(a, b, c)
            }

            #[doc = concat!("Fused multiply-subtract for ", stringify!($prefix), ": `a*b - c`, one rounding.")]
            #[must_use]
            pub fn [<$prefix _fma_sub_c>](a: u128, b: u128, c: u128) -> u128 {
                kernel::fma::fma_sub_c::<$fmt>(a, b, c)
            }

            #[doc = concat!("Fused negate-multiply-add for ", stringify!($prefix), ": `c - a*b`, one rounding.")]
            #[must_use]
            pub fn [<$prefix _fma_sub_prod>](a: u128, b: u128, c: u128) -> u128 {
                kernel::fma::fma_sub_prod::<$fmt>(a, b, c)
            }

            #[doc = concat!("Divides two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _div>](a: u128, b: u128) -> u128 {
                kernel::div::div::<$fmt>(a, b)
            }

            #[doc = concat!("Square root of a ", stringify!($prefix), " value.")]
            #[must_use]
            pub fn [<$prefix _sqrt>](a: u128) -> u128 {
                kernel::sqrt::sqrt::<$fmt>(a)
            }

            #[doc = concat!("IEEE remainder of two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _rem>](a: u128, b: u128) -> u128 {
                kernel::rem::rem::<$fmt>(a, b)
            }

            #[doc = concat!("Rounds a ", stringify!($prefix), " value to an integer, always raising `inexact` when rounded.")]
            #[must_use]
            pub fn [<$prefix _round_to_int_exact>](a: u128) -> u128 {
                kernel::round_to_int::round_to_int::<$fmt>(a, true)
            }

            #[doc = concat!("Rounds a ", stringify!($prefix), " value to an integer without raising `inexact`.")]
            #[must_use]
            pub fn [<$prefix _round_to_int>](a: u128) -> u128 {
                kernel::round_to_int::round_to_int::<$fmt>(a, false)
            }

            #[doc = concat!("Quiet equality of two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _eq>](a: u128, b: u128) -> bool {
                kernel::compare::eq::<$fmt>(a, b)
            }

            #[doc = concat!("Signaling equality of two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _eq_signaling>](a: u128, b: u128) -> bool {
                kernel::compare::eq_signaling::<$fmt>(a, b)
            }

            #[doc = concat!("`a <= b` for two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _le>](a: u128, b: u128) -> bool {
                kernel::compare::le::<$fmt>(a, b)
            }

            #[doc = concat!("`a < b` for two ", stringify!($prefix), " values.")]
            #[must_use]
            pub fn [<$prefix _lt>](a: u128, b: u128) -> bool {
                kernel::compare::lt::<$fmt>(a, b)
            }

            #[doc = concat!("Whether a ", stringify!($prefix), " bit pattern is a signaling NaN.")]
            #[must_use]
            pub fn [<$prefix _is_signaling_nan>](a: u128) -> bool {
                kernel::compare::is_signaling_nan::<$fmt>(a)
            }

            #[doc = concat!("Converts a signed 64-bit integer to ", stringify!($prefix), ".")]
            #[must_use]
            pub fn [<i64_to_ $prefix>](value: i64) -> u128 {
                kernel::convert::int_to_float::<$fmt>(value)
            }

            #[doc = concat!("Converts an unsigned 64-bit integer to ", stringify!($prefix), ".")]
            #[must_use]
            pub fn [<u64_to_ $prefix>](value: u64) -> u128 {
                kernel::convert::uint_to_float::<$fmt>(value)
            }

            #[doc = concat!("Converts a ", stringify!($prefix), " value to the nearest `i64`.")]
            #[must_use]
            pub fn [<$prefix _to_i64>](a: u128) -> i64 {
                kernel::convert::float_to_i64::<$fmt>(a)
            }

            #[doc = concat!("Converts a ", stringify!($prefix), " value to the nearest `u64`.")]
            #[must_use]
            pub fn [<$prefix _to_u64>](a: u128) -> u64 {
                kernel::convert::float_to_u64::<$fmt>(a)
            }

            #[doc = concat!("Converts a ", stringify!($prefix), " value to extF80 (always exact).")]
            #[must_use]
            pub fn [<$prefix _to_extf80>](a: u128) -> u128 {
                kernel::convert::to_ext80::<$fmt>(a)
            }

            #[doc = concat!("Converts an extF80 value to ", stringify!($prefix), ".")]
            #[must_use]
            pub fn [<extf80_to_ $prefix>](a: u128) -> u128 {
                kernel::convert::from_ext80::<$fmt>(a)
            }
        }
    };
}

format_ops!(F16, f16);
format_ops!(F32Fmt, f32);
format_ops!(F64Fmt, f64);
format_ops!(F128Fmt, f128);

/// Widens binary32 to binary64 (always exact).
#[must_use]
pub fn f32_to_f64(a: u128) -> u128 {
    kernel::convert::convert::<F32Fmt, F64Fmt>(a)
}

/// Narrows binary64 to binary32 (rounds per the current mode).
#[must_use]
pub fn f64_to_f32(a: u128) -> u128 {
    kernel::convert::convert::<F64Fmt, F32Fmt>(a)
}

/// Widens binary16 to binary32 (always exact).
#[must_use]
pub fn f16_to_f32(a: u128) -> u128 {
    kernel::convert::convert::<F16, F32Fmt>(a)
}

/// Narrows binary32 to binary16 (rounds per the current mode).
#[must_use]
pub fn f32_to_f16(a: u128) -> u128 {
    kernel::convert::convert::<F32Fmt, F16>(a)
}

/// Widens binary64 to binary128 (always exact).
#[must_use]
pub fn f64_to_f128(a: u128) -> u128 {
    kernel::convert::convert::<F64Fmt, F128Fmt>(a)
}

/// Narrows binary128 to binary64 (rounds per the current mode).
#[must_use]
pub fn f128_to_f64(a: u128) -> u128 {
    kernel::convert::convert::<F128Fmt, F64Fmt>(a)
}

/// Adds two extF80 values.
#[must_use]
pub fn extf80_add(a: u128, b: u128) -> u128 {
    kernel::ext80::add(a, b)
}

/// Subtracts two extF80 values.
#[must_use]
pub fn extf80_sub(a: u128, b: u128) -> u128 {
    kernel::ext80::sub(a, b)
}

/// Multiplies two extF80 values.
#[must_use]
pub fn extf80_mul(a: u128, b: u128) -> u128 {
    kernel::ext80::mul(a, b)
}

/// Divides two extF80 values.
#[must_use]
pub fn extf80_div(a: u128, b: u128) -> u128 {
    kernel::ext80::div(a, b)
}

/// Square root of an extF80 value.
#[must_use]
pub fn extf80_sqrt(a: u128) -> u128 {
    kernel::ext80::sqrt(a)
}

/// IEEE remainder of two extF80 values.
#[must_use]
pub fn extf80_rem(a: u128, b: u128) -> u128 {
    kernel::ext80::rem(a, b)
}

/// Rounds an extF80 value to an integer, always raising `inexact` when
/// rounded.
#[must_use]
pub fn extf80_round_to_int_exact(a: u128) -> u128 {
    kernel::ext80::round_to_int(a, true)
}

/// Rounds an extF80 value to an integer without raising `inexact`.
#[must_use]
pub fn extf80_round_to_int(a: u128) -> u128 {
    kernel::ext80::round_to_int(a, false)
}

/// Whether an extF80 bit pattern is a signaling NaN.
#[must_use]
pub fn extf80_is_signaling_nan(a: u128) -> bool {
    crate::format::ext80::is_signaling_nan(a)
}
