//! Fixture-based tests pinned to exact bit-pattern scenarios, so a
//! regression against any one of them fails by name rather than by a
//! generic property violation.

use pretty_assertions::assert_eq;
use rstest::rstest;
use softfloat_core::state::{clear_exception_flags, exception_flags, ExceptionFlags};
use softfloat_core::*;

fn clear_all_flags() {
    clear_exception_flags(ExceptionFlags::from_bits(0x1F));
}

#[rstest]
fn one_plus_one_is_two() {
    clear_all_flags();
    let one = 0x3FF0_0000_0000_0000u128;
    let two = 0x4000_0000_0000_0000u128;
    assert_eq!(f64_add(one, one), two);
    assert!(exception_flags().is_empty());
}

#[rstest]
fn infinity_times_zero_is_invalid_with_a_policy_default_nan() {
    clear_all_flags();
    let inf = 0x7FF0_0000_0000_0000u128;
    let zero = 0x0000_0000_0000_0000u128;
    let result = f64_mul(inf, zero);
    assert!(exception_flags().contains(ExceptionFlags::INVALID));
    assert!(matches!(result, 0xFFF8_0000_0000_0000 | 0x7FF8_0000_0000_0000));
}

#[rstest]
fn sqrt_of_two_is_inexact() {
    clear_all_flags();
    let two = 0x4000_0000_0000_0000u128;
    let expected = 0x3FF6_A09E_667F_3BCDu128;
    assert_eq!(f64_sqrt(two), expected);
    assert!(exception_flags().contains(ExceptionFlags::INEXACT));
}

#[rstest]
fn fma_avoids_the_double_rounding_that_separate_mul_and_add_would_incur() {
    clear_all_flags();
    let a = 0x3FF0_0000_0000_0003u128;
    let b = 0x3FF0_0000_0000_0003u128;
    let c = 0xBFF0_0000_0000_0006u128;
    let fused = f64_fma(a, b, c);
    clear_all_flags();
    let separate = f64_add(f64_mul(a, b), c);
    assert_ne!(fused, separate, "fma must differ from separately-rounded mul+add for this triple");
}

#[rstest]
fn f32_one_plus_epsilon_over_one_is_inexact() {
    clear_all_flags();
    let one_plus_eps = 0x3F80_0001u128;
    let one = 0x3F80_0000u128;
    assert_eq!(f32_div(one_plus_eps, one), one_plus_eps);
    assert!(exception_flags().contains(ExceptionFlags::INEXACT));
}

#[rstest]
fn f32_overflow_rounds_to_positive_infinity() {
    clear_all_flags();
    let near_max = 0x7F7F_FFFFu128;
    let pushes_over = 0x7380_0000u128;
    let result = f32_add(near_max, pushes_over);
    assert_eq!(result, 0x7F80_0000u128);
    assert!(exception_flags().contains(ExceptionFlags::OVERFLOW));
    assert!(exception_flags().contains(ExceptionFlags::INEXACT));
}
