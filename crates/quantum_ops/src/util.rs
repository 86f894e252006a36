// This code is part of Qiskit.
//
// (C) Copyright IBM 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use num_complex::Complex64;

/// Create a new [`Complex64`] with arguments that can be converted to `f64` via `as`.
///
/// This macro may be used in `static` and `const` statements; the replacement by the constructor
/// occurs at compile time.
#[macro_export]
macro_rules! c64 {
    ($re: expr, $im: expr $(,)*) => {
        ::num_complex::Complex64::new($re as f64, $im as f64)
    };
}

pub const C_ZERO: Complex64 = c64!(0, 0);
pub const C_ONE: Complex64 = c64!(1, 0);
pub const C_M_ONE: Complex64 = c64!(-1, 0);
pub const C_IM: Complex64 = c64!(0, 1);
pub const C_M_IM: Complex64 = c64!(0, -1);

/// Multiply `value` by `i ** power` without any floating-point multiplications.
///
/// Only the residue of `power` modulo 4 matters.
#[inline]
pub fn mul_i_pow(value: Complex64, power: u32) -> Complex64 {
    match power % 4 {
        0 => value,
        1 => Complex64::new(-value.im, value.re),
        2 => Complex64::new(-value.re, -value.im),
        3 => Complex64::new(value.im, -value.re),
        _ => unreachable!("'x % 4' has only four possible values"),
    }
}

/// Total order on complex numbers used to fix the summation order of duplicate terms.
///
/// This is lexicographical over `(re, im)` under [f64::total_cmp], so it never fails, even for
/// NaN.
#[inline]
pub fn total_cmp_c64(left: &Complex64, right: &Complex64) -> ::std::cmp::Ordering {
    left.re
        .total_cmp(&right.re)
        .then_with(|| left.im.total_cmp(&right.im))
}
