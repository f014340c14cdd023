// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common mathematical operations

#![allow(missing_docs)]

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("flatbez requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs;
    fn atan2(self, other: Self) -> Self => atan2;
    fn hypot(self, other: Self) -> Self => hypot;
}

/// Absolute difference of two angles, folded so the result is the shorter
/// way around the circle.
///
/// Both inputs are expected in `(-π, π]`, as returned by `atan2`. The result
/// is in `[0, π]`.
#[inline]
pub(crate) fn angle_between(a: f64, b: f64) -> f64 {
    let da = (a - b).abs();
    if da >= core::f64::consts::PI {
        2.0 * core::f64::consts::PI - da
    } else {
        da
    }
}
