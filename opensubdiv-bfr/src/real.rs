//! Floating point precision used for evaluation.
//!
//! Everything that evaluates or combines points is generic over [`Real`],
//! which is implemented for [`f32`] and [`f64`] only.
use bytemuck::Pod;
use std::{
    fmt::Debug,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign},
};

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A floating point type points and weights can be expressed in.
pub trait Real:
    private::Sealed
    + Pod
    + Debug
    + Default
    + PartialOrd
    + Send
    + Sync
    + Sum
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;
    /// `true` for [`f64`].
    const IS_DOUBLE: bool;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn floor(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;

    #[inline]
    fn from_usize(value: usize) -> Self {
        Self::from_f64(value as f64)
    }

    /// Convert from the other (or the same) precision.
    #[inline]
    fn from_real<S: Real>(value: S) -> Self {
        Self::from_f64(value.to_f64())
    }
}

macro_rules! impl_real {
    ($t:ty, $double:expr) => {
        impl Real for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const HALF: Self = 0.5;
            const IS_DOUBLE: bool = $double;

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn floor(self) -> Self {
                <$t>::floor(self)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                <$t>::min(self, other)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                <$t>::max(self, other)
            }
        }
    };
}

impl_real!(f32, false);
impl_real!(f64, true);
