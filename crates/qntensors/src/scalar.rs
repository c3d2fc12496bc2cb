//! Scalar trait for block element types.

use faer_traits::ComplexField;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

pub use faer::c64;

/// Trait for scalar types stored in blocks.
///
/// Wraps faer's `ComplexField` so that blocks can be handed to faer's QR,
/// SVD and GEMM kernels, and adds the plain arithmetic the block engines use.
pub trait Scalar:
    ComplexField
    + Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Embeds a real number.
    fn from_f64(value: f64) -> Self;

    /// Absolute value (complex modulus).
    fn modulus(self) -> f64;

    /// Complex conjugate; identity for real types.
    fn conjugate(self) -> Self;
}

impl Scalar for f64 {
    fn one() -> Self {
        1.0
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn modulus(self) -> f64 {
        self.abs()
    }

    fn conjugate(self) -> Self {
        self
    }
}

impl Scalar for c64 {
    fn one() -> Self {
        c64::new(1.0, 0.0)
    }

    fn from_f64(value: f64) -> Self {
        c64::new(value, 0.0)
    }

    fn modulus(self) -> f64 {
        self.re.hypot(self.im)
    }

    fn conjugate(self) -> Self {
        c64::new(self.re, -self.im)
    }
}
