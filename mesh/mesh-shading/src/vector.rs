//! Vector operations used by the geometry kernels.

use nalgebra::{RealField, Vector3};

/// The operations the face and aggregation kernels need from a 3D vector.
///
/// Kernels are generic over this trait and resolved statically, so the
/// same code runs on single- and double-precision storage.
///
/// Implemented for [`nalgebra::Vector3<T>`] for every `T: RealField + Copy`.
pub trait GeometryVector: Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Component type.
    type Scalar: RealField + Copy;

    /// The zero vector.
    fn zero() -> Self;

    /// Component-wise sum.
    #[must_use]
    fn add(self, rhs: Self) -> Self;

    /// Component-wise difference.
    #[must_use]
    fn sub(self, rhs: Self) -> Self;

    /// Multiply every component by `s`.
    #[must_use]
    fn scale(self, s: Self::Scalar) -> Self;

    /// Dot product.
    fn dot(self, rhs: Self) -> Self::Scalar;

    /// Right-handed cross product.
    #[must_use]
    fn cross(self, rhs: Self) -> Self;

    /// Unit vector in the same direction, or zero for a zero-length input.
    ///
    /// Never produces NaN from a zero vector.
    #[must_use]
    fn normalize_or_zero(self) -> Self;

    /// Squared length.
    fn length_squared(self) -> Self::Scalar {
        self.dot(self)
    }

    /// Whether all components are exactly zero.
    fn is_zero(self) -> bool {
        self.length_squared() == nalgebra::zero::<Self::Scalar>()
    }
}

impl<T: RealField + Copy> GeometryVector for Vector3<T> {
    type Scalar = T;

    #[inline]
    fn zero() -> Self {
        Self::zeros()
    }

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline]
    fn scale(self, s: T) -> Self {
        self * s
    }

    #[inline]
    fn dot(self, rhs: Self) -> T {
        Self::dot(&self, &rhs)
    }

    #[inline]
    fn cross(self, rhs: Self) -> Self {
        Self::cross(&self, &rhs)
    }

    #[inline]
    fn normalize_or_zero(self) -> Self {
        self.try_normalize(T::zero()).unwrap_or_else(Self::zeros)
    }
}
