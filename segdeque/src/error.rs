use crate::{
  allocator::AllocatorError,
  collection::{BufferMapError, DequeError, VectorError},
};
use core::fmt::{Debug, Display, Formatter};

/// Grouped individual errors
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
  // Generic
  //
  /// A set of arithmetic operations resulted in an overflow, underflow or division by zero
  OutOfBoundsArithmetic,

  // Internal
  //
  /// See [`AllocatorError`].
  AllocatorError(AllocatorError),
  /// See [`BufferMapError`].
  BufferMapError(BufferMapError),
  /// See [`DequeError`].
  DequeError(DequeError),
  /// See [`VectorError`].
  VectorError(VectorError),
}

impl Display for Error {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl core::error::Error for Error {}

impl From<Error> for () {
  #[inline]
  fn from(_: Error) -> Self {}
}

// Internal

impl From<AllocatorError> for Error {
  #[inline]
  fn from(from: AllocatorError) -> Self {
    Self::AllocatorError(from)
  }
}

impl From<BufferMapError> for Error {
  #[inline]
  fn from(from: BufferMapError) -> Self {
    Self::BufferMapError(from)
  }
}

impl From<DequeError> for Error {
  #[inline]
  fn from(from: DequeError) -> Self {
    Self::DequeError(from)
  }
}

impl From<VectorError> for Error {
  #[inline]
  fn from(from: VectorError) -> Self {
    Self::VectorError(from)
  }
}
