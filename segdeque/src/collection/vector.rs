use alloc::vec::Vec;
use core::{
  fmt::{Debug, Display, Formatter},
  ops::Deref,
};

/// Errors of [`Vector`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorError {
  /// There is no capacity left to store one more element.
  PushOverflow,
  /// It was not possible to reserve more memory.
  ReserveOverflow,
}

impl Display for VectorError {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl core::error::Error for VectorError {}

/// A wrapper around the std's vector where every operation that might allocate is fallible.
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct Vector<T> {
  data: Vec<T>,
}

impl<T> Vector<T> {
  #[inline]
  pub(crate) const fn new() -> Self {
    Self { data: Vec::new() }
  }

  #[inline]
  pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
    self.data.get_mut(idx)
  }

  #[inline]
  pub(crate) fn pop(&mut self) -> Option<T> {
    self.data.pop()
  }

  /// Appends an element, returning an error instead of aborting when memory is exhausted.
  #[inline]
  pub(crate) fn push(&mut self, elem: T) -> crate::Result<()> {
    self.data.try_reserve(1).map_err(|_err| VectorError::PushOverflow)?;
    self.data.push(elem);
    Ok(())
  }

  /// Reserves capacity for at least `additional` more elements.
  #[inline]
  pub(crate) fn reserve(&mut self, additional: usize) -> crate::Result<()> {
    self.data.try_reserve(additional).map_err(|_err| VectorError::ReserveOverflow)?;
    Ok(())
  }
}

impl<T> Default for Vector<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Deref for Vector<T> {
  type Target = [T];

  #[inline]
  fn deref(&self) -> &Self::Target {
    &self.data
  }
}
