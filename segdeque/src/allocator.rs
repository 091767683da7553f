//! Raw memory providers.
//!
//! Collections of this crate never talk to the global allocator directly. Every buffer and every
//! buffer map is requested through an [`Allocator`], which makes it possible to count, cap or
//! redirect allocations without touching the collections themselves.

mod global;
mod metered;

pub use global::Global;
pub use metered::Metered;

use alloc::boxed::Box;
use core::{
  fmt::{Debug, Display, Formatter},
  mem::MaybeUninit,
};

/// Errors of [`Allocator`] implementations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AllocatorError {
  /// The number of live blocks reached the limit imposed by [`Metered`].
  LimitReached,
  #[doc = doc_alloc_failure!()]
  OutOfMemory,
}

impl Display for AllocatorError {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl core::error::Error for AllocatorError {}

/// Capability that supplies and releases raw blocks of uninitialized slots.
///
/// Implementations only deal with memory. Constructing or dropping the values that live inside a
/// block is always up to the caller.
pub trait Allocator {
  /// Allocates a block of exactly `len` uninitialized slots.
  fn allocate<T>(&mut self, len: usize) -> crate::Result<Box<[MaybeUninit<T>]>>;

  /// Releases a block previously returned by [`Allocator::allocate`].
  ///
  /// Values stored in the block are not dropped.
  fn deallocate<T>(&mut self, block: Box<[MaybeUninit<T>]>);
}

impl<A> Allocator for &mut A
where
  A: Allocator,
{
  #[inline]
  fn allocate<T>(&mut self, len: usize) -> crate::Result<Box<[MaybeUninit<T>]>> {
    (**self).allocate(len)
  }

  #[inline]
  fn deallocate<T>(&mut self, block: Box<[MaybeUninit<T>]>) {
    (**self).deallocate(block);
  }
}
