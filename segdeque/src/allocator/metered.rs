use crate::allocator::{Allocator, AllocatorError, Global};
use alloc::boxed::Box;
use core::mem::MaybeUninit;

/// Wraps another allocator, counting every request and optionally capping the number of blocks
/// that can be alive at the same time.
///
/// ```rust
/// use segdeque::allocator::{Allocator, Metered};
///
/// let mut allocator = Metered::with_limit(segdeque::allocator::Global, 1);
/// let block = allocator.allocate::<u8>(4).unwrap();
/// assert!(allocator.allocate::<u8>(4).is_err());
/// allocator.deallocate(block);
/// assert_eq!((allocator.allocations(), allocator.deallocations()), (1, 1));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Metered<A = Global> {
  allocations: usize,
  deallocations: usize,
  inner: A,
  limit: Option<usize>,
}

impl<A> Metered<A> {
  /// Counts requests without imposing any limit.
  #[inline]
  pub const fn new(inner: A) -> Self {
    Self { allocations: 0, deallocations: 0, inner, limit: None }
  }

  /// Fails with [`AllocatorError::LimitReached`] once `limit` blocks are alive.
  #[inline]
  pub const fn with_limit(inner: A, limit: usize) -> Self {
    Self { allocations: 0, deallocations: 0, inner, limit: Some(limit) }
  }

  /// Number of successful allocations.
  #[inline]
  pub const fn allocations(&self) -> usize {
    self.allocations
  }

  /// Number of releases.
  #[inline]
  pub const fn deallocations(&self) -> usize {
    self.deallocations
  }

  /// Wrapped allocator.
  #[inline]
  pub const fn inner(&self) -> &A {
    &self.inner
  }

  /// Number of blocks that were allocated but not yet released.
  #[inline]
  pub const fn live(&self) -> usize {
    self.allocations.wrapping_sub(self.deallocations)
  }

  /// Replaces the current limit of live blocks.
  #[inline]
  pub fn set_limit(&mut self, limit: Option<usize>) {
    self.limit = limit;
  }
}

impl<A> Allocator for Metered<A>
where
  A: Allocator,
{
  #[inline]
  fn allocate<T>(&mut self, len: usize) -> crate::Result<Box<[MaybeUninit<T>]>> {
    if let Some(limit) = self.limit {
      if self.live() >= limit {
        _debug!(limit, "Refusing allocation of {len} slots");
        return Err(AllocatorError::LimitReached.into());
      }
    }
    let block = self.inner.allocate(len)?;
    self.allocations = self.allocations.wrapping_add(1);
    Ok(block)
  }

  #[inline]
  fn deallocate<T>(&mut self, block: Box<[MaybeUninit<T>]>) {
    self.inner.deallocate(block);
    self.deallocations = self.deallocations.wrapping_add(1);
  }
}
