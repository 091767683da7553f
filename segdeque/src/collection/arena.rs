
use crate::{allocator::Allocator, collection::vector::Vector, misc::hints::_unlikely_unreachable};
use alloc::boxed::Box;
use core::{
  mem::MaybeUninit,
  ptr::{self, NonNull},
};

/// Opaque identifier of a buffer owned by an [`Arena`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct BufferHandle(pub(crate) usize);

/// Owner of every fixed-size buffer of a segmented collection.
///
/// Buffers are referenced by [`BufferHandle`]s instead of pointers, which allows the buffer map to
/// shuffle references around without ever touching element data. Slots of released buffers are
/// recycled by subsequent allocations.
///
/// Elements are never dropped by the arena, that is up to the owner of the live range.
pub(crate) struct Arena<T> {
  blocks: Vector<Option<NonNull<T>>>,
  capacity: usize,
  live: usize,
  vacant: Vector<usize>,
}

impl<T> Arena<T> {
  pub(crate) const fn new(capacity: usize) -> Self {
    Self { blocks: Vector::new(), capacity, live: 0, vacant: Vector::new() }
  }

  /// Number of buffers that are currently allocated.
  pub(crate) const fn live(&self) -> usize {
    self.live
  }

  /// Requests a new buffer of `capacity` uninitialized slots from `allocator`.
  pub(crate) fn allocate<A>(&mut self, allocator: &mut A) -> crate::Result<BufferHandle>
  where
    A: Allocator,
  {
    // Bookkeeping space must exist before the memory request
    if self.vacant.is_empty() {
      self.blocks.reserve(1)?;
    }
    let block = allocator.allocate::<T>(self.capacity)?;
    let data = NonNull::from(Box::leak(block)).cast::<T>();
    let idx = if let Some(idx) = self.vacant.pop() {
      match self.blocks.get_mut(idx) {
        Some(elem) => *elem = Some(data),
        None => _unlikely_unreachable(),
      }
      idx
    } else {
      let idx = self.blocks.len();
      if let Err(err) = self.blocks.push(Some(data)) {
        // SAFETY: `data` was allocated above with `self.capacity` slots
        unsafe {
          self.free(allocator, data);
        }
        return Err(err);
      }
      idx
    };
    self.live = self.live.wrapping_add(1);
    _trace!(idx, "Allocated buffer");
    Ok(BufferHandle(idx))
  }

  /// Returns the memory of `handle` to `allocator`. Unknown handles are ignored.
  pub(crate) fn deallocate<A>(&mut self, allocator: &mut A, handle: BufferHandle)
  where
    A: Allocator,
  {
    let Some(data) = self.blocks.get_mut(handle.0).and_then(Option::take) else {
      return;
    };
    // A failed push only prevents the index from being recycled
    let _rslt = self.vacant.push(handle.0);
    // SAFETY: `data` belongs to this arena and is no longer referenced by any slot
    unsafe {
      self.free(allocator, data);
    }
    self.live = self.live.wrapping_sub(1);
    _trace!(idx = handle.0, "Released buffer");
  }

  /// Releases every buffer that is still alive.
  pub(crate) fn release_all<A>(&mut self, allocator: &mut A)
  where
    A: Allocator,
  {
    let mut idx: usize = 0;
    while let Some(elem) = self.blocks.get(idx) {
      if elem.is_some() {
        self.deallocate(allocator, BufferHandle(idx));
      }
      idx = idx.wrapping_add(1);
    }
    debug_assert_eq!(self.live(), 0);
  }

  /// Pointer to the `offset`-th slot of `handle`.
  ///
  /// Writing through the returned pointer is allowed as long as no other reference to the same
  /// slot is alive.
  pub(crate) fn slot(&self, handle: BufferHandle, offset: usize) -> *mut T {
    let Some(data) = self.blocks.get(handle.0).copied().flatten() else {
      _unlikely_unreachable();
    };
    debug_assert!(offset < self.capacity);
    // SAFETY: callers only provide offsets within the capacity of the buffer
    unsafe { data.as_ptr().add(offset) }
  }

  unsafe fn free<A>(&self, allocator: &mut A, data: NonNull<T>)
  where
    A: Allocator,
  {
    let ptr = data.as_ptr().cast::<MaybeUninit<T>>();
    let slice = ptr::slice_from_raw_parts_mut(ptr, self.capacity);
    // SAFETY: `data` was created by `Box::leak` with the same length in `allocate`
    let block = unsafe { Box::from_raw(slice) };
    allocator.deallocate(block);
  }
}

// SAFETY: the arena owns its buffers, sending it to another thread moves the elements as well
unsafe impl<T> Send for Arena<T> where T: Send {}
// SAFETY: shared access only hands out raw pointers that are dereferenced by the owner
unsafe impl<T> Sync for Arena<T> where T: Sync {}
