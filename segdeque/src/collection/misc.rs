use alloc::boxed::Box;
use core::{mem::MaybeUninit, ptr};

/// Number of elements stored by each buffer of a [`crate::collection::Deque`].
///
/// A non-zero `hint` is used verbatim. Otherwise buffers are sized to span 512 bytes, or to hold a
/// single element when the element itself is larger than that. Zero-sized elements are sized as
/// if they occupied one byte.
///
/// ```rust
/// use segdeque::collection::buffer_capacity;
///
/// assert_eq!(buffer_capacity(0, 4), 128);
/// assert_eq!(buffer_capacity(0, 600), 1);
/// assert_eq!(buffer_capacity(32, 600), 32);
/// ```
#[inline]
pub const fn buffer_capacity(hint: usize, elem_size: usize) -> usize {
  const BUFFER_BYTES: usize = 512;
  if hint != 0 {
    return hint;
  }
  let size = if elem_size == 0 { 1 } else { elem_size };
  if size < BUFFER_BYTES { BUFFER_BYTES / size } else { 1 }
}

/// Writes `value` into every slot of `block`.
pub(crate) fn init_block<T>(mut block: Box<[MaybeUninit<T>]>, value: T) -> Box<[T]>
where
  T: Copy,
{
  for slot in block.iter_mut() {
    let _ = slot.write(value);
  }
  // SAFETY: all slots were initialized above
  unsafe { block.assume_init() }
}

/// Inverse of [`init_block`], used to hand blocks of `Copy` elements back to an allocator.
pub(crate) fn uninit_block<T>(block: Box<[T]>) -> Box<[MaybeUninit<T>]>
where
  T: Copy,
{
  let len = block.len();
  let data = Box::into_raw(block);
  let slice = ptr::slice_from_raw_parts_mut(data.cast::<MaybeUninit<T>>(), len);
  // SAFETY: `MaybeUninit<T>` has the same size and alignment of `T` and `slice` comes from a `Box`
  unsafe { Box::from_raw(slice) }
}
