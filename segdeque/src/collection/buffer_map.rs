
use crate::{
  allocator::Allocator,
  collection::{
    arena::BufferHandle,
    misc::{init_block, uninit_block},
  },
};
use alloc::boxed::Box;
use core::{
  fmt::{Debug, Display, Formatter},
  mem,
};

/// Errors of the buffer map that backs [`crate::collection::Deque`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BufferMapError {
  /// The number of slots required by a growth can not be represented.
  SlotsOverflow,
}

impl Display for BufferMapError {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl core::error::Error for BufferMapError {}

/// Ordered array of buffer references.
///
/// Only the slots between the first and the last node of the owner are occupied, everything else
/// is headroom that allows growth at both ends without touching the slot array.
//
// |   |   | H | H | H | H |   |   |
//         |           |           |--> len()
//         |           |
//         |           |--------------> last node
//         |
//         |--------------------------> first node
pub(crate) struct BufferMap {
  slots: Box<[Option<BufferHandle>]>,
}

impl BufferMap {
  pub(crate) const INITIAL_LEN: usize = 8;

  /// Slot array of `len` vacant slots.
  pub(crate) fn new<A>(allocator: &mut A, len: usize) -> crate::Result<Self>
  where
    A: Allocator,
  {
    Ok(Self { slots: init_block(allocator.allocate(len)?, None) })
  }

  pub(crate) fn get(&self, node: usize) -> Option<BufferHandle> {
    self.slots.get(node).copied().flatten()
  }

  pub(crate) fn len(&self) -> usize {
    self.slots.len()
  }

  /// Returns the slot array to `allocator`. Handles are not released.
  pub(crate) fn release<A>(&mut self, allocator: &mut A)
  where
    A: Allocator,
  {
    let slots = mem::take(&mut self.slots);
    allocator.deallocate(uninit_block(slots));
  }

  /// Makes sure that `nodes_to_add` slots are vacant after `last`. Returns the new index of
  /// `first`.
  pub(crate) fn reserve_at_back<A>(
    &mut self,
    allocator: &mut A,
    first: usize,
    last: usize,
    nodes_to_add: usize,
  ) -> crate::Result<usize>
  where
    A: Allocator,
  {
    if nodes_to_add.wrapping_add(1) > self.slots.len().wrapping_sub(last) {
      return self.reallocate(allocator, first, last, nodes_to_add, false);
    }
    Ok(first)
  }

  /// Makes sure that `nodes_to_add` slots are vacant before `first`. Returns the new index of
  /// `first`.
  pub(crate) fn reserve_at_front<A>(
    &mut self,
    allocator: &mut A,
    first: usize,
    last: usize,
    nodes_to_add: usize,
  ) -> crate::Result<usize>
  where
    A: Allocator,
  {
    if nodes_to_add.wrapping_add(1) > first {
      return self.reallocate(allocator, first, last, nodes_to_add, true);
    }
    Ok(first)
  }

  /// Moves the occupied slots `[first, last]` so that `nodes_to_add` more slots fit at the
  /// requested end. The slot array is re-centered when it is at least twice as large as the
  /// resulting number of nodes, otherwise a larger array is requested.
  ///
  /// Returns the new index of `first`. Nothing is modified on error.
  pub(crate) fn reallocate<A>(
    &mut self,
    allocator: &mut A,
    first: usize,
    last: usize,
    nodes_to_add: usize,
    add_at_front: bool,
  ) -> crate::Result<usize>
  where
    A: Allocator,
  {
    let map_len = self.slots.len();
    let old_nodes = last.wrapping_sub(first).wrapping_add(1);
    let new_nodes = old_nodes.checked_add(nodes_to_add).ok_or(BufferMapError::SlotsOverflow)?;
    let shift = if add_at_front { nodes_to_add } else { 0 };
    if map_len > new_nodes.checked_mul(2).ok_or(BufferMapError::SlotsOverflow)? {
      let new_first = (map_len.wrapping_sub(new_nodes) / 2).wrapping_add(shift);
      self.slots.copy_within(first..=last, new_first);
      let new_range = new_first..new_first.wrapping_add(old_nodes);
      for node in first..=last {
        if !new_range.contains(&node) {
          if let Some(slot) = self.slots.get_mut(node) {
            *slot = None;
          }
        }
      }
      _debug!(first, new_first, "Re-centered buffer map");
      return Ok(new_first);
    }
    let new_map_len = map_len
      .checked_add(map_len.max(nodes_to_add))
      .and_then(|el| el.checked_add(2))
      .ok_or(BufferMapError::SlotsOverflow)?;
    let mut new_slots = init_block(allocator.allocate(new_map_len)?, None);
    let new_first = (new_map_len.wrapping_sub(new_nodes) / 2).wrapping_add(shift);
    let new_last = new_first.wrapping_add(old_nodes);
    let to = new_slots.get_mut(new_first..new_last);
    if let (Some(to), Some(from)) = (to, self.slots.get(first..=last)) {
      to.copy_from_slice(from);
    }
    let old_slots = mem::replace(&mut self.slots, new_slots);
    allocator.deallocate(uninit_block(old_slots));
    _debug!(map_len, new_map_len, "Reallocated buffer map");
    Ok(new_first)
  }

  pub(crate) fn set(&mut self, node: usize, handle: BufferHandle) {
    if let Some(slot) = self.slots.get_mut(node) {
      *slot = Some(handle);
    }
  }

  /// Vacates `node`, returning its previous handle.
  pub(crate) fn take(&mut self, node: usize) -> Option<BufferHandle> {
    self.slots.get_mut(node).and_then(Option::take)
  }
}
