
use crate::collection::misc::buffer_capacity;
use core::{
  cmp::Ordering,
  fmt::{Debug, Formatter},
  hash::{Hash, Hasher},
  marker::PhantomData,
  ops::{Add, AddAssign, Sub, SubAssign},
};

/// Position inside a [`crate::collection::Deque`] expressed as a buffer map slot (`node`) plus
/// an index inside the referenced buffer (`offset`).
///
/// All arithmetic transparently crosses buffer boundaries. Cursors are plain values that never
/// borrow the collection, which means that structural modifications can make them stale. Stale
/// cursors are rejected or point to different elements but never lead to undefined behaviour.
///
/// ```rust
/// use segdeque::collection::Cursor;
///
/// let mut cursor = Cursor::<u8, 4>::default();
/// cursor += 6;
/// assert_eq!((cursor.node(), cursor.offset()), (1, 2));
/// cursor -= 3;
/// assert_eq!((cursor.node(), cursor.offset()), (0, 3));
/// ```
pub struct Cursor<T, const B: usize = 0> {
  node: usize,
  offset: usize,
  phantom: PhantomData<fn() -> T>,
}

impl<T, const B: usize> Cursor<T, B> {
  /// Number of slots of each buffer.
  pub const CAPACITY: usize = buffer_capacity(B, size_of::<T>());

  pub(crate) const fn new(node: usize, offset: usize) -> Self {
    Self { node, offset, phantom: PhantomData }
  }

  /// Index of the buffer map slot.
  #[inline]
  pub const fn node(&self) -> usize {
    self.node
  }

  /// Index inside the buffer.
  #[inline]
  pub const fn offset(&self) -> usize {
    self.offset
  }

  /// Moves one position forward, jumping to the beginning of the next buffer when the current one
  /// is exhausted.
  #[inline]
  pub fn advance(&mut self) {
    self.offset = self.offset.wrapping_add(1);
    if self.offset >= Self::CAPACITY {
      self.node = self.node.wrapping_add(1);
      self.offset = 0;
    }
  }

  /// Number of positions between `other` and `self`. Negative if `self` is before `other`.
  #[inline]
  pub fn distance(&self, other: &Self) -> isize {
    let capacity = Self::CAPACITY.cast_signed();
    let nodes = self.node.wrapping_sub(other.node).cast_signed().wrapping_sub(1);
    capacity
      .wrapping_mul(nodes)
      .wrapping_add(self.offset.cast_signed())
      .wrapping_add(capacity.wrapping_sub(other.offset.cast_signed()))
  }

  /// Moves one position backward, jumping to the end of the previous buffer when the current one
  /// is exhausted.
  #[inline]
  pub fn retreat(&mut self) {
    if self.offset == 0 {
      self.node = self.node.wrapping_sub(1);
      self.offset = Self::CAPACITY;
    }
    self.offset = self.offset.wrapping_sub(1);
  }

  /// Moves `n` positions, backwards if `n` is negative.
  #[inline]
  pub fn shift(&mut self, n: isize) {
    let capacity = Self::CAPACITY.cast_signed();
    let offset = n.wrapping_add(self.offset.cast_signed());
    if offset >= 0 && offset < capacity {
      self.offset = offset.cast_unsigned();
      return;
    }
    let node_delta = floor_div(offset, capacity);
    self.node = self.node.wrapping_add_signed(node_delta);
    self.offset = offset.wrapping_sub(node_delta.wrapping_mul(capacity)).cast_unsigned();
  }
}

impl<T, const B: usize> Add<isize> for Cursor<T, B> {
  type Output = Self;

  #[inline]
  fn add(mut self, rhs: isize) -> Self::Output {
    self.shift(rhs);
    self
  }
}

impl<T, const B: usize> AddAssign<isize> for Cursor<T, B> {
  #[inline]
  fn add_assign(&mut self, rhs: isize) {
    self.shift(rhs);
  }
}

impl<T, const B: usize> Clone for Cursor<T, B> {
  #[inline]
  fn clone(&self) -> Self {
    *self
  }
}

impl<T, const B: usize> Copy for Cursor<T, B> {}

impl<T, const B: usize> Debug for Cursor<T, B> {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Cursor").field("node", &self.node).field("offset", &self.offset).finish()
  }
}

impl<T, const B: usize> Default for Cursor<T, B> {
  #[inline]
  fn default() -> Self {
    Self::new(0, 0)
  }
}

impl<T, const B: usize> Eq for Cursor<T, B> {}

impl<T, const B: usize> Hash for Cursor<T, B> {
  #[inline]
  fn hash<H>(&self, state: &mut H)
  where
    H: Hasher,
  {
    self.node.hash(state);
    self.offset.hash(state);
  }
}

impl<T, const B: usize> Ord for Cursor<T, B> {
  #[inline]
  fn cmp(&self, other: &Self) -> Ordering {
    self.node.cmp(&other.node).then(self.offset.cmp(&other.offset))
  }
}

impl<T, const B: usize> PartialEq for Cursor<T, B> {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    self.node == other.node && self.offset == other.offset
  }
}

impl<T, const B: usize> PartialOrd for Cursor<T, B> {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<T, const B: usize> Sub for Cursor<T, B> {
  type Output = isize;

  #[inline]
  fn sub(self, rhs: Self) -> Self::Output {
    self.distance(&rhs)
  }
}

impl<T, const B: usize> Sub<isize> for Cursor<T, B> {
  type Output = Self;

  #[inline]
  fn sub(mut self, rhs: isize) -> Self::Output {
    self.shift(rhs.wrapping_neg());
    self
  }
}

impl<T, const B: usize> SubAssign<isize> for Cursor<T, B> {
  #[inline]
  fn sub_assign(&mut self, rhs: isize) {
    self.shift(rhs.wrapping_neg());
  }
}

// Rounds towards negative infinity. `divisor` is always positive.
const fn floor_div(dividend: isize, divisor: isize) -> isize {
  if dividend >= 0 {
    dividend / divisor
  } else {
    // `!dividend` is `-dividend - 1` without overflows
    !(!dividend / divisor)
  }
}
