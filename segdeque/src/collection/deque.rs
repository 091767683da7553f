// 1. Layout
//
// Elements live in fixed-size buffers. The buffer map stores, in order, references to these
// buffers and only the slots between `start.node` and `finish.node` are occupied.
//
//   map:  |   | H | H | H |   |   |
//               |       |
//               v       v
//             [ . A B ] [ F . . ]
//                 ^         ^
//                 |         |--> finish (one past the last element, always inside a buffer)
//                 |------------> start
//
// Every buffer strictly between the first and the last one is full.
//
// 2. Growth
//
// When `finish` reaches the end of its buffer, a new buffer is attached after it. When `start`
// reaches the beginning of its buffer, a new buffer is attached before it. If the map has no
// headroom at the requested end, handles are re-centered or moved into a larger map. Element data
// never moves when the map changes.

mod iter;
#[cfg(kani)]
mod kani;
#[cfg(test)]
mod tests;

pub use iter::{IntoIter, Iter, IterMut};

use crate::{
  allocator::{Allocator, Global},
  collection::{
    arena::{Arena, BufferHandle},
    buffer_map::BufferMap,
    cursor::Cursor,
    vector::Vector,
  },
  misc::hints::_unlikely_unreachable,
};
use core::{
  fmt::{Debug, Display, Formatter},
  mem::needs_drop,
  ops::{Index, IndexMut},
  ptr,
};

/// Errors of [`Deque`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DequeError {
  /// The resulting number of elements would be greater than [`Deque::max_size`].
  LenOverflow,
  #[doc = doc_invalid_cursor!()]
  OutOfBoundsCursor,
  /// The provided pair of cursors does not describe a valid range of the live range.
  OutOfBoundsRange,
}

impl Display for DequeError {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl core::error::Error for DequeError {}

/// A double-ended queue implemented with a map of fixed-size buffers.
///
/// Insertions and removals at both ends are amortized O(1) and never move existing elements,
/// random access is O(1) and growth is incremental.
///
/// `B` is a hint for the number of elements of each buffer, see
/// [`crate::collection::buffer_capacity`].
///
/// ```rust
/// let mut deque = segdeque::collection::Deque::new().unwrap();
/// deque.push_back(2).unwrap();
/// deque.push_front(1).unwrap();
/// assert_eq!((deque[0], deque[1]), (1, 2));
/// ```
pub struct Deque<T, A = Global, const B: usize = 0>
where
  A: Allocator,
{
  allocator: A,
  arena: Arena<T>,
  finish: Cursor<T, B>,
  map: BufferMap,
  start: Cursor<T, B>,
}

impl<T> Deque<T, Global, 0> {
  /// Creates a new empty instance backed by the global allocator.
  ///
  /// The first buffer and the buffer map are allocated eagerly.
  #[inline]
  pub fn new() -> crate::Result<Self> {
    Self::with_allocator(Global)
  }

  /// Creates an instance filled with `count` clones of `value` backed by the global allocator.
  ///
  /// ```rust
  /// let deque = segdeque::collection::Deque::from_elem(3, 'a').unwrap();
  /// assert_eq!(deque.iter().collect::<String>(), "aaa");
  /// ```
  #[inline]
  pub fn from_elem(count: usize, value: T) -> crate::Result<Self>
  where
    T: Clone,
  {
    Self::from_elem_in(count, value, Global)
  }
}

impl<T, A, const B: usize> Deque<T, A, B>
where
  A: Allocator,
{
  const CAPACITY: usize = Cursor::<T, B>::CAPACITY;
  const NEEDS_DROP: bool = needs_drop::<T>();

  /// Creates a new empty instance that requests memory from `allocator`.
  #[inline]
  pub fn with_allocator(allocator: A) -> crate::Result<Self> {
    Self::with_nodes(allocator, 0)
  }

  /// Creates an instance filled with `count` clones of `value` that requests memory from
  /// `allocator`. Every necessary buffer is allocated upfront.
  ///
  /// ```rust
  /// use segdeque::{allocator::Global, collection::Deque};
  ///
  /// let deque = Deque::<_, _, 32>::from_elem_in(20, 9, Global).unwrap();
  /// assert_eq!((deque.len(), deque.nodes_len()), (20, 1));
  /// ```
  #[inline]
  pub fn from_elem_in(count: usize, value: T, allocator: A) -> crate::Result<Self>
  where
    T: Clone,
  {
    let mut this = Self::with_nodes(allocator, count)?;
    if count == 0 {
      return Ok(this);
    }
    for _ in 1..count {
      let elem = value.clone();
      // SAFETY: every buffer required by `count` elements was attached by `with_nodes`
      unsafe {
        this.write(this.finish, elem);
      }
      this.finish.advance();
    }
    // SAFETY: same as above
    unsafe {
      this.write(this.finish, value);
    }
    this.finish.advance();
    Ok(this)
  }

  /// Allocator used by this instance.
  #[inline]
  pub fn allocator(&self) -> &A {
    &self.allocator
  }

  /// Provides a reference to the last element.
  #[inline]
  pub fn back(&self) -> Option<&T> {
    let mut cursor = self.finish;
    cursor.retreat();
    self.get_at(cursor)
  }

  /// Mutable version of [`Self::back`].
  #[inline]
  pub fn back_mut(&mut self) -> Option<&mut T> {
    let mut cursor = self.finish;
    cursor.retreat();
    self.get_at_mut(cursor)
  }

  /// Cursor of the first element, equal to [`Self::end`] when the instance is empty.
  #[inline]
  pub const fn begin(&self) -> Cursor<T, B> {
    self.start
  }

  /// Number of elements of each buffer.
  #[inline]
  pub const fn buffer_capacity(&self) -> usize {
    Self::CAPACITY
  }

  /// Drops all elements.
  ///
  /// Every buffer is released except the one under [`Self::begin`], which is kept for subsequent
  /// insertions. The position of [`Self::begin`] is preserved.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::from_elem(1000, 1u8).unwrap();
  /// deque.clear();
  /// assert_eq!((deque.len(), deque.nodes_len()), (0, 1));
  /// ```
  #[inline]
  pub fn clear(&mut self) {
    self.truncate_back(0);
    _debug!("Deque cleared");
  }

  /// Cursor one position past the last element.
  #[inline]
  pub const fn end(&self) -> Cursor<T, B> {
    self.finish
  }

  /// Removes the element pointed by `pos`, returning the cursor of the element that followed it.
  ///
  /// Only the elements of the shorter side are shifted.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 2, 3]).unwrap();
  /// let cursor = deque.erase(deque.begin() + 1).unwrap();
  /// assert_eq!(deque.get_at(cursor), Some(&3));
  /// ```
  #[inline]
  pub fn erase(&mut self, pos: Cursor<T, B>) -> crate::Result<Cursor<T, B>> {
    let index = self.position(pos)?;
    if index >= self.len() {
      return Err(DequeError::OutOfBoundsCursor.into());
    }
    drop(self.take(index));
    Ok(self.cursor_at(index))
  }

  /// Removes all elements of `[first, last)`, returning the cursor of the element that followed
  /// the removed range.
  ///
  /// Only the elements of the shorter side are shifted and buffers that become empty on that side
  /// are released.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 2, 3, 4]).unwrap();
  /// let _ = deque.erase_range(deque.begin() + 1, deque.begin() + 3).unwrap();
  /// assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [1, 4]);
  /// ```
  #[inline]
  pub fn erase_range(
    &mut self,
    first: Cursor<T, B>,
    last: Cursor<T, B>,
  ) -> crate::Result<Cursor<T, B>> {
    let (Ok(begin), Ok(end)) = (self.position(first), self.position(last)) else {
      return Err(DequeError::OutOfBoundsRange.into());
    };
    if begin > end {
      return Err(DequeError::OutOfBoundsRange.into());
    }
    let len = self.len();
    if begin == 0 && end == len {
      self.clear();
      return Ok(self.finish);
    }
    let n = end.wrapping_sub(begin);
    if n == 0 {
      return Ok(self.cursor_at(begin));
    }
    if begin < len.wrapping_sub(n) / 2 {
      for idx in (0..begin).rev() {
        // SAFETY: both positions are inside the live range
        unsafe {
          self.swap_positions(idx, idx.wrapping_add(n));
        }
      }
      self.cut_front(n);
    } else {
      for idx in end..len {
        // SAFETY: both positions are inside the live range
        unsafe {
          self.swap_positions(idx, idx.wrapping_sub(n));
        }
      }
      self.cut_back(n);
    }
    Ok(self.cursor_at(begin))
  }

  /// Appends all elements of the iterator.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 2]).unwrap();
  /// assert_eq!(deque.len(), 2);
  /// ```
  #[inline]
  pub fn extend_back_from_iter(&mut self, ii: impl IntoIterator<Item = T>) -> crate::Result<()> {
    for elem in ii {
      self.push_back(elem)?;
    }
    Ok(())
  }

  /// Prepends all elements of the iterator. The last yielded element becomes the first one.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_front_from_iter([1, 2]).unwrap();
  /// assert_eq!(deque.front(), Some(&2));
  /// ```
  #[inline]
  pub fn extend_front_from_iter(&mut self, ii: impl IntoIterator<Item = T>) -> crate::Result<()> {
    for elem in ii {
      self.push_front(elem)?;
    }
    Ok(())
  }

  /// Provides a reference to the first element.
  #[inline]
  pub fn front(&self) -> Option<&T> {
    self.get_at(self.start)
  }

  /// Mutable version of [`Self::front`].
  #[inline]
  pub fn front_mut(&mut self) -> Option<&mut T> {
    self.get_at_mut(self.start)
  }

  /// Provides a reference to the element at the given index.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.push_back(1).unwrap();
  /// deque.push_back(3).unwrap();
  /// assert_eq!(deque.get(1), Some(&3));
  /// assert_eq!(deque.get(2), None);
  /// ```
  #[inline]
  pub fn get(&self, idx: usize) -> Option<&T> {
    if idx >= self.len() {
      return None;
    }
    self.get_at(self.cursor_at(idx))
  }

  /// Mutable version of [`Self::get`].
  #[inline]
  pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
    if idx >= self.len() {
      return None;
    }
    self.get_at_mut(self.cursor_at(idx))
  }

  /// Provides a reference to the element pointed by `cursor`, if any.
  #[inline]
  pub fn get_at(&self, cursor: Cursor<T, B>) -> Option<&T> {
    let elem = self.live_slot(cursor)?;
    // SAFETY: live slots are initialized
    unsafe { Some(&*elem) }
  }

  /// Mutable version of [`Self::get_at`].
  #[inline]
  pub fn get_at_mut(&mut self, cursor: Cursor<T, B>) -> Option<&mut T> {
    let elem = self.live_slot(cursor)?;
    // SAFETY: live slots are initialized and `self` is exclusively borrowed
    unsafe { Some(&mut *elem) }
  }

  /// Index of `cursor` relative to [`Self::begin`]. [`Self::end`] maps to [`Self::len`].
  #[inline]
  pub fn index_of(&self, cursor: Cursor<T, B>) -> Option<usize> {
    self.position(cursor).ok()
  }

  /// Inserts `value` before `pos`, returning the cursor of the inserted element.
  ///
  /// Insertions at the ends are delegated to [`Self::push_front`] and [`Self::push_back`],
  /// everything else shifts the elements of the shorter side.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 3]).unwrap();
  /// let cursor = deque.insert(deque.begin() + 1, 2).unwrap();
  /// assert_eq!(deque.get_at(cursor), Some(&2));
  /// assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
  /// ```
  #[inline]
  pub fn insert(&mut self, pos: Cursor<T, B>, value: T) -> crate::Result<Cursor<T, B>> {
    let index = self.position(pos)?;
    let len = self.len();
    if index == 0 {
      self.push_front(value)?;
      return Ok(self.start);
    }
    if index == len {
      self.push_back(value)?;
      let mut cursor = self.finish;
      cursor.retreat();
      return Ok(cursor);
    }
    if len >= self.max_size() {
      return Err(DequeError::LenOverflow.into());
    }
    if index < len / 2 {
      self.reserve_elements(true, 1)?;
      let mut new_start = self.start;
      new_start.retreat();
      let mut dst = new_start;
      for _ in 0..index {
        let mut src = dst;
        src.advance();
        // SAFETY: `src` is initialized and `dst` was vacated by the previous iteration or
        // reserved above
        unsafe {
          self.relocate_elem(src, dst);
        }
        dst = src;
      }
      // SAFETY: `dst` was vacated by the last iteration
      unsafe {
        self.write(dst, value);
      }
      self.start = new_start;
      Ok(dst)
    } else {
      self.reserve_elements(false, 1)?;
      let mut dst = self.finish;
      for _ in index..len {
        let mut src = dst;
        src.retreat();
        // SAFETY: `src` is initialized and `dst` was vacated by the previous iteration or
        // reserved above
        unsafe {
          self.relocate_elem(src, dst);
        }
        dst = src;
      }
      // SAFETY: `dst` was vacated by the last iteration
      unsafe {
        self.write(dst, value);
      }
      self.finish.advance();
      Ok(dst)
    }
  }

  /// Inserts `count` clones of `value` before `pos`, returning the cursor of the first inserted
  /// element.
  ///
  /// If an allocation fails or a clone panics, the instance is left untouched.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 2]).unwrap();
  /// let _ = deque.insert_n(deque.begin() + 1, 3, 0).unwrap();
  /// assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [1, 0, 0, 0, 2]);
  /// ```
  #[inline]
  pub fn insert_n(
    &mut self,
    pos: Cursor<T, B>,
    count: usize,
    value: T,
  ) -> crate::Result<Cursor<T, B>>
  where
    T: Clone,
  {
    let index = self.position(pos)?;
    if count == 0 {
      return Ok(self.cursor_at(index));
    }
    let len = self.len();
    if len.checked_add(count).is_none_or(|el| el > self.max_size()) {
      return Err(DequeError::LenOverflow.into());
    }
    let count_isize = count.cast_signed();
    let at_front = index < len.wrapping_sub(index);
    let staged = self.stage_nodes(self.missing_nodes(at_front, count))?;
    let begin = if at_front { self.start - count_isize } else { self.finish };
    let mut guard = FillGuard { at_front, begin, deque: &mut *self, staged, written: 0 };
    guard.fill(count, value);
    guard.attach()?;
    if at_front {
      let new_start = self.start - count_isize;
      for idx in 0..index {
        // SAFETY: positions are relative to `new_start` and all of them are initialized
        unsafe {
          self.swap_cursors(
            new_start + idx.cast_signed(),
            new_start + idx.wrapping_add(count).cast_signed(),
          );
        }
      }
      self.start = new_start;
    } else {
      for idx in (index..len).rev() {
        // SAFETY: positions are relative to `start` and all of them are initialized
        unsafe {
          self.swap_cursors(self.cursor_at(idx), self.cursor_at(idx.wrapping_add(count)));
        }
      }
      self.finish += count_isize;
    }
    Ok(self.cursor_at(index))
  }

  /// Returns `true` if there are no elements.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.start == self.finish
  }

  /// Returns a front-to-back iterator.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 2, 3]).unwrap();
  /// assert_eq!(deque.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
  /// ```
  #[inline]
  pub fn iter(&self) -> Iter<'_, T, A, B> {
    Iter::new(self)
  }

  /// Returns a front-to-back iterator that returns mutable references.
  #[inline]
  pub fn iter_mut(&mut self) -> IterMut<'_, T, B> {
    IterMut::new(&self.arena, &self.map, self.start, self.finish)
  }

  /// Number of elements.
  #[inline]
  pub fn len(&self) -> usize {
    self.finish.distance(&self.start).cast_unsigned()
  }

  /// Number of slots of the buffer map.
  #[inline]
  pub fn map_size(&self) -> usize {
    self.map.len()
  }

  /// Theoretical maximum number of elements.
  #[inline]
  pub fn max_size(&self) -> usize {
    let size = size_of::<T>();
    isize::MAX.cast_unsigned() / if size == 0 { 1 } else { size }
  }

  /// Number of attached buffers, including the partially occupied ones at both ends.
  #[inline]
  pub fn nodes_len(&self) -> usize {
    self.finish.node().wrapping_sub(self.start.node()).wrapping_add(1)
  }

  /// Removes the last element and returns it, or `None` if the instance is empty.
  ///
  /// The last buffer is released when it becomes empty.
  #[inline]
  pub fn pop_back(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }
    self.retract_back();
    // SAFETY: the slot left behind by `finish` contains the last element
    Some(unsafe { self.read(self.finish) })
  }

  /// Removes the first element and returns it, or `None` if the instance is empty.
  ///
  /// The first buffer is released when it becomes empty.
  #[inline]
  pub fn pop_front(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }
    // SAFETY: `start` points to the first element
    let elem = unsafe { self.read(self.start) };
    self.advance_front();
    Some(elem)
  }

  /// Appends an element to the back.
  #[inline]
  pub fn push_back(&mut self, value: T) -> crate::Result<()> {
    self.push_back_with(|| Ok::<_, crate::Error>(value))
  }

  /// Appends the element returned by `cb` to the back.
  ///
  /// `cb` is only called after every resource that doesn't depend on the element was secured. If
  /// `cb` fails or panics, the instance and all cursors remain untouched.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.push_back(1).unwrap();
  /// let end = deque.end();
  /// assert!(deque.push_back_with(|| Err(segdeque::Error::OutOfBoundsArithmetic)).is_err());
  /// assert_eq!((deque.len(), deque.end()), (1, end));
  /// ```
  #[inline]
  pub fn push_back_with<E, F>(&mut self, cb: F) -> Result<(), E>
  where
    E: From<crate::Error>,
    F: FnOnce() -> Result<T, E>,
  {
    if self.finish.offset().wrapping_add(1) < Self::CAPACITY {
      let value = cb()?;
      // SAFETY: `finish` always points to a vacant slot of an attached buffer
      unsafe {
        self.write(self.finish, value);
      }
      self.finish.advance();
      return Ok(());
    }
    self.push_back_slow(cb)
  }

  /// Prepends an element to the front.
  #[inline]
  pub fn push_front(&mut self, value: T) -> crate::Result<()> {
    self.push_front_with(|| Ok::<_, crate::Error>(value))
  }

  /// Prepends the element returned by `cb` to the front.
  ///
  /// Has the same guarantees of [`Self::push_back_with`].
  #[inline]
  pub fn push_front_with<E, F>(&mut self, cb: F) -> Result<(), E>
  where
    E: From<crate::Error>,
    F: FnOnce() -> Result<T, E>,
  {
    if self.start.offset() != 0 {
      let value = cb()?;
      let mut cursor = self.start;
      cursor.retreat();
      // SAFETY: the slot before `start` is vacant and lives in the same buffer
      unsafe {
        self.write(cursor, value);
      }
      self.start = cursor;
      return Ok(());
    }
    self.push_front_slow(cb)
  }

  /// Removes and returns the element at `idx`.
  ///
  /// ```rust
  /// let mut deque = segdeque::collection::Deque::new().unwrap();
  /// deque.extend_back_from_iter([1, 2, 3]).unwrap();
  /// assert_eq!(deque.remove(1), Some(2));
  /// assert_eq!(deque.remove(2), None);
  /// ```
  #[inline]
  pub fn remove(&mut self, idx: usize) -> Option<T> {
    if idx >= self.len() {
      return None;
    }
    Some(self.take(idx))
  }

  /// Shortens the instance, keeping the first `new_len` elements. Does nothing if `new_len` is
  /// equal or greater than the current length.
  #[inline]
  pub fn truncate_back(&mut self, new_len: usize) {
    let len = self.len();
    if new_len < len {
      self.cut_back(len.wrapping_sub(new_len));
    }
  }

  /// Shortens the instance, keeping the last `new_len` elements. Does nothing if `new_len` is
  /// equal or greater than the current length.
  #[inline]
  pub fn truncate_front(&mut self, new_len: usize) {
    let len = self.len();
    if new_len < len {
      self.cut_front(len.wrapping_sub(new_len));
    }
  }

  /// Fallible version of [`Clone::clone`] that uses a copy of the current allocator.
  #[inline]
  pub fn try_clone(&self) -> crate::Result<Self>
  where
    A: Clone,
    T: Clone,
  {
    let mut this = Self::with_allocator(self.allocator.clone())?;
    this.extend_back_from_iter(self.iter().cloned())?;
    Ok(this)
  }

  fn advance_front(&mut self) {
    if self.start.offset().wrapping_add(1) >= Self::CAPACITY {
      self.release_node(self.start.node());
    }
    self.start.advance();
  }

  // Makes the buffers of `staged` reachable through the map, right before `start` or right after
  // `finish`. Nothing changes if the map can not grow.
  fn attach_staged(&mut self, at_front: bool, staged: &[BufferHandle]) -> crate::Result<()> {
    if staged.is_empty() {
      return Ok(());
    }
    let (start, finish) = (self.start.node(), self.finish.node());
    let first = if at_front {
      self.map.reserve_at_front(&mut self.allocator, start, finish, staged.len())?
    } else {
      self.map.reserve_at_back(&mut self.allocator, start, finish, staged.len())?
    };
    self.relocate_nodes(first);
    for (idx, handle) in (1..).zip(staged.iter().copied()) {
      let node = if at_front {
        self.start.node().wrapping_sub(idx)
      } else {
        self.finish.node().wrapping_add(idx)
      };
      self.map.set(node, handle);
    }
    _trace!(nodes = staged.len(), at_front, "Attached buffers");
    Ok(())
  }

  fn cursor_at(&self, idx: usize) -> Cursor<T, B> {
    self.start + idx.cast_signed()
  }

  // Removes the last `n` elements. The buffer that ends up under `finish` is kept.
  fn cut_back(&mut self, n: usize) {
    let old_finish = self.finish;
    let new_finish = old_finish - n.cast_signed();
    self.finish = new_finish;
    // SAFETY: the range was initialized and is no longer part of the live range
    unsafe {
      self.drop_range(new_finish, old_finish);
    }
    for node in new_finish.node().wrapping_add(1)..=old_finish.node() {
      self.release_node(node);
    }
  }

  // Removes the first `n` elements. The buffer that ends up under `start` is kept.
  fn cut_front(&mut self, n: usize) {
    let old_start = self.start;
    let new_start = old_start + n.cast_signed();
    self.start = new_start;
    // SAFETY: the range was initialized and is no longer part of the live range
    unsafe {
      self.drop_range(old_start, new_start);
    }
    for node in old_start.node()..new_start.node() {
      self.release_node(node);
    }
  }

  // SAFETY: every slot of `[begin, end)` must be initialized and outside of the live range
  unsafe fn drop_range(&mut self, begin: Cursor<T, B>, end: Cursor<T, B>) {
    if !Self::NEEDS_DROP {
      return;
    }
    let mut cursor = begin;
    while cursor < end {
      // SAFETY: upheld by the caller
      unsafe {
        ptr::drop_in_place(self.slot(cursor));
      }
      cursor.advance();
    }
  }

  fn handle(&self, node: usize) -> BufferHandle {
    match self.map.get(node) {
      Some(elem) => elem,
      None => _unlikely_unreachable(),
    }
  }

  fn live_slot(&self, cursor: Cursor<T, B>) -> Option<*mut T> {
    if cursor.offset() >= Self::CAPACITY || cursor < self.start || cursor >= self.finish {
      return None;
    }
    let handle = self.map.get(cursor.node())?;
    Some(self.arena.slot(handle, cursor.offset()))
  }

  // Number of buffers that must be attached before `start` or after `finish` to hold `count` more
  // elements. `finish` must always point to a slot of an attached buffer.
  fn missing_nodes(&self, at_front: bool, count: usize) -> usize {
    let vacancies = if at_front {
      self.start.offset()
    } else {
      Self::CAPACITY.wrapping_sub(self.finish.offset()).wrapping_sub(1)
    };
    if count <= vacancies {
      return 0;
    }
    count.wrapping_sub(vacancies).div_ceil(Self::CAPACITY)
  }

  fn new_node(&mut self) -> crate::Result<BufferHandle> {
    self.arena.allocate(&mut self.allocator)
  }

  // Index of `cursor` if it is inside `[start, finish]`.
  fn position(&self, cursor: Cursor<T, B>) -> crate::Result<usize> {
    if cursor.offset() >= Self::CAPACITY || cursor < self.start || cursor > self.finish {
      return Err(DequeError::OutOfBoundsCursor.into());
    }
    Ok(cursor.distance(&self.start).cast_unsigned())
  }

  fn push_back_slow<E, F>(&mut self, cb: F) -> Result<(), E>
  where
    E: From<crate::Error>,
    F: FnOnce() -> Result<T, E>,
  {
    let handle = self.new_node()?;
    let value = {
      let guard = NodeGuard { allocator: &mut self.allocator, arena: &mut self.arena, handle };
      let value = cb()?;
      guard.disarm();
      value
    };
    if let Err(err) = self.attach_staged(false, &[handle]) {
      self.arena.deallocate(&mut self.allocator, handle);
      drop(value);
      return Err(err.into());
    }
    // SAFETY: `finish` always points to a vacant slot of an attached buffer
    unsafe {
      self.write(self.finish, value);
    }
    self.finish.advance();
    Ok(())
  }

  fn push_front_slow<E, F>(&mut self, cb: F) -> Result<(), E>
  where
    E: From<crate::Error>,
    F: FnOnce() -> Result<T, E>,
  {
    let handle = self.new_node()?;
    let value = {
      let guard = NodeGuard { allocator: &mut self.allocator, arena: &mut self.arena, handle };
      let value = cb()?;
      guard.disarm();
      value
    };
    if let Err(err) = self.attach_staged(true, &[handle]) {
      self.arena.deallocate(&mut self.allocator, handle);
      drop(value);
      return Err(err.into());
    }
    self.start.retreat();
    // SAFETY: `start` now points to the last slot of the attached buffer
    unsafe {
      self.write(self.start, value);
    }
    Ok(())
  }

  // SAFETY: `cursor` must point to an initialized slot that will be treated as vacant
  unsafe fn read(&mut self, cursor: Cursor<T, B>) -> T {
    // SAFETY: upheld by the caller
    unsafe { ptr::read(self.slot(cursor)) }
  }

  fn release_node(&mut self, node: usize) {
    if let Some(handle) = self.map.take(node) {
      self.arena.deallocate(&mut self.allocator, handle);
    }
  }

  fn release_staged(&mut self, staged: &mut Vector<BufferHandle>) {
    while let Some(handle) = staged.pop() {
      self.arena.deallocate(&mut self.allocator, handle);
    }
  }

  // SAFETY: `src` must be initialized and `dst` must be vacant
  unsafe fn relocate_elem(&mut self, src: Cursor<T, B>, dst: Cursor<T, B>) {
    // SAFETY: upheld by the caller
    unsafe {
      let elem = self.read(src);
      self.write(dst, elem);
    }
  }

  fn relocate_nodes(&mut self, first: usize) {
    let nodes = self.finish.node().wrapping_sub(self.start.node());
    self.start = Cursor::new(first, self.start.offset());
    self.finish = Cursor::new(first.wrapping_add(nodes), self.finish.offset());
  }

  // Attaches enough buffers before `start` or after `finish` to hold `count` more elements.
  fn reserve_elements(&mut self, at_front: bool, count: usize) -> crate::Result<()> {
    let mut staged = self.stage_nodes(self.missing_nodes(at_front, count))?;
    if let Err(err) = self.attach_staged(at_front, &staged) {
      self.release_staged(&mut staged);
      return Err(err);
    }
    Ok(())
  }

  fn retract_back(&mut self) {
    if self.finish.offset() == 0 {
      self.release_node(self.finish.node());
    }
    self.finish.retreat();
  }

  fn slot(&self, cursor: Cursor<T, B>) -> *mut T {
    self.arena.slot(self.handle(cursor.node()), cursor.offset())
  }

  // Allocates `nodes` buffers that are not reachable through the map.
  fn stage_nodes(&mut self, nodes: usize) -> crate::Result<Vector<BufferHandle>> {
    let mut staged = Vector::new();
    staged.reserve(nodes)?;
    for _ in 0..nodes {
      let handle = match self.new_node() {
        Ok(elem) => elem,
        Err(err) => {
          self.release_staged(&mut staged);
          return Err(err);
        }
      };
      if let Err(err) = staged.push(handle) {
        self.arena.deallocate(&mut self.allocator, handle);
        self.release_staged(&mut staged);
        return Err(err);
      }
    }
    Ok(staged)
  }

  // Slot of `cursor`, which may belong to one of the `staged` buffers that were not attached yet.
  fn staged_slot(&self, at_front: bool, staged: &[BufferHandle], cursor: Cursor<T, B>) -> *mut T {
    let distance = if at_front {
      self.start.node().wrapping_sub(cursor.node())
    } else {
      cursor.node().wrapping_sub(self.finish.node())
    };
    let Some(idx) = distance.checked_sub(1) else {
      return self.slot(cursor);
    };
    match staged.get(idx) {
      Some(handle) => self.arena.slot(*handle, cursor.offset()),
      None => _unlikely_unreachable(),
    }
  }

  // SAFETY: both cursors must point to initialized slots
  unsafe fn swap_cursors(&mut self, a: Cursor<T, B>, b: Cursor<T, B>) {
    // SAFETY: upheld by the caller
    unsafe {
      ptr::swap(self.slot(a), self.slot(b));
    }
  }

  // SAFETY: both indices must be lower than the current length
  unsafe fn swap_positions(&mut self, a: usize, b: usize) {
    // SAFETY: upheld by the caller
    unsafe {
      self.swap_cursors(self.cursor_at(a), self.cursor_at(b));
    }
  }

  // Moves the element at `index` out, closing the gap with the elements of the shorter side.
  fn take(&mut self, index: usize) -> T {
    let len = self.len();
    let pos = self.cursor_at(index);
    // SAFETY: `index` is lower than the current length
    let elem = unsafe { self.read(pos) };
    let mut dst = pos;
    if index < len / 2 {
      for _ in 0..index {
        let mut src = dst;
        src.retreat();
        // SAFETY: `src` is initialized and `dst` was vacated
        unsafe {
          self.relocate_elem(src, dst);
        }
        dst = src;
      }
      self.advance_front();
    } else {
      for _ in index.wrapping_add(1)..len {
        let mut src = dst;
        src.advance();
        // SAFETY: `src` is initialized and `dst` was vacated
        unsafe {
          self.relocate_elem(src, dst);
        }
        dst = src;
      }
      self.retract_back();
    }
    elem
  }

  // Empty instance with enough attached buffers to store `elements` without further allocations.
  fn with_nodes(mut allocator: A, elements: usize) -> crate::Result<Self> {
    let nodes = (elements / Self::CAPACITY).wrapping_add(1);
    let map_len = nodes.checked_add(2).ok_or(DequeError::LenOverflow)?.max(BufferMap::INITIAL_LEN);
    let map = BufferMap::new(&mut allocator, map_len)?;
    let first = map_len.wrapping_sub(nodes) / 2;
    let mut this = Self {
      allocator,
      arena: Arena::new(Self::CAPACITY),
      finish: Cursor::new(first, 0),
      map,
      start: Cursor::new(first, 0),
    };
    for node in first..first.wrapping_add(nodes) {
      let handle = this.new_node()?;
      this.map.set(node, handle);
    }
    _debug!(map_len, nodes, "Created deque");
    Ok(this)
  }

  // SAFETY: `cursor` must point to a vacant slot of an attached buffer
  unsafe fn write(&mut self, cursor: Cursor<T, B>, value: T) {
    // SAFETY: upheld by the caller
    unsafe {
      ptr::write(self.slot(cursor), value);
    }
  }
}

#[cfg(feature = "arbitrary")]
impl<'any, T, const B: usize> arbitrary::Arbitrary<'any> for Deque<T, Global, B>
where
  T: arbitrary::Arbitrary<'any>,
{
  #[inline]
  fn arbitrary(u: &mut arbitrary::Unstructured<'any>) -> arbitrary::Result<Self> {
    let mut this = Self::with_allocator(Global).map_err(|_err| arbitrary::Error::IncorrectFormat)?;
    for rslt in u.arbitrary_iter::<(bool, T)>()? {
      let (at_front, elem) = rslt?;
      let pushed = if at_front { this.push_front(elem) } else { this.push_back(elem) };
      pushed.map_err(|_err| arbitrary::Error::IncorrectFormat)?;
    }
    Ok(this)
  }
}

impl<T, A, const B: usize> Debug for Deque<T, A, B>
where
  A: Allocator,
  T: Debug,
{
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T, A, const B: usize> Drop for Deque<T, A, B>
where
  A: Allocator,
{
  #[inline]
  fn drop(&mut self) {
    struct Guard<'any, T, A, const B: usize>(&'any mut Deque<T, A, B>)
    where
      A: Allocator;

    impl<T, A, const B: usize> Drop for Guard<'_, T, A, B>
    where
      A: Allocator,
    {
      fn drop(&mut self) {
        let Deque { allocator, arena, map, .. } = &mut *self.0;
        arena.release_all(allocator);
        map.release(allocator);
      }
    }

    let begin = self.start;
    let end = self.finish;
    self.finish = begin;
    let guard = Guard(self);
    // SAFETY: `[begin, end)` was the live range
    unsafe {
      guard.0.drop_range(begin, end);
    }
  }
}

impl<T, A, const B: usize> Eq for Deque<T, A, B>
where
  A: Allocator,
  T: Eq,
{
}

impl<T, A, const B: usize> Index<usize> for Deque<T, A, B>
where
  A: Allocator,
{
  type Output = T;

  #[inline]
  fn index(&self, idx: usize) -> &Self::Output {
    match self.get(idx) {
      Some(elem) => elem,
      None => index_out_of_bounds(idx, self.len()),
    }
  }
}

impl<T, A, const B: usize> IndexMut<usize> for Deque<T, A, B>
where
  A: Allocator,
{
  #[inline]
  fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
    let len = self.len();
    match self.get_mut(idx) {
      Some(elem) => elem,
      None => index_out_of_bounds(idx, len),
    }
  }
}

impl<T, A, const B: usize> PartialEq for Deque<T, A, B>
where
  A: Allocator,
  T: PartialEq,
{
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && self.iter().eq(other.iter())
  }
}

impl<'any, T, A, const B: usize> IntoIterator for &'any Deque<T, A, B>
where
  A: Allocator,
{
  type IntoIter = Iter<'any, T, A, B>;
  type Item = &'any T;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'any, T, A, const B: usize> IntoIterator for &'any mut Deque<T, A, B>
where
  A: Allocator,
{
  type IntoIter = IterMut<'any, T, B>;
  type Item = &'any mut T;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter_mut()
  }
}

impl<T, A, const B: usize> IntoIterator for Deque<T, A, B>
where
  A: Allocator,
{
  type IntoIter = IntoIter<T, A, B>;
  type Item = T;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    IntoIter::new(self)
  }
}

// Fills freshly reserved slots. Dropping an armed guard drops the written elements and releases
// the buffers attached for them.
struct FillGuard<'any, T, A, const B: usize>
where
  A: Allocator,
{
  at_front: bool,
  begin: Cursor<T, B>,
  deque: &'any mut Deque<T, A, B>,
  staged: Vector<BufferHandle>,
  written: usize,
}

impl<T, A, const B: usize> FillGuard<'_, T, A, B>
where
  A: Allocator,
{
  // Hands the written elements and the staged buffers over to the deque. Everything is released
  // if the map can not grow.
  fn attach(mut self) -> crate::Result<()> {
    self.deque.attach_staged(self.at_front, &self.staged)?;
    self.staged = Vector::new();
    self.written = 0;
    Ok(())
  }

  fn fill(&mut self, count: usize, value: T)
  where
    T: Clone,
  {
    let mut cursor = self.begin;
    for _ in 1..count {
      let elem = value.clone();
      self.write(cursor, elem);
      cursor.advance();
    }
    self.write(cursor, value);
  }

  fn write(&mut self, cursor: Cursor<T, B>, elem: T) {
    let slot = self.deque.staged_slot(self.at_front, &self.staged, cursor);
    // SAFETY: slots outside of the live range are vacant
    unsafe {
      ptr::write(slot, elem);
    }
    self.written = self.written.wrapping_add(1);
  }
}

impl<T, A, const B: usize> Drop for FillGuard<'_, T, A, B>
where
  A: Allocator,
{
  fn drop(&mut self) {
    if Deque::<T, A, B>::NEEDS_DROP {
      let mut cursor = self.begin;
      for _ in 0..self.written {
        let slot = self.deque.staged_slot(self.at_front, &self.staged, cursor);
        // SAFETY: `[begin, begin + written)` was initialized by `fill`
        unsafe {
          ptr::drop_in_place(slot);
        }
        cursor.advance();
      }
    }
    self.deque.release_staged(&mut self.staged);
  }
}

// Releases a speculative buffer unless disarmed.
struct NodeGuard<'any, A, T>
where
  A: Allocator,
{
  allocator: &'any mut A,
  arena: &'any mut Arena<T>,
  handle: BufferHandle,
}

impl<A, T> NodeGuard<'_, A, T>
where
  A: Allocator,
{
  fn disarm(self) {
    core::mem::forget(self);
  }
}

impl<A, T> Drop for NodeGuard<'_, A, T>
where
  A: Allocator,
{
  fn drop(&mut self) {
    self.arena.deallocate(&mut *self.allocator, self.handle);
  }
}

#[cold]
#[inline(never)]
#[track_caller]
fn index_out_of_bounds(idx: usize, len: usize) -> ! {
  panic!("index out of bounds: the len is {len} but the index is {idx}");
}
