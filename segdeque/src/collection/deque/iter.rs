use crate::{
  allocator::Allocator,
  collection::{Deque, arena::Arena, buffer_map::BufferMap, cursor::Cursor},
};
use core::{
  fmt::{Debug, Formatter},
  iter::FusedIterator,
  marker::PhantomData,
};

/// Immutable front-to-back iterator of [`Deque`].
pub struct Iter<'any, T, A, const B: usize>
where
  A: Allocator,
{
  back: Cursor<T, B>,
  deque: &'any Deque<T, A, B>,
  front: Cursor<T, B>,
}

impl<'any, T, A, const B: usize> Iter<'any, T, A, B>
where
  A: Allocator,
{
  pub(crate) fn new(deque: &'any Deque<T, A, B>) -> Self {
    Self { back: deque.end(), deque, front: deque.begin() }
  }
}

impl<T, A, const B: usize> Clone for Iter<'_, T, A, B>
where
  A: Allocator,
{
  #[inline]
  fn clone(&self) -> Self {
    Self { back: self.back, deque: self.deque, front: self.front }
  }
}

impl<T, A, const B: usize> Debug for Iter<'_, T, A, B>
where
  A: Allocator,
  T: Debug,
{
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    f.debug_list().entries(self.clone()).finish()
  }
}

impl<T, A, const B: usize> DoubleEndedIterator for Iter<'_, T, A, B>
where
  A: Allocator,
{
  #[inline]
  fn next_back(&mut self) -> Option<Self::Item> {
    if self.front == self.back {
      return None;
    }
    self.back.retreat();
    self.deque.get_at(self.back)
  }
}

impl<T, A, const B: usize> ExactSizeIterator for Iter<'_, T, A, B> where A: Allocator {}

impl<T, A, const B: usize> FusedIterator for Iter<'_, T, A, B> where A: Allocator {}

impl<'any, T, A, const B: usize> Iterator for Iter<'any, T, A, B>
where
  A: Allocator,
{
  type Item = &'any T;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.front == self.back {
      return None;
    }
    let elem = self.deque.get_at(self.front);
    self.front.advance();
    elem
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.back.distance(&self.front).cast_unsigned();
    (len, Some(len))
  }
}

/// Mutable front-to-back iterator of [`Deque`].
pub struct IterMut<'any, T, const B: usize> {
  arena: &'any Arena<T>,
  back: Cursor<T, B>,
  front: Cursor<T, B>,
  map: &'any BufferMap,
  phantom: PhantomData<&'any mut T>,
}

impl<'any, T, const B: usize> IterMut<'any, T, B> {
  pub(crate) fn new(
    arena: &'any Arena<T>,
    map: &'any BufferMap,
    front: Cursor<T, B>,
    back: Cursor<T, B>,
  ) -> Self {
    Self { arena, back, front, map, phantom: PhantomData }
  }

  fn elem(&self, cursor: Cursor<T, B>) -> Option<&'any mut T> {
    let handle = self.map.get(cursor.node())?;
    // SAFETY: `cursor` is inside the live range and each position is visited only once, as such,
    // no other reference to the same element exists
    unsafe { Some(&mut *self.arena.slot(handle, cursor.offset())) }
  }
}

impl<T, const B: usize> Debug for IterMut<'_, T, B> {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("IterMut").field("back", &self.back).field("front", &self.front).finish()
  }
}

impl<T, const B: usize> DoubleEndedIterator for IterMut<'_, T, B> {
  #[inline]
  fn next_back(&mut self) -> Option<Self::Item> {
    if self.front == self.back {
      return None;
    }
    self.back.retreat();
    self.elem(self.back)
  }
}

impl<T, const B: usize> ExactSizeIterator for IterMut<'_, T, B> {}

impl<T, const B: usize> FusedIterator for IterMut<'_, T, B> {}

impl<'any, T, const B: usize> Iterator for IterMut<'any, T, B> {
  type Item = &'any mut T;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.front == self.back {
      return None;
    }
    let elem = self.elem(self.front);
    self.front.advance();
    elem
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.back.distance(&self.front).cast_unsigned();
    (len, Some(len))
  }
}

// SAFETY: yields exclusive references, just like `&mut T`
unsafe impl<T, const B: usize> Send for IterMut<'_, T, B> where T: Send {}
// SAFETY: shared access doesn't expose elements
unsafe impl<T, const B: usize> Sync for IterMut<'_, T, B> where T: Sync {}

/// A by-value iterator of [`Deque`].
pub struct IntoIter<T, A, const B: usize>
where
  A: Allocator,
{
  deque: Deque<T, A, B>,
}

impl<T, A, const B: usize> IntoIter<T, A, B>
where
  A: Allocator,
{
  pub(crate) fn new(deque: Deque<T, A, B>) -> Self {
    Self { deque }
  }
}

impl<T, A, const B: usize> Debug for IntoIter<T, A, B>
where
  A: Allocator,
  T: Debug,
{
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("IntoIter").field(&self.deque).finish()
  }
}

impl<T, A, const B: usize> DoubleEndedIterator for IntoIter<T, A, B>
where
  A: Allocator,
{
  #[inline]
  fn next_back(&mut self) -> Option<Self::Item> {
    self.deque.pop_back()
  }
}

impl<T, A, const B: usize> ExactSizeIterator for IntoIter<T, A, B> where A: Allocator {}

impl<T, A, const B: usize> FusedIterator for IntoIter<T, A, B> where A: Allocator {}

impl<T, A, const B: usize> Iterator for IntoIter<T, A, B>
where
  A: Allocator,
{
  type Item = T;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self.deque.pop_front()
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.deque.len();
    (len, Some(len))
  }
}
