use crate::{
  allocator::{Allocator, Global},
  collection::Deque,
};

/// First-in, first-out adapter over [`Deque`].
///
/// ```rust
/// let mut queue = segdeque::collection::Queue::new().unwrap();
/// queue.push(1).unwrap();
/// queue.push(2).unwrap();
/// assert_eq!(queue.pop(), Some(1));
/// ```
#[derive(Debug, PartialEq)]
pub struct Queue<T, A = Global, const B: usize = 0>
where
  A: Allocator,
{
  deque: Deque<T, A, B>,
}

impl<T> Queue<T, Global, 0> {
  /// Creates a new empty instance backed by the global allocator.
  #[inline]
  pub fn new() -> crate::Result<Self> {
    Ok(Self { deque: Deque::new()? })
  }
}

impl<T, A, const B: usize> Queue<T, A, B>
where
  A: Allocator,
{
  /// Uses `deque` as the underlying storage. The front of `deque` is the next element to leave.
  #[inline]
  pub const fn from_deque(deque: Deque<T, A, B>) -> Self {
    Self { deque }
  }

  /// Underlying storage.
  #[inline]
  pub const fn as_deque(&self) -> &Deque<T, A, B> {
    &self.deque
  }

  /// Most recently inserted element.
  #[inline]
  pub fn back(&self) -> Option<&T> {
    self.deque.back()
  }

  /// Next element to leave.
  #[inline]
  pub fn front(&self) -> Option<&T> {
    self.deque.front()
  }

  /// Consumes the instance, returning the underlying storage.
  #[inline]
  pub fn into_deque(self) -> Deque<T, A, B> {
    self.deque
  }

  /// Returns `true` if there are no elements.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.deque.is_empty()
  }

  /// Number of elements.
  #[inline]
  pub fn len(&self) -> usize {
    self.deque.len()
  }

  /// Removes the oldest element.
  #[inline]
  pub fn pop(&mut self) -> Option<T> {
    self.deque.pop_front()
  }

  /// Inserts an element after every other element.
  #[inline]
  pub fn push(&mut self, value: T) -> crate::Result<()> {
    self.deque.push_back(value)
  }
}
