use crate::{
  allocator::{Allocator, Global},
  collection::Deque,
};

/// Last-in, first-out adapter over [`Deque`].
///
/// ```rust
/// let mut stack = segdeque::collection::Stack::new().unwrap();
/// stack.push(1).unwrap();
/// stack.push(2).unwrap();
/// assert_eq!(stack.pop(), Some(2));
/// ```
#[derive(Debug, PartialEq)]
pub struct Stack<T, A = Global, const B: usize = 0>
where
  A: Allocator,
{
  deque: Deque<T, A, B>,
}

impl<T> Stack<T, Global, 0> {
  /// Creates a new empty instance backed by the global allocator.
  #[inline]
  pub fn new() -> crate::Result<Self> {
    Ok(Self { deque: Deque::new()? })
  }
}

impl<T, A, const B: usize> Stack<T, A, B>
where
  A: Allocator,
{
  /// Uses `deque` as the underlying storage. The back of `deque` is the top of the stack.
  #[inline]
  pub const fn from_deque(deque: Deque<T, A, B>) -> Self {
    Self { deque }
  }

  /// Underlying storage.
  #[inline]
  pub const fn as_deque(&self) -> &Deque<T, A, B> {
    &self.deque
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

  /// Removes the most recently inserted element.
  #[inline]
  pub fn pop(&mut self) -> Option<T> {
    self.deque.pop_back()
  }

  /// Inserts an element on top of every other element.
  #[inline]
  pub fn push(&mut self, value: T) -> crate::Result<()> {
    self.deque.push_back(value)
  }

  /// Most recently inserted element.
  #[inline]
  pub fn top(&self) -> Option<&T> {
    self.deque.back()
  }

  /// Mutable version of [`Self::top`].
  #[inline]
  pub fn top_mut(&mut self) -> Option<&mut T> {
    self.deque.back_mut()
  }
}
