// N = Node of the buffer map
// S = Start (inclusive)
// F = Finish (exclusive)
//
// Unless stated otherwise, instances store `i32` in buffers of 4 elements and begin at node 3,
// the middle of a map of 8 slots.

extern crate std;

use crate::{
  Error,
  allocator::{AllocatorError, Global, Metered},
  collection::{Cursor, Deque, DequeError},
};
use alloc::{format, rc::Rc, vec::Vec};
use core::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};

type D4 = Deque<i32, Metered, 4>;

#[test]
fn clear_keeps_start_buffer_and_position() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..10).unwrap();
  deque.push_front(-1).unwrap();
  let begin = deque.begin();
  assert_eq!((begin.node(), begin.offset()), (2, 3));
  assert_eq!(deque.nodes_len(), 4);
  deque.clear();
  assert!(deque.is_empty());
  assert_eq!((deque.begin(), deque.end()), (begin, begin));
  assert_eq!(deque.nodes_len(), 1);
  assert_eq!(deque.allocator().live(), 2);
  deque.push_back(7).unwrap();
  deque.push_front(6).unwrap();
  assert_eq!(elems(&deque), [6, 7]);
}

#[test]
fn constructor_failure_keeps_state() {
  let mut deque = deque();
  deque.extend_back_from_iter([1, 2, 3]).unwrap();
  let before = snapshot(&deque);
  let cursor = deque.begin() + 1;
  let back: Result<(), Error> = deque.push_back_with(|| Err(Error::OutOfBoundsArithmetic));
  assert_eq!(back, Err(Error::OutOfBoundsArithmetic));
  let front: Result<(), Error> = deque.push_front_with(|| Err(Error::OutOfBoundsArithmetic));
  assert_eq!(front, Err(Error::OutOfBoundsArithmetic));
  assert_eq!(snapshot(&deque), before);
  assert_eq!(deque.get_at(cursor), Some(&2));
  assert_eq!(elems(&deque), [1, 2, 3]);
}

#[test]
fn constructor_panic_keeps_state() {
  let mut deque = deque();
  deque.extend_back_from_iter([1, 2, 3]).unwrap();
  let before = snapshot(&deque);
  let rslt = catch_unwind(AssertUnwindSafe(|| {
    deque.push_back_with(|| -> crate::Result<i32> { panic!("constructor") })
  }));
  assert!(rslt.is_err());
  assert_eq!(snapshot(&deque), before);
  deque.push_back(4).unwrap();
  assert_eq!(elems(&deque), [1, 2, 3, 4]);
}

#[test]
fn creation_failure_releases_everything() {
  let mut allocator = Metered::with_limit(Global, 0);
  assert_eq!(
    Deque::<i32, _, 4>::with_allocator(&mut allocator).err(),
    Some(Error::AllocatorError(AllocatorError::LimitReached))
  );
  allocator.set_limit(Some(2));
  assert!(Deque::<i32, _, 4>::from_elem_in(8, 1, &mut allocator).is_err());
  assert_eq!(allocator.live(), 0);
  assert_eq!(allocator.allocations(), 2);
}

#[test]
fn cursor_access_matches_index_access() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..20).unwrap();
  deque.extend_front_from_iter(20..25).unwrap();
  let begin = deque.begin();
  for idx in 0..deque.len() {
    let cursor = begin + isize::try_from(idx).unwrap();
    assert_eq!(Some(&deque[idx]), deque.get_at(cursor));
    assert_eq!(deque.index_of(cursor), Some(idx));
  }
  assert_eq!(deque.end() - deque.begin(), 25);
  assert_eq!(deque.index_of(deque.end()), Some(25));
  assert_eq!(deque.index_of(deque.end() + 1), None);
  assert_eq!(deque.index_of(deque.begin() - 1), None);
  assert_eq!(deque.get_at(deque.end()), None);
  deque[0] = 100;
  if let Some(elem) = deque.get_at_mut(begin + 1) {
    *elem = 101;
  }
  assert_eq!(elems(&deque)[..3], [100, 101, 22]);
}

#[test]
fn drops_every_element_once() {
  let drops = Rc::new(Cell::new(0));
  let mut deque = Deque::<_, _, 4>::with_allocator(Global).unwrap();
  for _ in 0..20 {
    deque.push_back(Counter(drops.clone())).unwrap();
  }
  let _ = deque.erase(deque.begin() + 3).unwrap();
  assert_eq!(drops.get(), 1);
  let _ = deque.erase_range(deque.begin(), deque.begin() + 4).unwrap();
  assert_eq!(drops.get(), 5);
  deque.truncate_back(10);
  assert_eq!(drops.get(), 10);
  drop(deque.pop_front());
  assert_eq!(drops.get(), 11);
  drop(deque);
  assert_eq!(drops.get(), 20);
}

#[test]
fn erase_range_at_back_only_moves_suffix() {
  // [S 0  1  2  3] [4  5  6  7] [8  9 10 11] [12 13 14 15] [F . . .]: N3 to N7
  // [S 0  1  2  3] [4  5  6  7] [8  9 14 15] [F  .  .  . ]: N3 to N6
  let mut deque = deque();
  deque.extend_back_from_iter(0..16).unwrap();
  let prefix = deque.begin() + 2;
  let cursor = deque.erase_range(deque.begin() + 10, deque.begin() + 14).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&14));
  assert_eq!(deque.get_at(prefix), Some(&2));
  assert_eq!(elems(&deque), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 14, 15]);
  assert_eq!((deque.nodes_len(), deque.allocator().live()), (4, 5));
}

#[test]
fn erase_range_at_front_only_moves_prefix() {
  // [S 0  1  2  3] [4  5  6  7] [8  9 10 11] [12 13 14 15] [F . . .]: N3 to N7
  // [S 0  9 10 11] [12 13 14 15] [F . . .]: N5 to N7
  let mut deque = deque();
  deque.extend_back_from_iter(0..16).unwrap();
  assert_eq!((deque.nodes_len(), deque.allocator().live()), (5, 6));
  let suffix = deque.begin() + 12;
  let cursor = deque.erase_range(deque.begin() + 1, deque.begin() + 9).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&9));
  assert_eq!(deque.get_at(suffix), Some(&12));
  assert_eq!(elems(&deque), [0, 9, 10, 11, 12, 13, 14, 15]);
  assert_eq!((deque.begin().node(), deque.begin().offset()), (5, 0));
  assert_eq!((deque.nodes_len(), deque.allocator().live()), (3, 4));
}

#[test]
fn erase_range_edge_cases() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..6).unwrap();
  let begin = deque.begin();
  assert_eq!(deque.erase_range(begin + 2, begin + 2).unwrap(), begin + 2);
  assert_eq!(
    deque.erase_range(begin + 3, begin + 2),
    Err(Error::DequeError(DequeError::OutOfBoundsRange))
  );
  assert_eq!(
    deque.erase_range(begin, begin + 7),
    Err(Error::DequeError(DequeError::OutOfBoundsRange))
  );
  assert_eq!(elems(&deque), [0, 1, 2, 3, 4, 5]);
  let end = deque.erase_range(deque.begin(), deque.end()).unwrap();
  assert_eq!((deque.len(), end), (0, deque.end()));
  assert_eq!(deque.begin(), begin);
}

#[test]
fn erase_shifts_shorter_side() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..9).unwrap();
  let last = deque.begin() + 8;
  let cursor = deque.erase(deque.begin() + 1).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&2));
  assert_eq!(deque.get_at(last), Some(&8));
  let first = deque.begin();
  let cursor = deque.erase(deque.begin() + 6).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&8));
  assert_eq!(deque.get_at(first), Some(&0));
  assert_eq!(elems(&deque), [0, 2, 3, 4, 5, 6, 8]);
  assert_eq!(deque.erase(deque.end()), Err(Error::DequeError(DequeError::OutOfBoundsCursor)));
}

#[test]
fn extend_and_iterate() {
  let mut deque = deque();
  deque.extend_back_from_iter([3, 4, 5]).unwrap();
  deque.extend_front_from_iter([2, 1, 0]).unwrap();
  assert_eq!(elems(&deque), [0, 1, 2, 3, 4, 5]);
  assert_eq!(deque.iter().len(), 6);
  assert_eq!(deque.iter().rev().copied().collect::<Vec<_>>(), [5, 4, 3, 2, 1, 0]);
  for elem in deque.iter_mut() {
    *elem *= 2;
  }
  let mut iter = deque.iter_mut();
  if let Some(elem) = iter.next_back() {
    *elem = 0;
  }
  assert_eq!(iter.len(), 5);
  assert_eq!(elems(&deque), [0, 2, 4, 6, 8, 0]);
  assert_eq!(format!("{deque:?}"), "[0, 2, 4, 6, 8, 0]");
  let mut into_iter = deque.into_iter();
  assert_eq!(into_iter.next_back(), Some(0));
  assert_eq!(into_iter.collect::<Vec<_>>(), [0, 2, 4, 6, 8]);
}

#[test]
fn from_elem_fills_a_single_buffer() {
  let deque = Deque::<_, _, 32>::from_elem_in(20, 9, Global).unwrap();
  assert_eq!(deque.len(), 20);
  assert_eq!(deque.buffer_capacity(), 32);
  assert_eq!(deque.nodes_len(), 1);
  assert_eq!(deque.map_size(), 8);
  assert_eq!(deque.begin() + 20, deque.end());
  assert!(deque.iter().all(|elem| *elem == 9));
  let deque = Deque::<_, _, 4>::from_elem_in(8, 1u8, Global).unwrap();
  assert_eq!((deque.nodes_len(), deque.end().offset()), (3, 0));
}

#[test]
fn insert_n_at_back() {
  // [S 0  1  2  3] [4  5  6  7] [8  9  F  .]
  // [S 0  1  2  3] [4  5  6  7] [7  7  7  8] [9  F  .  .]
  let mut deque = deque();
  deque.extend_back_from_iter(0..10).unwrap();
  let cursor = deque.insert_n(deque.begin() + 8, 3, 7).unwrap();
  assert_eq!(deque.index_of(cursor), Some(8));
  assert_eq!(elems(&deque), [0, 1, 2, 3, 4, 5, 6, 7, 7, 7, 7, 8, 9]);
  assert_eq!(deque.nodes_len(), 4);
}

#[test]
fn insert_n_at_front() {
  // [S 0  1  2  3] [4  5  6  7] [8  9  F  .]
  // [.  . S 0 42] [42 42 42 42] [42 1  2  3] [4  5  6  7] [8  9  F  .]
  let mut deque = deque();
  deque.extend_back_from_iter(0..10).unwrap();
  let cursor = deque.insert_n(deque.begin() + 1, 6, 42).unwrap();
  assert_eq!(deque.index_of(cursor), Some(1));
  assert_eq!(elems(&deque), [0, 42, 42, 42, 42, 42, 42, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
  assert_eq!((deque.begin().node(), deque.begin().offset()), (1, 2));
  assert_eq!(deque.map_size(), 8);
  assert_eq!(deque.insert_n(deque.end(), 0, 1).unwrap(), deque.end());
}

#[test]
fn insert_n_with_panicking_clone_keeps_state() {
  let clones_left = Rc::new(Cell::new(usize::MAX));
  let drops = Rc::new(Cell::new(0));
  let fuse = Fuse { clones_left: clones_left.clone(), drops: drops.clone() };
  let mut deque = Deque::<_, _, 4>::with_allocator(Metered::new(Global)).unwrap();
  for _ in 0..3 {
    deque.push_back(fuse.clone()).unwrap();
  }
  let before = (deque.len(), deque.begin(), deque.end(), deque.allocator().live());
  clones_left.set(2);
  let rslt = catch_unwind(AssertUnwindSafe(|| deque.insert_n(deque.begin() + 1, 5, fuse)));
  assert!(rslt.is_err());
  assert_eq!(drops.get(), 3);
  assert_eq!((deque.len(), deque.begin(), deque.end(), deque.allocator().live()), before);
  drop(deque);
  assert_eq!(drops.get(), 6);
}

#[test]
fn insert_n_with_panicking_clone_keeps_map_and_cursors() {
  // [S x x x F]: N3
  //
  // 20 elements at the front would need 5 more buffers and a bigger map.
  let clones_left = Rc::new(Cell::new(usize::MAX));
  let drops = Rc::new(Cell::new(0));
  let fuse = Fuse { clones_left: clones_left.clone(), drops: drops.clone() };
  let mut deque = Deque::<_, _, 4>::with_allocator(Metered::new(Global)).unwrap();
  for _ in 0..3 {
    deque.push_back(fuse.clone()).unwrap();
  }
  let third = deque.begin() + 2;
  let before = (deque.len(), deque.begin(), deque.end(), deque.map_size());
  assert_eq!((before.1.node(), before.3), (3, 8));
  let live = deque.allocator().live();
  clones_left.set(2);
  let rslt = catch_unwind(AssertUnwindSafe(|| deque.insert_n(deque.begin() + 1, 20, fuse)));
  assert!(rslt.is_err());
  assert_eq!(drops.get(), 3);
  assert_eq!((deque.len(), deque.begin(), deque.end(), deque.map_size()), before);
  assert_eq!(deque.allocator().live(), live);
  assert_eq!(deque.index_of(third), Some(2));
  assert!(deque.get_at(third).is_some());
  clones_left.set(usize::MAX);
  let cursor = deque.insert_n(deque.begin() + 1, 20, deque[0].clone()).unwrap();
  assert_eq!(deque.index_of(cursor), Some(1));
  assert_eq!(deque.len(), 23);
  assert_eq!(deque.map_size(), 18);
}

#[test]
fn insert_n_with_map_growth_failure_keeps_state() {
  // Staging 5 buffers reaches the limit, so the map can not grow afterwards.
  let mut deque = Deque::<i32, _, 4>::with_allocator(Metered::with_limit(Global, 7)).unwrap();
  deque.extend_back_from_iter([1, 2, 3]).unwrap();
  let before = snapshot(&deque);
  let third = deque.begin() + 2;
  assert_eq!(
    deque.insert_n(deque.begin() + 1, 20, 0),
    Err(Error::AllocatorError(AllocatorError::LimitReached))
  );
  assert_eq!(snapshot(&deque), before);
  assert_eq!(deque.get_at(third), Some(&3));
  assert_eq!(elems(&deque), [1, 2, 3]);
  assert_eq!(deque.allocator().allocations(), 7);
  assert_eq!(deque.allocator().deallocations(), 5);
}

#[test]
fn insert_with_allocation_failure_keeps_state() {
  // [S 1 2 3 F]: N3
  let mut deque = Deque::<i32, _, 4>::with_allocator(Metered::with_limit(Global, 2)).unwrap();
  deque.extend_back_from_iter([1, 2, 3]).unwrap();
  let before = snapshot(&deque);
  let second = deque.begin() + 1;
  assert_eq!(
    deque.insert(deque.begin() + 2, 0),
    Err(Error::AllocatorError(AllocatorError::LimitReached))
  );
  assert_eq!(snapshot(&deque), before);
  assert_eq!(deque.get_at(second), Some(&2));
  assert_eq!(elems(&deque), [1, 2, 3]);
}

#[test]
fn insert_shifts_shorter_side() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..10).unwrap();
  let last = deque.begin() + 9;
  let cursor = deque.insert(deque.begin() + 2, 100).unwrap();
  assert_eq!((cursor.node(), cursor.offset()), (3, 1));
  assert_eq!(deque.index_of(cursor), Some(2));
  assert_eq!(deque.get_at(last), Some(&9));
  let first = deque.begin();
  let cursor = deque.insert(deque.begin() + 8, 200).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&200));
  assert_eq!(deque.get_at(first), Some(&0));
  let cursor = deque.insert(deque.begin(), 300).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&300));
  let cursor = deque.insert(deque.end(), 400).unwrap();
  assert_eq!(deque.get_at(cursor), Some(&400));
  assert_eq!(elems(&deque), [300, 0, 1, 100, 2, 3, 4, 5, 6, 200, 7, 8, 9, 400]);
  assert_eq!(
    deque.insert(deque.end() + 1, 0),
    Err(Error::DequeError(DequeError::OutOfBoundsCursor))
  );
  assert_eq!(
    deque.insert(Cursor::default(), 0),
    Err(Error::DequeError(DequeError::OutOfBoundsCursor))
  );
}

#[test]
fn map_grows_from_8_to_18_slots() {
  let mut deque = Deque::<u8, _, 1>::with_allocator(Global).unwrap();
  for elem in 0..4 {
    deque.push_back(elem).unwrap();
  }
  assert_eq!((deque.map_size(), deque.end().node()), (8, 7));
  deque.push_back(4).unwrap();
  assert_eq!(deque.map_size(), 18);
  assert_eq!((deque.begin().node(), deque.end().node()), (6, 11));
  assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
}

#[test]
fn map_growth_failure_keeps_state() {
  let mut deque = Deque::<u8, _, 1>::with_allocator(Metered::with_limit(Global, 7)).unwrap();
  for elem in 0..4 {
    deque.push_back(elem).unwrap();
  }
  let before = (deque.len(), deque.begin(), deque.end(), deque.map_size());
  assert_eq!(deque.allocator().live(), 6);
  assert_eq!(deque.push_back(4), Err(Error::AllocatorError(AllocatorError::LimitReached)));
  assert_eq!((deque.len(), deque.begin(), deque.end(), deque.map_size()), before);
  assert_eq!(deque.allocator().live(), 6);
  assert_eq!(deque.iter().copied().collect::<Vec<_>>(), [0, 1, 2, 3]);
}

#[test]
fn max_size_depends_on_element_size() {
  let max = isize::MAX.cast_unsigned();
  assert_eq!(Deque::<u8>::new().unwrap().max_size(), max);
  assert_eq!(Deque::<u32>::new().unwrap().max_size(), max / 4);
  assert_eq!(Deque::<()>::new().unwrap().max_size(), max);
}

#[test]
fn push_and_pop_release_buffers() {
  let mut deque = deque();
  for elem in 0..9 {
    deque.push_back(elem).unwrap();
  }
  assert_eq!(deque.allocator().live(), 4);
  for elem in 0..9 {
    assert_eq!(deque.pop_front(), Some(elem));
  }
  assert_eq!(deque.pop_front(), None);
  assert_eq!(deque.allocator().live(), 2);
  for elem in 0..9 {
    deque.push_front(elem).unwrap();
  }
  for elem in 0..9 {
    assert_eq!(deque.pop_front(), Some(8 - elem));
  }
  assert_eq!(deque.pop_back(), None);
  assert_eq!(deque.allocator().live(), 2);
}

#[test]
fn push_at_both_ends_without_relocation() {
  // [S 10 11 12 F]: N3
  //
  // [. 2 1 0] [10 11 12 20] [21 22 F .]: N2 to N4
  let mut deque = deque();
  deque.extend_back_from_iter([10, 11, 12]).unwrap();
  assert_eq!((deque.begin().node(), deque.begin().offset()), (3, 0));
  assert_eq!((deque.end().node(), deque.end().offset()), (3, 3));
  let cursors = [deque.begin(), deque.begin() + 1, deque.begin() + 2];
  let allocations = deque.allocator().allocations();
  for elem in [20, 21, 22] {
    deque.push_back(elem).unwrap();
  }
  for elem in [0, 1, 2] {
    deque.push_front(elem).unwrap();
  }
  assert_eq!(deque.allocator().allocations(), allocations + 2);
  assert_eq!(deque.map_size(), 8);
  assert_eq!((deque.begin().node(), deque.begin().offset()), (2, 1));
  assert_eq!((deque.end().node(), deque.end().offset()), (4, 2));
  for (cursor, elem) in cursors.into_iter().zip([10, 11, 12]) {
    assert_eq!((cursor.node(), deque.get_at(cursor)), (3, Some(&elem)));
  }
  assert_eq!(elems(&deque), [2, 1, 0, 10, 11, 12, 20, 21, 22]);
}

#[test]
fn remove_and_truncate() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..12).unwrap();
  assert_eq!(deque.remove(3), Some(3));
  assert_eq!(deque.remove(11), None);
  deque.truncate_front(8);
  assert_eq!(elems(&deque), [4, 5, 6, 7, 8, 9, 10, 11]);
  deque.truncate_back(3);
  assert_eq!(elems(&deque), [4, 5, 6]);
  deque.truncate_back(10);
  deque.truncate_front(10);
  assert_eq!(deque.len(), 3);
  assert_eq!(deque.nodes_len(), 1);
  deque.truncate_front(0);
  assert!(deque.is_empty());
}

#[test]
fn try_clone_is_equal() {
  let mut deque = deque();
  deque.extend_back_from_iter(0..33).unwrap();
  let mut other = deque.try_clone().unwrap();
  assert_eq!(deque, other);
  let _ = other.pop_back();
  assert_ne!(deque, other);
}

#[test]
fn zero_sized_elements() {
  let mut deque = Deque::<()>::new().unwrap();
  assert_eq!(deque.buffer_capacity(), 512);
  for _ in 0..2000 {
    deque.push_back(()).unwrap();
  }
  assert_eq!(deque.len(), 2000);
  assert_eq!(deque.iter().count(), 2000);
  assert_eq!(deque.pop_front(), Some(()));
  assert_eq!(deque.len(), 1999);
}

#[derive(Debug)]
struct Counter(Rc<Cell<usize>>);

impl Drop for Counter {
  fn drop(&mut self) {
    self.0.set(self.0.get() + 1);
  }
}

#[derive(Debug)]
struct Fuse {
  clones_left: Rc<Cell<usize>>,
  drops: Rc<Cell<usize>>,
}

impl Clone for Fuse {
  fn clone(&self) -> Self {
    let clones_left = self.clones_left.get();
    assert!(clones_left > 0, "fuse");
    self.clones_left.set(clones_left - 1);
    Self { clones_left: self.clones_left.clone(), drops: self.drops.clone() }
  }
}

impl Drop for Fuse {
  fn drop(&mut self) {
    self.drops.set(self.drops.get() + 1);
  }
}

fn deque() -> D4 {
  Deque::with_allocator(Metered::new(Global)).unwrap()
}

fn elems(deque: &D4) -> Vec<i32> {
  deque.iter().copied().collect()
}

fn snapshot(deque: &D4) -> (usize, Cursor<i32, 4>, Cursor<i32, 4>, usize, usize) {
  (deque.len(), deque.begin(), deque.end(), deque.map_size(), deque.allocator().live())
}

#[cfg(feature = "_tracing-tree")]
#[test]
fn emits_events_while_growing() {
  let _rslt = crate::misc::tracing_tree_init(Some("trace"));
  let mut deque = Deque::<u8, _, 1>::with_allocator(Global).unwrap();
  deque.extend_back_from_iter(0..32).unwrap();
  deque.clear();
  assert_eq!(deque.nodes_len(), 1);
}
