use crate::{allocator::Global, collection::Deque};
use alloc::collections::VecDeque;

#[kani::proof]
fn deque() {
  let bytes = kani::vec::any_vec::<u8, 16>();
  let mut deque = Deque::<u8, Global, 2>::with_allocator(Global).unwrap();
  let mut vec_deque = VecDeque::with_capacity(bytes.len());

  for byte in bytes.iter().copied() {
    if byte % 2 == 0 {
      deque.push_front(byte).unwrap();
      vec_deque.push_front(byte);
    } else {
      deque.push_back(byte).unwrap();
      vec_deque.push_back(byte);
    }
  }
  assert_eq!(deque.len(), vec_deque.len());
  for _ in 0..(bytes.len() / 2) {
    assert_eq!(deque.get(0), vec_deque.get(0));
    assert_eq!(deque.get_mut(0), vec_deque.get_mut(0));
    assert_eq!(deque.pop_back(), vec_deque.pop_back());
    assert_eq!(deque.back(), vec_deque.back());
    assert_eq!(deque.pop_front(), vec_deque.pop_front());
  }
  loop {
    if deque.is_empty() {
      break;
    }
    assert_eq!(deque.front(), vec_deque.front());
    assert_eq!(deque.pop_back(), vec_deque.pop_back());
    if deque.is_empty() {
      break;
    }
    assert_eq!(deque.back(), vec_deque.back());
    assert_eq!(deque.pop_front(), vec_deque.pop_front());
  }
  assert_eq!((deque.len(), vec_deque.len()), (0, 0));
  assert_eq!(deque.nodes_len(), 1);
}
