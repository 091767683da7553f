//! Deque

#![no_main]

use segdeque::collection::Deque;
use std::collections::VecDeque;

#[derive(Debug, arbitrary::Arbitrary)]
enum Op {
  Clear,
  Erase(u16),
  EraseRange(u16, u16),
  Insert(u16, u8),
  InsertN(u16, u8, u8),
  PopBack,
  PopFront,
  PushBack(u8),
  PushFront(u8),
}

libfuzzer_sys::fuzz_target!(|ops: Vec<Op>| {
  let mut deque = Deque::<u8, _, 3>::with_allocator(segdeque::allocator::Global).unwrap();
  let mut vec_deque = VecDeque::new();
  for op in ops {
    let len = vec_deque.len();
    let at = |n: u16| usize::from(n) % (len + 1);
    match op {
      Op::Clear => {
        deque.clear();
        vec_deque.clear();
      }
      Op::Erase(n) => {
        let idx = at(n);
        if idx < len {
          let _ = deque.erase(deque.begin() + idx.cast_signed()).unwrap();
          let _ = vec_deque.remove(idx);
        }
      }
      Op::EraseRange(a, b) => {
        let (first, last) = (at(a).min(at(b)), at(a).max(at(b)));
        let begin = deque.begin();
        let _ = deque.erase_range(begin + first.cast_signed(), begin + last.cast_signed()).unwrap();
        let _ = vec_deque.drain(first..last);
      }
      Op::Insert(n, elem) => {
        let idx = at(n);
        let _ = deque.insert(deque.begin() + idx.cast_signed(), elem).unwrap();
        vec_deque.insert(idx, elem);
      }
      Op::InsertN(n, count, elem) => {
        let idx = at(n);
        let _ = deque.insert_n(deque.begin() + idx.cast_signed(), count.into(), elem).unwrap();
        for _ in 0..count {
          vec_deque.insert(idx, elem);
        }
      }
      Op::PopBack => assert_eq!(deque.pop_back(), vec_deque.pop_back()),
      Op::PopFront => assert_eq!(deque.pop_front(), vec_deque.pop_front()),
      Op::PushBack(elem) => {
        deque.push_back(elem).unwrap();
        vec_deque.push_back(elem);
      }
      Op::PushFront(elem) => {
        deque.push_front(elem).unwrap();
        vec_deque.push_front(elem);
      }
    }
    assert_eq!(deque.len(), vec_deque.len());
  }
  assert!(deque.iter().eq(vec_deque.iter()));
});
