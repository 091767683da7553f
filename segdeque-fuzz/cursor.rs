//! Cursor

#![no_main]

use segdeque::collection::Deque;

libfuzzer_sys::fuzz_target!(|data: (Deque<u8, segdeque::allocator::Global, 5>, Vec<i16>)| {
  let (deque, shifts) = data;
  let begin = deque.begin();
  let mut cursor = begin;
  let mut idx: isize = 0;
  for shift in shifts {
    let shift = isize::from(shift);
    cursor += shift;
    idx += shift;
    assert_eq!(cursor - begin, idx);
    assert!(cursor.offset() < deque.buffer_capacity());
    let expected = usize::try_from(idx).ok().and_then(|el| deque.get(el));
    assert_eq!(deque.get_at(cursor), expected);
  }
});
