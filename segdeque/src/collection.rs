//! Collection types

mod arena;
mod buffer_map;
mod cursor;
mod deque;
mod misc;
mod queue;
mod stack;
mod vector;

pub use buffer_map::BufferMapError;
pub use cursor::Cursor;
pub use deque::{Deque, DequeError, IntoIter, Iter, IterMut};
pub use misc::buffer_capacity;
pub use queue::Queue;
pub use stack::Stack;
pub use vector::VectorError;
