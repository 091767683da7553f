use crate::allocator::{Allocator, AllocatorError};
use alloc::{boxed::Box, vec::Vec};
use core::mem::MaybeUninit;

/// Forwards requests to the global allocator of the running program.
///
/// Unlike `Box::new_uninit_slice`, exhaustion is reported as an error instead of aborting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Global;

impl Allocator for Global {
  #[inline]
  fn allocate<T>(&mut self, len: usize) -> crate::Result<Box<[MaybeUninit<T>]>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_err| AllocatorError::OutOfMemory)?;
    data.resize_with(len, MaybeUninit::uninit);
    Ok(data.into_boxed_slice())
  }

  #[inline]
  fn deallocate<T>(&mut self, block: Box<[MaybeUninit<T>]>) {
    drop(block);
  }
}
