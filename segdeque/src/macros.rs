macro_rules! _debug {
  ($($tt:tt)+) => {
    #[cfg(feature = "tracing")]
    tracing::debug!($($tt)+);
  };
}

macro_rules! _trace {
  ($($tt:tt)+) => {
    #[cfg(feature = "tracing")]
    tracing::trace!($($tt)+);
  };
}

macro_rules! doc_alloc_failure {
  () => {
    "The allocator could not provide the requested block of memory."
  };
}

macro_rules! doc_invalid_cursor {
  () => {
    "The provided cursor does not point to a valid position of the live range."
  };
}
