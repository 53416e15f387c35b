use std::fmt;

/// Why an allocation request produced no memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// `allocate(0)`: nothing to hand out. An expected outcome, not a fault.
  ZeroSize,
  /// The break could not be moved far enough to fit header and payload.
  ///
  /// `requested` is the full break increment, `HEADER_SIZE + size`, or
  /// `usize::MAX` when that sum does not fit in a `usize`.
  OutOfMemory { requested: usize },
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      AllocError::ZeroSize => write!(f, "zero-size allocation request"),
      AllocError::OutOfMemory { requested } => {
        write!(f, "out of memory: cannot extend the break by {requested} bytes")
      },
    }
  }
}

impl std::error::Error for AllocError {}
