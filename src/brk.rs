//! Sources of heap address space that grow and shrink at one end.

use std::{
  alloc::{self, Layout},
  ptr::NonNull,
};

use libc::{c_void, intptr_t, sbrk};

use crate::{align::ALIGNMENT, error::AllocError};

/// A contiguous region whose end ("the break") can be moved.
///
/// The engine only ever calls these while holding its lock, so
/// implementations need no synchronization of their own.
pub trait ProgramBreak {
  /// Moves the break forward by `increment` bytes and returns the old break.
  ///
  /// # Safety
  ///
  /// Callers must serialize every use of the underlying break.
  unsafe fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>, AllocError>;

  /// The current break address.
  fn current(&self) -> *mut u8;

  /// Moves the break back by `decrement` bytes.
  ///
  /// # Safety
  ///
  /// The last `decrement` bytes below the break must no longer be in use.
  unsafe fn shrink(
    &mut self,
    decrement: usize,
  );
}

/// The process data segment, moved with `sbrk(2)`.
///
/// Nothing stops other code in the process (libc's own `malloc`, for one)
/// from calling `sbrk` between our `current` and `shrink`. A foreign extension
/// landing in that window is released along with our block. The engine's
/// lock cannot close this gap.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

impl Sbrk {
  pub const fn new() -> Self {
    Self
  }
}

impl ProgramBreak for Sbrk {
  unsafe fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let oom = AllocError::OutOfMemory { requested: increment };
    let delta = intptr_t::try_from(increment).map_err(|_| oom)?;

    let address = unsafe { sbrk(delta) };
    if address == usize::MAX as *mut c_void {
      return Err(oom);
    }

    NonNull::new(address.cast::<u8>()).ok_or(oom)
  }

  fn current(&self) -> *mut u8 {
    unsafe { sbrk(0) }.cast::<u8>()
  }

  unsafe fn shrink(
    &mut self,
    decrement: usize,
  ) {
    unsafe { sbrk(-(decrement as intptr_t)) };
  }
}

/// A simulated break over a fixed, [`ALIGNMENT`]-aligned buffer.
///
/// Behaves like the process break with a hard ceiling of `capacity` bytes,
/// which makes break arithmetic exact and repeatable.
pub struct ArenaBreak {
  base: NonNull<u8>,
  capacity: usize,
  top: usize,
}

// SAFETY: the buffer is uniquely owned by the arena.
unsafe impl Send for ArenaBreak {}

impl ArenaBreak {
  /// Reserves a buffer of `capacity` bytes from the system allocator.
  ///
  /// # Panics
  ///
  /// When `capacity` is zero, too large for a `Layout`, or the system
  /// allocator fails.
  pub fn with_capacity(capacity: usize) -> Self {
    let layout = Self::layout(capacity);
    let base = NonNull::new(unsafe { alloc::alloc(layout) }).unwrap_or_else(|| alloc::handle_alloc_error(layout));

    Self { base, capacity, top: 0 }
  }

  fn layout(capacity: usize) -> Layout {
    assert!(capacity > 0, "arena capacity must be non-zero");
    Layout::from_size_align(capacity, ALIGNMENT).expect("arena capacity overflows a Layout")
  }

  /// Address of the first byte; the break before any extension.
  pub fn base(&self) -> *mut u8 {
    self.base.as_ptr()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes between the base and the break.
  pub fn used(&self) -> usize {
    self.top
  }
}

impl ProgramBreak for ArenaBreak {
  unsafe fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let top = self
      .top
      .checked_add(increment)
      .filter(|&top| top <= self.capacity)
      .ok_or(AllocError::OutOfMemory { requested: increment })?;

    let previous = unsafe { self.base.add(self.top) };
    self.top = top;
    Ok(previous)
  }

  fn current(&self) -> *mut u8 {
    self.base.as_ptr().wrapping_add(self.top)
  }

  unsafe fn shrink(
    &mut self,
    decrement: usize,
  ) {
    debug_assert!(decrement <= self.top, "shrinking below the arena base");
    self.top = self.top.saturating_sub(decrement);
  }
}

impl Drop for ArenaBreak {
  fn drop(&mut self) {
    unsafe { alloc::dealloc(self.base.as_ptr(), Self::layout(self.capacity)) };
  }
}
