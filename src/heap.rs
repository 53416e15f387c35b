use std::{ptr::NonNull, sync::PoisonError};

use crate::{
  block::{Block, HEADER_SIZE},
  brk::ProgramBreak,
  error::AllocError,
  registry::FreeList,
  sync::{Mutex, MutexGuard},
};

struct State<B> {
  blocks: FreeList,
  brk: B,
}

// SAFETY: the headers behind `blocks` live in memory owned through `brk` and
// are only touched with the heap lock held.
unsafe impl<B: Send> Send for State<B> {}

/// First-fit allocator over a [`ProgramBreak`].
///
/// One lock covers both the block list and every break adjustment. The lock
/// is not reentrant: calling back into the same heap while holding it (from a
/// signal handler, say) deadlocks.
pub struct Heap<B: ProgramBreak> {
  state: Mutex<State<B>>,
}

impl<B: ProgramBreak> Heap<B> {
  #[cfg(not(loom))]
  pub const fn new(brk: B) -> Self {
    Self {
      state: Mutex::new(State { blocks: FreeList::new(), brk }),
    }
  }

  #[cfg(loom)]
  pub fn new(brk: B) -> Self {
    Self {
      state: Mutex::new(State { blocks: FreeList::new(), brk }),
    }
  }

  fn lock(&self) -> MutexGuard<'_, State<B>> {
    // Nothing inside the critical sections panics midway through an update.
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Hands out at least `size` bytes.
  ///
  /// A free block anywhere in the list is reused as-is when it is big
  /// enough, so the payload may be larger than asked for. Otherwise the break
  /// grows by exactly `HEADER_SIZE + size`.
  pub fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if size == 0 {
      return Err(AllocError::ZeroSize);
    }

    let total_size = HEADER_SIZE
      .checked_add(size)
      .ok_or(AllocError::OutOfMemory { requested: usize::MAX })?;

    let mut state = self.lock();

    unsafe {
      if let Some(block) = state.blocks.find(size) {
        Block::set_free(block, false);
        return Ok(Block::payload(block));
      }

      let address = state.brk.extend(total_size)?;
      let block = Block::init(address, size);
      state.blocks.append(block);

      Ok(Block::payload(block))
    }
  }

  /// Gives back memory obtained from [`Heap::allocate`]. Null is ignored.
  ///
  /// When the block ends exactly at the break, its memory goes back to the
  /// break and the block leaves the list. Any other block is only marked
  /// free; neighbours are never merged.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a live pointer from `allocate` on this heap.
  /// Foreign or repeated pointers are not detected.
  pub unsafe fn release(
    &self,
    ptr: *mut u8,
  ) {
    let Some(payload) = NonNull::new(ptr) else {
      return;
    };

    let mut state = self.lock();

    unsafe {
      let block = Block::from_payload(payload);
      let program_break = state.brk.current();

      if Block::end(block) == program_break {
        let size = Block::size(block);
        state.blocks.unlink_tail();
        state.brk.shrink(size + HEADER_SIZE);
        return;
      }

      Block::set_free(block, true);
    }
  }

  #[cfg(test)]
  pub(crate) fn inspect<R>(
    &self,
    f: impl FnOnce(&FreeList, &B) -> R,
  ) -> R {
    let state = self.lock();
    f(&state.blocks, &state.brk)
  }
}
