//! The process-wide heap behind the program break.

use std::{
  alloc::{GlobalAlloc, Layout},
  mem,
  ptr::{self, NonNull},
};

use crate::{
  align::checked_align_to,
  brk::{ProgramBreak, Sbrk},
  heap::Heap,
};

static HEAP: Heap<Sbrk> = Heap::new(Sbrk::new());

const WORD: usize = mem::size_of::<usize>();

/// Allocates `size` bytes from the process heap.
///
/// Returns null when `size` is zero or the break cannot grow.
pub fn allocate(size: usize) -> *mut u8 {
  HEAP.allocate(size).map_or(ptr::null_mut(), NonNull::as_ptr)
}

/// Releases a pointer obtained from [`allocate`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by [`allocate`].
pub unsafe fn release(ptr: *mut u8) {
  unsafe { HEAP.release(ptr) }
}

/// [`GlobalAlloc`] over the process heap.
///
/// ```rust,ignore
/// use brkalloc::BrkAlloc;
///
/// #[global_allocator]
/// static ALLOCATOR: BrkAlloc = BrkAlloc;
/// ```
///
/// Payloads from the heap land wherever the break happens to be, so every
/// request is padded by `align - 1` plus one word. The returned pointer is
/// rounded up inside that block and the block's own payload address is
/// stashed in the word just below it for `dealloc`.
///
/// ```text
///   ┌────────┬─────────── payload from the heap ────────────────┐
///   │ header │ pad... │ raw ptr │ caller's `layout.size()` bytes │
///   └────────┴────────┴─────────┴────────────────────────────────┘
///                               ▲
///                               aligned to layout.align()
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct BrkAlloc;

/// Bytes to ask the heap for so an `align`-aligned `layout` fits after a
/// back-pointer word, wherever the payload starts.
fn padded_size(layout: Layout) -> Option<usize> {
  let align = layout.align().max(WORD);
  layout.size().checked_add(WORD)?.checked_add(align - 1)
}

/// First `align`-aligned address in `raw` that leaves a word free below it.
fn aligned_payload(
  raw: usize,
  align: usize,
) -> Option<usize> {
  checked_align_to(raw.checked_add(WORD)?, align.max(WORD))
}

unsafe impl GlobalAlloc for BrkAlloc {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    let Some(size) = padded_size(layout) else {
      return ptr::null_mut();
    };

    let raw = allocate(size);
    if raw.is_null() {
      return raw;
    }

    let Some(address) = aligned_payload(raw as usize, layout.align()) else {
      unsafe { release(raw) };
      return ptr::null_mut();
    };

    let user = raw.wrapping_add(address - raw as usize);
    // SAFETY: `user - WORD .. user + layout.size()` lies inside the
    // `padded_size` bytes just allocated, and `user` is word aligned.
    unsafe { user.sub(WORD).cast::<*mut u8>().write(raw) };
    user
  }

  unsafe fn dealloc(
    &self,
    ptr: *mut u8,
    _layout: Layout,
  ) {
    if ptr.is_null() {
      return;
    }
    let raw = unsafe { ptr.sub(WORD).cast::<*mut u8>().read() };
    unsafe { release(raw) }
  }
}

/// Logs an allocation together with the current program break.
///
/// Never call this while a heap lock is held: the logger may allocate.
pub fn log_alloc(
  size: usize,
  address: *mut u8,
) {
  log::debug!(
    "allocated {} bytes, address = {:?}, program break = {:?}",
    size,
    address,
    Sbrk::new().current()
  );
}

#[cfg(feature = "malloc")]
mod exports {
  use libc::{c_void, size_t};

  /// C `malloc`, backed by the process heap.
  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn malloc(size: size_t) -> *mut c_void {
    super::allocate(size).cast::<c_void>()
  }

  /// C `free`, backed by the process heap.
  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn free(ptr: *mut c_void) {
    unsafe { super::release(ptr.cast::<u8>()) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_padded_size() {
    let layout = Layout::from_size_align(24, 8).unwrap();
    assert_eq!(padded_size(layout), Some(24 + WORD + WORD - 1));

    let layout = Layout::from_size_align(256, 128).unwrap();
    assert_eq!(padded_size(layout), Some(256 + WORD + 127));

    let layout = Layout::from_size_align(1, 1).unwrap();
    assert_eq!(padded_size(layout), Some(1 + WORD + WORD - 1));
  }

  #[test]
  fn test_aligned_payload_fits_inside_padding() {
    for align in [1, 2, 8, 16, 64, 128, 4096] {
      let layout = Layout::from_size_align(10, align).unwrap();
      let size = padded_size(layout).unwrap();

      for raw in 0x1000..0x1000 + 2 * align.max(WORD) {
        let address = aligned_payload(raw, align).unwrap();
        assert_eq!(address % align.max(WORD), 0);
        assert!(address >= raw + WORD);
        assert!(address + layout.size() <= raw + size);
      }
    }
  }

  #[test]
  fn test_aligned_payload_overflow() {
    assert_eq!(aligned_payload(usize::MAX - 3, 16), None);
  }
}
