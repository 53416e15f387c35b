use std::{
  mem,
  ptr::{self, NonNull},
};

use crate::align::ALIGNMENT;

/// Metadata placed immediately before every payload handed out.
///
/// ```text
///   ┌──────────────────────┬──────────────────────────────┐
///   │ Block                │ payload (`size` bytes)       │
///   │  size | is_free | next                              │
///   └──────────────────────┴──────────────────────────────┘
///   ▲                      ▲
///   header                 header + HEADER_SIZE
/// ```
///
/// The `align(16)` representation pads the header to a multiple of
/// [`ALIGNMENT`] on both 32 and 64 bit targets. The break grows by
/// `HEADER_SIZE + size` for any `size`, so a header in the heap may sit at
/// any address: fields are only ever touched through the unaligned accessors
/// below, never through a `&Block`.
#[repr(C, align(16))]
pub struct Block {
  pub size: usize,
  pub is_free: bool,
  pub next: *mut Block,
}

/// Fixed distance between a header and its payload.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

const _: () = assert!(HEADER_SIZE % ALIGNMENT == 0);

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    next: *mut Block,
  ) -> Self {
    Self { size, is_free, next }
  }

  /// Writes a fresh in-use header of `size` payload bytes at `address`.
  ///
  /// # Safety
  ///
  /// `address` must be valid for writes of `HEADER_SIZE` bytes.
  pub unsafe fn init(
    address: NonNull<u8>,
    size: usize,
  ) -> NonNull<Block> {
    let block = address.cast::<Block>();
    unsafe { block.as_ptr().write_unaligned(Block::new(size, false, ptr::null_mut())) };
    block
  }

  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn size(block: NonNull<Block>) -> usize {
    unsafe { (&raw const (*block.as_ptr()).size).read_unaligned() }
  }

  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn is_free(block: NonNull<Block>) -> bool {
    unsafe { (&raw const (*block.as_ptr()).is_free).read_unaligned() }
  }

  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn set_free(
    block: NonNull<Block>,
    is_free: bool,
  ) {
    unsafe { (&raw mut (*block.as_ptr()).is_free).write_unaligned(is_free) }
  }

  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn next(block: NonNull<Block>) -> *mut Block {
    unsafe { (&raw const (*block.as_ptr()).next).read_unaligned() }
  }

  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn set_next(
    block: NonNull<Block>,
    next: *mut Block,
  ) {
    unsafe { (&raw mut (*block.as_ptr()).next).write_unaligned(next) }
  }

  /// Start of the payload owned by `block`.
  pub fn payload(block: NonNull<Block>) -> NonNull<u8> {
    // SAFETY: every header is followed by its payload in the same region.
    unsafe { block.cast::<u8>().add(HEADER_SIZE) }
  }

  /// Recovers the header from a payload pointer by the fixed backward offset.
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by [`Block::payload`]; anything else
  /// reads garbage as a header.
  pub unsafe fn from_payload(payload: NonNull<u8>) -> NonNull<Block> {
    unsafe { payload.sub(HEADER_SIZE).cast::<Block>() }
  }

  /// Address one past the last payload byte.
  ///
  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn end(block: NonNull<Block>) -> *mut u8 {
    let size = unsafe { Block::size(block) };
    Block::payload(block).as_ptr().wrapping_add(size)
  }
}
