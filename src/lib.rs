//! # brkalloc - A First-Fit Program Break Allocator
//!
//! This crate provides a small, thread-safe `malloc`/`free` replacement that
//! carves memory out of the program break with `sbrk(2)` and recycles released
//! blocks through an explicit, intrusive block list.
//!
//! ## Overview
//!
//! Every block the allocator ever obtained stays on one list, oldest first,
//! whether it is in use or free:
//!
//! ```text
//!   Heap after allocate(40), allocate(100), allocate(10), release(#2):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           HEAP MEMORY                                │
//!   │                                                                      │
//!   │   ┌─────┬────────┬─────┬─────────────────────┬─────┬──────┐          │
//!   │   │ hdr │ 40 B   │ hdr │ 100 B (free)        │ hdr │ 10 B │          │
//!   │   └─────┴────────┴─────┴─────────────────────┴─────┴──────┘          │
//!   │     │     ▲        │                           │            ▲        │
//!   │     └─────────────►┘──────────────────────────►┘            │        │
//!   │    head   │                                   tail     Program Break │
//!   │           └── pointer handed to the caller                           │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **allocate(n)** walks the list from `head` and takes the first free block
//!   holding at least `n` bytes, as-is. Only when none qualifies does the
//!   break grow, by exactly `HEADER_SIZE + n`.
//! - **release(p)** hands the block back to the OS when it ends at the break.
//!   Any other block is just flagged free. Blocks are never split or merged.
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - Alignment macros (align!, align_to!) and ALIGNMENT
//!   ├── block      - Block header layout, payload <-> header offsets
//!   ├── registry   - FreeList: first-fit search, append, unlink tail
//!   ├── brk        - ProgramBreak trait, Sbrk and ArenaBreak
//!   ├── heap       - Heap<B>: allocate / release under one lock
//!   └── global     - Process-wide heap, BrkAlloc, C malloc/free exports
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brkalloc::{ArenaBreak, Heap};
//!
//! fn main() {
//!     let heap = Heap::new(ArenaBreak::with_capacity(4096));
//!
//!     let ptr = heap.allocate(64).expect("arena has room");
//!     unsafe {
//!         ptr.as_ptr().write_bytes(0, 64);
//!         heap.release(ptr.as_ptr());
//!     }
//! }
//! ```
//!
//! Or replace the process allocator outright:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static ALLOCATOR: brkalloc::BrkAlloc = brkalloc::BrkAlloc;
//! ```
//!
//! With the `malloc` feature the `cdylib` also exports C `malloc` and `free`.
//!
//! ## Limitations
//!
//! - **One lock, not reentrant**: re-entering the heap from a signal handler
//!   that interrupted it deadlocks.
//! - **Foreign `sbrk` calls**: the break is read and later shrunk under our
//!   lock, but other code in the process can still move it in between.
//! - **No validation**: releasing a foreign or already released pointer reads
//!   garbage as a header.
//! - **Unix-only**: `Sbrk` requires `libc` and `sbrk` (POSIX systems).

pub mod align;
mod block;
mod brk;
mod error;
#[cfg(not(loom))]
mod global;
mod heap;
mod registry;
mod sync;


pub use align::ALIGNMENT;
pub use block::HEADER_SIZE;
pub use brk::{ArenaBreak, ProgramBreak, Sbrk};
pub use error::AllocError;
#[cfg(not(loom))]
pub use global::{BrkAlloc, allocate, log_alloc, release};
pub use heap::Heap;
