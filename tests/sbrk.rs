use std::alloc::{GlobalAlloc, Layout};

use brkalloc::{BrkAlloc, HEADER_SIZE, ProgramBreak, Sbrk, allocate, release};

fn program_break() -> usize {
  Sbrk::new().current() as usize
}

unsafe fn assert_filled(
  ptr: *mut u8,
  len: usize,
  byte: u8,
) {
  let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
  assert!(bytes.iter().all(|&b| b == byte));
}

// One test function so nothing else in this binary moves the break while the
// assertions run.
#[test]
fn test_process_break() {
  raw_heap_scenarios();
  global_alloc_alignment();
  raw_and_global_alloc_share_the_heap();
}

fn raw_heap_scenarios() {
  assert!(allocate(0).is_null());

  let b0 = program_break();

  unsafe {
    let p1 = allocate(40);
    assert!(!p1.is_null());
    assert_eq!(program_break(), b0 + HEADER_SIZE + 40);
    p1.write_bytes(0xAB, 40);

    let p2 = allocate(10);
    assert_ne!(p1, p2);
    assert_eq!(program_break(), b0 + 2 * HEADER_SIZE + 50);

    release(p2);
    assert_eq!(program_break(), b0 + HEADER_SIZE + 40);

    let p3 = allocate(5);
    assert_eq!(p3, p2);
    assert_eq!(program_break(), b0 + 2 * HEADER_SIZE + 45);

    // p1 is no longer at the break, so it is kept and reused.
    release(p1);
    assert_eq!(program_break(), b0 + 2 * HEADER_SIZE + 45);
    assert_eq!(allocate(24), p1);
    assert_eq!(*p1, 0xAB);

    release(p3);
    release(p1);
    assert_eq!(program_break(), b0);
  }
}

fn global_alloc_alignment() {
  let b0 = program_break();

  unsafe {
    for (size, align) in [(24, 8), (1, 1), (256, 128), (100, 16), (8, 4096)] {
      let layout = Layout::from_size_align(size, align).unwrap();
      let p = BrkAlloc.alloc(layout);
      assert!(!p.is_null());
      assert_eq!(p as usize % align, 0);

      p.write_bytes(0x5A, size);
      assert_filled(p, size, 0x5A);

      BrkAlloc.dealloc(p, layout);
      assert_eq!(program_break(), b0);
    }
  }
}

fn raw_and_global_alloc_share_the_heap() {
  let b0 = program_break();

  unsafe {
    // Odd raw sizes leave the break misaligned for whatever comes next.
    let r1 = allocate(13);
    let l1 = Layout::from_size_align(8, 8).unwrap();
    let g1 = BrkAlloc.alloc(l1);
    let r2 = allocate(3);
    let l2 = Layout::from_size_align(64, 64).unwrap();
    let g2 = BrkAlloc.alloc(l2);

    assert!(!r1.is_null() && !g1.is_null() && !r2.is_null() && !g2.is_null());
    assert_eq!(g1 as usize % 8, 0);
    assert_eq!(g2 as usize % 64, 0);

    r1.write_bytes(1, 13);
    g1.write_bytes(2, 8);
    r2.write_bytes(3, 3);
    g2.write_bytes(4, 64);

    assert_filled(r1, 13, 1);
    assert_filled(g1, 8, 2);
    assert_filled(r2, 3, 3);
    assert_filled(g2, 64, 4);

    BrkAlloc.dealloc(g2, l2);
    release(r2);
    BrkAlloc.dealloc(g1, l1);
    release(r1);
    assert_eq!(program_break(), b0);
  }
}
