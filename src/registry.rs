use std::ptr::{self, NonNull};

use crate::block::Block;

/// Intrusive list of every block obtained from the break, oldest first.
///
/// The list threads through the headers themselves, so it never allocates.
/// Free and in-use blocks share the same chain.
pub struct FreeList {
  head: *mut Block,
  tail: *mut Block,
}

impl FreeList {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
    }
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  #[cfg(test)]
  pub fn head(&self) -> Option<NonNull<Block>> {
    NonNull::new(self.head)
  }

  #[cfg(test)]
  pub fn tail(&self) -> Option<NonNull<Block>> {
    NonNull::new(self.tail)
  }

  /// First free block able to hold `size` bytes, scanning in acquisition order.
  ///
  /// # Safety
  ///
  /// Every header reachable from `head` must be live.
  pub unsafe fn find(
    &self,
    size: usize,
  ) -> Option<NonNull<Block>> {
    unsafe {
      let mut current = NonNull::new(self.head);

      while let Some(block) = current {
        if Block::is_free(block) && Block::size(block) >= size {
          return Some(block);
        }
        current = NonNull::new(Block::next(block));
      }

      None
    }
  }

  /// Links `block` in as the new tail.
  ///
  /// # Safety
  ///
  /// `block` must be a live header not already in the list.
  pub unsafe fn append(
    &mut self,
    block: NonNull<Block>,
  ) {
    unsafe {
      Block::set_next(block, ptr::null_mut());

      match NonNull::new(self.tail) {
        Some(tail) => Block::set_next(tail, block.as_ptr()),
        None => self.head = block.as_ptr(),
      }
    }
    self.tail = block.as_ptr();
  }

  /// Drops the current tail from the list, returning it.
  ///
  /// There are no backward links, so the predecessor is found by walking
  /// from `head`.
  ///
  /// # Safety
  ///
  /// Every header reachable from `head` must be live.
  pub unsafe fn unlink_tail(&mut self) -> Option<NonNull<Block>> {
    let removed = NonNull::new(self.tail)?;

    if self.head == self.tail {
      self.head = ptr::null_mut();
      self.tail = ptr::null_mut();
      return Some(removed);
    }

    unsafe {
      let mut current = NonNull::new(self.head)?;
      loop {
        match NonNull::new(Block::next(current)) {
          Some(next) if next != removed => current = next,
          _ => break,
        }
      }
      Block::set_next(current, ptr::null_mut());
      self.tail = current.as_ptr();
    }

    Some(removed)
  }

  /// Walks the chain from `head` to `tail`.
  ///
  /// # Safety
  ///
  /// The list must not be mutated while the iterator is alive.
  #[cfg(test)]
  pub unsafe fn iter(&self) -> Blocks<'_> {
    Blocks {
      current: self.head,
      _list: self,
    }
  }
}

#[cfg(test)]
pub struct Blocks<'a> {
  current: *mut Block,
  _list: &'a FreeList,
}

#[cfg(test)]
impl Iterator for Blocks<'_> {
  type Item = NonNull<Block>;

  fn next(&mut self) -> Option<Self::Item> {
    let block = NonNull::new(self.current)?;
    // SAFETY: guaranteed live by the contract of `FreeList::iter`.
    self.current = unsafe { Block::next(block) };
    Some(block)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blocks(sizes: &[usize]) -> Vec<Block> {
    sizes.iter().map(|&size| Block::new(size, false, ptr::null_mut())).collect()
  }

  fn sizes(list: &FreeList) -> Vec<usize> {
    unsafe { list.iter().map(|b| Block::size(b)).collect() }
  }

  #[test]
  fn test_append_keeps_acquisition_order() {
    let mut storage = blocks(&[30, 10, 20]);
    let mut list = FreeList::new();
    assert!(list.is_empty());

    unsafe {
      for block in storage.iter_mut() {
        list.append(NonNull::from(block));
      }
    }

    assert_eq!(sizes(&list), vec![30, 10, 20]);
    assert_eq!(list.head(), Some(NonNull::from(&mut storage[0])));
    assert_eq!(list.tail(), Some(NonNull::from(&mut storage[2])));
  }

  #[test]
  fn test_find_is_first_fit() {
    let mut storage = blocks(&[8, 64, 32, 128]);
    let mut list = FreeList::new();

    unsafe {
      for block in storage.iter_mut() {
        list.append(NonNull::from(block));
      }

      assert_eq!(list.find(1), None);

      storage[1].is_free = true;
      storage[2].is_free = true;
      storage[3].is_free = true;

      // 64 comes before the tighter 32.
      assert_eq!(list.find(20), Some(NonNull::from(&mut storage[1])));
      assert_eq!(list.find(64), Some(NonNull::from(&mut storage[1])));
      assert_eq!(list.find(65), Some(NonNull::from(&mut storage[3])));
      assert_eq!(list.find(129), None);
    }
  }

  #[test]
  fn test_find_on_empty_list() {
    let list = FreeList::new();
    assert_eq!(unsafe { list.find(1) }, None);
  }

  #[test]
  fn test_unlink_tail() {
    let mut storage = blocks(&[1, 2, 3]);
    let mut list = FreeList::new();

    unsafe {
      for block in storage.iter_mut() {
        list.append(NonNull::from(block));
      }

      assert_eq!(list.unlink_tail(), Some(NonNull::from(&mut storage[2])));
      assert_eq!(sizes(&list), vec![1, 2]);
      assert!(storage[1].next.is_null());

      assert_eq!(list.unlink_tail(), Some(NonNull::from(&mut storage[1])));
      assert_eq!(list.tail(), Some(NonNull::from(&mut storage[0])));

      assert_eq!(list.unlink_tail(), Some(NonNull::from(&mut storage[0])));
      assert!(list.is_empty());
      assert_eq!(list.tail(), None);

      assert_eq!(list.unlink_tail(), None);
    }
  }
}
