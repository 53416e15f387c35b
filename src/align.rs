/// Boundary every block header, and therefore every payload that follows
/// one, is rounded to. Fixed regardless of the target's pointer width.
pub const ALIGNMENT: usize = 16;

/// Rounds `value` up to the machine word size.
///
/// # Examples
///
/// ```rust
/// use brkalloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}

/// Rounds `value` up to `boundary`, which must be a power of two.
///
/// ```rust
/// use brkalloc::{align_to, ALIGNMENT};
///
/// assert_eq!(align_to!(1, ALIGNMENT), 16);
/// assert_eq!(align_to!(32, ALIGNMENT), 32);
/// assert_eq!(align_to!(33, ALIGNMENT), 48);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $boundary:expr) => {
    ($value + $boundary - 1) & !($boundary - 1)
  };
}

/// Like [`align_to!`] but reports overflow instead of wrapping, for sizes
/// that come straight from a caller.
pub fn checked_align_to(
  value: usize,
  boundary: usize,
) -> Option<usize> {
  debug_assert!(boundary.is_power_of_two());
  value.checked_add(boundary - 1).map(|v| v & !(boundary - 1))
}
