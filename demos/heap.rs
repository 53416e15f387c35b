use std::io::Read;

use brkalloc::{HEADER_SIZE, ProgramBreak, Sbrk, allocate, log_alloc, release};
use log::info;

/// Waits until the user presses ENTER.
/// Handy for inspecting the process with `pmap` or `gdb` between steps.
fn block_until_enter_pressed() {
  info!(">>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn log_program_break(label: &str) {
  info!(
    "[{}] PID = {}, program break = {:?}",
    label,
    std::process::id(),
    Sbrk::new().current()
  );
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

  info!("header size = {HEADER_SIZE} bytes");
  log_program_break("start");
  block_until_enter_pressed();

  // 1) Two fresh blocks: the break grows by header + payload each time.
  let first = allocate(40);
  log_alloc(40, first);
  let second = allocate(10);
  log_alloc(10, second);
  log_program_break("after two allocations");
  block_until_enter_pressed();

  // 2) The newest block ends at the break, so its memory goes back to the OS.
  unsafe { release(second) };
  log_program_break("after releasing the tail block");
  block_until_enter_pressed();

  // 3) `first` is still in use, so a new request grows the break again.
  let third = allocate(5);
  log_alloc(5, third);
  info!("third == second? {}", third == second);
  block_until_enter_pressed();

  // 4) `first` no longer sits at the break; releasing it only marks it free.
  unsafe { release(first) };
  log_program_break("after releasing an inner block");

  // 5) First fit: a 30 byte request lands in the 40 byte block.
  let fourth = allocate(30);
  log_alloc(30, fourth);
  info!(
    "fourth == first? {}",
    if fourth == first { "yes, the free block was reused" } else { "no, the break grew" }
  );
  block_until_enter_pressed();

  unsafe {
    release(third);
    release(fourth);
  }
  log_program_break("end");
}
