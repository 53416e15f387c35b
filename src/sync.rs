// Synchronization shim.
//
// Under `cfg(loom)` the engine's lock comes from `loom` so model tests can
// explore every interleaving; otherwise from `std`. Import locks and threads
// through here, never from `std::sync` directly.

#[cfg(loom)]
pub(crate) use loom::sync::{Arc, Mutex, MutexGuard};

#[cfg(not(loom))]
pub(crate) use std::sync::{Mutex, MutexGuard};

#[cfg(loom)]
pub(crate) mod thread {
  pub(crate) use loom::thread::spawn;
}
