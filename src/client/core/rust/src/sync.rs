/* src/client/core/rust/src/sync.rs */

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock without propagating poisoning: every critical section in this crate
/// leaves its data consistent before any point that could panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
