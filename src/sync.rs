use std::sync::{Mutex, MutexGuard, PoisonError};

/// Every guarded value is left consistent before any callback runs, so a
/// poisoned lock is still safe to reuse.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
