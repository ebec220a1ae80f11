//! Busy flag for user-triggered operations.
//!
//! A front end disables the control that started an operation until it
//! settles. [`PendingFlag::try_begin`] hands out at most one guard at a
//! time; dropping the guard clears the flag whether the operation
//! succeeded, failed or unwound.

#[cfg(test)]
#[path = "pending_test.rs"]
mod pending_test;

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct PendingFlag {
    pending: AtomicBool,
}

impl PendingFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Mark the operation as started, or `None` if it already is.
    #[must_use]
    pub fn try_begin(&self) -> Option<PendingGuard<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard { flag: self })
    }
}

/// Clears its flag on drop.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    flag: &'a PendingFlag,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.pending.store(false, Ordering::Release);
    }
}
