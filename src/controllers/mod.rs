//! Page-level controllers. Each owns its view's input state, exposes the
//! collections it renders through the shared [`EntityStore`], and applies
//! the confirm-then-patch update pattern: local state changes only after
//! the server has accepted the mutation.

mod dashboard;
mod login;
mod profile;
mod register;
mod task_list;

pub use dashboard::DashboardController;
pub use login::LoginController;
pub use profile::ProfileController;
pub use register::RegisterController;
pub use task_list::TaskListController;

use std::sync::atomic::{AtomicBool, Ordering};

/// Routing side effects as values; controllers never navigate themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    None,
    Dashboard,
    Login,
}

/// One-flag-per-view mutual exclusion: while a mutation is in flight,
/// every other mutating entry point on the same controller is a no-op.
/// Coarse on purpose; the model is one in-flight mutation per view.
pub(crate) struct SubmitLock {
    busy: AtomicBool,
}

impl SubmitLock {
    pub(crate) fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Returns a guard that releases the lock on drop, or `None` when a
    /// mutation is already in flight.
    pub(crate) fn try_acquire(&self) -> Option<SubmitGuard<'_>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(SubmitGuard { lock: self })
        }
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

pub(crate) struct SubmitGuard<'a> {
    lock: &'a SubmitLock,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_lock_excludes_while_held() {
        let lock = SubmitLock::new();
        assert!(!lock.is_submitting());

        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_submitting());
        assert!(lock.try_acquire().is_none());

        drop(guard);
        assert!(!lock.is_submitting());
        assert!(lock.try_acquire().is_some());
    }
}
