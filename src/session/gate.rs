use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::User;
use crate::session::store::SessionStore;

/// What a protected view should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still resolving: render a neutral placeholder, never the
    /// protected content.
    Pending,
    /// Viewer is authenticated.
    Allow(User),
    /// Viewer is not authenticated; navigate to login. Emitted at most
    /// once per gate so re-renders do not re-navigate.
    RedirectToLogin,
    /// Still unauthenticated after the redirect was already issued.
    Denied,
}

/// Guards one protected view. Evaluate on every render; the redirect
/// side effect fires exactly once per denial.
pub struct AuthGate {
    redirected: AtomicBool,
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            redirected: AtomicBool::new(false),
        }
    }

    pub fn evaluate(&self, session: &SessionStore) -> GateDecision {
        if session.is_loading() {
            return GateDecision::Pending;
        }
        match session.current_user() {
            Some(user) => {
                // A later login clears the way for a fresh redirect if the
                // viewer logs out again.
                self.redirected.store(false, Ordering::SeqCst);
                GateDecision::Allow(user)
            }
            None => {
                if self.redirected.swap(true, Ordering::SeqCst) {
                    GateDecision::Denied
                } else {
                    GateDecision::RedirectToLogin
                }
            }
        }
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}
