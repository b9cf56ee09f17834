pub mod credentials;
mod gate;
mod store;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use gate::{AuthGate, GateDecision};
pub use store::{SessionState, SessionStore};
