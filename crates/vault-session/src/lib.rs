//! vault-session: Lock/unlock session for the hello validator
//!
//! Owns the linear UI state machine, runs the lock and unlock flows against
//! injected wallet and chain providers, and follows submitted transactions
//! until they confirm.

pub mod session;
pub mod state;
pub mod watcher;

pub use session::{Session, SessionSettings, SessionSnapshot, WalletInfo};
pub use state::{Action, SessionState};
pub use watcher::{CancelHandle, ConfirmationWatcher, Subscription, WatchOutcome, WatchSettings};
