//! Session state machine
//!
//! `init -> locking -> locking-confirming -> locked -> unlocking ->
//! unlocking-confirming -> unlocked`, with lock re-enabled after an unlock and
//! unlock allowed straight from `init`.

use std::fmt;

use serde::{Deserialize, Serialize};
use vault_core::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Init,
    Locking,
    LockingConfirming,
    Locked,
    Unlocking,
    UnlockingConfirming,
    Unlocked,
}

/// User action that starts a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Lock,
    Unlock,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Locking => "locking",
            Self::LockingConfirming => "locking-confirming",
            Self::Locked => "locked",
            Self::Unlocking => "unlocking",
            Self::UnlockingConfirming => "unlocking-confirming",
            Self::Unlocked => "unlocked",
        }
    }

    /// A flow is building, signing, or waiting for confirmation
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Locking | Self::LockingConfirming | Self::Unlocking | Self::UnlockingConfirming
        )
    }

    pub fn can_lock(&self) -> bool {
        matches!(self, Self::Init | Self::Unlocked)
    }

    pub fn can_unlock(&self) -> bool {
        matches!(self, Self::Init | Self::Locked)
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Lock => self.can_lock(),
            Action::Unlock => self.can_unlock(),
        }
    }

    /// Progress line shown to the user
    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            Self::Init => None,
            Self::Locking | Self::Unlocking => Some("Creating transaction..."),
            Self::LockingConfirming | Self::UnlockingConfirming => {
                Some("Awaiting transaction confirm...")
            }
            Self::Locked | Self::Unlocked => Some("Transaction confirmed"),
        }
    }

    /// Gate check for `action`, yielding the in-progress state.
    pub fn start(self, action: Action) -> Result<Self, FlowError> {
        if !self.allows(action) {
            return Err(FlowError::Busy {
                action: action.to_string(),
                state: self.to_string(),
            });
        }
        Ok(match action {
            Action::Lock => Self::Locking,
            Action::Unlock => Self::Unlocking,
        })
    }

    /// Transaction hash obtained: move to the confirming step
    pub fn submitted(self) -> Self {
        match self {
            Self::Locking => Self::LockingConfirming,
            Self::Unlocking => Self::UnlockingConfirming,
            other => other,
        }
    }

    /// Confirmation observed: move to the terminal state of the flow
    pub fn confirmed(self) -> Self {
        match self {
            Self::LockingConfirming => Self::Locked,
            Self::UnlockingConfirming => Self::Unlocked,
            other => other,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
