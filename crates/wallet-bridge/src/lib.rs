//! Browser wallet bridge
//!
//! Wallet calls (enable, used addresses, sign, submit) are queued as pending
//! requests. The browser page polls `GET /bridge/next`, performs the call
//! against the CIP-30 wallet, and posts the result to
//! `POST /bridge/respond/:id`.

pub mod bridge;
pub mod handlers;
pub mod types;

pub use bridge::{router, WalletBridge};
pub use types::*;
