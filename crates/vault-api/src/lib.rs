//! vault-api: HTTP API layer for hello-vault
//!
//! Serves the browser page, the session and contract endpoints, and the
//! wallet bridge the page polls.

pub mod dto;
pub mod page;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
