//! Data Transfer Objects for API requests and responses

use serde::{Deserialize, Serialize};
use vault_core::{Error, Network};
use vault_session::{Action, SessionState, WalletInfo};
use wallet_bridge::BridgeStatus;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Chain query provider status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatusResponse {
    pub connected: bool,
    pub url: String,
    pub network: Network,
    pub tip_height: Option<u64>,
    pub tip_age_secs: Option<u64>,
    pub tier: String,
}

/// A lock or unlock flow accepted for background execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowAccepted {
    /// Correlates the flow's log lines
    pub flow_id: String,
    pub action: Action,
    pub state: SessionState,
}

/// `GET /wallet`
#[derive(Debug, Clone, Serialize)]
pub struct WalletStatusResponse {
    pub connected: bool,
    pub wallet: Option<WalletInfo>,
    pub bridge: BridgeStatus,
}

/// `POST /session/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&Error> for ApiError {
    fn from(e: &Error) -> Self {
        Self::new(e.error_code(), e.to_string())
    }
}
