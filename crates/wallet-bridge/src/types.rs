//! Bridge request and response types

use std::time::Duration;

use cardano_tx::{SignedTx, UnsignedTx};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Wallet call relayed to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestKind {
    /// `cardano.{wallet}.enable()`
    Connect,
    /// `api.getUsedAddresses()`, answered as bech32 strings
    UsedAddresses,
    /// Complete and sign the intent; answered with the signed CBOR hex
    SignTx {
        unsigned_tx: UnsignedTx,
        partial_sign: bool,
    },
    /// `api.submitTx()`; answered with the transaction hash
    SubmitTx { signed_tx: SignedTx },
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::UsedAddresses => "used_addresses",
            Self::SignTx { .. } => "sign_tx",
            Self::SubmitTx { .. } => "submit_tx",
        }
    }
}

/// What the browser sees from `GET /bridge/next`
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: String,
    #[serde(flatten)]
    pub kind: RequestKind,
    pub age_secs: u64,
}

pub(crate) type Responder = oneshot::Sender<Result<serde_json::Value, String>>;

/// A request waiting for the browser
#[derive(Debug)]
pub struct PendingRequest {
    pub id: String,
    pub kind: RequestKind,
    pub created_at: Instant,
    /// Handed out by `/bridge/next`
    pub claimed: bool,
    pub(crate) responder: Option<Responder>,
}

impl PendingRequest {
    pub(crate) fn new(id: String, kind: RequestKind, responder: Responder) -> Self {
        Self {
            id,
            kind,
            created_at: Instant::now(),
            claimed: false,
            responder: Some(responder),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    pub fn view(&self) -> RequestView {
        RequestView {
            id: self.id.clone(),
            kind: self.kind.clone(),
            age_secs: self.created_at.elapsed().as_secs(),
        }
    }
}

/// Browser answer: `{"ok": <value>}` or `{"error": "<message>"}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn ok(value: serde_json::Value) -> Self {
        Self {
            ok: Some(value),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: None,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<serde_json::Value, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.ok.unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// Answer to a connect request
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResult {
    pub name: String,
}

/// `GET /bridge/status`
#[derive(Debug, Clone, Serialize)]
pub struct BridgeStatus {
    pub wallet_connected: bool,
    pub wallet_name: Option<String>,
    pub pending: usize,
    pub claimed: usize,
    /// Seconds since the page last polled, `None` if it never did
    pub last_poll_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RespondError {
    #[error("unknown request {0}")]
    NotFound(String),

    #[error("request {0} expired")]
    Expired(String),
}
