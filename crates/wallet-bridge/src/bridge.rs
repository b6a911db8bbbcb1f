//! Pending request queue and the `WalletProvider` it backs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::{get, post};
use axum::Router;
use cardano_tx::{SignedTx, UnsignedTx, WalletProvider};
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use vault_core::{Address, BridgeConfig, WalletError};

use crate::handlers::{handle_next, handle_respond, handle_status};
use crate::types::{
    BridgeResponse, BridgeStatus, ConnectResult, PendingRequest, RequestKind, RequestView,
    RespondError,
};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to the bridge, cheap to clone
#[derive(Clone)]
pub struct WalletBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    ttl: Duration,
    pending: RwLock<HashMap<String, PendingRequest>>,
    wallet_name: RwLock<Option<String>>,
    last_poll: RwLock<Option<Instant>>,
}

impl WalletBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_ttl(Duration::from_secs(config.request_ttl_secs))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                ttl,
                pending: RwLock::new(HashMap::new()),
                wallet_name: RwLock::new(None),
                last_poll: RwLock::new(None),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Purge expired requests every minute
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let bridge = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVAL).await;
                bridge.purge_expired().await;
            }
        })
    }

    /// Drop expired requests. Their callers see a bridge failure.
    pub async fn purge_expired(&self) -> usize {
        let ttl = self.inner.ttl;
        let mut pending = self.inner.pending.write().await;
        let before = pending.len();
        pending.retain(|id, req| {
            let expired = req.is_expired(ttl);
            if expired {
                tracing::debug!("Cleaning up expired wallet request: {}", id);
            }
            !expired
        });
        before - pending.len()
    }

    /// Oldest unclaimed request, marked as claimed
    pub async fn next_request(&self) -> Option<RequestView> {
        *self.inner.last_poll.write().await = Some(Instant::now());

        let ttl = self.inner.ttl;
        let mut pending = self.inner.pending.write().await;
        let request = pending
            .values_mut()
            .filter(|r| !r.claimed && !r.is_expired(ttl))
            .min_by_key(|r| r.created_at)?;
        request.claimed = true;
        tracing::debug!(
            "Wallet request {} ({}) handed to browser",
            request.id,
            request.kind.as_str()
        );
        Some(request.view())
    }

    /// Deliver the browser's answer to the waiting caller
    pub async fn respond(&self, id: &str, response: BridgeResponse) -> Result<(), RespondError> {
        let mut request = self
            .inner
            .pending
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RespondError::NotFound(id.to_string()))?;

        if request.is_expired(self.inner.ttl) {
            return Err(RespondError::Expired(id.to_string()));
        }

        if let Some(responder) = request.responder.take() {
            // Caller may have given up already
            let _ = responder.send(response.into_result());
        }
        Ok(())
    }

    pub async fn status(&self) -> BridgeStatus {
        let pending = self.inner.pending.read().await;
        let wallet_name = self.inner.wallet_name.read().await.clone();
        let last_poll = *self.inner.last_poll.read().await;
        BridgeStatus {
            wallet_connected: wallet_name.is_some(),
            wallet_name,
            pending: pending.len(),
            claimed: pending.values().filter(|r| r.claimed).count(),
            last_poll_secs: last_poll.map(|t| t.elapsed().as_secs()),
        }
    }

    /// Forget the enabled wallet and drop every pending request, as when the
    /// page that answered them is gone. Returns the number dropped.
    pub async fn disconnect(&self) -> usize {
        let name = self.inner.wallet_name.write().await.take();
        let dropped = {
            let mut pending = self.inner.pending.write().await;
            let n = pending.len();
            pending.clear();
            n
        };
        if let Some(name) = name {
            tracing::info!("Browser wallet {} disconnected, {} request(s) dropped", name, dropped);
        }
        dropped
    }

    /// Queue `kind` and wait for the browser to answer or the TTL to pass
    async fn request(&self, kind: RequestKind) -> Result<serde_json::Value, WalletError> {
        let id = generate_request_id();
        let label = kind.as_str();
        let (tx, rx) = oneshot::channel();

        self.inner
            .pending
            .write()
            .await
            .insert(id.clone(), PendingRequest::new(id.clone(), kind, tx));
        tracing::debug!("Queued wallet request {} ({})", id, label);

        match tokio::time::timeout(self.inner.ttl, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(reason))) => {
                tracing::warn!("Wallet request {} ({}) rejected: {}", id, label, reason);
                Err(WalletError::Rejected { reason })
            }
            Ok(Err(_)) => Err(WalletError::Bridge {
                message: format!("request {} dropped before an answer", id),
            }),
            Err(_) => {
                self.inner.pending.write().await.remove(&id);
                tracing::warn!("Wallet request {} ({}) timed out", id, label);
                Err(WalletError::Timeout {
                    secs: self.inner.ttl.as_secs(),
                })
            }
        }
    }
}

fn unexpected(kind: &str, e: impl std::fmt::Display) -> WalletError {
    WalletError::Bridge {
        message: format!("unexpected {} answer: {}", kind, e),
    }
}

#[async_trait]
impl WalletProvider for WalletBridge {
    async fn connect(&self) -> Result<String, WalletError> {
        let value = self.request(RequestKind::Connect).await?;
        let result: ConnectResult =
            serde_json::from_value(value).map_err(|e| unexpected("connect", e))?;
        *self.inner.wallet_name.write().await = Some(result.name.clone());
        tracing::info!("Browser wallet enabled: {}", result.name);
        Ok(result.name)
    }

    async fn is_connected(&self) -> bool {
        self.inner.wallet_name.read().await.is_some()
    }

    async fn used_addresses(&self) -> Result<Vec<Address>, WalletError> {
        if !self.is_connected().await {
            return Err(WalletError::NotConnected);
        }
        let value = self.request(RequestKind::UsedAddresses).await?;
        serde_json::from_value(value).map_err(|e| unexpected("used_addresses", e))
    }

    async fn sign_tx(&self, tx: &UnsignedTx, partial_sign: bool) -> Result<SignedTx, WalletError> {
        let value = self
            .request(RequestKind::SignTx {
                unsigned_tx: tx.clone(),
                partial_sign,
            })
            .await?;
        let cbor: String = serde_json::from_value(value).map_err(|e| unexpected("sign_tx", e))?;
        Ok(SignedTx { cbor })
    }

    async fn submit_tx(&self, tx: &SignedTx) -> Result<String, WalletError> {
        let value = self
            .request(RequestKind::SubmitTx {
                signed_tx: tx.clone(),
            })
            .await?;
        // Wallets that resolve submitTx without a hash produce null
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

/// Bridge endpoints, to be merged into the API router
pub fn router(bridge: WalletBridge) -> Router {
    Router::new()
        .route("/bridge/next", get(handle_next))
        .route("/bridge/respond/:id", post(handle_respond))
        .route("/bridge/status", get(handle_status))
        .with_state(bridge)
}

/// Timestamp plus random suffix
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random: u32 = rand::random();
    format!("{:x}{:08x}", timestamp, random)
}
