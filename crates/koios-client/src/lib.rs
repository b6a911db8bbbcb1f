//! koios-client: Koios REST client with provider status detection
//!
//! Implements [`ChainProvider`] over the Koios v1 API: UTxO lookup by
//! address, transaction confirmation counts, and chain tip probing.

pub mod responses;
pub mod status;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use cardano_tx::{ChainProvider, Utxo};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use vault_core::{Address, AppConfig, ProviderError, TxHash};

pub use responses::{ChainTip, KoiosTxStatus, KoiosUtxo};
pub use status::{ProviderStatus, StatusTier};

/// Timeout for a single Koios call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for Koios client operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Koios client with cached provider status
#[derive(Clone)]
pub struct KoiosClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    status: Arc<RwLock<Option<ProviderStatus>>>,
}

impl KoiosClient {
    /// Create a client for `base_url`. An empty `api_key` means anonymous access.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("hello-vault")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::ApiError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let api_key = Some(api_key.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            status: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.provider_url(), &config.provider.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::ApiError {
                message: format!(
                    "Koios request timed out after {}s",
                    REQUEST_TIMEOUT.as_secs()
                ),
            }
        } else if e.is_connect() {
            ProviderError::Unreachable {
                url: self.base_url.clone(),
            }
        } else {
            ProviderError::ApiError {
                message: e.to_string(),
            }
        }
    }

    /// Current chain tip
    pub async fn tip(&self) -> Result<ChainTip> {
        let tips: Vec<ChainTip> = self.send(self.http.get(self.url("tip"))).await?;
        tips.into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("empty tip response".to_string()))
    }

    /// Unspent outputs at the given addresses, with inline datums and assets
    pub async fn address_utxos(&self, addresses: &[Address]) -> Result<Vec<KoiosUtxo>> {
        let body = serde_json::json!({
            "_addresses": addresses,
            "_extended": true,
        });
        self.send(self.http.post(self.url("address_utxos")).json(&body))
            .await
    }

    pub async fn tx_status(&self, tx_hashes: &[TxHash]) -> Result<Vec<KoiosTxStatus>> {
        let body = serde_json::json!({ "_tx_hashes": tx_hashes });
        self.send(self.http.post(self.url("tx_status")).json(&body))
            .await
    }

    /// Query `/tip` and cache the resulting status
    pub async fn refresh_status(&self) -> ProviderStatus {
        let status = match self.tip().await {
            Ok(tip) => ProviderStatus::from_tip(&tip, unix_now()),
            Err(e) => {
                tracing::warn!("Koios status check failed: {}", e);
                ProviderStatus::offline()
            }
        };
        *self.status.write().await = Some(status.clone());
        status
    }

    /// Last checked status (may be stale if not recently refreshed)
    pub async fn status(&self) -> Option<ProviderStatus> {
        self.status.read().await.clone()
    }

    pub async fn is_online(&self) -> bool {
        self.tip().await.is_ok()
    }
}

#[async_trait]
impl ChainProvider for KoiosClient {
    async fn fetch_address_utxos(
        &self,
        address: &Address,
        asset: Option<&str>,
    ) -> Result<Vec<Utxo>> {
        let raw = self.address_utxos(std::slice::from_ref(address)).await?;
        let total = raw.len();
        let utxos = raw
            .into_iter()
            .filter(|u| asset.map_or(true, |unit| u.holds_asset(unit)))
            .map(KoiosUtxo::into_utxo)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            "Fetched {} UTxOs at {} ({} after asset filter)",
            total,
            address,
            utxos.len()
        );
        Ok(utxos)
    }

    async fn tx_confirmations(&self, tx_hash: &TxHash) -> Result<Option<u64>> {
        let statuses = self.tx_status(std::slice::from_ref(tx_hash)).await?;
        Ok(statuses
            .into_iter()
            .find(|s| s.tx_hash.eq_ignore_ascii_case(tx_hash.as_str()))
            .and_then(|s| s.num_confirmations))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::Network;

    #[test]
    fn test_base_url_normalization() {
        let client = KoiosClient::new("https://preprod.koios.rest/api/v1/", "").unwrap();
        assert_eq!(client.base_url(), "https://preprod.koios.rest/api/v1");
        assert_eq!(
            client.url("/tip"),
            "https://preprod.koios.rest/api/v1/tip"
        );
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig {
            network: Network::Preview,
            ..AppConfig::default()
        };
        config.provider.api_key = " token ".to_string();
        let client = KoiosClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "https://preview.koios.rest/api/v1");
        assert_eq!(client.api_key.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_reports_offline() {
        // Port 9 (discard) is closed on test hosts
        let client = KoiosClient::new("http://127.0.0.1:9/api/v1", "").unwrap();
        assert!(client.status().await.is_none());
        let status = client.refresh_status().await;
        assert_eq!(status.tier, StatusTier::Offline);
        assert!(!client.is_online().await);
        assert_eq!(client.status().await.unwrap().tier, StatusTier::Offline);
    }
}
