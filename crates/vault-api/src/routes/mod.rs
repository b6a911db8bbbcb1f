//! API route handlers

pub mod contract;
pub mod health;
pub mod provider;
pub mod session;
pub mod wallet;

use axum::{http::StatusCode, routing::get, Json, Router};
use vault_core::Error;

use crate::dto::ApiError;
use crate::AppState;

/// Error half of every fallible handler
pub type ErrorResponse = (StatusCode, Json<ApiError>);

pub(crate) fn error_response(e: &Error) -> ErrorResponse {
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ApiError::from(e)),
    )
}

/// API router with all routes, including the wallet bridge
pub fn create_router(state: AppState) -> Router {
    let bridge = wallet_bridge::router(state.bridge().clone());

    Router::new()
        .route("/", get(contract::index))
        .route("/health", get(health::health_check))
        .route("/contract", get(contract::contract_info))
        .route("/session", get(session::snapshot))
        .route("/wallet", get(wallet::wallet_status))
        .nest("/provider", provider::router())
        .nest("/session", session::router())
        .nest("/wallet", wallet::router())
        .with_state(state)
        .merge(bridge)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use cardano_tx::plutus_data::wrap_cbor_bytes;
    use cardano_tx::{
        ChainProvider, PlutusScript, PlutusVersion, SignedTx, UnsignedTx, Utxo, WalletProvider,
    };
    use hello_validator::HelloContract;
    use koios_client::KoiosClient;
    use tower::ServiceExt;
    use vault_core::{Address, AppConfig, Network, ProviderError, TxHash, WalletError};
    use vault_session::{Session, SessionSettings};
    use wallet_bridge::WalletBridge;

    use super::*;

    const WALLET_ADDRESS: &str = "addr_test1vz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerspjrlsz";
    const SUBMITTED: &str = "aa00000000000000000000000000000000000000000000000000000000000001";

    /// Always connected, signs and submits everything
    struct StubWallet;

    #[async_trait]
    impl WalletProvider for StubWallet {
        async fn connect(&self) -> Result<String, WalletError> {
            Ok("stub".to_string())
        }

        async fn is_connected(&self) -> bool {
            true
        }

        async fn used_addresses(&self) -> Result<Vec<Address>, WalletError> {
            Ok(vec![Address::new(WALLET_ADDRESS)])
        }

        async fn sign_tx(&self, _tx: &UnsignedTx, _partial: bool) -> Result<SignedTx, WalletError> {
            Ok(SignedTx {
                cbor: "84a0".to_string(),
            })
        }

        async fn submit_tx(&self, _tx: &SignedTx) -> Result<String, WalletError> {
            Ok(SUBMITTED.to_string())
        }
    }

    /// No UTxOs; every transaction is confirmed on the first poll
    struct StubChain;

    #[async_trait]
    impl ChainProvider for StubChain {
        async fn fetch_address_utxos(
            &self,
            _address: &Address,
            _asset: Option<&str>,
        ) -> Result<Vec<Utxo>, ProviderError> {
            Ok(vec![])
        }

        async fn tx_confirmations(&self, _tx_hash: &TxHash) -> Result<Option<u64>, ProviderError> {
            Ok(Some(1))
        }
    }

    fn contract() -> Arc<HelloContract> {
        let code = hex::encode(wrap_cbor_bytes(&[0x01, 0x00, 0x00, 0x32, 0x22]));
        let script = PlutusScript::new(&code, PlutusVersion::V2).unwrap();
        Arc::new(HelloContract::new(script, Network::Preprod).unwrap())
    }

    fn app_state(wallet: Arc<dyn WalletProvider>) -> AppState {
        let config = AppConfig::default();
        // Nothing listens on the discard port
        let koios = KoiosClient::new("http://127.0.0.1:9", "").unwrap();
        let bridge = WalletBridge::with_ttl(Duration::from_secs(30));
        let session = Session::new(
            wallet,
            Arc::new(StubChain),
            contract(),
            SessionSettings::from(&config),
        );
        AppState::with_session(config, koios, bridge, Arc::new(session))
    }

    async fn send(state: &AppState, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = create_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let state = app_state(Arc::new(StubWallet));
        let (status, body) = send(&state, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_contract_info_and_page() {
        let state = app_state(Arc::new(StubWallet));
        let (status, body) = send(&state, "GET", "/contract").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scriptAddress"], state.contract().address().as_str());
        assert_eq!(body["lockAmount"], 2_000_000);
        assert_eq!(body["redeemer"], "Hello plu-ts");
        assert_eq!(body["plutusVersion"], "PlutusScriptV2");

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = create_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains(state.contract().address().as_str()));
    }

    #[tokio::test]
    async fn test_lock_requires_wallet() {
        // The bridge has no browser wallet behind it
        let state = app_state(Arc::new(WalletBridge::with_ttl(Duration::from_secs(30))));
        let (status, body) = send(&state, "POST", "/session/lock").await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["code"], "wallet_not_connected");

        let (_, body) = send(&state, "GET", "/session").await;
        assert_eq!(body["state"], "init");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_flow_over_http() {
        let state = app_state(Arc::new(StubWallet));

        let (status, body) = send(&state, "POST", "/session/lock").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["action"], "lock");
        assert!(matches!(
            body["state"].as_str(),
            Some("locking") | Some("locking-confirming")
        ));
        assert!(body["flow_id"].as_str().is_some());

        let snapshot = loop {
            let (_, body) = send(&state, "GET", "/session").await;
            if body["state"] == "locked" {
                break body;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        };
        assert_eq!(snapshot["status"], "Transaction confirmed");
        assert_eq!(snapshot["lastTxHash"], SUBMITTED);
        assert_eq!(snapshot["network"], "preprod");

        let (status, body) = send(&state, "POST", "/session/lock").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "busy");

        let (status, body) = send(&state, "POST", "/session/cancel").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cancelled"], false);

        let (status, body) = send(&state, "POST", "/session/reset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "init");
        assert!(body["lastTxHash"].is_null());
    }

    #[tokio::test]
    async fn test_wallet_status_and_bridge_routes() {
        let state = app_state(Arc::new(StubWallet));

        let (status, body) = send(&state, "GET", "/wallet").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], false);
        assert!(body["wallet"].is_null());
        assert_eq!(body["bridge"]["pending"], 0);

        let (status, _) = send(&state, "GET", "/bridge/next").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&state, "POST", "/wallet/connect").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "stub");
        assert_eq!(body["address"], WALLET_ADDRESS);
        let (_, body) = send(&state, "GET", "/session").await;
        assert_eq!(body["wallet"]["name"], "stub");

        // A page load starts over without the previous page's wallet
        let (status, body) = send(&state, "POST", "/session/reset").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["wallet"].is_null());
        let (_, body) = send(&state, "GET", "/wallet").await;
        assert!(body["wallet"].is_null());
        assert_eq!(body["bridge"]["wallet_connected"], false);
    }

    #[tokio::test]
    async fn test_provider_status_offline() {
        let state = app_state(Arc::new(StubWallet));
        let (status, body) = send(&state, "GET", "/provider/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], false);
        assert_eq!(body["tier"], "Offline");
        assert_eq!(body["url"], "http://127.0.0.1:9");
        assert!(body["tip_height"].is_null());
    }
}
