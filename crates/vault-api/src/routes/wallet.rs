//! Wallet endpoints

use axum::{extract::State, routing::post, Json, Router};
use cardano_tx::WalletProvider;
use vault_session::WalletInfo;

use super::{error_response, ErrorResponse};
use crate::dto::WalletStatusResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/connect", post(connect))
}

/// POST /wallet/connect - Enable the browser wallet and read its address
///
/// Resolves once the page has answered the bridge's connect and address
/// requests.
async fn connect(State(state): State<AppState>) -> Result<Json<WalletInfo>, ErrorResponse> {
    state
        .session()
        .connect_wallet()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!("Wallet connect failed: {}", e);
            error_response(&e)
        })
}

/// GET /wallet - Connected wallet and bridge status
pub async fn wallet_status(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    let bridge = state.bridge();
    Json(WalletStatusResponse {
        connected: bridge.is_connected().await,
        wallet: state.session().wallet_info().await,
        bridge: bridge.status().await,
    })
}
