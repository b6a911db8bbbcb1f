//! Chain query provider endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::dto::ProviderStatusResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

/// GET /provider/status - Query Koios and report tip freshness
async fn get_status(State(state): State<AppState>) -> Json<ProviderStatusResponse> {
    let koios = state.koios();
    let status = koios.refresh_status().await;

    Json(ProviderStatusResponse {
        connected: status.is_online,
        url: koios.base_url().to_string(),
        network: state.config().network,
        tip_height: status.tip_height,
        tip_age_secs: status.tip_age_secs,
        tier: status.tier.as_str().to_string(),
    })
}
