//! Contract endpoints and the browser page

use axum::{extract::State, response::Html, Json};
use hello_validator::ContractInfo;

use crate::page::render_page;
use crate::AppState;

fn info(state: &AppState) -> ContractInfo {
    state
        .contract()
        .info(state.session().settings().lock_amount)
}

/// GET / - Browser page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&info(&state)))
}

/// GET /contract - Script hash, address and lock parameters
pub async fn contract_info(State(state): State<AppState>) -> Json<ContractInfo> {
    Json(info(&state))
}
