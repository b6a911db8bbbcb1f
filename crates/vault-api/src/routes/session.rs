//! Session endpoints
//!
//! Lock and unlock start a flow in the background and answer 202 once the
//! gate check has passed. Progress is read back through `GET /session`.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use vault_session::{Action, SessionSnapshot};

use super::{error_response, ErrorResponse};
use crate::dto::{CancelResponse, FlowAccepted};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lock", post(lock))
        .route("/unlock", post(unlock))
        .route("/cancel", post(cancel))
        .route("/reset", post(reset))
}

/// GET /session - Current state, status text, last transaction and error
pub async fn snapshot(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session().snapshot().await)
}

/// POST /session/lock
async fn lock(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<FlowAccepted>), ErrorResponse> {
    start_flow(&state, Action::Lock).await
}

/// POST /session/unlock
async fn unlock(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<FlowAccepted>), ErrorResponse> {
    start_flow(&state, Action::Unlock).await
}

async fn start_flow(
    state: &AppState,
    action: Action,
) -> Result<(StatusCode, Json<FlowAccepted>), ErrorResponse> {
    let session = state.session();
    let handle = session
        .spawn_flow(action)
        .await
        .map_err(|e| error_response(&e))?;

    let flow_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(flow_id = %flow_id, "{} flow accepted", action);

    let id = flow_id.clone();
    tokio::spawn(async move {
        match handle.await {
            Ok(Ok(tx_hash)) => {
                tracing::info!(flow_id = %id, tx_hash = %tx_hash, "{} flow finished", action)
            }
            Ok(Err(e)) => tracing::warn!(flow_id = %id, "{} flow failed: {}", action, e),
            Err(e) => tracing::error!(flow_id = %id, "{} flow task aborted: {}", action, e),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(FlowAccepted {
            flow_id,
            action,
            state: session.state().await,
        }),
    ))
}

/// POST /session/cancel - Stop waiting for the pending confirmation
async fn cancel(State(state): State<AppState>) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.session().cancel_confirmation().await,
    })
}

/// POST /session/reset - Back to `init` with no wallet. The page calls this
/// on load, so a reload never inherits a flow or wallet it cannot drive.
async fn reset(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let session = state.session();
    session.reset().await;
    state.bridge().disconnect().await;
    Json(session.snapshot().await)
}
