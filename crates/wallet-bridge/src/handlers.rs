//! HTTP handlers for the bridge endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::bridge::WalletBridge;
use crate::types::{BridgeResponse, BridgeStatus, RespondError};

/// Oldest unclaimed wallet request
/// GET /bridge/next
pub async fn handle_next(State(bridge): State<WalletBridge>) -> Response {
    match bridge.next_request().await {
        Some(view) => Json(view).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Browser answer for a request
/// POST /bridge/respond/{id}
pub async fn handle_respond(
    State(bridge): State<WalletBridge>,
    Path(request_id): Path<String>,
    Json(response): Json<BridgeResponse>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    bridge
        .respond(&request_id, response)
        .await
        .map(|_| Json(serde_json::json!({ "accepted": true })))
        .map_err(|e| {
            let status = match e {
                RespondError::NotFound(_) => StatusCode::NOT_FOUND,
                RespondError::Expired(_) => StatusCode::GONE,
            };
            (status, Json(serde_json::json!({ "error": e.to_string() })))
        })
}

/// GET /bridge/status
pub async fn handle_status(State(bridge): State<WalletBridge>) -> Json<BridgeStatus> {
    Json(bridge.status().await)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use cardano_tx::WalletProvider;
    use tower::ServiceExt;

    use crate::bridge::router;
    use crate::WalletBridge;

    use super::*;

    async fn send(bridge: &WalletBridge, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(bridge.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let bridge = WalletBridge::with_ttl(Duration::from_secs(30));
        let (status, body) = send(&bridge, get("/bridge/next")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, body) = send(&bridge, get("/bridge/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wallet_connected"], false);
        assert_eq!(body["pending"], 0);
    }

    #[tokio::test]
    async fn test_poll_and_respond_over_http() {
        let bridge = WalletBridge::with_ttl(Duration::from_secs(30));
        let call = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.connect().await }
        });

        let request = loop {
            let (status, body) = send(&bridge, get("/bridge/next")).await;
            if status == StatusCode::OK {
                break body;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        };
        assert_eq!(request["kind"], "connect");
        let id = request["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &bridge,
            post_json(
                &format!("/bridge/respond/{}", id),
                serde_json::json!({"ok": {"name": "nami"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], true);
        assert_eq!(call.await.unwrap().unwrap(), "nami");

        let (status, _) = send(
            &bridge,
            post_json(
                &format!("/bridge/respond/{}", id),
                serde_json::json!({"ok": null}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
