//! HTTP routes.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use maestro_slack::CommandHandler;

/// Header a gateway sets when it base64-wraps the body.
const TRANSFER_ENCODING_HEADER: &str = "content-transfer-encoding";

pub fn routes() -> Router<Arc<CommandHandler>> {
    Router::new()
        .route("/slack/commands", post(slack_command))
        .route("/health", get(health_check))
}

/// Liveness check.
pub async fn health_check() -> &'static str {
    "ok"
}

/// Run one slash command.
pub async fn slack_command(
    State(handler): State<Arc<CommandHandler>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let is_base64 = headers
        .get(TRANSFER_ENCODING_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("base64"));

    let resp = handler.handle(&body, is_base64).await;
    (
        resp.status,
        [(header::CONTENT_TYPE, resp.content_type)],
        resp.body,
    )
        .into_response()
}
