use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::json;

use crate::services::webhook;
use crate::state::AppState;
use crate::stripe::webhook::SIGNATURE_HEADER;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Stripe callback endpoint. Takes the raw body: the signature covers the
/// exact bytes on the wire, so no extractor may touch them first.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    webhook::process(&state.pool, &state.config, &body, signature).await?;

    Ok(success(json!({ "received": true }), "Webhook processed"))
}
