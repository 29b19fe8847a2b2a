use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::services::checkout::{self, PurchaseRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Response, AppError> {
    let session =
        checkout::create_session(&state.pool, &state.stripe, &state.config, &request).await?;
    Ok(success(session, "Checkout session created"))
}
