use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::services::connect::{
    self, AccountStatusRequest, CreateAccountRequest, OnboardingLinkRequest,
};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Response, AppError> {
    let account = connect::create_account(&state.pool, &state.stripe, &request).await?;
    Ok(created(account, "Payout account created"))
}

pub async fn create_onboarding_link(
    State(state): State<AppState>,
    Json(request): Json<OnboardingLinkRequest>,
) -> Result<Response, AppError> {
    let link = connect::create_onboarding_link(&state.stripe, &state.config, &request).await?;
    Ok(success(link, "Onboarding link created"))
}

pub async fn account_status(
    State(state): State<AppState>,
    Json(request): Json<AccountStatusRequest>,
) -> Result<Response, AppError> {
    let status = connect::account_status(&state.pool, &state.stripe, &request).await?;
    Ok(success(status, "Account status retrieved"))
}
