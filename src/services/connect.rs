use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::db::users;
use crate::stripe::types::{AccountLinkParams, AccountParams};
use crate::stripe::StripeClient;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountCreated {
    pub account_id: String,
}

/// Create an Express payout account for an organizer and persist its id.
pub async fn create_account(
    pool: &PgPool,
    stripe: &StripeClient,
    request: &CreateAccountRequest,
) -> Result<AccountCreated, AppError> {
    if request.email.trim().is_empty() {
        return Err(AppError::ValidationError("email is required".to_string()));
    }

    users::find(pool, request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", request.user_id)))?;

    let account = stripe
        .create_express_account(&AccountParams {
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
        })
        .await?;

    let saved = users::set_stripe_account(pool, request.user_id, &account.id).await?;
    if !saved {
        return Err(AppError::InternalServerError(
            "failed to save payout account".to_string(),
        ));
    }

    Ok(AccountCreated {
        account_id: account.id,
    })
}

#[derive(Debug, Deserialize)]
pub struct OnboardingLinkRequest {
    pub account_id: String,
}

#[derive(Debug, Serialize)]
pub struct OnboardingLink {
    pub url: String,
}

pub async fn create_onboarding_link(
    stripe: &StripeClient,
    config: &Config,
    request: &OnboardingLinkRequest,
) -> Result<OnboardingLink, AppError> {
    if request.account_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "account id is required".to_string(),
        ));
    }

    let link = stripe
        .create_onboarding_link(&AccountLinkParams {
            account_id: request.account_id.clone(),
            refresh_url: format!(
                "{}/plan?refresh={}",
                config.app_base_url, request.account_id
            ),
            return_url: format!("{}/plan?onboarding=complete", config.app_base_url),
        })
        .await?;

    Ok(OnboardingLink { url: link.url })
}

#[derive(Debug, Deserialize)]
pub struct AccountStatusRequest {
    pub account_id: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AccountStatus {
    pub account_id: String,
    pub onboarding_complete: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
}

/// Query onboarding progress and persist the flag once complete. Safe to call
/// repeatedly; re-checking a completed account is a no-op.
pub async fn account_status(
    pool: &PgPool,
    stripe: &StripeClient,
    request: &AccountStatusRequest,
) -> Result<AccountStatus, AppError> {
    let account = stripe.retrieve_account(&request.account_id).await?;
    let onboarding_complete = account.onboarding_complete();

    if onboarding_complete {
        // The status report stands even if persisting the flag fails.
        if let Err(e) = users::mark_onboarding_complete(pool, request.user_id).await {
            warn!(error = ?e, user_id = %request.user_id, "failed to persist onboarding status");
        }
    }

    Ok(AccountStatus {
        account_id: account.id,
        onboarding_complete,
        charges_enabled: account.charges_enabled,
        payouts_enabled: account.payouts_enabled,
        details_submitted: account.details_submitted,
    })
}
