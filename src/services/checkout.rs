use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::models::event::{Event, EventStatus};
use crate::stripe::types::{CheckoutSessionParams, SessionMetadata};
use crate::stripe::{StripeClient, StripeError};
use crate::utils::error::AppError;
use crate::utils::money;

const PRODUCT_DESCRIPTION_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub event_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub user_id: Uuid,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionCreated {
    pub session_id: String,
    pub url: String,
}

/// Create a Stripe Checkout session for a ticket purchase.
///
/// Preconditions run in order and abort before any session exists: the event
/// must be on sale (published, paid), have enough remaining capacity, and its
/// organizer must have completed payout onboarding. Reads only; the booking
/// itself is written when the payment confirmation arrives.
pub async fn create_session(
    pool: &PgPool,
    stripe: &StripeClient,
    config: &Config,
    request: &PurchaseRequest,
) -> Result<CheckoutSessionCreated, AppError> {
    if request.quantity < 1 {
        return Err(AppError::ValidationError(
            "quantity must be at least 1".to_string(),
        ));
    }

    let event = db::events::find(pool, request.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", request.event_id)))?;

    if event.status != EventStatus::Published {
        return Err(AppError::TicketsUnavailable(
            "event is not published".to_string(),
        ));
    }
    if event.ticket_price <= Decimal::ZERO {
        return Err(AppError::TicketsUnavailable(
            "this is a free event".to_string(),
        ));
    }

    let available = event.remaining_capacity();
    if request.quantity > available {
        return Err(AppError::CapacityExceeded { available });
    }

    let organizer = db::users::find(pool, event.organizer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event organizer not found".to_string()))?;
    let destination = organizer
        .payout_account()
        .ok_or(AppError::PayoutSetupRequired)?
        .to_string();

    let unit_amount = money::to_minor_units(event.ticket_price)
        .ok_or_else(|| AppError::InternalServerError("ticket price out of range".to_string()))?;

    let params = build_session_params(
        &event,
        &destination,
        unit_amount,
        request.quantity,
        request.user_id,
        &config.app_base_url,
    );

    let session = stripe.create_checkout_session(&params).await?;
    let url = session.url.ok_or_else(|| {
        AppError::Stripe(StripeError::ResponseParse(
            "checkout session has no redirect url".to_string(),
        ))
    })?;

    Ok(CheckoutSessionCreated {
        session_id: session.id,
        url,
    })
}

/// Assemble the session parameters: line item, destination charge with the
/// platform fee, redirect URLs, and the correlation metadata the webhook
/// reads back.
fn build_session_params(
    event: &Event,
    destination_account: &str,
    unit_amount: i64,
    quantity: i32,
    user_id: Uuid,
    app_base_url: &str,
) -> CheckoutSessionParams {
    let total = unit_amount * i64::from(quantity);

    let product_description = event.short_description.clone().unwrap_or_else(|| {
        let mut truncated: String = event
            .description
            .chars()
            .take(PRODUCT_DESCRIPTION_MAX)
            .collect();
        if event.description.chars().count() > PRODUCT_DESCRIPTION_MAX {
            truncated.push_str("...");
        }
        truncated
    });

    CheckoutSessionParams {
        currency: "usd".to_string(),
        product_name: format!("{} - Event Ticket", event.title),
        product_description: Some(product_description),
        product_image: event.banner_image_url.clone(),
        unit_amount,
        quantity,
        success_url: format!(
            "{}/event/{}?payment=success&session_id={{CHECKOUT_SESSION_ID}}",
            app_base_url, event.id
        ),
        cancel_url: format!("{}/event/{}?payment=cancelled", app_base_url, event.id),
        application_fee_amount: money::application_fee(total),
        destination_account: destination_account.to_string(),
        metadata: SessionMetadata {
            event_id: event.id.to_string(),
            user_id: user_id.to_string(),
            quantity,
            organizer_id: event.organizer_id.to_string(),
        },
    }
}
