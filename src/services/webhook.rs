use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::bookings::{self, NewBooking, RecordOutcome};
use crate::db::users;
use crate::stripe::types::{CheckoutSession, WebhookEvent};
use crate::stripe::webhook;
use crate::utils::error::AppError;
use crate::utils::money;

/// Process one Stripe callback: verify, parse, dispatch.
///
/// Only signature failure and an unparseable body surface as errors. Once
/// dispatch happens the callback is acknowledged regardless of downstream
/// outcome; otherwise Stripe keeps retrying callbacks whose business logic
/// can never succeed. Fulfillment failures are reconciliation work, not
/// transport errors.
pub async fn process(
    pool: &PgPool,
    config: &Config,
    payload: &[u8],
    signature_header: Option<&str>,
) -> Result<(), AppError> {
    let header = signature_header.ok_or_else(|| {
        AppError::SignatureVerification("missing Stripe-Signature header".to_string())
    })?;

    webhook::verify(payload, header, &config.stripe_webhook_secret, Utc::now())
        .map_err(|e| AppError::SignatureVerification(e.to_string()))?;

    let event = WebhookEvent::parse(payload)
        .map_err(|e| AppError::ValidationError(format!("unparseable webhook payload: {}", e)))?;

    match event {
        WebhookEvent::CheckoutSessionCompleted(session) => {
            fulfill_checkout(pool, session).await;
        }
        WebhookEvent::PaymentIntentSucceeded(intent) => {
            debug!(payment_intent = %intent.id, "payment intent succeeded");
        }
        WebhookEvent::Unhandled(kind) => {
            info!(event_type = %kind, "ignoring unhandled webhook event type");
        }
    }

    Ok(())
}

struct PurchaseMetadata {
    event_id: Uuid,
    user_id: Uuid,
    quantity: i32,
}

/// Record the booking for a completed checkout. Every early return here is a
/// logged no-op: the callback is still acknowledged.
async fn fulfill_checkout(pool: &PgPool, session: CheckoutSession) {
    let Some(meta) = extract_metadata(&session) else {
        warn!(session_id = %session.id, "checkout session missing required metadata, skipping");
        return;
    };

    // Cheap pre-check; the UNIQUE constraint on the session id is the
    // authoritative guard against concurrent redelivery.
    match bookings::find_by_session_id(pool, &session.id).await {
        Ok(Some(existing)) => {
            info!(
                session_id = %session.id,
                booking_reference = %existing.booking_reference,
                "duplicate webhook delivery, booking already recorded"
            );
            return;
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = ?e, session_id = %session.id, "duplicate check failed, left for reconciliation");
            return;
        }
    }

    let purchaser = match users::find(pool, meta.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(user_id = %meta.user_id, session_id = %session.id, "purchaser not found, skipping");
            return;
        }
        Err(e) => {
            warn!(error = ?e, session_id = %session.id, "purchaser lookup failed, left for reconciliation");
            return;
        }
    };

    let Some(amount_total) = session.amount_total else {
        warn!(session_id = %session.id, "checkout session has no amount_total, skipping");
        return;
    };

    let new_booking = NewBooking {
        event_id: meta.event_id,
        user_id: meta.user_id,
        quantity: meta.quantity,
        total_amount: money::from_minor_units(amount_total),
        currency: session.currency.clone().unwrap_or_else(|| "usd".to_string()),
        application_fee_amount: money::from_minor_units(money::application_fee(amount_total)),
        stripe_session_id: session.id.clone(),
        stripe_payment_intent_id: session.payment_intent.clone(),
        contact_email: purchaser.email,
        contact_phone: purchaser.phone,
    };

    match bookings::record_confirmed(pool, &new_booking).await {
        Ok(RecordOutcome::Created { booking, oversold }) => {
            if oversold {
                warn!(
                    event_id = %meta.event_id,
                    booking_reference = %booking.booking_reference,
                    "attendance exceeded capacity after confirmed payment, flagged for reconciliation"
                );
            }
            info!(
                booking_reference = %booking.booking_reference,
                booking_id = %booking.id,
                event_id = %meta.event_id,
                quantity = meta.quantity,
                "booking recorded for confirmed payment"
            );
        }
        Ok(RecordOutcome::Duplicate) => {
            info!(session_id = %session.id, "duplicate webhook delivery, booking already recorded");
        }
        Err(e) => {
            warn!(error = ?e, session_id = %session.id, "failed to record booking, left for manual reconciliation");
        }
    }
}

fn extract_metadata(session: &CheckoutSession) -> Option<PurchaseMetadata> {
    let event_id = session.metadata.get("eventId")?.parse().ok()?;
    let user_id = session.metadata.get("userId")?.parse().ok()?;
    let quantity: i32 = session.metadata.get("quantity")?.parse().ok()?;
    if quantity < 1 {
        return None;
    }

    Some(PurchaseMetadata {
        event_id,
        user_id,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashMap;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost:1/unreachable".to_string(),
            port: 3001,
            app_base_url: "http://localhost:3000".to_string(),
            stripe_secret_key: "sk_test_123".to_string(),
            stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
            stripe_publishable_key: None,
        }
    }

    fn lazy_pool() -> sqlx::PgPool {
        PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy("postgres://localhost:1/unreachable")
            .unwrap()
    }

    fn signature_header(payload: &[u8]) -> String {
        let timestamp = Utc::now().timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[tokio::test]
    async fn test_process_rejects_missing_signature() {
        let result = process(&lazy_pool(), &test_config(), b"{}", None).await;
        assert!(matches!(result, Err(AppError::SignatureVerification(_))));
    }

    #[tokio::test]
    async fn test_process_rejects_bad_signature() {
        let header = format!("t={},v1=deadbeef", Utc::now().timestamp());
        let result = process(&lazy_pool(), &test_config(), b"{}", Some(&header)).await;
        assert!(matches!(result, Err(AppError::SignatureVerification(_))));
    }

    #[tokio::test]
    async fn test_process_acknowledges_missing_metadata() {
        // Correctly signed but business-invalid: metadata is absent. The
        // callback must be swallowed after logging, never surfaced as a
        // transport error, and nothing is written (the pool is unreachable,
        // so any write attempt would error instead).
        let payload = serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_1", "amount_total": 6000 } }
        })
        .to_string();

        let header = signature_header(payload.as_bytes());
        let result = process(&lazy_pool(), &test_config(), payload.as_bytes(), Some(&header)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_process_acknowledges_unhandled_event_types() {
        let payload = serde_json::json!({
            "id": "evt_2",
            "type": "charge.refunded",
            "data": { "object": { "id": "ch_1" } }
        })
        .to_string();

        let header = signature_header(payload.as_bytes());
        let result = process(&lazy_pool(), &test_config(), payload.as_bytes(), Some(&header)).await;
        assert!(result.is_ok());
    }

    fn session_with_metadata(entries: &[(&str, &str)]) -> CheckoutSession {
        CheckoutSession {
            id: "cs_test_1".to_string(),
            url: None,
            amount_total: Some(6000),
            currency: Some("usd".to_string()),
            payment_intent: Some("pi_1".to_string()),
            payment_status: Some("paid".to_string()),
            metadata: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_extract_metadata_complete() {
        let session = session_with_metadata(&[
            ("eventId", "11111111-1111-1111-1111-111111111111"),
            ("userId", "22222222-2222-2222-2222-222222222222"),
            ("quantity", "3"),
            ("organizerId", "33333333-3333-3333-3333-333333333333"),
        ]);

        let meta = extract_metadata(&session).expect("metadata should parse");
        assert_eq!(
            meta.event_id.to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
        assert_eq!(meta.quantity, 3);
    }

    #[test]
    fn test_extract_metadata_missing_field() {
        let session = session_with_metadata(&[
            ("eventId", "11111111-1111-1111-1111-111111111111"),
            ("quantity", "3"),
        ]);
        assert!(extract_metadata(&session).is_none());
    }

    #[test]
    fn test_extract_metadata_malformed_ids() {
        let session = session_with_metadata(&[
            ("eventId", "not-a-uuid"),
            ("userId", "22222222-2222-2222-2222-222222222222"),
            ("quantity", "3"),
        ]);
        assert!(extract_metadata(&session).is_none());
    }

    #[test]
    fn test_extract_metadata_rejects_non_positive_quantity() {
        let session = session_with_metadata(&[
            ("eventId", "11111111-1111-1111-1111-111111111111"),
            ("userId", "22222222-2222-2222-2222-222222222222"),
            ("quantity", "0"),
        ]);
        assert!(extract_metadata(&session).is_none());
    }
}
