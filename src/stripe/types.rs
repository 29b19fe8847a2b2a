use serde::Deserialize;
use std::collections::HashMap;

/// Checkout session object, as returned by session creation and delivered in
/// `checkout.session.completed` callbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
}

/// Connect account, reduced to the onboarding-status surface we read.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub details_submitted: bool,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
}

impl Account {
    pub fn onboarding_complete(&self) -> bool {
        self.details_submitted && self.charges_enabled && self.payouts_enabled
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountLink {
    pub url: String,
}

/// Metadata embedded in a checkout session for webhook correlation.
///
/// Keys match what the session-creation flow writes; the webhook side parses
/// them back out of the session object.
#[derive(Debug, Clone)]
pub struct SessionMetadata {
    pub event_id: String,
    pub user_id: String,
    pub quantity: i32,
    pub organizer_id: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub currency: String,
    pub product_name: String,
    pub product_description: Option<String>,
    pub product_image: Option<String>,
    pub unit_amount: i64,
    pub quantity: i32,
    pub success_url: String,
    pub cancel_url: String,
    pub application_fee_amount: i64,
    pub destination_account: String,
    pub metadata: SessionMetadata,
}

impl CheckoutSessionParams {
    /// Flatten into Stripe's bracket-notation form encoding.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            (
                "line_items[0][quantity]".to_string(),
                self.quantity.to_string(),
            ),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                self.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                self.product_name.clone(),
            ),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            (
                "payment_intent_data[application_fee_amount]".to_string(),
                self.application_fee_amount.to_string(),
            ),
            (
                "payment_intent_data[transfer_data][destination]".to_string(),
                self.destination_account.clone(),
            ),
            (
                "metadata[eventId]".to_string(),
                self.metadata.event_id.clone(),
            ),
            (
                "metadata[userId]".to_string(),
                self.metadata.user_id.clone(),
            ),
            (
                "metadata[quantity]".to_string(),
                self.metadata.quantity.to_string(),
            ),
            (
                "metadata[organizerId]".to_string(),
                self.metadata.organizer_id.clone(),
            ),
        ];

        if let Some(description) = &self.product_description {
            form.push((
                "line_items[0][price_data][product_data][description]".to_string(),
                description.clone(),
            ));
        }
        if let Some(image) = &self.product_image {
            form.push((
                "line_items[0][price_data][product_data][images][0]".to_string(),
                image.clone(),
            ));
        }

        form
    }
}

#[derive(Debug, Clone)]
pub struct AccountParams {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AccountParams {
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("type".to_string(), "express".to_string()),
            ("country".to_string(), "US".to_string()),
            ("email".to_string(), self.email.clone()),
            (
                "capabilities[card_payments][requested]".to_string(),
                "true".to_string(),
            ),
            (
                "capabilities[transfers][requested]".to_string(),
                "true".to_string(),
            ),
            ("business_type".to_string(), "individual".to_string()),
            ("individual[email]".to_string(), self.email.clone()),
        ];
        if let Some(first_name) = &self.first_name {
            form.push(("individual[first_name]".to_string(), first_name.clone()));
        }
        if let Some(last_name) = &self.last_name {
            form.push(("individual[last_name]".to_string(), last_name.clone()));
        }
        form
    }
}

#[derive(Debug, Clone)]
pub struct AccountLinkParams {
    pub account_id: String,
    pub refresh_url: String,
    pub return_url: String,
}

impl AccountLinkParams {
    pub fn to_form(&self) -> Vec<(String, String)> {
        vec![
            ("account".to_string(), self.account_id.clone()),
            ("refresh_url".to_string(), self.refresh_url.clone()),
            ("return_url".to_string(), self.return_url.clone()),
            ("type".to_string(), "account_onboarding".to_string()),
        ]
    }
}

/// Webhook payload, discriminated by Stripe's `type` field.
///
/// Unrecognized types keep their name so the dispatcher can log and
/// acknowledge them without failing the callback.
#[derive(Debug)]
pub enum WebhookEvent {
    CheckoutSessionCompleted(CheckoutSession),
    PaymentIntentSucceeded(PaymentIntent),
    Unhandled(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: EnvelopeData,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_slice(payload)?;
        Ok(match envelope.kind.as_str() {
            "checkout.session.completed" => {
                WebhookEvent::CheckoutSessionCompleted(serde_json::from_value(
                    envelope.data.object,
                )?)
            }
            "payment_intent.succeeded" => WebhookEvent::PaymentIntentSucceeded(
                serde_json::from_value(envelope.data.object)?,
            ),
            _ => WebhookEvent::Unhandled(envelope.kind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checkout_session_completed() {
        let payload = serde_json::json!({
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_abc",
                    "amount_total": 6000,
                    "currency": "usd",
                    "payment_intent": "pi_123",
                    "payment_status": "paid",
                    "metadata": {
                        "eventId": "11111111-1111-1111-1111-111111111111",
                        "userId": "22222222-2222-2222-2222-222222222222",
                        "quantity": "3",
                        "organizerId": "33333333-3333-3333-3333-333333333333"
                    }
                }
            }
        });

        let event = WebhookEvent::parse(payload.to_string().as_bytes()).unwrap();
        match event {
            WebhookEvent::CheckoutSessionCompleted(session) => {
                assert_eq!(session.id, "cs_test_abc");
                assert_eq!(session.amount_total, Some(6000));
                assert_eq!(session.metadata.get("quantity").map(String::as_str), Some("3"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unhandled_type_keeps_name() {
        let payload = serde_json::json!({
            "id": "evt_456",
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1" } }
        });

        let event = WebhookEvent::parse(payload.to_string().as_bytes()).unwrap();
        match event {
            WebhookEvent::Unhandled(kind) => assert_eq!(kind, "invoice.paid"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(WebhookEvent::parse(b"not json").is_err());
    }

    #[test]
    fn test_checkout_params_form_encoding() {
        let params = CheckoutSessionParams {
            currency: "usd".to_string(),
            product_name: "Shab-e She'r - Event Ticket".to_string(),
            product_description: Some("An evening of Persian poetry".to_string()),
            product_image: None,
            unit_amount: 2000,
            quantity: 3,
            success_url: "http://localhost:3000/event/abc?payment=success".to_string(),
            cancel_url: "http://localhost:3000/event/abc?payment=cancelled".to_string(),
            application_fee_amount: 48,
            destination_account: "acct_123".to_string(),
            metadata: SessionMetadata {
                event_id: "e1".to_string(),
                user_id: "u1".to_string(),
                quantity: 3,
                organizer_id: "o1".to_string(),
            },
        };

        let form = params.to_form();
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("2000"));
        assert_eq!(get("line_items[0][quantity]"), Some("3"));
        assert_eq!(
            get("payment_intent_data[application_fee_amount]"),
            Some("48")
        );
        assert_eq!(
            get("payment_intent_data[transfer_data][destination]"),
            Some("acct_123")
        );
        assert_eq!(get("metadata[eventId]"), Some("e1"));
        assert_eq!(get("metadata[quantity]"), Some("3"));
        // No image was set, so no images key is emitted
        assert_eq!(get("line_items[0][price_data][product_data][images][0]"), None);
    }

    #[test]
    fn test_account_onboarding_complete() {
        let account = Account {
            id: "acct_1".to_string(),
            details_submitted: true,
            charges_enabled: true,
            payouts_enabled: false,
        };
        assert!(!account.onboarding_complete());

        let account = Account {
            payouts_enabled: true,
            ..account
        };
        assert!(account.onboarding_complete());
    }
}
