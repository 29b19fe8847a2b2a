use chrono::{DateTime, Utc};
use nanoid::nanoid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Completed,
    Refunded,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub booking_reference: String,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub currency: String,
    pub application_fee_amount: Decimal,
    pub payment_method: String,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub status: BookingStatus,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

const REFERENCE_PREFIX: &str = "DH-";
const REFERENCE_LEN: usize = 8;

// Uppercase alphanumerics minus the lookalikes 0/O, 1/I/L.
const REFERENCE_ALPHABET: [char; 31] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'M',
    'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Generate a human-readable booking reference, e.g. `DH-7KQ2XWM4`.
///
/// Uniqueness is enforced by the database; callers retry on collision.
pub fn generate_reference() -> String {
    format!(
        "{}{}",
        REFERENCE_PREFIX,
        nanoid!(REFERENCE_LEN, &REFERENCE_ALPHABET)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_format() {
        let reference = generate_reference();
        assert_eq!(reference.len(), REFERENCE_PREFIX.len() + REFERENCE_LEN);
        assert!(reference.starts_with("DH-"));
        assert!(reference[REFERENCE_PREFIX.len()..]
            .chars()
            .all(|c| REFERENCE_ALPHABET.contains(&c)));
    }

    #[test]
    fn test_references_vary() {
        let a = generate_reference();
        let b = generate_reference();
        assert_ne!(a, b);
    }
}
