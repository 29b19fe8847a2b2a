use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub auth_user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_organizer: bool,
    pub stripe_account_id: Option<String>,
    pub stripe_onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The payout account an organizer's ticket revenue is transferred to,
    /// available only once Stripe onboarding has completed.
    pub fn payout_account(&self) -> Option<&str> {
        if self.stripe_onboarding_completed {
            self.stripe_account_id.as_deref()
        } else {
            None
        }
    }
}
