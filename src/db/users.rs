use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

pub struct NewUser {
    pub auth_user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Idempotent profile registration keyed by the external auth identity:
/// re-registering refreshes contact details instead of failing.
pub async fn register(pool: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (auth_user_id, email, first_name, last_name, phone)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (auth_user_id) DO UPDATE SET
            email = EXCLUDED.email,
            first_name = COALESCE(EXCLUDED.first_name, users.first_name),
            last_name = COALESCE(EXCLUDED.last_name, users.last_name),
            phone = COALESCE(EXCLUDED.phone, users.phone),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(new.auth_user_id)
    .bind(&new.email)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.phone)
    .fetch_one(pool)
    .await
}

/// Attach a freshly created payout account. Onboarding starts over, so the
/// completion flag resets alongside.
pub async fn set_stripe_account(
    pool: &PgPool,
    user_id: Uuid,
    account_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET stripe_account_id = $2,
            stripe_onboarding_completed = FALSE,
            is_organizer = TRUE,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(account_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_onboarding_complete(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET stripe_onboarding_completed = TRUE, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
