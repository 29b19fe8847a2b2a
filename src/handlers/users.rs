use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{bookings, users};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct RegisterUserInput {
    pub auth_user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Find-or-create a profile for an externally authenticated user.
pub async fn register_user(
    State(state): State<AppState>,
    Json(input): Json<RegisterUserInput>,
) -> Result<Response, AppError> {
    if input.email.trim().is_empty() {
        return Err(AppError::ValidationError("email is required".to_string()));
    }

    let user = users::register(
        &state.pool,
        &users::NewUser {
            auth_user_id: input.auth_user_id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
        },
    )
    .await?;

    Ok(created(user, "User registered"))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let user = users::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", id)))?;
    Ok(success(user, "User retrieved"))
}

/// A user's confirmed ticket purchases, newest first.
pub async fn user_bookings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let bookings = bookings::list_for_user(&state.pool, id).await?;
    Ok(success(bookings, "Bookings retrieved"))
}
