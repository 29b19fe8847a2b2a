use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::handlers::{self, checkout, connect, events, users, venues, webhooks};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/venues", get(venues::list_venues))
        .route("/api/venues/availability", get(venues::batch_availability))
        .route("/api/venues/:id", get(venues::get_venue))
        .route("/api/venues/:id/availability", get(venues::venue_availability))
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/:id",
            get(events::get_event).put(events::update_event),
        )
        .route("/api/events/:id/publish", post(events::publish_event))
        .route("/api/events/:id/cancel", post(events::cancel_event))
        .route("/api/users", post(users::register_user))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/bookings", get(users::user_bookings))
        .route(
            "/api/checkout/sessions",
            post(checkout::create_checkout_session),
        )
        .route("/api/connect/accounts", post(connect::create_account))
        .route(
            "/api/connect/onboarding-links",
            post(connect::create_onboarding_link),
        )
        .route("/api/connect/account-status", post(connect::account_status))
        .route("/api/webhooks/stripe", post(webhooks::stripe_webhook))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
