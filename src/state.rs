use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::stripe::StripeClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub stripe: StripeClient,
    pub config: Arc<Config>,
}
