use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use dorehami_server::config::Config;
use dorehami_server::routes::create_routes;
use dorehami_server::state::AppState;
use dorehami_server::stripe::StripeClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    // Missing Stripe secrets abort startup; payment requests must never be
    // accepted without them.
    let config = Config::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let stripe = StripeClient::new(config.stripe_secret_key.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState {
        pool,
        stripe,
        config: Arc::new(config),
    };

    let app = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
