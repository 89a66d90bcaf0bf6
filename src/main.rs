//! Storefront Checkout service entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use storefront_checkout::adapters::http::{checkout_router, CheckoutAppState};
use storefront_checkout::adapters::postgres::{PgOrderRepository, PgProductCatalog};
use storefront_checkout::adapters::stripe::{StripeCheckoutGateway, StripeConfig};
use storefront_checkout::application::handlers::checkout::CheckoutSessionSettings;
use storefront_checkout::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "Starting storefront-checkout"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let state = CheckoutAppState {
        orders: Arc::new(PgOrderRepository::new(pool.clone())),
        catalog: Arc::new(PgProductCatalog::new(pool)),
        gateway: Arc::new(StripeCheckoutGateway::new(StripeConfig::from_payment_config(
            &config.payment,
        ))),
        session_settings: CheckoutSessionSettings {
            currency: config.payment.currency.clone(),
            success_url: config.payment.success_url(),
            cancel_url: config.payment.cancel_url(),
        },
    };

    let mut app = checkout_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if !origins.is_empty() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST]),
        );
    }

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
