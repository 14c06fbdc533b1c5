use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hotel_booking::config::AppConfig;
use hotel_booking::handlers;
use hotel_booking::services::auth::{
    ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider,
};
use hotel_booking::services::booking::BookingOrchestrator;
use hotel_booking::services::email::sendgrid::SendGridNotifier;
use hotel_booking::services::email::{NoopNotifier, Notifier};
use hotel_booking::services::provider::graph::GraphBookingsProvider;
use hotel_booking::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.bookings_business_id.trim().is_empty() {
        tracing::warn!("BOOKINGS_BUSINESS_ID is not set; booking endpoints will degrade");
    }

    let tokens: Arc<dyn TokenProvider> = if config.graph_access_token.is_empty() {
        tracing::info!("authenticating to Graph as service account {}", config.service_account_email);
        Arc::new(ServiceAccountTokenProvider::from_config(&config)?)
    } else {
        tracing::info!("using static Graph access token");
        Arc::new(StaticTokenProvider::new(config.graph_access_token.clone()))
    };

    let provider = GraphBookingsProvider::new(
        &config.graph_base_url,
        tokens,
        Duration::from_secs(config.provider_timeout_secs),
    )?;

    let notifier: Arc<dyn Notifier> = if config.sendgrid_api_key.is_empty() {
        tracing::info!("SENDGRID_API_KEY not set, confirmation e-mails disabled");
        Arc::new(NoopNotifier)
    } else {
        Arc::new(SendGridNotifier::new(
            config.sendgrid_api_key.clone(),
            config.sendgrid_from_email.clone(),
        ))
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        bookings: BookingOrchestrator::new(Arc::new(provider), notifier, config.clone()),
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
