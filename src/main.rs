use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tablebridge::config::AppConfig;
use tablebridge::handlers;
use tablebridge::services::reservations::{EasyTableCredentials, EasyTableGateway};
use tablebridge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let credentials =
        EasyTableCredentials::from_parts(&config.easytable_api_key, &config.easytable_place_token);
    if credentials.is_none() {
        tracing::warn!("EASYTABLE_API_KEY / EASYTABLE_PLACE_TOKEN not set, reservation calls will fail");
    }
    if config.retell_api_key.is_empty() {
        tracing::warn!("RETELL_API_KEY not set, webhook signatures are not checked");
    }
    tracing::info!(
        base_url = %config.easytable_base_url,
        routes = config.inbound_routes.len(),
        "reservation gateway configured"
    );

    let gateway = EasyTableGateway::new(config.easytable_base_url.clone(), credentials);

    let state = Arc::new(AppState {
        config: config.clone(),
        gateway: Box::new(gateway),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/retell/webhook", post(handlers::webhook::retell_webhook))
        .route(
            "/api/retell/function-call",
            post(handlers::webhook::function_call),
        )
        .route(
            "/api/retell/inbound-webhook",
            post(handlers::webhook::inbound_webhook),
        )
        .route(
            "/api/tools/get_availability",
            post(handlers::tools::get_availability),
        )
        .route(
            "/api/tools/create_booking",
            post(handlers::tools::create_booking),
        )
        .route("/api/schema", get(handlers::dev::booking_schema))
        .route("/api/validate", post(handlers::dev::validate))
        .route("/api/test-booking", post(handlers::dev::test_booking))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
