//! Brewery Recipe Platform billing backend entrypoint.
//!
//! Loads configuration, connects the PostgreSQL pool, wires the adapters
//! into the shared state, and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use brewery_recipes::adapters::email::ResendMailer;
use brewery_recipes::adapters::http::billing::{routes::app_router, BillingAppState};
use brewery_recipes::adapters::postgres::{
    PostgresProfileRepository, PostgresWebhookEventRepository,
};
use brewery_recipes::config::AppConfig;
use brewery_recipes::ports::NotificationSender;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    tracing::info!(
        environment = ?config.server.environment,
        stripe_configured = config.payment.stripe_webhook_secret.is_some(),
        email_configured = config.email.resend_api_key.is_some(),
        "Starting billing backend"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let notification_sender: Option<Arc<dyn NotificationSender>> =
        config.email.resend_api_key.as_ref().map(|key| {
            Arc::new(ResendMailer::new(key.clone(), config.email.from_header()))
                as Arc<dyn NotificationSender>
        });
    if notification_sender.is_none() {
        tracing::warn!("RESEND_API_KEY not set, transactional emails will be skipped");
    }

    let state = BillingAppState {
        profile_repository: Arc::new(PostgresProfileRepository::new(pool.clone())),
        webhook_event_repository: Arc::new(PostgresWebhookEventRepository::new(pool)),
        notification_sender,
        payment: config.payment.clone(),
        billing_update_url: config.server.billing_update_url(),
    };

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM so in-flight webhook deliveries finish
/// before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        // Webhooks are server-to-server; the catalog endpoint is public.
        CorsLayer::new().allow_origin(Any).allow_methods(Any)
    } else {
        CorsLayer::new().allow_origin(origins).allow_methods(Any)
    }
}
