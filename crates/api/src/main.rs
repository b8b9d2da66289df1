use api::{create_router, AdminAuthState, AppState};
use services::subscription::{LimitResolver, PlanCatalog};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
        eprintln!("Continuing with environment variables...");
    }

    let config = config::Config::from_env();

    // RUST_LOG wins over LOG_LEVEL / LOG_MODULE_*
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(config.logging.filter_directive())
    });
    let fmt_layer = if config.logging.is_json() {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Starting entitlements server...");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);

    let catalog = match config.catalog.path.as_deref() {
        Some(path) => {
            tracing::info!("Loading plan catalog from {}", path);
            PlanCatalog::from_file(path)?
        }
        None => PlanCatalog::builtin(),
    };
    tracing::info!(
        "Plan catalog version={} with {} paid plans",
        catalog.version(),
        catalog.plans().len()
    );

    let db = database::Database::new();
    tracing::warn!(
        "Using in-memory storage: subscriptions and usage counters reset on restart"
    );
    let app_state = AppState::new(&db, LimitResolver::with_system_clock(Arc::new(catalog)));

    let admin_auth = AdminAuthState::new(config.admin.api_token.as_deref());
    if !admin_auth.is_configured() {
        tracing::warn!("ADMIN_API_TOKEN is not set: admin routes will reject every request");
    }

    let app = create_router(app_state, admin_auth);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("OpenAPI spec available at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
