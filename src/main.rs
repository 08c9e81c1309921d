use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imposter::{catalog::Catalog, config::ServerConfig, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imposter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting imposter server...");

    let config = ServerConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => match Catalog::load(path) {
            Ok(catalog) => {
                tracing::info!(path = %path.display(), categories = catalog.len(), "Catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "Failed to load catalog: {}", e);
                std::process::exit(1);
            }
        },
        None => Catalog::builtin(),
    };

    let state = Arc::new(AppState::new(catalog, config.rules.clone()));
    let app = imposter::app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
