//! Blog Server
//!
//! Posts and threaded comments behind a single GraphQL endpoint, stored either
//! in memory or in SQLite.

mod config;
mod graphql;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use graphql::BlogSchema;
use services::BlogService;
use storage::Backend;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub schema: BlogSchema,
    pub request_timeout: Duration,
}

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if config.verbose {
            "blog_server=debug,tower_http=debug"
        } else {
            "blog_server=info,tower_http=info"
        })
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Blog Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        "Config loaded: bind={}, storage={}, posts_limit={}",
        config.bind_address, config.storage, config.posts_limit
    );

    info!("Initializing {} storage...", config.storage);
    let backend = Backend::open(config.storage, &config.database_url, config.posts_limit)
        .await
        .context("Failed to initialize storage")?;
    info!("Storage initialized");

    let blog = BlogService::new(backend.store());
    let state = AppState {
        schema: graphql::build_schema(blog),
        request_timeout: config.request_timeout(),
    };

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down storage...");
    backend.close().await;
    info!("Server stopped");

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // GraphQL endpoint
        .route("/query", post(handlers::graphql::execute))
        .route("/graphql", post(handlers::graphql::execute))
        .route("/graphql/schema", get(handlers::graphql::sdl))
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
