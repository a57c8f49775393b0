//! Dedup service binary
//!
//! Runs the content-deduplication identification HTTP server.

use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dedup_service::{
    create_router, smoke_test, AppState, DedupEngine, KeyRegistry, ServiceConfig,
};

/// Content-deduplication identification service
#[derive(Debug, Parser)]
#[command(name = "dedup-service", version)]
struct Cli {
    /// Path to a TOML configuration file. Without one the service runs
    /// self-checks and serves from an ephemeral in-memory store.
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = std::env::var("DEDUP_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let cli = Cli::parse();

    // Configuration
    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path).unwrap_or_else(|err| {
            eprintln!("{err}");
            exit(1);
        }),
        None => {
            warn!("no configuration file given; data will not be persisted");
            ServiceConfig::ephemeral()
        }
    };

    // Initialize storage
    let store = config.store.open().unwrap_or_else(|err| {
        eprintln!("could not open fact store: {err}");
        exit(1);
    });

    if cli.config.is_none() {
        smoke_test(store.as_ref())
            .await
            .expect("Storage self-check failed");
        info!("self-checks passed");

        // The generated credentials are the only way in; say what they are.
        for key in &config.keys {
            info!(key = %key, "ephemeral client key");
        }
        info!(superkey = %config.superkey, "ephemeral super-key");
    }

    // Audit sinks
    let mut audit = Vec::new();
    for sink_config in &config.audit {
        audit.push(sink_config.open().unwrap_or_else(|err| {
            eprintln!("could not open audit sink: {err}");
            exit(1);
        }));
    }

    // Key registry and engine
    let registry =
        KeyRegistry::bootstrap(config.keys.clone(), config.superkey.clone(), store.clone())
            .await
            .expect("Failed to seed key registry");
    let engine = DedupEngine::new(store);

    // Create application state
    let state = Arc::new(AppState {
        registry,
        engine,
        audit,
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "dedup service listening");

    axum::serve(listener, app).await.expect("Server error");
}
