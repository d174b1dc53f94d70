//! Object Storage Gateway
//!
//! An HTTP gateway fronting a backing object store, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                  OBJECT GATEWAY                     │
//!                    │                                                     │
//!  Client Request    │  ┌──────────┐   ┌────────────┐   ┌─────────────┐   │
//!  ──────────────────┼─▶│  http    │──▶│  security  │──▶│ rate limit  │   │
//!                    │  │  server  │   │ classifier │   │ (counter    │◀──┼── Counter
//!                    │  └──────────┘   └────────────┘   │  store)     │   │   Store
//!                    │                                   └──────┬──────┘   │
//!                    │                                          │          │
//!                    │                                          ▼          │
//!  Client Response   │  ┌──────────┐   ┌────────────┐   ┌─────────────┐   │
//!  ◀─────────────────┼──│ response │◀──│   range    │◀──│   object    │◀──┼── Object
//!                    │  │ assembly │   │ negotiator │   │  metadata   │   │   Store
//!                    │  └──────────┘   └────────────┘   └─────────────┘   │
//!                    │                                                     │
//!                    │  ┌───────────────────────────────────────────────┐  │
//!                    │  │   config  │  observability  │  lifecycle      │  │
//!                    │  └───────────────────────────────────────────────┘  │
//!                    └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use object_gateway::config::loader::load_config;
use object_gateway::config::GatewayConfig;
use object_gateway::http::HttpServer;
use object_gateway::lifecycle::Shutdown;
use object_gateway::observability::metrics;
use object_gateway::store::{FsObjectStore, MemoryCounterStore};

#[derive(Parser, Debug)]
#[command(name = "object-gateway", about = "HTTP gateway for a backing object store")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the object store root directory.
    #[arg(long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(root) = args.root {
        config.storage.root = root.display().to_string();
    }

    // Initialize tracing subscriber. RUST_LOG wins; the configured
    // observability.log_level is the fallback.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.observability.log_level)
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("object-gateway v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage_root = %config.storage.root,
        rate_limit_enabled = config.rate_limit.enabled,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Wire the storage collaborators. The filesystem store serves objects
    // from a local directory; the in-process counter store is the single-node
    // default — multi-node deployments plug a shared store in here.
    let objects = Arc::new(FsObjectStore::new(config.storage.root.clone()));
    let counters = Arc::new(MemoryCounterStore::new());

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, objects, counters);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
