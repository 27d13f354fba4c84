//! urlshort Server Binary
//!
//! Opens the store, merges the path maps, then serves redirects.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use urlshort::http::{self, AppState};
use urlshort::{merge, Config, MissPolicy, Store};

/// urlshort Server
#[derive(Parser, Debug)]
#[command(name = "urlshort-server")]
#[command(about = "Redirect server backed by a single-file key-value store")]
#[command(version)]
struct Args {
    /// Supply map of urls in yaml file
    #[arg(long, default_value = "map.yaml")]
    yaml: PathBuf,

    /// Supply map of urls in json file
    #[arg(long, default_value = "map.json")]
    json: PathBuf,

    /// Answer unmapped paths with 404 instead of redirecting to /
    #[arg(long)]
    not_found: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,urlshort=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = ?e.kind(), "Startup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> urlshort::Result<()> {
    let miss_policy = if args.not_found {
        MissPolicy::NotFound
    } else {
        MissPolicy::Redirect
    };

    let config = Config::builder()
        .yaml_path(args.yaml)
        .json_path(args.json)
        .miss_policy(miss_policy)
        .build();
    config.validate()?;

    tracing::info!("urlshort Server v{}", urlshort::VERSION);
    tracing::info!("Store file: {}", config.store_path.display());

    // Every write happens here, before the socket exists. On error the
    // store is dropped on the way out, which releases its lock.
    let store = Arc::new(Store::open(&config.store_path)?);
    let report = merge::seed(&store, &config)?;

    tracing::info!(
        sources = report.sources.len(),
        entries = report.total_entries(),
        last_lsn = report.last_lsn,
        "Path maps merged"
    );

    tracing::info!("Starting the server on {}", config.listen_addr);
    let listener = TcpListener::bind(&config.listen_addr).await?;

    let app = http::router(AppState::new(Arc::clone(&store), &config), &config);
    http::serve(listener, app, http::shutdown_signal()).await?;

    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(_) => tracing::warn!("Store still shared at shutdown; lock released on exit"),
    }

    tracing::info!("Server stopped");
    Ok(())
}
