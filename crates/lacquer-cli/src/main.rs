#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;

use crate::config::{Cli, Command};

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "lacquer_cli::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "lacquer_cli::shutdown";

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "lacquer_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    Cli::load_dotenv();
    let cli = Cli::parse();

    Cli::init_tracing();
    log_startup_info();

    match cli.command {
        Command::Server(args) => run_server(args).await,
        Command::Catalog(args) => run_catalog(args).await,
    }
}

/// Starts the booking backend.
async fn run_server(args: config::ServerArgs) -> anyhow::Result<()> {
    let config = args.service_config()?;
    args.bind.log("server");

    let state = lacquer_server::service::ServiceState::from_config(&config)
        .await
        .context("failed to create server state")?;

    let router = lacquer_server::handler::openapi_routes(state.clone());
    let (app, _api) = router.with_state(state).split_for_parts();

    server::serve(app, &args.bind).await
}

/// Starts the catalog microservice.
async fn run_catalog(args: config::CatalogArgs) -> anyhow::Result<()> {
    let config = args.service_config()?;
    args.bind.log("catalog");

    let state = lacquer_catalog::service::ServiceState::from_config(&config)
        .await
        .context("failed to create catalog state")?;

    let router = lacquer_catalog::handler::openapi_routes();
    let (app, _api) = router.with_state(state).split_for_parts();

    server::serve(app, &args.bind).await
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting lacquer",
    );

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information",
    );
}
