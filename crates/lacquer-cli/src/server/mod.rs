//! HTTP server startup with graceful shutdown.

mod shutdown;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use clap::Args;
use shutdown::shutdown_signal;
use tokio::net::TcpListener;

use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Network binding and lifecycle configuration, shared by both
/// deployables.
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct BindConfig {
    /// Host address to bind the server to.
    ///
    /// Use "127.0.0.1" for localhost only, "0.0.0.0" for all
    /// interfaces.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// TCP port number for the server to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Maximum time in seconds to wait for graceful shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

impl BindConfig {
    /// Returns the socket address to bind to.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns whether the server binds to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.host {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr.is_unspecified(),
        }
    }

    /// Returns the graceful shutdown timeout.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Logs the binding configuration.
    pub fn log(&self, deployable: &str) {
        tracing::info!(
            target: TRACING_TARGET_STARTUP,
            deployable,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "binding configuration loaded",
        );
    }
}

/// Starts an HTTP server with graceful shutdown.
pub async fn serve(app: Router, config: &BindConfig) -> anyhow::Result<()> {
    let server_addr = config.server_addr();

    let listener = TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("failed to bind to {server_addr}"))?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %server_addr,
        "server is ready and listening for connections",
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "server is bound to all interfaces",
        );
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
    .await
    .context("server encountered a fatal error")?;

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        "server shut down gracefully",
    );
    Ok(())
}
