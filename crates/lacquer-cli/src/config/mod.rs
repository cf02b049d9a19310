//! CLI configuration management.
//!
//! The binary hosts two deployables behind subcommands:
//!
//! ```text
//! lacquer server    # booking backend (accounts, roles, appointments)
//! lacquer catalog   # catalog microservice (salon services)
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod catalog;
mod server;

pub use catalog::CatalogArgs;
use clap::{Parser, Subcommand};
pub use server::ServerArgs;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use crate::server::BindConfig;

/// Complete CLI configuration.
#[derive(Debug, Parser)]
#[command(name = "lacquer")]
#[command(about = "Lacquer nail-salon platform services")]
#[command(version)]
pub struct Cli {
    /// Deployable to start.
    #[command(subcommand)]
    pub command: Command,
}

/// Deployables hosted by this binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Starts the booking backend.
    Server(ServerArgs),
    /// Starts the catalog microservice.
    Catalog(CatalogArgs),
}

impl Cli {
    /// Loads environment variables from a .env file if the dotenv
    /// feature is enabled.
    ///
    /// Called before parsing CLI arguments so that clap's `env` feature
    /// can pick up values from .env files.
    #[cfg(feature = "dotenv")]
    pub fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when the dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    pub fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_arguments_are_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn server_subcommand_parses_with_defaults() {
        let cli = Cli::try_parse_from(["lacquer", "server"]).unwrap();
        assert!(matches!(cli.command, Command::Server(_)));
    }

    #[test]
    fn catalog_subcommand_accepts_cutover_flag() {
        let cli = Cli::try_parse_from(["lacquer", "catalog", "--migration-cutover"]).unwrap();
        let Command::Catalog(args) = cli.command else {
            panic!("expected catalog subcommand");
        };
        assert!(args.migration_cutover);
    }
}
