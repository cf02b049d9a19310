//! Database error to HTTP error conversion.
//!
//! Maps [`PgError`] variants onto HTTP responses: unique violations become
//! 409, foreign-key violations 400, everything else a generic 500 with
//! details kept in the logs only.

use lacquer_postgres::PgError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "lacquer_server::postgres_errors";

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                if error.is_unique_violation() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        constraint = error.constraint(),
                        error = %query_error,
                        "query error (unique violation)"
                    );
                    return ErrorKind::Conflict
                        .with_message("A resource with these values already exists");
                }

                if error.is_foreign_key_violation() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        constraint = error.constraint(),
                        error = %query_error,
                        "query error (foreign key violation)"
                    );
                    return ErrorKind::BadRequest
                        .with_message("A referenced resource does not exist");
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

// Used only for transactions.
impl From<lacquer_postgres::error::DieselError> for Error<'static> {
    fn from(error: lacquer_postgres::error::DieselError) -> Self {
        // Convert DieselError -> PgError -> Error
        let pg_error: PgError = error.into();
        pg_error.into()
    }
}
