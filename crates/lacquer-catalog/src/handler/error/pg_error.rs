//! Database error to HTTP error conversion.

use lacquer_postgres::PgError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "lacquer_catalog::postgres_errors";

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if error.is_unique_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = error.constraint(),
                error = %error,
                "query error (unique violation)"
            );
            return ErrorKind::Conflict.with_message("A resource with these values already exists");
        }

        if error.is_foreign_key_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = error.constraint(),
                error = %error,
                "query error (foreign key violation)"
            );
            return ErrorKind::BadRequest.with_message("A referenced resource does not exist");
        }

        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            "database error"
        );
        ErrorKind::InternalServerError.into_error()
    }
}

// Used only for transactions.
impl From<lacquer_postgres::error::DieselError> for Error<'static> {
    fn from(error: lacquer_postgres::error::DieselError) -> Self {
        let pg_error: PgError = error.into();
        pg_error.into()
    }
}
