//! Password hashing and verification using Argon2id.

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::rngs::OsRng;

use crate::handler::{ErrorKind, Result};

/// Tracing target for password hashing operations.
const TRACING_TARGET: &str = "lacquer_server::service::password_hasher";

/// Password hashing and verification service using Argon2id.
///
/// Uses the argon2 crate's default parameters, which follow current OWASP
/// recommendations.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a new instance of the [`PasswordHasher`] service.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hashes a password with a fresh cryptographically secure salt.
    ///
    /// The returned PHC string includes the algorithm, its parameters and
    /// the salt, and can be stored directly in the database.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InternalServerError`] if the hashing operation
    /// fails.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                ErrorKind::InternalServerError
                    .with_message("Password processing failed")
                    .with_resource("authentication")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Unauthorized`] for incorrect passwords
    /// - [`ErrorKind::InternalServerError`] for invalid hash format or system errors
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "invalid password hash format in storage"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication system temporarily unavailable")
                .with_resource("authentication")
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => Err(ErrorKind::Unauthorized
                .with_message("Invalid username or password")
                .with_resource("authentication")),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification failed unexpectedly"
                );

                Err(ErrorKind::InternalServerError
                    .with_message("Authentication system temporarily unavailable")
                    .with_resource("authentication"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse battery staple").unwrap();

        assert!(hasher.verify_password("correct horse battery staple", &hash).is_ok());
        assert!(hasher.verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn unique_salts_produce_unique_hashes() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash_password("password").unwrap();
        let second = hasher.hash_password("password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_rejected() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify_password("password", "not-a-phc-string").is_err());
    }
}
