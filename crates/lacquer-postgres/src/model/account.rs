//! Account model for authentication and role assignment.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::accounts;
use crate::types::EntityStatus;

/// A user account.
///
/// Every authenticated request resolves to an account; the optional
/// `role_id` drives module-level authorization.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Login name, unique across the table.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Assigned role, if any.
    pub role_id: Option<Uuid>,
    /// Whether the account may authenticate.
    pub status: EntityStatus,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
    /// Timestamp when the account was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new account.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Assigned role.
    pub role_id: Option<Uuid>,
    /// Initial status, defaults to active.
    pub status: Option<EntityStatus>,
}

/// Data for updating an account.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAccount {
    /// Contact email address.
    pub email: Option<String>,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Argon2 password hash.
    pub password_hash: Option<String>,
    /// Assigned role. `Some(None)` clears the assignment.
    pub role_id: Option<Option<Uuid>>,
    /// Account status.
    pub status: Option<EntityStatus>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}

impl Account {
    /// Returns whether the account may authenticate.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns the account's display name.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.given_name, self.family_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}
