//! Role model for grouping accounts under a shared permission set.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::roles;
use crate::types::EntityStatus;

/// A named role that accounts are assigned to.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Human-readable role name, unique across the table.
    pub name: String,
    /// Description of what the role is for.
    pub description: String,
    /// Whether the role is active or retained for history.
    pub status: EntityStatus,
    /// Timestamp when the role was created.
    pub created_at: Timestamp,
    /// Timestamp when the role was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new role.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRole {
    /// Role name.
    pub name: String,
    /// Role description.
    pub description: Option<String>,
    /// Initial status, defaults to active.
    pub status: Option<EntityStatus>,
}

/// Data for updating a role.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateRole {
    /// Role name.
    pub name: Option<String>,
    /// Role description.
    pub description: Option<String>,
    /// Role status.
    pub status: Option<EntityStatus>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}

impl Role {
    /// Returns whether the role is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
