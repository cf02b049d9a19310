//! Permission model naming a protected module.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::permissions;

/// A grantable permission identified by the module it protects.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Permission {
    /// Unique permission identifier.
    pub id: Uuid,
    /// Module name this permission grants access to.
    pub module: String,
    /// Description of what the permission covers.
    pub description: String,
    /// Timestamp when the permission was created.
    pub created_at: Timestamp,
}

/// Data for creating a new permission.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPermission {
    /// Module name.
    pub module: String,
    /// Permission description.
    pub description: Option<String>,
}
