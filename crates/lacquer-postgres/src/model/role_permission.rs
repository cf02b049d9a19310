//! Link between a role and a granted permission.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::role_permissions;

/// A grant of one permission to one role.
///
/// The pair `(role_id, permission_id)` is unique; attempting to insert a
/// duplicate grant fails with a unique constraint violation.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = role_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RolePermission {
    /// Unique link identifier.
    pub id: Uuid,
    /// Role receiving the grant.
    pub role_id: Uuid,
    /// Permission being granted.
    pub permission_id: Uuid,
    /// Timestamp when the grant was created.
    pub created_at: Timestamp,
}

/// Data for creating a new grant.
#[derive(Debug, Default, Clone, Copy, Insertable)]
#[diesel(table_name = role_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRolePermission {
    /// Role receiving the grant.
    pub role_id: Uuid,
    /// Permission being granted.
    pub permission_id: Uuid,
}
