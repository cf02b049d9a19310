//! Staff profile model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::staff_profiles;
use crate::types::EntityStatus;

/// Profile for a staff member who performs appointments.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = staff_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StaffProfile {
    /// Unique profile identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Area of specialty, free-form.
    pub specialty: String,
    /// Whether the staff member is bookable.
    pub status: EntityStatus,
    /// Timestamp when the profile was created.
    pub created_at: Timestamp,
    /// Timestamp when the profile was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new staff profile.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = staff_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewStaffProfile {
    /// Owning account.
    pub account_id: Uuid,
    /// Area of specialty.
    pub specialty: Option<String>,
    /// Initial status, defaults to active.
    pub status: Option<EntityStatus>,
}

/// Data for updating a staff profile.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = staff_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateStaffProfile {
    /// Area of specialty.
    pub specialty: Option<String>,
    /// Profile status.
    pub status: Option<EntityStatus>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}
