//! Client profile model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::client_profiles;
use crate::types::EntityStatus;

/// Profile for a client who books appointments.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = client_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClientProfile {
    /// Unique profile identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Contact phone number.
    pub phone_number: String,
    /// Whether the client may book appointments.
    pub status: EntityStatus,
    /// Timestamp when the profile was created.
    pub created_at: Timestamp,
    /// Timestamp when the profile was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new client profile.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = client_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewClientProfile {
    /// Owning account.
    pub account_id: Uuid,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Initial status, defaults to active.
    pub status: Option<EntityStatus>,
}

/// Data for updating a client profile.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = client_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateClientProfile {
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Profile status.
    pub status: Option<EntityStatus>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}
