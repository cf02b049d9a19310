//! Appointment workflow state model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::appointment_states;
use crate::types::EntityStatus;

/// A workflow state an appointment can be in, e.g. "scheduled" or
/// "completed". States are data rather than an enum so salons can tune
/// their own workflow.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = appointment_states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppointmentState {
    /// Unique state identifier.
    pub id: Uuid,
    /// State name, unique across the table.
    pub name: String,
    /// Whether the state is selectable for new appointments.
    pub status: EntityStatus,
    /// Timestamp when the state was created.
    pub created_at: Timestamp,
    /// Timestamp when the state was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new appointment state.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = appointment_states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAppointmentState {
    /// State name.
    pub name: String,
    /// Initial status, defaults to active.
    pub status: Option<EntityStatus>,
}

/// Data for updating an appointment state.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = appointment_states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAppointmentState {
    /// State name.
    pub name: Option<String>,
    /// State status.
    pub status: Option<EntityStatus>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}
