//! Appointment model.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::{Date, Time, Timestamp};
use uuid::Uuid;

use crate::schema::appointments;

/// A booked appointment between a client and a staff member.
///
/// The `total` column is derived; it always equals the sum of the
/// appointment's line item subtotals and is recomputed inside the same
/// transaction as any line item change.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Appointment {
    /// Unique appointment identifier.
    pub id: Uuid,
    /// Client the appointment is booked for.
    pub client_id: Uuid,
    /// Staff member performing the appointment.
    pub staff_id: Uuid,
    /// Current workflow state.
    pub state_id: Uuid,
    /// Calendar date of the appointment.
    pub scheduled_on: Date,
    /// Time of day the appointment starts.
    pub scheduled_at: Time,
    /// Sum of line item subtotals.
    pub total: BigDecimal,
    /// Timestamp when the appointment was created.
    pub created_at: Timestamp,
    /// Timestamp when the appointment was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new appointment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAppointment {
    /// Client the appointment is booked for.
    pub client_id: Uuid,
    /// Staff member performing the appointment.
    pub staff_id: Uuid,
    /// Initial workflow state.
    pub state_id: Uuid,
    /// Calendar date of the appointment.
    pub scheduled_on: Date,
    /// Time of day the appointment starts.
    pub scheduled_at: Time,
}

/// Data for updating an appointment.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAppointment {
    /// Client the appointment is booked for.
    pub client_id: Option<Uuid>,
    /// Staff member performing the appointment.
    pub staff_id: Option<Uuid>,
    /// Workflow state.
    pub state_id: Option<Uuid>,
    /// Calendar date of the appointment.
    pub scheduled_on: Option<Date>,
    /// Time of day the appointment starts.
    pub scheduled_at: Option<Time>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}
