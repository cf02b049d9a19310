//! Appointment line item model.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::appointment_services;

/// A line item attaching one catalog service to an appointment.
///
/// The service name and subtotal are captured from the catalog at the
/// moment the line is created, so later catalog edits do not rewrite
/// appointment history. The pair `(appointment_id, service_id)` is
/// unique.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = appointment_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppointmentService {
    /// Unique line item identifier.
    pub id: Uuid,
    /// Appointment the line belongs to.
    pub appointment_id: Uuid,
    /// Catalog service in the remote catalog database.
    pub service_id: Uuid,
    /// Service name captured at creation time.
    pub service_name: String,
    /// Price captured at creation time.
    pub subtotal: BigDecimal,
    /// Timestamp when the line was created.
    pub created_at: Timestamp,
    /// Timestamp when the line was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new line item.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointment_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAppointmentService {
    /// Appointment the line belongs to.
    pub appointment_id: Uuid,
    /// Catalog service identifier.
    pub service_id: Uuid,
    /// Service name captured from the catalog.
    pub service_name: String,
    /// Price captured from the catalog.
    pub subtotal: BigDecimal,
}

/// Data for updating a line item.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = appointment_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAppointmentService {
    /// Catalog service identifier.
    pub service_id: Option<Uuid>,
    /// Service name captured from the catalog.
    pub service_name: Option<String>,
    /// Price captured from the catalog.
    pub subtotal: Option<BigDecimal>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}
