//! Appointment line item repository and booking reports.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::Date;
use uuid::Uuid;

use crate::model::{AppointmentService, NewAppointmentService, UpdateAppointmentService};
use crate::{PgConnection, PgError, PgResult, schema};

/// How often a catalog service was booked, aggregated for reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBookingCount {
    /// Catalog service identifier.
    pub service_id: Uuid,
    /// Service name captured on the line items.
    pub service_name: String,
    /// Number of line items referencing the service.
    pub bookings: i64,
}

/// Repository for appointment line item operations.
///
/// Callers mutating line items are expected to follow up with
/// [`recompute_appointment_total`] inside the same transaction.
///
/// [`recompute_appointment_total`]: crate::query::AppointmentRepository::recompute_appointment_total
pub trait AppointmentServiceRepository {
    /// Creates a new line item.
    ///
    /// Fails with a unique violation when the appointment already has a
    /// line for the service.
    fn create_appointment_service(
        &mut self,
        new_line: NewAppointmentService,
    ) -> impl Future<Output = PgResult<AppointmentService>> + Send;

    /// Finds a line item by its unique identifier.
    fn find_appointment_service_by_id(
        &mut self,
        line_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<AppointmentService>>> + Send;

    /// Lists the line items of one appointment in creation order.
    fn list_services_for_appointment(
        &mut self,
        appointment_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<AppointmentService>>> + Send;

    /// Applies partial updates to an existing line item.
    fn update_appointment_service(
        &mut self,
        line_id: Uuid,
        updates: UpdateAppointmentService,
    ) -> impl Future<Output = PgResult<AppointmentService>> + Send;

    /// Deletes a line item, returning the number of rows removed.
    fn delete_appointment_service(
        &mut self,
        line_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Checks whether an appointment already has a line for the service.
    fn appointment_service_exists(
        &mut self,
        appointment_id: Uuid,
        service_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Ranks the most-booked services within a date range.
    ///
    /// Only appointments in the given workflow state count, callers pass
    /// the "completed" state. Returns at most `limit` rows, most booked
    /// first.
    fn top_booked_services(
        &mut self,
        state_id: Uuid,
        from: Date,
        to: Date,
        limit: i64,
    ) -> impl Future<Output = PgResult<Vec<ServiceBookingCount>>> + Send;

    /// Ranks the most-booked services of one staff member within a date
    /// range, with the same state filter as [`top_booked_services`].
    ///
    /// [`top_booked_services`]: AppointmentServiceRepository::top_booked_services
    fn top_booked_services_for_staff(
        &mut self,
        staff_id: Uuid,
        state_id: Uuid,
        from: Date,
        to: Date,
        limit: i64,
    ) -> impl Future<Output = PgResult<Vec<ServiceBookingCount>>> + Send;
}

impl AppointmentServiceRepository for PgConnection {
    async fn create_appointment_service(
        &mut self,
        new_line: NewAppointmentService,
    ) -> PgResult<AppointmentService> {
        use schema::appointment_services;

        diesel::insert_into(appointment_services::table)
            .values(&new_line)
            .returning(AppointmentService::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_appointment_service_by_id(
        &mut self,
        line_id: Uuid,
    ) -> PgResult<Option<AppointmentService>> {
        use schema::appointment_services::{self, dsl};

        appointment_services::table
            .filter(dsl::id.eq(line_id))
            .select(AppointmentService::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_services_for_appointment(
        &mut self,
        appointment_id: Uuid,
    ) -> PgResult<Vec<AppointmentService>> {
        use schema::appointment_services::{self, dsl};

        appointment_services::table
            .filter(dsl::appointment_id.eq(appointment_id))
            .order(dsl::created_at.asc())
            .select(AppointmentService::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_appointment_service(
        &mut self,
        line_id: Uuid,
        updates: UpdateAppointmentService,
    ) -> PgResult<AppointmentService> {
        use schema::appointment_services::{self, dsl};

        diesel::update(appointment_services::table.filter(dsl::id.eq(line_id)))
            .set(&updates)
            .returning(AppointmentService::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_appointment_service(&mut self, line_id: Uuid) -> PgResult<usize> {
        use schema::appointment_services::{self, dsl};

        diesel::delete(appointment_services::table.filter(dsl::id.eq(line_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn appointment_service_exists(
        &mut self,
        appointment_id: Uuid,
        service_id: Uuid,
    ) -> PgResult<bool> {
        use diesel::dsl::exists;
        use schema::appointment_services::{self, dsl};

        diesel::select(exists(
            appointment_services::table
                .filter(dsl::appointment_id.eq(appointment_id))
                .filter(dsl::service_id.eq(service_id)),
        ))
        .get_result(self)
        .await
        .map_err(PgError::from)
    }

    async fn top_booked_services(
        &mut self,
        state_id: Uuid,
        from: Date,
        to: Date,
        limit: i64,
    ) -> PgResult<Vec<ServiceBookingCount>> {
        use diesel::dsl::count_star;
        use schema::{appointment_services, appointments};

        let rows: Vec<(Uuid, String, i64)> = appointment_services::table
            .inner_join(appointments::table)
            .filter(appointments::dsl::state_id.eq(state_id))
            .filter(appointments::dsl::scheduled_on.between(from, to))
            .group_by((
                appointment_services::dsl::service_id,
                appointment_services::dsl::service_name,
            ))
            .select((
                appointment_services::dsl::service_id,
                appointment_services::dsl::service_name,
                count_star(),
            ))
            .order(count_star().desc())
            .limit(limit)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows
            .into_iter()
            .map(|(service_id, service_name, bookings)| ServiceBookingCount {
                service_id,
                service_name,
                bookings,
            })
            .collect())
    }

    async fn top_booked_services_for_staff(
        &mut self,
        staff_id: Uuid,
        state_id: Uuid,
        from: Date,
        to: Date,
        limit: i64,
    ) -> PgResult<Vec<ServiceBookingCount>> {
        use diesel::dsl::count_star;
        use schema::{appointment_services, appointments};

        let rows: Vec<(Uuid, String, i64)> = appointment_services::table
            .inner_join(appointments::table)
            .filter(appointments::dsl::staff_id.eq(staff_id))
            .filter(appointments::dsl::state_id.eq(state_id))
            .filter(appointments::dsl::scheduled_on.between(from, to))
            .group_by((
                appointment_services::dsl::service_id,
                appointment_services::dsl::service_name,
            ))
            .select((
                appointment_services::dsl::service_id,
                appointment_services::dsl::service_name,
                count_star(),
            ))
            .order(count_star().desc())
            .limit(limit)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows
            .into_iter()
            .map(|(service_id, service_name, bookings)| ServiceBookingCount {
                service_id,
                service_name,
                bookings,
            })
            .collect())
    }
}
