//! Appointment repository.

use std::future::Future;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::Date;
use uuid::Uuid;

use crate::model::{Appointment, NewAppointment, UpdateAppointment};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for appointment database operations.
pub trait AppointmentRepository {
    /// Creates a new appointment with a zero total.
    fn create_appointment(
        &mut self,
        new_appointment: NewAppointment,
    ) -> impl Future<Output = PgResult<Appointment>> + Send;

    /// Finds an appointment by its unique identifier.
    fn find_appointment_by_id(
        &mut self,
        appointment_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Appointment>>> + Send;

    /// Lists appointments ordered by schedule, most recent first.
    fn list_appointments(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Appointment>>> + Send;

    /// Lists appointments booked for one client.
    fn list_appointments_for_client(
        &mut self,
        client_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Appointment>>> + Send;

    /// Lists appointments assigned to one staff member.
    fn list_appointments_for_staff(
        &mut self,
        staff_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Appointment>>> + Send;

    /// Applies partial updates to an existing appointment.
    fn update_appointment(
        &mut self,
        appointment_id: Uuid,
        updates: UpdateAppointment,
    ) -> impl Future<Output = PgResult<Appointment>> + Send;

    /// Permanently deletes an appointment and its line items.
    fn delete_appointment(
        &mut self,
        appointment_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Recomputes the appointment total from its line item subtotals.
    ///
    /// Must run inside the same transaction as the line item change it
    /// follows, otherwise a concurrent edit can leave a stale total.
    fn recompute_appointment_total(
        &mut self,
        appointment_id: Uuid,
    ) -> impl Future<Output = PgResult<Appointment>> + Send;

    /// Lists appointments scheduled within the inclusive date range.
    fn list_appointments_between(
        &mut self,
        from: Date,
        to: Date,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Appointment>>> + Send;
}

impl AppointmentRepository for PgConnection {
    async fn create_appointment(
        &mut self,
        new_appointment: NewAppointment,
    ) -> PgResult<Appointment> {
        use schema::appointments;

        diesel::insert_into(appointments::table)
            .values(&new_appointment)
            .returning(Appointment::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_appointment_by_id(
        &mut self,
        appointment_id: Uuid,
    ) -> PgResult<Option<Appointment>> {
        use schema::appointments::{self, dsl};

        appointments::table
            .filter(dsl::id.eq(appointment_id))
            .select(Appointment::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_appointments(&mut self, pagination: Pagination) -> PgResult<Vec<Appointment>> {
        use schema::appointments::{self, dsl};

        appointments::table
            .order((dsl::scheduled_on.desc(), dsl::scheduled_at.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Appointment::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_appointments_for_client(
        &mut self,
        client_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Appointment>> {
        use schema::appointments::{self, dsl};

        appointments::table
            .filter(dsl::client_id.eq(client_id))
            .order((dsl::scheduled_on.desc(), dsl::scheduled_at.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Appointment::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_appointments_for_staff(
        &mut self,
        staff_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Appointment>> {
        use schema::appointments::{self, dsl};

        appointments::table
            .filter(dsl::staff_id.eq(staff_id))
            .order((dsl::scheduled_on.desc(), dsl::scheduled_at.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Appointment::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_appointment(
        &mut self,
        appointment_id: Uuid,
        updates: UpdateAppointment,
    ) -> PgResult<Appointment> {
        use schema::appointments::{self, dsl};

        diesel::update(appointments::table.filter(dsl::id.eq(appointment_id)))
            .set(&updates)
            .returning(Appointment::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_appointment(&mut self, appointment_id: Uuid) -> PgResult<usize> {
        use schema::appointments::{self, dsl};

        diesel::delete(appointments::table.filter(dsl::id.eq(appointment_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn recompute_appointment_total(
        &mut self,
        appointment_id: Uuid,
    ) -> PgResult<Appointment> {
        use diesel::dsl::sum;
        use schema::{appointment_services, appointments};

        let total: Option<BigDecimal> = appointment_services::table
            .filter(appointment_services::dsl::appointment_id.eq(appointment_id))
            .select(sum(appointment_services::dsl::subtotal))
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        let total = total.unwrap_or_else(|| BigDecimal::from(0));

        diesel::update(appointments::table.filter(appointments::dsl::id.eq(appointment_id)))
            .set(appointments::dsl::total.eq(total))
            .returning(Appointment::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_appointments_between(
        &mut self,
        from: Date,
        to: Date,
        pagination: Pagination,
    ) -> PgResult<Vec<Appointment>> {
        use schema::appointments::{self, dsl};

        appointments::table
            .filter(dsl::scheduled_on.between(from, to))
            .order((dsl::scheduled_on.asc(), dsl::scheduled_at.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Appointment::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
