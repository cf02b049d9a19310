//! Appointment state repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{AppointmentState, NewAppointmentState, UpdateAppointmentState};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for appointment workflow state operations.
pub trait AppointmentStateRepository {
    /// Creates a new workflow state.
    fn create_appointment_state(
        &mut self,
        new_state: NewAppointmentState,
    ) -> impl Future<Output = PgResult<AppointmentState>> + Send;

    /// Finds a state by its unique identifier.
    fn find_appointment_state_by_id(
        &mut self,
        state_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<AppointmentState>>> + Send;

    /// Finds a state by name.
    fn find_appointment_state_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = PgResult<Option<AppointmentState>>> + Send;

    /// Lists all states ordered by name.
    fn list_appointment_states(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<AppointmentState>>> + Send;

    /// Applies partial updates to an existing state.
    fn update_appointment_state(
        &mut self,
        state_id: Uuid,
        updates: UpdateAppointmentState,
    ) -> impl Future<Output = PgResult<AppointmentState>> + Send;

    /// Permanently deletes a state, returning the number of rows removed.
    ///
    /// Fails with a foreign key violation while appointments still
    /// reference the state.
    fn delete_appointment_state(
        &mut self,
        state_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Counts appointments currently in the state.
    fn count_appointments_in_state(
        &mut self,
        state_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;
}

impl AppointmentStateRepository for PgConnection {
    async fn create_appointment_state(
        &mut self,
        mut new_state: NewAppointmentState,
    ) -> PgResult<AppointmentState> {
        use schema::appointment_states;

        new_state.name = new_state.name.trim().to_owned();

        diesel::insert_into(appointment_states::table)
            .values(&new_state)
            .returning(AppointmentState::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_appointment_state_by_id(
        &mut self,
        state_id: Uuid,
    ) -> PgResult<Option<AppointmentState>> {
        use schema::appointment_states::{self, dsl};

        appointment_states::table
            .filter(dsl::id.eq(state_id))
            .select(AppointmentState::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_appointment_state_by_name(
        &mut self,
        name: &str,
    ) -> PgResult<Option<AppointmentState>> {
        use schema::appointment_states::{self, dsl};

        appointment_states::table
            .filter(dsl::name.eq(name.trim()))
            .select(AppointmentState::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_appointment_states(
        &mut self,
        pagination: Pagination,
    ) -> PgResult<Vec<AppointmentState>> {
        use schema::appointment_states::{self, dsl};

        appointment_states::table
            .order(dsl::name.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(AppointmentState::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_appointment_state(
        &mut self,
        state_id: Uuid,
        updates: UpdateAppointmentState,
    ) -> PgResult<AppointmentState> {
        use schema::appointment_states::{self, dsl};

        diesel::update(appointment_states::table.filter(dsl::id.eq(state_id)))
            .set(&updates)
            .returning(AppointmentState::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_appointment_state(&mut self, state_id: Uuid) -> PgResult<usize> {
        use schema::appointment_states::{self, dsl};

        diesel::delete(appointment_states::table.filter(dsl::id.eq(state_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_appointments_in_state(&mut self, state_id: Uuid) -> PgResult<i64> {
        use schema::appointments::{self, dsl};

        appointments::table
            .filter(dsl::state_id.eq(state_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}
