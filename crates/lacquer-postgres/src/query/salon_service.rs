//! Catalog service repository, used by the catalog deployable.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewSalonService, SalonService, UpdateSalonService};
use crate::types::{EntityStatus, Pagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for salon service catalog operations.
pub trait SalonServiceRepository {
    /// Creates a new catalog service.
    ///
    /// Fails with a unique violation when the name is taken.
    fn create_salon_service(
        &mut self,
        new_service: NewSalonService,
    ) -> impl Future<Output = PgResult<SalonService>> + Send;

    /// Finds a service by its unique identifier.
    fn find_salon_service_by_id(
        &mut self,
        service_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<SalonService>>> + Send;

    /// Lists all services ordered by name.
    fn list_salon_services(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<SalonService>>> + Send;

    /// Lists services filtered by status, ordered by name.
    fn list_salon_services_by_status(
        &mut self,
        status: EntityStatus,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<SalonService>>> + Send;

    /// Applies partial updates to an existing service.
    fn update_salon_service(
        &mut self,
        service_id: Uuid,
        updates: UpdateSalonService,
    ) -> impl Future<Output = PgResult<SalonService>> + Send;

    /// Permanently deletes a service, returning the number of rows removed.
    fn delete_salon_service(
        &mut self,
        service_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;
}

impl SalonServiceRepository for PgConnection {
    async fn create_salon_service(
        &mut self,
        mut new_service: NewSalonService,
    ) -> PgResult<SalonService> {
        use schema::salon_services;

        new_service.name = new_service.name.trim().to_owned();

        diesel::insert_into(salon_services::table)
            .values(&new_service)
            .returning(SalonService::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_salon_service_by_id(
        &mut self,
        service_id: Uuid,
    ) -> PgResult<Option<SalonService>> {
        use schema::salon_services::{self, dsl};

        salon_services::table
            .filter(dsl::id.eq(service_id))
            .select(SalonService::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_salon_services(&mut self, pagination: Pagination) -> PgResult<Vec<SalonService>> {
        use schema::salon_services::{self, dsl};

        salon_services::table
            .order(dsl::name.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(SalonService::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_salon_services_by_status(
        &mut self,
        status: EntityStatus,
        pagination: Pagination,
    ) -> PgResult<Vec<SalonService>> {
        use schema::salon_services::{self, dsl};

        salon_services::table
            .filter(dsl::status.eq(status))
            .order(dsl::name.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(SalonService::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_salon_service(
        &mut self,
        service_id: Uuid,
        updates: UpdateSalonService,
    ) -> PgResult<SalonService> {
        use schema::salon_services::{self, dsl};

        diesel::update(salon_services::table.filter(dsl::id.eq(service_id)))
            .set(&updates)
            .returning(SalonService::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_salon_service(&mut self, service_id: Uuid) -> PgResult<usize> {
        use schema::salon_services::{self, dsl};

        diesel::delete(salon_services::table.filter(dsl::id.eq(service_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }
}
