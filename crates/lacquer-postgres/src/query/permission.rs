//! Permission repository.
//!
//! Permissions are seeded by migration and read-only at runtime; grants
//! are managed through the role permission repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::Permission;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for permission database operations.
pub trait PermissionRepository {
    /// Lists all permissions ordered by module name.
    fn list_permissions(&mut self) -> impl Future<Output = PgResult<Vec<Permission>>> + Send;

    /// Finds a permission by its unique identifier.
    fn find_permission_by_id(
        &mut self,
        permission_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Permission>>> + Send;

    /// Finds a permission by the module it protects.
    fn find_permission_by_module(
        &mut self,
        module: &str,
    ) -> impl Future<Output = PgResult<Option<Permission>>> + Send;
}

impl PermissionRepository for PgConnection {
    async fn list_permissions(&mut self) -> PgResult<Vec<Permission>> {
        use schema::permissions::{self, dsl};

        permissions::table
            .order(dsl::module.asc())
            .select(Permission::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_permission_by_id(
        &mut self,
        permission_id: Uuid,
    ) -> PgResult<Option<Permission>> {
        use schema::permissions::{self, dsl};

        permissions::table
            .filter(dsl::id.eq(permission_id))
            .select(Permission::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_permission_by_module(&mut self, module: &str) -> PgResult<Option<Permission>> {
        use schema::permissions::{self, dsl};

        permissions::table
            .filter(dsl::module.eq(module))
            .select(Permission::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}
