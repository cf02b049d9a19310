//! Role permission repository for managing permission grants.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewRolePermission, Permission, Role, RolePermission};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for permission grant database operations.
pub trait RolePermissionRepository {
    /// Creates a new grant.
    ///
    /// Fails with a unique violation when the role already holds the
    /// permission.
    fn create_role_permission(
        &mut self,
        new_link: NewRolePermission,
    ) -> impl Future<Output = PgResult<RolePermission>> + Send;

    /// Finds a grant by its unique identifier.
    fn find_role_permission_by_id(
        &mut self,
        link_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<RolePermission>>> + Send;

    /// Lists all grants ordered by creation time.
    fn list_role_permissions(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<RolePermission>>> + Send;

    /// Deletes a grant, returning the number of rows removed.
    fn delete_role_permission(
        &mut self,
        link_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Checks whether a grant already exists for the pair.
    fn role_permission_exists(
        &mut self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Lists the grants of one role together with the granted permissions.
    fn find_grants_for_role(
        &mut self,
        role_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<(RolePermission, Permission)>>> + Send;

    /// Lists the distinct module names a role has been granted.
    ///
    /// This is the authorization query every permission check reduces to.
    fn find_modules_for_role(
        &mut self,
        role_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<String>>> + Send;

    /// Lists the roles granted access to a module.
    fn find_roles_for_module(
        &mut self,
        module: &str,
    ) -> impl Future<Output = PgResult<Vec<Role>>> + Send;
}

impl RolePermissionRepository for PgConnection {
    async fn create_role_permission(
        &mut self,
        new_link: NewRolePermission,
    ) -> PgResult<RolePermission> {
        use schema::role_permissions;

        diesel::insert_into(role_permissions::table)
            .values(&new_link)
            .returning(RolePermission::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_role_permission_by_id(
        &mut self,
        link_id: Uuid,
    ) -> PgResult<Option<RolePermission>> {
        use schema::role_permissions::{self, dsl};

        role_permissions::table
            .filter(dsl::id.eq(link_id))
            .select(RolePermission::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_role_permissions(
        &mut self,
        pagination: Pagination,
    ) -> PgResult<Vec<RolePermission>> {
        use schema::role_permissions::{self, dsl};

        role_permissions::table
            .order(dsl::created_at.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(RolePermission::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_role_permission(&mut self, link_id: Uuid) -> PgResult<usize> {
        use schema::role_permissions::{self, dsl};

        diesel::delete(role_permissions::table.filter(dsl::id.eq(link_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn role_permission_exists(
        &mut self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> PgResult<bool> {
        use diesel::dsl::exists;
        use schema::role_permissions::{self, dsl};

        diesel::select(exists(
            role_permissions::table
                .filter(dsl::role_id.eq(role_id))
                .filter(dsl::permission_id.eq(permission_id)),
        ))
        .get_result(self)
        .await
        .map_err(PgError::from)
    }

    async fn find_grants_for_role(
        &mut self,
        role_id: Uuid,
    ) -> PgResult<Vec<(RolePermission, Permission)>> {
        use schema::{permissions, role_permissions};

        role_permissions::table
            .inner_join(permissions::table)
            .filter(role_permissions::dsl::role_id.eq(role_id))
            .order(permissions::dsl::module.asc())
            .select((RolePermission::as_select(), Permission::as_select()))
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_modules_for_role(&mut self, role_id: Uuid) -> PgResult<Vec<String>> {
        use schema::{permissions, role_permissions};

        role_permissions::table
            .inner_join(permissions::table)
            .filter(role_permissions::dsl::role_id.eq(role_id))
            .select(permissions::dsl::module)
            .distinct()
            .order(permissions::dsl::module.asc())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_roles_for_module(&mut self, module: &str) -> PgResult<Vec<Role>> {
        use schema::{permissions, role_permissions, roles};

        role_permissions::table
            .inner_join(permissions::table)
            .inner_join(roles::table)
            .filter(permissions::dsl::module.eq(module))
            .order(roles::dsl::name.asc())
            .select(Role::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
