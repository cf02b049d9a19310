//! Role repository for managing roles and their lifecycle.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::model::{NewRole, Role, UpdateRole};
use crate::types::{EntityStatus, Pagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for role database operations.
pub trait RoleRepository {
    /// Creates a new role.
    ///
    /// Fails with a unique violation when the name is already taken.
    fn create_role(&mut self, new_role: NewRole) -> impl Future<Output = PgResult<Role>> + Send;

    /// Finds a role by its unique identifier.
    fn find_role_by_id(
        &mut self,
        role_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Role>>> + Send;

    /// Finds a role by its name.
    fn find_role_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = PgResult<Option<Role>>> + Send;

    /// Lists all roles ordered by name.
    fn list_roles(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Role>>> + Send;

    /// Lists roles filtered by status, ordered by name.
    fn list_roles_by_status(
        &mut self,
        status: EntityStatus,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Role>>> + Send;

    /// Applies partial updates to an existing role.
    fn update_role(
        &mut self,
        role_id: Uuid,
        updates: UpdateRole,
    ) -> impl Future<Output = PgResult<Role>> + Send;

    /// Permanently deletes a role.
    ///
    /// Grants cascade at the database level; accounts referencing the
    /// role have their assignment cleared. Returns the number of rows
    /// removed.
    fn delete_role(&mut self, role_id: Uuid) -> impl Future<Output = PgResult<usize>> + Send;

    /// Counts accounts currently assigned to the role.
    fn count_accounts_with_role(
        &mut self,
        role_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Counts active accounts currently assigned to the role.
    ///
    /// Inactive assignments do not block a role deletion, so the delete
    /// guard consults this count rather than the total.
    fn count_active_accounts_with_role(
        &mut self,
        role_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Sets the role status and cascades it to the role's accounts.
    ///
    /// Every account assigned to the role and the staff and client
    /// profiles of those accounts take the new status in the same
    /// transaction, in both directions.
    fn set_role_status_cascading(
        &mut self,
        role_id: Uuid,
        status: EntityStatus,
    ) -> impl Future<Output = PgResult<Role>> + Send;
}

impl RoleRepository for PgConnection {
    async fn create_role(&mut self, mut new_role: NewRole) -> PgResult<Role> {
        use schema::roles;

        new_role.name = new_role.name.trim().to_owned();

        diesel::insert_into(roles::table)
            .values(&new_role)
            .returning(Role::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_role_by_id(&mut self, role_id: Uuid) -> PgResult<Option<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .filter(dsl::id.eq(role_id))
            .select(Role::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_role_by_name(&mut self, name: &str) -> PgResult<Option<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .filter(dsl::name.eq(name.trim()))
            .select(Role::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_roles(&mut self, pagination: Pagination) -> PgResult<Vec<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .order(dsl::name.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Role::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_roles_by_status(
        &mut self,
        status: EntityStatus,
        pagination: Pagination,
    ) -> PgResult<Vec<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .filter(dsl::status.eq(status))
            .order(dsl::name.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Role::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_role(&mut self, role_id: Uuid, updates: UpdateRole) -> PgResult<Role> {
        use schema::roles::{self, dsl};

        diesel::update(roles::table.filter(dsl::id.eq(role_id)))
            .set(&updates)
            .returning(Role::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_role(&mut self, role_id: Uuid) -> PgResult<usize> {
        use schema::roles::{self, dsl};

        diesel::delete(roles::table.filter(dsl::id.eq(role_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_accounts_with_role(&mut self, role_id: Uuid) -> PgResult<i64> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::role_id.eq(role_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_active_accounts_with_role(&mut self, role_id: Uuid) -> PgResult<i64> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::role_id.eq(role_id))
            .filter(dsl::status.eq(EntityStatus::Active))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn set_role_status_cascading(
        &mut self,
        role_id: Uuid,
        status: EntityStatus,
    ) -> PgResult<Role> {
        self.transaction::<Role, PgError, _>(|conn| {
            async move {
                use schema::{accounts, roles};

                let role = diesel::update(roles::table.filter(roles::dsl::id.eq(role_id)))
                    .set(roles::dsl::status.eq(status))
                    .returning(Role::as_returning())
                    .get_result(conn)
                    .await?;

                use schema::{client_profiles, staff_profiles};

                let affected = accounts::table
                    .filter(accounts::dsl::role_id.eq(role_id))
                    .select(accounts::dsl::id);

                diesel::update(
                    staff_profiles::table
                        .filter(staff_profiles::dsl::account_id.eq_any(affected.clone())),
                )
                .set(staff_profiles::dsl::status.eq(status))
                .execute(conn)
                .await?;

                diesel::update(
                    client_profiles::table
                        .filter(client_profiles::dsl::account_id.eq_any(affected)),
                )
                .set(client_profiles::dsl::status.eq(status))
                .execute(conn)
                .await?;

                diesel::update(accounts::table.filter(accounts::dsl::role_id.eq(role_id)))
                    .set(accounts::dsl::status.eq(status))
                    .execute(conn)
                    .await?;

                Ok(role)
            }
            .scope_boxed()
        })
        .await
    }
}
