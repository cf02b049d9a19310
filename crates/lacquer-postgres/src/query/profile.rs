//! Staff and client profile repository.
//!
//! Profiles hang off accounts; appointment booking validates against
//! these lookups before inserting.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{ClientProfile, NewClientProfile, NewStaffProfile, StaffProfile};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for staff and client profile operations.
pub trait ProfileRepository {
    /// Creates a new staff profile.
    fn create_staff_profile(
        &mut self,
        new_profile: NewStaffProfile,
    ) -> impl Future<Output = PgResult<StaffProfile>> + Send;

    /// Finds a staff profile by its unique identifier.
    fn find_staff_profile_by_id(
        &mut self,
        profile_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<StaffProfile>>> + Send;

    /// Finds the staff profile owned by an account.
    fn find_staff_profile_by_account(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<StaffProfile>>> + Send;

    /// Creates a new client profile.
    fn create_client_profile(
        &mut self,
        new_profile: NewClientProfile,
    ) -> impl Future<Output = PgResult<ClientProfile>> + Send;

    /// Finds a client profile by its unique identifier.
    fn find_client_profile_by_id(
        &mut self,
        profile_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<ClientProfile>>> + Send;

    /// Finds the client profile owned by an account.
    fn find_client_profile_by_account(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<ClientProfile>>> + Send;
}

impl ProfileRepository for PgConnection {
    async fn create_staff_profile(
        &mut self,
        new_profile: NewStaffProfile,
    ) -> PgResult<StaffProfile> {
        use schema::staff_profiles;

        diesel::insert_into(staff_profiles::table)
            .values(&new_profile)
            .returning(StaffProfile::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_staff_profile_by_id(
        &mut self,
        profile_id: Uuid,
    ) -> PgResult<Option<StaffProfile>> {
        use schema::staff_profiles::{self, dsl};

        staff_profiles::table
            .filter(dsl::id.eq(profile_id))
            .select(StaffProfile::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_staff_profile_by_account(
        &mut self,
        account_id: Uuid,
    ) -> PgResult<Option<StaffProfile>> {
        use schema::staff_profiles::{self, dsl};

        staff_profiles::table
            .filter(dsl::account_id.eq(account_id))
            .select(StaffProfile::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn create_client_profile(
        &mut self,
        new_profile: NewClientProfile,
    ) -> PgResult<ClientProfile> {
        use schema::client_profiles;

        diesel::insert_into(client_profiles::table)
            .values(&new_profile)
            .returning(ClientProfile::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_client_profile_by_id(
        &mut self,
        profile_id: Uuid,
    ) -> PgResult<Option<ClientProfile>> {
        use schema::client_profiles::{self, dsl};

        client_profiles::table
            .filter(dsl::id.eq(profile_id))
            .select(ClientProfile::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_client_profile_by_account(
        &mut self,
        account_id: Uuid,
    ) -> PgResult<Option<ClientProfile>> {
        use schema::client_profiles::{self, dsl};

        client_profiles::table
            .filter(dsl::account_id.eq(account_id))
            .select(ClientProfile::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}
