//! Catalog service model, owned by the catalog deployable.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::salon_services;
use crate::types::EntityStatus;

/// A bookable service offered by the salon.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = salon_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SalonService {
    /// Unique service identifier.
    pub id: Uuid,
    /// Service name, unique across the table.
    pub name: String,
    /// Description of the service.
    pub description: String,
    /// Current price.
    pub price: BigDecimal,
    /// Expected duration in minutes.
    pub duration_minutes: i32,
    /// Whether the service is offered.
    pub status: EntityStatus,
    /// Timestamp when the service was created.
    pub created_at: Timestamp,
    /// Timestamp when the service was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new service.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = salon_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSalonService {
    /// Service name.
    pub name: String,
    /// Service description.
    pub description: Option<String>,
    /// Current price.
    pub price: BigDecimal,
    /// Expected duration in minutes.
    pub duration_minutes: Option<i32>,
    /// Initial status, defaults to active.
    pub status: Option<EntityStatus>,
}

/// Data for updating a service.
#[derive(Debug, Default, Clone, AsChangeset)]
#[diesel(table_name = salon_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateSalonService {
    /// Service name.
    pub name: Option<String>,
    /// Service description.
    pub description: Option<String>,
    /// Current price.
    pub price: Option<BigDecimal>,
    /// Expected duration in minutes.
    pub duration_minutes: Option<i32>,
    /// Service status.
    pub status: Option<EntityStatus>,
    /// Timestamp of the update.
    pub updated_at: Option<Timestamp>,
}

impl SalonService {
    /// Returns whether the service may be booked.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
