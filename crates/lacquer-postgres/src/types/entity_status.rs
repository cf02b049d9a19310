//! Activation status shared by soft-deletable entities.

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Whether a record participates in normal operations.
///
/// Corresponds to the `entity_status` PostgreSQL enum. Rows flip to
/// `Inactive` instead of being deleted whenever other records still
/// reference them.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::EntityStatus"]
pub enum EntityStatus {
    /// Record is visible and usable.
    #[db_rename = "active"]
    #[serde(rename = "active")]
    #[strum(serialize = "active")]
    #[default]
    Active,

    /// Record is retained for history but hidden from normal listings.
    #[db_rename = "inactive"]
    #[serde(rename = "inactive")]
    #[strum(serialize = "inactive")]
    Inactive,
}

impl EntityStatus {
    /// Returns whether the record is usable.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, EntityStatus::Active)
    }

    /// Returns the opposite status.
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            EntityStatus::Active => EntityStatus::Inactive,
            EntityStatus::Inactive => EntityStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_between_states() {
        assert_eq!(EntityStatus::Active.toggled(), EntityStatus::Inactive);
        assert_eq!(EntityStatus::Inactive.toggled(), EntityStatus::Active);
        assert!(EntityStatus::Active.is_active());
        assert!(!EntityStatus::Inactive.is_active());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&EntityStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let status: EntityStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, EntityStatus::Inactive);
    }
}
