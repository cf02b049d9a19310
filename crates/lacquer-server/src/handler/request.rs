//! Shared query parameter types for list handlers.

use lacquer_postgres::types::Pagination;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// `Query` params for paginated list handlers.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Maximum number of records to return, capped at 200.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        let defaults = Pagination::default();
        Pagination::new(
            params.limit.unwrap_or(defaults.limit),
            params.offset.unwrap_or(defaults.offset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let pagination: Pagination = PaginationParams::default().into();
        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn explicit_params_are_clamped() {
        let params = PaginationParams {
            limit: Some(5000),
            offset: Some(-3),
        };
        let pagination: Pagination = params.into();
        assert_eq!(pagination.limit, 200);
        assert_eq!(pagination.offset, 0);
    }
}
