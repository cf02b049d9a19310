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
