//! Offset-based pagination for list queries.

use serde::{Deserialize, Serialize};

/// Maximum number of items per page.
pub const MAX_LIMIT: i64 = 200;

/// Offset pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
}

impl Pagination {
    /// Creates a new pagination instance, clamping out-of-range values.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let pagination = Pagination::new(0, -5);
        assert_eq!(pagination.limit, 1);
        assert_eq!(pagination.offset, 0);

        let pagination = Pagination::new(5000, 10);
        assert_eq!(pagination.limit, MAX_LIMIT);
        assert_eq!(pagination.offset, 10);
    }
}
