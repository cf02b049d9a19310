//! Shared database types used across models and queries.

mod entity_status;
mod pagination;

pub use entity_status::EntityStatus;
pub use pagination::{MAX_LIMIT, Pagination};
