//! Database query repositories for all entities in the system.
//!
//! This module contains repository implementations that provide high-level
//! database operations for all entities, encapsulating common patterns
//! and providing type-safe interfaces.
//!
//! # Pagination
//!
//! All queries that may return large result sets use the [`Pagination`]
//! struct to provide consistent, bounded pagination across the system.
//!
//! [`Pagination`]: crate::types::Pagination

pub mod account;
pub mod appointment;
pub mod appointment_service;
pub mod appointment_state;
pub mod permission;
pub mod profile;
pub mod role;
pub mod role_permission;
pub mod salon_service;

pub use account::AccountRepository;
pub use appointment::AppointmentRepository;
pub use appointment_service::{AppointmentServiceRepository, ServiceBookingCount};
pub use appointment_state::AppointmentStateRepository;
pub use permission::PermissionRepository;
pub use profile::ProfileRepository;
pub use role::RoleRepository;
pub use role_permission::RolePermissionRepository;
pub use salon_service::SalonServiceRepository;
