//! Database models for all entities in the system.
//!
//! This module contains Diesel model definitions for all database tables,
//! including structs for querying, inserting, and updating records.

mod account;
mod appointment;
mod appointment_service;
mod appointment_state;
mod client_profile;
mod permission;
mod role;
mod role_permission;
mod salon_service;
mod staff_profile;

// Identity models
pub use account::{Account, NewAccount, UpdateAccount};
pub use client_profile::{ClientProfile, NewClientProfile, UpdateClientProfile};
pub use staff_profile::{NewStaffProfile, StaffProfile, UpdateStaffProfile};
// Authorization models
pub use permission::{NewPermission, Permission};
pub use role::{NewRole, Role, UpdateRole};
pub use role_permission::{NewRolePermission, RolePermission};
// Scheduling models
pub use appointment::{Appointment, NewAppointment, UpdateAppointment};
pub use appointment_service::{
    AppointmentService, NewAppointmentService, UpdateAppointmentService,
};
pub use appointment_state::{AppointmentState, NewAppointmentState, UpdateAppointmentState};
// Catalog models
pub use salon_service::{NewSalonService, SalonService, UpdateSalonService};
