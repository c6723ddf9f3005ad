//! Domain types, backend interface, and presentation logic for the clinic portal.
//!
//! This crate provides:
//! - The types and the [`Backend`] trait of the backend actor's RPC interface
//! - Pure date-range and text filters over appointment and staff lists
//! - Booking form validation
//! - Optimistic mutation with snapshot rollback
//! - Prometheus metrics helpers
//! - Shared error types

pub mod backend;
pub mod booking;
mod error;
pub mod filter;
pub mod metrics;
pub mod model;
pub mod optimistic;

/// Services listed on the landing page.
pub const SERVICES: [&str; 6] = [
    "Newborn Care",
    "Vaccination",
    "Fever / Infection",
    "Nebulisation",
    "Growth Monitoring",
    "Nutrition Advice",
];

/// Opening hours as shown to parents.
pub const OPENING_HOURS: &str = "Mon to Sat | 7 PM to 9 PM";

pub use backend::{Backend, BackendError};
pub use booking::{BookingForm, FieldErrors, TIME_SLOTS};
pub use error::{Error, Result};
pub use filter::{DateFilter, filter_appointments, filter_by_date, filter_by_search, filter_staff};
pub use model::{
    ActivationStatus, Appointment, AppointmentRequest, AppointmentStatus, Principal,
    StaffCredentials, StaffUser, Timestamp, UserProfile, UserRole,
};
pub use optimistic::{Outcome, apply_optimistic};
