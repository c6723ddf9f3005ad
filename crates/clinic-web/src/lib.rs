//! Clinic Web - public site and staff/admin portal for a children's clinic.
//!
//! Everything is rendered on the server. Appointment data and staff accounts
//! live in a backend actor reached through the [`clinic_core::Backend`]
//! trait; this crate only presents them.
//!
//! # Architecture
//!
//! - **AppState**: Shared application state (backend client, configuration, sessions)
//! - **Sessions**: Cookie-keyed sign-ins for the staff and admin portals
//! - **QueryCache**: Per-session cache of backend list queries
//! - **Routes**: Handlers grouped by portal
//! - **Render**: maud templates for every page

pub mod backend;
pub mod cache;
pub mod config;
mod error;
pub mod render;
mod routes;
pub mod session;
mod state;

pub use self::config::Config;
pub use self::error::{PortalError, PortalResult};
pub use self::routes::{HealthResponse, router};
pub use self::state::AppState;
