//! Error types for the clinic portal core.

use thiserror::Error;

use crate::backend::BackendError;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while interpreting portal input or talking to the backend.
#[derive(Error, Debug)]
pub enum Error {
    /// A form value named an appointment status that does not exist.
    #[error("invalid appointment status: {0}")]
    InvalidStatus(String),

    /// A form value named an activation status that does not exist.
    #[error("invalid activation status: {0}")]
    InvalidActivation(String),

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date '{value}': {reason}")]
    InvalidDate {
        /// The raw input.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The backend actor rejected or failed a call.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
