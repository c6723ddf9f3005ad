//! The backend actor's RPC interface.
//!
//! The actor owns persistence, authentication, and access control. The
//! portal only ever reaches it through [`Backend`], passing the caller's
//! [`Principal`] with each call.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    Appointment, AppointmentRequest, AppointmentStatus, Principal, StaffCredentials, StaffUser,
    UserProfile, UserRole,
};

/// Failure reported by (or while reaching) the backend actor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The caller lacks permission for the call.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The actor refused the call (duplicate user, unknown index, ...).
    #[error("rejected: {0}")]
    Rejected(String),

    /// The actor could not be reached or failed internally.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Whether retrying cannot help because the caller is not allowed.
    ///
    /// The actor reports permission failures as trapped messages, so a
    /// message mentioning "Unauthorized" or "permission" counts as well.
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::Rejected(msg) | Self::Unavailable(msg) => {
                msg.contains("Unauthorized") || msg.contains("permission")
            }
        }
    }

    /// Human-readable detail without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Unauthorized(msg) | Self::Rejected(msg) | Self::Unavailable(msg) => msg,
        }
    }
}

/// Typed client for the backend actor.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_appointment(
        &self,
        caller: &Principal,
        request: AppointmentRequest,
    ) -> Result<(), BackendError>;

    async fn list_appointments(&self, caller: &Principal)
    -> Result<Vec<Appointment>, BackendError>;

    async fn update_appointment_status(
        &self,
        caller: &Principal,
        index: u64,
        status: AppointmentStatus,
    ) -> Result<(), BackendError>;

    async fn authenticate_staff(
        &self,
        caller: &Principal,
        credentials: StaffCredentials,
    ) -> Result<bool, BackendError>;

    /// Every staff account, activated or not.
    async fn get_all_active_staff_users(
        &self,
        caller: &Principal,
    ) -> Result<Vec<StaffUser>, BackendError>;

    async fn create_staff_user(
        &self,
        caller: &Principal,
        staff: StaffUser,
    ) -> Result<(), BackendError>;

    async fn update_staff_user(
        &self,
        caller: &Principal,
        user_id: &str,
        staff: StaffUser,
    ) -> Result<(), BackendError>;

    async fn delete_staff_user(&self, caller: &Principal, user_id: &str)
    -> Result<(), BackendError>;

    async fn get_caller_user_profile(
        &self,
        caller: &Principal,
    ) -> Result<Option<UserProfile>, BackendError>;

    async fn save_caller_user_profile(
        &self,
        caller: &Principal,
        profile: UserProfile,
    ) -> Result<(), BackendError>;

    async fn get_caller_user_role(&self, caller: &Principal) -> Result<UserRole, BackendError>;

    async fn is_caller_admin(&self, caller: &Principal) -> Result<bool, BackendError> {
        Ok(self.get_caller_user_role(caller).await? == UserRole::Admin)
    }
}
