//! JSON RPC client for the backend actor.
//!
//! Every call is `POST {base}/rpc/{method}` with body
//! `{"caller": <principal>, "args": <arguments>}`. A 2xx response carries the
//! JSON result (`null` or an empty body for unit results); anything else
//! carries the actor's error message as text.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use clinic_core::metrics::record_backend_call;
use clinic_core::{
    Appointment, AppointmentRequest, AppointmentStatus, Backend, BackendError, Principal,
    StaffCredentials, StaffUser, UserProfile, UserRole,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Serialize)]
struct RpcCall<'a, A> {
    caller: &'a Principal,
    args: A,
}

/// Backend reached over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    async fn call<A, R>(
        &self,
        method: &'static str,
        caller: &Principal,
        args: A,
    ) -> Result<R, BackendError>
    where
        A: Serialize + Send,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let result = self.send(method, caller, args).await;
        record_backend_call(method, started.elapsed());

        if let Err(err) = &result {
            tracing::debug!(method, error = %err, "backend call failed");
        }
        result
    }

    async fn send<A, R>(
        &self,
        method: &'static str,
        caller: &Principal,
        args: A,
    ) -> Result<R, BackendError>
    where
        A: Serialize + Send,
        R: DeserializeOwned,
    {
        let url = format!("{}/rpc/{method}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RpcCall { caller, args })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Unavailable(format!(
                        "{method} timed out after {}ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    BackendError::Unavailable(format!("{method}: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Unavailable(format!("{method}: {e}")))?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).trim().to_string();
            let message = if message.is_empty() {
                status.to_string()
            } else {
                message
            };
            return Err(error_for_status(status, message));
        }

        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body).map_err(|e| {
            BackendError::Unavailable(format!("{method}: malformed response: {e}"))
        })
    }
}

fn error_for_status(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        s if s.is_client_error() => BackendError::Rejected(message),
        _ => BackendError::Unavailable(message),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn create_appointment(
        &self,
        caller: &Principal,
        request: AppointmentRequest,
    ) -> Result<(), BackendError> {
        self.call("createAppointment", caller, request).await
    }

    async fn list_appointments(
        &self,
        caller: &Principal,
    ) -> Result<Vec<Appointment>, BackendError> {
        // The actor returns bare requests; status updates address them by position.
        let requests: Vec<AppointmentRequest> = self.call("listAppointments", caller, ()).await?;
        Ok(requests
            .into_iter()
            .zip(0u64..)
            .map(|(request, index)| Appointment { index, request })
            .collect())
    }

    async fn update_appointment_status(
        &self,
        caller: &Principal,
        index: u64,
        status: AppointmentStatus,
    ) -> Result<(), BackendError> {
        self.call(
            "updateAppointmentStatus",
            caller,
            json!({ "index": index, "status": status }),
        )
        .await
    }

    async fn authenticate_staff(
        &self,
        caller: &Principal,
        credentials: StaffCredentials,
    ) -> Result<bool, BackendError> {
        self.call("authenticateStaff", caller, credentials).await
    }

    async fn get_all_active_staff_users(
        &self,
        caller: &Principal,
    ) -> Result<Vec<StaffUser>, BackendError> {
        self.call("getAllActiveStaffUsers", caller, ()).await
    }

    async fn create_staff_user(
        &self,
        caller: &Principal,
        staff: StaffUser,
    ) -> Result<(), BackendError> {
        self.call("createStaffUser", caller, staff).await
    }

    async fn update_staff_user(
        &self,
        caller: &Principal,
        user_id: &str,
        staff: StaffUser,
    ) -> Result<(), BackendError> {
        self.call(
            "updateStaffUser",
            caller,
            json!({ "userId": user_id, "staff": staff }),
        )
        .await
    }

    async fn delete_staff_user(
        &self,
        caller: &Principal,
        user_id: &str,
    ) -> Result<(), BackendError> {
        self.call("deleteStaffUser", caller, json!({ "userId": user_id }))
            .await
    }

    async fn get_caller_user_profile(
        &self,
        caller: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.call("getCallerUserProfile", caller, ()).await
    }

    async fn save_caller_user_profile(
        &self,
        caller: &Principal,
        profile: UserProfile,
    ) -> Result<(), BackendError> {
        self.call("saveCallerUserProfile", caller, profile).await
    }

    async fn get_caller_user_role(&self, caller: &Principal) -> Result<UserRole, BackendError> {
        self.call("getCallerUserRole", caller, ()).await
    }

    async fn is_caller_admin(&self, caller: &Principal) -> Result<bool, BackendError> {
        self.call("isCallerAdmin", caller, ()).await
    }
}
