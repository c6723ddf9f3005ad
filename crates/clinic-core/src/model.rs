//! Types exchanged with the backend actor.
//!
//! Field names serialize in camelCase to match the actor's interface.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Caller identity attached to every backend call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Textual form of the anonymous principal.
    pub const ANONYMOUS: &'static str = "2vxsx-fae";

    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Principal under which a staff account acts once authenticated.
    pub fn for_staff(user_id: &str) -> Self {
        Self(format!("staff:{user_id}"))
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Nanoseconds since the Unix epoch, the actor's native time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Convert a UTC datetime; instants before the epoch clamp to zero.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let nanos = dt.timestamp_nanos_opt().unwrap_or(i64::MAX);
        Self(u64::try_from(nanos).unwrap_or(0))
    }

    /// Midnight at the start of `date` in the given offset.
    pub fn from_local_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        match offset.from_local_datetime(&midnight).single() {
            Some(local) => Self::from_datetime(local.with_timezone(&Utc)),
            None => Self::from_datetime(midnight.and_utc()),
        }
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        let nanos = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(nanos)
    }

    /// Calendar day of this instant as seen from `offset`.
    pub fn local_date(self, offset: FixedOffset) -> NaiveDate {
        self.to_datetime().with_timezone(&offset).date_naive()
    }
}

/// Processing state of an appointment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// All statuses in the order the status selector lists them.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidStatus(s.to_string()))
    }
}

/// An appointment request as submitted by a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub parent_name: String,
    pub child_name: String,
    pub child_age: u64,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub preferred_date: Timestamp,
    pub preferred_time: String,
    pub reason: String,
    pub submission_time: Timestamp,
    #[serde(default)]
    pub status: AppointmentStatus,
}

/// An appointment request together with its position in the actor's list.
///
/// Status updates address appointments by this index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub index: u64,
    #[serde(flatten)]
    pub request: AppointmentRequest,
}

/// Whether a staff account may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationStatus {
    #[default]
    Activated,
    Deactivated,
}

impl ActivationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Activated => "Activated",
            Self::Deactivated => "Deactivated",
        }
    }
}

impl FromStr for ActivationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activated" => Ok(Self::Activated),
            "deactivated" => Ok(Self::Deactivated),
            _ => Err(Error::InvalidActivation(s.to_string())),
        }
    }
}

/// A staff account managed by administrators.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    pub user_id: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: ActivationStatus,
}

// Hand-written so passwords never reach logs.
impl fmt::Debug for StaffUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaffUser")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("status", &self.status)
            .finish()
    }
}

/// Credentials submitted through the staff login form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCredentials {
    pub user_id: String,
    pub password: String,
}

impl fmt::Debug for StaffCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaffCredentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Role the actor assigns to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}
