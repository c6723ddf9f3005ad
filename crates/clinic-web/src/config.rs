//! Application configuration loaded from environment variables.

use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use clinic_core::StaffCredentials;

/// India Standard Time, +05:30.
const DEFAULT_OFFSET_MINUTES: i32 = 330;

/// Offsets in use lie within ±14:00.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Base URL of the backend actor's RPC gateway. `None` selects the
    /// in-memory backend.
    pub backend_url: Option<String>,

    /// Per-call timeout for the backend actor.
    pub backend_timeout: Duration,

    /// Clinic name shown in titles, header, and footer.
    pub clinic_name: String,

    /// Doctor's name shown on the landing page and staff portal.
    pub doctor_name: String,

    /// Contact number, digits only (used for `tel:` links).
    pub phone: String,

    /// The clinic's local time zone as a fixed UTC offset.
    pub utc_offset: FixedOffset,

    /// How long a portal sign-in stays valid.
    pub session_ttl: Duration,

    /// Delay between retries of the appointment list query.
    pub retry_delay: Duration,

    /// Administrator account seeded into the in-memory backend.
    pub seed_admin: StaffCredentials,

    /// Port for the Prometheus `/metrics` endpoint, if enabled.
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `CLINIC_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `CLINIC_BACKEND_URL`: Backend RPC gateway (default: in-memory backend)
    /// - `CLINIC_BACKEND_TIMEOUT_MS`: Backend call timeout (default: 10000)
    /// - `CLINIC_NAME`: Clinic name (default: "Vijaya Children's Clinic")
    /// - `CLINIC_DOCTOR`: Doctor's name (default: "DR. K. MANICKAVINAYAGAR")
    /// - `CLINIC_PHONE`: Contact number (default: "9363716343")
    /// - `CLINIC_UTC_OFFSET_MINUTES`: Local offset from UTC, within ±840 (default: 330)
    /// - `CLINIC_SESSION_TTL_SECS`: Sign-in lifetime (default: 86400)
    /// - `CLINIC_RETRY_DELAY_MS`: Appointment list retry delay (default: 1000)
    /// - `CLINIC_SEED_ADMIN`: `user:password` for the in-memory backend (default: "admin:admin")
    /// - `CLINIC_METRICS_PORT`: Serve Prometheus metrics on this port
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("CLINIC_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let backend_url = std::env::var("CLINIC_BACKEND_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let backend_timeout =
            Duration::from_millis(parse_var("CLINIC_BACKEND_TIMEOUT_MS", 10_000)?);

        let clinic_name = std::env::var("CLINIC_NAME")
            .unwrap_or_else(|_| "Vijaya Children's Clinic".to_string());

        let doctor_name = std::env::var("CLINIC_DOCTOR")
            .unwrap_or_else(|_| "DR. K. MANICKAVINAYAGAR".to_string());

        let phone: String = std::env::var("CLINIC_PHONE")
            .unwrap_or_else(|_| "9363716343".to_string())
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if phone.is_empty() {
            anyhow::bail!("CLINIC_PHONE must contain at least one digit");
        }

        let offset_minutes: i32 = parse_var("CLINIC_UTC_OFFSET_MINUTES", DEFAULT_OFFSET_MINUTES)?;
        let utc_offset = offset_from_minutes(offset_minutes).ok_or_else(|| {
            anyhow::anyhow!("CLINIC_UTC_OFFSET_MINUTES out of range: {offset_minutes}")
        })?;

        let session_ttl = Duration::from_secs(parse_var("CLINIC_SESSION_TTL_SECS", 86_400)?);
        if session_ttl.is_zero() {
            anyhow::bail!("CLINIC_SESSION_TTL_SECS must be greater than zero");
        }

        let retry_delay = Duration::from_millis(parse_var("CLINIC_RETRY_DELAY_MS", 1_000)?);

        let seed_admin = parse_credentials(
            &std::env::var("CLINIC_SEED_ADMIN").unwrap_or_else(|_| "admin:admin".to_string()),
        )?;

        let metrics_port = match std::env::var("CLINIC_METRICS_PORT") {
            Ok(port) => Some(port.trim().parse::<u16>().map_err(|e| {
                anyhow::anyhow!("CLINIC_METRICS_PORT is not a valid port: {e}")
            })?),
            Err(_) => None,
        };

        tracing::info!(
            bind_addr = %bind_addr,
            backend = backend_url.as_deref().unwrap_or("in-memory"),
            clinic_name = %clinic_name,
            utc_offset = %utc_offset,
            session_ttl_secs = session_ttl.as_secs(),
            metrics_port = ?metrics_port,
            "portal configuration loaded"
        );

        Ok(Self {
            bind_addr,
            backend_url,
            backend_timeout,
            clinic_name,
            doctor_name,
            phone,
            utc_offset,
            session_ttl,
            retry_delay,
            seed_admin,
            metrics_port,
        })
    }

    /// Today's date in the clinic's local time.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }

    /// Phone number grouped for display, e.g. "93637 16343".
    pub fn phone_display(&self) -> String {
        if self.phone.len() == 10 {
            format!("{} {}", &self.phone[..5], &self.phone[5..])
        } else {
            self.phone.clone()
        }
    }
}

/// Local-development settings, matching `from_env` with no variables set.
impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            backend_url: None,
            backend_timeout: Duration::from_secs(10),
            clinic_name: "Vijaya Children's Clinic".to_string(),
            doctor_name: "DR. K. MANICKAVINAYAGAR".to_string(),
            phone: "9363716343".to_string(),
            utc_offset: offset_from_minutes(DEFAULT_OFFSET_MINUTES).unwrap_or_else(|| Utc.fix()),
            session_ttl: Duration::from_secs(86_400),
            retry_delay: Duration::from_secs(1),
            seed_admin: StaffCredentials {
                user_id: "admin".to_string(),
                password: "admin".to_string(),
            },
            metrics_port: None,
        }
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

fn parse_credentials(raw: &str) -> anyhow::Result<StaffCredentials> {
    let (user_id, password) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("CLINIC_SEED_ADMIN must look like user:password"))?;
    let user_id = user_id.trim();
    if user_id.is_empty() || password.is_empty() {
        anyhow::bail!("CLINIC_SEED_ADMIN needs both a user id and a password");
    }
    Ok(StaffCredentials {
        user_id: user_id.to_string(),
        password: password.to_string(),
    })
}
