//! Staff portal handlers: sign-in, the appointments table, and status
//! updates.

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use clinic_core::metrics::{record_login, record_status_update};
use clinic_core::optimistic::set_status;
use clinic_core::{
    Appointment, AppointmentStatus, BackendError, Outcome, Principal, StaffCredentials,
    apply_optimistic, filter_appointments,
};
use serde::Deserialize;

use super::{Caching, html_response, portal_page, redirect};
use crate::cache::{LIST_RETRIES, QueryCache, queries, with_retry};
use crate::error::PortalError;
use crate::render::components::Notice;
use crate::render::staff::{self, AppointmentFilters, AppointmentsView};
use crate::session::{CurrentSession, Session, SessionKind, clear_cookie};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid user ID or password. Please try again.";
const LOGIN_FAILED: &str = "Login failed. Please check your credentials and try again.";
const MISSING_CREDENTIALS: &str = "Please enter your user ID and password.";

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    notice: String,
}

impl NoticeQuery {
    pub fn notice(&self) -> Option<Notice> {
        Notice::from_code(&self.notice)
    }
}

/// Result of checking credentials against the backend.
pub enum LoginCheck {
    Accepted(String),
    Refused(&'static str),
}

/// Authenticate `credentials` as an anonymous caller.
///
/// Authorization failures read the same as a wrong password; other backend
/// failures get a generic retry message.
pub async fn check_credentials(state: &AppState, credentials: StaffCredentials) -> LoginCheck {
    let user_id = credentials.user_id.trim().to_string();
    if user_id.is_empty() || credentials.password.is_empty() {
        return LoginCheck::Refused(MISSING_CREDENTIALS);
    }

    let credentials = StaffCredentials {
        user_id: user_id.clone(),
        password: credentials.password,
    };
    match state
        .backend
        .authenticate_staff(&Principal::anonymous(), credentials)
        .await
    {
        Ok(true) => LoginCheck::Accepted(user_id),
        Ok(false) => LoginCheck::Refused(INVALID_CREDENTIALS),
        Err(err) if err.is_authorization() => LoginCheck::Refused(INVALID_CREDENTIALS),
        Err(err) => {
            tracing::error!(error = %err, "staff authentication failed");
            LoginCheck::Refused(LOGIN_FAILED)
        }
    }
}

/// Load the session's appointment list, from cache or the backend.
async fn load_appointments(
    state: &AppState,
    session: &Session,
) -> Result<Vec<Appointment>, BackendError> {
    let key = QueryCache::key(&session.id, queries::APPOINTMENTS);
    let backend = &state.backend;
    let principal = &session.principal;
    let delay = state.config.retry_delay;
    state
        .queries
        .get_or_compute(&key, move || {
            with_retry(LIST_RETRIES, delay, move || backend.list_appointments(principal))
        })
        .await
}

/// `GET /staff`: the sign-in form, or the filtered appointments table.
pub async fn appointments_page(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(filters): Query<AppointmentFilters>,
    Query(notice): Query<NoticeQuery>,
) -> Response {
    let config = &state.config;
    let Some(session) = session else {
        return portal_page(staff::login(config, "", None));
    };

    let all = match load_appointments(&state, &session).await {
        Ok(all) => all,
        Err(err) if err.is_authorization() => {
            tracing::warn!(user_id = %session.user_id, error = %err, "appointments refused");
            return html_response(
                StatusCode::FORBIDDEN,
                staff::access_denied(config, &session.user_id),
                Caching::NoStore,
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load appointments");
            return html_response(
                StatusCode::SERVICE_UNAVAILABLE,
                staff::load_failed(config, &session.user_id, &filters),
                Caching::NoStore,
            );
        }
    };

    let profile = match state
        .backend
        .get_caller_user_profile(&session.principal)
        .await
    {
        Ok(profile) => profile,
        Err(err) => {
            tracing::debug!(error = %err, "profile unavailable");
            None
        }
    };

    let shown = filter_appointments(
        &all,
        &filters.date_filter(),
        filters.query(),
        config.today(),
        config.utc_offset,
    );

    tracing::debug!(
        total = all.len(),
        shown = shown.len(),
        range = filters.date_filter().key(),
        "appointments listed"
    );

    portal_page(staff::appointments(
        config,
        &AppointmentsView {
            user_id: &session.user_id,
            profile_name: profile.as_ref().map(|p| p.name.as_str()),
            filters: &filters,
            appointments: &shown,
            total: all.len(),
            notice: notice.notice(),
        },
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Form(credentials): Form<StaffCredentials>,
) -> Response {
    let entered = credentials.user_id.trim().to_string();
    match check_credentials(&state, credentials).await {
        LoginCheck::Accepted(user_id) => {
            let session = state.sessions.create(&user_id, SessionKind::Staff).await;
            record_login("staff", "success");
            redirect("/staff", Some(state.sessions.cookie(&session)))
        }
        LoginCheck::Refused(message) => {
            tracing::info!(user_id = %entered, "staff sign-in refused");
            record_login("staff", "failure");
            html_response(
                StatusCode::UNAUTHORIZED,
                staff::login(&state.config, &entered, Some(message)),
                Caching::NoStore,
            )
        }
    }
}

/// End the session and drop its cached queries.
pub async fn end_session(state: &AppState, session: Option<Session>) {
    if let Some(session) = session {
        state.queries.invalidate_session(&session.id).await;
        state.sessions.remove(&session.id).await;
    }
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    end_session(&state, session).await;
    redirect("/staff", Some(clear_cookie()))
}

/// Status change posted from a table row, with the table's filters.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    status: String,
    #[serde(default)]
    range: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    q: String,
}

impl StatusForm {
    fn filters(&self) -> AppointmentFilters {
        AppointmentFilters {
            range: self.range.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            q: self.q.clone(),
        }
    }
}

/// `POST /staff/appointments/{index}/status`.
///
/// The cached list shows the new status before the backend is asked. If the
/// backend refuses, the cached list goes back to exactly what it was.
pub async fn update_status(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(index): Path<u64>,
    Form(form): Form<StatusForm>,
) -> Result<Response, PortalError> {
    let Some(session) = session else {
        return Ok(redirect("/staff", None));
    };
    let filters = form.filters();

    let status = match form.status.parse::<AppointmentStatus>() {
        Ok(status) => status,
        Err(err) => {
            tracing::debug!(error = %err, "status form rejected");
            record_status_update("invalid");
            return Ok(redirect(&filters.url(Some(Notice::StatusInvalid)), None));
        }
    };

    let mut list = load_appointments(&state, &session).await?;
    if !list.iter().any(|a| a.index == index) {
        return Err(PortalError::NotFound(format!("appointment #{index}")));
    }

    let key = QueryCache::key(&session.id, queries::APPOINTMENTS);
    let cache = &state.queries;
    let backend = &state.backend;
    let principal = &session.principal;
    let cache_key = key.as_str();

    let outcome = apply_optimistic(
        &mut list,
        |list| {
            set_status(list, index, status);
        },
        move |shown: &Vec<Appointment>| {
            let shown = shown.clone();
            async move {
                cache.put(cache_key, &shown).await;
                backend
                    .update_appointment_status(principal, index, status)
                    .await
            }
        },
    )
    .await;

    match outcome {
        Outcome::Committed => {
            // Refetch on next read so other changes show up too.
            state.queries.invalidate(&key).await;
            tracing::info!(
                user_id = %session.user_id,
                index,
                status = status.as_str(),
                "appointment status updated"
            );
            record_status_update("committed");
            Ok(redirect(&filters.url(Some(Notice::StatusUpdated)), None))
        }
        Outcome::RolledBack(err) => {
            state.queries.put(&key, &list).await;
            tracing::warn!(
                user_id = %session.user_id,
                index,
                status = status.as_str(),
                error = %err,
                "appointment status update rolled back"
            );
            record_status_update("rolled_back");
            Ok(redirect(&filters.url(Some(Notice::StatusFailed)), None))
        }
    }
}
