//! Admin portal handlers.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clinic_core::metrics::record_login;
use clinic_core::{StaffCredentials, UserProfile};
use serde::Deserialize;

use super::staff::{LoginCheck, NoticeQuery, check_credentials, end_session};
use super::{Caching, html_response, portal_page, redirect};
use crate::error::PortalError;
use crate::render::admin;
use crate::render::components::Notice;
use crate::session::{CurrentSession, Session, SessionKind, clear_cookie};
use crate::state::AppState;

/// Let the request through only for a signed-in administrator.
///
/// Otherwise returns the response to send instead: the sign-in page for a
/// missing session, Access Denied for any other role.
pub(super) async fn require_admin(
    state: &AppState,
    session: Option<Session>,
) -> Result<Session, Response> {
    let Some(session) = session else {
        return Err(redirect("/admin-login", None));
    };

    match state.backend.is_caller_admin(&session.principal).await {
        Ok(true) => Ok(session),
        Ok(false) => Err(denied(state, &session)),
        Err(err) if err.is_authorization() => Err(denied(state, &session)),
        Err(err) => {
            tracing::error!(error = %err, "admin check failed");
            Err(PortalError::from(err).into_response())
        }
    }
}

fn denied(state: &AppState, session: &Session) -> Response {
    tracing::warn!(user_id = %session.user_id, "admin area refused");
    html_response(
        StatusCode::FORBIDDEN,
        admin::access_denied(&state.config, &session.user_id),
        Caching::NoStore,
    )
}

/// A staff portal session still gets the form, so the user can sign in
/// with an administrator account instead.
pub async fn login_page(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    if session.is_some_and(|s| s.kind == SessionKind::Admin) {
        return redirect("/admin-dashboard", None);
    }
    portal_page(admin::login(&state.config, "", None))
}

pub async fn login(
    State(state): State<AppState>,
    Form(credentials): Form<StaffCredentials>,
) -> Response {
    let entered = credentials.user_id.trim().to_string();
    let user_id = match check_credentials(&state, credentials).await {
        LoginCheck::Accepted(user_id) => user_id,
        LoginCheck::Refused(message) => {
            tracing::info!(user_id = %entered, "admin sign-in refused");
            record_login("admin", "failure");
            return html_response(
                StatusCode::UNAUTHORIZED,
                admin::login(&state.config, &entered, Some(message)),
                Caching::NoStore,
            );
        }
    };

    let session = state.sessions.create(&user_id, SessionKind::Admin).await;
    // The dashboard makes the real role decision; this only labels the metric.
    let outcome = match state.backend.is_caller_admin(&session.principal).await {
        Ok(true) => "success",
        _ => "denied",
    };
    record_login("admin", outcome);
    redirect("/admin-dashboard", Some(state.sessions.cookie(&session)))
}

async fn profile_name(state: &AppState, session: &Session) -> Option<String> {
    match state
        .backend
        .get_caller_user_profile(&session.principal)
        .await
    {
        Ok(profile) => profile.map(|p| p.name),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load admin profile");
            None
        }
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(notice): Query<NoticeQuery>,
) -> Response {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let name = profile_name(&state, &session).await;
    portal_page(admin::dashboard(
        &state.config,
        &session.user_id,
        name.as_deref(),
        notice.notice(),
        None,
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    end_session(&state, session).await;
    redirect("/admin-login", Some(clear_cookie()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    name: String,
}

/// `POST /profile`: first-run profile setup from the dashboard.
pub async fn save_profile(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<ProfileForm>,
) -> Response {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let name = form.name.trim();
    let error = if name.is_empty() {
        "Please enter your name"
    } else {
        let profile = UserProfile {
            name: name.to_string(),
        };
        match state
            .backend
            .save_caller_user_profile(&session.principal, profile)
            .await
        {
            Ok(()) => {
                tracing::info!(user_id = %session.user_id, "profile saved");
                return redirect(
                    &format!("/admin-dashboard?notice={}", Notice::ProfileSaved.code()),
                    None,
                );
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save profile");
                "Failed to save your profile. Please try again."
            }
        }
    };

    html_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        admin::dashboard(&state.config, &session.user_id, None, None, Some(error)),
        Caching::NoStore,
    )
}
