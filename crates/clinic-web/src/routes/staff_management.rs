//! Staff account administration.
//!
//! Every handler first passes the admin guard. The account list is cached
//! per session and dropped after each successful change.

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use clinic_core::metrics::record_staff_change;
use clinic_core::{BackendError, StaffUser, filter_staff};
use serde::Deserialize;

use super::admin::require_admin;
use super::{Caching, html_response, portal_page, redirect};
use crate::cache::{QueryCache, queries};
use crate::error::{PortalError, PortalResult};
use crate::render::components::{Notice, link_with_query};
use crate::render::staff_management::{self as render, StaffForm, StaffListView};
use crate::session::{CurrentSession, Session};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StaffQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    notice: String,
}

async fn load_staff(state: &AppState, session: &Session) -> Result<Vec<StaffUser>, BackendError> {
    let key = QueryCache::key(&session.id, queries::STAFF);
    let backend = &state.backend;
    let principal = &session.principal;
    state
        .queries
        .get_or_compute(&key, move || backend.get_all_active_staff_users(principal))
        .await
}

async fn find_staff(
    state: &AppState,
    session: &Session,
    user_id: &str,
) -> PortalResult<StaffUser> {
    load_staff(state, session)
        .await?
        .into_iter()
        .find(|staff| staff.user_id == user_id)
        .ok_or_else(|| PortalError::NotFound(format!("staff account {user_id}")))
}

async fn changed(
    state: &AppState,
    session: &Session,
    action: &'static str,
    notice: Notice,
) -> Response {
    state
        .queries
        .invalidate(&QueryCache::key(&session.id, queries::STAFF))
        .await;
    record_staff_change(action);
    redirect(
        &link_with_query("/staff-management", &[("notice", notice.code())]),
        None,
    )
}

/// Status for a page re-rendered after the backend refused a change.
fn failure_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<StaffQuery>,
) -> Response {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let (shown, error, status) = match load_staff(&state, &session).await {
        Ok(all) => (filter_staff(&all, &query.q), None, StatusCode::OK),
        Err(err) => {
            tracing::error!(error = %err, "failed to load staff accounts");
            (
                Vec::new(),
                Some(format!("Failed to load staff accounts: {}", err.detail())),
                failure_status(&err),
            )
        }
    };

    html_response(
        status,
        render::list(
            &state.config,
            &StaffListView {
                admin_id: &session.user_id,
                staff: &shown,
                query: &query.q,
                notice: Notice::from_code(&query.notice),
                error: error.as_deref(),
            },
        ),
        Caching::NoStore,
    )
}

pub async fn new_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    portal_page(render::form(
        &state.config,
        &session.user_id,
        None,
        &StaffForm::default(),
        None,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<StaffForm>,
) -> Response {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let config = &state.config;

    let staff = match form.to_new_staff() {
        Ok(staff) => staff,
        Err(message) => {
            let markup = render::form(config, &session.user_id, None, &form, Some(message));
            return html_response(StatusCode::UNPROCESSABLE_ENTITY, markup, Caching::NoStore);
        }
    };

    let user_id = staff.user_id.clone();
    match state
        .backend
        .create_staff_user(&session.principal, staff)
        .await
    {
        Ok(()) => {
            tracing::info!(admin = %session.user_id, user_id = %user_id, "staff account created");
            changed(&state, &session, "create", Notice::StaffCreated).await
        }
        Err(err) => {
            tracing::warn!(user_id = %user_id, error = %err, "staff account not created");
            let message = format!("Failed to create staff account: {}", err.detail());
            let markup = render::form(config, &session.user_id, None, &form, Some(&message));
            html_response(failure_status(&err), markup, Caching::NoStore)
        }
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
) -> PortalResult<Response> {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let existing = find_staff(&state, &session, &user_id).await?;
    Ok(portal_page(render::form(
        &state.config,
        &session.user_id,
        Some(&existing.user_id),
        &StaffForm::from_staff(&existing),
        None,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
    Form(form): Form<StaffForm>,
) -> PortalResult<Response> {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let config = &state.config;
    let existing = find_staff(&state, &session, &user_id).await?;

    // The user id field is disabled in the browser; show the stored one.
    let shown = StaffForm {
        user_id: existing.user_id.clone(),
        ..form.clone()
    };

    let updated = match form.apply_to(&existing) {
        Ok(updated) => updated,
        Err(message) => {
            let markup =
                render::form(config, &session.user_id, Some(&user_id), &shown, Some(message));
            return Ok(html_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                markup,
                Caching::NoStore,
            ));
        }
    };

    match state
        .backend
        .update_staff_user(&session.principal, &user_id, updated)
        .await
    {
        Ok(()) => {
            tracing::info!(admin = %session.user_id, user_id = %user_id, "staff account updated");
            Ok(changed(&state, &session, "update", Notice::StaffUpdated).await)
        }
        Err(err) => {
            tracing::warn!(user_id = %user_id, error = %err, "staff account not updated");
            let message = format!("Failed to update staff account: {}", err.detail());
            let markup =
                render::form(config, &session.user_id, Some(&user_id), &shown, Some(&message));
            Ok(html_response(failure_status(&err), markup, Caching::NoStore))
        }
    }
}

pub async fn delete_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
) -> PortalResult<Response> {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let existing = find_staff(&state, &session, &user_id).await?;
    Ok(portal_page(render::delete_confirm(
        &state.config,
        &session.user_id,
        &existing.user_id,
        None,
    )))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
) -> Response {
    let session = match require_admin(&state, session).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state
        .backend
        .delete_staff_user(&session.principal, &user_id)
        .await
    {
        Ok(()) => {
            tracing::info!(admin = %session.user_id, user_id = %user_id, "staff account deleted");
            changed(&state, &session, "delete", Notice::StaffDeleted).await
        }
        Err(err) => {
            tracing::warn!(user_id = %user_id, error = %err, "staff account not deleted");
            let message = format!("Failed to delete staff account: {}", err.detail());
            html_response(
                failure_status(&err),
                render::delete_confirm(&state.config, &session.user_id, &user_id, Some(&message)),
                Caching::NoStore,
            )
        }
    }
}
