//! Route definitions for the portal.
//!
//! ## Routes
//!
//! - `GET /` - Landing page
//! - `GET|POST /book` - Appointment booking form
//! - `GET /confirmation` - Booking received
//! - `GET /staff` - Staff sign-in or the appointments table
//! - `POST /staff/login`, `POST /staff/logout`
//! - `POST /staff/appointments/{index}/status` - Optimistic status change
//! - `GET|POST /admin-login`, `GET /admin-dashboard`, `POST /admin/logout`
//! - `POST /profile` - Save the caller's display name
//! - `/staff-management/...` - Staff account administration
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions

mod admin;
mod health;
mod public;
mod staff;
mod staff_management;

use axum::Router;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use maud::Markup;

use crate::error::PortalError;
use crate::render::components::CSP_HEADER;
use crate::state::AppState;

pub use health::HealthResponse;

/// Build the complete portal router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::landing))
        .route("/book", get(public::booking_form).post(public::submit_booking))
        .route("/confirmation", get(public::confirmation))
        .route("/staff", get(staff::appointments_page))
        .route("/staff/login", post(staff::login))
        .route("/staff/logout", post(staff::logout))
        .route(
            "/staff/appointments/{index}/status",
            post(staff::update_status),
        )
        .route("/admin-login", get(admin::login_page).post(admin::login))
        .route("/admin-dashboard", get(admin::dashboard))
        .route("/admin/logout", post(admin::logout))
        .route("/profile", post(admin::save_profile))
        .route(
            "/staff-management",
            get(staff_management::list).post(staff_management::create),
        )
        .route("/staff-management/new", get(staff_management::new_form))
        .route("/staff-management/{user_id}", post(staff_management::update))
        .route(
            "/staff-management/{user_id}/edit",
            get(staff_management::edit_form),
        )
        .route(
            "/staff-management/{user_id}/delete",
            get(staff_management::delete_form).post(staff_management::delete),
        )
        .route("/health", get(health::health_check))
        .route("/robots.txt", get(robots_txt))
        .fallback(not_found)
        .with_state(state)
}

/// Who may cache a page.
#[derive(Debug, Clone, Copy)]
enum Caching {
    /// Static public content.
    Public,
    /// Anything with per-user data or a form.
    NoStore,
}

/// Build an HTML response with security and cache headers.
fn html_response(status: StatusCode, markup: Markup, caching: Caching) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    // Security headers
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    let cache_control = match caching {
        Caching::Public => "public, max-age=300",
        Caching::NoStore => "no-store",
    };
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));

    (status, headers, markup.into_string()).into_response()
}

/// A private page with status 200.
fn portal_page(markup: Markup) -> Response {
    html_response(StatusCode::OK, markup, Caching::NoStore)
}

/// 303 redirect, optionally setting a cookie.
fn redirect(location: &str, cookie: Option<String>) -> Response {
    let mut response = Redirect::to(location).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "session cookie is not a valid header"),
        }
    }
    response
}

async fn not_found() -> PortalError {
    PortalError::NotFound("that page".to_string())
}

/// Keep crawlers on the public pages.
async fn robots_txt() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\nDisallow: /staff\nDisallow: /admin-login\nDisallow: /admin-dashboard\nDisallow: /staff-management\n",
    )
}
