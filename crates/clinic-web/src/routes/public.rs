//! Public pages and the booking form handler.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use clinic_core::metrics::record_booking;
use clinic_core::{BookingForm, FieldErrors, Principal, Timestamp};

use super::{Caching, html_response, portal_page, redirect};
use crate::render::public;
use crate::state::AppState;

pub async fn landing(State(state): State<AppState>) -> Response {
    html_response(
        StatusCode::OK,
        public::landing(&state.config),
        Caching::Public,
    )
}

pub async fn booking_form(State(state): State<AppState>) -> Response {
    let config = &state.config;
    portal_page(public::booking(
        config,
        &BookingForm::default(),
        &FieldErrors::default(),
        None,
        config.today(),
    ))
}

/// Validate and submit a booking. Invalid input re-renders the form with
/// every problem marked; success redirects to the confirmation page.
pub async fn submit_booking(
    State(state): State<AppState>,
    Form(form): Form<BookingForm>,
) -> Response {
    let config = &state.config;
    let today = config.today();

    let request = match form.validate(today, config.utc_offset, Timestamp::now()) {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "booking form rejected");
            record_booking("invalid");
            let markup = public::booking(config, &form, &errors, None, today);
            return html_response(StatusCode::UNPROCESSABLE_ENTITY, markup, Caching::NoStore);
        }
    };

    let preferred_time = request.preferred_time.clone();
    match state
        .backend
        .create_appointment(&Principal::anonymous(), request)
        .await
    {
        Ok(()) => {
            tracing::info!(preferred_time = %preferred_time, "appointment request submitted");
            record_booking("accepted");
            redirect("/confirmation", None)
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to create appointment");
            record_booking("failed");
            let markup = public::booking(
                config,
                &form,
                &FieldErrors::default(),
                Some("Failed to submit appointment. Please try again."),
                today,
            );
            html_response(StatusCode::SERVICE_UNAVAILABLE, markup, Caching::NoStore)
        }
    }
}

pub async fn confirmation(State(state): State<AppState>) -> Response {
    html_response(
        StatusCode::OK,
        public::confirmation(&state.config),
        Caching::Public,
    )
}
