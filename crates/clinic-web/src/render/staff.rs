//! Staff portal pages: sign-in form and the appointments table.

use clinic_core::{Appointment, AppointmentStatus, DateFilter};
use maud::{Markup, html};
use serde::Deserialize;

use super::components::{
    Notice, count_label, error_banner, format_date, format_submission_time, link_with_query,
    notice_banner, status_badge,
};
use super::{Nav, page};
use crate::config::Config;

/// Filter and search state of the appointments table, as query parameters.
///
/// The same fields travel as hidden inputs on each status form so the table
/// comes back filtered the same way after an update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilters {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub q: String,
}

impl AppointmentFilters {
    pub fn date_filter(&self) -> DateFilter {
        DateFilter::from_params(
            Some(self.range.as_str()).filter(|r| !r.is_empty()),
            Some(self.from.as_str()),
            Some(self.to.as_str()),
        )
    }

    pub fn query(&self) -> &str {
        self.q.trim()
    }

    fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("range", self.range.as_str()),
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("q", self.q.as_str()),
        ]
    }

    /// `/staff` with these filters and an optional notice.
    pub fn url(&self, notice: Option<Notice>) -> String {
        let mut pairs = self.pairs().to_vec();
        if let Some(notice) = notice {
            pairs.push(("notice", notice.code()));
        }
        link_with_query("/staff", &pairs)
    }

    /// Link for a preset date range, keeping the search text. An empty
    /// `range` clears the date filter.
    fn preset_url(&self, range: &str) -> String {
        link_with_query("/staff", &[("range", range), ("q", self.q.as_str())])
    }

    fn hidden_inputs(&self) -> Markup {
        html! {
            @for (name, value) in self.pairs() {
                @if !value.is_empty() {
                    input type="hidden" name=(name) value=(value);
                }
            }
        }
    }
}

/// Sign-in form for the staff portal.
pub fn login(config: &Config, user_id: &str, error: Option<&str>) -> Markup {
    let body = html! {
        div class="card narrow" {
            h1 { (config.clinic_name) }
            p class="muted" { "Staff Portal" }
            (error_banner(error))
            (login_form("/staff/login", user_id))
        }
    };
    page(config, "Staff Login", Nav::Public, body)
}

/// Credential fields shared by the staff and admin sign-in pages.
pub fn login_form(action: &str, user_id: &str) -> Markup {
    html! {
        form method="post" action=(action) {
            div class="field" {
                label for="userId" { "User ID" }
                input id="userId" name="userId" type="text" autocomplete="username"
                    placeholder="Enter your user ID" value=(user_id) required;
            }
            div class="field" {
                label for="password" { "Password" }
                input id="password" name="password" type="password"
                    autocomplete="current-password" placeholder="Enter your password" required;
            }
            button class="btn" type="submit" { "Sign In" }
        }
    }
}

/// Everything the appointments table needs.
pub struct AppointmentsView<'a> {
    pub user_id: &'a str,
    pub profile_name: Option<&'a str>,
    pub filters: &'a AppointmentFilters,
    /// Appointments after date filter and search.
    pub appointments: &'a [Appointment],
    /// Number of appointments before filtering.
    pub total: usize,
    pub notice: Option<Notice>,
}

pub fn appointments(config: &Config, view: &AppointmentsView<'_>) -> Markup {
    let filter = view.filters.date_filter();

    let body = html! {
        h1 { "Appointment Requests" }
        p class="muted" {
            @match view.profile_name {
                Some(name) => { "Welcome, " (name) }
                None => { (config.clinic_name) " Staff Portal" }
            }
        }

        (notice_banner(view.notice))
        (filter_bar(view.filters, &filter))

        p class="count" { (count_label(view.appointments.len(), "Request", "Requests")) }

        @if view.appointments.is_empty() {
            div class="card" {
                // With a non-empty list, only the filters can empty the table.
                @if view.total == 0 {
                    h2 { "No appointments found" }
                    p class="muted" { "New appointment requests will appear here." }
                } @else {
                    h2 { "No matching appointments" }
                    p class="muted" { "Try a different date range or search term." }
                    a href="/staff" { "Clear Filters" }
                }
            }
        } @else {
            div class="card" {
                table {
                    thead {
                        tr {
                            th { "Parent/Guardian" }
                            th { "Child" }
                            th { "Contact" }
                            th { "Preferred Date/Time" }
                            th { "Reason" }
                            th { "Submitted" }
                            th { "Status" }
                        }
                    }
                    tbody {
                        @for appointment in view.appointments {
                            (appointment_row(config, appointment, view.filters))
                        }
                    }
                }
            }
        }
    };
    page(config, "Appointments", Nav::Staff(view.user_id), body)
}

fn filter_bar(filters: &AppointmentFilters, current: &DateFilter) -> Markup {
    let presets = [
        ("all", "All Dates"),
        ("today", "Today"),
        ("week", "This Week"),
        ("month", "This Month"),
    ];
    html! {
        div class="filters" {
            @for (key, label) in presets {
                a class=(preset_class(current.key() == key)) href=(filters.preset_url(key)) {
                    (label)
                }
            }
        }
        form class="filters" method="get" action="/staff" {
            input type="hidden" name="range" value="custom";
            input type="hidden" name="q" value=(filters.q);
            div {
                label for="from" { "From" }
                input id="from" name="from" type="date" value=(filters.from);
            }
            div {
                label for="to" { "To" }
                input id="to" name="to" type="date" value=(filters.to);
            }
            button class=(preset_class(current.key() == "custom")) type="submit" {
                "Custom Range"
            }
            @if current.is_active() {
                a class="btn small outline" href=(filters.preset_url("")) { "Clear Filters" }
            }
        }
        form class="filters" method="get" action="/staff" {
            @for (name, value) in &filters.pairs()[..3] {
                @if !value.is_empty() {
                    input type="hidden" name=(name) value=(value);
                }
            }
            input type="search" name="q" value=(filters.q) style="flex:1;width:auto"
                placeholder="Search by patient name, child name, or phone number";
            button class="btn small" type="submit" { "Search" }
        }
    }
}

fn preset_class(active: bool) -> &'static str {
    if active {
        "btn small outline preset active"
    } else {
        "btn small outline preset"
    }
}

fn appointment_row(
    config: &Config,
    appointment: &Appointment,
    filters: &AppointmentFilters,
) -> Markup {
    let request = &appointment.request;
    let offset = config.utc_offset;
    html! {
        tr {
            td { (request.parent_name) }
            td {
                (request.child_name)
                br;
                span class="muted small" { "Age: " (request.child_age) }
            }
            td {
                a href={ "tel:" (request.phone_number) } { (request.phone_number) }
                @if let Some(email) = &request.email {
                    br;
                    span class="muted small" { (email) }
                }
            }
            td {
                (format_date(request.preferred_date, offset))
                br;
                span class="muted small" { (request.preferred_time) }
            }
            td {
                @if request.reason.is_empty() {
                    span class="muted small" { "No reason provided" }
                } @else {
                    (request.reason)
                }
            }
            td class="small" { (format_submission_time(request.submission_time, offset)) }
            td {
                (status_badge(request.status))
                form class="status-form" method="post"
                    action={ "/staff/appointments/" (appointment.index) "/status" } {
                    (filters.hidden_inputs())
                    select name="status" aria-label="Appointment status" {
                        @for status in AppointmentStatus::ALL {
                            option value=(status.as_str()) selected[status == request.status] {
                                (status.label())
                            }
                        }
                    }
                    button class="btn small" type="submit" { "Update" }
                }
            }
        }
    }
}

/// Shown when the backend refuses to list appointments for this account.
pub fn access_denied(config: &Config, user_id: &str) -> Markup {
    let body = html! {
        div class="card narrow danger" {
            h1 { "Access Denied" }
            p class="muted" {
                "Your account does not have permission to view appointments. "
                "Please contact the clinic administrator."
            }
        }
    };
    page(config, "Access Denied", Nav::Staff(user_id), body)
}

/// Shown when the appointment list could not be loaded after retrying.
pub fn load_failed(config: &Config, user_id: &str, filters: &AppointmentFilters) -> Markup {
    let body = html! {
        div class="card narrow danger" {
            h1 { "Unable to load appointments" }
            p class="muted" { "The clinic service did not respond. Please try again in a moment." }
            div class="actions" {
                a class="btn" href=(filters.url(None)) { "Try Again" }
            }
        }
    };
    page(config, "Appointments", Nav::Staff(user_id), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{AppointmentRequest, Timestamp};

    fn appointment(index: u64, child: &str, reason: &str) -> Appointment {
        Appointment {
            index,
            request: AppointmentRequest {
                parent_name: "Asha".to_string(),
                child_name: child.to_string(),
                child_age: 4,
                phone_number: "9000000000".to_string(),
                email: Some("asha@example.com".to_string()),
                preferred_date: Timestamp(1_715_731_200_000_000_000),
                preferred_time: "07:15 PM".to_string(),
                reason: reason.to_string(),
                submission_time: Timestamp(1_715_700_000_000_000_000),
                status: AppointmentStatus::Confirmed,
            },
        }
    }

    fn render(filters: &AppointmentFilters, list: &[Appointment], total: usize) -> String {
        appointments(
            &Config::default(),
            &AppointmentsView {
                user_id: "nurse",
                profile_name: None,
                filters,
                appointments: list,
                total,
                notice: None,
            },
        )
        .into_string()
    }

    #[test]
    fn filters_parse_and_round_trip_to_url() {
        let filters = AppointmentFilters {
            range: "custom".to_string(),
            from: "2024-05-01".to_string(),
            to: "2024-05-31".to_string(),
            q: "ravi".to_string(),
        };
        assert_eq!(filters.date_filter().key(), "custom");
        assert_eq!(
            filters.url(Some(Notice::StatusUpdated)),
            "/staff?range=custom&from=2024-05-01&to=2024-05-31&q=ravi&notice=status-updated"
        );
        assert_eq!(AppointmentFilters::default().url(None), "/staff");
        assert_eq!(AppointmentFilters::default().date_filter(), DateFilter::All);
    }

    #[test]
    fn table_shows_rows_and_count() {
        let list = [appointment(0, "Ravi", ""), appointment(3, "Meena", "Fever")];
        let html = render(&AppointmentFilters::default(), &list, 2);
        assert!(html.contains("2 Requests"));
        assert!(html.contains("Ravi"));
        assert!(html.contains("No reason provided"));
        assert!(html.contains("action=\"/staff/appointments/3/status\""));
        assert!(html.contains("value=\"confirmed\" selected"));
        assert!(html.contains("asha@example.com"));
    }

    #[test]
    fn singular_count() {
        let html = render(&AppointmentFilters::default(), &[appointment(0, "Ravi", "")], 1);
        assert!(html.contains("1 Request<"));
    }

    #[test]
    fn empty_states_differ() {
        let html = render(&AppointmentFilters::default(), &[], 0);
        assert!(html.contains("No appointments found"));
        assert!(!html.contains("Clear Filters"));

        let filters = AppointmentFilters {
            q: "zzz".to_string(),
            ..AppointmentFilters::default()
        };
        let html = render(&filters, &[], 4);
        assert!(html.contains("No matching appointments"));
    }

    #[test]
    fn status_forms_carry_filters() {
        let filters = AppointmentFilters {
            range: "week".to_string(),
            q: "asha".to_string(),
            ..AppointmentFilters::default()
        };
        let html = render(&filters, &[appointment(0, "Ravi", "")], 1);
        assert!(html.contains("name=\"range\" value=\"week\""));
        assert!(html.contains("name=\"q\" value=\"asha\""));
        assert!(html.contains(
            "class=\"btn small outline preset active\" href=\"/staff?range=week&amp;q=asha\""
        ));
    }
}
