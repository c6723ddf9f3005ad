//! Shared HTML components used across portal pages.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages.

use chrono::FixedOffset;
use clinic_core::{ActivationStatus, AppointmentStatus, FieldErrors, Timestamp};
use maud::{Markup, html};
use reqwest::Url;

/// Inline CSS for every page.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#f7fbfd;--fg:#10242f;--fg2:#4b5f6b;--fg3:#8a9aa4;--accent:#0891b2;--accent-hover:#0e7490;--green:#16a34a;--danger:#dc2626;--surface:#fff;--border:rgba(8,145,178,.18)}
body{font-family:Inter,-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.6;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column}
main{flex:1;width:100%;max-width:1100px;margin:0 auto;padding:2rem 1rem}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}
h1{font-size:2rem;letter-spacing:-.02em;margin-bottom:.5rem}
h2{font-size:1.35rem;margin-bottom:.75rem}

.site-header{background:var(--surface);border-bottom:1px solid var(--border)}
.site-header nav{max-width:1100px;margin:0 auto;padding:.85rem 1rem;display:flex;align-items:center;gap:1.25rem;flex-wrap:wrap}
.brand{font-weight:800;font-size:1.15rem;color:var(--fg);margin-right:auto}
.site-footer{background:var(--surface);border-top:1px solid var(--border);padding:1.5rem 1rem;text-align:center;font-size:.85rem;color:var(--fg3)}
.site-footer p{margin:.2rem 0}

.card{background:var(--surface);padding:1.5rem;border:1px solid var(--border);border-radius:10px;margin-bottom:1.25rem}
.card.narrow{max-width:460px;margin:0 auto 1.25rem}
.card.danger{border-color:var(--danger)}
.muted{color:var(--fg2)}
.small{font-size:.85rem}

.btn{display:inline-block;padding:.55rem 1.1rem;background:var(--accent);color:#fff;border:none;border-radius:6px;font-size:.95rem;font-weight:500;cursor:pointer;text-decoration:none}
.btn:hover{background:var(--accent-hover);text-decoration:none}
.btn.outline{background:transparent;color:var(--accent);border:1px solid var(--accent)}
.btn.danger{background:var(--danger)}
.btn.small{padding:.3rem .7rem;font-size:.85rem}
.actions{display:flex;gap:.5rem;flex-wrap:wrap;margin-top:1rem}

form .field{margin-bottom:1rem}
label{display:block;font-weight:600;font-size:.9rem;margin-bottom:.3rem}
.req{color:var(--danger)}
input,select,textarea{width:100%;padding:.5rem .65rem;border:1px solid var(--border);border-radius:6px;font:inherit;background:#fff}
input.invalid,select.invalid{border-color:var(--danger)}
.field-error{color:var(--danger);font-size:.85rem;margin-top:.25rem}
.grid2{display:grid;grid-template-columns:1fr 1fr;gap:1rem}
@media(max-width:640px){.grid2{grid-template-columns:1fr}}

.slots{display:grid;grid-template-columns:repeat(3,1fr);gap:.5rem}
.slots label{font-weight:400;border:1px solid var(--border);border-radius:6px;padding:.4rem;text-align:center;cursor:pointer}
.slots input{width:auto;margin-right:.3rem}

.notice{padding:.75rem 1rem;border-radius:8px;margin-bottom:1rem;font-size:.95rem}
.notice.success{background:#dcfce7;color:#166534}
.notice.error{background:#fee2e2;color:#991b1b}

table{width:100%;border-collapse:collapse;font-size:.92rem}
th,td{padding:.55rem .6rem;border-bottom:1px solid var(--border);text-align:left;vertical-align:top}
th{font-size:.8rem;text-transform:uppercase;letter-spacing:.04em;color:var(--fg3)}
.count{font-weight:600;color:var(--fg2)}

.filters{display:flex;gap:.5rem;flex-wrap:wrap;align-items:flex-end;margin-bottom:1rem}
.filters input{width:auto}
.preset.active{background:var(--accent);color:#fff}

.badge{display:inline-block;padding:.1rem .55rem;border-radius:100px;font-size:.78rem;font-weight:600;border:1px solid transparent}
.badge.pending{background:#fef9c3;color:#a16207;border-color:#fde68a}
.badge.confirmed{background:#dbeafe;color:#1d4ed8;border-color:#bfdbfe}
.badge.completed{background:#dcfce7;color:#15803d;border-color:#bbf7d0}
.badge.cancelled{background:#f3f4f6;color:#374151;border-color:#e5e7eb}
.badge.activated{background:#dcfce7;color:#15803d}
.badge.deactivated{background:#f3f4f6;color:#6b7280}

.status-form{display:flex;gap:.35rem;margin-top:.35rem}
.status-form select{width:auto;padding:.25rem .4rem;font-size:.85rem}

.hero{text-align:center;padding:2.5rem 1rem}
.hero h1{font-size:2.6rem}
.services{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:.75rem;list-style:none}
.services li{background:var(--surface);border:1px solid var(--border);border-radius:8px;padding:.75rem;text-align:center}
"#;

/// Content-Security-Policy header value.
///
/// Pages are plain HTML forms: no scripts, same-origin form posts only.
pub const CSP_HEADER: &str = "default-src 'none'; style-src 'unsafe-inline'; img-src 'self' data:; form-action 'self'; frame-ancestors 'none'";

/// Flash message carried across a redirect in the `notice` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    StatusUpdated,
    StatusFailed,
    StatusInvalid,
    StaffCreated,
    StaffUpdated,
    StaffDeleted,
    ProfileSaved,
}

impl Notice {
    pub fn code(self) -> &'static str {
        match self {
            Self::StatusUpdated => "status-updated",
            Self::StatusFailed => "status-failed",
            Self::StatusInvalid => "status-invalid",
            Self::StaffCreated => "staff-created",
            Self::StaffUpdated => "staff-updated",
            Self::StaffDeleted => "staff-deleted",
            Self::ProfileSaved => "profile-saved",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [
            Self::StatusUpdated,
            Self::StatusFailed,
            Self::StatusInvalid,
            Self::StaffCreated,
            Self::StaffUpdated,
            Self::StaffDeleted,
            Self::ProfileSaved,
        ]
        .into_iter()
        .find(|notice| notice.code() == code)
    }

    fn is_error(self) -> bool {
        matches!(self, Self::StatusFailed | Self::StatusInvalid)
    }

    fn message(self) -> &'static str {
        match self {
            Self::StatusUpdated => "Appointment status updated.",
            Self::StatusFailed => {
                "Failed to update appointment status. The previous status has been restored."
            }
            Self::StatusInvalid => "Unknown appointment status.",
            Self::StaffCreated => "Staff account created successfully",
            Self::StaffUpdated => "Staff account updated successfully",
            Self::StaffDeleted => "Staff account deleted successfully",
            Self::ProfileSaved => "Profile saved.",
        }
    }
}

/// Banner for a flash notice.
pub fn notice_banner(notice: Option<Notice>) -> Markup {
    html! {
        @if let Some(notice) = notice {
            div class={ "notice " (if notice.is_error() { "error" } else { "success" }) } {
                (notice.message())
            }
        }
    }
}

/// Error banner with a free-form message.
pub fn error_banner(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            div class="notice error" { (message) }
        }
    }
}

/// Validation message under a form field, if any.
pub fn field_error(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(field) {
            p class="field-error" { (message) }
        }
    }
}

/// `class` attribute value for an input that may be invalid.
pub fn input_class(errors: &FieldErrors, field: &str) -> &'static str {
    if errors.get(field).is_some() {
        "invalid"
    } else {
        ""
    }
}

pub fn status_badge(status: AppointmentStatus) -> Markup {
    html! {
        span class={ "badge " (status.as_str()) } { (status.label()) }
    }
}

pub fn activation_badge(status: ActivationStatus) -> Markup {
    html! {
        span class={ "badge " (status.as_str()) } { (status.label()) }
    }
}

/// Required-field marker.
pub fn required() -> Markup {
    html! { " " span class="req" { "*" } }
}

/// Format a preferred date as "May 15, 2024" in the clinic's local time.
pub fn format_date(ts: Timestamp, offset: FixedOffset) -> String {
    ts.to_datetime()
        .with_timezone(&offset)
        .format("%B %-d, %Y")
        .to_string()
}

/// Format a submission time as "May 15, 2024, 07:30 PM".
pub fn format_submission_time(ts: Timestamp, offset: FixedOffset) -> String {
    ts.to_datetime()
        .with_timezone(&offset)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// `path` followed by the non-empty `pairs` as an encoded query string.
pub fn link_with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return path.to_string();
    };
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().filter(|(_, value)| !value.is_empty()));
    match url.query() {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

/// "1 Request" / "3 Requests".
pub fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
