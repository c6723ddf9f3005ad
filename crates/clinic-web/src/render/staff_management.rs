//! Staff account management pages for administrators.

use clinic_core::{ActivationStatus, StaffUser};
use maud::{Markup, html};
use serde::Deserialize;

use super::components::{
    Notice, activation_badge, count_label, error_banner, link_with_query, notice_banner, required,
};
use super::{Nav, page};
use crate::config::Config;

/// Add/edit form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaffForm {
    pub user_id: String,
    pub password: String,
    pub email: String,
    pub status: String,
}

impl StaffForm {
    /// Prefill the edit form. The password is never sent back to the browser.
    pub fn from_staff(staff: &StaffUser) -> Self {
        Self {
            user_id: staff.user_id.clone(),
            password: String::new(),
            email: staff.email.clone().unwrap_or_default(),
            status: staff.status.as_str().to_string(),
        }
    }

    fn email(&self) -> Option<String> {
        let email = self.email.trim();
        (!email.is_empty()).then(|| email.to_string())
    }

    /// A new, activated account.
    pub fn to_new_staff(&self) -> Result<StaffUser, &'static str> {
        let user_id = self.user_id.trim();
        let password = self.password.trim();
        if user_id.is_empty() || password.is_empty() {
            return Err("User ID and password are required");
        }
        Ok(StaffUser {
            user_id: user_id.to_string(),
            password: password.to_string(),
            email: self.email(),
            status: ActivationStatus::Activated,
        })
    }

    /// `existing` with this form's changes. A blank password keeps the
    /// current one.
    pub fn apply_to(&self, existing: &StaffUser) -> Result<StaffUser, &'static str> {
        let status = self
            .status
            .parse::<ActivationStatus>()
            .map_err(|_| "Please select a valid status")?;
        let password = match self.password.trim() {
            "" => existing.password.clone(),
            new => new.to_string(),
        };
        Ok(StaffUser {
            user_id: existing.user_id.clone(),
            password,
            email: self.email(),
            status,
        })
    }
}

/// Everything the staff table needs.
pub struct StaffListView<'a> {
    pub admin_id: &'a str,
    /// Accounts matching the search.
    pub staff: &'a [StaffUser],
    pub query: &'a str,
    pub notice: Option<Notice>,
    pub error: Option<&'a str>,
}

pub fn list(config: &Config, view: &StaffListView<'_>) -> Markup {
    let body = html! {
        p { a href="/admin-dashboard" { "\u{2190} Back to Dashboard" } }
        h1 { "Staff Management" }

        (notice_banner(view.notice))
        (error_banner(view.error))

        section class="card" {
            div class="filters" style="justify-content:space-between" {
                div {
                    h2 { "Staff Accounts" }
                    p class="count" {
                        (count_label(view.staff.len(), "account", "accounts")) " found"
                    }
                }
                a class="btn" href="/staff-management/new" { "Add Staff" }
            }

            form class="filters" method="get" action="/staff-management" {
                input type="search" name="q" value=(view.query) style="flex:1;width:auto"
                    placeholder="Search by user ID or email...";
                button class="btn small" type="submit" { "Search" }
            }

            @if view.staff.is_empty() {
                p class="muted" {
                    @if view.query.trim().is_empty() {
                        "No staff accounts yet"
                    } @else {
                        "No staff found matching your search"
                    }
                }
            } @else {
                table {
                    thead {
                        tr {
                            th { "User ID" }
                            th { "Email" }
                            th { "Status" }
                            th { "Actions" }
                        }
                    }
                    tbody {
                        @for staff in view.staff {
                            tr {
                                td { strong { (staff.user_id) } }
                                td {
                                    @match &staff.email {
                                        Some(email) => { (email) }
                                        None => { span class="muted small" { "No email" } }
                                    }
                                }
                                td { (activation_badge(staff.status)) }
                                td {
                                    a class="btn small outline" href=(staff_path(&staff.user_id, "edit")) { "Edit" }
                                    " "
                                    a class="btn small danger" href=(staff_path(&staff.user_id, "delete")) { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    page(config, "Staff Management", Nav::Admin(view.admin_id), body)
}

/// `/staff-management/{user_id}/{action}` with the id path-encoded.
pub fn staff_path(user_id: &str, action: &str) -> String {
    let base = link_with_query("/", &[("u", user_id)]);
    // Reuse form encoding, then turn `+` back into a path-safe `%20`.
    let encoded = base
        .strip_prefix("/?u=")
        .unwrap_or(user_id)
        .replace('+', "%20");
    if action.is_empty() {
        format!("/staff-management/{encoded}")
    } else {
        format!("/staff-management/{encoded}/{action}")
    }
}

/// Add form (`editing` is `None`) or edit form for an existing account.
pub fn form(
    config: &Config,
    admin_id: &str,
    editing: Option<&str>,
    form: &StaffForm,
    error: Option<&str>,
) -> Markup {
    let (title, action) = match editing {
        Some(user_id) => ("Edit Staff Account", staff_path(user_id, "")),
        None => ("Add Staff Account", "/staff-management".to_string()),
    };
    let body = html! {
        div class="card narrow" {
            h1 { (title) }
            (error_banner(error))
            form method="post" action=(action) {
                div class="field" {
                    label for="userId" { "User ID" @if editing.is_none() { (required()) } }
                    @if editing.is_some() {
                        input id="userId" type="text" value=(form.user_id) disabled;
                        p class="muted small" { "User ID cannot be changed" }
                    } @else {
                        input id="userId" name="userId" type="text" value=(form.user_id)
                            placeholder="Enter unique user ID" required;
                    }
                }
                div class="field" {
                    @if editing.is_some() {
                        label for="password" { "New Password (Optional)" }
                        input id="password" name="password" type="password"
                            autocomplete="new-password"
                            placeholder="Leave blank to keep current password";
                    } @else {
                        label for="password" { "Password" (required()) }
                        input id="password" name="password" type="password"
                            autocomplete="new-password" placeholder="Enter password" required;
                    }
                }
                div class="field" {
                    label for="email" { "Email (Optional)" }
                    input id="email" name="email" type="email" value=(form.email)
                        placeholder="staff@example.com";
                }
                @if editing.is_some() {
                    div class="field" {
                        label for="status" { "Status" }
                        select id="status" name="status" {
                            @for status in [ActivationStatus::Activated, ActivationStatus::Deactivated] {
                                option value=(status.as_str()) selected[form.status == status.as_str()] {
                                    (status.label())
                                }
                            }
                        }
                    }
                }
                div class="actions" {
                    button class="btn" type="submit" {
                        @if editing.is_some() { "Save Changes" } @else { "Create Account" }
                    }
                    a class="btn outline" href="/staff-management" { "Cancel" }
                }
            }
        }
    };
    page(config, title, Nav::Admin(admin_id), body)
}

pub fn delete_confirm(
    config: &Config,
    admin_id: &str,
    user_id: &str,
    error: Option<&str>,
) -> Markup {
    let body = html! {
        div class="card narrow danger" {
            h1 { "Delete Staff Account" }
            (error_banner(error))
            p {
                "Are you sure you want to delete the staff account for "
                strong { (user_id) }
                "? This action will revoke all access."
            }
            form class="actions" method="post" action=(staff_path(user_id, "delete")) {
                button class="btn danger" type="submit" { "Delete" }
                a class="btn outline" href="/staff-management" { "Cancel" }
            }
        }
    };
    page(config, "Delete Staff Account", Nav::Admin(admin_id), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(user_id: &str, email: Option<&str>, status: ActivationStatus) -> StaffUser {
        StaffUser {
            user_id: user_id.to_string(),
            password: "old".to_string(),
            email: email.map(str::to_string),
            status,
        }
    }

    #[test]
    fn new_staff_requires_id_and_password() {
        let form = StaffForm {
            user_id: "  nurse ".to_string(),
            password: " pw ".to_string(),
            email: " ".to_string(),
            ..StaffForm::default()
        };
        let created = form.to_new_staff().unwrap();
        assert_eq!(created.user_id, "nurse");
        assert_eq!(created.password, "pw");
        assert_eq!(created.email, None);
        assert_eq!(created.status, ActivationStatus::Activated);

        let missing = StaffForm {
            user_id: "nurse".to_string(),
            ..StaffForm::default()
        };
        assert_eq!(
            missing.to_new_staff().unwrap_err(),
            "User ID and password are required"
        );
    }

    #[test]
    fn edit_keeps_password_when_blank() {
        let existing = staff("nurse", None, ActivationStatus::Activated);
        let form = StaffForm {
            user_id: "ignored".to_string(),
            password: "   ".to_string(),
            email: "n@clinic.test".to_string(),
            status: "deactivated".to_string(),
        };
        let updated = form.apply_to(&existing).unwrap();
        assert_eq!(updated.user_id, "nurse");
        assert_eq!(updated.password, "old");
        assert_eq!(updated.email.as_deref(), Some("n@clinic.test"));
        assert_eq!(updated.status, ActivationStatus::Deactivated);

        let form = StaffForm {
            password: "new".to_string(),
            status: "activated".to_string(),
            ..StaffForm::default()
        };
        assert_eq!(form.apply_to(&existing).unwrap().password, "new");
    }

    #[test]
    fn edit_rejects_unknown_status() {
        let existing = staff("nurse", None, ActivationStatus::Activated);
        let form = StaffForm {
            status: "suspended".to_string(),
            ..StaffForm::default()
        };
        assert!(form.apply_to(&existing).is_err());
    }

    #[test]
    fn prefill_omits_password() {
        let form =
            StaffForm::from_staff(&staff("nurse", Some("n@x"), ActivationStatus::Deactivated));
        assert_eq!(form.password, "");
        assert_eq!(form.email, "n@x");
        assert_eq!(form.status, "deactivated");
    }

    #[test]
    fn staff_path_encodes_ids() {
        assert_eq!(staff_path("nurse", "edit"), "/staff-management/nurse/edit");
        assert_eq!(staff_path("a b/c", ""), "/staff-management/a%20b%2Fc");
    }

    #[test]
    fn list_shows_counts_and_empty_states() {
        let config = Config::default();
        let rows = [staff("nurse", None, ActivationStatus::Activated)];
        let html = list(
            &config,
            &StaffListView {
                admin_id: "admin",
                staff: &rows,
                query: "",
                notice: Some(Notice::StaffCreated),
                error: None,
            },
        )
        .into_string();
        assert!(html.contains("1 account found"));
        assert!(html.contains("No email"));
        assert!(html.contains("Staff account created successfully"));
        assert!(html.contains("href=\"/staff-management/nurse/edit\""));

        let html = list(
            &config,
            &StaffListView {
                admin_id: "admin",
                staff: &[],
                query: "zzz",
                notice: None,
                error: None,
            },
        )
        .into_string();
        assert!(html.contains("0 accounts found"));
        assert!(html.contains("No staff found matching your search"));
    }

    #[test]
    fn edit_form_locks_user_id() {
        let form_data = StaffForm::from_staff(&staff("nurse", None, ActivationStatus::Activated));
        let html = form(&Config::default(), "admin", Some("nurse"), &form_data, None).into_string();
        assert!(html.contains("User ID cannot be changed"));
        assert!(html.contains("action=\"/staff-management/nurse\""));
        assert!(html.contains("value=\"activated\" selected"));
        assert!(!html.contains("name=\"userId\""));
    }
}
