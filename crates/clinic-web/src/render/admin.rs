//! Admin portal pages.

use maud::{Markup, html};

use super::components::{Notice, error_banner, notice_banner};
use super::staff::login_form;
use super::{Nav, page};
use crate::config::Config;

pub fn login(config: &Config, user_id: &str, error: Option<&str>) -> Markup {
    let body = html! {
        div class="card narrow" {
            h1 { "Admin Portal" }
            p class="muted" { "Sign in with an administrator account." }
            (error_banner(error))
            (login_form("/admin-login", user_id))
        }
    };
    page(config, "Admin Login", Nav::Public, body)
}

/// Dashboard for a confirmed administrator.
///
/// Without a saved profile the page opens with the profile setup form.
pub fn dashboard(
    config: &Config,
    user_id: &str,
    profile_name: Option<&str>,
    notice: Option<Notice>,
    profile_error: Option<&str>,
) -> Markup {
    let body = html! {
        h1 { "Admin Dashboard" }
        p class="muted" { "Welcome back, " (profile_name.unwrap_or("Administrator")) }

        (notice_banner(notice))

        @if profile_name.is_none() {
            (profile_setup(config, profile_error))
        }

        div class="grid2" {
            section class="card" {
                h2 { "Staff Management" }
                p class="muted" {
                    "Add, edit, or remove staff accounts and manage access permissions"
                }
                div class="actions" {
                    a class="btn" href="/staff-management" { "Manage Staff" }
                }
            }
            section class="card" {
                h2 { "System Status" }
                p class="muted" { "Your admin account is active and secure" }
                table {
                    tbody {
                        tr { td { "Authentication" } td { strong { "Active" } } }
                        tr { td { "Role" } td { strong { "Administrator" } } }
                        tr { td { "Signed in as" } td { (user_id) } }
                    }
                }
            }
        }
    };
    page(config, "Admin Dashboard", Nav::Admin(user_id), body)
}

fn profile_setup(config: &Config, error: Option<&str>) -> Markup {
    html! {
        section class="card" {
            h2 { "Welcome to " (config.clinic_name) }
            p class="muted" { "Please tell us your name to finish setting up your account." }
            (error_banner(error))
            form method="post" action="/profile" {
                div class="field" {
                    label for="name" { "Your Name" }
                    input id="name" name="name" type="text" placeholder="Enter your full name" required;
                }
                button class="btn" type="submit" { "Continue" }
            }
        }
    }
}

/// Shown to signed-in users whose role is not administrator.
pub fn access_denied(config: &Config, user_id: &str) -> Markup {
    let body = html! {
        div class="card narrow danger" {
            h1 { "Access Denied" }
            p class="muted" { "You do not have administrator privileges to access this page." }
            div class="notice error" {
                strong { "Unauthorized Access" }
                p {
                    "This area is restricted to administrators only. Please contact your "
                    "system administrator if you believe you should have access."
                }
            }
            div class="actions" {
                form method="post" action="/admin/logout" {
                    button class="btn outline" type="submit" { "Log Out" }
                }
                a class="btn" href="/" { "Return Home" }
            }
        }
    };
    page(config, "Access Denied", Nav::Admin(user_id), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_prompts_for_profile_when_missing() {
        let html = dashboard(&Config::default(), "admin", None, None, None).into_string();
        assert!(html.contains("Welcome back, Administrator"));
        assert!(html.contains("action=\"/profile\""));

        let html =
            dashboard(&Config::default(), "admin", Some("Dr. K"), None, None).into_string();
        assert!(html.contains("Welcome back, Dr. K"));
        assert!(!html.contains("action=\"/profile\""));
        assert!(html.contains("href=\"/staff-management\""));
    }

    #[test]
    fn profile_error_is_shown() {
        let html = dashboard(
            &Config::default(),
            "admin",
            None,
            None,
            Some("Please enter your name"),
        )
        .into_string();
        assert!(html.contains("Please enter your name"));
    }

    #[test]
    fn access_denied_offers_logout() {
        let html = access_denied(&Config::default(), "nurse").into_string();
        assert!(html.contains("Access Denied"));
        assert!(html.contains("action=\"/admin/logout\""));
    }

    #[test]
    fn login_posts_to_admin_login() {
        let html = login(
            &Config::default(),
            "",
            Some("Invalid user ID or password. Please try again."),
        )
        .into_string();
        assert!(html.contains("action=\"/admin-login\""));
        assert!(html.contains("Invalid user ID or password"));
    }
}
