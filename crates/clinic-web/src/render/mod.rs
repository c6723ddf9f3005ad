//! HTML rendering for the public site and the portals.
//!
//! Pages are plain HTML forms with no client script: filters and search are
//! GET forms, mutations are POST forms followed by a redirect.
//!
//! All rendering uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation with automatic XSS protection (all dynamic values are escaped).

pub mod admin;
pub mod components;
pub mod public;
pub mod staff;
pub mod staff_management;

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::config::Config;
use components::PAGE_CSS;

/// Clinic address shown in the footer and on the landing page.
pub const ADDRESS: [&str; 2] = [
    "No.1, 1st street, Balaji Nagar,",
    "Anakaputhur, Chennai - 600 070",
];

/// Which signed-in user, if any, the header should offer to sign out.
#[derive(Debug, Clone, Copy)]
pub enum Nav<'a> {
    Public,
    Staff(&'a str),
    Admin(&'a str),
}

/// Wrap page content in the site header and footer.
pub fn page(config: &Config, title: &str, nav: Nav<'_>, body: Markup) -> Markup {
    let full_title = format!("{title} | {}", config.clinic_name);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (full_title) }
                meta name="description" content={ (config.clinic_name) ", paediatric care. Book an appointment online." };
                @if !matches!(nav, Nav::Public) {
                    meta name="robots" content="noindex";
                }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                (site_header(config, nav))
                main { (body) }
                (site_footer(config))
            }
        }
    }
}

fn site_header(config: &Config, nav: Nav<'_>) -> Markup {
    html! {
        header class="site-header" {
            nav {
                a class="brand" href="/" { (config.clinic_name) }
                a href="/" { "Home" }
                a href="/book" { "Book Appointment" }
                a href="/staff" { "Staff" }
                @match nav {
                    Nav::Public => {}
                    Nav::Staff(user_id) => {
                        span class="muted small" { "Signed in as " (user_id) }
                        form method="post" action="/staff/logout" {
                            button class="btn small outline" type="submit" { "Logout" }
                        }
                    }
                    Nav::Admin(user_id) => {
                        a href="/admin-dashboard" { "Dashboard" }
                        span class="muted small" { "Signed in as " (user_id) }
                        form method="post" action="/admin/logout" {
                            button class="btn small outline" type="submit" { "Logout" }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(config: &Config) -> Markup {
    html! {
        footer class="site-footer" {
            p { strong { (config.clinic_name) } }
            p { (config.doctor_name) " | Consultant Paediatrician" }
            p {
                a href={ "tel:" (config.phone) } { (config.phone_display()) }
                " | " (clinic_core::OPENING_HOURS)
            }
            p { (ADDRESS[0]) " " (ADDRESS[1]) }
            p { "\u{a9} " (chrono::Utc::now().format("%Y")) " " (config.clinic_name) ". All rights reserved." }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_has_title_and_chrome() {
        let config = Config::default();
        let html = page(&config, "Book an Appointment", Nav::Public, html! { p { "body" } })
            .into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Book an Appointment | Vijaya Children"));
        assert!(html.contains("href=\"tel:9363716343\""));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("noindex"));
        assert!(!html.contains("Logout"));
    }

    #[test]
    fn portal_pages_offer_logout() {
        let config = Config::default();
        let html = page(&config, "Appointments", Nav::Staff("nurse"), html! {}).into_string();
        assert!(html.contains("action=\"/staff/logout\""));
        assert!(html.contains("Signed in as nurse"));
        assert!(html.contains("noindex"));

        let html = page(&config, "Dashboard", Nav::Admin("admin"), html! {}).into_string();
        assert!(html.contains("action=\"/admin/logout\""));
    }
}
