//! Public pages: landing, booking form, and booking confirmation.

use chrono::NaiveDate;
use clinic_core::{BookingForm, FieldErrors, OPENING_HOURS, SERVICES, TIME_SLOTS};
use maud::{Markup, html};

use super::components::{error_banner, field_error, input_class, required};
use super::{ADDRESS, Nav, page};
use crate::config::Config;

const FEATURES: [(&str, &str); 4] = [
    (
        "Easy Scheduling",
        "Book appointments at your convenience with our simple online system.",
    ),
    (
        "Flexible Timings",
        "Evening hours, Monday to Saturday, for your convenience.",
    ),
    (
        "Caring Environment",
        "A warm, child-friendly clinic dedicated to your little one's health.",
    ),
    (
        "Expert Care",
        "Professional pediatric care from a qualified specialist you can trust.",
    ),
];

pub fn landing(config: &Config) -> Markup {
    let body = html! {
        section class="hero" {
            h1 { (config.clinic_name) }
            p class="muted" { "Growing Healthy Futures" }
            p { strong { (config.doctor_name) } }
            p class="muted small" { "Consultant Paediatrician - New Born and Child Specialist" }
            div class="actions" style="justify-content:center" {
                a class="btn" href="/book" { "Book Appointment" }
                a class="btn outline" href="/staff" { "Staff Portal" }
            }
        }

        section class="card" {
            h2 { "Why Choose Us" }
            div class="grid2" {
                @for (title, description) in FEATURES {
                    div {
                        strong { (title) }
                        p class="muted small" { (description) }
                    }
                }
            }
        }

        section class="card" {
            h2 { "Our Services" }
            ul class="services" {
                @for service in SERVICES {
                    li { (service) }
                }
            }
        }

        section class="card" {
            h2 { "Contact Information" }
            p {
                "For appointment: "
                a href={ "tel:" (config.phone) } { (config.phone_display()) }
            }
            p { "Clinic timings: " (OPENING_HOURS) }
            p { (ADDRESS[0]) br; (ADDRESS[1]) }
        }

        section class="hero" {
            h2 { "Ready to Schedule Your Visit?" }
            p class="muted" {
                "Call us at "
                a href={ "tel:" (config.phone) } { (config.phone_display()) }
                " or book online now."
            }
            div class="actions" style="justify-content:center" {
                a class="btn" href="/book" { "Book Your Appointment Now" }
            }
        }
    };
    page(config, "Home", Nav::Public, body)
}

/// The booking form, echoing `form` back with any validation messages.
pub fn booking(
    config: &Config,
    form: &BookingForm,
    errors: &FieldErrors,
    submit_error: Option<&str>,
    today: NaiveDate,
) -> Markup {
    let min_date = today.format("%Y-%m-%d").to_string();
    let body = html! {
        h1 { "Book an Appointment" }
        p class="muted" {
            "Call "
            a href={ "tel:" (config.phone) } { (config.phone_display()) }
            " | " (OPENING_HOURS)
        }

        (error_banner(submit_error))

        form method="post" action="/book" novalidate {
            section class="card" {
                h2 { "Parent & Child Information" }
                p class="muted small" { "Please provide your contact details and your child's information." }
                div class="grid2" {
                    div class="field" {
                        label for="parentName" { "Parent/Guardian Name" (required()) }
                        input id="parentName" name="parentName" type="text"
                            class=(input_class(errors, "parentName"))
                            placeholder="Enter your name" value=(form.parent_name);
                        (field_error(errors, "parentName"))
                    }
                    div class="field" {
                        label for="phoneNumber" { "Phone Number" (required()) }
                        input id="phoneNumber" name="phoneNumber" type="tel"
                            class=(input_class(errors, "phoneNumber"))
                            placeholder="Enter your phone number" value=(form.phone_number);
                        (field_error(errors, "phoneNumber"))
                    }
                }
                div class="field" {
                    label for="email" { "Email (Optional)" }
                    input id="email" name="email" type="email"
                        placeholder="Enter your email address" value=(form.email);
                }
                div class="grid2" {
                    div class="field" {
                        label for="childName" { "Child Name" (required()) }
                        input id="childName" name="childName" type="text"
                            class=(input_class(errors, "childName"))
                            placeholder="Enter child's name" value=(form.child_name);
                        (field_error(errors, "childName"))
                    }
                    div class="field" {
                        label for="childAge" { "Child Age" (required()) }
                        input id="childAge" name="childAge" type="number" min="0"
                            class=(input_class(errors, "childAge"))
                            placeholder="Enter age in years" value=(form.child_age);
                        (field_error(errors, "childAge"))
                    }
                }
            }

            section class="card" {
                h2 { "Preferred Date & Time" }
                p class="muted small" { "The clinic is closed on Sundays." }
                div class="field" {
                    label for="preferredDate" { "Preferred Date" (required()) }
                    input id="preferredDate" name="preferredDate" type="date" min=(min_date)
                        class=(input_class(errors, "date")) value=(form.preferred_date);
                    (field_error(errors, "date"))
                }
                div class="field" {
                    label { "Preferred Time" (required()) }
                    div class="slots" {
                        @for slot in TIME_SLOTS {
                            label {
                                input type="radio" name="preferredTime" value=(slot)
                                    checked[form.preferred_time == slot];
                                (slot)
                            }
                        }
                    }
                    (field_error(errors, "time"))
                }
            }

            section class="card" {
                h2 { "Reason for Visit" }
                p class="muted small" { "Please describe the reason for your appointment (optional)." }
                div class="field" {
                    textarea name="reason" rows="4"
                        placeholder="E.g., Routine checkup, vaccination, fever, etc." { (form.reason) }
                }
            }

            button class="btn" type="submit" { "Submit Appointment Request" }
        }
    };
    page(config, "Book an Appointment", Nav::Public, body)
}

pub fn confirmation(config: &Config) -> Markup {
    let body = html! {
        div class="card narrow" {
            h1 { "Appointment Request Received!" }
            h2 { "What happens next?" }
            ul {
                li { "Our staff will review your appointment request shortly." }
                li { "Please keep your phone accessible for our confirmation call." }
            }
            p class="muted" style="margin-top:1rem" { "For urgent inquiries, call us at:" }
            p {
                a href={ "tel:" (config.phone) } { strong { (config.phone_display()) } }
            }
            p class="muted small" { (OPENING_HOURS) }
            div class="actions" {
                a class="btn" href="/" { "Back to Home" }
                a class="btn outline" href="/book" { "Book Another" }
            }
        }
    };
    page(config, "Appointment Requested", Nav::Public, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    #[test]
    fn landing_lists_services_and_phone() {
        let html = landing(&Config::default()).into_string();
        for service in SERVICES {
            assert!(html.contains(service), "missing {service}");
        }
        assert!(html.contains("93637 16343"));
        assert!(html.contains(OPENING_HOURS));
        assert!(html.contains("href=\"/book\""));
    }

    #[test]
    fn booking_form_offers_every_slot() {
        let html = booking(
            &Config::default(),
            &BookingForm::default(),
            &FieldErrors::default(),
            None,
            today(),
        )
        .into_string();
        for slot in TIME_SLOTS {
            assert!(html.contains(&format!("value=\"{slot}\"")));
        }
        assert!(html.contains("min=\"2024-05-15\""));
        assert!(!html.contains("class=\"field-error\""));
    }

    #[test]
    fn booking_form_echoes_input_and_errors() {
        let form = BookingForm {
            parent_name: "Asha <b>".to_string(),
            preferred_time: "07:30 PM".to_string(),
            ..BookingForm::default()
        };
        let mut errors = FieldErrors::default();
        errors.insert("childName", "Child name is required");
        let html = booking(
            &Config::default(),
            &form,
            &errors,
            Some("Failed to submit appointment. Please try again."),
            today(),
        )
        .into_string();

        assert!(html.contains("value=\"Asha &lt;b&gt;\""));
        assert!(html.contains("value=\"07:30 PM\" checked"));
        assert!(html.contains("Child name is required"));
        assert!(html.contains("Failed to submit appointment"));
    }

    #[test]
    fn confirmation_mentions_next_steps() {
        let html = confirmation(&Config::default()).into_string();
        assert!(html.contains("Appointment Request Received!"));
        assert!(html.contains("confirmation call"));
    }
}
