//! Appointment booking form and its validation rules.

use std::collections::BTreeMap;

use chrono::{Datelike, FixedOffset, NaiveDate, Weekday};
use serde::Deserialize;

use crate::filter::parse_date;
use crate::model::{AppointmentRequest, AppointmentStatus, Timestamp};

/// Evening time slots offered by the clinic (Mon to Sat, 7 PM to 9 PM).
pub const TIME_SLOTS: [&str; 9] = [
    "07:00 PM", "07:15 PM", "07:30 PM", "07:45 PM", "08:00 PM", "08:15 PM", "08:30 PM",
    "08:45 PM", "09:00 PM",
];

/// Raw booking form as posted by the browser.
///
/// Everything arrives as text so that invalid input can be echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingForm {
    pub parent_name: String,
    pub child_name: String,
    pub child_age: String,
    pub phone_number: String,
    pub email: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub reason: String,
}

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: &'static str) {
        self.0.insert(field, message);
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Whether the clinic accepts bookings for `date` given the current day.
///
/// Past days and Sundays are closed.
pub fn is_bookable(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today && date.weekday() != Weekday::Sun
}

impl BookingForm {
    /// Validate the form and build the request to send to the backend.
    ///
    /// All problems are reported together. `today` is the clinic's current
    /// calendar day in `offset`; `now` becomes the submission time.
    pub fn validate(
        &self,
        today: NaiveDate,
        offset: FixedOffset,
        now: Timestamp,
    ) -> Result<AppointmentRequest, FieldErrors> {
        let mut errors = FieldErrors::default();

        let parent_name = self.parent_name.trim();
        if parent_name.is_empty() {
            errors.insert("parentName", "Parent/Guardian name is required");
        }

        let child_name = self.child_name.trim();
        if child_name.is_empty() {
            errors.insert("childName", "Child name is required");
        }

        let child_age = self.child_age.trim();
        let age = if child_age.is_empty() {
            errors.insert("childAge", "Child age is required");
            None
        } else {
            match child_age.parse::<u64>() {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.insert("childAge", "Please enter a valid age");
                    None
                }
            }
        };

        let phone_number = self.phone_number.trim();
        if phone_number.is_empty() {
            errors.insert("phoneNumber", "Phone number is required");
        }

        let date = if self.preferred_date.trim().is_empty() {
            errors.insert("date", "Please select a preferred date");
            None
        } else {
            match parse_date(&self.preferred_date) {
                Ok(date) if is_bookable(date, today) => Some(date),
                _ => {
                    errors.insert("date", "Please select a valid date");
                    None
                }
            }
        };

        let preferred_time = self.preferred_time.trim();
        if preferred_time.is_empty() {
            errors.insert("time", "Please select a preferred time");
        } else if !TIME_SLOTS.contains(&preferred_time) {
            errors.insert("time", "Please select a valid time slot");
        }

        match (age, date) {
            (Some(child_age), Some(date)) if errors.is_empty() => {
                let email = self.email.trim();
                Ok(AppointmentRequest {
                    parent_name: parent_name.to_string(),
                    child_name: child_name.to_string(),
                    child_age,
                    phone_number: phone_number.to_string(),
                    email: (!email.is_empty()).then(|| email.to_string()),
                    preferred_date: Timestamp::from_local_date(date, offset),
                    preferred_time: preferred_time.to_string(),
                    reason: self.reason.trim().to_string(),
                    submission_time: now,
                    status: AppointmentStatus::Pending,
                })
            }
            _ => Err(errors),
        }
    }
}
