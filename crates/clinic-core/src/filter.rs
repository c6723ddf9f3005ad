//! Date-range and text filters over appointment and staff lists.
//!
//! Every function here is a pure function of its inputs: the list, the
//! criteria, and (for relative ranges) the current calendar day. Filters
//! keep the input order.

use chrono::{Datelike, Days, FixedOffset, Months, NaiveDate};

use crate::error::{Error, Result};
use crate::model::{Appointment, StaffUser};

/// Preferred-date criterion for the appointments table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    /// The Sunday-to-Saturday week containing today.
    Week,
    Month,
    /// Inclusive range; `None` on either side matches everything.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateFilter {
    /// Build a filter from the `range`, `from`, and `to` query parameters.
    ///
    /// Unknown ranges fall back to [`DateFilter::All`]. Unparseable bounds
    /// are dropped, which makes the custom range match everything.
    pub fn from_params(range: Option<&str>, from: Option<&str>, to: Option<&str>) -> Self {
        match range.map(str::trim).unwrap_or("all") {
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            "custom" => {
                let start = from.and_then(|s| parse_date(s).ok());
                let end = to.and_then(|s| parse_date(s).ok());
                match (start, end) {
                    (Some(a), Some(b)) if a > b => Self::Custom {
                        start: Some(b),
                        end: Some(a),
                    },
                    _ => Self::Custom { start, end },
                }
            }
            _ => Self::All,
        }
    }

    /// Query-string key for the preset.
    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Custom { .. } => "custom",
        }
    }

    /// Whether any narrowing is in effect.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::All)
    }

    /// Inclusive day range this filter selects, relative to `today`.
    ///
    /// `None` means the filter matches every date.
    pub fn range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Self::All => None,
            Self::Today => Some((today, today)),
            Self::Week => Some(week_range(today)),
            Self::Month => Some(month_range(today)),
            Self::Custom {
                start: Some(start),
                end: Some(end),
            } => Some((start, end)),
            Self::Custom { .. } => None,
        }
    }
}

/// Parse a `YYYY-MM-DD` date as submitted by an HTML date input.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Sunday through Saturday of the week containing `today`.
pub fn week_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = u64::from(today.weekday().num_days_from_sunday());
    let start = today - Days::new(back);
    (start, start + Days::new(6))
}

/// First through last day of the month containing `today`.
pub fn month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let end = (start + Months::new(1)).pred_opt().unwrap_or(start);
    (start, end)
}

/// Appointments whose preferred date falls inside `filter`.
///
/// Dates are compared as calendar days in `offset`, the clinic's local time.
pub fn filter_by_date(
    appointments: &[Appointment],
    filter: &DateFilter,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<Appointment> {
    let Some((start, end)) = filter.range(today) else {
        return appointments.to_vec();
    };

    appointments
        .iter()
        .filter(|appointment| {
            let day = appointment.request.preferred_date.local_date(offset);
            day >= start && day <= end
        })
        .cloned()
        .collect()
}

/// Appointments whose parent name, child name, or phone number contains
/// `query`, ignoring case. A blank query keeps everything.
pub fn filter_by_search(appointments: &[Appointment], query: &str) -> Vec<Appointment> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return appointments.to_vec();
    }

    appointments
        .iter()
        .filter(|appointment| {
            let request = &appointment.request;
            request.parent_name.to_lowercase().contains(&query)
                || request.child_name.to_lowercase().contains(&query)
                || request.phone_number.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Staff accounts whose user id or email contains `query`, ignoring case.
pub fn filter_staff(staff: &[StaffUser], query: &str) -> Vec<StaffUser> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return staff.to_vec();
    }

    staff
        .iter()
        .filter(|user| {
            user.user_id.to_lowercase().contains(&query)
                || user
                    .email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

/// Date filter followed by search, as the appointments table applies them.
pub fn filter_appointments(
    appointments: &[Appointment],
    filter: &DateFilter,
    query: &str,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<Appointment> {
    let by_date = filter_by_date(appointments, filter, today, offset);
    filter_by_search(&by_date, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivationStatus, AppointmentRequest, AppointmentStatus, Timestamp};

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn appointment(
        index: u64,
        parent: &str,
        child: &str,
        phone: &str,
        day: NaiveDate,
    ) -> Appointment {
        Appointment {
            index,
            request: AppointmentRequest {
                parent_name: parent.to_string(),
                child_name: child.to_string(),
                child_age: 3,
                phone_number: phone.to_string(),
                email: None,
                preferred_date: Timestamp::from_local_date(day, ist()),
                preferred_time: "07:00 PM".to_string(),
                reason: String::new(),
                submission_time: Timestamp(0),
                status: AppointmentStatus::Pending,
            },
        }
    }

    fn sample() -> Vec<Appointment> {
        vec![
            appointment(0, "Lakshmi Raman", "Arjun", "93637 16343", date(2024, 5, 15)),
            appointment(1, "Priya Kumar", "Meera", "98400 11111", date(2024, 5, 12)),
            appointment(2, "John Doe", "Sam", "044-2345", date(2024, 5, 18)),
            appointment(3, "Anitha", "Kavin", "90000 22222", date(2024, 5, 31)),
            appointment(4, "Ravi", "Diya", "91111 33333", date(2024, 6, 1)),
        ]
    }

    fn indices(list: &[Appointment]) -> Vec<u64> {
        list.iter().map(|a| a.index).collect()
    }

    // -- date ranges --

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-15 is a Wednesday.
        assert_eq!(week_range(date(2024, 5, 15)), (date(2024, 5, 12), date(2024, 5, 18)));
        // A Sunday starts its own week.
        assert_eq!(week_range(date(2024, 5, 12)), (date(2024, 5, 12), date(2024, 5, 18)));
    }

    #[test]
    fn month_range_handles_lengths() {
        assert_eq!(month_range(date(2024, 2, 10)), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_range(date(2023, 12, 31)), (date(2023, 12, 1), date(2023, 12, 31)));
    }

    #[test]
    fn all_returns_everything_in_order() {
        let list = sample();
        let out = filter_by_date(&list, &DateFilter::All, date(2024, 5, 15), ist());
        assert_eq!(out, list);
    }

    #[test]
    fn today_matches_same_local_day() {
        let out = filter_by_date(&sample(), &DateFilter::Today, date(2024, 5, 15), ist());
        assert_eq!(indices(&out), vec![0]);
    }

    #[test]
    fn week_is_inclusive_on_both_ends() {
        let out = filter_by_date(&sample(), &DateFilter::Week, date(2024, 5, 15), ist());
        assert_eq!(indices(&out), vec![0, 1, 2]);
    }

    #[test]
    fn month_excludes_next_month() {
        let out = filter_by_date(&sample(), &DateFilter::Month, date(2024, 5, 15), ist());
        assert_eq!(indices(&out), vec![0, 1, 2, 3]);
    }

    #[test]
    fn custom_range_inclusive() {
        let filter = DateFilter::Custom {
            start: Some(date(2024, 5, 18)),
            end: Some(date(2024, 6, 1)),
        };
        let out = filter_by_date(&sample(), &filter, date(2024, 5, 15), ist());
        assert_eq!(indices(&out), vec![2, 3, 4]);
    }

    #[test]
    fn custom_range_missing_bound_matches_all() {
        let filter = DateFilter::Custom {
            start: Some(date(2024, 5, 18)),
            end: None,
        };
        let out = filter_by_date(&sample(), &filter, date(2024, 5, 15), ist());
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn day_comparison_uses_clinic_offset() {
        // 23:00 IST on the 15th is still the 15th locally, though UTC says 17:30.
        let mut late = appointment(9, "X", "Y", "1", date(2024, 5, 15));
        late.request.preferred_date = Timestamp(
            late.request.preferred_date.0 + 23 * 3_600 * 1_000_000_000,
        );
        let out = filter_by_date(&[late], &DateFilter::Today, date(2024, 5, 15), ist());
        assert_eq!(out.len(), 1);
    }

    // -- params --

    #[test]
    fn params_parse_presets() {
        assert_eq!(DateFilter::from_params(Some("week"), None, None), DateFilter::Week);
        assert_eq!(DateFilter::from_params(None, None, None), DateFilter::All);
        assert_eq!(DateFilter::from_params(Some("bogus"), None, None), DateFilter::All);
    }

    #[test]
    fn params_custom_swaps_inverted_range() {
        let filter =
            DateFilter::from_params(Some("custom"), Some("2024-05-20"), Some("2024-05-01"));
        assert_eq!(
            filter,
            DateFilter::Custom {
                start: Some(date(2024, 5, 1)),
                end: Some(date(2024, 5, 20)),
            }
        );
    }

    #[test]
    fn params_custom_drops_bad_dates() {
        let filter = DateFilter::from_params(Some("custom"), Some("yesterday"), Some("2024-05-01"));
        assert_eq!(
            filter,
            DateFilter::Custom {
                start: None,
                end: Some(date(2024, 5, 1)),
            }
        );
        assert_eq!(filter.range(date(2024, 5, 1)), None);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_err());
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), date(2024, 2, 29));
    }

    // -- search --

    #[test]
    fn blank_search_keeps_all() {
        let list = sample();
        assert_eq!(filter_by_search(&list, "   "), list);
        assert_eq!(filter_by_search(&list, ""), list);
    }

    #[test]
    fn search_matches_parent_child_or_phone() {
        let list = sample();
        assert_eq!(indices(&filter_by_search(&list, "priya")), vec![1]);
        assert_eq!(indices(&filter_by_search(&list, "ARJUN")), vec![0]);
        assert_eq!(indices(&filter_by_search(&list, "16343")), vec![0]);
        assert_eq!(indices(&filter_by_search(&list, "  sam ")), vec![2]);
    }

    #[test]
    fn search_ignores_other_fields() {
        let mut list = sample();
        list[0].request.reason = "fever".to_string();
        assert!(filter_by_search(&list, "fever").is_empty());
    }

    #[test]
    fn date_and_search_compose() {
        let out = filter_appointments(&sample(), &DateFilter::Week, "a", date(2024, 5, 15), ist());
        // Week keeps 0,1,2; "a" hits Lakshmi/Arjun, Priya Kumar, Sam.
        assert_eq!(indices(&out), vec![0, 1, 2]);
        let out = filter_appointments(
            &sample(),
            &DateFilter::Week,
            "meera",
            date(2024, 5, 15),
            ist(),
        );
        assert_eq!(indices(&out), vec![1]);
    }

    // -- staff --

    fn staff(user_id: &str, email: Option<&str>) -> StaffUser {
        StaffUser {
            user_id: user_id.to_string(),
            password: "pw".to_string(),
            email: email.map(str::to_string),
            status: ActivationStatus::Activated,
        }
    }

    #[test]
    fn staff_search_by_id_or_email() {
        let list = vec![
            staff("reception", Some("front@clinic.in")),
            staff("nurse1", None),
            staff("nurse2", Some("N2@Clinic.in")),
        ];
        let ids = |v: Vec<StaffUser>| v.into_iter().map(|s| s.user_id).collect::<Vec<_>>();
        assert_eq!(ids(filter_staff(&list, "nurse")), vec!["nurse1", "nurse2"]);
        assert_eq!(ids(filter_staff(&list, "clinic.in")), vec!["reception", "nurse2"]);
        assert_eq!(ids(filter_staff(&list, "")), vec!["reception", "nurse1", "nurse2"]);
        assert!(filter_staff(&list, "doctor").is_empty());
    }
}
