//! Optimistic mutation with snapshot rollback.

use std::future::Future;

use crate::model::{Appointment, AppointmentStatus};

/// Outcome of an optimistic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E> {
    /// The backend accepted the change; the mutated value stands.
    Committed,
    /// The backend refused; the value was restored to its snapshot.
    RolledBack(E),
}

impl<E> Outcome<E> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Apply `mutate` to `value` immediately, then await `commit`.
///
/// `commit` sees the mutated value so it can publish it before the backend
/// confirms. If `commit` fails, `value` is restored to exactly what it was
/// before `mutate` ran.
pub async fn apply_optimistic<T, E, M, C, Fut>(value: &mut T, mutate: M, commit: C) -> Outcome<E>
where
    T: Clone,
    M: FnOnce(&mut T),
    C: FnOnce(&T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let snapshot = value.clone();
    mutate(value);

    match commit(&*value).await {
        Ok(()) => Outcome::Committed,
        Err(err) => {
            *value = snapshot;
            Outcome::RolledBack(err)
        }
    }
}

/// Set the status of the appointment with `index`, if present.
///
/// Returns whether an appointment was changed.
pub fn set_status(appointments: &mut [Appointment], index: u64, status: AppointmentStatus) -> bool {
    match appointments.iter_mut().find(|a| a.index == index) {
        Some(appointment) => {
            appointment.request.status = status;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppointmentRequest, Timestamp};

    fn list() -> Vec<Appointment> {
        (0..3)
            .map(|index| Appointment {
                index,
                request: AppointmentRequest {
                    parent_name: format!("parent {index}"),
                    child_name: format!("child {index}"),
                    child_age: 2,
                    phone_number: "1".to_string(),
                    email: None,
                    preferred_date: Timestamp(0),
                    preferred_time: "07:00 PM".to_string(),
                    reason: String::new(),
                    submission_time: Timestamp(0),
                    status: AppointmentStatus::Pending,
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn commit_keeps_mutation() {
        let mut appointments = list();
        let outcome: Outcome<String> = apply_optimistic(
            &mut appointments,
            |l| {
                set_status(l, 1, AppointmentStatus::Confirmed);
            },
            |_| async { Ok(()) },
        )
        .await;

        assert!(outcome.is_committed());
        assert_eq!(appointments[1].request.status, AppointmentStatus::Confirmed);
        assert_eq!(appointments[0].request.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn failure_restores_snapshot() {
        let mut appointments = list();
        let before = appointments.clone();
        let outcome = apply_optimistic(
            &mut appointments,
            |l| {
                set_status(l, 2, AppointmentStatus::Cancelled);
            },
            |_| async { Err("backend down") },
        )
        .await;

        assert_eq!(outcome, Outcome::RolledBack("backend down"));
        assert_eq!(appointments, before);
    }

    #[tokio::test]
    async fn commit_sees_mutated_value() {
        let mut appointments = list();
        let outcome: Outcome<()> = apply_optimistic(
            &mut appointments,
            |l| {
                set_status(l, 0, AppointmentStatus::Completed);
            },
            |shown| {
                let status = shown[0].request.status;
                async move {
                    assert_eq!(status, AppointmentStatus::Completed);
                    Ok(())
                }
            },
        )
        .await;
        assert!(outcome.is_committed());
    }

    #[test]
    fn set_status_unknown_index() {
        let mut appointments = list();
        assert!(!set_status(&mut appointments, 7, AppointmentStatus::Completed));
        assert!(set_status(&mut appointments, 0, AppointmentStatus::Completed));
        assert_eq!(appointments[0].request.status, AppointmentStatus::Completed);
    }
}
