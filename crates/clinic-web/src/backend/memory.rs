//! In-process stand-in for the backend actor.
//!
//! Keeps appointments, staff accounts, profiles, and admin principals in
//! memory. Permission checks are limited to what the portal needs to
//! behave realistically: listing and updating appointments requires an
//! active staff account or an admin, staff management requires an admin.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use clinic_core::{
    ActivationStatus, Appointment, AppointmentRequest, AppointmentStatus, Backend, BackendError,
    Principal, StaffCredentials, StaffUser, UserProfile, UserRole,
};
use parking_lot::RwLock;

#[derive(Default)]
struct Inner {
    appointments: Vec<AppointmentRequest>,
    staff: BTreeMap<String, StaffUser>,
    profiles: HashMap<Principal, UserProfile>,
    admins: HashSet<Principal>,
}

impl Inner {
    fn active_staff(&self, caller: &Principal) -> Option<&StaffUser> {
        self.staff.values().find(|s| {
            s.status == ActivationStatus::Activated && Principal::for_staff(&s.user_id) == *caller
        })
    }

    fn role(&self, caller: &Principal) -> UserRole {
        if self.admins.contains(caller) {
            UserRole::Admin
        } else if self.active_staff(caller).is_some() {
            UserRole::User
        } else {
            UserRole::Guest
        }
    }

    fn require_staff(&self, caller: &Principal, action: &str) -> Result<(), BackendError> {
        match self.role(caller) {
            UserRole::Admin | UserRole::User => Ok(()),
            UserRole::Guest => Err(BackendError::Unauthorized(format!(
                "Unauthorized: Only staff can {action}"
            ))),
        }
    }

    fn require_admin(&self, caller: &Principal, action: &str) -> Result<(), BackendError> {
        if self.admins.contains(caller) {
            Ok(())
        } else {
            Err(BackendError::Unauthorized(format!(
                "Unauthorized: Only admins can {action}"
            )))
        }
    }
}

/// Backend held entirely in process memory.
pub struct MemoryBackend {
    inner: RwLock<Inner>,
    offline: AtomicBool,
}

impl MemoryBackend {
    /// Create a backend whose only account is an activated administrator.
    pub fn new(seed_admin: StaffCredentials) -> Self {
        let mut inner = Inner::default();
        inner.admins.insert(Principal::for_staff(&seed_admin.user_id));
        inner.staff.insert(
            seed_admin.user_id.clone(),
            StaffUser {
                user_id: seed_admin.user_id,
                password: seed_admin.password,
                email: None,
                status: ActivationStatus::Activated,
            },
        );
        Self {
            inner: RwLock::new(inner),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every call fail as if the actor were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable("backend is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_appointment(
        &self,
        _caller: &Principal,
        request: AppointmentRequest,
    ) -> Result<(), BackendError> {
        self.check_online()?;
        let mut inner = self.inner.write();
        inner.appointments.push(request);
        tracing::debug!(count = inner.appointments.len(), "appointment stored");
        Ok(())
    }

    async fn list_appointments(
        &self,
        caller: &Principal,
    ) -> Result<Vec<Appointment>, BackendError> {
        self.check_online()?;
        let inner = self.inner.read();
        inner.require_staff(caller, "view appointments")?;
        Ok(inner
            .appointments
            .iter()
            .zip(0u64..)
            .map(|(request, index)| Appointment {
                index,
                request: request.clone(),
            })
            .collect())
    }

    async fn update_appointment_status(
        &self,
        caller: &Principal,
        index: u64,
        status: AppointmentStatus,
    ) -> Result<(), BackendError> {
        self.check_online()?;
        let mut inner = self.inner.write();
        inner.require_staff(caller, "update appointments")?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| inner.appointments.get_mut(i))
            .ok_or_else(|| BackendError::Rejected("Appointment not found".to_string()))?;
        slot.status = status;
        Ok(())
    }

    async fn authenticate_staff(
        &self,
        _caller: &Principal,
        credentials: StaffCredentials,
    ) -> Result<bool, BackendError> {
        self.check_online()?;
        let inner = self.inner.read();
        Ok(inner.staff.get(&credentials.user_id).is_some_and(|staff| {
            staff.password == credentials.password && staff.status == ActivationStatus::Activated
        }))
    }

    async fn get_all_active_staff_users(
        &self,
        caller: &Principal,
    ) -> Result<Vec<StaffUser>, BackendError> {
        self.check_online()?;
        let inner = self.inner.read();
        inner.require_admin(caller, "list staff users")?;
        Ok(inner.staff.values().cloned().collect())
    }

    async fn create_staff_user(
        &self,
        caller: &Principal,
        staff: StaffUser,
    ) -> Result<(), BackendError> {
        self.check_online()?;
        let mut inner = self.inner.write();
        inner.require_admin(caller, "create staff users")?;
        if inner.staff.contains_key(&staff.user_id) {
            return Err(BackendError::Rejected(format!(
                "Staff user {} already exists",
                staff.user_id
            )));
        }
        inner.staff.insert(staff.user_id.clone(), staff);
        Ok(())
    }

    async fn update_staff_user(
        &self,
        caller: &Principal,
        user_id: &str,
        staff: StaffUser,
    ) -> Result<(), BackendError> {
        self.check_online()?;
        let mut inner = self.inner.write();
        inner.require_admin(caller, "update staff users")?;
        if staff.user_id != user_id {
            return Err(BackendError::Rejected("User ID cannot be changed".to_string()));
        }
        match inner.staff.get_mut(user_id) {
            Some(existing) => {
                *existing = staff;
                Ok(())
            }
            None => Err(BackendError::Rejected(format!("Staff user {user_id} not found"))),
        }
    }

    async fn delete_staff_user(
        &self,
        caller: &Principal,
        user_id: &str,
    ) -> Result<(), BackendError> {
        self.check_online()?;
        let mut inner = self.inner.write();
        inner.require_admin(caller, "delete staff users")?;
        if Principal::for_staff(user_id) == *caller {
            return Err(BackendError::Rejected(
                "You cannot delete your own account".to_string(),
            ));
        }
        match inner.staff.remove(user_id) {
            Some(_) => Ok(()),
            None => Err(BackendError::Rejected(format!("Staff user {user_id} not found"))),
        }
    }

    async fn get_caller_user_profile(
        &self,
        caller: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.check_online()?;
        Ok(self.inner.read().profiles.get(caller).cloned())
    }

    async fn save_caller_user_profile(
        &self,
        caller: &Principal,
        profile: UserProfile,
    ) -> Result<(), BackendError> {
        self.check_online()?;
        if caller.is_anonymous() {
            return Err(BackendError::Unauthorized(
                "Unauthorized: Anonymous callers cannot save a profile".to_string(),
            ));
        }
        self.inner.write().profiles.insert(caller.clone(), profile);
        Ok(())
    }

    async fn get_caller_user_role(&self, caller: &Principal) -> Result<UserRole, BackendError> {
        self.check_online()?;
        Ok(self.inner.read().role(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::Timestamp;

    fn backend() -> MemoryBackend {
        MemoryBackend::new(StaffCredentials {
            user_id: "admin".to_string(),
            password: "secret".to_string(),
        })
    }

    fn admin() -> Principal {
        Principal::for_staff("admin")
    }

    fn request(child: &str) -> AppointmentRequest {
        AppointmentRequest {
            parent_name: "Parent".to_string(),
            child_name: child.to_string(),
            child_age: 3,
            phone_number: "9000000000".to_string(),
            email: None,
            preferred_date: Timestamp(0),
            preferred_time: "07:00 PM".to_string(),
            reason: String::new(),
            submission_time: Timestamp(0),
            status: AppointmentStatus::Pending,
        }
    }

    fn staff(user_id: &str, status: ActivationStatus) -> StaffUser {
        StaffUser {
            user_id: user_id.to_string(),
            password: "pw".to_string(),
            email: None,
            status,
        }
    }

    #[tokio::test]
    async fn anyone_can_book_but_only_staff_can_list() {
        let backend = backend();
        backend
            .create_appointment(&Principal::anonymous(), request("Ravi"))
            .await
            .unwrap();

        let err = backend
            .list_appointments(&Principal::anonymous())
            .await
            .unwrap_err();
        assert!(err.is_authorization());

        let list = backend.list_appointments(&admin()).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].index, 0);
        assert_eq!(list[0].request.child_name, "Ravi");
    }

    #[tokio::test]
    async fn status_update_by_index() {
        let backend = backend();
        let anon = Principal::anonymous();
        backend.create_appointment(&anon, request("A")).await.unwrap();
        backend.create_appointment(&anon, request("B")).await.unwrap();

        backend
            .update_appointment_status(&admin(), 1, AppointmentStatus::Confirmed)
            .await
            .unwrap();
        let list = backend.list_appointments(&admin()).await.unwrap();
        assert_eq!(list[0].request.status, AppointmentStatus::Pending);
        assert_eq!(list[1].request.status, AppointmentStatus::Confirmed);

        let err = backend
            .update_appointment_status(&admin(), 5, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected(_)));
    }

    #[tokio::test]
    async fn authentication_requires_active_account() {
        let backend = backend();
        backend
            .create_staff_user(&admin(), staff("nurse", ActivationStatus::Activated))
            .await
            .unwrap();
        backend
            .create_staff_user(&admin(), staff("former", ActivationStatus::Deactivated))
            .await
            .unwrap();

        let anon = Principal::anonymous();
        let creds = |user: &str, password: &str| StaffCredentials {
            user_id: user.to_string(),
            password: password.to_string(),
        };
        assert!(backend.authenticate_staff(&anon, creds("nurse", "pw")).await.unwrap());
        assert!(!backend.authenticate_staff(&anon, creds("nurse", "bad")).await.unwrap());
        assert!(!backend.authenticate_staff(&anon, creds("former", "pw")).await.unwrap());
        assert!(!backend.authenticate_staff(&anon, creds("ghost", "pw")).await.unwrap());
    }

    #[tokio::test]
    async fn roles() {
        let backend = backend();
        backend
            .create_staff_user(&admin(), staff("nurse", ActivationStatus::Activated))
            .await
            .unwrap();
        assert_eq!(backend.get_caller_user_role(&admin()).await.unwrap(), UserRole::Admin);
        assert!(backend.is_caller_admin(&admin()).await.unwrap());
        let nurse = Principal::for_staff("nurse");
        assert_eq!(backend.get_caller_user_role(&nurse).await.unwrap(), UserRole::User);
        assert!(!backend.is_caller_admin(&nurse).await.unwrap());
        assert_eq!(
            backend.get_caller_user_role(&Principal::anonymous()).await.unwrap(),
            UserRole::Guest
        );
    }

    #[tokio::test]
    async fn deactivated_staff_lose_access() {
        let backend = backend();
        backend
            .create_staff_user(&admin(), staff("nurse", ActivationStatus::Activated))
            .await
            .unwrap();
        let nurse = Principal::for_staff("nurse");
        assert!(backend.list_appointments(&nurse).await.is_ok());

        backend
            .update_staff_user(&admin(), "nurse", staff("nurse", ActivationStatus::Deactivated))
            .await
            .unwrap();
        assert!(backend.list_appointments(&nurse).await.unwrap_err().is_authorization());
    }

    #[tokio::test]
    async fn staff_management_requires_admin() {
        let backend = backend();
        backend
            .create_staff_user(&admin(), staff("nurse", ActivationStatus::Activated))
            .await
            .unwrap();
        let nurse = Principal::for_staff("nurse");
        let err = backend
            .create_staff_user(&nurse, staff("other", ActivationStatus::Activated))
            .await
            .unwrap_err();
        assert!(err.is_authorization());
        assert!(backend.get_all_active_staff_users(&nurse).await.is_err());
        assert!(backend.delete_staff_user(&nurse, "admin").await.is_err());
    }

    #[tokio::test]
    async fn staff_crud() {
        let backend = backend();
        backend
            .create_staff_user(&admin(), staff("nurse", ActivationStatus::Activated))
            .await
            .unwrap();
        let dup = backend
            .create_staff_user(&admin(), staff("nurse", ActivationStatus::Activated))
            .await
            .unwrap_err();
        assert!(matches!(dup, BackendError::Rejected(_)));

        let ids: Vec<_> = backend
            .get_all_active_staff_users(&admin())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        assert_eq!(ids, ["admin", "nurse"]);

        let renamed = backend
            .update_staff_user(&admin(), "nurse", staff("doctor", ActivationStatus::Activated))
            .await
            .unwrap_err();
        assert!(matches!(renamed, BackendError::Rejected(_)));

        backend.delete_staff_user(&admin(), "nurse").await.unwrap();
        assert!(backend.delete_staff_user(&admin(), "nurse").await.is_err());
        assert!(backend.delete_staff_user(&admin(), "admin").await.is_err());
    }

    #[tokio::test]
    async fn profiles_are_per_caller() {
        let backend = backend();
        assert_eq!(backend.get_caller_user_profile(&admin()).await.unwrap(), None);
        backend
            .save_caller_user_profile(&admin(), UserProfile { name: "Dr. K".to_string() })
            .await
            .unwrap();
        assert_eq!(
            backend.get_caller_user_profile(&admin()).await.unwrap(),
            Some(UserProfile { name: "Dr. K".to_string() })
        );
        let err = backend
            .save_caller_user_profile(&Principal::anonymous(), UserProfile { name: "x".into() })
            .await
            .unwrap_err();
        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn offline_fails_every_call() {
        let backend = backend();
        backend.set_offline(true);
        let err = backend.list_appointments(&admin()).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
        assert!(!err.is_authorization());
        backend.set_offline(false);
        assert!(backend.list_appointments(&admin()).await.is_ok());
    }
}
