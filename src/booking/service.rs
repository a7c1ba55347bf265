//! Appointment lifecycle on top of a [`ResourceProvider`].
//!
//! The provider is a plain record store, so every cross-collection rule lives
//! here: name resolution on booking, the dashboard join, the verification
//! gate and removing users left without appointments. Multi-step operations
//! are sequential calls with no transaction around them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::models::{
    Appointment, AppointmentView, Department, Doctor, NewAppointment, NewUser, RecordId, User,
};
use super::pagination::{paginate, Page};
use super::validation::{BookingForm, EditForm, FieldErrors};
use super::verify::{credentials_match, Credentials};
use crate::provider::{Collection, ProviderError, ResourceProvider};
use crate::store::ListQuery;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid form: {0}")]
    Invalid(FieldErrors),

    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    #[error("Unknown doctor: {0}")]
    UnknownDoctor(String),

    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: RecordId },

    #[error("Email or phone number does not match the appointment details")]
    VerificationFailed,

    #[error("Malformed {collection} record: {source}")]
    Malformed {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for BookingError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { collection, id } => BookingError::NotFound {
                collection,
                id: RecordId(id),
            },
            other => BookingError::Provider(other),
        }
    }
}

/// Result of a successful booking.
#[derive(Debug, Clone)]
pub struct Booking {
    pub appointment: Appointment,
    pub user: User,
    pub new_user: bool,
}

/// What happened to the appointment's user after a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCleanup {
    /// The user still has other appointments.
    Retained,
    /// It was the user's last appointment and the user was deleted.
    Removed,
    /// The appointment is gone but the user could not be checked or deleted.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Deletion {
    pub appointment: Appointment,
    pub user_cleanup: UserCleanup,
}

/// Everything the edit form needs.
#[derive(Debug, Clone)]
pub struct EditContext {
    pub appointment: Appointment,
    pub departments: Vec<Department>,
    pub doctors: Vec<Doctor>,
}

#[derive(Clone)]
pub struct BookingService {
    provider: Arc<dyn ResourceProvider>,
    page_size: usize,
}

impl BookingService {
    pub fn new(provider: Arc<dyn ResourceProvider>, page_size: usize) -> Self {
        Self {
            provider,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn departments(&self) -> Result<Vec<Department>, BookingError> {
        self.fetch_all(Collection::Departments).await
    }

    pub async fn doctors(&self) -> Result<Vec<Doctor>, BookingError> {
        self.fetch_all(Collection::Doctors).await
    }

    /// Department and doctor lists for the booking form.
    pub async fn booking_options(&self) -> Result<(Vec<Department>, Vec<Doctor>), BookingError> {
        tokio::try_join!(self.departments(), self.doctors())
    }

    /// Validate the form, resolve department and doctor by name, reuse or
    /// create the user by email, then create the appointment.
    ///
    /// Name resolution happens before any write, so an unknown department or
    /// doctor leaves the store untouched.
    pub async fn book(&self, form: &BookingForm) -> Result<Booking, BookingError> {
        let booking = form.check().map_err(BookingError::Invalid)?;

        let (users, departments, doctors) = tokio::try_join!(
            self.fetch_all::<User>(Collection::Users),
            self.fetch_all::<Department>(Collection::Departments),
            self.fetch_all::<Doctor>(Collection::Doctors),
        )?;

        let department = departments
            .iter()
            .find(|d| d.name == booking.department)
            .ok_or_else(|| BookingError::UnknownDepartment(booking.department.clone()))?;
        let doctor = doctors
            .iter()
            .find(|d| d.name == booking.doctor)
            .ok_or_else(|| BookingError::UnknownDoctor(booking.doctor.clone()))?;

        let (user, new_user) = match users.into_iter().find(|u| u.email == booking.email) {
            Some(user) => (user, false),
            None => {
                let new_user = NewUser {
                    name: booking.name.clone(),
                    email: booking.email.clone(),
                    phone: Some(booking.phone.clone()),
                };
                let user: User = self.create(Collection::Users, &new_user).await?;
                tracing::info!("Created user {} for {}", user.id, user.email);
                (user, true)
            }
        };

        let new_appointment = NewAppointment {
            user_id: user.id,
            day: booking.day.to_string(),
            department_id: department.id,
            doctor_id: doctor.id,
            phone: Some(booking.phone.clone()),
        };
        let appointment: Appointment = self
            .create(Collection::Appointments, &new_appointment)
            .await?;

        tracing::info!(
            "Booked appointment {} for user {} on {} with {}",
            appointment.id,
            user.id,
            appointment.day,
            doctor.name
        );

        Ok(Booking {
            appointment,
            user,
            new_user,
        })
    }

    /// Every appointment left-joined to its user, department and doctor.
    pub async fn list_appointments(&self) -> Result<Vec<AppointmentView>, BookingError> {
        let (appointments, users, departments, doctors) = tokio::try_join!(
            self.fetch_all::<Appointment>(Collection::Appointments),
            self.fetch_all::<User>(Collection::Users),
            self.fetch_all::<Department>(Collection::Departments),
            self.fetch_all::<Doctor>(Collection::Doctors),
        )?;

        let users: HashMap<RecordId, User> = users.into_iter().map(|u| (u.id, u)).collect();
        let departments: HashMap<RecordId, Department> =
            departments.into_iter().map(|d| (d.id, d)).collect();
        let doctors: HashMap<RecordId, Doctor> = doctors.into_iter().map(|d| (d.id, d)).collect();

        Ok(appointments
            .iter()
            .map(|a| {
                AppointmentView::join(
                    a,
                    users.get(&a.user_id),
                    departments.get(&a.department_id),
                    doctors.get(&a.doctor_id),
                )
            })
            .collect())
    }

    pub async fn page(&self, number: usize) -> Result<Page<AppointmentView>, BookingError> {
        let appointments = self.list_appointments().await?;
        Ok(paginate(appointments, number, self.page_size))
    }

    /// A single joined row.
    pub async fn appointment_view(&self, id: RecordId) -> Result<AppointmentView, BookingError> {
        let appointment: Appointment = self.fetch_one(Collection::Appointments, id).await?;

        let (user, department, doctor) = tokio::try_join!(
            self.fetch_optional::<User>(Collection::Users, appointment.user_id),
            self.fetch_optional::<Department>(Collection::Departments, appointment.department_id),
            self.fetch_optional::<Doctor>(Collection::Doctors, appointment.doctor_id),
        )?;

        Ok(AppointmentView::join(
            &appointment,
            user.as_ref(),
            department.as_ref(),
            doctor.as_ref(),
        ))
    }

    /// The gate in front of edit and delete.
    pub async fn verify(
        &self,
        id: RecordId,
        credentials: &Credentials,
    ) -> Result<AppointmentView, BookingError> {
        let view = self.appointment_view(id).await?;
        if credentials_match(&view, credentials) {
            Ok(view)
        } else {
            tracing::warn!("Verification failed for appointment {}", id);
            Err(BookingError::VerificationFailed)
        }
    }

    pub async fn edit_context(&self, id: RecordId) -> Result<EditContext, BookingError> {
        let (appointment, departments, doctors) = tokio::try_join!(
            self.fetch_one::<Appointment>(Collection::Appointments, id),
            self.departments(),
            self.doctors(),
        )?;

        Ok(EditContext {
            appointment,
            departments,
            doctors,
        })
    }

    /// Full-record PUT of day, department and doctor. Fields not owned by
    /// this form, including unknown ones, are sent back unchanged.
    pub async fn update(&self, id: RecordId, form: &EditForm) -> Result<Appointment, BookingError> {
        let edit = form.validate().map_err(BookingError::Invalid)?;

        let EditContext {
            appointment: current,
            departments,
            doctors,
        } = self.edit_context(id).await?;

        if !departments.iter().any(|d| d.id == edit.department_id) {
            return Err(BookingError::UnknownDepartment(
                edit.department_id.to_string(),
            ));
        }
        if !doctors.iter().any(|d| d.id == edit.doctor_id) {
            return Err(BookingError::UnknownDoctor(edit.doctor_id.to_string()));
        }

        let updated = Appointment {
            day: edit.day.to_string(),
            department_id: edit.department_id,
            doctor_id: edit.doctor_id,
            ..current
        };
        let body = encode(Collection::Appointments, &updated)?;
        let record = self
            .provider
            .replace(Collection::Appointments, id.get(), body)
            .await?;

        tracing::info!("Updated appointment {}", id);
        decode(Collection::Appointments, record)
    }

    /// Delete the appointment, then delete its user if no appointment still
    /// references it. A failed cleanup is reported, not rolled back.
    pub async fn delete(&self, id: RecordId) -> Result<Deletion, BookingError> {
        let appointment: Appointment = self.fetch_one(Collection::Appointments, id).await?;
        self.provider
            .delete(Collection::Appointments, id.get())
            .await?;
        tracing::info!("Deleted appointment {}", id);

        let user_cleanup = match self.remove_user_if_orphaned(appointment.user_id).await {
            Ok(true) => UserCleanup::Removed,
            Ok(false) => UserCleanup::Retained,
            Err(e) => {
                tracing::warn!(
                    "Appointment {} deleted but cleanup of user {} failed: {}",
                    id,
                    appointment.user_id,
                    e
                );
                UserCleanup::Failed(e.to_string())
            }
        };

        Ok(Deletion {
            appointment,
            user_cleanup,
        })
    }

    async fn remove_user_if_orphaned(&self, user_id: RecordId) -> Result<bool, BookingError> {
        let query = ListQuery::default().filter("user_id", user_id);
        let remaining = self
            .provider
            .list(Collection::Appointments, &query)
            .await?;
        if !remaining.is_empty() {
            return Ok(false);
        }

        match self.provider.delete(Collection::Users, user_id.get()).await {
            Ok(()) => {
                tracing::info!("Removed user {} with no remaining appointments", user_id);
                Ok(true)
            }
            Err(ProviderError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // Records that do not decode are skipped so one bad row cannot take the
    // whole dashboard down.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, BookingError> {
        let records = self
            .provider
            .list(collection, &ListQuery::default())
            .await?;

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} record: {}", collection, e);
                    None
                }
            })
            .collect())
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<T, BookingError> {
        let record = self.provider.get(collection, id.get()).await?;
        decode(collection, record)
    }

    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<Option<T>, BookingError> {
        match self.fetch_one(collection, id).await {
            Ok(item) => Ok(Some(item)),
            Err(BookingError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create<T: DeserializeOwned, B: Serialize>(
        &self,
        collection: Collection,
        body: &B,
    ) -> Result<T, BookingError> {
        let body = encode(collection, body)?;
        let record = self.provider.create(collection, body).await?;
        decode(collection, record)
    }
}

fn encode<B: Serialize>(collection: Collection, body: &B) -> Result<Value, BookingError> {
    serde_json::to_value(body).map_err(|source| BookingError::Malformed { collection, source })
}

fn decode<T: DeserializeOwned>(collection: Collection, record: Value) -> Result<T, BookingError> {
    serde_json::from_value(record).map_err(|source| BookingError::Malformed { collection, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LocalProvider;
    use crate::store::JsonStore;
    use async_trait::async_trait;
    use serde_json::json;

    /// Delegates to a local store but refuses to delete users.
    struct UserDeleteFails(LocalProvider);

    #[async_trait]
    impl ResourceProvider for UserDeleteFails {
        async fn list(
            &self,
            collection: Collection,
            query: &ListQuery,
        ) -> Result<Vec<Value>, ProviderError> {
            self.0.list(collection, query).await
        }

        async fn get(&self, collection: Collection, id: u64) -> Result<Value, ProviderError> {
            self.0.get(collection, id).await
        }

        async fn create(
            &self,
            collection: Collection,
            record: Value,
        ) -> Result<Value, ProviderError> {
            self.0.create(collection, record).await
        }

        async fn replace(
            &self,
            collection: Collection,
            id: u64,
            record: Value,
        ) -> Result<Value, ProviderError> {
            self.0.replace(collection, id, record).await
        }

        async fn delete(&self, collection: Collection, id: u64) -> Result<(), ProviderError> {
            if collection == Collection::Users {
                return Err(ProviderError::Rejected {
                    status: 500,
                    message: "disk full".to_string(),
                });
            }
            self.0.delete(collection, id).await
        }
    }

    async fn store() -> (tempfile::TempDir, Arc<JsonStore>) {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonStore::open(tmp.path().join("db.json")).await.unwrap();
        (tmp, Arc::new(store))
    }

    fn form(email: &str) -> BookingForm {
        BookingForm {
            name: "Ada".to_string(),
            email: email.to_string(),
            phone: "5551234567".to_string(),
            day: "Wednesday".to_string(),
            department: "Neurology".to_string(),
            doctor: "Dr. Williams".to_string(),
        }
    }

    #[tokio::test]
    async fn failed_user_cleanup_is_reported_not_rolled_back() {
        let (_tmp, store) = store().await;
        let provider = UserDeleteFails(LocalProvider::new(store.clone()));
        let service = BookingService::new(Arc::new(provider), 5);

        let booking = service.book(&form("ada@example.com")).await.unwrap();
        let deletion = service.delete(booking.appointment.id).await.unwrap();

        assert!(matches!(deletion.user_cleanup, UserCleanup::Failed(_)));
        assert!(store
            .get("appointments", booking.appointment.id.get())
            .await
            .is_err());
        assert!(store.get("users", booking.user.id.get()).await.is_ok());
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_in_listing() {
        let (_tmp, store) = store().await;
        let service = BookingService::new(Arc::new(LocalProvider::new(store.clone())), 5);

        service.book(&form("ada@example.com")).await.unwrap();
        store
            .insert("appointments", json!({"day": "Monday"}))
            .await
            .unwrap();

        let rows = service.list_appointments().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department, "Neurology");
    }

    #[tokio::test]
    async fn listing_defaults_dangling_references() {
        let (_tmp, store) = store().await;
        let service = BookingService::new(Arc::new(LocalProvider::new(store.clone())), 5);

        store
            .insert(
                "appointments",
                json!({"user_id": 40, "day": "Friday", "department_id": 1, "doctor_id": 77}),
            )
            .await
            .unwrap();

        let rows = service.list_appointments().await.unwrap();
        assert_eq!(rows[0].patient_name, "Unknown");
        assert_eq!(rows[0].department, "Cardiology");
        assert_eq!(rows[0].doctor, "Unknown");
    }

    #[tokio::test]
    async fn update_rejects_unknown_doctor_id() {
        let (_tmp, store) = store().await;
        let service = BookingService::new(Arc::new(LocalProvider::new(store)), 5);
        let booking = service.book(&form("ada@example.com")).await.unwrap();

        let edit = EditForm {
            day: "Friday".to_string(),
            department_id: "1".to_string(),
            doctor_id: "99".to_string(),
        };
        let result = service.update(booking.appointment.id, &edit).await;
        assert!(matches!(result, Err(BookingError::UnknownDoctor(_))));
    }

    #[tokio::test]
    async fn update_preserves_unknown_fields() {
        let (_tmp, store) = store().await;
        let service = BookingService::new(Arc::new(LocalProvider::new(store.clone())), 5);

        let raw = store
            .insert(
                "appointments",
                json!({"user_id": 1, "day": "Monday", "department_id": 1, "doctor_id": 1, "notes": "fasting"}),
            )
            .await
            .unwrap();
        let id = RecordId(raw["id"].as_u64().unwrap());

        let edit = EditForm {
            day: "Thursday".to_string(),
            department_id: "3".to_string(),
            doctor_id: "3".to_string(),
        };
        let updated = service.update(id, &edit).await.unwrap();
        assert_eq!(updated.day, "Thursday");

        let stored = store.get("appointments", id.get()).await.unwrap();
        assert_eq!(stored["notes"], "fasting");
        assert_eq!(stored["department_id"], 3);
    }

    #[tokio::test]
    async fn missing_appointment_is_not_found() {
        let (_tmp, store) = store().await;
        let service = BookingService::new(Arc::new(LocalProvider::new(store)), 5);

        let result = service.delete(RecordId(404)).await;
        assert!(matches!(
            result,
            Err(BookingError::NotFound {
                collection: Collection::Appointments,
                ..
            })
        ));
    }
}
