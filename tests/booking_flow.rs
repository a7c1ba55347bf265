use carebook::booking::{
    BookingError, BookingForm, BookingService, Credentials, EditForm, RecordId, UserCleanup,
};
use carebook::provider::LocalProvider;
use carebook::store::{JsonStore, ListQuery};
use std::sync::Arc;
use tempfile::TempDir;

async fn setup() -> (TempDir, Arc<JsonStore>, BookingService) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(
        JsonStore::open(temp_dir.path().join("db.json"))
            .await
            .expect("Failed to open test store"),
    );
    let service = BookingService::new(Arc::new(LocalProvider::new(store.clone())), 5);
    (temp_dir, store, service)
}

fn form(name: &str, email: &str, department: &str, doctor: &str) -> BookingForm {
    BookingForm {
        name: name.to_string(),
        email: email.to_string(),
        phone: "5551234567".to_string(),
        day: "Monday".to_string(),
        department: department.to_string(),
        doctor: doctor.to_string(),
    }
}

async fn count(store: &JsonStore, collection: &str) -> usize {
    store
        .list(collection, &ListQuery::default())
        .await
        .unwrap()
        .total
}

#[tokio::test]
async fn test_booking_new_email_creates_user_and_appointment() {
    let (_dir, store, service) = setup().await;

    let booking = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .expect("Booking should succeed");

    assert!(booking.new_user);
    assert_eq!(count(&store, "users").await, 1);
    assert_eq!(count(&store, "appointments").await, 1);
    assert_eq!(booking.appointment.user_id, booking.user.id);
    assert_eq!(booking.appointment.department_id, RecordId(1));
    assert_eq!(booking.appointment.day, "Monday");
}

#[tokio::test]
async fn test_booking_existing_email_reuses_user() {
    let (_dir, store, service) = setup().await;

    let first = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .unwrap();
    let second = service
        .book(&form("Ana Diaz", "ana@example.com", "Neurology", "Dr. Williams"))
        .await
        .unwrap();

    assert!(!second.new_user);
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(count(&store, "users").await, 1);
    assert_eq!(count(&store, "appointments").await, 2);
}

#[tokio::test]
async fn test_booking_unknown_names_write_nothing() {
    let (_dir, store, service) = setup().await;

    let result = service
        .book(&form("Ana Diaz", "ana@example.com", "Radiology", "Dr. Smith"))
        .await;
    assert!(matches!(result, Err(BookingError::UnknownDepartment(_))));

    let result = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Who"))
        .await;
    assert!(matches!(result, Err(BookingError::UnknownDoctor(_))));

    assert_eq!(count(&store, "appointments").await, 0);
    assert_eq!(count(&store, "users").await, 0);
}

#[tokio::test]
async fn test_invalid_form_is_rejected_with_field_errors() {
    let (_dir, store, service) = setup().await;

    let mut bad = form("", "not-an-email", "Cardiology", "Dr. Smith");
    bad.phone = "123".to_string();

    match service.book(&bad).await {
        Err(BookingError::Invalid(errors)) => {
            assert_eq!(errors.get("name"), Some("Name is required"));
            assert_eq!(errors.get("email"), Some("Invalid email"));
            assert_eq!(errors.get("phone"), Some("Phone number must be 10 digits"));
        }
        other => panic!("Expected validation errors, got {:?}", other.map(|b| b.appointment)),
    }
    assert_eq!(count(&store, "appointments").await, 0);
}

#[tokio::test]
async fn test_deleting_last_appointment_removes_user() {
    let (_dir, store, service) = setup().await;

    let booking = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .unwrap();

    let deletion = service.delete(booking.appointment.id).await.unwrap();
    assert_eq!(deletion.user_cleanup, UserCleanup::Removed);
    assert_eq!(count(&store, "appointments").await, 0);
    assert_eq!(count(&store, "users").await, 0);
}

#[tokio::test]
async fn test_deleting_one_of_several_keeps_user() {
    let (_dir, store, service) = setup().await;

    let first = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .unwrap();
    service
        .book(&form("Ana Diaz", "ana@example.com", "Dentistry", "Dr. Johnson"))
        .await
        .unwrap();

    let deletion = service.delete(first.appointment.id).await.unwrap();
    assert_eq!(deletion.user_cleanup, UserCleanup::Retained);
    assert_eq!(count(&store, "appointments").await, 1);
    assert_eq!(count(&store, "users").await, 1);
}

#[tokio::test]
async fn test_pagination_slices_in_pages_of_five() {
    let (_dir, _store, service) = setup().await;

    for i in 0..12 {
        service
            .book(&form(
                &format!("Patient {}", i),
                &format!("patient{}@example.com", i),
                "Pediatrics",
                "Dr. Brown",
            ))
            .await
            .unwrap();
    }

    let first = service.page(1).await.unwrap();
    assert_eq!(first.total_items, 12);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.items[0].patient_name, "Patient 0");

    let last = service.page(3).await.unwrap();
    assert_eq!(last.items.len(), 2);
    assert_eq!(last.items[1].patient_name, "Patient 11");

    // Past the end clamps to the last page
    let clamped = service.page(9).await.unwrap();
    assert_eq!(clamped.number, 3);
}

#[tokio::test]
async fn test_empty_listing_has_no_pages() {
    let (_dir, _store, service) = setup().await;

    let page = service.page(1).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn test_listing_joins_names() {
    let (_dir, _store, service) = setup().await;

    service
        .book(&form("Ana Diaz", "ana@example.com", "Orthopedics", "Dr. Williams"))
        .await
        .unwrap();

    let rows = service.list_appointments().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].patient_name, "Ana Diaz");
    assert_eq!(rows[0].department, "Orthopedics");
    assert_eq!(rows[0].doctor, "Dr. Williams");
    assert_eq!(rows[0].email, "ana@example.com");
}

#[tokio::test]
async fn test_verification_gate() {
    let (_dir, _store, service) = setup().await;

    let booking = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .unwrap();
    let id = booking.appointment.id;

    let wrong = Credentials {
        email: "someone@example.com".to_string(),
        phone: "5551234567".to_string(),
    };
    assert!(matches!(
        service.verify(id, &wrong).await,
        Err(BookingError::VerificationFailed)
    ));

    let wrong_phone = Credentials {
        email: "ana@example.com".to_string(),
        phone: "5550000000".to_string(),
    };
    assert!(service.verify(id, &wrong_phone).await.is_err());

    let right = Credentials {
        email: "ana@example.com".to_string(),
        phone: "5551234567".to_string(),
    };
    let view = service.verify(id, &right).await.unwrap();
    assert_eq!(view.id, id);
}

#[tokio::test]
async fn test_rebooking_with_new_phone_verifies_with_that_phone() {
    let (_dir, store, service) = setup().await;

    let mut first_form = form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith");
    first_form.phone = "1111111111".to_string();
    let first = service.book(&first_form).await.unwrap();

    let mut second_form = form("Ana Diaz", "ana@example.com", "Neurology", "Dr. Williams");
    second_form.phone = "2222222222".to_string();
    let second = service.book(&second_form).await.unwrap();
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(count(&store, "users").await, 1);

    let credentials = |phone: &str| Credentials {
        email: "ana@example.com".to_string(),
        phone: phone.to_string(),
    };
    assert!(service
        .verify(second.appointment.id, &credentials("2222222222"))
        .await
        .is_ok());
    assert!(service
        .verify(first.appointment.id, &credentials("1111111111"))
        .await
        .is_ok());
    assert!(matches!(
        service
            .verify(second.appointment.id, &credentials("1111111111"))
            .await,
        Err(BookingError::VerificationFailed)
    ));

    // The phone stays with the appointment through an edit.
    let edit = EditForm {
        day: "Friday".to_string(),
        department_id: "1".to_string(),
        doctor_id: "1".to_string(),
    };
    let updated = service.update(second.appointment.id, &edit).await.unwrap();
    assert_eq!(updated.phone.as_deref(), Some("2222222222"));
}

#[tokio::test]
async fn test_update_rewrites_appointment() {
    let (_dir, store, service) = setup().await;

    let booking = service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .unwrap();

    let edit = EditForm {
        day: "Saturday".to_string(),
        department_id: "3".to_string(),
        doctor_id: "2".to_string(),
    };
    let updated = service.update(booking.appointment.id, &edit).await.unwrap();
    assert_eq!(updated.day, "Saturday");
    assert_eq!(updated.department_id, RecordId(3));
    assert_eq!(updated.user_id, booking.user.id);

    let stored = store
        .get("appointments", booking.appointment.id.get())
        .await
        .unwrap();
    assert_eq!(stored["doctor_id"], 2);
}

#[tokio::test]
async fn test_booking_survives_reopen() {
    let (dir, _store, service) = setup().await;

    service
        .book(&form("Ana Diaz", "ana@example.com", "Cardiology", "Dr. Smith"))
        .await
        .unwrap();

    let reopened = JsonStore::open(dir.path().join("db.json")).await.unwrap();
    assert_eq!(count(&reopened, "appointments").await, 1);
    assert_eq!(count(&reopened, "users").await, 1);
}
