use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};

use crate::booking::{
    BookingError, BookingForm, Department, Doctor, EditForm, FieldErrors, RecordId, Weekday,
};
use crate::error::AppResult;
use crate::routes::html::Html;
use crate::routes::notice::{redirect_with, Notice, NoticeQuery};
use crate::state::AppState;

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn day_options(days: &[Weekday], selected: &str) -> Vec<SelectOption> {
    days.iter()
        .map(|day| SelectOption {
            value: day.to_string(),
            label: day.to_string(),
            selected: day.as_str() == selected,
        })
        .collect()
}

/// Booking selects are keyed by name; the provider resolves names to ids.
fn named_options<'a>(names: impl Iterator<Item = &'a str>, selected: &str) -> Vec<SelectOption> {
    names
        .map(|name| SelectOption {
            value: name.to_string(),
            label: name.to_string(),
            selected: name == selected,
        })
        .collect()
}

/// Edit selects are keyed by id.
fn id_options<'a>(
    entries: impl Iterator<Item = (RecordId, &'a str)>,
    selected: &str,
) -> Vec<SelectOption> {
    entries
        .map(|(id, name)| {
            let value = id.to_string();
            SelectOption {
                selected: value == selected,
                value,
                label: name.to_string(),
            }
        })
        .collect()
}

#[derive(Template)]
#[template(path = "pages/appointment_form.html")]
struct BookTemplate {
    form: BookingForm,
    errors: FieldErrors,
    days: Vec<SelectOption>,
    departments: Vec<SelectOption>,
    doctors: Vec<SelectOption>,
    error: String,
}

#[derive(Template)]
#[template(path = "pages/appointment_edit.html")]
struct EditTemplate {
    id: RecordId,
    errors: FieldErrors,
    days: Vec<SelectOption>,
    departments: Vec<SelectOption>,
    doctors: Vec<SelectOption>,
    error: String,
    notice: Option<Notice>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(booking_page).post(book))
        .route("/appointments/{id}", get(edit_page).post(update))
}

async fn booking_page(State(state): State<AppState>) -> Response {
    let page = booking_template(&state, BookingForm::default(), FieldErrors::default(), "").await;
    Html::new(page).into_response()
}

async fn book(State(state): State<AppState>, Form(form): Form<BookingForm>) -> Response {
    match state.booking.book(&form).await {
        Ok(_) => redirect_with("/dashboard", Notice::Booked).into_response(),
        Err(BookingError::Invalid(errors)) => {
            let page = booking_template(&state, form, errors, "").await;
            Html::with_status(StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
        }
        Err(e @ (BookingError::UnknownDepartment(_) | BookingError::UnknownDoctor(_))) => {
            tracing::warn!("Booking rejected: {}", e);
            let page = booking_template(
                &state,
                form,
                FieldErrors::default(),
                "Booking failed. Please try again.",
            )
            .await;
            Html::with_status(StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
        }
        Err(e) => {
            tracing::error!("Booking failed: {}", e);
            let page = booking_template(
                &state,
                form,
                FieldErrors::default(),
                "Booking failed. Please try again.",
            )
            .await;
            Html::with_status(StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

async fn booking_template(
    state: &AppState,
    form: BookingForm,
    errors: FieldErrors,
    error: &str,
) -> BookTemplate {
    let (departments, doctors, error) = match state.booking.booking_options().await {
        Ok((departments, doctors)) => (departments, doctors, error.to_string()),
        Err(e) => {
            tracing::error!("Failed to load booking options: {}", e);
            (
                Vec::<Department>::new(),
                Vec::<Doctor>::new(),
                "Could not load departments and doctors. Please try again later.".to_string(),
            )
        }
    };

    BookTemplate {
        days: day_options(&Weekday::BOOKABLE, &form.day),
        departments: named_options(departments.iter().map(|d| d.name.as_str()), &form.department),
        doctors: named_options(doctors.iter().map(|d| d.name.as_str()), &form.doctor),
        form,
        errors,
        error,
    }
}

async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<NoticeQuery>,
) -> AppResult<Response> {
    let id = RecordId(id);
    let context = state.booking.edit_context(id).await?;
    let appointment = &context.appointment;

    let page = EditTemplate {
        id,
        errors: FieldErrors::default(),
        days: day_options(&Weekday::ALL, &appointment.day),
        departments: id_options(
            context.departments.iter().map(|d| (d.id, d.name.as_str())),
            &appointment.department_id.to_string(),
        ),
        doctors: id_options(
            context.doctors.iter().map(|d| (d.id, d.name.as_str())),
            &appointment.doctor_id.to_string(),
        ),
        error: String::new(),
        notice: query.notice(),
    };
    Ok(Html::new(page).into_response())
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let id = RecordId(id);
    let (errors, error) = match state.booking.update(id, &form).await {
        Ok(_) => return Ok(redirect_with("/dashboard", Notice::Updated).into_response()),
        Err(BookingError::Invalid(errors)) => (errors, String::new()),
        Err(e @ (BookingError::UnknownDepartment(_) | BookingError::UnknownDoctor(_))) => {
            tracing::warn!("Update of appointment {} rejected: {}", id, e);
            (
                FieldErrors::default(),
                "Failed to update appointment".to_string(),
            )
        }
        Err(e) => return Err(e.into()),
    };

    // Re-render with what was submitted.
    let context = state.booking.edit_context(id).await?;
    let page = EditTemplate {
        id,
        errors,
        days: day_options(&Weekday::ALL, &form.day),
        departments: id_options(
            context.departments.iter().map(|d| (d.id, d.name.as_str())),
            &form.department_id,
        ),
        doctors: id_options(
            context.doctors.iter().map(|d| (d.id, d.name.as_str())),
            &form.doctor_id,
        ),
        error,
        notice: None,
    };
    Ok(Html::with_status(StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}
