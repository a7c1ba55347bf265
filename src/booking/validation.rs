use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

use super::models::{RecordId, Weekday};

/// Error code of the "field is empty" rule. It wins over every other rule
/// reported for the same field.
const REQUIRED: &str = "required";

/// Booking form fields in the order their messages are reported.
const BOOKING_FIELDS: [&str; 6] = ["name", "email", "phone", "day", "department", "doctor"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: Cow<'static, str>,
}

/// Per-field messages collected while validating a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<Cow<'static, str>>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_ref()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// One message per booking field: the `required` one when present,
/// otherwise the first rule that failed.
impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let by_field = errors.field_errors();
        let mut out = FieldErrors::default();

        for field in BOOKING_FIELDS {
            let Some(failed) = by_field.get(field) else {
                continue;
            };
            let chosen = failed
                .iter()
                .find(|e| e.code == REQUIRED)
                .or_else(|| failed.first());
            if let Some(error) = chosen {
                let message = error.message.clone().unwrap_or_else(|| error.code.clone());
                out.push(field, message);
            }
        }
        out
    }
}

/// Raw booking form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookingForm {
    #[serde(default)]
    #[validate(length(min = 1, code = "required", message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, code = "required", message = "Email is required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(equal = 10, message = "Phone number must be 10 digits"),
        custom(function = "phone_digits")
    )]
    pub phone: String,
    #[serde(default)]
    #[validate(custom(function = "known_weekday"))]
    pub day: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required", message = "Please select a department"))]
    pub department: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required", message = "Please select a doctor"))]
    pub doctor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub day: Weekday,
    pub department: String,
    pub doctor: String,
}

impl BookingForm {
    /// Trim every field, run the field rules, and hand back the typed booking.
    pub fn check(&self) -> Result<ValidBooking, FieldErrors> {
        let form = self.trimmed();
        Validate::validate(&form)?;

        let day = form.day.parse::<Weekday>().map_err(|_| {
            let mut errors = FieldErrors::default();
            errors.push("day", "Please select a valid day");
            errors
        })?;

        Ok(ValidBooking {
            name: form.name,
            email: form.email,
            phone: form.phone,
            day,
            department: form.department,
            doctor: form.doctor,
        })
    }

    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            day: self.day.trim().to_string(),
            department: self.department.trim().to_string(),
            doctor: self.doctor.trim().to_string(),
        }
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn phone_digits(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(rule(REQUIRED, "Phone number is required"));
    }
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(rule("digits", "Phone number must be 10 digits"));
    }
    Ok(())
}

fn known_weekday(day: &str) -> Result<(), ValidationError> {
    if day.is_empty() {
        return Err(rule(REQUIRED, "Please select a day"));
    }
    if day.parse::<Weekday>().is_err() {
        return Err(rule("weekday", "Please select a valid day"));
    }
    Ok(())
}

/// Raw edit form. Department and doctor arrive as ids from the selects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub department_id: String,
    #[serde(default)]
    pub doctor_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidEdit {
    pub day: Weekday,
    pub department_id: RecordId,
    pub doctor_id: RecordId,
}

impl EditForm {
    pub fn validate(&self) -> Result<ValidEdit, FieldErrors> {
        let mut errors = FieldErrors::default();

        let day = self.day.parse::<Weekday>().ok();
        if day.is_none() {
            errors.push("day", "Please select a day");
        }

        let department_id = self.department_id.parse::<RecordId>().ok();
        if department_id.is_none() {
            errors.push("department_id", "Please select a department");
        }

        let doctor_id = self.doctor_id.parse::<RecordId>().ok();
        if doctor_id.is_none() {
            errors.push("doctor_id", "Please select a doctor");
        }

        match (day, department_id, doctor_id) {
            (Some(day), Some(department_id), Some(doctor_id)) => Ok(ValidEdit {
                day,
                department_id,
                doctor_id,
            }),
            _ => Err(errors),
        }
    }
}
