pub mod models;
pub mod pagination;
pub mod service;
pub mod validation;
pub mod verify;

pub use models::{Appointment, AppointmentView, Department, Doctor, RecordId, User, Weekday};
pub use pagination::{paginate, Page};
pub use service::{Booking, BookingError, BookingService, Deletion, EditContext, UserCleanup};
pub use validation::{BookingForm, EditForm, FieldErrors};
pub use verify::{Credentials, VerifyAction};
