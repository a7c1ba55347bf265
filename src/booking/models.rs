// Record shapes stored in the four collections, plus the joined dashboard row.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Positive integer id assigned by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// Hand-edited data files sometimes carry ids as strings.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(Self(id)),
            RawId::Text(text) => text
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid record id `{}`", text))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Days offered on the booking form; the clinic does not book Sundays.
    pub const BOOKABLE: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weekday `{0}`")]
pub struct UnknownWeekday(pub String);

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownWeekday(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub image: String,
}

/// Stored appointment. Fields this crate does not know about are carried in
/// `extra` so a full-record PUT does not drop them.
///
/// `phone` is the number given when this appointment was booked; the same
/// patient may book again with a different one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: RecordId,
    pub user_id: RecordId,
    pub day: String,
    pub department_id: RecordId,
    pub doctor_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub user_id: RecordId,
    pub day: String,
    pub department_id: RecordId,
    pub doctor_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

pub const UNKNOWN: &str = "Unknown";

/// One dashboard row: an appointment left-joined to its user, department and
/// doctor. Missing names read "Unknown"; missing contact fields are empty.
/// The phone comes from the appointment, falling back to the user's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentView {
    pub id: RecordId,
    pub user_id: RecordId,
    pub patient_name: String,
    pub email: String,
    pub phone: String,
    pub day: String,
    pub department: String,
    pub doctor: String,
}

impl AppointmentView {
    pub fn join(
        appointment: &Appointment,
        user: Option<&User>,
        department: Option<&Department>,
        doctor: Option<&Doctor>,
    ) -> Self {
        Self {
            id: appointment.id,
            user_id: appointment.user_id,
            patient_name: user.map_or_else(|| UNKNOWN.to_string(), |u| u.name.clone()),
            email: user.map(|u| u.email.clone()).unwrap_or_default(),
            phone: appointment
                .phone
                .clone()
                .filter(|phone| !phone.is_empty())
                .or_else(|| user.and_then(|u| u.phone.clone()))
                .unwrap_or_default(),
            day: appointment.day.clone(),
            department: department.map_or_else(|| UNKNOWN.to_string(), |d| d.name.clone()),
            doctor: doctor.map_or_else(|| UNKNOWN.to_string(), |d| d.name.clone()),
        }
    }
}
