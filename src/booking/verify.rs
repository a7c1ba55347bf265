// Re-entry check in front of edit and delete. The record being compared is
// already in memory, so this only guards against slips, not attackers.
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::models::AppointmentView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyAction {
    Edit,
    Delete,
}

impl VerifyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyAction::Edit => "edit",
            VerifyAction::Delete => "delete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerifyAction::Edit => "Edit",
            VerifyAction::Delete => "Delete",
        }
    }
}

impl fmt::Display for VerifyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerifyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(VerifyAction::Edit),
            "delete" => Ok(VerifyAction::Delete),
            other => Err(format!("unknown action `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Byte-for-byte comparison against the joined record. The phone is only
/// compared when the record has one; an empty email never matches.
pub fn credentials_match(record: &AppointmentView, credentials: &Credentials) -> bool {
    if credentials.email.is_empty() || credentials.email != record.email {
        return false;
    }

    record.phone.is_empty() || credentials.phone == record.phone
}
