// Transient notifications carried across a redirect in the `notice` query
// parameter and rendered once by the next page.
use axum::response::Redirect;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Booked,
    Updated,
    Deleted,
    Verified,
    CleanupFailed,
}

impl Notice {
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "booked" => Some(Notice::Booked),
            "updated" => Some(Notice::Updated),
            "deleted" => Some(Notice::Deleted),
            "verified" => Some(Notice::Verified),
            "cleanup-failed" => Some(Notice::CleanupFailed),
            _ => None,
        }
    }

    pub fn as_query(&self) -> &'static str {
        match self {
            Notice::Booked => "booked",
            Notice::Updated => "updated",
            Notice::Deleted => "deleted",
            Notice::Verified => "verified",
            Notice::CleanupFailed => "cleanup-failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::Booked => "Appointment booked successfully!",
            Notice::Updated => "Appointment updated successfully!",
            Notice::Deleted => "Appointment deleted successfully!",
            Notice::Verified => "Verification successful! You can now edit the appointment.",
            Notice::CleanupFailed => {
                "Appointment deleted, but the patient record could not be cleaned up."
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::CleanupFailed)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

impl NoticeQuery {
    pub fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::from_query)
    }
}

pub fn redirect_with(path: &str, notice: Notice) -> Redirect {
    Redirect::to(&format!("{}?notice={}", path, notice.as_query()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use axum::response::IntoResponse;

    #[test]
    fn query_values_round_trip() {
        for notice in [
            Notice::Booked,
            Notice::Updated,
            Notice::Deleted,
            Notice::Verified,
            Notice::CleanupFailed,
        ] {
            assert_eq!(Notice::from_query(notice.as_query()), Some(notice));
        }
        assert_eq!(Notice::from_query("<script>"), None);
    }

    #[test]
    fn redirect_carries_notice() {
        let response = redirect_with("/dashboard", Notice::Deleted).into_response();
        assert_eq!(
            response.headers()[header::LOCATION],
            "/dashboard?notice=deleted"
        );
    }
}
