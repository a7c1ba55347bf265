use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::booking::BookingError;
use crate::provider::ProviderError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Store(e) => store_status(e),
            AppError::Booking(e) => booking_status(e),
        };

        (status, message).into_response()
    }
}

fn store_status(err: StoreError) -> (StatusCode, String) {
    match err {
        StoreError::UnknownCollection(_) | StoreError::RecordNotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        StoreError::DuplicateId { .. } => (StatusCode::CONFLICT, err.to_string()),
        StoreError::InvalidRecord(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Malformed(_) | StoreError::Io(_) | StoreError::Json(_) => {
            tracing::error!("Store error: {}", err);
            internal()
        }
    }
}

fn booking_status(err: BookingError) -> (StatusCode, String) {
    match err {
        BookingError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        BookingError::Invalid(_)
        | BookingError::UnknownDepartment(_)
        | BookingError::UnknownDoctor(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        BookingError::VerificationFailed => (StatusCode::FORBIDDEN, err.to_string()),
        BookingError::Provider(ProviderError::Transport(e)) => {
            tracing::error!("Resource provider unreachable: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Resource provider unavailable".to_string(),
            )
        }
        BookingError::Provider(e) => {
            tracing::error!("Resource provider error: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Resource provider error".to_string(),
            )
        }
        BookingError::Malformed { .. } => {
            tracing::error!("{}", err);
            internal()
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::RecordId;
    use crate::provider::Collection;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn malformed_store_returns_500() {
        assert_eq!(
            response_status(StoreError::Malformed("not an object".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_map_to_client_statuses() {
        assert_eq!(
            response_status(StoreError::UnknownCollection("nurses".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            response_status(
                StoreError::DuplicateId {
                    collection: "users".into(),
                    id: 1
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            response_status(StoreError::InvalidRecord("not an object".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn booking_errors_map_to_statuses() {
        assert_eq!(
            response_status(
                BookingError::NotFound {
                    collection: Collection::Appointments,
                    id: RecordId(3)
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            response_status(BookingError::VerificationFailed.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            response_status(
                BookingError::Provider(ProviderError::Rejected {
                    status: 500,
                    message: "boom".into()
                })
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }
}
