use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// An askama page as an axum response. Renders with 200 unless built with
/// [`Html::with_status`].
pub struct Html<T: Template> {
    template: T,
    status: StatusCode,
}

impl<T: Template> Html<T> {
    pub fn new(template: T) -> Self {
        Self::with_status(StatusCode::OK, template)
    }

    /// A page shown with a non-200 status, e.g. a form re-rendered with errors.
    pub fn with_status(status: StatusCode, template: T) -> Self {
        Self { template, status }
    }
}

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(body) => (
                self.status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(
                    "Failed to render {}: {}",
                    std::any::type_name::<T>(),
                    e
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}
