use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::booking::{Department, Doctor};
use crate::routes::html::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/departments.html")]
struct DepartmentsTemplate {
    departments: Vec<Department>,
    error: String,
}

#[derive(Template)]
#[template(path = "pages/doctors.html")]
struct DoctorsTemplate {
    doctors: Vec<Doctor>,
    error: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/department", get(departments))
        .route("/doctor", get(doctors))
}

async fn departments(State(state): State<AppState>) -> Response {
    match state.booking.departments().await {
        Ok(departments) => Html::new(DepartmentsTemplate {
            departments,
            error: String::new(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to load departments: {}", e);
            let page = DepartmentsTemplate {
                departments: Vec::new(),
                error: "Could not load departments. Please try again later.".to_string(),
            };
            Html::with_status(StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

async fn doctors(State(state): State<AppState>) -> Response {
    match state.booking.doctors().await {
        Ok(doctors) => Html::new(DoctorsTemplate {
            doctors,
            error: String::new(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to load doctors: {}", e);
            let page = DoctorsTemplate {
                doctors: Vec::new(),
                error: "Could not load doctors. Please try again later.".to_string(),
            };
            Html::with_status(StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}
