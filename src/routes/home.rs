use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::booking::{Department, Doctor};
use crate::routes::html::Html;
use crate::state::AppState;

/// Landing page: the hero, then the department and doctor grids.
#[derive(Template)]
#[template(path = "pages/home.html")]
struct HomeTemplate {
    departments: Vec<Department>,
    doctors: Vec<Doctor>,
    error: String,
}

#[derive(Template)]
#[template(path = "pages/about.html")]
struct AboutTemplate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/home", get(index))
        .route("/about", get(about))
}

async fn index(State(state): State<AppState>) -> Response {
    match state.booking.booking_options().await {
        Ok((departments, doctors)) => Html::new(HomeTemplate {
            departments,
            doctors,
            error: String::new(),
        })
        .into_response(),
        // The hero still renders without the grids.
        Err(e) => {
            tracing::error!("Failed to load home page directory: {}", e);
            let page = HomeTemplate {
                departments: Vec::new(),
                doctors: Vec::new(),
                error: "Could not load departments and doctors. Please try again later."
                    .to_string(),
            };
            Html::with_status(StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

async fn about() -> Html<AboutTemplate> {
    Html::new(AboutTemplate)
}
