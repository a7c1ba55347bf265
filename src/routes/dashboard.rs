use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::booking::{
    paginate, AppointmentView, BookingError, Credentials, Page, RecordId, UserCleanup,
    VerifyAction,
};
use crate::error::AppResult;
use crate::routes::html::Html;
use crate::routes::notice::{redirect_with, Notice};
use crate::state::AppState;

#[derive(Deserialize)]
struct DashboardQuery {
    page: Option<usize>,
    notice: Option<String>,
}

#[derive(Deserialize)]
struct VerifyQuery {
    action: VerifyAction,
}

#[derive(Deserialize)]
struct VerifyForm {
    action: VerifyAction,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

struct PageLink {
    number: usize,
    current: bool,
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
struct DashboardTemplate {
    page: Page<AppointmentView>,
    links: Vec<PageLink>,
    notice: Option<Notice>,
    error: String,
}

#[derive(Template)]
#[template(path = "pages/verify.html")]
struct VerifyTemplate {
    appointment: AppointmentView,
    action: VerifyAction,
    email: String,
    error: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/verify/{id}", get(verify_page).post(verify))
}

fn page_links<T>(page: &Page<T>) -> Vec<PageLink> {
    (1..=page.total_pages)
        .map(|number| PageLink {
            number,
            current: number == page.number,
        })
        .collect()
}

/// Appointment table, one page at a time.
async fn dashboard(State(state): State<AppState>, Query(query): Query<DashboardQuery>) -> Response {
    let notice = query.notice.as_deref().and_then(Notice::from_query);

    match state.booking.page(query.page.unwrap_or(1)).await {
        Ok(page) => Html::new(DashboardTemplate {
            links: page_links(&page),
            page,
            notice,
            error: String::new(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch appointments: {}", e);
            let page = paginate(Vec::new(), 1, state.booking.page_size());
            let template = DashboardTemplate {
                links: Vec::new(),
                page,
                notice,
                error: "Failed to fetch appointments".to_string(),
            };
            Html::with_status(StatusCode::BAD_GATEWAY, template).into_response()
        }
    }
}

async fn verify_page(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Response> {
    let appointment = state.booking.appointment_view(RecordId(id)).await?;
    Ok(Html::new(VerifyTemplate {
        appointment,
        action: query.action,
        email: String::new(),
        error: String::new(),
    })
    .into_response())
}

/// Check the re-entered details, then continue to the edit form or delete.
async fn verify(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<VerifyForm>,
) -> AppResult<Response> {
    let id = RecordId(id);
    let credentials = Credentials {
        email: form.email,
        phone: form.phone,
    };

    match state.booking.verify(id, &credentials).await {
        Ok(_) => {}
        Err(BookingError::VerificationFailed) => {
            let appointment = state.booking.appointment_view(id).await?;
            let page = VerifyTemplate {
                appointment,
                action: form.action,
                email: credentials.email,
                error: BookingError::VerificationFailed.to_string(),
            };
            let page = Html::with_status(StatusCode::UNPROCESSABLE_ENTITY, page);
            return Ok(page.into_response());
        }
        Err(e) => return Err(e.into()),
    }

    match form.action {
        VerifyAction::Edit => {
            Ok(redirect_with(&format!("/appointments/{}", id), Notice::Verified).into_response())
        }
        VerifyAction::Delete => {
            let deletion = state.booking.delete(id).await?;
            let notice = match deletion.user_cleanup {
                UserCleanup::Failed(_) => Notice::CleanupFailed,
                UserCleanup::Removed | UserCleanup::Retained => Notice::Deleted,
            };
            Ok(redirect_with("/dashboard", notice).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_links_mark_current_page() {
        let page = paginate((1..=11).collect::<Vec<u32>>(), 2, 5);
        let links = page_links(&page);
        assert_eq!(links.len(), 3);
        assert!(links[1].current);
        assert!(!links[0].current && !links[2].current);
    }

    #[test]
    fn no_links_without_items() {
        let page = paginate(Vec::<u32>::new(), 1, 5);
        assert!(page_links(&page).is_empty());
    }
}
