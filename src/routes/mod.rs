pub mod api;
pub mod appointments;
pub mod assets;
pub mod dashboard;
pub mod directory;
pub mod home;
pub mod html;
pub mod notice;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Page routes, plus the record store's REST surface when this process owns
/// the data file and is configured to expose it.
pub fn app(state: AppState) -> Router {
    let pages = Router::new()
        .merge(home::router())
        .merge(directory::router())
        .merge(appointments::router())
        .merge(dashboard::router())
        .route("/assets/{*path}", get(assets::serve))
        .with_state(state.clone());

    let app = match &state.store {
        Some(store) if state.config.store.serve_api => pages.merge(api::router(store.clone())),
        _ => pages,
    };

    app.layer(TraceLayer::new_for_http())
}
