//! REST surface of the record store: plain CRUD over whatever collections the
//! data file holds. No validation beyond "the body is a JSON object".

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::AppResult;
use crate::store::{JsonStore, ListQuery};

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub fn router<S>(store: Arc<JsonStore>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/db", get(snapshot))
        .route("/api/{collection}", get(list).post(create))
        .route(
            "/api/{collection}/{id}",
            get(show).put(replace).patch(patch).delete(remove),
        )
        .layer(CorsLayer::permissive())
        .with_state(store)
}

async fn snapshot(State(store): State<Arc<JsonStore>>) -> Json<Value> {
    Json(store.snapshot().await)
}

async fn list(
    State(store): State<Arc<JsonStore>>,
    Path(collection): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<impl IntoResponse> {
    let query = ListQuery::from_pairs(params);
    let listing = store.list(&collection, &query).await?;
    Ok((
        [(TOTAL_COUNT_HEADER, listing.total.to_string())],
        Json(listing.records),
    ))
}

async fn show(
    State(store): State<Arc<JsonStore>>,
    Path((collection, id)): Path<(String, u64)>,
) -> AppResult<Json<Value>> {
    Ok(Json(store.get(&collection, id).await?))
}

async fn create(
    State(store): State<Arc<JsonStore>>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let record = store.insert(&collection, body).await?;
    tracing::info!("Created {}/{}", collection, record["id"]);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn replace(
    State(store): State<Arc<JsonStore>>,
    Path((collection, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    Ok(Json(store.replace(&collection, id, body).await?))
}

async fn patch(
    State(store): State<Arc<JsonStore>>,
    Path((collection, id)): Path<(String, u64)>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    Ok(Json(store.patch(&collection, id, body).await?))
}

async fn remove(
    State(store): State<Arc<JsonStore>>,
    Path((collection, id)): Path<(String, u64)>,
) -> AppResult<Json<Value>> {
    store.remove(&collection, id).await?;
    tracing::info!("Deleted {}/{}", collection, id);
    Ok(Json(json!({})))
}
