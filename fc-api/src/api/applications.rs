//! Application allocation and fill-in endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use fc_common::allocator::allocate;
use fc_common::db::models::FilledApplication;
use fc_common::sanitize::RawApplication;
use fc_common::updater::{fill_in, find_unassigned};
use tracing::debug;

use super::ApiError;
use crate::AppState;

/// POST /applications
///
/// Allocates a new application number. Responds 201 with a `Location`
/// header naming the new resource and an empty body.
pub async fn create_application(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let id = allocate(state.store.as_ref(), state.ids.as_ref()).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, state.application_location(id))],
    ))
}

/// PUT /applications/:id
///
/// Fills in an allocated application exactly once. Invalid individual
/// fields are dropped rather than failing the request.
pub async fn submit_application(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<RawApplication>, JsonRejection>,
) -> Result<Json<FilledApplication>, ApiError> {
    // Unknown and already-submitted ids are reported before any complaint
    // about the body
    let id = find_unassigned(state.store.as_ref(), &raw_id).await?;

    let Json(body) = body.map_err(|rejection| {
        debug!(error = %rejection, "Rejected fill-in body");
        ApiError::BadRequest(rejection.body_text())
    })?;

    let filled = fill_in(state.store.as_ref(), id, &body).await?;
    Ok(Json(filled))
}

/// Build application routes
pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", post(create_application))
        .route("/applications/:id", put(submit_application))
}
