//! Save command handlers: batch save and saveable listing.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{SaveReportDto, SaveRequest, SaveableDto};
use crate::app_state::AppState;

/// `POST /save` — Save registered resources.
///
/// An empty `what` saves everything with implicit semantics; naming
/// resources saves exactly those explicitly, bypassing autosave gates.
/// Unknown names and per-resource failures land in the report's
/// `errors` without aborting the batch.
#[utoipa::path(
    post,
    path = "/api/v1/save",
    tag = "Save",
    summary = "Save registered resources",
    description = "Runs a batch save. With no names every registered saveable is targeted implicitly; with names, exactly those are saved explicitly. Partial failures are reported per resource.",
    request_body = SaveRequest,
    responses(
        (status = 200, description = "Batch save report", body = SaveReportDto),
    )
)]
pub async fn save_command(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> impl IntoResponse {
    let names = if req.what.is_empty() {
        None
    } else {
        Some(req.what.as_slice())
    };
    let report = state.save_manager.save_all(names, false).await;
    Json(SaveReportDto::from(report))
}

/// `GET /saveables` — List registered saveables with their flags.
#[utoipa::path(
    get,
    path = "/api/v1/saveables",
    tag = "Save",
    summary = "List registered saveables",
    description = "Returns every registered saveable with its dirty and save-on-exit flags.",
    responses(
        (status = 200, description = "Registered saveables", body = Vec<SaveableDto>),
    )
)]
pub async fn list_saveables(State(state): State<AppState>) -> impl IntoResponse {
    let saveables: Vec<SaveableDto> = state
        .save_manager
        .registry()
        .list()
        .await
        .into_iter()
        .map(SaveableDto::from)
        .collect();
    Json(saveables)
}

/// Composes the save routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(save_command))
        .route("/saveables", get(list_saveables))
}
