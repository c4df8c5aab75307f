//! Internal-page handlers: the HTTP face of the scheme dispatcher.
//!
//! `GET /pages/{page}` maps to `lumen://{page}` and
//! `GET /pages/{page}/{*path}` to `lumen://{page}/{path}`; the page name
//! becomes the request host and the remainder the request path, exactly
//! the split the dispatcher resolves against.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::app_state::AppState;
use crate::domain::PageRequest;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /pages/{page}` — Render an internal page.
///
/// # Errors
///
/// Returns [`GatewayError`] when no handler resolves or the handler
/// fails.
#[utoipa::path(
    get,
    path = "/pages/{page}",
    tag = "Pages",
    summary = "Render an internal page",
    description = "Resolves the page name against the handler registry and returns the rendered bytes with an inferred content type.",
    params(("page" = String, Path, description = "Internal page name, e.g. `version`")),
    responses(
        (status = 200, description = "Rendered page", body = String),
        (status = 404, description = "No handler for the page", body = ErrorResponse),
    )
)]
pub async fn serve_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Response, GatewayError> {
    serve(&state, &page, String::new()).await
}

/// `GET /pages/{page}/{*path}` — Render a sub-resource of an internal page.
///
/// # Errors
///
/// Returns [`GatewayError`] when no handler resolves or the handler
/// fails.
#[utoipa::path(
    get,
    path = "/pages/{page}/{path}",
    tag = "Pages",
    summary = "Render an internal page sub-resource",
    description = "Like `/pages/{page}`, with the remaining path forwarded to the handler (e.g. a documentation file under `help`).",
    params(
        ("page" = String, Path, description = "Internal page name"),
        ("path" = String, Path, description = "Resource path forwarded to the handler"),
    ),
    responses(
        (status = 200, description = "Rendered page", body = String),
        (status = 403, description = "Handler refused the request", body = ErrorResponse),
        (status = 404, description = "No handler or missing resource", body = ErrorResponse),
    )
)]
pub async fn serve_page_path(
    State(state): State<AppState>,
    Path((page, path)): Path<(String, String)>,
) -> Result<Response, GatewayError> {
    serve(&state, &page, format!("/{path}")).await
}

async fn serve(state: &AppState, page: &str, path: String) -> Result<Response, GatewayError> {
    let url = format!("lumen://{page}{path}");
    let request = PageRequest::new(url, page, path);
    let payload = state.dispatcher.dispatch(request).await?;
    Ok(([(header::CONTENT_TYPE, payload.mime_type)], payload.data).into_response())
}

/// Page routes mounted at the root level (not under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pages/{page}", get(serve_page))
        .route("/pages/{page}/{*path}", get(serve_page_path))
}
