//! REST API layer: route handlers, DTOs, and router composition.
//!
//! The save command surface lives under `/api/v1`; internal pages and
//! the health check are mounted at the root level.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the gateway's REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::pages::serve_page,
        handlers::pages::serve_page_path,
        handlers::save::save_command,
        handlers::save::list_saveables,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::SaveRequest,
        dto::SaveReportDto,
        dto::SaveErrorDto,
        dto::SaveableDto,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Pages", description = "Internal page rendering"),
        (name = "Save", description = "Save coordination"),
        (name = "System", description = "Health and metadata"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(handlers::pages::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
