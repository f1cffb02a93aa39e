//! Axum router construction.
//!
//! Builds the application router with all routes, middleware layers, and
//! the Swagger UI.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::download::submit_download,
        routes::info::video_info,
        routes::file::fetch_file,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::download::DownloadRequestBody,
        routes::download::DownloadResponse,
        routes::info::InfoRequest,
        routes::info::InfoResponse,
        crate::oembed::VideoInfo,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/download", post(routes::download::submit_download))
        .route("/info", post(routes::info::video_info))
        .route("/file/{id}", get(routes::file::fetch_file))
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
