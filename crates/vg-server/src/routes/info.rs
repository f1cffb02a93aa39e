//! Video metadata handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;

/// Request body for a metadata lookup.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InfoRequest {
    pub url: String,
}

/// Metadata response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InfoResponse {
    pub success: bool,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
}

/// POST /info
#[utoipa::path(
    post,
    path = "/info",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Video metadata", body = InfoResponse),
        (status = 400, description = "Unrecognized video URL"),
        (status = 502, description = "Metadata service unavailable")
    )
)]
pub async fn video_info(
    State(ctx): State<AppContext>,
    Json(payload): Json<InfoRequest>,
) -> Result<Json<InfoResponse>, AppError> {
    // Reject bad URLs before touching the upstream service.
    vg_fetch::source::validate_source_url(&payload.url)?;

    let info = ctx.oembed.video_info(&payload.url).await?;

    Ok(Json(InfoResponse {
        success: true,
        title: info.title,
        author: info.author,
        thumbnail: info.thumbnail,
    }))
}
