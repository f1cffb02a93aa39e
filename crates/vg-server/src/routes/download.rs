//! Download submission handler.
//!
//! `POST /download` either runs the local decoder through the job store and
//! returns a `/file/{id}` handle, or -- with the resolver backend -- proxies
//! resolution to the external download API and returns a direct URL.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use vg_core::config::BackendMode;
use vg_fetch::{DownloadRequest, MediaFormat};

use crate::context::AppContext;
use crate::error::AppError;
use crate::oembed::VideoInfo;

/// Request body for a download submission.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DownloadRequestBody {
    pub url: String,
    /// "audio" or "video".
    pub format: String,
}

/// Download response. `download_handle` is set by the local backend,
/// `download_url` and `video_info` by the resolver backend.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DownloadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
}

/// POST /download
#[utoipa::path(
    post,
    path = "/download",
    request_body = DownloadRequestBody,
    responses(
        (status = 200, description = "Download ready", body = DownloadResponse),
        (status = 400, description = "Unrecognized URL or unsupported format"),
        (status = 502, description = "Conversion or upstream failure"),
        (status = 504, description = "Decoder timed out")
    )
)]
pub async fn submit_download(
    State(ctx): State<AppContext>,
    Json(payload): Json<DownloadRequestBody>,
) -> Result<Json<DownloadResponse>, AppError> {
    // Both validations run before any subprocess, directory, or upstream
    // call, so a rejected request has zero side effects.
    let format: MediaFormat = payload.format.parse()?;

    match ctx.config.backend.mode {
        BackendMode::Local => {
            let job = ctx
                .store
                .submit(DownloadRequest {
                    source_url: payload.url,
                    format,
                })
                .await?;

            let filename = job
                .output_path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("{}.{}", job.id, format.extension()));

            Ok(Json(DownloadResponse {
                success: true,
                download_handle: Some(format!("/file/{}", job.id)),
                download_url: None,
                filename,
                video_info: None,
            }))
        }
        BackendMode::Resolver => {
            vg_fetch::source::validate_source_url(&payload.url)?;

            let info = ctx.oembed.video_info(&payload.url).await?;
            let resolved = ctx.resolver.resolve(&payload.url, format).await?;
            let filename = format!("{}.{}", sanitize_filename(&info.title), format.extension());

            Ok(Json(DownloadResponse {
                success: true,
                download_handle: None,
                download_url: Some(resolved.url),
                filename,
                video_info: Some(info),
            }))
        }
    }
}

/// Replace every non-alphanumeric character with `_` so a video title is
/// safe to use in a Content-Disposition filename.
pub(crate) fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
