//! Artifact streaming handler.
//!
//! Serves a Ready job's artifact in 64KB chunks via `ReaderStream` so memory
//! stays bounded regardless of file size.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use vg_core::{Error, JobId};

use crate::context::AppContext;
use crate::error::AppError;

/// Guess the MIME type from the artifact's file extension.
pub(crate) fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("");

    match ext {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "opus" | "ogg" => "audio/ogg",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// GET /file/{id}
#[utoipa::path(
    get,
    path = "/file/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Artifact bytes"),
        (status = 404, description = "Unknown, not-ready, or expired job")
    )
)]
pub async fn fetch_file(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    // A malformed id can never name a job; same 404 as an unknown one.
    let job_id: JobId = id
        .parse()
        .map_err(|_| Error::not_found("job", &id))?;

    let (job, path) = ctx.store.fetch(job_id)?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| Error::not_found("job", job_id))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| Error::Internal(format!("artifact metadata: {e}")))?
        .len();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}", job.id));
    let content_type = guess_content_type(&file_name);

    tracing::info!(job_id = %job.id, filename = %file_name, "Streaming artifact");

    let stream = ReaderStream::with_capacity(file, 64 * 1024);
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE.as_str(), content_type.to_string()),
            (header::CONTENT_LENGTH.as_str(), file_size.to_string()),
            (
                header::CONTENT_DISPOSITION.as_str(),
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
