//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`vg_core::Error`] so that route handlers
//! can return `Result<T, AppError>` directly. The JSON envelope carries a
//! `success` flag and a stable error code; raw subprocess diagnostics never
//! leave the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: vg_core::Error,
}

impl AppError {
    pub fn new(inner: vg_core::Error) -> Self {
        Self { inner }
    }

    /// The stable error code used in the response envelope.
    pub fn code(&self) -> &'static str {
        match &self.inner {
            vg_core::Error::InvalidRequest(_) => "InvalidRequest",
            vg_core::Error::NotFound { .. } => "NotFound",
            vg_core::Error::ConversionFailed { .. } => "ConversionFailed",
            vg_core::Error::Timeout { .. } => "Timeout",
            vg_core::Error::ArtifactMissing { .. } => "ArtifactMissing",
            vg_core::Error::Upstream { .. } => "Upstream",
            vg_core::Error::Io { .. } => "Internal",
            vg_core::Error::Internal(_) => "Internal",
        }
    }
}

impl From<vg_core::Error> for AppError {
    fn from(e: vg_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "success": false,
            "error": self.code(),
            "message": self.inner.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_produces_400() {
        let err = AppError::new(vg_core::Error::InvalidRequest("bad url".into()));
        assert_eq!(err.code(), "InvalidRequest");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_produces_404() {
        let err = AppError::new(vg_core::Error::not_found("job", "abc"));
        assert_eq!(err.code(), "NotFound");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conversion_produces_502() {
        let err = AppError::new(vg_core::Error::conversion("yt-dlp", "exit 1"));
        assert_eq!(err.code(), "ConversionFailed");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn timeout_produces_504() {
        let err = AppError::new(vg_core::Error::Timeout {
            tool: "yt-dlp".into(),
            seconds: 300,
        });
        assert_eq!(err.code(), "Timeout");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
