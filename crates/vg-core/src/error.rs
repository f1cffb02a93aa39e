//! Unified error type for the vidgrab application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in vidgrab.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request failed validation before any side effect occurred.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "job", "file").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The external decoder exited with a non-zero status.
    #[error("Conversion failed [{tool}]: {message}")]
    ConversionFailed {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The external decoder exceeded its wall-clock budget and was killed.
    #[error("Tool [{tool}] timed out after {seconds}s")]
    Timeout {
        /// Name of the tool that timed out.
        tool: String,
        /// The timeout budget in seconds.
        seconds: u64,
    },

    /// The decoder reported success but produced no discoverable output.
    #[error("No artifact produced for job {id}")]
    ArtifactMissing {
        /// The job whose output directory came up empty.
        id: String,
    },

    /// An upstream HTTP service (oEmbed, resolver) failed.
    #[error("Upstream error [{service}]: {message}")]
    Upstream {
        /// Name of the upstream service.
        service: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::NotFound { .. } => 404,
            Error::ConversionFailed { .. } => 502,
            Error::Timeout { .. } => 504,
            Error::ArtifactMissing { .. } => 502,
            Error::Upstream { .. } => 502,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::ConversionFailed`].
    pub fn conversion(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConversionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Upstream`].
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
