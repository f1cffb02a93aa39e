//! # vg-server
//!
//! HTTP layer for vidgrab: router, route handlers, error-to-response
//! conversion, and the upstream clients (oEmbed metadata, cobalt-style
//! download resolution).

pub mod context;
pub mod error;
pub mod oembed;
pub mod resolver;
pub mod router;
pub mod routes;

// ---- Re-exports for convenience ----

pub use context::AppContext;
pub use error::AppError;
pub use oembed::{OembedClient, VideoInfo};
pub use resolver::{ResolvedDownload, ResolverClient};
pub use router::build_router;
