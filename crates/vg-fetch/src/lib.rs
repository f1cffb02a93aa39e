//! # vg-fetch
//!
//! Decoder execution and the ephemeral job store for vidgrab.
//!
//! This crate provides:
//!
//! - **Source validation** ([`source`]) -- recognize video-host URLs and
//!   extract video ids before anything touches a subprocess.
//! - **Command execution** ([`DecoderCommand`]) -- async builder with timeout
//!   support for running the external decoder.
//! - **Decoder discovery** ([`tools`]) -- resolve the decoder binary from
//!   config or `PATH` and probe its version.
//! - **Job store** ([`JobStore`]) -- the full artifact lifecycle: submit,
//!   fetch, and age-based sweep.

pub mod command;
pub mod format;
pub mod source;
pub mod store;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{DecoderCommand, DecoderOutput};
pub use format::MediaFormat;
pub use store::{
    start_sweep_task, DownloadRequest, Job, JobStatus, JobStore, JobStoreOptions, SweepStats,
};
pub use tools::{check_decoder, resolve_decoder, DecoderInfo, DEFAULT_DECODER};
