//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temp downloads root, a stub
//! decoder script, and a full [`AppContext`]. The [`TestHarness::serve`]
//! helper starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use vg_core::config::Config;
use vg_fetch::{JobStore, JobStoreOptions};
use vg_server::{build_router, AppContext};

/// Stub body that locates the `--output` template and writes one file next
/// to it, like a decoder that picked its own filename.
pub const STUB_WRITE_ONE: &str = r#"out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
dir=$(dirname "$out")
printf 'media-bytes' > "$dir/clip.mp3""#;

/// Stub body for a decoder that fails outright.
pub const STUB_EXIT_NONZERO: &str = "echo boom >&2\nexit 1";

/// Stub body for a decoder that succeeds without producing output.
pub const STUB_NO_OUTPUT: &str = "exit 0";

/// Write an executable stub decoder script into `dir`.
pub fn stub_decoder(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("stub-decoder.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("failed to write stub decoder");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to chmod stub decoder");
    }

    path
}

/// Second-scale store options so tests never wait on real retention windows.
pub fn test_options() -> JobStoreOptions {
    JobStoreOptions {
        decoder_timeout: Duration::from_secs(10),
        retention: Duration::from_secs(60),
        post_fetch_linger: Duration::from_secs(60),
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temp downloads root and a stub decoder.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<JobStore>,
    /// Keeps the temp workspace (downloads root + stub decoder) alive.
    pub workspace: TempDir,
}

impl TestHarness {
    /// Default harness: default config, stub decoder that writes one file.
    pub fn new() -> Self {
        Self::with_stub(STUB_WRITE_ONE)
    }

    /// Harness with a custom stub decoder body.
    pub fn with_stub(stub_body: &str) -> Self {
        Self::build(Config::default(), stub_body, test_options())
    }

    /// Harness with custom config (e.g. resolver backend, mock base URLs).
    pub fn with_config(config: Config) -> Self {
        Self::build(config, STUB_WRITE_ONE, test_options())
    }

    /// Fully custom harness.
    pub fn build(mut config: Config, stub_body: &str, options: JobStoreOptions) -> Self {
        let workspace = tempfile::tempdir().expect("failed to create temp workspace");
        let decoder = stub_decoder(workspace.path(), stub_body);
        config.downloads.root = workspace.path().join("downloads");

        let store = Arc::new(
            JobStore::new(config.downloads.root.clone(), decoder, options)
                .expect("failed to create job store"),
        );
        let ctx = AppContext::new(Arc::new(config), store.clone());

        Self {
            ctx,
            store,
            workspace,
        }
    }

    /// The downloads root this harness's store writes into.
    pub fn downloads_root(&self) -> &Path {
        &self.ctx.config.downloads.root
    }

    /// Number of job directories currently on disk.
    pub fn dir_count(&self) -> usize {
        std::fs::read_dir(self.downloads_root())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Default harness, served.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Custom-stub harness, served.
    pub async fn with_server_stub(stub_body: &str) -> (Self, SocketAddr) {
        Self::with_stub(stub_body).serve().await
    }

    /// Custom-config harness, served.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        Self::with_config(config).serve().await
    }
}
