//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries all
//! sub-configs for the server, the downloads store, tools, and upstream
//! services. Every section defaults sensibly so a completely empty file is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub downloads: DownloadsConfig,
    pub tools: ToolsConfig,
    pub backend: BackendConfig,
    pub resolver: ResolverConfig,
    pub info: InfoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            downloads: DownloadsConfig::default(),
            tools: ToolsConfig::default(),
            backend: BackendConfig::default(),
            resolver: ResolverConfig::default(),
            info: InfoConfig::default(),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| Error::Internal(format!("config parse error: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from an explicit path, or probe the default
    /// locations, or fall back to defaults if no file exists.
    pub fn load_or_default(custom_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_path {
            return Self::load(path);
        }

        let default_paths = [
            "./vidgrab.toml",
            "~/.config/vidgrab/config.toml",
            "/etc/vidgrab/config.toml",
        ];

        for path_str in default_paths {
            let path = shellexpand::tilde(path_str);
            let path = Path::new(path.as_ref());
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.downloads.retention_mins == 0 {
            warnings.push(
                "downloads.retention_mins is 0; artifacts may be swept before pickup".into(),
            );
        }

        if let Some(ref path) = self.tools.decoder_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.decoder_path does not exist: {}",
                    path.display()
                ));
            }
        }

        if self.backend.mode == BackendMode::Resolver && self.resolver.base_url.is_empty() {
            warnings.push("backend.mode is 'resolver' but resolver.base_url is empty".into());
        }

        if self.info.oembed_base_url.is_empty() {
            warnings.push("info.oembed_base_url is empty; /info requests will fail".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Downloads store behaviour: where artifacts live and how long they live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadsConfig {
    /// Root directory holding one subdirectory per job.
    pub root: PathBuf,
    /// Wall-clock budget for a single decoder invocation.
    pub decoder_timeout_secs: u64,
    /// Age at which the sweep deletes a job directory, fetched or not.
    pub retention_mins: u64,
    /// Grace period granted after a successful fetch before the sweep may
    /// delete the artifact (tolerates retried or slow transfers).
    pub post_fetch_linger_mins: u64,
    /// Interval between sweep passes.
    pub sweep_interval_mins: u64,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./downloads"),
            decoder_timeout_secs: 300,
            retention_mins: 30,
            post_fetch_linger_mins: 10,
            sweep_interval_mins: 30,
        }
    }
}

impl DownloadsConfig {
    pub fn decoder_timeout(&self) -> Duration {
        Duration::from_secs(self.decoder_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_mins * 60)
    }

    pub fn post_fetch_linger(&self) -> Duration {
        Duration::from_secs(self.post_fetch_linger_mins * 60)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_mins * 60)
    }
}

/// External tool overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Explicit decoder binary path. When unset the decoder is located via
    /// `PATH` lookup.
    pub decoder_path: Option<PathBuf>,
}

/// Which download backend serves `POST /download`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
}

/// Download backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Run the local decoder binary and serve the artifact from disk.
    #[default]
    Local,
    /// Proxy resolution to the external download API; no local artifact.
    Resolver,
}

/// External download-resolution API ("cobalt"-style).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub base_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cobalt.tools".into(),
        }
    }
}

/// Video metadata lookup (oEmbed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub oembed_base_url: String,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            oembed_base_url: "https://www.youtube.com".into(),
        }
    }
}
