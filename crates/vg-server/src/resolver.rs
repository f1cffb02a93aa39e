//! External download-resolution API client ("cobalt"-style).
//!
//! The proxy backend posts the source URL plus codec preferences and gets
//! back a direct download URL. The wire contract is loose -- a `status`
//! string plus optional `url`/`text` -- so anything other than
//! `success`/`redirect` with a URL is treated as an upstream failure.

use serde::{Deserialize, Serialize};
use vg_core::{Error, Result};
use vg_fetch::MediaFormat;

/// A resolved direct-download location.
#[derive(Debug, Clone)]
pub struct ResolvedDownload {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequestBody<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    v_codec: Option<&'a str>,
    v_quality: &'a str,
    a_format: &'a str,
    is_audio_only: bool,
}

#[derive(Debug, Deserialize)]
struct ResolveResponseBody {
    status: String,
    url: Option<String>,
    text: Option<String>,
}

/// Client for the resolution API.
pub struct ResolverClient {
    http: reqwest::Client,
    base_url: String,
}

impl ResolverClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Resolve a source URL to a direct download URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on transport failures, non-2xx responses,
    /// and any response that does not carry a usable URL.
    pub async fn resolve(&self, source_url: &str, format: MediaFormat) -> Result<ResolvedDownload> {
        let body = match format {
            MediaFormat::Audio => ResolveRequestBody {
                url: source_url,
                v_codec: None,
                v_quality: "720",
                a_format: "mp3",
                is_audio_only: true,
            },
            MediaFormat::Video => ResolveRequestBody {
                url: source_url,
                v_codec: Some("h264"),
                v_quality: "720",
                a_format: "best",
                is_audio_only: false,
            },
        };

        let endpoint = format!("{}/api/json", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream("resolver", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::upstream("resolver", format!("HTTP {status}")));
        }

        let body: ResolveResponseBody = resp
            .json()
            .await
            .map_err(|e| Error::upstream("resolver", format!("parse error: {e}")))?;

        match body.status.as_str() {
            "success" | "redirect" => body
                .url
                .map(|url| ResolvedDownload { url })
                .ok_or_else(|| Error::upstream("resolver", "response missing url")),
            other => {
                let detail = body.text.unwrap_or_else(|| "no detail".into());
                Err(Error::upstream(
                    "resolver",
                    format!("status '{other}': {detail}"),
                ))
            }
        }
    }
}
