//! YouTube oEmbed API client.
//!
//! Looks up title, author, and thumbnail for a video URL via the public
//! oEmbed endpoint. Rate-limited out of politeness; the base URL is
//! configurable so tests can point it at a mock server.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use vg_core::{Error, Result};

/// Public video metadata as served by `/info`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct VideoInfo {
    pub title: String,
    pub author: String,
    pub thumbnail: String,
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
    author_name: String,
    thumbnail_url: String,
}

/// Client for the oEmbed metadata endpoint.
pub struct OembedClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl OembedClient {
    pub fn new(base_url: String) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap());
        Self {
            http: reqwest::Client::new(),
            base_url,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Fetch metadata for a video URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on transport failures, non-2xx responses,
    /// and unparseable bodies.
    pub async fn video_info(&self, source_url: &str) -> Result<VideoInfo> {
        self.limiter.until_ready().await;

        let url = format!("{}/oembed", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(&url)
            .query(&[("url", source_url), ("format", "json")])
            .send()
            .await
            .map_err(|e| Error::upstream("oembed", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::upstream("oembed", format!("HTTP {status}")));
        }

        let body: OembedResponse = resp
            .json()
            .await
            .map_err(|e| Error::upstream("oembed", format!("parse error: {e}")))?;

        Ok(VideoInfo {
            title: body.title,
            author: body.author_name,
            thumbnail: body.thumbnail_url,
        })
    }
}
