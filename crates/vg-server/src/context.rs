//! Shared application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers via
//! Axum state: immutable configuration, the job store, and the upstream
//! clients, all behind `Arc`s.

use std::sync::Arc;

use vg_core::config::Config;
use vg_fetch::JobStore;

use crate::oembed::OembedClient;
use crate::resolver::ResolverClient;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<JobStore>,
    pub oembed: Arc<OembedClient>,
    pub resolver: Arc<ResolverClient>,
}

impl AppContext {
    /// Build the context, constructing upstream clients from config.
    pub fn new(config: Arc<Config>, store: Arc<JobStore>) -> Self {
        let oembed = Arc::new(OembedClient::new(config.info.oembed_base_url.clone()));
        let resolver = Arc::new(ResolverClient::new(config.resolver.base_url.clone()));
        Self {
            config,
            store,
            oembed,
            resolver,
        }
    }
}
