//! Application state shared across handlers

use std::sync::Arc;

use common::{
    config::AppConfig, feeds::FeedService, proxy::MediaProxy, translation::TranslationAdapter,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub feeds: Arc<FeedService>,
    pub media_proxy: MediaProxy,
}

impl AppState {
    pub fn new(feeds: FeedService, media_proxy: MediaProxy) -> Self {
        Self {
            feeds: Arc::new(feeds),
            media_proxy,
        }
    }

    /// Wire every component around one HTTP client and one translator
    pub fn from_config(config: &AppConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("astro-feed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let translation = TranslationAdapter::from_config(config, client.clone());
        let feeds = FeedService::from_config(config, client.clone(), translation);

        Ok(Self::new(feeds, MediaProxy::new(client)))
    }
}
