//! API models for request query strings

use common::feeds::SearchQuery;
use serde::Deserialize;

/// Query parameters of the latest feed
///
/// The snake_case spellings used by older browser clients are accepted too;
/// when both spellings are sent the camelCase one wins.
#[derive(Debug, Default, Deserialize)]
pub struct LatestFeedParams {
    /// Free-text search (default: "space")
    pub q: Option<String>,
    /// Comma separated media kinds (default: "image,video")
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,
    #[serde(rename = "media_type")]
    pub legacy_media_type: Option<String>,
    /// Number of results (default: 5); blank or non-numeric means the default
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    #[serde(rename = "page_size")]
    pub legacy_page_size: Option<String>,
}

impl LatestFeedParams {
    fn page_size(&self) -> Option<u32> {
        self.page_size
            .as_deref()
            .or(self.legacy_page_size.as_deref())
            .and_then(|raw| raw.trim().parse().ok())
    }
}

impl From<LatestFeedParams> for SearchQuery {
    fn from(params: LatestFeedParams) -> Self {
        let page_size = params.page_size();
        SearchQuery::new(
            params.q,
            params.media_type.or(params.legacy_media_type),
            page_size,
        )
    }
}

/// Query parameters of the media proxy
#[derive(Debug, Deserialize)]
pub struct MediaProxyParams {
    pub url: Option<String>,
}
