//! Canonical news records and the upstream wire shapes they are built from

use serde::{Deserialize, Serialize};

/// Kind of media a resolved URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Best-effort label from an upstream `media_type` string
    ///
    /// Anything that is not explicitly a video is rendered as an image.
    pub fn from_declared(declared: Option<&str>) -> Self {
        match declared {
            Some(kind) if kind.eq_ignore_ascii_case("video") => MediaType::Video,
            _ => MediaType::Image,
        }
    }
}

/// Normalized item returned by every feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub explanation: String,
    /// Absolute media URL, `None` when media is unavailable
    pub url: Option<String>,
    pub media_type: MediaType,
    /// `DD/MM/YYYY`, or the unknown-date placeholder
    pub date: String,
    pub original_title: String,
    pub original_explanation: String,
    pub translated: bool,
    pub translated_by: Option<String>,
}

/// Outcome of media resolution for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub url: Option<String>,
    pub media_type: MediaType,
}

impl ResolvedMedia {
    pub fn new(url: Option<String>, media_type: MediaType) -> Self {
        Self { url, media_type }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::new(Some(url.into()), MediaType::Image)
    }

    pub fn video(url: Option<String>) -> Self {
        Self::new(url, MediaType::Video)
    }
}

/// Response of the picture-of-the-day API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApodRecord {
    /// Calendar date in `YYYY-MM-DD`, also the record's identity
    pub date: Option<String>,
    pub title: Option<String>,
    pub explanation: Option<String>,
    pub url: Option<String>,
    pub hdurl: Option<String>,
    pub media_type: Option<String>,
}

/// Response envelope of the image and video library search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub collection: SearchCollection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCollection {
    #[serde(default)]
    pub items: Vec<RawSearchItem>,
}

/// One search hit with its heterogeneous link collections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchItem {
    /// Asset manifest endpoint listing every file of the item
    pub href: Option<String>,
    #[serde(default)]
    pub data: Vec<SearchItemData>,
    #[serde(default)]
    pub links: Vec<SearchLink>,
}

impl RawSearchItem {
    /// The metadata block, if the item carries one
    pub fn metadata(&self) -> Option<&SearchItemData> {
        self.data.first()
    }

    /// The `media_type` the upstream declared for this item
    pub fn declared_media_type(&self) -> Option<&str> {
        self.metadata().and_then(|data| data.media_type.as_deref())
    }

    /// Link hrefs in upstream order
    pub fn link_hrefs(&self) -> impl Iterator<Item = &str> {
        self.links.iter().filter_map(|link| link.href.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItemData {
    pub nasa_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date_created: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchLink {
    pub href: Option<String>,
}

/// Daily item together with the latest listing
#[derive(Debug, Clone, Serialize)]
pub struct CombinedFeed {
    pub daily: NewsItem,
    pub latest: Vec<NewsItem>,
}
