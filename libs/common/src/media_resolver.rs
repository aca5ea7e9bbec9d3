//! Picks one representative media URL for an upstream record
//!
//! Search hits carry several link collections of mixed quality. Resolution
//! runs an ordered list of strategies and the first one that claims the item
//! wins:
//!
//! 1. [`ResolveStrategy::ImageLinks`]: any image link, preferring `~thumb`.
//! 2. [`ResolveStrategy::AssetManifest`]: declared videos with a manifest
//!    endpoint; the manifest's first video file, else the first direct video
//!    link. Claims the item even when neither yields a URL.
//! 3. [`ResolveStrategy::VideoLinks`]: first direct video link.
//!
//! When nothing claims the item the URL is absent and the declared kind is
//! kept as a label. Only absolute http(s) URLs are ever returned.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use crate::error::{UpstreamError, UpstreamResult};
use crate::models::{ApodRecord, MediaType, RawSearchItem, ResolvedMedia};

/// Marker NASA puts in the file name of preview renditions
pub const THUMBNAIL_MARKER: &str = "~thumb";

fn image_extension() -> &'static Regex {
    static IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    IMAGE_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|tiff)$").expect("Failed to compile image regex")
    })
}

fn video_extension() -> &'static Regex {
    static VIDEO_REGEX: OnceLock<Regex> = OnceLock::new();
    VIDEO_REGEX
        .get_or_init(|| Regex::new(r"(?i)\.(mp4|webm)$").expect("Failed to compile video regex"))
}

/// The href without its query string or fragment
fn href_path(href: &str) -> &str {
    href.split(|c| c == '?' || c == '#').next().unwrap_or(href)
}

/// Whether `href` parses as an absolute http(s) URL
pub fn is_absolute_url(href: &str) -> bool {
    Url::parse(href).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

pub fn is_image_href(href: &str) -> bool {
    image_extension().is_match(href_path(href))
}

pub fn is_video_href(href: &str) -> bool {
    video_extension().is_match(href_path(href))
}

fn image_links(item: &RawSearchItem) -> Vec<&str> {
    item.link_hrefs()
        .filter(|href| is_image_href(href) && is_absolute_url(href))
        .collect()
}

fn video_links(item: &RawSearchItem) -> Vec<&str> {
    item.link_hrefs()
        .filter(|href| is_video_href(href) && is_absolute_url(href))
        .collect()
}

/// Source of asset manifests: lists of every file URL of one item
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_manifest(&self, href: &str) -> UpstreamResult<Vec<String>>;
}

/// Fetches manifests over HTTP
pub struct HttpManifestSource {
    client: Client,
}

impl HttpManifestSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch_manifest(&self, href: &str) -> UpstreamResult<Vec<String>> {
        let response = self.client.get(href).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: href.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

/// One step of the resolution chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    ImageLinks,
    AssetManifest,
    VideoLinks,
}

impl ResolveStrategy {
    /// Priority order; the first strategy to claim an item wins
    pub const ORDER: [ResolveStrategy; 3] = [
        ResolveStrategy::ImageLinks,
        ResolveStrategy::AssetManifest,
        ResolveStrategy::VideoLinks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResolveStrategy::ImageLinks => "image-links",
            ResolveStrategy::AssetManifest => "asset-manifest",
            ResolveStrategy::VideoLinks => "video-links",
        }
    }
}

/// Media resolver for search hits
#[derive(Clone)]
pub struct MediaResolver {
    manifests: Arc<dyn ManifestSource>,
}

impl MediaResolver {
    pub fn new(manifests: Arc<dyn ManifestSource>) -> Self {
        Self { manifests }
    }

    /// Resolver fetching manifests with the shared HTTP client
    pub fn http(client: Client) -> Self {
        Self::new(Arc::new(HttpManifestSource::new(client)))
    }

    /// Resolve one search hit; never fails
    pub async fn resolve(&self, item: &RawSearchItem) -> ResolvedMedia {
        let item_id = item
            .metadata()
            .and_then(|data| data.nasa_id.as_deref())
            .unwrap_or("<no id>");

        for strategy in ResolveStrategy::ORDER {
            if let Some(media) = self.apply(strategy, item).await {
                debug!(
                    "Resolved media for {} with {}: {:?}",
                    item_id,
                    strategy.name(),
                    media.url
                );
                return media;
            }
        }

        debug!("No media resolved for {}", item_id);
        ResolvedMedia::new(None, MediaType::from_declared(item.declared_media_type()))
    }

    /// Run a single strategy; `None` means it does not claim the item
    pub async fn apply(
        &self,
        strategy: ResolveStrategy,
        item: &RawSearchItem,
    ) -> Option<ResolvedMedia> {
        match strategy {
            ResolveStrategy::ImageLinks => {
                let images = image_links(item);
                let chosen = images
                    .iter()
                    .find(|href| href.contains(THUMBNAIL_MARKER))
                    .or_else(|| images.first())?;
                Some(ResolvedMedia::image(*chosen))
            }
            ResolveStrategy::AssetManifest => {
                let declared_video = item
                    .declared_media_type()
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("video"));
                let manifest_href = item.href.as_deref().filter(|_| declared_video)?;

                let from_manifest = match self.manifests.fetch_manifest(manifest_href).await {
                    Ok(files) => files
                        .into_iter()
                        .find(|file| is_video_href(file) && is_absolute_url(file)),
                    Err(e) => {
                        error!("Failed to fetch video assets from {}: {}", manifest_href, e);
                        None
                    }
                };

                let url = from_manifest
                    .or_else(|| video_links(item).first().map(|href| href.to_string()));
                Some(ResolvedMedia::video(url))
            }
            ResolveStrategy::VideoLinks => {
                let first = video_links(item).first().map(|href| href.to_string())?;
                Some(ResolvedMedia::video(Some(first)))
            }
        }
    }
}

/// Media of a picture-of-the-day record: HD rendition first
pub fn resolve_apod(record: &ApodRecord) -> ResolvedMedia {
    let url = [record.hdurl.as_deref(), record.url.as_deref()]
        .into_iter()
        .flatten()
        .find(|href| is_absolute_url(href))
        .map(str::to_string);

    let media_type = match record.media_type.as_deref() {
        Some("image") => MediaType::Image,
        _ => MediaType::Video,
    };

    ResolvedMedia::new(url, media_type)
}
