//! Daily and latest feed assembly against the NASA APIs

use std::cmp::Ordering;

use futures::{StreamExt, stream};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::error::{UpstreamError, UpstreamResult};
use crate::media_resolver::{MediaResolver, resolve_apod};
use crate::models::{ApodRecord, CombinedFeed, NewsItem, SearchResponse};
use crate::normalizer::{Normalizer, RecordFields, parse_display_date};
use crate::translation::TranslationAdapter;

pub const DEFAULT_QUERY: &str = "space";
pub const DEFAULT_MEDIA_TYPES: &str = "image,video";
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Search hits normalized at the same time
const ITEM_CONCURRENCY: usize = 4;

/// Parameters of the latest feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text query
    pub query: String,
    /// Comma separated media kinds
    pub media_types: String,
    /// Number of results requested
    pub page_size: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            media_types: DEFAULT_MEDIA_TYPES.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// Apply defaults to blank values and clamp the page size
    pub fn new(query: Option<String>, media_types: Option<String>, page_size: Option<u32>) -> Self {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Self {
            query: non_blank(query).unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            media_types: non_blank(media_types).unwrap_or_else(|| DEFAULT_MEDIA_TYPES.to_string()),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Where the upstream APIs live
#[derive(Debug, Clone)]
pub struct FeedEndpoints {
    pub apod_url: String,
    pub images_api_url: String,
    pub nasa_api_key: String,
}

impl FeedEndpoints {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            apod_url: config.apod_api_url.clone(),
            images_api_url: config.nasa_images_api_url.clone(),
            nasa_api_key: config.nasa_api_key.clone(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.images_api_url.trim_end_matches('/'))
    }
}

/// Feed service combining upstream calls, media resolution and normalization
#[derive(Clone)]
pub struct FeedService {
    client: Client,
    endpoints: FeedEndpoints,
    resolver: MediaResolver,
    normalizer: Normalizer,
}

impl FeedService {
    pub fn new(
        client: Client,
        endpoints: FeedEndpoints,
        resolver: MediaResolver,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            client,
            endpoints,
            resolver,
            normalizer,
        }
    }

    /// Feed service sharing one HTTP client for every upstream call
    pub fn from_config(config: &AppConfig, client: Client, translation: TranslationAdapter) -> Self {
        Self::new(
            client.clone(),
            FeedEndpoints::from_config(config),
            MediaResolver::http(client),
            Normalizer::new(translation),
        )
    }

    /// The picture of the day as a single item
    #[instrument(skip(self))]
    pub async fn daily_feed(&self) -> UpstreamResult<NewsItem> {
        let request = self
            .client
            .get(&self.endpoints.apod_url)
            .query(&[("api_key", self.endpoints.nasa_api_key.as_str())]);
        let record: ApodRecord = fetch_json(request, &self.endpoints.apod_url).await?;

        info!("Fetched picture of the day {:?}", record.date);
        let media = resolve_apod(&record);
        Ok(self
            .normalizer
            .normalize(RecordFields::from_apod(&record), media)
            .await)
    }

    /// Latest library items for `query`, newest first
    #[instrument(skip(self))]
    pub async fn latest_feed(&self, query: &SearchQuery) -> UpstreamResult<Vec<NewsItem>> {
        let search_url = self.endpoints.search_url();
        let page_size = query.page_size.to_string();
        let request = self.client.get(&search_url).query(&[
            ("q", query.query.as_str()),
            ("media_type", query.media_types.as_str()),
            ("page_size", page_size.as_str()),
        ]);
        let response: SearchResponse = fetch_json(request, &search_url).await?;

        let records = response.collection.items;
        info!("Fetched {} library items", records.len());

        let this = self;
        let mut items: Vec<NewsItem> = stream::iter(records)
            .map(move |record| async move {
                let media = this.resolver.resolve(&record).await;
                let fields = RecordFields::from_search(&record, &media);
                this.normalizer.normalize(fields, media).await
            })
            .buffered(ITEM_CONCURRENCY)
            .collect()
            .await;

        sort_by_date_desc(&mut items);
        Ok(items)
    }

    /// Daily and latest feeds fetched concurrently; fails if either fails
    pub async fn combined_feed(&self, query: &SearchQuery) -> UpstreamResult<CombinedFeed> {
        let (daily, latest) = tokio::try_join!(self.daily_feed(), self.latest_feed(query))?;
        Ok(CombinedFeed { daily, latest })
    }
}

async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> UpstreamResult<T> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.json().await?)
}

/// Sort by display date, newest first; unknown dates go last
///
/// The sort is stable, so equal dates keep upstream order.
pub fn sort_by_date_desc(items: &mut [NewsItem]) {
    items.sort_by(|a, b| {
        match (parse_display_date(&a.date), parse_display_date(&b.date)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}
