//! Common library for the astro feed service
//!
//! This crate holds the whole media pipeline shared by every host of the
//! service: upstream NASA feed assembly, media resolution, optional
//! translation, normalization into [`models::NewsItem`] and streaming media
//! passthrough.
//!
//! # Example
//!
//! ```rust,no_run
//! use common::config::AppConfig;
//! use common::feeds::{FeedService, SearchQuery};
//! use common::translation::TranslationAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let client = reqwest::Client::new();
//!     let translation = TranslationAdapter::from_config(&config, client.clone());
//!     let feeds = FeedService::from_config(&config, client, translation);
//!     let latest = feeds.latest_feed(&SearchQuery::default()).await?;
//!     println!("Fetched {} items", latest.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod feeds;
pub mod media_resolver;
pub mod models;
pub mod normalizer;
pub mod proxy;
pub mod translation;
