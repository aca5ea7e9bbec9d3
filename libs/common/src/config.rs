//! Service configuration loaded from the environment
//!
//! Every setting has a default so the service starts with an empty
//! environment; only the translation credential is truly optional.

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::ConfigError;

/// Public demo-tier key accepted by api.nasa.gov (heavily rate limited)
pub const DEMO_API_KEY: &str = "DEMO_KEY";

const DEFAULT_PORT: &str = "5000";
const DEFAULT_TARGET_LANG: &str = "pt-BR";
const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:5173,http://localhost:5174,http://localhost:3000";
const DEFAULT_APOD_API_URL: &str = "https://api.nasa.gov/planetary/apod";
const DEFAULT_IMAGES_API_URL: &str = "https://images-api.nasa.gov";

/// Settings as they come out of the environment, before validation
#[derive(Debug, Deserialize)]
struct RawSettings {
    port: String,
    nasa_api_key: String,
    deepl_api_key: Option<String>,
    deepl_api_url: Option<String>,
    translation_target_lang: String,
    allowed_origins: String,
    apod_api_url: String,
    nasa_images_api_url: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP surface binds to
    pub port: u16,
    /// Key for the picture-of-the-day API
    pub nasa_api_key: String,
    /// DeepL credential; `None` disables translation
    pub deepl_api_key: Option<String>,
    /// Override for the DeepL base URL
    pub deepl_api_url: Option<String>,
    /// Language every text field is translated into
    pub translation_target_lang: String,
    /// Browser origins allowed to call the service (`*` allows any)
    pub allowed_origins: Vec<String>,
    /// Picture-of-the-day endpoint
    pub apod_api_url: String,
    /// Base URL of the image and video library API
    pub nasa_images_api_url: String,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PORT`: listening port (default: 5000)
    /// - `NASA_API_KEY`: APOD key (default: `DEMO_KEY`)
    /// - `DEEPL_API_KEY`: translation credential (default: unset, translation off)
    /// - `DEEPL_API_URL`: DeepL base URL (default: derived from the key)
    /// - `TRANSLATION_TARGET_LANG`: target language (default: pt-BR)
    /// - `ALLOWED_ORIGINS`: comma separated CORS origins
    /// - `APOD_API_URL`, `NASA_IMAGES_API_URL`: upstream endpoints
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("port", DEFAULT_PORT)?
            .set_default("nasa_api_key", DEMO_API_KEY)?
            .set_default("translation_target_lang", DEFAULT_TARGET_LANG)?
            .set_default("allowed_origins", DEFAULT_ALLOWED_ORIGINS)?
            .set_default("apod_api_url", DEFAULT_APOD_API_URL)?
            .set_default("nasa_images_api_url", DEFAULT_IMAGES_API_URL)?
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let raw: RawSettings = settings.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let port = raw.port.trim().parse().map_err(|e| ConfigError::Invalid {
            key: "PORT",
            message: format!("{}: {}", raw.port, e),
        })?;

        let allowed_origins = raw
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(AppConfig {
            port,
            nasa_api_key: raw.nasa_api_key,
            deepl_api_key: non_blank(raw.deepl_api_key),
            deepl_api_url: non_blank(raw.deepl_api_url),
            translation_target_lang: raw.translation_target_lang,
            allowed_origins,
            apod_api_url: raw.apod_api_url,
            nasa_images_api_url: raw.nasa_images_api_url,
        })
    }

    /// Whether a translation backend can be constructed
    pub fn translation_enabled(&self) -> bool {
        self.deepl_api_key.is_some()
    }

    /// Whether any browser origin may call the service
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
