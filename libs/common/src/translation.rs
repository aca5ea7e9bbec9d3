//! Machine translation of free-text fields
//!
//! [`TranslationAdapter`] never fails: with no backend configured, or when the
//! backend errors, the input text is handed back unchanged. The backend is
//! built once at startup and shared by every request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::TranslationError;

const DEEPL_FREE_API_URL: &str = "https://api-free.deepl.com";
const DEEPL_PRO_API_URL: &str = "https://api.deepl.com";

/// A text translation backend
#[async_trait]
pub trait Translator: Send + Sync {
    /// Name reported in `translatedBy`
    fn provider_name(&self) -> &str;

    /// Translate `text` into `target_lang`
    async fn translate_text(&self, text: &str, target_lang: &str)
    -> Result<String, TranslationError>;
}

#[derive(Serialize)]
struct DeepLRequest<'a> {
    text: [&'a str; 1],
    target_lang: String,
}

#[derive(Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL REST API client
pub struct DeepLTranslator {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DeepLTranslator {
    /// Create a client for the host matching the key's tier
    pub fn new(client: Client, api_key: String) -> Self {
        let base_url = Self::base_url_for_key(&api_key).to_string();
        Self::with_base_url(client, api_key, base_url)
    }

    pub fn with_base_url(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Free-tier keys carry a `:fx` suffix and live on a separate host
    pub fn base_url_for_key(api_key: &str) -> &'static str {
        if api_key.ends_with(":fx") {
            DEEPL_FREE_API_URL
        } else {
            DEEPL_PRO_API_URL
        }
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    fn provider_name(&self) -> &str {
        "DeepL"
    }

    async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let request = DeepLRequest {
            text: [text],
            target_lang: target_lang.to_uppercase(),
        };

        let response = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body: DeepLResponse = response.json().await?;
        body.translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .ok_or(TranslationError::EmptyResponse)
    }
}

/// Optional translation step applied to every news item
#[derive(Clone)]
pub struct TranslationAdapter {
    backend: Option<Arc<dyn Translator>>,
    target_lang: String,
}

impl TranslationAdapter {
    pub fn new(backend: Arc<dyn Translator>, target_lang: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            target_lang: target_lang.into(),
        }
    }

    /// Adapter that passes every text through untouched
    pub fn disabled(target_lang: impl Into<String>) -> Self {
        Self {
            backend: None,
            target_lang: target_lang.into(),
        }
    }

    /// Build the process-wide adapter from configuration
    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        match &config.deepl_api_key {
            Some(api_key) => {
                let translator = match &config.deepl_api_url {
                    Some(url) => DeepLTranslator::with_base_url(client, api_key.clone(), url.clone()),
                    None => DeepLTranslator::new(client, api_key.clone()),
                };
                info!("DeepL translator initialized");
                Self::new(Arc::new(translator), config.translation_target_lang.clone())
            }
            None => Self::disabled(config.translation_target_lang.clone()),
        }
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.provider_name())
    }

    /// Translate `text`, falling back to the input on any failure
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        let Some(backend) = &self.backend else {
            return text.to_string();
        };
        if text.is_empty() {
            return String::new();
        }

        match backend.translate_text(text, target_lang).await {
            Ok(translated) => translated,
            Err(e) => {
                error!(
                    "Failed to translate text with {}: {}",
                    backend.provider_name(),
                    e
                );
                text.to_string()
            }
        }
    }

    /// Translate into the configured target language
    pub async fn translate_to_target(&self, text: &str) -> String {
        self.translate(text, &self.target_lang).await
    }
}
