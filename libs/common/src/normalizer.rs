//! Maps APOD and library-search records onto [`NewsItem`]

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{ApodRecord, NewsItem, RawSearchItem, ResolvedMedia};
use crate::translation::TranslationAdapter;

pub const UNKNOWN_TITLE: &str = "Título Desconhecido";
pub const NO_DESCRIPTION: &str = "Nenhuma descrição disponível.";
pub const UNKNOWN_DATE: &str = "Data desconhecida";

/// `DD/MM/YYYY`, the pt-BR short date
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Fields a single upstream record contributes, before defaults apply
#[derive(Debug, Clone, Default)]
pub struct RecordFields {
    pub id: String,
    pub title: Option<String>,
    pub explanation: Option<String>,
    pub date: Option<String>,
}

impl RecordFields {
    /// APOD records are identified by their calendar date
    pub fn from_apod(record: &ApodRecord) -> Self {
        Self {
            id: record.date.clone().unwrap_or_default(),
            title: record.title.clone(),
            explanation: record.explanation.clone(),
            date: record.date.clone(),
        }
    }

    /// Search hits are identified by `nasa_id`, else by a media href
    pub fn from_search(item: &RawSearchItem, media: &ResolvedMedia) -> Self {
        let data = item.metadata().cloned().unwrap_or_default();
        let id = data
            .nasa_id
            .filter(|id| !id.is_empty())
            .or_else(|| item.href.clone())
            .or_else(|| media.url.clone())
            .unwrap_or_default();

        Self {
            id,
            title: data.title,
            explanation: data.description,
            date: data.date_created,
        }
    }
}

/// Calendar date of an upstream timestamp, taken as written
pub fn parse_upstream_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

/// Render an upstream date for display, or the unknown-date placeholder
pub fn format_display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_upstream_date)
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Inverse of [`format_display_date`]; `None` for the placeholder
pub fn parse_display_date(display: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(display, DISPLAY_DATE_FORMAT).ok()
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

/// Builds canonical items, translating text when a backend is configured
#[derive(Clone)]
pub struct Normalizer {
    translation: TranslationAdapter,
}

impl Normalizer {
    pub fn new(translation: TranslationAdapter) -> Self {
        Self { translation }
    }

    /// Produce one item from a record's fields and its resolved media
    ///
    /// `translated` reports that the translation step ran, not that the text
    /// changed: a backend failure still leaves it `true`.
    pub async fn normalize(&self, fields: RecordFields, media: ResolvedMedia) -> NewsItem {
        let original_title = or_placeholder(fields.title, UNKNOWN_TITLE);
        let original_explanation = or_placeholder(fields.explanation, NO_DESCRIPTION);

        let (title, explanation, translated_by) = match self.translation.provider_name() {
            Some(provider) => {
                let title = self.translation.translate_to_target(&original_title).await;
                let explanation = self
                    .translation
                    .translate_to_target(&original_explanation)
                    .await;
                (title, explanation, Some(provider.to_string()))
            }
            None => (original_title.clone(), original_explanation.clone(), None),
        };

        NewsItem {
            id: fields.id,
            title,
            explanation,
            url: media.url,
            media_type: media.media_type,
            date: format_display_date(fields.date.as_deref()),
            original_title,
            original_explanation,
            translated: translated_by.is_some(),
            translated_by,
        }
    }
}
