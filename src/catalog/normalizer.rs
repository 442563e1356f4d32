//! Item text normalization.
//!
//! Turns one raw record into a single lowercase, space-joined text blob:
//!
//! ```text
//! title title genre... crew... keywords...
//! ```
//!
//! The title is repeated to bias the feature space towards title terms.
//! Normalization never fails: missing fields are skipped, malformed ones are
//! logged and treated as empty.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::{LowercaseFilter, RemoveEmptyFilter, StripFilter};
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::catalog::item::RawItem;
use crate::error::Result;

/// Fields holding the title.
pub const TITLE_FIELDS: &[&str] = &["title"];
/// Fields holding genre names.
pub const GENRE_FIELDS: &[&str] = &["genre", "genre_nm"];
/// Fields holding cast and crew.
pub const CREW_FIELDS: &[&str] = &["director", "cast", "actors"];
/// Fields holding keywords and tags.
pub const KEYWORD_FIELDS: &[&str] = &["keywords", "tags"];

/// Number of times the title appears in the normalized text.
pub const TITLE_REPEAT: usize = 2;

/// Normalizes raw item records into text.
#[derive(Debug, Clone)]
pub struct ItemTextNormalizer {
    values: PipelineAnalyzer,
}

impl ItemTextNormalizer {
    /// Create a normalizer splitting string fields on commas.
    pub fn new() -> Result<Self> {
        let values = PipelineAnalyzer::new(Arc::new(RegexTokenizer::with_gaps(",")?))
            .add_filter(Arc::new(StripFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(RemoveEmptyFilter::new()))
            .with_name("field_values");
        Ok(Self { values })
    }

    /// The lowercased, trimmed title; empty when missing or malformed.
    pub fn title(&self, raw: &RawItem) -> String {
        TITLE_FIELDS
            .iter()
            .filter_map(|field| raw.get(field).map(|value| (*field, value)))
            .flat_map(|(field, value)| match value {
                Value::String(s) => vec![s.trim().to_lowercase()],
                Value::Array(_) => self.coerce(field, value),
                Value::Null => Vec::new(),
                other => {
                    warn!(field, value = %other, "malformed title field, treating as empty");
                    Vec::new()
                }
            })
            .filter(|title| !title.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Values of the given fields, coerced into a list of lowercase tokens.
    ///
    /// Strings are split on commas; lists are taken element by element. Every
    /// value is trimmed and lowercased; empty values are dropped.
    pub fn field_values(&self, raw: &RawItem, fields: &[&str]) -> Vec<String> {
        fields
            .iter()
            .filter_map(|field| raw.get(field).map(|value| self.coerce(field, value)))
            .flatten()
            .collect()
    }

    /// The full normalized text of a record.
    pub fn normalize(&self, raw: &RawItem) -> String {
        let title = self.title(raw);
        let mut parts: Vec<String> = Vec::new();
        if !title.is_empty() {
            parts.extend(std::iter::repeat_n(title, TITLE_REPEAT));
        }
        parts.extend(self.field_values(raw, GENRE_FIELDS));
        parts.extend(self.field_values(raw, CREW_FIELDS));
        parts.extend(self.field_values(raw, KEYWORD_FIELDS));
        parts.join(" ")
    }

    fn coerce(&self, field: &str, value: &Value) -> Vec<String> {
        match value {
            Value::String(s) => self.split(field, s),
            Value::Array(elements) => elements
                .iter()
                .filter_map(|element| match element {
                    Value::String(s) => Some(s.trim().to_lowercase()),
                    Value::Null => None,
                    other => {
                        warn!(field, value = %other, "malformed list element, skipping");
                        None
                    }
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Value::Null => Vec::new(),
            other => {
                warn!(field, value = %other, "malformed field, treating as empty");
                Vec::new()
            }
        }
    }

    fn split(&self, field: &str, text: &str) -> Vec<String> {
        self.values.terms(text).unwrap_or_else(|e| {
            warn!(field, error = %e, "failed to split field, treating as empty");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn normalizer() -> ItemTextNormalizer {
        ItemTextNormalizer::new().unwrap()
    }

    #[test]
    fn test_title_repeated_first() {
        let raw = RawItem::new()
            .with("title", "  Phantom of the Opera ")
            .with("genre", "Musical")
            .with("cast", "Cho Seung-woo")
            .with("keywords", json!(["Love", "Mask"]));

        assert_eq!(
            normalizer().normalize(&raw),
            "phantom of the opera phantom of the opera musical cho seung-woo love mask"
        );
    }

    #[test]
    fn test_field_aliases() {
        let raw = RawItem::new()
            .with("genre_nm", "드라마")
            .with("director", "봉준호")
            .with("actors", "송강호, 최우식")
            .with("tags", "가족");

        assert_eq!(normalizer().normalize(&raw), "드라마 봉준호 송강호 최우식 가족");
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        assert_eq!(normalizer().normalize(&RawItem::new()), "");

        let raw = RawItem::new().with("keywords", "sf");
        assert_eq!(normalizer().normalize(&raw), "sf");
    }

    #[test]
    fn test_malformed_fields_are_empty() {
        let raw = RawItem::new()
            .with("title", 42)
            .with("genre", json!({"name": "drama"}))
            .with("keywords", json!(["ok", 7, null, "  "]))
            .with("cast", true);

        let normalizer = normalizer();
        assert_eq!(normalizer.title(&raw), "");
        assert_eq!(normalizer.normalize(&raw), "ok");
    }

    #[test]
    fn test_comma_split_drops_empty_tokens() {
        let raw = RawItem::new().with("keywords", " SF ,, 우주 , ");
        assert_eq!(
            normalizer().field_values(&raw, KEYWORD_FIELDS),
            vec!["sf", "우주"]
        );
    }

    #[test]
    fn test_list_title() {
        let raw = RawItem::new().with("title", json!(["Monet", "Light"]));
        assert_eq!(normalizer().title(&raw), "monet light");
    }
}
