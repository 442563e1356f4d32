//! Raw provider records and validated items.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::normalizer::{
    CREW_FIELDS, GENRE_FIELDS, ItemTextNormalizer, KEYWORD_FIELDS,
};
use crate::content::ContentType;
use crate::error::{ForestError, Result};
use crate::vector::FeatureVector;

/// Identifier of an activity (movie, performance or exhibition).
pub type ActivityId = u64;

/// Fields that may carry a content type tag, in lookup order.
const CONTENT_TYPE_FIELDS: [&str; 2] = ["content_type", "type"];

/// One record as returned by an item provider.
///
/// Records are loosely typed: every field is optional and text fields may be
/// strings or lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawItem(Map<String, Value>);

impl RawItem {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, builder style.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The record identifier, as a number or a numeric string.
    pub fn activity_id(&self) -> Result<ActivityId> {
        match self.0.get("activity_id") {
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
                ForestError::invalid_record(format!("activity_id {n} is not a non-negative integer"))
            }),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| {
                ForestError::invalid_record(format!("activity_id '{s}' is not numeric"))
            }),
            Some(other) => Err(ForestError::invalid_record(format!(
                "activity_id has unsupported value {other}"
            ))),
            None => Err(ForestError::invalid_record("record has no activity_id")),
        }
    }

    /// The content type the record declares, if it declares one.
    pub fn declared_content_type(&self) -> Option<Result<ContentType>> {
        let value = CONTENT_TYPE_FIELDS
            .iter()
            .find_map(|field| self.0.get(*field))?;
        Some(match value {
            Value::String(s) => s.parse(),
            other => Err(ForestError::content_type_invalid(format!(
                "content type must be a string, got {other}"
            ))),
        })
    }

    /// Tag the record with the category it was fetched under.
    ///
    /// A record that already declares a different or unknown category is
    /// rejected with [`ForestError::ContentTypeInvalid`].
    pub fn tag(&mut self, content_type: ContentType) -> Result<()> {
        if let Some(declared) = self.declared_content_type() {
            let declared = declared?;
            if declared != content_type {
                return Err(ForestError::content_type_invalid(format!(
                    "record fetched as {content_type} declares {declared}"
                )));
            }
        }
        self.0.insert(
            "content_type".to_string(),
            Value::String(content_type.as_str().to_string()),
        );
        Ok(())
    }
}

impl From<Map<String, Value>> for RawItem {
    fn from(map: Map<String, Value>) -> Self {
        RawItem(map)
    }
}

/// A validated item ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub activity_id: ActivityId,
    pub content_type: ContentType,
    pub title: String,
    pub genre: Vec<String>,
    pub crew: Vec<String>,
    pub keywords: Vec<String>,
    /// Normalized text the feature vector is computed from.
    pub text: String,
    /// Vector in the corpus vector space, attached by the corpus builder.
    pub feature_vector: Option<FeatureVector>,
}

impl Item {
    /// Validate a tagged raw record and normalize its text fields.
    pub fn from_raw(raw: &RawItem, normalizer: &ItemTextNormalizer) -> Result<Self> {
        let activity_id = raw.activity_id()?;
        let content_type = match raw.declared_content_type() {
            Some(content_type) => content_type?,
            None => {
                return Err(ForestError::content_type_invalid(format!(
                    "item {activity_id} carries no content type"
                )));
            }
        };

        Ok(Item {
            activity_id,
            content_type,
            title: normalizer.title(raw),
            genre: normalizer.field_values(raw, GENRE_FIELDS),
            crew: normalizer.field_values(raw, CREW_FIELDS),
            keywords: normalizer.field_values(raw, KEYWORD_FIELDS),
            text: normalizer.normalize(raw),
            feature_vector: None,
        })
    }

    /// Attach a feature vector.
    pub fn with_vector(mut self, vector: FeatureVector) -> Self {
        self.feature_vector = Some(vector);
        self
    }
}
