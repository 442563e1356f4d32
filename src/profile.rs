//! User preference profiles.
//!
//! - [`UserProfile`] - the validated profile used for scoring
//! - [`ProfileRecord`] - the loosely typed form a profile provider returns
//! - [`provider`] - where profiles come from
//! - [`vectorizer`] - projection of a profile into the corpus vector space

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::content::ContentType;

pub mod provider;
pub mod vectorizer;

pub use provider::{InMemoryProfileProvider, JsonFileProfileProvider, ProfileProvider};
pub use vectorizer::UserProfileVectorizer;

/// Identifier of a user.
pub type UserId = u64;

/// Upper bound of a category preference.
pub const MAX_PREFERENCE: u8 = 10;

/// A user's stated preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Positive preference terms.
    pub keywords: Vec<String>,
    /// Category affinity in `0..=10`.
    pub type_preferences: HashMap<ContentType, u8>,
    /// Preferred genres per category.
    pub genre_preferences: HashMap<ContentType, Vec<String>>,
}

impl UserProfile {
    /// Create an empty profile.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// Set the keyword list.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set a category preference, clamped to [`MAX_PREFERENCE`].
    pub fn with_type_preference(mut self, content_type: ContentType, preference: u8) -> Self {
        self.type_preferences
            .insert(content_type, preference.min(MAX_PREFERENCE));
        self
    }

    /// Set the preferred genres of a category.
    pub fn with_genres<I, S>(mut self, content_type: ContentType, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genre_preferences
            .insert(content_type, genres.into_iter().map(Into::into).collect());
        self
    }

    /// Preference for a category; 0 when unset.
    pub fn type_preference(&self, content_type: ContentType) -> u8 {
        self.type_preferences
            .get(&content_type)
            .copied()
            .unwrap_or(0)
            .min(MAX_PREFERENCE)
    }

    /// Preference for a category scaled to `[0, 1]`.
    pub fn normalized_preference(&self, content_type: ContentType) -> f32 {
        f32::from(self.type_preference(content_type)) / f32::from(MAX_PREFERENCE)
    }

    /// Preferred genres of a category; empty when unset.
    pub fn genres(&self, content_type: ContentType) -> &[String] {
        self.genre_preferences
            .get(&content_type)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether the profile carries no terms at all.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.genre_preferences.values().all(Vec::is_empty)
    }
}

/// Timestamp layouts accepted besides RFC 3339, read as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A profile as stored by the preference provider.
///
/// List fields may be JSON-encoded strings (`"[\"sf\", \"drama\"]"`), plain
/// lists, or comma-joined strings (`"sf, drama"`). Preferences may be numbers
/// or numeric strings and `created_at` may be RFC 3339 or a naive
/// `YYYY-MM-DD HH:MM:SS` timestamp; values that do not decode are logged and
/// read as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: UserId,
    #[serde(default, deserialize_with = "lenient_preference")]
    pub movie_preference: Option<f64>,
    #[serde(default, deserialize_with = "lenient_preference")]
    pub performance_preference: Option<f64>,
    #[serde(default, deserialize_with = "lenient_preference")]
    pub exhibition_preference: Option<f64>,
    #[serde(default)]
    pub movie_genre_preference: Value,
    #[serde(default)]
    pub performance_genre_preference: Value,
    #[serde(default)]
    pub exhibition_genre_preference: Value,
    #[serde(default)]
    pub like_words: Value,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    /// Decode into a profile. Malformed fields are logged and treated as
    /// empty; preferences are clamped to `0..=10`.
    pub fn into_profile(self) -> UserProfile {
        let user_id = self.user_id;
        let mut profile = UserProfile::new(user_id)
            .with_keywords(decode_list(user_id, "like_words", &self.like_words));

        let categories = [
            (
                ContentType::Movie,
                self.movie_preference,
                &self.movie_genre_preference,
                "movie_genre_preference",
            ),
            (
                ContentType::Performance,
                self.performance_preference,
                &self.performance_genre_preference,
                "performance_genre_preference",
            ),
            (
                ContentType::Exhibition,
                self.exhibition_preference,
                &self.exhibition_genre_preference,
                "exhibition_genre_preference",
            ),
        ];
        for (content_type, preference, genres, field) in categories {
            profile = profile
                .with_type_preference(content_type, clamp_preference(user_id, preference))
                .with_genres(content_type, decode_list(user_id, field, genres));
        }
        profile
    }
}

fn lenient_preference<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(preference) if preference.is_finite() => Some(preference),
            _ => {
                warn!(value = %s, "unparseable preference, treating as missing");
                None
            }
        },
        other => {
            warn!(value = %other, "malformed preference, treating as missing");
            None
        }
    })
}

fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => {
            let parsed = parse_timestamp(s.trim());
            if parsed.is_none() {
                warn!(value = %s, "unparseable created_at, treating as missing");
            }
            parsed
        }
        other => {
            warn!(value = %other, "malformed created_at, treating as missing");
            None
        }
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

fn clamp_preference(user_id: UserId, preference: Option<f64>) -> u8 {
    let Some(preference) = preference else {
        return 0;
    };
    let max = f64::from(MAX_PREFERENCE);
    if !(0.0..=max).contains(&preference) {
        warn!(user_id, preference, "preference out of range, clamping");
    }
    // Clamped into 0..=10, so the cast cannot truncate.
    preference.clamp(0.0, max).round() as u8
}

fn decode_list(user_id: UserId, field: &str, value: &Value) -> Vec<String> {
    let values: Vec<String> = match value {
        Value::Null => Vec::new(),
        Value::Array(elements) => elements
            .iter()
            .filter_map(|element| match element {
                Value::String(s) => Some(s.clone()),
                other => {
                    warn!(user_id, field, value = %other, "non-string list element, skipping");
                    None
                }
            })
            .collect(),
        Value::String(s) if s.trim_start().starts_with('[') => {
            serde_json::from_str(s).unwrap_or_else(|e| {
                warn!(user_id, field, error = %e, "undecodable list, treating as empty");
                Vec::new()
            })
        }
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        other => {
            warn!(user_id, field, value = %other, "malformed list field, treating as empty");
            Vec::new()
        }
    };

    values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile = UserProfile::new(1).with_type_preference(ContentType::Movie, 8);

        assert_eq!(profile.type_preference(ContentType::Movie), 8);
        assert_eq!(profile.type_preference(ContentType::Exhibition), 0);
        assert!((profile.normalized_preference(ContentType::Movie) - 0.8).abs() < 1e-6);
        assert!(profile.genres(ContentType::Performance).is_empty());
        assert!(profile.is_empty());
    }

    #[test]
    fn test_type_preference_is_clamped() {
        let profile = UserProfile::new(1).with_type_preference(ContentType::Movie, 42);
        assert_eq!(profile.type_preference(ContentType::Movie), 10);
    }

    #[test]
    fn test_record_decodes_encoded_lists() {
        let record: ProfileRecord = serde_json::from_value(json!({
            "user_id": 7,
            "movie_preference": 9,
            "performance_preference": 3,
            "movie_genre_preference": "[\"SF\", \"드라마\"]",
            "exhibition_genre_preference": ["modern art"],
            "like_words": "우주, 로봇,  "
        }))
        .unwrap();

        let profile = record.into_profile();
        assert_eq!(profile.user_id, 7);
        assert_eq!(profile.type_preference(ContentType::Movie), 9);
        assert_eq!(profile.type_preference(ContentType::Performance), 3);
        assert_eq!(profile.type_preference(ContentType::Exhibition), 0);
        assert_eq!(profile.genres(ContentType::Movie), ["SF", "드라마"]);
        assert!(profile.genres(ContentType::Performance).is_empty());
        assert_eq!(profile.genres(ContentType::Exhibition), ["modern art"]);
        assert_eq!(profile.keywords, vec!["우주", "로봇"]);
    }

    #[test]
    fn test_record_malformed_fields_are_empty() {
        let record: ProfileRecord = serde_json::from_value(json!({
            "user_id": 1,
            "movie_preference": 15,
            "exhibition_preference": -2,
            "movie_genre_preference": "[\"unterminated",
            "like_words": 12
        }))
        .unwrap();

        let profile = record.into_profile();
        assert_eq!(profile.type_preference(ContentType::Movie), 10);
        assert_eq!(profile.type_preference(ContentType::Exhibition), 0);
        assert!(profile.genres(ContentType::Movie).is_empty());
        assert!(profile.keywords.is_empty());
        assert!(profile.is_empty());
    }

    #[test]
    fn test_record_decodes_lenient_scalars() {
        let record: ProfileRecord = serde_json::from_value(json!({
            "user_id": 3,
            "movie_preference": "7",
            "performance_preference": "a lot",
            "exhibition_preference": [4],
            "created_at": "2024-05-01 12:00:00"
        }))
        .unwrap();

        assert_eq!(
            record.created_at,
            Some("2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        let profile = record.into_profile();
        assert_eq!(profile.type_preference(ContentType::Movie), 7);
        assert_eq!(profile.type_preference(ContentType::Performance), 0);
        assert_eq!(profile.type_preference(ContentType::Exhibition), 0);
    }

    #[test]
    fn test_record_unparseable_timestamp_is_missing() {
        let record: ProfileRecord = serde_json::from_value(json!({
            "user_id": 3,
            "created_at": "yesterday"
        }))
        .unwrap();
        assert!(record.created_at.is_none());

        let record: ProfileRecord = serde_json::from_value(json!({
            "user_id": 3,
            "created_at": "2024-05-01T12:00:00+09:00"
        }))
        .unwrap();
        assert_eq!(
            record.created_at,
            Some("2024-05-01T03:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
    }
}
