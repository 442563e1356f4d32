//! Engine configuration.
//!
//! Configuration files are JSON; every field is optional and falls back to
//! its default:
//!
//! ```json
//! {
//!   "vectorizer": { "max_features": 5000, "ngram_range": [1, 2] },
//!   "ranking": {
//!     "similarity_weight": 0.7,
//!     "preference_weight": 0.3,
//!     "type_ratios": { "movie": 0.4, "performance": 0.3, "exhibition": 0.3 }
//!   },
//!   "cache": { "enabled": true, "max_age_secs": 3600 },
//!   "default_total_count": 10
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::cache::CacheConfig;
use crate::error::{ForestError, Result};
use crate::ranking::RankingConfig;
use crate::vector::similarity::DEFAULT_PARALLEL_THRESHOLD;
use crate::vector::tfidf::VectorizerConfig;

/// Top-level configuration of a [`Recommender`](crate::recommender::Recommender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub vectorizer: VectorizerConfig,
    pub ranking: RankingConfig,
    pub cache: CacheConfig,
    /// Result size used when a caller does not ask for one.
    pub default_total_count: usize,
    /// Batches larger than this are scored in parallel.
    pub parallel_threshold: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerConfig::default(),
            ranking: RankingConfig::default(),
            cache: CacheConfig::default(),
            default_total_count: 10,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ForestConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ForestConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.ranking.validate()?;
        if self.default_total_count == 0 {
            return Err(ForestError::invalid_config(
                "default_total_count must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;
    use crate::content::ContentType;

    #[test]
    fn test_default_config_is_valid() {
        let config = ForestConfig::default();
        config.validate().unwrap();
        assert_eq!(config.default_total_count, 10);
        assert_eq!(config.vectorizer.max_features, 5000);
        assert_eq!(config.cache.max_age_secs, Some(3600));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ranking": {{"type_ratios": {{"movie": 0.5, "performance": 0.25, "exhibition": 0.25}}}},
                "cache": {{"enabled": false}}}}"#
        )
        .unwrap();

        let config = ForestConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ranking.ratio(ContentType::Movie), 0.5);
        assert_eq!(config.ranking.similarity_weight, 0.7);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_age_secs, Some(3600));
        assert_eq!(config.vectorizer, VectorizerConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"ranking": {{"similarity_weight": 0.9}}}}"#).unwrap();
        assert!(matches!(
            ForestConfig::from_file(file.path()),
            Err(ForestError::InvalidConfig(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ForestConfig::from_file(file.path()),
            Err(ForestError::Json(_))
        ));
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forest.json");

        let config = ForestConfig {
            default_total_count: 5,
            ..Default::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(ForestConfig::from_file(&path).unwrap(), config);
    }
}
