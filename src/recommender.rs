//! Recommendation orchestration.
//!
//! ```text
//! profile provider ─┐
//!                   ├─> UserProfileVectorizer ─> SimilarityScorer ─> RankingBalancer ─> ids
//! item provider ─> ItemCorpusBuilder (cached) ─┘
//! ```
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use forest::catalog::{InMemoryItemProvider, RawItem};
//! use forest::config::ForestConfig;
//! use forest::content::ContentType;
//! use forest::profile::{InMemoryProfileProvider, UserProfile};
//! use forest::recommender::Recommender;
//!
//! let items = InMemoryItemProvider::new()
//!     .with_items(
//!         ContentType::Movie,
//!         vec![RawItem::new().with("activity_id", 1).with("keywords", "SF, 우주")],
//!     )
//!     .with_items(
//!         ContentType::Performance,
//!         vec![RawItem::new().with("activity_id", 2).with("keywords", "뮤지컬, 사랑")],
//!     );
//! let profiles = InMemoryProfileProvider::new().with_profile(
//!     UserProfile::new(7)
//!         .with_keywords(["SF"])
//!         .with_type_preference(ContentType::Movie, 10)
//!         .with_type_preference(ContentType::Performance, 1),
//! );
//!
//! let recommender =
//!     Recommender::new(Arc::new(items), Arc::new(profiles), ForestConfig::default()).unwrap();
//! assert_eq!(recommender.get_recommendations(7, 2), vec![1, 2]);
//! assert!(recommender.get_recommendations(8, 2).is_empty());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::catalog::builder::{Corpus, ItemCorpusBuilder};
use crate::catalog::cache::{CatalogVersion, CorpusCache};
use crate::catalog::item::ActivityId;
use crate::catalog::provider::ItemProvider;
use crate::config::ForestConfig;
use crate::content::ContentType;
use crate::error::{ForestError, Result};
use crate::profile::provider::ProfileProvider;
use crate::profile::vectorizer::UserProfileVectorizer;
use crate::profile::UserId;
use crate::ranking::RankingBalancer;
use crate::vector::FeatureVector;
use crate::vector::similarity::SimilarityScorer;

/// One recommended item with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity_id: ActivityId,
    pub title: String,
    pub content_type: ContentType,
    pub similarity: f32,
    pub final_score: f32,
}

/// Recommends items to users.
pub struct Recommender {
    config: ForestConfig,
    builder: ItemCorpusBuilder,
    profiles: Arc<dyn ProfileProvider>,
    cache: CorpusCache,
    profile_vectorizer: UserProfileVectorizer,
    scorer: SimilarityScorer,
    balancer: RankingBalancer,
}

impl fmt::Debug for Recommender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recommender")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Recommender {
    /// Create a recommender over the given providers.
    pub fn new(
        items: Arc<dyn ItemProvider>,
        profiles: Arc<dyn ProfileProvider>,
        config: ForestConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: ItemCorpusBuilder::new(items, config.vectorizer.clone())?,
            profiles,
            cache: CorpusCache::new(config.cache.clone()),
            profile_vectorizer: UserProfileVectorizer::new(),
            scorer: SimilarityScorer::new().with_parallel_threshold(config.parallel_threshold),
            balancer: RankingBalancer::new(config.ranking.clone())?,
            config,
        })
    }

    /// Up to `total_count` item ids, best first.
    ///
    /// Never fails: a missing profile, an empty catalog or any internal error
    /// yields an empty list, with the cause logged.
    pub fn get_recommendations(&self, user_id: UserId, total_count: usize) -> Vec<ActivityId> {
        match self.try_recommend(user_id, total_count) {
            Ok(recommendations) => recommendations
                .into_iter()
                .map(|recommendation| recommendation.activity_id)
                .collect(),
            Err(e) if e.is_recoverable() => {
                warn!(user_id, error = %e, "no recommendations available");
                Vec::new()
            }
            Err(e) => {
                error!(user_id, error = %e, "recommendation request failed");
                Vec::new()
            }
        }
    }

    /// Like [`get_recommendations`](Self::get_recommendations), but returns
    /// the scores and the cause of failure.
    pub fn try_recommend(
        &self,
        user_id: UserId,
        total_count: usize,
    ) -> Result<Vec<Recommendation>> {
        let profile = self
            .profiles
            .fetch_user_profile(user_id)?
            .ok_or_else(|| ForestError::data_unavailable(format!("no profile for user {user_id}")))?;
        if total_count == 0 {
            debug!(user_id, "zero items requested");
            return Ok(Vec::new());
        }

        let corpus = self.corpus()?;
        let user_vector = self
            .profile_vectorizer
            .vectorize(&profile, corpus.vectorizer())?;

        let batch_input: Vec<(ActivityId, Option<&FeatureVector>)> = corpus
            .items()
            .iter()
            .map(|item| (item.activity_id, item.feature_vector.as_ref()))
            .collect();
        let batch = self.scorer.score_batch(&user_vector, &batch_input)?;

        let similarities = batch
            .scores
            .iter()
            .map(|(index, similarity)| (&corpus.items()[*index], *similarity));
        let ranked = self.balancer.rank(&profile, similarities, total_count);

        info!(
            user_id,
            total_count,
            candidates = corpus.len(),
            dropped = batch.failures.len(),
            returned = ranked.len(),
            "recommendations ready"
        );

        Ok(ranked
            .into_iter()
            .map(|scored| Recommendation {
                activity_id: scored.item.activity_id,
                title: scored.item.title.clone(),
                content_type: scored.content_type,
                similarity: scored.similarity,
                final_score: scored.final_score,
            })
            .collect())
    }

    /// The current corpus, built on demand.
    pub fn corpus(&self) -> Result<Arc<Corpus>> {
        self.cache.get_or_build(|| self.builder.build())
    }

    /// Mark the item catalog as changed; the next request rebuilds the
    /// corpus. Returns the new catalog version.
    pub fn invalidate_catalog(&self) -> CatalogVersion {
        self.cache.invalidate()
    }

    /// The corpus cache.
    pub fn cache(&self) -> &CorpusCache {
        &self.cache
    }

    /// Result size used when a caller does not ask for one.
    pub fn default_total_count(&self) -> usize {
        self.config.default_total_count
    }

    /// Get the configuration.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}
