//! Final scoring and category-balanced selection.
//!
//! The final score of an item blends its similarity to the user with the
//! user's stated affinity for the item's category:
//!
//! ```text
//! final = similarity * similarity_weight + (preference / 10) * preference_weight
//! ```
//!
//! Selection then takes the best `max(1, floor(total * ratio))` items of each
//! category, concatenates the selections in category order, truncates to the
//! requested size and orders the result best-first.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::item::Item;
use crate::content::ContentType;
use crate::error::{ForestError, Result};
use crate::profile::UserProfile;

/// Allowed deviation of weight and ratio sums from 1.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Configuration for final scoring and category balancing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Weight of the similarity term (0.0 - 1.0).
    pub similarity_weight: f64,
    /// Weight of the category preference term (0.0 - 1.0).
    pub preference_weight: f64,
    /// Target share of the output per category.
    pub type_ratios: HashMap<ContentType, f64>,
    /// Fill quota left unused by short categories from the best remaining
    /// items of any category.
    pub redistribute_shortfall: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.7,
            preference_weight: 0.3,
            type_ratios: HashMap::from([
                (ContentType::Movie, 0.4),
                (ContentType::Performance, 0.3),
                (ContentType::Exhibition, 0.3),
            ]),
            redistribute_shortfall: false,
        }
    }
}

impl RankingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("similarity_weight", self.similarity_weight),
            ("preference_weight", self.preference_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ForestError::invalid_config(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        let weight_sum = self.similarity_weight + self.preference_weight;
        if (weight_sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ForestError::invalid_config(format!(
                "similarity_weight and preference_weight must sum to 1, got {weight_sum}"
            )));
        }

        let mut ratio_sum = 0.0;
        for content_type in ContentType::ALL {
            let ratio = self.type_ratios.get(&content_type).copied().ok_or_else(|| {
                ForestError::invalid_config(format!("missing type ratio for {content_type}"))
            })?;
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(ForestError::invalid_config(format!(
                    "type ratio for {content_type} must be a non-negative number, got {ratio}"
                )));
            }
            ratio_sum += ratio;
        }
        if (ratio_sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ForestError::invalid_config(format!(
                "type ratios must sum to 1, got {ratio_sum}"
            )));
        }
        Ok(())
    }

    /// Target ratio of a category; 0 when unset.
    pub fn ratio(&self, content_type: ContentType) -> f64 {
        self.type_ratios.get(&content_type).copied().unwrap_or(0.0)
    }
}

/// An item with its scores for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a Item,
    pub content_type: ContentType,
    /// Cosine similarity to the user in `[0, 1]`.
    pub similarity: f32,
    pub final_score: f32,
}

impl ScoredItem<'_> {
    /// Best-first order: higher final score, then lower activity id.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .final_score
            .total_cmp(&self.final_score)
            .then_with(|| self.item.activity_id.cmp(&other.item.activity_id))
    }
}

/// Blends similarity with category preference and enforces category ratios.
#[derive(Debug, Clone)]
pub struct RankingBalancer {
    config: RankingConfig,
}

impl RankingBalancer {
    /// Create a balancer; fails on an invalid configuration.
    pub fn new(config: RankingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Final score of an item of the given category.
    pub fn final_score(
        &self,
        similarity: f32,
        profile: &UserProfile,
        content_type: ContentType,
    ) -> f32 {
        let preference = f64::from(profile.normalized_preference(content_type));
        (f64::from(similarity) * self.config.similarity_weight
            + preference * self.config.preference_weight) as f32
    }

    /// Attach final scores to `(item, similarity)` pairs.
    pub fn score<'a, I>(&self, profile: &UserProfile, similarities: I) -> Vec<ScoredItem<'a>>
    where
        I: IntoIterator<Item = (&'a Item, f32)>,
    {
        similarities
            .into_iter()
            .map(|(item, similarity)| ScoredItem {
                item,
                content_type: item.content_type,
                similarity,
                final_score: self.final_score(similarity, profile, item.content_type),
            })
            .collect()
    }

    /// Number of items a category contributes to a result of `total_count`.
    ///
    /// Every category gets at least one slot, so quotas may add up to more
    /// than `total_count`; the overflow is cut by the final truncation.
    pub fn quota(&self, content_type: ContentType, total_count: usize) -> usize {
        let share = (total_count as f64 * self.config.ratio(content_type)).floor();
        // Non-negative and at most total_count after floor.
        (share as usize).max(1)
    }

    /// Select at most `total_count` items honoring the category ratios,
    /// ordered best-first.
    pub fn balance<'a>(
        &self,
        scored: Vec<ScoredItem<'a>>,
        total_count: usize,
    ) -> Vec<ScoredItem<'a>> {
        if total_count == 0 {
            return Vec::new();
        }

        let mut partitions: HashMap<ContentType, Vec<ScoredItem<'a>>> = HashMap::new();
        for item in scored {
            partitions.entry(item.content_type).or_default().push(item);
        }

        let mut selected = Vec::with_capacity(total_count);
        let mut leftover = Vec::new();
        for content_type in ContentType::ALL {
            let Some(mut partition) = partitions.remove(&content_type) else {
                continue;
            };
            partition.sort_by(ScoredItem::rank_cmp);

            let quota = self.quota(content_type, total_count);
            let available = partition.len();
            let rest = partition.split_off(quota.min(available));
            debug!(
                %content_type,
                quota,
                available,
                selected = partition.len(),
                "category selection"
            );
            selected.extend(partition);
            leftover.extend(rest);
        }

        if self.config.redistribute_shortfall && selected.len() < total_count {
            leftover.sort_by(ScoredItem::rank_cmp);
            let missing = total_count - selected.len();
            selected.extend(leftover.into_iter().take(missing));
        }

        selected.truncate(total_count);
        selected.sort_by(ScoredItem::rank_cmp);
        selected
    }

    /// Score and balance in one step.
    pub fn rank<'a, I>(
        &self,
        profile: &UserProfile,
        similarities: I,
        total_count: usize,
    ) -> Vec<ScoredItem<'a>>
    where
        I: IntoIterator<Item = (&'a Item, f32)>,
    {
        let scored = self.score(profile, similarities);
        self.balance(scored, total_count)
    }
}
