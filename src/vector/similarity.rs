//! Cosine similarity between a user vector and item vectors.
//!
//! Structural problems abort the whole batch:
//! - a dimension or vector-space mismatch ([`ForestError::VectorDimensionMismatch`])
//! - NaN or infinite components ([`ForestError::Computation`])
//!
//! An item that cannot be scored on its own (it has no vector) is reported as
//! a [`ForestError::PerItemScoring`] failure and the batch continues.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{ForestError, Result};
use crate::vector::{FeatureVector, Vector};

/// Batches larger than this are scored on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

/// Outcome of scoring a batch of items.
#[derive(Debug, Default)]
pub struct SimilarityBatch {
    /// `(input index, similarity)` for every scored item, in input order.
    pub scores: Vec<(usize, f32)>,
    /// Items dropped from the batch.
    pub failures: Vec<ForestError>,
}

/// Computes cosine similarity in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    parallel_threshold: usize,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer {
    /// Create a scorer with the default parallel threshold.
    pub fn new() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Set the batch size above which scoring runs in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Cosine similarity of two dense vectors.
    ///
    /// Zero vectors have similarity 0 with everything. The result is clamped
    /// to `[0, 1]`.
    pub fn cosine(a: &Vector, b: &Vector) -> Result<f32> {
        b.validate_dimension(a.dimension())?;
        if let (Some(sa), Some(sb)) = (a.space, b.space)
            && sa != sb
        {
            // Same width is a coincidence when the spaces differ.
            return Err(ForestError::dimension_mismatch(a.dimension(), b.dimension()));
        }
        if !a.is_valid() || !b.is_valid() {
            return Err(ForestError::computation(
                "vector contains NaN or infinite values",
            ));
        }

        let dot: f32 = a.data.iter().zip(&b.data).map(|(x, y)| x * y).sum();
        let norm_a = a.norm();
        let norm_b = b.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }

        let similarity = dot / (norm_a * norm_b);
        if !similarity.is_finite() {
            return Err(ForestError::computation(format!(
                "similarity evaluated to {similarity}"
            )));
        }
        Ok(similarity.clamp(0.0, 1.0))
    }

    /// Similarity of the user vector to every item vector, in order.
    ///
    /// Any failure aborts the batch.
    pub fn score(&self, user: &FeatureVector, items: &[FeatureVector]) -> Result<Vec<f32>> {
        let user = Self::prepare_user(user)?;
        let score_one = |item: &FeatureVector| Self::cosine(&user, &item.to_dense());

        if items.len() > self.parallel_threshold {
            items.par_iter().map(score_one).collect()
        } else {
            items.iter().map(score_one).collect()
        }
    }

    /// Score items that may lack a vector.
    ///
    /// Items without a vector become per-item failures; fatal errors abort.
    pub fn score_batch(
        &self,
        user: &FeatureVector,
        items: &[(u64, Option<&FeatureVector>)],
    ) -> Result<SimilarityBatch> {
        let user = Self::prepare_user(user)?;
        let score_one = |(item_id, vector): &(u64, Option<&FeatureVector>)| match vector {
            Some(vector) => Self::cosine(&user, &vector.to_dense()),
            None => Err(ForestError::per_item(*item_id, "item has no feature vector")),
        };

        let results: Vec<Result<f32>> = if items.len() > self.parallel_threshold {
            items.par_iter().map(score_one).collect()
        } else {
            items.iter().map(score_one).collect()
        };

        let mut batch = SimilarityBatch::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(similarity) => batch.scores.push((index, similarity)),
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "dropping item from similarity batch");
                    batch.failures.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            scored = batch.scores.len(),
            failed = batch.failures.len(),
            "similarity batch complete"
        );
        Ok(batch)
    }

    fn prepare_user(user: &FeatureVector) -> Result<Vector> {
        let dense = user.to_dense();
        if !dense.is_valid() {
            return Err(ForestError::computation(
                "user vector contains NaN or infinite values",
            ));
        }
        Ok(dense)
    }
}
