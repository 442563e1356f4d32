//! Feature vectors shared by items and user profiles.
//!
//! Every vector produced by a fitted [`tfidf::TfIdfVectorizer`] is stamped
//! with the id of the vector space (vocabulary fit) it belongs to. Vectors
//! from different spaces must never be compared; the
//! [`similarity::SimilarityScorer`] rejects them.
//!
//! - [`Vector`] - dense representation
//! - [`SparseVector`] - sorted index/value pairs over a fixed dimension
//! - [`FeatureVector`] - either of the two

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ForestError, Result};

pub mod similarity;
pub mod tfidf;

/// Identifier of one vocabulary fit.
pub type SpaceId = Uuid;

/// A dense vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// The vector components.
    pub data: Vec<f32>,
    /// The vector space this vector was produced in, if known.
    pub space: Option<SpaceId>,
}

impl Vector {
    /// Create a new vector outside of any known vector space.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data, space: None }
    }

    /// Create an all-zero vector.
    pub fn zeros(dimension: usize) -> Self {
        Self::new(vec![0.0; dimension])
    }

    /// Tag this vector with a vector space.
    pub fn in_space(mut self, space: SpaceId) -> Self {
        self.space = Some(space);
        self
    }

    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Calculate the L2 norm (magnitude) of this vector.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize this vector to unit length. Zero vectors are left as is.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.data {
                *value /= norm;
            }
        }
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|x| *x == 0.0)
    }

    /// Check that this vector contains no NaN or infinite values.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Validate that this vector has the expected dimension.
    pub fn validate_dimension(&self, expected: usize) -> Result<()> {
        if self.data.len() != expected {
            return Err(ForestError::dimension_mismatch(expected, self.data.len()));
        }
        Ok(())
    }
}

/// A sparse vector with strictly increasing indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dimension: usize,
    indices: Vec<u32>,
    values: Vec<f32>,
    space: Option<SpaceId>,
}

impl SparseVector {
    /// Build a sparse vector from `(index, value)` entries.
    ///
    /// Entries are sorted by index; zero values are dropped and duplicate
    /// indices are summed. Indices outside the dimension are rejected.
    pub fn from_entries(dimension: usize, mut entries: Vec<(u32, f32)>) -> Result<Self> {
        entries.sort_by_key(|(index, _)| *index);

        let mut indices: Vec<u32> = Vec::with_capacity(entries.len());
        let mut values: Vec<f32> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            if index as usize >= dimension {
                return Err(ForestError::dimension_mismatch(dimension, index as usize + 1));
            }
            match indices.last() {
                Some(last) if *last == index => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(index);
                    values.push(value);
                }
            }
        }

        let (indices, values): (Vec<u32>, Vec<f32>) = indices
            .into_iter()
            .zip(values)
            .filter(|(_, v)| *v != 0.0)
            .unzip();

        Ok(Self {
            dimension,
            indices,
            values,
            space: None,
        })
    }

    /// An all-zero sparse vector.
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
            space: None,
        }
    }

    /// Tag this vector with a vector space.
    pub fn in_space(mut self, space: SpaceId) -> Self {
        self.space = Some(space);
        self
    }

    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index`, zero when not stored.
    pub fn get(&self, index: u32) -> f32 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    /// L2-normalize the stored values.
    pub fn normalize(&mut self) {
        let norm = self.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
    }

    /// Convert into a dense vector in the same space.
    pub fn to_dense(&self) -> Vector {
        let mut data = vec![0.0; self.dimension];
        for (index, value) in self.iter() {
            data[index as usize] = value;
        }
        Vector {
            data,
            space: self.space,
        }
    }
}

/// A feature vector in either representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureVector {
    Dense(Vector),
    Sparse(SparseVector),
}

impl FeatureVector {
    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        match self {
            FeatureVector::Dense(v) => v.dimension(),
            FeatureVector::Sparse(v) => v.dimension(),
        }
    }

    /// The vector space this vector belongs to, if known.
    pub fn space(&self) -> Option<SpaceId> {
        match self {
            FeatureVector::Dense(v) => v.space,
            FeatureVector::Sparse(v) => v.space,
        }
    }

    /// Dense copy of this vector.
    pub fn to_dense(&self) -> Vector {
        match self {
            FeatureVector::Dense(v) => v.clone(),
            FeatureVector::Sparse(v) => v.to_dense(),
        }
    }
}

impl From<Vector> for FeatureVector {
    fn from(vector: Vector) -> Self {
        FeatureVector::Dense(vector)
    }
}

impl From<SparseVector> for FeatureVector {
    fn from(vector: SparseVector) -> Self {
        FeatureVector::Sparse(vector)
    }
}
