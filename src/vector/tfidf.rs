//! TF-IDF vectorizer building the shared item/user vector space.
//!
//! The vectorizer is fitted once over the normalized texts of the whole item
//! corpus. Later [`TfIdfVectorizer::transform`] calls project new text (a user
//! profile) into that fixed vocabulary; unseen terms contribute nothing.
//!
//! Weighting:
//! - term frequency is the raw count of a term in the text
//! - idf is smoothed: `ln((1 + n) / (1 + df)) + 1`
//! - every row is L2-normalized
//!
//! # Examples
//!
//! ```
//! use forest::vector::tfidf::{TfIdfVectorizer, VectorizerConfig};
//!
//! let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default()).unwrap();
//! let vectors = vectorizer
//!     .fit_transform(&["space opera sf".to_string(), "musical love".to_string()])
//!     .unwrap();
//! assert_eq!(vectors.len(), 2);
//!
//! let user = vectorizer.transform("sf unknown-term").unwrap();
//! assert_eq!(user.dimension(), vectorizer.vocabulary_size());
//! ```

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::{LowercaseFilter, ShingleFilter};
use crate::analysis::tokenizer::regex::{RegexTokenizer, WORD_PATTERN};
use crate::error::{ForestError, Result};
use crate::vector::{SpaceId, SparseVector};

/// Configuration for the TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size; the most frequent corpus terms are kept.
    pub max_features: usize,
    /// Inclusive range of word n-gram sizes used as features.
    pub ngram_range: (usize, usize),
    /// Regex extracting words from text.
    pub token_pattern: String,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_range: (1, 2),
            token_pattern: WORD_PATTERN.to_string(),
        }
    }
}

impl VectorizerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(ForestError::invalid_config(
                "max_features must be greater than zero",
            ));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ForestError::invalid_config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }

    /// Build the analyzer producing the vectorizer's terms.
    pub fn build_analyzer(&self) -> Result<PipelineAnalyzer> {
        let (min_n, max_n) = self.ngram_range;
        Ok(
            PipelineAnalyzer::new(Arc::new(RegexTokenizer::with_pattern(&self.token_pattern)?))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .add_filter(Arc::new(ShingleFilter::new(min_n, max_n)?))
                .with_name("tfidf_terms"),
        )
    }
}

/// State produced by a fit.
#[derive(Debug, Clone)]
struct Fitted {
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
    space: SpaceId,
}

/// TF-IDF vectorizer over word unigrams and bigrams.
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    analyzer: Arc<dyn Analyzer>,
    n_documents: usize,
    fitted: Option<Fitted>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary_size())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .field("space", &self.space_id())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = Arc::new(config.build_analyzer()?);
        Ok(Self {
            config,
            analyzer,
            n_documents: 0,
            fitted: None,
        })
    }

    /// Fit the vocabulary and idf weights on the given texts.
    ///
    /// Refitting replaces the previous vocabulary and starts a new vector
    /// space.
    pub fn fit(&mut self, texts: &[String]) -> Result<()> {
        self.fit_terms(texts).map(|_| ())
    }

    /// Fit on the given texts and return one vector per text, in order.
    pub fn fit_transform(&mut self, texts: &[String]) -> Result<Vec<SparseVector>> {
        let terms = self.fit_terms(texts)?;
        let fitted = self.fitted.as_ref().ok_or(ForestError::NotFitted)?;
        terms
            .iter()
            .map(|doc_terms| Self::vectorize(fitted, doc_terms))
            .collect()
    }

    /// Project text into the fitted vocabulary.
    ///
    /// Terms outside the vocabulary are ignored, so the result always has the
    /// fitted dimension. Fails with [`ForestError::NotFitted`] before a fit.
    pub fn transform(&self, text: &str) -> Result<SparseVector> {
        let fitted = self.fitted.as_ref().ok_or(ForestError::NotFitted)?;
        let terms = self.analyzer.terms(text)?;
        Self::vectorize(fitted, &terms)
    }

    /// Whether the vectorizer has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Get the size of the vocabulary (zero before fitting).
    pub fn vocabulary_size(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.vocabulary.len())
    }

    /// Number of documents seen by the last fit.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Id of the vector space created by the last fit.
    pub fn space_id(&self) -> Option<SpaceId> {
        self.fitted.as_ref().map(|f| f.space)
    }

    /// Vocabulary terms in index order.
    pub fn vocabulary_terms(&self) -> Vec<&str> {
        let Some(fitted) = &self.fitted else {
            return Vec::new();
        };
        let mut terms: Vec<(&str, u32)> = fitted
            .vocabulary
            .iter()
            .map(|(term, idx)| (term.as_str(), *idx))
            .collect();
        terms.sort_by_key(|(_, idx)| *idx);
        terms.into_iter().map(|(term, _)| term).collect()
    }

    /// Idf weight of a term, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        let fitted = self.fitted.as_ref()?;
        fitted
            .vocabulary
            .get(term)
            .map(|idx| fitted.idf[*idx as usize])
    }

    /// Get the configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    fn fit_terms(&mut self, texts: &[String]) -> Result<Vec<Vec<String>>> {
        if texts.is_empty() {
            return Err(ForestError::data_unavailable(
                "cannot fit vectorizer on an empty corpus",
            ));
        }

        let analyzer = Arc::clone(&self.analyzer);
        let terms: Vec<Vec<String>> = texts
            .par_iter()
            .map(|text| analyzer.terms(text))
            .collect::<Result<_>>()?;

        let mut document_frequency: AHashMap<&str, u32> = AHashMap::new();
        let mut term_frequency: AHashMap<&str, u64> = AHashMap::new();
        for doc_terms in &terms {
            let mut seen = AHashSet::new();
            for term in doc_terms {
                *term_frequency.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        // Keep the most frequent terms, ties broken by term order.
        let mut ranked: Vec<(&str, u64)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.config.max_features);

        let mut selected: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort_unstable();

        let n = texts.len() as f32;
        let mut vocabulary = AHashMap::with_capacity(selected.len());
        let mut idf = Vec::with_capacity(selected.len());
        for (idx, term) in selected.into_iter().enumerate() {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f32;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term.to_string(), idx as u32);
        }

        let space = Uuid::new_v4();
        debug!(
            documents = texts.len(),
            vocabulary_size = vocabulary.len(),
            %space,
            "fitted tf-idf vocabulary"
        );

        self.n_documents = texts.len();
        self.fitted = Some(Fitted {
            vocabulary,
            idf,
            space,
        });

        Ok(terms)
    }

    fn vectorize(fitted: &Fitted, terms: &[String]) -> Result<SparseVector> {
        let mut counts: AHashMap<u32, f32> = AHashMap::new();
        for term in terms {
            if let Some(&idx) = fitted.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * fitted.idf[idx as usize]))
            .collect();

        let mut vector = SparseVector::from_entries(fitted.vocabulary.len(), entries)?;
        vector.normalize();
        Ok(vector.in_space(fitted.space))
    }
}
