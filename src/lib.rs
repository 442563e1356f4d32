//! # Forest
//!
//! A content-based recommendation engine for cultural items: movies,
//! performances and exhibitions.
//!
//! ## Features
//!
//! - One TF-IDF vector space (unigrams and bigrams) shared by every category
//! - User profiles projected into that space from keywords and genre lists
//! - Final scores blending cosine similarity with category preference
//! - Category-balanced result lists
//! - Cached corpora with explicit catalog invalidation
//!
//! ## Pipeline
//!
//! ```text
//! ItemCorpusBuilder -> TfIdfVectorizer -> UserProfileVectorizer
//!     -> SimilarityScorer -> RankingBalancer -> item ids
//! ```
//!
//! [`recommender::Recommender`] wires the stages together.

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod profile;
pub mod ranking;
pub mod recommender;
pub mod vector;

pub mod prelude {
    pub use crate::catalog::{
        Corpus, CorpusCache, InMemoryItemProvider, Item, ItemCorpusBuilder, ItemProvider,
        JsonFileItemProvider, RawItem,
    };
    pub use crate::config::ForestConfig;
    pub use crate::content::ContentType;
    pub use crate::error::{ForestError, Result};
    pub use crate::profile::{
        InMemoryProfileProvider, JsonFileProfileProvider, ProfileProvider, ProfileRecord,
        UserProfile, UserProfileVectorizer,
    };
    pub use crate::ranking::{RankingBalancer, RankingConfig, ScoredItem};
    pub use crate::recommender::{Recommendation, Recommender};
    pub use crate::vector::similarity::SimilarityScorer;
    pub use crate::vector::tfidf::{TfIdfVectorizer, VectorizerConfig};
    pub use crate::vector::{FeatureVector, SparseVector, Vector};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
