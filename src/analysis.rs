//! Text analysis for Forest.
//!
//! Item fields and corpus texts both pass through small analysis pipelines
//! before they reach the TF-IDF vectorizer: a [`tokenizer::Tokenizer`] splits
//! text into [`token::Token`]s, then [`token_filter::Filter`]s transform the
//! stream in order. [`analyzer::pipeline::PipelineAnalyzer`] chains the two.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
