//! Token filters that transform token streams.
//!
//! Filters run in the order they were added to a pipeline. Filters that want
//! to discard a token mark it stopped; [`remove_empty::RemoveEmptyFilter`]
//! performs the actual removal.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod lowercase;
pub mod remove_empty;
pub mod shingle;
pub mod strip;

pub use lowercase::LowercaseFilter;
pub use remove_empty::RemoveEmptyFilter;
pub use shingle::ShingleFilter;
pub use strip::StripFilter;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}
