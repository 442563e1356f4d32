//! Strip filter implementation.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// A filter that removes leading and trailing whitespace from tokens.
///
/// Tokens that are blank after trimming are marked stopped.
#[derive(Clone, Debug, Default)]
pub struct StripFilter;

impl StripFilter {
    /// Create a new strip filter.
    pub fn new() -> Self {
        StripFilter
    }
}

impl Filter for StripFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                return token;
            }
            let trimmed = token.text.trim().to_string();
            if trimmed.is_empty() {
                token.stop()
            } else {
                token.with_text(trimmed)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}
