//! Remove empty filter implementation.
//!
//! # Examples
//!
//! ```
//! use forest::analysis::token::Token;
//! use forest::analysis::token_filter::Filter;
//! use forest::analysis::token_filter::remove_empty::RemoveEmptyFilter;
//!
//! let filter = RemoveEmptyFilter::new();
//! let tokens = vec![Token::new("drama", 0), Token::new("", 1), Token::new("war", 2)];
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[1].position, 1);
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that drops empty and stopped tokens.
///
/// Surviving tokens are renumbered so positions stay contiguous.
#[derive(Clone, Debug, Default)]
pub struct RemoveEmptyFilter;

impl RemoveEmptyFilter {
    /// Create a new remove empty filter.
    pub fn new() -> Self {
        RemoveEmptyFilter
    }
}

impl Filter for RemoveEmptyFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(
            tokens
                .filter(|token| !token.is_stopped() && !token.is_empty())
                .enumerate()
                .map(|(position, mut token)| {
                    token.position = position;
                    token
                }),
        ))
    }

    fn name(&self) -> &'static str {
        "remove_empty"
    }
}
