//! Shingle filter implementation.
//!
//! Emits word n-grams built from adjacent tokens, so a vectorizer can use
//! single terms and adjacent pairs as features at the same time.
//!
//! # Examples
//!
//! ```
//! use forest::analysis::token::Token;
//! use forest::analysis::token_filter::Filter;
//! use forest::analysis::token_filter::shingle::ShingleFilter;
//!
//! let filter = ShingleFilter::new(1, 2).unwrap();
//! let tokens = vec![Token::new("space", 0), Token::new("opera", 1)];
//! let texts: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(texts, vec!["space", "opera", "space opera"]);
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{ForestError, Result};

/// A filter producing all n-grams with `min_size <= n <= max_size`.
///
/// Output order: every n-gram of size `min_size` in stream order, then every
/// n-gram of the next size, and so on. Stopped tokens are dropped first.
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
}

impl ShingleFilter {
    /// Create a new shingle filter for the inclusive size range.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 || min_size > max_size {
            return Err(ForestError::analysis(format!(
                "Invalid shingle range ({min_size}, {max_size})"
            )));
        }
        Ok(ShingleFilter { min_size, max_size })
    }

    /// Smallest n-gram size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Largest n-gram size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let base: Vec<Token> = tokens.filter(|token| !token.is_stopped()).collect();
        let mut shingles = Vec::new();

        for size in self.min_size..=self.max_size {
            if size > base.len() {
                break;
            }
            for window in base.windows(size) {
                let text = window
                    .iter()
                    .map(|token| token.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let first = &window[0];
                let last = &window[size - 1];
                shingles.push(Token::with_offsets(
                    text,
                    first.position,
                    first.start_offset,
                    last.end_offset,
                ));
            }
        }

        Ok(Box::new(shingles.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}
