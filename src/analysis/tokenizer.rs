//! Tokenizers that split raw text into tokens.
//!
//! - [`regex::RegexTokenizer`] - extracts regex matches, or the gaps between them
//!
//! # Examples
//!
//! ```
//! use forest::analysis::tokenizer::Tokenizer;
//! use forest::analysis::tokenizer::regex::RegexTokenizer;
//!
//! let tokenizer = RegexTokenizer::with_pattern(r"\w\w+").unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("a SF 우주 film").unwrap().collect();
//! assert_eq!(tokens.len(), 3);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod regex;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so analyzers can be shared between the
/// corpus builder and concurrent requests.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
