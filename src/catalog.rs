//! Item catalog: raw records, normalization and the shared item corpus.
//!
//! One recommendation pass needs every item of every category, tagged with
//! its [`ContentType`](crate::content::ContentType), normalized into text and
//! vectorized by a single TF-IDF fit so that items of different categories
//! live in the same vector space.
//!
//! - [`item`] - raw provider records and validated items
//! - [`normalizer`] - item text normalization
//! - [`provider`] - where raw records come from
//! - [`builder`] - corpus assembly and vectorization
//! - [`cache`] - reuse of built corpora across requests

pub mod builder;
pub mod cache;
pub mod item;
pub mod normalizer;
pub mod provider;

pub use builder::{Corpus, ItemCorpusBuilder};
pub use cache::{CacheConfig, CorpusCache};
pub use item::{ActivityId, Item, RawItem};
pub use normalizer::ItemTextNormalizer;
pub use provider::{InMemoryItemProvider, ItemProvider, JsonFileItemProvider};
