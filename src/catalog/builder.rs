//! Corpus assembly: fetch, tag, normalize and vectorize every item.

use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::item::{ActivityId, Item};
use crate::catalog::normalizer::ItemTextNormalizer;
use crate::catalog::provider::ItemProvider;
use crate::content::ContentType;
use crate::error::{ForestError, Result};
use crate::vector::tfidf::{TfIdfVectorizer, VectorizerConfig};

/// The vectorized items of one catalog snapshot plus the vectorizer they
/// were fitted with.
///
/// Every item vector lives in the vectorizer's vector space; user profiles
/// must be projected through [`Corpus::vectorizer`] to be comparable.
pub struct Corpus {
    items: Vec<Item>,
    vectorizer: TfIdfVectorizer,
    skipped: Vec<ForestError>,
    built_at: DateTime<Utc>,
}

impl Corpus {
    /// Items in fetch order (movies, then performances, then exhibitions).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The fitted vectorizer.
    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    /// Records excluded while building.
    pub fn skipped(&self) -> &[ForestError] {
        &self.skipped
    }

    /// When the corpus was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the corpus holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn get(&self, activity_id: ActivityId) -> Option<&Item> {
        self.items.iter().find(|item| item.activity_id == activity_id)
    }

    /// Number of items per category, in canonical order.
    pub fn counts(&self) -> Vec<(ContentType, usize)> {
        ContentType::ALL
            .iter()
            .map(|ct| {
                let count = self
                    .items
                    .iter()
                    .filter(|item| item.content_type == *ct)
                    .count();
                (*ct, count)
            })
            .collect()
    }
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus")
            .field("items", &self.items.len())
            .field("skipped", &self.skipped.len())
            .field("vectorizer", &self.vectorizer)
            .field("built_at", &self.built_at)
            .finish()
    }
}

/// Builds a [`Corpus`] from an item provider.
#[derive(Clone)]
pub struct ItemCorpusBuilder {
    provider: Arc<dyn ItemProvider>,
    normalizer: ItemTextNormalizer,
    vectorizer_config: VectorizerConfig,
}

impl fmt::Debug for ItemCorpusBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCorpusBuilder")
            .field("vectorizer_config", &self.vectorizer_config)
            .finish_non_exhaustive()
    }
}

impl ItemCorpusBuilder {
    /// Create a builder over the given provider.
    pub fn new(provider: Arc<dyn ItemProvider>, vectorizer_config: VectorizerConfig) -> Result<Self> {
        vectorizer_config.validate()?;
        Ok(Self {
            provider,
            normalizer: ItemTextNormalizer::new()?,
            vectorizer_config,
        })
    }

    /// Fetch every category, validate the records and fit one vectorizer
    /// over all of them.
    ///
    /// Invalid records are logged and excluded. Activity ids are unique
    /// across categories: a record repeating an id already seen (in fetch
    /// order) is excluded as [`ForestError::InvalidRecord`]. Fails with
    /// [`ForestError::DataUnavailable`] when no valid item remains.
    pub fn build(&self) -> Result<Corpus> {
        let mut items = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = AHashSet::new();

        for content_type in ContentType::ALL {
            let records = self.provider.fetch_items(content_type)?;
            debug!(%content_type, count = records.len(), "fetched items");

            for mut raw in records {
                let item = raw
                    .tag(content_type)
                    .and_then(|_| Item::from_raw(&raw, &self.normalizer))
                    .and_then(|item| {
                        if seen.insert(item.activity_id) {
                            Ok(item)
                        } else {
                            Err(ForestError::invalid_record(format!(
                                "duplicate activity_id {}",
                                item.activity_id
                            )))
                        }
                    });
                match item {
                    Ok(item) => items.push(item),
                    Err(e) if e.is_recoverable() => {
                        warn!(%content_type, error = %e, "excluding item record");
                        skipped.push(e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if items.is_empty() {
            return Err(ForestError::data_unavailable(
                "item corpus is empty for every content type",
            ));
        }

        let texts: Vec<String> = items.iter().map(|item| item.text.clone()).collect();
        let mut vectorizer = TfIdfVectorizer::new(self.vectorizer_config.clone())?;
        let vectors = vectorizer.fit_transform(&texts)?;
        if vectors.len() != items.len() {
            return Err(ForestError::internal(format!(
                "vectorizer returned {} vectors for {} items",
                vectors.len(),
                items.len()
            )));
        }

        let items: Vec<Item> = items
            .into_iter()
            .zip(vectors)
            .map(|(item, vector)| item.with_vector(vector.into()))
            .collect();

        info!(
            item_count = items.len(),
            skipped = skipped.len(),
            vocabulary_size = vectorizer.vocabulary_size(),
            "built item corpus"
        );

        Ok(Corpus {
            items,
            vectorizer,
            skipped,
            built_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::item::RawItem;
    use crate::catalog::provider::InMemoryItemProvider;

    fn builder(provider: InMemoryItemProvider) -> ItemCorpusBuilder {
        ItemCorpusBuilder::new(Arc::new(provider), VectorizerConfig::default()).unwrap()
    }

    fn sample_provider() -> InMemoryItemProvider {
        InMemoryItemProvider::new()
            .with_items(
                ContentType::Movie,
                vec![
                    RawItem::new()
                        .with("activity_id", 1)
                        .with("title", "Interstellar")
                        .with("keywords", "SF, 우주"),
                ],
            )
            .with_items(
                ContentType::Performance,
                vec![
                    RawItem::new()
                        .with("activity_id", 2)
                        .with("title", "Les Miserables")
                        .with("keywords", "뮤지컬, 사랑"),
                ],
            )
            .with_items(
                ContentType::Exhibition,
                vec![RawItem::new().with("activity_id", 3).with("keywords", "monet")],
            )
    }

    #[test]
    fn test_build_shares_one_vector_space() {
        let corpus = builder(sample_provider()).build().unwrap();

        assert_eq!(corpus.len(), 3);
        let space = corpus.vectorizer().space_id();
        assert!(space.is_some());
        for item in corpus.items() {
            let vector = item.feature_vector.as_ref().unwrap();
            assert_eq!(vector.dimension(), corpus.vectorizer().vocabulary_size());
            assert_eq!(vector.space(), space);
        }
        assert_eq!(
            corpus.counts(),
            vec![
                (ContentType::Movie, 1),
                (ContentType::Performance, 1),
                (ContentType::Exhibition, 1)
            ]
        );
    }

    #[test]
    fn test_items_are_tagged_with_fetch_category() {
        let corpus = builder(sample_provider()).build().unwrap();
        assert_eq!(corpus.get(1).unwrap().content_type, ContentType::Movie);
        assert_eq!(corpus.get(2).unwrap().content_type, ContentType::Performance);
        assert_eq!(corpus.get(3).unwrap().content_type, ContentType::Exhibition);
    }

    #[test]
    fn test_invalid_records_are_excluded() {
        let provider = sample_provider().with_items(
            ContentType::Movie,
            vec![
                RawItem::new().with("title", "no id"),
                RawItem::new()
                    .with("activity_id", 9)
                    .with("type", "exhibition"),
            ],
        );

        let corpus = builder(provider).build().unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.skipped().len(), 2);
        assert!(matches!(corpus.skipped()[0], ForestError::InvalidRecord(_)));
        assert!(matches!(
            corpus.skipped()[1],
            ForestError::ContentTypeInvalid(_)
        ));
        assert!(corpus.get(9).is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let provider = sample_provider()
            .with_items(
                ContentType::Movie,
                vec![RawItem::new().with("activity_id", 1).with("title", "Gravity")],
            )
            .with_items(
                ContentType::Exhibition,
                vec![RawItem::new().with("activity_id", "2").with("keywords", "nasa")],
            );

        let corpus = builder(provider).build().unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.skipped().len(), 2);
        assert!(
            corpus
                .skipped()
                .iter()
                .all(|e| matches!(e, ForestError::InvalidRecord(_)))
        );
        assert_eq!(corpus.get(1).unwrap().title, "interstellar");
        assert_eq!(corpus.get(2).unwrap().content_type, ContentType::Performance);
    }

    #[test]
    fn test_empty_corpus_is_data_unavailable() {
        let result = builder(InMemoryItemProvider::new()).build();
        assert!(matches!(result, Err(ForestError::DataUnavailable(_))));
    }

    #[test]
    fn test_empty_text_item_gets_zero_vector() {
        let provider = sample_provider().with_items(
            ContentType::Exhibition,
            vec![RawItem::new().with("activity_id", 4)],
        );
        let corpus = builder(provider).build().unwrap();

        let vector = corpus.get(4).unwrap().feature_vector.as_ref().unwrap();
        assert!(vector.to_dense().is_zero());
    }
}
