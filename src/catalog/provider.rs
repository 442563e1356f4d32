//! Item providers.
//!
//! A provider returns the raw records of one category. Records are tagged
//! with that category by the corpus builder, not by the provider.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::item::RawItem;
use crate::content::ContentType;
use crate::error::Result;

/// Source of raw item records.
pub trait ItemProvider: Send + Sync {
    /// All records of the given category. An empty list is not an error.
    fn fetch_items(&self, content_type: ContentType) -> Result<Vec<RawItem>>;
}

/// Provider backed by records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemProvider {
    items: HashMap<ContentType, Vec<RawItem>>,
}

impl InMemoryItemProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records for a category, builder style.
    pub fn with_items<I>(mut self, content_type: ContentType, items: I) -> Self
    where
        I: IntoIterator<Item = RawItem>,
    {
        self.items.entry(content_type).or_default().extend(items);
        self
    }

    /// Add a single record.
    pub fn insert(&mut self, content_type: ContentType, item: RawItem) {
        self.items.entry(content_type).or_default().push(item);
    }

    /// Total number of records across categories.
    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    /// Whether the provider holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemProvider for InMemoryItemProvider {
    fn fetch_items(&self, content_type: ContentType) -> Result<Vec<RawItem>> {
        Ok(self.items.get(&content_type).cloned().unwrap_or_default())
    }
}

/// Provider reading a JSON document keyed by category:
///
/// ```json
/// {"movie": [{"activity_id": 1, "title": "..."}], "performance": [], "exhibition": []}
/// ```
///
/// The file is read on every fetch so edits are picked up once the corpus is
/// invalidated. List elements that are not JSON objects are logged and
/// skipped; an unreadable file or an unknown category key fails the fetch.
#[derive(Debug, Clone)]
pub struct JsonFileItemProvider {
    path: PathBuf,
}

impl JsonFileItemProvider {
    /// Create a provider for the given file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<ContentType, Vec<Value>>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read items from {}", self.path.display()))?;
        let all: HashMap<ContentType, Vec<Value>> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse items in {}", self.path.display()))?;
        Ok(all)
    }
}

impl ItemProvider for JsonFileItemProvider {
    fn fetch_items(&self, content_type: ContentType) -> Result<Vec<RawItem>> {
        let mut all = self.load()?;
        let items: Vec<RawItem> = all
            .remove(&content_type)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| match value {
                Value::Object(map) => Some(RawItem::from(map)),
                other => {
                    warn!(
                        path = %self.path.display(),
                        %content_type,
                        position,
                        value = %other,
                        "item record is not an object, skipping"
                    );
                    None
                }
            })
            .collect();
        debug!(
            path = %self.path.display(),
            %content_type,
            count = items.len(),
            "loaded items"
        );
        Ok(items)
    }
}
