//! Reuse of built corpora across requests.
//!
//! A cached corpus is served while the catalog version it was built from is
//! current and it is younger than the configured maximum age. Catalog owners
//! call [`CorpusCache::invalidate`] when items change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::builder::Corpus;
use crate::error::Result;

/// Catalog version counter.
pub type CatalogVersion = u64;

/// Configuration for the corpus cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every request rebuilds the corpus.
    pub enabled: bool,
    /// Maximum corpus age in seconds; `None` keeps it until invalidated.
    pub max_age_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_secs: Some(3600),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    corpus: Arc<Corpus>,
    version: CatalogVersion,
    built_at: DateTime<Utc>,
}

/// Holds the last built corpus.
#[derive(Debug)]
pub struct CorpusCache {
    config: CacheConfig,
    version: AtomicU64,
    entry: RwLock<Option<CacheEntry>>,
}

impl CorpusCache {
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            version: AtomicU64::new(0),
            entry: RwLock::new(None),
        }
    }

    /// The cached corpus if it is still fresh, otherwise the result of
    /// `build`, which then replaces the cached one.
    ///
    /// Concurrent callers that miss wait for a single build. A failed build
    /// leaves the cache untouched.
    pub fn get_or_build<F>(&self, build: F) -> Result<Arc<Corpus>>
    where
        F: FnOnce() -> Result<Corpus>,
    {
        if !self.config.enabled {
            return build().map(Arc::new);
        }

        if let Some(corpus) = self.fresh(&self.entry.read()) {
            debug!("corpus cache hit");
            return Ok(corpus);
        }

        let mut guard = self.entry.write();
        // Another caller may have rebuilt while we waited for the lock.
        if let Some(corpus) = self.fresh(&guard) {
            debug!("corpus cache hit after wait");
            return Ok(corpus);
        }

        let version = self.version();
        let corpus = Arc::new(build()?);
        info!(
            version,
            item_count = corpus.len(),
            "corpus cache rebuilt"
        );
        *guard = Some(CacheEntry {
            corpus: Arc::clone(&corpus),
            version,
            built_at: corpus.built_at(),
        });
        Ok(corpus)
    }

    /// Mark the catalog as changed. Returns the new catalog version.
    pub fn invalidate(&self) -> CatalogVersion {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(version, "catalog invalidated");
        version
    }

    /// Current catalog version.
    pub fn version(&self) -> CatalogVersion {
        self.version.load(Ordering::SeqCst)
    }

    /// When the cached corpus was built, if one is cached.
    pub fn last_built(&self) -> Option<DateTime<Utc>> {
        self.entry.read().as_ref().map(|entry| entry.built_at)
    }

    /// Drop the cached corpus.
    pub fn clear(&self) {
        *self.entry.write() = None;
    }

    /// Get the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn fresh(&self, entry: &Option<CacheEntry>) -> Option<Arc<Corpus>> {
        let entry = entry.as_ref()?;
        if entry.version != self.version() {
            return None;
        }
        // Ages too large for a time delta never expire.
        if let Some(max_age) = self.config.max_age_secs
            && let Some(max_age) = i64::try_from(max_age).ok().and_then(Duration::try_seconds)
            && Utc::now() - entry.built_at >= max_age
        {
            return None;
        }
        Some(Arc::clone(&entry.corpus))
    }
}

impl Default for CorpusCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
