//! Profile providers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::profile::{ProfileRecord, UserId, UserProfile};

/// Source of user profiles.
pub trait ProfileProvider: Send + Sync {
    /// The profile of a user, or `None` when the user has none.
    fn fetch_user_profile(&self, user_id: UserId) -> Result<Option<UserProfile>>;
}

/// Provider backed by profiles held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileProvider {
    profiles: HashMap<UserId, UserProfile>,
}

impl InMemoryProfileProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, builder style. Replaces any profile of the same user.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.insert(profile);
        self
    }

    /// Add or replace a profile.
    pub fn insert(&mut self, profile: UserProfile) {
        self.profiles.insert(profile.user_id, profile);
    }
}

impl ProfileProvider for InMemoryProfileProvider {
    fn fetch_user_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(&user_id).cloned())
    }
}

/// Provider reading a JSON array of [`ProfileRecord`]s.
///
/// A user may have several records; the latest `created_at` wins and, on
/// equal timestamps, the record appearing last in the file. Records that do
/// not decode (for example without a numeric `user_id`) are logged and
/// skipped; only an unreadable file or a document that is not an array fails.
#[derive(Debug, Clone)]
pub struct JsonFileProfileProvider {
    path: PathBuf,
}

impl JsonFileProfileProvider {
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
}

impl ProfileProvider for JsonFileProfileProvider {
    fn fetch_user_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read profiles from {}", self.path.display()))?;
        let values: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse profiles in {}", self.path.display()))?;

        let latest = values
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| {
                match serde_json::from_value::<ProfileRecord>(value) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(
                            path = %self.path.display(),
                            position,
                            error = %e,
                            "undecodable profile record, skipping"
                        );
                        None
                    }
                }
            })
            .filter(|record| record.user_id == user_id)
            .max_by_key(|record| record.created_at);

        debug!(
            path = %self.path.display(),
            user_id,
            found = latest.is_some(),
            "loaded profile"
        );
        Ok(latest.map(ProfileRecord::into_profile))
    }
}
