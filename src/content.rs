//! Content categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};

/// The category an item belongs to.
///
/// The declaration order is the canonical iteration order used for fetching,
/// profile text assembly and category-balanced selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Performance,
    Exhibition,
}

impl ContentType {
    /// All content types in canonical order.
    pub const ALL: [ContentType; 3] = [
        ContentType::Movie,
        ContentType::Performance,
        ContentType::Exhibition,
    ];

    /// Wire name of this content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Performance => "performance",
            ContentType::Exhibition => "exhibition",
        }
    }

    /// Valid wire names, for error messages.
    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(ContentType::as_str).collect()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(ContentType::Movie),
            "performance" => Ok(ContentType::Performance),
            "exhibition" => Ok(ContentType::Exhibition),
            other => Err(ForestError::content_type_invalid(format!(
                "unknown content type '{other}', expected one of {:?}",
                Self::valid_names()
            ))),
        }
    }
}
