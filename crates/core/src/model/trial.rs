use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::TrialId;

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Ground-truth processing category of a survey image.
///
/// Assigned independently at random per unique trial; never derived
/// from the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Noisy,
    Original,
    Denoised,
}

impl Category {
    /// All categories, in a stable order, for uniform sampling.
    pub const ALL: [Category; 3] = [Category::Noisy, Category::Original, Category::Denoised];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Noisy => "noisy",
            Category::Original => "original",
            Category::Denoised => "denoised",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a category from a string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown category: {raw}")]
pub struct CategoryParseError {
    pub raw: String,
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noisy" => Ok(Category::Noisy),
            "original" => Ok(Category::Original),
            "denoised" => Ok(Category::Denoised),
            other => Err(CategoryParseError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── TRIAL ─────────────────────────────────────────────────────────────────────
//

/// One image-judgment unit within a session.
///
/// A duplicate trial is an exact copy of a unique trial, id included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub id: TrialId,
    pub filename: String,
    pub category: Category,
}

impl Trial {
    #[must_use]
    pub fn new(id: TrialId, filename: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            filename: filename.into(),
            category,
        }
    }
}
