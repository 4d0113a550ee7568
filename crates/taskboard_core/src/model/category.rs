//! Category domain model.
//!
//! # Invariants
//! - `name` is stored trimmed and is never empty.
//! - Name comparison for uniqueness is case-insensitive.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a category.
pub type CategoryId = Uuid;

/// Maximum number of categories that may exist at the same time.
pub const MAX_CATEGORIES: usize = 5;

/// User-defined label that tasks can be grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Creates a category with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a category with a caller-provided ID (snapshot restore).
    pub fn with_id(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns whether `name` denotes this category, ignoring case.
    pub fn matches_name(&self, name: &str) -> bool {
        fold_name(&self.name) == fold_name(name)
    }
}

/// Trims a category name and returns `None` when nothing is left.
pub fn normalize_category_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn fold_name(value: &str) -> String {
    value.trim().to_lowercase()
}
