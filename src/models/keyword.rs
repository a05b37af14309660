use serde::{Deserialize, Serialize};

/// A keyword-to-category mapping learned from an explicit user correction.
///
/// Keyed by keyword. On future imports, any document whose text or filename
/// contains the keyword is assigned `assigned_category` before any heuristic
/// runs — user feedback out-ranks the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedKeyword {
    pub keyword: String,
    pub assigned_category: String,
    pub frequency: u32,
}

impl LearnedKeyword {
    pub fn new(keyword: impl Into<String>, assigned_category: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            assigned_category: assigned_category.into(),
            frequency: 1,
        }
    }
}
