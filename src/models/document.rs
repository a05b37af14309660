use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The durable record for one imported document.
///
/// `original_fingerprint` is unique across all stored documents — the import
/// pipeline relies on the index for deduplication. `category`/`title` hold
/// the classifier's output; the `user_*` fields hold explicit corrections
/// and always win when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub original_file_name: String,
    pub original_fingerprint: String,
    pub vault_object_name: String,
    pub title: String,
    pub category: String,
    pub user_category: Option<String>,
    pub user_title: Option<String>,
    pub extracted_text: String,
    /// JSON blob of extracted metadata (dates, amounts, document numbers).
    pub metadata: String,
    pub confidence: f32,
    pub file_size_bytes: u64,
    pub mime_type: String,
    pub source_folder: String,
    pub imported_at: NaiveDateTime,
    pub is_favorite: bool,
}

impl Document {
    pub fn effective_category(&self) -> &str {
        self.user_category.as_deref().unwrap_or(&self.category)
    }

    pub fn effective_title(&self) -> &str {
        self.user_title.as_deref().unwrap_or(&self.title)
    }
}

/// One row of the per-category aggregation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u32,
}
