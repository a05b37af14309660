//! Trait boundaries consumed by the import pipeline.
//!
//! Two seams keep the pipeline testable and host-portable:
//! - `DocumentStore`: the durable metadata repository (SQLite in this crate,
//!   anything row-transactional in a host)
//! - `TextRecognizer`: on-device raster OCR, a platform integration

use std::path::Path;
use uuid::Uuid;

use super::ImportError;
use crate::db::DatabaseError;
use crate::models::{CategoryCount, Document, LearnedKeyword};

/// Durable metadata store for documents, learned keywords and categories.
/// All operations are transactional at the single-row level.
pub trait DocumentStore: Send + Sync {
    /// Duplicate check against the unique fingerprint index.
    fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool, DatabaseError>;

    /// Insert a document row. A duplicate fingerprint must surface as
    /// `DatabaseError::ConstraintViolation` (lost dedup race, not a failure).
    fn insert(&self, document: &Document) -> Result<(), DatabaseError>;

    fn get_by_id(&self, id: &Uuid) -> Result<Option<Document>, DatabaseError>;

    /// Record a user category correction (sets the user override).
    fn update_category(&self, id: &Uuid, category: &str) -> Result<(), DatabaseError>;

    /// Record a user title correction (sets the user override).
    fn update_title(&self, id: &Uuid, title: &str) -> Result<(), DatabaseError>;

    fn delete_by_id(&self, id: &Uuid) -> Result<(), DatabaseError>;

    /// Document counts grouped by effective category.
    fn category_counts(&self) -> Result<Vec<CategoryCount>, DatabaseError>;

    fn search(&self, query: &str) -> Result<Vec<Document>, DatabaseError>;

    fn recent(&self, limit: u32) -> Result<Vec<Document>, DatabaseError>;

    fn learned_keywords(&self) -> Result<Vec<LearnedKeyword>, DatabaseError>;

    /// Upsert a learned keyword (repeat corrections bump the frequency).
    fn learn_keyword(&self, keyword: &LearnedKeyword) -> Result<(), DatabaseError>;
}

/// On-device text recognition over a raster image.
///
/// Recognition engines are platform integrations; the crate ships
/// `NoopRecognizer` for hosts without one. Extraction failure degrades to
/// empty text and never fails an import on its own.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<String, ImportError>;
}

/// Recognizer for hosts without an OCR engine: every image reads as empty,
/// so classification falls back to filename signals.
pub struct NoopRecognizer;

impl TextRecognizer for NoopRecognizer {
    fn recognize(&self, _image: &Path) -> Result<String, ImportError> {
        Ok(String::new())
    }
}
