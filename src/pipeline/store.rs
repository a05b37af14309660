//! SQLite-backed implementation of the `DocumentStore` trait.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;
use uuid::Uuid;

use super::traits::DocumentStore;
use crate::db::{repository, sqlite, DatabaseError};
use crate::models::{CategoryCount, Document, LearnedKeyword};

/// `DocumentStore` over a single SQLite connection.
///
/// The connection is mutex-guarded: concurrent pipeline tasks serialize on
/// it, which also makes each dedup check and insert row-transactional.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_database(path)?),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_memory_database()?),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool, DatabaseError> {
        repository::exists_by_fingerprint(&self.lock(), fingerprint)
    }

    fn insert(&self, document: &Document) -> Result<(), DatabaseError> {
        repository::insert_document(&self.lock(), document)
    }

    fn get_by_id(&self, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
        repository::get_document(&self.lock(), id)
    }

    fn update_category(&self, id: &Uuid, category: &str) -> Result<(), DatabaseError> {
        repository::update_category(&self.lock(), id, category)
    }

    fn update_title(&self, id: &Uuid, title: &str) -> Result<(), DatabaseError> {
        repository::update_title(&self.lock(), id, title)
    }

    fn delete_by_id(&self, id: &Uuid) -> Result<(), DatabaseError> {
        repository::delete_document(&self.lock(), id)
    }

    fn category_counts(&self) -> Result<Vec<CategoryCount>, DatabaseError> {
        repository::category_counts(&self.lock())
    }

    fn search(&self, query: &str) -> Result<Vec<Document>, DatabaseError> {
        repository::search_documents(&self.lock(), query)
    }

    fn recent(&self, limit: u32) -> Result<Vec<Document>, DatabaseError> {
        repository::recent_documents(&self.lock(), limit)
    }

    fn learned_keywords(&self) -> Result<Vec<LearnedKeyword>, DatabaseError> {
        repository::all_learned_keywords(&self.lock())
    }

    fn learn_keyword(&self, keyword: &LearnedKeyword) -> Result<(), DatabaseError> {
        repository::upsert_learned_keyword(&self.lock(), keyword)
    }
}
