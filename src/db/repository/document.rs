use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{map_sqlite_error, DatabaseError};
use crate::models::{CategoryCount, Document};

const DOCUMENT_COLUMNS: &str = "id, original_file_name, original_fingerprint, vault_object_name,
     title, category, user_category, user_title, extracted_text, metadata, confidence,
     file_size_bytes, mime_type, source_folder, imported_at, is_favorite";

/// Insert a document row. A duplicate fingerprint surfaces as
/// `DatabaseError::ConstraintViolation` — callers treat that as a lost
/// dedup race, not a failure.
pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, original_file_name, original_fingerprint, vault_object_name,
         title, category, user_category, user_title, extracted_text, metadata, confidence,
         file_size_bytes, mime_type, source_folder, imported_at, is_favorite)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            doc.id.to_string(),
            doc.original_file_name,
            doc.original_fingerprint,
            doc.vault_object_name,
            doc.title,
            doc.category,
            doc.user_category,
            doc.user_title,
            doc.extracted_text,
            doc.metadata,
            doc.confidence,
            doc.file_size_bytes as i64,
            doc.mime_type,
            doc.source_folder,
            doc.imported_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            doc.is_favorite as i32,
        ],
    )
    .map_err(map_sqlite_error)?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], row_to_document_row);
    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fast duplicate check against the unique fingerprint index.
pub fn exists_by_fingerprint(conn: &Connection, fingerprint: &str) -> Result<bool, DatabaseError> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM documents WHERE original_fingerprint = ?1)",
        params![fingerprint],
        |row| row.get(0),
    )?;
    Ok(exists != 0)
}

/// Record a user category correction. The classifier's original output stays
/// in `category`; the override lives in `user_category` and wins on reads.
pub fn update_category(conn: &Connection, id: &Uuid, category: &str) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET user_category = ?2 WHERE id = ?1",
        params![id.to_string(), category],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn update_title(conn: &Connection, id: &Uuid, title: &str) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET user_title = ?2 WHERE id = ?1",
        params![id.to_string(), title],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_favorite(conn: &Connection, id: &Uuid, favorite: bool) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE documents SET is_favorite = ?2 WHERE id = ?1",
        params![id.to_string(), favorite as i32],
    )?;
    Ok(())
}

pub fn delete_document(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "DELETE FROM documents WHERE id = ?1",
        params![id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Substring search across title, text, categories and metadata.
pub fn search_documents(conn: &Connection, query: &str) -> Result<Vec<Document>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents
         WHERE title LIKE '%' || ?1 || '%'
            OR extracted_text LIKE '%' || ?1 || '%'
            OR category LIKE '%' || ?1 || '%'
            OR user_category LIKE '%' || ?1 || '%'
            OR user_title LIKE '%' || ?1 || '%'
            OR metadata LIKE '%' || ?1 || '%'
         ORDER BY imported_at DESC"
    ))?;
    let docs = collect_documents(stmt.query_map(params![query], row_to_document_row)?);
    docs
}

/// Document counts grouped by effective category (user override wins).
pub fn category_counts(conn: &Connection) -> Result<Vec<CategoryCount>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT CASE WHEN user_category IS NOT NULL THEN user_category ELSE category END
                AS effective_category,
                COUNT(*) AS count
         FROM documents
         GROUP BY effective_category
         ORDER BY effective_category",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CategoryCount {
            category: row.get(0)?,
            count: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn recent_documents(conn: &Connection, limit: u32) -> Result<Vec<Document>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY imported_at DESC LIMIT ?1"
    ))?;
    let docs = collect_documents(stmt.query_map(params![limit], row_to_document_row)?);
    docs
}

pub fn total_count(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn total_size(conn: &Connection) -> Result<u64, DatabaseError> {
    let size: Option<i64> = conn.query_row(
        "SELECT SUM(file_size_bytes) FROM documents",
        [],
        |row| row.get(0),
    )?;
    Ok(size.unwrap_or(0) as u64)
}

// Internal row type for Document mapping
struct DocumentRow {
    id: String,
    original_file_name: String,
    original_fingerprint: String,
    vault_object_name: String,
    title: String,
    category: String,
    user_category: Option<String>,
    user_title: Option<String>,
    extracted_text: String,
    metadata: String,
    confidence: f32,
    file_size_bytes: i64,
    mime_type: String,
    source_folder: String,
    imported_at: String,
    is_favorite: i32,
}

fn row_to_document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get(0)?,
        original_file_name: row.get(1)?,
        original_fingerprint: row.get(2)?,
        vault_object_name: row.get(3)?,
        title: row.get(4)?,
        category: row.get(5)?,
        user_category: row.get(6)?,
        user_title: row.get(7)?,
        extracted_text: row.get(8)?,
        metadata: row.get(9)?,
        confidence: row.get(10)?,
        file_size_bytes: row.get(11)?,
        mime_type: row.get(12)?,
        source_folder: row.get(13)?,
        imported_at: row.get(14)?,
        is_favorite: row.get(15)?,
    })
}

fn collect_documents(
    rows: impl Iterator<Item = rusqlite::Result<DocumentRow>>,
) -> Result<Vec<Document>, DatabaseError> {
    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row?)?);
    }
    Ok(docs)
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        original_file_name: row.original_file_name,
        original_fingerprint: row.original_fingerprint,
        vault_object_name: row.vault_object_name,
        title: row.title,
        category: row.category,
        user_category: row.user_category,
        user_title: row.user_title,
        extracted_text: row.extracted_text,
        metadata: row.metadata,
        confidence: row.confidence,
        file_size_bytes: row.file_size_bytes as u64,
        mime_type: row.mime_type,
        source_folder: row.source_folder,
        imported_at: NaiveDateTime::parse_from_str(&row.imported_at, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&row.imported_at, "%Y-%m-%dT%H:%M:%S"))
            .unwrap_or_default(),
        is_favorite: row.is_favorite != 0,
    })
}
