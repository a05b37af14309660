use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::LearnedKeyword;

/// All learned keywords. The classifier applies its own precedence
/// (longest keyword wins), so no ordering is promised here.
pub fn all_learned_keywords(conn: &Connection) -> Result<Vec<LearnedKeyword>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT keyword, assigned_category, frequency FROM learned_keywords")?;
    let rows = stmt.query_map([], |row| {
        Ok(LearnedKeyword {
            keyword: row.get(0)?,
            assigned_category: row.get(1)?,
            frequency: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Upsert a learned keyword. Repeating a correction for an existing keyword
/// re-points its category and bumps the frequency.
pub fn upsert_learned_keyword(
    conn: &Connection,
    keyword: &LearnedKeyword,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO learned_keywords (keyword, assigned_category, frequency)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(keyword) DO UPDATE SET
             assigned_category = excluded.assigned_category,
             frequency = learned_keywords.frequency + 1",
        params![keyword.keyword, keyword.assigned_category, keyword.frequency],
    )?;
    Ok(())
}

pub fn delete_learned_keyword(conn: &Connection, keyword: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM learned_keywords WHERE keyword = ?1",
        params![keyword],
    )?;
    Ok(())
}
