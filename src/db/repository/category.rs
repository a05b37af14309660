use rusqlite::{params, Connection};

use crate::db::{map_sqlite_error, DatabaseError};
use crate::models::CustomCategory;

pub fn all_custom_categories(conn: &Connection) -> Result<Vec<CustomCategory>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT name, emoji FROM custom_categories ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(CustomCategory {
            name: row.get(0)?,
            emoji: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn add_custom_category(
    conn: &Connection,
    category: &CustomCategory,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO custom_categories (name, emoji) VALUES (?1, ?2)",
        params![category.name, category.emoji],
    )
    .map_err(map_sqlite_error)?;
    Ok(())
}

pub fn delete_custom_category(conn: &Connection, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM custom_categories WHERE name = ?1",
        params![name],
    )?;
    Ok(())
}
