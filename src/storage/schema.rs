//! Database schema definitions
//!
//! This module contains the SQL schema for the geolocation cache database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Resolved IP locations, one row per IP, never updated
CREATE TABLE IF NOT EXISTS geo_cache (
    ip TEXT PRIMARY KEY,
    city TEXT NOT NULL,
    country TEXT NOT NULL,
    resolved_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
