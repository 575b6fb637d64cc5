//! Database schema definitions
//!
//! Worksheets are stored generically: one row per worksheet holding its header,
//! and one row per data row holding its cells as a JSON array of strings.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Named worksheets and their header rows
CREATE TABLE IF NOT EXISTS worksheets (
    name TEXT PRIMARY KEY,
    header TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Append-only data rows
CREATE TABLE IF NOT EXISTS worksheet_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    worksheet TEXT NOT NULL REFERENCES worksheets(name),
    cells TEXT NOT NULL,
    appended_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_worksheet_rows_sheet ON worksheet_rows(worksheet, id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
