//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TabularStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Record, StorageError, StorageResult, TabularStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite worksheet backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a worksheet database at the given path
    ///
    /// Missing parent directories are created.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Loads all data rows of a worksheet as raw cell vectors, in append order
    fn load_rows(&self, name: &str) -> StorageResult<Vec<Vec<String>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cells FROM worksheet_rows WHERE worksheet = ?1 ORDER BY id ASC")?;

        let encoded = stmt
            .query_map(params![name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        encoded
            .iter()
            .map(|cells| serde_json::from_str(cells).map_err(StorageError::from))
            .collect()
    }

    fn check_width(&self, name: &str, header_len: usize, row: &[String]) -> StorageResult<()> {
        if row.len() != header_len {
            return Err(StorageError::RowWidth {
                worksheet: name.to_string(),
                expected: header_len,
                actual: row.len(),
            });
        }
        Ok(())
    }
}

impl TabularStore for SqliteStore {
    fn ensure_worksheet(&mut self, name: &str, header: &[&str]) -> StorageResult<bool> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT header FROM worksheets WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(false);
        }

        let encoded = serde_json::to_string(header)?;
        self.conn.execute(
            "INSERT INTO worksheets (name, header, created_at) VALUES (?1, ?2, ?3)",
            params![name, encoded, Utc::now().to_rfc3339()],
        )?;

        tracing::info!("Created worksheet '{}'", name);
        Ok(true)
    }

    fn header(&self, name: &str) -> StorageResult<Vec<String>> {
        let encoded: Option<String> = self
            .conn
            .query_row(
                "SELECT header FROM worksheets WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match encoded {
            Some(header) => Ok(serde_json::from_str(&header)?),
            None => Err(StorageError::WorksheetNotFound(name.to_string())),
        }
    }

    fn read_records(&self, name: &str) -> StorageResult<Vec<Record>> {
        let header = self.header(name)?;
        let rows = self.load_rows(name)?;

        let records = rows
            .into_iter()
            .map(|cells| {
                header
                    .iter()
                    .enumerate()
                    .map(|(i, column)| (column.clone(), cells.get(i).cloned().unwrap_or_default()))
                    .collect::<Record>()
            })
            .collect();

        Ok(records)
    }

    fn read_column(&self, name: &str, column: &str) -> StorageResult<Vec<String>> {
        let header = self.header(name)?;
        let index = header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| StorageError::ColumnNotFound {
                worksheet: name.to_string(),
                column: column.to_string(),
            })?;

        let values = self
            .load_rows(name)?
            .into_iter()
            .map(|cells| cells.get(index).cloned().unwrap_or_default())
            .collect();

        Ok(values)
    }

    fn append_row(&mut self, name: &str, row: &[String]) -> StorageResult<()> {
        let header = self.header(name)?;
        self.check_width(name, header.len(), row)?;

        self.conn.execute(
            "INSERT INTO worksheet_rows (worksheet, cells, appended_at) VALUES (?1, ?2, ?3)",
            params![name, serde_json::to_string(row)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn append_rows(&mut self, name: &str, rows: &[Vec<String>]) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let header = self.header(name)?;
        for row in rows {
            self.check_width(name, header.len(), row)?;
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO worksheet_rows (worksheet, cells, appended_at) VALUES (?1, ?2, ?3)",
            )?;
            for row in rows {
                stmt.execute(params![name, serde_json::to_string(row)?, now])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn count_rows(&self, name: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM worksheet_rows WHERE worksheet = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
