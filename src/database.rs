use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::models::Record;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

/// Location of one variant's database file.
///
/// A `Store` holds no connection itself; every request calls [`Store::connect`]
/// and the returned [`Database`] closes its connection when dropped.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection scoped to the caller
    pub fn connect(&self) -> Result<Database, DatabaseError> {
        Database::open(&self.path)
    }

    /// Ensure the table for `R` exists; safe to call on every start
    pub fn initialize<R: Record>(&self) -> Result<(), DatabaseError> {
        self.connect()?.initialize::<R>()
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database file, creating its parent directory if needed
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Database { conn })
    }

    /// In-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Database {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the table and indexes for `R` if they don't exist
    pub fn initialize<R: Record>(&self) -> Result<(), DatabaseError> {
        self.conn.execute(R::SQL.create_table, [])?;
        for index in R::SQL.create_indexes {
            self.conn.execute(index, [])?;
        }
        debug!(record = R::NOUN, "schema ready");
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// All rows in the record's declared order
    pub fn list<R: Record>(&self) -> Result<Vec<R>, DatabaseError> {
        let mut stmt = self.conn.prepare(R::SQL.list)?;
        let rows = stmt
            .query_map([], |row| R::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count<R: Record>(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self.conn.query_row(R::SQL.count, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert a draft and return the assigned id
    pub fn insert<R: Record>(&self, draft: &R::Draft) -> Result<i64, DatabaseError> {
        self.conn
            .execute(R::SQL.insert, rusqlite::params_from_iter(R::to_params(draft)))?;
        let id = self.conn.last_insert_rowid();
        debug!(record = R::NOUN, id, "inserted");
        Ok(id)
    }

    /// Fetch one row; a missing id is `Ok(None)`
    pub fn get<R: Record>(&self, id: i64) -> Result<Option<R>, DatabaseError> {
        let row = self
            .conn
            .query_row(R::SQL.fetch, rusqlite::params![id], |row| R::from_row(row))
            .optional()?;
        if row.is_none() {
            debug!(record = R::NOUN, id, "no such row");
        }
        Ok(row)
    }

    /// Overwrite every mutable field; returns whether a row was changed
    pub fn update<R: Record>(&self, id: i64, draft: &R::Draft) -> Result<bool, DatabaseError> {
        let mut params = R::to_params(draft);
        params.push(rusqlite::types::Value::Integer(id));
        let changed = self
            .conn
            .execute(R::SQL.update, rusqlite::params_from_iter(params))?;
        debug!(record = R::NOUN, id, changed, "updated");
        Ok(changed > 0)
    }

    /// Remove a row; returns whether a row was removed
    pub fn delete<R: Record>(&self, id: i64) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(R::SQL.delete, rusqlite::params![id])?;
        debug!(record = R::NOUN, id, changed, "deleted");
        Ok(changed > 0)
    }
}
