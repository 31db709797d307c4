//! SQLite-backed catalog storage and the duplicate/merge workflow.
//!
//! Owns the schema, the candidate pre-filter, the ignored-pair store, and the
//! transactional merge engine. Scoring itself is pure and lives in
//! `librarium-core`; this crate feeds it bounded candidate sets and persists
//! the outcomes.

pub mod catalog;
pub mod filter;
pub mod ignore;
pub mod merge;
pub mod scan;
pub mod schema;

use std::path::{Path, PathBuf};

use librarium_core::{DuplicatePair, EntityType, Match, MatchConfig, MergeOutcome};
use rusqlite::Connection;
use thiserror::Error;

pub use catalog::{CatalogCounts, NewBook};
pub use filter::CANDIDATE_LIMIT;
pub use scan::FindQuery;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: EntityType, id: i64 },
    #[error("no catalog schema at {0}; create one with `librarium init`")]
    MissingSchema(PathBuf),
}

/// Handle to an opened catalog database.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open an existing catalog database, verifying the schema is present.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;

        let table_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='books'",
            [],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(DbError::MissingSchema(path.to_path_buf()));
        }
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Create (or open) a catalog database, initializing the schema.
    pub fn create(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::init_schema(&conn)?;
        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// In-memory catalog with schema, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self { conn, path: PathBuf::from(":memory:") })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// See [`scan::find_matches`].
    pub fn find_matches(
        &self,
        entity_type: EntityType,
        query: &FindQuery,
        config: &MatchConfig,
    ) -> Result<Vec<Match>, DbError> {
        scan::find_matches(&self.conn, entity_type, query, config)
    }

    /// See [`scan::scan_catalog`].
    pub fn scan_catalog(
        &self,
        entity_type: EntityType,
        config: &MatchConfig,
    ) -> Result<Vec<DuplicatePair>, DbError> {
        scan::scan_catalog(&self.conn, entity_type, config)
    }

    /// See [`ignore::ignore_pair`].
    pub fn ignore_pair(
        &self,
        entity_type: EntityType,
        id1: i64,
        id2: i64,
        actor: &str,
    ) -> Result<(), DbError> {
        ignore::ignore_pair(&self.conn, entity_type, id1, id2, actor)
    }

    /// See [`ignore::unignore_pair`].
    pub fn unignore_pair(
        &self,
        entity_type: EntityType,
        id1: i64,
        id2: i64,
    ) -> Result<bool, DbError> {
        ignore::unignore_pair(&self.conn, entity_type, id1, id2)
    }

    /// See [`ignore::is_ignored`].
    pub fn is_ignored(&self, entity_type: EntityType, id1: i64, id2: i64) -> Result<bool, DbError> {
        ignore::is_ignored(&self.conn, entity_type, id1, id2)
    }

    /// See [`merge::merge_entities`].
    pub fn merge(
        &self,
        entity_type: EntityType,
        primary_id: i64,
        merge_ids: &[i64],
    ) -> Result<MergeOutcome, DbError> {
        merge::merge_entities(&self.conn, entity_type, primary_id, merge_ids)
    }

    /// See [`catalog::counts`].
    pub fn counts(&self) -> Result<CatalogCounts, DbError> {
        catalog::counts(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        // Create a bare SQLite file with no catalog schema.
        drop(Connection::open(&path).unwrap());

        let err = Database::open(&path).unwrap_err();
        assert!(matches!(err, DbError::MissingSchema(_)));
    }

    #[test]
    fn create_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let db = Database::create(&path).unwrap();
            catalog::add_author(db.conn(), "Frank Herbert").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.counts().unwrap().authors, 1);
        assert_eq!(db.path(), path.as_path());
    }

    #[test]
    fn create_makes_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("catalog.db");
        let db = Database::create(&path).unwrap();
        assert_eq!(db.counts().unwrap().books, 0);
    }
}
