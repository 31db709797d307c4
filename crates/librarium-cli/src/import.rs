//! JSON catalog import.
//!
//! Reads a JSON file of books, authors, and series and inserts everything in
//! one transaction. Author and series rows are reused by exact name within a
//! run, so one import never creates exact-name duplicates of itself; fuzzy
//! duplicates against existing rows are the scanner's job, not the importer's.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use librarium_core::EntityType;
use librarium_db::Database;
use librarium_db::catalog::{
    self, NewBook, add_author, add_series, find_by_name, link_book_author, link_book_series,
};
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ImportFile {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub series: Vec<String>,
    #[serde(default)]
    pub books: Vec<ImportBook>,
}

#[derive(Debug, Deserialize)]
pub struct ImportBook {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub narrator: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportStats {
    pub books: usize,
    pub authors: usize,
    pub series: usize,
}

pub fn import_json(db: &Database, file: &Path) -> anyhow::Result<ImportStats> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let parsed: ImportFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", file.display()))?;

    let conn = db.conn();
    let tx = conn.unchecked_transaction()?;
    let mut stats = ImportStats::default();
    let mut authors: HashMap<String, i64> = HashMap::new();
    let mut series: HashMap<String, i64> = HashMap::new();

    for name in &parsed.authors {
        resolve_author(&tx, &mut authors, &mut stats, name)?;
    }
    for name in &parsed.series {
        resolve_series(&tx, &mut series, &mut stats, name)?;
    }

    for book in &parsed.books {
        let narrator_id = book
            .narrator
            .as_deref()
            .map(|n| resolve_author(&tx, &mut authors, &mut stats, n))
            .transpose()?;
        let book_id = catalog::add_book(
            &tx,
            &NewBook {
                title: &book.title,
                isbn: book.isbn.as_deref(),
                asin: book.asin.as_deref(),
                narrator_id,
                published_year: book.published_year,
            },
        )?;
        stats.books += 1;

        for (position, name) in book.authors.iter().enumerate() {
            let author_id = resolve_author(&tx, &mut authors, &mut stats, name)?;
            link_book_author(&tx, book_id, author_id, position as i64)?;
        }
        if let Some(name) = book.series.as_deref() {
            let series_id = resolve_series(&tx, &mut series, &mut stats, name)?;
            link_book_series(&tx, book_id, series_id, book.sequence.as_deref())?;
        }
    }

    tx.commit()?;
    Ok(stats)
}

fn resolve_author(
    conn: &Connection,
    cache: &mut HashMap<String, i64>,
    stats: &mut ImportStats,
    name: &str,
) -> anyhow::Result<i64> {
    if let Some(&id) = cache.get(name) {
        return Ok(id);
    }
    let id = match find_by_name(conn, EntityType::Author, name)? {
        Some(id) => id,
        None => {
            stats.authors += 1;
            add_author(conn, name)?
        }
    };
    cache.insert(name.to_string(), id);
    Ok(id)
}

fn resolve_series(
    conn: &Connection,
    cache: &mut HashMap<String, i64>,
    stats: &mut ImportStats,
    name: &str,
) -> anyhow::Result<i64> {
    if let Some(&id) = cache.get(name) {
        return Ok(id);
    }
    let id = match find_by_name(conn, EntityType::Series, name)? {
        Some(id) => id,
        None => {
            stats.series += 1;
            add_series(conn, name)?
        }
    };
    cache.insert(name.to_string(), id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn import_fixture(json: &str) -> (Database, ImportStats) {
        let db = Database::open_in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let stats = import_json(&db, file.path()).unwrap();
        (db, stats)
    }

    #[test]
    fn imports_books_with_links() {
        let (db, stats) = import_fixture(
            r#"{
                "books": [
                    {
                        "title": "Edge World",
                        "authors": ["B. V. Larson"],
                        "series": "Undying Mercenaries",
                        "sequence": "14",
                        "isbn": "9781234567890"
                    },
                    {
                        "title": "Velocity",
                        "authors": ["B. V. Larson"],
                        "series": "Undying Mercenaries",
                        "sequence": "3"
                    }
                ]
            }"#,
        );
        assert_eq!(stats.books, 2);
        assert_eq!(stats.authors, 1);
        assert_eq!(stats.series, 1);

        let counts = db.counts().unwrap();
        assert_eq!(counts.books, 2);
        assert_eq!(counts.authors, 1);
        assert_eq!(counts.series, 1);

        let links: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM book_series", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 2);
    }

    #[test]
    fn imports_narrator_as_author_row() {
        let (db, stats) = import_fixture(
            r#"{
                "books": [
                    {"title": "Project Hail Mary", "authors": ["Andy Weir"], "narrator": "Ray Porter"}
                ]
            }"#,
        );
        assert_eq!(stats.authors, 2);
        let narrator: String = db
            .conn()
            .query_row(
                "SELECT a.name FROM authors a JOIN books b ON b.narrator_id = a.id",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(narrator, "Ray Porter");
    }

    #[test]
    fn standalone_lists_and_exact_reuse() {
        let (db, stats) = import_fixture(
            r#"{
                "authors": ["Frank Herbert"],
                "series": ["Dune Chronicles"],
                "books": [
                    {"title": "Dune", "authors": ["Frank Herbert"], "series": "Dune Chronicles"}
                ]
            }"#,
        );
        assert_eq!(stats.authors, 1);
        assert_eq!(stats.series, 1);
        assert_eq!(db.counts().unwrap().authors, 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(import_json(&db, file.path()).is_err());
    }
}
