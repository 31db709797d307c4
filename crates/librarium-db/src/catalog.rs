//! Catalog row helpers: inserts, links, and lookups.

use librarium_core::{Candidate, EntityType};
use rusqlite::{Connection, OptionalExtension, params};

use crate::DbError;

/// Table and display-name column for an entity type.
pub(crate) fn table_for(entity_type: EntityType) -> (&'static str, &'static str) {
    match entity_type {
        EntityType::Book => ("books", "title"),
        EntityType::Author => ("authors", "name"),
        EntityType::Series => ("series", "name"),
    }
}

/// A book to insert.
#[derive(Debug, Clone, Default)]
pub struct NewBook<'a> {
    pub title: &'a str,
    pub isbn: Option<&'a str>,
    pub asin: Option<&'a str>,
    pub narrator_id: Option<i64>,
    pub published_year: Option<i32>,
}

pub fn add_book(conn: &Connection, book: &NewBook<'_>) -> Result<i64, DbError> {
    conn.execute(
        "INSERT INTO books (title, isbn, asin, narrator_id, published_year) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![book.title, book.isbn, book.asin, book.narrator_id, book.published_year],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_author(conn: &Connection, name: &str) -> Result<i64, DbError> {
    conn.execute("INSERT INTO authors (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn add_series(conn: &Connection, name: &str) -> Result<i64, DbError> {
    conn.execute("INSERT INTO series (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn link_book_author(
    conn: &Connection,
    book_id: i64,
    author_id: i64,
    position: i64,
) -> Result<(), DbError> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO book_authors (book_id, author_id, position) VALUES (?1, ?2, ?3)",
    )?;
    stmt.execute(params![book_id, author_id, position])?;
    Ok(())
}

pub fn link_book_series(
    conn: &Connection,
    book_id: i64,
    series_id: i64,
    sequence: Option<&str>,
) -> Result<(), DbError> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO book_series (book_id, series_id, sequence) VALUES (?1, ?2, ?3)",
    )?;
    stmt.execute(params![book_id, series_id, sequence])?;
    Ok(())
}

/// Look up a book by identifying code (exact match on ISBN or ASIN).
pub fn find_book_by_code(
    conn: &Connection,
    code: &str,
    exclude_id: Option<i64>,
) -> Result<Option<(i64, String)>, DbError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, title FROM books WHERE (isbn = ?1 OR asin = ?1) AND id <> ?2 LIMIT 1",
    )?;
    let row = stmt
        .query_row(params![code, exclude_id.unwrap_or(-1)], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?;
    Ok(row)
}

/// Display name of an entity, if it exists.
pub fn entity_name(
    conn: &Connection,
    entity_type: EntityType,
    id: i64,
) -> Result<Option<String>, DbError> {
    let (table, name_col) = table_for(entity_type);
    let name = conn
        .query_row(
            &format!("SELECT {name_col} FROM {table} WHERE id = ?1"),
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}

/// Exact-name lookup, used by the import path to reuse existing rows.
pub fn find_by_name(
    conn: &Connection,
    entity_type: EntityType,
    name: &str,
) -> Result<Option<i64>, DbError> {
    let (table, name_col) = table_for(entity_type);
    let id = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE {name_col} = ?1 LIMIT 1"),
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// All entities of a type as scoring candidates. Book candidates carry their
/// first-position author name for title+author blending.
pub fn all_entities(conn: &Connection, entity_type: EntityType) -> Result<Vec<Candidate>, DbError> {
    let sql = match entity_type {
        EntityType::Book => {
            "SELECT b.id, b.title, \
               (SELECT a.name FROM authors a \
                  JOIN book_authors ba ON ba.author_id = a.id \
                 WHERE ba.book_id = b.id \
                 ORDER BY ba.position LIMIT 1) \
             FROM books b ORDER BY b.id"
        }
        EntityType::Author => "SELECT id, name, NULL FROM authors ORDER BY id",
        EntityType::Series => "SELECT id, name, NULL FROM series ORDER BY id",
    };
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Candidate {
                id: row.get(0)?,
                name: row.get(1)?,
                author: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Row counts for the stats command.
#[derive(Debug, Clone, Copy)]
pub struct CatalogCounts {
    pub books: i64,
    pub authors: i64,
    pub series: i64,
    pub ignored_pairs: i64,
}

pub fn counts(conn: &Connection) -> Result<CatalogCounts, DbError> {
    let count = |table: &str| -> Result<i64, rusqlite::Error> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    };
    Ok(CatalogCounts {
        books: count("books")?,
        authors: count("authors")?,
        series: count("series")?,
        ignored_pairs: count("ignored_pairs")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_name_lookup() {
        let conn = setup();
        let id = add_author(&conn, "Frank Herbert").unwrap();
        assert_eq!(
            entity_name(&conn, EntityType::Author, id).unwrap().as_deref(),
            Some("Frank Herbert")
        );
        assert_eq!(entity_name(&conn, EntityType::Author, id + 1).unwrap(), None);
    }

    #[test]
    fn find_book_by_code_matches_isbn_and_asin() {
        let conn = setup();
        let id = add_book(
            &conn,
            &NewBook {
                title: "Dune",
                isbn: Some("9780441013593"),
                asin: Some("B000R34YKC"),
                ..NewBook::default()
            },
        )
        .unwrap();

        let by_isbn = find_book_by_code(&conn, "9780441013593", None).unwrap();
        assert_eq!(by_isbn, Some((id, "Dune".to_string())));
        let by_asin = find_book_by_code(&conn, "B000R34YKC", None).unwrap();
        assert_eq!(by_asin, Some((id, "Dune".to_string())));
        assert_eq!(find_book_by_code(&conn, "no-such-code", None).unwrap(), None);
        assert_eq!(find_book_by_code(&conn, "9780441013593", Some(id)).unwrap(), None);
    }

    #[test]
    fn book_candidates_carry_first_author() {
        let conn = setup();
        let herbert = add_author(&conn, "Frank Herbert").unwrap();
        let anderson = add_author(&conn, "Kevin J. Anderson").unwrap();
        let book = add_book(&conn, &NewBook { title: "Hunters of Dune", ..NewBook::default() })
            .unwrap();
        link_book_author(&conn, book, anderson, 1).unwrap();
        link_book_author(&conn, book, herbert, 0).unwrap();

        let candidates = all_entities(&conn, EntityType::Book).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].author.as_deref(), Some("Frank Herbert"));
    }

    #[test]
    fn counts_reflect_rows() {
        let conn = setup();
        add_author(&conn, "A").unwrap();
        add_series(&conn, "S").unwrap();
        add_book(&conn, &NewBook { title: "B", ..NewBook::default() }).unwrap();
        let counts = counts(&conn).unwrap();
        assert_eq!(counts.books, 1);
        assert_eq!(counts.authors, 1);
        assert_eq!(counts.series, 1);
        assert_eq!(counts.ignored_pairs, 0);
    }
}
