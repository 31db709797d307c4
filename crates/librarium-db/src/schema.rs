//! Catalog schema.

use rusqlite::Connection;

use crate::DbError;

/// Initialize the database with the required schema.
pub fn init_schema(conn: &Connection) -> Result<(), DbError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS series (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            isbn TEXT,
            asin TEXT,
            narrator_id INTEGER REFERENCES authors(id),
            published_year INTEGER
        );

        CREATE TABLE IF NOT EXISTS book_authors (
            book_id INTEGER NOT NULL REFERENCES books(id),
            author_id INTEGER NOT NULL REFERENCES authors(id),
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (book_id, author_id)
        );

        CREATE TABLE IF NOT EXISTS book_series (
            book_id INTEGER NOT NULL REFERENCES books(id),
            series_id INTEGER NOT NULL REFERENCES series(id),
            sequence TEXT,
            PRIMARY KEY (book_id, series_id)
        );

        CREATE TABLE IF NOT EXISTS ignored_pairs (
            entity_type TEXT NOT NULL,
            entity_id1 INTEGER NOT NULL,
            entity_id2 INTEGER NOT NULL,
            created_by TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
            PRIMARY KEY (entity_type, entity_id1, entity_id2),
            CHECK (entity_id1 < entity_id2)
        );

        CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors(author_id);
        CREATE INDEX IF NOT EXISTS idx_book_series_series ON book_series(series_id);
        CREATE INDEX IF NOT EXISTS idx_books_narrator ON books(narrator_id);
        CREATE INDEX IF NOT EXISTS idx_books_title ON books(title);
        CREATE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        for table in ["books", "authors", "series", "book_authors", "book_series", "ignored_pairs"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{table} missing");
        }
    }

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn ignored_pairs_rejects_unordered_rows() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO ignored_pairs (entity_type, entity_id1, entity_id2, created_by) \
             VALUES ('author', 9, 5, 'test')",
            [],
        );
        assert!(result.is_err());
    }
}
