//! Candidate pre-filtering.
//!
//! Scoring every entity on every scan would be O(catalog size) edit-distance
//! work per query, so a cheap indexed LIKE filter narrows the pool first. The
//! filter trades recall for bounded latency: true duplicates practically
//! always share at least one significant token with the query.

use librarium_core::{Candidate, EntityType};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use rusqlite::types::ToSql;

use crate::DbError;

/// Upper bound on candidates fetched per query.
pub const CANDIDATE_LIMIT: usize = 100;
/// At most this many tokens participate in the filter.
const MAX_TOKENS: usize = 3;
/// Length of the raw-title prefix used when no usable tokens exist.
const FALLBACK_PREFIX_LEN: usize = 10;

/// Extract up to [`MAX_TOKENS`] significant lowercase tokens from a title.
/// Tokens of length <= 2 are not selective enough to filter on.
pub(crate) fn filter_tokens(title: &str) -> Vec<String> {
    static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9]+").unwrap());
    WORD_RE
        .find_iter(title)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() > 2)
        .take(MAX_TOKENS)
        .collect()
}

/// Escape LIKE wildcards; generated patterns use `ESCAPE '\'`.
fn like_escape(s: &str) -> String {
    s.replace('\\', r"\\").replace('%', r"\%").replace('_', r"\_")
}

/// Fetch a bounded candidate set whose names contain any significant token of
/// `title`, case-insensitively. Very short titles fall back to a prefix match
/// on the first [`FALLBACK_PREFIX_LEN`] characters. `exclude_id` keeps an
/// entity from matching itself during catalog scans.
pub fn find_candidates(
    conn: &Connection,
    entity_type: EntityType,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<Vec<Candidate>, DbError> {
    let tokens = filter_tokens(title);
    let patterns: Vec<String> = if tokens.is_empty() {
        let prefix: String = title.trim().chars().take(FALLBACK_PREFIX_LEN).collect();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        vec![format!("{}%", like_escape(&prefix))]
    } else {
        // Tokens are alphanumeric, no escaping needed.
        tokens.iter().map(|t| format!("%{t}%")).collect()
    };

    let name_col = match entity_type {
        EntityType::Book => "b.title",
        EntityType::Author | EntityType::Series => "name",
    };
    let clauses = (0..patterns.len())
        .map(|i| format!(r"{name_col} LIKE ?{} ESCAPE '\'", i + 2))
        .collect::<Vec<_>>()
        .join(" OR ");

    let sql = match entity_type {
        EntityType::Book => format!(
            "SELECT b.id, b.title, \
               (SELECT a.name FROM authors a \
                  JOIN book_authors ba ON ba.author_id = a.id \
                 WHERE ba.book_id = b.id \
                 ORDER BY ba.position LIMIT 1) \
             FROM books b WHERE b.id <> ?1 AND ({clauses}) \
             ORDER BY b.id LIMIT {CANDIDATE_LIMIT}"
        ),
        EntityType::Author => format!(
            "SELECT id, name, NULL FROM authors \
             WHERE id <> ?1 AND ({clauses}) ORDER BY id LIMIT {CANDIDATE_LIMIT}"
        ),
        EntityType::Series => format!(
            "SELECT id, name, NULL FROM series \
             WHERE id <> ?1 AND ({clauses}) ORDER BY id LIMIT {CANDIDATE_LIMIT}"
        ),
    };

    let mut bound: Vec<Box<dyn ToSql>> = vec![Box::new(exclude_id.unwrap_or(-1))];
    for pattern in &patterns {
        bound.push(Box::new(pattern.clone()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(bound.iter().map(|p| p.as_ref())),
            |row| {
                Ok(Candidate {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    author: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
