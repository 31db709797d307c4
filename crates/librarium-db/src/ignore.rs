//! Ignored-pair store.
//!
//! Pairs a human has marked "not a duplicate". Each pair is stored once in
//! canonical order (smaller id first) so lookups succeed regardless of
//! argument order; scans consult this store before surfacing any match.

use std::collections::HashSet;

use librarium_core::EntityType;
use rusqlite::{Connection, params};
use tracing::debug;

use crate::DbError;

fn canonical(id1: i64, id2: i64) -> (i64, i64) {
    if id1 <= id2 { (id1, id2) } else { (id2, id1) }
}

fn reject_same_id(entity_type: EntityType, id1: i64, id2: i64) -> Result<(), DbError> {
    if id1 == id2 {
        return Err(DbError::Validation(format!(
            "a pair needs two distinct {entity_type} ids, got {id1} twice"
        )));
    }
    Ok(())
}

/// Record a pair as not-a-duplicate. Idempotent: ignoring an already-ignored
/// pair succeeds without creating a second row.
pub fn ignore_pair(
    conn: &Connection,
    entity_type: EntityType,
    id1: i64,
    id2: i64,
    actor: &str,
) -> Result<(), DbError> {
    reject_same_id(entity_type, id1, id2)?;
    let (lo, hi) = canonical(id1, id2);
    conn.execute(
        "INSERT INTO ignored_pairs (entity_type, entity_id1, entity_id2, created_by) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(entity_type, entity_id1, entity_id2) DO NOTHING",
        params![entity_type.as_str(), lo, hi, actor],
    )?;
    debug!(entity_type = %entity_type, lo, hi, actor, "pair marked not-a-duplicate");
    Ok(())
}

/// Remove a pair from the ignore list. Returns whether a row existed.
pub fn unignore_pair(
    conn: &Connection,
    entity_type: EntityType,
    id1: i64,
    id2: i64,
) -> Result<bool, DbError> {
    reject_same_id(entity_type, id1, id2)?;
    let (lo, hi) = canonical(id1, id2);
    let removed = conn.execute(
        "DELETE FROM ignored_pairs \
         WHERE entity_type = ?1 AND entity_id1 = ?2 AND entity_id2 = ?3",
        params![entity_type.as_str(), lo, hi],
    )?;
    Ok(removed > 0)
}

/// Whether a pair has been dismissed, in either id order.
pub fn is_ignored(
    conn: &Connection,
    entity_type: EntityType,
    id1: i64,
    id2: i64,
) -> Result<bool, DbError> {
    let (lo, hi) = canonical(id1, id2);
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM ignored_pairs \
         WHERE entity_type = ?1 AND entity_id1 = ?2 AND entity_id2 = ?3",
    )?;
    let count: i64 = stmt.query_row(params![entity_type.as_str(), lo, hi], |row| row.get(0))?;
    Ok(count > 0)
}

/// All dismissed pairs for a type, in canonical order, for O(1) gating during
/// catalog scans. Callers canonicalize before probing.
pub fn all_ignored_pairs(
    conn: &Connection,
    entity_type: EntityType,
) -> Result<HashSet<(i64, i64)>, DbError> {
    let mut stmt = conn.prepare_cached(
        "SELECT entity_id1, entity_id2 FROM ignored_pairs WHERE entity_type = ?1",
    )?;
    let pairs = stmt
        .query_map(params![entity_type.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(pairs)
}
