//! Transactional merge of duplicate catalog entities.
//!
//! A merge re-points every reference to the merged-away entities at the
//! chosen primary and deletes the losers, all inside one transaction. No
//! dangling foreign key and no duplicate junction row may survive a commit,
//! and a failed merge must leave the catalog untouched.

use librarium_core::{EntityType, MergeOutcome};
use rusqlite::{Connection, params};
use tracing::info;

use crate::{DbError, catalog};

/// Junction tables touched when merging an entity type:
/// `(table, column holding this entity's id, counterpart column)`.
fn junctions(entity_type: EntityType) -> &'static [(&'static str, &'static str, &'static str)] {
    match entity_type {
        EntityType::Book => &[
            ("book_authors", "book_id", "author_id"),
            ("book_series", "book_id", "series_id"),
        ],
        EntityType::Author => &[("book_authors", "author_id", "book_id")],
        EntityType::Series => &[("book_series", "series_id", "book_id")],
    }
}

/// Scalar foreign-key columns `(table, column)` pointing at an entity type.
fn scalar_fks(entity_type: EntityType) -> &'static [(&'static str, &'static str)] {
    match entity_type {
        EntityType::Author => &[("books", "narrator_id")],
        EntityType::Book | EntityType::Series => &[],
    }
}

/// Merge one or more entities into `primary_id`, atomically.
///
/// Every row referencing a merged-away id is rewritten to the primary or
/// dropped (when the primary already holds the equivalent link, keeping the
/// primary's payload), then the losers are deleted. Any failure rolls the
/// whole transaction back; partial merges are never observable.
pub fn merge_entities(
    conn: &Connection,
    entity_type: EntityType,
    primary_id: i64,
    merge_ids: &[i64],
) -> Result<MergeOutcome, DbError> {
    if merge_ids.is_empty() {
        return Err(DbError::Validation("merge requires at least one source id".into()));
    }
    if merge_ids.contains(&primary_id) {
        return Err(DbError::Validation(format!(
            "primary {entity_type} {primary_id} cannot be in its own merge set"
        )));
    }

    // Loser ids are integers; inline them rather than building dynamic
    // placeholder lists.
    let id_list = merge_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let tx = conn.unchecked_transaction()?;

    let name = catalog::entity_name(&tx, entity_type, primary_id)?
        .ok_or(DbError::NotFound { entity_type, id: primary_id })?;

    for (table, column) in scalar_fks(entity_type) {
        tx.execute(
            &format!("UPDATE {table} SET {column} = ?1 WHERE {column} IN ({id_list})"),
            params![primary_id],
        )?;
    }

    for (table, entity_col, other_col) in junctions(entity_type) {
        // Drop loser links whose counterpart is already linked to the
        // primary; the primary row's payload wins.
        tx.execute(
            &format!(
                "DELETE FROM {table} WHERE {entity_col} IN ({id_list}) \
                 AND {other_col} IN \
                   (SELECT {other_col} FROM {table} WHERE {entity_col} = ?1)"
            ),
            params![primary_id],
        )?;
        // Re-point the rest, carrying their payload columns along. OR IGNORE
        // covers two losers sharing a counterpart: the first one wins.
        tx.execute(
            &format!(
                "UPDATE OR IGNORE {table} SET {entity_col} = ?1 \
                 WHERE {entity_col} IN ({id_list})"
            ),
            params![primary_id],
        )?;
        // Sweep whatever still references a loser.
        tx.execute(&format!("DELETE FROM {table} WHERE {entity_col} IN ({id_list})"), [])?;
    }

    let (table, _) = catalog::table_for(entity_type);
    let merged = tx.execute(&format!("DELETE FROM {table} WHERE id IN ({id_list})"), [])?;

    tx.commit()?;
    info!(entity_type = %entity_type, primary_id, merged, "merged catalog entities");
    Ok(MergeOutcome { merged, name })
}
