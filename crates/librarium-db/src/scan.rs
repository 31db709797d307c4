//! Duplicate scanning: single-query match lookup and catalog-wide sweeps.

use std::collections::HashSet;

use librarium_core::{
    Candidate, DuplicatePair, EntityType, Match, MatchConfig, MatchQuery, MatchType, rank,
};
use rusqlite::Connection;
use tracing::debug;

use crate::{DbError, catalog, filter, ignore};

/// Input for a duplicate lookup: an identifying code, a title, or both.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Identifying code (ISBN/ASIN); meaningful for books only.
    pub code: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Entity to exclude, when scanning on behalf of an existing entity
    /// rather than incoming metadata.
    pub exclude_id: Option<i64>,
}

/// Find duplicate matches for a single query.
///
/// An exact identifying-code hit wins outright: it is returned as the sole
/// match at score 100 without fuzzy scoring, regardless of any title also
/// supplied. Otherwise the candidate pre-filter bounds the pool and the
/// ranker scores it. No matches is an empty result, not an error.
pub fn find_matches(
    conn: &Connection,
    entity_type: EntityType,
    query: &FindQuery,
    config: &MatchConfig,
) -> Result<Vec<Match>, DbError> {
    let code = query.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
    if entity_type == EntityType::Book
        && let Some(code) = code
        && let Some((id, title)) = catalog::find_book_by_code(conn, code, query.exclude_id)?
    {
        return Ok(vec![Match { id, name: title, score: 100, match_type: MatchType::ExactId }]);
    }

    let title = query.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let Some(title) = title else {
        if code.is_some() {
            // Code-only lookup that found nothing.
            return Ok(Vec::new());
        }
        return Err(DbError::Validation(
            "a duplicate lookup needs a title or an identifying code".into(),
        ));
    };

    let candidates = filter::find_candidates(conn, entity_type, title, query.exclude_id)?;
    debug!(entity_type = %entity_type, candidates = candidates.len(), "scoring candidates");
    let match_query = MatchQuery { title: title.to_string(), author: query.author.clone() };
    Ok(rank(entity_type, &match_query, &candidates, config))
}

/// Scan every entity of a type for duplicates.
///
/// Emits each qualifying pair once with the smaller id first, skipping pairs
/// a human has already dismissed (in either id order), sorted by score
/// descending. Pure read: each scan re-queries current data, so results
/// reflect merges and deletes immediately.
pub fn scan_catalog(
    conn: &Connection,
    entity_type: EntityType,
    config: &MatchConfig,
) -> Result<Vec<DuplicatePair>, DbError> {
    let entities = catalog::all_entities(conn, entity_type)?;
    let ignored = ignore::all_ignored_pairs(conn, entity_type)?;

    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut pairs = Vec::new();
    for entity in &entities {
        for found in scan_one(conn, entity_type, entity, config)? {
            let key = if entity.id < found.id { (entity.id, found.id) } else { (found.id, entity.id) };
            if ignored.contains(&key) || !seen.insert(key) {
                continue;
            }
            let (name1, name2) = if entity.id < found.id {
                (entity.name.clone(), found.name)
            } else {
                (found.name, entity.name.clone())
            };
            pairs.push(DuplicatePair {
                id1: key.0,
                id2: key.1,
                name1,
                name2,
                score: found.score,
                match_type: found.match_type,
            });
        }
    }

    pairs.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(entity_type = %entity_type, pairs = pairs.len(), ignored = ignored.len(), "catalog scan complete");
    Ok(pairs)
}

fn scan_one(
    conn: &Connection,
    entity_type: EntityType,
    entity: &Candidate,
    config: &MatchConfig,
) -> Result<Vec<Match>, DbError> {
    let candidates = filter::find_candidates(conn, entity_type, &entity.name, Some(entity.id))?;
    let query = MatchQuery { title: entity.name.clone(), author: entity.author.clone() };
    Ok(rank(entity_type, &query, &candidates, config))
}
