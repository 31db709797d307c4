//! Candidate scoring and ranking.

use crate::normalize::{normalize, normalize_author_name};
use crate::similarity::similarity;
use crate::{Candidate, EntityType, Match, MatchConfig, MatchQuery, MatchType};

/// Separators that mark a subtitle boundary in a raw title.
const SUBTITLE_SEPARATORS: [&str; 3] = [":", " -", ","];

/// Score and rank candidates against a query.
///
/// Returns matches scoring at least `config.min_score`, ordered by score
/// descending (ties keep candidate order), capped at `config.max_results`.
/// No candidate clearing the threshold is an empty result, not an error.
///
/// Author-type scans normalize display names with
/// [`normalize_author_name`], so `"Herbert, Frank"` and `"Frank Herbert"`
/// compare as identical; every other type uses [`normalize`].
pub fn rank(
    entity_type: EntityType,
    query: &MatchQuery,
    candidates: &[Candidate],
    config: &MatchConfig,
) -> Vec<Match> {
    let normalize_name: fn(&str) -> String = match entity_type {
        EntityType::Author => normalize_author_name,
        EntityType::Book | EntityType::Series => normalize,
    };
    let norm_title = normalize_name(&query.title);
    let norm_author = query.author.as_deref().map(normalize_author_name);

    let mut matches = Vec::new();
    for candidate in candidates {
        let title_sim =
            title_similarity(&query.title, &norm_title, &candidate.name, normalize_name, config);

        let combined = match (&norm_author, &candidate.author) {
            (Some(query_author), Some(candidate_author)) => {
                let author_sim = similarity(query_author, &normalize_author_name(candidate_author));
                config.title_weight * title_sim + config.author_weight * author_sim
            }
            _ => title_sim,
        };

        if combined < config.min_score {
            continue;
        }

        let match_type = if title_sim >= 1.0 {
            MatchType::ExactName
        } else {
            MatchType::Fuzzy
        };
        matches.push(Match {
            id: candidate.id,
            name: candidate.name.clone(),
            score: (combined * 100.0).round() as u8,
            match_type,
        });
    }

    // sort_by is stable, so equal scores keep candidate order
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(config.max_results);
    matches
}

/// Title similarity with containment/prefix floors.
///
/// The floors are detected on the lowercased raw titles, not the normalized
/// forms: the separators they key on (`:`, ` -`, `,`) are exactly what
/// [`normalize`] strips.
fn title_similarity(
    raw_query: &str,
    norm_query: &str,
    candidate: &str,
    normalize_name: fn(&str) -> String,
    config: &MatchConfig,
) -> f64 {
    let mut sim = similarity(norm_query, &normalize_name(candidate));

    let query = raw_query.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();
    if query.is_empty() || candidate.is_empty() {
        return sim;
    }

    // "Edge World" vs "Edge World: Undying Mercenaries": whichever side is
    // shorter, the shorter title is the canonical catalog entry and the
    // longer one carries a subtitle.
    let (shorter, longer) = if candidate.len() <= query.len() {
        (&candidate, &query)
    } else {
        (&query, &candidate)
    };
    if SUBTITLE_SEPARATORS
        .iter()
        .any(|sep| longer.starts_with(&format!("{shorter}{sep}")))
    {
        sim = sim.max(config.subtitle_prefix_boost);
    } else if candidate.len() > query.len() && candidate.starts_with(query.as_str()) {
        sim = sim.max(config.query_prefix_boost);
    }

    // Whole containment of a non-trivial candidate; the length floor guards
    // against boosting short substrings like "it".
    if candidate.len() >= config.containment_min_len && query.contains(candidate.as_str()) {
        sim = sim.max(config.containment_boost);
    }

    sim
}
