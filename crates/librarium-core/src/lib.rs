//! Matching engine for duplicate detection across catalog entities.
//!
//! Pure string logic: normalization, similarity scoring, and match ranking.
//! Everything storage-aware (candidate pre-filtering, the ignore list, the
//! merge engine) lives in `librarium-db`.

use serde::Serialize;
use thiserror::Error;

pub mod normalize;
pub mod ranker;
pub mod similarity;

pub use normalize::{normalize, normalize_author_name};
pub use ranker::rank;
pub use similarity::similarity;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown entity type {0:?} (expected book, author, or series)")]
    InvalidEntityType(String),
}

/// Catalog entity kinds that duplicate detection and merge operate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Book,
    Author,
    Series,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Book => "book",
            EntityType::Author => "author",
            EntityType::Series => "series",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(EntityType::Book),
            "author" | "authors" => Ok(EntityType::Author),
            "series" => Ok(EntityType::Series),
            other => Err(CoreError::InvalidEntityType(other.to_string())),
        }
    }
}

/// Classification of why a candidate matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// An identifying code (ISBN/ASIN) matched exactly.
    ExactId,
    /// The normalized titles are identical.
    ExactName,
    /// Similarity above threshold.
    Fuzzy,
}

/// A title (plus optional author) to score candidates against.
#[derive(Debug, Clone, Default)]
pub struct MatchQuery {
    pub title: String,
    pub author: Option<String>,
}

/// An entity row fetched by the candidate pre-filter, before scoring.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    /// First-position author name, used for title+author blending (books only).
    pub author: Option<String>,
}

/// A scored duplicate match.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub id: i64,
    pub name: String,
    /// Confidence as an integer percentage.
    pub score: u8,
    pub match_type: MatchType,
}

/// A duplicate pair found by a catalog-wide scan. `id1 < id2` always holds.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub id1: i64,
    pub id2: i64,
    pub name1: String,
    pub name2: String,
    pub score: u8,
    pub match_type: MatchType,
}

/// Result of a completed merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    /// Number of source entities merged away.
    pub merged: usize,
    /// Display name of the surviving primary.
    pub name: String,
}

/// Tunable matching thresholds.
///
/// The defaults are observable matching behavior: changing any of them
/// changes which candidates surface and how they are classified, so they are
/// configuration rather than re-derived values.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Minimum combined score for a candidate to count as a match.
    pub min_score: f64,
    /// Weight of title similarity when both sides carry an author.
    pub title_weight: f64,
    /// Weight of author similarity when both sides carry an author.
    pub author_weight: f64,
    /// Floor applied when the shorter title plus a subtitle separator
    /// (`:`, ` -`, `,`) is a prefix of the longer one.
    pub subtitle_prefix_boost: f64,
    /// Floor applied when the query is a plain prefix of the candidate title.
    pub query_prefix_boost: f64,
    /// Floor applied when the candidate title is contained in the query.
    pub containment_boost: f64,
    /// Minimum candidate length for the containment floor to apply.
    pub containment_min_len: usize,
    /// Maximum number of matches returned per query.
    pub max_results: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_score: 0.6,
            title_weight: 0.6,
            author_weight: 0.4,
            subtitle_prefix_boost: 0.85,
            query_prefix_boost: 0.80,
            containment_boost: 0.75,
            containment_min_len: 5,
            max_results: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_round_trip() {
        for t in [EntityType::Book, EntityType::Author, EntityType::Series] {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
    }

    #[test]
    fn entity_type_accepts_plural_and_case() {
        assert_eq!("Books".parse::<EntityType>().unwrap(), EntityType::Book);
        assert_eq!("AUTHORS".parse::<EntityType>().unwrap(), EntityType::Author);
    }

    #[test]
    fn entity_type_rejects_unknown() {
        assert!("narrator".parse::<EntityType>().is_err());
        assert!("".parse::<EntityType>().is_err());
    }
}
