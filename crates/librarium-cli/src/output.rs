use std::io::Write;

use librarium_core::{DuplicatePair, Match, MatchType, MergeOutcome};
use librarium_db::CatalogCounts;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn match_type_label(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::ExactId => "exact id",
        MatchType::ExactName => "exact name",
        MatchType::Fuzzy => "fuzzy",
    }
}

/// Print matches for a single duplicate lookup.
pub fn print_matches(w: &mut dyn Write, matches: &[Match], color: ColorMode) -> std::io::Result<()> {
    if matches.is_empty() {
        writeln!(w, "No duplicates found")?;
        return Ok(());
    }
    for m in matches {
        let label = match_type_label(m.match_type);
        if color.enabled() {
            match m.match_type {
                MatchType::ExactId | MatchType::ExactName => {
                    writeln!(w, "{:>3}  #{:<6} {}  ({})", m.score.red(), m.id, m.name, label)?
                }
                MatchType::Fuzzy => {
                    writeln!(w, "{:>3}  #{:<6} {}  ({})", m.score.yellow(), m.id, m.name, label)?
                }
            }
        } else {
            writeln!(w, "{:>3}  #{:<6} {}  ({})", m.score, m.id, m.name, label)?;
        }
    }
    Ok(())
}

/// Print pairs from a catalog-wide scan.
pub fn print_pairs(
    w: &mut dyn Write,
    pairs: &[DuplicatePair],
    color: ColorMode,
) -> std::io::Result<()> {
    if pairs.is_empty() {
        writeln!(w, "No duplicate pairs found")?;
        return Ok(());
    }
    writeln!(w, "Found {} duplicate pair(s):", pairs.len())?;
    for p in pairs {
        let line = format!(
            "{:>3}  #{} {:?} <-> #{} {:?}  ({})",
            p.score,
            p.id1,
            p.name1,
            p.id2,
            p.name2,
            match_type_label(p.match_type),
        );
        if color.enabled() && p.score >= 95 {
            writeln!(w, "{}", line.red())?;
        } else {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

/// Print the result of a merge.
pub fn print_merge(w: &mut dyn Write, outcome: &MergeOutcome, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {} entit(ies) into {:?}", "Merged".green(), outcome.merged, outcome.name)
    } else {
        writeln!(w, "Merged {} entit(ies) into {:?}", outcome.merged, outcome.name)
    }
}

/// Print catalog row counts.
pub fn print_stats(w: &mut dyn Write, counts: &CatalogCounts) -> std::io::Result<()> {
    writeln!(w, "books:         {}", counts.books)?;
    writeln!(w, "authors:       {}", counts.authors)?;
    writeln!(w, "series:        {}", counts.series)?;
    writeln!(w, "ignored pairs: {}", counts.ignored_pairs)?;
    Ok(())
}
