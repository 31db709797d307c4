use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use librarium_core::{EntityType, MatchConfig};
use librarium_db::{Database, FindQuery};

mod config_file;
mod import;
mod output;

use output::ColorMode;

/// Librarium catalog maintenance - duplicate detection, ignore lists, and merges
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the catalog database (falls back to LIBRARIUM_DB, then config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty catalog database
    Init,

    /// Import books, authors, and series from a JSON file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Find duplicate matches for a title/author pair or an identifying code
    Find {
        /// Entity type: book, author, or series
        #[arg(long = "type")]
        entity_type: EntityType,

        /// Title (or display name) to match
        #[arg(long)]
        title: Option<String>,

        /// Author name, blended into book scores when present
        #[arg(long)]
        author: Option<String>,

        /// Identifying code (ISBN/ASIN); an exact hit wins outright
        #[arg(long)]
        code: Option<String>,

        /// Existing entity id to exclude from results
        #[arg(long)]
        exclude: Option<i64>,

        /// Minimum combined score (0.0-1.0)
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Scan the whole catalog for duplicate pairs
    Scan {
        /// Entity type: book, author, or series
        #[arg(long = "type")]
        entity_type: EntityType,

        /// Minimum combined score (0.0-1.0)
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Mark a pair as not-a-duplicate so scans stop surfacing it
    Ignore {
        /// Entity type: book, author, or series
        #[arg(long = "type")]
        entity_type: EntityType,

        id1: i64,
        id2: i64,

        /// Who is dismissing the pair
        #[arg(long, default_value = "cli")]
        by: String,
    },

    /// Remove a pair from the ignore list
    Unignore {
        /// Entity type: book, author, or series
        #[arg(long = "type")]
        entity_type: EntityType,

        id1: i64,
        id2: i64,
    },

    /// Merge duplicate entities into a primary, re-pointing all references
    Merge {
        /// Entity type: book, author, or series
        #[arg(long = "type")]
        entity_type: EntityType,

        /// The surviving entity
        #[arg(long)]
        primary: i64,

        /// Ids to merge away
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Show catalog row counts
    Stats,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_file = config_file::load_config();

    // Resolve configuration: CLI flags > env vars > config file
    let db_path = cli
        .db
        .or_else(|| std::env::var("LIBRARIUM_DB").ok().map(PathBuf::from))
        .or_else(|| {
            config_file
                .database
                .as_ref()
                .and_then(|d| d.path.clone())
                .map(PathBuf::from)
        });
    let Some(db_path) = db_path else {
        anyhow::bail!(
            "no catalog database configured; pass --db, set LIBRARIUM_DB, or add \
             [database].path to .librarium.toml"
        );
    };

    let file_min_score = config_file.matching.as_ref().and_then(|m| m.min_score);
    let color = ColorMode(!cli.no_color && !cli.json);
    let mut out = std::io::stdout();

    match cli.command {
        Command::Init => {
            let db = Database::create(&db_path)?;
            writeln!(out, "Catalog created at {}", db.path().display())?;
        }
        Command::Import { file } => {
            let db = Database::create(&db_path)?;
            let stats = import::import_json(&db, &file)?;
            writeln!(
                out,
                "Imported {} book(s), {} new author(s), {} new series",
                stats.books, stats.authors, stats.series
            )?;
        }
        Command::Find { entity_type, title, author, code, exclude, min_score } => {
            let db = Database::open(&db_path)?;
            let config = match_config(min_score.or(file_min_score));
            let query = FindQuery { code, title, author, exclude_id: exclude };
            let matches = db.find_matches(entity_type, &query, &config)?;
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &matches)?;
                writeln!(out)?;
            } else {
                output::print_matches(&mut out, &matches, color)?;
            }
        }
        Command::Scan { entity_type, min_score } => {
            let db = Database::open(&db_path)?;
            let config = match_config(min_score.or(file_min_score));
            let pairs = db.scan_catalog(entity_type, &config)?;
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &pairs)?;
                writeln!(out)?;
            } else {
                output::print_pairs(&mut out, &pairs, color)?;
            }
        }
        Command::Ignore { entity_type, id1, id2, by } => {
            let db = Database::open(&db_path)?;
            db.ignore_pair(entity_type, id1, id2, &by)?;
            writeln!(out, "Ignoring {entity_type} pair ({id1}, {id2})")?;
        }
        Command::Unignore { entity_type, id1, id2 } => {
            let db = Database::open(&db_path)?;
            let removed = db.unignore_pair(entity_type, id1, id2)?;
            if removed {
                writeln!(out, "Pair ({id1}, {id2}) will surface in scans again")?;
            } else {
                writeln!(out, "Pair ({id1}, {id2}) was not ignored")?;
            }
        }
        Command::Merge { entity_type, primary, ids } => {
            let db = Database::open(&db_path)?;
            let outcome = db.merge(entity_type, primary, &ids)?;
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &outcome)?;
                writeln!(out)?;
            } else {
                output::print_merge(&mut out, &outcome, color)?;
            }
        }
        Command::Stats => {
            let db = Database::open(&db_path)?;
            let counts = db.counts()?;
            output::print_stats(&mut out, &counts)?;
        }
    }

    Ok(())
}

fn match_config(min_score: Option<f64>) -> MatchConfig {
    let mut config = MatchConfig::default();
    if let Some(min_score) = min_score {
        config.min_score = min_score.clamp(0.0, 1.0);
    }
    config
}
