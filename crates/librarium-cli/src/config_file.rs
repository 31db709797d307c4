use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: Option<DatabaseConfig>,
    pub matching: Option<MatchingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub min_score: Option<f64>,
}

/// Platform config directory path: `<config_dir>/librarium/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("librarium").join("config.toml"))
}

/// Load config by cascading CWD `.librarium.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".librarium.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        database: Some(DatabaseConfig {
            path: overlay
                .database
                .as_ref()
                .and_then(|d| d.path.clone())
                .or_else(|| base.database.as_ref().and_then(|d| d.path.clone())),
        }),
        matching: Some(MatchingConfig {
            min_score: overlay
                .matching
                .as_ref()
                .and_then(|m| m.min_score)
                .or_else(|| base.matching.as_ref().and_then(|m| m.min_score)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wins() {
        let base = ConfigFile {
            database: Some(DatabaseConfig { path: Some("/base.db".into()) }),
            matching: Some(MatchingConfig { min_score: Some(0.7) }),
        };
        let overlay = ConfigFile {
            database: Some(DatabaseConfig { path: Some("/overlay.db".into()) }),
            matching: None,
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.database.unwrap().path.as_deref(), Some("/overlay.db"));
        assert_eq!(merged.matching.unwrap().min_score, Some(0.7));
    }

    #[test]
    fn parses_partial_toml() {
        let parsed: ConfigFile = toml::from_str("[database]\npath = \"/tmp/cat.db\"\n").unwrap();
        assert_eq!(parsed.database.unwrap().path.as_deref(), Some("/tmp/cat.db"));
        assert!(parsed.matching.is_none());
    }
}
