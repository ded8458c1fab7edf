use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stats::{TeamsCatalog, initialize_catalog};

const DATA_DIR: &str = "nba_predictor";
const CATALOG_FILE: &str = "teams_data.json";
const HISTORY_FILE: &str = "prediction_history.json";
pub const DATA_DIR_ENV: &str = "NBA_PREDICTOR_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub team1: String,
    pub team2: String,
    pub result: String,
}

/// Loads the saved catalog, falling back to the 30 unknown teams when the
/// file is missing, unreadable, corrupt or empty.
pub fn load_catalog(path: &Path) -> TeamsCatalog {
    let Ok(raw) = fs::read_to_string(path) else {
        return initialize_catalog();
    };
    match serde_json::from_str::<TeamsCatalog>(&raw) {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => initialize_catalog(),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "corrupt team catalog, using defaults");
            initialize_catalog()
        }
    }
}

pub fn save_catalog(path: &Path, catalog: &TeamsCatalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog).context("serialize team catalog")?;
    write_atomic(path, &json).context("write team catalog")
}

pub fn load_history(path: &Path) -> Vec<HistoryEntry> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<HistoryEntry>>(&raw).unwrap_or_default()
}

/// Appends one entry; storage order stays oldest first.
pub fn append_history(path: &Path, entry: HistoryEntry) -> Result<()> {
    let mut history = load_history(path);
    history.push(entry);
    let json = serde_json::to_string_pretty(&history).context("serialize prediction history")?;
    write_atomic(path, &json).context("write prediction history")
}

pub fn history_newest_first(history: &[HistoryEntry]) -> Vec<&HistoryEntry> {
    history.iter().rev().collect()
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn catalog_path(dir: &Path) -> PathBuf {
    dir.join(CATALOG_FILE)
}

pub fn history_path(dir: &Path) -> PathBuf {
    dir.join(HISTORY_FILE)
}

/// Resolves the data directory from an environment lookup: explicit
/// override, then XDG data home, then `~/.local/share`.
pub fn data_dir_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(dir) = non_blank(DATA_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    // Prefer XDG data.
    if let Some(base) = non_blank("XDG_DATA_HOME") {
        return Some(PathBuf::from(base).join(DATA_DIR));
    }
    let home = non_blank("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_reverses_storage_order() {
        let history = vec![
            HistoryEntry {
                team1: "A".to_string(),
                team2: "B".to_string(),
                result: "first".to_string(),
            },
            HistoryEntry {
                team1: "C".to_string(),
                team2: "D".to_string(),
                result: "second".to_string(),
            },
        ];
        let shown = history_newest_first(&history);
        assert_eq!(shown[0].result, "second");
        assert_eq!(shown[1].result, "first");
    }

    #[test]
    fn file_names_are_stable() {
        let dir = Path::new("/data");
        assert_eq!(catalog_path(dir), PathBuf::from("/data/teams_data.json"));
        assert_eq!(
            history_path(dir),
            PathBuf::from("/data/prediction_history.json")
        );
    }
}
