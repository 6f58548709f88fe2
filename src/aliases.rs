use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::MatchRecord;

pub type AliasMap = HashMap<String, String>;

pub const DEFAULT_ALIASES_PATH: &str = "data/team_aliases.json";

/// Load the team alias mapping. A missing file means no aliasing; a present
/// but unreadable file is an error worth surfacing.
pub fn load_alias_map(path: &Path) -> Result<AliasMap> {
    if !path.exists() {
        return Ok(AliasMap::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read alias file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid alias json {}", path.display()))
}

/// Rewrite home/away names in place. Names without a mapping pass through.
pub fn normalize_teams(records: &mut [MatchRecord], aliases: &AliasMap) {
    if aliases.is_empty() {
        return;
    }
    for record in records {
        if let Some(canonical) = aliases.get(&record.home_team) {
            record.home_team = canonical.clone();
        }
        if let Some(canonical) = aliases.get(&record.away_team) {
            record.away_team = canonical.clone();
        }
    }
}
