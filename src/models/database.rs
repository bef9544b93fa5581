//! The aggregate root handed between the host and the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{combo_key, BattleRecord, ComboStatistics, MetagameDynamics, TournamentEntry};

/// Schema tag written into every database document.
pub const SCHEMA_VERSION: &str = "2.0";

/// Battle history plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleDatabase {
    #[serde(default)]
    pub battle_records: Vec<BattleRecord>,

    #[serde(default)]
    pub tournament_entries: Vec<TournamentEntry>,

    /// One row per combo key, in first-seen order
    #[serde(default)]
    pub combo_statistics: Vec<ComboStatistics>,

    /// Snapshot history, oldest first
    #[serde(default)]
    pub metagame_dynamics: Vec<MetagameDynamics>,

    pub last_updated: DateTime<Utc>,

    pub version: String,
}

impl BattleDatabase {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            battle_records: Vec::new(),
            tournament_entries: Vec::new(),
            combo_statistics: Vec::new(),
            metagame_dynamics: Vec::new(),
            last_updated: created_at,
            version: SCHEMA_VERSION.to_string(),
        }
    }

    /// Look a statistics row up by its part names.
    pub fn combo_statistics(&self, blade: &str, ratchet: &str, bit: &str) -> Option<&ComboStatistics> {
        self.statistics_by_key(&combo_key(blade, ratchet, bit))
    }

    pub fn statistics_by_key(&self, key: &str) -> Option<&ComboStatistics> {
        self.combo_statistics.iter().find(|s| s.combo_id == key)
    }

    pub fn latest_snapshot(&self) -> Option<&MetagameDynamics> {
        self.metagame_dynamics.last()
    }

    /// Battle records of one combo, oldest first.
    pub fn battles_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a BattleRecord> + 'a {
        self.battle_records.iter().filter(move |r| r.combo_id == key)
    }
}

impl Default for BattleDatabase {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_database_is_empty() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let db = BattleDatabase::new(at);
        assert!(db.battle_records.is_empty());
        assert!(db.combo_statistics.is_empty());
        assert!(db.latest_snapshot().is_none());
        assert_eq!(db.version, SCHEMA_VERSION);
        assert_eq!(db.last_updated, at);
    }

    #[test]
    fn test_database_accepts_sparse_document() {
        let json = r#"{"lastUpdated":"2025-01-01T00:00:00Z","version":"2.0"}"#;
        let db: BattleDatabase = serde_json::from_str(json).unwrap();
        assert!(db.tournament_entries.is_empty());
        assert!(db.metagame_dynamics.is_empty());
    }
}
