//! Battle statistics aggregator.
//!
//! Reducers of the form `(database, event) -> database`. The host applies them
//! one at a time; replaying the same event log always yields the same database.
//! Every event appends exactly one metagame snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculate::percentage;
use crate::catalog::PartCatalog;
use crate::config::{AnalyzerConfig, StatisticsConfig};
use crate::metagame::MetagameSummarizer;
use crate::models::{
    BattleDatabase, BattleRecord, ComboIdentity, ComboStatistics, ComboTrends, Favorability,
    Outcome, TournamentEntry, Trend,
};

/// One entry of the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "lowercase")]
pub enum LoggedEvent {
    Battle(BattleRecord),
    Tournament(TournamentEntry),
}

impl LoggedEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LoggedEvent::Battle(record) => record.timestamp,
            LoggedEvent::Tournament(entry) => entry.timestamp,
        }
    }
}

impl From<BattleRecord> for LoggedEvent {
    fn from(record: BattleRecord) -> Self {
        LoggedEvent::Battle(record)
    }
}

impl From<TournamentEntry> for LoggedEvent {
    fn from(entry: TournamentEntry) -> Self {
        LoggedEvent::Tournament(entry)
    }
}

/// Totals across every statistics row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallTotals {
    pub combos: usize,
    pub total_battles: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
}

pub fn overall_totals(statistics: &[ComboStatistics]) -> OverallTotals {
    let mut totals = OverallTotals {
        combos: statistics.len(),
        ..OverallTotals::default()
    };
    for row in statistics {
        totals.total_battles += row.total_battles;
        totals.wins += row.wins;
        totals.losses += row.losses;
        totals.draws += row.draws;
    }
    totals.win_rate = percentage(totals.wins, totals.total_battles);
    totals
}

/// Folds events into a database.
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    config: StatisticsConfig,
    summarizer: MetagameSummarizer,
}

impl StatisticsAggregator {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            config: config.statistics.clone(),
            summarizer: MetagameSummarizer::new(&config.metagame),
        }
    }

    /// Resolve snapshot archetypes through the catalog.
    pub fn with_catalog(mut self, catalog: &PartCatalog) -> Self {
        self.summarizer = self.summarizer.with_catalog(catalog);
        self
    }

    pub fn record_battle(&self, mut db: BattleDatabase, record: BattleRecord) -> BattleDatabase {
        let key = record.combo_id.clone();
        let at = record.timestamp;

        let seeded = match db.combo_statistics.iter().position(|s| s.combo_id == key) {
            Some(index) => {
                let row = &mut db.combo_statistics[index];
                let (w, l, d) = outcome_counts(record.result);
                row.absorb(w, l, d);
                row.last_used = record.date;
                debug!(
                    "Updated {}: {} battles, {:.1}% win rate",
                    key, row.total_battles, row.win_rate
                );
                false
            }
            None => {
                let row = self.seed_row(&record);
                info!("New combo {} seeded from a {}", key, record.result);
                db.combo_statistics.push(row);
                true
            }
        };

        db.battle_records.push(record);
        // A seeded row starts Stable at its seeded rate
        if !seeded {
            self.refresh_trends(&mut db, &key);
        }
        self.finish(db, at)
    }

    pub fn record_tournament(&self, mut db: BattleDatabase, entry: TournamentEntry) -> BattleDatabase {
        let at = entry.timestamp;
        let mut touched = Vec::with_capacity(entry.results.len());

        for result in &entry.results {
            let Some(identity) = entry.identity_for(result) else {
                warn!(
                    "Skipping tournament result with unreadable combo key '{}'",
                    result.bey_combo
                );
                continue;
            };

            let row = row_for(&mut db, identity, entry.date);
            row.absorb(result.wins, result.losses, result.draws);
            row.last_used = entry.date;
            touched.push(row.combo_id.clone());
        }

        info!(
            "Folded tournament '{}' ({} combos, {}-{}-{})",
            entry.tournament_name,
            touched.len(),
            entry.total_wins,
            entry.total_losses,
            entry.total_draws
        );

        db.tournament_entries.push(entry);
        for key in &touched {
            self.refresh_trends(&mut db, key);
        }
        self.finish(db, at)
    }

    pub fn apply(&self, db: BattleDatabase, event: LoggedEvent) -> BattleDatabase {
        match event {
            LoggedEvent::Battle(record) => self.record_battle(db, record),
            LoggedEvent::Tournament(entry) => self.record_tournament(db, entry),
        }
    }

    /// Fold an ordered event log from an empty database.
    pub fn replay(&self, events: impl IntoIterator<Item = LoggedEvent>) -> BattleDatabase {
        let mut events = events.into_iter().peekable();
        let created_at = events
            .peek()
            .map(LoggedEvent::timestamp)
            .unwrap_or_default();

        let mut count = 0usize;
        let mut db = BattleDatabase::new(created_at);
        for event in events {
            db = self.apply(db, event);
            count += 1;
        }
        info!("Replayed {} events into {} combos", count, db.combo_statistics.len());
        db
    }

    /// A row built from one battle. A win is Excellent and anything else Weak,
    /// regardless of the tier table.
    fn seed_row(&self, record: &BattleRecord) -> ComboStatistics {
        let mut row = ComboStatistics::empty(record.combo.clone(), record.date);
        let (w, l, d) = outcome_counts(record.result);
        row.wins = w;
        row.losses = l;
        row.draws = d;
        row.total_battles = 1;

        if record.result == Outcome::Draw && self.config.legacy_draw_seeding {
            row.win_rate = 50.0;
            row.loss_rate = 50.0;
            row.draw_rate = 100.0;
        } else {
            row.recompute_rates();
        }

        row.favorability = match record.result {
            Outcome::Win => Favorability::Excellent,
            Outcome::Loss | Outcome::Draw => Favorability::Weak,
        };
        row.trends = ComboTrends {
            recent_win_rate: row.win_rate,
            all_time_win_rate: row.win_rate,
            trend: Trend::Stable,
        };
        row
    }

    /// Recent rate over the combo's latest battles against its all-time rate.
    fn refresh_trends(&self, db: &mut BattleDatabase, key: &str) {
        let recent: Vec<Outcome> = {
            let battles: Vec<&BattleRecord> = db.battles_for(key).collect();
            let skip = battles.len().saturating_sub(self.config.trend_window);
            battles[skip..].iter().map(|r| r.result).collect()
        };

        let Some(row) = db.combo_statistics.iter_mut().find(|s| s.combo_id == key) else {
            return;
        };

        let all_time = row.win_rate;
        let recent_rate = if recent.is_empty() {
            all_time
        } else {
            let wins = recent.iter().filter(|o| **o == Outcome::Win).count() as u32;
            percentage(wins, recent.len() as u32)
        };

        row.trends = ComboTrends {
            recent_win_rate: recent_rate,
            all_time_win_rate: all_time,
            trend: Trend::from_difference(recent_rate - all_time, self.config.trend_margin),
        };
    }

    fn finish(&self, mut db: BattleDatabase, at: DateTime<Utc>) -> BattleDatabase {
        let snapshot = self.summarizer.summarize(&db.combo_statistics, at);
        debug!(
            "Appended metagame snapshot #{}: {}",
            db.metagame_dynamics.len() + 1,
            snapshot.meta_trend
        );
        db.metagame_dynamics.push(snapshot);
        db.last_updated = at;
        db
    }
}

fn outcome_counts(outcome: Outcome) -> (u32, u32, u32) {
    match outcome {
        Outcome::Win => (1, 0, 0),
        Outcome::Loss => (0, 1, 0),
        Outcome::Draw => (0, 0, 1),
    }
}

fn row_for(db: &mut BattleDatabase, identity: ComboIdentity, date: NaiveDate) -> &mut ComboStatistics {
    let key = identity.key();
    let index = match db.combo_statistics.iter().position(|s| s.combo_id == key) {
        Some(index) => index,
        None => {
            debug!("New combo {} from tournament", key);
            db.combo_statistics.push(ComboStatistics::empty(identity, date));
            db.combo_statistics.len() - 1
        }
    };
    &mut db.combo_statistics[index]
}

/// `record_battle` with the default configuration.
pub fn record_battle(db: BattleDatabase, record: BattleRecord) -> BattleDatabase {
    StatisticsAggregator::default().record_battle(db, record)
}

/// `record_tournament` with the default configuration.
pub fn record_tournament(db: BattleDatabase, entry: TournamentEntry) -> BattleDatabase {
    StatisticsAggregator::default().record_tournament(db, entry)
}

/// `replay` with the default configuration.
pub fn replay(events: impl IntoIterator<Item = LoggedEvent>) -> BattleDatabase {
    StatisticsAggregator::default().replay(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BeyType, DeckEntry, TournamentResult};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn phoenix() -> ComboIdentity {
        ComboIdentity::new("Soar Phoenix", "9-60", "GF", BeyType::BX)
    }

    fn wizard() -> ComboIdentity {
        ComboIdentity::new("Wizard Rod", "5-70", "B", BeyType::BX)
    }

    fn battle(combo: ComboIdentity, result: Outcome, n: i64) -> BattleRecord {
        BattleRecord::new(combo, result, day()).with_timestamp(t0() + Duration::minutes(n))
    }

    fn empty_db() -> BattleDatabase {
        BattleDatabase::new(t0())
    }

    fn assert_invariants(db: &BattleDatabase) {
        for row in &db.combo_statistics {
            assert!(row.is_consistent(), "{} counts do not add up", row.combo_id);
            let sum = row.win_rate + row.loss_rate + row.draw_rate;
            if row.total_battles > 0 {
                assert!((sum - 100.0).abs() < 0.01, "{} rates sum to {}", row.combo_id, sum);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
    }

    fn tournament(deck: Vec<DeckEntry>, n: i64) -> TournamentEntry {
        TournamentEntry::new("Spring Cup".into(), day(), deck)
            .unwrap()
            .with_timestamp(t0() + Duration::minutes(n))
    }

    fn deck() -> Vec<DeckEntry> {
        vec![
            DeckEntry::new(phoenix(), 3, 1, 0),
            DeckEntry::new(wizard(), 2, 2, 1),
            DeckEntry::new(ComboIdentity::new("Shark Edge", "3-60", "LF", BeyType::BX), 0, 0, 0),
        ]
    }

    #[test]
    fn test_first_win_seeds_row() {
        let db = record_battle(empty_db(), battle(phoenix(), Outcome::Win, 1));
        let row = db.combo_statistics("Soar Phoenix", "9-60", "GF").unwrap();

        assert_eq!(row.total_battles, 1);
        assert_eq!((row.wins, row.losses, row.draws), (1, 0, 0));
        assert_eq!((row.win_rate, row.loss_rate, row.draw_rate), (100.0, 0.0, 0.0));
        assert_eq!(row.favorability, Favorability::Excellent);
        assert_eq!(row.first_used, day());
    }

    #[test]
    fn test_first_draw_seeds_normalized_rates() {
        let db = record_battle(empty_db(), battle(phoenix(), Outcome::Draw, 1));
        let row = db.statistics_by_key("Soar Phoenix-9-60-GF").unwrap();

        assert_eq!((row.win_rate, row.loss_rate, row.draw_rate), (0.0, 0.0, 100.0));
        assert_eq!(row.favorability, Favorability::Weak);
        assert_invariants(&db);
    }

    #[test]
    fn test_legacy_draw_seeding() {
        let mut config = AnalyzerConfig::default();
        config.statistics.legacy_draw_seeding = true;
        let aggregator = StatisticsAggregator::new(&config);

        let db = aggregator.record_battle(empty_db(), battle(phoenix(), Outcome::Draw, 1));
        let row = &db.combo_statistics[0];
        assert_eq!((row.win_rate, row.loss_rate, row.draw_rate), (50.0, 50.0, 100.0));

        let db = aggregator.record_battle(db, battle(phoenix(), Outcome::Win, 2));
        let row = &db.combo_statistics[0];
        assert_eq!((row.win_rate, row.loss_rate, row.draw_rate), (50.0, 0.0, 50.0));
    }

    #[test]
    fn test_legacy_draw_seed_is_stable() {
        let mut config = AnalyzerConfig::default();
        config.statistics.legacy_draw_seeding = true;
        let aggregator = StatisticsAggregator::new(&config);

        let db = aggregator.record_battle(empty_db(), battle(phoenix(), Outcome::Draw, 1));
        let trends = &db.combo_statistics[0].trends;
        assert_eq!(trends.trend, Trend::Stable);
        assert_eq!(trends.recent_win_rate, 50.0);
        assert_eq!(trends.all_time_win_rate, 50.0);

        // the next battle refreshes from the battle history
        let db = aggregator.record_battle(db, battle(phoenix(), Outcome::Win, 2));
        let trends = &db.combo_statistics[0].trends;
        assert_eq!(trends.recent_win_rate, 50.0);
        assert_eq!(trends.trend, Trend::Stable);
    }

    #[test]
    fn test_legacy_snapshot_and_recommendation_agree() {
        let mut config = AnalyzerConfig::default();
        config.statistics.legacy_draw_seeding = true;
        let aggregator = StatisticsAggregator::new(&config);

        let mut db = aggregator.record_battle(empty_db(), battle(phoenix(), Outcome::Draw, 1));
        for (n, result) in [Outcome::Win, Outcome::Loss, Outcome::Loss, Outcome::Loss]
            .into_iter()
            .enumerate()
        {
            db = aggregator.record_battle(db, battle(wizard(), result, n as i64 + 2));
        }

        let snapshot = db.latest_snapshot().unwrap();
        assert_eq!(snapshot.top_combos[0].combo, "Soar Phoenix 9-60 GF");
        assert_eq!(snapshot.top_combos[0].win_rate, 50.0);

        let rec = crate::recommend::recommend(&db.combo_statistics, None).unwrap();
        assert_eq!(rec.recommended_combo.blade_name, "Soar Phoenix");
        assert_eq!(rec.expected_win_rate, snapshot.top_combos[0].win_rate);
    }

    #[test]
    fn test_first_loss_seeds_weak() {
        let db = record_battle(empty_db(), battle(phoenix(), Outcome::Loss, 1));
        let row = &db.combo_statistics[0];
        assert_eq!((row.win_rate, row.loss_rate, row.draw_rate), (0.0, 100.0, 0.0));
        assert_eq!(row.favorability, Favorability::Weak);
    }

    #[test]
    fn test_increment_recomputes_rates_and_tier() {
        let mut db = empty_db();
        for (n, result) in [Outcome::Win, Outcome::Loss, Outcome::Win, Outcome::Draw]
            .into_iter()
            .enumerate()
        {
            db = record_battle(db, battle(phoenix(), result, n as i64));
        }

        let row = &db.combo_statistics[0];
        assert_eq!(row.total_battles, 4);
        assert_eq!((row.wins, row.losses, row.draws), (2, 1, 1));
        assert_eq!((row.win_rate, row.loss_rate, row.draw_rate), (50.0, 25.0, 25.0));
        assert_eq!(row.favorability, Favorability::Good);
        assert_invariants(&db);
    }

    #[test]
    fn test_last_used_follows_record_date() {
        let db = record_battle(empty_db(), battle(phoenix(), Outcome::Win, 1));
        let later = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let record = BattleRecord::new(phoenix(), Outcome::Loss, later).with_timestamp(t0());
        let db = record_battle(db, record);

        let row = &db.combo_statistics[0];
        assert_eq!(row.first_used, day());
        assert_eq!(row.last_used, later);
    }

    #[test]
    fn test_every_event_appends_one_snapshot() {
        let db = record_battle(empty_db(), battle(phoenix(), Outcome::Win, 1));
        assert_eq!(db.metagame_dynamics.len(), 1);
        let first = db.metagame_dynamics[0].clone();

        let db = record_battle(db, battle(wizard(), Outcome::Win, 2));
        assert_eq!(db.metagame_dynamics.len(), 2);
        assert_eq!(db.metagame_dynamics[0], first);

        let db = record_tournament(db, tournament(deck(), 3));
        assert_eq!(db.metagame_dynamics.len(), 3);
        assert_eq!(db.metagame_dynamics[0], first);
        assert_eq!(db.last_updated, t0() + Duration::minutes(3));
        assert_eq!(db.latest_snapshot().unwrap().timestamp, t0() + Duration::minutes(3));
    }

    #[test]
    fn test_tournament_folds_rows_with_count_formula() {
        let db = record_battle(empty_db(), battle(phoenix(), Outcome::Win, 1));
        let db = record_tournament(db, tournament(deck(), 2));

        let phoenix_row = db.statistics_by_key("Soar Phoenix-9-60-GF").unwrap();
        assert_eq!(phoenix_row.total_battles, 5);
        assert_eq!(phoenix_row.wins, 4);
        assert_eq!(phoenix_row.win_rate, 80.0);
        assert_eq!(phoenix_row.favorability, Favorability::Excellent);

        let wizard_row = db.statistics_by_key("Wizard Rod-5-70-B").unwrap();
        assert_eq!(wizard_row.total_battles, 5);
        assert_eq!(wizard_row.win_rate, 40.0);
        assert_eq!(wizard_row.draw_rate, 20.0);
        assert_eq!(wizard_row.favorability, Favorability::Acceptable);

        assert_eq!(db.tournament_entries.len(), 1);
        assert_invariants(&db);
    }

    #[test]
    fn test_zero_total_tournament_row_has_zero_rates() {
        let db = record_tournament(empty_db(), tournament(deck(), 1));
        let shark = db.statistics_by_key("Shark Edge-3-60-LF").unwrap();

        assert_eq!(shark.total_battles, 0);
        assert_eq!((shark.win_rate, shark.loss_rate, shark.draw_rate), (0.0, 0.0, 0.0));
        assert!(!shark.win_rate.is_nan());
        assert_eq!(shark.favorability, Favorability::Weak);
        assert_invariants(&db);
    }

    #[test]
    fn test_tournament_result_without_deck_entry_uses_key() {
        let mut entry = tournament(deck(), 1);
        entry.results.push(TournamentResult {
            bey_combo: "Cobalt Dragoon-3-80-LO".into(),
            wins: 1,
            losses: 0,
            draws: 0,
        });
        entry.results.push(TournamentResult {
            bey_combo: "garbage".into(),
            wins: 1,
            losses: 0,
            draws: 0,
        });

        let db = record_tournament(empty_db(), entry);
        assert!(db.combo_statistics("Cobalt Dragoon", "3-80", "LO").is_some());
        assert_eq!(db.combo_statistics.len(), 4);
    }

    #[test]
    fn test_input_database_is_not_shared() {
        let before = record_battle(empty_db(), battle(phoenix(), Outcome::Win, 1));
        let after = record_battle(before.clone(), battle(phoenix(), Outcome::Loss, 2));

        assert_eq!(before.combo_statistics[0].total_battles, 1);
        assert_eq!(after.combo_statistics[0].total_battles, 2);
    }

    #[test]
    fn test_trend_tracks_recent_window() {
        let mut config = AnalyzerConfig::default();
        config.statistics.trend_window = 2;
        let aggregator = StatisticsAggregator::new(&config);

        let mut db = empty_db();
        for (n, result) in [Outcome::Loss, Outcome::Loss, Outcome::Win, Outcome::Win]
            .into_iter()
            .enumerate()
        {
            db = aggregator.record_battle(db, battle(phoenix(), result, n as i64));
        }

        let trends = &db.combo_statistics[0].trends;
        assert_eq!(trends.recent_win_rate, 100.0);
        assert_eq!(trends.all_time_win_rate, 50.0);
        assert_eq!(trends.trend, Trend::Rising);
    }

    #[test]
    fn test_tournament_only_combo_trend_is_stable() {
        let db = record_tournament(empty_db(), tournament(deck(), 1));
        let row = db.statistics_by_key("Soar Phoenix-9-60-GF").unwrap();
        assert_eq!(row.trends.recent_win_rate, row.win_rate);
        assert_eq!(row.trends.trend, Trend::Stable);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let events: Vec<LoggedEvent> = vec![
            battle(phoenix(), Outcome::Win, 1).into(),
            battle(wizard(), Outcome::Loss, 2).into(),
            tournament(deck(), 3).into(),
            battle(phoenix(), Outcome::Draw, 4).into(),
        ];

        let first = replay(events.clone());
        let second = replay(events);
        assert_eq!(first, second);
        assert_eq!(first.battle_records.len(), 3);
        assert_eq!(first.metagame_dynamics.len(), 4);
        assert_eq!(first.last_updated, t0() + Duration::minutes(4));
        assert_invariants(&first);
    }

    #[test]
    fn test_replay_of_empty_log() {
        let db = replay(Vec::new());
        assert!(db.combo_statistics.is_empty());
        assert!(db.metagame_dynamics.is_empty());
    }

    #[test]
    fn test_logged_event_shape() {
        let event: LoggedEvent = battle(phoenix(), Outcome::Win, 1).into();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "battle");
        assert_eq!(json["event"]["comboId"], "Soar Phoenix-9-60-GF");
        let back: LoggedEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_overall_totals() {
        let db = record_tournament(empty_db(), tournament(deck(), 1));
        let totals = overall_totals(&db.combo_statistics);
        assert_eq!(totals.combos, 3);
        assert_eq!(totals.total_battles, 9);
        assert_eq!(totals.wins, 5);
        assert_eq!(totals.draws, 1);
        assert!((totals.win_rate - 55.555).abs() < 0.01);

        assert_eq!(overall_totals(&[]).win_rate, 0.0);
    }
}
