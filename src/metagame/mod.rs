//! Metagame dynamics summarizer.
//!
//! Turns the statistics table into a timestamped snapshot of the strongest
//! combos and parts. The aggregator appends one snapshot per event.

pub mod insight;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calculate::{percentage, sort_by_win_rate_desc};
use crate::catalog::PartCatalog;
use crate::config::MetagameConfig;
use crate::models::{
    Archetype, ComboRanking, ComboStatistics, MetagameDynamics, PartCategory, PartRanking,
};

pub use insight::{
    analyze_matchup, classify_archetype, generate_insight, suggest_combo_adjustments,
    ArchetypeStanding, ComboAdjustment, MatchupAnalysis, MetagameInsight, PerformanceTrend,
};

/// Builds metagame snapshots.
#[derive(Debug, Clone, Default)]
pub struct MetagameSummarizer {
    config: MetagameConfig,
    /// Lowercased blade name -> authored archetype
    blade_archetypes: HashMap<String, Archetype>,
}

impl MetagameSummarizer {
    pub fn new(config: &MetagameConfig) -> Self {
        Self {
            config: config.clone(),
            blade_archetypes: HashMap::new(),
        }
    }

    /// Use the catalog's authored blade archetypes for `dominant_type`.
    pub fn with_catalog(mut self, catalog: &PartCatalog) -> Self {
        self.blade_archetypes = catalog
            .parts(PartCategory::Blade)
            .iter()
            .filter_map(|p| p.archetype.map(|a| (p.name.to_lowercase(), a)))
            .collect();
        self
    }

    pub fn summarize(&self, statistics: &[ComboStatistics], at: DateTime<Utc>) -> MetagameDynamics {
        let top_n = self.config.top_n;

        let mut combos: Vec<&ComboStatistics> = statistics.iter().collect();
        sort_by_win_rate_desc(&mut combos, |row| row.win_rate);
        let leader = combos.first().copied();

        let top_combos: Vec<ComboRanking> = combos
            .iter()
            .take(top_n)
            .map(|row| ComboRanking {
                combo: row.combo.label(),
                win_rate: row.win_rate,
                usage: row.total_battles,
            })
            .collect();

        let top_blades = rank_parts(statistics, top_n, |row| &row.combo.blade_name);
        let top_ratchets = rank_parts(statistics, top_n, |row| &row.combo.ratchet_name);
        let top_bits = rank_parts(statistics, top_n, |row| &row.combo.bit_name);

        let meta_trend = match top_combos.first() {
            Some(top) => format!("Top combo: {} with {:.1}% win rate", top.combo, top.win_rate),
            None => "N/A".to_string(),
        };

        let dominant_type = match leader {
            Some(row) => self.dominant_type(&row.combo.blade_name),
            None => Archetype::Balanced,
        };

        debug!(
            "Summarized {} combos: {} ({})",
            statistics.len(),
            meta_trend,
            dominant_type
        );

        MetagameDynamics {
            timestamp: at,
            date: at,
            top_combos,
            top_blades,
            top_ratchets,
            top_bits,
            meta_trend,
            dominant_type,
        }
    }

    fn dominant_type(&self, blade_name: &str) -> Archetype {
        if let Some(archetype) = self.blade_archetypes.get(&blade_name.to_lowercase()) {
            return *archetype;
        }
        if blade_name.contains("Attack") {
            Archetype::Attack
        } else if blade_name.contains("Defense") {
            Archetype::Defense
        } else {
            Archetype::Stamina
        }
    }
}

/// Pool wins and battles per part name (first-seen order), rank, keep `top_n`.
fn rank_parts<'a>(
    statistics: &'a [ComboStatistics],
    top_n: usize,
    name_of: impl Fn(&'a ComboStatistics) -> &'a String,
) -> Vec<PartRanking> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut pooled: Vec<(&str, u32, u32)> = Vec::new();

    for row in statistics {
        let name = name_of(row).as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            pooled.push((name, 0, 0));
            pooled.len() - 1
        });
        pooled[slot].1 += row.wins;
        pooled[slot].2 += row.total_battles;
    }

    let mut rankings: Vec<PartRanking> = pooled
        .into_iter()
        .map(|(name, wins, total)| PartRanking {
            name: name.to_string(),
            win_rate: percentage(wins, total),
            usage: total,
        })
        .collect();
    sort_by_win_rate_desc(&mut rankings, |r| r.win_rate);
    rankings.truncate(top_n);
    rankings
}

/// Summarize with the default configuration and no catalog.
pub fn summarize(statistics: &[ComboStatistics], at: DateTime<Utc>) -> MetagameDynamics {
    MetagameSummarizer::default().summarize(statistics, at)
}
