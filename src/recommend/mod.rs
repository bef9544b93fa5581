//! Recommendation generator.
//!
//! Picks the highest win-rate combo from recorded history, optionally narrowed
//! by the archetype the user expects to face. Confidence only reflects how
//! much data backs the top combo.

use tracing::debug;

use crate::calculate::{data_confidence, sort_by_win_rate_desc};
use crate::catalog::PartCatalog;
use crate::config::{AnalyzerConfig, RecommendationConfig};
use crate::models::{
    AlternativeOption, Archetype, AutomaticRecommendation, ComboStatistics, Favorability,
    PartCategory, RecommendedCombo,
};

#[derive(Debug, Clone, Default)]
pub struct Recommender<'a> {
    config: RecommendationConfig,
    catalog: Option<&'a PartCatalog>,
}

impl<'a> Recommender<'a> {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            config: config.recommendation.clone(),
            catalog: None,
        }
    }

    /// Prefer authored archetypes and ratchet geometry over name markers.
    pub fn with_catalog(mut self, catalog: &'a PartCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// `None` when there is no history or nothing survives the opponent filter.
    pub fn recommend(
        &self,
        statistics: &[ComboStatistics],
        against: Option<Archetype>,
    ) -> Option<AutomaticRecommendation> {
        let mut candidates: Vec<&ComboStatistics> = statistics
            .iter()
            .filter(|row| self.counters(row, against))
            .collect();

        debug!(
            "{} of {} combos kept against {:?}",
            candidates.len(),
            statistics.len(),
            against
        );

        sort_by_win_rate_desc(&mut candidates, |row| row.win_rate);
        let (top, rest) = candidates.split_first()?;

        let alternative_options = rest
            .iter()
            .take(self.config.alternatives)
            .map(|row| AlternativeOption {
                blade_name: row.combo.blade_name.clone(),
                ratchet_name: row.combo.ratchet_name.clone(),
                bit_name: row.combo.bit_name.clone(),
                expected_win_rate: row.win_rate,
            })
            .collect();

        Some(AutomaticRecommendation {
            recommended_combo: RecommendedCombo {
                blade_name: top.combo.blade_name.clone(),
                ratchet_name: top.combo.ratchet_name.clone(),
                bit_name: top.combo.bit_name.clone(),
            },
            reason: format!(
                "Based on {} battles, this combo has a {:.1}% win rate",
                top.total_battles, top.win_rate
            ),
            expected_win_rate: top.win_rate,
            confidence: data_confidence(top.total_battles, self.config.confidence_saturation),
            against_type: against,
            alternative_options,
            data_points: top.total_battles,
        })
    }

    /// Whether a row is a sensible pick against the given archetype.
    fn counters(&self, row: &ComboStatistics, against: Option<Archetype>) -> bool {
        match against {
            Some(Archetype::Attack) => matches!(
                row.favorability,
                Favorability::Excellent | Favorability::VeryGood
            ),
            Some(Archetype::Defense) => {
                let authored = self
                    .catalog
                    .and_then(|c| c.archetype_of(PartCategory::Blade, &row.combo.blade_name));
                match authored {
                    Some(archetype) => archetype == Archetype::Attack,
                    None => contains_any(&row.combo.blade_name, &self.config.defense_counter_markers),
                }
            }
            Some(Archetype::Stamina) => {
                let contact_points = self
                    .catalog
                    .and_then(|c| c.get(PartCategory::Ratchet, &row.combo.ratchet_name))
                    .and_then(|r| r.contact_points());
                match contact_points {
                    Some(points) => points >= self.config.stamina_counter_min_contact_points,
                    None => contains_any(&row.combo.ratchet_name, &self.config.stamina_counter_markers),
                }
            }
            Some(Archetype::Balanced) | None => true,
        }
    }
}

fn contains_any(name: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| name.contains(m.as_str()))
}

/// Recommend with the default configuration and no catalog.
pub fn recommend(
    statistics: &[ComboStatistics],
    against: Option<Archetype>,
) -> Option<AutomaticRecommendation> {
    Recommender::default().recommend(statistics, against)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BeyType, ComboIdentity, ConfidenceBand, Part, PartStats, RatchetData};
    use chrono::NaiveDate;

    fn row(blade: &str, ratchet: &str, bit: &str, wins: u32, losses: u32) -> ComboStatistics {
        let mut stats = ComboStatistics::empty(
            ComboIdentity::new(blade, ratchet, bit, BeyType::BX),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );
        stats.absorb(wins, losses, 0);
        stats
    }

    fn history() -> Vec<ComboStatistics> {
        vec![
            row("Wizard Rod", "9-60", "B", 6, 4),
            row("Dran Sword", "3-60", "F", 7, 3),
            row("Shark Edge", "3-80", "LF", 9, 1),
            row("Hells Scythe", "4-60", "T", 3, 7),
            row("Pegasus Blast", "7-70", "GF", 5, 5),
        ]
    }

    #[test]
    fn test_empty_history_returns_none() {
        assert!(recommend(&[], Some(Archetype::Attack)).is_none());
        assert!(recommend(&[], None).is_none());
    }

    #[test]
    fn test_top_row_and_alternatives() {
        let rec = recommend(&history(), None).unwrap();

        assert_eq!(rec.recommended_combo.blade_name, "Shark Edge");
        assert_eq!(rec.expected_win_rate, 90.0);
        assert_eq!(rec.data_points, 10);
        assert_eq!(rec.confidence, 20.0);
        assert_eq!(rec.against_type, None);
        assert_eq!(rec.reason, "Based on 10 battles, this combo has a 90.0% win rate");

        let alternatives: Vec<_> = rec
            .alternative_options
            .iter()
            .map(|a| a.blade_name.as_str())
            .collect();
        assert_eq!(alternatives, vec!["Dran Sword", "Wizard Rod", "Pegasus Blast"]);
    }

    #[test]
    fn test_confidence_saturates() {
        let rec = recommend(&[row("Wizard Rod", "9-60", "B", 40, 30)], None).unwrap();
        assert_eq!(rec.confidence, 100.0);
        assert_eq!(rec.confidence_band(), ConfidenceBand::High);
    }

    #[test]
    fn test_against_attack_keeps_top_tiers() {
        let rec = recommend(&history(), Some(Archetype::Attack)).unwrap();
        assert_eq!(rec.recommended_combo.blade_name, "Shark Edge");
        assert_eq!(rec.alternative_options.len(), 2);
        assert_eq!(rec.against_type, Some(Archetype::Attack));
    }

    #[test]
    fn test_against_defense_uses_blade_markers() {
        let rec = recommend(&history(), Some(Archetype::Defense)).unwrap();
        assert_eq!(rec.recommended_combo.blade_name, "Dran Sword");
        assert_eq!(rec.alternative_options.len(), 1);
        assert_eq!(rec.alternative_options[0].blade_name, "Pegasus Blast");
    }

    #[test]
    fn test_against_stamina_uses_ratchet_markers() {
        let rec = recommend(&history(), Some(Archetype::Stamina)).unwrap();
        assert_eq!(rec.recommended_combo.blade_name, "Wizard Rod");
        assert_eq!(rec.alternative_options[0].blade_name, "Pegasus Blast");
    }

    #[test]
    fn test_filter_leaving_nothing_returns_none() {
        let weak = vec![row("Hells Scythe", "4-60", "T", 3, 7)];
        assert!(recommend(&weak, Some(Archetype::Attack)).is_none());
        assert!(recommend(&weak, Some(Archetype::Defense)).is_none());
    }

    #[test]
    fn test_catalog_overrides_markers() {
        let mut catalog = PartCatalog::default();
        catalog.blades.push(
            Part::new(
                "Shark Edge".into(),
                PartCategory::Blade,
                BeyType::BX,
                PartStats::new(60, 10, 10),
            )
            .with_archetype(Archetype::Attack),
        );
        catalog.blades.push(
            Part::new(
                "Dran Sword".into(),
                PartCategory::Blade,
                BeyType::BX,
                PartStats::new(55, 15, 10),
            )
            .with_archetype(Archetype::Balanced),
        );
        catalog.ratchets.push(
            Part::new("3-80".into(), PartCategory::Ratchet, BeyType::BX, PartStats::new(5, 10, 5))
                .with_ratchet_data(RatchetData::from_name("3-80").unwrap()),
        );
        catalog.ratchets.push(
            Part::new("9-60".into(), PartCategory::Ratchet, BeyType::BX, PartStats::new(5, 5, 10))
                .with_ratchet_data(RatchetData::from_name("9-60").unwrap()),
        );

        let recommender = Recommender::new(&AnalyzerConfig::default()).with_catalog(&catalog);

        let rec = recommender.recommend(&history(), Some(Archetype::Defense)).unwrap();
        assert_eq!(rec.recommended_combo.blade_name, "Shark Edge");
        let names: Vec<_> = rec.alternative_options.iter().map(|a| a.blade_name.as_str()).collect();
        assert_eq!(names, vec!["Pegasus Blast"]);

        // 3-80 has too few contact points; 9-60 qualifies; the rest fall back to markers
        let rec = recommender.recommend(&history(), Some(Archetype::Stamina)).unwrap();
        assert_eq!(rec.recommended_combo.blade_name, "Wizard Rod");
        let names: Vec<_> = rec.alternative_options.iter().map(|a| a.blade_name.as_str()).collect();
        assert_eq!(names, vec!["Pegasus Blast"]);
    }
}
