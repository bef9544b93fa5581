//! Metagame insight report built from the whole battle database.

use serde::{Deserialize, Serialize};

use crate::calculate::{percentage, sort_by_win_rate_desc};
use crate::catalog::PartCatalog;
use crate::models::{Archetype, BattleDatabase, ComboStatistics, Outcome, PartCategory, Trend};

const ATTACK_BLADE_MARKERS: [&str; 2] = ["Shark", "Pegasus"];
const DEFENSE_BLADE_MARKERS: [&str; 2] = ["Dragoon", "Wyvern"];
const STAMINA_RATCHET_MARKERS: [&str; 2] = ["9", "7"];

/// Battles compared against the full history for the performance trend.
const RECENT_BATTLES: usize = 20;
/// Direct battles at which matchup confidence reaches 100.
const MATCHUP_SATURATION: u32 = 10;
const TREND_MARGIN: f64 = 5.0;
const MATCHUP_MARGIN: f64 = 10.0;
const MAX_MATCHUPS: usize = 3;

/// Pooled performance of one archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeStanding {
    pub archetype: Archetype,
    pub wins: u32,
    pub total: u32,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTrend {
    pub direction: Trend,
    /// Absolute difference in percentage points
    pub percentage: f64,
    pub description: String,
}

/// Head-to-head record of two combos, from battles naming each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupAnalysis {
    pub combo1: String,
    pub combo2: String,
    pub combo1_win_rate: f64,
    pub combo2_win_rate: f64,
    pub recommendation: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetagameInsight {
    pub trend: PerformanceTrend,
    /// `None` while there is no data
    pub dominant_archetype: Option<Archetype>,
    pub emerging_archetype: Option<Archetype>,
    pub weak_archetype: Option<Archetype>,
    pub recommendations: Vec<String>,
    pub matchup_analysis: Vec<MatchupAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboAdjustment {
    pub suggestion: String,
    pub reason: String,
    pub alternatives: Vec<String>,
}

/// Archetype of a statistics row: the blade's authored archetype when the
/// catalog has one, otherwise name markers.
pub fn classify_archetype(row: &ComboStatistics, catalog: Option<&PartCatalog>) -> Archetype {
    if let Some(archetype) =
        catalog.and_then(|c| c.archetype_of(PartCategory::Blade, &row.combo.blade_name))
    {
        return archetype;
    }

    let blade = &row.combo.blade_name;
    let ratchet = &row.combo.ratchet_name;
    if ATTACK_BLADE_MARKERS.iter().any(|m| blade.contains(m)) {
        Archetype::Attack
    } else if DEFENSE_BLADE_MARKERS.iter().any(|m| blade.contains(m)) {
        Archetype::Defense
    } else if STAMINA_RATCHET_MARKERS.iter().any(|m| ratchet.contains(m)) {
        Archetype::Stamina
    } else {
        Archetype::Balanced
    }
}

/// Wins and battles pooled per archetype, in `Archetype::ALL` order.
pub fn archetype_standings(
    statistics: &[ComboStatistics],
    catalog: Option<&PartCatalog>,
) -> Vec<ArchetypeStanding> {
    let mut standings: Vec<ArchetypeStanding> = Archetype::ALL
        .iter()
        .map(|a| ArchetypeStanding {
            archetype: *a,
            wins: 0,
            total: 0,
            win_rate: 0.0,
        })
        .collect();

    for row in statistics {
        let archetype = classify_archetype(row, catalog);
        if let Some(standing) = standings.iter_mut().find(|s| s.archetype == archetype) {
            standing.wins += row.wins;
            standing.total += row.total_battles;
        }
    }

    for standing in &mut standings {
        standing.win_rate = percentage(standing.wins, standing.total);
    }
    standings
}

pub fn analyze_matchup(
    first: &ComboStatistics,
    second: &ComboStatistics,
    db: &BattleDatabase,
) -> MatchupAnalysis {
    let mut first_wins = 0;
    let mut second_wins = 0;

    for record in &db.battle_records {
        if record.result != Outcome::Win {
            continue;
        }
        if record.combo_id == first.combo_id && record.opponent_mentions(&second.combo.blade_name) {
            first_wins += 1;
        } else if record.combo_id == second.combo_id
            && record.opponent_mentions(&first.combo.blade_name)
        {
            second_wins += 1;
        }
    }

    let direct = first_wins + second_wins;
    let (first_rate, second_rate) = if direct > 0 {
        (percentage(first_wins, direct), percentage(second_wins, direct))
    } else {
        (50.0, 50.0)
    };

    let recommendation = if first_rate > second_rate + MATCHUP_MARGIN {
        format!(
            "{} has the edge against {}",
            first.combo.blade_name, second.combo.blade_name
        )
    } else if second_rate > first_rate + MATCHUP_MARGIN {
        format!(
            "{} has the edge against {}",
            second.combo.blade_name, first.combo.blade_name
        )
    } else {
        "Even matchup".to_string()
    };

    MatchupAnalysis {
        combo1: first.combo.label(),
        combo2: second.combo.label(),
        combo1_win_rate: first_rate,
        combo2_win_rate: second_rate,
        recommendation,
        confidence: crate::calculate::data_confidence(direct, MATCHUP_SATURATION),
    }
}

fn performance_trend(db: &BattleDatabase) -> PerformanceTrend {
    let records = &db.battle_records;
    if records.is_empty() {
        return PerformanceTrend {
            direction: Trend::Stable,
            percentage: 0.0,
            description: "Not enough data".to_string(),
        };
    }

    let wins_in = |slice: &[crate::models::BattleRecord]| {
        slice.iter().filter(|r| r.result == Outcome::Win).count() as u32
    };
    let recent = &records[records.len().saturating_sub(RECENT_BATTLES)..];
    let recent_rate = percentage(wins_in(recent), recent.len() as u32);
    let overall_rate = percentage(wins_in(records.as_slice()), records.len() as u32);

    let difference = recent_rate - overall_rate;
    let direction = Trend::from_difference(difference, TREND_MARGIN);
    let description = match direction {
        Trend::Rising => format!("Your performance is improving ({:.1}% recently)", recent_rate),
        Trend::Falling => format!("Your performance is slipping ({:.1}% recently)", recent_rate),
        Trend::Stable => format!("Your performance is stable ({:.1}% overall)", overall_rate),
    };

    PerformanceTrend {
        direction,
        percentage: difference.abs(),
        description,
    }
}

fn meta_advice(dominant: Archetype) -> &'static [&'static str] {
    match dominant {
        Archetype::Attack => &[
            "Aggressive meta: use defensive combos to counter",
            "Tall ratchets (80mm) gain importance",
        ],
        Archetype::Defense => &[
            "Defensive meta: pure attack combos struggle",
            "Focus on stamina to win by attrition",
        ],
        Archetype::Stamina => &[
            "Slow meta: fast combos can catch opponents off guard",
            "Aggressive attacks in the first seconds are crucial",
        ],
        Archetype::Balanced => &[],
    }
}

/// Full insight report for a database.
pub fn generate_insight(db: &BattleDatabase, catalog: Option<&PartCatalog>) -> MetagameInsight {
    let statistics = &db.combo_statistics;
    if statistics.is_empty() {
        return MetagameInsight {
            trend: PerformanceTrend {
                direction: Trend::Stable,
                percentage: 0.0,
                description: "Not enough data".to_string(),
            },
            dominant_archetype: None,
            emerging_archetype: None,
            weak_archetype: None,
            recommendations: vec!["Record more battles to analyze the metagame".to_string()],
            matchup_analysis: Vec::new(),
        };
    }

    let standings = archetype_standings(statistics, catalog);

    let mut dominant = Archetype::Balanced;
    let mut dominant_rate = 0.0;
    for s in standings.iter().filter(|s| s.total > 0) {
        if s.win_rate > dominant_rate {
            dominant = s.archetype;
            dominant_rate = s.win_rate;
        }
    }

    let mut emerging = Archetype::Balanced;
    let mut emerging_rate = 0.0;
    let mut weak = Archetype::Balanced;
    let mut weak_rate = 100.0;
    for s in standings
        .iter()
        .filter(|s| s.archetype != dominant && s.total > 0)
    {
        if s.win_rate > emerging_rate {
            emerging = s.archetype;
            emerging_rate = s.win_rate;
        }
        if s.win_rate < weak_rate {
            weak = s.archetype;
            weak_rate = s.win_rate;
        }
    }

    let mut recommendations: Vec<String> =
        meta_advice(dominant).iter().map(|s| s.to_string()).collect();
    recommendations.push(format!(
        "{} is on the rise, consider testing combos of this type",
        emerging
    ));

    let mut ranked: Vec<&ComboStatistics> = statistics.iter().collect();
    sort_by_win_rate_desc(&mut ranked, |row| row.win_rate);
    let matchup_analysis = ranked
        .windows(2)
        .take(MAX_MATCHUPS)
        .map(|pair| analyze_matchup(pair[0], pair[1], db))
        .collect();

    MetagameInsight {
        trend: performance_trend(db),
        dominant_archetype: Some(dominant),
        emerging_archetype: Some(emerging),
        weak_archetype: Some(weak),
        recommendations,
        matchup_analysis,
    }
}

/// Advice for one combo against the current metagame.
pub fn suggest_combo_adjustments(
    row: &ComboStatistics,
    db: &BattleDatabase,
    catalog: Option<&PartCatalog>,
) -> ComboAdjustment {
    if row.win_rate < 40.0 {
        return ComboAdjustment {
            suggestion: "Consider switching this combo".to_string(),
            reason: format!("Low win rate ({:.1}%) against the current meta", row.win_rate),
            alternatives: db
                .combo_statistics
                .iter()
                .filter(|c| c.win_rate > 55.0)
                .take(3)
                .map(|c| c.combo.label())
                .collect(),
        };
    }

    if row.win_rate >= 70.0 {
        return ComboAdjustment {
            suggestion: "Excellent combo, keep using it".to_string(),
            reason: format!("High win rate ({:.1}%) against the current meta", row.win_rate),
            alternatives: Vec::new(),
        };
    }

    let dominant = generate_insight(db, catalog).dominant_archetype;

    if row.combo.ratchet_name.contains("60") && dominant == Some(Archetype::Attack) {
        return ComboAdjustment {
            suggestion: "Consider a taller ratchet".to_string(),
            reason: "Aggressive meta: taller ratchets (80mm) gain importance".to_string(),
            alternatives: vec![
                "Switch to 7-80 or 6-80".to_string(),
                "Keep 9-60 for stamina".to_string(),
            ],
        };
    }

    if row.combo.bit_name == "GF" && dominant == Some(Archetype::Defense) {
        return ComboAdjustment {
            suggestion: "Consider a defensive bit".to_string(),
            reason: "Defensive meta: defensive bits (O, LO) perform better".to_string(),
            alternatives: vec![
                "Switch to O or LO".to_string(),
                "Keep GF for attack".to_string(),
            ],
        };
    }

    ComboAdjustment {
        suggestion: "Balanced combo".to_string(),
        reason: format!(
            "Adequate performance ({:.1}%) against the current meta",
            row.win_rate
        ),
        alternatives: Vec::new(),
    }
}
