//! Combo scoring engine.
//!
//! A pure function of the selected parts, the combo mode and the catalog:
//! per-axis totals, a single tactical role, burst risk, qualitative notes and
//! part swap suggestions. The catalog is only read for suggestions.

pub mod burst;
pub mod text;

use tracing::debug;

use crate::catalog::PartCatalog;
use crate::config::{AnalyzerConfig, BurstConfig, ScoringConfig};
use crate::models::{
    AnalysisResult, BeyType, BurstRisk, ComboMode, ComboSelection, Compatibility, Part,
    PartCategory, PartSuggestion, RadarAxis, Role,
};

pub use burst::{burst_analysis, burst_susceptibility, BurstModel, BurstProxies};
pub use text::{role_profile, ProfileInputs, RoleProfile};

/// Max value of the three stat axes on the radar chart.
const RADAR_STAT_MAX: f64 = 150.0;

/// Scores combos against a fixed configuration.
#[derive(Debug, Clone)]
pub struct ComboAnalyzer {
    scoring: ScoringConfig,
    burst: BurstConfig,
    model: BurstModel,
}

impl ComboAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            scoring: config.scoring.clone(),
            burst: config.burst.clone(),
            model: BurstModel::from_config(&config.burst),
        }
    }

    /// Analyze a selection. `None` when any of the three required parts is missing.
    pub fn analyze(&self, selection: &ComboSelection<'_>, catalog: &PartCatalog) -> Option<AnalysisResult> {
        let (blade, ratchet, bit) = match (selection.blade, selection.ratchet, selection.bit) {
            (Some(blade), Some(ratchet), Some(bit)) => (blade, ratchet, bit),
            _ => return None,
        };

        if !self.is_compatible(blade, selection.mode) {
            debug!("Blade '{}' is not allowed in {:?} mode", blade.name, selection.mode);
            return Some(incompatible_result());
        }

        let mut result = self.score(blade, ratchet, bit, catalog);

        if let Some(assist) = selection.assist_blade {
            match selection.mode {
                ComboMode::CX => result.assist_blade = Some(assist.name.clone()),
                ComboMode::BX => debug!("Ignoring assist blade '{}' in BX mode", assist.name),
            }
        }

        Some(result)
    }

    /// A denylisted blade is only usable in BX mode when it is itself a CX part.
    pub fn is_compatible(&self, blade: &Part, mode: ComboMode) -> bool {
        mode != ComboMode::BX
            || blade.bey_type == BeyType::CX
            || !self
                .scoring
                .cx_excluded_blades
                .iter()
                .any(|excluded| blade.name.contains(excluded.as_str()))
    }

    /// Role of the axis holding the maximum, if it is strictly above the threshold.
    pub fn classify(&self, total_attack: u32, total_defense: u32, total_stamina: u32) -> Role {
        let max = total_attack.max(total_defense).max(total_stamina);
        let threshold = self.scoring.role_threshold;

        if total_attack == max && total_attack > threshold {
            Role::Attack
        } else if total_defense == max && total_defense > threshold {
            Role::Defense
        } else if total_stamina == max && total_stamina > threshold {
            Role::Stamina
        } else {
            Role::Balance
        }
    }

    fn score(&self, blade: &Part, ratchet: &Part, bit: &Part, catalog: &PartCatalog) -> AnalysisResult {
        let parts = [blade, ratchet, bit];
        let total_attack: u32 = parts.iter().map(|p| p.stats.attack).sum();
        let total_defense: u32 = parts.iter().map(|p| p.stats.defense).sum();
        let total_stamina: u32 = parts.iter().map(|p| p.stats.stamina).sum();
        let overall_score =
            ((total_attack + total_defense + total_stamina) as f64 / 3.0).round() as u32;

        let combo_type = self.classify(total_attack, total_defense, total_stamina);

        let proxies = BurstProxies::from_parts(blade, ratchet, bit, &self.burst);
        let burst_susceptibility = proxies.susceptibility(&self.model);
        let burst_finish_risk = BurstRisk::from_susceptibility(burst_susceptibility);

        let profile = role_profile(
            combo_type,
            &ProfileInputs {
                total_attack,
                total_defense,
                total_stamina,
                overall_score,
                contact_points: proxies.contact_points,
                burst_risk: burst_finish_risk,
            },
        );

        let suggestions = self.suggestions(blade, ratchet, bit, catalog, burst_susceptibility);

        let radar_data = vec![
            RadarAxis::new("Attack", total_attack as f64, RADAR_STAT_MAX),
            RadarAxis::new("Defense", total_defense as f64, RADAR_STAT_MAX),
            RadarAxis::new("Stamina", total_stamina as f64, RADAR_STAT_MAX),
            RadarAxis::new("Burst Resistance", (1.0 - burst_susceptibility) * 100.0, 100.0),
            RadarAxis::new("Stability", proxies.contact_points as f64 * 10.0, 100.0),
        ];

        debug!(
            "Scored {} / {} / {}: {} ({}/{}/{}), burst {:.2}",
            blade.name,
            ratchet.name,
            bit.name,
            combo_type,
            total_attack,
            total_defense,
            total_stamina,
            burst_susceptibility
        );

        AnalysisResult {
            compatibility: Compatibility::Compatible,
            overall_score,
            combo_type,
            total_attack,
            total_defense,
            total_stamina,
            burst_susceptibility,
            burst_finish_risk,
            burst_finish_analysis: burst_analysis(burst_susceptibility, combo_type),
            strengths: profile.strengths,
            weaknesses: profile.weaknesses,
            recommendations: profile.recommendations,
            best_against: profile.best_against,
            weak_against: profile.weak_against,
            suggestions,
            radar_data,
            assist_blade: None,
        }
    }

    fn suggestions(
        &self,
        blade: &Part,
        ratchet: &Part,
        bit: &Part,
        catalog: &PartCatalog,
        burst_susceptibility: f64,
    ) -> Vec<PartSuggestion> {
        let limit = self.scoring.max_alternatives;
        let mut suggestions = Vec::new();

        if burst_susceptibility >= self.scoring.burst_suggestion_threshold {
            let current = bit.stats.burst.unwrap_or(0);
            let better = names_where(catalog.parts(PartCategory::Bit), limit, |b| {
                b.stats.burst.unwrap_or(0) > current
            });
            if !better.is_empty() {
                suggestions.push(PartSuggestion {
                    part: PartCategory::Bit,
                    reason: "Current bit has low burst resistance. Try a bit with better burst resistance."
                        .to_string(),
                    alternatives: better,
                });
            }

            let current = ratchet.contact_points().unwrap_or(0);
            let better = names_where(catalog.parts(PartCategory::Ratchet), limit, |r| {
                r.contact_points().unwrap_or(0) > current
            });
            if !better.is_empty() {
                suggestions.push(PartSuggestion {
                    part: PartCategory::Ratchet,
                    reason: "A ratchet with more contact points would raise burst resistance."
                        .to_string(),
                    alternatives: better,
                });
            }
        }

        if blade.stats.attack < self.scoring.low_attack_threshold {
            let current = blade.stats.attack;
            let better = names_where(catalog.parts(PartCategory::Blade), limit, |b| {
                b.stats.attack > current
            });
            if !better.is_empty() {
                suggestions.push(PartSuggestion {
                    part: PartCategory::Blade,
                    reason: "Current blade has low attack. Consider a more aggressive blade."
                        .to_string(),
                    alternatives: better,
                });
            }
        }

        suggestions
    }
}

impl Default for ComboAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

fn names_where(parts: &[Part], limit: usize, keep: impl Fn(&Part) -> bool) -> Vec<String> {
    parts
        .iter()
        .filter(|p| keep(p))
        .take(limit)
        .map(|p| p.name.clone())
        .collect()
}

fn incompatible_result() -> AnalysisResult {
    AnalysisResult {
        compatibility: Compatibility::Incompatible,
        overall_score: 0,
        combo_type: Role::Balance,
        total_attack: 0,
        total_defense: 0,
        total_stamina: 0,
        burst_susceptibility: 1.0,
        burst_finish_risk: BurstRisk::VeryHigh,
        burst_finish_analysis: "Type incompatibility: CX blade cannot be used in a BX combo"
            .to_string(),
        strengths: Vec::new(),
        weaknesses: vec!["Type incompatibility".to_string()],
        recommendations: vec!["Select a compatible blade".to_string()],
        best_against: Vec::new(),
        weak_against: Vec::new(),
        suggestions: Vec::new(),
        radar_data: Vec::new(),
        assist_blade: None,
    }
}

/// Score a combo with the default configuration.
pub fn analyze_combo(
    blade: Option<&Part>,
    ratchet: Option<&Part>,
    bit: Option<&Part>,
    mode: ComboMode,
    catalog: &PartCatalog,
) -> Option<AnalysisResult> {
    let selection = ComboSelection {
        blade,
        ratchet,
        bit,
        assist_blade: None,
        mode,
    };
    ComboAnalyzer::default().analyze(&selection, catalog)
}
