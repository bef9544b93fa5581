//! Burst-finish susceptibility model.
//!
//! Four proxies are normalized by a cap and clamped to `[0, 1]`, blended into a
//! resistance score, and inverted. The weights are tunable policy.

use crate::config::BurstConfig;
use crate::models::{BurstRisk, Part, Role};

/// Normalization caps and blend weights of the burst model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstModel {
    weight_cap: f64,
    resistance_cap: f64,
    contact_points_cap: f64,
    height_level_cap: f64,
    weight_factor: f64,
    resistance_factor: f64,
    contact_points_factor: f64,
    height_factor: f64,
}

impl BurstModel {
    pub fn from_config(config: &BurstConfig) -> Self {
        Self {
            weight_cap: config.weight_cap,
            resistance_cap: config.resistance_cap,
            contact_points_cap: config.contact_points_cap,
            height_level_cap: config.height_level_cap,
            weight_factor: config.weight_factor,
            resistance_factor: config.resistance_factor,
            contact_points_factor: config.contact_points_factor,
            height_factor: config.height_factor,
        }
    }

    /// Susceptibility in `[0, 1]`; 0 is fully resistant.
    pub fn susceptibility(
        &self,
        blade_weight: f64,
        bit_burst_resistance: f64,
        ratchet_contact_points: f64,
        ratchet_height_level: f64,
    ) -> f64 {
        let resistance = normalize(blade_weight, self.weight_cap) * self.weight_factor
            + normalize(bit_burst_resistance, self.resistance_cap) * self.resistance_factor
            + normalize(ratchet_contact_points, self.contact_points_cap) * self.contact_points_factor
            + normalize(ratchet_height_level, self.height_level_cap) * self.height_factor;

        (1.0 - resistance).clamp(0.0, 1.0)
    }
}

impl Default for BurstModel {
    fn default() -> Self {
        Self::from_config(&BurstConfig::default())
    }
}

fn normalize(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    (value / cap).clamp(0.0, 1.0)
}

/// Susceptibility under the default caps and weights.
pub fn burst_susceptibility(
    blade_weight: u32,
    bit_burst_resistance: u32,
    ratchet_contact_points: u32,
    ratchet_height_level: u32,
) -> f64 {
    BurstModel::default().susceptibility(
        blade_weight as f64,
        bit_burst_resistance as f64,
        ratchet_contact_points as f64,
        ratchet_height_level as f64,
    )
}

/// The four model inputs read off a combo, with fallbacks applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstProxies {
    pub blade_weight: u32,
    pub bit_burst_resistance: u32,
    pub contact_points: u32,
    pub height_level: u32,
}

impl BurstProxies {
    /// Blade weight is approximated as attack + defense. Missing or zero bit
    /// resistance and ratchet geometry fall back to the configured defaults.
    pub fn from_parts(blade: &Part, ratchet: &Part, bit: &Part, config: &BurstConfig) -> Self {
        let or_fallback = |value: Option<u32>, fallback: u32| match value {
            Some(v) if v > 0 => v,
            _ => fallback,
        };

        Self {
            blade_weight: blade.stats.attack.saturating_add(blade.stats.defense),
            bit_burst_resistance: or_fallback(bit.stats.burst, config.fallback_bit_resistance),
            contact_points: or_fallback(ratchet.contact_points(), config.fallback_contact_points),
            height_level: or_fallback(ratchet.height_level(), config.fallback_height_level),
        }
    }

    pub fn susceptibility(&self, model: &BurstModel) -> f64 {
        model.susceptibility(
            self.blade_weight as f64,
            self.bit_burst_resistance as f64,
            self.contact_points as f64,
            self.height_level as f64,
        )
    }
}

/// Role- and tier-specific explanation of a susceptibility score.
pub fn burst_analysis(susceptibility: f64, role: Role) -> String {
    let pct = format!("{:.0}%", susceptibility * 100.0);

    match role {
        Role::Stamina if susceptibility >= 0.7 => format!(
            "This Stamina combo has HIGH Burst Finish susceptibility ({}). Stamina bits have a thin shaft by design. Pair it with a tall ratchet (80mm) and more contact points to improve resistance.",
            pct
        ),
        Role::Stamina if susceptibility >= 0.5 => format!(
            "Moderate Burst Finish susceptibility ({}). The combo is viable but vulnerable to well-placed direct attacks. Keep a defensive position in the stadium.",
            pct
        ),
        Role::Stamina => format!(
            "Excellent Burst Finish resistance ({}). This Stamina combo is very stable and burst resistant. Ideal for Spin Finish.",
            pct
        ),
        Role::Defense if susceptibility <= 0.3 => format!(
            "Maximum Burst Finish resistance ({}). This defensive combo is practically burst-proof. Excellent at absorbing attacks.",
            pct
        ),
        Role::Defense => format!(
            "Good Burst Finish resistance ({}). A reliable defensive combo with above-average burst resistance.",
            pct
        ),
        Role::Attack if susceptibility >= 0.6 => format!(
            "Moderate to high Burst Finish risk ({}). This attack combo is aggressive but vulnerable. Consider bits with better burst resistance.",
            pct
        ),
        Role::Attack => format!(
            "Low to moderate Burst Finish risk ({}). A well-balanced attack combo with acceptable resistance.",
            pct
        ),
        Role::Balance => format!(
            "Burst Finish susceptibility: {}. Risk: {}.",
            pct,
            BurstRisk::from_susceptibility(susceptibility)
        ),
    }
}
