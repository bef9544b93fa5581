//! Configuration loading and validation.
//!
//! Every threshold the engines use lives here so a host can override it from
//! a TOML file. Defaults reproduce the reference behaviour.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Combo scoring thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// A role is only assigned when its axis total is strictly above this
    #[serde(default = "default_role_threshold")]
    pub role_threshold: u32,

    /// Blades (substring match) that cannot be used in BX mode
    #[serde(default = "default_cx_excluded_blades")]
    pub cx_excluded_blades: Vec<String>,

    /// Burst susceptibility at which bit/ratchet swaps are suggested
    #[serde(default = "default_burst_suggestion_threshold")]
    pub burst_suggestion_threshold: f64,

    /// Blade attack below which a blade swap is suggested
    #[serde(default = "default_low_attack_threshold")]
    pub low_attack_threshold: u32,

    /// Names listed per suggestion
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
}

fn default_role_threshold() -> u32 {
    100
}

fn default_cx_excluded_blades() -> Vec<String> {
    ["Courage", "Reaper", "Arc Wizard", "Dark", "Wolf Hunt", "Pegasus Blast"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_burst_suggestion_threshold() -> f64 {
    0.7
}

fn default_low_attack_threshold() -> u32 {
    20
}

fn default_max_alternatives() -> usize {
    2
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            role_threshold: default_role_threshold(),
            cx_excluded_blades: default_cx_excluded_blades(),
            burst_suggestion_threshold: default_burst_suggestion_threshold(),
            low_attack_threshold: default_low_attack_threshold(),
            max_alternatives: default_max_alternatives(),
        }
    }
}

/// Burst-risk model normalization caps, weights and fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstConfig {
    #[serde(default = "default_weight_cap")]
    pub weight_cap: f64,
    #[serde(default = "default_resistance_cap")]
    pub resistance_cap: f64,
    #[serde(default = "default_contact_points_cap")]
    pub contact_points_cap: f64,
    #[serde(default = "default_height_level_cap")]
    pub height_level_cap: f64,

    #[serde(default = "default_weight_factor")]
    pub weight_factor: f64,
    #[serde(default = "default_resistance_factor")]
    pub resistance_factor: f64,
    #[serde(default = "default_contact_points_factor")]
    pub contact_points_factor: f64,
    #[serde(default = "default_height_factor")]
    pub height_factor: f64,

    /// Used when a bit has no (or zero) burst stat
    #[serde(default = "default_fallback_bit_resistance")]
    pub fallback_bit_resistance: u32,
    /// Used when a ratchet has no derived contact points
    #[serde(default = "default_fallback_contact_points")]
    pub fallback_contact_points: u32,
    /// Used when a ratchet has no derived height level
    #[serde(default = "default_fallback_height_level")]
    pub fallback_height_level: u32,
}

fn default_weight_cap() -> f64 {
    40.0
}

fn default_resistance_cap() -> f64 {
    100.0
}

fn default_contact_points_cap() -> f64 {
    9.0
}

fn default_height_level_cap() -> f64 {
    5.0
}

fn default_weight_factor() -> f64 {
    0.3
}

fn default_resistance_factor() -> f64 {
    0.4
}

fn default_contact_points_factor() -> f64 {
    0.2
}

fn default_height_factor() -> f64 {
    0.1
}

fn default_fallback_bit_resistance() -> u32 {
    50
}

fn default_fallback_contact_points() -> u32 {
    3
}

fn default_fallback_height_level() -> u32 {
    2
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            weight_cap: default_weight_cap(),
            resistance_cap: default_resistance_cap(),
            contact_points_cap: default_contact_points_cap(),
            height_level_cap: default_height_level_cap(),
            weight_factor: default_weight_factor(),
            resistance_factor: default_resistance_factor(),
            contact_points_factor: default_contact_points_factor(),
            height_factor: default_height_factor(),
            fallback_bit_resistance: default_fallback_bit_resistance(),
            fallback_contact_points: default_fallback_contact_points(),
            fallback_height_level: default_fallback_height_level(),
        }
    }
}

impl BurstConfig {
    fn factor_sum(&self) -> f64 {
        self.weight_factor + self.resistance_factor + self.contact_points_factor + self.height_factor
    }
}

/// Statistics aggregation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Seed a first-battle draw as {50, 50, 100} instead of {0, 0, 100}
    #[serde(default)]
    pub legacy_draw_seeding: bool,

    /// How many of a combo's latest battles count as "recent"
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,

    /// Percentage points recent performance must move to leave Stable
    #[serde(default = "default_trend_margin")]
    pub trend_margin: f64,
}

fn default_trend_window() -> usize {
    10
}

fn default_trend_margin() -> f64 {
    5.0
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            legacy_draw_seeding: false,
            trend_window: default_trend_window(),
            trend_margin: default_trend_margin(),
        }
    }
}

/// Recommendation generator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Battles at which confidence reaches 100
    #[serde(default = "default_confidence_saturation")]
    pub confidence_saturation: u32,

    #[serde(default = "default_alternatives")]
    pub alternatives: usize,

    /// Blade name markers kept when countering Defense
    #[serde(default = "default_defense_counter_markers")]
    pub defense_counter_markers: Vec<String>,

    /// Ratchet name markers kept when countering Stamina
    #[serde(default = "default_stamina_counter_markers")]
    pub stamina_counter_markers: Vec<String>,

    /// Ratchet contact points kept when countering Stamina (catalog lookups)
    #[serde(default = "default_stamina_counter_min_contact_points")]
    pub stamina_counter_min_contact_points: u32,
}

fn default_confidence_saturation() -> u32 {
    50
}

fn default_alternatives() -> usize {
    3
}

fn default_defense_counter_markers() -> Vec<String> {
    vec!["Dran".to_string(), "Pegasus".to_string()]
}

fn default_stamina_counter_markers() -> Vec<String> {
    vec!["9".to_string(), "7".to_string()]
}

fn default_stamina_counter_min_contact_points() -> u32 {
    7
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            confidence_saturation: default_confidence_saturation(),
            alternatives: default_alternatives(),
            defense_counter_markers: default_defense_counter_markers(),
            stamina_counter_markers: default_stamina_counter_markers(),
            stamina_counter_min_contact_points: default_stamina_counter_min_contact_points(),
        }
    }
}

/// Metagame summary options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetagameConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}

impl Default for MetagameConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

/// Main analyzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub burst: BurstConfig,

    #[serde(default)]
    pub statistics: StatisticsConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,

    #[serde(default)]
    pub metagame: MetagameConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            scoring: ScoringConfig::default(),
            burst: BurstConfig::default(),
            statistics: StatisticsConfig::default(),
            recommendation: RecommendationConfig::default(),
            metagame: MetagameConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let burst = &self.burst;
        let caps = [
            ("weight_cap", burst.weight_cap),
            ("resistance_cap", burst.resistance_cap),
            ("contact_points_cap", burst.contact_points_cap),
            ("height_level_cap", burst.height_level_cap),
        ];
        for (name, cap) in caps {
            if cap <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "burst.{} must be greater than 0",
                    name
                )));
            }
        }

        if (burst.factor_sum() - 1.0).abs() > 1e-6 {
            return Err(ConfigError::ValidationError(format!(
                "burst factors must sum to 1, got {}",
                burst.factor_sum()
            )));
        }

        if !(0.0..=1.0).contains(&self.scoring.burst_suggestion_threshold) {
            return Err(ConfigError::ValidationError(
                "scoring.burst_suggestion_threshold must be within [0, 1]".to_string(),
            ));
        }

        if self.statistics.trend_window == 0 {
            return Err(ConfigError::ValidationError(
                "statistics.trend_window must be greater than 0".to_string(),
            ));
        }

        if self.statistics.trend_margin < 0.0 {
            return Err(ConfigError::ValidationError(
                "statistics.trend_margin must not be negative".to_string(),
            ));
        }

        if self.recommendation.confidence_saturation == 0 {
            return Err(ConfigError::ValidationError(
                "recommendation.confidence_saturation must be greater than 0".to_string(),
            ));
        }

        if self.metagame.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "metagame.top_n must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
