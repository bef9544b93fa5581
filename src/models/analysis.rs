//! Output shapes of the combo scoring engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Archetype, Part, PartCategory};

/// Combo format being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComboMode {
    #[default]
    BX,
    CX,
}

impl FromStr for ComboMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BX" => Ok(ComboMode::BX),
            "CX" => Ok(ComboMode::CX),
            other => Err(format!("unknown combo mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compatibility {
    Compatible,
    Incompatible,
}

/// Tactical role of a scored combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Attack,
    Defense,
    Stamina,
    Balance,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Attack => write!(f, "Attack"),
            Role::Defense => write!(f, "Defense"),
            Role::Stamina => write!(f, "Stamina"),
            Role::Balance => write!(f, "Balance"),
        }
    }
}

/// Discrete burst-finish risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurstRisk {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl BurstRisk {
    /// Lower bound of each band is inclusive, checked from the top.
    pub fn from_susceptibility(susceptibility: f64) -> Self {
        if susceptibility >= 0.8 {
            BurstRisk::VeryHigh
        } else if susceptibility >= 0.6 {
            BurstRisk::High
        } else if susceptibility >= 0.4 {
            BurstRisk::Medium
        } else if susceptibility >= 0.2 {
            BurstRisk::Low
        } else {
            BurstRisk::VeryLow
        }
    }
}

impl fmt::Display for BurstRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurstRisk::VeryHigh => write!(f, "Very High"),
            BurstRisk::High => write!(f, "High"),
            BurstRisk::Medium => write!(f, "Medium"),
            BurstRisk::Low => write!(f, "Low"),
            BurstRisk::VeryLow => write!(f, "Very Low"),
        }
    }
}

/// A part swap proposed by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSuggestion {
    pub part: PartCategory,
    pub reason: String,
    /// Catalog names, in catalog order
    pub alternatives: Vec<String>,
}

/// One axis of the radar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxis {
    pub label: String,
    pub value: f64,
    pub max: f64,
}

impl RadarAxis {
    pub fn new(label: &str, value: f64, max: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
            max,
        }
    }
}

/// What the user picked: three required parts, an optional assist blade.
#[derive(Debug, Clone, Copy)]
pub struct ComboSelection<'a> {
    pub blade: Option<&'a Part>,
    pub ratchet: Option<&'a Part>,
    pub bit: Option<&'a Part>,
    pub assist_blade: Option<&'a Part>,
    pub mode: ComboMode,
}

impl<'a> ComboSelection<'a> {
    pub fn new(blade: &'a Part, ratchet: &'a Part, bit: &'a Part, mode: ComboMode) -> Self {
        Self {
            blade: Some(blade),
            ratchet: Some(ratchet),
            bit: Some(bit),
            assist_blade: None,
            mode,
        }
    }

    pub fn with_assist_blade(mut self, assist: &'a Part) -> Self {
        self.assist_blade = Some(assist);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.blade.is_some() && self.ratchet.is_some() && self.bit.is_some()
    }
}

/// Full scoring of one combo. Recomputed on every selection change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub compatibility: Compatibility,
    pub overall_score: u32,
    pub combo_type: Role,

    pub total_attack: u32,
    pub total_defense: u32,
    pub total_stamina: u32,

    /// 0 = resistant, 1 = very susceptible
    pub burst_susceptibility: f64,
    pub burst_finish_risk: BurstRisk,
    pub burst_finish_analysis: String,

    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub best_against: Vec<Archetype>,
    pub weak_against: Vec<Archetype>,

    pub suggestions: Vec<PartSuggestion>,

    pub radar_data: Vec<RadarAxis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_blade: Option<String>,
}

impl AnalysisResult {
    pub fn is_compatible(&self) -> bool {
        self.compatibility == Compatibility::Compatible
    }
}
