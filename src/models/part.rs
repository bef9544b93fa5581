//! Catalog parts and their stats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityId, PartId};

/// Which slot of a combo a part fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartCategory {
    Blade,
    Ratchet,
    Bit,
    AssistBlade,
}

impl PartCategory {
    pub const ALL: [PartCategory; 4] = [
        PartCategory::Blade,
        PartCategory::Ratchet,
        PartCategory::Bit,
        PartCategory::AssistBlade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartCategory::Blade => "Blade",
            PartCategory::Ratchet => "Ratchet",
            PartCategory::Bit => "Bit",
            PartCategory::AssistBlade => "AssistBlade",
        }
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blade" => Ok(PartCategory::Blade),
            "ratchet" => Ok(PartCategory::Ratchet),
            "bit" => Ok(PartCategory::Bit),
            "assistblade" | "assist-blade" | "assist" => Ok(PartCategory::AssistBlade),
            other => Err(format!("unknown part category: {}", other)),
        }
    }
}

/// Product line a part belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BeyType {
    #[default]
    BX,
    UX,
    CX,
}

impl fmt::Display for BeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeyType::BX => write!(f, "BX"),
            BeyType::UX => write!(f, "UX"),
            BeyType::CX => write!(f, "CX"),
        }
    }
}

impl FromStr for BeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BX" => Ok(BeyType::BX),
            "UX" => Ok(BeyType::UX),
            "CX" => Ok(BeyType::CX),
            other => Err(format!("unknown bey type: {}", other)),
        }
    }
}

/// Tactical archetype, authored on the part or inferred for a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Attack,
    Defense,
    Stamina,
    Balanced,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Attack,
        Archetype::Defense,
        Archetype::Stamina,
        Archetype::Balanced,
    ];
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::Attack => write!(f, "Attack"),
            Archetype::Defense => write!(f, "Defense"),
            Archetype::Stamina => write!(f, "Stamina"),
            Archetype::Balanced => write!(f, "Balanced"),
        }
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Archetype::Attack),
            "defense" => Ok(Archetype::Defense),
            "stamina" => Ok(Archetype::Stamina),
            "balanced" | "balance" => Ok(Archetype::Balanced),
            other => Err(format!("unknown archetype: {}", other)),
        }
    }
}

/// Stat vector. `dash` and `burst` are only meaningful on bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartStats {
    pub attack: u32,
    pub defense: u32,
    pub stamina: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst: Option<u32>,
}

impl PartStats {
    pub fn new(attack: u32, defense: u32, stamina: u32) -> Self {
        Self {
            attack,
            defense,
            stamina,
            dash: None,
            burst: None,
        }
    }

    pub fn with_dash(mut self, dash: u32) -> Self {
        self.dash = Some(dash);
        self
    }

    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }
}

/// Geometry derived from a ratchet name such as `9-60`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatchetData {
    pub name: String,
    pub height: u32,
    pub height_level: u32,
    pub contact_points: u32,
}

impl RatchetData {
    /// Parse `<contact points>-<height>`. Returns `None` for any other shape.
    pub fn from_name(name: &str) -> Option<Self> {
        let (points, height) = name.split_once('-')?;
        if points.is_empty()
            || height.is_empty()
            || !points.bytes().all(|b| b.is_ascii_digit())
            || !height.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let contact_points: u32 = points.parse().ok()?;
        let height: u32 = height.parse().ok()?;

        Some(Self {
            name: name.to_string(),
            height,
            height_level: height_level(height),
            contact_points,
        })
    }
}

/// Height band: 50-55 → 1, 60-65 → 2, 70-75 → 3, 80-85 → 4, anything else → 5.
pub fn height_level(height: u32) -> u32 {
    match height {
        50..=55 => 1,
        60..=65 => 2,
        70..=75 => 3,
        80..=85 => 4,
        _ => 5,
    }
}

/// A catalog part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Derived from category + name
    pub id: PartId,

    pub name: String,

    #[serde(rename = "type")]
    pub category: PartCategory,

    pub bey_type: BeyType,

    pub stats: PartStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Only present on ratchets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratchet_data: Option<RatchetData>,

    /// Authored tactical archetype, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<Archetype>,
}

impl Part {
    pub fn new(name: String, category: PartCategory, bey_type: BeyType, stats: PartStats) -> Self {
        let id = EntityId::generate(&[category.as_str(), &name]);
        Self {
            id,
            name,
            category,
            bey_type,
            stats,
            description: None,
            image_url: None,
            ratchet_data: None,
            archetype: None,
        }
    }

    pub fn with_ratchet_data(mut self, data: RatchetData) -> Self {
        self.ratchet_data = Some(data);
        self
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = Some(archetype);
        self
    }

    pub fn contact_points(&self) -> Option<u32> {
        self.ratchet_data.as_ref().map(|r| r.contact_points)
    }

    pub fn height_level(&self) -> Option<u32> {
        self.ratchet_data.as_ref().map(|r| r.height_level)
    }
}
