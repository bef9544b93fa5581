//! Metagame snapshots appended after every statistics-affecting event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Archetype;

/// A ranked combo inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboRanking {
    /// Display label (`blade ratchet bit`)
    pub combo: String,
    pub win_rate: f64,
    /// Battles recorded for the combo
    pub usage: u32,
}

/// A ranked blade, ratchet or bit, pooled across every combo using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRanking {
    #[serde(alias = "bladeName", alias = "ratchetName", alias = "bitName")]
    pub name: String,
    pub win_rate: f64,
    pub usage: u32,
}

/// Immutable, timestamped summary of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetagameDynamics {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Same instant as `timestamp`, RFC 3339
    pub date: DateTime<Utc>,

    pub top_combos: Vec<ComboRanking>,
    pub top_blades: Vec<PartRanking>,
    pub top_ratchets: Vec<PartRanking>,
    pub top_bits: Vec<PartRanking>,

    pub meta_trend: String,

    pub dominant_type: Archetype,
}
