//! Battle record model: one submitted game result.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{BattleId, BeyType, EntityId};

/// Separator used to build combo keys (`blade-ratchet-bit`).
pub const COMBO_KEY_SEPARATOR: &str = "-";

/// Outcome of a single battle from the submitting player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "w" => Ok(Outcome::Win),
            "loss" | "l" => Ok(Outcome::Loss),
            "draw" | "d" => Ok(Outcome::Draw),
            other => Err(format!("unknown outcome: {}", other)),
        }
    }
}

/// The blade/ratchet/bit names that identify a combo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboIdentity {
    pub blade_name: String,
    pub ratchet_name: String,
    pub bit_name: String,
    #[serde(default)]
    pub bey_type: BeyType,
}

impl ComboIdentity {
    pub fn new(blade_name: &str, ratchet_name: &str, bit_name: &str, bey_type: BeyType) -> Self {
        Self {
            blade_name: blade_name.to_string(),
            ratchet_name: ratchet_name.to_string(),
            bit_name: bit_name.to_string(),
            bey_type,
        }
    }

    /// Statistics key: names joined by `-`.
    pub fn key(&self) -> String {
        combo_key(&self.blade_name, &self.ratchet_name, &self.bit_name)
    }

    /// Display label: names joined by spaces.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.blade_name, self.ratchet_name, self.bit_name)
    }

    /// Recover an identity from a key.
    ///
    /// Ratchet names contain the separator themselves (`9-60`), so the blade is
    /// everything before the first `-` and the bit everything after the last one.
    pub fn from_key(key: &str, bey_type: BeyType) -> Option<Self> {
        let (blade, rest) = key.split_once(COMBO_KEY_SEPARATOR)?;
        let (ratchet, bit) = rest.rsplit_once(COMBO_KEY_SEPARATOR)?;
        if blade.is_empty() || ratchet.is_empty() || bit.is_empty() {
            return None;
        }
        Some(Self::new(blade, ratchet, bit, bey_type))
    }
}

/// Build a combo key from part names.
pub fn combo_key(blade: &str, ratchet: &str, bit: &str) -> String {
    [blade, ratchet, bit].join(COMBO_KEY_SEPARATOR)
}

/// Free-form description of the opposing combo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blade_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_description: Option<String>,
}

/// An immutable battle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub id: BattleId,

    /// Day the battle was played
    pub date: NaiveDate,

    /// Statistics key of the combo used
    pub combo_id: String,

    #[serde(flatten)]
    pub combo: ComboIdentity,

    pub result: Outcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<Opponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the record was submitted
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl BattleRecord {
    pub fn new(combo: ComboIdentity, result: Outcome, date: NaiveDate) -> Self {
        let timestamp = Utc::now();
        let combo_id = combo.key();
        let id = battle_id(&combo_id, result, date, timestamp);
        Self {
            id,
            date,
            combo_id,
            combo,
            result,
            opponent: None,
            notes: None,
            timestamp,
        }
    }

    /// Pin the submission time (and the ID derived from it).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self.id = battle_id(&self.combo_id, self.result, self.date, timestamp);
        self
    }

    pub fn with_opponent(mut self, opponent: Opponent) -> Self {
        self.opponent = Some(opponent);
        self
    }

    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Whether the opponent description mentions the given blade.
    pub fn opponent_mentions(&self, blade_name: &str) -> bool {
        self.opponent
            .as_ref()
            .and_then(|o| o.combo_description.as_deref())
            .is_some_and(|d| d.contains(blade_name))
    }
}

fn battle_id(combo_id: &str, result: Outcome, date: NaiveDate, at: DateTime<Utc>) -> BattleId {
    EntityId::generate(&[
        "battle",
        combo_id,
        &result.to_string(),
        &date.to_string(),
        &at.timestamp_millis().to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn phoenix() -> ComboIdentity {
        ComboIdentity::new("Soar Phoenix", "9-60", "GF", BeyType::BX)
    }

    #[test]
    fn test_combo_key_joins_names() {
        assert_eq!(phoenix().key(), "Soar Phoenix-9-60-GF");
        assert_eq!(phoenix().label(), "Soar Phoenix 9-60 GF");
    }

    #[test]
    fn test_combo_identity_from_key() {
        let identity = ComboIdentity::from_key("Soar Phoenix-9-60-GF", BeyType::BX).unwrap();
        assert_eq!(identity, phoenix());
        assert!(ComboIdentity::from_key("Soar Phoenix", BeyType::BX).is_none());
        assert!(ComboIdentity::from_key("Soar Phoenix-GF", BeyType::BX).is_none());
    }

    #[test]
    fn test_outcome_from_str() {
        assert_eq!("WIN".parse::<Outcome>(), Ok(Outcome::Win));
        assert_eq!("d".parse::<Outcome>(), Ok(Outcome::Draw));
        assert!("tie".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_battle_record_id_follows_timestamp() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 1).unwrap();
        let a = BattleRecord::new(phoenix(), Outcome::Win, date).with_timestamp(t1);
        let b = BattleRecord::new(phoenix(), Outcome::Win, date).with_timestamp(t1);
        let c = BattleRecord::new(phoenix(), Outcome::Win, date).with_timestamp(t2);
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_battle_record_document_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let record = BattleRecord::new(phoenix(), Outcome::Loss, date).with_timestamp(at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["comboId"], "Soar Phoenix-9-60-GF");
        assert_eq!(json["bladeName"], "Soar Phoenix");
        assert_eq!(json["result"], "loss");
        assert_eq!(json["date"], "2025-03-01");
        assert_eq!(json["timestamp"], at.timestamp_millis());

        let back: BattleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_opponent_mentions() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let record = BattleRecord::new(phoenix(), Outcome::Win, date).with_opponent(Opponent {
            blade_name: None,
            combo_description: Some("Wizard Rod 5-70 B".to_string()),
        });
        assert!(record.opponent_mentions("Wizard Rod"));
        assert!(!record.opponent_mentions("Shark Edge"));
    }
}
