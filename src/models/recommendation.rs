//! Recommendation output consumed by the UI.

use serde::{Deserialize, Serialize};

use super::{Archetype, ConfidenceBand};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCombo {
    pub blade_name: String,
    pub ratchet_name: String,
    pub bit_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeOption {
    pub blade_name: String,
    pub ratchet_name: String,
    pub bit_name: String,
    pub expected_win_rate: f64,
}

/// Best combo from recorded history, optionally against an archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticRecommendation {
    pub recommended_combo: RecommendedCombo,
    pub reason: String,
    pub expected_win_rate: f64,
    /// 0-100, saturating with recorded battles
    pub confidence: f64,
    /// `None` serializes as "Unknown"
    #[serde(with = "against_type")]
    pub against_type: Option<Archetype>,
    pub alternative_options: Vec<AlternativeOption>,
    pub data_points: u32,
}

impl AutomaticRecommendation {
    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.confidence)
    }
}

mod against_type {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::models::Archetype;

    pub fn serialize<S: Serializer>(value: &Option<Archetype>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(archetype) => archetype.serialize(s),
            None => s.serialize_str("Unknown"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Archetype>, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(raw.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(against: Option<Archetype>) -> AutomaticRecommendation {
        AutomaticRecommendation {
            recommended_combo: RecommendedCombo {
                blade_name: "Wizard Rod".into(),
                ratchet_name: "9-60".into(),
                bit_name: "B".into(),
            },
            reason: "Based on 10 battles".into(),
            expected_win_rate: 80.0,
            confidence: 20.0,
            against_type: against,
            alternative_options: vec![],
            data_points: 10,
        }
    }

    #[test]
    fn test_against_type_unknown_when_absent() {
        let json = serde_json::to_value(sample(None)).unwrap();
        assert_eq!(json["againstType"], "Unknown");
        let back: AutomaticRecommendation = serde_json::from_value(json).unwrap();
        assert_eq!(back.against_type, None);
    }

    #[test]
    fn test_against_type_round_trip() {
        let json = serde_json::to_value(sample(Some(Archetype::Defense))).unwrap();
        assert_eq!(json["againstType"], "Defense");
        let back: AutomaticRecommendation = serde_json::from_value(json).unwrap();
        assert_eq!(back.against_type, Some(Archetype::Defense));
    }

    #[test]
    fn test_confidence_band_from_recommendation() {
        assert_eq!(sample(None).confidence_band(), ConfidenceBand::Low);
    }
}
