//! Deterministic ID generation using SHA256 hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A content-derived identifier for parts, battles and tournaments.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Hash the fields (joined by `|`) and keep the first 16 hex characters.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let digest = hex::encode(hasher.finalize());
        Self(digest[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Catalog part IDs
pub type PartId = EntityId;

/// Battle record IDs
pub type BattleId = EntityId;

/// Tournament entry IDs
pub type TournamentId = EntityId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation_deterministic() {
        let a = EntityId::generate(&["Blade", "Soar Phoenix"]);
        let b = EntityId::generate(&["Blade", "Soar Phoenix"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_entity_id_field_boundaries_matter() {
        let a = EntityId::generate(&["Blade", "Soar Phoenix"]);
        let b = EntityId::generate(&["BladeSoar", " Phoenix"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_id_length_and_hex() {
        let id = EntityId::generate(&["Bit", "GF"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_entity_id_serializes_as_plain_string() {
        let id = EntityId::from("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        let back: EntityId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_entity_id_display_and_debug() {
        let id = EntityId::new("deadbeef".to_string());
        assert_eq!(format!("{}", id), "deadbeef");
        assert!(format!("{:?}", id).contains("deadbeef"));
    }
}
