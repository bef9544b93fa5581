//! Part catalog: the lookup surface for scoring and suggestions.
//!
//! Parts are grouped per category in display order. Insertions are validated
//! (nomenclature, duplicates); a catalog built directly or merged from an
//! import is taken as-is.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Archetype, BeyType, Part, PartCategory, PartId, PartStats, RatchetData};

/// Catalog mutation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Part name must not be empty")]
    EmptyName,

    #[error("Invalid {category} name '{name}': {rule}")]
    Nomenclature {
        category: PartCategory,
        name: String,
        rule: &'static str,
    },

    #[error("Part \"{0}\" already exists in the catalog")]
    Duplicate(String),

    #[error("No {category} with id {id}")]
    NotFound { category: PartCategory, id: PartId },
}

/// A part as submitted by the user, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPart {
    pub name: String,
    #[serde(rename = "type")]
    pub category: PartCategory,
    pub bey_type: BeyType,
    pub stats: PartStats,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub archetype: Option<Archetype>,
}

impl NewPart {
    pub fn new(name: &str, category: PartCategory, bey_type: BeyType, stats: PartStats) -> Self {
        Self {
            name: name.to_string(),
            category,
            bey_type,
            stats,
            description: None,
            image_url: None,
            archetype: None,
        }
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = Some(archetype);
        self
    }
}

/// `{success, error}` shape reported to the UI after an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInsertResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<PartId>,
}

impl From<Result<PartId, CatalogError>> for PartInsertResult {
    fn from(result: Result<PartId, CatalogError>) -> Self {
        match result {
            Ok(id) => Self {
                success: true,
                error: None,
                part_id: Some(id),
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
                part_id: None,
            },
        }
    }
}

/// Parts partitioned by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartCatalog {
    #[serde(default)]
    pub blades: Vec<Part>,
    #[serde(default)]
    pub ratchets: Vec<Part>,
    #[serde(default)]
    pub bits: Vec<Part>,
    #[serde(default)]
    pub assist_blades: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parts(&self, category: PartCategory) -> &[Part] {
        match category {
            PartCategory::Blade => &self.blades,
            PartCategory::Ratchet => &self.ratchets,
            PartCategory::Bit => &self.bits,
            PartCategory::AssistBlade => &self.assist_blades,
        }
    }

    fn parts_mut(&mut self, category: PartCategory) -> &mut Vec<Part> {
        match category {
            PartCategory::Blade => &mut self.blades,
            PartCategory::Ratchet => &mut self.ratchets,
            PartCategory::Bit => &mut self.bits,
            PartCategory::AssistBlade => &mut self.assist_blades,
        }
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, category: PartCategory, name: &str) -> Option<&Part> {
        self.parts(category)
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        PartCategory::ALL.iter().map(|c| self.parts(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Authored archetype of a part, when the catalog knows it.
    pub fn archetype_of(&self, category: PartCategory, name: &str) -> Option<Archetype> {
        self.get(category, name).and_then(|p| p.archetype)
    }

    /// Validate and append a part. Nothing changes on error.
    pub fn add_part(&mut self, new_part: NewPart) -> Result<PartId, CatalogError> {
        if let Err(e) = validate_nomenclature(&new_part.name, new_part.category) {
            warn!("Rejected part '{}': {}", new_part.name, e);
            return Err(e);
        }

        if self.get(new_part.category, &new_part.name).is_some() {
            warn!("Rejected duplicate {} '{}'", new_part.category, new_part.name);
            return Err(CatalogError::Duplicate(new_part.name));
        }

        let mut part = Part::new(
            new_part.name,
            new_part.category,
            new_part.bey_type,
            new_part.stats,
        );
        part.description = new_part.description;
        part.image_url = new_part.image_url;
        part.archetype = new_part.archetype;
        if part.category == PartCategory::Ratchet {
            part.ratchet_data = RatchetData::from_name(&part.name);
        }

        let id = part.id.clone();
        info!("Added {} '{}' ({})", part.category, part.name, id);
        self.parts_mut(part.category).push(part);
        self.last_updated = Some(Utc::now());
        Ok(id)
    }

    /// Remove a part by id.
    pub fn remove_part(&mut self, category: PartCategory, id: &PartId) -> Result<Part, CatalogError> {
        let parts = self.parts_mut(category);
        let index = parts
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound {
                category,
                id: id.clone(),
            })?;
        let removed = parts.remove(index);
        self.last_updated = Some(Utc::now());
        debug!("Removed {} '{}'", category, removed.name);
        Ok(removed)
    }

    /// Append every part of an imported catalog. Imports are not re-validated.
    pub fn merge(&mut self, imported: PartCatalog) -> usize {
        let mut added = 0;
        for category in PartCategory::ALL {
            let incoming = imported.parts(category).to_vec();
            added += incoming.len();
            self.parts_mut(category).extend(incoming);
        }
        self.last_updated = Some(Utc::now());
        info!("Merged {} imported parts into the catalog", added);
        added
    }
}

fn blade_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][a-z]+ [A-Z][a-z]+").unwrap())
}

fn ratchet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+-\d+$").unwrap())
}

fn initials_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{1,3}$").unwrap())
}

/// Check a part name against its category's naming rule.
pub fn validate_nomenclature(name: &str, category: PartCategory) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyName);
    }

    let (pattern, rule) = match category {
        PartCategory::Blade => (
            blade_pattern(),
            "expected 'Name Surname' (e.g. Soar Phoenix)",
        ),
        PartCategory::Ratchet => (
            ratchet_pattern(),
            "expected 'number-number' (e.g. 9-60)",
        ),
        PartCategory::Bit => (
            initials_pattern(),
            "expected 1-3 capital letters (e.g. B, LO, GF)",
        ),
        PartCategory::AssistBlade => (
            initials_pattern(),
            "expected 1-3 capital letters (e.g. S, A, F)",
        ),
    };

    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(CatalogError::Nomenclature {
            category,
            name: name.to_string(),
            rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blade(name: &str) -> NewPart {
        NewPart::new(name, PartCategory::Blade, BeyType::BX, PartStats::new(40, 20, 10))
    }

    #[test]
    fn test_nomenclature_rules() {
        assert!(validate_nomenclature("Soar Phoenix", PartCategory::Blade).is_ok());
        assert!(validate_nomenclature("soar phoenix", PartCategory::Blade).is_err());
        assert!(validate_nomenclature("Phoenix", PartCategory::Blade).is_err());
        assert!(validate_nomenclature("9-60", PartCategory::Ratchet).is_ok());
        assert!(validate_nomenclature("9_60", PartCategory::Ratchet).is_err());
        assert!(validate_nomenclature("GF", PartCategory::Bit).is_ok());
        assert!(validate_nomenclature("GFXX", PartCategory::Bit).is_err());
        assert!(validate_nomenclature("S", PartCategory::AssistBlade).is_ok());
        assert_eq!(
            validate_nomenclature("  ", PartCategory::Bit),
            Err(CatalogError::EmptyName)
        );
    }

    #[test]
    fn test_add_part_appends_in_order() {
        let mut catalog = PartCatalog::new();
        catalog.add_part(blade("Soar Phoenix")).unwrap();
        catalog.add_part(blade("Wizard Rod")).unwrap();

        let names: Vec<_> = catalog.blades.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Soar Phoenix", "Wizard Rod"]);
        assert!(catalog.last_updated.is_some());
    }

    #[test]
    fn test_add_part_rejects_duplicate_case_insensitive() {
        let mut catalog = PartCatalog::new();
        catalog.add_part(blade("Soar Phoenix")).unwrap();

        let err = catalog.add_part(blade("Soar Phoenix")).unwrap_err();
        assert_eq!(err, CatalogError::Duplicate("Soar Phoenix".to_string()));

        catalog.add_part(blade("Dran Buster Ex")).unwrap();
        let err = catalog.add_part(blade("Dran Buster EX")).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(_)));
        assert_eq!(catalog.blades.len(), 2);
    }

    #[test]
    fn test_same_name_in_other_category_is_not_duplicate() {
        let mut catalog = PartCatalog::new();
        catalog
            .add_part(NewPart::new("S", PartCategory::Bit, BeyType::BX, PartStats::default()))
            .unwrap();
        catalog
            .add_part(NewPart::new(
                "S",
                PartCategory::AssistBlade,
                BeyType::CX,
                PartStats::default(),
            ))
            .unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_add_ratchet_derives_geometry() {
        let mut catalog = PartCatalog::new();
        catalog
            .add_part(NewPart::new(
                "3-80",
                PartCategory::Ratchet,
                BeyType::BX,
                PartStats::new(10, 15, 10),
            ))
            .unwrap();
        let ratchet = catalog.get(PartCategory::Ratchet, "3-80").unwrap();
        assert_eq!(ratchet.contact_points(), Some(3));
        assert_eq!(ratchet.height_level(), Some(4));
    }

    #[test]
    fn test_insert_result_shape() {
        let mut catalog = PartCatalog::new();
        let ok: PartInsertResult = catalog.add_part(blade("Soar Phoenix")).into();
        assert!(ok.success);
        assert!(ok.part_id.is_some());

        let failed: PartInsertResult = catalog.add_part(blade("Soar Phoenix")).into();
        assert!(!failed.success);
        assert!(failed.error.unwrap().contains("already exists"));
    }

    #[test]
    fn test_remove_part() {
        let mut catalog = PartCatalog::new();
        let id = catalog.add_part(blade("Soar Phoenix")).unwrap();
        let removed = catalog.remove_part(PartCategory::Blade, &id).unwrap();
        assert_eq!(removed.name, "Soar Phoenix");
        assert!(catalog.is_empty());
        assert!(matches!(
            catalog.remove_part(PartCategory::Blade, &id),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_merge_keeps_duplicates_from_import() {
        let mut catalog = PartCatalog::new();
        catalog.add_part(blade("Soar Phoenix")).unwrap();
        let imported = catalog.clone();

        assert_eq!(catalog.merge(imported), 1);
        assert_eq!(catalog.blades.len(), 2);
    }

    #[test]
    fn test_archetype_of() {
        let mut catalog = PartCatalog::new();
        catalog
            .add_part(blade("Shark Edge").with_archetype(Archetype::Attack))
            .unwrap();
        catalog.add_part(blade("Wizard Rod")).unwrap();
        assert_eq!(
            catalog.archetype_of(PartCategory::Blade, "shark edge"),
            Some(Archetype::Attack)
        );
        assert_eq!(catalog.archetype_of(PartCategory::Blade, "Wizard Rod"), None);
    }
}
