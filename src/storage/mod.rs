//! Persistence helpers for the host.
//!
//! The core modules never touch storage. These helpers serialize the battle
//! database and the part catalog to UTF-8 JSON documents and keep the
//! append-only event log:
//! - `battle_database.json`
//! - `parts.json`
//! - `events.jsonl`

pub mod jsonl;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::PartCatalog;
use crate::models::{BattleDatabase, SCHEMA_VERSION};

pub use jsonl::EventLog;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported database version '{found}' (expected {expected})")]
    UnsupportedVersion { found: String, expected: &'static str },
}

/// Where the host keeps its documents.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("battle_database.json")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("parts.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Pretty JSON export of a database.
pub fn export_database(db: &BattleDatabase) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(db)?)
}

/// Parse an exported database, rejecting other schema versions.
pub fn import_database(json: &str) -> Result<BattleDatabase, StorageError> {
    let db: BattleDatabase = serde_json::from_str(json)?;
    if db.version != SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: db.version,
            expected: SCHEMA_VERSION,
        });
    }
    Ok(db)
}

pub fn export_catalog(catalog: &PartCatalog) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(catalog)?)
}

pub fn import_catalog(json: &str) -> Result<PartCatalog, StorageError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a database document. A missing file yields a fresh database.
pub fn load_database(path: &Path) -> Result<BattleDatabase, StorageError> {
    if !path.exists() {
        debug!("No database at {:?}, starting empty", path);
        return Ok(BattleDatabase::new(Utc::now()));
    }
    let db = import_database(&fs::read_to_string(path)?)?;
    info!(
        "Loaded database from {:?}: {} battles, {} combos",
        path,
        db.battle_records.len(),
        db.combo_statistics.len()
    );
    Ok(db)
}

pub fn save_database(path: &Path, db: &BattleDatabase) -> Result<(), StorageError> {
    write_document(path, db)?;
    info!("Saved database to {:?}", path);
    Ok(())
}

/// Load a catalog document. A missing file yields an empty catalog.
pub fn load_catalog(path: &Path) -> Result<PartCatalog, StorageError> {
    if !path.exists() {
        debug!("No catalog at {:?}, starting empty", path);
        return Ok(PartCatalog::default());
    }
    let catalog = import_catalog(&fs::read_to_string(path)?)?;
    info!("Loaded {} parts from {:?}", catalog.len(), path);
    Ok(catalog)
}

pub fn save_catalog(path: &Path, catalog: &PartCatalog) -> Result<(), StorageError> {
    write_document(path, catalog)?;
    info!("Saved {} parts to {:?}", catalog.len(), path);
    Ok(())
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
