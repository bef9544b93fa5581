//! # BeyX Meta
//!
//! A Beyblade X combo analyzer and battle statistics engine.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (parts, battles, tournaments, statistics)
//! - **catalog**: Part catalog with nomenclature validation
//! - **analysis**: Combo scoring, role classification and burst risk
//! - **aggregate**: Folds battles and tournaments into the battle database
//! - **metagame**: Metagame snapshots, insights and matchups
//! - **recommend**: Best-combo recommendations from recorded history
//! - **calculate**: Shared rate and confidence arithmetic
//! - **storage**: JSON documents and the JSONL event log
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod analysis;
pub mod calculate;
pub mod catalog;
pub mod config;
pub mod metagame;
pub mod models;
pub mod recommend;
pub mod storage;

pub use models::*;

pub use aggregate::{LoggedEvent, StatisticsAggregator};
pub use analysis::ComboAnalyzer;
pub use catalog::PartCatalog;
pub use config::AnalyzerConfig;
pub use metagame::MetagameSummarizer;
pub use recommend::Recommender;
