//! Core data models for the combo analyzer.

mod analysis;
mod battle;
mod confidence;
mod database;
mod ids;
mod metagame;
mod part;
mod recommendation;
mod stats;
mod tournament;

pub use analysis::*;
pub use battle::*;
pub use confidence::*;
pub use database::*;
pub use ids::*;
pub use metagame::*;
pub use part::*;
pub use recommendation::*;
pub use stats::*;
pub use tournament::*;
