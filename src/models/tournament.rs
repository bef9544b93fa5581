//! Tournament entry model: a batch of per-combo results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BeyType, ComboIdentity, EntityId, TournamentId};

/// Smallest deck a tournament entry may carry.
pub const MIN_TOURNAMENT_BEYS: usize = 3;

/// Largest deck a tournament entry may carry.
pub const MAX_TOURNAMENT_BEYS: usize = 5;

/// Tournament entry validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TournamentError {
    #[error("Tournament name is required")]
    MissingName,

    #[error("A tournament entry needs 3 to 5 beys, got {0}")]
    BeyCount(usize),

    #[error("Tournament tally overflows for '{0}'")]
    TallyOverflow(String),
}

/// Win/loss/draw tally of one combo in a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResult {
    /// Combo key (`blade-ratchet-bit`)
    pub bey_combo: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
}

impl TournamentResult {
    /// Battles in this tally, `None` if the sum overflows.
    pub fn checked_battles(&self) -> Option<u32> {
        self.wins.checked_add(self.losses)?.checked_add(self.draws)
    }
}

/// One combo of the tournament deck together with its tally.
#[derive(Debug, Clone)]
pub struct DeckEntry {
    pub combo: ComboIdentity,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl DeckEntry {
    pub fn new(combo: ComboIdentity, wins: u32, losses: u32, draws: u32) -> Self {
        Self {
            combo,
            wins,
            losses,
            draws,
        }
    }
}

/// An immutable tournament event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentEntry {
    pub id: TournamentId,

    pub tournament_name: String,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Deck played, in submission order
    pub beys: Vec<ComboIdentity>,

    /// One tally per bey
    pub results: Vec<TournamentResult>,

    pub total_wins: u32,
    pub total_losses: u32,
    pub total_draws: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl TournamentEntry {
    /// Build a validated entry from a deck of 3 to 5 combos.
    pub fn new(
        tournament_name: String,
        date: NaiveDate,
        deck: Vec<DeckEntry>,
    ) -> Result<Self, TournamentError> {
        if tournament_name.trim().is_empty() {
            return Err(TournamentError::MissingName);
        }
        if !(MIN_TOURNAMENT_BEYS..=MAX_TOURNAMENT_BEYS).contains(&deck.len()) {
            return Err(TournamentError::BeyCount(deck.len()));
        }

        let results: Vec<TournamentResult> = deck
            .iter()
            .map(|d| TournamentResult {
                bey_combo: d.combo.key(),
                wins: d.wins,
                losses: d.losses,
                draws: d.draws,
            })
            .collect();
        if let Some(r) = results.iter().find(|r| r.checked_battles().is_none()) {
            return Err(TournamentError::TallyOverflow(r.bey_combo.clone()));
        }
        let total = |pick: fn(&TournamentResult) -> u32| {
            results
                .iter()
                .try_fold(0u32, |acc, r| acc.checked_add(pick(r)))
                .ok_or_else(|| TournamentError::TallyOverflow(tournament_name.clone()))
        };
        let total_wins = total(|r| r.wins)?;
        let total_losses = total(|r| r.losses)?;
        let total_draws = total(|r| r.draws)?;
        let beys = deck.into_iter().map(|d| d.combo).collect();
        let timestamp = Utc::now();
        let id = tournament_id(&tournament_name, date, None, timestamp);

        Ok(Self {
            id,
            tournament_name,
            date,
            location: None,
            beys,
            results,
            total_wins,
            total_losses,
            total_draws,
            placement: None,
            notes: None,
            timestamp,
        })
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.id = tournament_id(&self.tournament_name, self.date, Some(&location), self.timestamp);
        self.location = Some(location);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self.id = tournament_id(
            &self.tournament_name,
            self.date,
            self.location.as_deref(),
            timestamp,
        );
        self
    }

    pub fn with_placement(mut self, placement: u32) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Identity of the combo behind a result row.
    ///
    /// Looks the key up in the deck first and falls back to splitting the key.
    pub fn identity_for(&self, result: &TournamentResult) -> Option<ComboIdentity> {
        self.beys
            .iter()
            .find(|b| b.key() == result.bey_combo)
            .cloned()
            .or_else(|| ComboIdentity::from_key(&result.bey_combo, BeyType::default()))
    }
}

fn tournament_id(
    name: &str,
    date: NaiveDate,
    location: Option<&str>,
    at: DateTime<Utc>,
) -> TournamentId {
    EntityId::generate(&[
        "tournament",
        name,
        &date.to_string(),
        location.unwrap_or(""),
        &at.timestamp_millis().to_string(),
    ])
}
