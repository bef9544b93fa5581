//! Per-combo running statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ComboIdentity;
use crate::calculate::percentage;

/// Qualitative tier derived from a combo's win rate (percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Favorability {
    #[serde(alias = "Excelente")]
    Excellent,
    #[serde(rename = "Very Good", alias = "Muito Bom")]
    VeryGood,
    #[serde(alias = "Bom")]
    Good,
    #[serde(alias = "Aceitável")]
    Acceptable,
    #[serde(alias = "Fraco")]
    Weak,
}

impl Favorability {
    pub fn from_win_rate(win_rate: f64) -> Self {
        if win_rate >= 70.0 {
            Favorability::Excellent
        } else if win_rate >= 60.0 {
            Favorability::VeryGood
        } else if win_rate >= 50.0 {
            Favorability::Good
        } else if win_rate >= 40.0 {
            Favorability::Acceptable
        } else {
            Favorability::Weak
        }
    }
}

impl fmt::Display for Favorability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Favorability::Excellent => write!(f, "Excellent"),
            Favorability::VeryGood => write!(f, "Very Good"),
            Favorability::Good => write!(f, "Good"),
            Favorability::Acceptable => write!(f, "Acceptable"),
            Favorability::Weak => write!(f, "Weak"),
        }
    }
}

/// Direction of recent performance relative to the all-time rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Trend {
    #[serde(alias = "Crescente")]
    Rising,
    #[default]
    #[serde(alias = "Estável")]
    Stable,
    #[serde(alias = "Decrescente")]
    Falling,
}

impl Trend {
    /// Classify a recent-minus-overall difference against a symmetric margin.
    pub fn from_difference(difference: f64, margin: f64) -> Self {
        if difference > margin {
            Trend::Rising
        } else if difference < -margin {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "Rising"),
            Trend::Stable => write!(f, "Stable"),
            Trend::Falling => write!(f, "Falling"),
        }
    }
}

/// Recent vs all-time win rate of a combo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTrends {
    pub recent_win_rate: f64,
    pub all_time_win_rate: f64,
    pub trend: Trend,
}

/// One aggregate row per distinct combo key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboStatistics {
    /// `blade-ratchet-bit`
    pub combo_id: String,

    #[serde(flatten)]
    pub combo: ComboIdentity,

    pub total_battles: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,

    /// Percentages (0-100)
    pub win_rate: f64,
    pub loss_rate: f64,
    pub draw_rate: f64,

    pub last_used: NaiveDate,
    pub first_used: NaiveDate,

    pub favorability: Favorability,

    pub trends: ComboTrends,
}

impl ComboStatistics {
    /// An empty row for a combo first seen on `date`.
    pub fn empty(combo: ComboIdentity, date: NaiveDate) -> Self {
        Self {
            combo_id: combo.key(),
            combo,
            total_battles: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            win_rate: 0.0,
            loss_rate: 0.0,
            draw_rate: 0.0,
            last_used: date,
            first_used: date,
            favorability: Favorability::Weak,
            trends: ComboTrends::default(),
        }
    }

    /// Add counts and recompute every derived field from the count/total formula.
    /// Counters saturate at `u32::MAX`.
    pub fn absorb(&mut self, wins: u32, losses: u32, draws: u32) {
        self.wins = self.wins.saturating_add(wins);
        self.losses = self.losses.saturating_add(losses);
        self.draws = self.draws.saturating_add(draws);
        self.total_battles = self
            .total_battles
            .saturating_add(wins.saturating_add(losses).saturating_add(draws));
        self.recompute_rates();
        self.favorability = Favorability::from_win_rate(self.win_rate);
    }

    /// `count / total * 100` for each outcome; all zero when nothing was played.
    pub fn recompute_rates(&mut self) {
        self.win_rate = percentage(self.wins, self.total_battles);
        self.loss_rate = percentage(self.losses, self.total_battles);
        self.draw_rate = percentage(self.draws, self.total_battles);
    }

    pub fn is_consistent(&self) -> bool {
        self.wins
            .checked_add(self.losses)
            .and_then(|sum| sum.checked_add(self.draws))
            == Some(self.total_battles)
    }
}
