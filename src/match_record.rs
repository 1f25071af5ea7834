use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SigResult;
use crate::league_params::LeagueParams;
use crate::significance::{Significance, resolve_significance};
use crate::standings::SnapshotProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl MatchResult {
    pub fn from_goals(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            Ordering::Greater => MatchResult::Win,
            Ordering::Equal => MatchResult::Draw,
            Ordering::Less => MatchResult::Loss,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            MatchResult::Win => MatchResult::Loss,
            MatchResult::Draw => MatchResult::Draw,
            MatchResult::Loss => MatchResult::Win,
        }
    }

    pub fn code(self) -> char {
        match self {
            MatchResult::Win => 'W',
            MatchResult::Draw => 'D',
            MatchResult::Loss => 'L',
        }
    }
}

/// Decimal prices for the home side winning, drawing and losing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

/// One finished match as supplied by the results source.
/// Score, result and cards are all from the home side's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    pub date: NaiveDate,
    pub season: String,
    pub home_team: String,
    pub away_team: String,
    pub goals_for: u32,
    pub goals_against: u32,
    pub result: MatchResult,
    pub home_yellow_cards: u32,
    pub away_yellow_cards: u32,
    pub home_red_cards: u32,
    pub away_red_cards: u32,
    pub odds: Odds,
}

impl RawMatch {
    /// A card-free match with no prices, result derived from the score.
    pub fn scoreline(
        date: NaiveDate,
        season: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        goals_for: u32,
        goals_against: u32,
    ) -> Self {
        Self {
            date,
            season: season.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            goals_for,
            goals_against,
            result: MatchResult::from_goals(goals_for, goals_against),
            home_yellow_cards: 0,
            away_yellow_cards: 0,
            home_red_cards: 0,
            away_red_cards: 0,
            odds: Odds::default(),
        }
    }
}

/// A match together with its significance label.
///
/// The label is fixed when the record is built and never recomputed, even if
/// the standings later change.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    raw: RawMatch,
    significance: Significance,
}

impl MatchRecord {
    pub fn from_raw<P>(raw: RawMatch, provider: &P, params: &LeagueParams) -> SigResult<Self>
    where
        P: SnapshotProvider + ?Sized,
    {
        let significance =
            resolve_significance(raw.date, &raw.home_team, &raw.away_team, provider, params)?;
        Ok(Self { raw, significance })
    }

    pub fn with_significance(raw: RawMatch, significance: Significance) -> Self {
        Self { raw, significance }
    }

    pub fn raw(&self) -> &RawMatch {
        &self.raw
    }

    pub fn significance(&self) -> Significance {
        self.significance
    }

    pub fn date(&self) -> NaiveDate {
        self.raw.date
    }

    pub fn season(&self) -> &str {
        &self.raw.season
    }

    pub fn home_team(&self) -> &str {
        &self.raw.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.raw.away_team
    }

    pub fn involves(&self, team: &str) -> bool {
        self.raw.home_team == team || self.raw.away_team == team
    }

    fn is_home(&self, team: &str) -> bool {
        self.raw.home_team == team
    }

    /// Goal difference from `team`'s side of the ball.
    pub fn goal_diff_for(&self, team: &str) -> i32 {
        let gd = self.raw.goals_for as i32 - self.raw.goals_against as i32;
        if self.is_home(team) { gd } else { -gd }
    }

    pub fn result_for(&self, team: &str) -> MatchResult {
        if self.is_home(team) {
            self.raw.result
        } else {
            self.raw.result.reversed()
        }
    }

    pub fn yellow_cards_for(&self, team: &str) -> u32 {
        if self.is_home(team) {
            self.raw.home_yellow_cards
        } else {
            self.raw.away_yellow_cards
        }
    }

    pub fn red_cards_for(&self, team: &str) -> u32 {
        if self.is_home(team) {
            self.raw.home_red_cards
        } else {
            self.raw.away_red_cards
        }
    }
}
