use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::history::{GOAL_DIFF_MATCHES, YELLOW_CARD_MATCHES};

/// Table structure of a league: size, season length and the ranks whose
/// boundaries decide titles, continental places and relegation.
///
/// Ranks are 1-indexed table positions. The relegation line sits directly
/// below `safety_rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueParams {
    pub teams: usize,
    pub total_matches: u32,
    pub title_rank: usize,
    // Last Champions League place.
    pub champions_league_rank: usize,
    // Last remaining European place below the Champions League line.
    pub europa_rank: usize,
    // Lowest rank that survives relegation.
    pub safety_rank: usize,
    pub form_window: usize,
}

impl Default for LeagueParams {
    fn default() -> Self {
        Self::premier_league()
    }
}

impl LeagueParams {
    pub fn premier_league() -> Self {
        Self {
            teams: 20,
            total_matches: 38,
            title_rank: 1,
            champions_league_rank: 4,
            europa_rank: 5,
            safety_rank: 17,
            form_window: 5,
        }
    }

    /// Double round robin: every team meets every other team home and away.
    pub fn double_round_robin(teams: usize) -> u32 {
        u32::try_from(teams.saturating_sub(1).saturating_mul(2)).unwrap_or(u32::MAX)
    }

    pub fn relegation_rank(&self) -> usize {
        self.safety_rank + 1
    }

    pub fn from_env() -> Self {
        let d = Self::premier_league();
        let teams = parse_positive_env("LEAGUE_TEAMS", d.teams);
        let default_total = if teams == d.teams {
            d.total_matches
        } else {
            Self::double_round_robin(teams)
        };
        let params = Self {
            teams,
            total_matches: parse_positive_env("LEAGUE_TOTAL_MATCHES", default_total),
            title_rank: parse_positive_env("LEAGUE_TITLE_RANK", d.title_rank),
            champions_league_rank: parse_positive_env("LEAGUE_CL_RANK", d.champions_league_rank),
            europa_rank: parse_positive_env("LEAGUE_EUROPA_RANK", d.europa_rank),
            safety_rank: parse_positive_env("LEAGUE_SAFETY_RANK", d.safety_rank),
            form_window: parse_positive_env("FORM_WINDOW", d.form_window),
        };
        if let Err(err) = params.validate() {
            warn!("[league] {err}, falling back to Premier League defaults");
            return d;
        }
        params
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_matches == 0 {
            return Err(anyhow!("total_matches must be positive"));
        }
        let ordered = self.title_rank >= 1
            && self.title_rank < self.champions_league_rank
            && self.champions_league_rank < self.europa_rank
            && self.europa_rank < self.safety_rank;
        if !ordered {
            return Err(anyhow!(
                "boundary ranks must increase: title={} cl={} europa={} safety={}",
                self.title_rank,
                self.champions_league_rank,
                self.europa_rank,
                self.safety_rank
            ));
        }
        if self.relegation_rank() > self.teams {
            return Err(anyhow!(
                "relegation rank {} exceeds league size {}",
                self.relegation_rank(),
                self.teams
            ));
        }
        let needed = GOAL_DIFF_MATCHES.max(YELLOW_CARD_MATCHES);
        if self.form_window < needed {
            return Err(anyhow!(
                "form window {} is shorter than the {needed} matches form features read",
                self.form_window
            ));
        }
        Ok(())
    }
}

fn parse_positive_env<T>(name: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Display + Copy,
{
    match std::env::var(name) {
        Ok(raw) => parse_positive(&raw).unwrap_or_else(|| {
            warn!("[league] {name}='{raw}' is not a positive integer, using {default}");
            default
        }),
        Err(_) => default,
    }
}

fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    raw.trim().parse::<T>().ok().filter(|val| *val > T::default())
}
