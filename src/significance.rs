use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{SigResult, SignificanceError};
use crate::league_params::LeagueParams;
use crate::reachability::can_overtake;
use crate::standings::{SnapshotProvider, StandingsEntry, StandingsSnapshot};

/// A table boundary across which a team's final position can still move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Leader can still be caught by the runner-up.
    TitleDefence,
    /// A Champions League place can still be lost to the first team below the line.
    ChampionsLeagueDefence,
    /// The last European place can still be lost to the team below it.
    EuropaDefence,
    /// The team can still be dragged into the relegation zone.
    RelegationDrop,
    /// A relegated-zone team can still climb to safety.
    RelegationEscape,
    ReachChampionsLeague,
    ReachTitle,
    ReachEuropa,
}

impl Boundary {
    /// Evaluation order. The verdict is a disjunction, so the order only
    /// decides how early `is_significant` can stop.
    pub const ALL: [Boundary; 8] = [
        Boundary::TitleDefence,
        Boundary::ChampionsLeagueDefence,
        Boundary::EuropaDefence,
        Boundary::RelegationDrop,
        Boundary::RelegationEscape,
        Boundary::ReachChampionsLeague,
        Boundary::ReachTitle,
        Boundary::ReachEuropa,
    ];

    pub fn applies(self, rank: usize, params: &LeagueParams) -> bool {
        match self {
            Boundary::TitleDefence => rank == params.title_rank,
            Boundary::ChampionsLeagueDefence => rank <= params.champions_league_rank,
            Boundary::EuropaDefence => rank == params.europa_rank,
            Boundary::RelegationDrop => rank < params.relegation_rank(),
            Boundary::RelegationEscape => rank >= params.relegation_rank(),
            Boundary::ReachChampionsLeague | Boundary::ReachTitle | Boundary::ReachEuropa => true,
        }
    }

    /// Whether the boundary is still open for `team`. Callers must check
    /// `applies` first.
    pub fn is_open(
        self,
        team: &StandingsEntry,
        snapshot: &StandingsSnapshot,
        params: &LeagueParams,
    ) -> SigResult<bool> {
        let total = params.total_matches;
        let open = match self {
            Boundary::TitleDefence => {
                let runner_up = snapshot.at_rank(params.title_rank + 1)?;
                can_overtake(team, runner_up, total)
            }
            Boundary::ChampionsLeagueDefence => {
                let below = snapshot.at_rank(params.champions_league_rank + 1)?;
                can_overtake(team, below, total)
            }
            Boundary::EuropaDefence => {
                let below = snapshot.at_rank(params.europa_rank + 1)?;
                can_overtake(team, below, total)
            }
            Boundary::RelegationDrop => {
                let first_relegated = snapshot.at_rank(params.relegation_rank())?;
                can_overtake(team, first_relegated, total)
            }
            Boundary::RelegationEscape => {
                let last_safe = snapshot.at_rank(params.safety_rank)?;
                can_overtake(last_safe, team, total)
            }
            Boundary::ReachChampionsLeague => {
                can_overtake(snapshot.at_rank(params.champions_league_rank)?, team, total)
            }
            Boundary::ReachTitle => can_overtake(snapshot.at_rank(params.title_rank)?, team, total),
            Boundary::ReachEuropa => can_overtake(snapshot.at_rank(params.europa_rank)?, team, total),
        };
        Ok(open)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Boundary::TitleDefence => "title defence",
            Boundary::ChampionsLeagueDefence => "champions league defence",
            Boundary::EuropaDefence => "europa defence",
            Boundary::RelegationDrop => "relegation drop",
            Boundary::RelegationEscape => "relegation escape",
            Boundary::ReachChampionsLeague => "reach champions league",
            Boundary::ReachTitle => "reach title",
            Boundary::ReachEuropa => "reach europa",
        };
        f.write_str(label)
    }
}

/// Whether `team`'s final placement can still change in either direction.
///
/// Fails if the team is absent from the snapshot, or if the snapshot's size
/// differs from the league size the parameters describe.
pub fn is_significant(
    team: &str,
    snapshot: &StandingsSnapshot,
    params: &LeagueParams,
) -> SigResult<bool> {
    let (rank, entry) = locate(team, snapshot, params)?;
    for boundary in Boundary::ALL {
        if boundary.applies(rank, params) && boundary.is_open(entry, snapshot, params)? {
            trace!(team, rank, %boundary, "open boundary");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Every boundary still open for `team`, without short-circuiting.
pub fn live_boundaries(
    team: &str,
    snapshot: &StandingsSnapshot,
    params: &LeagueParams,
) -> SigResult<Vec<Boundary>> {
    let (rank, entry) = locate(team, snapshot, params)?;
    let mut out = Vec::new();
    for boundary in Boundary::ALL {
        if boundary.applies(rank, params) && boundary.is_open(entry, snapshot, params)? {
            out.push(boundary);
        }
    }
    Ok(out)
}

/// Classifies every team of one snapshot. Snapshots are immutable, so the
/// teams are evaluated in parallel.
pub fn significance_by_team(
    snapshot: &StandingsSnapshot,
    params: &LeagueParams,
) -> SigResult<HashMap<String, bool>> {
    snapshot
        .entries()
        .par_iter()
        .map(|e| is_significant(&e.team, snapshot, params).map(|sig| (e.team.clone(), sig)))
        .collect()
}

fn locate<'a>(
    team: &str,
    snapshot: &'a StandingsSnapshot,
    params: &LeagueParams,
) -> SigResult<(usize, &'a StandingsEntry)> {
    // One row per team, and the relegation line is the deepest rank any
    // boundary reads.
    let rows = snapshot.len();
    if rows != params.teams || rows < params.relegation_rank() {
        return Err(SignificanceError::ConfigurationMismatch {
            team: team.to_string(),
            date: snapshot.date(),
            rows,
            expected: params.teams.max(params.relegation_rank()),
        });
    }
    let rank = snapshot.rank_of(team)?;
    let entry = snapshot.at_rank(rank)?;
    Ok((rank, entry))
}

/// Which side of a match, if either, had more at stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Significance {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "A")]
    Away,
    #[serde(rename = "N")]
    Neutral,
}

impl Significance {
    pub fn from_flags(home: bool, away: bool) -> Self {
        match (home, away) {
            (true, false) => Significance::Home,
            (false, true) => Significance::Away,
            _ => Significance::Neutral,
        }
    }

    pub fn code(self) -> char {
        match self {
            Significance::Home => 'H',
            Significance::Away => 'A',
            Significance::Neutral => 'N',
        }
    }

    pub fn swapped(self) -> Self {
        match self {
            Significance::Home => Significance::Away,
            Significance::Away => Significance::Home,
            Significance::Neutral => Significance::Neutral,
        }
    }
}

/// Resolves a fixture against the standings keyed by its own date.
///
/// No snapshot for the date means the season is too young for the table to
/// say anything, which resolves to `Neutral`.
pub fn resolve_significance<P>(
    date: NaiveDate,
    home: &str,
    away: &str,
    provider: &P,
    params: &LeagueParams,
) -> SigResult<Significance>
where
    P: SnapshotProvider + ?Sized,
{
    let Some(snapshot) = provider.lookup(date) else {
        debug!(%date, home, away, "no standings snapshot, neutral");
        return Ok(Significance::Neutral);
    };
    let h = is_significant(home, snapshot, params)?;
    let a = is_significant(away, snapshot, params)?;
    Ok(Significance::from_flags(h, a))
}
