use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single significance or form computation.
///
/// None of these abort a whole run: the pipeline records them against the
/// match that triggered them and moves on. A missing snapshot on the resolver
/// path is not an error at all (it resolves to `Significance::Neutral`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignificanceError {
    #[error("team '{team}' not found in standings for {date}")]
    TeamNotFound { team: String, date: NaiveDate },

    #[error("no standings snapshot for {date}")]
    SnapshotNotFound { date: NaiveDate },

    #[error(
        "standings for {date} have {rows} rows, league expects {expected} (classifying '{team}')"
    )]
    ConfigurationMismatch {
        team: String,
        date: NaiveDate,
        rows: usize,
        expected: usize,
    },

    #[error("standings for {date} have {rows} rows, rank {rank} is out of range")]
    RankOutOfRange {
        rank: usize,
        rows: usize,
        date: NaiveDate,
    },

    /// `date` is the team's latest recorded match, absent for an empty window.
    #[error(
        "team '{team}' needs {needed} matches of history, has {available}{}",
        .date.map(|d| format!(" (last played {d})")).unwrap_or_default()
    )]
    InsufficientHistory {
        team: String,
        date: Option<NaiveDate>,
        needed: usize,
        available: usize,
    },

    #[error("match {home} vs {away} on {date} is older than last processed match ({last})")]
    OutOfOrder {
        home: String,
        away: String,
        date: NaiveDate,
        last: NaiveDate,
    },
}

pub type SigResult<T> = std::result::Result<T, SignificanceError>;
