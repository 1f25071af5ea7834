use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SigResult, SignificanceError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team: String,
    pub points: u32,
    pub matches_played: u32,
}

impl StandingsEntry {
    pub fn new(team: impl Into<String>, points: u32, matches_played: u32) -> Self {
        Self {
            team: team.into(),
            points,
            matches_played,
        }
    }
}

/// League table as it stood for one fixture date.
///
/// Entries are ranked by points, best first. Internally they are stored
/// 0-indexed; every public accessor speaks 1-indexed table ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsSnapshot {
    date: NaiveDate,
    entries: Vec<StandingsEntry>,
}

impl StandingsSnapshot {
    /// Keeps the first row seen for each team, then orders by points.
    /// The sort is stable so teams level on points keep their source order.
    pub fn new(date: NaiveDate, rows: impl IntoIterator<Item = StandingsEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut entries = rows
            .into_iter()
            .filter(|row| seen.insert(row.team.clone()))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.points.cmp(&a.points));
        Self { date, entries }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StandingsEntry] {
        &self.entries
    }

    pub fn rank_of(&self, team: &str) -> SigResult<usize> {
        self.entries
            .iter()
            .position(|e| e.team == team)
            .map(index_to_rank)
            .ok_or_else(|| SignificanceError::TeamNotFound {
                team: team.to_string(),
                date: self.date,
            })
    }

    pub fn at_rank(&self, rank: usize) -> SigResult<&StandingsEntry> {
        rank.checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .ok_or(SignificanceError::RankOutOfRange {
                rank,
                rows: self.entries.len(),
                date: self.date,
            })
    }
}

fn index_to_rank(index: usize) -> usize {
    index + 1
}

/// Source of standings keyed by fixture date.
pub trait SnapshotProvider {
    fn lookup(&self, date: NaiveDate) -> Option<&StandingsSnapshot>;
}

/// Immutable date-keyed collection of snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTable {
    snapshots: BTreeMap<NaiveDate, StandingsSnapshot>,
}

impl SnapshotTable {
    pub fn new(snapshots: impl IntoIterator<Item = StandingsSnapshot>) -> Self {
        let snapshots = snapshots.into_iter().map(|s| (s.date(), s)).collect();
        Self { snapshots }
    }

    /// Groups flat `(date, entry)` rows, as they come out of a standings
    /// table, into one snapshot per date.
    pub fn from_rows(rows: impl IntoIterator<Item = (NaiveDate, StandingsEntry)>) -> Self {
        let mut grouped: BTreeMap<NaiveDate, Vec<StandingsEntry>> = BTreeMap::new();
        for (date, entry) in rows {
            grouped.entry(date).or_default().push(entry);
        }
        Self::new(
            grouped
                .into_iter()
                .map(|(date, entries)| StandingsSnapshot::new(date, entries)),
        )
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &StandingsSnapshot> {
        self.snapshots.values()
    }

    /// Lookup for callers that assume the date is present.
    pub fn require(&self, date: NaiveDate) -> SigResult<&StandingsSnapshot> {
        self.lookup(date)
            .ok_or(SignificanceError::SnapshotNotFound { date })
    }
}

impl SnapshotProvider for SnapshotTable {
    fn lookup(&self, date: NaiveDate) -> Option<&StandingsSnapshot> {
        self.snapshots.get(&date)
    }
}
