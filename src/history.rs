use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SigResult, SignificanceError};
use crate::match_record::{MatchRecord, MatchResult};

pub const GOAL_DIFF_MATCHES: usize = 5;
pub const RESULT_MATCHES: usize = 3;
pub const YELLOW_CARD_MATCHES: usize = 5;
// A red card usually carries a multi-match ban, so only the last few matter.
pub const RED_CARD_MATCHES: usize = 3;

const FORM_MATCHES: usize = if GOAL_DIFF_MATCHES > YELLOW_CARD_MATCHES {
    GOAL_DIFF_MATCHES
} else {
    YELLOW_CARD_MATCHES
};

/// Short-window aggregates of a team's most recent matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamForm {
    pub goal_diff: i32,
    /// Oldest first.
    pub last_results: [MatchResult; RESULT_MATCHES],
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// Bounded window of a team's latest matches within one season.
#[derive(Debug, Clone)]
pub struct TeamHistory {
    team: String,
    capacity: usize,
    window: VecDeque<Arc<MatchRecord>>,
}

impl TeamHistory {
    pub fn new(team: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(FORM_MATCHES);
        Self {
            team: team.into(),
            capacity,
            window: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_season(&self) -> Option<&str> {
        self.window.back().map(|m| m.season())
    }

    pub fn matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.window.iter().map(|m| m.as_ref())
    }

    /// Appends a match, evicting the oldest once over capacity. A match from
    /// a different season than the newest stored one flushes the window
    /// first. Returns true when that flush happened.
    pub fn push(&mut self, record: Arc<MatchRecord>) -> bool {
        debug_assert!(record.involves(&self.team));
        let new_season = self
            .window
            .back()
            .is_some_and(|last| last.season() != record.season());
        if new_season {
            self.window.clear();
        }
        self.window.push_back(record);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
        new_season
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn has_form(&self) -> bool {
        self.window.len() >= FORM_MATCHES
    }

    pub fn goal_differential(&self) -> SigResult<i32> {
        Ok(self
            .recent(GOAL_DIFF_MATCHES)?
            .map(|m| m.goal_diff_for(&self.team))
            .sum())
    }

    pub fn last_results(&self) -> SigResult<[MatchResult; RESULT_MATCHES]> {
        let mut out = [MatchResult::Draw; RESULT_MATCHES];
        for (slot, m) in out.iter_mut().zip(self.recent(RESULT_MATCHES)?) {
            *slot = m.result_for(&self.team);
        }
        Ok(out)
    }

    pub fn yellow_cards(&self) -> SigResult<u32> {
        Ok(self
            .recent(YELLOW_CARD_MATCHES)?
            .map(|m| m.yellow_cards_for(&self.team))
            .sum())
    }

    pub fn red_cards(&self) -> SigResult<u32> {
        Ok(self
            .recent(RED_CARD_MATCHES)?
            .map(|m| m.red_cards_for(&self.team))
            .sum())
    }

    pub fn form(&self) -> SigResult<TeamForm> {
        Ok(TeamForm {
            goal_diff: self.goal_differential()?,
            last_results: self.last_results()?,
            yellow_cards: self.yellow_cards()?,
            red_cards: self.red_cards()?,
        })
    }

    fn recent(&self, n: usize) -> SigResult<impl Iterator<Item = &MatchRecord>> {
        let available = self.window.len();
        if available < n {
            return Err(SignificanceError::InsufficientHistory {
                team: self.team.clone(),
                date: self.window.back().map(|m| m.date()),
                needed: n,
                available,
            });
        }
        Ok(self.window.iter().skip(available - n).map(|m| m.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::match_record::RawMatch;
    use crate::significance::Significance;

    fn game(day: u32, season: &str, home: &str, away: &str, gf: u32, ga: u32) -> Arc<MatchRecord> {
        let date = NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
        Arc::new(MatchRecord::with_significance(
            RawMatch::scoreline(date, season, home, away, gf, ga),
            Significance::Neutral,
        ))
    }

    #[test]
    fn capacity_never_drops_below_feature_window() {
        let h = TeamHistory::new("A", 1);
        assert_eq!(h.capacity(), FORM_MATCHES);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut h = TeamHistory::new("A", 5);
        for day in 1..=7 {
            h.push(game(day, "s1", "A", "B", 1, 0));
        }
        assert_eq!(h.len(), 5);
        let first = h.matches().next().map(|m| m.date().format("%d").to_string());
        assert_eq!(first.as_deref(), Some("03"));
    }

    #[test]
    fn short_window_is_an_error_not_zero() {
        let mut h = TeamHistory::new("A", 5);
        h.push(game(1, "s1", "A", "B", 1, 0));
        assert_eq!(
            h.goal_differential(),
            Err(SignificanceError::InsufficientHistory {
                team: "A".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 1, 1),
                needed: GOAL_DIFF_MATCHES,
                available: 1
            })
        );
        assert!(!h.has_form());
    }

    #[test]
    fn reset_empties_window() {
        let mut h = TeamHistory::new("A", 5);
        h.push(game(1, "s1", "A", "B", 1, 0));
        h.reset();
        assert!(h.is_empty());
    }
}
