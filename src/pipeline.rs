use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SigResult, SignificanceError};
use crate::history::{TeamForm, TeamHistory};
use crate::league_params::LeagueParams;
use crate::match_record::{MatchRecord, MatchResult, RawMatch};
use crate::significance::Significance;
use crate::standings::SnapshotTable;

/// Flat output row: the match, its significance label and both teams'
/// pre-match form. Form columns stay empty until a team has enough history
/// in the current season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub season: String,
    pub home: String,
    pub away: String,
    pub result: MatchResult,
    pub gf: u32,
    pub ga: u32,
    pub h_yellows: u32,
    pub a_yellows: u32,
    pub h_reds: u32,
    pub a_reds: u32,
    pub odds_w: f64,
    pub odds_d: f64,
    pub odds_l: f64,
    pub significance: Significance,
    pub h_form_gd: Option<i32>,
    pub h_last3: Option<String>,
    pub h_form_yellows: Option<u32>,
    pub h_form_reds: Option<u32>,
    pub a_form_gd: Option<i32>,
    pub a_last3: Option<String>,
    pub a_form_yellows: Option<u32>,
    pub a_form_reds: Option<u32>,
}

impl FeatureRow {
    fn new(record: &MatchRecord, home: Option<TeamForm>, away: Option<TeamForm>) -> Self {
        let raw = record.raw();
        Self {
            date: raw.date,
            season: raw.season.clone(),
            home: raw.home_team.clone(),
            away: raw.away_team.clone(),
            result: raw.result,
            gf: raw.goals_for,
            ga: raw.goals_against,
            h_yellows: raw.home_yellow_cards,
            a_yellows: raw.away_yellow_cards,
            h_reds: raw.home_red_cards,
            a_reds: raw.away_red_cards,
            odds_w: raw.odds.win,
            odds_d: raw.odds.draw,
            odds_l: raw.odds.loss,
            significance: record.significance(),
            h_form_gd: home.map(|f| f.goal_diff),
            h_last3: home.map(|f| results_code(&f.last_results)),
            h_form_yellows: home.map(|f| f.yellow_cards),
            h_form_reds: home.map(|f| f.red_cards),
            a_form_gd: away.map(|f| f.goal_diff),
            a_last3: away.map(|f| results_code(&f.last_results)),
            a_form_yellows: away.map(|f| f.yellow_cards),
            a_form_reds: away.map(|f| f.red_cards),
        }
    }
}

fn results_code(results: &[MatchResult]) -> String {
    results.iter().map(|r| r.code()).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
    pub rows: Vec<FeatureRow>,
    pub processed: usize,
    pub failed: usize,
    pub home_significant: usize,
    pub away_significant: usize,
    pub neutral: usize,
    pub season_resets: usize,
    pub errors: Vec<String>,
}

/// Walks matches in date order, labelling each one and keeping every team's
/// rolling window current.
pub struct SeasonProcessor {
    params: LeagueParams,
    snapshots: Arc<SnapshotTable>,
    histories: HashMap<String, TeamHistory>,
    last_date: Option<NaiveDate>,
    season_resets: usize,
}

impl SeasonProcessor {
    pub fn new(params: LeagueParams, snapshots: Arc<SnapshotTable>) -> Self {
        Self {
            params,
            snapshots,
            histories: HashMap::new(),
            last_date: None,
            season_resets: 0,
        }
    }

    pub fn history(&self, team: &str) -> Option<&TeamHistory> {
        self.histories.get(team)
    }

    /// Labels one match and records it in both teams' histories. On error
    /// nothing is recorded.
    pub fn process(&mut self, raw: RawMatch) -> SigResult<FeatureRow> {
        if let Some(last) = self.last_date
            && raw.date < last
        {
            return Err(SignificanceError::OutOfOrder {
                home: raw.home_team,
                away: raw.away_team,
                date: raw.date,
                last,
            });
        }

        let record = MatchRecord::from_raw(raw, self.snapshots.as_ref(), &self.params)?;
        let home_form = self.pre_match_form(record.home_team(), record.season())?;
        let away_form = self.pre_match_form(record.away_team(), record.season())?;
        let row = FeatureRow::new(&record, home_form, away_form);
        debug!(
            date = %record.date(),
            home = record.home_team(),
            away = record.away_team(),
            significance = %record.significance().code(),
            "processed match"
        );

        let record = Arc::new(record);
        for team in [record.home_team(), record.away_team()] {
            let capacity = self.params.form_window;
            let history = self
                .histories
                .entry(team.to_string())
                .or_insert_with(|| TeamHistory::new(team, capacity));
            if history.push(Arc::clone(&record)) {
                self.season_resets += 1;
                debug!(team, season = record.season(), "new season, form window reset");
            }
        }
        self.last_date = Some(record.date());
        Ok(row)
    }

    /// Sorts by date and processes everything. A failing match is logged and
    /// counted; the run carries on with the next one.
    pub fn process_all(&mut self, mut raws: Vec<RawMatch>) -> ProcessSummary {
        raws.sort_by_key(|m| m.date);
        let resets_before = self.season_resets;
        let mut summary = ProcessSummary::default();
        for raw in raws {
            let label = format!("{} {} vs {}", raw.date, raw.home_team, raw.away_team);
            match self.process(raw) {
                Ok(row) => {
                    match row.significance {
                        Significance::Home => summary.home_significant += 1,
                        Significance::Away => summary.away_significant += 1,
                        Significance::Neutral => summary.neutral += 1,
                    }
                    summary.processed += 1;
                    summary.rows.push(row);
                }
                Err(err) => {
                    warn!("[pipeline] {label}: {err}");
                    summary.failed += 1;
                    summary.errors.push(format!("{label}: {err}"));
                }
            }
        }
        summary.season_resets = self.season_resets - resets_before;
        info!(
            processed = summary.processed,
            failed = summary.failed,
            home = summary.home_significant,
            away = summary.away_significant,
            neutral = summary.neutral,
            "season processed"
        );
        summary
    }

    // Last season's window says nothing about this one; it is flushed as soon
    // as the team's first match of the new season is recorded.
    fn pre_match_form(&self, team: &str, season: &str) -> SigResult<Option<TeamForm>> {
        self.histories
            .get(team)
            .filter(|h| h.has_form() && h.current_season() == Some(season))
            .map(TeamHistory::form)
            .transpose()
    }
}
