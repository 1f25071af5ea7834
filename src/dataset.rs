use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::match_record::{MatchResult, Odds, RawMatch};
use crate::standings::{SnapshotTable, StandingsEntry};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

// `date` is the fixture date the table applies to. The points reflect the end
// of the previous day, so the table is the one the teams walked out with.
#[derive(Debug, Deserialize)]
struct StandingsRow {
    date: String,
    team: String,
    points: u32,
    mp: u32,
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    date: String,
    season: String,
    home: String,
    away: String,
    result: MatchResult,
    gf: u32,
    ga: u32,
    h_yellows: u32,
    a_yellows: u32,
    h_reds: u32,
    a_reds: u32,
    #[serde(default)]
    odds_w: f64,
    #[serde(default)]
    odds_d: f64,
    #[serde(default)]
    odds_l: f64,
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub fn read_standings<R: Read>(reader: R) -> Result<Vec<(NaiveDate, StandingsEntry)>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<StandingsRow>().enumerate() {
        let line = idx + 2;
        let row = row.with_context(|| format!("standings row {line}"))?;
        let date = parse_date(&row.date)
            .ok_or_else(|| anyhow!("standings row {line}: bad date '{}'", row.date))?;
        out.push((date, StandingsEntry::new(row.team.trim(), row.points, row.mp)));
    }
    Ok(out)
}

pub fn load_standings_csv(path: &Path) -> Result<SnapshotTable> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rows = read_standings(file).with_context(|| format!("read {}", path.display()))?;
    Ok(SnapshotTable::from_rows(rows))
}

pub fn read_matches<R: Read>(reader: R) -> Result<Vec<RawMatch>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<MatchRow>().enumerate() {
        let line = idx + 2;
        let row = row.with_context(|| format!("match row {line}"))?;
        let date = parse_date(&row.date)
            .ok_or_else(|| anyhow!("match row {line}: bad date '{}'", row.date))?;
        out.push(RawMatch {
            date,
            season: row.season.trim().to_string(),
            home_team: row.home.trim().to_string(),
            away_team: row.away.trim().to_string(),
            goals_for: row.gf,
            goals_against: row.ga,
            result: row.result,
            home_yellow_cards: row.h_yellows,
            away_yellow_cards: row.a_yellows,
            home_red_cards: row.h_reds,
            away_red_cards: row.a_reds,
            odds: Odds {
                win: row.odds_w,
                draw: row.odds_d,
                loss: row.odds_l,
            },
        });
    }
    Ok(out)
}

pub fn load_matches_csv(path: &Path) -> Result<Vec<RawMatch>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_matches(file).with_context(|| format!("read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_and_us_dates() {
        let iso = parse_date("2023-04-09");
        assert_eq!(iso, NaiveDate::from_ymd_opt(2023, 4, 9));
        assert_eq!(parse_date(" 4/9/2023 "), iso);
        assert_eq!(parse_date("9th April"), None);
    }

    #[test]
    fn bad_result_code_names_the_row() {
        let raw = "date,season,home,away,result,gf,ga,h_yellows,a_yellows,h_reds,a_reds\n\
                   2023-04-09,2022-2023,A,B,X,1,0,0,0,0,0\n";
        let err = read_matches(raw.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("match row 2"));
    }
}
