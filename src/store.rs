use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};

use crate::config::app_cache_dir;
use crate::match_record::{MatchResult, Odds, RawMatch};
use crate::standings::{SnapshotTable, StandingsEntry};

const DATE_FMT: &str = "%Y-%m-%d";

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("significance.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS standings (
            date TEXT NOT NULL,
            team TEXT NOT NULL,
            points INTEGER NOT NULL,
            mp INTEGER NOT NULL,
            PRIMARY KEY (date, team)
        );
        CREATE INDEX IF NOT EXISTS idx_standings_date ON standings(date);

        CREATE TABLE IF NOT EXISTS matches (
            match_id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            season TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            result TEXT NOT NULL,
            gf INTEGER NOT NULL,
            ga INTEGER NOT NULL,
            h_yellows INTEGER NOT NULL,
            a_yellows INTEGER NOT NULL,
            h_reds INTEGER NOT NULL,
            a_reds INTEGER NOT NULL,
            odds_w REAL NOT NULL,
            odds_d REAL NOT NULL,
            odds_l REAL NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (date, home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(date);
        CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(season);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            standings_rows INTEGER NOT NULL,
            match_rows INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn begin_ingest_run(conn: &Connection) -> Result<i64> {
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, standings_rows, match_rows, errors_json)
         VALUES (?1, NULL, 0, 0, '[]')",
        params![Utc::now().to_rfc3339()],
    )
    .context("insert ingest run")?;
    Ok(conn.last_insert_rowid())
}

pub fn finish_ingest_run(
    conn: &Connection,
    run_id: i64,
    standings_rows: usize,
    match_rows: usize,
    errors: &[String],
) -> Result<()> {
    let errors_json = serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, standings_rows = ?2, match_rows = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            Utc::now().to_rfc3339(),
            standings_rows as i64,
            match_rows as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;
    Ok(())
}

pub fn upsert_standings(conn: &mut Connection, rows: &[(NaiveDate, StandingsEntry)]) -> Result<usize> {
    let tx = conn.transaction().context("begin standings transaction")?;
    for (date, entry) in rows {
        tx.execute(
            r#"
            INSERT INTO standings (date, team, points, mp) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(date, team) DO UPDATE SET
                points = excluded.points,
                mp = excluded.mp
            "#,
            params![
                date.format(DATE_FMT).to_string(),
                entry.team,
                entry.points,
                entry.matches_played
            ],
        )
        .context("upsert standings row")?;
    }
    tx.commit().context("commit standings transaction")?;
    Ok(rows.len())
}

pub fn upsert_matches(conn: &mut Connection, rows: &[RawMatch]) -> Result<usize> {
    let tx = conn.transaction().context("begin matches transaction")?;
    for m in rows {
        tx.execute(
            r#"
            INSERT INTO matches (
                date, season, home_team, away_team, result, gf, ga,
                h_yellows, a_yellows, h_reds, a_reds,
                odds_w, odds_d, odds_l, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15
            )
            ON CONFLICT(date, home_team, away_team) DO UPDATE SET
                season = excluded.season,
                result = excluded.result,
                gf = excluded.gf,
                ga = excluded.ga,
                h_yellows = excluded.h_yellows,
                a_yellows = excluded.a_yellows,
                h_reds = excluded.h_reds,
                a_reds = excluded.a_reds,
                odds_w = excluded.odds_w,
                odds_d = excluded.odds_d,
                odds_l = excluded.odds_l,
                updated_at = excluded.updated_at
            "#,
            params![
                m.date.format(DATE_FMT).to_string(),
                m.season,
                m.home_team,
                m.away_team,
                m.result.code().to_string(),
                m.goals_for,
                m.goals_against,
                m.home_yellow_cards,
                m.away_yellow_cards,
                m.home_red_cards,
                m.away_red_cards,
                m.odds.win,
                m.odds.draw,
                m.odds.loss,
                Utc::now().to_rfc3339(),
            ],
        )
        .context("upsert match")?;
    }
    tx.commit().context("commit matches transaction")?;
    Ok(rows.len())
}

pub fn load_snapshot_table(conn: &Connection) -> Result<SnapshotTable> {
    let mut stmt = conn
        .prepare("SELECT date, team, points, mp FROM standings ORDER BY date ASC, rowid ASC")
        .context("prepare load standings query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                StandingsEntry {
                    team: row.get(1)?,
                    points: row.get(2)?,
                    matches_played: row.get(3)?,
                },
            ))
        })
        .context("query load standings")?;

    let mut out = Vec::new();
    for row in rows {
        let (date, entry) = row.context("decode standings row")?;
        out.push((parse_stored_date(&date)?, entry));
    }
    Ok(SnapshotTable::from_rows(out))
}

/// Matches in play order, optionally limited to one season.
pub fn load_matches(conn: &Connection, season: Option<&str>) -> Result<Vec<RawMatch>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                date, season, home_team, away_team, result, gf, ga,
                h_yellows, a_yellows, h_reds, a_reds, odds_w, odds_d, odds_l
            FROM matches
            WHERE ?1 IS NULL OR season = ?1
            ORDER BY date ASC, match_id ASC
            "#,
        )
        .context("prepare load matches query")?;

    let rows = stmt
        .query_map(params![season], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(4)?,
                RawMatch {
                    date: NaiveDate::MIN,
                    season: row.get(1)?,
                    home_team: row.get(2)?,
                    away_team: row.get(3)?,
                    result: MatchResult::Draw,
                    goals_for: row.get(5)?,
                    goals_against: row.get(6)?,
                    home_yellow_cards: row.get(7)?,
                    away_yellow_cards: row.get(8)?,
                    home_red_cards: row.get(9)?,
                    away_red_cards: row.get(10)?,
                    odds: Odds {
                        win: row.get(11)?,
                        draw: row.get(12)?,
                        loss: row.get(13)?,
                    },
                },
            ))
        })
        .context("query load matches")?;

    let mut out = Vec::new();
    for row in rows {
        let (date, result, mut m) = row.context("decode match row")?;
        m.date = parse_stored_date(&date)?;
        m.result = parse_result_code(&result)?;
        out.push(m);
    }
    Ok(out)
}

fn parse_stored_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT).with_context(|| format!("stored date '{raw}'"))
}

fn parse_result_code(raw: &str) -> Result<MatchResult> {
    match raw {
        "W" => Ok(MatchResult::Win),
        "D" => Ok(MatchResult::Draw),
        "L" => Ok(MatchResult::Loss),
        other => Err(anyhow!("stored result '{other}' is not W/D/L")),
    }
}
