use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use match_significance::config::{self, arg_value, path_arg};
use match_significance::dataset::parse_date;
use match_significance::export;
use match_significance::league_params::LeagueParams;
use match_significance::logging;
use match_significance::pipeline::SeasonProcessor;
use match_significance::significance::live_boundaries;
use match_significance::standings::{SnapshotTable, StandingsSnapshot};
use match_significance::store;

const DEFAULT_OUT: &str = "significance_features.csv";

fn main() -> Result<()> {
    config::load_env();
    logging::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let params = LeagueParams::from_env();
    let db_path = path_arg(&args, "--db")
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let conn = store::open_db(&db_path)?;
    let snapshots = Arc::new(store::load_snapshot_table(&conn)?);

    if let Some(raw) = arg_value(&args, "--table") {
        let date = parse_date(&raw).ok_or_else(|| anyhow!("bad --table date '{raw}'"))?;
        return print_table(&snapshots, date, &params);
    }

    let season = arg_value(&args, "--season");
    let matches = store::load_matches(&conn, season.as_deref())?;
    if matches.is_empty() {
        return Err(anyhow!("no matches found in {}", db_path.display()));
    }

    let mut processor = SeasonProcessor::new(params, Arc::clone(&snapshots));
    let summary = processor.process_all(matches);

    let out = path_arg(&args, "--out").unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));
    let written = export::append_rows(&out, &summary.rows)?;

    println!("Significance run complete");
    println!("DB: {}", db_path.display());
    println!("Snapshots: {}", snapshots.len());
    println!(
        "Matches: {} processed, {} failed",
        summary.processed, summary.failed
    );
    println!(
        "Labels: H={} A={} N={}",
        summary.home_significant, summary.away_significant, summary.neutral
    );
    println!("Season resets: {}", summary.season_resets);
    println!("Rows written: {written} -> {}", out.display());
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }
    Ok(())
}

fn print_table(snapshots: &SnapshotTable, date: chrono::NaiveDate, params: &LeagueParams) -> Result<()> {
    let snapshot: &StandingsSnapshot = snapshots.require(date)?;
    println!("Standings for {date}");
    for (idx, entry) in snapshot.entries().iter().enumerate() {
        let open = live_boundaries(&entry.team, snapshot, params)?;
        let labels = open.iter().map(|b| b.to_string()).collect::<Vec<_>>();
        println!(
            "{:>2}. {:<24} {:>3} pts {:>2} mp  {}",
            idx + 1,
            entry.team,
            entry.points,
            entry.matches_played,
            if labels.is_empty() {
                "settled".to_string()
            } else {
                labels.join(", ")
            }
        );
    }
    Ok(())
}
