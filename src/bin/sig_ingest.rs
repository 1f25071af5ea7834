use anyhow::{Context, Result, anyhow};

use match_significance::config::{self, path_arg};
use match_significance::{dataset, logging, store};

fn main() -> Result<()> {
    config::load_env();
    logging::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let standings_path = path_arg(&args, "--standings");
    let matches_path = path_arg(&args, "--matches");
    if standings_path.is_none() && matches_path.is_none() {
        return Err(anyhow!(
            "usage: sig_ingest [--standings <csv>] [--matches <csv>] [--db <path>]"
        ));
    }

    let db_path = path_arg(&args, "--db")
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let mut conn = store::open_db(&db_path)?;
    let run_id = store::begin_ingest_run(&conn)?;

    let mut errors = Vec::new();
    let mut standings_rows = 0usize;
    let mut match_rows = 0usize;

    if let Some(path) = standings_path {
        let rows = std::fs::File::open(&path)
            .with_context(|| format!("open {}", path.display()))
            .and_then(dataset::read_standings);
        match rows {
            Ok(rows) => standings_rows = store::upsert_standings(&mut conn, &rows)?,
            Err(err) => errors.push(format!("{}: {err:#}", path.display())),
        }
    }
    if let Some(path) = matches_path {
        match dataset::load_matches_csv(&path) {
            Ok(rows) => match_rows = store::upsert_matches(&mut conn, &rows)?,
            Err(err) => errors.push(format!("{}: {err:#}", path.display())),
        }
    }

    store::finish_ingest_run(&conn, run_id, standings_rows, match_rows, &errors)?;

    println!("Ingest complete");
    println!("DB: {}", db_path.display());
    println!("Standings rows upserted: {standings_rows}");
    println!("Matches upserted: {match_rows}");
    if !errors.is_empty() {
        println!("Errors: {}", errors.len());
        for err in &errors {
            println!(" - {err}");
        }
    }
    Ok(())
}
