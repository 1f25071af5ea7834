use std::path::PathBuf;

use rusqlite::Connection;

use match_significance::dataset;
use match_significance::standings::SnapshotProvider;
use match_significance::store;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory sqlite");
    store::init_schema(&conn).expect("schema");
    conn
}

#[test]
fn standings_reload_into_the_same_table() {
    let raw = std::fs::read_to_string(fixture("standings.csv")).unwrap();
    let rows = dataset::read_standings(raw.as_bytes()).unwrap();
    let expected = dataset::load_standings_csv(&fixture("standings.csv")).unwrap();

    let mut conn = memory_db();
    assert_eq!(store::upsert_standings(&mut conn, &rows).unwrap(), 20);
    let loaded = store::load_snapshot_table(&conn).unwrap();

    let date = expected.dates().next().unwrap();
    assert_eq!(loaded.lookup(date), expected.lookup(date));
}

#[test]
fn match_upserts_are_idempotent_and_ordered() {
    let matches = dataset::load_matches_csv(&fixture("matches.csv")).unwrap();
    let mut conn = memory_db();
    store::upsert_matches(&mut conn, &matches).unwrap();
    store::upsert_matches(&mut conn, &matches).unwrap();

    let loaded = store::load_matches(&conn, None).unwrap();
    assert_eq!(loaded.len(), 4);
    assert!(loaded.windows(2).all(|w| w[0].date <= w[1].date));
    assert_eq!(loaded[0].home_team, "Doomed");
    assert_eq!(loaded[0].away_red_cards, 1);

    assert_eq!(store::load_matches(&conn, Some("2022-2023")).unwrap().len(), 4);
    assert!(store::load_matches(&conn, Some("1999-2000")).unwrap().is_empty());
}

#[test]
fn ingest_runs_record_errors() {
    let conn = memory_db();
    let run_id = store::begin_ingest_run(&conn).unwrap();
    store::finish_ingest_run(&conn, run_id, 20, 4, &["bad row".to_string()]).unwrap();
    let (standings, errors): (i64, String) = conn
        .query_row(
            "SELECT standings_rows, errors_json FROM ingest_runs WHERE run_id = ?1",
            [run_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(standings, 20);
    assert_eq!(errors, "[\"bad row\"]");
}
