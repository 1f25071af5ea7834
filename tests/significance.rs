use chrono::NaiveDate;

use match_significance::SignificanceError;
use match_significance::league_params::LeagueParams;
use match_significance::reachability::can_overtake;
use match_significance::significance::{
    Boundary, is_significant, live_boundaries, significance_by_team,
};
use match_significance::standings::{StandingsEntry, StandingsSnapshot};

const LATE_SEASON: [(&str, u32, u32); 20] = [
    ("Leaders", 80, 36),
    ("Chasers", 70, 35),
    ("Third", 65, 36),
    ("Fourth", 60, 36),
    ("Fifth", 55, 36),
    ("Sixth", 50, 36),
    ("Seventh", 48, 36),
    ("Eighth", 46, 36),
    ("Ninth", 44, 36),
    ("Tenth", 42, 36),
    ("Eleventh", 40, 36),
    ("Twelfth", 38, 36),
    ("Thirteenth", 36, 36),
    ("Fourteenth", 34, 36),
    ("Fifteenth", 33, 36),
    ("Sixteenth", 32, 36),
    ("Safe", 30, 35),
    ("Doomed", 20, 36),
    ("Nineteenth", 18, 36),
    ("Bottom", 15, 36),
];

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 6).unwrap()
}

fn table(rows: &[(&str, u32, u32)]) -> StandingsSnapshot {
    StandingsSnapshot::new(
        date(),
        rows.iter()
            .map(|(team, pts, mp)| StandingsEntry::new(*team, *pts, *mp)),
    )
}

#[test]
fn secured_title_is_not_a_live_boundary_for_the_leader() {
    let snap = table(&LATE_SEASON);
    let p = LeagueParams::premier_league();

    let first = snap.at_rank(1).unwrap();
    let second = snap.at_rank(2).unwrap();
    assert!(!can_overtake(first, second, 38));

    let open = live_boundaries("Leaders", &snap, &p).unwrap();
    assert!(!open.contains(&Boundary::TitleDefence));
    // A team at or above a target rank trivially "reaches" it.
    assert!(open.contains(&Boundary::ReachChampionsLeague));
    assert!(is_significant("Leaders", &snap, &p).unwrap());
}

#[test]
fn title_defence_opens_when_runner_up_is_close() {
    let p = LeagueParams::premier_league();
    let mut rows = LATE_SEASON;
    rows[1] = ("Chasers", 77, 35);
    let snap = table(&rows);
    // 77 + 3 * 3 = 86 >= 80
    assert!(live_boundaries("Leaders", &snap, &p).unwrap().contains(&Boundary::TitleDefence));

    let settled = table(&LATE_SEASON);
    assert!(!live_boundaries("Leaders", &settled, &p).unwrap().contains(&Boundary::TitleDefence));
    // The defence check only applies to the leader.
    assert!(!live_boundaries("Chasers", &snap, &p).unwrap().contains(&Boundary::TitleDefence));
}

#[test]
fn champions_league_place_defended_against_fifth() {
    let p = LeagueParams::premier_league();
    // Fifth on 55 with two left can reach Fourth's 60.
    let open = live_boundaries("Fourth", &table(&LATE_SEASON), &p).unwrap();
    assert!(open.contains(&Boundary::ChampionsLeagueDefence));

    let mut rows = LATE_SEASON;
    rows[4] = ("Fifth", 53, 36);
    let closed = live_boundaries("Fourth", &table(&rows), &p).unwrap();
    assert!(!closed.contains(&Boundary::ChampionsLeagueDefence));
    assert!(!open.contains(&Boundary::EuropaDefence));
}

#[test]
fn europa_place_defended_against_sixth() {
    let p = LeagueParams::premier_league();
    // Sixth on 50 with two left can reach Fifth's 55.
    let open = live_boundaries("Fifth", &table(&LATE_SEASON), &p).unwrap();
    assert!(open.contains(&Boundary::EuropaDefence));
    assert!(!open.contains(&Boundary::ChampionsLeagueDefence));

    let mut rows = LATE_SEASON;
    rows[5] = ("Sixth", 48, 36);
    rows[6] = ("Seventh", 47, 36);
    let snap = table(&rows);
    assert_eq!(snap.rank_of("Sixth").unwrap(), 6);
    let closed = live_boundaries("Fifth", &snap, &p).unwrap();
    assert!(!closed.contains(&Boundary::EuropaDefence));
}

#[test]
fn relegated_team_that_cannot_escape_is_not_significant() {
    let snap = table(&LATE_SEASON);
    let p = LeagueParams::premier_league();

    let seventeenth = snap.at_rank(17).unwrap();
    let eighteenth = snap.at_rank(18).unwrap();
    assert!(!can_overtake(seventeenth, eighteenth, 38));

    assert!(live_boundaries("Doomed", &snap, &p).unwrap().is_empty());
    assert!(!is_significant("Doomed", &snap, &p).unwrap());
}

#[test]
fn mid_table_with_nothing_to_play_for() {
    let snap = table(&LATE_SEASON);
    let p = LeagueParams::premier_league();
    assert!(!is_significant("Tenth", &snap, &p).unwrap());
    assert!(!is_significant("Sixteenth", &snap, &p).unwrap());
}

#[test]
fn sixth_can_still_reach_europe() {
    let snap = table(&LATE_SEASON);
    let p = LeagueParams::premier_league();
    assert_eq!(
        live_boundaries("Sixth", &snap, &p).unwrap(),
        vec![Boundary::ReachEuropa]
    );
}

#[test]
fn tight_relegation_race_is_live_both_ways() {
    let mut rows = LATE_SEASON;
    rows[16] = ("Safe", 24, 35);
    let snap = table(&rows);
    let p = LeagueParams::premier_league();
    assert!(live_boundaries("Safe", &snap, &p).unwrap().contains(&Boundary::RelegationDrop));
    assert!(live_boundaries("Doomed", &snap, &p).unwrap().contains(&Boundary::RelegationEscape));
}

#[test]
fn unknown_team_is_a_lookup_error() {
    let snap = table(&LATE_SEASON);
    let err = is_significant("Ghosts", &snap, &LeagueParams::premier_league()).unwrap_err();
    assert_eq!(
        err,
        SignificanceError::TeamNotFound {
            team: "Ghosts".to_string(),
            date: date()
        }
    );
}

#[test]
fn short_table_is_a_configuration_mismatch() {
    let snap = table(&LATE_SEASON[..16]);
    let err = is_significant("Leaders", &snap, &LeagueParams::premier_league()).unwrap_err();
    assert_eq!(
        err,
        SignificanceError::ConfigurationMismatch {
            team: "Leaders".to_string(),
            date: date(),
            rows: 16,
            expected: 20
        }
    );
}

#[test]
fn table_larger_than_the_league_is_a_configuration_mismatch() {
    let mut rows = LATE_SEASON.to_vec();
    rows.push(("Promoted", 10, 36));
    let snap = table(&rows);
    let err = is_significant("Tenth", &snap, &LeagueParams::premier_league()).unwrap_err();
    assert!(matches!(
        err,
        SignificanceError::ConfigurationMismatch { ref team, rows: 21, expected: 20, .. }
            if team == "Tenth"
    ));
}

#[test]
fn smaller_league_works_with_matching_params() {
    let snap = table(&LATE_SEASON[..16]);
    let p = LeagueParams {
        teams: 16,
        total_matches: 38,
        safety_rank: 13,
        ..LeagueParams::premier_league()
    };
    assert!(p.validate().is_ok());
    assert!(is_significant("Leaders", &snap, &p).is_ok());
}

#[test]
fn check_order_does_not_change_the_verdict() {
    let mut rows = LATE_SEASON;
    rows[16] = ("Safe", 24, 35);
    let snap = table(&rows);
    let p = LeagueParams::premier_league();
    for entry in snap.entries() {
        let rank = snap.rank_of(&entry.team).unwrap();
        let reversed = Boundary::ALL
            .iter()
            .rev()
            .any(|b| b.applies(rank, &p) && b.is_open(entry, &snap, &p).unwrap());
        let rotated = Boundary::ALL
            .iter()
            .cycle()
            .skip(3)
            .take(Boundary::ALL.len())
            .any(|b| b.applies(rank, &p) && b.is_open(entry, &snap, &p).unwrap());
        let verdict = is_significant(&entry.team, &snap, &p).unwrap();
        assert_eq!(reversed, verdict, "{}", entry.team);
        assert_eq!(rotated, verdict, "{}", entry.team);
    }
}

#[test]
fn classification_is_idempotent_and_matches_parallel_sweep() {
    let snap = table(&LATE_SEASON);
    let p = LeagueParams::premier_league();
    let sweep = significance_by_team(&snap, &p).unwrap();
    assert_eq!(sweep.len(), 20);
    for entry in snap.entries() {
        let first = is_significant(&entry.team, &snap, &p).unwrap();
        let second = is_significant(&entry.team, &snap, &p).unwrap();
        assert_eq!(first, second);
        assert_eq!(sweep[&entry.team], first);
        assert_eq!(
            !live_boundaries(&entry.team, &snap, &p).unwrap().is_empty(),
            first
        );
    }
}
