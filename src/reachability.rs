use crate::standings::StandingsEntry;

pub const POINTS_PER_WIN: u32 = 3;

/// Whether `chaser` can still draw level with or pass `leader`'s current
/// points by winning every remaining match.
///
/// The leader's own remaining matches are ignored, as are fixtures between
/// the two teams or against third parties. This is an approximation of true
/// feasibility: it can call a race open that head-to-head results have
/// already closed.
///
/// Precondition: `chaser.matches_played <= total_matches`.
pub fn can_overtake(leader: &StandingsEntry, chaser: &StandingsEntry, total_matches: u32) -> bool {
    debug_assert!(
        chaser.matches_played <= total_matches,
        "{} has played {} of {} matches",
        chaser.team,
        chaser.matches_played,
        total_matches
    );
    leader.points <= max_attainable_points(chaser, total_matches)
}

pub fn max_attainable_points(entry: &StandingsEntry, total_matches: u32) -> u32 {
    let remaining = total_matches.saturating_sub(entry.matches_played);
    entry.points + remaining * POINTS_PER_WIN
}
