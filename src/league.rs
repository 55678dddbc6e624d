use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::LeagueStanding;

/// Share of the user's own expected per-gameweek score treated as a
/// realistic edge over a rival when judging whether a gap can still close.
const CATCH_UP_EDGE: f64 = 0.15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueGapReport {
    pub league_size: usize,
    pub user_rank: u32,
    pub user_points: i32,
    pub points_to_leader: i32,
    pub points_to_next_rank: i32,
    pub remaining_gameweeks: u32,
    pub expected_per_gameweek: f64,
    pub leader_catchable: bool,
}

/// Compares the user's cumulative score against the table. Thin on purpose:
/// the heavy lifting already happened in the projections feeding
/// `expected_per_gameweek`.
pub fn analyze_league(
    standings: &[LeagueStanding],
    manager_id: u64,
    expected_per_gameweek: f64,
    remaining_gameweeks: u32,
) -> Result<LeagueGapReport, EngineError> {
    if standings.is_empty() {
        return Err(EngineError::DataUnavailable(
            "league standings are empty".to_string(),
        ));
    }
    let Some(user) = standings.iter().find(|s| s.manager_id == manager_id) else {
        return Err(EngineError::DataUnavailable(format!(
            "manager {manager_id} not found in standings"
        )));
    };

    let leader_points = standings.iter().map(|s| s.total_points).max().unwrap_or(0);
    let points_to_leader = (leader_points - user.total_points).max(0);

    // Closest rival ranked above the user.
    let points_to_next_rank = standings
        .iter()
        .filter(|s| s.rank < user.rank)
        .map(|s| s.total_points - user.total_points)
        .filter(|gap| *gap >= 0)
        .min()
        .unwrap_or(0);

    let headroom = expected_per_gameweek * CATCH_UP_EDGE * f64::from(remaining_gameweeks);
    Ok(LeagueGapReport {
        league_size: standings.len(),
        user_rank: user.rank,
        user_points: user.total_points,
        points_to_leader,
        points_to_next_rank,
        remaining_gameweeks,
        expected_per_gameweek,
        leader_catchable: f64::from(points_to_leader) <= headroom,
    })
}
