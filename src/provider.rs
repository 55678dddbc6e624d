use anyhow::Result;

use crate::model::{Fixture, LeagueStanding, Player, Roster, Team};

/// The external data collaborator. One synchronous, fallible call per record
/// kind; the engine neither retries nor caches, and success does not imply
/// non-empty data (the engine checks that where it matters).
pub trait DataProvider {
    fn players(&self) -> Result<Vec<Player>>;
    fn teams(&self) -> Result<Vec<Team>>;
    fn fixtures(&self) -> Result<Vec<Fixture>>;
    fn current_gameweek(&self) -> Result<u32>;
    fn roster(&self, manager_id: u64) -> Result<Roster>;
    fn league_standings(&self, league_id: u64) -> Result<Vec<LeagueStanding>>;
}
