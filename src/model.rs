use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chips::ChipBook;
use crate::error::EngineError;

/// Squad size mandated by the game rules.
pub const SQUAD_SIZE: usize = 15;

/// Hard cap on players from one real-world club.
pub const MAX_PER_TEAM: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Maps the provider's numeric `element_type` onto a position.
    pub fn from_element_type(raw: u64) -> Option<Self> {
        match raw {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Exact number of players a squad must carry in this position.
    pub fn quota(self) -> usize {
        match self {
            Position::Goalkeeper => 2,
            Position::Defender => 5,
            Position::Midfielder => 5,
            Position::Forward => 3,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

/// One player as of the current snapshot. Immutable within an analysis pass;
/// the whole set is rebuilt on every fetch.
///
/// `form`, `points_per_game` and `selected_by_percent` stay as the provider's
/// text values; scoring parses them leniently and treats unparseable input as
/// zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub web_name: String,
    pub team_id: u32,
    pub position: Position,
    /// Price in tenths of a million.
    pub price: u32,
    pub total_points: i32,
    pub minutes: u32,
    pub starts: u32,
    pub form: String,
    pub points_per_game: String,
    /// Ownership across all managers, as a percentage.
    pub selected_by_percent: String,
    pub bonus: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
}

impl Player {
    /// Secondary stat the position multiplier keys on: clean sheets for the
    /// defensive roles, goal involvement for midfielders, goals for forwards.
    pub fn secondary_stat(&self) -> u32 {
        match self.position {
            Position::Goalkeeper | Position::Defender => self.clean_sheets,
            Position::Midfielder => self.goals_scored + self.assists,
            Position::Forward => self.goals_scored,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

/// One scheduled match. A team can appear in zero, one, or several fixtures
/// within a gameweek; `gameweek` is `None` while the provider has not slotted
/// a postponed match into the calendar yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub gameweek: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u8,
    pub team_a_difficulty: u8,
    pub kickoff: Option<chrono::DateTime<chrono::Utc>>,
    pub finished: bool,
}

/// The user's current 15-man squad plus the season state that travels with it
/// (bank, free transfers, chip book). Owned by the caller; the engine only
/// reads it and returns advisory recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub player_ids: Vec<u32>,
    /// Remaining budget in tenths of a million.
    pub bank: u32,
    pub free_transfers: u32,
    pub chips: ChipBook,
}

impl Roster {
    /// Fails fast when the squad breaks an invariant the caller is supposed
    /// to maintain: wrong size, duplicate or unknown ids, quota mismatch, or
    /// more than three players from one club.
    pub fn validate(&self, players: &HashMap<u32, Player>) -> Result<(), EngineError> {
        if self.player_ids.len() != SQUAD_SIZE {
            return Err(EngineError::InvalidRoster(format!(
                "squad has {} players, expected {SQUAD_SIZE}",
                self.player_ids.len()
            )));
        }

        let mut by_position: HashMap<Position, usize> = HashMap::new();
        let mut by_team: HashMap<u32, usize> = HashMap::new();
        let mut seen: Vec<u32> = Vec::with_capacity(SQUAD_SIZE);

        for id in &self.player_ids {
            if seen.contains(id) {
                return Err(EngineError::InvalidRoster(format!(
                    "player {id} appears twice in the squad"
                )));
            }
            seen.push(*id);
            let Some(player) = players.get(id) else {
                return Err(EngineError::InvalidRoster(format!(
                    "player {id} is not in the current snapshot"
                )));
            };
            *by_position.entry(player.position).or_insert(0) += 1;
            *by_team.entry(player.team_id).or_insert(0) += 1;
        }

        for position in Position::ALL {
            let count = by_position.get(&position).copied().unwrap_or(0);
            if count != position.quota() {
                return Err(EngineError::InvalidRoster(format!(
                    "{} players in position {}, quota is {}",
                    count,
                    position.short_name(),
                    position.quota()
                )));
            }
        }

        for (team_id, count) in by_team {
            if count > MAX_PER_TEAM {
                return Err(EngineError::InvalidRoster(format!(
                    "{count} players from team {team_id}, cap is {MAX_PER_TEAM}"
                )));
            }
        }

        Ok(())
    }

    /// Number of squad players from each club.
    pub fn team_counts(&self, players: &HashMap<u32, Player>) -> HashMap<u32, usize> {
        let mut counts = HashMap::new();
        for id in &self.player_ids {
            if let Some(player) = players.get(id) {
                *counts.entry(player.team_id).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// One row of a classic-league table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueStanding {
    pub manager_id: u64,
    pub entry_name: String,
    pub player_name: String,
    pub total_points: i32,
    pub rank: u32,
    pub last_gw_points: i32,
}

/// Expected points for one player over a gameweek window, with the factors
/// that produced it retained so recommendations stay explainable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub player_id: u32,
    pub first_gameweek: u32,
    pub window: u32,
    pub expected_points: f64,
    pub composite_score: f64,
    pub minutes_factor: f64,
    pub bonus_factor: f64,
    pub position_factor: f64,
    pub availability_factor: f64,
}
