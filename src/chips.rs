use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::FixtureCalendar;
use crate::model::Player;
use crate::projection::{project_player, ProjectionParams};

/// The four one-time boosts. Each kind comes with two instances per season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipKind {
    Wildcard,
    FreeHit,
    BenchBoost,
    TripleCaptain,
}

impl ChipKind {
    pub const ALL: [ChipKind; 4] = [
        ChipKind::Wildcard,
        ChipKind::FreeHit,
        ChipKind::BenchBoost,
        ChipKind::TripleCaptain,
    ];

    fn index(self) -> usize {
        match self {
            ChipKind::Wildcard => 0,
            ChipKind::FreeHit => 1,
            ChipKind::BenchBoost => 2,
            ChipKind::TripleCaptain => 3,
        }
    }
}

/// Lifecycle of one chip instance. `Used` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipState {
    Available,
    Bookmarked(u32),
    Used(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChipError {
    #[error("no {0:?} instance left to use")]
    NoneAvailable(ChipKind),
}

/// Season-long chip usage record. Travels inside the `Roster` so the engine
/// stays stateless; the caller owns persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipBook {
    slots: [[ChipState; 2]; 4],
}

impl Default for ChipBook {
    fn default() -> Self {
        Self::new_season()
    }
}

impl ChipBook {
    /// Two `Available` instances of every kind, as at season start.
    pub fn new_season() -> Self {
        Self {
            slots: [[ChipState::Available; 2]; 4],
        }
    }

    pub fn states(&self, kind: ChipKind) -> [ChipState; 2] {
        self.slots[kind.index()]
    }

    pub fn available_instances(&self, kind: ChipKind) -> usize {
        self.slots[kind.index()]
            .iter()
            .filter(|s| matches!(s, ChipState::Available))
            .count()
    }

    /// Tentatively pencils an available instance in for `gameweek`.
    pub fn bookmark(&mut self, kind: ChipKind, gameweek: u32) -> Result<(), ChipError> {
        let slots = &mut self.slots[kind.index()];
        for slot in slots.iter_mut() {
            if matches!(slot, ChipState::Available) {
                *slot = ChipState::Bookmarked(gameweek);
                return Ok(());
            }
        }
        Err(ChipError::NoneAvailable(kind))
    }

    /// Confirms usage in `gameweek`, consuming a bookmarked instance first,
    /// otherwise an available one. Used instances are never touched.
    pub fn apply(&mut self, kind: ChipKind, gameweek: u32) -> Result<(), ChipError> {
        let slots = &mut self.slots[kind.index()];
        if let Some(slot) = slots.iter_mut().find(|s| matches!(s, ChipState::Bookmarked(_))) {
            *slot = ChipState::Used(gameweek);
            return Ok(());
        }
        if let Some(slot) = slots.iter_mut().find(|s| matches!(s, ChipState::Available)) {
            *slot = ChipState::Used(gameweek);
            return Ok(());
        }
        Err(ChipError::NoneAvailable(kind))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChipPlannerOptions {
    /// How many upcoming gameweeks to rank.
    pub horizon: u32,
    /// Length of the fixture run a wildcard should precede.
    pub wildcard_run: u32,
    /// Ranked gameweeks kept per chip instance.
    pub keep: usize,
}

impl Default for ChipPlannerOptions {
    fn default() -> Self {
        Self {
            horizon: 10,
            wildcard_run: 6,
            keep: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameweekBenefit {
    pub gameweek: u32,
    pub benefit: f64,
}

/// Ranked windows for one still-available chip instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipAdvice {
    pub kind: ChipKind,
    pub instance: usize,
    pub rankings: Vec<GameweekBenefit>,
}

/// Ranks upcoming gameweeks for every chip instance still `Available`.
///
/// Bench boost and triple captain chase squad output (which doubles
/// naturally inflate), the wildcard looks for the easiest upcoming fixture
/// stretch across the squad's clubs, and the free hit targets the gameweek
/// blanking the largest squad fraction.
pub fn plan_chips(
    book: &ChipBook,
    squad: &[&Player],
    composite_scores: &HashMap<u32, f64>,
    calendar: &FixtureCalendar,
    current_gameweek: u32,
    params: &ProjectionParams,
    opts: &ChipPlannerOptions,
) -> Vec<ChipAdvice> {
    let first = current_gameweek + 1;
    let gws: Vec<u32> = (first..first + opts.horizon).collect();

    // Per-player, per-gameweek expected points over the planning horizon.
    let per_gw: Vec<Vec<f64>> = squad
        .iter()
        .map(|&player| {
            let composite = composite_scores.get(&player.id).copied().unwrap_or(0.0);
            gws.iter()
                .map(|gw| {
                    project_player(player, composite, calendar, current_gameweek, *gw, 1, params)
                        .expected_points
                })
                .collect()
        })
        .collect();

    let mut out = Vec::new();
    for kind in ChipKind::ALL {
        for (instance, state) in book.states(kind).iter().enumerate() {
            if !matches!(state, ChipState::Available) {
                continue;
            }
            let mut rankings: Vec<GameweekBenefit> = gws
                .iter()
                .enumerate()
                .map(|(i, gw)| GameweekBenefit {
                    gameweek: *gw,
                    benefit: benefit_for(kind, *gw, i, squad, &per_gw, calendar, opts),
                })
                .collect();
            rankings.sort_by(|a, b| {
                b.benefit
                    .total_cmp(&a.benefit)
                    .then(a.gameweek.cmp(&b.gameweek))
            });
            rankings.truncate(opts.keep);
            out.push(ChipAdvice {
                kind,
                instance,
                rankings,
            });
        }
    }
    out
}

fn benefit_for(
    kind: ChipKind,
    gameweek: u32,
    gw_index: usize,
    squad: &[&Player],
    per_gw: &[Vec<f64>],
    calendar: &FixtureCalendar,
    opts: &ChipPlannerOptions,
) -> f64 {
    match kind {
        // Whole-squad output that week; doubles feed straight into it.
        ChipKind::BenchBoost => per_gw.iter().map(|row| row[gw_index]).sum(),
        // The captain doubles one player, so the best single score decides.
        ChipKind::TripleCaptain => per_gw
            .iter()
            .map(|row| row[gw_index])
            .fold(0.0_f64, f64::max),
        // Ease of the following run across the squad's clubs: 5 is the
        // hardest rating, so (5 - difficulty) rewards soft stretches, and a
        // blank week contributes nothing.
        ChipKind::Wildcard => {
            let mut score = 0.0;
            for run_gw in gameweek..gameweek + opts.wildcard_run {
                for player in squad {
                    for difficulty in calendar.difficulties(player.team_id, run_gw) {
                        score += 5.0 - difficulty;
                    }
                }
            }
            score / squad.len().max(1) as f64
        }
        // Fraction of the squad without a fixture that week.
        ChipKind::FreeHit => {
            let blanked = squad
                .iter()
                .filter(|p| calendar.is_blank(p.team_id, gameweek))
                .count();
            blanked as f64 / squad.len().max(1) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_starts_with_two_of_each() {
        let book = ChipBook::new_season();
        for kind in ChipKind::ALL {
            assert_eq!(book.available_instances(kind), 2);
        }
    }

    #[test]
    fn apply_consumes_and_terminal_used_is_rejected() {
        let mut book = ChipBook::new_season();
        book.apply(ChipKind::TripleCaptain, 12).unwrap();
        book.apply(ChipKind::TripleCaptain, 25).unwrap();
        assert_eq!(book.available_instances(ChipKind::TripleCaptain), 0);
        assert_eq!(
            book.apply(ChipKind::TripleCaptain, 30),
            Err(ChipError::NoneAvailable(ChipKind::TripleCaptain))
        );
        assert_eq!(
            book.states(ChipKind::TripleCaptain),
            [ChipState::Used(12), ChipState::Used(25)]
        );
    }

    #[test]
    fn bookmark_then_apply_upgrades_the_bookmark() {
        let mut book = ChipBook::new_season();
        book.bookmark(ChipKind::Wildcard, 8).unwrap();
        assert_eq!(book.available_instances(ChipKind::Wildcard), 1);
        book.apply(ChipKind::Wildcard, 9).unwrap();
        assert_eq!(
            book.states(ChipKind::Wildcard),
            [ChipState::Used(9), ChipState::Available]
        );
    }

    #[test]
    fn bookmark_fails_once_everything_is_spent() {
        let mut book = ChipBook::new_season();
        book.apply(ChipKind::FreeHit, 1).unwrap();
        book.bookmark(ChipKind::FreeHit, 2).unwrap();
        assert_eq!(
            book.bookmark(ChipKind::FreeHit, 3),
            Err(ChipError::NoneAvailable(ChipKind::FreeHit))
        );
    }
}
