use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calendar::FixtureCalendar;
use crate::chips::{plan_chips, ChipAdvice, ChipPlannerOptions};
use crate::error::EngineError;
use crate::league::{analyze_league, LeagueGapReport};
use crate::model::{Player, Position, Projection, Team};
use crate::projection::{project_all, ProjectionParams};
use crate::provider::DataProvider;
use crate::scoring::{compute_composite_scores, parse_metric, ScoreWeights};
use crate::transfers::{recommend_transfers, OptimizerOptions, TransferOption};

/// Gameweeks in a season.
pub const SEASON_LENGTH: u32 = 38;

/// How boldly the engine should chase points. Maps onto the optimizer's hit
/// allowance and candidate breadth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskPreference {
    Cautious,
    Balanced,
    Aggressive,
}

impl RiskPreference {
    fn shape(self, opts: &mut OptimizerOptions) {
        match self {
            RiskPreference::Cautious => {
                opts.allow_hits = false;
                opts.candidates_per_slot = 2;
            }
            RiskPreference::Balanced => {
                opts.allow_hits = false;
                opts.candidates_per_slot = 3;
            }
            RiskPreference::Aggressive => {
                opts.allow_hits = true;
                opts.candidates_per_slot = 5;
                opts.max_transfers = opts.max_transfers.max(3);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    pub projection: ProjectionParams,
    pub optimizer: OptimizerOptions,
    pub chip_planner: ChipPlannerOptions,
    /// Gameweeks of lookahead the projections cover.
    pub lookahead: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            projection: ProjectionParams::default(),
            optimizer: OptimizerOptions::default(),
            chip_planner: ChipPlannerOptions::default(),
            lookahead: 6,
        }
    }
}

/// One immutable view of the fetched data plus everything derived from it.
/// Rebuilt per analysis pass; concurrent passes each get their own.
pub struct Snapshot {
    pub players: Vec<Player>,
    pub players_by_id: HashMap<u32, Player>,
    pub teams: Vec<Team>,
    pub calendar: FixtureCalendar,
    pub current_gameweek: u32,
    pub composite_scores: HashMap<u32, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptainPick {
    pub player_id: u32,
    pub score: f64,
}

/// A low-ownership player projected to score well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferentialPick {
    pub player_id: u32,
    /// Ownership across all managers, as a percentage.
    pub ownership: f64,
    pub expected_points: f64,
}

/// The projection & optimization engine. Stateless and side-effect-free per
/// invocation: every operation fetches a fresh snapshot from the provider,
/// computes, and returns advisory values without mutating anything.
pub struct Engine<P: DataProvider> {
    provider: P,
    config: EngineConfig,
}

impl<P: DataProvider> Engine<P> {
    pub fn new(provider: P, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetches raw records and derives the per-pass views. Empty player or
    /// fixture data is unusable and reported as such, not treated as a
    /// quietly empty league.
    pub fn snapshot(&self) -> Result<Snapshot, EngineError> {
        let players = self.provider.players()?;
        if players.is_empty() {
            return Err(EngineError::DataUnavailable(
                "provider returned no players".to_string(),
            ));
        }
        let teams = self.provider.teams()?;
        let fixtures = self.provider.fixtures()?;
        if fixtures.is_empty() {
            return Err(EngineError::DataUnavailable(
                "provider returned no fixtures".to_string(),
            ));
        }
        let current_gameweek = self.provider.current_gameweek()?;

        let composite_scores = compute_composite_scores(&players, &self.config.weights);
        let calendar = FixtureCalendar::build(&fixtures);
        let players_by_id = players.iter().map(|p| (p.id, p.clone())).collect();
        info!(
            players = players.len(),
            fixtures = fixtures.len(),
            gameweek = current_gameweek,
            "snapshot built"
        );
        Ok(Snapshot {
            players,
            players_by_id,
            teams,
            calendar,
            current_gameweek,
            composite_scores,
        })
    }

    /// Transfer recommendations for a manager's current squad, best net gain
    /// first, the no-transfer baseline always included.
    pub fn transfer_recommendations(
        &self,
        manager_id: u64,
        risk: RiskPreference,
    ) -> Result<Vec<TransferOption>, EngineError> {
        let snapshot = self.snapshot()?;
        let roster = self.provider.roster(manager_id)?;
        let projections = self.project_snapshot(&snapshot);
        let mut opts = self.config.optimizer;
        risk.shape(&mut opts);
        recommend_transfers(&roster, &snapshot.players, &projections, &opts)
    }

    /// Ranked chip windows for every instance the manager still holds.
    pub fn chip_recommendations(&self, manager_id: u64) -> Result<Vec<ChipAdvice>, EngineError> {
        let snapshot = self.snapshot()?;
        let roster = self.provider.roster(manager_id)?;
        roster.validate(&snapshot.players_by_id)?;
        let squad: Vec<&Player> = roster
            .player_ids
            .iter()
            .map(|id| &snapshot.players_by_id[id])
            .collect();
        Ok(plan_chips(
            &roster.chips,
            &squad,
            &snapshot.composite_scores,
            &snapshot.calendar,
            snapshot.current_gameweek,
            &self.config.projection,
            &self.config.chip_planner,
        ))
    }

    /// Projections over the configured lookahead for an arbitrary player
    /// list; ids missing from the snapshot are skipped.
    pub fn projected_points(&self, player_ids: &[u32]) -> Result<Vec<Projection>, EngineError> {
        let snapshot = self.snapshot()?;
        let projections = self.project_snapshot(&snapshot);
        Ok(player_ids
            .iter()
            .filter_map(|id| projections.get(id).cloned())
            .collect())
    }

    /// Captaincy shortlist from the manager's own squad: form, scoring rate
    /// and season output blended, attacking positions boosted.
    pub fn captain_suggestions(&self, manager_id: u64) -> Result<Vec<CaptainPick>, EngineError> {
        let snapshot = self.snapshot()?;
        let roster = self.provider.roster(manager_id)?;
        roster.validate(&snapshot.players_by_id)?;
        let mut picks: Vec<CaptainPick> = roster
            .player_ids
            .iter()
            .map(|id| {
                let p = &snapshot.players_by_id[id];
                let mut score = parse_metric(&p.form) * 0.4
                    + parse_metric(&p.points_per_game) * 0.3
                    + f64::from(p.total_points.max(0)) / 100.0 * 0.3;
                if matches!(p.position, Position::Midfielder | Position::Forward) {
                    score *= 1.2;
                }
                CaptainPick {
                    player_id: *id,
                    score,
                }
            })
            .collect();
        picks.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.player_id.cmp(&b.player_id)));
        picks.truncate(5);
        Ok(picks)
    }

    /// Template-breaking picks: players owned by at most `max_ownership`
    /// percent of managers, ranked by projected points over the lookahead.
    pub fn differential_picks(
        &self,
        max_ownership: f64,
    ) -> Result<Vec<DifferentialPick>, EngineError> {
        let snapshot = self.snapshot()?;
        let projections = self.project_snapshot(&snapshot);
        let mut picks: Vec<DifferentialPick> = snapshot
            .players
            .iter()
            .filter_map(|p| {
                let ownership = parse_metric(&p.selected_by_percent);
                if ownership > max_ownership {
                    return None;
                }
                let projection = projections.get(&p.id)?;
                if projection.expected_points <= 0.0 {
                    return None;
                }
                Some(DifferentialPick {
                    player_id: p.id,
                    ownership,
                    expected_points: projection.expected_points,
                })
            })
            .collect();
        picks.sort_by(|a, b| {
            b.expected_points
                .total_cmp(&a.expected_points)
                .then(a.player_id.cmp(&b.player_id))
        });
        picks.truncate(10);
        Ok(picks)
    }

    /// Gap analysis against a classic-league table, using the manager's own
    /// projected scoring rate as the catch-up yardstick.
    pub fn league_gap(
        &self,
        league_id: u64,
        manager_id: u64,
    ) -> Result<LeagueGapReport, EngineError> {
        let snapshot = self.snapshot()?;
        let roster = self.provider.roster(manager_id)?;
        roster.validate(&snapshot.players_by_id)?;
        let standings = self.provider.league_standings(league_id)?;

        // Expected per-gameweek output of the squad's best eleven.
        let projections = self.project_snapshot(&snapshot);
        let mut per_gw: Vec<f64> = roster
            .player_ids
            .iter()
            .filter_map(|id| projections.get(id))
            .map(|p| p.expected_points / f64::from(p.window.max(1)))
            .collect();
        per_gw.sort_by(|a, b| b.total_cmp(a));
        let expected_per_gameweek: f64 = per_gw.iter().take(11).sum();

        let remaining = SEASON_LENGTH.saturating_sub(snapshot.current_gameweek);
        analyze_league(&standings, manager_id, expected_per_gameweek, remaining)
    }

    fn project_snapshot(&self, snapshot: &Snapshot) -> HashMap<u32, Projection> {
        project_all(
            &snapshot.players,
            &snapshot.composite_scores,
            &snapshot.calendar,
            snapshot.current_gameweek,
            snapshot.current_gameweek + 1,
            self.config.lookahead,
            &self.config.projection,
        )
    }
}
