use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calendar::FixtureCalendar;
use crate::model::{Player, Projection};

/// Tuning constants for the projector. Heuristic values inherited from the
/// original model; exposed as configuration so callers can retune without a
/// rebuild, and so tests can pin them as a contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Divisor mapping the composite score (0..=100) into a per-gameweek
    /// points base (0..=10 at the default).
    pub points_scale: f64,
    /// Per-difficulty-step swing of the fixture multiplier around neutral.
    pub difficulty_swing: f64,
    pub fixture_mult_floor: f64,
    pub fixture_mult_ceil: f64,
    /// Maximum lift from consistently earning bonus points.
    pub bonus_lift: f64,
    /// Maximum lift from the position-specific secondary stat.
    pub position_lift: f64,
    /// Average minutes per start below which the rotation discount kicks in.
    pub rotation_threshold: f64,
    pub rotation_discount: f64,
    /// Floor on the availability factor so rotated but promising players are
    /// discounted, never zeroed out.
    pub availability_floor: f64,
    pub full_match_minutes: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            points_scale: 10.0,
            difficulty_swing: 0.1,
            fixture_mult_floor: 0.8,
            fixture_mult_ceil: 1.2,
            bonus_lift: 0.1,
            position_lift: 0.1,
            rotation_threshold: 45.0,
            rotation_discount: 0.9,
            availability_floor: 0.7,
            full_match_minutes: 90.0,
        }
    }
}

/// Expected points for one player over `window` gameweeks starting at
/// `first_gameweek`.
///
/// The per-gameweek value is a product of non-negative factors, so the total
/// can never go below zero: a blank gameweek contributes nothing, a double
/// gameweek sums its per-fixture contributions, and every reliability input
/// (more minutes, easier fixtures, better form) moves it monotonically up.
pub fn project_player(
    player: &Player,
    composite_score: f64,
    calendar: &FixtureCalendar,
    current_gameweek: u32,
    first_gameweek: u32,
    window: u32,
    params: &ProjectionParams,
) -> Projection {
    let base = composite_score.max(0.0) / params.points_scale;
    let minutes_factor = minutes_reliability(player, current_gameweek, params);
    let bonus_factor = bonus_frequency(player, params);
    let position_factor = position_adjustment(player, params);
    let availability_factor = availability(player, params);

    let per_gw = base * minutes_factor * bonus_factor * position_factor * availability_factor;

    let mut expected = 0.0;
    for gw in first_gameweek..first_gameweek.saturating_add(window) {
        expected += per_gw * fixture_multiplier_sum(calendar, player.team_id, gw, params);
    }

    Projection {
        player_id: player.id,
        first_gameweek,
        window,
        expected_points: expected.max(0.0),
        composite_score,
        minutes_factor,
        bonus_factor,
        position_factor,
        availability_factor,
    }
}

/// Projects every player in the snapshot over the same window.
pub fn project_all(
    players: &[Player],
    composite_scores: &HashMap<u32, f64>,
    calendar: &FixtureCalendar,
    current_gameweek: u32,
    first_gameweek: u32,
    window: u32,
    params: &ProjectionParams,
) -> HashMap<u32, Projection> {
    players
        .par_iter()
        .map(|player| {
            let composite = composite_scores.get(&player.id).copied().unwrap_or(0.0);
            let projection = project_player(
                player,
                composite,
                calendar,
                current_gameweek,
                first_gameweek,
                window,
                params,
            );
            (player.id, projection)
        })
        .collect()
}

/// Ratio of minutes actually played to the maximum possible so far, capped
/// at 1.0. Before the season starts there is nothing to be unreliable about.
fn minutes_reliability(player: &Player, current_gameweek: u32, params: &ProjectionParams) -> f64 {
    let elapsed = f64::from(current_gameweek.max(1)) * params.full_match_minutes;
    (f64::from(player.minutes) / elapsed).clamp(0.0, 1.0)
}

/// Players who keep earning bonus points get a modest lift: the bonus share
/// of total points is capped at 1 and scaled by `bonus_lift`.
fn bonus_frequency(player: &Player, params: &ProjectionParams) -> f64 {
    let total = f64::from(player.total_points.max(1));
    let share = (f64::from(player.bonus) / total).clamp(0.0, 1.0);
    1.0 + share * params.bonus_lift
}

/// Multiplicative lift from the position's secondary stat per start: clean
/// sheets for goalkeepers and defenders, goal involvement for midfielders,
/// goals for forwards. The starts denominator is floored at 1 and the ratio
/// bounded at 1 so a hot streak cannot blow the projection up.
fn position_adjustment(player: &Player, params: &ProjectionParams) -> f64 {
    let starts = f64::from(player.starts.max(1));
    let rate = (f64::from(player.secondary_stat()) / starts).clamp(0.0, 1.0);
    1.0 + rate * params.position_lift
}

/// Rotation/injury risk from average minutes per appearance. Below half a
/// match the projection is discounted further, but the overall factor never
/// drops under `availability_floor`.
fn availability(player: &Player, params: &ProjectionParams) -> f64 {
    let starts = f64::from(player.starts.max(1));
    let minutes_per_start = f64::from(player.minutes) / starts;
    let mut factor = (minutes_per_start / params.full_match_minutes).min(1.0);
    if minutes_per_start < params.rotation_threshold {
        factor *= params.rotation_discount;
    }
    factor.max(params.availability_floor)
}

/// Sum of per-fixture multipliers for one team-gameweek. Easier fixtures
/// scale above 1, harder below, each clamped to the configured band; a blank
/// gameweek yields 0 and a double gameweek adds its fixtures up.
fn fixture_multiplier_sum(
    calendar: &FixtureCalendar,
    team_id: u32,
    gameweek: u32,
    params: &ProjectionParams,
) -> f64 {
    calendar
        .difficulties(team_id, gameweek)
        .iter()
        .map(|difficulty| {
            (1.0 + (3.0 - difficulty) * params.difficulty_swing)
                .clamp(params.fixture_mult_floor, params.fixture_mult_ceil)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fixture, Position};

    fn player(id: u32, minutes: u32, starts: u32, bonus: u32) -> Player {
        Player {
            id,
            web_name: format!("P{id}"),
            team_id: 1,
            position: Position::Midfielder,
            price: 60,
            total_points: 50,
            minutes,
            starts,
            form: "4.0".to_string(),
            points_per_game: "4.0".to_string(),
            selected_by_percent: "10.0".to_string(),
            bonus,
            goals_scored: 4,
            assists: 2,
            clean_sheets: 0,
        }
    }

    fn fixture(id: u32, gw: u32, home: u32, away: u32, dh: u8, da: u8) -> Fixture {
        Fixture {
            id,
            gameweek: Some(gw),
            team_h: home,
            team_a: away,
            team_h_difficulty: dh,
            team_a_difficulty: da,
            kickoff: None,
            finished: false,
        }
    }

    fn single_fixture_calendar(gw: u32, difficulty: u8) -> FixtureCalendar {
        FixtureCalendar::build(&[fixture(1, gw, 1, 2, difficulty, difficulty)])
    }

    #[test]
    fn projection_is_never_negative() {
        let cal = FixtureCalendar::build(&[]);
        let p = player(1, 0, 0, 0);
        let proj = project_player(&p, 0.0, &cal, 0, 1, 6, &ProjectionParams::default());
        assert_eq!(proj.expected_points, 0.0);
        assert!(proj.availability_factor >= 0.7);
    }

    #[test]
    fn blank_gameweek_contributes_zero() {
        // Fixture only in gw 11; a window covering only gw 12 must be zero.
        let cal = single_fixture_calendar(11, 3);
        let p = player(1, 900, 10, 5);
        let proj = project_player(&p, 60.0, &cal, 10, 12, 1, &ProjectionParams::default());
        assert_eq!(proj.expected_points, 0.0);
    }

    #[test]
    fn double_gameweek_is_additive() {
        let p = player(1, 900, 10, 5);
        let params = ProjectionParams::default();

        let single = single_fixture_calendar(11, 3);
        let double = FixtureCalendar::build(&[
            fixture(1, 11, 1, 2, 3, 3),
            fixture(2, 11, 1, 3, 3, 3),
        ]);

        let one = project_player(&p, 60.0, &single, 10, 11, 1, &params);
        let two = project_player(&p, 60.0, &double, 10, 11, 1, &params);
        assert!(one.expected_points > 0.0);
        assert!((two.expected_points - 2.0 * one.expected_points).abs() < 1e-9);
    }

    #[test]
    fn easier_fixture_projects_higher() {
        let p = player(1, 900, 10, 5);
        let params = ProjectionParams::default();
        let easy = project_player(&p, 60.0, &single_fixture_calendar(11, 2), 10, 11, 1, &params);
        let hard = project_player(&p, 60.0, &single_fixture_calendar(11, 5), 10, 11, 1, &params);
        assert!(easy.expected_points > hard.expected_points);
    }

    #[test]
    fn more_minutes_never_project_lower() {
        let cal = single_fixture_calendar(11, 3);
        let params = ProjectionParams::default();
        let regular = project_player(&player(1, 900, 10, 5), 60.0, &cal, 10, 11, 1, &params);
        let fringe = project_player(&player(2, 300, 10, 5), 60.0, &cal, 10, 11, 1, &params);
        assert!(regular.expected_points >= fringe.expected_points);
    }

    #[test]
    fn rotation_risk_is_discounted_but_floored() {
        let params = ProjectionParams::default();
        // 30 minutes per start: under the rotation threshold.
        let rotated = player(1, 300, 10, 0);
        let factor = availability(&rotated, &params);
        assert!(factor >= params.availability_floor);
        assert!(factor < 1.0);
        // A nailed-on starter takes no discount.
        let starter = player(2, 900, 10, 0);
        assert_eq!(availability(&starter, &params), 1.0);
    }

    #[test]
    fn bonus_lift_is_capped() {
        let params = ProjectionParams::default();
        let mut p = player(1, 900, 10, 200);
        p.total_points = 10;
        // Even a nonsensical bonus share cannot lift more than bonus_lift.
        assert!(bonus_frequency(&p, &params) <= 1.0 + params.bonus_lift + 1e-12);
    }

    #[test]
    fn zero_composite_twin_never_out_projects() {
        let cal = single_fixture_calendar(11, 2);
        let params = ProjectionParams::default();
        let p = player(1, 900, 10, 5);
        let zero = project_player(&p, 0.0, &cal, 10, 11, 3, &params);
        let live = project_player(&p, 55.0, &cal, 10, 11, 3, &params);
        assert_eq!(zero.expected_points, 0.0);
        assert!(live.expected_points > zero.expected_points);
    }
}
