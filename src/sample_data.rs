use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chips::ChipBook;
use crate::model::{Fixture, Player, Position, Roster, Team, MAX_PER_TEAM};

/// Synthetic league snapshot for tests and benches: 20 clubs, a full 38-round
/// schedule, and a carved-out blank/double gameweek pair so calendar-driven
/// logic has something to find.
pub struct SampleLeague {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
    pub current_gameweek: u32,
}

pub const SAMPLE_BLANK_GW: u32 = 29;
pub const SAMPLE_DOUBLE_GW: u32 = 33;

const TEAM_COUNT: u32 = 20;
const CURRENT_GW: u32 = 10;

pub fn sample_league(seed: u64) -> SampleLeague {
    let mut rng = StdRng::seed_from_u64(seed);

    let teams: Vec<Team> = (1..=TEAM_COUNT)
        .map(|id| Team {
            id,
            name: format!("Sample Club {id:02}"),
            short_name: format!("SC{id:02}"),
        })
        .collect();

    // Club strength feeds the opponents' difficulty ratings.
    let strength: HashMap<u32, u8> = teams
        .iter()
        .map(|t| (t.id, rng.gen_range(1..=5u8)))
        .collect();

    let mut fixtures = build_schedule(&strength);

    // Move the blank-gameweek fixtures of clubs 1 and 2 later in the season,
    // leaving them blank in one gameweek and doubled in another.
    for fixture in &mut fixtures {
        if fixture.gameweek == Some(SAMPLE_BLANK_GW)
            && (fixture.team_h <= 2 || fixture.team_a <= 2)
        {
            fixture.gameweek = Some(SAMPLE_DOUBLE_GW);
        }
    }

    let mut players = Vec::new();
    let mut next_id = 1u32;
    for team in &teams {
        for (position, count) in [
            (Position::Goalkeeper, 2),
            (Position::Defender, 4),
            (Position::Midfielder, 4),
            (Position::Forward, 3),
        ] {
            for _ in 0..count {
                players.push(sample_player(&mut rng, next_id, team.id, position));
                next_id += 1;
            }
        }
    }

    SampleLeague {
        players,
        teams,
        fixtures,
        current_gameweek: CURRENT_GW,
    }
}

/// A valid 15-man squad drawn from the sample league: quotas filled cheapest
/// first, never more than three from one club. Bank is half a unit with one
/// free transfer, the standard tight-budget scenario.
pub fn sample_roster(league: &SampleLeague) -> Roster {
    let mut by_team: HashMap<u32, usize> = HashMap::new();
    let mut picked = Vec::new();

    for position in Position::ALL {
        let mut pool: Vec<&Player> = league
            .players
            .iter()
            .filter(|p| p.position == position)
            .collect();
        pool.sort_by_key(|p| (p.price, p.id));
        let mut taken = 0;
        for player in pool {
            if taken == position.quota() {
                break;
            }
            let count = by_team.entry(player.team_id).or_insert(0);
            if *count >= MAX_PER_TEAM {
                continue;
            }
            *count += 1;
            picked.push(player.id);
            taken += 1;
        }
    }

    Roster {
        player_ids: picked,
        bank: 5,
        free_transfers: 1,
        chips: ChipBook::new_season(),
    }
}

fn sample_player(rng: &mut StdRng, id: u32, team_id: u32, position: Position) -> Player {
    let price = match position {
        Position::Goalkeeper => rng.gen_range(40..=55),
        Position::Defender => rng.gen_range(40..=75),
        Position::Midfielder => rng.gen_range(45..=130),
        Position::Forward => rng.gen_range(45..=125),
    };
    let starts = rng.gen_range(0..=CURRENT_GW);
    let minutes = if starts == 0 {
        0
    } else {
        rng.gen_range(starts * 30..=starts * 90)
    };
    let total_points = rng.gen_range(0..=(starts as i32 * 9 + 2));
    let form = format!("{:.1}", rng.gen_range(0.0..8.0));
    let ppg = if starts == 0 {
        "0.0".to_string()
    } else {
        format!("{:.1}", total_points as f64 / f64::from(starts))
    };
    let (goals, assists, clean_sheets) = match position {
        Position::Goalkeeper => (0, 0, rng.gen_range(0..=starts)),
        Position::Defender => (rng.gen_range(0..=2), rng.gen_range(0..=2), rng.gen_range(0..=starts)),
        Position::Midfielder => (rng.gen_range(0..=6), rng.gen_range(0..=6), rng.gen_range(0..=2)),
        Position::Forward => (rng.gen_range(0..=9), rng.gen_range(0..=4), 0),
    };
    Player {
        id,
        web_name: format!("Player {id:03}"),
        team_id,
        position,
        price,
        total_points,
        minutes,
        starts,
        form,
        points_per_game: ppg,
        selected_by_percent: format!("{:.1}", rng.gen_range(0.1..60.0)),
        bonus: rng.gen_range(0..=12),
        goals_scored: goals,
        assists,
        clean_sheets,
    }
}

/// Circle-method round robin: 19 rounds, then the return rounds with venues
/// swapped, 38 gameweeks total.
fn build_schedule(strength: &HashMap<u32, u8>) -> Vec<Fixture> {
    let n = TEAM_COUNT as usize;
    let mut order: Vec<u32> = (1..=TEAM_COUNT).collect();
    let mut fixtures = Vec::new();
    let mut fixture_id = 1u32;

    for round in 0..(n - 1) {
        for half in 0..2u32 {
            let gw = (round as u32 + 1) + half * (TEAM_COUNT - 1);
            for i in 0..n / 2 {
                let (mut home, mut away) = (order[i], order[n - 1 - i]);
                if half == 1 {
                    std::mem::swap(&mut home, &mut away);
                }
                fixtures.push(Fixture {
                    id: fixture_id,
                    gameweek: Some(gw),
                    team_h: home,
                    team_a: away,
                    team_h_difficulty: strength.get(&away).copied().unwrap_or(3),
                    team_a_difficulty: strength.get(&home).copied().unwrap_or(3),
                    kickoff: None,
                    finished: gw <= CURRENT_GW,
                });
                fixture_id += 1;
            }
        }
        // Keep the first team fixed, rotate the rest one step.
        order[1..].rotate_right(1);
    }

    fixtures.sort_by_key(|f| (f.gameweek, f.id));
    fixtures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixtureCalendar;

    #[test]
    fn every_team_plays_once_in_a_normal_gameweek() {
        let league = sample_league(7);
        let cal = FixtureCalendar::build(&league.fixtures);
        for team in &league.teams {
            assert_eq!(cal.fixture_count(team.id, 5), 1, "team {}", team.id);
        }
    }

    #[test]
    fn carved_blank_and_double_gameweeks_exist() {
        let league = sample_league(7);
        let cal = FixtureCalendar::build(&league.fixtures);
        assert!(cal.is_blank(1, SAMPLE_BLANK_GW));
        assert!(cal.is_blank(2, SAMPLE_BLANK_GW));
        assert!(cal.is_double(1, SAMPLE_DOUBLE_GW));
        assert!(cal.is_double(2, SAMPLE_DOUBLE_GW));
    }

    #[test]
    fn sample_roster_is_valid() {
        let league = sample_league(7);
        let roster = sample_roster(&league);
        let by_id = league.players.iter().map(|p| (p.id, p.clone())).collect();
        roster.validate(&by_id).unwrap();
    }
}
