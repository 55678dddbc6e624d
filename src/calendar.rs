use std::collections::HashMap;

use crate::model::Fixture;

/// Difficulty assumed when a team has no rated fixture to look at.
/// Ratings run 1 (easiest) to 5 (hardest), so 3 is the neutral midpoint.
pub const DEFAULT_DIFFICULTY: f64 = 3.0;

/// Derived view over the raw fixture list, built once per analysis pass.
/// Keyed by (team, gameweek); a missing key is a blank gameweek, two or more
/// entries a double. The chip planner treats both as high-value signals.
#[derive(Debug, Clone, Default)]
pub struct FixtureCalendar {
    by_team_gw: HashMap<(u32, u32), Vec<f64>>,
    fixtures_per_gw: HashMap<u32, usize>,
    difficulty_per_gw: HashMap<u32, (f64, usize)>,
}

impl FixtureCalendar {
    pub fn build(fixtures: &[Fixture]) -> Self {
        let mut cal = FixtureCalendar::default();
        for fixture in fixtures {
            // Postponed matches without a slot don't belong to any gameweek.
            let Some(gw) = fixture.gameweek else { continue };
            cal.by_team_gw
                .entry((fixture.team_h, gw))
                .or_default()
                .push(f64::from(fixture.team_h_difficulty));
            cal.by_team_gw
                .entry((fixture.team_a, gw))
                .or_default()
                .push(f64::from(fixture.team_a_difficulty));
            *cal.fixtures_per_gw.entry(gw).or_insert(0) += 1;
            let (sum, n) = cal.difficulty_per_gw.entry(gw).or_insert((0.0, 0));
            *sum += f64::from(fixture.team_h_difficulty) + f64::from(fixture.team_a_difficulty);
            *n += 2;
        }
        cal
    }

    /// Per-fixture difficulty ratings for a team's gameweek; empty on a blank.
    pub fn difficulties(&self, team: u32, gameweek: u32) -> &[f64] {
        self.by_team_gw
            .get(&(team, gameweek))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Average difficulty for a team's gameweek, neutral when blank.
    pub fn difficulty(&self, team: u32, gameweek: u32) -> f64 {
        let ds = self.difficulties(team, gameweek);
        if ds.is_empty() {
            DEFAULT_DIFFICULTY
        } else {
            ds.iter().sum::<f64>() / ds.len() as f64
        }
    }

    pub fn fixture_count(&self, team: u32, gameweek: u32) -> usize {
        self.difficulties(team, gameweek).len()
    }

    pub fn is_blank(&self, team: u32, gameweek: u32) -> bool {
        self.fixture_count(team, gameweek) == 0
    }

    pub fn is_double(&self, team: u32, gameweek: u32) -> bool {
        self.fixture_count(team, gameweek) >= 2
    }

    /// Total fixtures scheduled league-wide in a gameweek.
    pub fn total_fixtures(&self, gameweek: u32) -> usize {
        self.fixtures_per_gw.get(&gameweek).copied().unwrap_or(0)
    }

    /// League-wide average difficulty for a gameweek, neutral when empty.
    pub fn average_difficulty(&self, gameweek: u32) -> f64 {
        match self.difficulty_per_gw.get(&gameweek) {
            Some((sum, n)) if *n > 0 => sum / *n as f64,
            _ => DEFAULT_DIFFICULTY,
        }
    }
}
