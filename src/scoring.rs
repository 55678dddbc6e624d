use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::Player;

/// Fixed weights for the five composite-score inputs. The constants are
/// heuristic tuning values carried over as a documented contract; they sum
/// to 100 so the composite lands in [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub form: f64,
    pub value: f64,
    pub minutes: f64,
    pub recent_rate: f64,
    pub bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            form: 30.0,
            value: 25.0,
            minutes: 20.0,
            recent_rate: 15.0,
            bonus: 10.0,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.form + self.value + self.minutes + self.recent_rate + self.bonus
    }
}

/// Rescales the five raw metrics onto [0, weight] by dividing by the maximum
/// observed value across the input set, then sums them into one composite
/// desirability score per player.
///
/// A metric whose observed maximum is zero (or absent) contributes zero for
/// everyone this pass; no division by zero, no NaN leaks out.
pub fn compute_composite_scores(players: &[Player], weights: &ScoreWeights) -> HashMap<u32, f64> {
    let raw: Vec<RawMetrics> = players.iter().map(RawMetrics::from_player).collect();

    let max_form = column_max(&raw, |m| m.form);
    let max_value = column_max(&raw, |m| m.value_efficiency);
    let max_minutes = column_max(&raw, |m| m.minutes);
    let max_recent = column_max(&raw, |m| m.recent_rate);
    let max_bonus = column_max(&raw, |m| m.bonus);

    players
        .iter()
        .zip(raw.iter())
        .map(|(player, m)| {
            let score = scaled(m.form, max_form, weights.form)
                + scaled(m.value_efficiency, max_value, weights.value)
                + scaled(m.minutes, max_minutes, weights.minutes)
                + scaled(m.recent_rate, max_recent, weights.recent_rate)
                + scaled(m.bonus, max_bonus, weights.bonus);
            (player.id, score)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct RawMetrics {
    form: f64,
    value_efficiency: f64,
    minutes: f64,
    recent_rate: f64,
    bonus: f64,
}

impl RawMetrics {
    fn from_player(player: &Player) -> Self {
        // Points per unit of price; price is tenths so a 0-priced row (which
        // the provider should never send) still cannot divide by zero.
        let price = f64::from(player.price.max(1));
        let points = f64::from(player.total_points.max(0));
        Self {
            form: parse_metric(&player.form),
            value_efficiency: points / price,
            minutes: f64::from(player.minutes),
            recent_rate: parse_metric(&player.points_per_game),
            bonus: f64::from(player.bonus),
        }
    }
}

fn column_max(rows: &[RawMetrics], pick: impl Fn(&RawMetrics) -> f64) -> f64 {
    rows.iter().map(&pick).fold(0.0_f64, f64::max)
}

fn scaled(value: f64, max: f64, weight: f64) -> f64 {
    if max <= 0.0 || !max.is_finite() {
        return 0.0;
    }
    (value.max(0.0) / max) * weight
}

/// The provider sends form and points-per-game as text. Unparseable or empty
/// values coerce to zero rather than poisoning the pass.
pub fn parse_metric(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return 0.0;
    }
    s.replace(',', "").parse::<f64>().unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    fn player(id: u32, form: &str, points: i32, minutes: u32, ppg: &str, bonus: u32) -> Player {
        Player {
            id,
            web_name: format!("P{id}"),
            team_id: 1,
            position: Position::Midfielder,
            price: 60,
            total_points: points,
            minutes,
            starts: 10,
            form: form.to_string(),
            points_per_game: ppg.to_string(),
            selected_by_percent: "10.0".to_string(),
            bonus,
            goals_scored: 0,
            assists: 0,
            clean_sheets: 0,
        }
    }

    #[test]
    fn composite_stays_within_weight_total() {
        let players = vec![
            player(1, "6.0", 80, 1200, "5.0", 12),
            player(2, "3.0", 40, 600, "2.5", 6),
        ];
        let scores = compute_composite_scores(&players, &ScoreWeights::default());
        for score in scores.values() {
            assert!(*score >= 0.0 && *score <= 100.0, "score {score} out of range");
        }
        // The player holding every maximum gets exactly the full total.
        assert!((scores[&1] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_metrics_score_zero() {
        let players = vec![player(1, "0", 0, 0, "0", 0), player(2, "0", 0, 0, "0", 0)];
        let scores = compute_composite_scores(&players, &ScoreWeights::default());
        assert_eq!(scores[&1], 0.0);
        assert_eq!(scores[&2], 0.0);
    }

    #[test]
    fn zero_column_max_contributes_nothing() {
        // Bonus is zero for everyone; the other metrics still rank normally.
        let players = vec![
            player(1, "6.0", 80, 1200, "5.0", 0),
            player(2, "3.0", 40, 600, "2.5", 0),
        ];
        let scores = compute_composite_scores(&players, &ScoreWeights::default());
        assert!(scores[&1].is_finite() && scores[&2].is_finite());
        // Bonus (weight 10) drops out, leaving the other four at their max.
        assert!((scores[&1] - 90.0).abs() < 1e-9);
        assert!(scores[&2] < scores[&1]);
    }

    #[test]
    fn text_metrics_coerce_to_zero() {
        assert_eq!(parse_metric("n/a"), 0.0);
        assert_eq!(parse_metric(""), 0.0);
        assert_eq!(parse_metric("-"), 0.0);
        assert_eq!(parse_metric("4.5"), 4.5);
        assert_eq!(parse_metric("1,050"), 1050.0);
        let players = vec![player(1, "junk", 10, 90, "junk", 1), player(2, "2.0", 10, 90, "1.0", 1)];
        let scores = compute_composite_scores(&players, &ScoreWeights::default());
        assert!(scores[&2] > scores[&1]);
    }
}
