use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use fpl_engine::calendar::FixtureCalendar;
use fpl_engine::chips::{plan_chips, ChipBook, ChipPlannerOptions};
use fpl_engine::model::Player;
use fpl_engine::projection::{project_all, ProjectionParams};
use fpl_engine::sample_data::{sample_league, sample_roster};
use fpl_engine::scoring::{compute_composite_scores, ScoreWeights};
use fpl_engine::transfers::{recommend_transfers, OptimizerOptions};

fn bench_composite_scores(c: &mut Criterion) {
    let league = sample_league(1);
    c.bench_function("composite_scores_260_players", |b| {
        b.iter(|| {
            black_box(compute_composite_scores(
                black_box(&league.players),
                &ScoreWeights::default(),
            ))
        })
    });
}

fn bench_projection_pass(c: &mut Criterion) {
    let league = sample_league(1);
    let scores = compute_composite_scores(&league.players, &ScoreWeights::default());
    let calendar = FixtureCalendar::build(&league.fixtures);
    c.bench_function("project_all_6gw_window", |b| {
        b.iter(|| {
            black_box(project_all(
                black_box(&league.players),
                &scores,
                &calendar,
                league.current_gameweek,
                league.current_gameweek + 1,
                6,
                &ProjectionParams::default(),
            ))
        })
    });
}

fn bench_transfer_search(c: &mut Criterion) {
    let league = sample_league(1);
    let roster = sample_roster(&league);
    let scores = compute_composite_scores(&league.players, &ScoreWeights::default());
    let calendar = FixtureCalendar::build(&league.fixtures);
    let projections = project_all(
        &league.players,
        &scores,
        &calendar,
        league.current_gameweek,
        league.current_gameweek + 1,
        6,
        &ProjectionParams::default(),
    );
    let opts = OptimizerOptions {
        max_transfers: 3,
        allow_hits: true,
        candidates_per_slot: 5,
        hit_cost: 4.0,
    };
    c.bench_function("transfer_search_3_deep", |b| {
        b.iter(|| {
            black_box(
                recommend_transfers(
                    black_box(&roster),
                    &league.players,
                    &projections,
                    &opts,
                )
                .unwrap(),
            )
        })
    });
}

fn bench_chip_planning(c: &mut Criterion) {
    let league = sample_league(1);
    let roster = sample_roster(&league);
    let scores = compute_composite_scores(&league.players, &ScoreWeights::default());
    let calendar = FixtureCalendar::build(&league.fixtures);
    let squad: Vec<&Player> = league
        .players
        .iter()
        .filter(|p| roster.player_ids.contains(&p.id))
        .collect();
    let opts = ChipPlannerOptions {
        horizon: 25,
        wildcard_run: 6,
        keep: 10,
    };
    c.bench_function("chip_planning_25gw_horizon", |b| {
        b.iter(|| {
            black_box(plan_chips(
                black_box(&ChipBook::new_season()),
                &squad,
                &scores,
                &calendar,
                league.current_gameweek,
                &ProjectionParams::default(),
                &opts,
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_composite_scores,
    bench_projection_pass,
    bench_transfer_search,
    bench_chip_planning
);
criterion_main!(benches);
