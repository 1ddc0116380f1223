use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::hint::black_box;

use gridiron_sim::game::{Matchup, simulate_game};
use gridiron_sim::monte_carlo::{run_parallel, run_seeded};
use gridiron_sim::strength::evaluate;
use gridiron_sim::{SimTuning, SimulationRequest, TeamStatisticalProfile};

#[derive(Deserialize)]
struct Teams {
    home: TeamStatisticalProfile,
    away: TeamStatisticalProfile,
}

fn teams() -> Teams {
    serde_json::from_str(MATCHUP_JSON).expect("valid fixture json")
}

fn bench_profile_parse(c: &mut Criterion) {
    c.bench_function("profile_parse", |b| {
        b.iter(|| {
            let t: Teams = serde_json::from_str(black_box(MATCHUP_JSON)).unwrap();
            black_box(t.home.passing_yards);
        })
    });
}

fn bench_strength_evaluate(c: &mut Criterion) {
    let t = teams();
    let tuning = SimTuning::default();
    c.bench_function("strength_evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box(&t.home), &tuning.strength)))
    });
}

fn bench_single_game(c: &mut Criterion) {
    let t = teams();
    let tuning = SimTuning::default();
    let matchup = Matchup::new(&t.home, &t.away, &tuning);
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("single_game", |b| {
        b.iter(|| black_box(simulate_game(&mut rng, &matchup, &tuning)))
    });
}

fn bench_run_seeded_10k(c: &mut Criterion) {
    let t = teams();
    let tuning = SimTuning::default();
    let req = SimulationRequest::new(-8.5, 41.5, true);
    let mut group = c.benchmark_group("simulation_10k");
    group.sample_size(20);
    group.bench_function("sequential", |b| {
        b.iter(|| run_seeded(&t.home, &t.away, black_box(&req), &tuning, 7).unwrap())
    });
    let matchup = Matchup::new(&t.home, &t.away, &tuning);
    group.bench_function("parallel", |b| {
        b.iter(|| run_parallel(&matchup, black_box(&req), &tuning, 7).unwrap())
    });
    group.finish();
}

criterion_group!(
    perf,
    bench_profile_parse,
    bench_strength_evaluate,
    bench_single_game,
    bench_run_seeded_10k,
);
criterion_main!(perf);

static MATCHUP_JSON: &str = include_str!("../tests/fixtures/matchup.json");
