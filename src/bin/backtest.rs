use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;

use gridiron_sim::calibration::{self, Metrics};
use gridiron_sim::monte_carlo;
use gridiron_sim::{SimTuning, SimulationRequest, SimulationResult, TeamStatisticalProfile};

const BACKTEST_ITERATIONS: i64 = 2_000;
const SWEEP_MIN: f64 = 0.70;
const SWEEP_MAX: f64 = 0.90;
const SWEEP_STEP: f64 = 0.02;

#[derive(Debug, Deserialize)]
struct HistoricalGame {
    #[serde(default)]
    game_id: Option<String>,
    home: TeamStatisticalProfile,
    away: TeamStatisticalProfile,
    spread: f64,
    total: f64,
    #[serde(default)]
    favorite_is_home: Option<bool>,
    home_score: u32,
    away_score: u32,
}

impl HistoricalGame {
    fn request(&self, iterations: i64) -> SimulationRequest {
        let favorite_is_home = self.favorite_is_home.unwrap_or(self.spread <= 0.0);
        SimulationRequest::new(self.spread, self.total, favorite_is_home).with_iterations(iterations)
    }

    fn favorite_margin(&self, request: &SimulationRequest) -> f64 {
        let margin = self.home_score as f64 - self.away_score as f64;
        if request.favorite_is_home { margin } else { -margin }
    }
}

struct Args {
    path: PathBuf,
    sweep: bool,
    save: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut path = None;
    let mut sweep = false;
    let mut save = None;
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--sweep" => sweep = true,
            "--save" => save = it.next().map(PathBuf::from),
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    Args {
        path: path.unwrap_or_else(|| PathBuf::from("tests/fixtures/backtest_games.json")),
        sweep,
        save,
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = parse_args();
    let raw = fs::read_to_string(&args.path)
        .with_context(|| format!("read backtest games {}", args.path.display()))?;
    let games: Vec<HistoricalGame> =
        serde_json::from_str(&raw).context("parse backtest games")?;

    let iterations = env::var("SIM_ITERATIONS")
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(BACKTEST_ITERATIONS);
    let seed = env::var("SIM_SEED")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let mut tuning = *SimTuning::shared();
    let results = simulate_all(&games, &tuning, iterations, seed)?;
    report(&games, &results, iterations);

    if args.sweep {
        let candidates = sweep_candidates();
        let (_, outcomes) = win_samples(&games, &results);
        let best = calibration::best_by_log_loss(&candidates, &outcomes, |r| {
            let mut t = tuning;
            t.advantage.regression = r;
            match simulate_all(&games, &t, iterations, seed) {
                Ok(results) => win_samples(&games, &results).0,
                Err(err) => {
                    log::warn!("sweep at regression {r:.2} failed: {err}");
                    Vec::new()
                }
            }
        });
        match best {
            Some((r, m)) => {
                println!(
                    "Best regression factor: {r:.2} (log loss {:.4}, brier {:.4})",
                    m.log_loss, m.brier
                );
                tuning.advantage.regression = r;
            }
            None => println!("Sweep produced no usable samples"),
        }
    }

    if let Some(path) = args.save {
        tuning
            .save(&path)
            .with_context(|| format!("save tuning to {}", path.display()))?;
        println!("Saved tuning to {}", path.display());
    }

    Ok(())
}

fn simulate_all(
    games: &[HistoricalGame],
    tuning: &SimTuning,
    iterations: i64,
    seed: u64,
) -> Result<Vec<SimulationResult>> {
    games
        .par_iter()
        .enumerate()
        .map(|(i, g)| {
            let request = g.request(iterations);
            monte_carlo::run_seeded(&g.home, &g.away, &request, tuning, seed.wrapping_add(i as u64))
                .with_context(|| {
                    format!(
                        "simulate {}",
                        g.game_id.as_deref().unwrap_or(&g.home.team)
                    )
                })
        })
        .collect()
}

fn win_samples(games: &[HistoricalGame], results: &[SimulationResult]) -> (Vec<f64>, Vec<bool>) {
    games
        .iter()
        .zip(results)
        .filter(|(g, _)| g.home_score != g.away_score)
        .map(|(g, r)| {
            let decisive = r.home_win_probability + r.away_win_probability;
            let p = if decisive > 0.0 {
                r.home_win_probability / decisive
            } else {
                0.5
            };
            (p, g.home_score > g.away_score)
        })
        .unzip()
}

fn cover_samples(
    games: &[HistoricalGame],
    results: &[SimulationResult],
    iterations: i64,
) -> (Vec<f64>, Vec<bool>) {
    games
        .iter()
        .zip(results)
        .filter_map(|(g, r)| {
            let request = g.request(iterations);
            let margin = g.favorite_margin(&request);
            let line = request.spread.abs();
            if margin == line {
                return None;
            }
            Some((r.favorite_cover_probability / 100.0, margin > line))
        })
        .unzip()
}

fn over_samples(games: &[HistoricalGame], results: &[SimulationResult]) -> (Vec<f64>, Vec<bool>) {
    games
        .iter()
        .zip(results)
        .filter_map(|(g, r)| {
            let total = (g.home_score + g.away_score) as f64;
            if total == g.total {
                return None;
            }
            Some((r.over_probability / 100.0, total > g.total))
        })
        .unzip()
}

fn report(games: &[HistoricalGame], results: &[SimulationResult], iterations: i64) {
    println!("Games: {} ({} iterations each)", games.len(), iterations);

    let (preds, outcomes) = win_samples(games, results);
    print_metrics("Moneyline", &calibration::evaluate_binary(&preds, &outcomes));
    for bin in calibration::calibration_bins(&preds, &outcomes, 10) {
        if bin.count == 0 {
            continue;
        }
        println!(
            "  {:.1}-{:.1}: n={:<4} predicted {:.3} actual {:.3}",
            bin.bucket_start, bin.bucket_end, bin.count, bin.avg_pred, bin.actual_rate
        );
    }

    let (preds, outcomes) = cover_samples(games, results, iterations);
    print_metrics("Spread", &calibration::evaluate_binary(&preds, &outcomes));

    let (preds, outcomes) = over_samples(games, results);
    print_metrics("Total", &calibration::evaluate_binary(&preds, &outcomes));
}

fn print_metrics(label: &str, m: &Metrics) {
    println!(
        "{label}: n={} brier={:.4} log_loss={:.4} accuracy={:.1}%",
        m.samples,
        m.brier,
        m.log_loss,
        m.accuracy * 100.0
    );
}

fn sweep_candidates() -> Vec<f64> {
    let steps = ((SWEEP_MAX - SWEEP_MIN) / SWEEP_STEP).round() as usize;
    (0..=steps)
        .map(|i| SWEEP_MIN + i as f64 * SWEEP_STEP)
        .collect()
}
