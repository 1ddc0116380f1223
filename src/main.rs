use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use gridiron_sim::game::Matchup;
use gridiron_sim::injury::{self, InjuryReport};
use gridiron_sim::monte_carlo::{self, DEFAULT_ITERATIONS};
use gridiron_sim::prediction::PredictionRecord;
use gridiron_sim::{SimTuning, SimulationRequest, TeamStatisticalProfile};

#[derive(Debug, Deserialize)]
struct MatchupFile {
    #[serde(default)]
    game_id: Option<String>,
    home: TeamStatisticalProfile,
    away: TeamStatisticalProfile,
    #[serde(default)]
    home_injuries: Vec<InjuryReport>,
    #[serde(default)]
    away_injuries: Vec<InjuryReport>,
    spread: f64,
    total: f64,
    #[serde(default)]
    favorite_is_home: Option<bool>,
    #[serde(default)]
    iterations: Option<i64>,
    #[serde(default)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/matchup.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read matchup file {}", path.display()))?;
    let file: MatchupFile = serde_json::from_str(&raw)
        .with_context(|| format!("parse matchup file {}", path.display()))?;

    let tuning = *SimTuning::shared();
    tuning.validate().context("tuning rejected")?;

    let home_injuries = summary_for(&file.home.team, &file.home_injuries, &tuning);
    let away_injuries = summary_for(&file.away.team, &file.away_injuries, &tuning);
    let home = injury::adjust(&file.home, home_injuries.as_ref(), &tuning.injury);
    let away = injury::adjust(&file.away, away_injuries.as_ref(), &tuning.injury);

    let scale =
        monte_carlo::injury_variance_scale(home_injuries.as_ref(), away_injuries.as_ref(), &tuning);
    let matchup = Matchup::new(&home, &away, &tuning).with_variance_scale(scale);

    let iterations = file
        .iterations
        .or_else(|| env_parse::<i64>("SIM_ITERATIONS"))
        .unwrap_or(DEFAULT_ITERATIONS);
    let favorite_is_home = file.favorite_is_home.unwrap_or(file.spread <= 0.0);
    let request =
        SimulationRequest::new(file.spread, file.total, favorite_is_home).with_iterations(iterations);

    let seed = file
        .seed
        .or_else(|| env_parse::<u64>("SIM_SEED"))
        .unwrap_or_else(rand::random::<u64>);
    log::info!(
        "simulating {} at {} ({} iterations, seed {seed})",
        away.team,
        home.team,
        request.iterations
    );

    let result = if let Some(ms) = env_parse::<u64>("SIM_DEADLINE_MS") {
        let mut rng = StdRng::seed_from_u64(seed);
        monte_carlo::run_with_deadline(
            &mut rng,
            &matchup,
            &request,
            &tuning,
            Duration::from_millis(ms),
        )?
    } else if env_flag("SIM_PARALLEL") {
        monte_carlo::run_parallel(&matchup, &request, &tuning, seed)?
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        monte_carlo::run_matchup(&mut rng, &matchup, &request, &tuning)?
    };

    let game_id = file
        .game_id
        .unwrap_or_else(|| format!("{}@{}", file.away.team, file.home.team));
    let record = PredictionRecord::new(&game_id, &home.team, &away.team, &request, result);
    log::info!("{}", record.pick_text);

    let json = serde_json::to_string_pretty(&record).context("serialize prediction")?;
    println!("{json}");
    Ok(())
}

fn summary_for(
    team: &str,
    reports: &[InjuryReport],
    tuning: &SimTuning,
) -> Option<injury::InjuryImpactSummary> {
    if reports.is_empty() {
        return None;
    }
    Some(injury::summarize(team, reports, &tuning.injury))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

fn env_flag(key: &str) -> bool {
    matches!(
        env::var(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Ok("1" | "true" | "yes" | "on")
    )
}
