use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::game::{GameScore, Matchup, simulate_game};
use crate::injury::{InjuryImpactSummary, injury_variance_multiplier};
use crate::rng::RandomSource;
use crate::stats::TeamStatisticalProfile;
use crate::tuning::SimTuning;

pub const DEFAULT_ITERATIONS: i64 = 10_000;

const CHUNK_SIZE: usize = 500;
const DEADLINE_CHECK_EVERY: usize = 256;

fn default_iterations() -> i64 {
    DEFAULT_ITERATIONS
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Negative favours the home side.
    pub spread: f64,
    pub total: f64,
    pub favorite_is_home: bool,
    #[serde(default = "default_iterations")]
    pub iterations: i64,
}

impl SimulationRequest {
    pub fn new(spread: f64, total: f64, favorite_is_home: bool) -> Self {
        Self {
            spread,
            total,
            favorite_is_home,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_iterations(mut self, iterations: i64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn iteration_count(&self) -> Result<usize> {
        if self.iterations <= 0 {
            return Err(SimError::InvalidIterations(self.iterations));
        }
        Ok(self.iterations as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub predicted_home_score: u32,
    pub predicted_away_score: u32,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub tie_probability: f64,
    pub favorite_cover_probability: f64,
    pub underdog_cover_probability: f64,
    pub over_probability: f64,
    pub under_probability: f64,
    pub mean_home_score: f64,
    pub mean_away_score: f64,
    pub mean_margin: f64,
    pub mean_total: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    games: usize,
    home_wins: usize,
    away_wins: usize,
    ties: usize,
    covers: usize,
    overs: usize,
    home_sum: f64,
    away_sum: f64,
}

impl Tally {
    fn record(&mut self, score: &GameScore, request: &SimulationRequest) {
        self.games += 1;
        match score.home.cmp(&score.away) {
            std::cmp::Ordering::Greater => self.home_wins += 1,
            std::cmp::Ordering::Less => self.away_wins += 1,
            std::cmp::Ordering::Equal => self.ties += 1,
        }

        let margin = score.margin() as f64;
        let favorite_margin = if request.favorite_is_home { margin } else { -margin };
        if favorite_margin > request.spread.abs() {
            self.covers += 1;
        }
        if score.total() as f64 > request.total {
            self.overs += 1;
        }

        self.home_sum += score.home_points;
        self.away_sum += score.away_points;
    }

    fn merge(mut self, other: Tally) -> Tally {
        self.games += other.games;
        self.home_wins += other.home_wins;
        self.away_wins += other.away_wins;
        self.ties += other.ties;
        self.covers += other.covers;
        self.overs += other.overs;
        self.home_sum += other.home_sum;
        self.away_sum += other.away_sum;
        self
    }

    fn finish(self) -> SimulationResult {
        let n = self.games.max(1) as f64;
        let pct = |count: usize| count as f64 / n * 100.0;

        let mean_home = self.home_sum / n;
        let mean_away = self.away_sum / n;
        let cover = pct(self.covers);
        let over = pct(self.overs);

        SimulationResult {
            predicted_home_score: mean_home.round().max(0.0) as u32,
            predicted_away_score: mean_away.round().max(0.0) as u32,
            home_win_probability: pct(self.home_wins),
            away_win_probability: pct(self.away_wins),
            tie_probability: pct(self.ties),
            favorite_cover_probability: cover,
            underdog_cover_probability: 100.0 - cover,
            over_probability: over,
            under_probability: 100.0 - over,
            mean_home_score: mean_home,
            mean_away_score: mean_away,
            mean_margin: mean_home - mean_away,
            mean_total: mean_home + mean_away,
            iterations: self.games,
        }
    }
}

pub fn run<R: RandomSource + ?Sized>(
    rng: &mut R,
    home: &TeamStatisticalProfile,
    away: &TeamStatisticalProfile,
    request: &SimulationRequest,
    tuning: &SimTuning,
) -> Result<SimulationResult> {
    run_matchup(rng, &Matchup::new(home, away, tuning), request, tuning)
}

pub fn run_seeded(
    home: &TeamStatisticalProfile,
    away: &TeamStatisticalProfile,
    request: &SimulationRequest,
    tuning: &SimTuning,
    seed: u64,
) -> Result<SimulationResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    run(&mut rng, home, away, request, tuning)
}

pub fn run_matchup<R: RandomSource + ?Sized>(
    rng: &mut R,
    matchup: &Matchup<'_>,
    request: &SimulationRequest,
    tuning: &SimTuning,
) -> Result<SimulationResult> {
    let iterations = request.iteration_count()?;
    tuning.validate()?;
    let mut tally = Tally::default();
    for _ in 0..iterations {
        let score = simulate_game(rng, matchup, tuning);
        tally.record(&score, request);
    }
    let result = tally.finish();
    log_result(matchup, &result);
    Ok(result)
}

pub fn run_parallel(
    matchup: &Matchup<'_>,
    request: &SimulationRequest,
    tuning: &SimTuning,
    seed: u64,
) -> Result<SimulationResult> {
    let iterations = request.iteration_count()?;
    tuning.validate()?;
    let chunks = iterations.div_ceil(CHUNK_SIZE);

    let tallies: Vec<Tally> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk as u64));
            let start = chunk * CHUNK_SIZE;
            let len = CHUNK_SIZE.min(iterations - start);
            let mut tally = Tally::default();
            for _ in 0..len {
                let score = simulate_game(&mut rng, matchup, tuning);
                tally.record(&score, request);
            }
            tally
        })
        .collect();

    // Fold in chunk order so float sums are reproducible.
    let result = tallies
        .into_iter()
        .fold(Tally::default(), Tally::merge)
        .finish();
    log_result(matchup, &result);
    Ok(result)
}

pub fn run_with_deadline<R: RandomSource + ?Sized>(
    rng: &mut R,
    matchup: &Matchup<'_>,
    request: &SimulationRequest,
    tuning: &SimTuning,
    budget: Duration,
) -> Result<SimulationResult> {
    let iterations = request.iteration_count()?;
    tuning.validate()?;
    let started = Instant::now();
    let mut tally = Tally::default();
    for i in 0..iterations {
        if i > 0 && i % DEADLINE_CHECK_EVERY == 0 && started.elapsed() >= budget {
            log::warn!(
                "simulation budget of {:?} exhausted after {i}/{iterations} iterations",
                budget
            );
            break;
        }
        let score = simulate_game(rng, matchup, tuning);
        tally.record(&score, request);
    }
    let result = tally.finish();
    log_result(matchup, &result);
    Ok(result)
}

pub fn injury_variance_scale(
    home: Option<&InjuryImpactSummary>,
    away: Option<&InjuryImpactSummary>,
    tuning: &SimTuning,
) -> f64 {
    if !tuning.game.apply_injury_variance {
        return 1.0;
    }
    injury_variance_multiplier(home, &tuning.injury)
        .max(injury_variance_multiplier(away, &tuning.injury))
}

fn log_result(matchup: &Matchup<'_>, r: &SimulationResult) {
    log::debug!(
        "{} vs {}: {}-{} over {} runs, home {:.1}% away {:.1}% tie {:.1}%, cover {:.1}%, over {:.1}%",
        matchup.home.team,
        matchup.away.team,
        r.predicted_home_score,
        r.predicted_away_score,
        r.iterations,
        r.home_win_probability,
        r.away_win_probability,
        r.tie_probability,
        r.favorite_cover_probability,
        r.over_probability,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(home: u32, away: u32) -> GameScore {
        GameScore {
            home,
            away,
            home_points: home as f64,
            away_points: away as f64,
            possessions: 11,
            chaos: None,
        }
    }

    #[test]
    fn rejects_non_positive_iterations() {
        let p = TeamStatisticalProfile::default();
        let tuning = SimTuning::default();
        for n in [0, -5] {
            let req = SimulationRequest::new(-3.0, 44.5, true).with_iterations(n);
            let err = run_seeded(&p, &p, &req, &tuning, 1).unwrap_err();
            assert!(matches!(err, SimError::InvalidIterations(v) if v == n));
            let m = Matchup::new(&p, &p, &tuning);
            assert!(run_parallel(&m, &req, &tuning, 1).is_err());
        }
    }

    #[test]
    fn rejects_invalid_tuning_instead_of_panicking() {
        let p = TeamStatisticalProfile::default();
        let mut tuning = SimTuning::default();
        tuning.game.min_possessions = 16;
        let req = SimulationRequest::new(-3.0, 44.5, true).with_iterations(10);

        let err = run_seeded(&p, &p, &req, &tuning, 1).unwrap_err();
        assert!(matches!(err, SimError::InvalidTuning(_)));

        let m = Matchup::new(&p, &p, &tuning);
        assert!(matches!(
            run_parallel(&m, &req, &tuning, 1),
            Err(SimError::InvalidTuning(_))
        ));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            run_with_deadline(&mut rng, &m, &req, &tuning, Duration::from_secs(1)),
            Err(SimError::InvalidTuning(_))
        ));
    }

    #[test]
    fn cover_requires_strictly_beating_the_spread() {
        let req = SimulationRequest::new(-7.0, 40.0, true);
        let mut t = Tally::default();
        t.record(&score(24, 17), &req); // push on the spread
        t.record(&score(28, 17), &req); // cover
        t.record(&score(17, 20), &req); // loss
        t.record(&score(20, 20), &req); // tie
        let r = t.finish();
        assert_eq!(r.favorite_cover_probability, 25.0);
        assert_eq!(r.underdog_cover_probability, 75.0);
        assert_eq!(r.home_win_probability, 50.0);
        assert_eq!(r.away_win_probability, 25.0);
        assert_eq!(r.tie_probability, 25.0);
        // totals 41, 45, 37, 40 against 40.0
        assert_eq!(r.over_probability, 50.0);
        assert_eq!(r.under_probability, 50.0);
    }

    #[test]
    fn away_favourite_covers_from_its_own_side() {
        let req = SimulationRequest::new(3.5, 44.0, false);
        let mut t = Tally::default();
        t.record(&score(10, 17), &req);
        t.record(&score(17, 14), &req);
        let r = t.finish();
        assert_eq!(r.favorite_cover_probability, 50.0);
    }

    #[test]
    fn means_use_unrounded_points() {
        let req = SimulationRequest::new(-1.0, 40.0, true);
        let mut t = Tally::default();
        let mut a = score(21, 20);
        a.home_points = 20.6;
        let mut b = score(21, 20);
        b.home_points = 21.4;
        b.away_points = 20.0;
        t.record(&a, &req);
        t.record(&b, &req);
        let r = t.finish();
        assert!((r.mean_home_score - 21.0).abs() < 1e-12);
        assert_eq!(r.predicted_home_score, 21);
        assert_eq!(r.iterations, 2);
    }

    #[test]
    fn merge_equals_sequential_recording() {
        let req = SimulationRequest::new(-2.5, 41.0, true);
        let games = [score(20, 17), score(14, 24), score(31, 30), score(10, 10)];
        let mut all = Tally::default();
        for g in &games {
            all.record(g, &req);
        }
        let mut left = Tally::default();
        let mut right = Tally::default();
        for g in &games[..2] {
            left.record(g, &req);
        }
        for g in &games[2..] {
            right.record(g, &req);
        }
        assert_eq!(left.merge(right), all);
    }

    #[test]
    fn injury_variance_is_opt_in() {
        let mut tuning = SimTuning::default();
        let summary = InjuryImpactSummary {
            team: "X".to_string(),
            players: vec![crate::injury::PlayerImpact {
                player_id: "1".to_string(),
                name: String::new(),
                position: crate::injury::Position::Quarterback,
                points: 5.0,
                status_multiplier: 1.0,
            }],
            cluster_multipliers: Default::default(),
        };
        assert_eq!(injury_variance_scale(Some(&summary), None, &tuning), 1.0);
        tuning.game.apply_injury_variance = true;
        assert!((injury_variance_scale(None, Some(&summary), &tuning) - 1.15).abs() < 1e-12);
    }
}
