use serde::{Deserialize, Serialize};

use crate::advantage::advantage;
use crate::possession::simulate_possession;
use crate::rng::RandomSource;
use crate::stats::TeamStatisticalProfile;
use crate::strength::{StrengthProfile, evaluate};
use crate::tuning::{GameTuning, SimTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaosEvent {
    pub side: TeamSide,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub home: u32,
    pub away: u32,
    /// Unrounded totals, home already scaled by the home-field multiplier.
    pub home_points: f64,
    pub away_points: f64,
    pub possessions: u32,
    pub chaos: Option<ChaosEvent>,
}

impl GameScore {
    pub fn margin(&self) -> i64 {
        self.home as i64 - self.away as i64
    }

    pub fn total(&self) -> u32 {
        self.home + self.away
    }
}

#[derive(Debug, Clone)]
pub struct Matchup<'a> {
    pub home: &'a TeamStatisticalProfile,
    pub away: &'a TeamStatisticalProfile,
    pub home_strength: StrengthProfile,
    pub away_strength: StrengthProfile,
    pub variance_scale: f64,
}

impl<'a> Matchup<'a> {
    pub fn new(
        home: &'a TeamStatisticalProfile,
        away: &'a TeamStatisticalProfile,
        tuning: &SimTuning,
    ) -> Self {
        Self {
            home,
            away,
            home_strength: evaluate(home, &tuning.strength),
            away_strength: evaluate(away, &tuning.strength),
            variance_scale: 1.0,
        }
    }

    pub fn with_variance_scale(mut self, scale: f64) -> Self {
        self.variance_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
        self
    }
}

pub fn simulate_one_game<R: RandomSource + ?Sized>(
    rng: &mut R,
    home: &TeamStatisticalProfile,
    away: &TeamStatisticalProfile,
    tuning: &SimTuning,
) -> GameScore {
    simulate_game(rng, &Matchup::new(home, away, tuning), tuning)
}

pub fn simulate_game<R: RandomSource + ?Sized>(
    rng: &mut R,
    matchup: &Matchup<'_>,
    tuning: &SimTuning,
) -> GameScore {
    let g = &tuning.game;
    let possessions = possession_count(rng, matchup.home, matchup.away, g);

    let swing = g.game_day_variance * matchup.variance_scale;
    let home_off = game_day_strength(rng, matchup.home_strength.offense, swing, g);
    let away_off = game_day_strength(rng, matchup.away_strength.offense, swing, g);
    let home_def = game_day_strength(rng, matchup.home_strength.defense, swing, g);
    let away_def = game_day_strength(rng, matchup.away_strength.defense, swing, g);

    let home_field = home_field_multiplier(rng, g);

    let home_adv = advantage(home_off, away_def, &tuning.advantage);
    let away_adv = advantage(away_off, home_def, &tuning.advantage);

    let mut home_points = 0.0;
    for _ in 0..possessions {
        let outcome =
            simulate_possession(rng, matchup.home, matchup.away, home_adv, &tuning.possession);
        home_points += outcome.points() as f64 * home_field;
    }

    let mut away_points = 0.0;
    for _ in 0..possessions {
        let outcome =
            simulate_possession(rng, matchup.away, matchup.home, away_adv, &tuning.possession);
        away_points += outcome.points() as f64;
    }

    let chaos = chaos_event(rng, g);
    if let Some(event) = chaos {
        match event.side {
            TeamSide::Home => home_points += event.points,
            TeamSide::Away => away_points += event.points,
        }
    }

    GameScore {
        home: home_points.round().max(0.0) as u32,
        away: away_points.round().max(0.0) as u32,
        home_points,
        away_points,
        possessions,
        chaos,
    }
}

pub fn possession_count<R: RandomSource + ?Sized>(
    rng: &mut R,
    home: &TeamStatisticalProfile,
    away: &TeamStatisticalProfile,
    g: &GameTuning,
) -> u32 {
    let base = g.home_drive_weight * home.drives_per_game + g.away_drive_weight * away.drives_per_game;
    let base = if base.is_finite() { base.round() as i64 } else { 0 };
    let jitter = rng.int_inclusive(-g.possession_jitter, g.possession_jitter) as i64;
    (base + jitter).clamp(g.min_possessions as i64, g.max_possessions as i64) as u32
}

pub fn game_day_strength<R: RandomSource + ?Sized>(
    rng: &mut R,
    base: f64,
    swing: f64,
    g: &GameTuning,
) -> f64 {
    let varied = base + base * rng.signed_unit() * swing;
    g.strength_bounds.clamp(varied)
}

pub fn home_field_multiplier<R: RandomSource + ?Sized>(rng: &mut R, g: &GameTuning) -> f64 {
    g.home_field_advantage * (1.0 + rng.signed_unit() * g.home_field_jitter)
}

fn chaos_event<R: RandomSource + ?Sized>(rng: &mut R, g: &GameTuning) -> Option<ChaosEvent> {
    if !rng.chance(g.chaos_probability) {
        return None;
    }
    let points = if rng.chance(0.5) {
        g.chaos_bonus[0]
    } else {
        g.chaos_bonus[1]
    };
    let side = if rng.chance(0.5) {
        TeamSide::Home
    } else {
        TeamSide::Away
    };
    Some(ChaosEvent { side, points })
}
