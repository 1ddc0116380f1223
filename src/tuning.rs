use std::env;
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::rng::RandomSource;

const TUNING_PATH_ENV: &str = "SIM_TUNING_PATH";

static SHARED: OnceCell<SimTuning> = OnceCell::new();

/// Closed interval used for multiplicative variance draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.uniform(self.lo, self.hi)
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.lo).min(self.hi)
    }

    fn is_ordered(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo <= self.hi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthTuning {
    pub passing_weight: f64,
    pub rushing_weight: f64,
    pub efficiency_weight: f64,
    pub turnover_weight: f64,
    pub penalty_yards_coef: f64,
    pub defense_baseline: f64,
    pub pass_defense_weight: f64,
    pub rush_defense_weight: f64,
    pub overall_defense_weight: f64,
    pub points_allowed_weight: f64,
}

impl Default for StrengthTuning {
    fn default() -> Self {
        Self {
            passing_weight: 0.4,
            rushing_weight: 0.3,
            efficiency_weight: 0.2,
            turnover_weight: 0.1,
            penalty_yards_coef: 0.05,
            defense_baseline: 50.0,
            pass_defense_weight: 0.4,
            rush_defense_weight: 0.3,
            overall_defense_weight: 0.2,
            points_allowed_weight: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvantageTuning {
    /// Share of the raw ratio kept; the rest regresses to 0.5.
    pub regression: f64,
    pub bounds: Band,
}

impl Default for AdvantageTuning {
    fn default() -> Self {
        Self {
            regression: 0.82,
            bounds: Band::new(0.30, 0.70),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionTuning {
    pub turnover_variance: Band,
    pub efficiency_variance: Band,
    pub efficiency_cap: f64,
    pub advantage_weight: f64,
    pub efficiency_weight: f64,
    pub red_zone_weight: f64,
    pub seasonal_td_weight: f64,
    pub seasonal_td_scale: f64,
    pub td_variance: Band,
    pub field_goal_window: f64,
    pub two_point_rate: f64,
    pub missed_extra_point_rate: f64,
    pub missed_field_goal_rate: f64,
    pub blocked_field_goal_rate: f64,
}

impl Default for PossessionTuning {
    fn default() -> Self {
        Self {
            turnover_variance: Band::new(0.80, 1.20),
            efficiency_variance: Band::new(0.90, 1.10),
            efficiency_cap: 0.85,
            advantage_weight: 0.65,
            efficiency_weight: 0.35,
            red_zone_weight: 0.75,
            seasonal_td_weight: 0.25,
            seasonal_td_scale: 1.2,
            td_variance: Band::new(0.85, 1.15),
            field_goal_window: 35.0,
            two_point_rate: 0.02,
            missed_extra_point_rate: 0.02,
            missed_field_goal_rate: 0.08,
            blocked_field_goal_rate: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub home_drive_weight: f64,
    pub away_drive_weight: f64,
    pub possession_jitter: i32,
    pub min_possessions: u32,
    pub max_possessions: u32,
    pub game_day_variance: f64,
    pub strength_bounds: Band,
    pub home_field_advantage: f64,
    pub home_field_jitter: f64,
    pub chaos_probability: f64,
    pub chaos_bonus: [f64; 2],
    pub apply_injury_variance: bool,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            home_drive_weight: 0.55,
            away_drive_weight: 0.45,
            possession_jitter: 2,
            min_possessions: 8,
            max_possessions: 15,
            game_day_variance: 0.12,
            strength_bounds: Band::new(10.0, 90.0),
            home_field_advantage: 1.025,
            home_field_jitter: 0.025,
            chaos_probability: 0.15,
            chaos_bonus: [2.0, 7.0],
            apply_injury_variance: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjuryTuning {
    pub offense_general_cap: f64,
    pub passing_cap: f64,
    pub rushing_cap: f64,
    pub defense_general_cap: f64,
    pub pass_defense_cap: f64,
    pub run_defense_cap: f64,
    pub third_down_passthrough: f64,
    pub red_zone_passthrough: f64,
    pub drives_passthrough: f64,
    pub takeaway_passthrough: f64,
    pub variance_per_point: f64,
    pub variance_per_cluster: f64,
    pub variance_ceiling: f64,
    pub cluster_step: f64,
    pub cluster_ceiling: f64,
}

impl Default for InjuryTuning {
    fn default() -> Self {
        Self {
            offense_general_cap: 0.5,
            passing_cap: 0.6,
            rushing_cap: 0.5,
            defense_general_cap: 0.4,
            pass_defense_cap: 0.5,
            run_defense_cap: 0.4,
            third_down_passthrough: 0.8,
            red_zone_passthrough: 0.75,
            drives_passthrough: 0.7,
            takeaway_passthrough: 0.75,
            variance_per_point: 0.03,
            variance_per_cluster: 0.1,
            variance_ceiling: 1.5,
            cluster_step: 0.15,
            cluster_ceiling: 1.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTuning {
    pub strength: StrengthTuning,
    pub advantage: AdvantageTuning,
    pub possession: PossessionTuning,
    pub game: GameTuning,
    pub injury: InjuryTuning,
}

impl SimTuning {
    pub fn shared() -> &'static SimTuning {
        SHARED.get_or_init(|| {
            let Ok(path) = env::var(TUNING_PATH_ENV) else {
                return SimTuning::default();
            };
            match SimTuning::load(&path) {
                Ok(tuning) => tuning,
                Err(err) => {
                    log::warn!("ignoring tuning file {path}: {err}");
                    SimTuning::default()
                }
            }
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let tuning: SimTuning = serde_json::from_str(&raw)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.possession;
        if p.advantage_weight < 0.0 || p.efficiency_weight < 0.0 {
            return Err(invalid("scoring blend weights must be non-negative"));
        }
        if p.advantage_weight + p.efficiency_weight > 1.0 + 1e-9 {
            return Err(invalid("advantage and efficiency weights must sum to at most 1"));
        }
        if p.advantage_weight < p.efficiency_weight {
            return Err(invalid("advantage weight must not be below efficiency weight"));
        }
        for (name, band) in [
            ("turnover_variance", p.turnover_variance),
            ("efficiency_variance", p.efficiency_variance),
            ("td_variance", p.td_variance),
            ("advantage.bounds", self.advantage.bounds),
            ("game.strength_bounds", self.game.strength_bounds),
        ] {
            if !band.is_ordered() {
                return Err(invalid(&format!("{name} band is not ordered")));
            }
        }
        let rates = [
            p.two_point_rate,
            p.missed_extra_point_rate,
            p.missed_field_goal_rate,
            p.blocked_field_goal_rate,
            self.game.chaos_probability,
            self.advantage.regression,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(invalid("rates and regression factor must lie in [0, 1]"));
        }
        if p.two_point_rate + p.missed_extra_point_rate > 1.0
            || p.missed_field_goal_rate + p.blocked_field_goal_rate > 1.0
        {
            return Err(invalid("kick outcome rates exceed 1"));
        }
        let g = &self.game;
        if g.min_possessions == 0 || g.min_possessions > g.max_possessions {
            return Err(invalid("possession band must be non-empty and positive"));
        }
        if g.possession_jitter < 0 || g.game_day_variance < 0.0 || g.home_field_jitter < 0.0 {
            return Err(invalid("jitter and variance must be non-negative"));
        }
        self.injury.validate()
    }
}

impl InjuryTuning {
    pub fn validate(&self) -> Result<()> {
        let caps = [
            self.offense_general_cap,
            self.passing_cap,
            self.rushing_cap,
            self.defense_general_cap,
            self.pass_defense_cap,
            self.run_defense_cap,
        ];
        if caps.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(invalid("injury caps must lie in [0, 1]"));
        }
        let passthrough = [
            self.third_down_passthrough,
            self.red_zone_passthrough,
            self.drives_passthrough,
            self.takeaway_passthrough,
        ];
        if passthrough.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(invalid("injury pass-through factors must lie in [0, 1]"));
        }
        let non_negative = [self.variance_per_point, self.variance_per_cluster, self.cluster_step];
        if non_negative.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid("injury variance steps must be non-negative"));
        }
        if !(self.variance_ceiling >= 1.0 && self.cluster_ceiling >= 1.0) {
            return Err(invalid("injury ceilings must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> SimError {
    SimError::InvalidTuning(msg.to_string())
}
