use serde::{Deserialize, Serialize};

use crate::advantage::advantage;
use crate::rng::RandomSource;
use crate::stats::{TeamStatisticalProfile, safe_div};
use crate::strength::{defensive_strength, offensive_strength};
use crate::tuning::{PossessionTuning, SimTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PossessionOutcome {
    Turnover,
    Stall,
    Touchdown,
    TouchdownTwoPoint,
    TouchdownMissedExtraPoint,
    FieldGoal,
    MissedFieldGoal,
    BlockedFieldGoal,
    NoScore,
}

impl PossessionOutcome {
    pub fn points(self) -> u32 {
        match self {
            PossessionOutcome::TouchdownTwoPoint => 8,
            PossessionOutcome::Touchdown => 7,
            PossessionOutcome::TouchdownMissedExtraPoint => 6,
            PossessionOutcome::FieldGoal => 3,
            PossessionOutcome::Turnover
            | PossessionOutcome::Stall
            | PossessionOutcome::MissedFieldGoal
            | PossessionOutcome::BlockedFieldGoal
            | PossessionOutcome::NoScore => 0,
        }
    }
}

pub fn simulate_one_possession<R: RandomSource + ?Sized>(
    rng: &mut R,
    offense: &TeamStatisticalProfile,
    defense: &TeamStatisticalProfile,
    tuning: &SimTuning,
) -> u32 {
    let adv = advantage(
        offensive_strength(offense, &tuning.strength),
        defensive_strength(defense, &tuning.strength),
        &tuning.advantage,
    );
    simulate_possession(rng, offense, defense, adv, &tuning.possession).points()
}

pub fn simulate_possession<R: RandomSource + ?Sized>(
    rng: &mut R,
    offense: &TeamStatisticalProfile,
    defense: &TeamStatisticalProfile,
    adv: f64,
    t: &PossessionTuning,
) -> PossessionOutcome {
    let turnover_rate = turnover_rate(offense, defense) * t.turnover_variance.draw(rng);
    if rng.next_f64() < turnover_rate {
        return PossessionOutcome::Turnover;
    }

    let efficiency = (efficiency(offense, defense) * t.efficiency_variance.draw(rng))
        .min(t.efficiency_cap);
    let scoring = t.advantage_weight * adv + t.efficiency_weight * efficiency;
    if rng.next_f64() > scoring {
        return PossessionOutcome::Stall;
    }

    let td_prob = touchdown_probability(offense, t) * t.td_variance.draw(rng);
    let roll = rng.uniform(0.0, 100.0);
    if roll < td_prob {
        let conversion = rng.next_f64();
        return if conversion < t.two_point_rate {
            PossessionOutcome::TouchdownTwoPoint
        } else if conversion < t.two_point_rate + t.missed_extra_point_rate {
            PossessionOutcome::TouchdownMissedExtraPoint
        } else {
            PossessionOutcome::Touchdown
        };
    }

    if roll < td_prob + t.field_goal_window {
        let kick = rng.next_f64();
        return if kick < t.missed_field_goal_rate {
            PossessionOutcome::MissedFieldGoal
        } else if kick < t.missed_field_goal_rate + t.blocked_field_goal_rate {
            PossessionOutcome::BlockedFieldGoal
        } else {
            PossessionOutcome::FieldGoal
        };
    }

    PossessionOutcome::NoScore
}

pub fn turnover_rate(offense: &TeamStatisticalProfile, defense: &TeamStatisticalProfile) -> f64 {
    let giveaways = safe_div(offense.turnovers_lost, offense.offensive_plays());
    let takeaways = safe_div(defense.turnovers_forced, defense.defensive_plays());
    (giveaways + takeaways) / 2.0
}

pub fn efficiency(offense: &TeamStatisticalProfile, defense: &TeamStatisticalProfile) -> f64 {
    let off_ypp = offense.offensive_yards_per_play();
    let def_ypp = defense.defensive_yards_per_play();
    safe_div(off_ypp, off_ypp + def_ypp)
}

pub fn touchdown_probability(offense: &TeamStatisticalProfile, t: &PossessionTuning) -> f64 {
    let seasonal =
        safe_div(offense.offensive_tds(), offense.drives_per_game) * 100.0 * t.seasonal_td_scale;
    t.red_zone_weight * offense.red_zone_pct + t.seasonal_td_weight * seasonal
}
