use serde::{Deserialize, Serialize};

use crate::stats::TeamStatisticalProfile;
use crate::tuning::StrengthTuning;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

// Passing sub-score.
const PASS_YARDS_COEF: f64 = 0.10;
const PASS_YPA_COEF: f64 = 3.0;
const PASS_COMP_PCT_COEF: f64 = 0.30;
const PASS_TD_COEF: f64 = 5.0;
const PASS_INT_COEF: f64 = 5.0;

// Rushing sub-score.
const RUSH_YARDS_COEF: f64 = 0.15;
const RUSH_YPC_COEF: f64 = 5.0;
const RUSH_TD_COEF: f64 = 8.0;

// Overall efficiency sub-score.
const EFF_YPP_COEF: f64 = 5.0;
const EFF_FIRST_DOWN_COEF: f64 = 1.0;
const EFF_THIRD_DOWN_COEF: f64 = 0.40;
const EFF_RED_ZONE_COEF: f64 = 0.30;

// Ball security sub-score.
const TURNOVER_BASE: f64 = 50.0;
const TURNOVER_LOST_COEF: f64 = 8.0;
const FUMBLE_LOST_COEF: f64 = 4.0;
const TURNOVER_DIFF_COEF: f64 = 5.0;

// Defensive sub-scores (amount of erosion from the baseline).
const DEF_PASS_YARDS_COEF: f64 = 0.02;
const DEF_PASS_TD_COEF: f64 = 2.0;
const DEF_INT_COEF: f64 = 15.0;
const DEF_RUSH_YARDS_COEF: f64 = 0.03;
const DEF_RUSH_TD_COEF: f64 = 2.0;
const DEF_FORCED_FUMBLE_COEF: f64 = 15.0;
const DEF_YARDS_COEF: f64 = 0.02;
const DEF_TAKEAWAY_COEF: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthProfile {
    pub offense: f64,
    pub defense: f64,
}

pub fn evaluate(profile: &TeamStatisticalProfile, tuning: &StrengthTuning) -> StrengthProfile {
    StrengthProfile {
        offense: offensive_strength(profile, tuning),
        defense: defensive_strength(profile, tuning),
    }
}

pub fn offensive_strength(p: &TeamStatisticalProfile, t: &StrengthTuning) -> f64 {
    let passing = PASS_YARDS_COEF * p.passing_yards
        + PASS_YPA_COEF * p.yards_per_attempt()
        + PASS_COMP_PCT_COEF * p.completion_pct()
        + PASS_TD_COEF * p.passing_tds
        - PASS_INT_COEF * p.interceptions_thrown;

    let rushing = RUSH_YARDS_COEF * p.rushing_yards
        + RUSH_YPC_COEF * p.yards_per_carry()
        + RUSH_TD_COEF * p.rushing_tds;

    let efficiency = EFF_YPP_COEF * p.offensive_yards_per_play()
        + EFF_FIRST_DOWN_COEF * p.first_downs
        + EFF_THIRD_DOWN_COEF * p.third_down_pct
        + EFF_RED_ZONE_COEF * p.red_zone_pct;

    let ball_security = TURNOVER_BASE - TURNOVER_LOST_COEF * p.turnovers_lost
        - FUMBLE_LOST_COEF * p.fumbles_lost
        + TURNOVER_DIFF_COEF * p.turnover_differential;

    let raw = t.passing_weight * passing
        + t.rushing_weight * rushing
        + t.efficiency_weight * efficiency
        + t.turnover_weight * ball_security
        - t.penalty_yards_coef * p.penalty_yards;

    clamp_score(raw)
}

pub fn defensive_strength(p: &TeamStatisticalProfile, t: &StrengthTuning) -> f64 {
    let pass_def = DEF_PASS_YARDS_COEF * p.opp_passing_yards + DEF_PASS_TD_COEF * p.opp_passing_tds
        - DEF_INT_COEF * p.def_interceptions;

    let rush_def = DEF_RUSH_YARDS_COEF * p.opp_rushing_yards + DEF_RUSH_TD_COEF * p.opp_rushing_tds
        - DEF_FORCED_FUMBLE_COEF * p.forced_fumbles;

    let overall = DEF_YARDS_COEF * p.yards_allowed - DEF_TAKEAWAY_COEF * p.turnovers_forced;

    let raw = t.defense_baseline
        - t.pass_defense_weight * pass_def
        - t.rush_defense_weight * rush_def
        - t.overall_defense_weight * overall
        - t.points_allowed_weight * p.points_allowed;

    clamp_score(raw)
}

fn clamp_score(v: f64) -> f64 {
    if !v.is_finite() {
        return SCORE_MIN;
    }
    v.clamp(SCORE_MIN, SCORE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn league_average() -> TeamStatisticalProfile {
        TeamStatisticalProfile {
            team: "AVG".to_string(),
            passing_yards: 230.0,
            pass_attempts: 33.0,
            completions: 21.5,
            passing_tds: 1.5,
            interceptions_thrown: 0.8,
            rushing_yards: 115.0,
            rush_attempts: 27.0,
            rushing_tds: 0.9,
            yards_per_play: 5.5,
            first_downs: 20.0,
            third_down_pct: 40.0,
            red_zone_pct: 55.0,
            turnovers_lost: 1.3,
            fumbles_lost: 0.5,
            penalty_yards: 50.0,
            points_allowed: 22.0,
            yards_allowed: 345.0,
            opp_passing_yards: 230.0,
            opp_passing_tds: 1.5,
            opp_rushing_yards: 115.0,
            opp_rushing_tds: 0.9,
            def_interceptions: 0.9,
            forced_fumbles: 0.7,
            turnovers_forced: 1.3,
            ..Default::default()
        }
    }

    #[test]
    fn average_team_lands_mid_scale() {
        let t = StrengthTuning::default();
        let s = evaluate(&league_average(), &t);
        assert!(s.offense > 45.0 && s.offense < 70.0, "offense {}", s.offense);
        assert!(s.defense > 30.0 && s.defense < 55.0, "defense {}", s.defense);
    }

    #[test]
    fn empty_profile_is_bounded() {
        let t = StrengthTuning::default();
        let s = evaluate(&TeamStatisticalProfile::default(), &t);
        assert_eq!(s.defense, 50.0);
        assert!((s.offense - 5.0).abs() < 1e-9);
    }

    #[test]
    fn extreme_inputs_clamp_instead_of_failing() {
        let t = StrengthTuning::default();
        let mut p = league_average();
        p.passing_yards = 5_000.0;
        p.points_allowed = 500.0;
        assert_eq!(offensive_strength(&p, &t), 100.0);
        assert_eq!(defensive_strength(&p, &t), 0.0);
    }

    #[test]
    fn takeaways_raise_defense() {
        let t = StrengthTuning::default();
        let base = league_average();
        let ball_hawk = TeamStatisticalProfile {
            def_interceptions: 1.5,
            turnovers_forced: 2.0,
            ..base.clone()
        };
        assert!(defensive_strength(&ball_hawk, &t) > defensive_strength(&base, &t));
    }

    #[test]
    fn penalties_cost_offense() {
        let t = StrengthTuning::default();
        let clean = league_average();
        let sloppy = TeamStatisticalProfile {
            penalty_yards: 90.0,
            ..clean.clone()
        };
        assert!(offensive_strength(&sloppy, &t) < offensive_strength(&clean, &t));
    }
}
