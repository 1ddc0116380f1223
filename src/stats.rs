use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let q = num / den;
    if q.is_finite() { q } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamStatisticalProfile {
    pub team: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub games_played: f64,

    // Offense.
    #[serde(deserialize_with = "lenient_f64")]
    pub total_yards: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub points_per_game: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub third_down_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub red_zone_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub passing_yards: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub pass_attempts: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub completions: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub passing_tds: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub interceptions_thrown: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub rushing_yards: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub rush_attempts: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub rushing_tds: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub first_downs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_plays: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub yards_per_play: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub turnovers_lost: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fumbles_lost: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub turnover_differential: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub penalties: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub penalty_yards: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub drives_per_game: f64,

    // Defense.
    #[serde(deserialize_with = "lenient_f64")]
    pub points_allowed: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub yards_allowed: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub opp_passing_yards: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub opp_passing_tds: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub opp_rushing_yards: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub opp_rushing_tds: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub opp_total_plays: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub yards_per_play_allowed: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub def_interceptions: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub forced_fumbles: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub turnovers_forced: f64,
}

impl TeamStatisticalProfile {
    pub fn yards_per_attempt(&self) -> f64 {
        safe_div(self.passing_yards, self.pass_attempts)
    }

    pub fn completion_pct(&self) -> f64 {
        safe_div(self.completions, self.pass_attempts) * 100.0
    }

    pub fn yards_per_carry(&self) -> f64 {
        safe_div(self.rushing_yards, self.rush_attempts)
    }

    pub fn offensive_plays(&self) -> f64 {
        if self.total_plays > 0.0 {
            self.total_plays
        } else {
            self.pass_attempts + self.rush_attempts
        }
    }

    pub fn offensive_yards_per_play(&self) -> f64 {
        if self.yards_per_play > 0.0 {
            self.yards_per_play
        } else {
            safe_div(self.total_yards, self.offensive_plays())
        }
    }

    pub fn defensive_plays(&self) -> f64 {
        if self.opp_total_plays > 0.0 {
            self.opp_total_plays
        } else {
            self.offensive_plays()
        }
    }

    pub fn defensive_yards_per_play(&self) -> f64 {
        if self.yards_per_play_allowed > 0.0 {
            self.yards_per_play_allowed
        } else {
            safe_div(self.yards_allowed, self.defensive_plays())
        }
    }

    pub fn offensive_tds(&self) -> f64 {
        self.passing_tds + self.rushing_tds
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

fn value_to_f64(value: &Value) -> f64 {
    let v = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_stat_cell(s).unwrap_or(0.0),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    if v.is_finite() { v } else { 0.0 }
}

/// Parses spreadsheet-style cells such as `"58%"`, `"1,234"` or `"-"`.
pub fn parse_stat_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let s = s.trim_end_matches('%').replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_guards_zero_and_non_finite() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(f64::MAX, f64::MIN_POSITIVE), 0.0);
        assert_eq!(safe_div(9.0, 3.0), 3.0);
    }

    #[test]
    fn parse_stat_cell_handles_percent_and_numbers() {
        assert_eq!(parse_stat_cell("58%").unwrap(), 58.0);
        assert_eq!(parse_stat_cell("1,234.5").unwrap(), 1234.5);
        assert_eq!(parse_stat_cell(" 14 ").unwrap(), 14.0);
        assert!(parse_stat_cell("-").is_none());
        assert!(parse_stat_cell("n/a").is_none());
        assert!(parse_stat_cell("NaN").is_none());
    }

    #[test]
    fn missing_and_garbage_fields_default_to_zero() {
        let raw = r#"{
            "team": "KC",
            "passing_yards": "251.3",
            "third_down_pct": "44%",
            "rushing_yards": null,
            "red_zone_pct": "unknown",
            "pass_attempts": 35
        }"#;
        let p: TeamStatisticalProfile = serde_json::from_str(raw).expect("profile parses");
        assert_eq!(p.team, "KC");
        assert_eq!(p.passing_yards, 251.3);
        assert_eq!(p.third_down_pct, 44.0);
        assert_eq!(p.rushing_yards, 0.0);
        assert_eq!(p.red_zone_pct, 0.0);
        assert_eq!(p.turnovers_lost, 0.0);
        assert!((p.yards_per_attempt() - 251.3 / 35.0).abs() < 1e-12);
    }

    #[test]
    fn derived_rates_are_zero_without_volume() {
        let p = TeamStatisticalProfile::default();
        assert_eq!(p.yards_per_attempt(), 0.0);
        assert_eq!(p.completion_pct(), 0.0);
        assert_eq!(p.yards_per_carry(), 0.0);
        assert_eq!(p.offensive_yards_per_play(), 0.0);
        assert_eq!(p.defensive_yards_per_play(), 0.0);
    }

    #[test]
    fn stored_yards_per_play_wins_over_derived() {
        let p = TeamStatisticalProfile {
            total_yards: 300.0,
            total_plays: 60.0,
            yards_per_play: 5.8,
            ..Default::default()
        };
        assert_eq!(p.offensive_yards_per_play(), 5.8);
        let derived = TeamStatisticalProfile {
            yards_per_play: 0.0,
            ..p
        };
        assert_eq!(derived.offensive_yards_per_play(), 5.0);
    }
}
