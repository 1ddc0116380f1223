use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::monte_carlo::{SimulationRequest, SimulationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub spread: f64,
    pub total: f64,
    pub favorite_is_home: bool,
    pub result: SimulationResult,
    pub pick_text: String,
    pub created_at: String,
}

impl PredictionRecord {
    pub fn new(
        game_id: &str,
        home_team: &str,
        away_team: &str,
        request: &SimulationRequest,
        result: SimulationResult,
    ) -> Self {
        let pick_text = pick_text(home_team, away_team, request, &result);
        Self {
            game_id: game_id.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            spread: request.spread,
            total: request.total,
            favorite_is_home: request.favorite_is_home,
            result,
            pick_text,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

pub fn pick_text(
    home_team: &str,
    away_team: &str,
    request: &SimulationRequest,
    r: &SimulationResult,
) -> String {
    let home_pick = r.home_win_probability >= r.away_win_probability;
    let (winner, loser, win_pct, winner_score, loser_score) = if home_pick {
        (
            home_team,
            away_team,
            r.home_win_probability,
            r.predicted_home_score,
            r.predicted_away_score,
        )
    } else {
        (
            away_team,
            home_team,
            r.away_win_probability,
            r.predicted_away_score,
            r.predicted_home_score,
        )
    };

    let (favorite, underdog) = if request.favorite_is_home {
        (home_team, away_team)
    } else {
        (away_team, home_team)
    };
    let line = request.spread.abs();
    let spread_pick = if r.favorite_cover_probability > r.underdog_cover_probability {
        format!("{favorite} -{line} ({:.1}%)", r.favorite_cover_probability)
    } else {
        format!("{underdog} +{line} ({:.1}%)", r.underdog_cover_probability)
    };
    let total_pick = if r.over_probability > r.under_probability {
        format!("Over {} ({:.1}%)", request.total, r.over_probability)
    } else {
        format!("Under {} ({:.1}%)", request.total, r.under_probability)
    };

    format!(
        "{winner} over {loser} {winner_score}-{loser_score} ({win_pct:.1}% to win). Spread: {spread_pick}. Total: {total_pick}."
    )
}
