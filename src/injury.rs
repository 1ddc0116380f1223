use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stats::TeamStatisticalProfile;
use crate::tuning::InjuryTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Offense,
    Defense,
    SpecialTeams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionGroup {
    Quarterback,
    Backfield,
    Receivers,
    OffensiveLine,
    DefensiveLine,
    Linebackers,
    Secondary,
    Specialists,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Quarterback,
    RunningBack,
    Fullback,
    WideReceiver,
    TightEnd,
    OffensiveLine,
    DefensiveLine,
    Linebacker,
    Cornerback,
    Safety,
    Kicker,
    Punter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ChannelWeights {
    general: f64,
    passing: f64,
    rushing: f64,
}

const fn w(general: f64, passing: f64, rushing: f64) -> ChannelWeights {
    ChannelWeights {
        general,
        passing,
        rushing,
    }
}

impl Position {
    pub fn parse(raw: &str) -> Position {
        match raw.trim().to_ascii_uppercase().as_str() {
            "QB" => Position::Quarterback,
            "RB" | "HB" => Position::RunningBack,
            "FB" => Position::Fullback,
            "WR" => Position::WideReceiver,
            "TE" => Position::TightEnd,
            "OL" | "OT" | "OG" | "LT" | "LG" | "C" | "RG" | "RT" | "T" | "G" => {
                Position::OffensiveLine
            }
            "DL" | "DE" | "DT" | "NT" | "EDGE" => Position::DefensiveLine,
            "LB" | "ILB" | "OLB" | "MLB" => Position::Linebacker,
            "CB" | "DB" | "NB" => Position::Cornerback,
            "S" | "FS" | "SS" | "SAF" => Position::Safety,
            "K" | "PK" => Position::Kicker,
            "P" => Position::Punter,
            _ => Position::Other,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::Fullback => "FB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::OffensiveLine => "OL",
            Position::DefensiveLine => "DL",
            Position::Linebacker => "LB",
            Position::Cornerback => "CB",
            Position::Safety => "S",
            Position::Kicker => "K",
            Position::Punter => "P",
            Position::Other => "OTHER",
        }
    }

    pub fn side(self) -> Side {
        match self {
            Position::Quarterback
            | Position::RunningBack
            | Position::Fullback
            | Position::WideReceiver
            | Position::TightEnd
            | Position::OffensiveLine => Side::Offense,
            Position::DefensiveLine
            | Position::Linebacker
            | Position::Cornerback
            | Position::Safety => Side::Defense,
            Position::Kicker | Position::Punter | Position::Other => Side::SpecialTeams,
        }
    }

    pub fn group(self) -> PositionGroup {
        match self {
            Position::Quarterback => PositionGroup::Quarterback,
            Position::RunningBack | Position::Fullback => PositionGroup::Backfield,
            Position::WideReceiver | Position::TightEnd => PositionGroup::Receivers,
            Position::OffensiveLine => PositionGroup::OffensiveLine,
            Position::DefensiveLine => PositionGroup::DefensiveLine,
            Position::Linebacker => PositionGroup::Linebackers,
            Position::Cornerback | Position::Safety => PositionGroup::Secondary,
            Position::Kicker | Position::Punter => PositionGroup::Specialists,
            Position::Other => PositionGroup::Unknown,
        }
    }

    fn weights(self) -> ChannelWeights {
        match self {
            Position::Quarterback => w(0.040, 0.060, 0.015),
            Position::RunningBack => w(0.020, 0.005, 0.045),
            Position::Fullback => w(0.010, 0.000, 0.020),
            Position::WideReceiver => w(0.020, 0.035, 0.005),
            Position::TightEnd => w(0.015, 0.020, 0.015),
            Position::OffensiveLine => w(0.015, 0.020, 0.025),
            Position::DefensiveLine => w(0.020, 0.015, 0.035),
            Position::Linebacker => w(0.020, 0.020, 0.030),
            Position::Cornerback => w(0.020, 0.040, 0.005),
            Position::Safety => w(0.020, 0.030, 0.015),
            Position::Kicker | Position::Punter | Position::Other => w(0.0, 0.0, 0.0),
        }
    }
}

impl From<String> for Position {
    fn from(raw: String) -> Self {
        Position::parse(&raw)
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.abbreviation().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerImpact {
    pub player_id: String,
    #[serde(default)]
    pub name: String,
    pub position: Position,
    pub points: f64,
    /// 0.0 (playing normally) to 1.0 (ruled out).
    pub status_multiplier: f64,
}

impl PlayerImpact {
    pub fn effective_points(&self) -> f64 {
        self.points * self.status_multiplier.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InjuryImpactSummary {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub players: Vec<PlayerImpact>,
    /// Present only for groups with two or more injuries; always >= 1.0.
    #[serde(default)]
    pub cluster_multipliers: BTreeMap<PositionGroup, f64>,
}

impl InjuryImpactSummary {
    pub fn total_impact_points(&self) -> f64 {
        self.players
            .iter()
            .map(|p| p.effective_points().max(0.0))
            .sum::<f64>()
            .max(0.0)
    }

    pub fn cluster_multiplier(&self, group: PositionGroup) -> f64 {
        self.cluster_multipliers
            .get(&group)
            .copied()
            .unwrap_or(1.0)
            .max(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.total_impact_points() <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub player_id: String,
    #[serde(default)]
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub practice: String,
    pub impact_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Out,
    Doubtful,
    Questionable,
    Probable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Practice {
    DidNotParticipate,
    Limited,
    Full,
}

impl GameStatus {
    pub fn parse(raw: &str) -> Option<GameStatus> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "out" | "o" | "ir" | "injured reserve" | "pup" | "suspended" => Some(GameStatus::Out),
            "doubtful" | "d" => Some(GameStatus::Doubtful),
            "questionable" | "q" => Some(GameStatus::Questionable),
            "probable" | "p" | "active" => Some(GameStatus::Probable),
            _ => None,
        }
    }
}

impl Practice {
    pub fn parse(raw: &str) -> Option<Practice> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dnp" | "did not participate" | "out" => Some(Practice::DidNotParticipate),
            "limited" | "lp" | "limited participation" => Some(Practice::Limited),
            "full" | "fp" | "full participation" => Some(Practice::Full),
            _ => None,
        }
    }
}

pub fn status_multiplier(status: Option<GameStatus>, practice: Option<Practice>) -> f64 {
    match status {
        Some(GameStatus::Out) => 1.0,
        Some(GameStatus::Doubtful) => 0.8,
        Some(GameStatus::Questionable) => match practice {
            Some(Practice::DidNotParticipate) => 0.65,
            Some(Practice::Limited) => 0.45,
            Some(Practice::Full) => 0.25,
            None => 0.5,
        },
        Some(GameStatus::Probable) | None => match practice {
            Some(Practice::DidNotParticipate) => 0.35,
            Some(Practice::Limited) => 0.15,
            Some(Practice::Full) | None => 0.0,
        },
    }
}

pub fn summarize(team: &str, reports: &[InjuryReport], tuning: &InjuryTuning) -> InjuryImpactSummary {
    let players: Vec<PlayerImpact> = reports
        .iter()
        .map(|r| PlayerImpact {
            player_id: r.player_id.clone(),
            name: r.name.clone(),
            position: r.position,
            points: if r.impact_points.is_finite() {
                r.impact_points
            } else {
                0.0
            },
            status_multiplier: status_multiplier(
                GameStatus::parse(&r.status),
                Practice::parse(&r.practice),
            ),
        })
        .collect();

    let mut counts: BTreeMap<PositionGroup, u32> = BTreeMap::new();
    for p in &players {
        if p.effective_points() > 0.0 {
            *counts.entry(p.position.group()).or_insert(0) += 1;
        }
    }

    let cluster_multipliers = counts
        .into_iter()
        .filter(|(group, n)| *n >= 2 && *group != PositionGroup::Unknown)
        .map(|(group, n)| {
            let m = 1.0 + tuning.cluster_step * (n - 1) as f64;
            (group, m.clamp(1.0, tuning.cluster_ceiling.max(1.0)))
        })
        .collect();

    InjuryImpactSummary {
        team: team.to_string(),
        players,
        cluster_multipliers,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideReduction {
    pub general: f64,
    pub passing: f64,
    pub rushing: f64,
}

pub fn side_reductions(
    summary: &InjuryImpactSummary,
    tuning: &InjuryTuning,
) -> (SideReduction, SideReduction) {
    let mut off = SideReduction::default();
    let mut def = SideReduction::default();

    for p in &summary.players {
        let pts = p.effective_points() * summary.cluster_multiplier(p.position.group());
        let cw = p.position.weights();
        let bucket = match p.position.side() {
            Side::Offense => &mut off,
            Side::Defense => &mut def,
            Side::SpecialTeams => continue,
        };
        bucket.general += pts * cw.general;
        bucket.passing += pts * cw.passing;
        bucket.rushing += pts * cw.rushing;
    }

    let off = SideReduction {
        general: off.general.clamp(0.0, tuning.offense_general_cap.max(0.0)),
        passing: off.passing.clamp(0.0, tuning.passing_cap.max(0.0)),
        rushing: off.rushing.clamp(0.0, tuning.rushing_cap.max(0.0)),
    };
    let def = SideReduction {
        general: def.general.clamp(0.0, tuning.defense_general_cap.max(0.0)),
        passing: def.passing.clamp(0.0, tuning.pass_defense_cap.max(0.0)),
        rushing: def.rushing.clamp(0.0, tuning.run_defense_cap.max(0.0)),
    };
    (off, def)
}

pub fn adjust(
    profile: &TeamStatisticalProfile,
    summary: Option<&InjuryImpactSummary>,
    tuning: &InjuryTuning,
) -> TeamStatisticalProfile {
    let Some(summary) = summary else {
        return profile.clone();
    };
    if summary.is_empty() {
        return profile.clone();
    }

    let (off, def) = side_reductions(summary, tuning);
    let mut out = profile.clone();
    degrade_offense(&mut out, off, tuning);
    degrade_defense(&mut out, def, tuning);

    log::debug!(
        "injury adjust {}: {:.1} pts, offense -{:.0}%/-{:.0}%/-{:.0}%, defense +{:.0}%/+{:.0}%/+{:.0}%",
        profile.team,
        summary.total_impact_points(),
        off.general * 100.0,
        off.passing * 100.0,
        off.rushing * 100.0,
        def.general * 100.0,
        def.passing * 100.0,
        def.rushing * 100.0,
    );
    out
}

fn degrade_offense(p: &mut TeamStatisticalProfile, r: SideReduction, t: &InjuryTuning) {
    let general = 1.0 - r.general;
    let passing = 1.0 - r.passing;
    let rushing = 1.0 - r.rushing;

    p.passing_yards *= passing;
    p.completions *= passing;
    p.passing_tds *= passing;

    p.rushing_yards *= rushing;
    p.rushing_tds *= rushing;

    p.total_yards *= general;
    p.points_per_game *= general;
    p.yards_per_play *= general;
    p.first_downs *= general;

    p.third_down_pct *= 1.0 - r.general * t.third_down_passthrough;
    p.red_zone_pct *= 1.0 - r.general * t.red_zone_passthrough;
    p.drives_per_game *= 1.0 - r.general * t.drives_passthrough;
}

fn degrade_defense(p: &mut TeamStatisticalProfile, r: SideReduction, t: &InjuryTuning) {
    let general = 1.0 + r.general;
    let pass_def = 1.0 + r.passing;
    let run_def = 1.0 + r.rushing;

    p.opp_passing_yards *= pass_def;
    p.opp_passing_tds *= pass_def;

    p.opp_rushing_yards *= run_def;
    p.opp_rushing_tds *= run_def;

    p.yards_allowed *= general;
    p.points_allowed *= general;
    p.yards_per_play_allowed *= general;

    let takeaways = 1.0 - r.general * t.takeaway_passthrough;
    p.def_interceptions *= takeaways;
    p.forced_fumbles *= takeaways;
    p.turnovers_forced *= takeaways;
}

pub fn injury_variance_multiplier(summary: Option<&InjuryImpactSummary>, tuning: &InjuryTuning) -> f64 {
    let Some(summary) = summary else {
        return 1.0;
    };
    let raw = 1.0
        + tuning.variance_per_point * summary.total_impact_points()
        + tuning.variance_per_cluster * summary.cluster_multipliers.len() as f64;
    raw.clamp(1.0, tuning.variance_ceiling.max(1.0))
}
