use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gridiron_sim::advantage::advantage;
use gridiron_sim::strength::evaluate;
use gridiron_sim::{SimTuning, TeamStatisticalProfile};

fn random_profile(rng: &mut StdRng) -> TeamStatisticalProfile {
    let mut r = |hi: f64| rng.gen_range(0.0..hi);
    TeamStatisticalProfile {
        team: "RND".to_string(),
        games_played: r(17.0),
        total_yards: r(600.0),
        points_per_game: r(50.0),
        third_down_pct: r(100.0),
        red_zone_pct: r(100.0),
        passing_yards: r(500.0),
        pass_attempts: r(60.0),
        completions: r(45.0),
        passing_tds: r(6.0),
        interceptions_thrown: r(5.0),
        rushing_yards: r(300.0),
        rush_attempts: r(50.0),
        rushing_tds: r(5.0),
        first_downs: r(40.0),
        total_plays: r(90.0),
        yards_per_play: r(10.0),
        turnovers_lost: r(5.0),
        fumbles_lost: r(3.0),
        turnover_differential: r(6.0) - 3.0,
        penalties: r(15.0),
        penalty_yards: r(150.0),
        drives_per_game: r(16.0),
        points_allowed: r(50.0),
        yards_allowed: r(600.0),
        opp_passing_yards: r(500.0),
        opp_passing_tds: r(6.0),
        opp_rushing_yards: r(300.0),
        opp_rushing_tds: r(5.0),
        opp_total_plays: r(90.0),
        yards_per_play_allowed: r(10.0),
        def_interceptions: r(4.0),
        forced_fumbles: r(4.0),
        turnovers_forced: r(6.0),
    }
}

#[test]
fn strengths_and_advantages_stay_bounded_for_arbitrary_profiles() {
    let tuning = SimTuning::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let profiles: Vec<TeamStatisticalProfile> =
        (0..500).map(|_| random_profile(&mut rng)).collect();

    let strengths: Vec<_> = profiles
        .iter()
        .map(|p| evaluate(p, &tuning.strength))
        .collect();
    for s in &strengths {
        assert!((0.0..=100.0).contains(&s.offense), "offense {}", s.offense);
        assert!((0.0..=100.0).contains(&s.defense), "defense {}", s.defense);
    }

    for pair in strengths.windows(2) {
        let a = advantage(pair[0].offense, pair[1].defense, &tuning.advantage);
        assert!((0.30..=0.70).contains(&a), "advantage {a}");
    }
}

#[test]
fn zeroed_and_extreme_profiles_are_clamped() {
    let tuning = SimTuning::default();
    let empty = evaluate(&TeamStatisticalProfile::default(), &tuning.strength);
    assert!((0.0..=100.0).contains(&empty.offense));
    assert_eq!(empty.defense, 50.0);
    assert!((advantage(0.0, 0.0, &tuning.advantage) - 0.5).abs() < 1e-12);

    let absurd = TeamStatisticalProfile {
        passing_yards: 5_000.0,
        rushing_yards: 5_000.0,
        points_allowed: 500.0,
        yards_allowed: 9_000.0,
        ..Default::default()
    };
    let s = evaluate(&absurd, &tuning.strength);
    assert_eq!(s.offense, 100.0);
    assert_eq!(s.defense, 0.0);
    assert_eq!(advantage(s.offense, s.defense, &tuning.advantage), 0.70);
}
