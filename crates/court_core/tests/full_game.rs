//! Whole-game properties: determinism, clock and score monotonicity,
//! possession alternation and box score consistency.

use court_core::engine::{MatchConfig, MatchEngine, PossessionOutcome, ShotType};
use court_core::models::{timing, PlayAction, TeamSide};
use court_core::test_fixtures::{demo_engine, demo_engine_with, demo_roster, demo_team};
use sha2::{Digest, Sha256};

fn play_by_play_digest(engine: &MatchEngine) -> String {
    let json = serde_json::to_vec(&engine.state().play_by_play).unwrap();
    let digest = Sha256::digest(&json);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn test_equal_rosters_full_game() {
    let mut engine = MatchEngine::initialize(
        "even",
        demo_team("bos", "BOS"),
        demo_team("nyk", "NYK"),
        &demo_roster("BOS", 76),
        &demo_roster("NYK", 76),
        MatchConfig::simulation(),
        2024,
    )
    .unwrap();
    engine.simulate_to_game_end().unwrap();

    let state = engine.state();
    assert!(state.is_complete);
    assert!(state.clock.quarter >= timing::REGULATION_QUARTERS);
    let expected = if state.home.score > state.away.score { TeamSide::Home } else { TeamSide::Away };
    assert_eq!(state.winner, Some(expected));
    assert_ne!(state.home.score, state.away.score);

    let combined = state.home.score + state.away.score;
    assert!((100..=340).contains(&combined), "combined score {combined}");
}

#[test]
fn test_same_seed_same_game() {
    let mut a = demo_engine(99);
    let mut b = demo_engine(99);
    a.simulate_to_game_end().unwrap();
    b.simulate_to_game_end().unwrap();
    assert_eq!(play_by_play_digest(&a), play_by_play_digest(&b));
    assert_eq!(a.state().home.score, b.state().home.score);

    let mut c = demo_engine(100);
    c.simulate_to_game_end().unwrap();
    assert_ne!(play_by_play_digest(&a), play_by_play_digest(&c));
}

#[test]
fn test_properties_hold_every_possession() {
    let mut engine = demo_engine_with(MatchConfig::simulation(), 7);
    let mut last_offense: Option<TeamSide> = None;
    let (mut home, mut away) = (0, 0);
    let mut quarter = engine.state().clock.quarter;
    let mut time_left = engine.state().clock.time_remaining;

    while !engine.is_complete() {
        let result = engine.simulate_next_possession().unwrap();
        let state = engine.state();
        state.check_invariants().unwrap();

        if let Some(prev) = last_offense {
            assert_eq!(result.offense, prev.opponent());
        }
        last_offense = Some(result.offense);

        match result.outcome {
            PossessionOutcome::Made => {
                let expected = match result.shot_type {
                    Some(ShotType::FreeThrow) => 1..=2,
                    Some(ShotType::Three) => 3..=3,
                    _ => 2..=2,
                };
                assert!(expected.contains(&result.points), "{:?} {}", result.shot_type, result.points);
            }
            PossessionOutcome::Missed | PossessionOutcome::Turnover => assert_eq!(result.points, 0),
        }
        let logged: u32 = result.play_by_play.iter().map(|e| e.action.points()).sum();
        assert_eq!(logged, result.points);

        assert!(state.home.score >= home && state.away.score >= away);
        home = state.home.score;
        away = state.away.score;

        if state.clock.quarter == quarter {
            assert!(state.clock.time_remaining <= time_left);
        } else if !state.is_complete {
            assert_eq!(state.clock.quarter, quarter + 1);
            let length = if state.clock.quarter > timing::REGULATION_QUARTERS {
                timing::OVERTIME_LENGTH
            } else {
                timing::QUARTER_LENGTH
            };
            assert_eq!(state.clock.time_remaining, length);
        }
        quarter = state.clock.quarter;
        time_left = state.clock.time_remaining;

        for p in &state.players {
            assert!((0.0..=100.0).contains(&p.fatigue));
        }
    }
}

#[test]
fn test_box_score_matches_scoreboard() {
    let mut engine = demo_engine(55);
    engine.simulate_to_game_end().unwrap();
    let state = engine.state();
    let box_score = state.box_score();

    for side in TeamSide::BOTH {
        let team = box_score.team(side);
        assert_eq!(team.score, state.team(side).score);
        assert_eq!(team.totals.points, team.score);
        let from_players: u32 = team.players.iter().map(|l| l.stats.points).sum();
        assert_eq!(from_players, team.score);
        assert!(team.totals.fgm <= team.totals.fga);
        assert!(team.totals.three_pa <= team.totals.fga);
        assert_eq!(
            team.totals.points,
            2 * team.totals.fgm + team.totals.three_pm + team.totals.ftm
        );
        assert_eq!(team.players.iter().filter(|l| l.starter).count(), 5);
    }

    // Every game minute is played by exactly five players per side.
    let regulation = 4.0 * timing::QUARTER_LENGTH / 60.0;
    let overtime = f32::from(state.clock.quarter.saturating_sub(4)) * timing::OVERTIME_LENGTH / 60.0;
    let home_minutes = box_score.home.totals.minutes;
    assert!((home_minutes - 5.0 * (regulation + overtime)).abs() < 0.5, "{home_minutes}");

    let ends: Vec<_> = state.play_by_play.iter().filter(|e| e.action == PlayAction::GameEnd).collect();
    assert_eq!(ends.len(), 1);
}

#[test]
fn test_log_ids_are_sequential() {
    let mut engine = demo_engine(3);
    engine.simulate_to_quarter_end().unwrap();
    for (i, entry) in engine.state().play_by_play.iter().enumerate() {
        assert_eq!(entry.id as usize, i);
    }
}
