//! Test Fixtures
//!
//! Deterministic demo teams and rosters shared by unit tests, integration
//! tests, the bench and the CLI's demo mode.
//!
//! ```rust
//! use court_core::test_fixtures::{demo_roster, demo_team};
//!
//! let roster = demo_roster("BOS", 72);
//! assert_eq!(roster.len(), 10);
//! assert_eq!(demo_team("bos", "BOS").abbreviation, "BOS");
//! ```

use crate::engine::{MatchConfig, MatchEngine};
use crate::models::{Player, PlayerRatings, Position, TeamInfo};

const POSITIONS: [Position; 5] = [Position::PG, Position::SG, Position::SF, Position::PF, Position::C];

// =============================================================================
// Team Creation Helpers
// =============================================================================

pub fn demo_team(id: &str, abbreviation: &str) -> TeamInfo {
    TeamInfo {
        id: id.to_string(),
        city: format!("{abbreviation} City"),
        name: format!("{abbreviation} Demo"),
        abbreviation: abbreviation.to_string(),
        primary_color: "#1D428A".into(),
        secondary_color: "#FFFFFF".into(),
    }
}

/// Ten players with ids `{prefix}-1..=10`. Player 1 is the best; overall
/// drops by two per slot from `top_overall`. Ratings lean by position.
pub fn demo_roster(prefix: &str, top_overall: u8) -> Vec<Player> {
    (0..10u8)
        .map(|i| {
            let position = POSITIONS[(i % 5) as usize];
            let overall = top_overall.saturating_sub(i * 2).min(99);
            Player {
                id: format!("{prefix}-{}", i + 1),
                name: format!("{prefix} Player {}", i + 1),
                position,
                jersey_number: Some(i * 3 + 1),
                ratings: ratings_for(position, overall),
            }
        })
        .collect()
}

/// Position-shaped ratings around `overall`.
pub fn ratings_for(position: Position, overall: u8) -> PlayerRatings {
    let o = overall as i16;
    let at = |delta: i16| (o + delta).clamp(0, 99) as u8;
    let mut r = PlayerRatings::uniform(overall);
    match position {
        Position::PG | Position::SG => {
            r.speed = at(8);
            r.strength = at(-10);
            r.three_point = at(6);
            r.mid_range = at(3);
            r.perimeter_defense = at(4);
            r.interior_defense = at(-12);
        }
        Position::SF => {
            r.speed = at(2);
            r.mid_range = at(4);
            r.three_point = at(2);
        }
        Position::PF | Position::C => {
            r.speed = at(-10);
            r.strength = at(10);
            r.inside_scoring = at(8);
            r.three_point = at(-15);
            r.interior_defense = at(8);
            r.perimeter_defense = at(-8);
        }
    }
    r
}

// =============================================================================
// Engine Helpers
// =============================================================================

/// Home "BOS" (top overall 78) against away "NYK" (top overall 76), default
/// config.
pub fn demo_engine(seed: u64) -> MatchEngine {
    demo_engine_with(MatchConfig::default(), seed)
}

pub fn demo_engine_with(config: MatchConfig, seed: u64) -> MatchEngine {
    match MatchEngine::initialize(
        format!("demo-{seed}"),
        demo_team("bos", "BOS"),
        demo_team("nyk", "NYK"),
        &demo_roster("BOS", 78),
        &demo_roster("NYK", 76),
        config,
        seed,
    ) {
        Ok(engine) => engine,
        Err(err) => panic!("demo rosters must be valid: {err}"),
    }
}
