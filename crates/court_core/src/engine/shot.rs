//! Shot probability model
//!
//! Pure functions: zone classification, shot type, contest level, make
//! probability, free throws and block chance. Only [`evaluate_shot`] touches
//! the RNG, and only to roll the make.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::CourtPlayer;
use crate::models::{basket_for, distance, geometry, PlayerId, Vec2};

pub mod constants {
    pub const MIN_PROBABILITY: f32 = 0.05;
    pub const MAX_PROBABILITY: f32 = 0.95;

    /// Skill adjustment divisor: shooting 0..99 maps to roughly ±0.15.
    pub const SKILL_DIVISOR: f32 = 333.0;
    pub const FATIGUE_PENALTY: f32 = 0.08;
    pub const STREAK_BONUS: f32 = 0.05;

    pub const DUNK_BONUS: f32 = 0.30;
    pub const LAYUP_BONUS: f32 = 0.05;
    pub const FLOATER_PENALTY: f32 = 0.05;

    /// Athleticism needed to finish with a dunk.
    pub const DUNK_ATHLETICISM: f32 = 70.0;
    pub const DUNK_RANGE: f32 = 2.0;
    pub const LAYUP_RANGE: f32 = 4.0;
    pub const FLOATER_RANGE: f32 = 10.0;

    /// Contest steps by defender distance (ft).
    pub const CONTEST_STEPS: [(f32, f32); 4] = [(2.0, 0.25), (4.0, 0.15), (6.0, 0.08), (8.0, 0.03)];
    /// Defense rating at which the contest step applies unscaled.
    pub const CONTEST_DEFENSE_BASELINE: f32 = 70.0;
    pub const CONTESTED_THRESHOLD: f32 = 0.1;

    pub const FT_BASE: f32 = 0.55;
    pub const FT_SKILL: f32 = 0.35;
    pub const FT_FATIGUE: f32 = 0.03;
    pub const FT_MIN: f32 = 0.40;
    pub const FT_MAX: f32 = 0.95;

    pub const BLOCK_FLOOR: f32 = 0.01;
    pub const BLOCK_CAP: f32 = 0.25;
    pub const BLOCK_REACH: f32 = 3.0;
    pub const BLOCK_BASE: f32 = 0.05;
    pub const BLOCK_SKILL: f32 = 0.10;
}

use constants::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShotZone {
    RestrictedArea,
    LowPaint,
    HighPaint,
    MidRangeBaseline,
    MidRangeWing,
    MidRangeTop,
    CornerThree,
    WingThree,
    TopThree,
}

impl ShotZone {
    /// League-average make rate from this zone.
    pub fn base_rate(&self) -> f32 {
        match self {
            ShotZone::RestrictedArea => 0.65,
            ShotZone::LowPaint => 0.58,
            ShotZone::HighPaint => 0.42,
            ShotZone::MidRangeBaseline => 0.42,
            ShotZone::MidRangeWing => 0.38,
            ShotZone::MidRangeTop => 0.43,
            ShotZone::CornerThree => 0.40,
            ShotZone::WingThree => 0.36,
            ShotZone::TopThree => 0.37,
        }
    }

    pub fn is_three(&self) -> bool {
        matches!(self, ShotZone::CornerThree | ShotZone::WingThree | ShotZone::TopThree)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    Dunk,
    Layup,
    Floater,
    Midrange,
    Three,
    FreeThrow,
}

impl ShotType {
    pub fn points(&self) -> u32 {
        match self {
            ShotType::Three => 3,
            ShotType::FreeThrow => 1,
            _ => 2,
        }
    }

    pub fn describe_make(&self) -> &'static str {
        match self {
            ShotType::Three => "hits a three-pointer",
            ShotType::Dunk => "throws it down",
            ShotType::Layup => "finishes at the rim",
            ShotType::Floater => "drops in the floater",
            ShotType::Midrange => "hits the jumper",
            ShotType::FreeThrow => "makes the free throw",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShotAttempt {
    pub shooter: PlayerId,
    pub position: Vec2,
    pub shot_type: ShotType,
    pub zone: ShotZone,
    pub distance: f32,
    pub contested: bool,
    pub contest_level: f32,
    pub probability: f32,
    pub made: bool,
    /// Points scored; 0 on a miss.
    pub points: u32,
}

// ============================================================================
// Geometry
// ============================================================================

pub fn distance_to_basket(pos: &Vec2, offense_is_home: bool) -> f32 {
    distance(pos, &basket_for(offense_is_home))
}

/// Classify a floor position relative to the attacked rim.
pub fn classify_zone(pos: &Vec2, offense_is_home: bool) -> ShotZone {
    let basket = basket_for(offense_is_home);
    let dist = distance(pos, &basket);
    let depth = (pos.y - basket.y).abs();
    let lateral = pos.x.abs();

    if dist <= geometry::RESTRICTED_AREA_RADIUS {
        return ShotZone::RestrictedArea;
    }

    let beyond_arc = dist >= geometry::THREE_POINT_RADIUS
        || (lateral >= geometry::THREE_POINT_CORNER && dist >= geometry::THREE_POINT_CORNER);
    if beyond_arc {
        return if lateral >= geometry::THREE_POINT_CORNER {
            ShotZone::CornerThree
        } else if depth < 15.0 {
            ShotZone::WingThree
        } else {
            ShotZone::TopThree
        };
    }

    if lateral <= geometry::KEY_WIDTH / 2.0 {
        return if depth <= 8.0 { ShotZone::LowPaint } else { ShotZone::HighPaint };
    }

    if depth < 8.0 {
        ShotZone::MidRangeBaseline
    } else if depth < 15.0 {
        ShotZone::MidRangeWing
    } else {
        ShotZone::MidRangeTop
    }
}

/// Mean of speed and strength.
pub fn athleticism(player: &CourtPlayer) -> f32 {
    (player.speed + player.strength) / 2.0
}

pub fn shot_type_for(distance: f32, zone: ShotZone, athleticism: f32) -> ShotType {
    if distance <= DUNK_RANGE && athleticism >= DUNK_ATHLETICISM {
        ShotType::Dunk
    } else if distance <= LAYUP_RANGE {
        ShotType::Layup
    } else if distance <= FLOATER_RANGE {
        ShotType::Floater
    } else if zone.is_three() {
        ShotType::Three
    } else {
        ShotType::Midrange
    }
}

// ============================================================================
// Probabilities
// ============================================================================

/// Strongest contest among the defenders, each scaled by their defense.
pub fn contest_level(shooter: &CourtPlayer, defenders: &[&CourtPlayer]) -> f32 {
    defenders
        .iter()
        .map(|d| {
            let gap = distance(&shooter.position, &d.position);
            let step = CONTEST_STEPS
                .iter()
                .find(|(limit, _)| gap < *limit)
                .map(|(_, value)| *value)
                .unwrap_or(0.0);
            step * (d.defense / CONTEST_DEFENSE_BASELINE)
        })
        .fold(0.0, f32::max)
}

/// Everything about a shot except the make roll.
pub fn assess_shot(
    shooter: &CourtPlayer,
    defenders: &[&CourtPlayer],
    offense_is_home: bool,
) -> ShotAttempt {
    let dist = distance_to_basket(&shooter.position, offense_is_home);
    let zone = classify_zone(&shooter.position, offense_is_home);
    let shot_type = shot_type_for(dist, zone, athleticism(shooter));

    let skill = (shooter.shooting - 50.0) / SKILL_DIVISOR;
    let type_adjust = match shot_type {
        ShotType::Dunk => DUNK_BONUS,
        ShotType::Layup => LAYUP_BONUS,
        ShotType::Floater => -FLOATER_PENALTY,
        _ => 0.0,
    };
    let contest = contest_level(shooter, defenders);
    let fatigue = shooter.fatigue / 100.0 * FATIGUE_PENALTY;
    let streak = if shooter.is_hot {
        STREAK_BONUS
    } else if shooter.is_cold {
        -STREAK_BONUS
    } else {
        0.0
    };

    let probability = (zone.base_rate() + skill + type_adjust - contest - fatigue + streak)
        .clamp(MIN_PROBABILITY, MAX_PROBABILITY);

    ShotAttempt {
        shooter: shooter.id,
        position: shooter.position,
        shot_type,
        zone,
        distance: dist,
        contested: contest > CONTESTED_THRESHOLD,
        contest_level: contest,
        probability,
        made: false,
        points: 0,
    }
}

/// Assess the shot and roll the make.
pub fn evaluate_shot<R: Rng + ?Sized>(
    shooter: &CourtPlayer,
    defenders: &[&CourtPlayer],
    offense_is_home: bool,
    rng: &mut R,
) -> ShotAttempt {
    let mut attempt = assess_shot(shooter, defenders, offense_is_home);
    attempt.made = rng.gen::<f32>() < attempt.probability;
    attempt.points = if attempt.made { attempt.shot_type.points() } else { 0 };
    attempt
}

pub fn free_throw_probability(shooter: &CourtPlayer) -> f32 {
    (FT_BASE + shooter.shooting / 100.0 * FT_SKILL - shooter.fatigue / 100.0 * FT_FATIGUE)
        .clamp(FT_MIN, FT_MAX)
}

/// Chance that `blocker` rejects the shot. Only the nearest defender rolls.
pub fn block_chance(shooter: &CourtPlayer, blocker: &CourtPlayer, shot_type: ShotType) -> f32 {
    if matches!(shot_type, ShotType::Three | ShotType::FreeThrow) {
        return BLOCK_FLOOR;
    }
    let gap = distance(&shooter.position, &blocker.position);
    if gap > BLOCK_REACH {
        return BLOCK_FLOOR;
    }

    let mut chance = BLOCK_BASE + blocker.defense / 100.0 * BLOCK_SKILL;
    match shot_type {
        ShotType::Layup => chance += 0.05,
        ShotType::Floater => chance -= 0.02,
        _ => {}
    }
    chance *= 1.0 - gap / BLOCK_REACH;
    chance.clamp(BLOCK_FLOOR, BLOCK_CAP)
}
