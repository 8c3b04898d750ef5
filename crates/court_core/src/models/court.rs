//! Court geometry, game timing constants and team sides.
//!
//! Coordinates are in feet with the origin at center court. `x` runs from
//! sideline to sideline, `y` runs along the length of the floor. Home attacks
//! the basket at positive `y`, away attacks the basket at negative `y`.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position or velocity on the floor (feet, feet/second).
pub type Vec2 = Vector2<f32>;

// ============================================================
// Geometry
// ============================================================
pub mod court {
    pub const LENGTH: f32 = 94.0;
    pub const WIDTH: f32 = 50.0;
    pub const HALF_LENGTH: f32 = 47.0;
    pub const HALF_WIDTH: f32 = 25.0;

    /// Arc radius measured from the center of the rim.
    pub const THREE_POINT_RADIUS: f32 = 23.75;
    /// Straight-line distance in the corners.
    pub const THREE_POINT_CORNER: f32 = 22.0;
    /// |x| at which the corner three line runs parallel to the sideline.
    pub const CORNER_X: f32 = HALF_WIDTH - 3.0;

    pub const KEY_WIDTH: f32 = 16.0;
    pub const KEY_LENGTH: f32 = 19.0;
    pub const FREE_THROW_DISTANCE: f32 = 15.0;
    pub const RESTRICTED_AREA_RADIUS: f32 = 4.0;

    /// |y| of both rims.
    pub const BASKET_Y: f32 = 41.75;

    /// Players are kept this far inside the boundary lines.
    pub const BOUNDARY_MARGIN: f32 = 1.0;
}

// ============================================================
// Timing
// ============================================================
pub mod timing {
    pub const QUARTER_LENGTH: f32 = 720.0;
    pub const OVERTIME_LENGTH: f32 = 300.0;
    pub const SHOT_CLOCK: f32 = 24.0;
    pub const REGULATION_QUARTERS: u8 = 4;
    pub const TIMEOUTS_PER_TEAM: u8 = 7;
    /// Team fouls in a period after which the opponent shoots bonus free throws.
    pub const BONUS_FOUL_LIMIT: u8 = 5;
    /// Personal fouls that disqualify a player.
    pub const FOUL_OUT_LIMIT: u8 = 6;
}

// ============================================================
// TeamSide
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    #[inline]
    pub fn is_home(self) -> bool {
        matches!(self, TeamSide::Home)
    }

    /// +1 for home (attacks positive y), -1 for away.
    #[inline]
    pub fn attack_direction(self) -> f32 {
        if self.is_home() {
            1.0
        } else {
            -1.0
        }
    }

    /// Rim this side shoots at.
    #[inline]
    pub fn attacking_basket(self) -> Vec2 {
        basket_for(self.is_home())
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TeamSide::Home => write!(f, "home"),
            TeamSide::Away => write!(f, "away"),
        }
    }
}

// ============================================================
// Helpers
// ============================================================

/// Rim attacked by the offense.
#[inline]
pub fn basket_for(offense_is_home: bool) -> Vec2 {
    if offense_is_home {
        Vec2::new(0.0, court::BASKET_Y)
    } else {
        Vec2::new(0.0, -court::BASKET_Y)
    }
}

#[inline]
pub fn distance(a: &Vec2, b: &Vec2) -> f32 {
    (a - b).norm()
}

/// Unit vector from `from` toward `to`, or zero when the points coincide.
#[inline]
pub fn direction(from: &Vec2, to: &Vec2) -> Vec2 {
    let delta = to - from;
    let len = delta.norm();
    if len < 1e-6 {
        Vec2::zeros()
    } else {
        delta / len
    }
}

/// Keep a point inside the playable floor.
#[inline]
pub fn clamp_to_court(p: Vec2) -> Vec2 {
    let max_x = court::HALF_WIDTH - court::BOUNDARY_MARGIN;
    let max_y = court::HALF_LENGTH - court::BOUNDARY_MARGIN;
    Vec2::new(p.x.clamp(-max_x, max_x), p.y.clamp(-max_y, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baskets_face_each_other() {
        let home = TeamSide::Home.attacking_basket();
        let away = TeamSide::Away.attacking_basket();
        assert!((home.y - court::BASKET_Y).abs() < 1e-6);
        assert!((away.y + court::BASKET_Y).abs() < 1e-6);
        assert_eq!(TeamSide::Home.opponent(), TeamSide::Away);
    }

    #[test]
    fn test_clamp_to_court() {
        let p = clamp_to_court(Vec2::new(100.0, -100.0));
        assert!((p.x - 24.0).abs() < 1e-6);
        assert!((p.y + 46.0).abs() < 1e-6);
    }

    #[test]
    fn test_direction_of_coincident_points_is_zero() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(direction(&p, &p), Vec2::zeros());
        let d = direction(&Vec2::zeros(), &p);
        assert!((d.norm() - 1.0).abs() < 1e-5);
    }
}
