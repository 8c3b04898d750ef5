use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Roster entry handed to the engine by the season layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Player {
    #[validate(length(min = 1))]
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub jersey_number: Option<u8>,
    #[validate]
    pub ratings: PlayerRatings,
}

/// Rating attributes, 0..=99.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq)]
pub struct PlayerRatings {
    #[validate(range(max = 99))]
    pub speed: u8,
    #[validate(range(max = 99))]
    pub strength: u8,
    #[validate(range(max = 99))]
    pub endurance: u8,
    #[validate(range(max = 99))]
    pub inside_scoring: u8,
    #[validate(range(max = 99))]
    pub mid_range: u8,
    #[validate(range(max = 99))]
    pub three_point: u8,
    #[validate(range(max = 99))]
    pub perimeter_defense: u8,
    #[validate(range(max = 99))]
    pub interior_defense: u8,
    #[validate(range(max = 99))]
    pub overall: u8,
}

impl Default for PlayerRatings {
    fn default() -> Self {
        Self::uniform(50)
    }
}

impl PlayerRatings {
    /// Every attribute set to the same value.
    pub fn uniform(value: u8) -> Self {
        Self {
            speed: value,
            strength: value,
            endurance: value,
            inside_scoring: value,
            mid_range: value,
            three_point: value,
            perimeter_defense: value,
            interior_defense: value,
            overall: value,
        }
    }

    pub fn shooting(&self) -> f32 {
        (self.inside_scoring as f32 + self.mid_range as f32 + self.three_point as f32) / 3.0
    }

    pub fn defense(&self) -> f32 {
        (self.perimeter_defense as f32 + self.interior_defense as f32) / 2.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub fn is_guard(&self) -> bool {
        matches!(self, Position::PG | Position::SG)
    }

    pub fn is_big(&self) -> bool {
        matches!(self, Position::PF | Position::C)
    }
}

/// Validated handle into the match player registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u16);

impl PlayerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
