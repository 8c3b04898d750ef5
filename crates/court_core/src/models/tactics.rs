//! Team tactical settings
//!
//! Coaches (human or AI) adjust these between possessions. The possession
//! resolver reads them to bias action choice and pacing.

use serde::{Deserialize, Serialize};

/// Current tactical setup for one side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TeamTactics {
    pub pace: Pace,
    pub offense_focus: OffenseFocus,
    pub defense_scheme: DefenseScheme,
    pub play_call: PlayCall,
}

impl TeamTactics {
    /// Merge a partial update. Unset fields keep their current value.
    pub fn apply(&mut self, patch: &TacticsPatch) {
        if let Some(pace) = patch.pace {
            self.pace = pace;
        }
        if let Some(focus) = patch.offense_focus {
            self.offense_focus = focus;
        }
        if let Some(scheme) = patch.defense_scheme {
            self.defense_scheme = scheme;
        }
        if let Some(call) = patch.play_call {
            self.play_call = call;
        }
    }

    /// Patch containing only the fields where `other` differs from `self`.
    pub fn diff(&self, other: &TeamTactics) -> TacticsPatch {
        TacticsPatch {
            pace: (self.pace != other.pace).then_some(other.pace),
            offense_focus: (self.offense_focus != other.offense_focus)
                .then_some(other.offense_focus),
            defense_scheme: (self.defense_scheme != other.defense_scheme)
                .then_some(other.defense_scheme),
            play_call: (self.play_call != other.play_call).then_some(other.play_call),
        }
    }
}

/// Partial tactics update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TacticsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<Pace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense_focus: Option<OffenseFocus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_scheme: Option<DefenseScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_call: Option<PlayCall>,
}

impl TacticsPatch {
    pub fn is_empty(&self) -> bool {
        self.pace.is_none()
            && self.offense_focus.is_none()
            && self.defense_scheme.is_none()
            && self.play_call.is_none()
    }
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Push,
    #[default]
    Normal,
    Slow,
}

impl Pace {
    /// Seconds spent bringing the ball up before the half-court set.
    pub fn advance_time_range(&self) -> (f32, f32) {
        match self {
            Pace::Push => (2.0, 4.0),
            Pace::Normal => (4.0, 7.0),
            Pace::Slow => (6.0, 9.0),
        }
    }

    /// Multiplier on per-action shot clock usage.
    pub fn action_time_factor(&self) -> f32 {
        match self {
            Pace::Push => 0.85,
            Pace::Normal => 1.0,
            Pace::Slow => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OffenseFocus {
    Inside,
    #[default]
    Balanced,
    Perimeter,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefenseScheme {
    #[default]
    Man,
    #[serde(rename = "zone_2_3")]
    Zone23,
    #[serde(rename = "zone_3_2")]
    Zone32,
    Press,
}

impl DefenseScheme {
    pub fn is_zone(&self) -> bool {
        matches!(self, DefenseScheme::Zone23 | DefenseScheme::Zone32)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayCall {
    Iso,
    PickAndRoll,
    Motion,
    PostUp,
    #[default]
    Auto,
}
