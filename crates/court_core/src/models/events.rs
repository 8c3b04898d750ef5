use serde::{Deserialize, Serialize};

use super::{PlayerId, TeamSide};

/// One line of the play-by-play log. The log is append-only; box score
/// stats are folded from these entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayByPlayEntry {
    pub id: u32,
    pub quarter: u8,
    /// Seconds remaining in the period when the play happened.
    pub time: f32,
    /// Acting team; `None` for period and game markers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_player: Option<PlayerId>,
    pub action: PlayAction,
    pub description: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Highlight filter flag.
    pub is_important: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlayAction {
    MadeShot,
    MissedShot,
    MadeThree,
    MissedThree,
    MadeFt,
    MissedFt,
    OffensiveRebound,
    DefensiveRebound,
    Assist,
    Steal,
    Block,
    Turnover,
    Foul,
    Timeout,
    Substitution,
    QuarterStart,
    QuarterEnd,
    GameStart,
    GameEnd,
    JumpBall,
}

impl PlayAction {
    /// Points put on the board by this action.
    pub fn points(&self) -> u32 {
        match self {
            PlayAction::MadeShot => 2,
            PlayAction::MadeThree => 3,
            PlayAction::MadeFt => 1,
            _ => 0,
        }
    }

    pub fn is_field_goal_attempt(&self) -> bool {
        matches!(
            self,
            PlayAction::MadeShot
                | PlayAction::MissedShot
                | PlayAction::MadeThree
                | PlayAction::MissedThree
        )
    }

    pub fn is_period_marker(&self) -> bool {
        matches!(
            self,
            PlayAction::QuarterStart
                | PlayAction::QuarterEnd
                | PlayAction::GameStart
                | PlayAction::GameEnd
                | PlayAction::JumpBall
        )
    }
}
