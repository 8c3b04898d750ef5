use thiserror::Error;

use crate::models::{PlayerId, TeamSide};

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Player handle {0} is not in the registry")]
    MissingPlayer(PlayerId),

    #[error("{player} is not on court for {side}")]
    NotOnCourt { side: TeamSide, player: String },

    #[error("{player} is not on the {side} bench")]
    NotOnBench { side: TeamSide, player: String },

    #[error("{player} has fouled out and cannot return")]
    PlayerDisqualified { player: String },

    #[error("{side} has no timeouts remaining")]
    NoTimeoutsRemaining { side: TeamSide },

    #[error("Match is already complete")]
    MatchComplete,

    #[error("Invalid roster for {team}: {reason}")]
    InvalidRoster { team: String, reason: String },

    #[error("Invalid player ratings: {0}")]
    InvalidRatings(#[from] validator::ValidationErrors),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Unsupported schema version: {0}")]
    UnsupportedSchema(u8),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MatchError {
    /// Rejected commands leave the match untouched and can simply be retried
    /// with corrected input; the rest indicate a broken setup.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MatchError::UnknownTeam(_)
            | MatchError::UnknownPlayer(_)
            | MatchError::NotOnCourt { .. }
            | MatchError::NotOnBench { .. }
            | MatchError::PlayerDisqualified { .. }
            | MatchError::NoTimeoutsRemaining { .. } => true,
            MatchError::MatchComplete => true,
            MatchError::MissingPlayer(_)
            | MatchError::InvalidRoster { .. }
            | MatchError::InvalidRatings(_)
            | MatchError::InvariantViolation(_)
            | MatchError::UnsupportedSchema(_)
            | MatchError::Json(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
