pub mod match_config;
pub mod match_engine; // Orchestrator: commands, clock, periods
pub mod momentum;
pub mod movement; // Half-court kinematics, fatigue
pub mod possession; // Possession state machine
pub mod shot;
pub mod state; // MatchState aggregate + play-by-play folding

pub use match_config::MatchConfig;
pub use match_engine::MatchEngine;
pub use possession::{simulate_possession, PossessionOutcome, PossessionResult};
pub use shot::{ShotAttempt, ShotType, ShotZone};
pub use state::{Ball, BallState, CourtPlayer, GameClock, MatchPhase, MatchState, TeamGameState};
