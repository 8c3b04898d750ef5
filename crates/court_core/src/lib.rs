//! # court_core - Deterministic Basketball Match Simulation Engine
//!
//! Possession-by-possession basketball simulation with a lightweight 2D
//! movement model, AI coaching and a JSON API.
//!
//! ## Features
//! - Deterministic simulation (same seed + same commands = same game)
//! - Play-by-play log with box score stats folded from it
//! - AI substitutions, tactics and timeouts per side
//! - Parallel batch runs for calibration
//!
//! ```rust
//! use court_core::engine::{MatchConfig, MatchEngine};
//! use court_core::test_fixtures::{demo_roster, demo_team};
//!
//! let mut engine = MatchEngine::initialize(
//!     "doc",
//!     demo_team("bos", "BOS"),
//!     demo_team("nyk", "NYK"),
//!     &demo_roster("BOS", 78),
//!     &demo_roster("NYK", 76),
//!     MatchConfig::simulation(),
//!     42,
//! )?;
//! engine.simulate_to_game_end()?;
//! assert!(engine.state().winner.is_some());
//! # Ok::<(), court_core::MatchError>(())
//! ```

// Simulation APIs pass many collaborators explicitly
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod api;
pub mod calibration;
pub mod coach;
pub mod engine;
pub mod error;
pub mod models;
pub mod test_fixtures;

pub use api::{simulate_game_json, MatchRequest, MatchResponse, TeamPayload};
pub use calibration::{run_batch, BatchSummary};
pub use coach::CoachingDecision;
pub use engine::{MatchConfig, MatchEngine, MatchState, PossessionResult};
pub use error::{MatchError, Result};
pub use models::{
    BoxScore, PlayAction, PlayByPlayEntry, Player, PlayerId, PlayerRatings, Position, TacticsPatch,
    TeamInfo, TeamSide, TeamTactics,
};
