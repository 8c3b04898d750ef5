//! AI coaching policy
//!
//! One entry point, [`evaluate`], runs the three policies (substitutions,
//! tactical adjustments, timeout) against a read-only view of the match and
//! returns a single [`CoachingDecision`]. The orchestrator decides whether and
//! how to apply it.

pub mod substitutions;
pub mod tactics;
pub mod timeout;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::MatchState;
use crate::models::{PlayerId, TacticsPatch, TeamSide};

pub use substitutions::{best_lineup, find_replacement, propose_substitutions};
pub use tactics::{generate_tactics, propose_adjustments};
pub use timeout::should_call_timeout;

/// Tuning thresholds shared by the coaching policies.
pub mod thresholds {
    /// Fatigue at which an on-court player is flagged for rest.
    pub const FATIGUE_SUB: f32 = 65.0;
    /// Personal fouls at which a player is in foul trouble.
    pub const FOUL_TROUBLE: u8 = 4;
    /// Bench players above this fatigue are not considered.
    pub const BENCH_MAX_FATIGUE: f32 = 50.0;
    /// Best-lineup picks prefer players under this fatigue.
    pub const LINEUP_MAX_FATIGUE: f32 = 80.0;
    pub const MAX_SUBS_PER_STOPPAGE: usize = 2;

    /// Score margin that counts as a comfortable lead or a real deficit late.
    pub const LATE_MARGIN: i32 = 8;
    /// Game seconds left that count as "late".
    pub const LATE_GAME_SECONDS: f32 = 300.0;
    pub const ZONE_MOMENTUM: f32 = 50.0;

    pub const RUN_MOMENTUM: f32 = 70.0;
    pub const CLUTCH_SECONDS: f32 = 60.0;
    pub const CLUTCH_MARGIN: i32 = 5;
    pub const END_OF_PERIOD_SECONDS: f32 = 30.0;
    pub const END_OF_PERIOD_TIMEOUT_CHANCE: f64 = 0.3;

    /// Roster averages that set the default pace and focus.
    pub const FAST_ROSTER: f32 = 75.0;
    pub const SLOW_ROSTER: f32 = 60.0;
    pub const SHOOTING_ROSTER: f32 = 75.0;
    pub const STRONG_ROSTER: f32 = 75.0;
    /// Second-half margin that overrides roster tendencies.
    pub const SECOND_HALF_MARGIN: i32 = 10;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubstitutionProposal {
    pub player_out: PlayerId,
    pub player_in: PlayerId,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CoachingDecision {
    pub substitutions: Vec<SubstitutionProposal>,
    pub adjustments: TacticsPatch,
    /// Reason for calling a timeout now, if one should be called.
    pub timeout: Option<String>,
}

impl CoachingDecision {
    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty() && self.adjustments.is_empty() && self.timeout.is_none()
    }
}

/// Run every coaching policy for `side`.
pub fn evaluate<R: Rng + ?Sized>(state: &MatchState, side: TeamSide, rng: &mut R) -> CoachingDecision {
    CoachingDecision {
        substitutions: propose_substitutions(state, side),
        adjustments: propose_adjustments(state, side),
        timeout: should_call_timeout(state, side, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::demo_engine;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fresh_game_needs_nothing() {
        let mut state = demo_engine(1).into_state();
        state.home_tactics = generate_tactics(&state, TeamSide::Home);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(evaluate(&state, TeamSide::Home, &mut rng).is_empty());
    }

    #[test]
    fn test_decision_collects_every_policy() {
        let mut state = demo_engine(1).into_state();
        let tired = state.away.on_court[0];
        state.players[tired.index()].fatigue = 80.0;
        state.home.momentum = 85.0;
        state.away_tactics = crate::models::TeamTactics::default();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let decision = evaluate(&state, TeamSide::Away, &mut rng);
        assert_eq!(decision.substitutions.len(), 1);
        assert_eq!(decision.substitutions[0].player_out, tired);
        assert!(decision.adjustments.defense_scheme.is_some());
        assert!(decision.timeout.is_some());
    }
}
