//! Timeout policy.

use rand::Rng;

use super::thresholds;
use crate::engine::MatchState;
use crate::models::{timing, TeamSide};

/// Reason to call a timeout now, or `None`.
pub fn should_call_timeout<R: Rng + ?Sized>(
    state: &MatchState,
    side: TeamSide,
    rng: &mut R,
) -> Option<String> {
    let team = state.team(side);
    if team.timeouts_remaining == 0 {
        return None;
    }

    if state.team(side.opponent()).momentum > thresholds::RUN_MOMENTUM {
        return Some("Opponent on a run, need to stop momentum".into());
    }

    let clock = &state.clock;
    let close = state.score_margin(side).abs() <= thresholds::CLUTCH_MARGIN;
    if clock.quarter >= timing::REGULATION_QUARTERS
        && clock.time_remaining < thresholds::CLUTCH_SECONDS
        && close
        && team.has_possession
    {
        return Some("Late game, drawing up a play".into());
    }

    if clock.time_remaining < thresholds::END_OF_PERIOD_SECONDS
        && team.has_possession
        && rng.gen_bool(thresholds::END_OF_PERIOD_TIMEOUT_CHANCE)
    {
        return Some("End of period, setting up the final shot".into());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::demo_engine;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_opponent_run_triggers_timeout() {
        let mut state = demo_engine(1).into_state();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(should_call_timeout(&state, TeamSide::Home, &mut rng), None);

        state.away.momentum = thresholds::RUN_MOMENTUM + 1.0;
        let reason = should_call_timeout(&state, TeamSide::Home, &mut rng).unwrap();
        assert!(reason.contains("momentum"));

        state.home.timeouts_remaining = 0;
        assert_eq!(should_call_timeout(&state, TeamSide::Home, &mut rng), None);
    }

    #[test]
    fn test_clutch_possession_draws_up_a_play() {
        let mut state = demo_engine(1).into_state();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        state.clock.quarter = 4;
        state.clock.time_remaining = 45.0;
        state.home.score = 98;
        state.away.score = 100;
        state.set_possession(TeamSide::Home);

        let reason = should_call_timeout(&state, TeamSide::Home, &mut rng).unwrap();
        assert!(reason.contains("Late game"));

        // No ball, no clutch timeout.
        assert_eq!(should_call_timeout(&state, TeamSide::Away, &mut rng), None);
    }
}
