//! Team momentum swings.

use super::possession::PossessionOutcome;
use super::state::MatchState;
use crate::models::TeamSide;

pub mod constants {
    pub const SCORE_GAIN: f32 = 10.0;
    pub const SCORE_LOSS: f32 = 5.0;
    pub const TURNOVER_LOSS: f32 = 10.0;
    pub const TURNOVER_GAIN: f32 = 5.0;
    pub const LIMIT: f32 = 100.0;
}

use constants::*;

fn shift(state: &mut MatchState, side: TeamSide, delta: f32) {
    let team = state.team_mut(side);
    team.momentum = (team.momentum + delta).clamp(-LIMIT, LIMIT);
}

/// Apply the swing for a finished possession. A scoreless miss is neutral.
pub fn apply_possession(state: &mut MatchState, offense: TeamSide, outcome: PossessionOutcome, points: u32) {
    let defense = offense.opponent();
    match outcome {
        PossessionOutcome::Made if points > 0 => {
            shift(state, offense, SCORE_GAIN);
            shift(state, defense, -SCORE_LOSS);
        }
        PossessionOutcome::Turnover => {
            shift(state, offense, -TURNOVER_LOSS);
            shift(state, defense, TURNOVER_GAIN);
        }
        _ => {}
    }
}

/// A timeout cools both benches.
pub fn halve(state: &mut MatchState) {
    for side in TeamSide::BOTH {
        state.team_mut(side).momentum /= 2.0;
    }
}
