//! Tactical adjustments and period tactics for AI-coached sides.

use super::thresholds;
use crate::engine::{CourtPlayer, MatchState};
use crate::models::{
    DefenseScheme, OffenseFocus, Pace, PlayCall, TacticsPatch, TeamSide, TeamTactics,
};

/// Late-game and momentum adjustments. Only settings that differ from the
/// current tactics are proposed.
pub fn propose_adjustments(state: &MatchState, side: TeamSide) -> TacticsPatch {
    let current = *state.tactics(side);
    let mut wanted = current;
    let margin = state.score_margin(side);
    let late = state.game_time_left() < thresholds::LATE_GAME_SECONDS;

    if late && margin < -thresholds::LATE_MARGIN {
        wanted.pace = Pace::Push;
        wanted.offense_focus = OffenseFocus::Perimeter;
    }
    if late && margin > thresholds::LATE_MARGIN {
        wanted.pace = Pace::Slow;
    }
    if state.team(side.opponent()).momentum > thresholds::ZONE_MOMENTUM {
        wanted.defense_scheme = DefenseScheme::Zone23;
    }

    current.diff(&wanted)
}

/// Tactics derived from the five on-court players, then overridden by the
/// second-half score.
pub fn generate_tactics(state: &MatchState, side: TeamSide) -> TeamTactics {
    let lineup: Vec<_> = state.on_court(side).collect();
    let count = lineup.len().max(1) as f32;
    let avg = |f: fn(&CourtPlayer) -> f32| lineup.iter().map(|p| f(p)).sum::<f32>() / count;
    let speed = avg(|p| p.speed);
    let shooting = avg(|p| p.shooting);
    let strength = avg(|p| p.strength);

    let mut tactics = TeamTactics {
        pace: Pace::Normal,
        offense_focus: OffenseFocus::Balanced,
        defense_scheme: DefenseScheme::Man,
        play_call: PlayCall::Auto,
    };

    if speed > thresholds::FAST_ROSTER {
        tactics.pace = Pace::Push;
    } else if speed < thresholds::SLOW_ROSTER {
        tactics.pace = Pace::Slow;
    }
    if shooting > thresholds::SHOOTING_ROSTER {
        tactics.offense_focus = OffenseFocus::Perimeter;
    }
    if strength > thresholds::STRONG_ROSTER {
        tactics.offense_focus = OffenseFocus::Inside;
    }

    if state.clock.quarter >= 3 {
        let margin = state.score_margin(side);
        if margin < -thresholds::SECOND_HALF_MARGIN {
            tactics.pace = Pace::Push;
            tactics.offense_focus = OffenseFocus::Perimeter;
        } else if margin > thresholds::SECOND_HALF_MARGIN {
            tactics.pace = Pace::Slow;
        }
    }

    tactics
}
