//! Batch calibration
//!
//! Runs many independently seeded games in parallel and reports league-style
//! averages, so tuning constants can be checked against realistic box scores
//! (roughly 100-120 points and 95-105 possessions per team per game).

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::TeamPayload;
use crate::engine::{MatchConfig, MatchEngine};
use crate::error::Result;
use crate::models::{timing, GamePlayerStats, TeamSide};

/// One finished game, reduced to what the summary needs.
#[derive(Debug, Clone)]
struct GameLine {
    home_score: u32,
    away_score: u32,
    periods: u8,
    possessions: u32,
    home: GamePlayerStats,
    away: GamePlayerStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub games: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub overtime_games: u32,
    pub points_per_team: f32,
    /// Possessions per team per game.
    pub possessions_per_team: f32,
    pub avg_margin: f32,
    pub fg_pct: f32,
    pub three_pct: f32,
    pub ft_pct: f32,
    pub rebounds_per_team: f32,
    pub assists_per_team: f32,
    pub turnovers_per_team: f32,
    pub fouls_per_team: f32,
}

fn play_one(home: &TeamPayload, away: &TeamPayload, config: &MatchConfig, seed: u64) -> Result<GameLine> {
    let mut engine = MatchEngine::initialize(
        format!("batch-{seed}"),
        home.info.clone(),
        away.info.clone(),
        &home.players,
        &away.players,
        config.clone(),
        seed,
    )?;
    engine.simulate_to_game_end()?;

    let state = engine.into_state();
    let box_score = state.box_score();
    Ok(GameLine {
        home_score: state.home.score,
        away_score: state.away.score,
        periods: state.clock.quarter,
        possessions: state.possessions,
        home: box_score.team(TeamSide::Home).totals.clone(),
        away: box_score.team(TeamSide::Away).totals.clone(),
    })
}

/// Simulate `games` games seeded `base_seed..base_seed + games`. Each game
/// owns its engine, so results do not depend on thread scheduling.
pub fn run_batch(
    home: &TeamPayload,
    away: &TeamPayload,
    config: &MatchConfig,
    games: u32,
    base_seed: u64,
) -> Result<BatchSummary> {
    let lines = (0..games)
        .into_par_iter()
        .map(|i| play_one(home, away, config, base_seed.wrapping_add(u64::from(i))))
        .collect::<Result<Vec<_>>>()?;

    log::info!("[CALIBRATION] {} games simulated from seed {}", lines.len(), base_seed);
    Ok(summarize(&lines))
}

fn summarize(lines: &[GameLine]) -> BatchSummary {
    if lines.is_empty() {
        return BatchSummary::default();
    }

    let mut totals = GamePlayerStats::default();
    let mut summary = BatchSummary { games: lines.len() as u32, ..BatchSummary::default() };
    let mut possessions = 0u64;
    let mut margin = 0u64;

    for line in lines {
        if line.home_score > line.away_score {
            summary.home_wins += 1;
        } else {
            summary.away_wins += 1;
        }
        if line.periods > timing::REGULATION_QUARTERS {
            summary.overtime_games += 1;
        }
        possessions += u64::from(line.possessions);
        margin += u64::from(line.home_score.abs_diff(line.away_score));
        totals.add(&line.home);
        totals.add(&line.away);
    }

    let team_games = (lines.len() * 2) as f32;
    summary.points_per_team = totals.points as f32 / team_games;
    summary.possessions_per_team = possessions as f32 / team_games;
    summary.avg_margin = margin as f32 / lines.len() as f32;
    summary.fg_pct = totals.fg_pct();
    summary.three_pct = totals.three_pct();
    summary.ft_pct = totals.ft_pct();
    summary.rebounds_per_team = totals.rebounds() as f32 / team_games;
    summary.assists_per_team = totals.assists as f32 / team_games;
    summary.turnovers_per_team = totals.turnovers as f32 / team_games;
    summary.fouls_per_team = totals.fouls as f32 / team_games;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{demo_roster, demo_team};

    fn payloads() -> (TeamPayload, TeamPayload) {
        (
            TeamPayload { info: demo_team("bos", "BOS"), players: demo_roster("BOS", 78) },
            TeamPayload { info: demo_team("nyk", "NYK"), players: demo_roster("NYK", 76) },
        )
    }

    #[test]
    fn test_batch_counts_every_game() {
        let (home, away) = payloads();
        let summary = run_batch(&home, &away, &MatchConfig::simulation(), 6, 100).unwrap();
        assert_eq!(summary.games, 6);
        assert_eq!(summary.home_wins + summary.away_wins, 6);
        assert!(summary.points_per_team > 0.0);
        assert!(summary.fg_pct > 0.0 && summary.fg_pct < 1.0);
        assert!(summary.avg_margin >= 1.0);
    }

    #[test]
    fn test_batch_is_reproducible() {
        let (home, away) = payloads();
        let config = MatchConfig::simulation();
        let a = run_batch(&home, &away, &config, 4, 7).unwrap();
        let b = run_batch(&home, &away, &config, 4, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_batch() {
        let (home, away) = payloads();
        let summary = run_batch(&home, &away, &MatchConfig::default(), 0, 1).unwrap();
        assert_eq!(summary, BatchSummary::default());
    }
}
