//! JSON API
//!
//! One request in, one whole game out. Used by the CLI and by any host that
//! only speaks JSON.

use serde::{Deserialize, Serialize};

use crate::engine::{MatchConfig, MatchEngine, MatchState};
use crate::error::{MatchError, Result};
use crate::models::{BoxScore, PlayByPlayEntry, Player, TeamInfo, TeamSide};

pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub schema_version: u8,
    pub seed: u64,
    #[serde(default = "default_game_id")]
    pub game_id: String,
    pub home_team: TeamPayload,
    pub away_team: TeamPayload,
    #[serde(default)]
    pub include_play_by_play: bool,
    /// Omitted means both sides are coached by the AI.
    #[serde(default)]
    pub config: Option<MatchConfig>,
}

fn default_game_id() -> String {
    "game".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPayload {
    pub info: TeamInfo,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub schema_version: u8,
    pub game_id: String,
    pub seed: u64,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: Option<TeamSide>,
    /// Periods played, overtimes included.
    pub periods: u8,
    pub possessions: u32,
    pub box_score: BoxScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_by_play: Option<Vec<PlayByPlayEntry>>,
}

impl MatchResponse {
    pub fn from_state(state: &MatchState, seed: u64, include_play_by_play: bool) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            game_id: state.game_id.clone(),
            seed,
            home_score: state.home.score,
            away_score: state.away.score,
            winner: state.winner,
            periods: state.clock.quarter,
            possessions: state.possessions,
            box_score: state.box_score(),
            play_by_play: include_play_by_play.then(|| state.play_by_play.clone()),
        }
    }
}

/// Run a parsed request to the final buzzer.
pub fn simulate_request(request: &MatchRequest) -> Result<MatchResponse> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(MatchError::UnsupportedSchema(request.schema_version));
    }
    let config = request.config.clone().unwrap_or_else(MatchConfig::simulation);
    let mut engine = MatchEngine::initialize(
        request.game_id.clone(),
        request.home_team.info.clone(),
        request.away_team.info.clone(),
        &request.home_team.players,
        &request.away_team.players,
        config,
        request.seed,
    )?;
    engine.simulate_to_game_end()?;
    Ok(MatchResponse::from_state(engine.state(), request.seed, request.include_play_by_play))
}

/// Main entry point for the JSON API.
pub fn simulate_game_json(request_json: &str) -> Result<String> {
    let request: MatchRequest = serde_json::from_str(request_json)?;
    let response = simulate_request(&request)?;
    Ok(serde_json::to_string(&response)?)
}
