pub mod json_api;

pub use json_api::{
    simulate_game_json, simulate_request, MatchRequest, MatchResponse, TeamPayload, SCHEMA_VERSION,
};
