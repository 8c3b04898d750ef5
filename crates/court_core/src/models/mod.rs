pub mod court;
pub mod events;
pub mod player;
pub mod stats;
pub mod tactics;
pub mod team;

pub use court::{
    basket_for, clamp_to_court, court as geometry, direction, distance, timing, TeamSide, Vec2,
};
pub use events::{PlayAction, PlayByPlayEntry};
pub use player::{Player, PlayerId, PlayerRatings, Position};
pub use stats::{BoxScore, BoxScorePlayerLine, BoxScoreTeam, GamePlayerStats};
pub use tactics::{DefenseScheme, OffenseFocus, Pace, PlayCall, TacticsPatch, TeamTactics};
pub use team::TeamInfo;
