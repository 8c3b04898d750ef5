//! Match configuration
//!
//! ```rust
//! use court_core::engine::MatchConfig;
//!
//! let config = MatchConfig::default();
//! let sim = MatchConfig::simulation();
//! assert!(sim.is_ai(court_core::models::TeamSide::Home));
//! assert!(!config.is_ai(court_core::models::TeamSide::Home));
//! ```

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{timing, TeamSide};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Sides whose substitutions, tactics and timeouts are run by the AI coach.
    pub ai_sides: Vec<TeamSide>,
    /// When false the AI only generates period tactics; it never subs or
    /// calls timeouts on its own.
    pub auto_coach: bool,
    #[validate(range(max = 20))]
    pub timeouts_per_team: u8,
    /// Seconds per regulation quarter.
    #[validate(range(min = 60.0, max = 3600.0))]
    pub quarter_length: f32,
    /// Seconds per overtime period.
    #[validate(range(min = 30.0, max = 3600.0))]
    pub overtime_length: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ai_sides: vec![TeamSide::Away],
            auto_coach: true,
            timeouts_per_team: timing::TIMEOUTS_PER_TEAM,
            quarter_length: timing::QUARTER_LENGTH,
            overtime_length: timing::OVERTIME_LENGTH,
        }
    }
}

impl MatchConfig {
    /// Both benches coached by the AI (batch runs, league sims).
    pub fn simulation() -> Self {
        Self { ai_sides: TeamSide::BOTH.to_vec(), ..Self::default() }
    }

    /// Both benches controlled externally.
    pub fn head_to_head() -> Self {
        Self { ai_sides: Vec::new(), ..Self::default() }
    }

    pub fn is_ai(&self, side: TeamSide) -> bool {
        self.ai_sides.contains(&side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_coaches_away() {
        let config = MatchConfig::default();
        assert!(config.is_ai(TeamSide::Away));
        assert!(!config.is_ai(TeamSide::Home));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"quarter_length": 300.0}"#).unwrap();
        assert_eq!(config.quarter_length, 300.0);
        assert_eq!(config.timeouts_per_team, timing::TIMEOUTS_PER_TEAM);
        assert_eq!(config.ai_sides, vec![TeamSide::Away]);
    }

    #[test]
    fn test_quarter_length_range() {
        let config = MatchConfig { quarter_length: 5.0, ..MatchConfig::default() };
        assert!(config.validate().is_err());
    }
}
