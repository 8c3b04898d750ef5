//! Per-player game statistics and the box score readout.

use serde::{Deserialize, Serialize};

use super::{PlayAction, PlayByPlayEntry, PlayerId, Position, TeamSide};

/// Counting stats for one player in one game.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GamePlayerStats {
    /// Minutes on court (fractional).
    pub minutes: f32,
    pub points: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fgm: u32,
    pub fga: u32,
    pub three_pm: u32,
    pub three_pa: u32,
    pub ftm: u32,
    pub fta: u32,
    pub fouls: u32,
    pub plus_minus: i32,
}

impl GamePlayerStats {
    pub fn rebounds(&self) -> u32 {
        self.offensive_rebounds + self.defensive_rebounds
    }

    pub fn fg_pct(&self) -> f32 {
        pct(self.fgm, self.fga)
    }

    pub fn three_pct(&self) -> f32 {
        pct(self.three_pm, self.three_pa)
    }

    pub fn ft_pct(&self) -> f32 {
        pct(self.ftm, self.fta)
    }

    /// Accumulate another line into this one (team totals).
    pub fn add(&mut self, other: &GamePlayerStats) {
        self.minutes += other.minutes;
        self.points += other.points;
        self.offensive_rebounds += other.offensive_rebounds;
        self.defensive_rebounds += other.defensive_rebounds;
        self.assists += other.assists;
        self.steals += other.steals;
        self.blocks += other.blocks;
        self.turnovers += other.turnovers;
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.three_pm += other.three_pm;
        self.three_pa += other.three_pa;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.fouls += other.fouls;
        self.plus_minus += other.plus_minus;
    }
}

fn pct(made: u32, attempted: u32) -> f32 {
    if attempted == 0 {
        0.0
    } else {
        made as f32 / attempted as f32
    }
}

/// Which stat lines an entry touches. Points are handled separately since
/// they also drive plus/minus for everyone on the floor.
pub fn fold_entry(
    entry: &PlayByPlayEntry,
    primary: Option<&mut GamePlayerStats>,
    secondary: Option<&mut GamePlayerStats>,
) {
    if let Some(stats) = primary {
        match entry.action {
            PlayAction::MadeShot => {
                stats.fgm += 1;
                stats.fga += 1;
                stats.points += 2;
            }
            PlayAction::MissedShot => stats.fga += 1,
            PlayAction::MadeThree => {
                stats.fgm += 1;
                stats.fga += 1;
                stats.three_pm += 1;
                stats.three_pa += 1;
                stats.points += 3;
            }
            PlayAction::MissedThree => {
                stats.fga += 1;
                stats.three_pa += 1;
            }
            PlayAction::MadeFt => {
                stats.ftm += 1;
                stats.fta += 1;
                stats.points += 1;
            }
            PlayAction::MissedFt => stats.fta += 1,
            PlayAction::OffensiveRebound => stats.offensive_rebounds += 1,
            PlayAction::DefensiveRebound => stats.defensive_rebounds += 1,
            PlayAction::Assist => stats.assists += 1,
            PlayAction::Steal => stats.steals += 1,
            PlayAction::Block => stats.blocks += 1,
            PlayAction::Turnover => stats.turnovers += 1,
            PlayAction::Foul => stats.fouls += 1,
            _ => {}
        }
    }

    // Steals name the victim as the secondary player. A block's victim is
    // charged by the miss entry logged just before it.
    if let Some(stats) = secondary {
        if entry.action == PlayAction::Steal {
            stats.turnovers += 1;
        }
    }
}

// ============================================================================
// Box score
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoxScorePlayerLine {
    pub player_id: PlayerId,
    pub external_id: String,
    pub name: String,
    pub position: Position,
    pub starter: bool,
    pub on_court: bool,
    pub disqualified: bool,
    pub fatigue: f32,
    pub stats: GamePlayerStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoxScoreTeam {
    pub side: TeamSide,
    pub team_id: String,
    pub name: String,
    pub score: u32,
    pub totals: GamePlayerStats,
    pub players: Vec<BoxScorePlayerLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoxScore {
    pub home: BoxScoreTeam,
    pub away: BoxScoreTeam,
}

impl BoxScore {
    pub fn team(&self, side: TeamSide) -> &BoxScoreTeam {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}
