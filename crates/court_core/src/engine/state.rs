//! Match state aggregate
//!
//! `MatchState` is the single mutable aggregate advanced by the engine. Players
//! live in one arena (`players`) and every other structure refers to them by
//! `PlayerId`. Lookups return `Option`/`Result` so a bad handle surfaces as an
//! error instead of being filtered away.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::models::stats::fold_entry;
use crate::models::{
    timing, BoxScore, BoxScorePlayerLine, BoxScoreTeam, GamePlayerStats, PlayAction,
    PlayByPlayEntry, Player, PlayerId, PlayerRatings, Position, TeamInfo, TeamSide, TeamTactics,
    Vec2,
};

/// Number of field goal attempts tracked for hot/cold streaks.
pub const STREAK_WINDOW: usize = 5;

// ============================================================================
// CourtPlayer
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtPlayer {
    pub id: PlayerId,
    /// Roster key supplied by the collaborator.
    pub external_id: String,
    pub name: String,
    pub role: Position,
    pub jersey_number: Option<u8>,
    pub side: TeamSide,
    pub ratings: PlayerRatings,

    // Derived once at match start.
    pub speed: f32,
    pub strength: f32,
    pub shooting: f32,
    pub defense: f32,
    pub endurance: f32,

    pub position: Vec2,
    pub velocity: Vec2,
    /// 0 = fresh, 100 = exhausted.
    pub fatigue: f32,
    pub fouls: u8,
    pub disqualified: bool,
    pub starter: bool,
    pub is_hot: bool,
    pub is_cold: bool,
    /// Most recent field goal results, oldest first.
    recent_shots: Vec<bool>,
    pub stats: GamePlayerStats,
}

impl CourtPlayer {
    pub fn from_roster(id: PlayerId, side: TeamSide, player: &Player) -> Self {
        let r = player.ratings;
        Self {
            id,
            external_id: player.id.clone(),
            name: player.name.clone(),
            role: player.position,
            jersey_number: player.jersey_number,
            side,
            ratings: r,
            speed: r.speed as f32,
            strength: r.strength as f32,
            shooting: r.shooting(),
            defense: r.defense(),
            endurance: r.endurance as f32,
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            fatigue: 0.0,
            fouls: 0,
            disqualified: false,
            starter: false,
            is_hot: false,
            is_cold: false,
            recent_shots: Vec::with_capacity(STREAK_WINDOW),
            stats: GamePlayerStats::default(),
        }
    }

    /// Record a field goal result and refresh the hot/cold flags.
    ///
    /// Hot: at least 4 makes with at least 3 attempts in the window.
    /// Cold: a full window with at most 1 make.
    pub fn record_shot(&mut self, made: bool) {
        if self.recent_shots.len() == STREAK_WINDOW {
            self.recent_shots.remove(0);
        }
        self.recent_shots.push(made);

        let attempts = self.recent_shots.len();
        let makes = self.recent_shots.iter().filter(|m| **m).count();
        self.is_hot = attempts >= 3 && makes >= 4;
        self.is_cold = attempts == STREAK_WINDOW && makes <= 1;
    }

    pub fn current_speed(&self) -> f32 {
        self.velocity.norm()
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.external_id
        } else {
            &self.name
        }
    }
}

// ============================================================================
// Ball / Clock / Team
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BallState {
    Held,
    Passing,
    Shooting,
    Loose,
    #[default]
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Height above the floor (ft), used by renderers for shot arcs.
    pub height: f32,
    pub holder: Option<PlayerId>,
    pub state: BallState,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            height: 0.0,
            holder: None,
            state: BallState::Dead,
        }
    }
}

impl Ball {
    pub fn give_to(&mut self, holder: PlayerId, at: Vec2) {
        self.holder = Some(holder);
        self.position = at;
        self.velocity = Vec2::zeros();
        self.height = 4.0;
        self.state = BallState::Held;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    pub quarter: u8,
    /// Seconds remaining in the current period.
    pub time_remaining: f32,
    pub shot_clock: f32,
    pub is_running: bool,
}

impl GameClock {
    pub fn new(quarter_length: f32) -> Self {
        Self {
            quarter: 1,
            time_remaining: quarter_length,
            shot_clock: timing::SHOT_CLOCK,
            is_running: false,
        }
    }

    pub fn is_overtime(&self) -> bool {
        self.quarter > timing::REGULATION_QUARTERS
    }

    /// Reduce the period clock, clamped at zero. The shot clock resets for
    /// the next possession.
    pub fn run(&mut self, seconds: f32) {
        self.time_remaining = (self.time_remaining - seconds.max(0.0)).max(0.0);
        self.shot_clock = timing::SHOT_CLOCK;
    }

    /// "MM:SS" of the period clock.
    pub fn display(&self) -> String {
        let secs = self.time_remaining.ceil() as u32;
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "period", rename_all = "snake_case")]
pub enum MatchPhase {
    Pregame,
    Quarter(u8),
    Overtime(u8),
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGameState {
    pub side: TeamSide,
    pub info: TeamInfo,
    pub score: u32,
    pub timeouts_remaining: u8,
    /// Reset every period.
    pub team_fouls: u8,
    pub in_bonus: bool,
    pub has_possession: bool,
    pub on_court: [PlayerId; 5],
    pub bench: Vec<PlayerId>,
    /// -100..=100
    pub momentum: f32,
}

impl TeamGameState {
    pub fn is_on_court(&self, id: PlayerId) -> bool {
        self.on_court.contains(&id)
    }

    pub fn is_on_bench(&self, id: PlayerId) -> bool {
        self.bench.contains(&id)
    }

    pub fn roster(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.on_court.iter().copied().chain(self.bench.iter().copied())
    }

    /// Record a team foul; returns true when this foul put the team over the
    /// bonus limit.
    pub fn add_team_foul(&mut self) -> bool {
        self.team_fouls = self.team_fouls.saturating_add(1);
        let entered = !self.in_bonus && self.team_fouls >= timing::BONUS_FOUL_LIMIT;
        if entered {
            self.in_bonus = true;
        }
        entered
    }

    pub fn reset_period_fouls(&mut self) {
        self.team_fouls = 0;
        self.in_bonus = false;
    }
}

// ============================================================================
// MatchState
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub game_id: String,
    pub home: TeamGameState,
    pub away: TeamGameState,
    pub clock: GameClock,
    pub ball: Ball,
    pub players: Vec<CourtPlayer>,
    pub play_by_play: Vec<PlayByPlayEntry>,
    pub home_tactics: TeamTactics,
    pub away_tactics: TeamTactics,
    pub phase: MatchPhase,
    pub is_complete: bool,
    pub winner: Option<TeamSide>,
    pub is_paused: bool,
    pub possessions: u32,
    pub quarter_length: f32,
    pub overtime_length: f32,
}

impl MatchState {
    // ------------------------------------------------------------------
    // Team access
    // ------------------------------------------------------------------

    pub fn team(&self, side: TeamSide) -> &TeamGameState {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut TeamGameState {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn tactics(&self, side: TeamSide) -> &TeamTactics {
        match side {
            TeamSide::Home => &self.home_tactics,
            TeamSide::Away => &self.away_tactics,
        }
    }

    pub fn tactics_mut(&mut self, side: TeamSide) -> &mut TeamTactics {
        match side {
            TeamSide::Home => &mut self.home_tactics,
            TeamSide::Away => &mut self.away_tactics,
        }
    }

    /// Side currently on offense.
    pub fn offense(&self) -> TeamSide {
        if self.home.has_possession {
            TeamSide::Home
        } else {
            TeamSide::Away
        }
    }

    pub fn set_possession(&mut self, side: TeamSide) {
        self.home.has_possession = side.is_home();
        self.away.has_possession = !side.is_home();
    }

    /// Resolve a collaborator team id.
    pub fn team_side(&self, team_id: &str) -> Result<TeamSide> {
        if self.home.info.id == team_id {
            Ok(TeamSide::Home)
        } else if self.away.info.id == team_id {
            Ok(TeamSide::Away)
        } else {
            Err(MatchError::UnknownTeam(team_id.to_string()))
        }
    }

    /// Score of `side` minus the opponent's.
    pub fn score_margin(&self, side: TeamSide) -> i32 {
        self.team(side).score as i32 - self.team(side.opponent()).score as i32
    }

    // ------------------------------------------------------------------
    // Player access
    // ------------------------------------------------------------------

    pub fn player(&self, id: PlayerId) -> Option<&CourtPlayer> {
        self.players.get(id.index())
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut CourtPlayer> {
        self.players.get_mut(id.index())
    }

    pub fn require_player(&self, id: PlayerId) -> Result<&CourtPlayer> {
        self.player(id).ok_or(MatchError::MissingPlayer(id))
    }

    pub fn require_player_mut(&mut self, id: PlayerId) -> Result<&mut CourtPlayer> {
        self.player_mut(id).ok_or(MatchError::MissingPlayer(id))
    }

    /// Resolve a collaborator player key to its handle.
    pub fn player_id(&self, external_id: &str) -> Result<PlayerId> {
        self.players
            .iter()
            .find(|p| p.external_id == external_id)
            .map(|p| p.id)
            .ok_or_else(|| MatchError::UnknownPlayer(external_id.to_string()))
    }

    /// On-court players of `side`, in lineup order.
    pub fn on_court(&self, side: TeamSide) -> impl Iterator<Item = &CourtPlayer> + '_ {
        self.team(side).on_court.iter().filter_map(move |id| self.player(*id))
    }

    pub fn bench(&self, side: TeamSide) -> impl Iterator<Item = &CourtPlayer> + '_ {
        self.team(side).bench.iter().filter_map(move |id| self.player(*id))
    }

    pub fn ball_holder(&self) -> Option<&CourtPlayer> {
        self.ball.holder.and_then(|id| self.player(id))
    }

    // ------------------------------------------------------------------
    // Clock helpers
    // ------------------------------------------------------------------

    pub fn period_length(&self) -> f32 {
        if self.clock.is_overtime() {
            self.overtime_length
        } else {
            self.quarter_length
        }
    }

    /// Seconds of regulation left, counting unplayed quarters.
    pub fn game_time_left(&self) -> f32 {
        let unplayed = timing::REGULATION_QUARTERS.saturating_sub(self.clock.quarter) as f32;
        self.clock.time_remaining + unplayed * self.quarter_length
    }

    // ------------------------------------------------------------------
    // Play-by-play
    // ------------------------------------------------------------------

    /// Next entry stamped with the current clock and score. The id is
    /// assigned when the entry is recorded.
    pub fn entry(
        &self,
        team: Option<TeamSide>,
        action: PlayAction,
        description: impl Into<String>,
    ) -> PlayByPlayEntry {
        PlayByPlayEntry {
            id: 0,
            quarter: self.clock.quarter,
            time: self.clock.time_remaining,
            team,
            player: None,
            secondary_player: None,
            action,
            description: description.into(),
            home_score: self.home.score,
            away_score: self.away.score,
            is_important: false,
        }
    }

    /// Append an entry, folding its effects into player stats, team scores
    /// and plus/minus. The score snapshot is rewritten from the state after
    /// the entry is applied.
    pub fn record(&mut self, mut entry: PlayByPlayEntry) {
        let points = entry.action.points();
        if points > 0 {
            if let Some(side) = entry.team {
                self.team_mut(side).score += points;
                let (scoring, conceding) = (self.team(side).on_court, self.team(side.opponent()).on_court);
                for id in scoring {
                    if let Some(p) = self.player_mut(id) {
                        p.stats.plus_minus += points as i32;
                    }
                }
                for id in conceding {
                    if let Some(p) = self.player_mut(id) {
                        p.stats.plus_minus -= points as i32;
                    }
                }
            }
        }

        // Split borrow of the primary and secondary lines.
        let primary = entry.player.map(PlayerId::index);
        let secondary = entry.secondary_player.map(PlayerId::index);
        match (primary, secondary) {
            (Some(a), Some(b)) if a != b && a < self.players.len() && b < self.players.len() => {
                let (first, second) = if a < b {
                    let (lo, hi) = self.players.split_at_mut(b);
                    (&mut lo[a], &mut hi[0])
                } else {
                    let (lo, hi) = self.players.split_at_mut(a);
                    (&mut hi[0], &mut lo[b])
                };
                fold_entry(&entry, Some(&mut first.stats), Some(&mut second.stats));
            }
            (Some(a), _) => {
                fold_entry(&entry, self.players.get_mut(a).map(|p| &mut p.stats), None);
            }
            (None, Some(b)) => {
                fold_entry(&entry, None, self.players.get_mut(b).map(|p| &mut p.stats));
            }
            (None, None) => {}
        }

        // Streak window follows every field goal result, blocked shots included.
        if entry.action.is_field_goal_attempt() {
            let made = entry.action.points() > 0;
            if let Some(p) = entry.player.and_then(|id| self.player_mut(id)) {
                p.record_shot(made);
            }
        }

        entry.id = self.play_by_play.len() as u32;
        entry.home_score = self.home.score;
        entry.away_score = self.away.score;
        self.play_by_play.push(entry);
    }

    // ------------------------------------------------------------------
    // Readout
    // ------------------------------------------------------------------

    pub fn box_score(&self) -> BoxScore {
        BoxScore {
            home: self.box_score_team(TeamSide::Home),
            away: self.box_score_team(TeamSide::Away),
        }
    }

    fn box_score_team(&self, side: TeamSide) -> BoxScoreTeam {
        let team = self.team(side);
        let mut totals = GamePlayerStats::default();
        let mut players = Vec::new();
        for id in team.roster() {
            let Some(p) = self.player(id) else { continue };
            totals.add(&p.stats);
            players.push(BoxScorePlayerLine {
                player_id: p.id,
                external_id: p.external_id.clone(),
                name: p.name.clone(),
                position: p.role,
                starter: p.starter,
                on_court: team.is_on_court(id),
                disqualified: p.disqualified,
                fatigue: p.fatigue,
                stats: p.stats.clone(),
            });
        }
        // Starters first, then by minutes.
        players.sort_by(|a, b| {
            b.starter
                .cmp(&a.starter)
                .then(b.stats.minutes.total_cmp(&a.stats.minutes))
        });
        BoxScoreTeam {
            side,
            team_id: team.info.id.clone(),
            name: team.info.display_name(),
            score: team.score,
            totals,
            players,
        }
    }

    /// Entries flagged as highlights.
    pub fn highlights(&self) -> impl Iterator<Item = &PlayByPlayEntry> + '_ {
        self.play_by_play.iter().filter(|e| e.is_important)
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    pub fn check_invariants(&self) -> Result<()> {
        let violation = |msg: String| Err(MatchError::InvariantViolation(msg));

        for side in TeamSide::BOTH {
            let team = self.team(side);
            let on_court = team.on_court;
            for (i, id) in on_court.iter().enumerate() {
                if on_court[i + 1..].contains(id) {
                    return violation(format!("{side} has {id} on court twice"));
                }
                if team.bench.contains(id) {
                    return violation(format!("{side} has {id} on court and on the bench"));
                }
                let player = self.require_player(*id)?;
                if player.side != side {
                    return violation(format!("{id} is on the wrong team for {side}"));
                }
            }
            for id in &team.bench {
                let player = self.require_player(*id)?;
                if player.side != side {
                    return violation(format!("{id} is on the wrong bench for {side}"));
                }
            }
            if !(-100.0..=100.0).contains(&team.momentum) {
                return violation(format!("{side} momentum {} out of range", team.momentum));
            }
        }

        let roster_total = self.home.roster().count() + self.away.roster().count();
        if roster_total != self.players.len() {
            return violation(format!(
                "rosters cover {roster_total} players, registry has {}",
                self.players.len()
            ));
        }

        if self.home.has_possession == self.away.has_possession {
            return violation("exactly one team must have possession".into());
        }

        if !(0.0..=timing::SHOT_CLOCK).contains(&self.clock.shot_clock) {
            return violation(format!("shot clock {} out of range", self.clock.shot_clock));
        }
        if self.clock.time_remaining < 0.0 || self.clock.time_remaining > self.period_length() {
            return violation(format!("time remaining {} out of range", self.clock.time_remaining));
        }

        for p in &self.players {
            if !(0.0..=100.0).contains(&p.fatigue) {
                return violation(format!("{} fatigue {} out of range", p.external_id, p.fatigue));
            }
        }

        if let Some(holder) = self.ball.holder {
            if !self.is_complete && !self.team(self.offense()).is_on_court(holder) {
                return violation(format!("ball holder {holder} is not on court for the offense"));
            }
        }

        Ok(())
    }
}
