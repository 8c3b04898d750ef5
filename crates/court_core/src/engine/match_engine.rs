//! Match orchestrator
//!
//! `MatchEngine` owns the aggregate [`MatchState`] and the seeded RNG, and is
//! the only thing that advances them. Every command is a single `&mut self`
//! transition; a rejected command returns `Err` and leaves the state as it was.
//!
//! Phases: `Pregame -> Quarter(1..=4) -> Overtime(1..) -> Complete`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use validator::Validate;

use super::match_config::MatchConfig;
use super::momentum;
use super::movement;
use super::possession::{self, PossessionResult};
use super::state::{Ball, CourtPlayer, GameClock, MatchPhase, MatchState, TeamGameState};
use crate::coach::{self, CoachingDecision};
use crate::error::{MatchError, Result};
use crate::models::{
    timing, PlayAction, Player, PlayerId, Position, TacticsPatch, TeamInfo, TeamSide, TeamTactics,
};

/// Fatigue a timeout takes off the calling side's floor players.
pub const TIMEOUT_REST: f32 = 5.0;

pub struct MatchEngine {
    state: MatchState,
    rng: ChaCha8Rng,
    seed: u64,
    config: MatchConfig,
}

impl MatchEngine {
    // ========================================================================
    // Setup
    // ========================================================================

    /// Validate the rosters, build the player registry, pick starters and
    /// tip off.
    pub fn initialize(
        game_id: impl Into<String>,
        home: TeamInfo,
        away: TeamInfo,
        home_roster: &[Player],
        away_roster: &[Player],
        config: MatchConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        home.validate()?;
        away.validate()?;
        validate_roster(&home, home_roster)?;
        validate_roster(&away, away_roster)?;
        if home.id == away.id {
            return Err(MatchError::InvalidRoster {
                team: away.abbreviation.clone(),
                reason: format!("team id {} used by both sides", away.id),
            });
        }
        if let Some(dup) = home_roster.iter().find(|p| away_roster.iter().any(|q| q.id == p.id)) {
            return Err(MatchError::InvalidRoster {
                team: away.abbreviation.clone(),
                reason: format!("player {} is on both rosters", dup.id),
            });
        }

        let mut players = Vec::with_capacity(home_roster.len() + away_roster.len());
        let home_team = build_team(&mut players, TeamSide::Home, home, home_roster, &config)?;
        let away_team = build_team(&mut players, TeamSide::Away, away, away_roster, &config)?;

        let state = MatchState {
            game_id: game_id.into(),
            home: home_team,
            away: away_team,
            clock: GameClock::new(config.quarter_length),
            ball: Ball::default(),
            players,
            play_by_play: Vec::new(),
            home_tactics: TeamTactics::default(),
            away_tactics: TeamTactics::default(),
            phase: MatchPhase::Pregame,
            is_complete: false,
            winner: None,
            is_paused: false,
            possessions: 0,
            quarter_length: config.quarter_length,
            overtime_length: config.overtime_length,
        };

        let mut engine = Self {
            state,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            config,
        };
        engine.tip_off();
        engine.enforce_contracts();
        Ok(engine)
    }

    fn tip_off(&mut self) {
        for side in TeamSide::BOTH {
            if self.config.is_ai(side) {
                *self.state.tactics_mut(side) = coach::generate_tactics(&self.state, side);
            }
        }

        let home_name = self.state.home.info.display_name();
        let away_name = self.state.away.info.display_name();
        let start = self.state.entry(None, PlayAction::GameStart, format!("{away_name} at {home_name}"));
        self.state.record(start);

        self.state.set_possession(TeamSide::Home);
        let jumper = self.lead_guard(TeamSide::Home);
        let tip = format!(
            "{} wins the tip for {}",
            self.player_name(jumper),
            self.state.home.info.abbreviation
        );
        let mut entry = self.state.entry(Some(TeamSide::Home), PlayAction::JumpBall, tip);
        entry.player = Some(jumper);
        self.state.record(entry);

        self.begin_period();
        movement::set_lineups(&mut self.state, &mut self.rng);
        self.give_ball_to_offense();

        log::info!(
            "[MATCH] {} tip-off: {} vs {} (seed {})",
            self.state.game_id,
            home_name,
            away_name,
            self.seed
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn into_state(self) -> MatchState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    pub fn team_side(&self, team_id: &str) -> Result<TeamSide> {
        self.state.team_side(team_id)
    }

    /// What the AI coach would do for `side` right now. Uses a side RNG so
    /// asking does not change the simulation.
    pub fn coach_recommendation(&self, side: TeamSide) -> CoachingDecision {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ u64::from(self.state.possessions).rotate_left(32));
        coach::evaluate(&self.state, side, &mut rng)
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Resolve one possession and apply it: scores, stats, fouls, momentum,
    /// clock, fatigue and period transitions. Possession then flips.
    pub fn simulate_next_possession(&mut self) -> Result<PossessionResult> {
        if self.state.is_complete {
            return Err(MatchError::MatchComplete);
        }

        let offense = self.state.offense();
        self.state.clock.is_running = true;
        let result = possession::simulate_possession(&mut self.state, &mut self.rng);
        self.state.possessions += 1;

        let mut fouled: Vec<PlayerId> = Vec::new();
        for entry in &result.play_by_play {
            if entry.action == PlayAction::Foul {
                if let (Some(side), Some(player)) = (entry.team, entry.player) {
                    self.charge_foul(side, player);
                    fouled.push(player);
                }
            }
            self.state.record(entry.clone());
        }

        momentum::apply_possession(&mut self.state, offense, result.outcome, result.points);

        let elapsed = result.elapsed.min(self.state.clock.time_remaining);
        self.state.clock.run(elapsed);
        self.accrue_minutes(elapsed);

        for player in fouled {
            self.enforce_foul_out(player);
        }

        log::debug!(
            "[POSSESSION] Q{} {} {:?} {} pts ({:.1}s, {} actions) {}-{}",
            self.state.clock.quarter,
            offense,
            result.outcome,
            result.points,
            result.elapsed,
            result.actions,
            self.state.home.score,
            self.state.away.score
        );

        if self.state.clock.time_remaining <= 0.0 {
            self.end_period();
        }

        if !self.state.is_complete {
            self.state.set_possession(offense.opponent());
            self.give_ball_to_offense();
            self.state.is_paused = false;
            self.run_auto_coach();
        }

        self.enforce_contracts();
        Ok(result)
    }

    /// Simulate until the current period ends. Returns possessions played.
    pub fn simulate_to_quarter_end(&mut self) -> Result<u32> {
        if self.state.is_complete {
            return Err(MatchError::MatchComplete);
        }
        let quarter = self.state.clock.quarter;
        let mut played = 0;
        while !self.state.is_complete && self.state.clock.quarter == quarter {
            self.simulate_next_possession()?;
            played += 1;
        }
        Ok(played)
    }

    /// Simulate until the final buzzer. Returns possessions played.
    pub fn simulate_to_game_end(&mut self) -> Result<u32> {
        if self.state.is_complete {
            return Err(MatchError::MatchComplete);
        }
        let mut played = 0;
        while !self.state.is_complete {
            self.simulate_next_possession()?;
            played += 1;
        }
        log::info!(
            "[MATCH] {} final: {} {} - {} {} ({} possessions)",
            self.state.game_id,
            self.state.home.info.abbreviation,
            self.state.home.score,
            self.state.away.score,
            self.state.away.info.abbreviation,
            self.state.possessions
        );
        Ok(played)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Swap `player_out` (on court) for `player_in` (bench).
    pub fn make_substitution(&mut self, side: TeamSide, player_out: PlayerId, player_in: PlayerId) -> Result<()> {
        let checked = self.check_substitution(side, player_out, player_in);
        if let Err(err) = checked {
            log::warn!("[SUB] {side} substitution rejected: {err}");
            return Err(err);
        }
        let desc = format!("{} checks in for {}", self.player_name(player_in), self.player_name(player_out));
        self.apply_substitution(side, player_out, player_in, desc);
        self.enforce_contracts();
        Ok(())
    }

    /// Substitution addressed by collaborator ids.
    pub fn make_substitution_by_id(&mut self, team_id: &str, player_out: &str, player_in: &str) -> Result<()> {
        let resolved = self.team_side(team_id).and_then(|side| {
            Ok((side, self.state.player_id(player_out)?, self.state.player_id(player_in)?))
        });
        match resolved {
            Ok((side, out, inn)) => self.make_substitution(side, out, inn),
            Err(err) => {
                log::warn!("[SUB] substitution rejected: {err}");
                Err(err)
            }
        }
    }

    pub fn call_timeout(&mut self, side: TeamSide) -> Result<()> {
        if self.state.is_complete {
            return Err(MatchError::MatchComplete);
        }
        if self.state.team(side).timeouts_remaining == 0 {
            let err = MatchError::NoTimeoutsRemaining { side };
            log::warn!("[TIMEOUT] {err}");
            return Err(err);
        }

        let team = self.state.team_mut(side);
        team.timeouts_remaining -= 1;
        let remaining = team.timeouts_remaining;
        let on_court = team.on_court;

        momentum::halve(&mut self.state);
        for id in on_court {
            if let Some(p) = self.state.player_mut(id) {
                p.fatigue = (p.fatigue - TIMEOUT_REST).max(0.0);
            }
        }
        self.state.is_paused = true;

        let desc = format!("Timeout {} ({} remaining)", self.state.team(side).info.display_name(), remaining);
        let mut entry = self.state.entry(Some(side), PlayAction::Timeout, desc);
        entry.is_important = true;
        self.state.record(entry);
        log::debug!("[TIMEOUT] {side} ({remaining} left)");

        self.enforce_contracts();
        Ok(())
    }

    pub fn update_tactics(&mut self, side: TeamSide, patch: &TacticsPatch) {
        self.state.tactics_mut(side).apply(patch);
        log::debug!("[TACTICS] {side} now {:?}", self.state.tactics(side));
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn player_name(&self, id: PlayerId) -> String {
        self.state
            .player(id)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    fn check_substitution(&self, side: TeamSide, out: PlayerId, inn: PlayerId) -> Result<()> {
        if self.state.is_complete {
            return Err(MatchError::MatchComplete);
        }
        let out_player = self.state.require_player(out)?;
        let in_player = self.state.require_player(inn)?;
        let team = self.state.team(side);
        if !team.is_on_court(out) {
            return Err(MatchError::NotOnCourt { side, player: out_player.external_id.clone() });
        }
        if !team.is_on_bench(inn) {
            return Err(MatchError::NotOnBench { side, player: in_player.external_id.clone() });
        }
        if in_player.disqualified {
            return Err(MatchError::PlayerDisqualified { player: in_player.external_id.clone() });
        }
        Ok(())
    }

    /// Swap without validation. Caller has checked both handles.
    fn apply_substitution(&mut self, side: TeamSide, out: PlayerId, inn: PlayerId, description: String) {
        let team = self.state.team_mut(side);
        if let Some(slot) = team.on_court.iter().position(|id| *id == out) {
            team.on_court[slot] = inn;
        }
        if let Some(slot) = team.bench.iter().position(|id| *id == inn) {
            team.bench[slot] = out;
        }

        let spot = self.state.player(out).map(|p| p.position);
        if let Some(p) = self.state.player_mut(out) {
            p.velocity = crate::models::Vec2::zeros();
        }
        if let (Some(spot), Some(p)) = (spot, self.state.player_mut(inn)) {
            p.position = spot;
            p.velocity = crate::models::Vec2::zeros();
        }
        if self.state.ball.holder == Some(out) {
            let at = self.state.player(inn).map(|p| p.position).unwrap_or(self.state.ball.position);
            self.state.ball.give_to(inn, at);
        }

        let mut entry = self.state.entry(Some(side), PlayAction::Substitution, description);
        entry.player = Some(inn);
        entry.secondary_player = Some(out);
        self.state.record(entry);
        log::debug!("[SUB] {side} {} in, {} out", inn, out);
    }

    fn charge_foul(&mut self, side: TeamSide, player: PlayerId) {
        if let Some(p) = self.state.player_mut(player) {
            p.fouls = p.fouls.saturating_add(1);
        }
        if self.state.team_mut(side).add_team_foul() {
            log::debug!("[FOULS] {} in the bonus", side.opponent());
        }
    }

    /// Disqualify a player at the foul limit and force them off.
    fn enforce_foul_out(&mut self, id: PlayerId) {
        let Some(player) = self.state.player(id) else { return };
        if player.disqualified || player.fouls < timing::FOUL_OUT_LIMIT {
            return;
        }
        let side = player.side;
        let name = player.display_name().to_string();
        if let Some(p) = self.state.player_mut(id) {
            p.disqualified = true;
        }

        if !self.state.team(side).is_on_court(id) {
            return;
        }
        let replacement = self
            .state
            .player(id)
            .and_then(|out| coach::find_replacement(&self.state, side, out, &[]))
            .or_else(|| {
                let bench = self.state.team(side).bench.clone();
                coach::best_lineup(&self.state, &bench).first().copied()
            });

        match replacement {
            Some(inn) => {
                let desc = format!("{name} fouls out, {} checks in", self.player_name(inn));
                self.apply_substitution(side, id, inn, desc);
            }
            None => log::warn!("[FOULS] {name} fouled out but {side} has no eligible replacement"),
        }
    }

    fn accrue_minutes(&mut self, seconds: f32) {
        let minutes = seconds / 60.0;
        for side in TeamSide::BOTH {
            let team = self.state.team(side);
            let (on_court, bench) = (team.on_court, team.bench.clone());
            for id in on_court {
                if let Some(p) = self.state.player_mut(id) {
                    p.stats.minutes += minutes;
                }
            }
            for id in bench {
                if let Some(p) = self.state.player_mut(id) {
                    movement::recover_on_bench(p, seconds);
                }
            }
        }
    }

    /// Point guard if one is on the floor, else any guard, else slot 0.
    fn lead_guard(&self, side: TeamSide) -> PlayerId {
        let lineup: Vec<&CourtPlayer> = self.state.on_court(side).collect();
        lineup
            .iter()
            .find(|p| p.role == Position::PG)
            .or_else(|| lineup.iter().find(|p| p.role.is_guard()))
            .map_or(self.state.team(side).on_court[0], |p| p.id)
    }

    fn give_ball_to_offense(&mut self) {
        let handler = self.lead_guard(self.state.offense());
        let at = self.state.player(handler).map(|p| p.position).unwrap_or(self.state.ball.position);
        self.state.ball.give_to(handler, at);
    }

    fn begin_period(&mut self) {
        let quarter = self.state.clock.quarter;
        let (phase, desc) = if quarter <= timing::REGULATION_QUARTERS {
            (MatchPhase::Quarter(quarter), format!("Start of Q{quarter}"))
        } else {
            let n = quarter - timing::REGULATION_QUARTERS;
            (MatchPhase::Overtime(n), format!("Overtime period {n}"))
        };
        self.state.phase = phase;
        let entry = self.state.entry(None, PlayAction::QuarterStart, desc);
        self.state.record(entry);
    }

    fn end_period(&mut self) {
        let quarter = self.state.clock.quarter;
        let label = if quarter <= timing::REGULATION_QUARTERS {
            format!("End of Q{quarter}")
        } else {
            format!("End of overtime period {}", quarter - timing::REGULATION_QUARTERS)
        };
        let mut entry = self.state.entry(None, PlayAction::QuarterEnd, label);
        entry.is_important = quarter >= timing::REGULATION_QUARTERS;
        self.state.record(entry);

        let tied = self.state.home.score == self.state.away.score;
        if quarter < timing::REGULATION_QUARTERS || tied {
            let next_length = if quarter < timing::REGULATION_QUARTERS {
                self.state.quarter_length
            } else {
                self.state.overtime_length
            };
            self.state.clock.quarter += 1;
            self.state.clock.time_remaining = next_length;
            self.state.clock.shot_clock = timing::SHOT_CLOCK;
            for side in TeamSide::BOTH {
                self.state.team_mut(side).reset_period_fouls();
            }
            self.begin_period();
            for side in TeamSide::BOTH {
                if self.config.is_ai(side) {
                    *self.state.tactics_mut(side) = coach::generate_tactics(&self.state, side);
                }
            }
            log::info!(
                "[MATCH] {} Q{} begins {}-{}",
                self.state.game_id,
                self.state.clock.quarter,
                self.state.home.score,
                self.state.away.score
            );
            return;
        }

        let winner = if self.state.home.score > self.state.away.score {
            TeamSide::Home
        } else {
            TeamSide::Away
        };
        self.state.is_complete = true;
        self.state.winner = Some(winner);
        self.state.phase = MatchPhase::Complete;
        self.state.clock.is_running = false;
        self.state.ball.holder = None;

        let desc = format!(
            "Final: {} {} - {} {}",
            self.state.home.info.abbreviation,
            self.state.home.score,
            self.state.away.score,
            self.state.away.info.abbreviation
        );
        let mut entry = self.state.entry(Some(winner), PlayAction::GameEnd, desc);
        entry.is_important = true;
        self.state.record(entry);
    }

    fn run_auto_coach(&mut self) {
        if !self.config.auto_coach {
            return;
        }
        for side in TeamSide::BOTH {
            if !self.config.is_ai(side) {
                continue;
            }
            let decision = coach::evaluate(&self.state, side, &mut self.rng);
            for sub in decision.substitutions {
                if let Err(err) = self.make_substitution(side, sub.player_out, sub.player_in) {
                    log::debug!("[COACH] {side} skipped substitution: {err}");
                } else {
                    log::debug!("[COACH] {side}: {}", sub.reason);
                }
            }
            if !decision.adjustments.is_empty() {
                self.update_tactics(side, &decision.adjustments);
            }
            if let Some(reason) = decision.timeout {
                if self.call_timeout(side).is_ok() {
                    log::debug!("[COACH] {side} timeout: {reason}");
                }
            }
        }
    }

    #[cfg(feature = "strict_contracts")]
    fn enforce_contracts(&self) {
        if let Err(err) = self.state.check_invariants() {
            panic!("[CONTRACT] {err}");
        }
    }

    #[cfg(not(feature = "strict_contracts"))]
    fn enforce_contracts(&self) {}
}

// ============================================================================
// Setup helpers
// ============================================================================

fn validate_roster(team: &TeamInfo, roster: &[Player]) -> Result<()> {
    if roster.len() < 5 {
        return Err(MatchError::InvalidRoster {
            team: team.abbreviation.clone(),
            reason: format!("needs at least 5 players, got {}", roster.len()),
        });
    }
    if roster.len() > u8::MAX as usize {
        return Err(MatchError::InvalidRoster {
            team: team.abbreviation.clone(),
            reason: format!("{} players is more than a bench can hold", roster.len()),
        });
    }
    for (i, player) in roster.iter().enumerate() {
        player.validate()?;
        if roster[..i].iter().any(|p| p.id == player.id) {
            return Err(MatchError::InvalidRoster {
                team: team.abbreviation.clone(),
                reason: format!("duplicate player id {}", player.id),
            });
        }
    }
    Ok(())
}

/// Register a roster in the arena and pick the top five by overall.
fn build_team(
    players: &mut Vec<CourtPlayer>,
    side: TeamSide,
    info: TeamInfo,
    roster: &[Player],
    config: &MatchConfig,
) -> Result<TeamGameState> {
    let first = players.len();
    for player in roster {
        let id = PlayerId(players.len() as u16);
        players.push(CourtPlayer::from_roster(id, side, player));
    }

    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.sort_by(|a, b| roster[*b].ratings.overall.cmp(&roster[*a].ratings.overall));

    let ids: Vec<PlayerId> = order.iter().map(|i| PlayerId((first + i) as u16)).collect();
    let on_court: [PlayerId; 5] = ids[..5].try_into().map_err(|_| MatchError::InvalidRoster {
        team: info.abbreviation.clone(),
        reason: "could not seat five starters".into(),
    })?;
    for id in on_court {
        if let Some(p) = players.get_mut(id.index()) {
            p.starter = true;
        }
    }

    Ok(TeamGameState {
        side,
        info,
        score: 0,
        timeouts_remaining: config.timeouts_per_team,
        team_fouls: 0,
        in_bonus: false,
        has_possession: false,
        on_court,
        bench: ids[5..].to_vec(),
        momentum: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{demo_engine, demo_roster, demo_team};

    #[test]
    fn test_initialize_seats_best_five_and_tips_off() {
        let engine = demo_engine(11);
        let state = engine.state();

        assert_eq!(state.phase, MatchPhase::Quarter(1));
        assert!(state.home.has_possession);
        assert_eq!(state.ball.holder, Some(state.home.on_court[0]));
        assert!(state.check_invariants().is_ok());

        let starter_min = state.on_court(TeamSide::Home).map(|p| p.ratings.overall).min();
        let bench_max = state.bench(TeamSide::Home).map(|p| p.ratings.overall).max();
        assert!(starter_min >= bench_max);

        let actions: Vec<_> = state.play_by_play.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![PlayAction::GameStart, PlayAction::JumpBall, PlayAction::QuarterStart]);
    }

    #[test]
    fn test_lead_guard_falls_back_to_any_guard_then_slot_zero() {
        let mut engine = demo_engine(11);
        let lineup = engine.state.home.on_court;
        let roles = [Position::C, Position::SF, Position::PF, Position::SG, Position::C];
        for (id, role) in lineup.iter().zip(roles) {
            engine.state.players[id.index()].role = role;
        }
        assert_eq!(engine.lead_guard(TeamSide::Home), lineup[3]);

        engine.state.players[lineup[3].index()].role = Position::PF;
        assert_eq!(engine.lead_guard(TeamSide::Home), lineup[0]);

        engine.state.players[lineup[2].index()].role = Position::PG;
        assert_eq!(engine.lead_guard(TeamSide::Home), lineup[2]);
    }

    #[test]
    fn test_short_roster_rejected() {
        let roster = demo_roster("BOS", 70);
        let err = MatchEngine::initialize(
            "g",
            demo_team("bos", "BOS"),
            demo_team("nyk", "NYK"),
            &roster[..4],
            &demo_roster("NYK", 70),
            MatchConfig::default(),
            1,
        )
        .err();
        assert!(matches!(err, Some(MatchError::InvalidRoster { .. })));
    }

    #[test]
    fn test_out_of_range_ratings_rejected() {
        let mut roster = demo_roster("BOS", 70);
        roster[2].ratings.three_point = 150;
        let err = MatchEngine::initialize(
            "g",
            demo_team("bos", "BOS"),
            demo_team("nyk", "NYK"),
            &roster,
            &demo_roster("NYK", 70),
            MatchConfig::default(),
            1,
        )
        .err();
        assert!(matches!(err, Some(MatchError::InvalidRatings(_))));
    }

    #[test]
    fn test_possession_flips_and_clock_runs() {
        let mut engine = demo_engine(5);
        let before = engine.state().clock.time_remaining;
        let result = engine.simulate_next_possession().unwrap();

        assert_eq!(result.offense, TeamSide::Home);
        assert!(engine.state().away.has_possession);
        assert!(engine.state().clock.time_remaining < before);
        assert_eq!(engine.state().clock.shot_clock, timing::SHOT_CLOCK);
        assert!(!engine.state().is_paused);
    }

    #[test]
    fn test_timeout_halves_momentum_and_rests_players() {
        let mut engine = demo_engine(8);
        engine.state.home.momentum = 60.0;
        engine.state.away.momentum = -40.0;
        let id = engine.state.home.on_court[1];
        engine.state.players[id.index()].fatigue = 30.0;

        engine.call_timeout(TeamSide::Home).unwrap();
        let state = engine.state();
        assert_eq!(state.home.timeouts_remaining, timing::TIMEOUTS_PER_TEAM - 1);
        assert_eq!(state.home.momentum, 30.0);
        assert_eq!(state.away.momentum, -20.0);
        assert_eq!(state.players[id.index()].fatigue, 25.0);
        assert!(state.is_paused);
        let last = state.play_by_play.last().unwrap();
        assert_eq!(last.action, PlayAction::Timeout);
        assert!(last.is_important);
        assert!(state.highlights().any(|e| e.action == PlayAction::Timeout));
    }

    #[test]
    fn test_substitution_errors_leave_state_untouched() {
        let mut engine = demo_engine(2);
        let starter = engine.state().home.on_court[0];
        let other_starter = engine.state().home.on_court[1];
        let log_len = engine.state().play_by_play.len();

        let err = engine.make_substitution(TeamSide::Home, starter, other_starter).unwrap_err();
        assert!(matches!(err, MatchError::NotOnBench { .. }));

        let away_bench = engine.state().away.bench[0];
        let err = engine.make_substitution(TeamSide::Home, away_bench, starter).unwrap_err();
        assert!(matches!(err, MatchError::NotOnCourt { .. }));

        let err = engine.make_substitution(TeamSide::Home, PlayerId(999), starter).unwrap_err();
        assert!(matches!(err, MatchError::MissingPlayer(_)));

        let err = engine.make_substitution_by_id("bos", "nobody", "BOS-6").unwrap_err();
        assert!(matches!(err, MatchError::UnknownPlayer(_)));

        assert_eq!(engine.state().play_by_play.len(), log_len);
        assert_eq!(engine.state().home.on_court[0], starter);
    }

    #[test]
    fn test_substitution_swaps_and_moves_ball() {
        let mut engine = demo_engine(4);
        let out = engine.state().home.on_court[0];
        let inn = engine.state().home.bench[0];
        assert_eq!(engine.state().ball.holder, Some(out));
        let spot = engine.state().players[out.index()].position;
        let log_len = engine.state().play_by_play.len();

        engine.make_substitution(TeamSide::Home, out, inn).unwrap();

        let state = engine.state();
        assert!(state.home.is_on_bench(out));
        assert!(state.home.is_on_court(inn));
        assert_eq!(state.ball.holder, Some(inn));
        assert_eq!(state.players[inn.index()].position, spot);
        assert_eq!(state.play_by_play.len(), log_len + 1);
        let entry = &state.play_by_play[log_len];
        assert_eq!(entry.action, PlayAction::Substitution);
        assert_eq!((entry.player, entry.secondary_player), (Some(inn), Some(out)));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_timeout_without_timeouts_changes_nothing() {
        let mut engine = demo_engine(6);
        engine.state.away.timeouts_remaining = 0;
        engine.state.away.score = 12;
        let log_len = engine.state().play_by_play.len();

        let err = engine.call_timeout(TeamSide::Away).unwrap_err();
        assert!(matches!(err, MatchError::NoTimeoutsRemaining { side: TeamSide::Away }));
        assert_eq!(engine.state().away.timeouts_remaining, 0);
        assert_eq!(engine.state().away.score, 12);
        assert_eq!(engine.state().play_by_play.len(), log_len);
        assert!(!engine.state().is_paused);
    }

    #[test]
    fn test_tie_after_regulation_goes_to_overtime() {
        let mut engine = demo_engine(13);
        engine.state.clock.quarter = 4;
        engine.state.clock.time_remaining = 0.0;
        engine.state.home.score = 101;
        engine.state.away.score = 101;
        engine.state.home.team_fouls = 6;
        engine.state.home.in_bonus = true;

        engine.end_period();

        let state = engine.state();
        assert!(!state.is_complete);
        assert_eq!(state.clock.quarter, 5);
        assert_eq!(state.clock.time_remaining, timing::OVERTIME_LENGTH);
        assert_eq!(state.phase, MatchPhase::Overtime(1));
        assert_eq!(state.home.team_fouls, 0);
        assert!(!state.home.in_bonus);
        let last = state.play_by_play.last().unwrap();
        assert_eq!(last.action, PlayAction::QuarterStart);
        assert_eq!(last.description, "Overtime period 1");
    }

    #[test]
    fn test_decided_game_completes_with_winner() {
        let mut engine = demo_engine(13);
        engine.state.clock.quarter = 5;
        engine.state.clock.time_remaining = 0.0;
        engine.state.home.score = 110;
        engine.state.away.score = 112;

        engine.end_period();

        let state = engine.state();
        assert!(state.is_complete);
        assert_eq!(state.winner, Some(TeamSide::Away));
        assert_eq!(state.phase, MatchPhase::Complete);
        assert_eq!(state.play_by_play.last().map(|e| e.action), Some(PlayAction::GameEnd));
        assert!(matches!(engine.simulate_next_possession(), Err(MatchError::MatchComplete)));
        assert!(matches!(engine.call_timeout(TeamSide::Home), Err(MatchError::MatchComplete)));
    }

    #[test]
    fn test_quarter_end_advances_period() {
        let mut engine = demo_engine(31);
        let played = engine.simulate_to_quarter_end().unwrap();
        assert!(played > 10);
        let state = engine.state();
        assert_eq!(state.clock.quarter, 2);
        assert_eq!(state.clock.time_remaining, timing::QUARTER_LENGTH);
        assert_eq!(state.phase, MatchPhase::Quarter(2));
    }

    #[test]
    fn test_sixth_foul_forces_player_off() {
        let mut engine = demo_engine(21);
        let offender = engine.state().away.on_court[2];
        engine.state.players[offender.index()].fouls = timing::FOUL_OUT_LIMIT - 1;

        engine.charge_foul(TeamSide::Away, offender);
        engine.enforce_foul_out(offender);

        let state = engine.state();
        assert!(state.players[offender.index()].disqualified);
        assert!(!state.away.is_on_court(offender));
        assert!(state.away.is_on_bench(offender));
        assert_eq!(state.play_by_play.last().map(|e| e.action), Some(PlayAction::Substitution));
        assert!(state.check_invariants().is_ok());

        // Disqualified players cannot come back.
        let starter = state.away.on_court[0];
        let err = engine.make_substitution(TeamSide::Away, starter, offender).unwrap_err();
        assert!(matches!(err, MatchError::PlayerDisqualified { .. }));
    }

    #[test]
    fn test_recommendation_does_not_consume_rng() {
        let mut a = demo_engine(77);
        let mut b = demo_engine(77);
        let _ = a.coach_recommendation(TeamSide::Away);
        let ra = a.simulate_next_possession().unwrap();
        let rb = b.simulate_next_possession().unwrap();
        assert_eq!(ra.play_by_play, rb.play_by_play);
    }
}
