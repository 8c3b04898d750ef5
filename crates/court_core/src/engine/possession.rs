//! Possession resolver
//!
//! One possession runs as an explicit state machine over [`PossessionPhase`].
//! Each transition consumes the current phase and returns the next phase
//! together with the play-by-play entries it produced. The resolver moves
//! players and the ball but never touches scores or stats: the orchestrator
//! folds the returned entries into the match.
//!
//! Flow:
//! 1. Ball advance (pace dependent), players settle into the set
//! 2. `HasBall` ticks the shot clock and picks an action
//! 3. Action phases resolve into `HasBall` again or `Resolved`
//! 4. At most [`constants::MAX_ACTIONS`] actions; running out is a violation

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::movement;
use super::shot::{self, ShotType};
use super::state::{BallState, CourtPlayer, MatchState};
use crate::models::{
    distance, direction, timing, OffenseFocus, PlayAction, PlayByPlayEntry, PlayCall, PlayerId,
    TeamSide, TeamTactics, Vec2,
};

pub mod constants {
    pub const MAX_ACTIONS: u8 = 8;
    /// Shot clock seconds consumed per action, before the pace factor.
    pub const ACTION_TIME_MIN: f32 = 2.0;
    pub const ACTION_TIME_MAX: f32 = 5.0;
    /// At or under this the handler must shoot.
    pub const FORCED_SHOT_CLOCK: f32 = 4.0;

    pub const BASE_TURNOVER_CHANCE: f32 = 0.02;
    pub const PRESSURE_TURNOVER_CHANCE: f32 = 0.05;
    pub const PRESSURE_DISTANCE: f32 = 3.0;

    pub const ASSIST_CHANCE: f64 = 0.6;
    pub const BLOCK_RETAIN_CHANCE: f64 = 0.5;
    pub const OFFENSIVE_REBOUND_BASE: f32 = 0.22;
    pub const OFFENSIVE_REBOUND_STRENGTH: f32 = 0.1;
    pub const POST_SHOT_CHANCE: f64 = 0.6;
    pub const POST_OFFENSIVE_REBOUND: f64 = 0.25;

    pub const STEAL_BASE: f32 = 0.03;
    pub const STEAL_SKILL: f32 = 0.04;

    pub const DRIVE_MIN: f32 = 5.0;
    pub const DRIVE_MAX: f32 = 10.0;
    pub const DRIVE_CONTACT: f32 = 2.0;
    pub const DRIVE_BLOCK_BASE: f32 = 0.15;
    pub const DRIVE_FOUL_BASE: f32 = 0.10;
    pub const DRIVE_FOUL_SKILL: f32 = 0.15;

    pub const LOST_BALL_CHANCE: f64 = 0.4;
}

use constants::*;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PossessionOutcome {
    Made,
    Missed,
    Turnover,
}

/// Choice made by the ball handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffenseAction {
    Shoot,
    Pass,
    Drive,
    Post,
    Turnover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnoverKind {
    LostBall,
    BadPass,
    ShotClock,
}

impl TurnoverKind {
    fn describe(&self) -> &'static str {
        match self {
            TurnoverKind::LostBall => "lost the ball",
            TurnoverKind::BadPass => "bad pass",
            TurnoverKind::ShotClock => "Shot clock violation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossessionPhase {
    HasBall { handler: PlayerId },
    Shooting { shooter: PlayerId },
    Passing { passer: PlayerId },
    Driving { driver: PlayerId },
    PostingUp { player: PlayerId },
    TurnoverPending { handler: PlayerId, kind: TurnoverKind },
    Resolved(PossessionOutcome),
}

/// Output of a single phase transition.
#[derive(Debug)]
pub struct Transition {
    pub next: PossessionPhase,
    pub entries: Vec<PlayByPlayEntry>,
}

impl Transition {
    fn to(next: PossessionPhase) -> Self {
        Self { next, entries: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PossessionResult {
    pub offense: TeamSide,
    pub outcome: PossessionOutcome,
    pub points: u32,
    pub shooter: Option<PlayerId>,
    pub assister: Option<PlayerId>,
    pub rebounder: Option<PlayerId>,
    pub fouler: Option<PlayerId>,
    pub shot_type: Option<ShotType>,
    /// Game seconds used, ball advance included.
    pub elapsed: f32,
    /// Offensive rebounds that extended this possession.
    pub offensive_rebounds: u8,
    pub actions: u8,
    pub play_by_play: Vec<PlayByPlayEntry>,
}

// ============================================================================
// Decision
// ============================================================================

fn nearest<'a>(from: &Vec2, players: &[&'a CourtPlayer]) -> Option<(&'a CourtPlayer, f32)> {
    players
        .iter()
        .map(|p| (*p, distance(from, &p.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Pick the handler's next action.
pub fn decide_action<R: Rng + ?Sized>(
    handler: &CourtPlayer,
    defenders: &[&CourtPlayer],
    tactics: &TeamTactics,
    shot_clock: f32,
    offense_is_home: bool,
    rng: &mut R,
) -> OffenseAction {
    if shot_clock <= FORCED_SHOT_CLOCK {
        return OffenseAction::Shoot;
    }

    let to_rim = shot::distance_to_basket(&handler.position, offense_is_home);
    let zone = shot::classify_zone(&handler.position, offense_is_home);
    let gap = nearest(&handler.position, defenders).map_or(10.0, |(_, d)| d);

    let turnover_chance =
        BASE_TURNOVER_CHANCE + if gap < PRESSURE_DISTANCE { PRESSURE_TURNOVER_CHANCE } else { 0.0 };
    if rng.gen::<f32>() < turnover_chance {
        return OffenseAction::Turnover;
    }

    // Open look.
    if gap > 6.0 && handler.shooting > 60.0 {
        if zone.is_three() && rng.gen_bool(0.7) {
            return OffenseAction::Shoot;
        }
        if to_rim < 18.0 && rng.gen_bool(0.5) {
            return OffenseAction::Shoot;
        }
    }

    match tactics.offense_focus {
        OffenseFocus::Perimeter if zone.is_three() && gap > 4.0 && rng.gen_bool(0.6) => {
            return OffenseAction::Shoot;
        }
        OffenseFocus::Inside => {
            if to_rim > 15.0 {
                return if rng.gen_bool(0.6) { OffenseAction::Drive } else { OffenseAction::Pass };
            }
            if to_rim < 8.0 && gap > 3.0 {
                return OffenseAction::Shoot;
            }
        }
        _ => {}
    }

    if to_rim < 6.0 && gap > 2.0 {
        return OffenseAction::Shoot;
    }

    let (post_strength, post_chance) = match tactics.play_call {
        PlayCall::PostUp => (60.0, 0.45),
        _ => (70.0, 0.3),
    };
    if to_rim < 12.0 && handler.strength > post_strength && rng.gen_bool(post_chance) {
        return OffenseAction::Post;
    }

    let (drive_speed, drive_chance) = match tactics.play_call {
        PlayCall::Iso => (60.0, 0.5),
        _ => (70.0, 0.35),
    };
    if handler.speed > drive_speed && gap > 2.0 && to_rim > 10.0 && rng.gen_bool(drive_chance) {
        return OffenseAction::Drive;
    }

    OffenseAction::Pass
}

/// Teammate scoring highest on openness * 10 + shooting.
pub fn find_open_teammate<'a>(
    handler: &CourtPlayer,
    teammates: &[&'a CourtPlayer],
    defenders: &[&CourtPlayer],
) -> Option<&'a CourtPlayer> {
    teammates
        .iter()
        .filter(|t| t.id != handler.id)
        .map(|t| {
            let open = nearest(&t.position, defenders).map_or(100.0, |(_, d)| d);
            (*t, open * 10.0 + t.shooting)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, _)| t)
}

/// Distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: &Vec2, a: &Vec2, b: &Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-6 {
        return distance(p, a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    distance(p, &(a + ab * t))
}

// ============================================================================
// Resolver
// ============================================================================

struct Possession<'s> {
    state: &'s mut MatchState,
    offense: TeamSide,
    defense: TeamSide,
    is_home: bool,
    tactics: TeamTactics,
    offense_ids: [PlayerId; 5],
    defense_ids: [PlayerId; 5],
    shot_clock: f32,
    elapsed: f32,
    actions: u8,
    last_passer: Option<PlayerId>,
    home_score: u32,
    away_score: u32,
    result: PossessionResult,
}

impl<'s> Possession<'s> {
    fn new(state: &'s mut MatchState) -> Self {
        let offense = state.offense();
        let defense = offense.opponent();
        let tactics = *state.tactics(offense);
        let offense_ids = state.team(offense).on_court;
        let defense_ids = state.team(defense).on_court;
        let shot_clock = state.clock.shot_clock;
        let (home_score, away_score) = (state.home.score, state.away.score);
        Self {
            state,
            offense,
            defense,
            is_home: offense.is_home(),
            tactics,
            offense_ids,
            defense_ids,
            shot_clock,
            elapsed: 0.0,
            actions: 0,
            last_passer: None,
            home_score,
            away_score,
            result: PossessionResult {
                offense,
                outcome: PossessionOutcome::Missed,
                points: 0,
                shooter: None,
                assister: None,
                rebounder: None,
                fouler: None,
                shot_type: None,
                elapsed: 0.0,
                offensive_rebounds: 0,
                actions: 0,
                play_by_play: Vec::new(),
            },
        }
    }

    fn lineup(&self, ids: &[PlayerId; 5]) -> Vec<&CourtPlayer> {
        ids.iter().filter_map(|id| self.state.player(*id)).collect()
    }

    fn name(&self, id: PlayerId) -> String {
        self.state
            .player(id)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Entry stamped with the running clock and score. Scoring actions
    /// advance the running score first.
    fn entry(
        &mut self,
        team: TeamSide,
        action: PlayAction,
        description: String,
        player: PlayerId,
        secondary: Option<PlayerId>,
        is_important: bool,
    ) -> PlayByPlayEntry {
        let points = action.points();
        if team.is_home() {
            self.home_score += points;
        } else {
            self.away_score += points;
        }
        PlayByPlayEntry {
            id: 0,
            quarter: self.state.clock.quarter,
            time: (self.state.clock.time_remaining - self.elapsed).max(0.0),
            team: Some(team),
            player: Some(player),
            secondary_player: secondary,
            action,
            description,
            home_score: self.home_score,
            away_score: self.away_score,
            is_important,
        }
    }

    fn give_ball(&mut self, holder: PlayerId) {
        let at = self.state.player(holder).map_or_else(Vec2::zeros, |p| p.position);
        self.state.ball.give_to(holder, at);
    }

    /// Pick a rebounder from `ids`, weighted by strength.
    fn rebounder<R: Rng + ?Sized>(&self, ids: &[PlayerId; 5], rng: &mut R) -> PlayerId {
        let weights: Vec<f32> = ids
            .iter()
            .map(|id| self.state.player(*id).map_or(1.0, |p| p.strength + 1.0))
            .collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => ids[dist.sample(rng)],
            Err(_) => ids[0],
        }
    }

    fn rebound<R: Rng + ?Sized>(&mut self, offensive: bool, rng: &mut R) -> Transition {
        if offensive {
            let who = self.rebounder(&self.offense_ids, rng);
            let desc = format!("Offensive rebound by {}", self.name(who));
            let entry = self.entry(self.offense, PlayAction::OffensiveRebound, desc, who, None, false);
            self.result.rebounder = Some(who);
            self.result.offensive_rebounds += 1;
            self.shot_clock = timing::SHOT_CLOCK;
            self.give_ball(who);
            Transition { next: PossessionPhase::HasBall { handler: who }, entries: vec![entry] }
        } else {
            let who = self.rebounder(&self.defense_ids, rng);
            let desc = format!("Defensive rebound by {}", self.name(who));
            let entry = self.entry(self.defense, PlayAction::DefensiveRebound, desc, who, None, false);
            self.result.rebounder = Some(who);
            Transition {
                next: PossessionPhase::Resolved(PossessionOutcome::Missed),
                entries: vec![entry],
            }
        }
    }

    fn transition<R: Rng + ?Sized>(&mut self, phase: PossessionPhase, rng: &mut R) -> Transition {
        match phase {
            PossessionPhase::HasBall { handler } => self.has_ball(handler, rng),
            PossessionPhase::Shooting { shooter } => self.shoot(shooter, rng),
            PossessionPhase::Passing { passer } => self.pass(passer, rng),
            PossessionPhase::Driving { driver } => self.drive(driver, rng),
            PossessionPhase::PostingUp { player } => self.post_up(player, rng),
            PossessionPhase::TurnoverPending { handler, kind } => self.turnover(handler, kind),
            PossessionPhase::Resolved(_) => Transition::to(phase),
        }
    }

    fn has_ball<R: Rng + ?Sized>(&mut self, handler: PlayerId, rng: &mut R) -> Transition {
        if self.actions >= MAX_ACTIONS {
            return Transition::to(PossessionPhase::TurnoverPending {
                handler,
                kind: TurnoverKind::ShotClock,
            });
        }
        self.actions += 1;

        let tick = rng.gen_range(ACTION_TIME_MIN..ACTION_TIME_MAX) * self.tactics.pace.action_time_factor();
        if self.shot_clock - tick <= 0.0 {
            self.elapsed += self.shot_clock;
            movement::run_half_court(self.state, self.shot_clock, true, rng);
            self.shot_clock = 0.0;
            return Transition::to(PossessionPhase::TurnoverPending {
                handler,
                kind: TurnoverKind::ShotClock,
            });
        }
        self.shot_clock -= tick;
        self.elapsed += tick;
        movement::run_half_court(self.state, tick, true, rng);

        let action = {
            let Some(ball_handler) = self.state.player(handler) else {
                return Transition::to(PossessionPhase::TurnoverPending {
                    handler,
                    kind: TurnoverKind::LostBall,
                });
            };
            let defenders = self.lineup(&self.defense_ids);
            decide_action(ball_handler, &defenders, &self.tactics, self.shot_clock, self.is_home, rng)
        };

        let next = match action {
            OffenseAction::Shoot => PossessionPhase::Shooting { shooter: handler },
            OffenseAction::Pass => PossessionPhase::Passing { passer: handler },
            OffenseAction::Drive => PossessionPhase::Driving { driver: handler },
            OffenseAction::Post => PossessionPhase::PostingUp { player: handler },
            OffenseAction::Turnover => {
                let kind = if rng.gen_bool(LOST_BALL_CHANCE) {
                    TurnoverKind::LostBall
                } else {
                    TurnoverKind::BadPass
                };
                PossessionPhase::TurnoverPending { handler, kind }
            }
        };
        Transition::to(next)
    }

    fn shoot<R: Rng + ?Sized>(&mut self, shooter: PlayerId, rng: &mut R) -> Transition {
        self.state.ball.state = BallState::Shooting;

        let (attempt, blocker, block_p) = {
            let Some(player) = self.state.player(shooter) else {
                return Transition::to(PossessionPhase::Resolved(PossessionOutcome::Turnover));
            };
            let defenders = self.lineup(&self.defense_ids);
            let attempt = shot::evaluate_shot(player, &defenders, self.is_home, rng);
            let (blocker, block_p) = match nearest(&player.position, &defenders) {
                Some((d, _)) => (Some(d.id), shot::block_chance(player, d, attempt.shot_type)),
                None => (None, 0.0),
            };
            (attempt, blocker, block_p)
        };

        let is_three = attempt.shot_type == ShotType::Three;
        if let Some(blocker) = blocker.filter(|_| rng.gen::<f32>() < block_p) {
            self.result.shooter = Some(shooter);
            self.result.shot_type = Some(attempt.shot_type);
            // The rejected attempt is logged as the shooter's miss so its
            // shot type reaches the box score; the block entry credits the blocker.
            let action = if is_three { PlayAction::MissedThree } else { PlayAction::MissedShot };
            let desc = format!("{} has the shot rejected", self.name(shooter));
            let miss = self.entry(self.offense, action, desc, shooter, None, false);
            let desc = format!("{} blocks {}'s shot!", self.name(blocker), self.name(shooter));
            let block = self.entry(self.defense, PlayAction::Block, desc, blocker, Some(shooter), true);
            let entries = vec![miss, block];
            if rng.gen_bool(BLOCK_RETAIN_CHANCE) {
                self.shot_clock = timing::SHOT_CLOCK;
                self.give_ball(shooter);
                return Transition { next: PossessionPhase::HasBall { handler: shooter }, entries };
            }
            return Transition { next: PossessionPhase::Resolved(PossessionOutcome::Turnover), entries };
        }

        if attempt.made {
            self.result.points = attempt.points;
            self.result.shooter = Some(shooter);
            self.result.shot_type = Some(attempt.shot_type);

            let action = if is_three { PlayAction::MadeThree } else { PlayAction::MadeShot };
            let desc = format!(
                "{} {}! ({} pts)",
                self.name(shooter),
                attempt.shot_type.describe_make(),
                attempt.points
            );
            let mut entries = vec![self.entry(self.offense, action, desc, shooter, None, is_three)];

            if self.actions > 1 && rng.gen_bool(ASSIST_CHANCE) {
                let passer = self.last_passer.filter(|p| *p != shooter).or_else(|| {
                    self.offense_ids.iter().copied().filter(|id| *id != shooter).choose(rng)
                });
                if let Some(passer) = passer {
                    self.result.assister = Some(passer);
                    let desc = format!("Assist: {}", self.name(passer));
                    entries.push(self.entry(self.offense, PlayAction::Assist, desc, passer, Some(shooter), false));
                }
            }
            return Transition {
                next: PossessionPhase::Resolved(PossessionOutcome::Made),
                entries,
            };
        }

        self.result.shooter = Some(shooter);
        self.result.shot_type = Some(attempt.shot_type);
        let action = if is_three { PlayAction::MissedThree } else { PlayAction::MissedShot };
        let desc = format!("{} misses the {}", self.name(shooter), if is_three { "three" } else { "shot" });
        let miss = self.entry(self.offense, action, desc, shooter, None, false);

        let crash: f32 = self.lineup(&self.offense_ids).iter().map(|p| p.strength).sum();
        let offensive_chance = OFFENSIVE_REBOUND_BASE + crash / 500.0 * OFFENSIVE_REBOUND_STRENGTH;
        let offensive = rng.gen::<f32>() < offensive_chance;

        let mut board = self.rebound(offensive, rng);
        board.entries.insert(0, miss);
        board
    }

    fn pass<R: Rng + ?Sized>(&mut self, passer: PlayerId, rng: &mut R) -> Transition {
        let picked = {
            let Some(handler) = self.state.player(passer) else {
                return Transition::to(PossessionPhase::Resolved(PossessionOutcome::Turnover));
            };
            let teammates = self.lineup(&self.offense_ids);
            let defenders = self.lineup(&self.defense_ids);
            find_open_teammate(handler, &teammates, &defenders).map(|target| {
                let best_defense = defenders.iter().map(|d| d.defense).fold(0.0, f32::max);
                let steal_chance = STEAL_BASE + best_defense / 100.0 * STEAL_SKILL;
                let lane_thief = defenders
                    .iter()
                    .map(|d| (d.id, distance_to_segment(&d.position, &handler.position, &target.position)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(id, _)| id);
                (target.id, steal_chance, lane_thief)
            })
        };

        let Some((target, steal_chance, lane_thief)) = picked else {
            return Transition::to(PossessionPhase::HasBall { handler: passer });
        };

        self.state.ball.state = BallState::Passing;
        if rng.gen::<f32>() < steal_chance {
            if let Some(stealer) = lane_thief {
                let desc = format!("{} steals the pass!", self.name(stealer));
                let entry = self.entry(self.defense, PlayAction::Steal, desc, stealer, Some(passer), true);
                self.give_ball(stealer);
                return Transition {
                    next: PossessionPhase::Resolved(PossessionOutcome::Turnover),
                    entries: vec![entry],
                };
            }
        }

        self.last_passer = Some(passer);
        self.give_ball(target);
        Transition::to(PossessionPhase::HasBall { handler: target })
    }

    fn drive<R: Rng + ?Sized>(&mut self, driver: PlayerId, rng: &mut R) -> Transition {
        let basket = self.offense.attacking_basket();
        let Some(start) = self.state.player(driver).map(|p| p.position) else {
            return Transition::to(PossessionPhase::Resolved(PossessionOutcome::Turnover));
        };
        let length = rng.gen_range(DRIVE_MIN..DRIVE_MAX);
        let end = start + direction(&start, &basket) * length.min(distance(&start, &basket));

        let contacts: Vec<(PlayerId, f32)> = self
            .lineup(&self.defense_ids)
            .iter()
            .filter(|d| distance(&end, &d.position) < DRIVE_CONTACT)
            .map(|d| (d.id, d.defense))
            .collect();

        let mut blocked = false;
        let mut fouler = None;
        for (id, defense) in contacts {
            if rng.gen::<f32>() < DRIVE_BLOCK_BASE + defense / 200.0 {
                blocked = true;
            } else if rng.gen::<f32>() < DRIVE_FOUL_BASE + (1.0 - defense / 100.0) * DRIVE_FOUL_SKILL {
                fouler = Some(id);
                break;
            }
        }

        if let Some(fouler) = fouler {
            return self.shooting_foul(driver, fouler, rng);
        }
        if !blocked {
            if let Some(p) = self.state.player_mut(driver) {
                p.position = end;
            }
            self.give_ball(driver);
        }
        Transition::to(PossessionPhase::HasBall { handler: driver })
    }

    fn shooting_foul<R: Rng + ?Sized>(&mut self, shooter: PlayerId, fouler: PlayerId, rng: &mut R) -> Transition {
        self.result.fouler = Some(fouler);
        self.result.shooter = Some(shooter);
        self.result.shot_type = Some(ShotType::FreeThrow);

        let desc = format!("Foul by {} on the drive", self.name(fouler));
        let mut entries = vec![self.entry(self.defense, PlayAction::Foul, desc, fouler, Some(shooter), false)];

        let make_p = self.state.player(shooter).map_or(0.5, shot::free_throw_probability);
        let mut points = 0;
        for n in 1..=2 {
            let made = rng.gen::<f32>() < make_p;
            points += made as u32;
            let (action, verdict) = if made { (PlayAction::MadeFt, "Good!") } else { (PlayAction::MissedFt, "Missed") };
            let desc = format!("{} free throw {n}: {verdict}", self.name(shooter));
            entries.push(self.entry(self.offense, action, desc, shooter, None, false));
        }

        self.result.points = points;
        let outcome = if points > 0 { PossessionOutcome::Made } else { PossessionOutcome::Missed };
        Transition { next: PossessionPhase::Resolved(outcome), entries }
    }

    fn post_up<R: Rng + ?Sized>(&mut self, player: PlayerId, rng: &mut R) -> Transition {
        if !rng.gen_bool(POST_SHOT_CHANCE) {
            return Transition::to(PossessionPhase::HasBall { handler: player });
        }

        let attempt = {
            let Some(poster) = self.state.player(player) else {
                return Transition::to(PossessionPhase::Resolved(PossessionOutcome::Turnover));
            };
            let defenders = self.lineup(&self.defense_ids);
            shot::evaluate_shot(poster, &defenders, self.is_home, rng)
        };
        let shot_type = match attempt.shot_type {
            ShotType::Three => ShotType::Midrange,
            other => other,
        };
        self.result.shooter = Some(player);
        self.result.shot_type = Some(shot_type);

        if attempt.made {
            self.result.points = 2;
            let desc = format!("{} scores in the post!", self.name(player));
            let entry = self.entry(self.offense, PlayAction::MadeShot, desc, player, None, true);
            return Transition {
                next: PossessionPhase::Resolved(PossessionOutcome::Made),
                entries: vec![entry],
            };
        }

        let desc = format!("{} misses the post move", self.name(player));
        let miss = self.entry(self.offense, PlayAction::MissedShot, desc, player, None, false);
        let offensive = rng.gen_bool(POST_OFFENSIVE_REBOUND);
        let mut board = self.rebound(offensive, rng);
        board.entries.insert(0, miss);
        board
    }

    fn turnover(&mut self, handler: PlayerId, kind: TurnoverKind) -> Transition {
        let desc = match kind {
            TurnoverKind::ShotClock => kind.describe().to_string(),
            _ => format!("{} {}", self.name(handler), kind.describe()),
        };
        let entry = self.entry(self.offense, PlayAction::Turnover, desc, handler, None, false);
        Transition {
            next: PossessionPhase::Resolved(PossessionOutcome::Turnover),
            entries: vec![entry],
        }
    }

    fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> PossessionResult {
        // Bring the ball up, then settle into the set.
        let (lo, hi) = self.tactics.pace.advance_time_range();
        let advance = rng.gen_range(lo..hi);
        movement::run_half_court(self.state, advance, false, rng);
        movement::set_lineups(self.state, rng);
        self.elapsed += advance;
        self.shot_clock = (self.shot_clock - advance).max(0.0);

        let handler = self
            .state
            .ball
            .holder
            .filter(|h| self.offense_ids.contains(h))
            .unwrap_or(self.offense_ids[0]);
        self.give_ball(handler);

        let mut phase = PossessionPhase::HasBall { handler };
        let outcome = loop {
            if let PossessionPhase::Resolved(outcome) = phase {
                break outcome;
            }
            let step = self.transition(phase, rng);
            self.result.play_by_play.extend(step.entries);
            phase = step.next;
        };

        self.result.outcome = outcome;
        if outcome == PossessionOutcome::Turnover {
            self.result.points = 0;
        }
        self.result.elapsed = self.elapsed;
        self.result.actions = self.actions;
        self.state.ball.state = BallState::Dead;
        self.result
    }
}

/// Simulate the current offense's possession end to end.
///
/// Moves players and the ball in `state`; scores, stats and the log are left
/// for the caller to apply from the returned entries.
pub fn simulate_possession<R: Rng + ?Sized>(state: &mut MatchState, rng: &mut R) -> PossessionResult {
    Possession::new(state).run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Player, PlayerRatings, Position};
    use crate::test_fixtures::demo_engine;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player(id: u16, side: TeamSide, ratings: PlayerRatings, pos: Vec2) -> CourtPlayer {
        let roster = Player {
            id: format!("p{id}"),
            name: format!("Player {id}"),
            position: Position::SF,
            jersey_number: None,
            ratings,
        };
        let mut p = CourtPlayer::from_roster(PlayerId(id), side, &roster);
        p.position = pos;
        p
    }

    #[test]
    fn test_low_shot_clock_always_shoots() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let handler = player(0, TeamSide::Home, PlayerRatings::uniform(80), Vec2::new(0.0, 10.0));
        let hounding = player(1, TeamSide::Away, PlayerRatings::uniform(99), Vec2::new(0.0, 11.0));
        let tactics = TeamTactics { offense_focus: OffenseFocus::Inside, ..Default::default() };

        for clock in [4.0, 3.0, 1.5, 0.1] {
            for _ in 0..200 {
                let action = decide_action(&handler, &[&hounding], &tactics, clock, true, &mut rng);
                assert_eq!(action, OffenseAction::Shoot);
            }
        }
    }

    #[test]
    fn test_open_perimeter_shooter_prefers_shots() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let handler = player(0, TeamSide::Home, PlayerRatings::uniform(85), Vec2::new(0.0, 15.0));
        let far = player(1, TeamSide::Away, PlayerRatings::uniform(50), Vec2::new(0.0, 30.0));
        let tactics = TeamTactics { offense_focus: OffenseFocus::Perimeter, ..Default::default() };

        let shots = (0..500)
            .filter(|_| {
                decide_action(&handler, &[&far], &tactics, 20.0, true, &mut rng) == OffenseAction::Shoot
            })
            .count();
        assert!(shots > 350, "only {shots} shots");
    }

    #[test]
    fn test_open_teammate_selection() {
        let handler = player(0, TeamSide::Home, PlayerRatings::uniform(50), Vec2::new(0.0, 20.0));
        let covered = player(1, TeamSide::Home, PlayerRatings::uniform(99), Vec2::new(10.0, 30.0));
        let open = player(2, TeamSide::Home, PlayerRatings::uniform(40), Vec2::new(-15.0, 30.0));
        let defender = player(3, TeamSide::Away, PlayerRatings::uniform(50), Vec2::new(10.0, 31.0));

        let target = find_open_teammate(&handler, &[&handler, &covered, &open], &[&defender]);
        assert_eq!(target.map(|t| t.id), Some(PlayerId(2)));
    }

    #[test]
    fn test_segment_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!((distance_to_segment(&Vec2::new(5.0, 3.0), &a, &b) - 3.0).abs() < 1e-5);
        assert!((distance_to_segment(&Vec2::new(-4.0, 3.0), &a, &b) - 5.0).abs() < 1e-5);
    }

    /// Driver 20 ft out on the attacking side with the whole defense stacked
    /// along the drive line, one per foot from 5.5 to 9.5 ft ahead, so every
    /// drive ends in contact.
    fn drive_setup(seed: u64, defense: f32) -> (MatchState, PlayerId, Vec2) {
        let mut state = demo_engine(seed).into_state();
        let offense = state.offense();
        let basket = offense.attacking_basket();
        let toward_center = direction(&basket, &Vec2::zeros());
        let start = basket + toward_center * 20.0;

        let driver = state.team(offense).on_court[0];
        if let Some(p) = state.player_mut(driver) {
            p.position = start;
        }
        state.ball.give_to(driver, start);

        let defenders = state.team(offense.opponent()).on_court;
        for (k, id) in defenders.into_iter().enumerate() {
            let p = state.player_mut(id).unwrap();
            p.position = start - toward_center * (5.5 + k as f32);
            p.defense = defense;
        }
        (state, driver, start)
    }

    #[test]
    fn test_actions_capped_and_offensive_boards_stay_with_offense() {
        let mut boards_seen = 0;
        for seed in 0..40u64 {
            let mut state = demo_engine(seed).into_state();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..12 {
                let offense = state.offense();
                let result = simulate_possession(&mut state, &mut rng);
                assert_eq!(result.offense, offense);
                assert!((1..=MAX_ACTIONS).contains(&result.actions), "{} actions", result.actions);

                let boards: Vec<_> = result
                    .play_by_play
                    .iter()
                    .filter(|e| e.action == PlayAction::OffensiveRebound)
                    .collect();
                assert_eq!(boards.len(), result.offensive_rebounds as usize);
                assert!(boards.iter().all(|e| e.team == Some(offense)));
                boards_seen += boards.len();

                state.set_possession(offense.opponent());
                state.clock.shot_clock = timing::SHOT_CLOCK;
            }
        }
        assert!(boards_seen > 0);
    }

    #[test]
    fn test_action_cap_ends_in_shot_clock_violation() {
        let mut state = demo_engine(4).into_state();
        let offense = state.offense();
        let handler = state.team(offense).on_court[0];
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let mut p = Possession::new(&mut state);
        p.actions = MAX_ACTIONS;
        let step = p.has_ball(handler, &mut rng);
        assert_eq!(
            step.next,
            PossessionPhase::TurnoverPending { handler, kind: TurnoverKind::ShotClock }
        );
        assert_eq!(p.actions, MAX_ACTIONS);

        let result = p.run(&mut rng);
        assert_eq!(result.outcome, PossessionOutcome::Turnover);
        assert_eq!(result.actions, MAX_ACTIONS);
        assert_eq!(result.points, 0);
        assert_eq!(result.play_by_play.len(), 1);
        let entry = &result.play_by_play[0];
        assert_eq!(entry.action, PlayAction::Turnover);
        assert_eq!(entry.team, Some(offense));
        assert_eq!(entry.description, "Shot clock violation");
    }

    #[test]
    fn test_expiring_shot_clock_is_a_violation() {
        let mut state = demo_engine(6).into_state();
        state.clock.shot_clock = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let result = simulate_possession(&mut state, &mut rng);
        assert_eq!(result.outcome, PossessionOutcome::Turnover);
        assert_eq!(result.actions, 1);
        assert_eq!(result.play_by_play.len(), 1);
        assert_eq!(result.play_by_play[0].description, "Shot clock violation");
    }

    #[test]
    fn test_offensive_rebound_resets_clock_for_same_offense() {
        let mut state = demo_engine(9).into_state();
        let offense = state.offense();
        let offense_ids = state.team(offense).on_court;
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let mut p = Possession::new(&mut state);
        p.shot_clock = 3.0;
        let step = p.rebound(true, &mut rng);

        let PossessionPhase::HasBall { handler } = step.next else {
            panic!("offense should keep the ball, got {:?}", step.next);
        };
        assert!(offense_ids.contains(&handler));
        assert_eq!(p.offense, offense);
        assert_eq!(p.result.offensive_rebounds, 1);
        assert_eq!(p.result.rebounder, Some(handler));
        assert_eq!(p.shot_clock, timing::SHOT_CLOCK);
        assert_eq!(p.state.ball.holder, Some(handler));

        assert_eq!(step.entries.len(), 1);
        assert_eq!(step.entries[0].action, PlayAction::OffensiveRebound);
        assert_eq!(step.entries[0].team, Some(offense));
        assert_eq!(step.entries[0].player, Some(handler));
    }

    #[test]
    fn test_steal_goes_to_defender_nearest_pass_lane() {
        let mut state = demo_engine(5).into_state();
        let offense = state.offense();
        let defense = offense.opponent();
        let defenders = state.team(defense).on_court;
        for id in defenders {
            state.player_mut(id).unwrap().defense = 99.0;
        }
        let passer = state.team(offense).on_court[0];

        let thief = {
            let handler = state.player(passer).unwrap();
            let teammates: Vec<&CourtPlayer> = state.on_court(offense).collect();
            let defenders: Vec<&CourtPlayer> = state.on_court(defense).collect();
            let target = find_open_teammate(handler, &teammates, &defenders).unwrap();
            let lane = |d: &CourtPlayer| distance_to_segment(&d.position, &handler.position, &target.position);
            defenders.iter().min_by(|a, b| lane(**a).total_cmp(&lane(**b))).unwrap().id
        };
        let thief_at = state.player(thief).unwrap().position;

        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut p = Possession::new(&mut state);
        let mut stolen = false;
        for _ in 0..2000 {
            p.give_ball(passer);
            let step = p.pass(passer, &mut rng);
            let Some(entry) = step.entries.first() else {
                assert!(matches!(step.next, PossessionPhase::HasBall { .. }));
                continue;
            };
            assert_eq!(entry.action, PlayAction::Steal);
            assert_eq!(entry.team, Some(defense));
            assert_eq!(entry.player, Some(thief));
            assert_eq!(entry.secondary_player, Some(passer));
            assert_eq!(step.next, PossessionPhase::Resolved(PossessionOutcome::Turnover));
            assert_eq!(p.state.ball.holder, Some(thief));
            assert_eq!(p.state.ball.position, thief_at);
            stolen = true;
            break;
        }
        assert!(stolen);
    }

    #[test]
    fn test_blocked_drive_keeps_ball_in_place() {
        let (mut state, driver, start) = drive_setup(3, 99.0);
        let offense = state.offense();
        // All-zero draws: the shortest drive, and the first contact blocks.
        let mut rng = StepRng::new(0, 0);

        let mut p = Possession::new(&mut state);
        let step = p.drive(driver, &mut rng);
        assert!(step.entries.is_empty());
        assert_eq!(step.next, PossessionPhase::HasBall { handler: driver });
        assert_eq!(p.result.fouler, None);
        drop(p);

        assert_eq!(state.offense(), offense);
        assert_eq!(state.player(driver).unwrap().position, start);
        assert_eq!(state.ball.holder, Some(driver));
        assert_eq!(state.ball.position, start);
    }

    #[test]
    fn test_drive_foul_awards_exactly_two_free_throws() {
        let mut fouled = false;
        for seed in 0..200u64 {
            let (mut state, driver, _) = drive_setup(seed, 0.0);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut p = Possession::new(&mut state);
            let step = p.drive(driver, &mut rng);
            if step.entries.is_empty() {
                continue;
            }

            assert_eq!(step.entries.len(), 3);
            let foul = &step.entries[0];
            assert_eq!(foul.action, PlayAction::Foul);
            assert_eq!(foul.secondary_player, Some(driver));
            assert_eq!(p.result.fouler, foul.player);

            let free_throws = &step.entries[1..];
            assert!(free_throws
                .iter()
                .all(|e| matches!(e.action, PlayAction::MadeFt | PlayAction::MissedFt)));
            let made = free_throws.iter().filter(|e| e.action == PlayAction::MadeFt).count() as u32;
            assert_eq!(p.result.points, made);
            let expected = if made > 0 { PossessionOutcome::Made } else { PossessionOutcome::Missed };
            assert_eq!(step.next, PossessionPhase::Resolved(expected));
            fouled = true;
            break;
        }
        assert!(fouled);
    }
}
