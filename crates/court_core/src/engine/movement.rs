//! Player movement and fatigue model
//!
//! This module contains:
//! - Kinematics toward a target with acceleration and a fatigue-scaled top speed
//! - Pairwise collision resolution
//! - Fatigue drain and recovery
//! - Offensive set templates and defensive alignments
//! - Half-court churn used by the orchestrator to move players through a possession

use rand::Rng;

use super::state::{CourtPlayer, MatchState};
use crate::models::{
    clamp_to_court, direction, distance, DefenseScheme, Pace, PlayCall, PlayerId, TeamSide, Vec2,
};

pub mod constants {
    /// Inside this distance the player coasts and friction applies.
    pub const ARRIVAL_RADIUS: f32 = 0.5;
    pub const FRICTION: f32 = 0.92;

    pub const BASE_ACCELERATION: f32 = 12.0;
    pub const ACCELERATION_RANGE: f32 = 6.0;
    pub const BASE_TOP_SPEED: f32 = 22.0;
    pub const TOP_SPEED_RANGE: f32 = 6.0;
    pub const FATIGUE_SPEED_PENALTY: f32 = 0.15;
    /// Defensive slides are slower than running.
    pub const LATERAL_MULTIPLIER: f32 = 0.65;

    pub const BODY_WIDTH: f32 = 1.5;
    pub const COLLISION_DAMPING: f32 = 0.7;

    /// Speed (ft/s) above which a player is working rather than resting.
    pub const EXERTION_SPEED: f32 = 5.0;
    /// Fatigue per second at 10 ft/s.
    pub const ACTIVE_DRAIN: f32 = 0.15;
    pub const PASSIVE_DRAIN: f32 = 0.10;
    /// Fatigue recovered per second on court below the exertion speed.
    pub const IDLE_RECOVERY: f32 = 0.02;
    /// Fatigue recovered per second on the bench.
    pub const BENCH_RECOVERY: f32 = 0.15;

    pub const FORMATION_JITTER: f32 = 2.0;
    pub const MAN_GAP: f32 = 3.5;
    pub const PRESS_GAP: f32 = 2.0;
    pub const HELP_SHADE: f32 = 2.0;

    /// Integration step for half-court churn (s).
    pub const MOVEMENT_STEP: f32 = 0.5;
    /// Off-ball players re-cut this often (s).
    pub const CUT_INTERVAL: f32 = 2.0;
}

use constants::*;

// ============================================================================
// Kinematics
// ============================================================================

pub fn top_speed(player: &CourtPlayer, is_defending: bool) -> f32 {
    let base = BASE_TOP_SPEED + player.speed / 100.0 * TOP_SPEED_RANGE;
    let fatigue = 1.0 - player.fatigue / 100.0 * FATIGUE_SPEED_PENALTY;
    let lateral = if is_defending { LATERAL_MULTIPLIER } else { 1.0 };
    base * fatigue * lateral
}

/// Accelerate toward `target`, cap at top speed, integrate, keep in bounds.
pub fn move_toward(player: &mut CourtPlayer, target: Vec2, dt: f32, is_defending: bool) {
    if distance(&player.position, &target) < ARRIVAL_RADIUS {
        player.velocity *= FRICTION;
        return;
    }

    let heading = direction(&player.position, &target);
    let acceleration = BASE_ACCELERATION + player.speed / 100.0 * ACCELERATION_RANGE;
    player.velocity += heading * acceleration * dt;

    let cap = top_speed(player, is_defending);
    let speed = player.velocity.norm();
    if speed > cap {
        player.velocity *= cap / speed;
    }

    player.position = clamp_to_court(player.position + player.velocity * dt);
}

/// Push overlapping players apart. The stronger player gives less ground.
pub fn resolve_collision(a: &mut CourtPlayer, b: &mut CourtPlayer) {
    let gap = distance(&a.position, &b.position);
    if gap >= BODY_WIDTH || gap <= 0.0 {
        return;
    }

    let overlap = BODY_WIDTH - gap;
    let normal = (b.position - a.position) / gap;
    let total = (a.strength + b.strength).max(1.0);
    let a_share = b.strength / total;
    let b_share = a.strength / total;

    a.position -= normal * overlap * a_share * 0.5;
    b.position += normal * overlap * b_share * 0.5;
    a.velocity *= COLLISION_DAMPING;
    b.velocity *= COLLISION_DAMPING;
}

/// Two distinct mutable players out of the arena.
fn pair_mut(
    players: &mut [CourtPlayer],
    i: usize,
    j: usize,
) -> Option<(&mut CourtPlayer, &mut CourtPlayer)> {
    if i == j || i >= players.len() || j >= players.len() {
        return None;
    }
    if i < j {
        let (lo, hi) = players.split_at_mut(j);
        Some((&mut lo[i], &mut hi[0]))
    } else {
        let (lo, hi) = players.split_at_mut(i);
        Some((&mut hi[0], &mut lo[j]))
    }
}

pub fn resolve_collisions(players: &mut [CourtPlayer], ids: &[PlayerId]) {
    for (n, a) in ids.iter().enumerate() {
        for b in &ids[n + 1..] {
            if let Some((pa, pb)) = pair_mut(players, a.index(), b.index()) {
                resolve_collision(pa, pb);
            }
        }
    }
}

// ============================================================================
// Fatigue
// ============================================================================

/// Lower endurance drains faster: 1.25 at 0, 1.0 at 50, ~0.75 at 99.
pub fn endurance_factor(player: &CourtPlayer) -> f32 {
    1.25 - player.endurance / 200.0
}

/// Drain above the exertion speed, recover at or below it. `dt` in seconds.
pub fn update_fatigue(player: &mut CourtPlayer, dt: f32, is_active: bool) {
    let speed = player.current_speed();
    if speed > EXERTION_SPEED {
        let rate = if is_active { ACTIVE_DRAIN } else { PASSIVE_DRAIN };
        player.fatigue += rate * dt * (speed / 10.0) * endurance_factor(player);
    } else {
        player.fatigue -= IDLE_RECOVERY * dt;
    }
    player.fatigue = player.fatigue.clamp(0.0, 100.0);
}

pub fn recover_on_bench(player: &mut CourtPlayer, dt: f32) {
    player.velocity = Vec2::zeros();
    player.fatigue = (player.fatigue - BENCH_RECOVERY * dt).clamp(0.0, 100.0);
}

// ============================================================================
// Formations
// ============================================================================

/// (x, depth from the attacked rim) per lineup slot.
fn set_template(play_call: PlayCall) -> [(f32, f32); 5] {
    match play_call {
        PlayCall::Iso => [(0.0, 24.0), (22.5, 4.0), (-22.5, 4.0), (-17.0, 19.0), (12.0, 6.0)],
        PlayCall::PickAndRoll => [(3.0, 24.0), (22.0, 8.0), (-22.0, 8.0), (-14.0, 20.0), (5.0, 21.0)],
        PlayCall::PostUp => [(-16.0, 20.0), (16.0, 22.0), (-22.0, 4.0), (8.0, 12.0), (6.0, 6.0)],
        PlayCall::Motion | PlayCall::Auto => {
            [(0.0, 25.0), (15.0, 20.0), (-15.0, 20.0), (8.0, 10.0), (-4.0, 5.0)]
        }
    }
}

fn from_basket(side: TeamSide, x: f32, depth: f32) -> Vec2 {
    let basket = side.attacking_basket();
    Vec2::new(x, basket.y - side.attack_direction() * depth)
}

/// Five set spots for the offense of `side`, with up to 2 ft of jitter.
pub fn offensive_positions<R: Rng + ?Sized>(
    side: TeamSide,
    play_call: PlayCall,
    rng: &mut R,
) -> [Vec2; 5] {
    set_template(play_call).map(|(x, depth)| {
        let jitter = Vec2::new(
            rng.gen_range(-FORMATION_JITTER..FORMATION_JITTER),
            rng.gen_range(-FORMATION_JITTER..FORMATION_JITTER),
        );
        clamp_to_court(from_basket(side, x, depth) + jitter)
    })
}

/// Mirror the offense. Man and press sit between each man and the rim, zones
/// hold fixed spots in front of the rim they protect.
pub fn defensive_positions(offense: &[Vec2], basket: Vec2, scheme: DefenseScheme) -> Vec<Vec2> {
    let toward_court = -basket.y.signum();
    let zone_spot = |(x, depth): (f32, f32)| Vec2::new(x, basket.y + toward_court * depth);

    match scheme {
        DefenseScheme::Man | DefenseScheme::Press => {
            let gap = if scheme == DefenseScheme::Press { PRESS_GAP } else { MAN_GAP };
            offense
                .iter()
                .map(|man| clamp_to_court(man + direction(man, &basket) * gap))
                .collect()
        }
        DefenseScheme::Zone23 => [(-6.0, 16.0), (6.0, 16.0), (-12.0, 6.0), (12.0, 6.0), (0.0, 4.0)]
            .into_iter()
            .map(zone_spot)
            .collect(),
        DefenseScheme::Zone32 => [(0.0, 20.0), (-14.0, 14.0), (14.0, 14.0), (-8.0, 5.0), (8.0, 5.0)]
            .into_iter()
            .map(zone_spot)
            .collect(),
    }
}

/// Sag off `assignment` toward the ball, shaded toward the rim.
pub fn help_defense_position(assignment: &Vec2, ball_handler: &Vec2, basket: &Vec2) -> Vec2 {
    let mid = (assignment + ball_handler) / 2.0;
    clamp_to_court(mid + direction(&mid, basket) * HELP_SHADE)
}

// ============================================================================
// Half-court churn
// ============================================================================

/// Move all ten on-court players through `seconds` of play and accrue their
/// fatigue. Off-ball cutters rotate through the set in motion offense; the
/// defense tracks them with its scheme. With `hold_ball` the handler works
/// from where they stand instead of running to a spot.
pub fn run_half_court<R: Rng + ?Sized>(
    state: &mut MatchState,
    seconds: f32,
    hold_ball: bool,
    rng: &mut R,
) {
    let offense = state.offense();
    let defense = offense.opponent();
    let off_tactics = *state.tactics(offense);
    let scheme = state.tactics(defense).defense_scheme;
    let basket = offense.attacking_basket();
    let off_ids = state.team(offense).on_court;
    let def_ids = state.team(defense).on_court;
    let all_ids: Vec<PlayerId> = off_ids.iter().chain(def_ids.iter()).copied().collect();
    let holder = state.ball.holder;
    let rotates = matches!(off_tactics.play_call, PlayCall::Motion | PlayCall::Auto);

    let mut targets = offensive_positions(offense, off_tactics.play_call, rng);
    let mut cuts = 0usize;
    let mut since_cut = 0.0;
    let mut remaining = seconds.max(0.0);

    while remaining > 0.0 {
        let dt = remaining.min(MOVEMENT_STEP);

        if since_cut >= CUT_INTERVAL {
            targets = offensive_positions(offense, off_tactics.play_call, rng);
            cuts += 1;
            since_cut = 0.0;
        }

        for (slot, id) in off_ids.iter().enumerate() {
            // Handler keeps the top; cutters rotate through the other spots.
            let spot = if rotates && slot > 0 { 1 + (slot - 1 + cuts) % 4 } else { slot };
            if let Some(p) = state.player_mut(*id) {
                let target = if hold_ball && Some(*id) == holder { p.position } else { targets[spot] };
                move_toward(p, target, dt, false);
            }
        }

        let off_positions: Vec<Vec2> = off_ids
            .iter()
            .filter_map(|id| state.player(*id).map(|p| p.position))
            .collect();
        let mut def_targets = defensive_positions(&off_positions, basket, scheme);
        if scheme == DefenseScheme::Man {
            // Off-ball defenders sag into help.
            if let Some(ball_pos) = holder.and_then(|h| state.player(h)).map(|p| p.position) {
                for (slot, id) in off_ids.iter().enumerate() {
                    if Some(*id) != holder {
                        if let (Some(t), Some(man)) = (def_targets.get_mut(slot), off_positions.get(slot)) {
                            *t = help_defense_position(man, &ball_pos, &basket);
                        }
                    }
                }
            }
        }
        for (slot, id) in def_ids.iter().enumerate() {
            if let (Some(target), Some(p)) = (def_targets.get(slot).copied(), state.player_mut(*id)) {
                move_toward(p, target, dt, true);
            }
        }

        resolve_collisions(&mut state.players, &all_ids);

        for id in off_ids {
            let active = Some(id) == holder || off_tactics.pace == Pace::Push;
            if let Some(p) = state.player_mut(id) {
                update_fatigue(p, dt, active);
            }
        }
        for id in def_ids {
            let active = scheme == DefenseScheme::Press;
            if let Some(p) = state.player_mut(id) {
                update_fatigue(p, dt, active);
            }
        }

        remaining -= dt;
        since_cut += dt;
    }

    if let Some(pos) = holder.and_then(|h| state.player(h)).map(|p| p.position) {
        state.ball.position = pos;
    }
}

/// Snap both lineups to their set spots with zero velocity.
pub fn set_lineups<R: Rng + ?Sized>(state: &mut MatchState, rng: &mut R) {
    let offense = state.offense();
    let defense = offense.opponent();
    let play_call = state.tactics(offense).play_call;
    let scheme = state.tactics(defense).defense_scheme;

    let spots = offensive_positions(offense, play_call, rng);
    let attackers = state.team(offense).on_court;
    let defenders = state.team(defense).on_court;
    for (id, spot) in attackers.into_iter().zip(spots) {
        if let Some(p) = state.player_mut(id) {
            p.position = spot;
            p.velocity = Vec2::zeros();
        }
    }
    let def_spots = defensive_positions(&spots, offense.attacking_basket(), scheme);
    for (id, spot) in defenders.into_iter().zip(def_spots) {
        if let Some(p) = state.player_mut(id) {
            p.position = spot;
            p.velocity = Vec2::zeros();
        }
    }
}
