//! Substitution policy and lineup ranking.

use super::thresholds;
use super::SubstitutionProposal;
use crate::engine::{CourtPlayer, MatchState};
use crate::models::{PlayerId, TeamSide};

/// 100 minus the mean absolute gap over speed, strength, shooting and defense.
pub fn skill_similarity(a: &CourtPlayer, b: &CourtPlayer) -> f32 {
    let gaps = [
        (a.speed - b.speed).abs(),
        (a.strength - b.strength).abs(),
        (a.shooting - b.shooting).abs(),
        (a.defense - b.defense).abs(),
    ];
    100.0 - gaps.iter().sum::<f32>() / gaps.len() as f32
}

/// Best rested bench player to replace `out`. Skips the disqualified, anyone
/// over the bench fatigue limit and anyone in `exclude`.
pub fn find_replacement(
    state: &MatchState,
    side: TeamSide,
    out: &CourtPlayer,
    exclude: &[PlayerId],
) -> Option<PlayerId> {
    state
        .bench(side)
        .filter(|b| !b.disqualified)
        .filter(|b| b.fatigue <= thresholds::BENCH_MAX_FATIGUE)
        .filter(|b| !exclude.contains(&b.id))
        .map(|b| {
            let rest = 100.0 - b.fatigue;
            (b.id, skill_similarity(out, b) * 0.5 + rest * 0.5)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Flag tired or foul-troubled players and pair them with replacements.
pub fn propose_substitutions(state: &MatchState, side: TeamSide) -> Vec<SubstitutionProposal> {
    let mut proposals: Vec<SubstitutionProposal> = Vec::new();
    let mut chosen: Vec<PlayerId> = Vec::new();

    for player in state.on_court(side) {
        if proposals.len() >= thresholds::MAX_SUBS_PER_STOPPAGE {
            break;
        }

        let tired = player.fatigue >= thresholds::FATIGUE_SUB;
        let in_foul_trouble = player.fouls >= thresholds::FOUL_TROUBLE;
        if !tired && !in_foul_trouble {
            continue;
        }

        let Some(replacement) = find_replacement(state, side, player, &chosen) else {
            continue;
        };

        let reason = if tired {
            format!("{} needs rest ({:.0}% fatigue)", player.display_name(), player.fatigue)
        } else {
            // Only worth it if the sub is in less trouble.
            let sub_fouls = state.player(replacement).map_or(u8::MAX, |p| p.fouls);
            if sub_fouls >= player.fouls {
                continue;
            }
            format!("{} in foul trouble ({} fouls)", player.display_name(), player.fouls)
        };

        chosen.push(replacement);
        proposals.push(SubstitutionProposal { player_out: player.id, player_in: replacement, reason });
    }

    proposals
}

/// Rank `candidates` by shooting + defense + speed - fatigue and return up to
/// five, preferring players under the lineup fatigue limit. Disqualified
/// players never make the list.
pub fn best_lineup(state: &MatchState, candidates: &[PlayerId]) -> Vec<PlayerId> {
    let mut ranked: Vec<&CourtPlayer> = candidates
        .iter()
        .filter_map(|id| state.player(*id))
        .filter(|p| !p.disqualified)
        .collect();
    let score = |p: &CourtPlayer| p.shooting + p.defense + p.speed - p.fatigue;
    ranked.sort_by(|a, b| score(b).total_cmp(&score(a)));

    let mut lineup: Vec<PlayerId> = ranked
        .iter()
        .filter(|p| p.fatigue < thresholds::LINEUP_MAX_FATIGUE)
        .take(5)
        .map(|p| p.id)
        .collect();
    for p in &ranked {
        if lineup.len() >= 5 {
            break;
        }
        if !lineup.contains(&p.id) {
            lineup.push(p.id);
        }
    }
    lineup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::demo_engine;

    #[test]
    fn test_tired_starters_get_rested_replacements() {
        let mut state = demo_engine(1).into_state();
        let tired: Vec<PlayerId> = state.home.on_court[..3].to_vec();
        for id in &tired {
            state.players[id.index()].fatigue = 70.0;
        }

        let proposals = propose_substitutions(&state, TeamSide::Home);
        assert_eq!(proposals.len(), thresholds::MAX_SUBS_PER_STOPPAGE);
        assert_ne!(proposals[0].player_in, proposals[1].player_in);
        for p in &proposals {
            assert!(tired.contains(&p.player_out));
            assert!(state.home.is_on_bench(p.player_in));
            assert!(p.reason.contains("needs rest"));
        }
    }

    #[test]
    fn test_no_replacement_when_bench_is_gassed_or_out() {
        let mut state = demo_engine(1).into_state();
        let out = state.home.on_court[0];
        state.players[out.index()].fatigue = 90.0;
        for (i, id) in state.home.bench.clone().into_iter().enumerate() {
            if i % 2 == 0 {
                state.players[id.index()].fatigue = thresholds::BENCH_MAX_FATIGUE + 1.0;
            } else {
                state.players[id.index()].disqualified = true;
            }
        }

        let out_player = state.player(out).unwrap();
        assert_eq!(find_replacement(&state, TeamSide::Home, out_player, &[]), None);
        assert!(propose_substitutions(&state, TeamSide::Home).is_empty());
    }

    #[test]
    fn test_foul_trouble_needs_a_cleaner_sub() {
        let mut state = demo_engine(1).into_state();
        let out = state.home.on_court[1];
        state.players[out.index()].fouls = 4;
        for id in state.home.bench.clone() {
            state.players[id.index()].fouls = 5;
        }
        assert!(propose_substitutions(&state, TeamSide::Home).is_empty());

        for id in state.home.bench.clone() {
            state.players[id.index()].fouls = 0;
        }
        let proposals = propose_substitutions(&state, TeamSide::Home);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].player_out, out);
        assert!(proposals[0].reason.contains("foul trouble"));
    }

    #[test]
    fn test_best_lineup_skips_disqualified_and_prefers_fresh_legs() {
        let mut state = demo_engine(1).into_state();
        let all: Vec<PlayerId> = state.home.roster().collect();
        let star = all[0];
        let benched_star = all[1];
        state.players[star.index()].disqualified = true;
        state.players[benched_star.index()].fatigue = 95.0;

        let lineup = best_lineup(&state, &all);
        assert_eq!(lineup.len(), 5);
        assert!(!lineup.contains(&star));
        assert!(!lineup.contains(&benched_star));
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let state = demo_engine(1).into_state();
        let a = &state.players[0];
        let b = &state.players[4];
        assert_eq!(skill_similarity(a, b), skill_similarity(b, a));
        assert_eq!(skill_similarity(a, a), 100.0);
    }
}
