//! Integration tests for the group stage: circle-method schedule and round release.

use basketball_tournament_sim::{
    GameMatch, MatchResult, Progress, Team, Tournament, TournamentError,
};
use std::collections::HashSet;
use uuid::Uuid;

fn group(prefix: &str, n: usize) -> Vec<Team> {
    (0..n)
        .map(|i| Team::new(format!("{prefix} {i}"), format!("{prefix}{i}"), i as u32 + 1))
        .collect()
}

fn pair_key(m: &GameMatch) -> (String, String) {
    if m.t1 < m.t2 {
        (m.t1.clone(), m.t2.clone())
    } else {
        (m.t2.clone(), m.t1.clone())
    }
}

/// Score the next pending match with `t1` winning 80-70 and complete it.
fn complete_next(t: &mut Tournament) -> Progress {
    let id = t.next_pending().expect("a pending match").id;
    t.pending_match_mut(id)
        .unwrap()
        .set_result(MatchResult::new(80, 70))
        .unwrap();
    t.mark_match_complete(id).unwrap()
}

#[test]
fn even_groups_meet_everyone_exactly_once() {
    for n in [2, 4, 6, 8, 10] {
        let t = Tournament::round_robin(vec![group("T", n)]).unwrap();
        let rr = t.round_robin_format().unwrap();
        assert_eq!(rr.rounds().len(), n - 1, "rounds for {n} teams");

        let mut pairs = HashSet::new();
        for round in rr.rounds() {
            assert_eq!(round.len(), n / 2);
            let mut playing = HashSet::new();
            for m in round {
                assert!(playing.insert(m.t1.clone()));
                assert!(playing.insert(m.t2.clone()));
                assert!(pairs.insert(pair_key(m)), "repeat pairing {:?}", pair_key(m));
            }
        }
        assert_eq!(pairs.len(), n * (n - 1) / 2);
    }
}

#[test]
fn odd_groups_rest_one_team_per_round() {
    for n in [3, 5, 7, 9] {
        let teams = group("T", n);
        let t = Tournament::round_robin(vec![teams.clone()]).unwrap();
        let rr = t.round_robin_format().unwrap();
        assert_eq!(rr.rounds().len(), n);

        let mut pairs = HashSet::new();
        for round in rr.rounds() {
            assert_eq!(round.len(), (n - 1) / 2);
            let resting = teams
                .iter()
                .filter(|team| !round.iter().any(|m| m.involves(&team.iso_code)))
                .count();
            assert_eq!(resting, 1);
            for m in round {
                assert!(pairs.insert(pair_key(m)));
            }
        }
        assert_eq!(pairs.len(), n * (n - 1) / 2);
    }
}

#[test]
fn fixed_seed_alternates_sides() {
    let t = Tournament::round_robin(vec![group("T", 6)]).unwrap();
    let rr = t.round_robin_format().unwrap();
    for (ri, round) in rr.rounds().iter().enumerate() {
        let opener = &round[0];
        if ri % 2 == 0 {
            assert_eq!(opener.t2, "T5");
        } else {
            assert_eq!(opener.t1, "T5");
        }
    }
}

#[test]
fn groups_are_interleaved_round_by_round() {
    let t = Tournament::round_robin(vec![group("A", 4), group("B", 4), group("C", 4)]).unwrap();
    let pending: Vec<_> = t.pending().iter().collect();
    assert_eq!(pending.len(), 6);
    let groups: Vec<_> = pending.iter().map(|m| m.group).collect();
    assert_eq!(
        groups,
        [Some(0), Some(0), Some(1), Some(1), Some(2), Some(2)]
    );
    assert!(pending.iter().all(|m| m.round == Some(0)));
    assert_eq!(t.participants().len(), 12);
}

#[test]
fn next_round_is_released_only_when_current_is_done() {
    let mut t =
        Tournament::round_robin(vec![group("A", 4), group("B", 4), group("C", 4)]).unwrap();

    for _ in 0..5 {
        assert_eq!(complete_next(&mut t), Progress::Continue);
        assert!(t.pending().iter().all(|m| m.round == Some(0)));
    }
    assert_eq!(complete_next(&mut t), Progress::Continue);
    assert_eq!(t.pending().len(), 6);
    assert!(t.pending().iter().all(|m| m.round == Some(1)));

    let mut progress = Progress::Continue;
    while progress == Progress::Continue {
        progress = complete_next(&mut t);
    }
    assert_eq!(t.completed().len(), 18);
    assert!(t.pending().is_empty());
    assert_eq!(t.round_robin_format().unwrap().current_round(), 3);
}

#[test]
fn stats_add_up_after_group_stage() {
    let teams = group("A", 4);
    let mut t = Tournament::round_robin(vec![teams.clone()]).unwrap();
    while complete_next(&mut t) == Progress::Continue {}

    for team in &teams {
        let s = t.compile_stats_for(team, None);
        assert_eq!(s.played, 3);
        assert_eq!(s.played, s.won + s.lost);
        assert_eq!(s.pts_diff, i64::from(s.pts_for) - i64::from(s.pts_against));
        assert_eq!(s.points, 2 * s.won + s.lost);
    }
}

#[test]
fn stats_can_be_restricted_to_opponents() {
    let teams = group("A", 4);
    let mut t = Tournament::round_robin(vec![teams.clone()]).unwrap();
    while complete_next(&mut t) == Progress::Continue {}

    let opponents = vec!["A1".to_string(), "A2".to_string()];
    let s = t.compile_stats_for(&teams[0], Some(&opponents));
    assert_eq!(s.played, 2);
}

#[test]
fn stats_grow_as_matches_complete() {
    let teams = group("A", 4);
    let mut t = Tournament::round_robin(vec![teams.clone()]).unwrap();
    assert_eq!(t.compile_stats_for(&teams[0], None).played, 0);
    complete_next(&mut t);
    complete_next(&mut t);
    assert_eq!(t.compile_stats_for(&teams[0], None).played, 1);
    assert_eq!(t.compile_stats_for(&teams[0], None).played, 1);
}

#[test]
fn completing_a_match_that_is_not_pending_fails() {
    let mut t = Tournament::round_robin(vec![group("A", 4)]).unwrap();
    let stranger = Uuid::new_v4();
    assert_eq!(
        t.mark_match_complete(stranger),
        Err(TournamentError::MatchNotPending(stranger))
    );

    let id = t.next_pending().unwrap().id;
    t.pending_match_mut(id)
        .unwrap()
        .set_result(MatchResult::new(70, 60))
        .unwrap();
    t.mark_match_complete(id).unwrap();
    assert_eq!(
        t.mark_match_complete(id),
        Err(TournamentError::MatchNotPending(id))
    );
    assert_eq!(t.completed().len(), 1);
}

#[test]
fn unplayed_match_cannot_be_completed() {
    let mut t = Tournament::round_robin(vec![group("A", 4)]).unwrap();
    let id = t.next_pending().unwrap().id;
    assert_eq!(
        t.mark_match_complete(id),
        Err(TournamentError::MatchNotPlayed(id))
    );
    assert_eq!(t.pending().len(), 2);
}

#[test]
fn result_is_immutable_once_set() {
    let mut t = Tournament::round_robin(vec![group("A", 2)]).unwrap();
    let id = t.next_pending().unwrap().id;
    let m = t.pending_match_mut(id).unwrap();
    m.set_result(MatchResult::new(70, 60)).unwrap();
    assert_eq!(
        m.set_result(MatchResult::new(60, 70)),
        Err(TournamentError::ResultAlreadyRecorded(id))
    );
}

#[test]
fn invalid_groups_are_rejected() {
    assert!(matches!(
        Tournament::round_robin(vec![]),
        Err(TournamentError::InvalidGroups(_))
    ));
    assert!(matches!(
        Tournament::round_robin(vec![group("A", 1)]),
        Err(TournamentError::InvalidGroups(_))
    ));
    assert!(matches!(
        Tournament::round_robin(vec![group("A", 4), group("A", 4)]),
        Err(TournamentError::InvalidGroups(_))
    ));
}

#[test]
fn tied_score_has_no_winner() {
    let mut m = GameMatch::new("AAA", "BBB");
    assert_eq!(m.winner(), None);
    m.set_result(MatchResult::new(77, 77)).unwrap();
    assert_eq!(m.winner(), None);
    assert_eq!(m.loser(), None);
    assert!(!m.t1_won() && !m.t2_won());
}
