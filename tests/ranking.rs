//! Integration tests for group standings and tie-breaks.

use basketball_tournament_sim::{
    head_to_head, rank_bucket, rank_group, rank_pots, BucketEntry, HeadToHeadCount, MatchResult,
    Progress, Team, TeamStats, Tournament, TournamentError,
};
use std::cmp::Ordering;

/// Scripted result: (winner, loser, winner points, loser points).
type Script<'a> = &'a [(&'a str, &'a str, u32, u32)];

fn four_team_group() -> Vec<Team> {
    vec![
        Team::new("Alpha", "A", 10),
        Team::new("Bravo", "B", 20),
        Team::new("Charlie", "C", 5),
        Team::new("Delta", "D", 30),
    ]
}

/// Play the whole group with results from `script`.
fn play_group(teams: Vec<Team>, script: Script) -> Tournament {
    let mut t = Tournament::round_robin(vec![teams]).unwrap();
    loop {
        let m = t.next_pending().expect("pending match").clone();
        let &(winner, _, w, l) = script
            .iter()
            .find(|(a, b, _, _)| m.involves(a) && m.involves(b))
            .expect("scripted result");
        let result = if m.t1 == winner {
            MatchResult::new(w, l)
        } else {
            MatchResult::new(l, w)
        };
        t.pending_match_mut(m.id).unwrap().set_result(result).unwrap();
        if t.mark_match_complete(m.id).unwrap() == Progress::Finished {
            return t;
        }
    }
}

fn stats_in_order(t: &Tournament, order: &[&str]) -> Vec<TeamStats> {
    order
        .iter()
        .map(|code| t.compile_stats_for(t.team(code).unwrap(), None))
        .collect()
}

fn codes(ranked: &[TeamStats]) -> Vec<&str> {
    ranked.iter().map(|s| s.code()).collect()
}

fn stats(code: &str, fiba: u32, points: u32, pts_for: u32, pts_against: u32) -> TeamStats {
    let won = points.saturating_sub(3).min(3);
    TeamStats {
        team: Team::new(code, code, fiba),
        played: 3,
        won,
        lost: 3 - won,
        pts_for,
        pts_against,
        pts_diff: i64::from(pts_for) - i64::from(pts_against),
        points,
    }
}

// A and B finish on 5 points; A won their meeting by a single point while B has the far
// better differential. C and D finish on 4; C won their meeting.
const TWO_WAY: Script = &[
    ("A", "B", 71, 70),
    ("D", "A", 80, 60),
    ("A", "C", 75, 74),
    ("B", "C", 100, 70),
    ("B", "D", 100, 70),
    ("C", "D", 85, 80),
];

#[test]
fn two_way_tie_goes_to_head_to_head_winner() {
    let t = play_group(four_team_group(), TWO_WAY);
    let table = stats_in_order(&t, &["B", "A", "D", "C"]);
    assert_eq!(table[0].points, 5);
    assert_eq!(table[1].points, 5);
    assert!(table[0].pts_diff > table[1].pts_diff);

    let ranked = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap();
    assert_eq!(codes(&ranked), ["A", "B", "C", "D"]);
}

#[test]
fn meeting_count_keeps_listed_order() {
    let t = play_group(four_team_group(), TWO_WAY);
    let table = stats_in_order(&t, &["B", "A", "D", "C"]);
    let ranked = rank_group(&t, &table, HeadToHeadCount::Meetings).unwrap();
    assert_eq!(codes(&ranked), ["B", "A", "D", "C"]);
}

#[test]
fn head_to_head_reports_direction() {
    let t = play_group(four_team_group(), TWO_WAY);
    assert_eq!(head_to_head(&t, "A", "B", HeadToHeadCount::Wins), Some(Ordering::Greater));
    assert_eq!(head_to_head(&t, "B", "A", HeadToHeadCount::Wins), Some(Ordering::Less));
    assert_eq!(head_to_head(&t, "A", "Z", HeadToHeadCount::Wins), None);
}

#[test]
fn three_way_tie_uses_mutual_point_difference_first() {
    // A, B, C beat D and each other in a cycle. Within the three: A +7, C -2, B -5.
    // B's blowout of D gives it the best group differential, which must not count first.
    let t = play_group(
        four_team_group(),
        &[
            ("A", "B", 90, 80),
            ("B", "C", 85, 80),
            ("C", "A", 80, 77),
            ("A", "D", 80, 75),
            ("B", "D", 120, 60),
            ("C", "D", 80, 75),
        ],
    );
    let table = stats_in_order(&t, &["A", "B", "C", "D"]);
    assert!(table.iter().take(3).all(|s| s.points == 5));
    assert!(table[1].pts_diff > table[0].pts_diff);

    let ranked = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap();
    assert_eq!(codes(&ranked), ["A", "C", "B", "D"]);
}

#[test]
fn three_way_tie_falls_back_to_mutual_points_scored() {
    // Every mutual game is won by 5, so mini-table differentials are all zero.
    // Points scored among the three: A 185, C 175, B 165.
    let t = play_group(
        four_team_group(),
        &[
            ("A", "B", 90, 85),
            ("B", "C", 80, 75),
            ("C", "A", 100, 95),
            ("A", "D", 70, 69),
            ("B", "D", 110, 60),
            ("C", "D", 70, 69),
        ],
    );
    let table = stats_in_order(&t, &["B", "C", "A", "D"]);
    let ranked = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap();
    assert_eq!(codes(&ranked), ["A", "C", "B", "D"]);
}

#[test]
fn level_head_to_head_is_fatal() {
    // Two teams level on points that never met.
    let t = Tournament::round_robin(vec![vec![
        Team::new("Xray", "X", 1),
        Team::new("Yankee", "Y", 2),
    ]])
    .unwrap();
    let table = vec![stats("P", 1, 5, 200, 190), stats("Q", 2, 5, 210, 190)];
    let err = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap_err();
    assert_eq!(
        err,
        TournamentError::UnresolvedHeadToHead {
            a: "P".into(),
            b: "Q".into()
        }
    );
    assert!(err.is_fatal());
}

#[test]
fn four_way_tie_is_not_resolved() {
    let t = Tournament::round_robin(vec![vec![
        Team::new("Xray", "X", 1),
        Team::new("Yankee", "Y", 2),
    ]])
    .unwrap();
    let table = vec![
        stats("P", 1, 6, 300, 290),
        stats("Q", 2, 6, 300, 290),
        stats("R", 3, 6, 300, 290),
        stats("S", 4, 6, 300, 290),
        stats("T", 5, 8, 300, 290),
    ];
    assert_eq!(
        rank_group(&t, &table, HeadToHeadCount::Wins),
        Err(TournamentError::UnsupportedTie { size: 4 })
    );
}

#[test]
fn bucket_prefers_points_then_difference_then_scored_then_ranking() {
    let entries: Vec<BucketEntry> = vec![
        stats("LOW", 1, 4, 300, 250),
        stats("DIFF", 9, 6, 250, 240),
        stats("TOP", 12, 6, 250, 200),
        stats("SCORED", 7, 6, 260, 250),
        stats("RANK", 3, 6, 250, 240),
    ]
    .into_iter()
    .map(BucketEntry::new)
    .collect();
    let ranked = rank_bucket(&entries);
    assert_eq!(codes(&ranked), ["TOP", "SCORED", "RANK", "DIFF", "LOW"]);
}

#[test]
fn bucket_stats_outrank_group_stats() {
    let entries = vec![
        BucketEntry::with_bucket(stats("A", 1, 5, 250, 200), stats("A", 1, 3, 150, 160)),
        BucketEntry::with_bucket(stats("B", 2, 5, 240, 230), stats("B", 2, 3, 160, 150)),
    ];
    assert_eq!(codes(&rank_bucket(&entries)), ["B", "A"]);
}

#[test]
fn pots_rank_each_finishing_place_across_groups() {
    let standings = vec![
        vec![stats("A1", 5, 6, 270, 220), stats("A2", 9, 5, 250, 240)],
        vec![stats("B1", 3, 6, 260, 230), stats("B2", 8, 5, 260, 240)],
        vec![stats("C1", 1, 5, 280, 230), stats("C2", 2, 4, 240, 250)],
    ];
    let overall = rank_pots(&standings);
    assert_eq!(codes(&overall), ["A1", "B1", "C1", "B2", "A2", "C2"]);
}

/// A, B and C beat each other in a cycle by 80-75, so their mutual games are level on both
/// differential and points scored. `vs_d` gives each one's score against D.
fn level_cycle(vs_d: [(u32, u32); 3]) -> Tournament {
    let [a, b, c] = vs_d;
    play_group(
        four_team_group(),
        &[
            ("A", "B", 80, 75),
            ("B", "C", 80, 75),
            ("C", "A", 80, 75),
            ("A", "D", a.0, a.1),
            ("B", "D", b.0, b.1),
            ("C", "D", c.0, c.1),
        ],
    )
}

#[test]
fn level_mini_table_falls_back_to_group_difference() {
    let t = level_cycle([(90, 70), (70, 60), (80, 65)]);
    let table = stats_in_order(&t, &["B", "C", "A", "D"]);
    let ranked = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap();
    assert_eq!(codes(&ranked), ["A", "C", "B", "D"]);
}

#[test]
fn level_mini_table_falls_back_to_group_points_scored() {
    let t = level_cycle([(70, 60), (90, 80), (80, 70)]);
    let table = stats_in_order(&t, &["A", "B", "C", "D"]);
    let ranked = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap();
    assert_eq!(codes(&ranked), ["B", "C", "A", "D"]);
}

#[test]
fn level_mini_table_falls_back_to_external_ranking() {
    // Identical group stats; rankings are A 10, B 20, C 5.
    let t = level_cycle([(70, 60), (70, 60), (70, 60)]);
    let table = stats_in_order(&t, &["A", "B", "C", "D"]);
    let ranked = rank_group(&t, &table, HeadToHeadCount::Wins).unwrap();
    assert_eq!(codes(&ranked), ["C", "A", "B", "D"]);
}
