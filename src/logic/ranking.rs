//! Group standings and cross-group ranking with FIBA-style tie-breaks.

use crate::config::HeadToHeadCount;
use crate::models::{GameMatch, TeamCode, TeamStats, Tournament, TournamentError};
use std::cmp::Ordering;

/// A team's full-group stats, plus its stats within a tied sub-group when resolving a tie.
#[derive(Clone, Debug)]
pub struct BucketEntry {
    pub group: TeamStats,
    pub bucket: Option<TeamStats>,
}

impl BucketEntry {
    pub fn new(group: TeamStats) -> Self {
        Self {
            group,
            bucket: None,
        }
    }

    pub fn with_bucket(group: TeamStats, bucket: TeamStats) -> Self {
        Self {
            group,
            bucket: Some(bucket),
        }
    }
}

/// Order entries by:
/// points, then (when both have sub-group stats) sub-group differential and points scored,
/// then group differential, group points scored, and finally the better external ranking.
pub fn rank_bucket(entries: &[BucketEntry]) -> Vec<TeamStats> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(compare_entries);
    sorted.into_iter().map(|e| e.group).collect()
}

fn compare_entries(a: &BucketEntry, b: &BucketEntry) -> Ordering {
    b.group
        .points
        .cmp(&a.group.points)
        .then_with(|| match (&a.bucket, &b.bucket) {
            (Some(ab), Some(bb)) => bb
                .pts_diff
                .cmp(&ab.pts_diff)
                .then_with(|| bb.pts_for.cmp(&ab.pts_for)),
            _ => Ordering::Equal,
        })
        .then_with(|| b.group.pts_diff.cmp(&a.group.pts_diff))
        .then_with(|| b.group.pts_for.cmp(&a.group.pts_for))
        .then_with(|| a.group.team.fiba_ranking.cmp(&b.group.team.fiba_ranking))
}

/// Head-to-head between `a` and `b` over completed matches: `Greater` if `a` is ahead,
/// `Less` if `b` is, `Equal` if level. `None` when they never met.
pub fn head_to_head(
    tournament: &Tournament,
    a: &str,
    b: &str,
    count: HeadToHeadCount,
) -> Option<Ordering> {
    let meetings: Vec<&GameMatch> = tournament
        .completed()
        .iter()
        .filter(|m| m.involves(a) && m.involves(b))
        .collect();
    if meetings.is_empty() {
        return None;
    }
    let a_wins = match count {
        HeadToHeadCount::Wins => meetings
            .iter()
            .filter(|m| m.winner().map(String::as_str) == Some(a))
            .count(),
        HeadToHeadCount::Meetings => meetings.len(),
    };
    Some((2 * a_wins).cmp(&meetings.len()))
}

/// Final order of one group.
///
/// Teams are split into runs of equal points. A lone team keeps its place; two teams are
/// separated by their meeting; three teams by a mini-table of their mutual matches (see
/// [`rank_bucket`]). Larger ties have no defined rule and are rejected.
pub fn rank_group(
    tournament: &Tournament,
    group_stats: &[TeamStats],
    count: HeadToHeadCount,
) -> Result<Vec<TeamStats>, TournamentError> {
    let mut remaining = group_stats.to_vec();
    remaining.sort_by(|a, b| b.points.cmp(&a.points));

    let mut ranked = Vec::with_capacity(remaining.len());
    for bucket in remaining.chunk_by(|a, b| a.points == b.points) {
        match bucket {
            [only] => ranked.push(only.clone()),
            [s1, s2] => match head_to_head(tournament, s1.code(), s2.code(), count) {
                Some(Ordering::Greater) => ranked.extend([s1.clone(), s2.clone()]),
                Some(Ordering::Less) => ranked.extend([s2.clone(), s1.clone()]),
                _ => {
                    return Err(TournamentError::UnresolvedHeadToHead {
                        a: s1.team.iso_code.clone(),
                        b: s2.team.iso_code.clone(),
                    })
                }
            },
            [_, _, _] => {
                let codes: Vec<TeamCode> = bucket.iter().map(|s| s.team.iso_code.clone()).collect();
                log::debug!("Three-way tie on {} points: {}", bucket[0].points, codes.join(", "));
                let entries: Vec<BucketEntry> = bucket
                    .iter()
                    .map(|s| {
                        BucketEntry::with_bucket(
                            s.clone(),
                            tournament.compile_stats_for(&s.team, Some(&codes)),
                        )
                    })
                    .collect();
                ranked.extend(rank_bucket(&entries));
            }
            _ => return Err(TournamentError::UnsupportedTie { size: bucket.len() }),
        }
    }
    Ok(ranked)
}

/// Rank all group winners against each other, then all runners-up, and so on, and concatenate.
/// `standings` are already-ranked groups.
pub fn rank_pots(standings: &[Vec<TeamStats>]) -> Vec<TeamStats> {
    let depth = standings.iter().map(Vec::len).max().unwrap_or(0);
    (0..depth)
        .flat_map(|place| {
            let entries: Vec<BucketEntry> = standings
                .iter()
                .filter_map(|group| group.get(place).cloned())
                .map(BucketEntry::new)
                .collect();
            rank_bucket(&entries)
        })
        .collect()
}
