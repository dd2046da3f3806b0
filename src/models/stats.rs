//! Aggregated statistics for one team over a set of completed matches.

use crate::models::game::GameMatch;
use crate::models::team::Team;
use serde::{Deserialize, Serialize};

/// Standings line for a team. Always recomputed from a match list, never updated in place.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team: Team,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub pts_for: u32,
    pub pts_against: u32,
    pub pts_diff: i64,
    /// Ranking points: 2 for a win, 1 for a loss.
    pub points: u32,
}

impl TeamStats {
    /// Compile stats for `team` from `matches`. Matches without a result, or that `team`
    /// does not play in, are ignored.
    pub fn compile<'a>(team: &Team, matches: impl IntoIterator<Item = &'a GameMatch>) -> Self {
        let mut stats = Self {
            team: team.clone(),
            played: 0,
            won: 0,
            lost: 0,
            pts_for: 0,
            pts_against: 0,
            pts_diff: 0,
            points: 0,
        };
        for m in matches {
            let (Some(result), Some(side)) = (m.result, m.side_of(&team.iso_code)) else {
                continue;
            };
            stats.played += 1;
            stats.pts_for += result.score(side);
            stats.pts_against += result.score(side.other());
            if result.winning_side() == Some(side) {
                stats.won += 1;
                stats.points += 2;
            } else {
                stats.lost += 1;
                stats.points += 1;
            }
        }
        stats.pts_diff = i64::from(stats.pts_for) - i64::from(stats.pts_against);
        stats
    }

    pub fn code(&self) -> &str {
        &self.team.iso_code
    }
}
