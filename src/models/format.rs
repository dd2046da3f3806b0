//! Tournament formats: how the schedule is built and when the next batch of matches is released.

use crate::models::game::{GameMatch, MatchId};
use crate::models::team::{Team, TeamCode};
use crate::models::tournament::{Progress, TournamentError};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// The active format of a tournament. Exactly one per tournament.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Format {
    RoundRobin(RoundRobin),
    SingleElimination(SingleElimination),
}

impl Format {
    /// Called after every completed match. Releases the next round into `pending` once the
    /// current one is fully played.
    pub fn advance(
        &mut self,
        completed: &[GameMatch],
        pending: &mut VecDeque<GameMatch>,
    ) -> Result<Progress, TournamentError> {
        match self {
            Format::RoundRobin(rr) => Ok(rr.advance(pending)),
            Format::SingleElimination(se) => se.advance(completed, pending),
        }
    }
}

/// All-play-all groups, scheduled with the circle method.
#[derive(Clone, Debug, Serialize)]
pub struct RoundRobin {
    groups: Vec<Vec<Team>>,
    /// Overall rounds; round `i` holds round `i` of every group.
    rounds: Vec<Vec<GameMatch>>,
    current_round: usize,
}

impl RoundRobin {
    /// Build the full schedule. Seed order within a group decides the circle positions:
    /// the last seed stays fixed while the others rotate.
    pub fn new(groups: Vec<Vec<Team>>) -> Result<Self, TournamentError> {
        if groups.is_empty() {
            return Err(TournamentError::InvalidGroups("no groups given".into()));
        }
        let mut seen = HashSet::new();
        for (gi, group) in groups.iter().enumerate() {
            if group.len() < 2 {
                return Err(TournamentError::InvalidGroups(format!(
                    "group {} has {} team(s), need at least 2",
                    gi,
                    group.len()
                )));
            }
            for team in group {
                if !seen.insert(team.iso_code.as_str()) {
                    return Err(TournamentError::InvalidGroups(format!(
                        "team {} appears more than once",
                        team.iso_code
                    )));
                }
            }
        }

        let mut rounds: Vec<Vec<GameMatch>> = Vec::new();
        for (gi, group) in groups.iter().enumerate() {
            let group_rounds = circle_rounds(group, gi);
            while rounds.len() < group_rounds.len() {
                rounds.push(Vec::new());
            }
            for (ri, round) in group_rounds.into_iter().enumerate() {
                rounds[ri].extend(round);
            }
        }

        Ok(Self {
            groups,
            rounds,
            current_round: 0,
        })
    }

    pub fn groups(&self) -> &[Vec<Team>] {
        &self.groups
    }

    pub fn rounds(&self) -> &[Vec<GameMatch>] {
        &self.rounds
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Index of the group `code` was drawn into.
    pub fn group_of(&self, code: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| g.iter().any(|t| t.iso_code == code))
    }

    /// Team code to group index, for every participant.
    pub fn group_map(&self) -> HashMap<TeamCode, usize> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| g.iter().map(move |t| (t.iso_code.clone(), gi)))
            .collect()
    }

    pub(crate) fn opening_round(&self) -> Vec<GameMatch> {
        self.rounds.first().cloned().unwrap_or_default()
    }

    fn advance(&mut self, pending: &mut VecDeque<GameMatch>) -> Progress {
        // Only release the next round once the whole current round is played.
        if !pending.is_empty() {
            return Progress::Continue;
        }
        self.current_round += 1;
        match self.rounds.get(self.current_round) {
            Some(round) => {
                log::debug!("Round-robin: releasing round {}", self.current_round);
                pending.extend(round.iter().cloned());
                Progress::Continue
            }
            None => Progress::Finished,
        }
    }
}

/// Circle method for one group.
///
/// With seeds `0..n`, seed `n-1` is fixed (for odd `n` a phantom seed takes that spot and its
/// opponent sits the round out). Round `r` opens with the fixed seed against seed `r`, the fixed
/// seed switching sides on odd rounds; then `(r+m) mod rounds` meets `(r-m) mod rounds`.
fn circle_rounds(group: &[Team], group_index: usize) -> Vec<Vec<GameMatch>> {
    let n = group.len();
    let slots = if n % 2 == 0 { n } else { n + 1 };
    let rounds = slots - 1;
    let fixed = slots - 1;

    (0..rounds)
        .map(|ri| {
            let mut round = Vec::with_capacity(slots / 2);
            if fixed < n {
                let (a, b) = if ri % 2 == 1 { (fixed, ri) } else { (ri, fixed) };
                round.push(pairing(group, a, b, ri, group_index));
            }
            for mi in 1..slots / 2 {
                let top = (ri + mi) % rounds;
                let bot = (ri + rounds - mi) % rounds;
                round.push(pairing(group, top, bot, ri, group_index));
            }
            round
        })
        .collect()
}

fn pairing(group: &[Team], a: usize, b: usize, round: usize, group_index: usize) -> GameMatch {
    GameMatch::new(group[a].iso_code.clone(), group[b].iso_code.clone())
        .in_round(round)
        .in_group(group_index)
}

/// Knockout bracket. Rounds after the first are built lazily from the previous round's winners.
#[derive(Clone, Debug, Serialize)]
pub struct SingleElimination {
    rounds: Vec<Vec<MatchId>>,
    /// Also marks that the final has been scheduled.
    third_place_match: Option<MatchId>,
}

impl SingleElimination {
    /// `opening` is the seeded first round; its size must be a power of two.
    pub(crate) fn new(opening: &[GameMatch]) -> Result<Self, TournamentError> {
        if opening.is_empty() || !opening.len().is_power_of_two() {
            return Err(TournamentError::InvalidBracket(format!(
                "first round has {} matches, need a power of two",
                opening.len()
            )));
        }
        Ok(Self {
            rounds: vec![opening.iter().map(|m| m.id).collect()],
            third_place_match: None,
        })
    }

    pub fn rounds(&self) -> &[Vec<MatchId>] {
        &self.rounds
    }

    pub fn third_place_match(&self) -> Option<MatchId> {
        self.third_place_match
    }

    /// The deciding match of the bracket, once scheduled.
    pub fn final_match(&self) -> Option<MatchId> {
        let last = self.rounds.last()?;
        if last.len() == 1 {
            last.first().copied()
        } else {
            None
        }
    }

    fn advance(
        &mut self,
        completed: &[GameMatch],
        pending: &mut VecDeque<GameMatch>,
    ) -> Result<Progress, TournamentError> {
        if !pending.is_empty() {
            return Ok(Progress::Continue);
        }
        if self.third_place_match.is_some() {
            return Ok(Progress::Finished);
        }
        let last = match self.rounds.last() {
            Some(last) if last.len() > 1 => last,
            _ => return Ok(Progress::Finished),
        };

        let played = last
            .iter()
            .map(|id| {
                completed
                    .iter()
                    .find(|m| m.id == *id)
                    .ok_or(TournamentError::MatchNotPlayed(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let new_round_idx = self.rounds.len();
        let mut new_round = played
            .chunks_exact(2)
            .map(|pair| {
                Ok(GameMatch::new(winner_of(pair[0])?.clone(), winner_of(pair[1])?.clone())
                    .in_round(new_round_idx))
            })
            .collect::<Result<Vec<_>, TournamentError>>()?;

        if new_round.len() == 1 {
            // Bronze and gold share a slot; shift the final so the two stay distinguishable,
            // and queue bronze first.
            new_round[0].round = Some(new_round_idx + 1);
            let bronze = GameMatch::new(loser_of(played[0])?.clone(), loser_of(played[1])?.clone())
                .in_round(new_round_idx);
            log::info!("Knockout: bronze medal match {} - {}", bronze.t1, bronze.t2);
            self.third_place_match = Some(bronze.id);
            pending.push_back(bronze);
        }

        log::info!(
            "Knockout: round {} with {} match(es)",
            new_round_idx,
            new_round.len()
        );
        self.rounds.push(new_round.iter().map(|m| m.id).collect());
        pending.extend(new_round);
        Ok(Progress::Continue)
    }
}

fn winner_of(m: &GameMatch) -> Result<&TeamCode, TournamentError> {
    m.winner().ok_or(TournamentError::MissingWinner(m.id))
}

fn loser_of(m: &GameMatch) -> Result<&TeamCode, TournamentError> {
    m.loser().ok_or(TournamentError::MissingWinner(m.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(n: usize) -> Vec<Team> {
        (0..n)
            .map(|i| Team::new(format!("Team {i}"), format!("T{i}"), i as u32 + 1))
            .collect()
    }

    fn codes(m: &GameMatch) -> (&str, &str) {
        (m.t1.as_str(), m.t2.as_str())
    }

    #[test]
    fn four_team_circle_matches_olympic_order() {
        let rounds = circle_rounds(&group(4), 0);
        assert_eq!(rounds.len(), 3);
        assert_eq!(codes(&rounds[0][0]), ("T0", "T3"));
        assert_eq!(codes(&rounds[0][1]), ("T1", "T2"));
        assert_eq!(codes(&rounds[1][0]), ("T3", "T1"));
        assert_eq!(codes(&rounds[1][1]), ("T2", "T0"));
        assert_eq!(codes(&rounds[2][0]), ("T2", "T3"));
        assert_eq!(codes(&rounds[2][1]), ("T0", "T1"));
    }

    #[test]
    fn odd_group_leaves_seed_r_out() {
        let rounds = circle_rounds(&group(5), 2);
        assert_eq!(rounds.len(), 5);
        for (ri, round) in rounds.iter().enumerate() {
            assert_eq!(round.len(), 2);
            let resting = format!("T{ri}");
            assert!(round.iter().all(|m| !m.involves(&resting)));
            assert!(round.iter().all(|m| m.group == Some(2) && m.round == Some(ri)));
        }
    }
}
