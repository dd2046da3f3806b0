//! Tournament: participants, pending/completed match queues and the active format.

use crate::models::format::{Format, RoundRobin, SingleElimination};
use crate::models::game::{GameMatch, MatchId};
use crate::models::stats::TeamStats;
use crate::models::team::{Team, TeamCode};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// The match is not in the pending queue.
    MatchNotPending(MatchId),
    /// The match has no result yet.
    MatchNotPlayed(MatchId),
    /// A result was already recorded for this match.
    ResultAlreadyRecorded(MatchId),
    /// No participant or roster entry with this code.
    UnknownTeam(TeamCode),
    /// Group layout cannot be scheduled.
    InvalidGroups(String),
    /// Knockout first round cannot form a bracket.
    InvalidBracket(String),
    /// Two teams tied on points could not be separated by their meetings.
    UnresolvedHeadToHead { a: TeamCode, b: TeamCode },
    /// No tie-break rule exists for this many teams level on points.
    UnsupportedTie { size: usize },
    /// Every pairing of the two pots repeats a group-stage meeting.
    UnsatisfiableDraw { pot_1: Vec<TeamCode>, pot_2: Vec<TeamCode> },
    /// A winner (or loser) was required but the match is unplayed or tied.
    MissingWinner(MatchId),
    /// Configuration values out of range.
    InvalidConfig(String),
    /// An exhibition score could not be parsed.
    InvalidScore(String),
}

impl TournamentError {
    /// Logical impossibilities: these mean a contract was broken elsewhere and the run must stop,
    /// as opposed to ordinary validation failures on caller input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TournamentError::UnresolvedHeadToHead { .. }
                | TournamentError::UnsupportedTie { .. }
                | TournamentError::UnsatisfiableDraw { .. }
                | TournamentError::MissingWinner(_)
        )
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::MatchNotPending(id) => write!(f, "Match {} is not pending", id),
            TournamentError::MatchNotPlayed(id) => write!(f, "Match {} has no result", id),
            TournamentError::ResultAlreadyRecorded(id) => {
                write!(f, "Match {} already has a result", id)
            }
            TournamentError::UnknownTeam(code) => write!(f, "Unknown team {}", code),
            TournamentError::InvalidGroups(msg) => write!(f, "Invalid groups: {}", msg),
            TournamentError::InvalidBracket(msg) => write!(f, "Invalid bracket: {}", msg),
            TournamentError::UnresolvedHeadToHead { a, b } => {
                write!(f, "Head-to-head between {} and {} is level", a, b)
            }
            TournamentError::UnsupportedTie { size } => {
                write!(f, "No tie-break defined for {} teams level on points", size)
            }
            TournamentError::UnsatisfiableDraw { pot_1, pot_2 } => write!(
                f,
                "No legal pairing between pots [{}] and [{}]",
                pot_1.join(", "),
                pot_2.join(", ")
            ),
            TournamentError::MissingWinner(id) => write!(f, "Match {} has no winner", id),
            TournamentError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            TournamentError::InvalidScore(score) => write!(f, "Invalid score \"{}\"", score),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Whether a tournament still has matches to play.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Continue,
    Finished,
}

/// One stage of competition. Every match is either pending or completed, never both.
#[derive(Clone, Debug, Serialize)]
pub struct Tournament {
    pub id: TournamentId,
    participants: Vec<Team>,
    format: Format,
    /// Matches still to play; the front is next.
    pending: VecDeque<GameMatch>,
    /// Played matches in completion order.
    completed: Vec<GameMatch>,
}

impl Tournament {
    /// Group stage over `groups`; round 0 of every group is pending right away.
    pub fn round_robin(groups: Vec<Vec<Team>>) -> Result<Self, TournamentError> {
        let format = RoundRobin::new(groups)?;
        let participants = format.groups().concat();
        let pending = format.opening_round().into();
        Ok(Self {
            id: Uuid::new_v4(),
            participants,
            format: Format::RoundRobin(format),
            pending,
            completed: Vec::new(),
        })
    }

    /// Knockout stage: one round-0 match per seeded pairing.
    pub fn single_elimination(
        participants: Vec<Team>,
        pairings: &[(TeamCode, TeamCode)],
    ) -> Result<Self, TournamentError> {
        let mut seeded = HashSet::new();
        for (t1, t2) in pairings {
            for code in [t1, t2] {
                if !participants.iter().any(|t| &t.iso_code == code) {
                    return Err(TournamentError::UnknownTeam(code.clone()));
                }
                if !seeded.insert(code.as_str()) {
                    return Err(TournamentError::InvalidBracket(format!(
                        "team {} is drawn more than once",
                        code
                    )));
                }
            }
        }
        let opening: Vec<GameMatch> = pairings
            .iter()
            .map(|(t1, t2)| GameMatch::new(t1.clone(), t2.clone()).in_round(0))
            .collect();
        let format = SingleElimination::new(&opening)?;
        Ok(Self {
            id: Uuid::new_v4(),
            participants,
            format: Format::SingleElimination(format),
            pending: opening.into(),
            completed: Vec::new(),
        })
    }

    pub fn participants(&self) -> &[Team] {
        &self.participants
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn round_robin_format(&self) -> Option<&RoundRobin> {
        match &self.format {
            Format::RoundRobin(rr) => Some(rr),
            Format::SingleElimination(_) => None,
        }
    }

    pub fn single_elimination_format(&self) -> Option<&SingleElimination> {
        match &self.format {
            Format::SingleElimination(se) => Some(se),
            Format::RoundRobin(_) => None,
        }
    }

    pub fn pending(&self) -> &VecDeque<GameMatch> {
        &self.pending
    }

    pub fn completed(&self) -> &[GameMatch] {
        &self.completed
    }

    /// Next match to play.
    pub fn next_pending(&self) -> Option<&GameMatch> {
        self.pending.front()
    }

    /// Mutable access to a pending match, to record its result.
    pub fn pending_match_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, TournamentError> {
        self.pending
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchNotPending(id))
    }

    pub fn completed_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.completed.iter().find(|m| m.id == id)
    }

    pub fn team(&self, code: &str) -> Result<&Team, TournamentError> {
        self.participants
            .iter()
            .find(|t| t.iso_code == code)
            .ok_or_else(|| TournamentError::UnknownTeam(code.to_string()))
    }

    /// Move a played match from pending to completed and let the format release more matches.
    ///
    /// If the format cannot advance (e.g. a knockout match without a winner), the match goes
    /// back to its place in the pending queue and the tournament is left as it was.
    pub fn mark_match_complete(&mut self, id: MatchId) -> Result<Progress, TournamentError> {
        let idx = self
            .pending
            .iter()
            .position(|m| m.id == id)
            .ok_or(TournamentError::MatchNotPending(id))?;
        if !self.pending[idx].is_finished() {
            return Err(TournamentError::MatchNotPlayed(id));
        }
        let Some(m) = self.pending.remove(idx) else {
            return Err(TournamentError::MatchNotPending(id));
        };
        self.completed.push(m);
        match self.format.advance(&self.completed, &mut self.pending) {
            Ok(progress) => Ok(progress),
            Err(e) => {
                // Formats fail before touching their own state or the queue.
                if let Some(m) = self.completed.pop() {
                    self.pending.insert(idx, m);
                }
                Err(e)
            }
        }
    }

    /// Stats for `team` over completed matches, optionally only those against `opponents`.
    pub fn compile_stats_for(&self, team: &Team, opponents: Option<&[TeamCode]>) -> TeamStats {
        let matches = self.completed.iter().filter(|m| {
            match (m.opponent_of(&team.iso_code), opponents) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(other), Some(allowed)) => allowed.contains(other),
            }
        });
        TeamStats::compile(team, matches)
    }
}
