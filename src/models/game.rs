//! Match (game) between two teams, its result and derived winner/loser.

use crate::models::team::TeamCode;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Final score of a match, from each side's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub t1: u32,
    pub t2: u32,
}

impl MatchResult {
    pub fn new(t1: u32, t2: u32) -> Self {
        Self { t1, t2 }
    }

    /// Winning side, `None` on an exact tie.
    pub fn winning_side(&self) -> Option<Side> {
        match self.t1.cmp(&self.t2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Points scored by `side`.
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::One => self.t1,
            Side::Two => self.t2,
        }
    }

    pub fn margin(&self) -> u32 {
        self.t1.abs_diff(self.t2)
    }
}

/// A single match. Pending until a result is recorded, then immutable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub t1: TeamCode,
    pub t2: TeamCode,
    /// Zero-indexed round within the stage.
    pub round: Option<usize>,
    /// Zero-indexed group, for group stage matches.
    pub group: Option<usize>,
    /// None if not yet played.
    pub result: Option<MatchResult>,
    /// Pre-match probability that `t1` wins, recorded when simulated.
    pub t1_win_chance: Option<f64>,
    pub is_upset: bool,
}

impl GameMatch {
    pub fn new(t1: impl Into<TeamCode>, t2: impl Into<TeamCode>) -> Self {
        Self {
            id: Uuid::new_v4(),
            t1: t1.into(),
            t2: t2.into(),
            round: None,
            group: None,
            result: None,
            t1_win_chance: None,
            is_upset: false,
        }
    }

    pub fn in_round(mut self, round: usize) -> Self {
        self.round = Some(round);
        self
    }

    pub fn in_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Record the final score. A match can only be scored once.
    pub fn set_result(&mut self, result: MatchResult) -> Result<(), TournamentError> {
        if self.result.is_some() {
            return Err(TournamentError::ResultAlreadyRecorded(self.id));
        }
        self.result = Some(result);
        Ok(())
    }

    pub fn team(&self, side: Side) -> &TeamCode {
        match side {
            Side::One => &self.t1,
            Side::Two => &self.t2,
        }
    }

    /// Side `code` plays on, if it takes part in this match.
    pub fn side_of(&self, code: &str) -> Option<Side> {
        if self.t1 == code {
            Some(Side::One)
        } else if self.t2 == code {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn involves(&self, code: &str) -> bool {
        self.side_of(code).is_some()
    }

    /// The team facing `code`, if `code` plays in this match.
    pub fn opponent_of(&self, code: &str) -> Option<&TeamCode> {
        self.side_of(code).map(|side| self.team(side.other()))
    }

    pub fn t1_won(&self) -> bool {
        self.winning_side() == Some(Side::One)
    }

    pub fn t2_won(&self) -> bool {
        self.winning_side() == Some(Side::Two)
    }

    pub fn winning_side(&self) -> Option<Side> {
        self.result.and_then(|r| r.winning_side())
    }

    /// Winner's code; `None` while pending or on an exact tie.
    pub fn winner(&self) -> Option<&TeamCode> {
        self.winning_side().map(|side| self.team(side))
    }

    /// Loser's code; `None` while pending or on an exact tie.
    pub fn loser(&self) -> Option<&TeamCode> {
        self.winning_side().map(|side| self.team(side.other()))
    }
}
