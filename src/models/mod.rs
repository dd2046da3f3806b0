//! Data structures for the simulation: teams, matches, stats, formats and tournaments.

mod format;
mod game;
mod stats;
mod team;
mod tournament;

pub use format::{Format, RoundRobin, SingleElimination};
pub use game::{GameMatch, MatchId, MatchResult, Side};
pub use stats::TeamStats;
pub use team::{Team, TeamCode};
pub use tournament::{Progress, Tournament, TournamentError, TournamentId};
