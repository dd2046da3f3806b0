//! Basketball tournament simulator: library with models and business logic.

pub mod config;
pub mod data;
pub mod logic;
pub mod models;

pub use config::{HeadToHeadCount, RatingConfig, ScoreDiffConfig, ScoringConfig, SimConfig};
pub use data::{DataError, ExhibitionRecord, Exhibitions, Group, Roster};
pub use logic::{
    draw_knockout, head_to_head, letter_label, match_pots, medals, play_out, rank_bucket,
    rank_group, rank_pots, run_group_stage, run_knockout_stage, simulate_match, simulate_olympics,
    win_probability, BucketEntry, GroupStage, GroupStandings, KnockoutDraw, KnockoutStage, Medals, Pairing, Pot,
    RatingChange, RatingStore, SimulationReport,
};
pub use models::{
    Format, GameMatch, MatchId, MatchResult, Progress, RoundRobin, Side, SingleElimination, Team,
    TeamCode, TeamStats, Tournament, TournamentError, TournamentId,
};
