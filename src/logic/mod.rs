//! Simulation logic: ratings, match simulation, tie-breaks, knockout draw and the stage driver.

mod draw;
mod olympics;
mod ranking;
mod rating;
mod simulator;

pub use draw::{draw_knockout, letter_label, match_pots, KnockoutDraw, Pairing, Pot};
pub use olympics::{
    medals, play_out, run_group_stage, run_knockout_stage, simulate_olympics, GroupStage,
    GroupStandings, KnockoutStage, Medals, SimulationReport,
};
pub use ranking::{head_to_head, rank_bucket, rank_group, rank_pots, BucketEntry};
pub use rating::{win_probability, RatingChange, RatingStore};
pub use simulator::simulate_match;
