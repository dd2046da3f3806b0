//! Simulation parameters. Every field has a default, so a partial JSON document is enough.

use crate::models::{TeamCode, TournamentError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rating ("form") model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Initial rating of the world's #1 team.
    pub best: f64,
    /// Initial rating lost per ranking place.
    pub drop_per_rank: f64,
    /// Rating gap that gives `bias`:1 odds.
    pub ladder_size: f64,
    pub bias: f64,
    /// Largest rating change a single result can cause.
    pub max_change: f64,
    /// Every `loss_bias` points of margin make the loser's drop 10% steeper.
    pub loss_bias: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            best: 1000.0,
            drop_per_rank: 10.0,
            ladder_size: 200.0,
            bias: 10.0,
            max_change: 40.0,
            loss_bias: 10.0,
        }
    }
}

/// Bounds of the simulated point differential. "Low chance" applies when the winner was an
/// outsider, "high chance" when it was a clear favourite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreDiffConfig {
    pub min_low_chance: f64,
    pub min_high_chance: f64,
    pub max_low_chance: f64,
    pub max_high_chance: f64,
}

impl Default for ScoreDiffConfig {
    fn default() -> Self {
        Self {
            min_low_chance: 1.0,
            min_high_chance: 10.0,
            max_low_chance: 5.0,
            max_high_chance: 40.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub min_median: f64,
    pub max_median: f64,
    pub score_diff: ScoreDiffConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_median: 60.0,
            max_median: 110.0,
            score_diff: ScoreDiffConfig::default(),
        }
    }
}

/// How a two-way head-to-head is counted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadToHeadCount {
    /// Count the meetings each team actually won.
    #[default]
    Wins,
    /// Count every meeting as a win for the first-listed team, so the first team of a tied
    /// pair always ranks ahead.
    Meetings,
}

/// Full simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rating: RatingConfig,
    pub scoring: ScoringConfig,
    /// A loss by a side with at least this pre-match win chance is an upset.
    pub upset_threshold: f64,
    pub head_to_head: HeadToHeadCount,
    /// Number of teams advancing to the knockout stage.
    pub knockout_teams: usize,
    /// Explicit seeding order per group; overrides roster order.
    pub group_stage_draws: Option<Vec<Vec<TeamCode>>>,
    /// RNG seed; a fixed seed makes a run reproducible.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rating: RatingConfig::default(),
            scoring: ScoringConfig::default(),
            upset_threshold: 0.7,
            head_to_head: HeadToHeadCount::default(),
            knockout_teams: 8,
            group_stage_draws: None,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, crate::data::DataError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, crate::data::DataError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every parameter is in a range the model can work with.
    pub fn validate(&self) -> Result<(), TournamentError> {
        let invalid = |msg: &str| -> Result<(), TournamentError> {
            Err(TournamentError::InvalidConfig(msg.to_string()))
        };
        let r = &self.rating;
        if !(r.ladder_size > 0.0) {
            return invalid("rating.ladder_size must be positive");
        }
        if !(r.bias > 0.0) || r.bias == 1.0 {
            return invalid("rating.bias must be positive and not 1");
        }
        if !(r.loss_bias > 0.0) {
            return invalid("rating.loss_bias must be positive");
        }
        if r.max_change < 0.0 || r.drop_per_rank < 0.0 {
            return invalid("rating.max_change and rating.drop_per_rank must not be negative");
        }
        let s = &self.scoring;
        if s.min_median < 0.0 || s.min_median > s.max_median {
            return invalid("scoring median bounds are inverted or negative");
        }
        let d = &s.score_diff;
        if d.min_low_chance < 1.0 || d.min_high_chance < 1.0 {
            return invalid("score_diff minimums must be at least 1");
        }
        if d.min_low_chance > d.max_low_chance || d.min_high_chance > d.max_high_chance {
            return invalid("score_diff minimums exceed maximums");
        }
        if !(self.upset_threshold > 0.0 && self.upset_threshold <= 1.0) {
            return invalid("upset_threshold must be in (0, 1]");
        }
        if self.knockout_teams < 4 || !self.knockout_teams.is_power_of_two() {
            return invalid("knockout_teams must be a power of two, at least 4");
        }
        Ok(())
    }
}
