//! Team rating ("form"): win probability from a rating gap and updates after each result.

use crate::config::RatingConfig;
use crate::data::Exhibitions;
use crate::models::{Team, TeamCode, TournamentError};
use serde::Serialize;
use std::collections::HashMap;

/// Probability that a team rated `rating_a` beats one rated `rating_b`.
///
/// A gap of `ladder_size` in favour of A gives `bias`:1 odds.
pub fn win_probability(rating_a: f64, rating_b: f64, config: &RatingConfig) -> f64 {
    let d = (rating_b - rating_a) / config.ladder_size;
    1.0 / (1.0 + config.bias.powf(d))
}

/// Rating change applied to both teams by one result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RatingChange {
    pub a: f64,
    pub b: f64,
}

/// Current rating of every team, keyed by team code.
#[derive(Clone, Debug, Serialize)]
pub struct RatingStore {
    ratings: HashMap<TeamCode, f64>,
    #[serde(skip)]
    config: RatingConfig,
}

impl RatingStore {
    pub fn new(config: RatingConfig) -> Self {
        Self {
            ratings: HashMap::new(),
            config,
        }
    }

    /// Seed every team from its external ranking.
    pub fn from_teams<'a>(teams: impl IntoIterator<Item = &'a Team>, config: RatingConfig) -> Self {
        let mut store = Self::new(config);
        for team in teams {
            store.insert(team);
        }
        store
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Rating a team starts with: the ceiling minus a fixed drop per ranking place.
    pub fn initial_rating(&self, fiba_ranking: u32) -> f64 {
        self.config.best - f64::from(fiba_ranking.saturating_sub(1)) * self.config.drop_per_rank
    }

    pub fn insert(&mut self, team: &Team) {
        let rating = self.initial_rating(team.fiba_ranking);
        self.ratings.insert(team.iso_code.clone(), rating);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.ratings.contains_key(code)
    }

    pub fn rating(&self, code: &str) -> Result<f64, TournamentError> {
        self.ratings
            .get(code)
            .copied()
            .ok_or_else(|| TournamentError::UnknownTeam(code.to_string()))
    }

    /// Probability that `a` beats `b` with current ratings.
    pub fn win_chance(&self, a: &str, b: &str) -> Result<f64, TournamentError> {
        Ok(win_probability(self.rating(a)?, self.rating(b)?, &self.config))
    }

    /// Fold one result into both ratings. The expected score is taken from the ratings as they
    /// were before this call; the loser's change is steepened by the margin of defeat.
    pub fn record_result(
        &mut self,
        a: &str,
        b: &str,
        a_won: bool,
        margin: u32,
    ) -> Result<RatingChange, TournamentError> {
        let p_a = self.win_chance(a, b)?;
        let loss_multiplier = 1.0 + (f64::from(margin) / self.config.loss_bias) / 10.0;

        let (score_a, score_b) = if a_won { (1.0, 0.0) } else { (0.0, 1.0) };
        let change = RatingChange {
            a: self.config.max_change * (score_a - p_a) * if a_won { 1.0 } else { loss_multiplier },
            b: self.config.max_change
                * (score_b - (1.0 - p_a))
                * if a_won { loss_multiplier } else { 1.0 },
        };

        *self.entry(a)? += change.a;
        *self.entry(b)? += change.b;
        log::debug!(
            "Rating {} {:+.1}, {} {:+.1} (p={:.3})",
            a,
            change.a,
            b,
            change.b,
            p_a
        );
        Ok(change)
    }

    /// Apply pre-tournament friendlies once, in input order. Records whose opponent is not rated
    /// are skipped. Returns how many records were applied.
    pub fn apply_exhibitions(&mut self, exhibitions: &Exhibitions) -> Result<usize, TournamentError> {
        let mut applied = 0;
        for (code, records) in &exhibitions.by_team {
            if !self.contains(code) {
                return Err(TournamentError::UnknownTeam(code.clone()));
            }
            for record in records {
                if !self.contains(&record.opponent) {
                    log::debug!(
                        "Skipping exhibition {} vs {}: opponent not in the tournament",
                        code,
                        record.opponent
                    );
                    continue;
                }
                let (own, theirs) = record.score()?;
                self.record_result(code, &record.opponent, own > theirs, own.abs_diff(theirs))?;
                applied += 1;
            }
        }
        log::info!("Applied {} exhibition result(s) to ratings", applied);
        Ok(applied)
    }

    /// All ratings, strongest first.
    pub fn standings(&self) -> Vec<(TeamCode, f64)> {
        let mut all: Vec<_> = self.ratings.iter().map(|(c, r)| (c.clone(), *r)).collect();
        all.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| x.0.cmp(&y.0)));
        all
    }

    fn entry(&mut self, code: &str) -> Result<&mut f64, TournamentError> {
        self.ratings
            .get_mut(code)
            .ok_or_else(|| TournamentError::UnknownTeam(code.to_string()))
    }
}
