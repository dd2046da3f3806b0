//! Match outcome simulation: score, winner, upset flag and rating update.

use crate::config::SimConfig;
use crate::logic::rating::RatingStore;
use crate::models::{GameMatch, MatchResult, TournamentError};
use rand::Rng;

/// Simulate `m` and record its result.
///
/// 1. Median score `min + sqrt(U) * (max - min)`, skewed toward high-scoring games.
/// 2. Winner drawn with the pre-match win chance of `t1`.
/// 3. Point differential grows with the winner's pre-match chance.
/// 4. Winner gets `ceil(median + diff/2)`, loser `floor(median - diff/2)` plus a coin flip.
/// 5. Ratings of both teams are updated from the win chance taken before the result.
pub fn simulate_match<R: Rng + ?Sized>(
    m: &mut GameMatch,
    ratings: &mut RatingStore,
    config: &SimConfig,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if m.is_finished() {
        return Err(TournamentError::ResultAlreadyRecorded(m.id));
    }
    let scoring = &config.scoring;
    let median = (scoring.min_median
        + rng.gen::<f64>().sqrt() * (scoring.max_median - scoring.min_median))
        .round();

    let t1_chance = ratings.win_chance(&m.t1, &m.t2)?;
    let t1_won = rng.gen::<f64>() < t1_chance;
    let loser_chance = if t1_won { 1.0 - t1_chance } else { t1_chance };

    let d = &scoring.score_diff;
    let winner_chance = 1.0 - loser_chance;
    let diff_min = d.min_low_chance + winner_chance * (d.min_high_chance - d.min_low_chance);
    let diff_max = d.max_low_chance + winner_chance * (d.max_high_chance - d.max_low_chance);
    let diff = diff_min + rng.gen::<f64>() * winner_chance * (diff_max - diff_min);

    let coin = u32::from(rng.gen_bool(0.5));
    let winner_pts = (median + diff / 2.0).ceil().max(1.0) as u32;
    let loser_pts = ((median - diff / 2.0).floor().max(0.0) as u32 + coin).min(winner_pts - 1);

    m.t1_win_chance = Some(t1_chance);
    m.is_upset = loser_chance >= config.upset_threshold;
    let result = if t1_won {
        MatchResult::new(winner_pts, loser_pts)
    } else {
        MatchResult::new(loser_pts, winner_pts)
    };
    m.set_result(result)?;

    ratings.record_result(&m.t1, &m.t2, t1_won, winner_pts - loser_pts)?;
    log::debug!(
        "{} {}:{} {} ({:.1}%){}",
        m.t1,
        result.t1,
        result.t2,
        m.t2,
        t1_chance * 100.0,
        if m.is_upset { " [upset]" } else { "" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Team;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (RatingStore, SimConfig) {
        let config = SimConfig::default();
        let teams = [Team::new("Alpha", "AAA", 1), Team::new("Beta", "BBB", 30)];
        (RatingStore::from_teams(&teams, config.rating.clone()), config)
    }

    #[test]
    fn scores_stay_in_plausible_range_and_never_tie() {
        let (mut ratings, config) = setup();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let mut m = GameMatch::new("AAA", "BBB");
            simulate_match(&mut m, &mut ratings, &config, &mut rng).unwrap();
            let r = m.result.unwrap();
            assert_ne!(r.t1, r.t2);
            assert!(r.t1.max(r.t2) <= 110 + 21);
            assert!(r.t1.min(r.t2) + 21 >= 60);
        }
    }

    #[test]
    fn upset_flag_follows_loser_chance() {
        let (mut ratings, config) = setup();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..300 {
            let mut m = GameMatch::new("AAA", "BBB");
            simulate_match(&mut m, &mut ratings, &config, &mut rng).unwrap();
            let p = m.t1_win_chance.unwrap();
            let loser_chance = if m.t1_won() { 1.0 - p } else { p };
            assert_eq!(m.is_upset, loser_chance >= config.upset_threshold);
        }
    }

    #[test]
    fn played_match_cannot_be_simulated_again() {
        let (mut ratings, config) = setup();
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = GameMatch::new("AAA", "BBB");
        simulate_match(&mut m, &mut ratings, &config, &mut rng).unwrap();
        assert!(matches!(
            simulate_match(&mut m, &mut ratings, &config, &mut rng),
            Err(TournamentError::ResultAlreadyRecorded(_))
        ));
    }
}
