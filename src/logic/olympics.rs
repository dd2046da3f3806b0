//! Stage driver: group stage, standings, draw, knockout stage, medals.

use crate::config::SimConfig;
use crate::data::{Exhibitions, Roster};
use crate::logic::draw::{draw_knockout, letter_label, Pairing, Pot};
use crate::logic::ranking::{rank_group, rank_pots};
use crate::logic::rating::RatingStore;
use crate::logic::simulator::simulate_match;
use crate::models::{
    GameMatch, MatchId, Progress, Team, TeamCode, TeamStats, Tournament, TournamentError,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

/// Play every match of `tournament`, always taking the first pending match next.
pub fn play_out<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    ratings: &mut RatingStore,
    config: &SimConfig,
    rng: &mut R,
) -> Result<(), TournamentError> {
    while let Some(next) = tournament.next_pending() {
        let id = next.id;
        simulate_match(tournament.pending_match_mut(id)?, ratings, config, rng)?;
        if tournament.mark_match_complete(id)? == Progress::Finished {
            break;
        }
    }
    Ok(())
}

/// Finished group stage with ranked standings, one list per group.
#[derive(Clone, Debug)]
pub struct GroupStage {
    pub tournament: Tournament,
    pub standings: Vec<Vec<TeamStats>>,
}

pub fn run_group_stage<R: Rng + ?Sized>(
    groups: Vec<Vec<Team>>,
    ratings: &mut RatingStore,
    config: &SimConfig,
    rng: &mut R,
) -> Result<GroupStage, TournamentError> {
    let mut tournament = Tournament::round_robin(groups)?;
    log::info!(
        "Group stage: {} teams, {} groups",
        tournament.participants().len(),
        tournament.round_robin_format().map_or(0, |rr| rr.groups().len())
    );
    play_out(&mut tournament, ratings, config, rng)?;

    let groups = tournament
        .round_robin_format()
        .map(|rr| rr.groups())
        .unwrap_or_default();
    let standings = groups
        .iter()
        .map(|group| {
            let stats: Vec<TeamStats> = group
                .iter()
                .map(|team| tournament.compile_stats_for(team, None))
                .collect();
            rank_group(&tournament, &stats, config.head_to_head)
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::info!(
        "Group stage finished after {} matches",
        tournament.completed().len()
    );
    Ok(GroupStage {
        tournament,
        standings,
    })
}

/// Podium of the knockout stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Medals {
    pub gold: TeamCode,
    pub silver: TeamCode,
    pub bronze: TeamCode,
}

/// Finished knockout stage.
#[derive(Clone, Debug)]
pub struct KnockoutStage {
    pub tournament: Tournament,
    pub medals: Medals,
}

pub fn run_knockout_stage<R: Rng + ?Sized>(
    participants: Vec<Team>,
    pairings: &[Pairing],
    ratings: &mut RatingStore,
    config: &SimConfig,
    rng: &mut R,
) -> Result<KnockoutStage, TournamentError> {
    let mut tournament = Tournament::single_elimination(participants, pairings)?;
    log::info!("Knockout stage: {} first-round matches", pairings.len());
    play_out(&mut tournament, ratings, config, rng)?;
    let medals = medals(&tournament)?;
    log::info!(
        "Medals: gold {}, silver {}, bronze {}",
        medals.gold,
        medals.silver,
        medals.bronze
    );
    Ok(KnockoutStage { tournament, medals })
}

/// Read the podium off a finished knockout tournament.
pub fn medals(tournament: &Tournament) -> Result<Medals, TournamentError> {
    let bracket = tournament.single_elimination_format().ok_or_else(|| {
        TournamentError::InvalidBracket("not a knockout tournament".to_string())
    })?;
    let final_match = scheduled_match(tournament, bracket.final_match())?;
    let bronze_match = scheduled_match(tournament, bracket.third_place_match())?;
    let decided = |m: &GameMatch| {
        m.winner()
            .zip(m.loser())
            .map(|(w, l)| (w.clone(), l.clone()))
            .ok_or(TournamentError::MissingWinner(m.id))
    };
    let (gold, silver) = decided(final_match)?;
    let (bronze, _) = decided(bronze_match)?;
    Ok(Medals {
        gold,
        silver,
        bronze,
    })
}

fn scheduled_match(
    tournament: &Tournament,
    id: Option<MatchId>,
) -> Result<&GameMatch, TournamentError> {
    let id = id.ok_or_else(|| {
        TournamentError::InvalidBracket("final or bronze match not scheduled".to_string())
    })?;
    tournament
        .completed_match(id)
        .ok_or(TournamentError::MatchNotPlayed(id))
}

/// Ranked standings of one group.
#[derive(Clone, Debug, Serialize)]
pub struct GroupStandings {
    pub name: String,
    pub standings: Vec<TeamStats>,
}

/// Everything a consumer needs to render a simulated tournament.
#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Seed the run used; rerunning with it reproduces every result.
    pub seed: u64,
    /// Ratings after exhibitions, before the first group match.
    pub starting_ratings: Vec<(TeamCode, f64)>,
    pub group_matches: Vec<GameMatch>,
    pub groups: Vec<GroupStandings>,
    /// All teams ranked across groups.
    pub overall: Vec<TeamStats>,
    pub pots: Vec<Pot>,
    pub knockout_pairings: Vec<Pairing>,
    pub knockout_matches: Vec<GameMatch>,
    pub medals: Medals,
    pub final_ratings: Vec<(TeamCode, f64)>,
}

/// Run the whole event: ratings from rankings and exhibitions, group stage, draw, knockout.
pub fn simulate_olympics(
    roster: &Roster,
    exhibitions: &Exhibitions,
    config: &SimConfig,
) -> Result<SimulationReport, TournamentError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    log::info!("Simulating tournament with seed {}", seed);

    let mut ratings = RatingStore::from_teams(roster.teams(), config.rating.clone());
    ratings.apply_exhibitions(exhibitions)?;
    let starting_ratings = ratings.standings();

    let draws = config.group_stage_draws.as_deref();
    let groups = roster.seeded_groups(draws)?;
    let group_names: Vec<String> = match draws {
        None => roster.groups.iter().map(|g| g.name.clone()).collect(),
        Some(_) => (0..groups.len()).map(letter_label).collect(),
    };

    let group_stage = run_group_stage(groups, &mut ratings, config, &mut rng)?;
    let overall = rank_pots(&group_stage.standings);
    let group_of = group_stage
        .tournament
        .round_robin_format()
        .map(|rr| rr.group_map())
        .unwrap_or_default();
    let draw = draw_knockout(&overall, config.knockout_teams, &group_of, &mut rng)?;

    let participants = draw
        .pots
        .iter()
        .flat_map(|pot| pot.teams.iter())
        .map(|code| group_stage.tournament.team(code).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    let knockout = run_knockout_stage(participants, &draw.pairings, &mut ratings, config, &mut rng)?;

    Ok(SimulationReport {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        seed,
        starting_ratings,
        group_matches: group_stage.tournament.completed().to_vec(),
        groups: group_names
            .into_iter()
            .zip(group_stage.standings)
            .map(|(name, standings)| GroupStandings { name, standings })
            .collect(),
        overall,
        pots: draw.pots,
        knockout_pairings: draw.pairings,
        knockout_matches: knockout.tournament.completed().to_vec(),
        medals: knockout.medals,
        final_ratings: ratings.standings(),
    })
}
