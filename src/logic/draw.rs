//! Knockout draw: pots of two, paired across pots without group-stage rematches.

use crate::models::{TeamCode, TeamStats, TournamentError};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// A knockout pairing, first team listed first.
pub type Pairing = (TeamCode, TeamCode);

/// Two teams of similar overall rank.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub label: String,
    pub teams: [TeamCode; 2],
}

/// Spreadsheet-style label for a zero-based index: A..Z, then AA, AB, ...
pub fn letter_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Result of the knockout draw.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KnockoutDraw {
    pub pots: Vec<Pot>,
    /// First-round pairings in bracket order: adjacent pairings meet in the next round.
    pub pairings: Vec<Pairing>,
}

fn same_group(
    a: &str,
    b: &str,
    group_of: &HashMap<TeamCode, usize>,
) -> Result<bool, TournamentError> {
    let ga = group_of
        .get(a)
        .ok_or_else(|| TournamentError::UnknownTeam(a.to_string()))?;
    let gb = group_of
        .get(b)
        .ok_or_else(|| TournamentError::UnknownTeam(b.to_string()))?;
    Ok(ga == gb)
}

/// Pair two pots so that nobody meets a team from their own group.
///
/// Only two patterns exist: straight (1-1, 2-2) and cross (1-2, 2-1). If both are legal one is
/// picked at random; if neither is, the draw is unsatisfiable.
pub fn match_pots<R: Rng + ?Sized>(
    pot_1: &[TeamCode; 2],
    pot_2: &[TeamCode; 2],
    group_of: &HashMap<TeamCode, usize>,
    rng: &mut R,
) -> Result<[Pairing; 2], TournamentError> {
    let straight_ok = !same_group(&pot_1[0], &pot_2[0], group_of)?
        && !same_group(&pot_1[1], &pot_2[1], group_of)?;
    let cross_ok = !same_group(&pot_1[0], &pot_2[1], group_of)?
        && !same_group(&pot_1[1], &pot_2[0], group_of)?;

    let straight = || {
        [
            (pot_1[0].clone(), pot_2[0].clone()),
            (pot_1[1].clone(), pot_2[1].clone()),
        ]
    };
    let cross = || {
        [
            (pot_1[0].clone(), pot_2[1].clone()),
            (pot_1[1].clone(), pot_2[0].clone()),
        ]
    };

    match (straight_ok, cross_ok) {
        (true, true) => Ok(if rng.gen_bool(0.5) { straight() } else { cross() }),
        (true, false) => Ok(straight()),
        (false, true) => Ok(cross()),
        (false, false) => Err(TournamentError::UnsatisfiableDraw {
            pot_1: pot_1.to_vec(),
            pot_2: pot_2.to_vec(),
        }),
    }
}

/// Draw the knockout bracket from the overall ranking.
///
/// The top `knockout_teams` go into pots of two, labelled D, E, F, ... and AA, AB, ... past Z.
/// The strongest pot meets the weakest, the second strongest the second weakest, and so on. The bracket lists every
/// pot pair's first pairing before any second pairing, so with four pots the order is
/// D1-G1, E1-F1, D2-G2, E2-F2 and the two halves of each pot end up on opposite sides.
pub fn draw_knockout<R: Rng + ?Sized>(
    overall: &[TeamStats],
    knockout_teams: usize,
    group_of: &HashMap<TeamCode, usize>,
    rng: &mut R,
) -> Result<KnockoutDraw, TournamentError> {
    if knockout_teams < 4 || !knockout_teams.is_power_of_two() || overall.len() < knockout_teams {
        return Err(TournamentError::InvalidBracket(format!(
            "cannot draw {} knockout teams from {} ranked teams",
            knockout_teams,
            overall.len()
        )));
    }

    let pots: Vec<Pot> = overall[..knockout_teams]
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| Pot {
            // First pot is D: A to C name the groups.
            label: letter_label(3 + i),
            teams: [pair[0].team.iso_code.clone(), pair[1].team.iso_code.clone()],
        })
        .collect();

    let n = pots.len();
    let mut firsts = Vec::with_capacity(n / 2);
    let mut seconds = Vec::with_capacity(n / 2);
    for i in 0..n / 2 {
        let (high, low) = (&pots[i], &pots[n - 1 - i]);
        let [first, second] = match_pots(&high.teams, &low.teams, group_of, rng)?;
        log::info!(
            "Draw {}-{}: {} - {}, {} - {}",
            high.label,
            low.label,
            first.0,
            first.1,
            second.0,
            second.1
        );
        firsts.push(first);
        seconds.push(second);
    }
    firsts.extend(seconds);

    Ok(KnockoutDraw {
        pots,
        pairings: firsts,
    })
}
