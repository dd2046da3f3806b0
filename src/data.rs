//! Roster and exhibition-result input (JSON or CSV).

use crate::models::{Team, TeamCode, TournamentError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Errors while reading input data.
#[derive(Debug)]
pub enum DataError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    /// Input parsed but is not a valid roster.
    Invalid(TournamentError),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io(e) => write!(f, "Failed to read input: {}", e),
            DataError::Json(e) => write!(f, "Failed to parse JSON: {}", e),
            DataError::Csv(e) => write!(f, "Failed to parse CSV: {}", e),
            DataError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io(e) => Some(e),
            DataError::Json(e) => Some(e),
            DataError::Csv(e) => Some(e),
            DataError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Io(e)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Json(e)
    }
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Csv(e)
    }
}

impl From<TournamentError> for DataError {
    fn from(e: TournamentError) -> Self {
        DataError::Invalid(e)
    }
}

/// Team entry as it appears in roster files.
#[derive(Clone, Debug, Deserialize)]
struct TeamRecord {
    #[serde(rename = "Team")]
    name: String,
    #[serde(rename = "ISOCode")]
    iso_code: TeamCode,
    #[serde(rename = "FIBARanking")]
    fiba_ranking: u32,
}

impl From<TeamRecord> for Team {
    fn from(r: TeamRecord) -> Self {
        Team::new(r.name, r.iso_code, r.fiba_ranking)
    }
}

#[derive(Debug, Deserialize)]
struct CsvTeamRow {
    group: String,
    team: String,
    iso_code: TeamCode,
    fiba_ranking: u32,
}

/// A named group of teams, in seeding order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub teams: Vec<Team>,
}

/// All participating teams, grouped. Group order and order within a group are significant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Roster {
    pub groups: Vec<Group>,
}

impl Roster {
    pub fn new(groups: Vec<Group>) -> Result<Self, TournamentError> {
        let mut codes: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.teams.iter().map(|t| t.code()))
            .collect();
        codes.sort_unstable();
        if let Some(pair) = codes.windows(2).find(|w| w[0] == w[1]) {
            return Err(TournamentError::InvalidGroups(format!(
                "team {} appears more than once",
                pair[0]
            )));
        }
        Ok(Self { groups })
    }

    /// `{"A": [{"Team": "Spain", "ISOCode": "ESP", "FIBARanking": 2}, ...], ...}`
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DataError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_value(value)?;
        let mut groups = Vec::with_capacity(map.len());
        for (name, teams) in map {
            let records: Vec<TeamRecord> = serde_json::from_value(teams)?;
            groups.push(Group {
                name,
                teams: records.into_iter().map(Team::from).collect(),
            });
        }
        Ok(Self::new(groups)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// CSV with header `group,team,iso_code,fiba_ranking`. Groups keep first-appearance order.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut groups: Vec<Group> = Vec::new();
        for row in rdr.deserialize::<CsvTeamRow>() {
            let row = row?;
            let team = Team::new(row.team, row.iso_code, row.fiba_ranking);
            match groups.iter_mut().find(|g| g.name == row.group) {
                Some(g) => g.teams.push(team),
                None => groups.push(Group {
                    name: row.group,
                    teams: vec![team],
                }),
            }
        }
        Ok(Self::new(groups)?)
    }

    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_csv_reader(std::fs::File::open(path)?)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.groups.iter().flat_map(|g| g.teams.iter())
    }

    pub fn team(&self, code: &str) -> Result<&Team, TournamentError> {
        self.teams()
            .find(|t| t.iso_code == code)
            .ok_or_else(|| TournamentError::UnknownTeam(code.to_string()))
    }

    /// Groups in seeding order. `draws`, if given, lists team codes per group and replaces the
    /// roster's own grouping.
    pub fn seeded_groups(
        &self,
        draws: Option<&[Vec<TeamCode>]>,
    ) -> Result<Vec<Vec<Team>>, TournamentError> {
        match draws {
            None => Ok(self.groups.iter().map(|g| g.teams.clone()).collect()),
            Some(draws) => draws
                .iter()
                .map(|codes| codes.iter().map(|c| self.team(c).cloned()).collect())
                .collect(),
        }
    }
}

/// One friendly played before the tournament, from the owning team's point of view.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExhibitionRecord {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "Opponent")]
    pub opponent: TeamCode,
    /// `"<own score>-<opponent score>"`
    #[serde(rename = "Result")]
    pub result: String,
}

impl ExhibitionRecord {
    /// Parse the `"a-b"` score.
    pub fn score(&self) -> Result<(u32, u32), TournamentError> {
        let invalid = || TournamentError::InvalidScore(self.result.clone());
        let (a, b) = self.result.split_once('-').ok_or_else(invalid)?;
        let a = a.trim().parse().map_err(|_| invalid())?;
        let b = b.trim().parse().map_err(|_| invalid())?;
        Ok((a, b))
    }
}

/// Exhibition results keyed by team code, in file order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Exhibitions {
    pub by_team: Vec<(TeamCode, Vec<ExhibitionRecord>)>,
}

impl Exhibitions {
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DataError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_value(value)?;
        let mut by_team = Vec::with_capacity(map.len());
        for (code, records) in map {
            by_team.push((code, serde_json::from_value(records)?));
        }
        Ok(Self { by_team })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}
