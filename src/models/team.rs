//! Team identity.

use serde::{Deserialize, Serialize};

/// Short code identifying a team (ISO country code, e.g. "SRB").
pub type TeamCode = String;

/// A national team. Immutable once the roster is loaded.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub iso_code: TeamCode,
    /// External world ranking; lower is stronger.
    pub fiba_ranking: u32,
}

impl Team {
    pub fn new(name: impl Into<String>, iso_code: impl Into<TeamCode>, fiba_ranking: u32) -> Self {
        Self {
            name: name.into(),
            iso_code: iso_code.into(),
            fiba_ranking,
        }
    }

    pub fn code(&self) -> &str {
        &self.iso_code
    }
}
