use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use clubreg_core::{Entity, TeamId};

use crate::roster::{RawMember, RosterMember, normalize_roster, roster_size};

/// Grouping key for teams that have no division yet. Such teams never match a
/// pricing entry and are therefore priced at zero.
pub const UNASSIGNED_DIVISION: &str = "Unassigned";

/// Teams grouped by division name.
///
/// Divisions with no teams are never present as keys.
pub type TeamsByDivision = BTreeMap<String, Vec<TeamEntry>>;

/// A team registered into one division for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub id: TeamId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default)]
    pub members: Vec<RosterMember>,
    /// Declared size, used for pricing until a roster is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<u32>,
}

impl TeamEntry {
    pub fn new(id: TeamId, name: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            division: Some(division.into()),
            members: Vec::new(),
            team_size: None,
        }
    }

    pub fn with_members(mut self, members: Vec<RosterMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_team_size(mut self, size: u32) -> Self {
        self.team_size = Some(size);
        self
    }

    /// Division this team is grouped and priced under.
    pub fn division_key(&self) -> &str {
        self.division
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNASSIGNED_DIVISION)
    }

    pub fn has_roster(&self) -> bool {
        !self.members.is_empty()
    }

    /// Quantity used for pricing: the roster length, or the declared team
    /// size while no roster is loaded.
    pub fn participant_count(&self) -> u32 {
        if self.has_roster() {
            roster_size(&self.members)
        } else {
            self.team_size.unwrap_or(0)
        }
    }

    /// Name for display; falls back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

impl Entity for TeamEntry {
    type Id = TeamId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A team as supplied by a selection dialog, manual entry or an import row.
///
/// Members are still loosely shaped; [`TeamDraft::into_entry`] normalises them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamDraft {
    /// Absent for ad-hoc and imported teams; one is generated.
    pub id: Option<TeamId>,
    pub name: String,
    pub division: Option<String>,
    pub members: Vec<RawMember>,
    pub team_size: Option<u32>,
}

impl TeamDraft {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            division: Some(division.into()),
            members: Vec::new(),
            team_size: None,
        }
    }

    pub fn with_members(mut self, members: Vec<RawMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_team_size(mut self, size: u32) -> Self {
        self.team_size = Some(size);
        self
    }

    /// Assign an id if missing, then normalise the roster.
    pub fn into_entry(self, default_role: &str) -> TeamEntry {
        let id = self
            .id
            .filter(|id| !id.as_str().trim().is_empty())
            .unwrap_or_else(TeamId::generate);
        let division = self
            .division
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        TeamEntry {
            id,
            name: self.name.trim().to_string(),
            division,
            members: normalize_roster(self.members, default_role),
            team_size: self.team_size,
        }
    }
}

impl From<TeamEntry> for TeamDraft {
    fn from(entry: TeamEntry) -> Self {
        Self {
            id: Some(entry.id),
            name: entry.name,
            division: entry.division,
            members: entry.members.into_iter().map(RawMember::from).collect(),
            team_size: entry.team_size,
        }
    }
}

/// Group teams by [`TeamEntry::division_key`], preserving their relative order.
pub fn group_by_division(teams: impl IntoIterator<Item = TeamEntry>) -> TeamsByDivision {
    let mut grouped = TeamsByDivision::new();
    for team in teams {
        grouped
            .entry(team.division_key().to_string())
            .or_default()
            .push(team);
    }
    grouped
}
