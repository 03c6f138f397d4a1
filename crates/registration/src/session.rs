use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use clubreg_core::{Entity, TeamId, entity::find_by_id};
use clubreg_teams::{RosterMember, TeamEntry};

/// Pending, unsubmitted changes to one registration.
///
/// The caller owns the session and hands it to every engine call, so several
/// registrations can be edited side by side. It is mutated only through
/// [`crate::RegistrationEditEngine`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditSession {
    /// Teams added this session. Their roster edits are applied in place.
    pub(crate) added_teams: Vec<TeamEntry>,
    /// Originally registered teams withdrawn this session.
    pub(crate) removed_team_ids: BTreeSet<TeamId>,
    /// Roster replacements for originally registered teams only.
    pub(crate) modified_rosters: BTreeMap<TeamId, Vec<RosterMember>>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added_teams(&self) -> &[TeamEntry] {
        &self.added_teams
    }

    pub fn removed_team_ids(&self) -> &BTreeSet<TeamId> {
        &self.removed_team_ids
    }

    pub fn modified_rosters(&self) -> &BTreeMap<TeamId, Vec<RosterMember>> {
        &self.modified_rosters
    }

    pub fn is_added(&self, id: &TeamId) -> bool {
        find_by_id(&self.added_teams, id).is_some()
    }

    pub fn is_removed(&self, id: &TeamId) -> bool {
        self.removed_team_ids.contains(id)
    }

    pub fn roster_override(&self, id: &TeamId) -> Option<&[RosterMember]> {
        self.modified_rosters.get(id).map(Vec::as_slice)
    }

    /// No pending additions, withdrawals or roster edits.
    pub fn is_empty(&self) -> bool {
        self.added_teams.is_empty()
            && self.removed_team_ids.is_empty()
            && self.modified_rosters.is_empty()
    }

    pub(crate) fn added_team_mut(&mut self, id: &TeamId) -> Option<&mut TeamEntry> {
        self.added_teams.iter_mut().find(|t| t.id() == id)
    }

    pub(crate) fn clear(&mut self) {
        self.added_teams.clear();
        self.removed_team_ids.clear();
        self.modified_rosters.clear();
    }
}
