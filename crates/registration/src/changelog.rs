use core::fmt;

use serde::Serialize;

use clubreg_core::TeamId;
use clubreg_teams::roster_size;

use crate::edit_invoice::new_team_qty;
use crate::session::EditSession;
use crate::settings::EngineSettings;
use crate::snapshot::RegistrationSnapshot;

/// One net change of a session, for display next to the edit-mode invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChangeLogEntry {
    #[serde(rename_all = "camelCase")]
    TeamRemoved {
        id: TeamId,
        name: String,
        division: String,
    },
    #[serde(rename_all = "camelCase")]
    RosterUpdated {
        id: TeamId,
        name: String,
        before: u32,
        after: u32,
    },
    #[serde(rename_all = "camelCase")]
    TeamAdded {
        id: TeamId,
        name: String,
        division: String,
        participants: u32,
    },
}

impl fmt::Display for ChangeLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeLogEntry::TeamRemoved { name, division, .. } => {
                write!(f, "Removed {name} from {division}")
            }
            ChangeLogEntry::RosterUpdated {
                name, before, after, ..
            } if before == after => {
                write!(f, "Updated roster for {name} ({after} participants)")
            }
            ChangeLogEntry::RosterUpdated {
                name, before, after, ..
            } => write!(
                f,
                "Updated roster for {name}: {before} -> {after} participants"
            ),
            ChangeLogEntry::TeamAdded {
                name,
                division,
                participants,
                ..
            } => write!(f, "Added {name} to {division} ({participants} participants)"),
        }
    }
}

/// Withdrawals first, then roster edits of remaining original teams whose
/// members actually changed, then additions, each in registration order.
pub(crate) fn build(
    baseline: &RegistrationSnapshot,
    settings: &EngineSettings,
    session: &EditSession,
) -> Vec<ChangeLogEntry> {
    let mut entries = Vec::new();

    for team in baseline.original_teams() {
        if session.is_removed(&team.id) {
            entries.push(ChangeLogEntry::TeamRemoved {
                id: team.id.clone(),
                name: team.display_name().to_string(),
                division: team.division_key().to_string(),
            });
        }
    }

    for team in baseline.original_teams() {
        if session.is_removed(&team.id) {
            continue;
        }
        if let Some(members) = session.roster_override(&team.id) {
            if members != team.members.as_slice() {
                entries.push(ChangeLogEntry::RosterUpdated {
                    id: team.id.clone(),
                    name: team.display_name().to_string(),
                    before: team.participant_count(),
                    after: roster_size(members),
                });
            }
        }
    }

    for team in session.added_teams() {
        entries.push(ChangeLogEntry::TeamAdded {
            id: team.id.clone(),
            name: team.display_name().to_string(),
            division: team.division_key().to_string(),
            participants: new_team_qty(team, settings),
        });
    }

    entries
}
