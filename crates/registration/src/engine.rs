use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use clubreg_core::{Entity, TeamId, entity::position_by_id};
use clubreg_invoicing::{PricingSchedule, consolidate_by_category, next_invoice_number};
use clubreg_teams::{RawMember, TeamDraft, TeamEntry, TeamsByDivision, normalize_roster};

use crate::changelog::{self, ChangeLogEntry};
use crate::edit_invoice::{self, EditModeInvoice};
use crate::error::{RegistrationError, RegistrationResult};
use crate::record::EditRecord;
use crate::session::EditSession;
use crate::settings::EngineSettings;
use crate::snapshot::{IssuedInvoice, RegistrationSnapshot};

/// Which collection a removed team was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RemovalOrigin {
    /// Added this session; deleted from `added_teams` at `position`.
    Added { position: usize },
    /// Originally registered; its id was put on the withdrawn list.
    Original,
}

/// Everything needed to reinstate a removed team exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedTeam {
    pub team: TeamEntry,
    pub origin: RemovalOrigin,
}

/// Outcome of a bulk import that imported at least one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: Vec<TeamId>,
    /// Rows skipped because their team was already registered.
    pub skipped: usize,
}

/// Result of submitting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// New baseline; the engine has already adopted it.
    pub snapshot: RegistrationSnapshot,
    /// Record of the submitted changes, for the persistence layer.
    pub record: EditRecord,
    /// Invoice the submission was priced from.
    pub invoice: EditModeInvoice,
}

/// Applies session operations against a submitted registration and derives
/// the merged teams, edit-mode invoice and change log.
///
/// The engine holds no session state; every operation takes the caller's
/// [`EditSession`]. Rejected operations leave the session untouched.
#[derive(Debug, Clone)]
pub struct RegistrationEditEngine {
    baseline: RegistrationSnapshot,
    pricing: PricingSchedule,
    settings: EngineSettings,
}

impl RegistrationEditEngine {
    pub fn new(baseline: RegistrationSnapshot, pricing: PricingSchedule) -> Self {
        Self::with_settings(baseline, pricing, EngineSettings::default())
    }

    pub fn with_settings(
        baseline: RegistrationSnapshot,
        pricing: PricingSchedule,
        settings: EngineSettings,
    ) -> Self {
        Self {
            baseline,
            pricing,
            settings,
        }
    }

    pub fn baseline(&self) -> &RegistrationSnapshot {
        &self.baseline
    }

    pub fn pricing(&self) -> &PricingSchedule {
        &self.pricing
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Registered right now: an original team not withdrawn, or a team added
    /// this session.
    pub fn is_registered(&self, session: &EditSession, id: &TeamId) -> bool {
        session.is_added(id)
            || (!session.is_removed(id) && self.baseline.find_original_team(id).is_some())
    }

    pub fn add_team(&self, session: &mut EditSession, draft: TeamDraft) -> RegistrationResult<TeamId> {
        let team = draft.into_entry(&self.settings.default_role);
        if self.is_registered(session, team.id()) {
            tracing::debug!(team_id = %team.id, "rejected duplicate team");
            return Err(RegistrationError::DuplicateTeam { id: team.id });
        }

        let id = team.id.clone();
        tracing::debug!(team_id = %id, division = team.division_key(), "team added");
        session.added_teams.push(team);
        Ok(id)
    }

    /// Import every row whose team is not yet registered.
    ///
    /// Partial success is reported with the skipped count; when every row is
    /// a duplicate nothing is imported and the import fails as a whole.
    pub fn bulk_import(
        &self,
        session: &mut EditSession,
        drafts: Vec<TeamDraft>,
    ) -> RegistrationResult<ImportSummary> {
        if drafts.is_empty() {
            return Err(RegistrationError::EmptyImport);
        }

        let mut accepted: Vec<TeamEntry> = Vec::with_capacity(drafts.len());
        let mut batch_ids = BTreeSet::new();
        let mut skipped = 0;

        for draft in drafts {
            let team = draft.into_entry(&self.settings.default_role);
            if self.is_registered(session, team.id()) || !batch_ids.insert(team.id.clone()) {
                skipped += 1;
                continue;
            }
            accepted.push(team);
        }

        if accepted.is_empty() {
            tracing::debug!(skipped, "import rejected; every team already registered");
            return Err(RegistrationError::AllDuplicates { skipped });
        }

        let imported: Vec<TeamId> = accepted.iter().map(|t| t.id.clone()).collect();
        tracing::debug!(imported = imported.len(), skipped, "teams imported");
        session.added_teams.extend(accepted);
        Ok(ImportSummary { imported, skipped })
    }

    /// Remove a team added this session outright, or withdraw an original
    /// team. The returned receipt can be passed to [`Self::undo_remove`].
    pub fn remove_team(&self, session: &mut EditSession, id: &TeamId) -> RegistrationResult<RemovedTeam> {
        if let Some(position) = position_by_id(&session.added_teams, id) {
            let team = session.added_teams.remove(position);
            tracing::debug!(team_id = %id, "added team dropped");
            return Ok(RemovedTeam {
                team,
                origin: RemovalOrigin::Added { position },
            });
        }

        let Some(original) = self.baseline.find_original_team(id) else {
            return Err(RegistrationError::UnknownTeam { id: id.clone() });
        };

        session.removed_team_ids.insert(id.clone());
        tracing::debug!(team_id = %id, "original team withdrawn");
        Ok(RemovedTeam {
            team: original.clone(),
            origin: RemovalOrigin::Original,
        })
    }

    /// Put a removed team back where it came from.
    ///
    /// Fails without mutating if the same id has been registered again since.
    pub fn undo_remove(&self, session: &mut EditSession, removed: RemovedTeam) -> RegistrationResult<()> {
        match removed.origin {
            RemovalOrigin::Added { position } => {
                if self.is_registered(session, removed.team.id()) {
                    return Err(RegistrationError::DuplicateTeam { id: removed.team.id });
                }
                let position = position.min(session.added_teams.len());
                tracing::debug!(team_id = %removed.team.id, "added team restored");
                session.added_teams.insert(position, removed.team);
            }
            RemovalOrigin::Original => {
                if session.is_added(removed.team.id()) {
                    return Err(RegistrationError::DuplicateTeam { id: removed.team.id });
                }
                tracing::debug!(team_id = %removed.team.id, "original team reinstated");
                session.removed_team_ids.remove(&removed.team.id);
            }
        }
        Ok(())
    }

    /// Replace a team's roster. Added teams are edited in place; original
    /// teams get a roster override.
    pub fn save_roster(
        &self,
        session: &mut EditSession,
        id: &TeamId,
        members: Vec<RawMember>,
    ) -> RegistrationResult<()> {
        let roster = normalize_roster(members, &self.settings.default_role);

        if let Some(team) = session.added_team_mut(id) {
            tracing::debug!(team_id = %id, members = roster.len(), "roster saved for added team");
            team.members = roster;
            return Ok(());
        }

        if self.baseline.find_original_team(id).is_none() {
            return Err(RegistrationError::UnknownTeam { id: id.clone() });
        }

        tracing::debug!(team_id = %id, members = roster.len(), "roster override saved");
        session.modified_rosters.insert(id.clone(), roster);
        Ok(())
    }

    /// Original teams minus withdrawals, with roster overrides applied, plus
    /// added teams grouped by division. Empty divisions are dropped.
    pub fn merged_teams_by_division(&self, session: &EditSession) -> TeamsByDivision {
        let mut merged = TeamsByDivision::new();

        for (division, teams) in &self.baseline.teams_by_division {
            let kept: Vec<TeamEntry> = teams
                .iter()
                .filter(|t| !session.is_removed(&t.id))
                .map(|t| match session.roster_override(&t.id) {
                    Some(members) => TeamEntry {
                        members: members.to_vec(),
                        ..t.clone()
                    },
                    None => t.clone(),
                })
                .collect();
            if !kept.is_empty() {
                merged.insert(division.clone(), kept);
            }
        }

        for team in session.added_teams() {
            merged
                .entry(team.division_key().to_string())
                .or_default()
                .push(team.clone());
        }

        merged
    }

    pub fn edit_mode_invoice(&self, session: &EditSession) -> EditModeInvoice {
        edit_invoice::build(&self.baseline, &self.pricing, &self.settings, session)
    }

    pub fn change_log(&self, session: &EditSession) -> Vec<ChangeLogEntry> {
        changelog::build(&self.baseline, &self.settings, session)
    }

    /// Issue a new invoice revision from the session and adopt it as the
    /// baseline. The session is cleared.
    ///
    /// The issued invoice carries one line per division (see
    /// [`consolidate_by_category`]) and its totals equal the edit-mode totals.
    /// Teams without a roster are stored with the count they were charged
    /// for, so every baseline line matches its division's teams.
    ///
    /// No change is required: gating resubmission on
    /// [`EditModeInvoice::has_changes`] is left to the caller.
    pub fn submit(&mut self, session: &mut EditSession, issued_on: NaiveDate) -> Submission {
        let invoice = self.edit_mode_invoice(session);
        let previous = self.baseline.invoice.summary();

        let issued = IssuedInvoice {
            invoice_number: next_invoice_number(&previous.invoice_number),
            invoice_date: issued_on,
            items: consolidate_by_category(invoice.active_lines().cloned()),
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            total: invoice.total,
        };
        let record = EditRecord::from_session(session, Some(issued.summary()), Some(previous));
        let snapshot = RegistrationSnapshot::new(issued, self.charged_teams_by_division(session));

        tracing::info!(
            invoice_number = %snapshot.invoice.invoice_number,
            total = %snapshot.invoice.total,
            has_changes = invoice.has_changes,
            "registration resubmitted"
        );

        self.baseline = snapshot.clone();
        session.clear();

        Submission {
            snapshot,
            record,
            invoice,
        }
    }

    /// Merged teams with roster-less entries pinned to the quantity the
    /// edit-mode invoice charges them.
    fn charged_teams_by_division(&self, session: &EditSession) -> TeamsByDivision {
        let mut merged = self.merged_teams_by_division(session);
        for team in merged.values_mut().flatten() {
            if team.has_roster() {
                continue;
            }
            let charged = if session.added_teams().iter().any(|t| t.id == team.id) {
                edit_invoice::new_team_qty(team, &self.settings)
            } else if session.roster_override(&team.id).is_some() {
                0
            } else {
                team.participant_count()
            };
            team.team_size = Some(charged);
        }
        merged
    }

    /// Drop all pending changes.
    pub fn discard(&self, session: &mut EditSession) {
        tracing::info!(
            added = session.added_teams.len(),
            removed = session.removed_team_ids.len(),
            rosters = session.modified_rosters.len(),
            "pending registration changes discarded"
        );
        session.clear();
    }

    /// Rebuild a pending session from a stored draft record.
    ///
    /// Submitted records yield an empty session. Entries that no longer make
    /// sense against the baseline (unknown withdrawn ids, overrides for unknown
    /// teams, duplicate additions) are dropped.
    pub fn resume(&self, record: &EditRecord) -> EditSession {
        let mut session = EditSession::new();
        if record.is_submitted() {
            return session;
        }

        for id in &record.removed_team_ids {
            if self.baseline.find_original_team(id).is_some() {
                session.removed_team_ids.insert(id.clone());
            } else {
                tracing::warn!(team_id = %id, "stored withdrawal of unknown team ignored");
            }
        }

        for (id, members) in &record.modified_rosters {
            if self.baseline.find_original_team(id).is_some() {
                let roster = normalize_roster(members.iter().cloned(), &self.settings.default_role);
                session.modified_rosters.insert(id.clone(), roster);
            } else {
                tracing::warn!(team_id = %id, "stored roster for unknown team ignored");
            }
        }

        for draft in &record.added_teams {
            if let Err(err) = self.add_team(&mut session, draft.clone()) {
                tracing::warn!(error = %err, "stored team addition ignored");
            }
        }

        session
    }
}
