//! Registration desk: loads a club's submitted registration for an event from
//! the record store, hands out an editable session, and persists the outcome.
//!
//! Each registration occupies two records:
//! - `registration:<event>:<club>:snapshot` holds the current baseline
//!   ([`RegistrationSnapshot`]).
//! - `registration:<event>:<club>:edit` holds the latest [`EditRecord`]: a draft
//!   while edits are pending, the submitted diff after a resubmission.

use core::fmt;

use chrono::NaiveDate;

use clubreg_core::{ClubId, EventId, TeamId};
use clubreg_invoicing::PricingSchedule;
use clubreg_registration::{
    ChangeLogEntry, EditModeInvoice, EditRecord, EditSession, EngineSettings, ImportSummary,
    RegistrationEditEngine, RegistrationResult, RegistrationSnapshot, RemovedTeam, Submission,
};
use clubreg_teams::{RawMember, TeamDraft, TeamsByDivision};

use crate::store::{RecordStore, StoreError, read_json, write_json};

/// A club's registration for one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
    pub event_id: EventId,
    pub club_id: ClubId,
}

impl RegistrationKey {
    pub fn new(event_id: impl Into<EventId>, club_id: impl Into<ClubId>) -> Self {
        Self {
            event_id: event_id.into(),
            club_id: club_id.into(),
        }
    }

    pub fn snapshot_key(&self) -> String {
        format!("registration:{}:{}:snapshot", self.event_id, self.club_id)
    }

    pub fn edit_key(&self) -> String {
        format!("registration:{}:{}:edit", self.event_id, self.club_id)
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_id, self.club_id)
    }
}

/// A registration opened for editing: its engine and pending session.
#[derive(Debug, Clone)]
pub struct OpenRegistration {
    key: RegistrationKey,
    engine: RegistrationEditEngine,
    session: EditSession,
}

impl OpenRegistration {
    pub fn key(&self) -> &RegistrationKey {
        &self.key
    }

    pub fn engine(&self) -> &RegistrationEditEngine {
        &self.engine
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn add_team(&mut self, draft: TeamDraft) -> RegistrationResult<TeamId> {
        self.engine.add_team(&mut self.session, draft)
    }

    pub fn bulk_import(&mut self, drafts: Vec<TeamDraft>) -> RegistrationResult<ImportSummary> {
        self.engine.bulk_import(&mut self.session, drafts)
    }

    pub fn remove_team(&mut self, id: &TeamId) -> RegistrationResult<RemovedTeam> {
        self.engine.remove_team(&mut self.session, id)
    }

    pub fn undo_remove(&mut self, removed: RemovedTeam) -> RegistrationResult<()> {
        self.engine.undo_remove(&mut self.session, removed)
    }

    pub fn save_roster(&mut self, id: &TeamId, members: Vec<RawMember>) -> RegistrationResult<()> {
        self.engine.save_roster(&mut self.session, id, members)
    }

    pub fn merged_teams_by_division(&self) -> TeamsByDivision {
        self.engine.merged_teams_by_division(&self.session)
    }

    pub fn edit_mode_invoice(&self) -> EditModeInvoice {
        self.engine.edit_mode_invoice(&self.session)
    }

    pub fn change_log(&self) -> Vec<ChangeLogEntry> {
        self.engine.change_log(&self.session)
    }
}

/// Store-backed entry point for registrations.
#[derive(Debug)]
pub struct RegistrationDesk<S> {
    store: S,
    settings: EngineSettings,
}

impl<S: RecordStore> RegistrationDesk<S> {
    pub fn new(store: S, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// First-time submission: price the teams, store the baseline and drop
    /// any edit record left from an earlier registration under the same key.
    pub fn register(
        &self,
        key: &RegistrationKey,
        invoice_number: &str,
        issued_on: NaiveDate,
        teams_by_division: TeamsByDivision,
        pricing: &PricingSchedule,
    ) -> Result<RegistrationSnapshot, StoreError> {
        if self.store.get(&key.snapshot_key()).is_some() {
            tracing::warn!(registration = %key, "replacing existing registration");
        }

        let snapshot = RegistrationSnapshot::first_submission(
            invoice_number,
            issued_on,
            teams_by_division,
            pricing,
            self.settings.fallback_tax_rate,
        );
        write_json(&self.store, &key.snapshot_key(), &snapshot)?;
        self.store.remove(&key.edit_key());
        Ok(snapshot)
    }

    /// Open a submitted registration for editing, resuming any stored draft.
    ///
    /// `None` when nothing has been submitted yet (or the stored snapshot is
    /// unreadable): there is no baseline to edit against.
    pub fn open(&self, key: &RegistrationKey, pricing: PricingSchedule) -> Option<OpenRegistration> {
        let baseline: RegistrationSnapshot = read_json(&self.store, &key.snapshot_key())?;
        let engine = RegistrationEditEngine::with_settings(baseline, pricing, self.settings.clone());

        let session = match read_json::<EditRecord, _>(&self.store, &key.edit_key()) {
            Some(record) => engine.resume(&record),
            None => EditSession::new(),
        };

        tracing::debug!(
            registration = %key,
            invoice_number = %engine.baseline().invoice.invoice_number,
            pending = !session.is_empty(),
            "registration opened"
        );
        Some(OpenRegistration {
            key: key.clone(),
            engine,
            session,
        })
    }

    /// Persist pending changes as a draft. An empty session removes a stored
    /// draft but keeps the record of the last submission.
    pub fn save_draft(&self, registration: &OpenRegistration) -> Result<(), StoreError> {
        let key = registration.key.edit_key();
        if registration.session.is_empty() {
            if read_json::<EditRecord, _>(&self.store, &key).is_some_and(|r| !r.is_submitted()) {
                self.store.remove(&key);
            }
            return Ok(());
        }

        let record = EditRecord::draft(
            &registration.session,
            registration.engine.baseline().invoice.summary(),
        );
        write_json(&self.store, &key, &record)?;
        tracing::debug!(registration = %registration.key, "draft saved");
        Ok(())
    }

    /// Submit the pending session, storing the new baseline and the submitted
    /// edit record.
    pub fn submit(
        &self,
        registration: &mut OpenRegistration,
        issued_on: NaiveDate,
    ) -> Result<Submission, StoreError> {
        let submission = registration
            .engine
            .submit(&mut registration.session, issued_on);

        write_json(&self.store, &registration.key.snapshot_key(), &submission.snapshot)?;
        write_json(&self.store, &registration.key.edit_key(), &submission.record)?;
        Ok(submission)
    }

    /// Drop pending changes and delete the stored edit record.
    pub fn discard(&self, registration: &mut OpenRegistration) {
        registration.engine.discard(&mut registration.session);
        self.store.remove(&registration.key.edit_key());
    }
}
