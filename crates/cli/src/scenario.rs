use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use clubreg_core::{TeamId, parse_calendar_date};
use clubreg_infra::{InMemoryRecordStore, RegistrationDesk, RegistrationKey};
use clubreg_invoicing::{DivisionPricing, PricingSchedule};
use clubreg_registration::{
    EditModeInvoice, EngineSettings, IssuedInvoice, RemovedTeam, Submission,
};
use clubreg_teams::{RawMember, TeamDraft, TeamsByDivision, group_by_division};

/// A first-time registration followed by a scripted edit session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default = "default_invoice_number")]
    pub invoice_number: String,
    /// Issue date of the first invoice, `YYYY-MM-DD`.
    pub issued_on: String,
    pub pricing: Vec<DivisionPricing>,
    pub teams: Vec<TeamDraft>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Resubmit on this date after the operations, if set.
    #[serde(default)]
    pub submit_on: Option<String>,
}

fn default_invoice_number() -> String {
    "REG-001".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    AddTeam { team: TeamDraft },
    BulkImport { teams: Vec<TeamDraft> },
    RemoveTeam { id: TeamId },
    /// Undo the most recent removal.
    UndoRemove,
    SaveRoster { id: TeamId, members: Vec<RawMember> },
    Discard,
}

/// An operation the engine refused; the session was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Zero-based position in `operations`.
    pub step: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub original_invoice: IssuedInvoice,
    pub merged_teams: TeamsByDivision,
    pub invoice: EditModeInvoice,
    pub change_log: Vec<String>,
    pub rejections: Vec<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
}

/// Register the scenario's teams, replay its operations and collect the
/// resulting state.
pub fn run(scenario: Scenario, settings: EngineSettings) -> Result<Report> {
    let issued_on = parse_calendar_date(&scenario.issued_on).context("parse issuedOn")?;
    let pricing = PricingSchedule::new(scenario.pricing).context("build pricing schedule")?;
    let teams = group_by_division(
        scenario
            .teams
            .into_iter()
            .map(|draft| draft.into_entry(&settings.default_role)),
    );

    let desk = RegistrationDesk::new(InMemoryRecordStore::new(), settings);
    let key = RegistrationKey::new("preview", "preview");
    let original = desk
        .register(&key, &scenario.invoice_number, issued_on, teams, &pricing)
        .context("store first registration")?;
    let mut registration = desk
        .open(&key, pricing)
        .context("registration was not stored")?;

    let mut undo: Vec<RemovedTeam> = Vec::new();
    let mut rejections = Vec::new();

    for (step, operation) in scenario.operations.into_iter().enumerate() {
        let outcome = match operation {
            Operation::AddTeam { team } => registration.add_team(team).map(|_| ()),
            Operation::BulkImport { teams } => registration.bulk_import(teams).map(|summary| {
                tracing::info!(step, imported = summary.imported.len(), skipped = summary.skipped, "bulk import");
            }),
            Operation::RemoveTeam { id } => registration.remove_team(&id).map(|removed| undo.push(removed)),
            Operation::UndoRemove => match undo.pop() {
                Some(removed) => registration.undo_remove(removed),
                None => {
                    rejections.push(Rejection {
                        step,
                        message: "nothing to undo".to_string(),
                    });
                    continue;
                }
            },
            Operation::SaveRoster { id, members } => registration.save_roster(&id, members),
            Operation::Discard => {
                desk.discard(&mut registration);
                undo.clear();
                Ok(())
            }
        };

        if let Err(err) = outcome {
            tracing::info!(step, error = %err, "operation rejected");
            rejections.push(Rejection {
                step,
                message: err.to_string(),
            });
        }
    }

    let merged_teams = registration.merged_teams_by_division();
    let invoice = registration.edit_mode_invoice();
    let change_log = registration.change_log().iter().map(ToString::to_string).collect();

    let submission = match scenario.submit_on {
        Some(raw) => {
            let submit_on = parse_calendar_date(&raw).context("parse submitOn")?;
            Some(desk.submit(&mut registration, submit_on)?)
        }
        None => None,
    };

    Ok(Report {
        original_invoice: original.invoice,
        merged_teams,
        invoice,
        change_log,
        rejections,
        submission,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const SCENARIO: &str = r#"{
        "issuedOn": "2025-03-10",
        "pricing": [
            { "name": "Open", "regular": { "price": "130" } },
            { "name": "Youth", "regular": { "price": "90" },
              "earlyBird": { "price": "70", "deadline": "2025-03-10" } }
        ],
        "teams": [
            { "id": "sparks", "name": "Sparks", "division": "Open", "teamSize": 10 }
        ],
        "operations": [
            { "op": "removeTeam", "id": "sparks" },
            { "op": "addTeam", "team": { "id": "comets", "name": "Comets", "division": "Open",
              "members": [ { "name": "Ana Silva" }, { "firstName": "Bo", "type": "COACH" } ] } },
            { "op": "addTeam", "team": { "id": "comets", "name": "Comets again", "division": "Open" } },
            { "op": "undoRemove" },
            { "op": "undoRemove" }
        ],
        "submitOn": "2025-04-02"
    }"#;

    #[test]
    fn replays_operations_and_collects_rejections() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let report = run(scenario, EngineSettings::default()).unwrap();

        assert_eq!(report.original_invoice.total, Decimal::from(1495));
        assert_eq!(report.merged_teams["Open"].len(), 2);
        assert_eq!(report.merged_teams["Open"][1].members[1].role, "Coach");

        assert_eq!(report.invoice.subtotal, Decimal::from(1300 + 260));
        assert!(report.invoice.has_changes);
        assert_eq!(report.change_log, vec!["Added Comets to Open (2 participants)".to_string()]);

        let steps: Vec<usize> = report.rejections.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![2, 4]);
        assert_eq!(report.rejections[1].message, "nothing to undo");

        let submission = report.submission.unwrap();
        assert_eq!(submission.snapshot.invoice.invoice_number, "REG-002");
    }

    #[test]
    fn discard_operation_resets_session() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.operations.push(Operation::Discard);
        scenario.submit_on = None;

        let report = run(scenario, EngineSettings::default()).unwrap();
        assert!(!report.invoice.has_changes);
        assert!(report.change_log.is_empty());
        assert!(report.submission.is_none());
    }

    #[test]
    fn invalid_dates_are_reported_with_context() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.issued_on = "10/03/2025".to_string();
        let err = run(scenario, EngineSettings::default()).unwrap_err();
        assert!(format!("{err:#}").contains("issuedOn"));
    }

    #[test]
    fn duplicate_division_pricing_is_rejected() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.pricing.push(DivisionPricing::new("Open", Decimal::from(1)));
        let err = run(scenario, EngineSettings::default()).unwrap_err();
        assert!(format!("{err:#}").contains("priced more than once"));
    }
}
