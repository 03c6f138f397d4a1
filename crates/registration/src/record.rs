use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clubreg_core::{TeamId, date::calendar_date};
use clubreg_teams::{RawMember, TeamDraft};

use crate::session::EditSession;

/// Header of an issued invoice as kept alongside an edit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub invoice_number: String,
    #[serde(with = "calendar_date")]
    pub invoice_date: NaiveDate,
    pub total: Decimal,
}

/// Persisted form of a registration edit.
///
/// Written as a draft (no `new_invoice`) while edits are pending, and with both
/// invoice headers once the edit is submitted. Stored by an external layer that
/// does not validate shape: every field defaults when missing, and team and
/// member payloads are kept loosely typed until they are normalised on resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditRecord {
    pub added_teams: Vec<TeamDraft>,
    pub removed_team_ids: Vec<TeamId>,
    pub modified_rosters: BTreeMap<TeamId, Vec<RawMember>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_invoice: Option<InvoiceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_invoice: Option<InvoiceSummary>,
}

impl EditRecord {
    /// Draft record of pending changes.
    pub fn draft(session: &EditSession, original_invoice: InvoiceSummary) -> Self {
        Self::from_session(session, None, Some(original_invoice))
    }

    pub(crate) fn from_session(
        session: &EditSession,
        new_invoice: Option<InvoiceSummary>,
        original_invoice: Option<InvoiceSummary>,
    ) -> Self {
        Self {
            added_teams: session
                .added_teams()
                .iter()
                .cloned()
                .map(TeamDraft::from)
                .collect(),
            removed_team_ids: session.removed_team_ids().iter().cloned().collect(),
            modified_rosters: session
                .modified_rosters()
                .iter()
                .map(|(id, members)| {
                    (id.clone(), members.iter().cloned().map(RawMember::from).collect())
                })
                .collect(),
            new_invoice,
            original_invoice,
        }
    }

    /// A submitted record describes changes already folded into a newer
    /// snapshot; only drafts carry pending work.
    pub fn is_submitted(&self) -> bool {
        self.new_invoice.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_missing_and_partial_fields() {
        let record: EditRecord = serde_json::from_str(
            r#"{"removedTeamIds":["t1"],"addedTeams":[{"name":"Comets","division":"Open"}]}"#,
        )
        .unwrap();
        assert_eq!(record.removed_team_ids, vec![TeamId::new("t1")]);
        assert_eq!(record.added_teams.len(), 1);
        assert!(record.added_teams[0].id.is_none());
        assert!(record.modified_rosters.is_empty());
        assert!(!record.is_submitted());
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let record = EditRecord {
            new_invoice: Some(InvoiceSummary {
                invoice_number: "REG-002".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                total: Decimal::from(1196),
            }),
            ..EditRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["newInvoice"]["invoiceNumber"], "REG-002");
        assert_eq!(json["newInvoice"]["invoiceDate"], "2025-04-02");
        assert!(json.get("originalInvoice").is_none());
        assert!(json["removedTeamIds"].as_array().unwrap().is_empty());
    }
}
