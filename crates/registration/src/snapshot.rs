use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clubreg_core::{TeamId, date::calendar_date};
use clubreg_invoicing::{InvoiceLineItem, InvoiceTotals, PricingSchedule, compute_line_items};
use clubreg_teams::{TeamEntry, TeamsByDivision};

use crate::record::InvoiceSummary;

/// An invoice as it was issued for a submitted registration.
///
/// Read from storage the caller does not validate, so every field defaults
/// when missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssuedInvoice {
    pub invoice_number: String,
    #[serde(with = "calendar_date")]
    pub invoice_date: NaiveDate,
    pub items: Vec<InvoiceLineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl IssuedInvoice {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            total_tax: self.tax,
            total: self.total,
        }
    }

    pub fn summary(&self) -> InvoiceSummary {
        InvoiceSummary {
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date,
            total: self.total,
        }
    }
}

/// Immutable baseline an edit session is diffed against: the submitted teams
/// and the invoice issued for them. A resubmission produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationSnapshot {
    pub invoice: IssuedInvoice,
    pub teams_by_division: TeamsByDivision,
}

impl RegistrationSnapshot {
    pub fn new(invoice: IssuedInvoice, teams_by_division: TeamsByDivision) -> Self {
        Self {
            invoice,
            teams_by_division,
        }
    }

    /// Price a first-time registration and record it as a snapshot.
    ///
    /// Division prices are resolved on the issue date.
    pub fn first_submission(
        invoice_number: impl Into<String>,
        issued_on: NaiveDate,
        teams_by_division: TeamsByDivision,
        pricing: &PricingSchedule,
        tax_rate: Decimal,
    ) -> Self {
        let items = compute_line_items(&teams_by_division, pricing, issued_on.and_time(NaiveTime::MIN));
        let totals = clubreg_invoicing::compute_totals(&items, tax_rate);
        let invoice = IssuedInvoice {
            invoice_number: invoice_number.into(),
            invoice_date: issued_on,
            items,
            subtotal: totals.subtotal,
            tax: totals.total_tax,
            total: totals.total,
        };
        tracing::info!(
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            "first registration submitted"
        );
        Self::new(invoice, teams_by_division)
    }

    /// Originally registered teams, division by division.
    pub fn original_teams(&self) -> impl Iterator<Item = &TeamEntry> {
        self.teams_by_division.values().flatten()
    }

    pub fn find_original_team(&self, id: &TeamId) -> Option<&TeamEntry> {
        self.original_teams().find(|t| &t.id == id)
    }

    /// First originally registered team of a division; its id identifies the
    /// division's line when diffing.
    pub fn anchor_team(&self, division: &str) -> Option<&TeamEntry> {
        self.teams_by_division.get(division).and_then(|teams| teams.first())
    }
}
