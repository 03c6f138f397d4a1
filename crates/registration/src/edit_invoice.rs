use rust_decimal::Decimal;
use serde::Serialize;

use clubreg_core::TeamId;
use clubreg_invoicing::{InvoiceLineItem, InvoiceTotals, PriceSource, PricingSchedule, compute_totals};
use clubreg_teams::{TeamEntry, roster_size};

use crate::session::EditSession;
use crate::settings::EngineSettings;
use crate::snapshot::RegistrationSnapshot;

/// Invoice line annotated with how it differs from the submitted invoice.
///
/// A line is either carried over from the original invoice (possibly removed
/// or modified) or introduced by a team added this session (`is_new`), never
/// both. Removed lines keep their unit and quantity for display but do not
/// count toward totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditModeLineItem {
    /// First original team's id for carried lines, the team's own id for new
    /// ones.
    pub id: TeamId,
    #[serde(flatten)]
    pub line: InvoiceLineItem,
    pub is_new: bool,
    pub is_removed: bool,
    pub is_modified: bool,
    /// Quantity on the submitted invoice; set only when `is_modified`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_qty: Option<u32>,
}

impl EditModeLineItem {
    pub fn counts_toward_totals(&self) -> bool {
        !self.is_removed
    }
}

/// Current-session invoice, derived afresh from the snapshot and the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditModeInvoice {
    pub items: Vec<EditModeLineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Rate carried forward from the original invoice.
    pub tax_rate: Decimal,
    /// Any team added or withdrawn, or any roster edit that changed a quantity.
    pub has_changes: bool,
}

impl EditModeInvoice {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            total_tax: self.tax,
            total: self.total,
        }
    }

    /// Lines that count toward the totals, without annotations.
    pub fn active_lines(&self) -> impl Iterator<Item = &InvoiceLineItem> {
        self.items
            .iter()
            .filter(|i| i.counts_toward_totals())
            .map(|i| &i.line)
    }
}

/// Diff the session against the snapshot's invoice.
///
/// Each original line follows every original team of its division: withdrawn
/// teams and roster overrides adjust its quantity by their participant delta,
/// and the line is removed once all of the division's teams are withdrawn. The
/// line keeps the id of the division's first original team. Unit prices of
/// original lines are not re-resolved.
pub(crate) fn build(
    baseline: &RegistrationSnapshot,
    pricing: &PricingSchedule,
    settings: &EngineSettings,
    session: &EditSession,
) -> EditModeInvoice {
    let mut items = Vec::with_capacity(baseline.invoice.items.len() + session.added_teams().len());

    for original in &baseline.invoice.items {
        let category = original.category();
        let id = baseline
            .anchor_team(category)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| TeamId::new(format!("division:{category}")));
        let teams = baseline
            .teams_by_division
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let is_removed = !teams.is_empty() && teams.iter().all(|t| session.is_removed(&t.id));
        let qty = if is_removed {
            original.qty()
        } else {
            adjusted_qty(original.qty(), teams, session)
        };
        let is_modified = !is_removed && qty != original.qty();

        items.push(EditModeLineItem {
            id,
            line: original.with_qty(qty),
            is_new: false,
            is_removed,
            is_modified,
            original_qty: is_modified.then_some(original.qty()),
        });
    }

    for team in session.added_teams() {
        let (unit, source) = new_team_unit_price(pricing, settings, team.division_key());
        items.push(EditModeLineItem {
            id: team.id.clone(),
            line: InvoiceLineItem::new(team.division_key(), unit, new_team_qty(team, settings), source),
            is_new: true,
            is_removed: false,
            is_modified: false,
            original_qty: None,
        });
    }

    let tax_rate = baseline
        .invoice
        .totals()
        .effective_tax_rate(settings.fallback_tax_rate);
    let totals = compute_totals(
        items.iter().filter(|i| i.counts_toward_totals()).map(|i| &i.line),
        tax_rate,
    );
    let has_changes = !session.added_teams().is_empty()
        || !session.removed_team_ids().is_empty()
        || items.iter().any(|i| i.is_modified);

    EditModeInvoice {
        items,
        subtotal: totals.subtotal,
        tax: totals.total_tax,
        total: totals.total,
        tax_rate,
        has_changes,
    }
}

/// Original quantity less withdrawn teams, plus the change each roster
/// override makes to its team's count. Clamped to the `u32` range.
fn adjusted_qty(original: u32, teams: &[TeamEntry], session: &EditSession) -> u32 {
    let qty = teams.iter().fold(i64::from(original), |qty, team| {
        let before = i64::from(team.participant_count());
        if session.is_removed(&team.id) {
            qty - before
        } else if let Some(members) = session.roster_override(&team.id) {
            qty + i64::from(roster_size(members)) - before
        } else {
            qty
        }
    });
    u32::try_from(qty.max(0)).unwrap_or(u32::MAX)
}

/// Regular price, then early-bird price, then the configured default. A zero
/// price counts as unset.
fn new_team_unit_price(
    pricing: &PricingSchedule,
    settings: &EngineSettings,
    division: &str,
) -> (Decimal, PriceSource) {
    let Some(schedule) = pricing.get(division) else {
        tracing::warn!(division, "no pricing for new team's division; using default unit price");
        return (settings.new_team_unit_price, PriceSource::Default);
    };

    if schedule.regular.price > Decimal::ZERO {
        return (schedule.regular.price, PriceSource::Regular);
    }
    match &schedule.early_bird {
        Some(early) if early.price > Decimal::ZERO => (early.price, PriceSource::EarlyBird),
        _ => (settings.new_team_unit_price, PriceSource::Default),
    }
}

pub(crate) fn new_team_qty(team: &TeamEntry, settings: &EngineSettings) -> u32 {
    if team.has_roster() {
        roster_size(&team.members)
    } else {
        team.team_size.unwrap_or(settings.new_team_default_size)
    }
}
