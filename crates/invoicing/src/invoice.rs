use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clubreg_core::ValueObject;
use clubreg_teams::TeamsByDivision;

use crate::pricing::{PriceTier, PricingSchedule};

/// Rate applied when an original invoice has no positive subtotal to derive
/// one from (15%).
pub const FALLBACK_TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Where a line's unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceSource {
    EarlyBird,
    Regular,
    /// No pricing entry existed for the division; a default unit price was used.
    Default,
    /// No pricing entry existed for the division; the line is priced at zero.
    Missing,
}

impl From<PriceTier> for PriceSource {
    fn from(tier: PriceTier) -> Self {
        match tier {
            PriceTier::EarlyBird => PriceSource::EarlyBird,
            PriceTier::Regular => PriceSource::Regular,
        }
    }
}

/// One invoice row: a division, its unit price and participant count.
///
/// `line_total` is always `unit * qty`; it is computed on construction and on
/// every quantity change and is never read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LineItemRecord", into = "LineItemRecord")]
pub struct InvoiceLineItem {
    category: String,
    unit: Decimal,
    qty: u32,
    line_total: Decimal,
    source: PriceSource,
}

impl ValueObject for InvoiceLineItem {}

impl InvoiceLineItem {
    pub fn new(category: impl Into<String>, unit: Decimal, qty: u32, source: PriceSource) -> Self {
        Self {
            category: category.into(),
            unit,
            qty,
            line_total: unit * Decimal::from(qty),
            source,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn unit(&self) -> Decimal {
        self.unit
    }

    pub fn qty(&self) -> u32 {
        self.qty
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// Degraded line: its division had no pricing entry.
    pub fn is_pricing_missing(&self) -> bool {
        self.source == PriceSource::Missing
    }

    /// Same line with a new quantity; the unit price is held constant.
    pub fn with_qty(&self, qty: u32) -> Self {
        Self::new(self.category.clone(), self.unit, qty, self.source)
    }
}

/// Wire shape of a line item. `lineTotal` is written for consumers but
/// ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemRecord {
    category: String,
    unit: Decimal,
    qty: u32,
    #[serde(default)]
    line_total: Option<Decimal>,
    #[serde(default = "default_source")]
    source: PriceSource,
}

fn default_source() -> PriceSource {
    PriceSource::Regular
}

impl From<LineItemRecord> for InvoiceLineItem {
    fn from(record: LineItemRecord) -> Self {
        InvoiceLineItem::new(record.category, record.unit, record.qty, record.source)
    }
}

impl From<InvoiceLineItem> for LineItemRecord {
    fn from(item: InvoiceLineItem) -> Self {
        LineItemRecord {
            category: item.category,
            unit: item.unit,
            qty: item.qty,
            line_total: Some(item.line_total),
            source: item.source,
        }
    }
}

/// Aggregate amounts of an invoice. No rounding is applied; currency rounding
/// is a display concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub total: Decimal,
}

impl ValueObject for InvoiceTotals {}

impl InvoiceTotals {
    pub fn from_subtotal(subtotal: Decimal, tax_rate: Decimal) -> Self {
        let total_tax = subtotal * tax_rate;
        Self {
            subtotal,
            total_tax,
            total: subtotal + total_tax,
        }
    }

    /// Effective rate carried by these totals (see [`derive_tax_rate`]).
    pub fn effective_tax_rate(&self, fallback: Decimal) -> Decimal {
        derive_tax_rate(self.subtotal, self.total_tax, fallback)
    }
}

/// One line per division present in `entries_by_division`.
///
/// Quantity is the summed participant count of the division's teams; the unit
/// price is resolved against `reference` (the invoice issue date, so historical
/// invoices reproduce). A division without pricing yields a zero-priced line
/// marked [`PriceSource::Missing`].
pub fn compute_line_items(
    entries_by_division: &TeamsByDivision,
    pricing: &PricingSchedule,
    reference: NaiveDateTime,
) -> Vec<InvoiceLineItem> {
    entries_by_division
        .iter()
        .map(|(division, teams)| {
            let qty = teams
                .iter()
                .fold(0u32, |acc, t| acc.saturating_add(t.participant_count()));
            match pricing.get(division) {
                Some(schedule) => {
                    let resolved = schedule.resolve(reference);
                    InvoiceLineItem::new(division.clone(), resolved.price, qty, resolved.tier.into())
                }
                None => {
                    tracing::warn!(division = %division, qty, "no pricing for division; line priced at zero");
                    InvoiceLineItem::new(division.clone(), Decimal::ZERO, qty, PriceSource::Missing)
                }
            }
        })
        .collect()
}

/// Collapse lines sharing a category into one, in order of first appearance.
///
/// Quantities are summed. When the merged lines disagree on unit price the
/// result carries the quantity-weighted unit `Σ line_total / Σ qty`, so the
/// merged line total matches the sum it replaces up to `Decimal` precision.
/// The first line's price source is kept.
pub fn consolidate_by_category(
    items: impl IntoIterator<Item = InvoiceLineItem>,
) -> Vec<InvoiceLineItem> {
    let mut groups: Vec<Vec<InvoiceLineItem>> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g[0].category == item.category) {
            Some(group) => group.push(item),
            None => groups.push(vec![item]),
        }
    }
    groups.into_iter().map(merge_lines).collect()
}

fn merge_lines(mut group: Vec<InvoiceLineItem>) -> InvoiceLineItem {
    if group.len() == 1 {
        return group.remove(0);
    }
    let first = &group[0];
    let qty = group.iter().fold(0u32, |acc, i| acc.saturating_add(i.qty));
    let unit = if group.iter().all(|i| i.unit == first.unit) {
        first.unit
    } else {
        let billed: Decimal = group.iter().map(|i| i.line_total).sum();
        let blended = billed.checked_div(Decimal::from(qty)).unwrap_or(first.unit);
        tracing::debug!(category = %first.category, qty, unit = %blended, "blended mixed unit prices");
        blended
    };
    InvoiceLineItem::new(first.category.clone(), unit, qty, first.source)
}

/// `subtotal = Σ line_total`, `total_tax = subtotal * tax_rate`,
/// `total = subtotal + total_tax`.
pub fn compute_totals<'a>(
    items: impl IntoIterator<Item = &'a InvoiceLineItem>,
    tax_rate: Decimal,
) -> InvoiceTotals {
    let subtotal = items.into_iter().map(InvoiceLineItem::line_total).sum();
    InvoiceTotals::from_subtotal(subtotal, tax_rate)
}

/// Effective rate of an issued invoice: `total_tax / subtotal` when the
/// subtotal is positive, otherwise `fallback`.
pub fn derive_tax_rate(subtotal: Decimal, total_tax: Decimal, fallback: Decimal) -> Decimal {
    if subtotal > Decimal::ZERO {
        total_tax.checked_div(subtotal).unwrap_or(fallback)
    } else {
        fallback
    }
}
