//! Registration invoicing.
//!
//! Division price resolution (early-bird vs regular), invoice line items,
//! totals, tax-rate derivation and invoice numbering, implemented purely as
//! deterministic domain logic (no IO, no UI, no storage).

pub mod invoice;
pub mod numbering;
pub mod pricing;

pub use invoice::{
    FALLBACK_TAX_RATE, InvoiceLineItem, InvoiceTotals, PriceSource, compute_line_items,
    compute_totals, consolidate_by_category, derive_tax_rate,
};
pub use numbering::next_invoice_number;
pub use pricing::{
    DivisionPricing, EarlyBirdTier, PriceTier, PricingSchedule, RegularTier, ResolvedPrice,
    resolve_price,
};
