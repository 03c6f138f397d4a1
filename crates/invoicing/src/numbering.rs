//! Invoice numbers.
//!
//! A resubmitted registration keeps its invoice base and bumps a three-digit
//! version suffix: `INV-2025-0042-001` becomes `INV-2025-0042-002`.

const VERSION_WIDTH: usize = 3;
const FIRST_REVISION: &str = "002";

/// Number for the next revision of an invoice.
///
/// `<base>-<NNN>` increments `NNN` (zero padded to at least three digits).
/// Any other shape gets `-002` appended.
pub fn next_invoice_number(current: &str) -> String {
    let current = current.trim();
    if let Some((base, suffix)) = current.rsplit_once('-') {
        let is_version = !base.is_empty()
            && suffix.len() == VERSION_WIDTH
            && suffix.bytes().all(|b| b.is_ascii_digit());
        if is_version {
            if let Ok(version) = suffix.parse::<u32>() {
                return format!("{base}-{:0width$}", version + 1, width = VERSION_WIDTH);
            }
        }
    }

    tracing::warn!(invoice_number = %current, "no version suffix; starting revision series");
    format!("{current}-{FIRST_REVISION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_version_suffix() {
        assert_eq!(next_invoice_number("INV-2025-0042-001"), "INV-2025-0042-002");
        assert_eq!(next_invoice_number("REG-009"), "REG-010");
        assert_eq!(next_invoice_number("REG-099"), "REG-100");
    }

    #[test]
    fn overflowing_suffix_grows_past_three_digits() {
        assert_eq!(next_invoice_number("REG-999"), "REG-1000");
    }

    #[test]
    fn appends_first_revision_when_pattern_does_not_match() {
        assert_eq!(next_invoice_number("INV2025"), "INV2025-002");
        assert_eq!(next_invoice_number("INV-2025"), "INV-2025-002");
        assert_eq!(next_invoice_number("INV-12a"), "INV-12a-002");
        assert_eq!(next_invoice_number("-001"), "-001-002");
    }
}
