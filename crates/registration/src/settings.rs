use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clubreg_invoicing::FALLBACK_TAX_RATE;
use clubreg_teams::DEFAULT_ROLE;

/// Unit price for a new team whose division has no usable pricing (33.75).
pub const NEW_TEAM_UNIT_PRICE: Decimal = Decimal::from_parts(3375, 0, 0, false, 2);

/// Participant count assumed for a new team with no roster or declared size.
pub const NEW_TEAM_DEFAULT_SIZE: u32 = 24;

/// Policy constants used by [`crate::RegistrationEditEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// Tax rate used when the original invoice has no positive subtotal.
    pub fallback_tax_rate: Decimal,
    pub new_team_unit_price: Decimal,
    pub new_team_default_size: u32,
    /// Role given to roster members that arrive without one.
    pub default_role: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fallback_tax_rate: FALLBACK_TAX_RATE,
            new_team_unit_price: NEW_TEAM_UNIT_PRICE,
            new_team_default_size: NEW_TEAM_DEFAULT_SIZE,
            default_role: DEFAULT_ROLE.to_string(),
        }
    }
}
