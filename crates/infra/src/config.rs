use std::str::FromStr;

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;

use clubreg_registration::EngineSettings;

pub const FALLBACK_TAX_RATE_VAR: &str = "CLUBREG_FALLBACK_TAX_RATE";
pub const NEW_TEAM_UNIT_PRICE_VAR: &str = "CLUBREG_NEW_TEAM_UNIT_PRICE";
pub const NEW_TEAM_DEFAULT_SIZE_VAR: &str = "CLUBREG_NEW_TEAM_DEFAULT_SIZE";
pub const DEFAULT_ROLE_VAR: &str = "CLUBREG_DEFAULT_ROLE";

/// Registration configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationConfig {
    /// Engine policy; unset variables keep the built-in defaults.
    pub engine: EngineSettings,
}

impl RegistrationConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut engine = EngineSettings::default();

        if let Some(raw) = var(FALLBACK_TAX_RATE_VAR) {
            engine.fallback_tax_rate = parse_non_negative(&raw)
                .with_context(|| format!("parse {FALLBACK_TAX_RATE_VAR}"))?;
        }
        if let Some(raw) = var(NEW_TEAM_UNIT_PRICE_VAR) {
            engine.new_team_unit_price = parse_non_negative(&raw)
                .with_context(|| format!("parse {NEW_TEAM_UNIT_PRICE_VAR}"))?;
        }
        if let Some(raw) = var(NEW_TEAM_DEFAULT_SIZE_VAR) {
            engine.new_team_default_size = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("parse {NEW_TEAM_DEFAULT_SIZE_VAR}"))?;
        }
        if let Some(raw) = var(DEFAULT_ROLE_VAR) {
            engine.default_role = raw.trim().to_string();
        }

        tracing::debug!(
            fallback_tax_rate = %engine.fallback_tax_rate,
            new_team_unit_price = %engine.new_team_unit_price,
            new_team_default_size = engine.new_team_default_size,
            default_role = %engine.default_role,
            "registration config loaded"
        );
        Ok(Self { engine })
    }
}

fn parse_non_negative(raw: &str) -> Result<Decimal> {
    let value = Decimal::from_str(raw.trim()).with_context(|| format!("{raw:?} is not a decimal"))?;
    if value < Decimal::ZERO {
        bail!("{raw:?} must not be negative");
    }
    Ok(value)
}
