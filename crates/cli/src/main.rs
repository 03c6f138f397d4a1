use anyhow::{Context, Result};

use clubreg_infra::RegistrationConfig;
use clubreg_preview::{Scenario, run};

fn main() -> Result<()> {
    clubreg_observability::init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CLUBREG_SCENARIO").ok())
        .context("usage: clubreg-preview <scenario.json> (or set CLUBREG_SCENARIO)")?;

    let config = RegistrationConfig::from_env()?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
    let scenario: Scenario = serde_json::from_str(&raw).with_context(|| format!("parse {path}"))?;

    tracing::info!(scenario = %path, operations = scenario.operations.len(), "replaying scenario");
    let report = run(scenario, config.engine)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
