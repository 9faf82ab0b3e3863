// Each module handles one subcommand; main.rs parses arguments and dispatches here.

pub mod check;
pub mod plan;

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Environment variable consulted when `--scenario` is omitted.
pub const SCENARIO_ENV: &str = "FLIGHTPATH_SCENARIO";

/// Resolve the scenario path from the flag, falling back to [`SCENARIO_ENV`].
pub fn resolve_scenario_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    match std::env::var_os(SCENARIO_ENV) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => bail!("no scenario given: pass --scenario or set {SCENARIO_ENV}"),
    }
}
