//! Check command handler: per-phase feasibility of one flight condition.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use flightpath_lib::{load_scenario, CruisePathFinder, Error as LibError, FlightPhase, Scenario};

use crate::output::{render_json, write_checks_text, OutputFormat, PhaseCheck};
use crate::terminal::ColorPalette;

/// Arguments for the check command.
#[derive(Debug, Clone)]
pub struct CheckCommandArgs {
    pub scenario: PathBuf,
    pub altitude_ft: u32,
    pub mach: f64,
    pub format: OutputFormat,
}

pub fn handle_check(args: &CheckCommandArgs) -> Result<()> {
    let scenario = load_scenario(&args.scenario)
        .with_context(|| format!("failed to load scenario {}", args.scenario.display()))?;
    let checks = check_condition(&scenario, args.altitude_ft, args.mach)?;

    match args.format {
        OutputFormat::Json => render_json(&checks).context("failed to write JSON output")?,
        OutputFormat::Text => {
            write_checks_text(&mut io::stdout().lock(), &checks, ColorPalette::detect())
                .context("failed to write checks")?;
        }
    }
    Ok(())
}

/// Run each phase's pre-search feasibility check at `(altitude_ft, mach)`.
pub fn check_condition(scenario: &Scenario, altitude_ft: u32, mach: f64) -> Result<Vec<PhaseCheck>> {
    let cruise_grid = scenario
        .airspace
        .layer(altitude_ft)
        .ok_or(LibError::MissingAltitudeLayer { altitude_ft })?;
    let terminal_grid = scenario.airspace.terminal().unwrap_or(cruise_grid);

    let checks = FlightPhase::ALL
        .iter()
        .map(|&phase| {
            let grid = match phase {
                FlightPhase::Cruise => cruise_grid,
                FlightPhase::Ascent | FlightPhase::Descent => terminal_grid,
            };
            let finder = CruisePathFinder::new(
                grid,
                scenario.profiles.for_phase(phase),
                altitude_ft,
                mach,
                scenario.sweep.coefficients,
                scenario.sweep.diagonal,
            );
            PhaseCheck {
                phase,
                altitude_ft,
                mach,
                feasibility: finder.check_if_route_possible(),
            }
        })
        .collect();
    Ok(checks)
}
