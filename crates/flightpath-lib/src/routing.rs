//! Flight planning entry point.
//!
//! This module provides:
//! - [`FlightPlanRequest`] - sweep, selection and optional RTA settings
//! - [`FlightPlan`] - every completed run plus the selected optima
//! - [`plan_flight`] - runs the sweep, selects the optima and retimes the
//!   fuel-optimal run when an RTA is requested
//!
//! # Example
//!
//! ```ignore
//! use flightpath_lib::{load_scenario, plan_flight, CancelToken};
//!
//! let scenario = load_scenario("docs/fixtures/scenario.json".as_ref())?;
//! let plan = plan_flight(&scenario, &scenario.plan_request(), &CancelToken::new())?;
//! println!("fuel optimum: {:?}", plan.optimal.fuel);
//! ```

use serde::Serialize;

use crate::error::Result;
use crate::optimal::{
    find_optimal_paths, find_rta_path, CostConfig, OptimalPaths, RtaOutcome, RtaRequest,
};
use crate::scenario::Scenario;
use crate::sweep::{run_sweep, CancelToken, SkippedRun, SweepConfig, TotalRun};

/// Everything needed to plan a flight over a loaded scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlanRequest {
    pub sweep: SweepConfig,
    pub cost: CostConfig,
    pub rta: Option<RtaRequest>,
}

/// Result of [`plan_flight`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightPlan {
    pub total_run: TotalRun,
    pub skipped: Vec<SkippedRun>,
    pub optimal: OptimalPaths,
    /// Present iff the request carried an RTA.
    pub rta: Option<RtaOutcome>,
}

/// Sweep every (Mach, altitude) pair, then select the optimal runs.
pub fn plan_flight(
    scenario: &Scenario,
    request: &FlightPlanRequest,
    cancel: &CancelToken,
) -> Result<FlightPlan> {
    request.cost.validate()?;
    if let Some(rta) = &request.rta {
        rta.validate()?;
    }

    let sweep = run_sweep(
        &scenario.airspace,
        &scenario.profiles,
        &scenario.mission,
        &request.sweep,
        cancel,
    )?;
    let optimal = find_optimal_paths(&sweep.total_run, &request.cost);

    let rta = match (&request.rta, &optimal.fuel) {
        (None, _) => None,
        (Some(_), None) => Some(RtaOutcome::NoBaselinePath),
        (Some(rta), Some(fuel)) => Some(find_rta_path(fuel, &scenario.profiles.cruise, rta)?),
    };

    if let Some(fuel) = &optimal.fuel {
        tracing::info!(
            "fuel optimum Mach {:.3} at {} ft: {:.1} kg over {:.1} nm",
            fuel.mach,
            fuel.altitude_ft,
            fuel.fuel_kg,
            fuel.distance_nm
        );
    } else {
        tracing::warn!("no run completed; nothing to select");
    }

    Ok(FlightPlan {
        total_run: sweep.total_run,
        skipped: sweep.skipped,
        optimal,
        rta,
    })
}
