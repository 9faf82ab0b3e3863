//! Flightpath library entry points.
//!
//! This crate provides grid A* search with pluggable cost models, a wind-
//! and fuel-aware cost model driven by aircraft performance profiles, a
//! parallel Mach × altitude sweep, and selection of fuel-, time- and
//! custom-optimal trajectories including required-time-of-arrival planning.
//! Higher-level consumers (the CLI) should only depend on the items exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod cruise;
pub mod error;
pub mod flight;
pub mod grid;
pub mod heuristic;
pub mod optimal;
pub mod path;
pub mod profile;
pub mod routing;
pub mod scenario;
pub mod sweep;
pub mod units;

pub use cruise::{
    CostCoefficients, CruiseCostModel, CruisePathFinder, CruiseRoute, Feasibility, LegMetrics,
    RouteSummary,
};
pub use error::{Error, Result};
pub use flight::{AltitudeRun, FlightPhase, Mission, PhaseResult, SkipReason};
pub use grid::{CellSize, DiagonalMovement, Grid, Point};
pub use heuristic::Heuristic;
pub use optimal::{
    find_optimal_paths, find_rta_path, ArrivalWindow, CostConfig, Objective, OptimalPath,
    OptimalPaths, RtaOutcome, RtaRequest, RtaSolution,
};
pub use path::{AStarFinder, CostModel, GridDistance, SearchOutcome};
pub use profile::{MachKey, PhaseProfiles, ProfileRow, ProfileTable};
pub use routing::{plan_flight, FlightPlan, FlightPlanRequest};
pub use scenario::{load_scenario, load_wind_grid, Scenario};
pub use sweep::{
    run_sweep, Airspace, CancelToken, Parallelism, SkippedRun, SweepConfig, SweepOutcome, TotalRun,
};
