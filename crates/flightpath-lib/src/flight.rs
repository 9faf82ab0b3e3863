//! Flight phases and the three-phase run executed for one (Mach, altitude) pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cruise::{CostCoefficients, CruisePathFinder, CruiseRoute, Feasibility};
use crate::error::Result;
use crate::grid::{DiagonalMovement, Grid, Point};
use crate::profile::PhaseProfiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightPhase {
    Ascent,
    Cruise,
    Descent,
}

impl FlightPhase {
    pub const ALL: [FlightPhase; 3] = [FlightPhase::Ascent, FlightPhase::Cruise, FlightPhase::Descent];
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            FlightPhase::Ascent => "ascent",
            FlightPhase::Cruise => "cruise",
            FlightPhase::Descent => "descent",
        };
        f.write_str(value)
    }
}

/// Waypoints bounding the three phases of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub departure: Point,
    pub top_of_climb: Point,
    pub top_of_descent: Point,
    pub arrival: Point,
}

impl Mission {
    /// A mission whose climb and descent collapse onto the endpoints.
    pub fn direct(departure: Point, arrival: Point) -> Self {
        Self {
            departure,
            top_of_climb: departure,
            top_of_descent: arrival,
            arrival,
        }
    }

    pub fn waypoints(&self) -> [Point; 4] {
        [
            self.departure,
            self.top_of_climb,
            self.top_of_descent,
            self.arrival,
        ]
    }
}

/// Totals and path for one phase of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseResult {
    pub phase: FlightPhase,
    pub distance_nm: f64,
    pub fuel_kg: f64,
    pub time_h: f64,
    pub average_wind_kt: f64,
    pub path: Vec<Point>,
}

impl PhaseResult {
    fn from_route(phase: FlightPhase, route: CruiseRoute) -> Self {
        Self {
            phase,
            distance_nm: route.summary.total_distance_nm,
            fuel_kg: route.summary.total_fuel_kg,
            time_h: route.summary.total_time_h,
            average_wind_kt: route.summary.average_wind_kt,
            path: route.path,
        }
    }
}

/// Completed ascent, cruise and descent for one (Mach, altitude) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltitudeRun {
    pub mach: f64,
    pub altitude_ft: u32,
    pub ascent: PhaseResult,
    pub cruise: PhaseResult,
    pub descent: PhaseResult,
}

impl AltitudeRun {
    pub fn phases(&self) -> [&PhaseResult; 3] {
        [&self.ascent, &self.cruise, &self.descent]
    }

    pub fn total_distance_nm(&self) -> f64 {
        self.phases().iter().map(|p| p.distance_nm).sum()
    }

    pub fn total_fuel_kg(&self) -> f64 {
        self.phases().iter().map(|p| p.fuel_kg).sum()
    }

    pub fn total_time_h(&self) -> f64 {
        self.phases().iter().map(|p| p.time_h).sum()
    }

    /// Mean of the three phase averages, unweighted.
    pub fn average_wind_kt(&self) -> f64 {
        self.phases().iter().map(|p| p.average_wind_kt).sum::<f64>() / 3.0
    }

    pub fn flight_cost(&self, coefficients: &CostCoefficients) -> f64 {
        coefficients.flight_cost(self.total_fuel_kg(), self.total_time_h())
    }
}

/// Why a (Mach, altitude) pair produced no run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// A phase failed its pre-search feasibility check.
    Infeasible {
        phase: FlightPhase,
        feasibility: Feasibility,
    },
    /// A phase search exhausted its frontier.
    NoPath { phase: FlightPhase },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Infeasible { phase, feasibility } => {
                write!(f, "{phase} infeasible: {feasibility}")
            }
            SkipReason::NoPath { phase } => write!(f, "no {phase} path"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(AltitudeRun),
    Skipped(SkipReason),
}

/// Shared, read-only inputs for running the phases of one pair.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    /// Grid flown during cruise.
    pub cruise_grid: &'a Grid,
    /// Grid flown during ascent and descent.
    pub terminal_grid: &'a Grid,
    pub profiles: &'a PhaseProfiles,
    pub mission: &'a Mission,
    pub coefficients: CostCoefficients,
    pub diagonal: DiagonalMovement,
    pub heuristic_weight: f64,
}

impl<'a> RunContext<'a> {
    fn finder(&self, phase: FlightPhase, altitude_ft: u32, mach: f64) -> CruisePathFinder<'a> {
        let grid = match phase {
            FlightPhase::Cruise => self.cruise_grid,
            FlightPhase::Ascent | FlightPhase::Descent => self.terminal_grid,
        };
        CruisePathFinder::new(
            grid,
            self.profiles.for_phase(phase),
            altitude_ft,
            mach,
            self.coefficients,
            self.diagonal,
        )
        .with_heuristic_weight(self.heuristic_weight)
    }
}

/// Run ascent, cruise and descent for one pair.
///
/// All three phases are checked for feasibility before any search starts,
/// so an unsupported condition costs no search time.
pub fn run_altitude(ctx: &RunContext<'_>, mach: f64, altitude_ft: u32) -> Result<RunOutcome> {
    let finders = FlightPhase::ALL.map(|phase| ctx.finder(phase, altitude_ft, mach));

    for finder in &finders {
        let feasibility = finder.check_if_route_possible();
        if !feasibility.is_feasible() {
            tracing::debug!(
                "skipping Mach {:.3} at {} ft: {} {}",
                mach,
                altitude_ft,
                finder.phase(),
                feasibility
            );
            return Ok(RunOutcome::Skipped(SkipReason::Infeasible {
                phase: finder.phase(),
                feasibility,
            }));
        }
    }

    let search =
        |finder: &CruisePathFinder<'_>, from: Point, to: Point| -> Result<Option<PhaseResult>> {
            Ok(finder
                .find_path_with_summary(from, to)?
                .map(|route| PhaseResult::from_route(finder.phase(), route)))
        };
    let mission = ctx.mission;
    let [ascent_finder, cruise_finder, descent_finder] = &finders;

    let Some(ascent) = search(ascent_finder, mission.departure, mission.top_of_climb)? else {
        return Ok(RunOutcome::Skipped(SkipReason::NoPath {
            phase: FlightPhase::Ascent,
        }));
    };
    let Some(cruise) = search(cruise_finder, mission.top_of_climb, mission.top_of_descent)? else {
        return Ok(RunOutcome::Skipped(SkipReason::NoPath {
            phase: FlightPhase::Cruise,
        }));
    };
    let Some(descent) = search(descent_finder, mission.top_of_descent, mission.arrival)? else {
        return Ok(RunOutcome::Skipped(SkipReason::NoPath {
            phase: FlightPhase::Descent,
        }));
    };

    Ok(RunOutcome::Completed(AltitudeRun {
        mach,
        altitude_ft,
        ascent,
        cruise,
        descent,
    }))
}
