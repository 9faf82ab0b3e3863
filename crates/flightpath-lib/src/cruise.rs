//! Wind- and fuel-aware cost model and the phase path finder built on it.
//!
//! Every grid transition is converted into real-world distance, flight time
//! and fuel burn. Ground speed is the profile's true airspeed plus the signed
//! wind at the destination cell. The scalar fed to A* is
//! `fuel_cost * (fuel + cost_index * time)`.
//!
//! The lookahead estimate uses still air. Under a strong tailwind the real
//! remaining cost can be lower than that estimate, so the search may settle
//! on a path that is not globally optimal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flight::FlightPhase;
use crate::grid::{DiagonalMovement, Grid, Point};
use crate::optimal::DEFAULT_CUSTOM_COST_INDEX;
use crate::path::{AStarFinder, CostModel};
use crate::profile::{ProfileRow, ProfileTable};
use crate::units::{knots_to_meters_per_second, nautical_miles_to_meters, seconds_to_hours};

/// Fuel cost coefficient and cost index for one flight-cost function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostCoefficients {
    /// Cost per kilogram of fuel (`Cf`).
    pub fuel_cost: f64,
    /// Fuel-equivalent weight of one hour of flight time (`CI`).
    pub cost_index: f64,
}

impl Default for CostCoefficients {
    fn default() -> Self {
        Self {
            fuel_cost: 1.0,
            cost_index: DEFAULT_CUSTOM_COST_INDEX,
        }
    }
}

impl CostCoefficients {
    pub fn new(fuel_cost: f64, cost_index: f64) -> Self {
        Self {
            fuel_cost,
            cost_index,
        }
    }

    pub fn flight_cost(&self, fuel_kg: f64, time_h: f64) -> f64 {
        self.fuel_cost * (fuel_kg + self.cost_index * time_h)
    }

    /// Both coefficients must be finite and non-negative so edge costs are too.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("fuel_cost", self.fuel_cost), ("cost_index", self.cost_index)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("search {name} must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Metrics attributed to the edge arriving at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegMetrics {
    pub from: Point,
    pub to: Point,
    pub distance_nm: f64,
    pub fuel_kg: f64,
    pub time_h: f64,
    pub wind_kt: f64,
}

impl LegMetrics {
    /// A leg is flyable when the wind leaves a positive ground speed.
    pub fn is_flyable(&self) -> bool {
        self.time_h.is_finite()
    }
}

/// Totals over a path's legs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RouteSummary {
    pub total_distance_nm: f64,
    pub total_fuel_kg: f64,
    pub total_time_h: f64,
    /// Arithmetic mean of per-leg wind; zero for a path without legs.
    pub average_wind_kt: f64,
}

impl RouteSummary {
    pub fn from_legs(legs: &[LegMetrics]) -> Self {
        if legs.is_empty() {
            return Self::default();
        }
        let mut summary = legs.iter().fold(Self::default(), |mut acc, leg| {
            acc.total_distance_nm += leg.distance_nm;
            acc.total_fuel_kg += leg.fuel_kg;
            acc.total_time_h += leg.time_h;
            acc.average_wind_kt += leg.wind_kt;
            acc
        });
        summary.average_wind_kt /= legs.len() as f64;
        summary
    }
}

/// [`CostModel`] converting grid transitions into flight cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruiseCostModel {
    performance: ProfileRow,
    coefficients: CostCoefficients,
    heuristic_weight: f64,
}

impl CruiseCostModel {
    pub fn new(performance: ProfileRow, coefficients: CostCoefficients) -> Self {
        Self {
            performance,
            coefficients,
            heuristic_weight: 1.0,
        }
    }

    pub fn with_heuristic_weight(mut self, weight: f64) -> Self {
        self.heuristic_weight = weight;
        self
    }

    pub fn performance(&self) -> &ProfileRow {
        &self.performance
    }

    /// Distance, time and fuel for the step `from -> to`, using the wind at `to`.
    pub fn leg(&self, grid: &Grid, from: Point, to: Point) -> LegMetrics {
        let wind_kt = grid.wind_at(to);
        let distance_nm = cell_distance_nm(grid, from, to);
        let (time_h, fuel_kg) = self.time_and_fuel(distance_nm, wind_kt);
        LegMetrics {
            from,
            to,
            distance_nm,
            fuel_kg,
            time_h,
            wind_kt,
        }
    }

    fn time_and_fuel(&self, distance_nm: f64, wind_kt: f64) -> (f64, f64) {
        let ground_speed_mps =
            knots_to_meters_per_second(self.performance.true_airspeed_kt + wind_kt);
        if ground_speed_mps <= 0.0 {
            return (f64::INFINITY, f64::INFINITY);
        }
        let seconds = nautical_miles_to_meters(distance_nm) / ground_speed_mps;
        let time_h = seconds_to_hours(seconds);
        (time_h, self.performance.fuel_burn_kg_per_hr * time_h)
    }
}

impl CostModel for CruiseCostModel {
    fn edge_cost(&self, grid: &Grid, from: Point, to: Point) -> f64 {
        let leg = self.leg(grid, from, to);
        if !leg.is_flyable() {
            return f64::INFINITY;
        }
        self.coefficients.flight_cost(leg.fuel_kg, leg.time_h)
    }

    fn heuristic(&self, grid: &Grid, node: Point, goal: Point) -> f64 {
        let distance_nm = cell_distance_nm(grid, node, goal);
        let (time_h, fuel_kg) = self.time_and_fuel(distance_nm, 0.0);
        if !time_h.is_finite() {
            return 0.0;
        }
        self.heuristic_weight * self.coefficients.flight_cost(fuel_kg, time_h)
    }
}

fn cell_distance_nm(grid: &Grid, from: Point, to: Point) -> f64 {
    let size = grid.cell_size();
    let dx = f64::from(to.x - from.x) * size.x_nm;
    let dy = f64::from(to.y - from.y) * size.y_nm;
    dx.hypot(dy)
}

/// Outcome of the pre-search feasibility check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Feasibility {
    Feasible,
    /// The profile has no row for the requested altitude and Mach.
    MissingProfileRow,
    /// The aircraft cannot sustain the condition.
    NoFuelBurn { fuel_burn_kg_per_hr: f64 },
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible)
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feasibility::Feasible => f.write_str("feasible"),
            Feasibility::MissingProfileRow => f.write_str("no performance data"),
            Feasibility::NoFuelBurn {
                fuel_burn_kg_per_hr,
            } => write!(f, "fuel burn {fuel_burn_kg_per_hr} kg/h cannot sustain flight"),
        }
    }
}

/// Path found by a [`CruisePathFinder`] with its per-leg breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CruiseRoute {
    pub path: Vec<Point>,
    pub legs: Vec<LegMetrics>,
    pub summary: RouteSummary,
    /// Flight cost accumulated by the search.
    pub cost: f64,
    pub nodes_expanded: usize,
}

/// A* finder for one flight phase at one (altitude, Mach) condition.
#[derive(Debug, Clone)]
pub struct CruisePathFinder<'a> {
    grid: &'a Grid,
    phase: FlightPhase,
    altitude_ft: u32,
    mach: f64,
    performance: Option<ProfileRow>,
    coefficients: CostCoefficients,
    diagonal: DiagonalMovement,
    heuristic_weight: f64,
}

impl<'a> CruisePathFinder<'a> {
    pub fn new(
        grid: &'a Grid,
        profile: &ProfileTable,
        altitude_ft: u32,
        mach: f64,
        coefficients: CostCoefficients,
        diagonal: DiagonalMovement,
    ) -> Self {
        Self {
            grid,
            phase: profile.phase(),
            altitude_ft,
            mach,
            performance: profile.lookup(altitude_ft, mach).copied(),
            coefficients,
            diagonal,
            heuristic_weight: 1.0,
        }
    }

    pub fn with_heuristic_weight(mut self, weight: f64) -> Self {
        self.heuristic_weight = weight;
        self
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Whether the profile supports this flight condition at all.
    pub fn check_if_route_possible(&self) -> Feasibility {
        match self.performance {
            None => Feasibility::MissingProfileRow,
            Some(row) if !row.can_sustain() => Feasibility::NoFuelBurn {
                fuel_burn_kg_per_hr: row.fuel_burn_kg_per_hr,
            },
            Some(_) => Feasibility::Feasible,
        }
    }

    /// Search from `start` to `goal` and attach per-leg metrics and totals.
    ///
    /// Returns `Ok(None)` when no path exists. Calling this on an infeasible
    /// condition is an error; run [`Self::check_if_route_possible`] first.
    pub fn find_path_with_summary(&self, start: Point, goal: Point) -> Result<Option<CruiseRoute>> {
        let feasibility = self.check_if_route_possible();
        let performance = match (feasibility, self.performance) {
            (Feasibility::Feasible, Some(row)) => row,
            _ => {
                return Err(Error::RouteInfeasible {
                    phase: self.phase,
                    altitude_ft: self.altitude_ft,
                    mach: self.mach,
                    reason: feasibility.to_string(),
                })
            }
        };

        let model = CruiseCostModel::new(performance, self.coefficients)
            .with_heuristic_weight(self.heuristic_weight);
        let finder = AStarFinder::new(self.diagonal, model);
        let outcome = finder.find_path(self.grid, start, goal)?;
        if !outcome.is_found() {
            tracing::debug!(
                "no {} path at {} ft / Mach {:.3} from {} to {}",
                self.phase,
                self.altitude_ft,
                self.mach,
                start,
                goal
            );
            return Ok(None);
        }

        let legs: Vec<LegMetrics> = outcome
            .path
            .windows(2)
            .map(|pair| finder.cost_model().leg(self.grid, pair[0], pair[1]))
            .collect();
        let summary = RouteSummary::from_legs(&legs);

        Ok(Some(CruiseRoute {
            path: outcome.path,
            legs,
            summary,
            cost: outcome.cost,
            nodes_expanded: outcome.nodes_expanded,
        }))
    }
}
