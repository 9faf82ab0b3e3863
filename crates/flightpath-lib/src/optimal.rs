//! Selection of the fuel-, time- and custom-optimal runs and the
//! required-time-of-arrival (RTA) variant.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cruise::CostCoefficients;
use crate::error::{Error, Result};
use crate::flight::{AltitudeRun, FlightPhase};
use crate::grid::Point;
use crate::profile::ProfileTable;
use crate::sweep::TotalRun;

/// Cost index of the fuel-optimal objective.
pub const FUEL_COST_INDEX: f64 = 0.0;
/// Cost index of the time-optimal objective.
pub const TIME_COST_INDEX: f64 = 99.0;
pub const DEFAULT_CUSTOM_COST_INDEX: f64 = 50.0;

const MACH_BAND_TOLERANCE: f64 = 1e-9;

/// Which flight-cost function a result minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Fuel,
    Time,
    Custom,
}

impl Objective {
    pub const ALL: [Objective; 3] = [Objective::Fuel, Objective::Time, Objective::Custom];
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Objective::Fuel => "fuel",
            Objective::Time => "time",
            Objective::Custom => "custom",
        };
        f.write_str(value)
    }
}

/// Fuel cost coefficient and the three cost indices used for selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub fuel_cost: f64,
    pub fuel_cost_index: f64,
    pub time_cost_index: f64,
    pub custom_cost_index: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            fuel_cost: 1.0,
            fuel_cost_index: FUEL_COST_INDEX,
            time_cost_index: TIME_COST_INDEX,
            custom_cost_index: DEFAULT_CUSTOM_COST_INDEX,
        }
    }
}

impl CostConfig {
    pub fn with_custom_cost_index(mut self, cost_index: f64) -> Self {
        self.custom_cost_index = cost_index;
        self
    }

    pub fn coefficients(&self, objective: Objective) -> CostCoefficients {
        let cost_index = match objective {
            Objective::Fuel => self.fuel_cost_index,
            Objective::Time => self.time_cost_index,
            Objective::Custom => self.custom_cost_index,
        };
        CostCoefficients::new(self.fuel_cost, cost_index)
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            ("fuel_cost", self.fuel_cost),
            ("fuel_cost_index", self.fuel_cost_index),
            ("time_cost_index", self.time_cost_index),
            ("custom_cost_index", self.custom_cost_index),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Best run for one objective, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalPath {
    pub objective: Objective,
    pub flight_cost: f64,
    pub fuel_kg: f64,
    pub time_h: f64,
    pub distance_nm: f64,
    pub mach: f64,
    pub altitude_ft: u32,
    /// Cruise-phase cells.
    pub path: Vec<Point>,
    pub average_wind_kt: f64,
}

impl OptimalPath {
    fn from_run(objective: Objective, flight_cost: f64, run: &AltitudeRun) -> Self {
        Self {
            objective,
            flight_cost,
            fuel_kg: run.total_fuel_kg(),
            time_h: run.total_time_h(),
            distance_nm: run.total_distance_nm(),
            mach: run.mach,
            altitude_ft: run.altitude_ft,
            path: run.cruise.path.clone(),
            average_wind_kt: run.average_wind_kt(),
        }
    }
}

/// One optional result per objective; all empty when the total run is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimalPaths {
    pub fuel: Option<OptimalPath>,
    pub time: Option<OptimalPath>,
    pub custom: Option<OptimalPath>,
}

impl OptimalPaths {
    pub fn get(&self, objective: Objective) -> Option<&OptimalPath> {
        match objective {
            Objective::Fuel => self.fuel.as_ref(),
            Objective::Time => self.time.as_ref(),
            Objective::Custom => self.custom.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Objective::ALL.iter().all(|o| self.get(*o).is_none())
    }
}

/// Scan every completed run and keep the cheapest under each objective.
///
/// Runs are visited in ascending (Mach, altitude) order and only a strictly
/// lower cost replaces the incumbent, so ties go to the first run visited.
pub fn find_optimal_paths(total_run: &TotalRun, config: &CostConfig) -> OptimalPaths {
    let coefficients = Objective::ALL.map(|objective| config.coefficients(objective));
    let mut best: [Option<(f64, &AltitudeRun)>; 3] = [None; 3];

    for run in total_run.iter() {
        for (slot, coefficients) in coefficients.iter().enumerate() {
            let cost = run.flight_cost(coefficients);
            match best[slot] {
                Some((incumbent, _)) if cost >= incumbent => {}
                _ => best[slot] = Some((cost, run)),
            }
        }
    }

    let [fuel, time, custom] = best;
    let pick = |objective, entry: Option<(f64, &AltitudeRun)>| {
        entry.map(|(cost, run)| OptimalPath::from_run(objective, cost, run))
    };
    OptimalPaths {
        fuel: pick(Objective::Fuel, fuel),
        time: pick(Objective::Time, time),
        custom: pick(Objective::Custom, custom),
    }
}

/// Arrival-time constraint and the Mach band the aircraft may fly to meet it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtaRequest {
    pub available_time_h: f64,
    pub min_mach: f64,
    pub max_mach: f64,
}

impl RtaRequest {
    pub fn validate(&self) -> Result<()> {
        if !self.available_time_h.is_finite() || self.available_time_h <= 0.0 {
            return Err(Error::InvalidConfig {
                message: format!(
                    "available time must be positive, got {} h",
                    self.available_time_h
                ),
            });
        }
        if !(self.min_mach > 0.0 && self.min_mach <= self.max_mach && self.max_mach.is_finite()) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "Mach band [{}, {}] must be positive and ordered",
                    self.min_mach, self.max_mach
                ),
            });
        }
        Ok(())
    }
}

/// Earliest and latest reachable arrival, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArrivalWindow {
    pub earliest_h: f64,
    pub latest_h: f64,
}

impl ArrivalWindow {
    pub fn contains(&self, time_h: f64) -> bool {
        time_h >= self.earliest_h && time_h <= self.latest_h
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RtaSolution {
    /// The fuel-optimal run, flown at `required_mach`.
    pub path: OptimalPath,
    pub required_mach: f64,
    pub required_ground_speed_kt: f64,
    pub window: ArrivalWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RtaOutcome {
    Feasible(RtaSolution),
    /// The requested time is reachable, but only outside the allowed Mach band.
    OutOfMachBand {
        required_mach: f64,
        min_mach: f64,
        max_mach: f64,
    },
    /// The requested time falls outside what the aircraft can achieve at all.
    OutsideArrivalWindow {
        requested_h: f64,
        window: ArrivalWindow,
    },
    /// No fuel-optimal run exists to retime.
    NoBaselinePath,
}

impl RtaOutcome {
    pub fn solution(&self) -> Option<&RtaSolution> {
        match self {
            RtaOutcome::Feasible(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.solution().is_some()
    }
}

/// Retime the fuel-optimal run to arrive after `available_time_h`.
///
/// The arrival window spans the slowest and fastest sustainable cruise Mach
/// at the run's altitude, corrected by the run's average wind. Inside that
/// window the required Mach must also fall within the request's band.
pub fn find_rta_path(
    fuel_optimal: &OptimalPath,
    cruise: &ProfileTable,
    request: &RtaRequest,
) -> Result<RtaOutcome> {
    request.validate()?;

    let altitude_ft = fuel_optimal.altitude_ft;
    let speed_of_sound = cruise
        .speed_of_sound_at(altitude_ft)
        .ok_or(Error::MissingProfileRow {
            phase: FlightPhase::Cruise,
            altitude_ft,
            mach: fuel_optimal.mach,
        })?;
    let (slowest, fastest) = cruise
        .mach_envelope(altitude_ft)
        .unwrap_or((request.min_mach, request.max_mach));

    let distance = fuel_optimal.distance_nm;
    let wind = fuel_optimal.average_wind_kt;
    let arrival_after = |mach: f64| {
        let ground_speed = mach * speed_of_sound + wind;
        if ground_speed > 0.0 {
            distance / ground_speed
        } else {
            f64::INFINITY
        }
    };
    let window = ArrivalWindow {
        earliest_h: arrival_after(fastest),
        latest_h: arrival_after(slowest),
    };

    if !window.contains(request.available_time_h) {
        tracing::debug!(
            "RTA of {:.3} h outside window [{:.3}, {:.3}]",
            request.available_time_h,
            window.earliest_h,
            window.latest_h
        );
        return Ok(RtaOutcome::OutsideArrivalWindow {
            requested_h: request.available_time_h,
            window,
        });
    }

    let required_ground_speed_kt = distance / request.available_time_h;
    let required_mach = (required_ground_speed_kt - wind) / speed_of_sound;
    if required_mach < request.min_mach - MACH_BAND_TOLERANCE
        || required_mach > request.max_mach + MACH_BAND_TOLERANCE
    {
        return Ok(RtaOutcome::OutOfMachBand {
            required_mach,
            min_mach: request.min_mach,
            max_mach: request.max_mach,
        });
    }

    Ok(RtaOutcome::Feasible(RtaSolution {
        path: fuel_optimal.clone(),
        required_mach,
        required_ground_speed_kt,
        window,
    }))
}
