//! Scenario loading: a JSON manifest naming wind grids, performance
//! profiles, the mission waypoints and default planning settings.
//!
//! Relative file paths inside the manifest are resolved against the
//! manifest's own directory.
//!
//! Wind files are headerless CSV with one row per grid row (north first) and
//! one signed knot value per cell. A cell containing `x`, `X`, `#` or nothing
//! is blocked.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::cruise::CostCoefficients;
use crate::error::{Error, Result};
use crate::flight::{FlightPhase, Mission};
use crate::grid::{CellSize, DiagonalMovement, Grid};
use crate::optimal::{CostConfig, RtaRequest};
use crate::profile::{PhaseProfiles, ProfileTable};
use crate::routing::FlightPlanRequest;
use crate::sweep::{Airspace, Parallelism, SweepConfig};

const BLOCKED_MARKERS: [&str; 4] = ["", "x", "X", "#"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioManifest {
    #[serde(default)]
    cell_size: CellSize,
    layers: Vec<LayerManifest>,
    #[serde(default)]
    terminal_winds: Option<PathBuf>,
    profiles: ProfilesManifest,
    mission: Mission,
    sweep: SweepManifest,
    #[serde(default)]
    cost: CostConfig,
    #[serde(default)]
    rta: Option<RtaRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerManifest {
    altitude_ft: u32,
    winds: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesManifest {
    climb: PathBuf,
    cruise: PathBuf,
    descent: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SweepManifest {
    machs: Vec<f64>,
    /// Defaults to every loaded layer.
    #[serde(default)]
    altitudes_ft: Option<Vec<u32>>,
    #[serde(default)]
    diagonal: DiagonalMovement,
    #[serde(default = "default_heuristic_weight")]
    heuristic_weight: f64,
    /// Cost index steering the searches; defaults to the custom cost index.
    #[serde(default)]
    search_cost_index: Option<f64>,
}

fn default_heuristic_weight() -> f64 {
    1.0
}

/// A fully loaded scenario with its default planning settings.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub airspace: Airspace,
    pub profiles: PhaseProfiles,
    pub mission: Mission,
    pub sweep: SweepConfig,
    pub cost: CostConfig,
    pub rta: Option<RtaRequest>,
}

impl Scenario {
    /// Planning request built from the scenario's own settings.
    pub fn plan_request(&self) -> FlightPlanRequest {
        FlightPlanRequest {
            sweep: self.sweep.clone(),
            cost: self.cost,
            rta: self.rta,
        }
    }
}

/// Load a scenario manifest and every file it references.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let raw = fs::read_to_string(path)?;
    let manifest: ScenarioManifest =
        serde_json::from_str(&raw).map_err(|err| Error::InvalidConfig {
            message: format!("{}: {}", path.display(), err),
        })?;
    manifest.cell_size.validate()?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let resolve = |file: &Path| -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            base.join(file)
        }
    };

    let mut airspace = Airspace::new();
    for layer in &manifest.layers {
        let grid =
            load_wind_grid(&resolve(layer.winds.as_path()))?.with_cell_size(manifest.cell_size);
        if airspace.insert_layer(layer.altitude_ft, grid).is_some() {
            return Err(Error::InvalidConfig {
                message: format!("wind layer {} ft listed twice", layer.altitude_ft),
            });
        }
    }
    if let Some(terminal) = &manifest.terminal_winds {
        let grid =
            load_wind_grid(&resolve(terminal.as_path()))?.with_cell_size(manifest.cell_size);
        airspace = airspace.with_terminal(grid);
    }

    let profiles = PhaseProfiles {
        climb: ProfileTable::from_path(
            FlightPhase::Ascent,
            &resolve(manifest.profiles.climb.as_path()),
        )?,
        cruise: ProfileTable::from_path(
            FlightPhase::Cruise,
            &resolve(manifest.profiles.cruise.as_path()),
        )?,
        descent: ProfileTable::from_path(
            FlightPhase::Descent,
            &resolve(manifest.profiles.descent.as_path()),
        )?,
    };

    let cost = manifest.cost;
    cost.validate()?;
    let sweep_manifest = manifest.sweep;
    let sweep = SweepConfig {
        machs: sweep_manifest.machs,
        altitudes_ft: sweep_manifest
            .altitudes_ft
            .unwrap_or_else(|| airspace.altitudes().collect()),
        coefficients: CostCoefficients::new(
            cost.fuel_cost,
            sweep_manifest
                .search_cost_index
                .unwrap_or(cost.custom_cost_index),
        ),
        diagonal: sweep_manifest.diagonal,
        heuristic_weight: sweep_manifest.heuristic_weight,
        parallelism: Parallelism::default(),
    };
    sweep.validate()?;

    tracing::info!(
        "loaded scenario {} with {} wind layers",
        path.display(),
        manifest.layers.len()
    );

    Ok(Scenario {
        airspace,
        profiles,
        mission: manifest.mission,
        sweep,
        cost,
        rta: manifest.rta,
    })
}

/// Load a wind grid from a headerless CSV file.
pub fn load_wind_grid(path: &Path) -> Result<Grid> {
    let file = fs::File::open(path)?;
    wind_grid_from_reader(file, path)
}

/// Parse a headerless wind CSV; `source` is only used in error messages.
pub fn wind_grid_from_reader<R: Read>(reader: R, source: &Path) -> Result<Grid> {
    let wind_error = |message: String| Error::WindData {
        path: source.to_path_buf(),
        message,
    };

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| wind_error(e.to_string()))?;
        let mut cells = Vec::with_capacity(record.len());
        for (col, field) in record.iter().enumerate() {
            if BLOCKED_MARKERS.contains(&field) {
                cells.push(None);
                continue;
            }
            let wind: f64 = field.parse().map_err(|_| {
                wind_error(format!(
                    "row {}, column {}: invalid wind value {:?}",
                    row + 1,
                    col + 1,
                    field
                ))
            })?;
            if !wind.is_finite() {
                return Err(wind_error(format!(
                    "row {}, column {}: wind must be finite",
                    row + 1,
                    col + 1
                )));
            }
            cells.push(Some(wind));
        }
        rows.push(cells);
    }

    Grid::from_wind_matrix(&rows).map_err(|e| wind_error(e.to_string()))
}
