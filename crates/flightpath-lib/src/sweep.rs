//! Speed × altitude sweep.
//!
//! Each (Mach, altitude) pair is an independent three-phase run. Grids and
//! profiles are shared read-only; every search owns its scratch state, so
//! runs can execute on a rayon pool without coordination. Results are merged
//! into a [`TotalRun`] keyed by (Mach, altitude), which makes the outcome
//! identical regardless of how runs were scheduled.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::cruise::CostCoefficients;
use crate::error::{Error, Result};
use crate::flight::{run_altitude, AltitudeRun, Mission, RunContext, RunOutcome, SkipReason};
use crate::grid::{DiagonalMovement, Grid};
use crate::profile::{MachKey, PhaseProfiles};

/// How runs are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// One run at a time on the calling thread.
    Sequential,
    /// Rayon's global pool.
    #[default]
    Auto,
    /// A dedicated pool with this many threads.
    Threads(usize),
}

/// Sweep configuration: which pairs to run and how to search them.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub machs: Vec<f64>,
    pub altitudes_ft: Vec<u32>,
    /// Coefficients steering every phase search.
    pub coefficients: CostCoefficients,
    pub diagonal: DiagonalMovement,
    pub heuristic_weight: f64,
    pub parallelism: Parallelism,
}

impl SweepConfig {
    pub fn new(machs: Vec<f64>, altitudes_ft: Vec<u32>) -> Self {
        Self {
            machs,
            altitudes_ft,
            coefficients: CostCoefficients::default(),
            diagonal: DiagonalMovement::default(),
            heuristic_weight: 1.0,
            parallelism: Parallelism::default(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.machs.is_empty() || self.altitudes_ft.is_empty() {
            return Err(Error::InvalidConfig {
                message: "sweep needs at least one Mach and one altitude".to_string(),
            });
        }
        if let Some(mach) = self.machs.iter().find(|m| !m.is_finite() || **m <= 0.0) {
            return Err(Error::InvalidConfig {
                message: format!("Mach {mach} must be positive"),
            });
        }
        self.coefficients.validate()?;
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 0.0 {
            return Err(Error::InvalidConfig {
                message: format!(
                    "heuristic weight {} must be non-negative",
                    self.heuristic_weight
                ),
            });
        }
        if self.parallelism == Parallelism::Threads(0) {
            return Err(Error::InvalidConfig {
                message: "thread count must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Distinct (Mach, altitude) pairs in ascending order.
    pub fn pairs(&self) -> Vec<(f64, u32)> {
        let machs: BTreeSet<MachKey> = self.machs.iter().map(|m| MachKey::from_mach(*m)).collect();
        let altitudes: BTreeSet<u32> = self.altitudes_ft.iter().copied().collect();
        machs
            .iter()
            .flat_map(|mach| altitudes.iter().map(move |alt| (mach.mach(), *alt)))
            .collect()
    }
}

/// Wind grids per altitude layer, plus an optional terminal-area grid for
/// ascent and descent.
#[derive(Debug, Clone, Default)]
pub struct Airspace {
    layers: BTreeMap<u32, Grid>,
    terminal: Option<Grid>,
}

impl Airspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, altitude_ft: u32, grid: Grid) -> Self {
        self.insert_layer(altitude_ft, grid);
        self
    }

    pub fn with_terminal(mut self, grid: Grid) -> Self {
        self.terminal = Some(grid);
        self
    }

    pub fn insert_layer(&mut self, altitude_ft: u32, grid: Grid) -> Option<Grid> {
        self.layers.insert(altitude_ft, grid)
    }

    pub fn layer(&self, altitude_ft: u32) -> Option<&Grid> {
        self.layers.get(&altitude_ft)
    }

    pub fn terminal(&self) -> Option<&Grid> {
        self.terminal.as_ref()
    }

    pub fn altitudes(&self) -> impl Iterator<Item = u32> + '_ {
        self.layers.keys().copied()
    }

    fn grids_for(&self, altitude_ft: u32) -> Result<(&Grid, &Grid)> {
        let cruise = self
            .layer(altitude_ft)
            .ok_or(Error::MissingAltitudeLayer { altitude_ft })?;
        Ok((cruise, self.terminal.as_ref().unwrap_or(cruise)))
    }
}

/// Cooperative cancellation flag, checked before each run starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Completed runs keyed by Mach, then altitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TotalRun {
    runs: BTreeMap<MachKey, BTreeMap<u32, AltitudeRun>>,
}

impl TotalRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a run, replacing any previous run for the same pair.
    pub fn insert(&mut self, run: AltitudeRun) -> Option<AltitudeRun> {
        self.runs
            .entry(MachKey::from_mach(run.mach))
            .or_default()
            .insert(run.altitude_ft, run)
    }

    pub fn get(&self, mach: f64, altitude_ft: u32) -> Option<&AltitudeRun> {
        self.runs
            .get(&MachKey::from_mach(mach))
            .and_then(|by_altitude| by_altitude.get(&altitude_ft))
    }

    /// Runs in ascending (Mach, altitude) order.
    pub fn iter(&self) -> impl Iterator<Item = &AltitudeRun> {
        self.runs.values().flat_map(|by_altitude| by_altitude.values())
    }

    pub fn machs(&self) -> impl Iterator<Item = MachKey> + '_ {
        self.runs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.runs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pair that produced no run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRun {
    pub mach: f64,
    pub altitude_ft: u32,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub total_run: TotalRun,
    pub skipped: Vec<SkippedRun>,
}

/// Run every configured (Mach, altitude) pair.
///
/// Pairs that fail their feasibility check or have no path are omitted from
/// the total run and listed in `skipped`. Cancellation is checked before each
/// run; if any run was not started the sweep returns
/// [`Error::SweepCancelled`].
pub fn run_sweep(
    airspace: &Airspace,
    profiles: &PhaseProfiles,
    mission: &Mission,
    config: &SweepConfig,
    cancel: &CancelToken,
) -> Result<SweepOutcome> {
    config.validate()?;
    let pairs = config.pairs();

    for altitude_ft in config.altitudes_ft.iter().copied() {
        let (cruise, terminal) = airspace.grids_for(altitude_ft)?;
        for grid in [cruise, terminal] {
            for point in mission.waypoints() {
                if !grid.is_inside(point.x, point.y) {
                    return Err(Error::OutOfBounds {
                        x: point.x,
                        y: point.y,
                        width: grid.width(),
                        height: grid.height(),
                    });
                }
            }
        }
    }

    tracing::info!(
        "sweeping {} runs ({} Mach x {} altitudes, {:?})",
        pairs.len(),
        config.machs.len(),
        config.altitudes_ft.len(),
        config.parallelism
    );

    let run_one = |&(mach, altitude_ft): &(f64, u32)| -> Result<Option<(f64, u32, RunOutcome)>> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let (cruise_grid, terminal_grid) = airspace.grids_for(altitude_ft)?;
        let ctx = RunContext {
            cruise_grid,
            terminal_grid,
            profiles,
            mission,
            coefficients: config.coefficients,
            diagonal: config.diagonal,
            heuristic_weight: config.heuristic_weight,
        };
        run_altitude(&ctx, mach, altitude_ft).map(|outcome| Some((mach, altitude_ft, outcome)))
    };

    let results: Vec<Result<Option<(f64, u32, RunOutcome)>>> = match config.parallelism {
        Parallelism::Sequential => pairs.iter().map(run_one).collect(),
        Parallelism::Auto => pairs.par_iter().map(run_one).collect(),
        Parallelism::Threads(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::ThreadPool {
                    message: e.to_string(),
                })?;
            pool.install(|| pairs.par_iter().map(run_one).collect())
        }
    };

    let mut outcome = SweepOutcome::default();
    let mut completed = 0usize;
    let mut cancelled = false;
    for result in results {
        match result? {
            Some((_, _, RunOutcome::Completed(run))) => {
                completed += 1;
                outcome.total_run.insert(run);
            }
            Some((mach, altitude_ft, RunOutcome::Skipped(reason))) => {
                completed += 1;
                tracing::warn!("Mach {:.3} at {} ft skipped: {}", mach, altitude_ft, reason);
                outcome.skipped.push(SkippedRun {
                    mach,
                    altitude_ft,
                    reason,
                });
            }
            None => cancelled = true,
        }
    }

    if cancelled {
        tracing::warn!("sweep cancelled after {} of {} runs", completed, pairs.len());
        return Err(Error::SweepCancelled { completed });
    }

    tracing::info!(
        "sweep finished: {} runs completed, {} skipped",
        outcome.total_run.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}
