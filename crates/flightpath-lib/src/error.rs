use std::path::PathBuf;

use thiserror::Error;

use crate::flight::FlightPhase;

/// Convenient result alias for the flightpath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Only configuration and programmer errors live here. A search that exhausts
/// its frontier, a skipped sweep run, or an RTA without a solution are
/// reported as ordinary values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a walkability or wind matrix does not match the declared grid size.
    #[error(
        "grid matrix is {actual_width}x{actual_height} but grid was declared {width}x{height}"
    )]
    GridDimensionMismatch {
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// Raised when a grid would have no cells.
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    /// Raised when a coordinate falls outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// Raised when a diagonal movement policy name is not recognised.
    #[error("unknown diagonal movement policy: {value}")]
    UnknownDiagonalMovement { value: String },

    /// Raised when a heuristic name is not recognised.
    #[error("unknown heuristic: {value}")]
    UnknownHeuristic { value: String },

    /// Raised when the performance profile has no row for a flight condition.
    #[error("no {phase} profile row for altitude {altitude_ft} ft at Mach {mach:.3}")]
    MissingProfileRow {
        phase: FlightPhase,
        altitude_ft: u32,
        mach: f64,
    },

    /// Raised when a sweep names an altitude without a wind layer.
    #[error("no wind layer loaded for altitude {altitude_ft} ft")]
    MissingAltitudeLayer { altitude_ft: u32 },

    /// Raised when a finder is asked to search although its pre-check failed.
    #[error("{phase} route at {altitude_ft} ft / Mach {mach:.3} is not possible: {reason}")]
    RouteInfeasible {
        phase: FlightPhase,
        altitude_ft: u32,
        mach: f64,
        reason: String,
    },

    /// Raised when sweep or planner settings are invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when a performance profile table fails validation.
    #[error("invalid profile data: {message}")]
    ProfileData { message: String },

    /// Raised when a wind table fails validation.
    #[error("invalid wind data in {path}: {message}")]
    WindData { path: PathBuf, message: String },

    /// Raised when a sweep observed a cancellation request between runs.
    #[error("sweep cancelled after {completed} completed runs")]
    SweepCancelled { completed: usize },

    /// Raised when the bounded worker pool could not be created.
    #[error("failed to build sweep worker pool: {message}")]
    ThreadPool { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
