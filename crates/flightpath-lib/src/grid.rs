//! Walkability grid with per-cell wind.
//!
//! A [`Grid`] is built once per altitude layer and then shared read-only by
//! every search that runs over it. Search bookkeeping lives in the search's
//! own scratch arena (see [`crate::path`]), so a grid never carries state
//! between runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Grid coordinate. Signed so that out-of-range probes can be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Physical size of one cell in nautical miles, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub x_nm: f64,
    pub y_nm: f64,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            x_nm: 1.0,
            y_nm: 1.0,
        }
    }
}

impl CellSize {
    /// Square cells of `nm` nautical miles per side.
    pub fn square(nm: f64) -> Self {
        Self { x_nm: nm, y_nm: nm }
    }

    /// Both axes must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.x_nm.is_finite() && self.x_nm > 0.0 && self.y_nm.is_finite() && self.y_nm > 0.0)
        {
            return Err(Error::InvalidConfig {
                message: format!(
                    "cell size {} x {} nm must be positive",
                    self.x_nm, self.y_nm
                ),
            });
        }
        Ok(())
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub walkable: bool,
    /// Signed wind component in knots; positive is a tailwind.
    pub wind_kt: f64,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            walkable: true,
            wind_kt: 0.0,
        }
    }
}

/// Rule governing when a diagonal step is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagonalMovement {
    /// Orthogonal steps only.
    Never,
    /// Diagonal allowed when both bracketing orthogonal cells are walkable.
    #[default]
    OnlyWhenNoObstacles,
    /// Diagonal allowed when at least one bracketing orthogonal cell is walkable.
    IfAtMostOneObstacle,
    /// Diagonal always allowed onto a walkable cell.
    Always,
}

impl DiagonalMovement {
    fn permits(self, first: bool, second: bool) -> bool {
        match self {
            DiagonalMovement::Never => false,
            DiagonalMovement::OnlyWhenNoObstacles => first && second,
            DiagonalMovement::IfAtMostOneObstacle => first || second,
            DiagonalMovement::Always => true,
        }
    }
}

impl fmt::Display for DiagonalMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DiagonalMovement::Never => "never",
            DiagonalMovement::OnlyWhenNoObstacles => "only-when-no-obstacles",
            DiagonalMovement::IfAtMostOneObstacle => "if-at-most-one-obstacle",
            DiagonalMovement::Always => "always",
        };
        f.write_str(value)
    }
}

impl FromStr for DiagonalMovement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "never" => Ok(DiagonalMovement::Never),
            "only-when-no-obstacles" => Ok(DiagonalMovement::OnlyWhenNoObstacles),
            "if-at-most-one-obstacle" => Ok(DiagonalMovement::IfAtMostOneObstacle),
            "always" => Ok(DiagonalMovement::Always),
            _ => Err(Error::UnknownDiagonalMovement {
                value: s.to_string(),
            }),
        }
    }
}

/// Rectangular matrix of cells.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    cell_size: CellSize,
}

impl Grid {
    /// Build a fully walkable, windless grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            cell_size: CellSize::default(),
        }
    }

    /// Build a grid from a walkability matrix where `matrix[y][x] == true`
    /// marks a blocked cell.
    pub fn from_matrix(width: usize, height: usize, matrix: &[Vec<bool>]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid);
        }
        let actual_width = matrix.first().map(Vec::len).unwrap_or(0);
        if matrix.len() != height || matrix.iter().any(|row| row.len() != width) {
            return Err(Error::GridDimensionMismatch {
                width,
                height,
                actual_width,
                actual_height: matrix.len(),
            });
        }

        let mut grid = Self::new(width, height);
        for (y, row) in matrix.iter().enumerate() {
            for (x, &blocked) in row.iter().enumerate() {
                grid.cells[y * width + x].walkable = !blocked;
            }
        }
        Ok(grid)
    }

    /// Build a grid from a wind matrix: `Some(knots)` is a walkable cell with
    /// that wind component, `None` is a blocked cell.
    pub fn from_wind_matrix(rows: &[Vec<Option<f64>>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid);
        }
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(Error::GridDimensionMismatch {
                width,
                height,
                actual_width: row.len(),
                actual_height: height,
            });
        }

        let cells = rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|value| match value {
                Some(wind_kt) => Cell {
                    walkable: true,
                    wind_kt: *wind_kt,
                },
                None => Cell {
                    walkable: false,
                    wind_kt: 0.0,
                },
            })
            .collect();

        Ok(Self {
            width,
            height,
            cells,
            cell_size: CellSize::default(),
        })
    }

    /// Attach a physical cell size.
    pub fn with_cell_size(mut self, cell_size: CellSize) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True iff `(x, y)` lies within `[0, width) x [0, height)`.
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Walkable flag of the cell; cells outside the grid are never walkable.
    pub fn is_walkable_at(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y)
            .map(|idx| self.cells[idx].walkable)
            .unwrap_or(false)
    }

    /// Mark a single cell walkable or blocked.
    pub fn set_walkable_at(&mut self, x: i32, y: i32, walkable: bool) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        self.cells[idx].walkable = walkable;
        Ok(())
    }

    /// Set the wind component of a single cell.
    pub fn set_wind_at(&mut self, x: i32, y: i32, wind_kt: f64) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        self.cells[idx].wind_kt = wind_kt;
        Ok(())
    }

    /// Wind component at `point`, zero outside the grid.
    pub fn wind_at(&self, point: Point) -> f64 {
        self.index_of(point.x, point.y)
            .map(|idx| self.cells[idx].wind_kt)
            .unwrap_or(0.0)
    }

    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.index_of(point.x, point.y).map(|idx| &self.cells[idx])
    }

    /// Walkable neighbours of `point`, in the order N, E, S, W, NW, NE, SE, SW.
    pub fn neighbors(&self, point: Point, diagonal: DiagonalMovement) -> Vec<Point> {
        let Point { x, y } = point;
        let mut out = Vec::with_capacity(8);

        let orthogonal = [
            Point::new(x, y - 1),
            Point::new(x + 1, y),
            Point::new(x, y + 1),
            Point::new(x - 1, y),
        ];
        let mut open = [false; 4];
        for (slot, candidate) in orthogonal.iter().enumerate() {
            if self.is_walkable_at(candidate.x, candidate.y) {
                open[slot] = true;
                out.push(*candidate);
            }
        }

        if diagonal == DiagonalMovement::Never {
            return out;
        }

        let [north, east, south, west] = open;
        let diagonals = [
            (Point::new(x - 1, y - 1), west, north),
            (Point::new(x + 1, y - 1), north, east),
            (Point::new(x + 1, y + 1), east, south),
            (Point::new(x - 1, y + 1), south, west),
        ];
        for (candidate, first, second) in diagonals {
            if diagonal.permits(first, second) && self.is_walkable_at(candidate.x, candidate.y) {
                out.push(candidate);
            }
        }

        out
    }

    /// Row-major index of an in-bounds point.
    pub(crate) fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        self.is_inside(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    pub(crate) fn checked_index(&self, x: i32, y: i32) -> Result<usize> {
        self.index_of(x, y).ok_or(Error::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub(crate) fn point_at(&self, idx: usize) -> Point {
        Point::new((idx % self.width) as i32, (idx / self.width) as i32)
    }
}
