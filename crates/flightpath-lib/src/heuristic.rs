//! Distance estimators for grid search.
//!
//! Each function takes non-negative axis offsets `dx` and `dy`, optionally
//! pre-scaled by the per-axis cell size. Pair [`manhattan`] with orthogonal
//! movement and [`octile`] or [`diagonal`] with diagonal movement to keep the
//! estimate admissible.

use std::f64::consts::SQRT_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub fn manhattan(dx: f64, dy: f64) -> f64 {
    dx + dy
}

pub fn euclidean(dx: f64, dy: f64) -> f64 {
    dx.hypot(dy)
}

pub fn octile(dx: f64, dy: f64) -> f64 {
    let f = SQRT_2 - 1.0;
    if dx < dy {
        f * dx + dy
    } else {
        f * dy + dx
    }
}

/// Diagonal distance with unit orthogonal and `sqrt(2)` diagonal step costs.
pub fn diagonal(dx: f64, dy: f64) -> f64 {
    (dx + dy) + (SQRT_2 - 2.0) * dx.min(dy)
}

pub fn chebyshev(dx: f64, dy: f64) -> f64 {
    dx.max(dy)
}

/// Named heuristic selectable per search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    Manhattan,
    Euclidean,
    #[default]
    Octile,
    Diagonal,
    Chebyshev,
}

impl Heuristic {
    pub fn estimate(self, dx: f64, dy: f64) -> f64 {
        let (dx, dy) = (dx.abs(), dy.abs());
        match self {
            Heuristic::Manhattan => manhattan(dx, dy),
            Heuristic::Euclidean => euclidean(dx, dy),
            Heuristic::Octile => octile(dx, dy),
            Heuristic::Diagonal => diagonal(dx, dy),
            Heuristic::Chebyshev => chebyshev(dx, dy),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::Octile => "octile",
            Heuristic::Diagonal => "diagonal",
            Heuristic::Chebyshev => "chebyshev",
        };
        f.write_str(value)
    }
}

impl FromStr for Heuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "octile" => Ok(Heuristic::Octile),
            "diagonal" => Ok(Heuristic::Diagonal),
            "chebyshev" => Ok(Heuristic::Chebyshev),
            _ => Err(Error::UnknownHeuristic {
                value: s.to_string(),
            }),
        }
    }
}
