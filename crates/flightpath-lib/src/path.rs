use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use crate::error::Result;
use crate::grid::{DiagonalMovement, Grid, Point};
use crate::heuristic::Heuristic;

/// Edge-cost and lookahead strategy injected into [`AStarFinder`].
///
/// A non-finite edge cost marks the transition as impassable.
pub trait CostModel {
    /// Cost of stepping from `from` onto the adjacent cell `to`.
    fn edge_cost(&self, grid: &Grid, from: Point, to: Point) -> f64;

    /// Estimated remaining cost from `node` to `goal`.
    fn heuristic(&self, grid: &Grid, node: Point, goal: Point) -> f64;
}

/// Plain grid distance: 1 per orthogonal step, `sqrt(2)` per diagonal step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDistance {
    pub heuristic: Heuristic,
    pub weight: f64,
}

impl Default for GridDistance {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            weight: 1.0,
        }
    }
}

impl GridDistance {
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            weight: 1.0,
        }
    }
}

impl CostModel for GridDistance {
    fn edge_cost(&self, _grid: &Grid, from: Point, to: Point) -> f64 {
        if from.x == to.x || from.y == to.y {
            1.0
        } else {
            SQRT_2
        }
    }

    fn heuristic(&self, _grid: &Grid, node: Point, goal: Point) -> f64 {
        let dx = f64::from((node.x - goal.x).abs());
        let dy = f64::from((node.y - goal.y).abs());
        self.weight * self.heuristic.estimate(dx, dy)
    }
}

/// Result of a single search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Cells from start to goal inclusive; empty when no path exists.
    pub path: Vec<Point>,
    /// Accumulated edge cost of `path`, infinite when no path exists.
    pub cost: f64,
    /// Number of cells closed during the search.
    pub nodes_expanded: usize,
}

impl SearchOutcome {
    fn not_found(nodes_expanded: usize) -> Self {
        Self {
            path: Vec::new(),
            cost: f64::INFINITY,
            nodes_expanded,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

/// A* search over a [`Grid`] with an injected [`CostModel`].
#[derive(Debug, Clone)]
pub struct AStarFinder<C> {
    diagonal: DiagonalMovement,
    cost_model: C,
}

impl<C: CostModel> AStarFinder<C> {
    pub fn new(diagonal: DiagonalMovement, cost_model: C) -> Self {
        Self {
            diagonal,
            cost_model,
        }
    }

    pub fn diagonal(&self) -> DiagonalMovement {
        self.diagonal
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }

    /// Find the cheapest path from `start` to `goal`.
    ///
    /// An exhausted frontier is a normal outcome and yields an empty path.
    /// Only endpoints outside the grid are errors.
    pub fn find_path(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchOutcome> {
        let start_idx = grid.checked_index(start.x, start.y)?;
        let goal_idx = grid.checked_index(goal.x, goal.y)?;

        if start_idx == goal_idx {
            return Ok(SearchOutcome {
                path: vec![start],
                cost: 0.0,
                nodes_expanded: 0,
            });
        }

        let mut scratch = SearchScratch::new(grid.len());
        let mut open = BinaryHeap::new();
        let mut sequence = 0u64;
        let mut nodes_expanded = 0usize;

        let start_h = self.cost_model.heuristic(grid, start, goal);
        let origin = &mut scratch.nodes[start_idx];
        origin.g = 0.0;
        origin.h = Some(start_h);
        origin.opened = true;
        open.push(AStarEntry::new(start_idx, 0.0, start_h, sequence));

        while let Some(entry) = open.pop() {
            let state = scratch.nodes[entry.index];
            // Lazy decrease-key: skip finalised cells and superseded entries.
            if state.closed || entry.cost.0.to_bits() != state.g.to_bits() {
                continue;
            }

            if entry.index == goal_idx {
                return Ok(SearchOutcome {
                    path: scratch.reconstruct(grid, goal_idx),
                    cost: state.g,
                    nodes_expanded,
                });
            }

            scratch.nodes[entry.index].closed = true;
            nodes_expanded += 1;

            let current = grid.point_at(entry.index);
            for neighbour in grid.neighbors(current, self.diagonal) {
                let Some(idx) = grid.index_of(neighbour.x, neighbour.y) else {
                    continue;
                };
                if scratch.nodes[idx].closed {
                    continue;
                }

                let step = self.cost_model.edge_cost(grid, current, neighbour);
                if !step.is_finite() {
                    continue;
                }

                let tentative_g = state.g + step;
                let next = &mut scratch.nodes[idx];
                if !next.opened || tentative_g < next.g {
                    let h = match next.h {
                        Some(h) => h,
                        None => {
                            let h = self.cost_model.heuristic(grid, neighbour, goal);
                            next.h = Some(h);
                            h
                        }
                    };
                    next.g = tentative_g;
                    next.parent = Some(entry.index);
                    next.opened = true;

                    sequence += 1;
                    open.push(AStarEntry::new(idx, tentative_g, h, sequence));
                }
            }
        }

        tracing::trace!(
            "frontier exhausted between {} and {} after {} expansions",
            start,
            goal,
            nodes_expanded
        );
        Ok(SearchOutcome::not_found(nodes_expanded))
    }
}

/// Per-cell search bookkeeping.
#[derive(Debug, Clone, Copy)]
struct NodeState {
    g: f64,
    h: Option<f64>,
    parent: Option<usize>,
    opened: bool,
    closed: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            g: f64::INFINITY,
            h: None,
            parent: None,
            opened: false,
            closed: false,
        }
    }
}

/// Scratch arena owned by a single search, indexed like the grid's cells.
struct SearchScratch {
    nodes: Vec<NodeState>,
}

impl SearchScratch {
    fn new(len: usize) -> Self {
        Self {
            nodes: vec![NodeState::default(); len],
        }
    }

    fn reconstruct(&self, grid: &Grid, goal: usize) -> Vec<Point> {
        let mut path = Vec::new();
        let mut current = Some(goal);
        while let Some(idx) = current {
            path.push(grid.point_at(idx));
            current = self.nodes[idx].parent;
        }
        path.reverse();
        path
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    index: usize,
    cost: FloatOrd,
    estimate: FloatOrd,
    sequence: u64,
}

impl AStarEntry {
    fn new(index: usize, cost: f64, heuristic: f64, sequence: u64) -> Self {
        Self {
            index,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
            sequence,
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap pops the lowest estimate, oldest first.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder(diagonal: DiagonalMovement, heuristic: Heuristic) -> AStarFinder<GridDistance> {
        AStarFinder::new(diagonal, GridDistance::new(heuristic))
    }

    #[test]
    fn start_equal_to_goal_is_single_cell_path() {
        let grid = Grid::new(3, 3);
        let outcome = finder(DiagonalMovement::Never, Heuristic::Manhattan)
            .find_path(&grid, Point::new(1, 1), Point::new(1, 1))
            .unwrap();
        assert_eq!(outcome.path, vec![Point::new(1, 1)]);
        assert_eq!(outcome.cost, 0.0);
    }

    #[test]
    fn out_of_bounds_endpoint_is_an_error() {
        let grid = Grid::new(3, 3);
        let result = finder(DiagonalMovement::Never, Heuristic::Manhattan).find_path(
            &grid,
            Point::new(0, 0),
            Point::new(3, 0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn diagonal_search_cuts_corners_when_allowed() {
        let grid = Grid::new(5, 5);
        let outcome = finder(DiagonalMovement::Always, Heuristic::Octile)
            .find_path(&grid, Point::new(0, 0), Point::new(4, 4))
            .unwrap();
        assert_eq!(outcome.path.len(), 5);
        assert!((outcome.cost - 4.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn detour_around_partial_wall_is_optimal() {
        // Wall at x=2 for y in 0..=3, open at y=4.
        let mut grid = Grid::new(5, 5);
        for y in 0..4 {
            grid.set_walkable_at(2, y, false).unwrap();
        }
        let outcome = finder(DiagonalMovement::Never, Heuristic::Manhattan)
            .find_path(&grid, Point::new(0, 0), Point::new(4, 0))
            .unwrap();
        assert!(outcome.is_found());
        assert_eq!(outcome.cost, 12.0);
        assert_eq!(outcome.path.len(), 13);
        assert!(outcome.path.contains(&Point::new(2, 4)));
    }

    #[test]
    fn impassable_edges_are_skipped() {
        struct NoEastward;
        impl CostModel for NoEastward {
            fn edge_cost(&self, _grid: &Grid, from: Point, to: Point) -> f64 {
                if to.x > from.x {
                    f64::INFINITY
                } else {
                    1.0
                }
            }
            fn heuristic(&self, _grid: &Grid, _node: Point, _goal: Point) -> f64 {
                0.0
            }
        }

        let grid = Grid::new(3, 1);
        let outcome = AStarFinder::new(DiagonalMovement::Never, NoEastward)
            .find_path(&grid, Point::new(0, 0), Point::new(2, 0))
            .unwrap();
        assert!(!outcome.is_found());
        assert!(outcome.cost.is_infinite());
    }
}
