//! Toroidal single-occupancy grid with configurable neighborhoods.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ConfigError;

/// Supported neighborhood shapes: von Neumann radius 1 (4 cells), Moore
/// radius 1 (8 cells), Moore radius 2 (24 cells). No other sizes exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Neighborhood {
    Four,
    Eight,
    TwentyFour,
}

impl Neighborhood {
    /// Build from the raw configured size {4, 8, 24}.
    pub fn from_size(size: usize) -> Result<Self, ConfigError> {
        match size {
            4 => Ok(Neighborhood::Four),
            8 => Ok(Neighborhood::Eight),
            24 => Ok(Neighborhood::TwentyFour),
            _ => Err(ConfigError::UnsupportedNeighborhoodSize { size }),
        }
    }

    pub fn size(self) -> usize {
        match self {
            Neighborhood::Four => 4,
            Neighborhood::Eight => 8,
            Neighborhood::TwentyFour => 24,
        }
    }

    pub fn radius(self) -> usize {
        match self {
            Neighborhood::Four | Neighborhood::Eight => 1,
            Neighborhood::TwentyFour => 2,
        }
    }

    /// Relative cell offsets in row-major order (the iteration order used
    /// for neighbor queries, and therefore the adaptation tie-breaker).
    pub fn offsets(self) -> Vec<(isize, isize)> {
        let radius = self.radius() as isize;
        let mut offsets = Vec::with_capacity(self.size());
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                // von Neumann excludes diagonals
                if self == Neighborhood::Four && dx != 0 && dy != 0 {
                    continue;
                }
                offsets.push((dx, dy));
            }
        }
        offsets
    }
}

/// A square wrap-around grid of side `side`, fully populated with exactly
/// one agent per cell. Agents are identified by their index `0..side*side`.
#[derive(Debug, Clone)]
pub struct TorusGrid {
    side: usize,
    cells: Vec<usize>,
    positions: Vec<(usize, usize)>,
}

impl TorusGrid {
    /// Fail when a neighborhood's diameter exceeds the grid side (the
    /// wrap-around would revisit cells, so the neighbor set would be short).
    pub fn check_fits(side: usize, hood: Neighborhood) -> Result<(), ConfigError> {
        let min_grid = 2 * hood.radius() + 1;
        if side < min_grid {
            return Err(ConfigError::NeighborhoodTooLarge {
                size: hood.size(),
                grid_size: side,
                min_grid,
            });
        }
        Ok(())
    }

    /// Create a fully populated grid, assigning each agent to a distinct
    /// randomly chosen cell.
    pub fn populate(side: usize, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        if side == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let mut cells: Vec<usize> = (0..side * side).collect();
        cells.shuffle(rng);
        let mut positions = vec![(0, 0); side * side];
        for (cell, &agent) in cells.iter().enumerate() {
            positions[agent] = (cell % side, cell / side);
        }
        Ok(TorusGrid {
            side,
            cells,
            positions,
        })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of occupied cells (always `side * side`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn position_of(&self, agent: usize) -> (usize, usize) {
        self.positions[agent]
    }

    pub fn agent_at(&self, x: usize, y: usize) -> usize {
        self.cells[y * self.side + x]
    }

    /// Agent indices in the given neighborhood of `agent`, wrapping around
    /// the torus edges, in deterministic row-major offset order.
    pub fn neighbors_of(&self, agent: usize, hood: Neighborhood) -> Vec<usize> {
        let (x, y) = self.positions[agent];
        hood.offsets()
            .into_iter()
            .map(|(dx, dy)| {
                let nx = wrap(x, dx, self.side);
                let ny = wrap(y, dy, self.side);
                self.agent_at(nx, ny)
            })
            .collect()
    }
}

fn wrap(coord: usize, delta: isize, side: usize) -> usize {
    (coord as isize + delta).rem_euclid(side as isize) as usize
}
