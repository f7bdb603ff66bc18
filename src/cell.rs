use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use tissue_common::{SimParams, Vec2};

/// Inputs to the division probability of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivisionParams {
    /// Probability per step when the population is far below target.
    pub max_probability: f64,
    /// Population size at which division stops.
    pub target_population: f64,
}

impl DivisionParams {
    /// Division probability for the current population size `n`: grows as `n`
    /// falls short of the target and never exceeds `max_probability`.
    pub fn probability(&self, n: usize) -> f64 {
        let shortfall = 1.0 - n as f64 / self.target_population;
        self.max_probability * shortfall.clamp(0.0, 1.0)
    }
}

/// One simulated cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Vec2,
    pub base_radius: f64,
    effective_radius: f64,
    /// Accumulator for the current force pass.
    pub spring_force: Vec2,
    pub compression_stiffness: f64,
    pub extension_stiffness: f64,
    pub hormone_a: f64,
    pub hormone_b: f64,
    pub delta_hormone_a: f64,
    pub delta_hormone_b: f64,
    is_producer_a: bool,
    is_producer_b: bool,
    pub division: DivisionParams,
}

impl Cell {
    /// A fresh cell with no hormone and the configured mechanics.
    pub fn new(position: Vec2, params: &SimParams) -> Self {
        Self {
            position,
            base_radius: params.base_radius,
            effective_radius: params.base_radius,
            spring_force: Vec2::zero(),
            compression_stiffness: params.compression_stiffness,
            extension_stiffness: params.extension_stiffness,
            hormone_a: 0.0,
            hormone_b: 0.0,
            delta_hormone_a: 0.0,
            delta_hormone_b: 0.0,
            is_producer_a: false,
            is_producer_b: false,
            division: DivisionParams {
                max_probability: params.max_division_probability,
                target_population: params.target_population,
            },
        }
    }

    pub fn effective_radius(&self) -> f64 {
        self.effective_radius
    }

    /// Recomputes the hormone-driven radius from the current hormone A level.
    pub fn update_radius(&mut self, efficacy: f64) {
        self.effective_radius = self.base_radius + efficacy * self.hormone_a;
    }

    pub fn is_producer_a(&self) -> bool {
        self.is_producer_a
    }

    pub fn is_producer_b(&self) -> bool {
        self.is_producer_b
    }

    /// Producer flags are sticky: there is no way to clear them.
    pub fn mark_producer_a(&mut self) {
        self.is_producer_a = true;
    }

    pub fn mark_producer_b(&mut self) {
        self.is_producer_b = true;
    }

    /// Splits this cell's hormones with a new daughter, which otherwise copies
    /// the mother's state. Producer status stays with the mother.
    pub fn split_daughter(&mut self) -> Cell {
        self.hormone_a *= 0.5;
        self.hormone_b *= 0.5;
        let mut daughter = self.clone();
        daughter.is_producer_a = false;
        daughter.is_producer_b = false;
        daughter.spring_force = Vec2::zero();
        daughter.delta_hormone_a = 0.0;
        daughter.delta_hormone_b = 0.0;
        daughter
    }
}

/// Ordered, append-only collection of cells with a fixed upper capacity.
#[derive(Debug, Clone)]
pub struct Population {
    cells: Vec<Cell>,
    capacity: usize,
}

impl Population {
    /// Creates an empty population, reserving room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a population from existing cells.
    pub fn from_cells(cells: Vec<Cell>, capacity: usize) -> Result<Self> {
        let mut population = Self::with_capacity(capacity);
        for cell in cells {
            population.push(cell)?;
        }
        Ok(population)
    }

    /// Appends a cell, failing instead of growing past the capacity.
    pub fn push(&mut self, cell: Cell) -> Result<usize> {
        if self.cells.len() >= self.capacity {
            return Err(SimError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.cells.push(cell);
        Ok(self.cells.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.cells.iter().map(|c| c.position).collect()
    }

    pub fn total_hormone_a(&self) -> f64 {
        self.cells.iter().map(|c| c.hormone_a).sum()
    }

    pub fn total_hormone_b(&self) -> f64 {
        self.cells.iter().map(|c| c.hormone_b).sum()
    }

    /// Index of the cell closest to `point`; ties go to the lowest index.
    pub fn nearest_to(&self, point: Vec2) -> Option<usize> {
        self.cells
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (idx, cell)| {
                let d = cell.position.distance_squared(point);
                match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((idx, d)),
                }
            })
            .map(|(idx, _)| idx)
    }
}
