//! Error types for the tissue engine.

use thiserror::Error;
use tissue_common::ConfigError;

pub type Result<T> = std::result::Result<T, SimError>;

/// Distances below this are treated as coincident points.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Mitosis tried to append past the population capacity.
    #[error("population capacity of {capacity} cells exceeded")]
    CapacityExceeded { capacity: usize },

    /// A neighbour row would hold more distinct entries than it has slots.
    #[error("cell {cell} has more than {capacity} distinct neighbours")]
    NeighborOverflow { cell: usize, capacity: usize },

    /// Two cells closer than `GEOMETRY_EPSILON`. Per-pair and recoverable: the
    /// stages skip the pair and count it instead of returning this.
    #[error("cells {a} and {b} are coincident")]
    DegenerateGeometry { a: usize, b: usize },

    #[error("triangulation output rejected: {0}")]
    TriangulationMismatch(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

impl SimError {
    /// Capacity-class errors can be avoided by sizing the population or
    /// neighbour rows up front.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            SimError::CapacityExceeded { .. } | SimError::NeighborOverflow { .. }
        )
    }
}
