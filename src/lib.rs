//! Mesh dynamics and cell physiology for a growing 2D tissue.
//!
//! Each [`simulation::TissueSimulation::step`] triangulates the current cell
//! positions, rebuilds the bounded-degree neighbour graph, applies spring
//! mechanics, moves hormones across the graph, and runs stochastic mitosis.
//! The outline of the tissue can be summarised by [`contour::FourierModel`].

pub mod cell;
pub mod contour;
pub mod error;
pub mod forces;
pub mod hormones;
pub mod mitosis;
pub mod neighbor_graph;
pub mod simulation;
pub mod triangulation;

pub use cell::{Cell, DivisionParams, Population};
pub use contour::FourierModel;
pub use error::{Result, SimError};
pub use neighbor_graph::{NeighborGraph, NO_NEIGHBOR};
pub use simulation::{StepReport, TissueSimulation};
pub use triangulation::{DelaunayTriangulator, Triangulator};
