//! Asymmetric Hookean springs along neighbour-graph edges, and the overdamped
//! integration step that moves cells under those forces.

use crate::cell::Cell;
use crate::error::{Result, SimError, GEOMETRY_EPSILON};
use crate::neighbor_graph::NeighborGraph;
use tissue_common::Vec2;

/// Output of a force pass. Nothing in the population is touched until
/// [`apply_forces`] is called with it.
#[derive(Debug, Clone, Default)]
pub struct ForceReport {
    pub forces: Vec<Vec2>,
    /// `(i, j)` row entries skipped because the two cells coincide.
    pub degenerate_pairs: Vec<(usize, usize)>,
}

/// Spring force on a single cell `i` from neighbour `j`.
///
/// Stretched springs pull by the excess length only, so the force vanishes
/// smoothly at the equilibrium distance. Compressed springs push by the raw
/// separation vector scaled by the compression stiffness.
/// Returns `None` for coincident points.
pub fn pair_force(cell: &Cell, neighbor_pos: Vec2, equilibrium_radius: f64) -> Option<Vec2> {
    let offset = neighbor_pos - cell.position;
    let distance = offset.length();
    if distance < GEOMETRY_EPSILON {
        return None;
    }
    let excess = distance - equilibrium_radius;
    let force = if excess > 0.0 {
        offset * (excess / distance * cell.extension_stiffness)
    } else if excess < 0.0 {
        -(offset * cell.compression_stiffness)
    } else {
        Vec2::zero()
    };
    Some(force)
}

/// Sums the spring forces on every cell from its graph neighbours.
pub fn compute_forces(
    cells: &[Cell],
    graph: &NeighborGraph,
    equilibrium_radius: f64,
) -> Result<ForceReport> {
    if graph.len() != cells.len() {
        return Err(SimError::TriangulationMismatch(format!(
            "neighbour graph covers {} cells but the population has {}",
            graph.len(),
            cells.len()
        )));
    }

    let mut report = ForceReport {
        forces: vec![Vec2::zero(); cells.len()],
        degenerate_pairs: Vec::new(),
    };
    for (i, cell) in cells.iter().enumerate() {
        let mut total = Vec2::zero();
        for j in graph.neighbors(i) {
            match pair_force(cell, cells[j].position, equilibrium_radius) {
                Some(f) => total += f,
                None => report.degenerate_pairs.push((i, j)),
            }
        }
        report.forces[i] = total;
    }
    Ok(report)
}

/// Resets every accumulator and stores the computed forces.
pub fn apply_forces(cells: &mut [Cell], report: &ForceReport) {
    for (cell, force) in cells.iter_mut().zip(&report.forces) {
        cell.spring_force = Vec2::zero();
        cell.spring_force += *force;
    }
}

/// Overdamped (Stokes drag) explicit Euler step:
/// `x += F * dt / (6 pi eta r)`, with `drag_prefactor = 6 pi eta`.
pub fn integrate(cells: &mut [Cell], dt: f64, drag_prefactor: f64) {
    for cell in cells.iter_mut() {
        let drag = drag_prefactor * cell.effective_radius();
        cell.position += cell.spring_force * (dt / drag);
    }
}
