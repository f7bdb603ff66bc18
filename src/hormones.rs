//! Hormone transport over the neighbour graph plus local kinetics.
//!
//! Diffusion is synchronous: every pair reads start-of-step concentrations and
//! writes only into the delta accumulators, which [`global_update`] folds in
//! afterwards.

use crate::cell::{Cell, Population};
use crate::error::{Result, SimError, GEOMETRY_EPSILON};
use crate::neighbor_graph::NeighborGraph;
use log::debug;
use tissue_common::{HormoneModel, SimParams, Vec2};

/// Pairs closer than this fraction of the cell radius do not exchange hormone.
pub const MIN_DIFFUSION_DISTANCE_FACTOR: f64 = 0.2;

/// Bookkeeping from one transport pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportReport {
    /// Pairs skipped because they overlap more than the diffusion threshold allows.
    pub skipped_close_pairs: usize,
    /// Subset of the skipped pairs that are coincident.
    pub degenerate_pairs: Vec<(usize, usize)>,
    /// Concentrations that went negative and were clamped to zero.
    pub clamped: usize,
}

impl TransportReport {
    fn merge_clamped(&mut self, clamped: usize) {
        self.clamped += clamped;
    }
}

/// Accumulates diffusive flux for every row entry `(i, j)` into the delta
/// fields of both cells. Concentrations are not modified.
pub fn accumulate_diffusion(
    cells: &mut [Cell],
    graph: &NeighborGraph,
    dt: f64,
    diffusion_a: f64,
    diffusion_b: f64,
) -> Result<TransportReport> {
    if graph.len() != cells.len() {
        return Err(SimError::TriangulationMismatch(format!(
            "neighbour graph covers {} cells but the population has {}",
            graph.len(),
            cells.len()
        )));
    }

    let mut report = TransportReport::default();
    for i in 0..cells.len() {
        let (pos_i, radius_i) = (cells[i].position, cells[i].effective_radius());
        let (a_i, b_i) = (cells[i].hormone_a, cells[i].hormone_b);
        let conductance = dt * radius_i;

        for j in graph.neighbors(i) {
            let distance = pos_i.distance(cells[j].position);
            if distance < MIN_DIFFUSION_DISTANCE_FACTOR * radius_i {
                report.skipped_close_pairs += 1;
                if distance < GEOMETRY_EPSILON {
                    report.degenerate_pairs.push((i, j));
                }
                continue;
            }
            let flux_a = (a_i - cells[j].hormone_a) / distance * conductance * diffusion_a;
            let flux_b = (b_i - cells[j].hormone_b) / distance * conductance * diffusion_b;

            cells[i].delta_hormone_a -= flux_a;
            cells[j].delta_hormone_a += flux_a;
            cells[i].delta_hormone_b -= flux_b;
            cells[j].delta_hormone_b += flux_b;
        }
    }
    Ok(report)
}

/// Applies and resets the delta accumulators. Returns how many
/// concentrations had to be clamped at zero.
pub fn global_update(cells: &mut [Cell]) -> usize {
    let mut clamped = 0;
    for cell in cells.iter_mut() {
        cell.hormone_a += cell.delta_hormone_a;
        cell.hormone_b += cell.delta_hormone_b;
        cell.delta_hormone_a = 0.0;
        cell.delta_hormone_b = 0.0;
        clamped += clamp_non_negative(cell);
    }
    clamped
}

/// Production, degradation and reaction for one timestep, on start-of-step values.
pub fn apply_kinetics(cells: &mut [Cell], params: &SimParams) -> usize {
    let dt = params.dt;
    let mut clamped = 0;
    for cell in cells.iter_mut() {
        let (a, b) = (cell.hormone_a, cell.hormone_b);
        match params.hormone_model {
            HormoneModel::BirthDeath => {
                let production = if cell.is_producer_a() { params.production_rate } else { 0.0 };
                cell.hormone_a = a + (production - params.degradation_rate * a) * dt;
            }
            HormoneModel::ReactionDiffusion => {
                let reaction = params.reaction_rate * a * b * dt;
                let source = if cell.is_producer_b() { params.source_rate } else { 0.0 };
                let net_kill = params.kill_rate - params.feed_rate;
                cell.hormone_a = a + params.feed_rate * dt - reaction;
                cell.hormone_b = b + source * dt - reaction - net_kill * b * dt;
            }
        }
        clamped += clamp_non_negative(cell);
    }
    clamped
}

fn clamp_non_negative(cell: &mut Cell) -> usize {
    let mut clamped = 0;
    if cell.hormone_a < 0.0 {
        cell.hormone_a = 0.0;
        clamped += 1;
    }
    if cell.hormone_b < 0.0 {
        cell.hormone_b = 0.0;
        clamped += 1;
    }
    clamped
}

/// Marks the nearest cell to each origin as a producer: of hormone A under the
/// birth/death model, of hormone B under reaction-diffusion. Returns the chosen
/// indices in origin order.
pub fn select_sources(
    population: &mut Population,
    origins: &[Vec2],
    model: HormoneModel,
) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(origins.len());
    for &origin in origins {
        if let Some(idx) = population.nearest_to(origin) {
            let cell = &mut population.cells_mut()[idx];
            match model {
                HormoneModel::BirthDeath => cell.mark_producer_a(),
                HormoneModel::ReactionDiffusion => cell.mark_producer_b(),
            }
            chosen.push(idx);
        }
    }
    debug!("Hormone sources selected: {:?}", chosen);
    chosen
}

/// Full transport pass: diffusion, global update, kinetics, radius refresh.
pub fn transport_step(
    population: &mut Population,
    graph: &NeighborGraph,
    params: &SimParams,
) -> Result<TransportReport> {
    let cells = population.cells_mut();
    let mut report =
        accumulate_diffusion(cells, graph, params.dt, params.diffusion_a, params.diffusion_b)?;
    report.merge_clamped(global_update(cells));
    report.merge_clamped(apply_kinetics(cells, params));
    for cell in cells.iter_mut() {
        cell.update_radius(params.hormone_efficacy);
    }
    Ok(report)
}
