use crate::cell::{Cell, Population};
use crate::contour::FourierModel;
use crate::error::{Result, SimError};
use crate::forces::{apply_forces, compute_forces, integrate};
use crate::hormones::{select_sources, transport_step};
use crate::mitosis;
use crate::neighbor_graph::NeighborGraph;
use crate::triangulation::{triangulate_positions, DelaunayTriangulator, Triangulator};
use log::{debug, info, trace, warn};
use rand::prelude::*;
use tissue_common::{SimParams, SimulationConfig, Snapshot, Vec2};

/// Everything that changes from one step to the next. A step works on a clone
/// and only replaces the live state once every stage has succeeded.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub population: Population,
    pub rng: StdRng,
    /// Simulated time at the end of the last completed step.
    pub time: f64,
    pub step: u64,
    /// Set once hormone sources have been chosen; never reset.
    pub sources_selected: bool,
}

/// What happened during one step, for logging and diagnosis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub step: u64,
    pub time: f64,
    pub cell_count: usize,
    pub triangles: usize,
    pub edges: usize,
    /// Coincident pairs skipped by the force and diffusion passes.
    pub degenerate_pairs: usize,
    pub skipped_close_pairs: usize,
    pub clamped_concentrations: usize,
    pub divisions: usize,
    /// Cells chosen as hormone sources during this step, if any.
    pub sources_selected: Vec<usize>,
}

/// Owns the population and drives the per-step pipeline:
/// triangulate, build neighbours, springs, hormones, mitosis.
pub struct TissueSimulation<T: Triangulator = DelaunayTriangulator> {
    config: SimulationConfig,
    params: SimParams,
    state: SimulationState,
    triangulator: T,
    /// Stores collected renderer frames at record intervals.
    recorded_snapshots: Vec<Snapshot>,
}

impl TissueSimulation<DelaunayTriangulator> {
    /// Validates the configuration and scatters the initial cells.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_triangulator(config, DelaunayTriangulator)
    }
}

impl<T: Triangulator> TissueSimulation<T> {
    pub fn with_triangulator(config: SimulationConfig, triangulator: T) -> Result<Self> {
        config.validate()?;
        let params = config.get_sim_params();
        let mut rng = StdRng::seed_from_u64(config.population.seed);

        let cells = place_initial_cells(&config, &params, &mut rng)
            .into_iter()
            .map(|pos| Cell::new(pos, &params))
            .collect();
        let population = Population::from_cells(cells, params.capacity)?;
        Ok(Self::assemble(config, params, population, rng, triangulator))
    }

    /// Starts from an explicit set of cells instead of random placement.
    /// `population.initial_cells` is taken from `cells`, not from the config.
    pub fn from_cells(
        mut config: SimulationConfig,
        cells: Vec<Cell>,
        triangulator: T,
    ) -> Result<Self> {
        config.population.initial_cells = cells.len();
        config.validate()?;
        let params = config.get_sim_params();
        let rng = StdRng::seed_from_u64(config.population.seed);
        let population = Population::from_cells(cells, params.capacity)?;
        Ok(Self::assemble(config, params, population, rng, triangulator))
    }

    fn assemble(
        config: SimulationConfig,
        params: SimParams,
        population: Population,
        rng: StdRng,
        triangulator: T,
    ) -> Self {
        info!(
            "Simulation initialised with {} cells (capacity {}).",
            population.len(),
            population.capacity()
        );
        Self {
            config,
            params,
            state: SimulationState {
                population,
                rng,
                time: 0.0,
                step: 0,
                sources_selected: false,
            },
            triangulator,
            recorded_snapshots: Vec::new(),
        }
    }

    /// Advances the simulation by one timestep. On error the previous state is
    /// kept untouched.
    pub fn step(&mut self) -> Result<StepReport> {
        let mut next = self.state.clone();
        let report = run_step(&mut next, &self.params, &self.config, &self.triangulator)?;
        self.state = next;

        if report.degenerate_pairs > 0 {
            warn!(
                "Step {}: skipped {} coincident cell pairs",
                report.step, report.degenerate_pairs
            );
        }
        if report.clamped_concentrations > 0 {
            warn!(
                "Step {}: clamped {} negative hormone concentrations",
                report.step, report.clamped_concentrations
            );
        }
        trace!("{:?}", report);
        Ok(report)
    }

    /// Neighbour graph for the current positions. Read-only; the step builds
    /// its own.
    pub fn neighbor_graph(&self) -> Result<NeighborGraph> {
        let population = &self.state.population;
        let triples = triangulate_positions(&self.triangulator, &population.positions())?;
        NeighborGraph::build(&triples, population.len(), self.params.max_neighbors)
    }

    /// Fourier model of the current outline and its reconstructed polyline.
    pub fn contour(&self) -> (FourierModel, Vec<Vec2>) {
        let model = FourierModel::forward(
            &self.state.population.positions(),
            self.params.fourier_coefficients,
        );
        let outline = model.reconstruct(self.params.contour_samples);
        (model, outline)
    }

    /// Builds a renderer frame from the current state.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let cells = self.state.population.cells();
        let (contour, fourier_amplitudes) = if self.params.contour_enabled {
            let (model, outline) = self.contour();
            (Some(outline), Some(model.amplitudes()))
        } else {
            (None, None)
        };
        Ok(Snapshot {
            time: self.state.time,
            step: self.state.step,
            positions: cells.iter().map(|c| c.position).collect(),
            radii: cells.iter().map(Cell::effective_radius).collect(),
            hormone_a: cells.iter().map(|c| c.hormone_a).collect(),
            hormone_b: cells.iter().map(|c| c.hormone_b).collect(),
            neighbor_counts_distribution: self.neighbor_graph()?.degree_histogram(),
            contour,
            fourier_amplitudes,
        })
    }

    /// Records a snapshot and keeps it in memory.
    pub fn record_snapshot(&mut self) -> Result<()> {
        let snapshot = self.snapshot()?;
        debug!(
            "Recorded snapshot at t = {:.4} with {} cells",
            snapshot.time,
            snapshot.cell_count()
        );
        self.recorded_snapshots.push(snapshot);
        Ok(())
    }

    pub fn get_recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }

    pub fn population(&self) -> &Population {
        &self.state.population
    }

    pub fn current_cell_count(&self) -> usize {
        self.state.population.len()
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }

    pub fn current_step(&self) -> u64 {
        self.state.step
    }

    pub fn sources_selected(&self) -> bool {
        self.state.sources_selected
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// The ordered stages of one step, applied to `state`.
fn run_step<T: Triangulator>(
    state: &mut SimulationState,
    params: &SimParams,
    config: &SimulationConfig,
    triangulator: &T,
) -> Result<StepReport> {
    state.step += 1;
    state.time += params.dt;
    let mut report = StepReport {
        step: state.step,
        time: state.time,
        ..StepReport::default()
    };

    // --- 1. Triangulate current positions ---
    let n = state.population.len();
    let triples = triangulate_positions(triangulator, &state.population.positions())?;
    report.triangles = triples.len();

    // --- 2. Neighbour graph ---
    let graph = NeighborGraph::build(&triples, n, params.max_neighbors)?;
    report.edges = graph.edge_count();

    // --- 3. Springs, then integrate ---
    let forces = compute_forces(state.population.cells(), &graph, params.equilibrium_radius)?;
    if let Some(&(a, b)) = forces.degenerate_pairs.first() {
        debug!("{}", SimError::DegenerateGeometry { a, b });
    }
    report.degenerate_pairs += forces.degenerate_pairs.len();
    let cells = state.population.cells_mut();
    apply_forces(cells, &forces);
    integrate(cells, params.dt, params.drag_prefactor);

    // --- 4. Hormones, on the graph from stage 2 ---
    if !state.sources_selected && state.time > params.source_start_time {
        let origins: Vec<Vec2> = config
            .hormones
            .source_origins
            .iter()
            .map(|o| Vec2::new(o[0], o[1]))
            .collect();
        report.sources_selected =
            select_sources(&mut state.population, &origins, params.hormone_model);
        state.sources_selected = true;
        info!(
            "Hormone sources selected at t = {:.4}: {:?}",
            state.time, report.sources_selected
        );
    }
    let transport = transport_step(&mut state.population, &graph, params)?;
    if let Some(&(a, b)) = transport.degenerate_pairs.first() {
        debug!("{}", SimError::DegenerateGeometry { a, b });
    }
    report.degenerate_pairs += transport.degenerate_pairs.len();
    report.skipped_close_pairs = transport.skipped_close_pairs;
    report.clamped_concentrations = transport.clamped;

    // --- 5. Mitosis ---
    let divisions = mitosis::step(
        &mut state.population,
        &mut state.rng,
        params.division_offset_fraction,
    )?;
    report.divisions = divisions.divisions.len();
    report.cell_count = state.population.len();

    Ok(report)
}

/// Jittered-grid placement of the initial cells inside the square
/// `[-spread, spread]^2`: one cell per randomly chosen grid bin.
fn place_initial_cells(
    config: &SimulationConfig,
    params: &SimParams,
    rng: &mut StdRng,
) -> Vec<Vec2> {
    let count = config.population.initial_cells;
    let spread = config.population.initial_spread;
    let cols = (count as f64).sqrt().ceil().max(1.0) as usize;
    let rows = count.div_ceil(cols).max(1);

    let mut bins: Vec<(usize, usize)> = (0..cols)
        .flat_map(|ix| (0..rows).map(move |iy| (ix, iy)))
        .collect();
    bins.shuffle(rng);
    bins.truncate(count);

    let cell_w = 2.0 * spread / cols as f64;
    let cell_h = 2.0 * spread / rows as f64;
    let positions: Vec<Vec2> = bins
        .into_iter()
        .map(|(ix, iy)| {
            let x0 = -spread + ix as f64 * cell_w;
            let y0 = -spread + iy as f64 * cell_h;
            Vec2::new(
                x0 + cell_w * rng.random::<f64>(),
                y0 + cell_h * rng.random::<f64>(),
            )
        })
        .collect();
    debug!(
        "Placed {} cells on a {}x{} grid (radius {})",
        positions.len(),
        cols,
        rows,
        params.base_radius
    );
    positions
}
