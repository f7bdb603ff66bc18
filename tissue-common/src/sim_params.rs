use crate::config::HormoneModel;
use serde::{Deserialize, Serialize};

/// Simulation parameters derived from the configuration, used frequently during simulation steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Time
    pub dt: f64,

    // Population
    pub capacity: usize,
    pub base_radius: f64,

    // Mechanics
    pub compression_stiffness: f64,
    pub extension_stiffness: f64,
    pub equilibrium_radius: f64,
    pub drag_prefactor: f64, // 6 * pi * viscosity; times radius gives the Stokes drag
    pub max_neighbors: usize,

    // Hormones
    pub hormone_model: HormoneModel,
    pub production_rate: f64,
    pub degradation_rate: f64,
    pub feed_rate: f64,
    pub kill_rate: f64,
    pub reaction_rate: f64,
    pub source_rate: f64,
    pub diffusion_a: f64,
    pub diffusion_b: f64,
    pub hormone_efficacy: f64,
    pub source_start_time: f64,

    // Mitosis
    pub max_division_probability: f64,
    pub target_population: f64,
    pub division_offset_fraction: f64,

    // Contour
    pub contour_enabled: bool,
    pub fourier_coefficients: usize,
    pub contour_samples: usize,
}
