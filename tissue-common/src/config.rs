use crate::sim_params::SimParams;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Rejections raised while validating a configuration, before any step runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must lie in [0, 1] (got {value})")]
    NotAProbability { field: &'static str, value: f64 },

    #[error("capacity ({capacity}) is smaller than the initial population ({initial})")]
    CapacityBelowInitial { capacity: usize, initial: usize },

    #[error("expected one or two hormone source origins, got {0}")]
    SourceOriginCount(usize),

    #[error("{0} must be greater than zero")]
    ZeroCount(&'static str),
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    /// Physics timestep (seconds).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Number of steps the driver runs before stopping.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Record a renderer snapshot every N steps.
    #[serde(default = "default_record_interval_steps")]
    pub record_interval_steps: u64,
}

// Initial population and container bounds
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PopulationConfig {
    #[serde(default = "default_initial_cells")]
    pub initial_cells: usize,
    /// Hard upper bound on the number of cells (N_max).
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Radius of a cell with no hormone-driven expansion (um).
    #[serde(default = "default_base_radius")]
    pub base_radius: f64,
    /// Half-width of the square the initial cells are scattered in (um).
    #[serde(default = "default_initial_spread")]
    pub initial_spread: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

// Spring mechanics and neighbour graph
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MechanicsConfig {
    #[serde(default = "default_compression_stiffness")]
    pub compression_stiffness: f64,
    #[serde(default = "default_extension_stiffness")]
    pub extension_stiffness: f64,
    /// Inter-cell distance at which the spring force vanishes (um).
    #[serde(default = "default_equilibrium_radius")]
    pub equilibrium_radius: f64,
    /// Dynamic viscosity of the surrounding medium (Pa.s), used for Stokes drag.
    #[serde(default = "default_fluid_viscosity")]
    pub fluid_viscosity: f64,
    /// Maximum number of distinct neighbours per cell (W).
    #[serde(default = "default_max_neighbors")]
    pub max_neighbors: usize,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HormoneModel {
    BirthDeath,
    ReactionDiffusion,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct HormoneConfig {
    #[serde(default = "default_hormone_model")]
    pub model: HormoneModel,

    // Birth/death
    #[serde(default = "default_production_rate")]
    pub production_rate: f64,
    #[serde(default = "default_degradation_rate")]
    pub degradation_rate: f64,

    // Reaction-diffusion
    #[serde(default = "default_feed_rate")]
    pub feed_rate: f64,
    #[serde(default = "default_kill_rate")]
    pub kill_rate: f64,
    #[serde(default = "default_reaction_rate")]
    pub reaction_rate: f64,
    #[serde(default = "default_source_rate")]
    pub source_rate: f64,

    // Transport
    #[serde(default = "default_diffusion")]
    pub diffusion_a: f64,
    #[serde(default = "default_diffusion")]
    pub diffusion_b: f64,

    /// Radius gained per unit of hormone A.
    #[serde(default = "default_efficacy")]
    pub efficacy: f64,

    /// Simulated time after which source cells are chosen.
    #[serde(default = "default_source_start_time")]
    pub source_start_time: f64,
    /// One or two points; the nearest cell to each becomes a source.
    #[serde(default = "default_source_origins")]
    pub source_origins: Vec<[f64; 2]>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MitosisConfig {
    #[serde(default = "default_max_probability")]
    pub max_probability: f64,
    #[serde(default = "default_target_population")]
    pub target_population: f64,
    /// Mother and daughter each move this fraction of the mother's radius.
    #[serde(default = "default_offset_fraction")]
    pub offset_fraction: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ContourConfig {
    #[serde(default = "default_contour_enabled")]
    pub enabled: bool,
    /// Requested coefficient count K (clamped at runtime).
    #[serde(default = "default_coefficients")]
    pub coefficients: usize,
    /// Number of angles in the reconstructed polyline.
    #[serde(default = "default_contour_samples")]
    pub samples: usize,
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub mechanics: MechanicsConfig,
    #[serde(default)]
    pub hormones: HormoneConfig,
    #[serde(default)]
    pub mitosis: MitosisConfig,
    #[serde(default)]
    pub contour: ContourConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: SimulationConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects non-physical parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("timing.dt", self.timing.dt)?;
        if self.timing.record_interval_steps == 0 {
            return Err(ConfigError::ZeroCount("timing.record_interval_steps"));
        }

        let pop = &self.population;
        if pop.initial_cells == 0 {
            return Err(ConfigError::ZeroCount("population.initial_cells"));
        }
        if pop.capacity < pop.initial_cells {
            return Err(ConfigError::CapacityBelowInitial {
                capacity: pop.capacity,
                initial: pop.initial_cells,
            });
        }
        positive("population.base_radius", pop.base_radius)?;
        non_negative("population.initial_spread", pop.initial_spread)?;

        let mech = &self.mechanics;
        positive("mechanics.compression_stiffness", mech.compression_stiffness)?;
        positive("mechanics.extension_stiffness", mech.extension_stiffness)?;
        positive("mechanics.equilibrium_radius", mech.equilibrium_radius)?;
        positive("mechanics.fluid_viscosity", mech.fluid_viscosity)?;
        if mech.max_neighbors == 0 {
            return Err(ConfigError::ZeroCount("mechanics.max_neighbors"));
        }

        let h = &self.hormones;
        for (field, value) in [
            ("hormones.production_rate", h.production_rate),
            ("hormones.degradation_rate", h.degradation_rate),
            ("hormones.feed_rate", h.feed_rate),
            ("hormones.kill_rate", h.kill_rate),
            ("hormones.reaction_rate", h.reaction_rate),
            ("hormones.source_rate", h.source_rate),
            ("hormones.diffusion_a", h.diffusion_a),
            ("hormones.diffusion_b", h.diffusion_b),
            ("hormones.efficacy", h.efficacy),
            ("hormones.source_start_time", h.source_start_time),
        ] {
            non_negative(field, value)?;
        }
        if h.source_origins.is_empty() || h.source_origins.len() > 2 {
            return Err(ConfigError::SourceOriginCount(h.source_origins.len()));
        }

        let m = &self.mitosis;
        if !(0.0..=1.0).contains(&m.max_probability) {
            return Err(ConfigError::NotAProbability {
                field: "mitosis.max_probability",
                value: m.max_probability,
            });
        }
        positive("mitosis.target_population", m.target_population)?;
        positive("mitosis.offset_fraction", m.offset_fraction)?;

        if self.contour.enabled && self.contour.samples == 0 {
            return Err(ConfigError::ZeroCount("contour.samples"));
        }
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let h = &self.hormones;
        SimParams {
            dt: self.timing.dt,
            capacity: self.population.capacity,
            base_radius: self.population.base_radius,
            compression_stiffness: self.mechanics.compression_stiffness,
            extension_stiffness: self.mechanics.extension_stiffness,
            equilibrium_radius: self.mechanics.equilibrium_radius,
            drag_prefactor: 6.0 * std::f64::consts::PI * self.mechanics.fluid_viscosity,
            max_neighbors: self.mechanics.max_neighbors,
            hormone_model: h.model,
            production_rate: h.production_rate,
            degradation_rate: h.degradation_rate,
            feed_rate: h.feed_rate,
            kill_rate: h.kill_rate,
            reaction_rate: h.reaction_rate,
            source_rate: h.source_rate,
            diffusion_a: h.diffusion_a,
            diffusion_b: h.diffusion_b,
            hormone_efficacy: h.efficacy,
            source_start_time: h.source_start_time,
            max_division_probability: self.mitosis.max_probability,
            target_population: self.mitosis.target_population,
            division_offset_fraction: self.mitosis.offset_fraction,
            contour_enabled: self.contour.enabled,
            fourier_coefficients: self.contour.coefficients,
            contour_samples: self.contour.samples,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails this comparison too.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            dt: default_dt(),
            max_iterations: default_max_iterations(),
            record_interval_steps: default_record_interval_steps(),
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            initial_cells: default_initial_cells(),
            capacity: default_capacity(),
            base_radius: default_base_radius(),
            initial_spread: default_initial_spread(),
            seed: default_seed(),
        }
    }
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        MechanicsConfig {
            compression_stiffness: default_compression_stiffness(),
            extension_stiffness: default_extension_stiffness(),
            equilibrium_radius: default_equilibrium_radius(),
            fluid_viscosity: default_fluid_viscosity(),
            max_neighbors: default_max_neighbors(),
        }
    }
}

impl Default for HormoneConfig {
    fn default() -> Self {
        HormoneConfig {
            model: default_hormone_model(),
            production_rate: default_production_rate(),
            degradation_rate: default_degradation_rate(),
            feed_rate: default_feed_rate(),
            kill_rate: default_kill_rate(),
            reaction_rate: default_reaction_rate(),
            source_rate: default_source_rate(),
            diffusion_a: default_diffusion(),
            diffusion_b: default_diffusion(),
            efficacy: default_efficacy(),
            source_start_time: default_source_start_time(),
            source_origins: default_source_origins(),
        }
    }
}

impl Default for MitosisConfig {
    fn default() -> Self {
        MitosisConfig {
            max_probability: default_max_probability(),
            target_population: default_target_population(),
            offset_fraction: default_offset_fraction(),
        }
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        ContourConfig {
            enabled: default_contour_enabled(),
            coefficients: default_coefficients(),
            samples: default_contour_samples(),
        }
    }
}

fn default_dt() -> f64 { 0.01 }
fn default_max_iterations() -> u64 { 2000 }
fn default_record_interval_steps() -> u64 { 50 }

fn default_initial_cells() -> usize { 5 }
fn default_capacity() -> usize { 500 }
fn default_base_radius() -> f64 { 5.0 }
fn default_initial_spread() -> f64 { 15.0 }
fn default_seed() -> u64 { 2 }

fn default_compression_stiffness() -> f64 { 1.0 }
fn default_extension_stiffness() -> f64 { 0.5 }
fn default_equilibrium_radius() -> f64 { 10.0 }
fn default_fluid_viscosity() -> f64 { 0.0016 } // water at 20 C
fn default_max_neighbors() -> usize { 16 }

fn default_hormone_model() -> HormoneModel { HormoneModel::BirthDeath }
fn default_production_rate() -> f64 { 10.0 }
fn default_degradation_rate() -> f64 { 0.008 }
fn default_feed_rate() -> f64 { 0.037 }
fn default_kill_rate() -> f64 { 0.06 }
fn default_reaction_rate() -> f64 { 1.0 }
fn default_source_rate() -> f64 { 1.0 }
fn default_diffusion() -> f64 { 0.3 }
fn default_efficacy() -> f64 { 0.001 }
fn default_source_start_time() -> f64 { 0.05 }
fn default_source_origins() -> Vec<[f64; 2]> { vec![[12.5, 7.5]] }

fn default_max_probability() -> f64 { 0.005 }
fn default_target_population() -> f64 { 100.0 }
fn default_offset_fraction() -> f64 { 0.5 }

fn default_contour_enabled() -> bool { true }
fn default_coefficients() -> usize { 8 }
fn default_contour_samples() -> usize { 128 }
