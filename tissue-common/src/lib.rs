pub mod config;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    ConfigError, ContourConfig, HormoneConfig, HormoneModel, MechanicsConfig, MitosisConfig,
    PopulationConfig, SimulationConfig, TimingConfig,
};
pub use sim_params::SimParams;
pub use snapshot::Snapshot;
pub use vecmath::{angle_to_vec, vec_to_angle, Vec2};
