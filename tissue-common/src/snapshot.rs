use crate::vecmath::Vec2;
use serde::{Deserialize, Serialize};

/// Everything an external renderer needs to draw one frame. Holds copies, so it
/// may outlive the step that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated time at which the snapshot was taken.
    pub time: f64,
    /// Step counter at which the snapshot was taken.
    pub step: u64,
    pub positions: Vec<Vec2>,
    /// Effective (hormone-expanded) radius of each cell.
    pub radii: Vec<f64>,
    pub hormone_a: Vec<f64>,
    pub hormone_b: Vec<f64>,
    /// `neighbor_counts_distribution[N]` is the number of cells with exactly N neighbours.
    pub neighbor_counts_distribution: Vec<u32>,
    /// Closed polyline of the Fourier-approximated outline, if contour analysis is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contour: Option<Vec<Vec2>>,
    /// |c_k| for each retained coefficient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fourier_amplitudes: Option<Vec<f64>>,
}

impl Snapshot {
    pub fn cell_count(&self) -> usize {
        self.positions.len()
    }

    pub fn total_hormone_a(&self) -> f64 {
        self.hormone_a.iter().sum()
    }
}
