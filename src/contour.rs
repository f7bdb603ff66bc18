//! Angular Fourier description of the tissue outline.
//!
//! Cells are viewed in polar form about the coordinate origin (not the
//! centroid), giving a radius-vs-angle sampling at irregular angles. The
//! forward pass is a non-uniform DFT over those samples; the inverse
//! evaluates the truncated series on a regular angle grid.

use num_complex::Complex64;
use std::f64::consts::TAU;
use tissue_common::{angle_to_vec, vec_to_angle, Vec2};

/// Hard ceiling on the number of retained coefficients.
pub const MAX_FOURIER_COEFFICIENTS: usize = 64;

/// A cell position in polar form about the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarSample {
    pub radius: f64,
    /// Angle in `(-PI, PI]`.
    pub theta: f64,
}

/// Polar samples of `positions`, sorted by angle.
pub fn polar_samples(positions: &[Vec2]) -> Vec<PolarSample> {
    let mut samples: Vec<PolarSample> = positions
        .iter()
        .map(|p| PolarSample {
            radius: p.length(),
            theta: vec_to_angle(*p),
        })
        .collect();
    samples.sort_by(|a, b| a.theta.total_cmp(&b.theta));
    samples
}

/// Clamps a requested coefficient count to the fixed maximum and to half the
/// population (at least one coefficient while any cell exists).
pub fn effective_coefficient_count(requested: usize, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    requested.min(MAX_FOURIER_COEFFICIENTS).min((n / 2).max(1))
}

/// Immutable coefficient snapshot of one point set.
#[derive(Debug, Clone, PartialEq)]
pub struct FourierModel {
    coefficients: Vec<Complex64>,
}

impl FourierModel {
    /// `c_k = (1/n) * sum_p r_p * exp(-i k theta_p)` for `k < K`, with `c_0`
    /// kept real. `K` is clamped by [`effective_coefficient_count`].
    pub fn forward(positions: &[Vec2], requested: usize) -> Self {
        let samples = polar_samples(positions);
        let n = samples.len();
        let count = effective_coefficient_count(requested, n);
        let inv_n = 1.0 / n.max(1) as f64;

        let coefficients = (0..count)
            .map(|k| {
                if k == 0 {
                    let mean = samples.iter().map(|s| s.radius).sum::<f64>() * inv_n;
                    return Complex64::new(mean, 0.0);
                }
                let sum: Complex64 = samples
                    .iter()
                    .map(|s| Complex64::from_polar(s.radius, -(k as f64) * s.theta))
                    .sum();
                sum * inv_n
            })
            .collect();
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[Complex64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// |c_k| for each coefficient.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.norm()).collect()
    }

    /// Truncated series evaluated at angle `phi`. Each `k >= 1` term stands in
    /// for the `+k` and `-k` pair of a real signal.
    pub fn radius_at(&self, phi: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| {
                if k == 0 {
                    c.re
                } else {
                    let angle = k as f64 * phi;
                    2.0 * (c.re * angle.cos() - c.im * angle.sin())
                }
            })
            .sum()
    }

    /// Closed polyline of `samples` uniformly spaced angles; the first point
    /// is repeated at the end.
    pub fn reconstruct(&self, samples: usize) -> Vec<Vec2> {
        if samples == 0 {
            return Vec::new();
        }
        let mut outline: Vec<Vec2> = (0..samples)
            .map(|s| {
                let phi = TAU * s as f64 / samples as f64;
                angle_to_vec(phi) * self.radius_at(phi)
            })
            .collect();
        outline.push(outline[0]);
        outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(n: usize, radius: impl Fn(f64) -> f64) -> Vec<Vec2> {
        (0..n)
            .map(|j| {
                let theta = TAU * j as f64 / n as f64;
                angle_to_vec(theta) * radius(theta)
            })
            .collect()
    }

    #[test]
    fn samples_are_sorted_by_angle_about_origin() {
        let points = [Vec2::new(0.0, -1.0), Vec2::new(-2.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 4.0)];
        let samples = polar_samples(&points);
        let radii: Vec<f64> = samples.iter().map(|s| s.radius).collect();
        assert_eq!(radii, vec![1.0, 3.0, 4.0, 2.0]);
    }

    #[test]
    fn coefficient_count_is_clamped() {
        assert_eq!(effective_coefficient_count(10, 100), 10);
        assert_eq!(effective_coefficient_count(10, 8), 4);
        assert_eq!(effective_coefficient_count(1000, 10_000), MAX_FOURIER_COEFFICIENTS);
        assert_eq!(effective_coefficient_count(5, 1), 1);
        assert_eq!(effective_coefficient_count(5, 0), 0);
    }

    #[test]
    fn circle_has_flat_spectrum_and_constant_reconstruction() {
        let n = 24;
        let points = outline(n, |_| 7.0);
        let model = FourierModel::forward(&points, n);
        assert_eq!(model.len(), n / 2);
        assert!((model.coefficients()[0].re - 7.0).abs() < 1e-12);
        assert_eq!(model.coefficients()[0].im, 0.0);
        for amp in &model.amplitudes()[1..] {
            assert!(*amp < 1e-9);
        }
        for p in model.reconstruct(50) {
            assert!((p.length() - 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn harmonic_outline_is_reconstructed() {
        let shape = |theta: f64| 10.0 + 2.0 * (2.0 * theta).cos() + 1.5 * (3.0 * theta).sin();
        let model = FourierModel::forward(&outline(64, shape), 8);
        assert_eq!(model.len(), 8);
        for s in 0..90 {
            let phi = TAU * s as f64 / 90.0;
            assert!((model.radius_at(phi) - shape(phi)).abs() < 1e-9);
        }
    }

    #[test]
    fn origin_is_the_reference_not_the_centroid() {
        let shifted: Vec<Vec2> = outline(16, |_| 1.0)
            .into_iter()
            .map(|p| p + Vec2::new(5.0, 0.0))
            .collect();
        let model = FourierModel::forward(&shifted, 4);
        assert!(model.amplitudes()[1] > 1e-3);
    }

    #[test]
    fn reconstruction_is_closed() {
        let model = FourierModel::forward(&outline(10, |_| 3.0), 3);
        let polyline = model.reconstruct(16);
        assert_eq!(polyline.len(), 17);
        assert_eq!(polyline[0], polyline[16]);
        assert!(FourierModel::forward(&[], 4).is_empty());
    }
}
