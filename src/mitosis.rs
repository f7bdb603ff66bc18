use crate::cell::Population;
use crate::error::{Result, SimError};
use log::{debug, trace};
use rand::Rng;
use rand_distr::{Distribution, UnitCircle};
use tissue_common::Vec2;

/// Divisions performed by one mitosis pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MitosisReport {
    /// `(mother, daughter)` index pairs in the order they happened.
    pub divisions: Vec<(usize, usize)>,
}

/// One stochastic division pass.
///
/// Only the cells present on entry are evaluated; daughters appended during
/// the pass wait for the next one. The division probability is re-read from
/// the live population size, so growth slows as the target is approached.
/// A successful draw with the population already at capacity fails with
/// [`SimError::CapacityExceeded`].
pub fn step<R: Rng>(
    population: &mut Population,
    rng: &mut R,
    offset_fraction: f64,
) -> Result<MitosisReport> {
    let mut report = MitosisReport::default();
    let n_at_entry = population.len();

    for mother in 0..n_at_entry {
        let probability = population.cells()[mother].division.probability(population.len());
        let draw: f64 = rng.random();
        if draw >= probability {
            continue;
        }
        if population.len() >= population.capacity() {
            return Err(SimError::CapacityExceeded {
                capacity: population.capacity(),
            });
        }

        let [ux, uy]: [f64; 2] = UnitCircle.sample(rng);
        let direction = Vec2::new(ux, uy);

        let cells = population.cells_mut();
        let offset = direction * (offset_fraction * cells[mother].effective_radius());
        let origin = cells[mother].position;
        let mut daughter = cells[mother].split_daughter();
        cells[mother].position = origin + offset;
        daughter.position = origin - offset;

        let daughter_idx = population.push(daughter)?;
        trace!("Cell {} divided into {}", mother, daughter_idx);
        report.divisions.push((mother, daughter_idx));
    }

    if !report.divisions.is_empty() {
        debug!(
            "{} divisions, population now {}",
            report.divisions.len(),
            population.len()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tissue_common::SimulationConfig;

    fn population(n: usize, capacity: usize, max_probability: f64, target: f64) -> Population {
        let mut config = SimulationConfig::default();
        config.mitosis.max_probability = max_probability;
        config.mitosis.target_population = target;
        let params = config.get_sim_params();
        let cells = (0..n)
            .map(|i| {
                let mut cell = Cell::new(Vec2::new(i as f64 * 20.0, 0.0), &params);
                cell.hormone_a = 1.0 + i as f64;
                cell.hormone_b = 0.5;
                cell
            })
            .collect();
        Population::from_cells(cells, capacity).unwrap()
    }

    #[test]
    fn certain_division_doubles_population_once() {
        let mut pop = population(4, 100, 1.0, 1e9);
        let mut rng = StdRng::seed_from_u64(7);
        let report = step(&mut pop, &mut rng, 0.5).unwrap();
        // Daughters are not evaluated in the same pass.
        assert_eq!(report.divisions.len(), 4);
        assert_eq!(pop.len(), 8);
        assert_eq!(report.divisions[0], (0, 4));
    }

    #[test]
    fn zero_probability_never_divides() {
        let mut pop = population(5, 100, 0.0, 100.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            step(&mut pop, &mut rng, 0.5).unwrap();
        }
        assert_eq!(pop.len(), 5);
    }

    #[test]
    fn no_division_at_or_above_target() {
        let mut pop = population(5, 100, 1.0, 5.0);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(step(&mut pop, &mut rng, 0.5).unwrap().divisions.is_empty());
    }

    #[test]
    fn division_at_capacity_fails() {
        let mut pop = population(3, 4, 1.0, 1e9);
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(
            step(&mut pop, &mut rng, 0.5),
            Err(SimError::CapacityExceeded { capacity: 4 })
        );
        assert!(pop.len() <= pop.capacity());
    }

    #[test]
    fn displacement_is_symmetric_and_mass_is_split() {
        let mut pop = population(1, 2, 1.0, 1e9);
        let before = pop.cells()[0].clone();
        let mut rng = StdRng::seed_from_u64(5);
        step(&mut pop, &mut rng, 0.25).unwrap();

        let expected = 0.25 * before.effective_radius();
        let mother = &pop.cells()[0];
        let daughter = &pop.cells()[1];
        let d_mother = mother.position.distance(before.position);
        let d_daughter = daughter.position.distance(before.position);
        assert!((d_mother - expected).abs() < 1e-9);
        assert!((d_daughter - expected).abs() < 1e-9);
        // Opposite directions about the old position.
        let midpoint = (mother.position + daughter.position) * 0.5;
        assert!(midpoint.distance(before.position) < 1e-9);

        assert!((mother.hormone_a + daughter.hormone_a - before.hormone_a).abs() < 1e-12);
        assert!((mother.hormone_b + daughter.hormone_b - before.hormone_b).abs() < 1e-12);
        assert_eq!(daughter.compression_stiffness, before.compression_stiffness);
    }

    #[test]
    fn repeated_passes_respect_capacity() {
        let mut pop = population(2, 64, 0.3, 1e9);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            if step(&mut pop, &mut rng, 0.5).is_err() {
                break;
            }
            assert!(pop.len() <= 64);
        }
        assert!(pop.len() <= 64);
    }
}
