//! Adapter around the external triangulation oracle.
//!
//! The oracle takes single-precision points and returns a flat list of vertex
//! indices, three per triangle. Everything it hands back is checked before the
//! neighbour graph sees it.

use crate::error::{Result, SimError};
use log::trace;
use tissue_common::Vec2;

/// Black-box triangulation: `n` points in, flat index triples out.
pub trait Triangulator {
    fn triangulate(&self, points: &[[f32; 2]]) -> Vec<usize>;
}

/// Delaunay triangulation backed by the `delaunator` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelaunayTriangulator;

impl Triangulator for DelaunayTriangulator {
    fn triangulate(&self, points: &[[f32; 2]]) -> Vec<usize> {
        let points: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point {
                x: p[0] as f64,
                y: p[1] as f64,
            })
            .collect();
        delaunator::triangulate(&points).triangles
    }
}

/// Runs the oracle on the current positions and validates its output.
pub fn triangulate_positions<T: Triangulator + ?Sized>(
    oracle: &T,
    positions: &[Vec2],
) -> Result<Vec<[usize; 3]>> {
    let points: Vec<[f32; 2]> = positions.iter().map(Vec2::to_f32_array).collect();
    let flat = oracle.triangulate(&points);
    trace!("Oracle returned {} indices for {} points", flat.len(), points.len());
    triples_from_flat(&flat, positions.len())
}

/// Groups a flat index list into triples, rejecting out-of-range indices,
/// trailing partial triangles and triangles that repeat a vertex.
pub fn triples_from_flat(flat: &[usize], n: usize) -> Result<Vec<[usize; 3]>> {
    if flat.len() % 3 != 0 {
        return Err(SimError::TriangulationMismatch(format!(
            "{} indices do not form whole triangles",
            flat.len()
        )));
    }

    flat.chunks_exact(3)
        .enumerate()
        .map(|(t, chunk)| {
            let triple = [chunk[0], chunk[1], chunk[2]];
            if let Some(&bad) = triple.iter().find(|&&idx| idx >= n) {
                return Err(SimError::TriangulationMismatch(format!(
                    "triangle {} references vertex {} but only {} points exist",
                    t, bad, n
                )));
            }
            if triple[0] == triple[1] || triple[1] == triple[2] || triple[0] == triple[2] {
                return Err(SimError::TriangulationMismatch(format!(
                    "triangle {} repeats a vertex: {:?}",
                    t, triple
                )));
            }
            Ok(triple)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Oracle that ignores its input and replays a fixed index list.
    struct Replay(Vec<usize>);

    impl Triangulator for Replay {
        fn triangulate(&self, _points: &[[f32; 2]]) -> Vec<usize> {
            self.0.clone()
        }
    }

    #[test]
    fn equilateral_triangle_yields_one_triangle() {
        let h = 3f64.sqrt() / 2.0 * 10.0;
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(5.0, h)];
        let triples = triangulate_positions(&DelaunayTriangulator, &positions).unwrap();
        assert_eq!(triples.len(), 1);
        let mut t = triples[0];
        t.sort_unstable();
        assert_eq!(t, [0, 1, 2]);
    }

    #[test]
    fn square_yields_two_triangles() {
        let positions = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.5),
            Vec2::new(0.0, 10.0),
        ];
        let triples = triangulate_positions(&DelaunayTriangulator, &positions).unwrap();
        assert_eq!(triples.len(), 2);
    }

    #[test]
    fn too_few_points_yield_nothing() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert!(triangulate_positions(&DelaunayTriangulator, &positions)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let err = triangulate_positions(&Replay(vec![0, 1, 3]), &positions).unwrap_err();
        assert!(matches!(err, SimError::TriangulationMismatch(_)));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        assert!(matches!(
            triples_from_flat(&[0, 1, 2, 0], 3),
            Err(SimError::TriangulationMismatch(_))
        ));
    }

    #[test]
    fn repeated_vertex_is_rejected() {
        assert!(matches!(
            triples_from_flat(&[0, 0, 2], 3),
            Err(SimError::TriangulationMismatch(_))
        ));
    }
}
