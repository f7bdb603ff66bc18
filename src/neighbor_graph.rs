use crate::error::{Result, SimError};

/// Slot value meaning "no neighbour". Never a valid cell index.
pub const NO_NEIGHBOR: usize = usize::MAX;

/// Bounded-degree adjacency over cell indices, stored as fixed-width rows of
/// `max_degree` slots. Rebuilt from scratch every step; holds indices only.
///
/// Rows are deduplicated independently, so the graph is not forced to be
/// symmetric. Use [`NeighborGraph::is_symmetric`] to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborGraph {
    slots: Vec<usize>,
    n: usize,
    max_degree: usize,
}

impl NeighborGraph {
    /// Builds the adjacency from triangle triples. Each vertex of a triangle
    /// gains the other two as candidates; a row is then compacted to its
    /// distinct entries in first-seen order.
    ///
    /// Returns [`SimError::NeighborOverflow`] if any row ends up with more
    /// than `max_degree` distinct neighbours, and
    /// [`SimError::TriangulationMismatch`] for indices outside `0..n` or a
    /// triangle that repeats a vertex.
    pub fn build(triples: &[[usize; 3]], n: usize, max_degree: usize) -> Result<Self> {
        let mut candidates: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (t, triple) in triples.iter().enumerate() {
            if let Some(&bad) = triple.iter().find(|&&idx| idx >= n) {
                return Err(SimError::TriangulationMismatch(format!(
                    "triangle {} references vertex {} (n = {})",
                    t, bad, n
                )));
            }
            if triple[0] == triple[1] || triple[1] == triple[2] || triple[0] == triple[2] {
                return Err(SimError::TriangulationMismatch(format!(
                    "triangle {} repeats a vertex: {:?}",
                    t, triple
                )));
            }
            for (k, &vertex) in triple.iter().enumerate() {
                let row = &mut candidates[vertex];
                row.push(triple[(k + 1) % 3]);
                row.push(triple[(k + 2) % 3]);
            }
        }

        let mut graph = Self::empty(n, max_degree);
        for (cell, mut row) in candidates.into_iter().enumerate() {
            compact_unique(&mut row);
            if row.len() > max_degree {
                return Err(SimError::NeighborOverflow {
                    cell,
                    capacity: max_degree,
                });
            }
            graph.row_mut(cell)[..row.len()].copy_from_slice(&row);
        }
        Ok(graph)
    }

    /// Builds a graph from explicit rows. Each row must be distinct, in
    /// range, free of self-references and at most `max_degree` long.
    pub fn from_rows(rows: &[Vec<usize>], max_degree: usize) -> Result<Self> {
        let n = rows.len();
        let mut graph = Self::empty(n, max_degree);
        for (cell, row) in rows.iter().enumerate() {
            if row.len() > max_degree {
                return Err(SimError::NeighborOverflow {
                    cell,
                    capacity: max_degree,
                });
            }
            for (k, &j) in row.iter().enumerate() {
                if j >= n || j == cell || row[..k].contains(&j) {
                    return Err(SimError::TriangulationMismatch(format!(
                        "row {} has invalid entry {}",
                        cell, j
                    )));
                }
            }
            graph.row_mut(cell)[..row.len()].copy_from_slice(row);
        }
        Ok(graph)
    }

    fn empty(n: usize, max_degree: usize) -> Self {
        Self {
            slots: vec![NO_NEIGHBOR; n * max_degree],
            n,
            max_degree,
        }
    }

    fn row_mut(&mut self, cell: usize) -> &mut [usize] {
        let start = cell * self.max_degree;
        &mut self.slots[start..start + self.max_degree]
    }

    /// Raw slots of a row, sentinels included.
    pub fn row(&self, cell: usize) -> &[usize] {
        let start = cell * self.max_degree;
        &self.slots[start..start + self.max_degree]
    }

    /// Valid neighbour indices of `cell`.
    pub fn neighbors(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(cell).iter().copied().take_while(|&j| j != NO_NEIGHBOR)
    }

    pub fn degree(&self, cell: usize) -> usize {
        self.neighbors(cell).count()
    }

    /// Number of cells the graph was built for.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Number of directed row entries.
    pub fn edge_count(&self) -> usize {
        (0..self.n).map(|i| self.degree(i)).sum()
    }

    /// True when every `j` in row `i` also lists `i`.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| self.neighbors(i).all(|j| self.neighbors(j).any(|k| k == i)))
    }

    /// `hist[d]` is the number of cells with exactly `d` neighbours.
    pub fn degree_histogram(&self) -> Vec<u32> {
        let mut hist = vec![0u32; self.max_degree + 1];
        for i in 0..self.n {
            hist[self.degree(i)] += 1;
        }
        hist
    }
}

/// Removes repeated entries in place, keeping first-seen order; later entries
/// shift left to fill the gaps.
fn compact_unique(row: &mut Vec<usize>) {
    let mut write = 0;
    for read in 0..row.len() {
        let candidate = row[read];
        if !row[..write].contains(&candidate) {
            row[write] = candidate;
            write += 1;
        }
    }
    row.truncate(write);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_triangle_gives_two_neighbors_each() {
        let graph = NeighborGraph::build(&[[0, 1, 2]], 3, 4).unwrap();
        for i in 0..3 {
            assert_eq!(graph.degree(i), 2);
        }
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(graph.row(0), &[1, 2, NO_NEIGHBOR, NO_NEIGHBOR]);
        assert!(graph.is_symmetric());
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn shared_edge_is_deduplicated_in_first_seen_order() {
        // Two triangles sharing edge 1-2.
        let graph = NeighborGraph::build(&[[0, 1, 2], [2, 1, 3]], 4, 6).unwrap();
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![2, 0, 3]);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(3), 2);
    }

    #[test]
    fn overflowing_row_is_an_error() {
        // Vertex 0 is a hub with four distinct neighbours.
        let triples = [[0, 1, 2], [0, 2, 3], [0, 3, 4]];
        assert_eq!(
            NeighborGraph::build(&triples, 5, 3),
            Err(SimError::NeighborOverflow { cell: 0, capacity: 3 })
        );
        assert!(NeighborGraph::build(&triples, 5, 4).is_ok());
    }

    #[test]
    fn out_of_range_vertex_is_rejected() {
        assert!(matches!(
            NeighborGraph::build(&[[0, 1, 5]], 3, 4),
            Err(SimError::TriangulationMismatch(_))
        ));
    }

    #[test]
    fn repeated_vertex_is_rejected() {
        assert!(matches!(
            NeighborGraph::build(&[[0, 0, 1]], 2, 4),
            Err(SimError::TriangulationMismatch(_))
        ));
        assert!(matches!(
            NeighborGraph::build(&[[0, 1, 2], [2, 3, 2]], 4, 4),
            Err(SimError::TriangulationMismatch(_))
        ));
    }

    #[test]
    fn isolated_cells_have_empty_rows() {
        let graph = NeighborGraph::build(&[], 2, 3).unwrap();
        assert_eq!(graph.degree(0), 0);
        assert_eq!(graph.degree_histogram(), vec![2, 0, 0, 0]);
    }

    #[test]
    fn asymmetric_rows_are_representable() {
        let graph = NeighborGraph::from_rows(&[vec![1], vec![]], 2).unwrap();
        assert!(!graph.is_symmetric());
        assert_eq!(graph.degree(0), 1);
        assert_eq!(graph.degree(1), 0);
    }

    #[test]
    fn from_rows_rejects_duplicates_and_self_loops() {
        assert!(NeighborGraph::from_rows(&[vec![1, 1], vec![0]], 4).is_err());
        assert!(NeighborGraph::from_rows(&[vec![0]], 4).is_err());
        assert!(NeighborGraph::from_rows(&[vec![1, 2, 3]], 2).is_err());
    }

    proptest! {
        #[test]
        fn rows_are_unique_and_bounded(
            raw in prop::collection::vec((0usize..12, 0usize..12, 0usize..12), 0..40)
        ) {
            let n = 12;
            let triples: Vec<[usize; 3]> = raw
                .into_iter()
                .filter(|(a, b, c)| a != b && b != c && a != c)
                .map(|(a, b, c)| [a, b, c])
                .collect();
            // Wide enough rows that overflow cannot happen.
            let graph = NeighborGraph::build(&triples, n, n).unwrap();
            for i in 0..n {
                let row: Vec<usize> = graph.neighbors(i).collect();
                prop_assert!(row.len() <= graph.max_degree());
                prop_assert!(!row.contains(&i));
                for (k, j) in row.iter().enumerate() {
                    prop_assert!(*j < n);
                    prop_assert!(!row[..k].contains(j));
                }
                // Trailing slots are all sentinels.
                prop_assert!(graph.row(i)[row.len()..].iter().all(|&s| s == NO_NEIGHBOR));
            }
            prop_assert!(graph.is_symmetric());
        }
    }
}
