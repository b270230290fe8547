//! Graph-based index family backed by the `usearch` ANN library.
//!
//! The graph construction and traversal live entirely inside `usearch`; this
//! module only crosses its CRUD contract. A shadow copy of every inserted
//! vector is kept so the manager can snapshot raw contents for persistence.

use usearch::{new_index, Index, IndexOptions, MetricKind, ScalarKind};

use crate::backend::AnnBackend;
use crate::error::{MedRagError, Result};

/// Graph connectivity (neighbors per node).
const CONNECTIVITY: usize = 32;
/// Initial reservation; the index grows geometrically from here.
const INITIAL_CAPACITY: usize = 1024;

pub(crate) struct GraphBackend {
    index: Index,
    shadow: Vec<(u64, Vec<f32>)>,
}

impl GraphBackend {
    pub(crate) fn new(dim: usize) -> Result<Self> {
        let options = IndexOptions {
            dimensions: dim,
            metric: MetricKind::L2sq,
            quantization: ScalarKind::F32,
            connectivity: CONNECTIVITY,
            ..Default::default()
        };
        let index = new_index(&options)
            .map_err(|e| MedRagError::IndexError(format!("failed to create graph index: {e}")))?;
        index
            .reserve(INITIAL_CAPACITY)
            .map_err(|e| MedRagError::IndexError(format!("failed to reserve graph index: {e}")))?;
        Ok(Self { index, shadow: Vec::new() })
    }
}

impl AnnBackend for GraphBackend {
    fn needs_training(&self) -> bool {
        false
    }

    fn is_trained(&self) -> bool {
        true
    }

    fn train(&mut self, _vectors: &[Vec<f32>]) -> Result<()> {
        Ok(())
    }

    fn insert(&mut self, id: u64, vector: &[f32]) -> Result<()> {
        if self.index.size() >= self.index.capacity() {
            let grown = (self.index.capacity() * 2).max(INITIAL_CAPACITY);
            self.index.reserve(grown).map_err(|e| {
                MedRagError::IndexError(format!("failed to grow graph index: {e}"))
            })?;
        }
        self.index
            .add(id, vector)
            .map_err(|e| MedRagError::IndexError(format!("graph insert failed: {e}")))?;
        self.shadow.push((id, vector.to_vec()));
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        if self.shadow.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let matches = self
            .index
            .search(query, k)
            .map_err(|e| MedRagError::IndexError(format!("graph search failed: {e}")))?;
        Ok(matches.keys.into_iter().zip(matches.distances).collect())
    }

    fn vectors(&self) -> Vec<(u64, Vec<f32>)> {
        self.shadow.clone()
    }

    fn len(&self) -> usize {
        self.shadow.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_query_returns_own_id_first() {
        let mut backend = GraphBackend::new(4).unwrap();
        backend.insert(0, &[1.0, 0.0, 0.0, 0.0]).unwrap();
        backend.insert(1, &[0.0, 1.0, 0.0, 0.0]).unwrap();
        backend.insert(2, &[0.0, 0.0, 1.0, 0.0]).unwrap();

        let hits = backend.search(&[0.0, 1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 1);
        assert!(hits[0].1.abs() < 1e-5);
    }

    #[test]
    fn empty_graph_returns_no_hits() {
        let backend = GraphBackend::new(4).unwrap();
        assert!(backend.search(&[0.0; 4], 5).unwrap().is_empty());
    }
}
