//! Vector-structure seam between the index manager and the index families.

use crate::error::Result;

/// The storage-and-search contract a [`VectorIndex`](crate::VectorIndex)
/// crosses. Implementations own the family-specific structure; the manager
/// owns ids, metadata, and persistence.
pub(crate) trait AnnBackend: Send {
    /// Whether this family must be trained before its first insertion.
    fn needs_training(&self) -> bool;

    /// Whether the structure is ready to accept insertions.
    fn is_trained(&self) -> bool;

    /// Train on a representative batch. No-op for families that need none.
    fn train(&mut self, vectors: &[Vec<f32>]) -> Result<()>;

    /// Insert one vector tagged with an externally assigned id.
    fn insert(&mut self, id: u64, vector: &[f32]) -> Result<()>;

    /// Up to `k` nearest neighbors of `query`, ascending by raw distance.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>>;

    /// Every stored `(id, vector)` pair, for snapshot persistence.
    fn vectors(&self) -> Vec<(u64, Vec<f32>)>;

    /// Number of stored vectors.
    fn len(&self) -> usize;
}

/// Squared Euclidean distance between two equal-width vectors.
pub(crate) fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Sort candidate `(id, distance)` pairs ascending and keep the best `k`.
pub(crate) fn rank(mut candidates: Vec<(u64, f32)>, k: usize) -> Vec<(u64, f32)> {
    candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(k);
    candidates
}

/// The exact (non-approximate) family: a brute-force scan over all vectors.
///
/// Needs no training and returns exact distances, which makes it the
/// reference family for tests and the generic family persisted snapshots are
/// reloaded into.
pub(crate) struct FlatBackend {
    entries: Vec<(u64, Vec<f32>)>,
}

impl FlatBackend {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }
}

impl AnnBackend for FlatBackend {
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
        self.entries.push((id, vector.to_vec()));
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        let candidates = self
            .entries
            .iter()
            .map(|(id, vector)| (*id, l2_squared(query, vector)))
            .collect();
        Ok(rank(candidates, k))
    }

    fn vectors(&self) -> Vec<(u64, Vec<f32>)> {
        self.entries.clone()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
