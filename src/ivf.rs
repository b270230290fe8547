//! Inverted-file index family.
//!
//! Vectors are partitioned into posting lists keyed by k-means centroids.
//! The centroids are trained on the first non-empty add batch; queries scan
//! only the `nprobe` lists whose centroids are nearest to the query, which is
//! what makes this family approximate.

use crate::backend::{l2_squared, rank, AnnBackend};
use crate::error::{MedRagError, Result};

/// Upper bound on the number of partitions.
const NLIST_CAP: usize = 256;
/// Number of partitions scanned per query.
const NPROBE: usize = 8;
/// K-means refinement rounds during training.
const TRAIN_ITERATIONS: usize = 10;

pub(crate) struct IvfBackend {
    centroids: Vec<Vec<f32>>,
    lists: Vec<Vec<(u64, Vec<f32>)>>,
    trained: bool,
    len: usize,
}

impl IvfBackend {
    pub(crate) fn new() -> Self {
        Self { centroids: Vec::new(), lists: Vec::new(), trained: false, len: 0 }
    }

    fn nearest_centroid(&self, vector: &[f32]) -> usize {
        self.centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, l2_squared(vector, c)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

impl AnnBackend for IvfBackend {
    fn needs_training(&self) -> bool {
        !self.trained
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn train(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if vectors.is_empty() {
            return Err(MedRagError::IndexError(
                "inverted-file training requires a non-empty batch".to_string(),
            ));
        }
        let k = vectors.len().min(NLIST_CAP);
        self.centroids = k_means(vectors, k, TRAIN_ITERATIONS);
        self.lists = vec![Vec::new(); self.centroids.len()];
        self.trained = true;
        Ok(())
    }

    fn insert(&mut self, id: u64, vector: &[f32]) -> Result<()> {
        if !self.trained {
            return Err(MedRagError::IndexError(
                "inverted-file backend used before training".to_string(),
            ));
        }
        let list = self.nearest_centroid(vector);
        self.lists[list].push((id, vector.to_vec()));
        self.len += 1;
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        if !self.trained {
            return Ok(Vec::new());
        }

        let probed = rank(
            self.centroids
                .iter()
                .enumerate()
                .map(|(i, c)| (i as u64, l2_squared(query, c)))
                .collect(),
            NPROBE.min(self.centroids.len()),
        );

        let mut candidates = Vec::new();
        for (list, _) in probed {
            for (id, vector) in &self.lists[list as usize] {
                candidates.push((*id, l2_squared(query, vector)));
            }
        }
        Ok(rank(candidates, k))
    }

    fn vectors(&self) -> Vec<(u64, Vec<f32>)> {
        self.lists.iter().flatten().cloned().collect()
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Plain k-means: evenly-spaced initialization, assign/recompute rounds with
/// early stop once assignments settle.
fn k_means(vectors: &[Vec<f32>], k: usize, max_iterations: usize) -> Vec<Vec<f32>> {
    let k = k.min(vectors.len());
    let dim = vectors[0].len();

    let step = vectors.len() / k;
    let mut centroids: Vec<Vec<f32>> = (0..k)
        .map(|i| vectors[(i * step).min(vectors.len() - 1)].clone())
        .collect();
    let mut assignments: Vec<usize> = vec![0; vectors.len()];

    for _ in 0..max_iterations {
        let mut changed = false;
        for (i, vector) in vectors.iter().enumerate() {
            let best = centroids
                .iter()
                .enumerate()
                .map(|(ci, c)| (ci, l2_squared(vector, c)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(ci, _)| ci)
                .unwrap_or(0);
            if assignments[i] != best {
                assignments[i] = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums: Vec<Vec<f32>> = vec![vec![0.0; dim]; k];
        let mut counts: Vec<usize> = vec![0; k];
        for (i, vector) in vectors.iter().enumerate() {
            let c = assignments[i];
            counts[c] += 1;
            for (j, value) in vector.iter().enumerate() {
                sums[c][j] += value;
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                for j in 0..dim {
                    centroids[c][j] = sums[c][j] / counts[c] as f32;
                }
            }
        }
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trains_on_first_batch_and_finds_own_vector() {
        let mut backend = IvfBackend::new();
        assert!(backend.needs_training());

        let batch: Vec<Vec<f32>> =
            (0..20).map(|i| vec![i as f32, (i * 2) as f32]).collect();
        backend.train(&batch).unwrap();
        assert!(backend.is_trained());

        for (i, v) in batch.iter().enumerate() {
            backend.insert(i as u64, v).unwrap();
        }

        let hits = backend.search(&[6.0, 12.0], 3).unwrap();
        assert_eq!(hits[0].0, 6);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn insert_before_training_is_an_error() {
        let mut backend = IvfBackend::new();
        assert!(backend.insert(0, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn search_before_training_is_empty() {
        let backend = IvfBackend::new();
        assert!(backend.search(&[1.0, 2.0], 5).unwrap().is_empty());
    }
}
