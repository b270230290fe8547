//! Deterministic mock embedding provider.
//!
//! Used when no remote backend is configured: each text's vector is generated
//! from a pseudo-random generator seeded with the SHA-256 digest of the text,
//! so identical text always yields an identical vector and different texts
//! yield different vectors with overwhelming probability.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::config::DEFAULT_DIMENSIONS;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// An [`EmbeddingProvider`] that derives vectors from text hashes.
///
/// No batching limit applies; the whole input is embedded in one pass.
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl MockEmbeddingProvider {
    /// Create a provider producing vectors of the given width.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        let mut rng = StdRng::from_seed(seed);
        (0..self.dimensions).map(|_| rng.gen::<f32>()).collect()
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_yields_identical_vectors() {
        let provider = MockEmbeddingProvider::new(32);
        let a = provider.embed("acute myeloid leukemia").await.unwrap();
        let b = provider.embed("acute myeloid leukemia").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[tokio::test]
    async fn different_texts_yield_different_vectors() {
        let provider = MockEmbeddingProvider::new(32);
        let rows = provider
            .embed_batch(&["aspirin".to_string(), "ibuprofen".to_string()])
            .await
            .unwrap();
        assert_ne!(rows[0], rows[1]);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_matrix() {
        let provider = MockEmbeddingProvider::default();
        let rows = provider.embed_batch(&[]).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(provider.dimensions(), DEFAULT_DIMENSIONS);
    }
}
