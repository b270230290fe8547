//! Embedding provider trait and configuration-driven factory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{EmbeddingBackend, RagConfig};
use crate::error::Result;
use crate::mock::MockEmbeddingProvider;
use crate::vertex::VertexEmbeddingProvider;

/// A capability that maps text to fixed-dimension float vectors.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. The batch call is the primary contract: it must preserve input
/// order (row `i` corresponds to `texts[i]`) and return an empty matrix for
/// empty input. Every row has exactly [`dimensions()`](EmbeddingProvider::dimensions)
/// components; callers must query the dimension rather than assume it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text.
    ///
    /// The default implementation delegates to
    /// [`embed_batch`](EmbeddingProvider::embed_batch) with a one-element
    /// batch.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut rows = self.embed_batch(&texts).await?;
        Ok(rows.pop().unwrap_or_default())
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Construct the embedding provider selected by the configuration.
///
/// The variant is chosen at construction time — never by runtime type
/// inspection. The mock variant needs no credentials; the Vertex variant
/// validates its connection parameters here, before any network call.
///
/// # Errors
///
/// Returns [`MedRagError::ConfigError`](crate::MedRagError::ConfigError) when
/// the remote backend is selected but its required connection parameters are
/// absent.
pub fn provider_from_config(config: &RagConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.backend {
        EmbeddingBackend::Mock => {
            Ok(Arc::new(MockEmbeddingProvider::new(config.dimensions)))
        }
        EmbeddingBackend::Vertex => {
            Ok(Arc::new(VertexEmbeddingProvider::new(config.vertex.clone())?))
        }
    }
}
