//! Ingestion and search orchestration.
//!
//! The [`Pipeline`] ties the chunker, the embedding provider, and the vector
//! index together: ingestion is chunk → embed → add, search is embed →
//! nearest-neighbor lookup. Construct one via [`Pipeline::builder()`].
//!
//! # Example
//!
//! ```rust,ignore
//! use medrag::{Pipeline, RagConfig};
//!
//! let mut pipeline = Pipeline::builder()
//!     .config(RagConfig::default())
//!     .build()?;
//!
//! let chunks = pipeline.ingest(&documents).await?;
//! let hits = pipeline.search("checkpoint inhibitors in melanoma", 5).await?;
//! pipeline.save(Path::new("indexes/medical.idx"))?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::chunking::DocumentChunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document, Metadata, SearchHit};
use crate::embedding::{provider_from_config, EmbeddingProvider};
use crate::error::{MedRagError, Result};
use crate::index::VectorIndex;

/// The ingestion/search orchestrator.
///
/// Owns the vector index exclusively; all mutation goes through `&mut self`.
/// The embedding call is the only network boundary — one batch sequence per
/// `ingest` or `search` call, never overlapped.
pub struct Pipeline {
    chunker: DocumentChunker,
    provider: Arc<dyn EmbeddingProvider>,
    index: VectorIndex,
}

impl Pipeline {
    /// Create a new [`PipelineBuilder`].
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Restore a pipeline whose index was persisted with
    /// [`save`](Pipeline::save).
    ///
    /// The embedding provider is freshly constructed from the given
    /// configuration — it is never persisted.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::CorruptIndex`] if the artifact is missing or
    /// undecodable, and [`MedRagError::ConfigError`] if the restored index
    /// dimension disagrees with the configured provider's.
    pub fn load(path: &Path, config: &RagConfig) -> Result<Self> {
        let provider = provider_from_config(config)?;
        Self::load_with_provider(path, config, provider)
    }

    /// Like [`load`](Pipeline::load), with a caller-supplied provider.
    pub fn load_with_provider(
        path: &Path,
        config: &RagConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let chunker = DocumentChunker::new(config.chunk_size, config.chunk_overlap)?;
        let index = VectorIndex::load(path)?;
        if index.dim() != provider.dimensions() {
            return Err(MedRagError::ConfigError(format!(
                "restored index dimension ({}) does not match the provider's ({})",
                index.dim(),
                provider.dimensions()
            )));
        }
        Ok(Self { chunker, provider, index })
    }

    /// The vector index owned by this pipeline.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// The embedding provider used by this pipeline.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Ingest a stream of documents: chunk → embed → add.
    ///
    /// All chunks across all documents are accumulated into one ordered
    /// sequence, embedded in exactly one provider call, and added to the
    /// index in exactly one batch, with each chunk serialized as its vector's
    /// metadata. Returns the full chunk sequence for caller inspection.
    ///
    /// An empty document stream yields zero chunks and performs no embedding
    /// or index calls.
    pub async fn ingest(&mut self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for document in documents {
            chunks.extend(self.chunker.chunk(document));
        }
        if chunks.is_empty() {
            info!(documents = documents.len(), chunk_count = 0, "ingested nothing");
            return Ok(chunks);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.provider.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
            e
        })?;

        let metadata: Vec<Metadata> =
            chunks.iter().map(chunk_metadata).collect::<Result<_>>()?;
        self.index.add(&vectors, metadata)?;

        info!(
            documents = documents.len(),
            chunk_count = chunks.len(),
            total_vectors = self.index.len(),
            "ingested documents"
        );
        Ok(chunks)
    }

    /// Search the index with a single query string.
    ///
    /// Embeds the query, delegates to the index with that one row, and
    /// returns the hit list for it — best first, at most `k` entries.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query_vector = self.provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during search");
            e
        })?;
        let mut results = self.index.search(&[query_vector], k)?;
        let hits = results.pop().unwrap_or_default();

        info!(k, hit_count = hits.len(), "search completed");
        Ok(hits)
    }

    /// Persist the index (and its metadata side-car) to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.index.save(path)
    }
}

/// Serialize a chunk into the opaque metadata object stored with its vector.
fn chunk_metadata(chunk: &Chunk) -> Result<Metadata> {
    match serde_json::to_value(chunk) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MedRagError::PipelineError(format!(
            "chunk '{}' did not serialize to an object",
            chunk.chunk_id
        ))),
        Err(e) => Err(MedRagError::PipelineError(format!(
            "failed to serialize chunk '{}': {e}",
            chunk.chunk_id
        ))),
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// The configuration is required; the embedding provider defaults to the
/// variant the configuration selects. The index is constructed with the
/// provider's reported dimension and the configured family.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<RagConfig>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom embedding provider, overriding the configured variant.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the [`Pipeline`], validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::ConfigError`] if the configuration is missing
    /// or invalid, or if the selected remote backend lacks its required
    /// connection parameters.
    pub fn build(self) -> Result<Pipeline> {
        let config = self
            .config
            .ok_or_else(|| MedRagError::ConfigError("config is required".to_string()))?;
        let chunker = DocumentChunker::new(config.chunk_size, config.chunk_overlap)?;
        let provider = match self.provider {
            Some(provider) => provider,
            None => provider_from_config(&config)?,
        };
        let index = VectorIndex::new(provider.dimensions(), config.index_family)?;
        Ok(Pipeline { chunker, provider, index })
    }
}
