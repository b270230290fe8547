//! Configuration for the ingestion and retrieval pipeline.
//!
//! Configuration is an explicit value constructed once at startup and passed
//! into the [`Pipeline`](crate::Pipeline) and provider constructors — there is
//! no process-wide settings singleton.

use crate::chunking::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::error::{MedRagError, Result};
use crate::index::IndexFamily;

/// Default embedding dimension shared by both provider variants.
pub const DEFAULT_DIMENSIONS: usize = 768;

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingBackend {
    /// Deterministic hash-seeded vectors; no network, no credentials.
    #[default]
    Mock,
    /// The Vertex AI text-embedding REST backend.
    Vertex,
}

/// Connection parameters for the Vertex AI embedding backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexSettings {
    /// Google Cloud project id. Required for the remote backend.
    pub project_id: Option<String>,
    /// Google Cloud region hosting the model endpoint.
    pub region: String,
    /// OAuth2 bearer token used to authenticate requests.
    pub access_token: Option<String>,
    /// Embedding model name.
    pub model: String,
}

impl Default for VertexSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            region: "us-central1".to_string(),
            access_token: None,
            model: crate::vertex::DEFAULT_MODEL.to_string(),
        }
    }
}

impl VertexSettings {
    /// Read connection parameters from the environment.
    ///
    /// Recognized variables: `VERTEX_PROJECT_ID`, `VERTEX_REGION`
    /// (default `us-central1`), `VERTEX_ACCESS_TOKEN`, `VERTEX_EMBED_MODEL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            project_id: std::env::var("VERTEX_PROJECT_ID").ok(),
            region: std::env::var("VERTEX_REGION").unwrap_or(defaults.region),
            access_token: std::env::var("VERTEX_ACCESS_TOKEN").ok(),
            model: std::env::var("VERTEX_EMBED_MODEL").unwrap_or(defaults.model),
        }
    }
}

/// Configuration parameters for chunking, embedding, and indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Which index family backs the vector index.
    pub index_family: IndexFamily,
    /// Embedding dimension used by the mock provider.
    pub dimensions: usize,
    /// Which embedding backend to construct.
    pub backend: EmbeddingBackend,
    /// Connection parameters for the Vertex backend.
    pub vertex: VertexSettings,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            index_family: IndexFamily::Flat,
            dimensions: DEFAULT_DIMENSIONS,
            backend: EmbeddingBackend::Mock,
            vertex: VertexSettings::default(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a validated [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a configuration from the environment.
    ///
    /// `USE_VERTEX=true` selects the remote backend; the Vertex connection
    /// parameters are read per [`VertexSettings::from_env`]. Chunking and
    /// index parameters keep their defaults.
    pub fn from_env() -> Self {
        let use_vertex = std::env::var("USE_VERTEX")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            backend: if use_vertex { EmbeddingBackend::Vertex } else { EmbeddingBackend::Mock },
            vertex: VertexSettings::from_env(),
            ..Self::default()
        }
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the index family backing the vector index.
    pub fn index_family(mut self, family: IndexFamily) -> Self {
        self.config.index_family = family;
        self
    }

    /// Set the embedding dimension used by the mock provider.
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Set the embedding backend to construct.
    pub fn backend(mut self, backend: EmbeddingBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the Vertex connection parameters.
    pub fn vertex(mut self, vertex: VertexSettings) -> Self {
        self.config.vertex = vertex;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `dimensions == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(MedRagError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(MedRagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.dimensions == 0 {
            return Err(MedRagError::ConfigError(
                "dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_overlap_not_smaller_than_chunk_size() {
        let err = RagConfig::builder().chunk_size(64).chunk_overlap(64).build();
        assert!(matches!(err, Err(MedRagError::ConfigError(_))));

        let err = RagConfig::builder().chunk_size(64).chunk_overlap(100).build();
        assert!(matches!(err, Err(MedRagError::ConfigError(_))));
    }

    #[test]
    fn builder_rejects_zero_chunk_size() {
        let err = RagConfig::builder().chunk_size(0).chunk_overlap(0).build();
        assert!(matches!(err, Err(MedRagError::ConfigError(_))));
    }

    #[test]
    fn defaults_build_cleanly() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.dimensions, DEFAULT_DIMENSIONS);
        assert_eq!(config.backend, EmbeddingBackend::Mock);
    }
}
