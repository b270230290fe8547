//! Error types for the `medrag` crate.

use thiserror::Error;

/// Errors that can occur during chunking, embedding, indexing, and retrieval.
#[derive(Debug, Error)]
pub enum MedRagError {
    /// A vector's width does not match the index dimension.
    #[error("dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch {
        /// The dimension the index was constructed with.
        expected: usize,
        /// The width of the offending vector.
        actual: usize,
    },

    /// The number of vectors and metadata records passed to `add` differ.
    #[error("length mismatch: {vectors} vectors with {metadata} metadata records")]
    LengthMismatch {
        /// Number of vectors in the batch.
        vectors: usize,
        /// Number of metadata records in the batch.
        metadata: usize,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The remote embedding backend could not be reached or authenticated.
    #[error("embedding backend unavailable ({provider}): {message}")]
    BackendUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An embedding request or response failed.
    #[error("embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the underlying vector structure.
    #[error("index error: {0}")]
    IndexError(String),

    /// A persisted index artifact is missing or cannot be decoded.
    #[error("corrupt index artifact: {0}")]
    CorruptIndex(String),

    /// An error in the pipeline orchestration.
    #[error("pipeline error: {0}")]
    PipelineError(String),

    /// An I/O failure while persisting or restoring an index.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for medrag operations.
pub type Result<T> = std::result::Result<T, MedRagError>;
