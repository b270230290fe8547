//! # medrag
//!
//! Biomedical document chunking, embedding, and ID-mapped
//! approximate-nearest-neighbor retrieval.
//!
//! This crate provides:
//! - [`DocumentChunker`] — sliding-window chunking of parsed documents
//! - [`EmbeddingProvider`] — capability boundary over embedding backends,
//!   with a deterministic [`MockEmbeddingProvider`] and a remote
//!   [`VertexEmbeddingProvider`]
//! - [`VectorIndex`] — ID-mapped nearest-neighbor index with pluggable
//!   families (flat, inverted-file, graph) and on-disk persistence
//! - [`Pipeline`] — ingestion and search orchestration over the three
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use medrag::{Pipeline, RagConfig};
//!
//! let config = RagConfig::builder().chunk_size(512).chunk_overlap(50).build()?;
//! let mut pipeline = Pipeline::builder().config(config).build()?;
//!
//! let chunks = pipeline.ingest(&documents).await?;
//! let hits = pipeline.search("tumor microenvironment", 5).await?;
//! for hit in hits {
//!     println!("{:.4}  {}", hit.score, hit.metadata["chunk_id"]);
//! }
//! ```
//!
//! Document acquisition and parsing are external concerns: loaders produce
//! the [`Document`] tree, and this crate takes it from there.

mod backend;
mod graph;
mod ivf;

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod mock;
pub mod pipeline;
pub mod vertex;

pub use chunking::{DocumentChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use config::{
    EmbeddingBackend, RagConfig, RagConfigBuilder, VertexSettings, DEFAULT_DIMENSIONS,
};
pub use document::{Chunk, ChunkType, Document, Metadata, SearchHit, Section};
pub use embedding::{provider_from_config, EmbeddingProvider};
pub use error::{MedRagError, Result};
pub use index::{IndexFamily, VectorIndex};
pub use mock::MockEmbeddingProvider;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use vertex::VertexEmbeddingProvider;
