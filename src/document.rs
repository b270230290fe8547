//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An opaque metadata object attached to an indexed vector.
///
/// In practice this is the serialized [`Chunk`], but the index treats it as
/// caller-supplied data and round-trips it unchanged.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A section of a document: a title, its paragraphs, and nested subsections.
///
/// Sections form an owned tree — each section exclusively owns its children,
/// and traversal is top-down only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    /// Optional section heading.
    pub title: Option<String>,
    /// Paragraph texts in document order.
    pub paragraphs: Vec<String>,
    /// Nested subsections in document order.
    #[serde(default)]
    pub subsections: Vec<Section>,
}

/// A parsed source document, as produced by an external loader.
///
/// Documents are consumed once by the chunker and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable external identifier (e.g. a PMC or CORD-19 id).
    pub id: String,
    /// The document title.
    pub title: String,
    /// The abstract, when present.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Body sections in document order.
    pub sections: Vec<Section>,
    /// Provenance tag (e.g. `"pmc"` or `"cord19"`).
    pub source: String,
    /// Whether the full text was available to the loader.
    pub has_full_text: bool,
    /// Free-form metadata supplied by the loader.
    pub metadata: HashMap<String, String>,
}

/// The kind of text unit a chunk was cut from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    /// The document title.
    Title,
    /// The document abstract.
    Abstract,
    /// A section paragraph.
    Body,
}

impl ChunkType {
    /// The lowercase label used in chunk metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Title => "title",
            ChunkType::Abstract => "abstract",
            ChunkType::Body => "body",
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded text span extracted from a [`Document`] — the unit of embedding
/// and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic chunk identifier: `{document_id}_chunk_{chunk_index}`.
    pub chunk_id: String,
    /// Non-owning back-reference to the originating document.
    pub document_id: String,
    /// The chunk text.
    pub text: String,
    /// Zero-based position within the document's chunk sequence.
    pub chunk_index: usize,
    /// The kind of unit this chunk was cut from.
    pub chunk_type: ChunkType,
    /// Metadata carried with the chunk; always includes `source` and `section`.
    pub metadata: HashMap<String, String>,
    /// Character offset of the chunk start within its source unit.
    pub char_start: usize,
    /// Character offset one past the chunk end within its source unit.
    pub char_end: usize,
}

/// A search result: the metadata recorded at add time plus a distance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The index-assigned vector id.
    pub id: u64,
    /// Raw distance to the query (smaller is closer).
    pub score: f32,
    /// The metadata object recorded when the vector was added.
    pub metadata: Metadata,
}
