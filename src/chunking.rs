//! Sliding-window document chunking.
//!
//! [`DocumentChunker`] turns a parsed [`Document`] into an ordered sequence of
//! overlapping [`Chunk`]s: first the title, then the abstract, then every
//! paragraph of every section in document order, depth-first through
//! subsections. Offsets are character offsets, so multibyte UTF-8 text never
//! splits a code point.

use std::collections::HashMap;

use crate::document::{Chunk, ChunkType, Document, Section};
use crate::error::{MedRagError, Result};

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 512;
/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Splits documents into fixed-size character windows with overlap.
///
/// Chunk ids are fully deterministic: `{document_id}_chunk_{chunk_index}`.
/// The `chunk_index` counter is global across all units of one document, so
/// the indices of a document's chunks are exactly `0..N-1` in emission order.
///
/// # Example
///
/// ```rust,ignore
/// use medrag::DocumentChunker;
///
/// let chunker = DocumentChunker::new(512, 50)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    chunk_size: usize,
    overlap: usize,
}

impl DocumentChunker {
    /// Create a new `DocumentChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::ConfigError`] if `chunk_size == 0` or
    /// `overlap >= chunk_size`. Validating here keeps the window loop free of
    /// termination hazards.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(MedRagError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(MedRagError::ConfigError(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Split a document into chunks.
    ///
    /// Pure with respect to the document. Empty or absent units (no title,
    /// no abstract, empty paragraphs) contribute zero chunks.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut index = 0;

        if !document.title.is_empty() {
            self.window(document, &document.title, ChunkType::Title, &mut index, &mut chunks);
        }
        if let Some(abstract_text) = &document.abstract_text {
            if !abstract_text.is_empty() {
                self.window(document, abstract_text, ChunkType::Abstract, &mut index, &mut chunks);
            }
        }
        for section in &document.sections {
            self.walk_section(document, section, &mut index, &mut chunks);
        }

        chunks
    }

    /// Emit body chunks for a section's paragraphs, then recurse into its
    /// subsections (depth-first, document order).
    fn walk_section(
        &self,
        document: &Document,
        section: &Section,
        index: &mut usize,
        out: &mut Vec<Chunk>,
    ) {
        for paragraph in &section.paragraphs {
            if !paragraph.is_empty() {
                self.window(document, paragraph, ChunkType::Body, index, out);
            }
        }
        for subsection in &section.subsections {
            self.walk_section(document, subsection, index, out);
        }
    }

    /// Slide a window of `chunk_size` characters over one text unit,
    /// advancing `chunk_size - overlap` characters per step.
    fn window(
        &self,
        document: &Document,
        text: &str,
        chunk_type: ChunkType,
        index: &mut usize,
        out: &mut Vec<Chunk>,
    ) {
        let chars: Vec<char> = text.chars().collect();
        // Strictly positive by construction, so the window always advances.
        let step = self.chunk_size - self.overlap;
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let chunk_text: String = chars[start..end].iter().collect();

            let mut metadata: HashMap<String, String> = document.metadata.clone();
            metadata.insert("source".to_string(), document.source.clone());
            metadata.insert("section".to_string(), chunk_type.as_str().to_string());

            out.push(Chunk {
                chunk_id: format!("{}_chunk_{}", document.id, *index),
                document_id: document.id.clone(),
                text: chunk_text,
                chunk_index: *index,
                chunk_type,
                metadata,
                char_start: start,
                char_end: end,
            });
            *index += 1;

            if end == chars.len() {
                break;
            }
            start += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, abstract_text: Option<&str>, sections: Vec<Section>) -> Document {
        Document {
            id: "doc1".to_string(),
            title: title.to_string(),
            abstract_text: abstract_text.map(str::to_string),
            sections,
            source: "pmc".to_string(),
            has_full_text: true,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn title_and_abstract_yield_one_chunk_each() {
        let chunker = DocumentChunker::new(256, 32).unwrap();
        let chunks =
            chunker.chunk(&doc("Cancer treatment", Some("New immunotherapy approach"), vec![]));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type, ChunkType::Title);
        assert_eq!(chunks[1].chunk_type, ChunkType::Abstract);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[1].char_start, 0);
        assert_eq!(chunks[0].text, "Cancer treatment");
        assert_eq!(chunks[1].text, "New immunotherapy approach");
    }

    #[test]
    fn long_unit_is_windowed_with_overlap() {
        let chunker = DocumentChunker::new(8, 4).unwrap();
        let text = "abcdefghijkl"; // 12 chars
        let chunks = chunker.chunk(&doc(text, None, vec![]));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "abcdefgh");
        assert_eq!((chunks[0].char_start, chunks[0].char_end), (0, 8));
        assert_eq!(chunks[1].text, "efghijkl");
        assert_eq!((chunks[1].char_start, chunks[1].char_end), (4, 12));
    }

    #[test]
    fn chunk_indices_are_contiguous_across_units() {
        let chunker = DocumentChunker::new(16, 4).unwrap();
        let section = Section {
            title: Some("Methods".to_string()),
            paragraphs: vec!["first paragraph of the methods section".to_string()],
            subsections: vec![Section {
                title: None,
                paragraphs: vec!["nested paragraph".to_string()],
                subsections: vec![],
            }],
        };
        let chunks = chunker.chunk(&doc("A title", Some("An abstract"), vec![section]));

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.chunk_id, format!("doc1_chunk_{i}"));
        }
        assert_eq!(chunks.last().unwrap().chunk_type, ChunkType::Body);
        assert_eq!(chunks.last().unwrap().text, "nested paragraph");
    }

    #[test]
    fn empty_units_are_skipped() {
        let chunker = DocumentChunker::new(64, 8).unwrap();
        let section = Section {
            title: None,
            paragraphs: vec![String::new()],
            subsections: vec![],
        };
        assert!(chunker.chunk(&doc("", None, vec![section])).is_empty());
        assert!(chunker.chunk(&doc("", Some(""), vec![])).is_empty());
    }

    #[test]
    fn multibyte_text_is_split_on_character_boundaries() {
        let chunker = DocumentChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk(&doc("αβγδεζη", None, vec![]));

        assert_eq!(chunks[0].text, "αβγδ");
        assert_eq!((chunks[0].char_start, chunks[0].char_end), (0, 4));
        assert_eq!(chunks[1].text, "δεζη");
    }

    #[test]
    fn metadata_carries_source_and_section() {
        let chunker = DocumentChunker::new(64, 8).unwrap();
        let chunks = chunker.chunk(&doc("A title", None, vec![]));
        assert_eq!(chunks[0].metadata["source"], "pmc");
        assert_eq!(chunks[0].metadata["section"], "title");
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(DocumentChunker::new(0, 0), Err(MedRagError::ConfigError(_))));
        assert!(matches!(DocumentChunker::new(8, 8), Err(MedRagError::ConfigError(_))));
        assert!(matches!(DocumentChunker::new(8, 9), Err(MedRagError::ConfigError(_))));
    }
}
