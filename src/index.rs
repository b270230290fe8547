//! ID-mapped vector index with pluggable families and on-disk persistence.
//!
//! [`VectorIndex`] owns three things the index families never see: the
//! monotonic id allocator, the id→metadata table, and persistence. The
//! family-specific structure lives behind the internal backend seam, so the
//! manager's invariants (id stability, dimension consistency, metadata
//! alignment) hold regardless of which family is configured.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{AnnBackend, FlatBackend};
use crate::document::{Metadata, SearchHit};
use crate::error::{MedRagError, Result};
use crate::graph::GraphBackend;
use crate::ivf::IvfBackend;

/// The families a [`VectorIndex`] can be constructed with.
///
/// | family | needs training before first add | approximate |
/// |---|---|---|
/// | `Flat` | no | no (exact) |
/// | `InvertedFile` | yes, on the first non-empty add batch | yes |
/// | `Graph` | no | yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexFamily {
    /// Exact brute-force scan.
    Flat,
    /// K-means partitioned posting lists; trained on the first add batch.
    InvertedFile,
    /// Graph-based approximate search (external ANN library).
    Graph,
}

impl fmt::Display for IndexFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexFamily::Flat => "flat",
            IndexFamily::InvertedFile => "inverted-file",
            IndexFamily::Graph => "graph",
        })
    }
}

impl FromStr for IndexFamily {
    type Err = MedRagError;

    /// Parse a configuration label. `ivf` and `hnsw` are accepted aliases.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(IndexFamily::Flat),
            "ivf" | "inverted-file" => Ok(IndexFamily::InvertedFile),
            "graph" | "hnsw" => Ok(IndexFamily::Graph),
            other => Err(MedRagError::ConfigError(format!("unsupported index family: {other}"))),
        }
    }
}

/// The native serialized structure: raw contents, independent of family.
///
/// Reloading rebuilds an exact backend over these contents, which is why the
/// family distinction reduces to a generic label across a save/load cycle.
#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    dim: usize,
    family: String,
    vectors: Vec<(u64, Vec<f32>)>,
}

/// One side-car record. The side-car is a flat list of these, with no
/// ordering guarantee beyond correctness of the mapping.
#[derive(Serialize, Deserialize)]
struct MetaRecord {
    id: u64,
    metadata: Metadata,
}

/// A queryable nearest-neighbor structure with externally meaningful ids and
/// attached metadata.
///
/// Not safe for concurrent mutation: a single add/search/save/load must run
/// to completion before another begins. Callers needing concurrent ingestion
/// must serialize access externally.
pub struct VectorIndex {
    dim: usize,
    family: IndexFamily,
    backend: Box<dyn AnnBackend>,
    next_id: u64,
    metadata: BTreeMap<u64, Metadata>,
}

impl VectorIndex {
    /// Create an empty index of the given dimension and family.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::ConfigError`] for a zero dimension, and
    /// [`MedRagError::IndexError`] if the graph structure cannot be created.
    pub fn new(dim: usize, family: IndexFamily) -> Result<Self> {
        if dim == 0 {
            return Err(MedRagError::ConfigError(
                "index dimension must be greater than zero".to_string(),
            ));
        }
        let backend: Box<dyn AnnBackend> = match family {
            IndexFamily::Flat => Box::new(FlatBackend::new()),
            IndexFamily::InvertedFile => Box::new(IvfBackend::new()),
            IndexFamily::Graph => Box::new(GraphBackend::new(dim)?),
        };
        Ok(Self { dim, family, backend, next_id: 0, metadata: BTreeMap::new() })
    }

    /// The dimension fixed at construction.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The family this index was constructed with.
    pub fn family(&self) -> IndexFamily {
        self.family
    }

    /// Number of vectors ever added.
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }

    /// Whether the underlying structure is ready to accept insertions.
    ///
    /// Only the inverted-file family starts untrained; it trains itself on
    /// the first non-empty add batch.
    pub fn is_trained(&self) -> bool {
        self.backend.is_trained()
    }

    /// Add a batch of vectors with caller-supplied metadata.
    ///
    /// Assigns the contiguous id range `[next_id, next_id + n)`, records
    /// `id → metadata` for each, and returns the assigned ids. If the family
    /// requires training and is untrained, it trains on this exact batch
    /// before insertion — the first batch must therefore be representative,
    /// which is a caller responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::LengthMismatch`] when the two batches differ in
    /// length and [`MedRagError::DimensionMismatch`] when any vector's width
    /// differs from the index dimension. All validation happens before any
    /// mutation, so the index is unchanged on failure.
    pub fn add(&mut self, vectors: &[Vec<f32>], metadata: Vec<Metadata>) -> Result<Vec<u64>> {
        if vectors.len() != metadata.len() {
            return Err(MedRagError::LengthMismatch {
                vectors: vectors.len(),
                metadata: metadata.len(),
            });
        }
        for vector in vectors {
            if vector.len() != self.dim {
                return Err(MedRagError::DimensionMismatch {
                    expected: self.dim,
                    actual: vector.len(),
                });
            }
        }
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        if self.backend.needs_training() {
            debug!(family = %self.family, batch = vectors.len(), "training on first batch");
            self.backend.train(vectors)?;
        }

        let ids: Vec<u64> = (self.next_id..self.next_id + vectors.len() as u64).collect();
        for (id, vector) in ids.iter().zip(vectors) {
            self.backend.insert(*id, vector)?;
        }
        for (id, meta) in ids.iter().zip(metadata) {
            self.metadata.insert(*id, meta);
        }
        self.next_id += vectors.len() as u64;

        debug!(added = vectors.len(), total = self.backend.len(), "added vectors");
        Ok(ids)
    }

    /// Search the index with a batch of query vectors.
    ///
    /// For each query row, returns up to `k` hits ordered by ascending raw
    /// distance (smaller is closer), each carrying the metadata recorded at
    /// add time plus the distance as `score`. Fewer than `k` candidates yield
    /// a shorter list — never padded. A query against an empty index returns
    /// an empty hit list, not an error. Result slots with no backing
    /// metadata are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::DimensionMismatch`] when any query's width
    /// differs from the index dimension.
    pub fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<SearchHit>>> {
        for query in queries {
            if query.len() != self.dim {
                return Err(MedRagError::DimensionMismatch {
                    expected: self.dim,
                    actual: query.len(),
                });
            }
        }

        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let candidates = self.backend.search(query, k)?;
            let hits: Vec<SearchHit> = candidates
                .into_iter()
                .filter_map(|(id, score)| {
                    self.metadata
                        .get(&id)
                        .map(|meta| SearchHit { id, score, metadata: meta.clone() })
                })
                .collect();
            results.push(hits);
        }
        Ok(results)
    }

    /// Persist the index to `path`, with the side-car metadata file beside it.
    ///
    /// Writes two co-located files: the native snapshot at `path` and the
    /// `id → metadata` side-car at `path` with a `.meta.json` suffix. Both
    /// artifacts are staged to temporaries and renamed into place; on any
    /// failure the operation is reported failed with no recovery attempted.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = IndexSnapshot {
            dim: self.dim,
            family: self.family.to_string(),
            vectors: self.backend.vectors(),
        };
        let snapshot_bytes = bincode::serialize(&snapshot)
            .map_err(|e| MedRagError::IndexError(format!("failed to encode snapshot: {e}")))?;

        let records: Vec<MetaRecord> = self
            .metadata
            .iter()
            .map(|(id, metadata)| MetaRecord { id: *id, metadata: metadata.clone() })
            .collect();
        let sidecar_bytes = serde_json::to_vec(&records)
            .map_err(|e| MedRagError::IndexError(format!("failed to encode side-car: {e}")))?;

        let sidecar = sidecar_path(path);
        let staged_snapshot = staged_path(path);
        let staged_sidecar = staged_path(&sidecar);
        fs::write(&staged_snapshot, snapshot_bytes)?;
        fs::write(&staged_sidecar, sidecar_bytes)?;
        fs::rename(&staged_snapshot, path)?;
        fs::rename(&staged_sidecar, &sidecar)?;

        info!(
            path = %path.display(),
            vectors = self.backend.len(),
            family = %self.family,
            "saved index"
        );
        Ok(())
    }

    /// Restore an index persisted by [`save`](VectorIndex::save).
    ///
    /// The dimension is recovered from the stored structure and the contents
    /// are rebuilt into an exact backend — the original family distinction
    /// reduces to a generic label. `next_id` resumes at one greater than the
    /// maximum side-car id, or zero when the side-car is empty or absent.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::CorruptIndex`] when the snapshot is missing or
    /// undecodable, or when the side-car exists but cannot be parsed. No
    /// partially-initialized index is returned.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            MedRagError::CorruptIndex(format!("cannot read snapshot {}: {e}", path.display()))
        })?;
        let snapshot: IndexSnapshot = bincode::deserialize(&bytes).map_err(|e| {
            MedRagError::CorruptIndex(format!("cannot decode snapshot {}: {e}", path.display()))
        })?;
        if snapshot.dim == 0 {
            return Err(MedRagError::CorruptIndex(format!(
                "snapshot {} declares a zero dimension",
                path.display()
            )));
        }

        let mut backend = FlatBackend::new();
        for (id, vector) in &snapshot.vectors {
            if vector.len() != snapshot.dim {
                return Err(MedRagError::CorruptIndex(format!(
                    "vector {id} has {} components, snapshot declares {}",
                    vector.len(),
                    snapshot.dim
                )));
            }
            backend.insert(*id, vector)?;
        }

        let sidecar = sidecar_path(path);
        let metadata: BTreeMap<u64, Metadata> = if sidecar.exists() {
            let bytes = fs::read(&sidecar).map_err(|e| {
                MedRagError::CorruptIndex(format!(
                    "cannot read side-car {}: {e}",
                    sidecar.display()
                ))
            })?;
            let records: Vec<MetaRecord> = serde_json::from_slice(&bytes).map_err(|e| {
                MedRagError::CorruptIndex(format!(
                    "cannot decode side-car {}: {e}",
                    sidecar.display()
                ))
            })?;
            records.into_iter().map(|r| (r.id, r.metadata)).collect()
        } else {
            BTreeMap::new()
        };

        let next_id = metadata.keys().next_back().map(|id| id + 1).unwrap_or(0);

        info!(
            path = %path.display(),
            vectors = snapshot.vectors.len(),
            recorded_family = %snapshot.family,
            "loaded index"
        );

        Ok(Self {
            dim: snapshot.dim,
            family: IndexFamily::Flat,
            backend: Box::new(backend),
            next_id,
            metadata,
        })
    }
}

/// Side-car location: `path` with a `.meta.json` suffix in place of its
/// extension (e.g. `medical.idx` → `medical.meta.json`).
fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

fn staged_path(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}
