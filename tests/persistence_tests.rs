//! Save/load round-trip tests for the vector index.

use medrag::{IndexFamily, MedRagError, Metadata, VectorIndex};
use serde_json::json;

fn meta(label: &str) -> Metadata {
    let mut map = Metadata::new();
    map.insert("chunk_id".to_string(), json!(label));
    map
}

fn sample_vectors() -> Vec<Vec<f32>> {
    vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.5, 0.5, 0.0, 0.0],
    ]
}

#[test]
fn round_trip_preserves_dim_count_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical.idx");

    let mut index = VectorIndex::new(4, IndexFamily::Flat).unwrap();
    let vectors = sample_vectors();
    let metadata = vec![meta("a"), meta("b"), meta("c"), meta("d")];
    index.add(&vectors, metadata).unwrap();
    index.save(&path).unwrap();

    let restored = VectorIndex::load(&path).unwrap();
    assert_eq!(restored.dim(), 4);
    assert_eq!(restored.len(), 4);

    // Each original vector still maps to its own metadata.
    for (vector, label) in vectors.iter().zip(["a", "b", "c", "d"]) {
        let results = restored.search(&[vector.clone()], 1).unwrap();
        assert_eq!(results[0][0].metadata["chunk_id"], json!(label));
        assert_eq!(results[0][0].score, 0.0);
    }
}

#[test]
fn round_trip_preserves_search_ordering_and_scores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical.idx");

    let mut index = VectorIndex::new(4, IndexFamily::Flat).unwrap();
    index
        .add(&sample_vectors(), vec![meta("a"), meta("b"), meta("c"), meta("d")])
        .unwrap();

    let query = vec![0.4, 0.6, 0.0, 0.0];
    let before = index.search(&[query.clone()], 3).unwrap();
    index.save(&path).unwrap();

    let restored = VectorIndex::load(&path).unwrap();
    let after = restored.search(&[query], 3).unwrap();

    let before_hits: Vec<(u64, String)> = before[0]
        .iter()
        .map(|h| (h.id, h.metadata["chunk_id"].to_string()))
        .collect();
    let after_hits: Vec<(u64, String)> = after[0]
        .iter()
        .map(|h| (h.id, h.metadata["chunk_id"].to_string()))
        .collect();
    assert_eq!(before_hits, after_hits);
    for (b, a) in before[0].iter().zip(after[0].iter()) {
        assert_eq!(b.score, a.score);
    }
}

#[test]
fn reloaded_index_continues_id_allocation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical.idx");

    let mut index = VectorIndex::new(4, IndexFamily::Flat).unwrap();
    index
        .add(&sample_vectors(), vec![meta("a"), meta("b"), meta("c"), meta("d")])
        .unwrap();
    index.save(&path).unwrap();

    let mut restored = VectorIndex::load(&path).unwrap();
    let ids = restored.add(&[vec![0.0, 0.0, 0.0, 1.0]], vec![meta("e")]).unwrap();
    assert_eq!(ids, vec![4]);
    assert_eq!(restored.len(), 5);
}

#[test]
fn family_reduces_to_a_generic_label_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical.idx");

    let mut index = VectorIndex::new(4, IndexFamily::Graph).unwrap();
    index
        .add(&sample_vectors(), vec![meta("a"), meta("b"), meta("c"), meta("d")])
        .unwrap();
    index.save(&path).unwrap();

    let restored = VectorIndex::load(&path).unwrap();
    assert_eq!(restored.family(), IndexFamily::Flat);
    assert_eq!(restored.len(), 4);

    let results = restored.search(&[vec![0.0, 1.0, 0.0, 0.0]], 1).unwrap();
    assert_eq!(results[0][0].metadata["chunk_id"], json!("b"));
}

#[test]
fn missing_artifact_is_a_corrupt_index_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = VectorIndex::load(&dir.path().join("nothing.idx"));
    assert!(matches!(err, Err(MedRagError::CorruptIndex(_))));
}

#[test]
fn undecodable_artifact_is_a_corrupt_index_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.idx");
    std::fs::write(&path, b"not an index snapshot").unwrap();

    let err = VectorIndex::load(&path);
    assert!(matches!(err, Err(MedRagError::CorruptIndex(_))));
}

#[test]
fn absent_sidecar_restores_contents_with_empty_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical.idx");

    let mut index = VectorIndex::new(4, IndexFamily::Flat).unwrap();
    index
        .add(&sample_vectors(), vec![meta("a"), meta("b"), meta("c"), meta("d")])
        .unwrap();
    index.save(&path).unwrap();
    std::fs::remove_file(dir.path().join("medical.meta.json")).unwrap();

    let restored = VectorIndex::load(&path).unwrap();
    assert_eq!(restored.len(), 4);

    // With no mapping, ids have no backing metadata: hits are dropped
    // silently rather than padded with placeholders.
    let results = restored.search(&[vec![1.0, 0.0, 0.0, 0.0]], 2).unwrap();
    assert!(results[0].is_empty());

    // And id allocation restarts at zero, per the side-car contract.
    let mut restored = restored;
    let ids = restored.add(&[vec![0.0, 0.0, 0.0, 1.0]], vec![meta("e")]).unwrap();
    assert_eq!(ids, vec![0]);
}

#[test]
fn save_writes_both_colocated_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("indexes").join("medical.idx");

    let mut index = VectorIndex::new(4, IndexFamily::Flat).unwrap();
    index.add(&sample_vectors()[..1], vec![meta("a")]).unwrap();
    index.save(&path).unwrap();

    assert!(path.exists());
    assert!(dir.path().join("indexes").join("medical.meta.json").exists());
}
