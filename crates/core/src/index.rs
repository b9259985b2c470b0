use crate::error::IndexError;
use crate::models::{Passage, ScoredPassage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub passage: Passage,
    pub vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    version: u32,
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

/// Persistent nearest-neighbor store over (vector, passage) entries.
///
/// The whole index lives in memory and is persisted as a single JSON
/// snapshot. `save` writes to a sibling temp file and renames it over the
/// snapshot, so a concurrent load sees either the old or the new state,
/// never a half-written one.
#[derive(Debug)]
pub struct VectorIndex {
    path: PathBuf,
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Whether a snapshot has ever been persisted at `path`.
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Loads the persisted snapshot, or returns an empty unsaved index
    /// bound to `path` when none has been written yet. A present but
    /// unreadable snapshot is an error, not an empty index.
    pub fn load_or_create(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                dimensions: None,
                entries: Vec::new(),
            });
        }

        let raw = fs::read_to_string(path)?;
        let snapshot: IndexSnapshot = serde_json::from_str(&raw)?;

        Ok(Self {
            path: path.to_path_buf(),
            dimensions: snapshot.dimensions,
            entries: snapshot.entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Appends entries. Always appends: re-adding passages from a
    /// previously ingested file accumulates duplicates.
    ///
    /// The first successful add establishes the index dimensionality;
    /// every later vector must match it. On any mismatch the index is
    /// left unchanged.
    pub fn add(&mut self, passages: Vec<Passage>, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        if passages.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                passages: passages.len(),
                vectors: vectors.len(),
            });
        }

        let expected = match (self.dimensions, vectors.first()) {
            (Some(dims), _) => dims,
            (None, Some(first)) => first.len(),
            (None, None) => return Ok(()),
        };

        for vector in &vectors {
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        self.dimensions = Some(expected);
        self.entries.extend(
            passages
                .into_iter()
                .zip(vectors)
                .map(|(passage, vector)| IndexEntry { passage, vector }),
        );

        Ok(())
    }

    /// Returns up to `k` entries ranked by cosine similarity to
    /// `query_vector`, highest first. An empty index returns an empty
    /// list.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Vec<ScoredPassage> {
        let mut scored: Vec<ScoredPassage> = self
            .entries
            .iter()
            .map(|entry| ScoredPassage {
                passage: entry.passage.clone(),
                score: cosine_similarity(query_vector, &entry.vector),
            })
            .collect();

        scored.sort_by(|left, right| right.score.total_cmp(&left.score));
        scored.truncate(k);
        scored
    }

    /// Durably persists the full current state. The snapshot is written
    /// to a temp file and renamed into place in one step; on failure the
    /// previously saved snapshot remains intact.
    pub fn save(&self) -> Result<(), IndexError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = IndexSnapshot {
            version: SNAPSHOT_VERSION,
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}
