use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested source file. The filename doubles as the stable document
/// identifier; re-uploading the same filename appends new passages rather
/// than replacing old ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub document_id: String,
    pub source_path: String,
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
}

/// A contiguous slice of a document's extracted text, the unit of
/// embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub passage_id: String,
    pub document_id: String,
    pub page: u32,
    pub passage_index: u64,
    pub text: String,
}

/// A retrieved passage paired with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// The synthesized answer to one question, with the passage texts that
/// grounded it in ranked order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub source_passages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub chunk_max_chars: usize,
    pub chunk_overlap_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunk_max_chars: 1_000,
            chunk_overlap_chars: 150,
        }
    }
}

/// What one successful ingestion batch produced.
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub documents: Vec<IngestedDocument>,
    pub total_passages: usize,
}

#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub record: DocumentRecord,
    pub passage_count: usize,
}

impl IngestionReport {
    pub fn is_empty(&self) -> bool {
        self.total_passages == 0
    }
}
