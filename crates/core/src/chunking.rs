use crate::error::IngestError;
use crate::extractor::PageText;
use crate::models::{IngestionOptions, Passage};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl From<&IngestionOptions> for ChunkingConfig {
    fn from(value: &IngestionOptions) -> Self {
        Self {
            max_chars: value.chunk_max_chars,
            overlap_chars: value.chunk_overlap_chars,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.max_chars == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "max_chars must be greater than zero".to_string(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap_chars {} must be smaller than max_chars {}",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.max_chars - self.overlap_chars
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{a0}', " ")
}

/// Slides a window of `max_chars` characters forward by
/// `max_chars - overlap_chars` until the text is exhausted. Consecutive
/// windows share exactly `overlap_chars` characters; the final window may
/// be shorter. Empty input produces no windows.
pub fn split_window(text: &str, config: ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + config.max_chars).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += config.step();
    }

    windows
}

/// Chunks each page independently, assigning document-wide ordinals
/// starting at `start_index`. Returns the passages and the next free
/// ordinal. Blank pages contribute nothing.
pub fn chunk_pages(
    document_id: &str,
    pages: &[PageText],
    config: ChunkingConfig,
    start_index: u64,
) -> (Vec<Passage>, u64) {
    let mut passages = Vec::new();
    let mut cursor = start_index;

    for page in pages {
        let normalized = normalize_whitespace(&page.text);
        if normalized.is_empty() {
            continue;
        }

        for text in split_window(&normalized, config) {
            let passage_id = make_passage_id(document_id, page.number, cursor, &text);
            passages.push(Passage {
                passage_id,
                document_id: document_id.to_string(),
                page: page.number,
                passage_index: cursor,
                text,
            });
            cursor = cursor.saturating_add(1);
        }
    }

    (passages, cursor)
}

fn make_passage_id(document_id: &str, page: u32, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(page.to_le_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
