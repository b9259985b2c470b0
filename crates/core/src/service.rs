use crate::chunking::ChunkingConfig;
use crate::embeddings::Embedder;
use crate::error::{IngestError, QueryError};
use crate::index::VectorIndex;
use crate::ingest::collect_file_passages;
use crate::llm::ChatModel;
use crate::models::{IngestedDocument, IngestionOptions, IngestionReport, QueryAnswer};
use crate::query::{build_grounding_prompt, DEFAULT_TOP_K, NO_DOCUMENTS_ANSWER};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The RAG pipeline service: drives load → chunk → embed → persist at
/// ingestion time and retrieve → prompt → generate at query time.
///
/// Constructed once with its embedding provider and chat client, so every
/// vector written to or queried against the index comes from one model.
/// The index snapshot is a single-writer resource: ingestions serialize on
/// an internal mutex, while queries load the snapshot lock-free and rely
/// on the atomic save.
pub struct RagService<E, C>
where
    E: Embedder,
    C: ChatModel,
{
    embedder: E,
    chat: C,
    options: IngestionOptions,
    index_path: PathBuf,
    top_k: usize,
    ingest_lock: Mutex<()>,
}

impl<E, C> RagService<E, C>
where
    E: Embedder + Send + Sync,
    C: ChatModel + Send + Sync,
{
    pub fn new(embedder: E, chat: C, index_path: impl Into<PathBuf>) -> Self {
        Self {
            embedder,
            chat,
            options: IngestionOptions::default(),
            index_path: index_path.into(),
            top_k: DEFAULT_TOP_K,
            ingest_lock: Mutex::new(()),
        }
    }

    pub fn with_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Ingests a batch of PDF files: per file load → chunk, then one
    /// embedding pass over the whole batch, then a single
    /// load → add → save cycle against the index.
    ///
    /// The first failing file aborts the batch and nothing is committed;
    /// the persisted snapshot stays as it was. A batch that yields no
    /// passages at all (e.g. every page was blank) is a no-op: the index
    /// is neither created nor modified.
    pub fn ingest(&self, files: &[PathBuf]) -> Result<IngestionReport, IngestError> {
        let config = ChunkingConfig::from(&self.options);
        config.validate()?;

        let mut documents = Vec::new();
        let mut passages = Vec::new();
        for path in files {
            let (record, file_passages, _next) = collect_file_passages(path, config, 0)?;
            documents.push(IngestedDocument {
                record,
                passage_count: file_passages.len(),
            });
            passages.extend(file_passages);
        }

        let total_passages = passages.len();
        if total_passages == 0 {
            return Ok(IngestionReport {
                documents,
                total_passages,
            });
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let vectors = self.embedder.embed_many(&texts)?;

        let _guard = self
            .ingest_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut index = VectorIndex::load_or_create(&self.index_path)?;
        index.add(passages, vectors)?;
        index.save()?;

        Ok(IngestionReport {
            documents,
            total_passages,
        })
    }

    /// Answers a question from the indexed passages.
    ///
    /// Before any index has been persisted this returns the fixed
    /// no-documents answer with an empty source list. Otherwise the
    /// question is embedded with the same provider used at ingestion,
    /// the top-k passages are retrieved, and the chat model is invoked
    /// with a grounding prompt built from them. Zero retrieved passages
    /// still go to generation; the prompt's refusal instruction covers
    /// that case.
    pub fn query(&self, question: &str) -> Result<QueryAnswer, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        if !VectorIndex::exists(&self.index_path) {
            return Ok(QueryAnswer {
                answer: NO_DOCUMENTS_ANSWER.to_string(),
                source_passages: Vec::new(),
            });
        }

        let index = VectorIndex::load_or_create(&self.index_path)?;
        let question_vector = self.embedder.embed(question)?;
        let hits = index.search(&question_vector, self.top_k);

        let prompt = build_grounding_prompt(question, &hits);
        let answer = self.chat.complete(&prompt)?;

        Ok(QueryAnswer {
            answer,
            source_passages: hits.into_iter().map(|hit| hit.passage.text).collect(),
        })
    }
}
