pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod query;
pub mod service;

pub use chunking::{chunk_pages, normalize_whitespace, split_window, ChunkingConfig};
pub use embeddings::{CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{EmbeddingError, GenerationError, IndexError, IngestError, QueryError};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use index::{IndexEntry, VectorIndex};
pub use ingest::{build_document_record, collect_file_passages, digest_file, discover_pdf_files};
pub use llm::{ChatModel, GeminiChatClient, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};
pub use models::{
    DocumentRecord, IngestedDocument, IngestionOptions, IngestionReport, Passage, QueryAnswer,
    ScoredPassage,
};
pub use query::{build_grounding_prompt, DEFAULT_TOP_K, NO_DOCUMENTS_ANSWER, REFUSAL_PHRASE};
pub use service::RagService;
