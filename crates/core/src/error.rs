use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model unavailable: {0}")]
    Unavailable(String),

    #[error("embedding model rejected input: {0}")]
    RejectedInput(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index snapshot unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("vector dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("passage count {passages} does not match vector count {vectors}")]
    CountMismatch { passages: usize, vectors: usize },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("chat model returned {status}: {details}")]
    Api { status: u16, details: String },

    #[error("chat model response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to load document {path}: {details}")]
    DocumentLoad { path: String, details: String },

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
