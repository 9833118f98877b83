use thiserror::Error;

/// Why a single document could not be embedded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbeddingFailure {
    #[error("embedder error: {0}")]
    Backend(String),
    #[error("embedder returned an empty vector")]
    Empty,
    #[error("expected {expected} dimensions, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("component {index} is not a finite number")]
    NonFinite { index: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("embedding failed for document `{id}`: {failure}")]
pub struct EmbeddingError {
    pub id: String,
    pub failure: EmbeddingFailure,
}

impl EmbeddingError {
    pub fn document_id(&self) -> &str {
        &self.id
    }
}

/// Which matrix invariant an entry breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixViolation {
    #[error("not a finite number")]
    NonFinite,
    #[error("outside [-1.0, 1.0]")]
    OutOfRange,
    #[error("diagonal entry is not 1.0")]
    Diagonal,
    #[error("differs from its mirrored entry")]
    Asymmetric,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("threshold {0} is outside [-1.0, 1.0]")]
    InvalidThreshold(f64),
    #[error("similarity matrix entry ({row}, {col}) = {value}: {reason}")]
    InvalidMatrix {
        row: usize,
        col: usize,
        value: f64,
        reason: MatrixViolation,
    },
    #[error("similarity matrix shape mismatch: expected dimension {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
}
