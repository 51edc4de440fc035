use thiserror::Error;

/// Errors produced by the postag library.
#[derive(Debug, Error)]
pub enum PosError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tagger returned a label sequence whose length differs from the sentence.
    #[error("tagger returned {actual} labels for {expected} tokens")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("token index {index} out of range for sentence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid model at line {line}: {message}")]
    ModelFormat { line: usize, message: String },

    #[error("model contains no labels")]
    EmptyModel,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid corpus: {0}")]
    Corpus(String),

    #[error("tagging failed at row {row}: {source}")]
    Tagging {
        row: usize,
        #[source]
        source: Box<PosError>,
    },
}

pub type Result<T> = std::result::Result<T, PosError>;
