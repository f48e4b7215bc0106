use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no text could be extracted from {path}")]
    NoText { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no documents could be processed")]
    NoDocuments,
    #[error("analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
