use data_error::FixtureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not load config: {0}")]
    ConfigLoadError(String),

    #[error("Chunk count mismatch: expected {expected}, streamed {actual}")]
    ChunkCountMismatch { expected: u64, actual: u64 },

    #[error(transparent)]
    FixtureError(#[from] FixtureError),
}
