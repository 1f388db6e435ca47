use thiserror::Error;

use lineup_engine::LineupError;

/// Failures of the runtime collaborators. Engine rejections pass through
/// unchanged as [`RuntimeError::Lineup`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("protobuf decode: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("journal: {0}")]
    Journal(String),
    #[error(transparent)]
    Lineup(#[from] LineupError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
