use thiserror::Error;

use crate::domain::PlayerId;
use crate::position::Position;

/// Hard rejections. The engine state is left untouched whenever one of
/// these is returned.
///
/// "No eligible candidate" answers are not errors; they come back as
/// [`crate::domain::Outcome::Ineligible`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineupError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("position {} is empty", .0.label())]
    EmptyPosition(Position),
    #[error("batting order slot {0} does not exist")]
    InvalidSlot(u8),
    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },
    #[error("malformed data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for LineupError {
    fn from(err: serde_json::Error) -> Self {
        LineupError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LineupError>;
