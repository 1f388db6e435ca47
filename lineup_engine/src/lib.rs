#![forbid(unsafe_code)]

/// Version of the persisted state layout. Part of the canonical hash.
pub const STATE_VERSION: u32 = 1;

pub mod compose;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod history;
pub mod invariants;
pub mod ledger;
pub mod operations;
pub mod position;
pub mod runners;
pub mod scenario;
pub mod speech_text;
pub mod state;
pub mod tracker;
pub mod transitions;

pub use compose::{Announcement, ChangeKind, Sentence};
pub use config::EngineConfig;
pub use domain::{Ineligibility, Lineup, Outcome, PlayerId, Roster, TeamContext};
pub use engine::LineupEngine;
pub use error::{LineupError, Result};
pub use operations::{Operation, OperationEnvelope};
pub use position::{Base, Position};
pub use state::GameState;
