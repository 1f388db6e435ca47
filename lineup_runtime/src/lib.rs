#![forbid(unsafe_code)]

//! Runtime around the lineup engine.
//!
//! Key-value persistence of the lineup stores, an append-only operation
//! journal with replay, the speech controller, and the game session that
//! ties them together. No substitution rules live here; every change
//! goes through `lineup_engine`.

pub mod error;
pub mod journal;
pub mod persistence;
pub mod proto_bridge;
pub mod proto_types;
pub mod replay;
pub mod session;
pub mod speech;
pub mod store_codec;

pub use error::{Result, RuntimeError};
pub use journal::Journal;
pub use persistence::{FileStore, KeyValueStore, MemoryStore};
pub use session::GameSession;
pub use speech::{RecordingSink, SpeechController, SpeechSink, VoiceParams};
