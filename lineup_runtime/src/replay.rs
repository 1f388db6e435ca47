//! Replay: rebuild a game from its starting lineup and journal.
//!
//! All rules stay in the engine. Every journaled entry must apply again
//! at its own sequence number; anything else means the journal and the
//! engine disagree and replay stops with an error.

use lineup_engine::hashing::canonical_hash;
use lineup_engine::{EngineConfig, GameState, Lineup, LineupEngine, OperationEnvelope, Roster};

use crate::error::Result;

/// Fresh engine with every entry applied, history included, so undo and
/// redo keep working after a restart.
pub fn rebuild_engine(
    roster: &Roster,
    starting: &Lineup,
    config: &EngineConfig,
    entries: &[OperationEnvelope],
) -> Result<LineupEngine> {
    let mut engine = LineupEngine::new(roster.clone(), starting.clone(), config.clone())?;
    for entry in entries {
        engine.apply_envelope(entry)?;
    }
    Ok(engine)
}

/// Final state and its canonical hash.
pub fn rebuild_state(
    roster: &Roster,
    starting: &Lineup,
    config: &EngineConfig,
    entries: &[OperationEnvelope],
) -> Result<(GameState, String)> {
    let engine = rebuild_engine(roster, starting, config, entries)?;
    let hash = canonical_hash(engine.state())?;
    Ok((engine.state().clone(), hash))
}

pub fn rebuild_hash(
    roster: &Roster,
    starting: &Lineup,
    config: &EngineConfig,
    entries: &[OperationEnvelope],
) -> Result<String> {
    let (_, hash) = rebuild_state(roster, starting, config, entries)?;
    Ok(hash)
}
