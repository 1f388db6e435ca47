/// Engine.
///
/// Top-level orchestrator. Delegates mutation to transitions, validates
/// via invariants, owns the history stack.
///
/// Strict sequence enforcement, configuration injected once.

use tracing::{debug, info, warn};

use crate::compose::{compose, Announcement};
use crate::config::EngineConfig;
use crate::domain::{Lineup, Outcome, Roster, TeamContext};
use crate::error::{LineupError, Result};
use crate::history::HistoryStack;
use crate::invariants::check_invariants;
use crate::operations::{Operation, OperationEnvelope};
use crate::state::GameState;
use crate::transitions;

/// Stateful engine wrapping the pure transition layer.
#[derive(Debug, Clone)]
pub struct LineupEngine {
    roster: Roster,
    config: EngineConfig,
    state: GameState,
    history: HistoryStack<GameState>,
    last_sequence: u64,
}

impl LineupEngine {
    /// Start a game from its starting lineup.
    pub fn new(roster: Roster, starting: Lineup, config: EngineConfig) -> Result<Self> {
        let state = GameState::from_lineup(starting, &roster)?;
        Ok(Self::from_state(roster, state, config))
    }

    /// Resume from a previously saved state. History starts empty.
    pub fn from_state(roster: Roster, state: GameState, config: EngineConfig) -> Self {
        let history = HistoryStack::new(config.history_depth);
        Self {
            roster,
            config,
            state,
            history,
            last_sequence: 0,
        }
    }

    /// Continue numbering after operations already journaled elsewhere.
    pub fn with_last_sequence(mut self, sequence: u64) -> Self {
        self.last_sequence = sequence;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply a single operation:
    ///   1. Delegate to transitions on a clone
    ///   2. Validate invariants on the candidate
    ///   3. Snapshot the old state and commit, only when something changed
    ///
    /// On any error the previous state stays in place.
    pub fn apply(&mut self, op: Operation) -> Result<Outcome> {
        let outcome = match op {
            Operation::Undo => self.step_back(),
            Operation::Redo => self.step_forward(),
            _ => self.apply_transition(&op)?,
        };
        if outcome.is_applied() {
            self.last_sequence += 1;
        }
        Ok(outcome)
    }

    /// Apply an operation read back from a journal. Its sequence must be
    /// exactly one past the last applied one.
    pub fn apply_envelope(&mut self, envelope: &OperationEnvelope) -> Result<Outcome> {
        let expected = self.last_sequence + 1;
        if envelope.sequence != expected {
            return Err(LineupError::Sequence {
                expected,
                got: envelope.sequence,
            });
        }
        let outcome = self.apply(envelope.op)?;
        if !outcome.is_applied() {
            return Err(LineupError::Malformed(format!(
                "journal entry {} ({}) did not apply: {:?}",
                envelope.sequence,
                envelope.op.name(),
                outcome
            )));
        }
        Ok(outcome)
    }

    fn apply_transition(&mut self, op: &Operation) -> Result<Outcome> {
        let (candidate, outcome) = transitions::apply(&self.state, &self.roster, &self.config, op)?;
        match outcome {
            Outcome::Applied => {}
            Outcome::Unchanged => {
                debug!(op = op.name(), "no change");
                return Ok(outcome);
            }
            Outcome::Ineligible(reason) => {
                info!(op = op.name(), %reason, "operation not applied");
                return Ok(outcome);
            }
        }
        if let Err(err) = check_invariants(&candidate) {
            warn!(op = op.name(), %err, "operation rejected");
            return Err(err);
        }
        let previous = std::mem::replace(&mut self.state, candidate);
        self.history.push_snapshot(previous);
        debug!(op = op.name(), sequence = self.last_sequence + 1, "applied");
        Ok(outcome)
    }

    /// Restore the state before the last applied operation. Counts as an
    /// operation of its own.
    pub fn undo(&mut self) -> Outcome {
        self.apply(Operation::Undo).unwrap_or(Outcome::Unchanged)
    }

    pub fn redo(&mut self) -> Outcome {
        self.apply(Operation::Redo).unwrap_or(Outcome::Unchanged)
    }

    fn step_back(&mut self) -> Outcome {
        match self.history.undo(self.state.clone()) {
            Some(previous) => {
                self.state = previous;
                debug!(remaining = self.history.undo_len(), "undo");
                Outcome::Applied
            }
            None => Outcome::Unchanged,
        }
    }

    fn step_forward(&mut self) -> Outcome {
        match self.history.redo(self.state.clone()) {
            Some(next) => {
                self.state = next;
                debug!("redo");
                Outcome::Applied
            }
            None => Outcome::Unchanged,
        }
    }

    /// Compose the announcement for everything since the last commit.
    pub fn compose(&self, context: &TeamContext) -> Announcement {
        compose(&self.state, &self.roster, context, &self.config)
    }

    /// Apply an ordered sequence of operations, stopping at the first error.
    pub fn apply_all(&mut self, ops: &[Operation]) -> Result<Vec<Outcome>> {
        ops.iter().map(|op| self.apply(*op)).collect()
    }
}
