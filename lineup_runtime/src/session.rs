//! Game session: engine + key-value store + journal.
//!
//! Apply-then-persist order:
//!   1. engine.apply(op): rejections return here and touch nothing
//!   2. write the state records to the store
//!   3. append the operation to the journal
//!
//! In-memory state is the source of truth. Steps 2 and 3 are best
//! effort: a failure is logged and counted, never rolled back. After a
//! failed append the journal has a gap, so journaling stops for the rest
//! of the session and the store, which carries the operation sequence,
//! takes precedence on the next resume.

use std::path::Path;

use tracing::{info, warn};

use lineup_engine::hashing::canonical_hash;
use lineup_engine::{
    Announcement, EngineConfig, GameState, Lineup, LineupEngine, Operation, OperationEnvelope,
    Outcome, Roster, TeamContext,
};

use crate::error::{Result, RuntimeError};
use crate::journal::Journal;
use crate::persistence::{keys, FileStore, KeyValueStore};
use crate::replay;
use crate::speech::{SpeechController, SpeechSink};
use crate::store_codec::{load_game, save_game, save_sequence, save_state};

pub struct GameSession<S: KeyValueStore> {
    engine: LineupEngine,
    store: S,
    journal: Option<Journal>,
    /// False once the journal misses an applied operation.
    journal_in_sync: bool,
    write_failures: u64,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Begin a new game. The journal, if any, must be empty.
    pub fn start(
        store: S,
        journal: Option<Journal>,
        roster: Roster,
        starting: Lineup,
        config: EngineConfig,
    ) -> Result<Self> {
        if let Some(journal) = &journal {
            if journal.last_sequence() != 0 {
                return Err(RuntimeError::Journal(format!(
                    "cannot start a new game on a journal with {} entries",
                    journal.last_sequence()
                )));
            }
        }
        let engine = LineupEngine::new(roster, starting, config)?;
        let mut session = Self {
            engine,
            store,
            journal,
            journal_in_sync: true,
            write_failures: 0,
        };
        session.persist_all();
        info!(team = %session.engine.roster().name, "game started");
        Ok(session)
    }

    /// Pick up a saved game. `Ok(None)` when the store holds no game.
    ///
    /// With a journal that reaches the stored sequence the engine is
    /// rebuilt by replay, which also restores undo history; the journal
    /// wins if the stored records disagree with it. A journal behind the
    /// stored sequence has lost operations: the store wins, history starts
    /// empty and journaling stays off.
    pub fn resume(store: S, journal: Option<Journal>) -> Result<Option<Self>> {
        let loaded = load_game(&store);
        let Some(stored) = loaded.state else {
            return Ok(None);
        };
        if !loaded.fallbacks.is_empty() {
            warn!(keys = ?loaded.fallbacks, "resumed with default records");
        }

        let entries = match &journal {
            Some(journal) => journal.load_all()?,
            None => Vec::new(),
        };
        let journaled = entries.last().map(|e| e.sequence).unwrap_or(0);
        let stored_ahead = loaded
            .sequence
            .filter(|&stored| journal.is_some() && journaled < stored);

        let (engine, journal_in_sync) = if let Some(sequence) = stored_ahead {
            warn!(
                journaled,
                stored = sequence,
                "journal is behind the stored game, resuming from the store"
            );
            let engine = LineupEngine::from_state(loaded.roster, stored, loaded.config).with_last_sequence(sequence);
            (engine, false)
        } else if entries.is_empty() {
            let sequence = loaded.sequence.unwrap_or(0);
            let engine = LineupEngine::from_state(loaded.roster, stored, loaded.config).with_last_sequence(sequence);
            (engine, true)
        } else {
            let engine = replay::rebuild_engine(&loaded.roster, &stored.starting, &loaded.config, &entries)?;
            if engine.state() != &stored {
                warn!(entries = entries.len(), "stored records disagree with the journal, using the journal");
            }
            (engine, true)
        };

        let mut session = Self {
            engine,
            store,
            journal,
            journal_in_sync,
            write_failures: 0,
        };
        if loaded.reset || !loaded.fallbacks.is_empty() {
            session.persist_all();
        }
        info!(sequence = session.engine.last_sequence(), "game resumed");
        Ok(Some(session))
    }

    /// Apply one operation, then persist and journal it if it changed
    /// anything.
    pub fn apply(&mut self, op: Operation) -> Result<Outcome> {
        let outcome = self.engine.apply(op)?;
        if outcome.is_applied() {
            self.persist();
            self.record(OperationEnvelope {
                sequence: self.engine.last_sequence(),
                op,
            });
        }
        Ok(outcome)
    }

    pub fn undo(&mut self) -> Result<Outcome> {
        self.apply(Operation::Undo)
    }

    pub fn redo(&mut self) -> Result<Outcome> {
        self.apply(Operation::Redo)
    }

    /// The announcement was read; the current lineup becomes the new baseline.
    pub fn commit_announcement(&mut self) -> Result<Outcome> {
        self.apply(Operation::CommitAnnouncement)
    }

    pub fn compose(&self, context: &TeamContext) -> Announcement {
        self.engine.compose(context)
    }

    /// Compose and read out the pending announcement. Any utterance
    /// still playing is cut off.
    pub fn announce<K: SpeechSink>(
        &self,
        context: &TeamContext,
        speech: &mut SpeechController<K>,
    ) -> Announcement {
        let announcement = self.compose(context);
        speech.speak(&announcement.speech_text());
        announcement
    }

    /// Rebuild from the journal and check it against the live state.
    /// Returns the replayed state and its hash.
    pub fn replay_full(&self) -> Result<(GameState, String)> {
        if !self.journal_in_sync {
            return Err(RuntimeError::Journal(
                "journal is missing operations of this game".to_string(),
            ));
        }
        let entries = match &self.journal {
            Some(journal) => journal.load_all()?,
            None => return Err(RuntimeError::Journal("session has no journal".to_string())),
        };
        let state = self.engine.state();
        let (replayed, hash) =
            replay::rebuild_state(self.engine.roster(), &state.starting, self.engine.config(), &entries)?;
        if &replayed != state {
            warn!(%hash, "replay diverges from the live state");
        }
        Ok((replayed, hash))
    }

    fn persist_all(&mut self) {
        if let Err(err) = save_game(
            &mut self.store,
            self.engine.roster(),
            self.engine.config(),
            self.engine.state(),
            self.engine.last_sequence(),
        ) {
            warn!(%err, "game save failed");
            self.write_failures += 1;
        }
    }

    fn persist(&mut self) {
        let saved = save_state(&mut self.store, self.engine.state())
            .and_then(|()| save_sequence(&mut self.store, self.engine.last_sequence()));
        if let Err(err) = saved {
            warn!(%err, "state save failed");
            self.write_failures += 1;
        }
    }

    fn record(&mut self, envelope: OperationEnvelope) {
        if !self.journal_in_sync {
            return;
        }
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        if let Err(err) = journal.append(&envelope) {
            warn!(
                %err,
                sequence = envelope.sequence,
                op = envelope.op.name(),
                "journal append failed, journaling stops for this session"
            );
            self.write_failures += 1;
            self.journal_in_sync = false;
        }
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn engine(&self) -> &LineupEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// False once the journal has missed an operation of this game.
    pub fn journal_in_sync(&self) -> bool {
        self.journal_in_sync
    }

    pub fn current_hash(&self) -> Result<String> {
        Ok(canonical_hash(self.engine.state())?)
    }

    pub fn current_sequence(&self) -> u64 {
        self.engine.last_sequence()
    }

    /// Store or journal writes that failed since the session opened.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }
}

impl GameSession<FileStore> {
    /// Open a game directory:
    ///   <dir>/store/<key>.json
    ///   <dir>/operations.log
    /// Resumes a saved game if there is one, otherwise starts from
    /// `roster` and `starting`.
    pub fn open_dir(
        dir: &Path,
        roster: Roster,
        starting: Lineup,
        config: EngineConfig,
    ) -> Result<Self> {
        let store = FileStore::new(dir.join("store"));
        let journal = Journal::open(&dir.join("operations.log"))?;
        let saved = store.get(keys::STARTING_BATTING_ORDER)?.is_some();
        if journal.last_sequence() > 0 || saved {
            if let Some(session) = Self::resume(store, Some(journal))? {
                return Ok(session);
            }
            return Err(RuntimeError::Journal(format!(
                "{} has journal entries but no saved game",
                dir.display()
            )));
        }
        Self::start(store, Some(journal), roster, starting, config)
    }
}
