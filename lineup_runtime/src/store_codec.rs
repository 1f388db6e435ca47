//! Store codec: `GameState` <-> per-key JSON records.
//!
//! Saving writes every key. Loading is forgiving: a missing or malformed
//! record falls back to its default and is reported in
//! [`LoadedGame::fallbacks`], so a damaged store never blocks startup.
//!
//! Fallbacks per key:
//!   - team, settings               -> empty roster, default config
//!   - starting order / assignments -> no game in progress
//!   - current order / assignments  -> the starting lineup
//!   - baseline lineup and runners  -> the current ones (nothing pending)
//!   - operation sequence           -> unknown
//!   - everything else              -> empty

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use lineup_engine::domain::{BattingOrder, RunnerAssignment, SubstitutionRecord};
use lineup_engine::invariants::check_invariants;
use lineup_engine::ledger::Ledger;
use lineup_engine::runners::RunnerTracker;
use lineup_engine::{Base, EngineConfig, GameState, Lineup, PlayerId, Position, Roster};

use crate::error::Result;
use crate::persistence::{keys, KeyValueStore};

/// Everything read back from a store.
#[derive(Debug, Clone)]
pub struct LoadedGame {
    pub roster: Roster,
    pub config: EngineConfig,
    /// `None` when no starting lineup was saved.
    pub state: Option<GameState>,
    /// Keys that were missing or malformed and replaced by defaults.
    pub fallbacks: Vec<&'static str>,
    /// The assembled state broke an invariant and was rebuilt from the
    /// starting lineup.
    pub reset: bool,
    /// Sequence of the last operation reflected in `state`. `None` when
    /// unknown or after a reset.
    pub sequence: Option<u64>,
}

/// Assignments as stored: every position present, `null` when empty.
fn assignments_record(lineup: &Lineup) -> BTreeMap<Position, Option<PlayerId>> {
    Position::ALL
        .into_iter()
        .map(|p| (p, lineup.occupant(p)))
        .collect()
}

fn put<S: KeyValueStore, T: Serialize + ?Sized>(store: &mut S, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

pub fn save_roster<S: KeyValueStore>(store: &mut S, roster: &Roster) -> Result<()> {
    put(store, keys::TEAM, roster)
}

pub fn save_config<S: KeyValueStore>(store: &mut S, config: &EngineConfig) -> Result<()> {
    put(store, keys::SETTINGS, config)
}

/// Write the whole state bundle, one record per key.
pub fn save_state<S: KeyValueStore>(store: &mut S, state: &GameState) -> Result<()> {
    put(store, keys::STARTING_BATTING_ORDER, &state.starting.order)?;
    put(store, keys::STARTING_ASSIGNMENTS, &assignments_record(&state.starting))?;
    put(store, keys::BATTING_ORDER, &state.current.order)?;
    put(store, keys::LINEUP_ASSIGNMENTS, &assignments_record(&state.current))?;
    put(store, keys::BASELINE_BATTING_ORDER, &state.baseline.order)?;
    put(store, keys::BASELINE_ASSIGNMENTS, &assignments_record(&state.baseline))?;
    put(store, keys::BASELINE_RUNNERS, &state.baseline_runners)?;
    put(store, keys::USED_PLAYER_INFO, &state.ledger.records)?;
    put(store, keys::REENTERED_PLAYERS, &state.ledger.reentered)?;
    put(store, keys::RUNNER_ASSIGNMENTS, &state.runners.runners)?;
    put(store, keys::REPLACED_RUNNERS, &state.runners.replaced)?;
    put(store, keys::TEMP_RUNNER_BY_ORDER, &state.runners.temp_by_order)?;
    put(store, keys::BENCHED_OUT, &state.benched_out)?;
    debug!(keys = keys::ALL.len(), "state saved");
    Ok(())
}

pub fn save_sequence<S: KeyValueStore>(store: &mut S, sequence: u64) -> Result<()> {
    put(store, keys::OPERATION_SEQUENCE, &sequence)
}

/// Save roster, config, state and sequence together.
pub fn save_game<S: KeyValueStore>(
    store: &mut S,
    roster: &Roster,
    config: &EngineConfig,
    state: &GameState,
    sequence: u64,
) -> Result<()> {
    save_roster(store, roster)?;
    save_config(store, config)?;
    save_state(store, state)?;
    save_sequence(store, sequence)
}

struct Loader<'a, S> {
    store: &'a S,
    fallbacks: Vec<&'static str>,
}

impl<'a, S: KeyValueStore> Loader<'a, S> {
    fn fetch<T: DeserializeOwned>(&mut self, key: &'static str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(key, "record missing, using default");
                self.fallbacks.push(key);
                return None;
            }
            Err(err) => {
                warn!(key, %err, "record unreadable, using default");
                self.fallbacks.push(key);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "record malformed, using default");
                self.fallbacks.push(key);
                None
            }
        }
    }

    fn lineup(
        &mut self,
        order_key: &'static str,
        assignments_key: &'static str,
    ) -> (Option<BattingOrder>, Option<BTreeMap<Position, PlayerId>>) {
        let order = self.fetch::<BattingOrder>(order_key);
        let assignments = self
            .fetch::<BTreeMap<Position, Option<PlayerId>>>(assignments_key)
            .map(|raw| raw.into_iter().filter_map(|(p, id)| id.map(|id| (p, id))).collect());
        (order, assignments)
    }
}

fn merge(
    fallback: &Lineup,
    order: Option<BattingOrder>,
    assignments: Option<BTreeMap<Position, PlayerId>>,
) -> Lineup {
    Lineup {
        order: order.unwrap_or_else(|| fallback.order.clone()),
        assignments: assignments.unwrap_or_else(|| fallback.assignments.clone()),
    }
}

/// Read a saved game back. Never fails on missing or malformed data.
pub fn load_game<S: KeyValueStore>(store: &S) -> LoadedGame {
    let mut loader = Loader {
        store,
        fallbacks: Vec::new(),
    };
    let roster = loader.fetch::<Roster>(keys::TEAM).unwrap_or_default();
    let config = loader.fetch::<EngineConfig>(keys::SETTINGS).unwrap_or_default();

    let starting = match loader.lineup(keys::STARTING_BATTING_ORDER, keys::STARTING_ASSIGNMENTS) {
        (Some(order), Some(assignments)) => Lineup { assignments, order },
        _ => {
            info!("no starting lineup saved");
            return LoadedGame {
                roster,
                config,
                state: None,
                fallbacks: loader.fallbacks,
                reset: false,
                sequence: None,
            };
        }
    };

    let (order, assignments) = loader.lineup(keys::BATTING_ORDER, keys::LINEUP_ASSIGNMENTS);
    let current = merge(&starting, order, assignments);
    let (order, assignments) = loader.lineup(keys::BASELINE_BATTING_ORDER, keys::BASELINE_ASSIGNMENTS);
    let baseline = merge(&current, order, assignments);

    let ledger = Ledger {
        records: loader
            .fetch::<BTreeMap<PlayerId, SubstitutionRecord>>(keys::USED_PLAYER_INFO)
            .unwrap_or_default(),
        reentered: loader
            .fetch::<BTreeSet<PlayerId>>(keys::REENTERED_PLAYERS)
            .unwrap_or_default(),
    };
    let runners = RunnerTracker {
        runners: loader
            .fetch::<BTreeMap<Base, RunnerAssignment>>(keys::RUNNER_ASSIGNMENTS)
            .unwrap_or_default(),
        replaced: loader
            .fetch::<BTreeMap<Base, PlayerId>>(keys::REPLACED_RUNNERS)
            .unwrap_or_default(),
        temp_by_order: loader
            .fetch::<BTreeMap<u8, PlayerId>>(keys::TEMP_RUNNER_BY_ORDER)
            .unwrap_or_default(),
    };
    let baseline_runners = loader
        .fetch::<BTreeMap<Base, RunnerAssignment>>(keys::BASELINE_RUNNERS)
        .unwrap_or_else(|| runners.runners.clone());
    let benched_out = loader
        .fetch::<BTreeSet<PlayerId>>(keys::BENCHED_OUT)
        .unwrap_or_default();
    let sequence = loader.fetch::<u64>(keys::OPERATION_SEQUENCE);

    let state = GameState {
        starting: starting.clone(),
        current,
        baseline,
        baseline_runners,
        ledger,
        runners,
        benched_out,
    };

    let (state, reset) = match check_invariants(&state) {
        Ok(()) => (Some(state), false),
        Err(err) => {
            warn!(%err, "saved state is inconsistent, restarting from the starting lineup");
            match GameState::from_lineup(starting, &roster) {
                Ok(fresh) => (Some(fresh), true),
                Err(err) => {
                    warn!(%err, "saved starting lineup is unusable");
                    (None, true)
                }
            }
        }
    };

    LoadedGame {
        roster,
        config,
        state,
        fallbacks: loader.fallbacks,
        reset,
        sequence: sequence.filter(|_| !reset),
    }
}
