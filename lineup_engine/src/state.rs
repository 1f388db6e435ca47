/// Game state bundle.
///
/// Everything undo/redo must restore together lives in one value:
/// current lineup, the lineup as last announced, the ledger, the runner
/// tracker and the benched-out set. The starting lineup rides along as a
/// read-only reference for re-entry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{Lineup, PlayerId, Roster, RunnerAssignment};
use crate::error::{LineupError, Result};
use crate::invariants::check_invariants;
use crate::ledger::Ledger;
use crate::position::{Base, Position};
use crate::runners::RunnerTracker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub starting: Lineup,
    pub current: Lineup,
    /// Lineup as of the last announcement; the composer diffs against it.
    pub baseline: Lineup,
    pub baseline_runners: BTreeMap<Base, RunnerAssignment>,
    pub ledger: Ledger,
    pub runners: RunnerTracker,
    pub benched_out: BTreeSet<PlayerId>,
}

impl GameState {
    /// Start a game from the pre-game lineup. Every player must be on the
    /// roster and the lineup must satisfy all invariants.
    pub fn from_lineup(starting: Lineup, roster: &Roster) -> Result<Self> {
        for player in starting.active_players() {
            if !roster.contains(player) {
                return Err(LineupError::UnknownPlayer(player));
            }
        }
        for position in Position::ALL {
            if position != Position::DesignatedHitter && starting.occupant(position).is_none() {
                return Err(LineupError::EmptyPosition(position));
            }
        }
        let state = Self {
            current: starting.clone(),
            baseline: starting.clone(),
            starting,
            baseline_runners: BTreeMap::new(),
            ledger: Ledger::new(),
            runners: RunnerTracker::new(),
            benched_out: BTreeSet::new(),
        };
        check_invariants(&state)?;
        Ok(state)
    }

    /// Original starter: held a slot or a position in the starting lineup.
    pub fn was_starter(&self, player: PlayerId) -> bool {
        self.starting.is_active(player)
    }

    /// Mark the current lineup as announced.
    pub fn commit_announcement(&mut self) {
        self.baseline = self.current.clone();
        self.runners.settle();
        self.baseline_runners = self.runners.runners.clone();
    }

    /// Nothing changed since the last announcement.
    pub fn is_settled(&self) -> bool {
        self.baseline == self.current && self.baseline_runners == self.runners.runners
    }
}
