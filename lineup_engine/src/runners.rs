/// Runner assignment tracker.
///
/// Transient base occupancy. Temporary runners live only here and in
/// `temp_by_order`; they never touch the batting order until confirmed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, RunnerAssignment};
use crate::position::Base;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerTracker {
    pub runners: BTreeMap<Base, RunnerAssignment>,
    /// Pre-change occupant of each base whose runner was replaced.
    pub replaced: BTreeMap<Base, PlayerId>,
    /// Batting slot ordinal -> temporary runner standing in for it.
    pub temp_by_order: BTreeMap<u8, PlayerId>,
}

impl RunnerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, base: Base) -> Option<PlayerId> {
        self.runners.get(&base).map(|r| r.player)
    }

    pub fn base_of(&self, player: PlayerId) -> Option<Base> {
        self.runners
            .iter()
            .find(|(_, r)| r.player == player)
            .map(|(&base, _)| base)
    }

    /// Put `player` on `base`. The player leaves any other base first.
    /// Returns the occupant that was displaced from `base`, which is also
    /// remembered in `replaced` until the base is cleared.
    pub fn assign_runner(&mut self, base: Base, player: PlayerId, temporary: bool) -> Option<PlayerId> {
        if let Some(other) = self.base_of(player).filter(|&b| b != base) {
            self.runners.remove(&other);
            self.replaced.remove(&other);
        }
        let previous = self
            .runners
            .insert(base, RunnerAssignment { player, temporary })
            .map(|r| r.player)
            .filter(|&p| p != player);
        if let Some(prev) = previous {
            // Keep the earliest occupant when the base changes hands twice.
            self.replaced.entry(base).or_insert(prev);
        }
        previous
    }

    pub fn clear_base(&mut self, base: Base) -> Option<RunnerAssignment> {
        self.replaced.remove(&base);
        let removed = self.runners.remove(&base);
        if let Some(r) = removed.filter(|r| r.temporary) {
            self.temp_by_order.retain(|_, &mut p| p != r.player);
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.runners.clear();
        self.replaced.clear();
        self.temp_by_order.clear();
    }

    /// Temporary runner on `base` and the batting slot they stand in for.
    pub fn pending_temporary(&self, base: Base) -> Option<(PlayerId, u8)> {
        let runner = self.runners.get(&base).filter(|r| r.temporary)?;
        self.temp_by_order
            .iter()
            .find(|(_, &p)| p == runner.player)
            .map(|(&order, _)| (runner.player, order))
    }

    pub fn is_temporary(&self, base: Base) -> bool {
        self.runners.get(&base).map(|r| r.temporary).unwrap_or(false)
    }

    /// Forget replaced occupants of settled (non-temporary) bases.
    pub fn settle(&mut self) {
        let runners = &self.runners;
        self.replaced
            .retain(|base, _| runners.get(base).map(|r| r.temporary).unwrap_or(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_records_previous_occupant() {
        let mut t = RunnerTracker::new();
        assert_eq!(t.assign_runner(Base::First, PlayerId(1), false), None);
        assert_eq!(t.assign_runner(Base::First, PlayerId(20), false), Some(PlayerId(1)));
        assert_eq!(t.replaced.get(&Base::First), Some(&PlayerId(1)));
        t.assign_runner(Base::First, PlayerId(21), false);
        assert_eq!(t.replaced.get(&Base::First), Some(&PlayerId(1)));
    }

    #[test]
    fn runner_moves_between_bases() {
        let mut t = RunnerTracker::new();
        t.assign_runner(Base::First, PlayerId(1), false);
        t.assign_runner(Base::Second, PlayerId(1), false);
        assert_eq!(t.occupant(Base::First), None);
        assert_eq!(t.base_of(PlayerId(1)), Some(Base::Second));
    }

    #[test]
    fn settle_keeps_pending_temporary_entries() {
        let mut t = RunnerTracker::new();
        t.assign_runner(Base::First, PlayerId(1), false);
        t.assign_runner(Base::First, PlayerId(20), true);
        t.temp_by_order.insert(1, PlayerId(20));
        t.assign_runner(Base::Second, PlayerId(2), false);
        t.assign_runner(Base::Second, PlayerId(21), false);
        t.settle();
        assert_eq!(t.pending_temporary(Base::First), Some((PlayerId(20), 1)));
        assert!(t.is_temporary(Base::First));
        assert_eq!(t.replaced.get(&Base::First), Some(&PlayerId(1)));
        assert!(!t.replaced.contains_key(&Base::Second));
    }

    #[test]
    fn clear_all_empties_everything() {
        let mut t = RunnerTracker::new();
        t.assign_runner(Base::Third, PlayerId(3), false);
        t.temp_by_order.insert(3, PlayerId(22));
        t.clear_all();
        assert!(t.runners.is_empty());
        assert!(t.temp_by_order.is_empty());
    }
}
