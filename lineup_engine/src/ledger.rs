/// Substitution ledger.
///
/// A forward-pointer map `replaced player -> record`. Records are only
/// added or overwritten, except on re-entry where the returning starter's
/// own record is cleared. Chain walks carry a visited set so a malformed
/// map can never loop.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{Ineligibility, Lineup, Origin, PlayerId, SlotReason, SubstitutionRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub records: BTreeMap<PlayerId, SubstitutionRecord>,
    /// Starters who have used their one re-entry.
    pub reentered: BTreeSet<PlayerId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite the entry for `original`.
    pub fn record_substitution(
        &mut self,
        original: PlayerId,
        origin: Origin,
        substitute: PlayerId,
        reason: SlotReason,
        order: u8,
        was_starter: bool,
    ) {
        self.records.insert(
            original,
            SubstitutionRecord {
                origin,
                substitute,
                reason,
                order,
                was_starter,
            },
        );
    }

    pub fn get(&self, original: PlayerId) -> Option<&SubstitutionRecord> {
        self.records.get(&original)
    }

    /// True once the player has been replaced and has not come back.
    pub fn has_left(&self, player: PlayerId) -> bool {
        self.records.contains_key(&player)
    }

    pub fn clear(&mut self, original: PlayerId) -> Option<SubstitutionRecord> {
        self.records.remove(&original)
    }

    /// Follow original -> substitute -> substitute's substitute ... and
    /// return the terminal player. Returns `player` when it was never
    /// replaced.
    pub fn resolve_latest_substitute(&self, player: PlayerId) -> PlayerId {
        let mut visited = BTreeSet::new();
        let mut current = player;
        visited.insert(current);
        while let Some(record) = self.records.get(&current) {
            if !visited.insert(record.substitute) {
                break;
            }
            current = record.substitute;
        }
        current
    }

    /// The entry that brought `substitute` into the game, if any.
    pub fn predecessor_of(&self, substitute: PlayerId) -> Option<(PlayerId, &SubstitutionRecord)> {
        self.records
            .iter()
            .find(|(_, r)| r.substitute == substitute)
            .map(|(&original, r)| (original, r))
    }

    /// Walk backwards to the first player of the chain `player` belongs to.
    pub fn chain_origin(&self, player: PlayerId) -> PlayerId {
        let mut visited = BTreeSet::new();
        let mut current = player;
        visited.insert(current);
        while let Some((previous, _)) = self.predecessor_of(current) {
            if !visited.insert(previous) {
                break;
            }
            current = previous;
        }
        current
    }

    /// The fielding position vacated somewhere up the chain that led to
    /// `player`, skipping links whose origin was a pinch entry.
    pub fn vacated_position(&self, player: PlayerId) -> Option<crate::position::Position> {
        let mut visited = BTreeSet::new();
        let mut current = player;
        visited.insert(current);
        while let Some((previous, record)) = self.predecessor_of(current) {
            if let Some(position) = record.origin.position() {
                return Some(position);
            }
            if !visited.insert(previous) {
                break;
            }
            current = previous;
        }
        None
    }

    /// Re-entry eligibility against the current lineup.
    pub fn reentry_check(&self, player: PlayerId, current: &Lineup) -> Result<(), Ineligibility> {
        if self.reentered.contains(&player) {
            return Err(Ineligibility::AlreadyReentered);
        }
        if current.is_active(player) {
            return Err(Ineligibility::StillInGame);
        }
        match self.records.get(&player) {
            Some(record) if record.was_starter => Ok(()),
            _ => Err(Ineligibility::NotAStarter),
        }
    }

    pub fn is_reentry_eligible(&self, player: PlayerId, current: &Lineup) -> bool {
        self.reentry_check(player, current).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn id(n: u32) -> PlayerId {
        PlayerId(n)
    }

    #[test]
    fn resolve_walks_to_terminal_substitute() {
        let mut ledger = Ledger::new();
        ledger.record_substitution(id(4), Origin::Field(Position::Third), id(12), SlotReason::PinchHit, 4, true);
        ledger.record_substitution(id(12), Origin::PinchHit, id(15), SlotReason::PinchHit, 4, false);
        assert_eq!(ledger.resolve_latest_substitute(id(4)), id(15));
        assert_eq!(ledger.resolve_latest_substitute(id(12)), id(15));
        assert_eq!(ledger.resolve_latest_substitute(id(15)), id(15));
        assert_eq!(ledger.chain_origin(id(15)), id(4));
    }

    #[test]
    fn cycle_guard_stops_the_walk() {
        let mut ledger = Ledger::new();
        ledger.record_substitution(id(1), Origin::PinchHit, id(2), SlotReason::PinchHit, 1, true);
        ledger.record_substitution(id(2), Origin::PinchHit, id(1), SlotReason::PinchHit, 1, false);
        let terminal = ledger.resolve_latest_substitute(id(1));
        assert_eq!(terminal, id(2));
        let origin = ledger.chain_origin(id(1));
        assert_eq!(origin, id(2));
    }

    #[test]
    fn vacated_position_skips_pinch_links() {
        let mut ledger = Ledger::new();
        ledger.record_substitution(id(4), Origin::Field(Position::Short), id(12), SlotReason::PinchHit, 4, true);
        ledger.record_substitution(id(12), Origin::PinchHit, id(15), SlotReason::PinchRun, 4, false);
        assert_eq!(ledger.vacated_position(id(15)), Some(Position::Short));
        assert_eq!(ledger.vacated_position(id(4)), None);
    }

    #[test]
    fn overwriting_keeps_one_active_record() {
        let mut ledger = Ledger::new();
        ledger.record_substitution(id(4), Origin::Field(Position::Third), id(12), SlotReason::PinchHit, 4, true);
        ledger.record_substitution(id(4), Origin::Field(Position::Third), id(13), SlotReason::MidGameEntry, 4, true);
        assert_eq!(ledger.records.len(), 1);
        assert_eq!(ledger.get(id(4)).map(|r| r.substitute), Some(id(13)));
    }

    #[test]
    fn reentry_check_order() {
        use crate::domain::BattingOrder;
        let lineup = Lineup {
            assignments: BTreeMap::new(),
            order: BattingOrder::new([1, 2, 3, 12, 5, 6, 7, 8, 9].map(PlayerId)),
        };
        let mut ledger = Ledger::new();
        ledger.record_substitution(id(4), Origin::Field(Position::Third), id(12), SlotReason::PinchHit, 4, true);
        assert_eq!(ledger.reentry_check(id(1), &lineup), Err(Ineligibility::StillInGame));
        assert_eq!(ledger.reentry_check(id(20), &lineup), Err(Ineligibility::NotAStarter));
        assert!(ledger.is_reentry_eligible(id(4), &lineup));
        ledger.reentered.insert(id(4));
        assert_eq!(ledger.reentry_check(id(4), &lineup), Err(Ineligibility::AlreadyReentered));
    }
}
