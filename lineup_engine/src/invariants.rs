/// Invariant checks.
///
/// Run against a candidate state before it is committed. The first
/// failing check wins; its message carries an `[INVARIANT:...]` tag.

use std::collections::BTreeSet;

use crate::domain::{Lineup, ORDER_SIZE};
use crate::error::{LineupError, Result};
use crate::position::Position;
use crate::state::GameState;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn check_invariants(state: &GameState) -> Result<()> {
    check_lineup(&state.current).map_err(|m| violation("current", m))?;
    check_lineup(&state.starting).map_err(|m| violation("starting", m))?;
    check_lineup(&state.baseline).map_err(|m| violation("baseline", m))?;
    check_reentries(state).map_err(|m| violation("ledger", m))?;
    check_benched_out(state).map_err(|m| violation("bench", m))?;
    check_temporary_runners(state).map_err(|m| violation("runners", m))?;
    Ok(())
}

/// Lineup-only subset, usable before a full state exists.
pub fn check_lineup(lineup: &Lineup) -> std::result::Result<(), String> {
    check_order_shape(lineup)?;
    check_unique_batters(lineup)?;
    check_unique_fielders(lineup)?;
    check_designated_hitter_link(lineup)?;
    Ok(())
}

fn violation(scope: &str, message: String) -> LineupError {
    LineupError::InvariantViolation(format!("{}: {}", scope, message))
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

/// Exactly nine slots with ordinals 1..=9 in order.
fn check_order_shape(lineup: &Lineup) -> std::result::Result<(), String> {
    let slots = lineup.order.slots();
    if slots.len() != ORDER_SIZE as usize {
        return Err(format!(
            "[INVARIANT:order_size] batting order has {} slots, expected {}",
            slots.len(),
            ORDER_SIZE
        ));
    }
    for (expected, slot) in (1..=ORDER_SIZE).zip(slots) {
        if slot.order != expected {
            return Err(format!(
                "[INVARIANT:order_ordinals] slot {} found where {} was expected",
                slot.order, expected
            ));
        }
    }
    Ok(())
}

fn check_unique_batters(lineup: &Lineup) -> std::result::Result<(), String> {
    let mut seen = BTreeSet::new();
    for slot in lineup.order.iter() {
        if !seen.insert(slot.player) {
            return Err(format!(
                "[INVARIANT:single_slot] player {} bats in more than one slot",
                slot.player
            ));
        }
    }
    Ok(())
}

fn check_unique_fielders(lineup: &Lineup) -> std::result::Result<(), String> {
    let mut seen = BTreeSet::new();
    for (position, player) in &lineup.assignments {
        if !seen.insert(*player) {
            return Err(format!(
                "[INVARIANT:single_position] player {} holds {} and another position",
                player,
                position.label()
            ));
        }
    }
    Ok(())
}

/// With a DH the DH bats and the pitcher does not; without one every
/// fielder bats. The pitcher is the only fielder allowed outside the order.
fn check_designated_hitter_link(lineup: &Lineup) -> std::result::Result<(), String> {
    if let Some(dh) = lineup.occupant(Position::DesignatedHitter) {
        if lineup.order_of(dh).is_none() {
            return Err(format!(
                "[INVARIANT:dh_link] designated hitter {} holds no batting slot",
                dh
            ));
        }
        if let Some(pitcher) = lineup.occupant(Position::Pitcher) {
            if lineup.order_of(pitcher).is_some() {
                return Err(format!(
                    "[INVARIANT:dh_link] pitcher {} bats while a designated hitter is in use",
                    pitcher
                ));
            }
        }
    }
    for (position, player) in &lineup.assignments {
        if lineup.order_of(*player).is_some() {
            continue;
        }
        let allowed = *position == Position::Pitcher && lineup.uses_designated_hitter();
        if !allowed {
            return Err(format!(
                "[INVARIANT:dh_link] {} at {} holds no batting slot",
                player,
                position.label()
            ));
        }
    }
    Ok(())
}

/// Re-entered players must be original starters.
fn check_reentries(state: &GameState) -> std::result::Result<(), String> {
    for player in &state.ledger.reentered {
        if !state.was_starter(*player) {
            return Err(format!(
                "[INVARIANT:reentry_once] {} re-entered without being a starter",
                player
            ));
        }
    }
    Ok(())
}

fn check_benched_out(state: &GameState) -> std::result::Result<(), String> {
    for player in &state.benched_out {
        if state.current.is_active(*player) {
            return Err(format!(
                "[INVARIANT:bench_out] benched-out player {} is still in the game",
                player
            ));
        }
    }
    Ok(())
}

/// Every slot-keyed temporary runner is on a base flagged temporary, every
/// temporary base has a slot entry, and a temporary runner never occupies
/// the slot it stands in for.
fn check_temporary_runners(state: &GameState) -> std::result::Result<(), String> {
    let runners = &state.runners;
    for (base, runner) in &runners.runners {
        if runner.temporary && !runners.temp_by_order.values().any(|p| *p == runner.player) {
            return Err(format!(
                "[INVARIANT:temporary_runner] temporary runner {} on {} stands in for no slot",
                runner.player,
                base.key()
            ));
        }
    }
    for (order, runner) in &runners.temp_by_order {
        let on_base = runners
            .base_of(*runner)
            .map_or(false, |b| runners.is_temporary(b));
        if !on_base {
            return Err(format!(
                "[INVARIANT:temporary_runner] slot {} lists temporary runner {} who is not on base",
                order, runner
            ));
        }
        let Some(slot) = state.current.order.get(*order) else {
            return Err(format!(
                "[INVARIANT:temporary_runner] temporary runner {} refers to slot {}",
                runner, order
            ));
        };
        if slot.player == *runner {
            return Err(format!(
                "[INVARIANT:temporary_runner] temporary runner {} took over slot {}",
                runner, order
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::domain::{BattingOrder, PlayerId};

    fn lineup(with_dh: bool) -> Lineup {
        let order = BattingOrder::new([1, 2, 3, 4, 5, 6, 7, 8, 9].map(PlayerId));
        let mut assignments = BTreeMap::new();
        let fielding = [
            Position::Pitcher,
            Position::Catcher,
            Position::First,
            Position::Second,
            Position::Third,
            Position::Short,
            Position::Left,
            Position::Center,
            Position::Right,
        ];
        for (i, pos) in fielding.iter().enumerate() {
            assignments.insert(*pos, PlayerId(i as u32 + 1));
        }
        if with_dh {
            assignments.insert(Position::Pitcher, PlayerId(10));
            assignments.insert(Position::DesignatedHitter, PlayerId(1));
        }
        Lineup { assignments, order }
    }

    #[test]
    fn valid_lineups_pass() {
        assert!(check_lineup(&lineup(false)).is_ok());
        assert!(check_lineup(&lineup(true)).is_ok());
    }

    #[test]
    fn duplicate_fielder_is_rejected() {
        let mut l = lineup(false);
        l.assignments.insert(Position::Left, PlayerId(2));
        let err = check_lineup(&l).unwrap_err();
        assert!(err.contains("single_position"), "{}", err);
    }

    #[test]
    fn batting_pitcher_with_dh_is_rejected() {
        let mut l = lineup(true);
        l.assignments.insert(Position::Pitcher, PlayerId(2));
        l.assignments.remove(&Position::Catcher);
        let err = check_lineup(&l).unwrap_err();
        assert!(err.contains("dh_link"), "{}", err);
    }

    #[test]
    fn non_batting_fielder_without_dh_is_rejected() {
        let mut l = lineup(false);
        l.assignments.insert(Position::Pitcher, PlayerId(10));
        let err = check_lineup(&l).unwrap_err();
        assert!(err.contains("dh_link"), "{}", err);
    }

    #[test]
    fn stale_temporary_runner_entry_is_rejected() {
        use crate::ledger::Ledger;
        use crate::position::Base;
        use crate::runners::RunnerTracker;

        let mut state = GameState {
            starting: lineup(false),
            current: lineup(false),
            baseline: lineup(false),
            baseline_runners: BTreeMap::new(),
            ledger: Ledger::new(),
            runners: RunnerTracker::new(),
            benched_out: Default::default(),
        };
        state.runners.assign_runner(Base::First, PlayerId(4), false);
        state.runners.assign_runner(Base::First, PlayerId(11), true);
        state.runners.temp_by_order.insert(4, PlayerId(11));
        assert!(check_invariants(&state).is_ok());

        // A regular runner took the base without settling the temporary one.
        state.runners.assign_runner(Base::First, PlayerId(1), false);
        let err = check_invariants(&state).unwrap_err().to_string();
        assert!(err.contains("temporary_runner"), "{}", err);

        state.runners.temp_by_order.clear();
        state.runners.assign_runner(Base::Second, PlayerId(12), true);
        let err = check_invariants(&state).unwrap_err().to_string();
        assert!(err.contains("stands in for no slot"), "{}", err);
    }

    #[test]
    fn short_order_is_rejected() {
        let mut l = lineup(false);
        let slots = l.order.slots()[..8].to_vec();
        l.order = BattingOrder::from_slots(slots);
        let err = check_lineup(&l).unwrap_err();
        assert!(err.contains("order_size"), "{}", err);
    }
}
