/// Assignment tracker.
///
/// Position moves and every substitution that changes who holds a batting
/// slot. Each function mutates the state it is given in place; the engine
/// hands in a clone and validates invariants before committing it, so a
/// rejected request never leaves a partial change behind.

use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::{Ineligibility, Origin, Outcome, PlayerId, Roster, SlotReason};
use crate::error::{LineupError, Result};
use crate::position::Position;
use crate::state::GameState;

// ---------------------------------------------------------------------------
// Position moves
// ---------------------------------------------------------------------------

/// Put an in-game player at `position`. Their old position is vacated and
/// any other occupant of `position` is left without a position.
pub fn assign_position(state: &mut GameState, position: Position, player: PlayerId) -> Result<Outcome> {
    let lineup = &mut state.current;
    if lineup.occupant(position) == Some(player) {
        return Ok(Outcome::Unchanged);
    }
    if !lineup.is_active(player) {
        return Ok(Outcome::Ineligible(Ineligibility::NotInGame));
    }
    let from = lineup.position_of(player);
    if position.is_designated_hitter() || from == Some(Position::DesignatedHitter) {
        return Ok(Outcome::Ineligible(Ineligibility::DesignatedHitterLocked));
    }
    if let Some(from) = from {
        lineup.assignments.remove(&from);
    }
    let displaced = lineup.assignments.insert(position, player);
    debug!(%player, position = position.key(), ?from, ?displaced, "assign_position");
    Ok(Outcome::Applied)
}

/// Exchange the occupants of two positions. Batting order is untouched.
/// The DH never swaps, same as in `assign_position`.
pub fn swap_positions(state: &mut GameState, a: Position, b: Position) -> Result<Outcome> {
    if a == b {
        return Ok(Outcome::Unchanged);
    }
    if a.is_designated_hitter() || b.is_designated_hitter() {
        return Ok(Outcome::Ineligible(Ineligibility::DesignatedHitterLocked));
    }
    let lineup = &mut state.current;
    let (Some(pa), Some(pb)) = (lineup.occupant(a), lineup.occupant(b)) else {
        return Ok(Outcome::Unchanged);
    };
    lineup.assignments.insert(a, pb);
    lineup.assignments.insert(b, pa);
    debug!(a = a.key(), b = b.key(), "swap_positions");
    Ok(Outcome::Applied)
}

/// Take a player off the field. A batter keeps their slot until someone
/// replaces them. Benching the DH removes the DH role.
pub fn move_to_bench(state: &mut GameState, player: PlayerId) -> Result<Outcome> {
    if state.current.occupant(Position::DesignatedHitter) == Some(player) {
        return remove_designated_hitter(state);
    }
    match state.current.position_of(player) {
        Some(position) => {
            state.current.assignments.remove(&position);
            debug!(%player, position = position.key(), "move_to_bench");
            Ok(Outcome::Applied)
        }
        None if state.current.order_of(player).is_some() => Ok(Outcome::Unchanged),
        None => Ok(Outcome::Ineligible(Ineligibility::NotInGame)),
    }
}

/// Bench a player for good. Only players without a batting slot qualify.
pub fn move_to_bench_out(state: &mut GameState, roster: &Roster, player: PlayerId) -> Result<Outcome> {
    if !roster.contains(player) {
        return Err(LineupError::UnknownPlayer(player));
    }
    if state.current.order_of(player).is_some() {
        return Ok(Outcome::Ineligible(Ineligibility::StillInGame));
    }
    if state.benched_out.contains(&player) {
        return Ok(Outcome::Unchanged);
    }
    if let Some(position) = state.current.position_of(player) {
        state.current.assignments.remove(&position);
    }
    state.benched_out.insert(player);
    debug!(%player, "move_to_bench_out");
    Ok(Outcome::Applied)
}

/// DH removal cascade: the pitcher takes over the DH's batting slot.
pub fn remove_designated_hitter(state: &mut GameState) -> Result<Outcome> {
    let lineup = &state.current;
    let Some(dh) = lineup.occupant(Position::DesignatedHitter) else {
        return Ok(Outcome::Ineligible(Ineligibility::NoDesignatedHitter));
    };
    let order = lineup.order_of(dh).ok_or_else(|| {
        LineupError::InvariantViolation(format!("designated hitter {} holds no batting slot", dh))
    })?;
    if slot_has_temporary_runner(state, order) {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    let lineup = &mut state.current;
    let pitcher = lineup
        .occupant(Position::Pitcher)
        .ok_or(LineupError::EmptyPosition(Position::Pitcher))?;

    lineup.assignments.remove(&Position::DesignatedHitter);
    lineup.order.set(order, pitcher, SlotReason::DhRemoved);

    let was_starter = state.was_starter(dh);
    state.ledger.record_substitution(
        dh,
        Origin::Field(Position::DesignatedHitter),
        pitcher,
        SlotReason::DhRemoved,
        order,
        was_starter,
    );
    debug!(%dh, %pitcher, order, "remove_designated_hitter");
    Ok(Outcome::Applied)
}

// ---------------------------------------------------------------------------
// Substitutions
// ---------------------------------------------------------------------------

pub fn pinch_hit(state: &mut GameState, roster: &Roster, order: u8, substitute: PlayerId) -> Result<Outcome> {
    let slot = *state
        .current
        .order
        .get(order)
        .ok_or(LineupError::InvalidSlot(order))?;
    if slot_has_temporary_runner(state, order) {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    if let Some(reason) = substitute_check(state, roster, substitute)? {
        return Ok(Outcome::Ineligible(reason));
    }
    replace_in_slot(state, order, slot.player, substitute, SlotReason::PinchHit);
    debug!(order, out = %slot.player, r#in = %substitute, "pinch_hit");
    Ok(Outcome::Applied)
}

/// Defensive replacement of whoever holds `position`. The substitute also
/// takes the replaced player's batting slot.
pub fn substitute(state: &mut GameState, roster: &Roster, position: Position, substitute: PlayerId) -> Result<Outcome> {
    if let Some(reason) = substitute_check(state, roster, substitute)? {
        return Ok(Outcome::Ineligible(reason));
    }
    let old_order = state.current.occupant(position).and_then(|old| state.current.order_of(old));
    if old_order.map_or(false, |o| slot_has_temporary_runner(state, o)) {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    match state.current.occupant(position) {
        Some(old) => match state.current.order_of(old) {
            Some(order) => {
                replace_in_slot(state, order, old, substitute, SlotReason::MidGameEntry);
                state.current.assignments.insert(position, substitute);
            }
            None => {
                state.current.assignments.insert(position, substitute);
                let was_starter = state.was_starter(old);
                state.ledger.record_substitution(
                    old,
                    Origin::Field(position),
                    substitute,
                    SlotReason::MidGameEntry,
                    0,
                    was_starter,
                );
            }
        },
        None if position == Position::Pitcher && state.current.uses_designated_hitter() => {
            state.current.assignments.insert(position, substitute);
            let departed = state.baseline.non_batting_pitcher().filter(|&p| {
                !state.current.is_active(p) && !state.ledger.has_left(p)
            });
            if let Some(old) = departed {
                let was_starter = state.was_starter(old);
                state.ledger.record_substitution(
                    old,
                    Origin::Field(position),
                    substitute,
                    SlotReason::MidGameEntry,
                    0,
                    was_starter,
                );
            }
        }
        None => return Err(LineupError::EmptyPosition(position)),
    }
    debug!(position = position.key(), r#in = %substitute, "substitute");
    Ok(Outcome::Applied)
}

/// Replace the occupant of batting slot `order` and field the substitute
/// at `position`. Whoever held `position` is left without a position.
pub fn substitute_in_order(
    state: &mut GameState,
    roster: &Roster,
    order: u8,
    substitute: PlayerId,
    position: Position,
) -> Result<Outcome> {
    let slot = *state
        .current
        .order
        .get(order)
        .ok_or(LineupError::InvalidSlot(order))?;
    if slot_has_temporary_runner(state, order) {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    if let Some(reason) = substitute_check(state, roster, substitute)? {
        return Ok(Outcome::Ineligible(reason));
    }
    let holds_dh = state.current.occupant(Position::DesignatedHitter) == Some(slot.player);
    if position.is_designated_hitter() != holds_dh {
        return Ok(Outcome::Ineligible(Ineligibility::DesignatedHitterLocked));
    }
    replace_in_slot(state, order, slot.player, substitute, SlotReason::MidGameEntry);
    state.current.assignments.insert(position, substitute);
    debug!(order, position = position.key(), r#in = %substitute, "substitute_in_order");
    Ok(Outcome::Applied)
}

/// Bring an original starter back, once, into their starting position and
/// batting slot.
pub fn reenter(state: &mut GameState, roster: &Roster, config: &EngineConfig, player: PlayerId) -> Result<Outcome> {
    if !roster.contains(player) {
        return Err(LineupError::UnknownPlayer(player));
    }
    if !config.reentry_enabled {
        return Ok(Outcome::Ineligible(Ineligibility::ReentryDisabled));
    }
    if state.benched_out.contains(&player) {
        return Ok(Outcome::Ineligible(Ineligibility::BenchedOut));
    }
    if let Err(reason) = state.ledger.reentry_check(player, &state.current) {
        return Ok(Outcome::Ineligible(reason));
    }
    let Some(position) = state.starting.position_of(player) else {
        return Ok(Outcome::Ineligible(Ineligibility::NotAStarter));
    };
    if position.is_designated_hitter() && !state.current.uses_designated_hitter() {
        return Ok(Outcome::Ineligible(Ineligibility::DesignatedHitterLocked));
    }

    let fielder = state.current.occupant(position);
    if let Some(order) = state.starting.order_of(player) {
        if slot_has_temporary_runner(state, order) {
            return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
        }
    }
    match state.starting.order_of(player) {
        Some(order) => {
            let holder = state
                .current
                .order
                .get(order)
                .ok_or(LineupError::InvalidSlot(order))?
                .player;
            // The end of the starter's substitution chain normally holds
            // the slot; the slot wins when they differ.
            let latest = state.ledger.resolve_latest_substitute(player);
            let leaving = if latest == holder {
                latest
            } else {
                debug!(%player, %latest, %holder, "slot holder is off the substitution chain");
                holder
            };
            let origin = origin_of(state, leaving);
            let leaving_position = state.current.position_of(leaving);
            let lineup = &mut state.current;
            if let Some(p) = leaving_position {
                lineup.assignments.remove(&p);
            }
            lineup.order.set(order, player, SlotReason::Reentry);
            if let Some(other) = fielder.filter(|&o| o != leaving) {
                // The displaced fielder keeps their slot and inherits the
                // leaving player's position, if any.
                lineup.assignments.remove(&position);
                if let Some(p) = leaving_position.filter(|&p| p != position) {
                    lineup.assignments.insert(p, other);
                }
            }
            lineup.assignments.insert(position, player);

            let was_starter = state.was_starter(leaving);
            state.ledger.clear(player);
            state
                .ledger
                .record_substitution(leaving, origin, player, SlotReason::Reentry, order, was_starter);
        }
        None => {
            state.current.assignments.insert(position, player);
            state.ledger.clear(player);
            if let Some(old) = fielder {
                let was_starter = state.was_starter(old);
                state.ledger.record_substitution(
                    old,
                    Origin::Field(position),
                    player,
                    SlotReason::Reentry,
                    0,
                    was_starter,
                );
            }
        }
    }
    state.ledger.reentered.insert(player);
    debug!(%player, position = position.key(), "reenter");
    Ok(Outcome::Applied)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Where a player stands, as recorded in the ledger when they leave. A
/// fielder moved off their position this turn keeps the announced one.
pub(crate) fn origin_of(state: &GameState, player: PlayerId) -> Origin {
    let lineup = &state.current;
    if let Some(position) = lineup.position_of(player) {
        return Origin::Field(position);
    }
    let reason = lineup
        .order_of(player)
        .and_then(|o| lineup.order.get(o))
        .map(|s| s.reason);
    match (reason, state.baseline.position_of(player)) {
        (Some(SlotReason::PinchRun), _) => Origin::PinchRun,
        (Some(SlotReason::PinchHit), _) | (_, None) => Origin::PinchHit,
        (_, Some(position)) => Origin::Field(position),
    }
}

/// True while a temporary runner stands in for batting slot `order`.
pub(crate) fn slot_has_temporary_runner(state: &GameState, order: u8) -> bool {
    state.runners.temp_by_order.contains_key(&order)
}

/// `None` when `substitute` may enter the game.
pub(crate) fn substitute_check(state: &GameState, roster: &Roster, substitute: PlayerId) -> Result<Option<Ineligibility>> {
    if !roster.contains(substitute) {
        return Err(LineupError::UnknownPlayer(substitute));
    }
    let reason = if state.current.is_active(substitute) {
        Some(Ineligibility::AlreadyInGame)
    } else if state.benched_out.contains(&substitute) {
        Some(Ineligibility::BenchedOut)
    } else if state.ledger.has_left(substitute) || state.ledger.reentered.contains(&substitute) {
        Some(Ineligibility::AlreadyUsed)
    } else {
        None
    };
    Ok(reason)
}

/// Put `substitute` into slot `order` in place of `old` and record it.
/// `old` loses their position; a DH's replacement inherits the DH role.
pub(crate) fn replace_in_slot(state: &mut GameState, order: u8, old: PlayerId, substitute: PlayerId, reason: SlotReason) {
    let origin = origin_of(state, old);
    let position = state.current.position_of(old);
    if let Some(p) = position {
        state.current.assignments.remove(&p);
    }
    state.current.order.set(order, substitute, reason);
    if position == Some(Position::DesignatedHitter) {
        state.current.assignments.insert(Position::DesignatedHitter, substitute);
    }
    let was_starter = state.was_starter(old);
    state
        .ledger
        .record_substitution(old, origin, substitute, reason, order, was_starter);
}
