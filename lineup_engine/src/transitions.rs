/// Centralized transition logic.
///
/// Every state mutation is reached through `apply`. The caller's state is
/// never touched: the operation runs against a deep clone which is handed
/// back together with the outcome. Invariants are checked by the engine.

use crate::config::EngineConfig;
use crate::domain::{Ineligibility, Outcome, PlayerId, Roster, RunnerAssignment, SlotReason};
use crate::error::{LineupError, Result};
use crate::operations::Operation;
use crate::position::Base;
use crate::state::GameState;
use crate::tracker;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `op` to a clone of `state` and return `(new_state, outcome)`.
///
/// Undo and redo are history operations and are answered by the engine;
/// passing one here is a caller bug and reported as `Malformed`.
pub fn apply(state: &GameState, roster: &Roster, config: &EngineConfig, op: &Operation) -> Result<(GameState, Outcome)> {
    let mut next = state.clone();
    let outcome = match *op {
        Operation::AssignPosition { position, player } => tracker::assign_position(&mut next, position, player)?,
        Operation::SwapPositions { a, b } => tracker::swap_positions(&mut next, a, b)?,
        Operation::MoveToBench { player } => tracker::move_to_bench(&mut next, player)?,
        Operation::MoveToBenchOut { player } => tracker::move_to_bench_out(&mut next, roster, player)?,
        Operation::PinchHit { order, substitute } => tracker::pinch_hit(&mut next, roster, order, substitute)?,
        Operation::PinchRun { base, substitute } => pinch_run(&mut next, roster, base, substitute)?,
        Operation::Substitute { position, substitute } => {
            tracker::substitute(&mut next, roster, position, substitute)?
        }
        Operation::SubstituteInOrder {
            order,
            substitute,
            position,
        } => tracker::substitute_in_order(&mut next, roster, order, substitute, position)?,
        Operation::RemoveDesignatedHitter => tracker::remove_designated_hitter(&mut next)?,
        Operation::Reenter { player } => tracker::reenter(&mut next, roster, config, player)?,
        Operation::AssignRunner {
            base,
            player,
            temporary,
        } => assign_runner(&mut next, roster, base, player, temporary)?,
        Operation::ClearBase { base } => clear_base(&mut next, base),
        Operation::ClearRunners => clear_runners(&mut next),
        Operation::ConfirmTemporaryRunner { base } => confirm_temporary_runner(&mut next, roster, base)?,
        Operation::CancelTemporaryRunner { base } => cancel_temporary_runner(&mut next, base)?,
        Operation::CommitAnnouncement => commit_announcement(&mut next),
        Operation::Undo | Operation::Redo => {
            return Err(LineupError::Malformed(format!(
                "{} is a history operation",
                op.name()
            )))
        }
    };
    Ok((next, outcome))
}

// ---------------------------------------------------------------------------
// Runner handlers (private)
// ---------------------------------------------------------------------------

/// Replace the runner on `base` with a bench player who also takes the
/// runner's batting slot.
fn pinch_run(state: &mut GameState, roster: &Roster, base: Base, substitute: PlayerId) -> Result<Outcome> {
    let Some(runner) = state.runners.runners.get(&base).copied() else {
        return Ok(Outcome::Ineligible(Ineligibility::NoRunnerOnBase));
    };
    if runner.temporary {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    let Some(order) = state.current.order_of(runner.player) else {
        return Ok(Outcome::Ineligible(Ineligibility::NotInGame));
    };
    if let Some(reason) = tracker::substitute_check(state, roster, substitute)? {
        return Ok(Outcome::Ineligible(reason));
    }
    if state.runners.base_of(substitute).map_or(false, |b| state.runners.is_temporary(b)) {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    tracker::replace_in_slot(state, order, runner.player, substitute, SlotReason::PinchRun);
    state.runners.assign_runner(base, substitute, false);
    tracing::debug!(base = base.key(), out = %runner.player, r#in = %substitute, "pinch_run");
    Ok(Outcome::Applied)
}

/// Plain runner placement. A bench player placed on a base is a pinch
/// runner; a temporary runner only stands in for the runner already there.
fn assign_runner(state: &mut GameState, roster: &Roster, base: Base, player: PlayerId, temporary: bool) -> Result<Outcome> {
    if !roster.contains(player) {
        return Err(LineupError::UnknownPlayer(player));
    }
    if !temporary {
        if state.runners.occupant(base) == Some(player) {
            return Ok(Outcome::Unchanged);
        }
        // A pending temporary runner is settled by confirm or cancel only.
        let pending = state.runners.is_temporary(base)
            || state.runners.base_of(player).map_or(false, |b| state.runners.is_temporary(b))
            || state
                .current
                .order_of(player)
                .map_or(false, |o| tracker::slot_has_temporary_runner(state, o));
        if pending {
            return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
        }
        if state.current.order_of(player).is_none() {
            return pinch_run(state, roster, base, player);
        }
        state.runners.assign_runner(base, player, false);
        return Ok(Outcome::Applied);
    }

    let Some(runner) = state.runners.runners.get(&base).copied() else {
        return Ok(Outcome::Ineligible(Ineligibility::NoRunnerOnBase));
    };
    if runner.temporary {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    if runner.player == player {
        return Ok(Outcome::Unchanged);
    }
    let Some(order) = state.current.order_of(runner.player) else {
        return Ok(Outcome::Ineligible(Ineligibility::NotInGame));
    };
    if state.benched_out.contains(&player) {
        return Ok(Outcome::Ineligible(Ineligibility::BenchedOut));
    }
    if state.runners.base_of(player).is_some() {
        return Ok(Outcome::Ineligible(Ineligibility::AlreadyInGame));
    }
    if state
        .current
        .order_of(player)
        .map_or(false, |o| tracker::slot_has_temporary_runner(state, o))
    {
        return Ok(Outcome::Ineligible(Ineligibility::TemporaryRunnerPending));
    }
    state.runners.assign_runner(base, player, true);
    state.runners.temp_by_order.insert(order, player);
    tracing::debug!(base = base.key(), order, %player, "temporary runner");
    Ok(Outcome::Applied)
}

fn clear_base(state: &mut GameState, base: Base) -> Outcome {
    match state.runners.clear_base(base) {
        Some(_) => Outcome::Applied,
        None => Outcome::Unchanged,
    }
}

fn clear_runners(state: &mut GameState) -> Outcome {
    let runners = &state.runners;
    if runners.runners.is_empty() && runners.replaced.is_empty() && runners.temp_by_order.is_empty() {
        return Outcome::Unchanged;
    }
    state.runners.clear_all();
    Outcome::Applied
}

/// The temporary runner becomes a real substitute for the slot they stood
/// in for.
fn confirm_temporary_runner(state: &mut GameState, roster: &Roster, base: Base) -> Result<Outcome> {
    let Some((runner, order)) = state.runners.pending_temporary(base) else {
        return Ok(Outcome::Ineligible(Ineligibility::NoPendingTemporaryRunner));
    };
    let original = state
        .current
        .order
        .get(order)
        .ok_or(LineupError::InvalidSlot(order))?
        .player;
    if let Some(reason) = tracker::substitute_check(state, roster, runner)? {
        return Ok(Outcome::Ineligible(reason));
    }
    tracker::replace_in_slot(state, order, original, runner, SlotReason::PinchRun);
    state.runners.runners.insert(
        base,
        RunnerAssignment {
            player: runner,
            temporary: false,
        },
    );
    state.runners.temp_by_order.remove(&order);
    Ok(Outcome::Applied)
}

/// Put the slot's own runner back on the base.
fn cancel_temporary_runner(state: &mut GameState, base: Base) -> Result<Outcome> {
    let Some((_, order)) = state.runners.pending_temporary(base) else {
        return Ok(Outcome::Ineligible(Ineligibility::NoPendingTemporaryRunner));
    };
    let original = state
        .current
        .order
        .get(order)
        .ok_or(LineupError::InvalidSlot(order))?
        .player;
    state.runners.runners.insert(
        base,
        RunnerAssignment {
            player: original,
            temporary: false,
        },
    );
    // An earlier occupant recorded before the temporary runner stays.
    if state.runners.replaced.get(&base) == Some(&original) {
        state.runners.replaced.remove(&base);
    }
    state.runners.temp_by_order.remove(&order);
    Ok(Outcome::Applied)
}

fn commit_announcement(state: &mut GameState) -> Outcome {
    if state.is_settled() {
        return Outcome::Unchanged;
    }
    state.commit_announcement();
    Outcome::Applied
}
