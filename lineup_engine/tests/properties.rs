//! Property checks over random operation sequences.

mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;

use common::*;
use lineup_engine::hashing::canonical_hash;
use lineup_engine::invariants::check_lineup;
use lineup_engine::{Base, Ineligibility, LineupEngine, Operation, Outcome, PlayerId, Position};

fn player() -> impl Strategy<Value = PlayerId> {
    (1u32..=13).prop_map(PlayerId)
}

fn position() -> impl Strategy<Value = Position> {
    prop::sample::select(Position::ALL.to_vec())
}

fn base() -> impl Strategy<Value = Base> {
    prop::sample::select(Base::ALL.to_vec())
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (position(), player()).prop_map(|(position, player)| Operation::AssignPosition { position, player }),
        (position(), position()).prop_map(|(a, b)| Operation::SwapPositions { a, b }),
        player().prop_map(|player| Operation::MoveToBench { player }),
        (1u8..=9, player()).prop_map(|(order, substitute)| Operation::PinchHit { order, substitute }),
        (position(), player()).prop_map(|(position, substitute)| Operation::Substitute { position, substitute }),
        player().prop_map(|player| Operation::Reenter { player }),
        (base(), player(), any::<bool>())
            .prop_map(|(base, player, temporary)| Operation::AssignRunner { base, player, temporary }),
        (base(), player()).prop_map(|(base, substitute)| Operation::PinchRun { base, substitute }),
        (base(), any::<bool>()).prop_map(|(base, confirm)| if confirm {
            Operation::ConfirmTemporaryRunner { base }
        } else {
            Operation::CancelTemporaryRunner { base }
        }),
        prop::sample::select(vec![
            Operation::CommitAnnouncement,
            Operation::Undo,
            Operation::Redo,
            Operation::RemoveDesignatedHitter,
            Operation::ClearRunners,
        ]),
    ]
}

fn start(with_dh: bool) -> LineupEngine {
    if with_dh {
        dh_engine()
    } else {
        engine()
    }
}

fn run(engine: &mut LineupEngine, ops: &[Operation]) {
    for op in ops {
        // Rejections are expected; the state must stay valid either way.
        let _ = engine.apply(*op);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn single_occupancy_holds(with_dh in any::<bool>(), ops in prop::collection::vec(operation(), 0..40)) {
        let mut engine = start(with_dh);
        for op in &ops {
            let _ = engine.apply(*op);
            let current = &engine.state().current;
            prop_assert!(check_lineup(current).is_ok(), "{:?}", check_lineup(current));

            let batters: BTreeSet<PlayerId> = current.order.iter().map(|s| s.player).collect();
            prop_assert_eq!(batters.len(), 9);
            let fielders: BTreeSet<PlayerId> = current.assignments.values().copied().collect();
            prop_assert_eq!(fielders.len(), current.assignments.len());

            let runners = &engine.state().runners;
            for (order, runner) in &runners.temp_by_order {
                let on_base = runners.base_of(*runner).map_or(false, |b| runners.is_temporary(b));
                prop_assert!(on_base, "slot {} lists {} who is not a temporary runner", order, runner);
                prop_assert_ne!(current.order.get(*order).map(|s| s.player), Some(*runner));
            }
            for (base, runner) in &runners.runners {
                if runner.temporary {
                    prop_assert!(runners.pending_temporary(*base).is_some(), "{:?} on {:?}", runner, base);
                }
            }
        }
    }

    #[test]
    fn pending_temporary_runner_can_always_be_cancelled(
        with_dh in any::<bool>(),
        ops in prop::collection::vec(operation(), 0..40),
    ) {
        let mut engine = start(with_dh);
        run(&mut engine, &ops);
        let pending: Vec<(Base, u8)> = Base::ALL
            .iter()
            .filter_map(|&b| engine.state().runners.pending_temporary(b).map(|(_, order)| (b, order)))
            .collect();
        for (base, order) in pending {
            let original = engine.state().current.order.get(order).map(|s| s.player);
            prop_assert_eq!(engine.apply(Operation::CancelTemporaryRunner { base }), Ok(Outcome::Applied));
            prop_assert_eq!(engine.state().runners.occupant(base), original);
            prop_assert!(!engine.state().runners.temp_by_order.contains_key(&order));
        }
    }

    #[test]
    fn reentry_happens_at_most_once(with_dh in any::<bool>(), ops in prop::collection::vec(operation(), 0..40)) {
        let mut engine = start(with_dh);
        run(&mut engine, &ops);
        let reentered: Vec<PlayerId> = engine.state().ledger.reentered.iter().copied().collect();
        for player in reentered {
            let outcome = engine.apply(Operation::Reenter { player });
            prop_assert!(
                matches!(outcome, Ok(Outcome::Ineligible(_))),
                "second re-entry of {} gave {:?}", player, outcome
            );
        }
    }

    #[test]
    fn dh_removal_only_touches_the_dh_slot(ops in prop::collection::vec(operation(), 0..30)) {
        let mut engine = dh_engine();
        run(&mut engine, &ops);
        let before = engine.state().current.clone();
        let Some(dh) = before.occupant(Position::DesignatedHitter) else {
            let outcome = engine.apply(Operation::RemoveDesignatedHitter);
            prop_assert_eq!(outcome, Ok(Outcome::Ineligible(Ineligibility::NoDesignatedHitter)));
            return Ok(());
        };
        let dh_order = before.order_of(dh).unwrap();
        let pitcher = before.occupant(Position::Pitcher);
        if engine.apply(Operation::RemoveDesignatedHitter) != Ok(Outcome::Applied) {
            return Ok(());
        }
        let after = &engine.state().current;
        for (a, b) in before.order.iter().zip(after.order.iter()) {
            if a.order == dh_order {
                prop_assert_eq!(Some(b.player), pitcher);
            } else {
                prop_assert_eq!(a, b);
            }
        }
        prop_assert!(!after.uses_designated_hitter());
    }

    #[test]
    fn replay_is_deterministic(with_dh in any::<bool>(), ops in prop::collection::vec(operation(), 0..40)) {
        let mut a = start(with_dh);
        let mut b = start(with_dh);
        run(&mut a, &ops);
        run(&mut b, &ops);
        prop_assert_eq!(canonical_hash(a.state()).unwrap(), canonical_hash(b.state()).unwrap());
        prop_assert_eq!(a.last_sequence(), b.last_sequence());

        let ctx = context();
        let first = a.compose(&ctx);
        prop_assert_eq!(&first, &a.compose(&ctx));
        prop_assert_eq!(first.display_text(), b.compose(&ctx).display_text());
        prop_assert!(!first.sentences.is_empty());
    }

    #[test]
    fn undo_restores_the_previous_bundle(with_dh in any::<bool>(), ops in prop::collection::vec(operation(), 1..30)) {
        let mut engine = start(with_dh);
        let (last, prefix) = ops.split_last().unwrap();
        run(&mut engine, prefix);
        if last.is_history() {
            return Ok(());
        }
        let before = engine.state().clone();
        if engine.apply(*last) == Ok(Outcome::Applied) {
            prop_assert_eq!(engine.undo(), Outcome::Applied);
            prop_assert_eq!(engine.state(), &before);
        } else {
            prop_assert_eq!(engine.state(), &before);
        }
    }
}
