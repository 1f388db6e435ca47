//! Proto <-> engine operation bridge.
//!
//! Encoding is total. Decoding rejects anything the engine could not
//! have produced (missing oneof, unknown position or base key, slot
//! ordinal out of u8 range) with `RuntimeError::Journal`.

use lineup_engine::{Base, Operation, OperationEnvelope, PlayerId, Position};

use crate::error::{Result, RuntimeError};
use crate::proto_types::*;

/// Engine envelope -> journal frame.
pub fn envelope_to_proto(envelope: &OperationEnvelope) -> ProtoOperationEnvelope {
    ProtoOperationEnvelope {
        sequence: envelope.sequence,
        operation: Some(ProtoOperation {
            kind: Some(operation_to_proto(&envelope.op)),
        }),
    }
}

pub fn operation_to_proto(op: &Operation) -> OperationKind {
    match *op {
        Operation::AssignPosition { position, player } => OperationKind::AssignPosition(AssignPosition {
            position: position.key().to_string(),
            player: player.0,
        }),
        Operation::SwapPositions { a, b } => OperationKind::SwapPositions(SwapPositions {
            a: a.key().to_string(),
            b: b.key().to_string(),
        }),
        Operation::MoveToBench { player } => OperationKind::MoveToBench(MoveToBench { player: player.0 }),
        Operation::MoveToBenchOut { player } => {
            OperationKind::MoveToBenchOut(MoveToBenchOut { player: player.0 })
        }
        Operation::PinchHit { order, substitute } => OperationKind::PinchHit(PinchHit {
            order: u32::from(order),
            substitute: substitute.0,
        }),
        Operation::PinchRun { base, substitute } => OperationKind::PinchRun(PinchRun {
            base: base.key().to_string(),
            substitute: substitute.0,
        }),
        Operation::Substitute { position, substitute } => OperationKind::Substitute(Substitute {
            position: position.key().to_string(),
            substitute: substitute.0,
        }),
        Operation::SubstituteInOrder {
            order,
            substitute,
            position,
        } => OperationKind::SubstituteInOrder(SubstituteInOrder {
            order: u32::from(order),
            substitute: substitute.0,
            position: position.key().to_string(),
        }),
        Operation::RemoveDesignatedHitter => OperationKind::RemoveDesignatedHitter(RemoveDesignatedHitter {}),
        Operation::Reenter { player } => OperationKind::Reenter(Reenter { player: player.0 }),
        Operation::AssignRunner {
            base,
            player,
            temporary,
        } => OperationKind::AssignRunner(AssignRunner {
            base: base.key().to_string(),
            player: player.0,
            temporary,
        }),
        Operation::ClearBase { base } => OperationKind::ClearBase(ClearBase {
            base: base.key().to_string(),
        }),
        Operation::ClearRunners => OperationKind::ClearRunners(ClearRunners {}),
        Operation::ConfirmTemporaryRunner { base } => {
            OperationKind::ConfirmTemporaryRunner(ConfirmTemporaryRunner {
                base: base.key().to_string(),
            })
        }
        Operation::CancelTemporaryRunner { base } => {
            OperationKind::CancelTemporaryRunner(CancelTemporaryRunner {
                base: base.key().to_string(),
            })
        }
        Operation::CommitAnnouncement => OperationKind::CommitAnnouncement(CommitAnnouncement {}),
        Operation::Undo => OperationKind::Undo(Undo {}),
        Operation::Redo => OperationKind::Redo(Redo {}),
    }
}

/// Journal frame -> engine envelope.
pub fn proto_to_envelope(proto: &ProtoOperationEnvelope) -> Result<OperationEnvelope> {
    let kind = proto
        .operation
        .as_ref()
        .and_then(|op| op.kind.as_ref())
        .ok_or_else(|| malformed(proto.sequence, "frame carries no operation"))?;
    let op = proto_to_operation(kind).map_err(|why| malformed(proto.sequence, &why))?;
    Ok(OperationEnvelope {
        sequence: proto.sequence,
        op,
    })
}

fn malformed(sequence: u64, why: &str) -> RuntimeError {
    RuntimeError::Journal(format!("entry {}: {}", sequence, why))
}

fn position(key: &str) -> std::result::Result<Position, String> {
    Position::from_key(key).ok_or_else(|| format!("unknown position {:?}", key))
}

fn base(key: &str) -> std::result::Result<Base, String> {
    Base::from_key(key).ok_or_else(|| format!("unknown base {:?}", key))
}

fn order(raw: u32) -> std::result::Result<u8, String> {
    u8::try_from(raw).map_err(|_| format!("batting order {} out of range", raw))
}

pub fn proto_to_operation(kind: &OperationKind) -> std::result::Result<Operation, String> {
    let op = match kind {
        OperationKind::AssignPosition(m) => Operation::AssignPosition {
            position: position(&m.position)?,
            player: PlayerId(m.player),
        },
        OperationKind::SwapPositions(m) => Operation::SwapPositions {
            a: position(&m.a)?,
            b: position(&m.b)?,
        },
        OperationKind::MoveToBench(m) => Operation::MoveToBench {
            player: PlayerId(m.player),
        },
        OperationKind::MoveToBenchOut(m) => Operation::MoveToBenchOut {
            player: PlayerId(m.player),
        },
        OperationKind::PinchHit(m) => Operation::PinchHit {
            order: order(m.order)?,
            substitute: PlayerId(m.substitute),
        },
        OperationKind::PinchRun(m) => Operation::PinchRun {
            base: base(&m.base)?,
            substitute: PlayerId(m.substitute),
        },
        OperationKind::Substitute(m) => Operation::Substitute {
            position: position(&m.position)?,
            substitute: PlayerId(m.substitute),
        },
        OperationKind::SubstituteInOrder(m) => Operation::SubstituteInOrder {
            order: order(m.order)?,
            substitute: PlayerId(m.substitute),
            position: position(&m.position)?,
        },
        OperationKind::RemoveDesignatedHitter(_) => Operation::RemoveDesignatedHitter,
        OperationKind::Reenter(m) => Operation::Reenter {
            player: PlayerId(m.player),
        },
        OperationKind::AssignRunner(m) => Operation::AssignRunner {
            base: base(&m.base)?,
            player: PlayerId(m.player),
            temporary: m.temporary,
        },
        OperationKind::ClearBase(m) => Operation::ClearBase { base: base(&m.base)? },
        OperationKind::ClearRunners(_) => Operation::ClearRunners,
        OperationKind::ConfirmTemporaryRunner(m) => Operation::ConfirmTemporaryRunner { base: base(&m.base)? },
        OperationKind::CancelTemporaryRunner(m) => Operation::CancelTemporaryRunner { base: base(&m.base)? },
        OperationKind::CommitAnnouncement(_) => Operation::CommitAnnouncement,
        OperationKind::Undo(_) => Operation::Undo,
        OperationKind::Redo(_) => Operation::Redo,
    };
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_survives_the_bridge() {
        let ops = [
            Operation::AssignPosition {
                position: Position::DesignatedHitter,
                player: PlayerId(12),
            },
            Operation::SubstituteInOrder {
                order: 9,
                substitute: PlayerId(11),
                position: Position::Pitcher,
            },
            Operation::AssignRunner {
                base: Base::Second,
                player: PlayerId(3),
                temporary: true,
            },
            Operation::RemoveDesignatedHitter,
            Operation::Redo,
        ];
        for (i, op) in ops.into_iter().enumerate() {
            let envelope = OperationEnvelope {
                sequence: i as u64 + 1,
                op,
            };
            let back = proto_to_envelope(&envelope_to_proto(&envelope)).unwrap();
            assert_eq!(back, envelope);
        }
    }

    #[test]
    fn unknown_position_key_is_rejected() {
        let proto = ProtoOperationEnvelope {
            sequence: 4,
            operation: Some(ProtoOperation {
                kind: Some(OperationKind::ClearBase(ClearBase {
                    base: "home".to_string(),
                })),
            }),
        };
        let err = proto_to_envelope(&proto).unwrap_err();
        assert!(err.to_string().contains("entry 4"), "{}", err);
    }

    #[test]
    fn empty_frame_is_rejected() {
        let proto = ProtoOperationEnvelope {
            sequence: 1,
            operation: None,
        };
        assert!(matches!(proto_to_envelope(&proto), Err(RuntimeError::Journal(_))));
    }
}
