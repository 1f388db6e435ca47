/// Operation vocabulary.
///
/// Operations are pure data: one variant per confirm-level user action.
/// They carry intent and payload only; the rules live in `transitions`.

use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;
use crate::position::{Base, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    AssignPosition { position: Position, player: PlayerId },
    SwapPositions { a: Position, b: Position },
    MoveToBench { player: PlayerId },
    MoveToBenchOut { player: PlayerId },
    PinchHit { order: u8, substitute: PlayerId },
    PinchRun { base: Base, substitute: PlayerId },
    Substitute { position: Position, substitute: PlayerId },
    SubstituteInOrder { order: u8, substitute: PlayerId, position: Position },
    RemoveDesignatedHitter,
    Reenter { player: PlayerId },
    AssignRunner {
        base: Base,
        player: PlayerId,
        #[serde(default)]
        temporary: bool,
    },
    ClearBase { base: Base },
    ClearRunners,
    ConfirmTemporaryRunner { base: Base },
    CancelTemporaryRunner { base: Base },
    /// The announcement was read; the current lineup becomes the baseline.
    CommitAnnouncement,
    Undo,
    Redo,
}

impl Operation {
    /// Stable snake_case name, used in logs and journal diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AssignPosition { .. } => "assign_position",
            Operation::SwapPositions { .. } => "swap_positions",
            Operation::MoveToBench { .. } => "move_to_bench",
            Operation::MoveToBenchOut { .. } => "move_to_bench_out",
            Operation::PinchHit { .. } => "pinch_hit",
            Operation::PinchRun { .. } => "pinch_run",
            Operation::Substitute { .. } => "substitute",
            Operation::SubstituteInOrder { .. } => "substitute_in_order",
            Operation::RemoveDesignatedHitter => "remove_designated_hitter",
            Operation::Reenter { .. } => "reenter",
            Operation::AssignRunner { .. } => "assign_runner",
            Operation::ClearBase { .. } => "clear_base",
            Operation::ClearRunners => "clear_runners",
            Operation::ConfirmTemporaryRunner { .. } => "confirm_temporary_runner",
            Operation::CancelTemporaryRunner { .. } => "cancel_temporary_runner",
            Operation::CommitAnnouncement => "commit_announcement",
            Operation::Undo => "undo",
            Operation::Redo => "redo",
        }
    }

    /// Undo and redo travel through the journal like any other operation
    /// but never reach `transitions`.
    pub fn is_history(&self) -> bool {
        matches!(self, Operation::Undo | Operation::Redo)
    }
}

/// An operation stamped with its position in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEnvelope {
    pub sequence: u64,
    pub op: Operation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_parse_from_tagged_json() {
        let op: Operation =
            serde_json::from_str(r#"{"type":"pinch_hit","order":4,"substitute":12}"#).unwrap();
        assert_eq!(
            op,
            Operation::PinchHit {
                order: 4,
                substitute: PlayerId(12)
            }
        );
        let op: Operation =
            serde_json::from_str(r#"{"type":"assign_runner","base":"first","player":3}"#).unwrap();
        assert_eq!(
            op,
            Operation::AssignRunner {
                base: Base::First,
                player: PlayerId(3),
                temporary: false
            }
        );
        assert_eq!(op.name(), "assign_runner");
    }

    #[test]
    fn unit_variants_serialize_with_tag_only() {
        let json = serde_json::to_string(&Operation::RemoveDesignatedHitter).unwrap();
        assert_eq!(json, r#"{"type":"remove_designated_hitter"}"#);
    }
}
