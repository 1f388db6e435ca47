//! Hand-written protobuf types for the operation journal.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Tag numbers are part of the journal format: never renumber, only add.
//! Positions and bases travel as their storage keys (`"third"`,
//! `"designated_hitter"`, `"first"`), players as their numeric id.

use prost::Message;

// ── Envelope ───────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoOperationEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(message, optional, tag = "2")]
    pub operation: Option<ProtoOperation>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoOperation {
    #[prost(
        oneof = "OperationKind",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18"
    )]
    pub kind: Option<OperationKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum OperationKind {
    #[prost(message, tag = "1")]
    AssignPosition(AssignPosition),
    #[prost(message, tag = "2")]
    SwapPositions(SwapPositions),
    #[prost(message, tag = "3")]
    MoveToBench(MoveToBench),
    #[prost(message, tag = "4")]
    MoveToBenchOut(MoveToBenchOut),
    #[prost(message, tag = "5")]
    PinchHit(PinchHit),
    #[prost(message, tag = "6")]
    PinchRun(PinchRun),
    #[prost(message, tag = "7")]
    Substitute(Substitute),
    #[prost(message, tag = "8")]
    SubstituteInOrder(SubstituteInOrder),
    #[prost(message, tag = "9")]
    RemoveDesignatedHitter(RemoveDesignatedHitter),
    #[prost(message, tag = "10")]
    Reenter(Reenter),
    #[prost(message, tag = "11")]
    AssignRunner(AssignRunner),
    #[prost(message, tag = "12")]
    ClearBase(ClearBase),
    #[prost(message, tag = "13")]
    ClearRunners(ClearRunners),
    #[prost(message, tag = "14")]
    ConfirmTemporaryRunner(ConfirmTemporaryRunner),
    #[prost(message, tag = "15")]
    CancelTemporaryRunner(CancelTemporaryRunner),
    #[prost(message, tag = "16")]
    CommitAnnouncement(CommitAnnouncement),
    #[prost(message, tag = "17")]
    Undo(Undo),
    #[prost(message, tag = "18")]
    Redo(Redo),
}

// ── Lineup operations ──────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct AssignPosition {
    #[prost(string, tag = "1")]
    pub position: String,
    #[prost(uint32, tag = "2")]
    pub player: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct SwapPositions {
    #[prost(string, tag = "1")]
    pub a: String,
    #[prost(string, tag = "2")]
    pub b: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MoveToBench {
    #[prost(uint32, tag = "1")]
    pub player: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct MoveToBenchOut {
    #[prost(uint32, tag = "1")]
    pub player: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct PinchHit {
    #[prost(uint32, tag = "1")]
    pub order: u32,
    #[prost(uint32, tag = "2")]
    pub substitute: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct PinchRun {
    #[prost(string, tag = "1")]
    pub base: String,
    #[prost(uint32, tag = "2")]
    pub substitute: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Substitute {
    #[prost(string, tag = "1")]
    pub position: String,
    #[prost(uint32, tag = "2")]
    pub substitute: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct SubstituteInOrder {
    #[prost(uint32, tag = "1")]
    pub order: u32,
    #[prost(uint32, tag = "2")]
    pub substitute: u32,
    #[prost(string, tag = "3")]
    pub position: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RemoveDesignatedHitter {}

#[derive(Clone, PartialEq, Message)]
pub struct Reenter {
    #[prost(uint32, tag = "1")]
    pub player: u32,
}

// ── Runner operations ──────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct AssignRunner {
    #[prost(string, tag = "1")]
    pub base: String,
    #[prost(uint32, tag = "2")]
    pub player: u32,
    #[prost(bool, tag = "3")]
    pub temporary: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClearBase {
    #[prost(string, tag = "1")]
    pub base: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClearRunners {}

#[derive(Clone, PartialEq, Message)]
pub struct ConfirmTemporaryRunner {
    #[prost(string, tag = "1")]
    pub base: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CancelTemporaryRunner {
    #[prost(string, tag = "1")]
    pub base: String,
}

// ── Session operations ─────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct CommitAnnouncement {}

#[derive(Clone, PartialEq, Message)]
pub struct Undo {}

#[derive(Clone, PartialEq, Message)]
pub struct Redo {}
