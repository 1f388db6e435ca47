/// Core domain types.
///
/// Pure data plus lookups. No substitution rules live here.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Number of batting order slots. Never changes during a game.
pub const ORDER_SIZE: u8 = 9;

// ── Players ────────────────────────────────────────────────────────

/// Stable per-game player identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub family_name: String,
    pub given_name: String,
    pub family_reading: String,
    pub given_reading: String,
    /// Jersey number as printed; may carry leading zeros.
    pub number: String,
    #[serde(default)]
    pub female: bool,
}

/// The team's players for one game. Read-only to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub name: String,
    pub players: Vec<Player>,
}

impl Roster {
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    /// True when another player on the roster has the same family name.
    pub fn shares_family_name(&self, id: PlayerId) -> bool {
        let Some(player) = self.get(id) else {
            return false;
        };
        self.players
            .iter()
            .any(|p| p.id != id && p.family_name == player.family_name)
    }
}

// ── Batting order ──────────────────────────────────────────────────

/// Why the current occupant holds a batting slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotReason {
    Starter,
    PinchHit,
    PinchRun,
    /// Accepted when loading older records; the tracker keeps temporary
    /// runners out of the batting order.
    TemporaryRun,
    Reentry,
    DhRemoved,
    MidGameEntry,
}

impl SlotReason {
    pub fn pinch_kind(self) -> Option<PinchKind> {
        match self {
            SlotReason::PinchHit => Some(PinchKind::Hit),
            SlotReason::PinchRun => Some(PinchKind::Run),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinchKind {
    Hit,
    Run,
}

impl PinchKind {
    /// `代打` / `代走`
    pub fn label(self) -> &'static str {
        match self {
            PinchKind::Hit => "代打",
            PinchKind::Run => "代走",
        }
    }

    pub fn reason(self) -> SlotReason {
        match self {
            PinchKind::Hit => SlotReason::PinchHit,
            PinchKind::Run => SlotReason::PinchRun,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingSlot {
    /// 1-based ordinal. Fixed for the lifetime of the slot.
    pub order: u8,
    pub player: PlayerId,
    pub reason: SlotReason,
}

/// Exactly nine slots, ordinals 1..=9.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattingOrder {
    slots: Vec<BattingSlot>,
}

impl BattingOrder {
    /// Starting order; every slot gets reason `Starter`.
    pub fn new(players: [PlayerId; 9]) -> Self {
        let slots = players
            .iter()
            .zip(1..=ORDER_SIZE)
            .map(|(&player, order)| BattingSlot {
                order,
                player,
                reason: SlotReason::Starter,
            })
            .collect();
        Self { slots }
    }

    /// Build from raw slots. Shape is validated by the invariant checks.
    pub fn from_slots(slots: Vec<BattingSlot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[BattingSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattingSlot> {
        self.slots.iter()
    }

    pub fn get(&self, order: u8) -> Option<&BattingSlot> {
        self.slots.iter().find(|s| s.order == order)
    }

    pub fn order_of(&self, player: PlayerId) -> Option<u8> {
        self.slots
            .iter()
            .find(|s| s.player == player)
            .map(|s| s.order)
    }

    /// Replace the occupant of `order`. Returns the previous occupant.
    pub(crate) fn set(&mut self, order: u8, player: PlayerId, reason: SlotReason) -> Option<PlayerId> {
        let slot = self.slots.iter_mut().find(|s| s.order == order)?;
        let previous = slot.player;
        slot.player = player;
        slot.reason = reason;
        Some(previous)
    }
}

// ── Lineup ─────────────────────────────────────────────────────────

/// Defensive assignments plus batting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    pub assignments: BTreeMap<Position, PlayerId>,
    pub order: BattingOrder,
}

impl Lineup {
    pub fn occupant(&self, position: Position) -> Option<PlayerId> {
        self.assignments.get(&position).copied()
    }

    pub fn position_of(&self, player: PlayerId) -> Option<Position> {
        self.assignments
            .iter()
            .find(|&(_, &p)| p == player)
            .map(|(&pos, _)| pos)
    }

    pub fn order_of(&self, player: PlayerId) -> Option<u8> {
        self.order.order_of(player)
    }

    pub fn uses_designated_hitter(&self) -> bool {
        self.assignments.contains_key(&Position::DesignatedHitter)
    }

    /// Pitcher who holds no batting slot (only possible while a DH is in use).
    pub fn non_batting_pitcher(&self) -> Option<PlayerId> {
        self.occupant(Position::Pitcher)
            .filter(|&p| self.order_of(p).is_none())
    }

    /// In the game: holds a batting slot or a position.
    pub fn is_active(&self, player: PlayerId) -> bool {
        self.order_of(player).is_some() || self.position_of(player).is_some()
    }

    pub fn active_players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.order.iter().map(|s| s.player).collect();
        players.extend(self.assignments.values().copied());
        players.sort();
        players.dedup();
        players
    }
}

// ── Substitution ledger entries ────────────────────────────────────

/// Where the replaced player stood when they left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Field(Position),
    PinchHit,
    PinchRun,
}

impl Origin {
    pub fn position(self) -> Option<Position> {
        match self {
            Origin::Field(p) => Some(p),
            _ => None,
        }
    }
}

/// One replacement, keyed in the ledger by the replaced player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub origin: Origin,
    pub substitute: PlayerId,
    pub reason: SlotReason,
    /// Batting slot involved, 0 when the replaced player held none.
    pub order: u8,
    pub was_starter: bool,
}

// ── Runners ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerAssignment {
    pub player: PlayerId,
    #[serde(default)]
    pub temporary: bool,
}

// ── Game context (owned elsewhere, read for headers) ───────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamContext {
    pub team_name: String,
    pub inning: u8,
    pub half: Half,
    pub is_home: bool,
}

impl TeamContext {
    /// True when this team is at bat.
    pub fn is_batting(&self) -> bool {
        match self.half {
            Half::Top => !self.is_home,
            Half::Bottom => self.is_home,
        }
    }

    /// `7回裏`
    pub fn inning_label(&self) -> String {
        let half = match self.half {
            Half::Top => "表",
            Half::Bottom => "裏",
        };
        format!("{}回{}", self.inning, half)
    }
}

// ── Operation results ──────────────────────────────────────────────

/// Why a request has no eligible candidate. Informational, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ineligibility {
    /// Re-entry asked for a player who never started.
    NotAStarter,
    AlreadyReentered,
    /// Player still holds a position or batting slot.
    StillInGame,
    /// Substitute is already on the field or in the order.
    AlreadyInGame,
    /// Substitute has already been replaced and left the game.
    AlreadyUsed,
    BenchedOut,
    ReentryDisabled,
    /// The designated hitter role no longer exists or cannot move.
    DesignatedHitterLocked,
    NoDesignatedHitter,
    /// Player not in the batting order or the field.
    NotInGame,
    NoRunnerOnBase,
    NoPendingTemporaryRunner,
    TemporaryRunnerPending,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Ineligibility::NotAStarter => "player was not an original starter",
            Ineligibility::AlreadyReentered => "player has already re-entered once",
            Ineligibility::StillInGame => "player is still in the game",
            Ineligibility::AlreadyInGame => "substitute is already in the game",
            Ineligibility::AlreadyUsed => "substitute has already left the game",
            Ineligibility::BenchedOut => "player is benched out",
            Ineligibility::ReentryDisabled => "re-entry is disabled",
            Ineligibility::DesignatedHitterLocked => "designated hitter cannot be moved",
            Ineligibility::NoDesignatedHitter => "no designated hitter in use",
            Ineligibility::NotInGame => "player is not in the game",
            Ineligibility::NoRunnerOnBase => "no runner on that base",
            Ineligibility::NoPendingTemporaryRunner => "no temporary runner pending on that base",
            Ineligibility::TemporaryRunnerPending => "a temporary runner is pending on that base",
        };
        write!(f, "no eligible candidate: {}", msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// Request was already satisfied or incomplete; nothing changed.
    Unchanged,
    Ineligible(Ineligibility),
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}
