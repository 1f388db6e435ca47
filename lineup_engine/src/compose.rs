/// Announcement composer.
///
/// A pure function of the game state: it diffs the lineup as last
/// announced (`baseline`) against the current one, classifies every change
/// into an explicit `ChangeKind`, orders the sentences and renders them.
/// Nothing here reads a clock, a global, or the insertion order of a map,
/// so identical input always yields identical text.
///
/// Ordering:
///   1. re-entries and same-position pinch entries, by position priority
///   2. replacements and mixed entries by position priority, then pinch
///      hitters/runners by slot, then temporary runners by base
///   3. remaining shifts, linearized into chains
///   4. recap lines per changed slot, by ordinal

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::{PinchKind, PlayerId, Roster, SlotReason, TeamContext};
use crate::position::{Base, Position};
use crate::speech_text::{NamePart, Utterance};
use crate::state::GameState;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Which template a sentence was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    /// A pinch player takes over the exact position of the player they
    /// replaced.
    SamePositionPinch { pinch: PinchKind },
    /// New occupant at a position other than the one vacated. `pinch` is
    /// set when the player entered as a pinch player in an earlier
    /// announcement and now takes the field.
    Mixed { pinch: Option<PinchKind> },
    ReplaceOnly,
    /// One linearized chain of position moves.
    ShiftOnly,
    Reentry,
    PinchAtBat { pinch: PinchKind },
    TemporaryRun,
    DhRelease,
    NoChange,
}

impl ChangeKind {
    /// Self-contained phrasing that needs no header.
    pub fn is_self_contained(self) -> bool {
        matches!(self, ChangeKind::SamePositionPinch { .. } | ChangeKind::Reentry)
    }

    fn is_seat_change(self) -> bool {
        matches!(
            self,
            ChangeKind::ShiftOnly | ChangeKind::Mixed { pinch: Some(_) }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub kind: ChangeKind,
    pub text: Utterance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub header: Option<Utterance>,
    pub sentences: Vec<Sentence>,
    /// `4番 サード 佐藤`, one per changed slot. Shown, not read.
    pub recap: Vec<String>,
    pub closing: Option<Utterance>,
}

impl Announcement {
    /// True for the "no changes" announcement.
    pub fn is_empty(&self) -> bool {
        self.sentences
            .iter()
            .all(|s| s.kind == ChangeKind::NoChange)
    }

    fn spoken(&self) -> impl Iterator<Item = &Utterance> {
        self.header
            .iter()
            .chain(self.sentences.iter().map(|s| &s.text))
            .chain(self.closing.iter())
    }

    /// Screen form: ruby markup, one line per sentence, recap last.
    pub fn display_text(&self) -> String {
        let mut lines: Vec<String> = self.spoken().map(Utterance::display).collect();
        lines.extend(self.recap.iter().cloned());
        lines.join("\n")
    }

    /// Voice form: readings only, no recap.
    pub fn speech_text(&self) -> String {
        self.spoken()
            .map(Utterance::speech)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn compose(state: &GameState, roster: &Roster, context: &TeamContext, config: &EngineConfig) -> Announcement {
    let voice = Voice {
        state,
        roster,
        config,
    };
    let (mut changes, shifts) = classify(state);
    changes.sort_by_key(Change::rank);
    let chains = linearize(shifts);

    let total = changes.len() + chains.len();
    if total == 0 {
        return Announcement {
            header: None,
            sentences: vec![Sentence {
                kind: ChangeKind::NoChange,
                text: Utterance::from_text(config.no_change_line.clone()),
            }],
            recap: Vec::new(),
            closing: None,
        };
    }

    let single = total == 1;
    let mut sentences: Vec<Sentence> = changes
        .iter()
        .map(|c| Sentence {
            kind: c.kind(),
            text: c.render(&voice, single),
        })
        .collect();
    sentences.extend(chains.iter().map(|chain| Sentence {
        kind: ChangeKind::ShiftOnly,
        text: render_chain(&voice, chain, single),
    }));

    let header = header(&sentences, context);
    let closing = (!single).then(|| Utterance::from_text(config.summary_line.clone()));
    let recap = recap(&voice);
    debug!(
        inning = %context.inning_label(),
        sentences = sentences.len(),
        recap = recap.len(),
        "composed announcement"
    );
    Announcement {
        header,
        sentences,
        recap,
        closing,
    }
}

// ---------------------------------------------------------------------------
// Classification (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shift {
    player: PlayerId,
    from: Position,
    to: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    SamePositionPinch {
        position: Position,
        original: Option<PlayerId>,
        player: PlayerId,
        pinch: PinchKind,
    },
    Mixed {
        old: Option<PlayerId>,
        player: PlayerId,
        to: Position,
        pinch: Option<PinchKind>,
    },
    Replace {
        position: Position,
        old: Option<PlayerId>,
        player: PlayerId,
    },
    Reentry {
        position: Position,
        old: Option<PlayerId>,
        player: PlayerId,
    },
    PinchAtBat {
        order: u8,
        old: PlayerId,
        player: PlayerId,
        pinch: PinchKind,
        base: Option<Base>,
    },
    TemporaryRun {
        base: Base,
        original: PlayerId,
        player: PlayerId,
    },
    DhRelease {
        order: u8,
        dh: PlayerId,
        pitcher: PlayerId,
    },
}

impl Change {
    fn kind(&self) -> ChangeKind {
        match *self {
            Change::SamePositionPinch { pinch, .. } => ChangeKind::SamePositionPinch { pinch },
            Change::Mixed { pinch, .. } => ChangeKind::Mixed { pinch },
            Change::Replace { .. } => ChangeKind::ReplaceOnly,
            Change::Reentry { .. } => ChangeKind::Reentry,
            Change::PinchAtBat { pinch, .. } => ChangeKind::PinchAtBat { pinch },
            Change::TemporaryRun { .. } => ChangeKind::TemporaryRun,
            Change::DhRelease { .. } => ChangeKind::DhRelease,
        }
    }

    /// (stage, group, key) sort key.
    fn rank(&self) -> (u8, u8, u8) {
        match *self {
            Change::Reentry { position, .. } | Change::SamePositionPinch { position, .. } => {
                (1, 0, position.priority())
            }
            Change::Mixed { to, .. } => (2, 0, to.priority()),
            Change::Replace { position, .. } => (2, 0, position.priority()),
            Change::DhRelease { .. } => (2, 0, Position::DesignatedHitter.priority()),
            Change::PinchAtBat { order, .. } => (2, 1, order),
            Change::TemporaryRun { base, .. } => (2, 2, base as u8),
        }
    }
}

fn classify(state: &GameState) -> (Vec<Change>, Vec<Shift>) {
    let current = &state.current;
    let baseline = &state.baseline;
    let mut changes = Vec::new();
    let mut shifts = Vec::new();

    for slot in current.order.iter() {
        let Some(before) = baseline.order.get(slot.order) else {
            continue;
        };
        let player = slot.player;
        let now = current.position_of(player);
        let predecessor = state.ledger.predecessor_of(player).map(|(p, _)| p);
        let same_position_pinch = |to: Position| {
            slot.reason
                .pinch_kind()
                .filter(|_| state.ledger.vacated_position(player) == Some(to))
        };

        if player == before.player {
            match (baseline.position_of(player), now) {
                (Some(from), Some(to)) if from != to => shifts.push(Shift { player, from, to }),
                (None, Some(to)) => match same_position_pinch(to) {
                    Some(pinch) => changes.push(Change::SamePositionPinch {
                        position: to,
                        original: predecessor,
                        player,
                        pinch,
                    }),
                    None => changes.push(Change::Mixed {
                        old: None,
                        player,
                        to,
                        pinch: slot.reason.pinch_kind(),
                    }),
                },
                _ => {}
            }
            continue;
        }

        let old = before.player;
        let change = match (slot.reason, now) {
            (SlotReason::Reentry, Some(position)) => Change::Reentry {
                position,
                old: Some(old),
                player,
            },
            (SlotReason::DhRemoved, _) => Change::DhRelease {
                order: slot.order,
                dh: old,
                pitcher: player,
            },
            (reason, None) | (reason @ (SlotReason::PinchHit | SlotReason::PinchRun), Some(Position::DesignatedHitter)) => {
                Change::PinchAtBat {
                    order: slot.order,
                    old,
                    player,
                    pinch: reason.pinch_kind().unwrap_or(PinchKind::Hit),
                    base: state.runners.base_of(player),
                }
            }
            (_, Some(to)) => match same_position_pinch(to) {
                Some(pinch) => Change::SamePositionPinch {
                    position: to,
                    original: predecessor,
                    player,
                    pinch,
                },
                None if baseline.position_of(old) == Some(to) => Change::Replace {
                    position: to,
                    old: Some(old),
                    player,
                },
                None => Change::Mixed {
                    old: Some(old),
                    player,
                    to,
                    pinch: None,
                },
            },
        };
        changes.push(change);
    }

    // Pitcher outside the batting order while a DH is in use.
    if let Some(pitcher) = current.non_batting_pitcher() {
        let old = baseline.occupant(Position::Pitcher);
        if old != Some(pitcher) {
            let reentered = state.ledger.reentered.contains(&pitcher)
                && state
                    .ledger
                    .predecessor_of(pitcher)
                    .map(|(_, r)| r.reason == SlotReason::Reentry)
                    .unwrap_or(false);
            changes.push(if reentered {
                Change::Reentry {
                    position: Position::Pitcher,
                    old,
                    player: pitcher,
                }
            } else {
                Change::Replace {
                    position: Position::Pitcher,
                    old,
                    player: pitcher,
                }
            });
        }
    }

    for (&base, runner) in &state.runners.runners {
        if !runner.temporary || state.baseline_runners.get(&base) == Some(runner) {
            continue;
        }
        let original = state
            .runners
            .pending_temporary(base)
            .and_then(|(_, order)| current.order.get(order));
        if let Some(slot) = original {
            changes.push(Change::TemporaryRun {
                base,
                original: slot.player,
                player: runner.player,
            });
        }
    }

    (changes, shifts)
}

/// Order shifts into chains. A chain starts at a shift whose origin is no
/// other shift's destination and follows destination -> origin links.
/// Whatever is left over forms cycles, entered at their first position.
fn linearize(mut shifts: Vec<Shift>) -> Vec<Vec<Shift>> {
    shifts.sort_by_key(|s| s.from);
    let targets: BTreeSet<Position> = shifts.iter().map(|s| s.to).collect();
    let mut used = vec![false; shifts.len()];
    let mut chains = Vec::new();

    let follow = |start: usize, used: &mut Vec<bool>| {
        let mut chain = Vec::new();
        let mut next = Some(start);
        while let Some(i) = next {
            if used[i] {
                break;
            }
            used[i] = true;
            chain.push(shifts[i]);
            next = shifts
                .iter()
                .position(|s| s.from == shifts[i].to);
        }
        chain
    };

    for head in 0..shifts.len() {
        if !targets.contains(&shifts[head].from) && !used[head] {
            chains.push(follow(head, &mut used));
        }
    }
    while let Some(start) = used.iter().position(|u| !u) {
        chains.push(follow(start, &mut used));
    }
    chains
}

// ---------------------------------------------------------------------------
// Rendering (private)
// ---------------------------------------------------------------------------

struct Voice<'a> {
    state: &'a GameState,
    roster: &'a Roster,
    config: &'a EngineConfig,
}

impl<'a> Voice<'a> {
    fn line(&self) -> Line<'_> {
        Line {
            voice: self,
            out: Utterance::new(),
        }
    }

    /// Family name, or the full name when it is shared on the roster.
    fn name_parts(&self, id: PlayerId) -> (Vec<NamePart>, String) {
        let Some(player) = self.roster.get(id) else {
            let parts = vec![NamePart {
                text: id.to_string(),
                reading: String::new(),
            }];
            return (parts, self.config.honorific(false).to_string());
        };
        let mut parts = vec![NamePart {
            text: player.family_name.clone(),
            reading: player.family_reading.clone(),
        }];
        if self.roster.shares_family_name(id) {
            parts.push(NamePart {
                text: player.given_name.clone(),
                reading: player.given_reading.clone(),
            });
        }
        (parts, self.config.honorific(player.female).to_string())
    }

    fn plain_name(&self, id: PlayerId) -> String {
        self.name_parts(id)
            .0
            .into_iter()
            .map(|p| p.text)
            .collect()
    }

    fn number(&self, id: PlayerId) -> String {
        self.roster
            .get(id)
            .map(|p| p.number.clone())
            .unwrap_or_default()
    }
}

struct Line<'a> {
    voice: &'a Voice<'a>,
    out: Utterance,
}

impl<'a> Line<'a> {
    fn text(mut self, text: &str) -> Self {
        self.out.push_text(text);
        self
    }

    fn player(mut self, id: PlayerId) -> Self {
        let (parts, honorific) = self.voice.name_parts(id);
        self.out.push_player(parts, honorific);
        self
    }

    /// `サード、佐藤くん、背番号12。`
    fn closing(self, label: &str, id: PlayerId) -> Self {
        let number = self.voice.number(id);
        self.text(label)
            .text("、")
            .player(id)
            .text("、背番号")
            .text(&number)
            .text("。")
    }

    /// How the departing player is introduced, judged from the lineup as
    /// last announced.
    fn departing(self, old: PlayerId) -> Self {
        let baseline = &self.voice.state.baseline;
        if let Some(position) = baseline.position_of(old) {
            return self.text(position.label()).text("の").player(old);
        }
        let pinch = baseline
            .order_of(old)
            .and_then(|o| baseline.order.get(o))
            .and_then(|s| s.reason.pinch_kind());
        match pinch {
            Some(kind) => self
                .text("先ほど")
                .text(kind.label())
                .text("いたしました")
                .player(old),
            None => self.player(old),
        }
    }

    fn done(self) -> Utterance {
        self.out
    }
}

impl Change {
    fn render(&self, voice: &Voice<'_>, single: bool) -> Utterance {
        let line = voice.line();
        let line = match *self {
            Change::SamePositionPinch {
                position,
                original,
                player,
                pinch,
            } => {
                let line = line.text("先ほど");
                let line = match original {
                    Some(o) => line.player(o).text("の"),
                    None => line,
                };
                line.text(pinch.label())
                    .text("に出ました")
                    .player(player)
                    .text("が、そのまま入り、")
                    .text(position.label())
                    .text("。")
            }
            Change::Mixed {
                old: Some(old),
                player,
                to,
                ..
            } => {
                let line = line
                    .departing(old)
                    .text("に代わりまして、")
                    .player(player)
                    .text("が入り、")
                    .text(to.label())
                    .text("。");
                if single {
                    line.closing(to.label(), player)
                } else {
                    line
                }
            }
            Change::Mixed {
                old: None,
                player,
                to,
                pinch,
            } => {
                let line = match pinch {
                    Some(kind) => line.text("先ほど").text(kind.label()).text("いたしました"),
                    None => line,
                };
                let line = line
                    .player(player)
                    .text("が")
                    .text(to.label())
                    .text("に入ります。");
                if single {
                    line.closing(to.label(), player)
                } else {
                    line
                }
            }
            Change::Replace {
                position,
                old,
                player,
            } => {
                let label = position.label();
                match (old, single) {
                    (Some(old), true) => line
                        .departing(old)
                        .text("に代わりまして、")
                        .player(player)
                        .text("が入ります。")
                        .closing(label, player),
                    (Some(old), false) => line
                        .departing(old)
                        .text("に代わりまして、")
                        .player(player)
                        .text("、")
                        .text(label)
                        .text("。"),
                    (None, true) => line
                        .text(label)
                        .text("に")
                        .player(player)
                        .text("が入ります。")
                        .closing(label, player),
                    (None, false) => line.text(label).text("に").player(player).text("が入ります。"),
                }
            }
            Change::Reentry {
                position,
                old,
                player,
            } => {
                let line = match old {
                    Some(old) => line.departing(old).text("に代わりまして、"),
                    None => line,
                };
                line.player(player)
                    .text("がリエントリーで")
                    .text(position.label())
                    .text("に戻ります。")
            }
            Change::PinchAtBat {
                order,
                old,
                player,
                pinch: PinchKind::Hit,
                ..
            } => {
                let line = line
                    .text(&format!("{}番、", order))
                    .player(old)
                    .text("に代わりまして、")
                    .player(player)
                    .text("。");
                if single {
                    line.closing("バッターは", player)
                } else {
                    line
                }
            }
            Change::PinchAtBat {
                old,
                player,
                pinch: PinchKind::Run,
                base,
                ..
            } => {
                let label = base.map(Base::runner_label).unwrap_or("ランナー");
                let line = line
                    .text(label)
                    .text("の")
                    .player(old)
                    .text("に代わりまして、")
                    .player(player)
                    .text("。");
                if single {
                    line.closing(&format!("{}は", label), player)
                } else {
                    line
                }
            }
            Change::TemporaryRun {
                base,
                original,
                player,
            } => {
                let label = base.runner_label();
                let line = line
                    .text(label)
                    .text("、")
                    .player(original)
                    .text("に代わりまして臨時代走、")
                    .player(player)
                    .text("。");
                if single {
                    line.closing(&format!("{}は", label), player)
                } else {
                    line
                }
            }
            Change::DhRelease { order, dh, pitcher } => line
                .text("指名打者の")
                .player(dh)
                .text("に代わりまして、ピッチャーの")
                .player(pitcher)
                .text(&format!("が{}番に入ります。", order)),
        };
        line.done()
    }
}

/// `サードの鈴木くんがショート、ショートの田中くんがレフト。`
fn render_chain(voice: &Voice<'_>, chain: &[Shift], single: bool) -> Utterance {
    let mut line = voice.line();
    for (i, shift) in chain.iter().enumerate() {
        if i > 0 {
            line = line.text("、");
        }
        line = line
            .text(shift.from.label())
            .text("の")
            .player(shift.player)
            .text("が")
            .text(shift.to.label());
    }
    let end = if single { "に入ります。" } else { "。" };
    line.text(end).done()
}

fn header(sentences: &[Sentence], context: &TeamContext) -> Option<Utterance> {
    if sentences.iter().all(|s| s.kind.is_self_contained()) {
        return None;
    }
    let seats = sentences.iter().any(|s| s.kind.is_seat_change());
    let players = sentences.iter().any(|s| !s.kind.is_seat_change());
    let subject = match (players, seats) {
        (true, true) => "選手の交代並びにシートの変更",
        (true, false) => "選手の交代",
        _ => "シートの変更",
    };
    let mut text = String::new();
    if !context.team_name.is_empty() {
        text.push_str(&context.team_name);
        text.push('、');
    }
    text.push_str(subject);
    text.push_str("をお知らせいたします。");
    Some(Utterance::from_text(text))
}

/// One line per changed slot, then the pitcher outside the order.
fn recap(voice: &Voice<'_>) -> Vec<String> {
    let current = &voice.state.current;
    let baseline = &voice.state.baseline;
    let mut lines = Vec::new();
    for slot in current.order.iter() {
        let before = baseline.order.get(slot.order);
        let now = current.position_of(slot.player);
        let changed = match before {
            Some(b) => b.player != slot.player || baseline.position_of(b.player) != now,
            None => true,
        };
        if !changed {
            continue;
        }
        // A pinch entry still without a position is listed at the position
        // their chain vacated, as long as nobody else has taken it.
        let vacated = slot
            .reason
            .pinch_kind()
            .and_then(|_| voice.state.ledger.vacated_position(slot.player))
            .filter(|&p| current.occupant(p).is_none());
        let label = now
            .or(vacated)
            .map(Position::label)
            .or_else(|| slot.reason.pinch_kind().map(PinchKind::label));
        let name = voice.plain_name(slot.player);
        lines.push(match label {
            Some(label) => format!("{}番 {} {}", slot.order, label, name),
            None => format!("{}番 {}", slot.order, name),
        });
    }
    if let Some(pitcher) = current.non_batting_pitcher() {
        if baseline.occupant(Position::Pitcher) != Some(pitcher) {
            lines.push(format!(
                "{} {}",
                Position::Pitcher.label(),
                voice.plain_name(pitcher)
            ));
        }
    }
    lines
}
