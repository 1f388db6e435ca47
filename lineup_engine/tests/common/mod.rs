//! Shared fixtures: a thirteen-player roster, a standard lineup and a DH
//! lineup.
#![allow(dead_code)]

use std::collections::BTreeMap;

use lineup_engine::domain::{BattingOrder, Half, Player};
use lineup_engine::{EngineConfig, Lineup, LineupEngine, PlayerId, Position, Roster, TeamContext};

pub const ITO: PlayerId = PlayerId(1);
pub const SUZUKI: PlayerId = PlayerId(2);
pub const TAKAHASHI: PlayerId = PlayerId(3);
pub const YAMADA: PlayerId = PlayerId(4);
pub const NAKAMURA: PlayerId = PlayerId(5);
pub const KOBAYASHI: PlayerId = PlayerId(6);
pub const WATANABE: PlayerId = PlayerId(7);
pub const MATSUMOTO: PlayerId = PlayerId(8);
pub const KATO: PlayerId = PlayerId(9);
pub const SATO: PlayerId = PlayerId(10);
pub const KIMURA: PlayerId = PlayerId(11);
pub const TANAKA: PlayerId = PlayerId(12);
pub const YOSHIDA: PlayerId = PlayerId(13);

fn player(id: PlayerId, family: &str, given: &str, family_reading: &str, given_reading: &str, number: &str) -> Player {
    Player {
        id,
        family_name: family.into(),
        given_name: given.into(),
        family_reading: family_reading.into(),
        given_reading: given_reading.into(),
        number: number.into(),
        female: false,
    }
}

pub fn roster() -> Roster {
    let mut yoshida = player(YOSHIDA, "吉田", "花子", "よしだ", "はなこ", "15");
    yoshida.female = true;
    Roster {
        name: "東高校".into(),
        players: vec![
            player(ITO, "伊藤", "健", "いとう", "けん", "8"),
            player(SUZUKI, "鈴木", "翔", "すずき", "しょう", "6"),
            player(TAKAHASHI, "高橋", "大輔", "たかはし", "だいすけ", "3"),
            player(YAMADA, "山田", "太郎", "やまだ", "たろう", "5"),
            player(NAKAMURA, "中村", "悠", "なかむら", "ゆう", "7"),
            player(KOBAYASHI, "小林", "亮", "こばやし", "りょう", "2"),
            player(WATANABE, "渡辺", "陸", "わたなべ", "りく", "4"),
            player(MATSUMOTO, "松本", "蓮", "まつもと", "れん", "9"),
            player(KATO, "加藤", "翼", "かとう", "つばさ", "1"),
            player(SATO, "佐藤", "一郎", "さとう", "いちろう", "12"),
            player(KIMURA, "木村", "拓", "きむら", "たく", "14"),
            player(TANAKA, "田中", "誠", "たなか", "まこと", "10"),
            yoshida,
        ],
    }
}

fn assignments() -> BTreeMap<Position, PlayerId> {
    BTreeMap::from([
        (Position::Pitcher, KATO),
        (Position::Catcher, KOBAYASHI),
        (Position::First, TAKAHASHI),
        (Position::Second, WATANABE),
        (Position::Third, YAMADA),
        (Position::Short, SUZUKI),
        (Position::Left, NAKAMURA),
        (Position::Center, ITO),
        (Position::Right, MATSUMOTO),
    ])
}

/// Slot n holds player n; Yamada bats 4th and plays third.
pub fn standard_lineup() -> Lineup {
    Lineup {
        assignments: assignments(),
        order: BattingOrder::new([
            ITO, SUZUKI, TAKAHASHI, YAMADA, NAKAMURA, KOBAYASHI, WATANABE, MATSUMOTO, KATO,
        ]),
    }
}

/// Tanaka is the DH batting 2nd; Kato pitches without batting.
pub fn dh_lineup() -> Lineup {
    let mut assignments = assignments();
    assignments.insert(Position::DesignatedHitter, TANAKA);
    Lineup {
        assignments,
        order: BattingOrder::new([
            ITO, TANAKA, TAKAHASHI, YAMADA, NAKAMURA, KOBAYASHI, WATANABE, MATSUMOTO, SUZUKI,
        ]),
    }
}

pub fn context() -> TeamContext {
    TeamContext {
        team_name: "東高校".into(),
        inning: 7,
        half: Half::Bottom,
        is_home: true,
    }
}

pub fn engine() -> LineupEngine {
    LineupEngine::new(roster(), standard_lineup(), EngineConfig::default()).unwrap()
}

pub fn dh_engine() -> LineupEngine {
    LineupEngine::new(roster(), dh_lineup(), EngineConfig::default()).unwrap()
}

pub fn speech_lines(engine: &LineupEngine) -> Vec<String> {
    engine
        .compose(&context())
        .sentences
        .iter()
        .map(|s| s.text.speech())
        .collect()
}
