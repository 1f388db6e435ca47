/// Defensive positions and bases.
///
/// One table maps every position to its storage key, its full PA label
/// and its single-character scorebook code. Both the tracker and the
/// composer read labels from here.

use serde::{Deserialize, Serialize};

/// Defensive position. Declaration order is announcement priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Pitcher,
    Catcher,
    First,
    Second,
    Third,
    Short,
    Left,
    Center,
    Right,
    DesignatedHitter,
}

// (position, key, label, code)
static POSITION_TABLE: [(Position, &str, &str, &str); 10] = [
    (Position::Pitcher, "pitcher", "ピッチャー", "投"),
    (Position::Catcher, "catcher", "キャッチャー", "捕"),
    (Position::First, "first", "ファースト", "一"),
    (Position::Second, "second", "セカンド", "二"),
    (Position::Third, "third", "サード", "三"),
    (Position::Short, "short", "ショート", "遊"),
    (Position::Left, "left", "レフト", "左"),
    (Position::Center, "center", "センター", "中"),
    (Position::Right, "right", "ライト", "右"),
    (Position::DesignatedHitter, "designated_hitter", "指名打者", "指"),
];

impl Position {
    pub const ALL: [Position; 10] = [
        Position::Pitcher,
        Position::Catcher,
        Position::First,
        Position::Second,
        Position::Third,
        Position::Short,
        Position::Left,
        Position::Center,
        Position::Right,
        Position::DesignatedHitter,
    ];

    fn entry(self) -> &'static (Position, &'static str, &'static str, &'static str) {
        &POSITION_TABLE[self.priority() as usize]
    }

    /// Lower value is announced first.
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn key(self) -> &'static str {
        self.entry().1
    }

    /// Full label as read over the PA, e.g. `サード`.
    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Scorebook code, e.g. `三`.
    pub fn code(self) -> &'static str {
        self.entry().3
    }

    pub fn from_key(key: &str) -> Option<Self> {
        POSITION_TABLE.iter().find(|e| e.1 == key).map(|e| e.0)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        POSITION_TABLE.iter().find(|e| e.2 == label).map(|e| e.0)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        POSITION_TABLE.iter().find(|e| e.3 == code).map(|e| e.0)
    }

    pub fn is_designated_hitter(self) -> bool {
        self == Position::DesignatedHitter
    }
}

/// Occupiable base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    pub fn key(self) -> &'static str {
        match self {
            Base::First => "first",
            Base::Second => "second",
            Base::Third => "third",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Base::ALL.into_iter().find(|b| b.key() == key)
    }

    /// `一塁ランナー` and friends.
    pub fn runner_label(self) -> &'static str {
        match self {
            Base::First => "一塁ランナー",
            Base::Second => "二塁ランナー",
            Base::Third => "三塁ランナー",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_bidirectional() {
        for p in Position::ALL {
            assert_eq!(Position::from_key(p.key()), Some(p));
            assert_eq!(Position::from_label(p.label()), Some(p));
            assert_eq!(Position::from_code(p.code()), Some(p));
        }
    }

    #[test]
    fn priority_follows_declaration_order() {
        assert!(Position::Pitcher < Position::Catcher);
        assert!(Position::Right < Position::DesignatedHitter);
        assert_eq!(Position::Third.label(), "サード");
        assert_eq!(Position::Short.code(), "遊");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(Position::from_label("ピッチ"), None);
        assert_eq!(Position::from_code("x"), None);
        assert_eq!(Base::from_key("home"), None);
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&Position::DesignatedHitter).unwrap();
        assert_eq!(json, "\"designated_hitter\"");
        let base: Base = serde_json::from_str("\"second\"").unwrap();
        assert_eq!(base, Base::Second);
    }
}
