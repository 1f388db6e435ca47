/// Canonical hashing.
///
/// Deterministic canonical serialization + SHA-256 hashing of the game
/// state bundle. Produces byte-identical output across runs and platforms.
///
/// Rules:
///   - every map in the state is a BTreeMap/BTreeSet, so keys come out sorted
///   - struct fields keep declaration order (`preserve_order`)
///   - UTF-8 JSON, no whitespace, no floats

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::state::GameState;
use crate::STATE_VERSION;

/// Canonical serialization of the state to UTF-8 JSON bytes.
/// `state_version` is the first field so a format change alters the hash.
pub fn canonical_serialize(state: &GameState) -> Result<Vec<u8>> {
    let mut root = Map::new();
    root.insert(
        "state_version".to_string(),
        Value::Number(u64::from(STATE_VERSION).into()),
    );
    root.insert("state".to_string(), serde_json::to_value(state)?);
    Ok(serde_json::to_vec(&Value::Object(root))?)
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &GameState) -> Result<String> {
    let bytes = canonical_serialize(state)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BattingOrder, Lineup, Player, PlayerId, Roster};
    use crate::position::Position;
    use std::collections::BTreeMap;

    fn state() -> GameState {
        let roster = Roster {
            name: "東高校".into(),
            players: (1..=9)
                .map(|n| Player {
                    id: PlayerId(n),
                    family_name: format!("選手{}", n),
                    given_name: String::new(),
                    family_reading: format!("せんしゅ{}", n),
                    given_reading: String::new(),
                    number: n.to_string(),
                    female: false,
                })
                .collect(),
        };
        let assignments: BTreeMap<Position, PlayerId> = Position::ALL[..9]
            .iter()
            .zip(1..)
            .map(|(&p, n)| (p, PlayerId(n)))
            .collect();
        let lineup = Lineup {
            assignments,
            order: BattingOrder::new([1, 2, 3, 4, 5, 6, 7, 8, 9].map(PlayerId)),
        };
        GameState::from_lineup(lineup, &roster).unwrap()
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let s = state();
        let h1 = canonical_hash(&s).unwrap();
        let h2 = canonical_hash(&s.clone()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn version_leads_the_document() {
        let bytes = canonical_serialize(&state()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\"state_version\":"), "{}", text);
        assert!(!text.contains(' '));
    }

    #[test]
    fn any_change_alters_the_hash() {
        let a = state();
        let mut b = a.clone();
        b.benched_out.insert(PlayerId(42));
        assert_ne!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
    }
}
