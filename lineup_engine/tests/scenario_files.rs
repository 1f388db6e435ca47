//! Replays the scenario files shipped in `scenarios/` and checks the
//! announcement they produce. Each file is replayed twice; both runs must
//! agree byte for byte.

use lineup_engine::scenario::Scenario;
use lineup_engine::{ChangeKind, Outcome};

fn load(name: &str) -> Scenario {
    Scenario::load(format!("scenarios/{}", name)).unwrap_or_else(|e| panic!("{}: {}", name, e))
}

#[test]
fn pinch_hitter_stays_at_third() {
    let scenario = load("pinch_hitter_stays_at_third.json");
    let report = scenario.run().unwrap();
    assert!(report.outcomes.iter().all(|o| *o == Outcome::Applied));

    let ann = &report.announcement;
    assert_eq!(ann.sentences.len(), 1);
    assert!(matches!(ann.sentences[0].kind, ChangeKind::SamePositionPinch { .. }));
    assert_eq!(
        ann.display_text(),
        "先ほど<ruby>山田<rt>やまだ</rt></ruby>くんの代打に出ました<ruby>佐藤<rt>さとう</rt></ruby>くんが、そのまま入り、サード。\n4番 サード 佐藤"
    );
}

#[test]
fn pinch_hitter_takes_third_with_shift() {
    let scenario = load("pinch_hitter_takes_third_with_shift.json");
    let report = scenario.run().unwrap();
    assert_eq!(report.outcomes.len(), 6);
    assert_eq!(
        report.announcement.speech_text(),
        "東高校、シートの変更をお知らせいたします。\n\
         先ほど代打いたしましたさとうくんがサードに入ります。\n\
         サードのすずきくんがショート。\n\
         以上に代わります。"
    );
}

#[test]
fn scenario_replay_is_deterministic() {
    for name in ["pinch_hitter_stays_at_third.json", "pinch_hitter_takes_third_with_shift.json"] {
        let scenario = load(name);
        let first = scenario.run().unwrap();
        let second = scenario.run().unwrap();
        assert_eq!(first.state_hash, second.state_hash, "{}", name);
        assert_eq!(first.announcement, second.announcement, "{}", name);
    }
}
