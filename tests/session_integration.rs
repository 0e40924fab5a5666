//! Game session integration tests against the bundled content

use mask_forge::battle::{BattleOutcome, ScaledCommit};
use mask_forge::rules::{load_content, Content};
use mask_forge::simulation::GameSession;
use std::path::Path;

fn content() -> Content {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/content.toml");
    load_content(&path).unwrap()
}

#[test]
fn test_bundled_content_loads() {
    let content = content();
    assert_eq!(content.registry.len(), 4);
    assert_eq!(content.enemies.len(), 3);
    assert!(content.enemy("Slime").is_some());
    for def in content.registry.iter() {
        assert!(!def.forest.is_empty(), "{} has no logic", def.id);
    }
}

#[test]
fn test_two_rounds_with_growth() {
    let mut session = GameSession::new(content()).unwrap();
    assert_eq!(session.inventory().len(), 5);

    // Round 1: ember, two whetstones and the pearl fit; the pearl refunds 1
    session.start_mask("Fox").unwrap();
    let bound = session.auto_bind().unwrap();
    assert_eq!(bound.len(), 4);
    assert_eq!(session.current_mask().unwrap().mana().current(), 1);
    assert_eq!(session.inventory().items()[0].name(), "Heartwood");
    session.end_make_phase();
    assert_eq!(session.inventory().len(), 1);

    let first = session.play_round("Slime").unwrap();
    assert_eq!(first.report.outcome, Some(BattleOutcome::Victory));
    assert_eq!(first.settlement.rewards, vec!["Whetstone".to_string()]);
    assert!(first.settlement.growth.is_empty());

    // Round 2: heartwood joins, its growth reads the permanent max HP
    let max_hp = session.record().actual.max_hp;
    session.start_mask("Owl").unwrap();
    assert_eq!(session.auto_bind().unwrap().len(), 2);
    session.end_make_phase();
    let second = session.play_round("Slime").unwrap();
    assert_eq!(second.settlement.round, 2);
    assert!((second.settlement.growth.max_hp - max_hp * 0.05).abs() < 1e-3);
    assert!((session.record().actual.max_hp - max_hp * 1.05).abs() < 1e-3);
    assert_eq!(session.library().len(), 2);
}

#[test]
fn test_scaled_commit_dampens_growth() {
    let mut session = GameSession::new(content())
        .unwrap()
        .with_committer(Box::new(ScaledCommit { factor: 0.0 }));
    let heartwood = session
        .inventory()
        .items()
        .iter()
        .find(|m| m.name() == "Heartwood")
        .unwrap()
        .id();
    session.start_mask("Stag").unwrap();
    session.bind_from_inventory(heartwood).unwrap();
    session.end_make_phase();

    let before = session.record().actual;
    let summary = session.play_round("Slime").unwrap();
    assert!(summary.settlement.growth.max_hp > 0.0);
    assert_eq!(session.record().actual, before);
}
