//! Turn order scenario tests
//!
//! Tests initiative sorting, turn rotation, rounds and delays

use combat_engine::combat::{CombatStatus, DiceSource, SeededDice};

use crate::harness::{participant, TestCombat};

async fn order_of(combat: &TestCombat) -> Vec<String> {
    match combat.service.status().await {
        CombatStatus::Active(snapshot) => snapshot.turn_order,
        CombatStatus::Idle => panic!("combat should be active"),
    }
}

/// Test: equal initiative keeps insertion order, a full rotation starts round 2
#[tokio::test]
async fn test_initiative_order_and_rounds() {
    let combat = TestCombat::start(&[("A", 15), ("B", 15), ("C", 30)], [10]).await;
    assert_eq!(combat.turn_order().await, vec!["C", "A", "B"]);
    assert_eq!(combat.current().await, "C");

    for expected in ["A", "B", "C"] {
        let report = combat.service.end_turn().await.unwrap();
        assert_eq!(report.next_participant_id, expected);
    }

    let turn = combat.service.current_turn().await.unwrap();
    assert_eq!(turn.current_participant.id, "C");
    assert_eq!(turn.current_round, 2);
}

/// Test: ending the turn len(order) times returns to the same participant
#[tokio::test]
async fn test_rotation_returns_to_start() {
    let combat = TestCombat::start(
        &[("knight", 12), ("archer", 17), ("mage", 8), ("rogue", 17), ("cleric", 3)],
        [10],
    )
    .await;

    // Start from the middle of the order
    combat.service.end_turn().await.unwrap();
    combat.service.end_turn().await.unwrap();
    let start = combat.service.current_turn().await.unwrap();

    for _ in 0..start.turn_order.len() {
        combat.service.end_turn().await.unwrap();
    }

    let after = combat.service.current_turn().await.unwrap();
    assert_eq!(after.current_participant.id, start.current_participant.id);
    assert_eq!(after.current_round, start.current_round + 1);
}

/// Test: random joins and departures always leave the order sorted by
/// initiative with ties in first-join order
#[tokio::test]
async fn test_add_remove_keeps_order_sorted() {
    let combat = TestCombat::start(&[], [10]).await;
    let mut dice = SeededDice::new(0xC0FFEE);

    // (id, initiative) in first-join order
    let mut joined: Vec<(String, i32)> = Vec::new();

    for step in 0..200 {
        let id = format!("p{}", dice.roll(12));
        if dice.roll(3) == 1 {
            let removed = combat.service.remove_participant(&id).await.is_ok();
            let was_present = joined.iter().any(|(j, _)| *j == id);
            assert_eq!(removed, was_present, "step {}", step);
            joined.retain(|(j, _)| *j != id);
        } else {
            let initiative = dice.roll(5) as i32 * 10;
            combat
                .service
                .add_participant(participant(&id, initiative))
                .await
                .unwrap();
            match joined.iter_mut().find(|(j, _)| *j == id) {
                Some(entry) => entry.1 = initiative,
                None => joined.push((id, initiative)),
            }
        }

        let mut expected = joined.clone();
        expected.sort_by(|a, b| b.1.cmp(&a.1));
        let expected: Vec<String> = expected.into_iter().map(|(id, _)| id).collect();
        assert_eq!(order_of(&combat).await, expected, "step {}", step);

        if let CombatStatus::Active(snapshot) = combat.service.status().await {
            if !snapshot.turn_order.is_empty() {
                assert!(snapshot.current_turn_index < snapshot.turn_order.len());
            } else {
                assert_eq!(snapshot.current_turn_index, 0);
            }
        }
    }
}

/// Test: delaying the current actor hands the turn on and moves them last
#[tokio::test]
async fn test_delay_current_actor() {
    let combat = TestCombat::start(&[("A", 15), ("B", 15), ("C", 30)], [10]).await;

    let result = combat.service.delay_turn("C").await.unwrap();
    assert_eq!(result.turn_order.last().map(String::as_str), Some("C"));
    assert_eq!(result.current_participant.as_deref(), Some("A"));
    assert_ne!(combat.current().await, "C");

    // Initiative is untouched
    let info = combat.service.participant_info("C").await.unwrap();
    assert_eq!(info.initiative, 30);

    // The delayed actor still acts this round
    assert_eq!(combat.service.end_turn().await.unwrap().next_participant_id, "B");
    let report = combat.service.end_turn().await.unwrap();
    assert_eq!(report.next_participant_id, "C");
    assert_eq!(report.current_round, 1);
}

/// Test: a participant joining mid-combat is slotted by initiative
#[tokio::test]
async fn test_join_mid_combat() {
    let combat = TestCombat::start(&[("A", 20), ("B", 10)], [10]).await;
    combat.service.end_turn().await.unwrap();

    combat
        .service
        .add_participant(participant("wyvern", 15))
        .await
        .unwrap();
    assert_eq!(combat.turn_order().await, vec!["A", "wyvern", "B"]);
}

/// Test: unknown participants cannot delay
#[tokio::test]
async fn test_delay_unknown_actor() {
    let combat = TestCombat::start(&[("A", 20)], [10]).await;
    assert!(combat.service.delay_turn("ghost").await.is_err());
}
