//! Effect scenario tests
//!
//! Tests effect application, decay per round boundary, and expiry during
//! turn advances

use combat_engine::combat::{DurationKind, Effect, EffectKind, TriggerPhase};

use crate::harness::TestCombat;

/// Test: a 2-round poison survives one update and expires on the second
#[tokio::test]
async fn test_poison_expires_after_two_updates() {
    let combat = TestCombat::start(&[("A", 15), ("B", 15), ("C", 30)], [10]).await;
    combat
        .service
        .apply_effect("A", Effect::per_round("Poison", EffectKind::Damage, 2))
        .await
        .unwrap();

    let expired = combat.service.update_effects().await.unwrap();
    assert!(expired.is_empty());
    let info = combat.service.participant_info("A").await.unwrap();
    assert_eq!(info.active_effects[0].name, "Poison");
    assert_eq!(info.active_effects[0].duration, 1);

    let expired = combat.service.update_effects().await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].participant_id, "A");
    assert_eq!(expired[0].effect_name, "Poison");
    assert_eq!(combat.service.participant_info("A").await.unwrap().total_effects, 0);
}

/// Test: per-round effects expire on exactly the d-th update; permanent
/// effects never do
#[tokio::test]
async fn test_expiry_timing() {
    let combat = TestCombat::start(&[("A", 10)], [10]).await;
    for d in 1..=4u32 {
        combat
            .service
            .apply_effect("A", Effect::per_round(format!("Hex{}", d), EffectKind::Debuff, d))
            .await
            .unwrap();
    }
    combat
        .service
        .apply_effect("A", Effect::permanent("Undead Curse", EffectKind::Debuff))
        .await
        .unwrap();

    for call in 1..=10u32 {
        let expired = combat.service.update_effects().await.unwrap();
        let names: Vec<String> = expired.into_iter().map(|e| e.effect_name).collect();
        if call <= 4 {
            assert_eq!(names, vec![format!("Hex{}", call)], "call {}", call);
        } else {
            assert!(names.is_empty(), "call {}", call);
        }
    }

    let info = combat.service.participant_info("A").await.unwrap();
    assert_eq!(info.total_effects, 1);
    assert_eq!(info.active_effects[0].name, "Undead Curse");
}

/// Test: instant effects are accepted but never stored
#[tokio::test]
async fn test_instant_effect_not_stored() {
    let combat = TestCombat::start(&[("A", 10)], [10]).await;
    combat
        .service
        .apply_effect(
            "A",
            Effect::new("Lightning Bolt", EffectKind::Damage, 0, DurationKind::Instant)
                .with_value(12),
        )
        .await
        .unwrap();
    assert_eq!(combat.service.participant_info("A").await.unwrap().total_effects, 0);
}

/// Test: a poisoned actor's turn ends with a damage trigger, and the next
/// actor's buff fires at the start of their turn
#[tokio::test]
async fn test_turn_advance_triggers() {
    let combat = TestCombat::start(&[("knight", 20), ("goblin", 10)], [10]).await;
    combat
        .service
        .apply_effect("knight", Effect::per_round("Poison", EffectKind::Damage, 2).with_value(4))
        .await
        .unwrap();
    combat
        .service
        .apply_effect("goblin", Effect::per_round("Frenzy", EffectKind::Buff, 3))
        .await
        .unwrap();

    let advance = combat.service.advance_turn().await.unwrap();
    let phases: Vec<(TriggerPhase, &str)> = advance
        .triggers
        .iter()
        .map(|t| (t.phase, t.participant_id.as_str()))
        .collect();
    assert_eq!(
        phases,
        vec![(TriggerPhase::TurnEnd, "knight"), (TriggerPhase::TurnStart, "goblin")]
    );
    assert_eq!(advance.triggers[0].effect.value, Some(4));
    assert_eq!(advance.turn.unwrap().current_participant.id, "goblin");
}

/// Test: over full rounds of turn advances, a per-round effect counts down
/// once per round of its bearer
#[tokio::test]
async fn test_turn_advance_counts_down_once_per_round() {
    let combat = TestCombat::start(&[("knight", 20), ("goblin", 10)], [10]).await;
    combat
        .service
        .apply_effect("knight", Effect::per_round("Poison", EffectKind::Damage, 2))
        .await
        .unwrap();

    // Round 1: knight -> goblin -> knight
    let first = combat.service.advance_turn().await.unwrap();
    assert!(first.expired.is_empty());
    let second = combat.service.advance_turn().await.unwrap();
    assert!(second.expired.is_empty());
    let poison = combat.service.participant_info("knight").await.unwrap();
    assert_eq!(poison.active_effects[0].duration, 1);

    // Round 2: knight's turn ends again
    let third = combat.service.advance_turn().await.unwrap();
    assert_eq!(third.expired.len(), 1);
    assert_eq!(third.expired[0].participant_id, "knight");
    assert_eq!(third.turn.unwrap().current_round, 2);
}

/// Test: removing an effect clears every effect with that exact name
#[tokio::test]
async fn test_remove_effect_by_name() {
    let combat = TestCombat::start(&[("A", 10)], [10]).await;
    for rounds in [1, 3] {
        combat
            .service
            .apply_effect("A", Effect::per_round("Bleed", EffectKind::Damage, rounds))
            .await
            .unwrap();
    }

    assert!(combat.service.remove_effect("A", "bleed").await.is_err());
    combat.service.remove_effect("A", "Bleed").await.unwrap();
    assert_eq!(combat.service.participant_info("A").await.unwrap().total_effects, 0);
}
