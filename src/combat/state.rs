//! Combat state tracking
//!
//! Owns the turn order, the round and turn pointers, and the participant
//! registry for a single combat:
//! - Turn order is the registry sorted by initiative, highest first, with
//!   ties kept in insertion order
//! - The turn pointer is always a valid index when the order is non-empty
//! - The round only advances when the pointer wraps back to the top

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::effects::{Effect, ExpiredEffect};
use super::participant::Participant;

/// State of one combat
#[derive(Debug, Clone, Serialize)]
pub struct CombatState {
    #[serde(rename = "turnOrder")]
    turn_order: Vec<String>,
    #[serde(rename = "currentTurnIndex")]
    current_turn_index: usize,
    #[serde(rename = "currentRound")]
    current_round: u32,
    /// Registry in insertion order
    participants: IndexMap<String, Participant>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatState {
    /// Create an empty, active combat at round 1
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            turn_order: Vec::new(),
            current_turn_index: 0,
            current_round: 1,
            participants: IndexMap::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn turn_order(&self) -> &[String] {
        &self.turn_order
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Participants in insertion order
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.contains_key(id)
    }

    /// Mark the combat as over. The registry stays inspectable.
    pub(crate) fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Add a participant (or replace one with the same id) and re-sort
    pub fn add_participant(&mut self, participant: Participant) {
        debug!(
            "Adding {} to combat (initiative {})",
            participant.id, participant.initiative
        );
        self.participants.insert(participant.id.clone(), participant);
        self.recompute_turn_order();
        self.touch();
    }

    /// Remove a participant. Returns whether it was present.
    pub fn remove_participant(&mut self, id: &str) -> bool {
        if self.participants.shift_remove(id).is_none() {
            return false;
        }
        debug!("Removed {} from combat", id);
        self.recompute_turn_order();
        self.touch();
        true
    }

    fn recompute_turn_order(&mut self) {
        let mut ordered: Vec<&Participant> = self.participants.values().collect();
        // sort_by is stable: equal initiatives keep insertion order
        ordered.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        self.turn_order = ordered.into_iter().map(|p| p.id.clone()).collect();

        if self.current_turn_index >= self.turn_order.len() {
            self.current_turn_index = self.turn_order.len().saturating_sub(1);
        }
    }

    /// Advance the turn pointer, starting a new round on wrap
    pub fn end_turn(&mut self) {
        if self.turn_order.is_empty() {
            return;
        }

        self.current_turn_index = (self.current_turn_index + 1) % self.turn_order.len();
        if self.current_turn_index == 0 {
            self.current_round += 1;
            debug!("Round {} begins", self.current_round);
        }
        self.touch();
    }

    pub fn current_participant_id(&self) -> Option<&str> {
        self.turn_order
            .get(self.current_turn_index)
            .map(String::as_str)
    }

    pub fn current_participant(&self) -> Option<&Participant> {
        self.current_participant_id()
            .and_then(|id| self.participants.get(id))
    }

    pub fn next_participant_id(&self) -> Option<&str> {
        if self.turn_order.is_empty() {
            return None;
        }
        let next = (self.current_turn_index + 1) % self.turn_order.len();
        self.turn_order.get(next).map(String::as_str)
    }

    /// Move a participant to the end of the turn order without touching
    /// its initiative.
    ///
    /// The participant holding the turn keeps it, unless it is the one
    /// being moved: then the turn passes to whoever followed it.
    /// Returns false if the participant is unknown.
    pub fn move_to_end(&mut self, id: &str) -> bool {
        if !self.participants.contains_key(id) {
            return false;
        }

        let was_current = self.current_participant_id() == Some(id);
        if let Some(pos) = self.turn_order.iter().position(|t| t == id) {
            let moved = self.turn_order.remove(pos);
            self.turn_order.push(moved);

            if pos < self.current_turn_index {
                self.current_turn_index -= 1;
            } else if was_current && pos == self.turn_order.len() - 1 {
                // Last in the round already: the pointer wraps
                self.current_turn_index = 0;
                self.current_round += 1;
            }
        } else {
            self.turn_order.push(id.to_string());
        }

        self.touch();
        true
    }

    /// Attach an effect. Instant effects count as applied but are not
    /// stored. Returns false if the participant is unknown.
    pub fn apply_effect(&mut self, participant_id: &str, effect: Effect) -> bool {
        let Some(participant) = self.participants.get_mut(participant_id) else {
            return false;
        };

        if effect.is_instant() {
            // Resource changes for instant effects happen outside the engine
            debug!("Instant effect {} on {}", effect.name, participant_id);
            return true;
        }

        debug!("Effect {} applied to {}", effect.name, participant_id);
        participant.active_effects.push(effect);
        self.touch();
        true
    }

    /// Remove every effect with this exact name. Returns whether any was
    /// removed.
    pub fn remove_effect(&mut self, participant_id: &str, effect_name: &str) -> bool {
        let Some(participant) = self.participants.get_mut(participant_id) else {
            return false;
        };

        let before = participant.active_effects.len();
        participant.active_effects.retain(|e| e.name != effect_name);
        if participant.active_effects.len() < before {
            debug!("Effect {} removed from {}", effect_name, participant_id);
            self.touch();
            true
        } else {
            false
        }
    }

    /// Count one round off every per-round effect and drop the ones that
    /// ran out. Each call is one round boundary.
    pub fn update_effects(&mut self) -> Vec<ExpiredEffect> {
        for participant in self.participants.values_mut() {
            participant.active_effects.iter_mut().for_each(Effect::tick);
        }
        self.prune_expired_effects()
    }

    /// Count one round off a single participant's per-round effects
    /// without pruning them.
    pub fn tick_effects(&mut self, participant_id: &str) {
        if let Some(participant) = self.participants.get_mut(participant_id) {
            participant.active_effects.iter_mut().for_each(Effect::tick);
            self.touch();
        }
    }

    /// Drop per-round effects at zero duration and report them
    pub fn prune_expired_effects(&mut self) -> Vec<ExpiredEffect> {
        let mut expired = Vec::new();

        for (participant_id, participant) in self.participants.iter_mut() {
            let (gone, kept): (Vec<Effect>, Vec<Effect>) = participant
                .active_effects
                .drain(..)
                .partition(Effect::is_expired);
            participant.active_effects = kept;

            for effect in gone {
                debug!("Effect {} expired on {}", effect.name, participant_id);
                expired.push(ExpiredEffect {
                    participant_id: participant_id.clone(),
                    effect_name: effect.name.clone(),
                    effect,
                });
            }
        }

        if !expired.is_empty() {
            self.touch();
        }
        expired
    }

    /// Default end condition: at most one participant left
    pub fn is_combat_over(&self) -> bool {
        self.participants.len() <= 1
    }
}
