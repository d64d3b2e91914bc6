//! Combat manager
//!
//! Gatekeeper for the single combat a manager runs at a time. Owns the
//! current [`CombatState`] and forwards turn, participant and effect
//! operations to it once it has checked a combat is running.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use super::effects::{Effect, ExpiredEffect};
use super::participant::{Participant, ParticipantInfo};
use super::state::CombatState;
use super::CombatError;

/// Predicate deciding whether a combat has reached its end
pub type EndCondition = Arc<dyn Fn(&CombatState) -> bool + Send + Sync>;

/// Snapshot of whose turn it is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnInfo {
    pub combat_id: String,
    pub current_round: u32,
    pub current_turn_index: usize,
    pub current_participant: ParticipantInfo,
    pub turn_order: Vec<String>,
    pub total_participants: usize,
}

/// Full view of a running combat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatSnapshot {
    pub combat_id: String,
    pub is_active: bool,
    pub current_round: u32,
    pub current_turn_index: usize,
    pub turn_order: Vec<String>,
    pub participants_count: usize,
    pub participants: IndexMap<String, ParticipantInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a status query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CombatStatus {
    /// No combat in progress
    Idle,
    Active(CombatSnapshot),
}

/// Runs at most one combat at a time
pub struct CombatManager {
    state: Option<CombatState>,
    combat_id: Option<String>,
    end_condition: EndCondition,
}

impl fmt::Debug for CombatManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatManager")
            .field("state", &self.state)
            .field("combat_id", &self.combat_id)
            .finish_non_exhaustive()
    }
}

impl Default for CombatManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatManager {
    /// Create a manager with no combat and the default end condition
    pub fn new() -> Self {
        Self {
            state: None,
            combat_id: None,
            end_condition: Arc::new(CombatState::is_combat_over),
        }
    }

    /// Replace the end-of-combat predicate
    pub fn with_end_condition(
        mut self,
        condition: impl Fn(&CombatState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.end_condition = Arc::new(condition);
        self
    }

    /// Start a new combat with the given participants.
    ///
    /// Fails if a combat is already active. A previously ended combat is
    /// discarded.
    pub fn start_combat(
        &mut self,
        participants: impl IntoIterator<Item = Participant>,
    ) -> Result<String, CombatError> {
        if self.is_combat_active() {
            return Err(CombatError::CombatAlreadyActive);
        }

        let combat_id = uuid::Uuid::new_v4().to_string();
        let mut state = CombatState::new();
        for participant in participants {
            state.add_participant(participant);
        }

        info!(
            "Combat {} started with {} participants",
            combat_id,
            state.participant_count()
        );
        self.state = Some(state);
        self.combat_id = Some(combat_id.clone());
        Ok(combat_id)
    }

    /// End the current combat. Returns whether there was one to end.
    pub fn end_combat(&mut self) -> bool {
        match self.state.as_mut() {
            Some(state) => {
                state.deactivate();
                info!(
                    "Combat {} ended after {} rounds",
                    self.combat_id.as_deref().unwrap_or("?"),
                    state.current_round()
                );
                true
            }
            None => false,
        }
    }

    pub fn is_combat_active(&self) -> bool {
        self.state.as_ref().is_some_and(CombatState::is_active)
    }

    /// Current (or last) combat state
    pub fn state(&self) -> Option<&CombatState> {
        self.state.as_ref()
    }

    pub fn combat_id(&self) -> Option<&str> {
        self.combat_id.as_deref()
    }

    /// The state of the running combat
    pub fn active_state(&self) -> Result<&CombatState, CombatError> {
        self.state
            .as_ref()
            .filter(|s| s.is_active())
            .ok_or(CombatError::NoActiveCombat)
    }

    pub(crate) fn active_state_mut(&mut self) -> Result<&mut CombatState, CombatError> {
        self.state
            .as_mut()
            .filter(|s| s.is_active())
            .ok_or(CombatError::NoActiveCombat)
    }

    /// End the current turn, returning who acts next
    pub fn end_current_turn(&mut self) -> Option<String> {
        let state = self.active_state_mut().ok()?;
        state.end_turn();
        state.current_participant_id().map(str::to_string)
    }

    pub fn add_participant(&mut self, participant: Participant) -> bool {
        match self.active_state_mut() {
            Ok(state) => {
                state.add_participant(participant);
                true
            }
            Err(_) => false,
        }
    }

    pub fn remove_participant(&mut self, participant_id: &str) -> bool {
        self.active_state_mut()
            .is_ok_and(|state| state.remove_participant(participant_id))
    }

    pub fn apply_effect(&mut self, participant_id: &str, effect: Effect) -> bool {
        self.active_state_mut()
            .is_ok_and(|state| state.apply_effect(participant_id, effect))
    }

    pub fn remove_effect(&mut self, participant_id: &str, effect_name: &str) -> bool {
        self.active_state_mut()
            .is_ok_and(|state| state.remove_effect(participant_id, effect_name))
    }

    /// One round boundary worth of effect decay across all participants
    pub fn update_effects(&mut self) -> Vec<ExpiredEffect> {
        self.active_state_mut()
            .map(CombatState::update_effects)
            .unwrap_or_default()
    }

    /// Whether the running combat has met its end condition
    pub fn is_combat_over(&self) -> bool {
        self.active_state()
            .is_ok_and(|state| (self.end_condition)(state))
    }

    /// Whose turn it is, if anyone's
    pub fn current_turn_info(&self) -> Option<TurnInfo> {
        let state = self.state.as_ref()?;
        let current = state.current_participant()?;

        Some(TurnInfo {
            combat_id: self.combat_id.clone().unwrap_or_default(),
            current_round: state.current_round(),
            current_turn_index: state.current_turn_index(),
            current_participant: current.info(),
            turn_order: state.turn_order().to_vec(),
            total_participants: state.participant_count(),
        })
    }

    pub fn participant_info(&self, participant_id: &str) -> Option<ParticipantInfo> {
        self.state
            .as_ref()?
            .participant(participant_id)
            .map(Participant::info)
    }

    /// Info for every participant, in insertion order
    pub fn all_participants_info(&self) -> IndexMap<String, ParticipantInfo> {
        self.state
            .iter()
            .flat_map(|state| state.participants())
            .map(|p| (p.id.clone(), p.info()))
            .collect()
    }

    pub fn status(&self) -> CombatStatus {
        let Ok(state) = self.active_state() else {
            return CombatStatus::Idle;
        };

        CombatStatus::Active(CombatSnapshot {
            combat_id: self.combat_id.clone().unwrap_or_default(),
            is_active: state.is_active(),
            current_round: state.current_round(),
            current_turn_index: state.current_turn_index(),
            turn_order: state.turn_order().to_vec(),
            participants_count: state.participant_count(),
            participants: self.all_participants_info(),
            created_at: state.created_at(),
            updated_at: state.updated_at(),
        })
    }
}
