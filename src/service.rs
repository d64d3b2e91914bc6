//! Combat service
//!
//! Async façade over one [`CombatManager`] and its [`ActionResolver`],
//! shared between request handlers. Every mutating operation runs under
//! the manager's write lock so turn-order changes are observed atomically;
//! status queries take the read lock. When both locks are needed the
//! manager lock is always taken first.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::combat::{
    ActionRequest, ActionResolver, ActionResult, CombatError, CombatManager, CombatStatus,
    DelayResult, Effect, ExpiredEffect, Participant, ParticipantInfo, TurnAdvance, TurnInfo,
};
use crate::config::Config;
use crate::roster;

/// Who acts after an explicit end of turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndTurnReport {
    pub next_participant_id: String,
    pub current_round: u32,
}

/// Shared combat service
pub struct CombatService {
    manager: RwLock<CombatManager>,
    resolver: Mutex<ActionResolver>,
}

impl CombatService {
    /// Create a service from its parts
    pub fn new(manager: CombatManager, resolver: ActionResolver) -> Self {
        Self {
            manager: RwLock::new(manager),
            resolver: Mutex::new(resolver),
        }
    }

    /// Create a service configured by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(CombatManager::new(), config.resolver())
    }

    /// Create a shared instance
    pub fn shared(config: &Config) -> Arc<Self> {
        Arc::new(Self::from_config(config))
    }

    pub async fn is_combat_active(&self) -> bool {
        self.manager.read().await.is_combat_active()
    }

    pub async fn is_combat_over(&self) -> bool {
        self.manager.read().await.is_combat_over()
    }

    pub async fn status(&self) -> CombatStatus {
        self.manager.read().await.status()
    }

    /// Start a combat with ready-made participants
    pub async fn start_combat(
        &self,
        participants: Vec<Participant>,
    ) -> Result<String, CombatError> {
        self.manager.write().await.start_combat(participants)
    }

    /// Start a combat from character sheet documents, rolling initiative
    pub async fn initialize_combat(&self, sheets: &[Value]) -> Result<String, CombatError> {
        let mut manager = self.manager.write().await;
        if manager.is_combat_active() {
            return Err(CombatError::CombatAlreadyActive);
        }

        let participants = {
            let mut resolver = self.resolver.lock().await;
            roster::seed_participants(sheets, resolver.dice())?
        };
        manager.start_combat(participants)
    }

    pub async fn end_combat(&self) -> Result<(), CombatError> {
        let mut manager = self.manager.write().await;
        if !manager.is_combat_active() {
            return Err(CombatError::NoActiveCombat);
        }
        manager.end_combat();
        Ok(())
    }

    pub async fn current_turn(&self) -> Result<TurnInfo, CombatError> {
        let manager = self.manager.read().await;
        manager.active_state()?;
        manager
            .current_turn_info()
            .ok_or(CombatError::NoCurrentTurn)
    }

    /// Rotate the turn pointer without running effect triggers
    pub async fn end_turn(&self) -> Result<EndTurnReport, CombatError> {
        let mut manager = self.manager.write().await;
        manager.active_state()?;

        let next = manager
            .end_current_turn()
            .ok_or(CombatError::EmptyTurnOrder)?;
        let current_round = manager.active_state()?.current_round();
        Ok(EndTurnReport {
            next_participant_id: next,
            current_round,
        })
    }

    /// Run the full turn-advance protocol
    pub async fn advance_turn(&self) -> Result<TurnAdvance, CombatError> {
        let mut manager = self.manager.write().await;
        let mut resolver = self.resolver.lock().await;
        resolver.advance_turn(&mut manager)
    }

    pub async fn add_participant(&self, participant: Participant) -> Result<(), CombatError> {
        let mut manager = self.manager.write().await;
        let id = participant.id.clone();
        if !manager.add_participant(participant) {
            return Err(CombatError::NoActiveCombat);
        }
        info!("{} joined the combat", id);
        Ok(())
    }

    pub async fn remove_participant(&self, participant_id: &str) -> Result<(), CombatError> {
        let mut manager = self.manager.write().await;
        manager.active_state()?;
        if !manager.remove_participant(participant_id) {
            return Err(CombatError::ParticipantNotFound(participant_id.to_string()));
        }
        info!("{} left the combat", participant_id);
        Ok(())
    }

    pub async fn participant_info(
        &self,
        participant_id: &str,
    ) -> Result<ParticipantInfo, CombatError> {
        self.manager
            .read()
            .await
            .participant_info(participant_id)
            .ok_or_else(|| CombatError::ParticipantNotFound(participant_id.to_string()))
    }

    /// Info for every participant; empty when no combat is running
    pub async fn all_participants(&self) -> IndexMap<String, ParticipantInfo> {
        let manager = self.manager.read().await;
        if !manager.is_combat_active() {
            return IndexMap::new();
        }
        manager.all_participants_info()
    }

    pub async fn apply_effect(
        &self,
        participant_id: &str,
        effect: Effect,
    ) -> Result<(), CombatError> {
        let mut manager = self.manager.write().await;
        manager.active_state()?;
        if !manager.apply_effect(participant_id, effect) {
            return Err(CombatError::ParticipantNotFound(participant_id.to_string()));
        }
        Ok(())
    }

    pub async fn remove_effect(
        &self,
        participant_id: &str,
        effect_name: &str,
    ) -> Result<(), CombatError> {
        let mut manager = self.manager.write().await;
        if !manager.active_state()?.contains(participant_id) {
            return Err(CombatError::ParticipantNotFound(participant_id.to_string()));
        }
        if !manager.remove_effect(participant_id, effect_name) {
            return Err(CombatError::EffectNotFound {
                participant: participant_id.to_string(),
                effect: effect_name.to_string(),
            });
        }
        Ok(())
    }

    /// One round boundary of effect decay; returns what expired
    pub async fn update_effects(&self) -> Result<Vec<ExpiredEffect>, CombatError> {
        let mut manager = self.manager.write().await;
        manager.active_state()?;
        let expired = manager.update_effects();
        info!("{} effects expired", expired.len());
        Ok(expired)
    }

    pub async fn perform_action(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResult, CombatError> {
        let mut manager = self.manager.write().await;
        let mut resolver = self.resolver.lock().await;
        resolver.perform_request(&mut manager, request)
    }

    pub async fn delay_turn(&self, actor_id: &str) -> Result<DelayResult, CombatError> {
        let mut manager = self.manager.write().await;
        ActionResolver::delay_turn(&mut manager, actor_id)
    }
}
