//! Action resolution
//!
//! Interprets player actions against the running combat:
//! - Attack: d20 plus a fixed base damage against a target
//! - Cast: look up a spell template, targeting self by default
//! - Dodge / Parry / Search: d20 skill check against a fixed difficulty
//!
//! Also runs the turn-advance protocol (end-of-turn triggers, effect decay,
//! pointer rotation, start-of-turn triggers, expiry) and turn delays.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dice::DiceSource;
use super::effects::{Effect, EffectKind, ExpiredEffect};
use super::manager::{CombatManager, TurnInfo};
use super::spells::SpellBook;
use super::CombatError;

/// Base damage added to every attack roll
pub const DEFAULT_ATTACK_BASE_DAMAGE: u32 = 10;

/// Difficulty for dodge, parry and search checks
pub const DEFAULT_SKILL_DIFFICULTY: u32 = 10;

/// Raw action input as received from outside the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub actor_id: String,
    pub action_type: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub spell_name: Option<String>,
    #[serde(default)]
    pub weapon_name: Option<String>,
}

/// The kinds of action a participant can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    Cast,
    Dodge,
    Parry,
    Search,
}

impl FromStr for ActionKind {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Attack" => Ok(ActionKind::Attack),
            "Cast" => Ok(ActionKind::Cast),
            "Dodge" => Ok(ActionKind::Dodge),
            "Parry" => Ok(ActionKind::Parry),
            "Search" => Ok(ActionKind::Search),
            other => Err(CombatError::UnknownAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionKind::Attack => "Attack",
            ActionKind::Cast => "Cast",
            ActionKind::Dodge => "Dodge",
            ActionKind::Parry => "Parry",
            ActionKind::Search => "Search",
        };
        write!(f, "{}", s)
    }
}

/// A parsed action, carrying only what each kind needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Attack {
        target: String,
        weapon: Option<String>,
    },
    Cast {
        spell: String,
        target: Option<String>,
    },
    Dodge,
    Parry,
    Search,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Attack { .. } => ActionKind::Attack,
            Action::Cast { .. } => ActionKind::Cast,
            Action::Dodge => ActionKind::Dodge,
            Action::Parry => ActionKind::Parry,
            Action::Search => ActionKind::Search,
        }
    }
}

impl TryFrom<&ActionRequest> for Action {
    type Error = CombatError;

    fn try_from(request: &ActionRequest) -> Result<Self, Self::Error> {
        Ok(match request.action_type.parse::<ActionKind>()? {
            ActionKind::Attack => Action::Attack {
                target: request.target_id.clone().ok_or(CombatError::MissingTarget)?,
                weapon: request.weapon_name.clone(),
            },
            ActionKind::Cast => Action::Cast {
                spell: request.spell_name.clone().ok_or(CombatError::MissingSpell)?,
                target: request.target_id.clone(),
            },
            ActionKind::Dodge => Action::Dodge,
            ActionKind::Parry => Action::Parry,
            ActionKind::Search => Action::Search,
        })
    }
}

/// Result of an attack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackOutcome {
    pub target: String,
    pub damage: u32,
    pub roll: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    pub message: String,
}

/// Result of casting a spell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastOutcome {
    pub spell: String,
    pub target: String,
    pub effect: Effect,
    pub message: String,
}

/// Result of a skill check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillOutcome {
    pub success: bool,
    pub roll: u32,
    pub difficulty: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Attack(AttackOutcome),
    Cast(CastOutcome),
    Skill(SkillOutcome),
}

/// What happened when an actor took an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub actor: String,
    pub action: ActionKind,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

/// When a turn trigger fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPhase {
    TurnEnd,
    TurnStart,
}

/// An effect firing at a turn boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnTrigger {
    pub phase: TriggerPhase,
    pub participant_id: String,
    pub effect: Effect,
}

/// Everything a turn advance produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnAdvance {
    pub triggers: Vec<TurnTrigger>,
    pub expired: Vec<ExpiredEffect>,
    pub turn: Option<TurnInfo>,
    pub combat_over: bool,
}

/// Acknowledgement of a delayed turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayResult {
    pub actor: String,
    pub current_participant: Option<String>,
    pub turn_order: Vec<String>,
    pub message: String,
}

/// Resolves actions and turn advances against a [`CombatManager`]
pub struct ActionResolver {
    dice: Box<dyn DiceSource>,
    spells: SpellBook,
    attack_base_damage: u32,
    skill_difficulty: u32,
}

impl ActionResolver {
    /// Create a resolver with the standard spell book and defaults
    pub fn new(dice: Box<dyn DiceSource>) -> Self {
        Self {
            dice,
            spells: SpellBook::standard(),
            attack_base_damage: DEFAULT_ATTACK_BASE_DAMAGE,
            skill_difficulty: DEFAULT_SKILL_DIFFICULTY,
        }
    }

    pub fn with_spells(mut self, spells: SpellBook) -> Self {
        self.spells = spells;
        self
    }

    pub fn with_attack_base_damage(mut self, damage: u32) -> Self {
        self.attack_base_damage = damage;
        self
    }

    pub fn with_skill_difficulty(mut self, difficulty: u32) -> Self {
        self.skill_difficulty = difficulty;
        self
    }

    pub fn spells(&self) -> &SpellBook {
        &self.spells
    }

    /// The dice all draws go through
    pub fn dice(&mut self) -> &mut dyn DiceSource {
        self.dice.as_mut()
    }

    /// Hand the turn to the next participant.
    ///
    /// Durations count down once, at the end of the ending participant's
    /// turn. The expiry pass afterwards only prunes.
    pub fn advance_turn(
        &mut self,
        manager: &mut CombatManager,
    ) -> Result<TurnAdvance, CombatError> {
        let state = manager.active_state_mut()?;
        if state.turn_order().is_empty() {
            return Err(CombatError::EmptyTurnOrder);
        }

        let mut triggers = Vec::new();

        let ending_id = state.current_participant_id().map(str::to_string);
        if let Some(ending) = state.current_participant() {
            for effect in ending.active_effects.iter().filter(|e| e.fires_at_turn_end()) {
                info!(
                    "{} takes {} damage from {}",
                    ending.id,
                    effect.value.unwrap_or(0),
                    effect.name
                );
                triggers.push(TurnTrigger {
                    phase: TriggerPhase::TurnEnd,
                    participant_id: ending.id.clone(),
                    effect: effect.clone(),
                });
            }
        }
        if let Some(id) = ending_id.as_deref() {
            state.tick_effects(id);
        }

        let next_id = manager.end_current_turn();

        let state = manager.active_state_mut()?;
        if let Some(next) = next_id.as_deref().and_then(|id| state.participant(id)) {
            for effect in next.active_effects.iter().filter(|e| e.fires_at_turn_start()) {
                info!("{} benefits from {}", next.id, effect.name);
                triggers.push(TurnTrigger {
                    phase: TriggerPhase::TurnStart,
                    participant_id: next.id.clone(),
                    effect: effect.clone(),
                });
            }
        }

        let expired = state.prune_expired_effects();
        debug!(
            "Turn passed from {:?} to {:?} ({} effects expired)",
            ending_id,
            next_id,
            expired.len()
        );

        Ok(TurnAdvance {
            triggers,
            expired,
            turn: manager.current_turn_info(),
            combat_over: manager.is_combat_over(),
        })
    }

    /// Parse and perform a raw action request
    pub fn perform_request(
        &mut self,
        manager: &mut CombatManager,
        request: &ActionRequest,
    ) -> Result<ActionResult, CombatError> {
        Self::check_turn(manager, &request.actor_id)?;
        let action = Action::try_from(request).inspect_err(|e| {
            warn!("Rejected action from {}: {}", request.actor_id, e);
        })?;
        self.perform(manager, &request.actor_id, action)
    }

    /// Perform an action for the participant holding the turn
    pub fn perform(
        &mut self,
        manager: &mut CombatManager,
        actor_id: &str,
        action: Action,
    ) -> Result<ActionResult, CombatError> {
        Self::check_turn(manager, actor_id)?;

        let kind = action.kind();
        let outcome = match action {
            Action::Attack { target, weapon } => {
                ActionOutcome::Attack(self.attack(manager, actor_id, target, weapon)?)
            }
            Action::Cast { spell, target } => {
                ActionOutcome::Cast(self.cast(manager, actor_id, spell, target)?)
            }
            Action::Dodge | Action::Parry | Action::Search => {
                ActionOutcome::Skill(self.skill_check(manager, actor_id, kind))
            }
        };

        Ok(ActionResult {
            actor: actor_id.to_string(),
            action: kind,
            outcome,
        })
    }

    fn check_turn(manager: &CombatManager, actor_id: &str) -> Result<(), CombatError> {
        let state = manager.active_state()?;
        if !state.contains(actor_id) {
            return Err(CombatError::ParticipantNotFound(actor_id.to_string()));
        }

        let current = state.current_participant_id();
        if current != Some(actor_id) {
            warn!("{} tried to act out of turn", actor_id);
            return Err(CombatError::NotYourTurn {
                actor: actor_id.to_string(),
                current: current.map(str::to_string),
            });
        }
        Ok(())
    }

    fn attack(
        &mut self,
        manager: &CombatManager,
        actor_id: &str,
        target: String,
        weapon: Option<String>,
    ) -> Result<AttackOutcome, CombatError> {
        if !manager.active_state()?.contains(&target) {
            return Err(CombatError::ParticipantNotFound(target));
        }

        let roll = self.dice.d20();
        let damage = self.attack_base_damage + roll;
        info!(
            "{} attacks {} for {} damage (rolled {})",
            actor_id, target, damage, roll
        );

        Ok(AttackOutcome {
            message: format!("Attack on {} landed", target),
            target,
            damage,
            roll,
            weapon,
        })
    }

    fn cast(
        &mut self,
        manager: &CombatManager,
        actor_id: &str,
        spell: String,
        target: Option<String>,
    ) -> Result<CastOutcome, CombatError> {
        let template = self
            .spells
            .get(&spell)
            .ok_or_else(|| CombatError::UnknownSpell(spell.clone()))?;

        let target = target.unwrap_or_else(|| actor_id.to_string());
        if !manager.active_state()?.contains(&target) {
            return Err(CombatError::ParticipantNotFound(target));
        }

        info!("{} casts {} on {}", actor_id, spell, target);
        Ok(CastOutcome {
            effect: template.effect.clone(),
            message: format!("{} cast successfully", spell),
            spell,
            target,
        })
    }

    fn skill_check(
        &mut self,
        manager: &mut CombatManager,
        actor_id: &str,
        kind: ActionKind,
    ) -> SkillOutcome {
        let roll = self.dice.d20();
        let difficulty = self.skill_difficulty;
        let success = roll >= difficulty;

        if success {
            let stance = match kind {
                ActionKind::Dodge => Some(("Active Dodge", "Dodge increased for this round")),
                ActionKind::Parry => Some(("Active Parry", "Parry increased for this round")),
                _ => None,
            };
            if let Some((name, description)) = stance {
                let effect =
                    Effect::per_round(name, EffectKind::Buff, 1).with_description(description);
                manager.apply_effect(actor_id, effect);
            }
        }

        let verdict = if success { "succeeded" } else { "failed" };
        debug!(
            "{} {} check: rolled {} vs {} ({})",
            actor_id, kind, roll, difficulty, verdict
        );
        SkillOutcome {
            success,
            roll,
            difficulty,
            message: format!("{} {}", kind, verdict),
        }
    }

    /// Move an actor to the end of the turn order for this round.
    ///
    /// Delaying the current actor when it is already last wraps the turn
    /// pointer and starts a new round.
    pub fn delay_turn(
        manager: &mut CombatManager,
        actor_id: &str,
    ) -> Result<DelayResult, CombatError> {
        let state = manager.active_state_mut()?;
        if !state.move_to_end(actor_id) {
            return Err(CombatError::ParticipantNotFound(actor_id.to_string()));
        }

        info!("{} delays their turn", actor_id);
        Ok(DelayResult {
            actor: actor_id.to_string(),
            current_participant: state.current_participant_id().map(str::to_string),
            turn_order: state.turn_order().to_vec(),
            message: format!("{}'s turn is delayed (acts last this round)", actor_id),
        })
    }
}
