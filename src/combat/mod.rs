//! Combat engine
//!
//! Implements turn-based combat with:
//! - Initiative ordering (stable on ties) and round tracking
//! - Timed effects (per-round, permanent, instant)
//! - Actions: attack, cast, dodge, parry, search
//! - Turn delays
//! - Injectable dice for replayable resolution

mod actions;
mod dice;
mod effects;
mod error;
mod manager;
mod participant;
mod spells;
mod state;

pub use actions::{
    Action, ActionKind, ActionOutcome, ActionRequest, ActionResolver, ActionResult,
    AttackOutcome, CastOutcome, DelayResult, SkillOutcome, TriggerPhase, TurnAdvance,
    TurnTrigger, DEFAULT_ATTACK_BASE_DAMAGE, DEFAULT_SKILL_DIFFICULTY,
};
pub use dice::{dice_for_seed, DiceSource, ScriptedDice, SeededDice, ThreadDice};
pub use effects::{DurationKind, Effect, EffectKind, ExpiredEffect};
pub use error::{CombatError, StatusHint};
pub use manager::{CombatManager, CombatSnapshot, CombatStatus, EndCondition, TurnInfo};
pub use participant::{checked_initiative, Participant, ParticipantInfo, MAX_INITIATIVE};
pub use spells::{SpellBook, SpellTemplate};
pub use state::CombatState;
