//! Combat errors

use thiserror::Error;

/// How a caller facing a network boundary should classify an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    /// The request conflicts with current state (409)
    Conflict,
    /// Something referenced does not exist (404)
    NotFound,
    /// The request itself is malformed (400)
    BadRequest,
    /// An internal invariant did not hold (500)
    Internal,
}

/// Errors returned by combat operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no combat in progress")]
    NoActiveCombat,

    #[error("a combat is already in progress; end it before starting a new one")]
    CombatAlreadyActive,

    #[error("participant {0} not found in combat")]
    ParticipantNotFound(String),

    #[error("effect {effect} not found on participant {participant}")]
    EffectNotFound { participant: String, effect: String },

    #[error("it is not {actor}'s turn")]
    NotYourTurn {
        actor: String,
        current: Option<String>,
    },

    #[error("unknown action type: {0}")]
    UnknownAction(String),

    #[error("attack requires a target")]
    MissingTarget,

    #[error("cast requires a spell name")]
    MissingSpell,

    #[error("unknown spell: {0}")]
    UnknownSpell(String),

    #[error("initiative {0} out of range (0-100)")]
    InvalidInitiative(i32),

    #[error("turn order is empty")]
    EmptyTurnOrder,

    #[error("no participant holds the turn")]
    NoCurrentTurn,

    #[error("invalid character sheet: {0}")]
    InvalidSheet(String),
}

impl CombatError {
    /// Classify this error for an outer transport layer
    pub fn status_hint(&self) -> StatusHint {
        match self {
            CombatError::CombatAlreadyActive => StatusHint::Conflict,
            CombatError::NoActiveCombat
            | CombatError::ParticipantNotFound(_)
            | CombatError::EffectNotFound { .. }
            | CombatError::NoCurrentTurn => StatusHint::NotFound,
            CombatError::NotYourTurn { .. }
            | CombatError::UnknownAction(_)
            | CombatError::MissingTarget
            | CombatError::MissingSpell
            | CombatError::UnknownSpell(_)
            | CombatError::InvalidInitiative(_)
            | CombatError::InvalidSheet(_) => StatusHint::BadRequest,
            CombatError::EmptyTurnOrder => StatusHint::Internal,
        }
    }
}
