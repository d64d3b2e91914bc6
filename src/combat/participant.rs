//! Combat participants
//!
//! A participant is the combat-side projection of a character sheet: its
//! identifier, who controls it, its initiative score and the effects
//! currently on it. The sheet itself lives elsewhere.

use serde::{Deserialize, Deserializer, Serialize};

use super::effects::Effect;
use super::CombatError;

/// Highest initiative score a participant may hold
pub const MAX_INITIATIVE: i32 = 100;

/// A combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Character sheet identifier (unique within a combat)
    #[serde(rename = "characterSheetId")]
    pub id: String,
    #[serde(default)]
    pub is_player: bool,
    /// Identifiers of the users controlling this participant
    #[serde(default, deserialize_with = "deserialize_controllers")]
    pub controlled_by: Vec<String>,
    /// Initiative score (0-100)
    #[serde(deserialize_with = "deserialize_initiative")]
    pub initiative: u8,
    /// Active effects in application order
    #[serde(default)]
    pub active_effects: Vec<Effect>,
}

impl Participant {
    /// Create a participant, validating the initiative range
    pub fn new(id: impl Into<String>, initiative: i32) -> Result<Self, CombatError> {
        Ok(Self {
            id: id.into(),
            is_player: false,
            controlled_by: Vec::new(),
            initiative: checked_initiative(initiative)?,
            active_effects: Vec::new(),
        })
    }

    /// Mark as a player character controlled by `controllers`
    pub fn player(mut self, controllers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.is_player = true;
        self.controlled_by = controllers.into_iter().map(Into::into).collect();
        self
    }

    /// Whether an effect with this name is active
    pub fn has_effect(&self, name: &str) -> bool {
        self.active_effects.iter().any(|e| e.name == name)
    }

    /// Get an active effect by name
    pub fn effect(&self, name: &str) -> Option<&Effect> {
        self.active_effects.iter().find(|e| e.name == name)
    }

    /// Public view of this participant
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            id: self.id.clone(),
            is_player: self.is_player,
            controlled_by: self.controlled_by.clone(),
            initiative: self.initiative,
            active_effects: self.active_effects.clone(),
            total_effects: self.active_effects.len(),
        }
    }
}

/// Read-only view of a participant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    #[serde(rename = "characterSheetId")]
    pub id: String,
    pub is_player: bool,
    pub controlled_by: Vec<String>,
    pub initiative: u8,
    pub active_effects: Vec<Effect>,
    #[serde(rename = "total_effects")]
    pub total_effects: usize,
}

/// Validate an initiative score
pub fn checked_initiative(value: i32) -> Result<u8, CombatError> {
    if (0..=MAX_INITIATIVE).contains(&value) {
        Ok(value as u8)
    } else {
        Err(CombatError::InvalidInitiative(value))
    }
}

fn deserialize_initiative<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    let value = i32::try_from(raw).unwrap_or(i32::MAX);
    checked_initiative(value).map_err(serde::de::Error::custom)
}

/// Accepts a single controller id as well as a list; anything else is empty.
fn deserialize_controllers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Controllers {
        One(String),
        Many(Vec<String>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Controllers::deserialize(deserializer)? {
        Controllers::One(id) => vec![id],
        Controllers::Many(ids) => ids,
        Controllers::Other(_) => Vec::new(),
    })
}
