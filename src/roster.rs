//! Character sheet adapter
//!
//! The engine only needs two things from a character sheet: a name to use
//! as the participant id and a dexterity modifier for initiative. Sheets
//! arrive as JSON documents shaped like:
//!
//! ```json
//! { "character": { "main": { "name": "Solaire" },
//!                  "stats": { "DEX": { "modifier": 2 } } } }
//! ```

use serde_json::Value;
use tracing::debug;

use crate::combat::{CombatError, DiceSource, Participant, MAX_INITIATIVE};

/// Controller assigned to participants seeded from sheets
pub const SYSTEM_CONTROLLER: &str = "system";

/// The combat-relevant part of a character sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSheet {
    pub name: String,
    pub dex_modifier: i32,
}

impl CharacterSheet {
    /// Extract name and DEX modifier from a sheet document.
    ///
    /// Missing fields fall back to "Unknown" and 0.
    pub fn from_document(doc: &Value) -> Result<Self, CombatError> {
        if !doc.is_object() {
            return Err(CombatError::InvalidSheet(
                "expected a JSON object".to_string(),
            ));
        }

        let character = &doc["character"];
        let name = character["main"]["name"]
            .as_str()
            .unwrap_or("Unknown")
            .to_string();
        let dex_modifier = character["stats"]["DEX"]["modifier"]
            .as_i64()
            .and_then(|m| i32::try_from(m).ok())
            .unwrap_or(0);

        Ok(Self { name, dex_modifier })
    }

    /// Roll d20 + DEX modifier, clamped into the initiative range
    pub fn roll_initiative(&self, dice: &mut dyn DiceSource) -> u8 {
        let roll = dice.d20() as i32;
        let total = roll.saturating_add(self.dex_modifier).clamp(0, MAX_INITIATIVE);
        debug!(
            "{} rolls initiative {} ({:+})",
            self.name, roll, self.dex_modifier
        );
        total as u8
    }

    /// Build a system-controlled player participant
    pub fn into_participant(self, initiative: u8) -> Participant {
        Participant {
            id: self.name,
            is_player: true,
            controlled_by: vec![SYSTEM_CONTROLLER.to_string()],
            initiative,
            active_effects: Vec::new(),
        }
    }
}

/// Turn sheet documents into participants with rolled initiative
pub fn seed_participants(
    docs: &[Value],
    dice: &mut dyn DiceSource,
) -> Result<Vec<Participant>, CombatError> {
    docs.iter()
        .map(|doc| {
            let sheet = CharacterSheet::from_document(doc)?;
            let initiative = sheet.roll_initiative(dice);
            Ok::<_, CombatError>(sheet.into_participant(initiative))
        })
        .collect()
}
