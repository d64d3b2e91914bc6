//! Spell catalog
//!
//! Spells known to the engine, each described by the effect template it
//! would produce. Templates are reported back to the caller; applying them
//! to a target is up to the caller.

use serde::{Deserialize, Serialize};

use super::effects::{Effect, EffectKind};

/// A named spell and the effect it produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellTemplate {
    pub name: String,
    pub effect: Effect,
}

impl SpellTemplate {
    pub fn new(name: impl Into<String>, effect: Effect) -> Self {
        Self {
            name: name.into(),
            effect,
        }
    }
}

/// Lookup table of castable spells
#[derive(Debug, Clone, Default)]
pub struct SpellBook {
    spells: Vec<SpellTemplate>,
}

impl SpellBook {
    /// An empty spell book
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: one damage, one healing and one buff spell
    pub fn standard() -> Self {
        let mut book = Self::new();
        book.insert(SpellTemplate::new(
            "Fireball",
            Effect::instant("Fireball", EffectKind::Damage).with_value(25),
        ));
        book.insert(SpellTemplate::new(
            "Heal",
            Effect::instant("Heal", EffectKind::Healing).with_value(15),
        ));
        book.insert(SpellTemplate::new(
            "Empower",
            Effect::per_round("Empowered", EffectKind::Buff, 3)
                .with_modifier("ATK", 2)
                .with_description("Attack increased"),
        ));
        book
    }

    /// Add a spell, replacing any spell with the same name
    pub fn insert(&mut self, spell: SpellTemplate) {
        if let Some(existing) = self.spells.iter_mut().find(|s| s.name == spell.name) {
            *existing = spell;
        } else {
            self.spells.push(spell);
        }
    }

    /// Add several spells
    pub fn extend(&mut self, spells: impl IntoIterator<Item = SpellTemplate>) {
        for spell in spells {
            self.insert(spell);
        }
    }

    /// Find a spell by exact name
    pub fn get(&self, name: &str) -> Option<&SpellTemplate> {
        self.spells.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.spells.iter().map(|s| s.name.as_str())
    }
}
