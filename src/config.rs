//! Engine configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `COMBAT_`-prefixed environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::combat::{
    dice_for_seed, ActionResolver, SpellBook, SpellTemplate, DEFAULT_ATTACK_BASE_DAMAGE,
    DEFAULT_SKILL_DIFFICULTY,
};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COMBAT_";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base damage added to attack rolls
    pub attack_base_damage: u32,
    /// Difficulty for dodge, parry and search checks
    pub skill_difficulty: u32,
    /// Seed for reproducible dice (None = thread RNG)
    pub rng_seed: Option<u64>,
    /// Default tracing filter
    pub log_filter: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Extra spells on top of the standard catalog
    pub spells: Vec<SpellTemplate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attack_base_damage: DEFAULT_ATTACK_BASE_DAMAGE,
            skill_difficulty: DEFAULT_SKILL_DIFFICULTY,
            rng_seed: None,
            log_filter: "combat_engine=info".to_string(),
            log_json: false,
            spells: Vec::new(),
        }
    }
}

impl Config {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// The standard catalog plus any configured spells
    pub fn spell_book(&self) -> SpellBook {
        let mut book = SpellBook::standard();
        book.extend(self.spells.iter().cloned());
        book
    }

    /// Build a resolver with this configuration's dice and rules
    pub fn resolver(&self) -> ActionResolver {
        ActionResolver::new(dice_for_seed(self.rng_seed))
            .with_spells(self.spell_book())
            .with_attack_base_damage(self.attack_base_damage)
            .with_skill_difficulty(self.skill_difficulty)
    }
}
