//! Timed effects on participants
//!
//! Effects are modifiers attached to a participant:
//! - Damage and healing over time
//! - Buffs and debuffs (optionally with stat modifiers)
//! - Utility markers
//!
//! Instant effects are never stored. Per-round effects lose one point of
//! duration per round boundary and expire at zero. Permanent effects stay
//! until removed by name.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What an effect does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Damage,
    Healing,
    Buff,
    Debuff,
    Utility,
}

impl FromStr for EffectKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "damage" | "dot" => Ok(EffectKind::Damage),
            "healing" | "heal" => Ok(EffectKind::Healing),
            "buff" => Ok(EffectKind::Buff),
            "debuff" => Ok(EffectKind::Debuff),
            "utility" => Ok(EffectKind::Utility),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EffectKind::Damage => "damage",
            EffectKind::Healing => "healing",
            EffectKind::Buff => "buff",
            EffectKind::Debuff => "debuff",
            EffectKind::Utility => "utility",
        };
        write!(f, "{}", s)
    }
}

/// How an effect's duration is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DurationKind {
    /// Applied and discarded immediately
    #[serde(rename = "instant")]
    Instant,
    /// Counts down once per round
    #[default]
    #[serde(rename = "round")]
    PerRound,
    /// Lasts until removed
    #[serde(rename = "permanent")]
    Permanent,
}

/// An effect attached to a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Identifying name, unique per participant
    pub name: String,
    /// What the effect does
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Remaining rounds (0 = instantaneous)
    pub duration: u32,
    /// How `duration` is measured
    #[serde(rename = "duration_type", default)]
    pub duration_kind: DurationKind,
    /// Magnitude (damage per round, healing amount, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    /// Stat name -> modifier
    #[serde(
        rename = "stat_modifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stat_modifiers: Option<BTreeMap<String, i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Effect {
    /// Create a new effect
    pub fn new(
        name: impl Into<String>,
        kind: EffectKind,
        duration: u32,
        duration_kind: DurationKind,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            duration,
            duration_kind,
            value: None,
            stat_modifiers: None,
            description: None,
        }
    }

    /// Create an effect lasting `rounds` rounds
    pub fn per_round(name: impl Into<String>, kind: EffectKind, rounds: u32) -> Self {
        Self::new(name, kind, rounds, DurationKind::PerRound)
    }

    /// Create an effect that lasts until removed
    pub fn permanent(name: impl Into<String>, kind: EffectKind) -> Self {
        Self::new(name, kind, 0, DurationKind::Permanent)
    }

    /// Create an instantaneous effect
    pub fn instant(name: impl Into<String>, kind: EffectKind) -> Self {
        Self::new(name, kind, 0, DurationKind::Instant)
    }

    /// Set the magnitude
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    /// Add a stat modifier
    pub fn with_modifier(mut self, stat: impl Into<String>, modifier: i32) -> Self {
        self.stat_modifiers
            .get_or_insert_with(BTreeMap::new)
            .insert(stat.into(), modifier);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_instant(&self) -> bool {
        self.duration_kind == DurationKind::Instant
    }

    pub fn is_per_round(&self) -> bool {
        self.duration_kind == DurationKind::PerRound
    }

    /// Count one round off a per-round effect. Other kinds are untouched.
    pub fn tick(&mut self) {
        if self.is_per_round() {
            self.duration = self.duration.saturating_sub(1);
        }
    }

    /// Whether a per-round effect has run out
    pub fn is_expired(&self) -> bool {
        self.is_per_round() && self.duration == 0
    }

    /// Damage over time fires when its bearer ends a turn
    pub fn fires_at_turn_end(&self) -> bool {
        self.kind == EffectKind::Damage && self.is_per_round()
    }

    /// Per-round buffs fire when their bearer starts a turn
    pub fn fires_at_turn_start(&self) -> bool {
        self.kind == EffectKind::Buff && self.is_per_round()
    }
}

/// An effect dropped because its duration ran out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiredEffect {
    pub participant_id: String,
    pub effect_name: String,
    pub effect: Effect,
}
