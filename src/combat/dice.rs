//! Dice sources
//!
//! Every random draw in the engine goes through a [`DiceSource`] so that
//! action resolution can be replayed deterministically:
//! - [`ThreadDice`] - thread-local generator, the default
//! - [`SeededDice`] - seeded generator for reproducible sessions
//! - [`ScriptedDice`] - fixed sequence of results, for tests and replays

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of die results
pub trait DiceSource: Send {
    /// Roll a single die with `sides` faces (1..=sides)
    fn roll(&mut self, sides: u32) -> u32;

    /// Roll a single d20
    fn d20(&mut self) -> u32 {
        self.roll(20)
    }
}

/// Dice backed by the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDice;

impl DiceSource for ThreadDice {
    fn roll(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides.max(1))
    }
}

/// Dice backed by a seeded generator
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    /// Create dice from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides.max(1))
    }
}

/// Dice that replay a fixed script of results.
///
/// The script cycles once exhausted. Each value is clamped into the
/// range of the die being rolled.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    script: VecDeque<u32>,
}

impl ScriptedDice {
    /// Create dice that return `results` in order
    pub fn new(results: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: results.into_iter().collect(),
        }
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        match self.script.pop_front() {
            Some(value) => {
                self.script.push_back(value);
                value.clamp(1, sides)
            }
            None => 1,
        }
    }
}

/// Build the dice source for an optional seed
pub fn dice_for_seed(seed: Option<u64>) -> Box<dyn DiceSource> {
    match seed {
        Some(seed) => Box::new(SeededDice::new(seed)),
        None => Box::new(ThreadDice),
    }
}
