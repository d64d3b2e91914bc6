//! combat-engine - turn-based combat engine
//!
//! Runs a single combat at a time: initiative order, rounds, timed effects
//! and action resolution. Character sheets, persistence and transport are
//! left to the embedding application.

pub mod combat;
pub mod config;
pub mod roster;
pub mod service;

pub use config::Config;
pub use service::{CombatService, EndTurnReport};
