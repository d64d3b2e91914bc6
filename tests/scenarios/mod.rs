//! Combat scenario tests
//!
//! - Turn order: initiative sorting, rotation, rounds, delays
//! - Effects: application, decay, expiry across turn advances
//! - Actions: attacks, spells, skill checks and turn enforcement
//! - Concurrency: atomic mutations from many tasks

pub mod concurrency;
pub mod effects;
pub mod turn_order;
