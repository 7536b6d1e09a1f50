//! Probabilistic suspicion tracking between participants.
//!
//! This module is composed of:
//! - `matrix`: the owned per-session suspicion table (`SuspicionMatrix`).
//! - `engine`: the noisy bounded update primitive plus multi-observer leaks
//!   and rumor generation (`BeliefEngine`).

mod engine;
mod matrix;

pub use engine::{BeliefEngine, Leaning, Rumor, RumorKind, UpdateMode};
pub use matrix::SuspicionMatrix;
