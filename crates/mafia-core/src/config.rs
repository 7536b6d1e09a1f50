//! Engine tunables. Every weight, noise width, and duration used by the
//! processors lives here, so a harness can override any of them and a test
//! can pin them; defaults reproduce the shipped belief model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Suspicion values are clamped to `[epsilon, 100 - epsilon]`.
    pub epsilon: f64,
    /// Starting suspicion between strangers; also the value any missing
    /// lookup resolves to.
    pub baseline: f64,
    /// How much of an old belief survives one round of memory drift.
    pub memory_drift_lambda: f64,
    /// Blend factor applied to every belief change.
    pub learning_rate: f64,
    /// Odds that an observer misreads an event as weak counter-evidence.
    pub misread_odds: f64,
    /// Strength of the motivated-reasoning multiplier near the bounds.
    pub context_bias: f64,
    pub weights: EventWeights,
    pub noise: NoiseWidths,
    pub durations: PhaseDurations,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: 5.0,
            baseline: 35.0,
            memory_drift_lambda: 0.85,
            learning_rate: 0.3,
            misread_odds: 0.05,
            context_bias: 0.2,
            weights: EventWeights::default(),
            noise: NoiseWidths::default(),
            durations: PhaseDurations::default(),
        }
    }
}

/// Base weights per observable event, in log-odds-like units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventWeights {
    pub accuse: f64,
    pub defend: f64,
    pub defensive_reaction: f64,
    pub guilt_by_association: f64,
    pub lurker_penalty: f64,
    pub bandwagon_penalty: f64,
    pub hypocrite_penalty: f64,
    pub consistent_bonus: f64,
    pub vindication_bonus: f64,
    pub wrong_accusation: f64,
    pub complicity_penalty: f64,
    pub detective_found_mafia: f64,
    pub detective_found_innocent: f64,
    pub doctor_protect_bias: f64,
    pub doctor_saved_innocent: f64,
    pub guardian_angel_effect: f64,
    pub frame_up: f64,
    pub intuition_leak: f64,
    pub rumor_suspicious: f64,
    pub rumor_trusted: f64,
    /// Ambient paranoia draws a weight uniformly from `[-range, range]`.
    pub paranoia_range: f64,
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            accuse: 0.20,
            defend: -0.15,
            defensive_reaction: 0.30,
            guilt_by_association: 0.15,
            lurker_penalty: 0.12,
            bandwagon_penalty: 0.15,
            hypocrite_penalty: 0.30,
            consistent_bonus: -0.10,
            vindication_bonus: -0.40,
            wrong_accusation: 0.25,
            complicity_penalty: 0.30,
            detective_found_mafia: 1.2,
            detective_found_innocent: -1.2,
            doctor_protect_bias: -0.2,
            doctor_saved_innocent: -0.8,
            guardian_angel_effect: -0.4,
            frame_up: 0.25,
            intuition_leak: 0.08,
            rumor_suspicious: 0.25,
            rumor_trusted: -0.20,
            paranoia_range: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseWidths {
    pub vote: f64,
    pub discussion: f64,
    pub private_leak: f64,
    pub hypocrite: f64,
    /// History is harder to misinterpret.
    pub history: f64,
    pub reaction: f64,
    pub frame_up: f64,
    pub rumor: f64,
    pub paranoia: f64,
    pub private_result: f64,
    pub guardian: f64,
}

impl Default for NoiseWidths {
    fn default() -> Self {
        Self {
            vote: 0.40,
            discussion: 0.30,
            private_leak: 0.80,
            hypocrite: 0.20,
            history: 0.10,
            reaction: 0.20,
            frame_up: 0.30,
            rumor: 0.50,
            paranoia: 0.50,
            private_result: 0.10,
            guardian: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub night_ms: u64,
    pub discussion_ms: u64,
    pub voting_ms: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            night_ms: 30_000,
            discussion_ms: 180_000,
            voting_ms: 30_000,
        }
    }
}
