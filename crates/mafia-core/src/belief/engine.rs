use super::matrix::SuspicionMatrix;
use crate::config::EngineConfig;
use crate::model::player::PlayerId;
use rand::Rng;
use rand::seq::SliceRandom;

/// How an update is perceived by the observer.
///
/// `Social` observations pass through the full noisy channel: a 5% chance of
/// misreading the event as weak counter-evidence, plus a motivated-reasoning
/// multiplier when the observer already holds a strong belief. `Direct` is
/// reserved for firsthand private results (detective findings, doctor
/// outcomes, staged evidence) which keep the noise draw but cannot flip sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Social,
    Direct,
}

/// Direction of a leaked gut feeling about a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaning {
    Good,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RumorKind {
    Suspicious,
    Trusted,
}

#[derive(Debug, Clone)]
pub struct Rumor {
    pub target: PlayerId,
    pub kind: RumorKind,
}

/// The single noisy-update primitive every processor goes through.
#[derive(Debug, Clone, Copy)]
pub struct BeliefEngine<'a> {
    cfg: &'a EngineConfig,
}

impl<'a> BeliefEngine<'a> {
    pub fn new(cfg: &'a EngineConfig) -> Self {
        Self { cfg }
    }

    /// Moves one suspicion value (0-100) by `weight` through the noisy
    /// channel and returns the new value, clamped to the epsilon bounds.
    pub fn update<R: Rng + ?Sized>(
        &self,
        current: f64,
        weight: f64,
        noise_width: f64,
        mode: UpdateMode,
        rng: &mut R,
    ) -> f64 {
        let current = if current.is_finite() {
            current
        } else {
            self.cfg.baseline
        };
        let p = current / 100.0;

        let noise_multiplier = 1.0 + rng.gen_range(-noise_width..=noise_width);

        let mut effective_weight = weight;
        let mut context_multiplier = 1.0;
        if mode == UpdateMode::Social {
            if rng.gen_bool(self.cfg.misread_odds) {
                effective_weight = -weight * 0.5;
            }

            // Confirming evidence for an already-held belief lands harder.
            let bias = self.cfg.context_bias;
            if p > 0.6 && effective_weight > 0.0 {
                context_multiplier += bias;
            } else if p > 0.6 && effective_weight < 0.0 {
                context_multiplier -= bias;
            } else if p < 0.4 && effective_weight < 0.0 {
                context_multiplier += bias;
            } else if p < 0.4 && effective_weight > 0.0 {
                context_multiplier -= bias;
            }
        }

        let change = effective_weight * noise_multiplier * context_multiplier;

        // Diminishing returns near the bounds: approach 0/1 asymptotically.
        let rate = self.cfg.learning_rate;
        let new_p = if change > 0.0 {
            p + (1.0 - p) * change * rate
        } else {
            p + p * change * rate
        };

        let floor = self.cfg.epsilon / 100.0;
        new_p.clamp(floor, 1.0 - floor) * 100.0
    }

    /// Reads, updates, and writes back one (observer, target) cell.
    pub fn nudge<R: Rng + ?Sized>(
        &self,
        matrix: &mut SuspicionMatrix,
        observer: &PlayerId,
        target: &PlayerId,
        weight: f64,
        noise_width: f64,
        mode: UpdateMode,
        rng: &mut R,
    ) {
        if observer == target {
            return;
        }
        let current = matrix.value_or(observer, target, self.cfg.baseline);
        let updated = self.update(current, weight, noise_width, mode, rng);
        matrix.set(observer, target, updated);
    }

    /// Leaks a private result to the rest of the group as a small secondhand
    /// hunch, without revealing the knower.
    pub fn propagate_intuition<R: Rng + ?Sized>(
        &self,
        matrix: &mut SuspicionMatrix,
        knower: &PlayerId,
        target: &PlayerId,
        leaning: Leaning,
        observers: &[PlayerId],
        strength: f64,
        rng: &mut R,
    ) {
        let base = match leaning {
            Leaning::Bad => self.cfg.weights.intuition_leak,
            Leaning::Good => -self.cfg.weights.intuition_leak,
        };
        let magnitude = base * strength;

        for observer in observers {
            if observer == knower || observer == target {
                continue;
            }
            self.nudge(
                matrix,
                observer,
                target,
                magnitude,
                self.cfg.noise.private_leak,
                UpdateMode::Social,
                rng,
            );
        }
    }

    /// Picks a random living target and spreads a rumor about them to every
    /// other living observer. Returns what circulated, for logging.
    pub fn generate_rumor<R: Rng + ?Sized>(
        &self,
        matrix: &mut SuspicionMatrix,
        living: &[PlayerId],
        rng: &mut R,
    ) -> Option<Rumor> {
        if living.len() < 2 {
            return None;
        }

        let target = living.choose(rng)?.clone();
        let kind = if rng.gen_bool(0.6) {
            RumorKind::Suspicious
        } else {
            RumorKind::Trusted
        };
        let magnitude = match kind {
            RumorKind::Suspicious => self.cfg.weights.rumor_suspicious,
            RumorKind::Trusted => self.cfg.weights.rumor_trusted,
        };

        for observer in living {
            if *observer == target {
                continue;
            }
            self.nudge(
                matrix,
                observer,
                &target,
                magnitude,
                self.cfg.noise.rumor,
                UpdateMode::Social,
                rng,
            );
        }

        Some(Rumor { target, kind })
    }
}
