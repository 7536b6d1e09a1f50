use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-observer belief vectors over every other participant, as a 0-100
/// probability of being mafia. Owned exclusively by the session state and
/// replaced wholesale on each transition; ordered maps keep iteration (and
/// therefore seeded noise draws) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuspicionMatrix {
    entries: BTreeMap<PlayerId, BTreeMap<PlayerId, f64>>,
}

impl SuspicionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures `observer` has a row, so freshly seeded matrices list every
    /// participant even before any value lands.
    pub fn ensure_observer(&mut self, observer: &PlayerId) {
        self.entries.entry(observer.clone()).or_default();
    }

    /// Self-entries are undefined by construction and silently refused.
    pub fn set(&mut self, observer: &PlayerId, target: &PlayerId, value: f64) {
        if observer == target {
            return;
        }
        self.entries
            .entry(observer.clone())
            .or_default()
            .insert(target.clone(), value);
    }

    /// Any missing or non-finite lookup reads as `baseline`, never 0 or NaN.
    pub fn value_or(&self, observer: &PlayerId, target: &PlayerId, baseline: f64) -> f64 {
        self.entries
            .get(observer)
            .and_then(|row| row.get(target))
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(baseline)
    }

    pub fn observers(&self) -> impl Iterator<Item = &PlayerId> {
        self.entries.keys()
    }

    pub fn observer_ids(&self) -> Vec<PlayerId> {
        self.entries.keys().cloned().collect()
    }

    pub fn row(&self, observer: &PlayerId) -> Option<&BTreeMap<PlayerId, f64>> {
        self.entries.get(observer)
    }

    /// Decays every stored value toward `baseline`:
    /// `new = old * lambda + baseline * (1 - lambda)`.
    pub fn drift(&mut self, lambda: f64, baseline: f64) {
        for row in self.entries.values_mut() {
            for value in row.values_mut() {
                *value = *value * lambda + baseline * (1.0 - lambda);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SuspicionMatrix;
    use crate::model::player::PlayerId;

    const BASE: f64 = 35.0;

    fn id(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    #[test]
    fn missing_lookup_reads_as_baseline() {
        let matrix = SuspicionMatrix::new();
        assert_eq!(matrix.value_or(&id("a"), &id("b"), BASE), BASE);
    }

    #[test]
    fn non_finite_values_read_as_baseline() {
        let mut matrix = SuspicionMatrix::new();
        matrix.set(&id("a"), &id("b"), f64::NAN);
        assert_eq!(matrix.value_or(&id("a"), &id("b"), BASE), BASE);
    }

    #[test]
    fn self_entries_are_refused() {
        let mut matrix = SuspicionMatrix::new();
        matrix.set(&id("a"), &id("a"), 80.0);
        assert_eq!(matrix.value_or(&id("a"), &id("a"), BASE), BASE);
    }

    #[test]
    fn drift_moves_values_toward_baseline() {
        let mut matrix = SuspicionMatrix::new();
        matrix.set(&id("a"), &id("b"), 95.0);
        matrix.set(&id("b"), &id("a"), 5.0);
        matrix.drift(0.85, BASE);
        assert_eq!(matrix.value_or(&id("a"), &id("b"), BASE), 95.0 * 0.85 + BASE * 0.15);
        assert_eq!(matrix.value_or(&id("b"), &id("a"), BASE), 5.0 * 0.85 + BASE * 0.15);
    }
}
