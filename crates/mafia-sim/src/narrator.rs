//! Pre-game narration. The contract is deliberately blocking-free: the
//! runner asks once before the first night and falls back to fixed copy if
//! the narrator has nothing better.

pub trait Narrator {
    /// One short scene-setting paragraph for the given roster.
    fn intro(&self, player_names: &[String]) -> String;
}

/// Fixed-copy fallback used when no richer narrator is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedNarrator;

impl Narrator for FixedNarrator {
    fn intro(&self, player_names: &[String]) -> String {
        let roster = player_names.join(", ");
        format!(
            "The town gathers as dusk settles: {roster}. Somewhere among them, the mafia are already choosing."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedNarrator, Narrator};

    #[test]
    fn fallback_mentions_every_name() {
        let names = vec!["Ada".to_string(), "Ben".to_string(), "Cleo".to_string()];
        let intro = FixedNarrator.intro(&names);
        for name in &names {
            assert!(intro.contains(name.as_str()));
        }
    }
}
