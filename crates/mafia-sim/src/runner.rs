//! Plays every configured game to completion on a simulated clock and
//! streams one JSONL row per phase transition.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mafia_core::game::state::Phase;
use mafia_core::model::role::Faction;
use mafia_core::model::session::Session;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::bots;
use crate::config::{ResolvedOutputs, SimConfig};
use crate::driver::SessionHost;
use crate::narrator::{FixedNarrator, Narrator};

/// A game that hasn't resolved after this many transitions is stuck; the
/// belief model converges far earlier in practice.
const MAX_TRANSITIONS_PER_GAME: usize = 200;

pub struct SimRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
    narrator: Box<dyn Narrator>,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct TransitionRow {
    run_id: String,
    game_id: String,
    game_seed: u64,
    transition_index: usize,
    phase: String,
    round: u32,
    clock_ms: u64,
    session: Session,
}

struct GameReport {
    game_id: String,
    seed: u64,
    winner: Option<Faction>,
    rounds: u32,
    survivors: usize,
    transitions: usize,
}

impl SimRunner {
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Self {
        Self {
            config,
            outputs,
            narrator: Box::new(FixedNarrator),
        }
    }

    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    /// Execute the run, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.sessions.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut reports = Vec::with_capacity(self.config.sessions.games);

        for game_index in 0..self.config.sessions.games {
            let game_seed = rng.next_u64();
            let report = self.play_game(game_index, game_seed, &mut writer, &mut rows_written)?;
            reports.push(report);
        }

        writer.flush()?;
        write_summary_markdown(&self.outputs.summary_md, &self.config.run_id, &reports)?;

        Ok(RunSummary {
            games_played: reports.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        game_seed: u64,
        writer: &mut BufWriter<File>,
        rows_written: &mut usize,
    ) -> Result<GameReport, RunnerError> {
        let game_id = format!("G{game_index:03}");
        let host = SessionHost::new(
            game_id.clone(),
            self.config.sessions.players,
            game_seed,
            self.config.engine.clone(),
        );

        let names: Vec<String> = host.read(|s| s.players.values().map(|p| p.name.clone()).collect());
        let intro = self.narrator.intro(&names);
        event!(
            target: "mafia_sim::game",
            Level::INFO,
            run_id = %self.config.run_id,
            game_id = %game_id,
            game_seed,
            intro = %intro,
            "game starting"
        );

        host.start(0);
        let baseline = self.config.engine.baseline;

        for transition_index in 0..MAX_TRANSITIONS_PER_GAME {
            let (phase, phase_end) = host.read(|s| {
                let game = s.game.as_ref().map(|g| (g.phase, g.phase_end_ms));
                game.unwrap_or((Phase::GameOver, 0))
            });
            if phase == Phase::GameOver {
                let (winner, rounds, survivors) = host.read(|s| {
                    let game = s.game.as_ref();
                    (
                        game.and_then(|g| g.winner),
                        game.map(|g| g.round).unwrap_or(0),
                        s.living_ids().len(),
                    )
                });
                let winner_label = winner.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string());
                event!(
                    target: "mafia_sim::game",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    game_id = %game_id,
                    winner = %winner_label,
                    rounds,
                    survivors = survivors as u32,
                    "game finished"
                );
                return Ok(GameReport {
                    game_id,
                    seed: game_seed,
                    winner,
                    rounds,
                    survivors,
                    transitions: transition_index,
                });
            }

            match phase {
                Phase::Night => host.submit(|s| bots::act_night(s, baseline)),
                Phase::Discussion => host.submit(|s| bots::act_discussion(s, baseline)),
                Phase::Voting => host.submit(|s| bots::act_voting(s, baseline)),
                Phase::GameOver => {}
            }

            let Some(session) = host.tick(phase_end) else {
                return Err(RunnerError::Stalled {
                    game_id,
                    phase: phase.to_string(),
                });
            };

            let (next_phase, round) = session
                .game
                .as_ref()
                .map(|g| (g.phase.to_string(), g.round))
                .unwrap_or_default();
            event!(
                target: "mafia_sim::transition",
                Level::DEBUG,
                run_id = %self.config.run_id,
                game_id = %game_id,
                transition_index = transition_index as u32,
                phase = %next_phase,
                round,
                "phase transition"
            );

            let row = TransitionRow {
                run_id: self.config.run_id.clone(),
                game_id: game_id.clone(),
                game_seed,
                transition_index,
                phase: next_phase,
                round,
                clock_ms: phase_end,
                session,
            };
            serde_json::to_writer(&mut *writer, &row)?;
            writer.write_all(b"\n")?;
            *rows_written += 1;
        }

        Err(RunnerError::TransitionCap {
            game_id,
            cap: MAX_TRANSITIONS_PER_GAME,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_summary_markdown(
    path: &Path,
    run_id: &str,
    reports: &[GameReport],
) -> Result<(), RunnerError> {
    let mut out = String::new();
    out.push_str(&format!("# Simulation summary: {run_id}\n\n"));
    out.push_str("| game | seed | winner | rounds | survivors | transitions |\n");
    out.push_str("|------|------|--------|--------|-----------|-------------|\n");
    for report in reports {
        let winner = report
            .winner
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            report.game_id, report.seed, winner, report.rounds, report.survivors,
            report.transitions
        ));
    }

    let mafia_wins = reports
        .iter()
        .filter(|r| r.winner == Some(Faction::Mafia))
        .count();
    let villager_wins = reports
        .iter()
        .filter(|r| r.winner == Some(Faction::Villager))
        .count();
    out.push_str(&format!(
        "\nMafia wins: {mafia_wins} / Villager wins: {villager_wins} (of {} games)\n",
        reports.len()
    ));

    fs::write(path, out)?;
    Ok(())
}

/// Errors surfaced while executing a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize transition row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("game {game_id} stalled in {phase}: engine not ready at its own deadline")]
    Stalled { game_id: String, phase: String },
    #[error("game {game_id} exceeded {cap} transitions without resolving")]
    TransitionCap { game_id: String, cap: usize },
}

#[cfg(test)]
mod tests {
    use super::SimRunner;
    use crate::config::SimConfig;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, seed: u64) -> SimConfig {
        let yaml = format!(
            r#"
run_id: "unit"
sessions:
  seed: {seed}
  games: 2
  players: 6
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
"#,
            jsonl = dir.join("transitions.jsonl").display(),
            summary = dir.join("summary.md").display(),
        );
        let mut cfg: SimConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
        cfg.validate().expect("config validates");
        cfg
    }

    #[test]
    fn runs_every_game_to_completion() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), 77);
        let outputs = cfg.resolved_outputs();

        let summary = SimRunner::new(cfg, outputs).run().expect("run completes");
        assert_eq!(summary.games_played, 2);
        assert!(summary.rows_written > 0);
        assert!(summary.jsonl_path.exists());

        let md = std::fs::read_to_string(&summary.summary_path).expect("summary readable");
        assert!(md.contains("G000"));
        assert!(md.contains("G001"));
    }
}
