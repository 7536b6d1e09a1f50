use std::path::PathBuf;

use clap::Parser;

use mafia_sim::config::{ResolvedOutputs, SimConfig};
use mafia_sim::logging::init_logging;
use mafia_sim::runner::SimRunner;

/// Deterministic simulation harness for the mafia session engine.
#[derive(Debug, Parser)]
#[command(
    name = "mafia-sim",
    author,
    version,
    about = "Scripted mafia session simulator"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/sim.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the RNG seed for session generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the number of players per session.
    #[arg(long, value_name = "PLAYERS")]
    players: Option<usize>,

    /// Exit after validating the configuration (no games are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.sessions.seed = Some(seed);
    }

    if let Some(games) = cli.games {
        config.sessions.games = games;
    }

    if let Some(players) = cli.players {
        config.sessions.players = players;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.sessions.games;
    let players = config.sessions.players;

    println!(
        "Loaded configuration '{run_id}': {games} game{} of {players} players",
        if games == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    if let Some(guard) = _logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let runner = SimRunner::new(config, outputs);
    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} games → {} transition rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());

    Ok(())
}
