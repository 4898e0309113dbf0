use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use party_core::{
    FrameInput, InputJournal, Level, LevelDescription, LevelState, ReplayResult,
    SimulationConfig, replay_to_end,
};
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a level headless and print the outcome
    Simulate {
        /// Level JSON file
        #[arg(short, long)]
        level: PathBuf,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,
        #[arg(long, default_value_t = 1.0 / 30.0)]
        frame_dt: f32,
        /// Optional TOML config overriding the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Drive the player with random input instead of standing still
        #[arg(long)]
        wander: bool,
        /// Write the session's input journal here
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Rerun an input journal and print the final hash
    Replay {
        #[arg(short, long)]
        journal: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    match Args::parse().command {
        Command::Simulate { level, seed, seconds, frame_dt, config, wander, record } => {
            simulate(&level, seed, seconds, frame_dt, config.as_deref(), wander, record.as_deref())
        }
        Command::Replay { journal, config } => replay(&journal, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(SimulationConfig::default()),
    }
}

fn random_input(rng: &mut ChaCha8Rng) -> FrameInput {
    let axis = |value: u32| (value % 3) as f32 - 1.0;
    FrameInput {
        move_x: axis(rng.next_u32()),
        move_z: axis(rng.next_u32()),
        interact: rng.next_u32() % 20 == 0,
    }
}

fn simulate(
    level_path: &Path,
    seed: u64,
    seconds: f32,
    frame_dt: f32,
    config_path: Option<&Path>,
    wander: bool,
    record: Option<&Path>,
) -> Result<()> {
    anyhow::ensure!(frame_dt > 0.0, "frame step must be positive, got {frame_dt}");
    let config = load_config(config_path)?;
    let json = fs::read_to_string(level_path)
        .with_context(|| format!("Failed to read level file: {}", level_path.display()))?;
    let description = LevelDescription::from_json(&json).context("Failed to parse level JSON")?;
    let mut level =
        Level::new(&description, config, seed).context("Failed to load level")?;
    let mut journal = InputJournal::new(seed, frame_dt, description);
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);

    let frames = (seconds / frame_dt).ceil() as u64;
    for frame in 0..frames {
        let input = if wander && level.state() == LevelState::InProgress {
            random_input(&mut rng)
        } else {
            FrameInput::default()
        };
        journal.record(frame, input);
        level.step(frame_dt, input);
        if level.state().is_terminal() {
            info!(frame, "level decided");
            break;
        }
    }

    print_result(&ReplayResult::of(&level));
    if let Some(path) = record {
        journal
            .save(path)
            .with_context(|| format!("Failed to write journal: {}", path.display()))?;
        println!("Journal written to {}", path.display());
    }
    Ok(())
}

fn replay(journal_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let journal = InputJournal::load(journal_path)
        .with_context(|| format!("Failed to read journal file: {}", journal_path.display()))?;
    let result = replay_to_end(&config, &journal).context("Replay failed during execution")?;
    println!("Replay complete.");
    print_result(&result);
    Ok(())
}

fn print_result(result: &ReplayResult) {
    println!("Final Frame: {}", result.final_frame);
    println!("Outcome: {:?}", result.final_state);
    println!("Score: {} (negative {})", result.score, result.negative_score);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);
}
