use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use minegen::{GenConfig, GeneratedLevel, generate_level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML parameter file; the flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base seed; 0 picks a fresh one
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Corridor growth step budget
    #[arg(long)]
    steps: Option<usize>,

    #[arg(long)]
    storage_rooms: Option<usize>,

    /// Write the level and its generation report to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Skip printing the ASCII map
    #[arg(long)]
    no_ascii: bool,
}

fn build_config(args: &Args) -> Result<GenConfig> {
    let mut config = match &args.config {
        Some(path) => GenConfig::load(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
        None => GenConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(steps) = args.steps {
        config.total_steps = steps;
    }
    if let Some(count) = args.storage_rooms {
        config.storage_room_count = count;
    }
    Ok(config)
}

fn print_summary(generated: &GeneratedLevel) {
    let level = &generated.level;
    let report = &generated.report;
    println!(
        "Base seed: {} (attempt {} seed {})",
        report.base_seed, report.attempts, report.attempt_seed
    );
    println!("Size: {}x{}", level.width(), level.height());
    println!("Rooms: {}", level.rooms.len());
    println!("Storage rooms: {}", level.storage_rooms.len());
    println!("Dead ends: {}", level.dead_ends.len());
    let door = level.player_start_door_direction();
    println!("Player start: {:?} (door {door:?})", level.player_start);
    println!("Exit: {:?}", level.exit);
    println!("Fingerprint: {:016x}", level.fingerprint());
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let generated = generate_level(&config).context("Level generation failed")?;

    if !args.no_ascii {
        println!("{}", generated.level.render_ascii());
    }
    print_summary(&generated);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&generated)
            .context("Failed to serialize the generated level")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write level JSON: {}", path.display()))?;
        info!("level written to {}", path.display());
    }

    Ok(())
}
