use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, warn};
use minegen::levelgen::audit_level;
use minegen::{GenConfig, generate_level};

/// Generates a run of consecutive seeds and audits every level.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 1)]
    start: u64,
    #[arg(short, long, default_value_t = 200)]
    count: u64,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SweepTotals {
    generated: u64,
    exhausted: u64,
    unsound: u64,
    attempts: u64,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let base = match &args.config {
        Some(path) => GenConfig::load(path)?,
        None => GenConfig::default(),
    };

    println!("Sweeping {} seeds from {}...", args.count, args.start);
    let totals = sweep(&base, args.start, args.count);

    println!(
        "Generated: {}, gave up: {}, failed audit: {}",
        totals.generated, totals.exhausted, totals.unsound
    );
    if totals.generated > 0 {
        println!(
            "Mean attempts per level: {:.2}",
            totals.attempts as f64 / totals.generated as f64
        );
    }
    if totals.unsound > 0 {
        bail!("{} levels failed the structural audit", totals.unsound);
    }
    Ok(())
}

/// Seeds past `u64::MAX` are skipped, so the totals may cover fewer than `count` levels.
fn sweep(base: &GenConfig, start: u64, count: u64) -> SweepTotals {
    let mut totals = SweepTotals::default();
    for seed in start..start.saturating_add(count) {
        let config = GenConfig { seed, ..base.clone() };
        let generated = match generate_level(&config) {
            Ok(generated) => generated,
            Err(err) => {
                warn!("seed {seed}: {err}");
                totals.exhausted += 1;
                continue;
            }
        };
        totals.generated += 1;
        totals.attempts += u64::from(generated.report.attempts);

        let findings = audit_level(&generated.level, &config);
        if !findings.is_empty() {
            totals.unsound += 1;
            for finding in &findings {
                error!("seed {seed}: {finding}");
            }
        }
    }
    totals
}
