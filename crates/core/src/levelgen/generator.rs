//! Generation orchestration: validates parameters and retries whole attempts until one succeeds.

mod pipeline;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use super::model::{GenerationStats, Level};
use super::rng::{attempt_seed, resolve_base_seed};
use crate::config::GenConfig;
use crate::error::{AttemptFailure, GenerationError};

/// How a level was reached: the run's base seed, the attempt that succeeded, and its counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub base_seed: u64,
    /// 1-based index of the successful attempt.
    pub attempts: u32,
    pub attempt_seed: u64,
    pub stats: GenerationStats,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLevel {
    pub level: Level,
    pub report: GenerationReport,
}

pub struct LevelGenerator {
    config: GenConfig,
}

impl LevelGenerator {
    pub fn new(config: GenConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    pub fn generate(&self) -> Result<GeneratedLevel, GenerationError> {
        let base_seed = resolve_base_seed(self.config.seed);
        let max_attempts = self.config.max_generation_retries;
        let mut last_failure = AttemptFailure::NoPlayerStart;

        for attempt in 1..=max_attempts {
            let seed = attempt_seed(base_seed, attempt);
            info!("generation attempt {attempt}/{max_attempts} (base seed {base_seed})");
            match pipeline::run_attempt(&self.config, seed) {
                Ok((level, stats)) => {
                    info!(
                        "level ready after {attempt} attempt(s): rooms={} storage={} steps={}",
                        level.rooms.len(),
                        level.storage_rooms.len(),
                        stats.steps_used
                    );
                    let report = GenerationReport {
                        base_seed,
                        attempts: attempt,
                        attempt_seed: seed,
                        stats,
                    };
                    return Ok(GeneratedLevel { level, report });
                }
                Err(failure) => {
                    warn!("attempt {attempt}/{max_attempts} abandoned: {failure}");
                    last_failure = failure;
                }
            }
        }

        error!("giving up after {max_attempts} attempts (base seed {base_seed})");
        Err(GenerationError::RetriesExhausted { attempts: max_attempts, last_failure })
    }

    /// Runs exactly one attempt with `seed`, as recorded in `GenerationReport::attempt_seed`.
    pub fn generate_attempt(&self, seed: u64) -> Result<Level, AttemptFailure> {
        pipeline::run_attempt(&self.config, seed).map(|(level, _)| level)
    }
}
