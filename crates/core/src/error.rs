//! Error types for configuration, single attempts, and whole generation runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A generation parameter that cannot produce a layout.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: i32, height: i32 },

    #[error("margin {margin} leaves no carvable centre in a {width}x{height} grid")]
    MarginTooLarge { margin: i32, width: i32, height: i32 },

    #[error("`{name}` must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("`{name}` must be a finite non-negative number, got {value}")]
    NegativeValue { name: &'static str, value: f64 },

    #[error("`{name}` range is inverted or empty: min {min}, max {max}")]
    InvalidRange { name: &'static str, min: i64, max: i64 },

    #[error("`cell_size` must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("`max_generation_retries` must be at least 1")]
    NoRetries,

    #[error("could not read parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid parameter file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Why a single attempt was abandoned. Attempt-scoped and retryable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    #[error("no viable player-start placement from dead ends or edge hallways")]
    NoPlayerStart,

    #[error("no dead end could host the exit")]
    NoExit,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("level generation failed after {attempts} attempts (last failure: {last_failure})")]
    RetriesExhausted { attempts: u32, last_failure: AttemptFailure },
}
