pub mod config;
pub mod error;
pub mod levelgen;
pub mod types;

pub use config::{GenConfig, SizeRange};
pub use error::{AttemptFailure, ConfigError, GenerationError};
pub use levelgen::{GeneratedLevel, Level, LevelGenerator, generate_level};
pub use types::*;
