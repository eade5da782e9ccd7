//! Procedural mine-level generation grown outward from a single origin cell.

pub mod model;

mod audit;
mod doorways;
mod frontier;
mod generator;
mod grid;
mod landmarks;
mod player_start;
mod rect;
mod rng;
mod rooms;
mod state;
mod storage;

pub use audit::{AuditFinding, audit_level};
pub use doorways::PLAYER_START_CODE;
pub use generator::{GeneratedLevel, GenerationReport, LevelGenerator};
pub use grid::Grid;
pub use model::{
    Doorway, DropPoint, Edge, GenerationStats, Level, Room, RoomSeparator, StorageRoom, WorldPos,
};
pub use rect::Rect;

use crate::config::GenConfig;
use crate::error::GenerationError;

pub fn generate_level(config: &GenConfig) -> Result<GeneratedLevel, GenerationError> {
    LevelGenerator::new(config.clone())?.generate()
}
