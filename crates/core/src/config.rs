//! Tunable generation parameters, their defaults, and validation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Pos;

pub const DEFAULT_MAX_GENERATION_RETRIES: u32 = 10;

/// Inclusive integer range used for room side lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    pub width: i32,
    pub height: i32,
    /// Cells within `margin` of any edge are never carved.
    pub margin: i32,
    pub cell_size: f32,
    /// Zero derives a fresh seed for every run.
    pub seed: u64,

    pub total_steps: usize,
    pub turn_chance: f64,
    pub branch_chance: f64,
    pub min_straight_before_turn: u32,
    pub explore_drive: f64,

    pub room_chance_at_endpoint: f64,
    pub target_room_count: usize,
    pub room_size: SizeRange,
    pub room_buffer: i32,
    pub min_room_doors: usize,
    pub max_room_doors: usize,

    pub storage_room_count: usize,
    pub storage_rooms_only_in_hallways: bool,
    pub hard_block_radius: f64,

    pub max_generation_retries: u32,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            width: 90,
            height: 70,
            margin: 5,
            cell_size: 5.0,
            seed: 0,
            total_steps: 450,
            turn_chance: 0.25,
            branch_chance: 0.15,
            min_straight_before_turn: 3,
            explore_drive: 0.85,
            room_chance_at_endpoint: 0.45,
            target_room_count: 8,
            room_size: SizeRange { min: 4, max: 8 },
            room_buffer: 3,
            min_room_doors: 1,
            max_room_doors: 2,
            storage_room_count: 5,
            storage_rooms_only_in_hallways: true,
            hard_block_radius: 10.0,
            max_generation_retries: DEFAULT_MAX_GENERATION_RETRIES,
        }
    }
}

impl GenConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&source)
    }

    /// The origin every corridor grows from.
    pub fn gen_start(&self) -> Pos {
        Pos::new(self.width / 2, self.height / 2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::EmptyGrid { width: self.width, height: self.height });
        }

        let centre = self.gen_start();
        let interior_holds_centre = self.margin >= 0
            && centre.x >= self.margin
            && centre.x < self.width - self.margin
            && centre.y >= self.margin
            && centre.y < self.height - self.margin;
        if !interior_holds_centre {
            return Err(ConfigError::MarginTooLarge {
                margin: self.margin,
                width: self.width,
                height: self.height,
            });
        }

        for (name, value) in [
            ("turn_chance", self.turn_chance),
            ("branch_chance", self.branch_chance),
            ("room_chance_at_endpoint", self.room_chance_at_endpoint),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("explore_drive", self.explore_drive),
            ("hard_block_radius", self.hard_block_radius),
            ("room_buffer", f64::from(self.room_buffer)),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeValue { name, value });
            }
        }

        if self.room_size.min < 1 || self.room_size.min > self.room_size.max {
            return Err(ConfigError::InvalidRange {
                name: "room_size",
                min: i64::from(self.room_size.min),
                max: i64::from(self.room_size.max),
            });
        }

        if self.min_room_doors < 1 || self.min_room_doors > self.max_room_doors {
            return Err(ConfigError::InvalidRange {
                name: "room_doors",
                min: self.min_room_doors as i64,
                max: self.max_room_doors as i64,
            });
        }

        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }

        if self.max_generation_retries == 0 {
            return Err(ConfigError::NoRetries);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_validate() {
        GenConfig::default().validate().expect("defaults must be usable");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config = GenConfig::from_toml_str(
            "seed = 42\ntotal_steps = 300\n[room_size]\nmin = 3\nmax = 5\n",
        )
        .expect("partial file should parse");
        assert_eq!(config.seed, 42);
        assert_eq!(config.total_steps, 300);
        assert_eq!(config.room_size, SizeRange { min: 3, max: 5 });
        assert_eq!(config.width, 90);
        assert_eq!(config.max_room_doors, 2);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("level.toml");
        fs::write(&path, "seed = 7\nstorage_room_count = 0\nhard_block_radius = 4.5\n")
            .expect("write");

        let loaded = GenConfig::load(&path).expect("load");
        let expected = GenConfig {
            seed: 7,
            storage_room_count: 0,
            hard_block_radius: 4.5,
            ..GenConfig::default()
        };
        assert_eq!(loaded, expected);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().expect("tempdir");
        let err = GenConfig::load(&dir.path().join("missing.toml")).expect_err("no file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rejects_margin_that_swallows_the_centre() {
        let config = GenConfig { width: 10, height: 10, margin: 5, ..GenConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::MarginTooLarge { .. })));
    }

    #[test]
    fn rejects_probability_outside_unit_interval() {
        let config = GenConfig { branch_chance: 1.5, ..GenConfig::default() };
        let err = config.validate().expect_err("branch chance too large");
        assert!(err.to_string().contains("branch_chance"), "unexpected message: {err}");
    }

    #[test]
    fn rejects_inverted_door_range() {
        let config = GenConfig { min_room_doors: 3, max_room_doors: 2, ..GenConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { name: "room_doors", .. })
        ));
    }

    #[test]
    fn rejects_zero_retries() {
        let config = GenConfig { max_generation_retries: 0, ..GenConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NoRetries)));
    }
}
