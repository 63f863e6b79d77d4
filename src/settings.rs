//! Engine configuration and color palette
//!
//! Tick increments, thresholds and the color -> exit mapping are data, not
//! code: a new color is a palette entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_GENERATION_ATTEMPTS, SHRED_STEP, STAGE_CLEAR_TICKS, TILE_SIZE};
use crate::sim::{BlockColor, CellKind};

/// Display colors for one block color and its exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: BlockColor,
    /// 0xRRGGBB of the block tiles
    pub block_rgb: u32,
    /// 0xRRGGBB of the matching exit tiles
    pub exit_rgb: u32,
}

/// The colors a stage may use. A color with no entry has no exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
    pub wall_rgb: u32,
    pub floor_rgb: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: vec![
                PaletteEntry {
                    color: BlockColor::Red,
                    block_rgb: 0xF03E3E,
                    exit_rgb: 0xFFC9C9,
                },
                PaletteEntry {
                    color: BlockColor::Blue,
                    block_rgb: 0x4263EB,
                    exit_rgb: 0xD0E0FF,
                },
                PaletteEntry {
                    color: BlockColor::Yellow,
                    block_rgb: 0xF59F00,
                    exit_rgb: 0xFFECB3,
                },
                PaletteEntry {
                    color: BlockColor::Green,
                    block_rgb: 0x2FB844,
                    exit_rgb: 0xD3F9D8,
                },
            ],
            wall_rgb: 0x495057,
            floor_rgb: 0xDEE2E6,
        }
    }
}

impl Palette {
    pub fn entry(&self, color: BlockColor) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.color == color)
    }

    pub fn has_exit(&self, color: BlockColor) -> bool {
        self.entry(color).is_some()
    }

    /// The exit cell kind a block of `color` may move onto
    pub fn exit_kind(&self, color: BlockColor) -> Option<CellKind> {
        self.entry(color).map(|e| CellKind::Exit(e.color))
    }

    /// Display color for a board cell
    pub fn cell_rgb(&self, kind: CellKind) -> u32 {
        match kind {
            CellKind::Wall => self.wall_rgb,
            CellKind::Floor => self.floor_rgb,
            CellKind::Exit(color) => self.entry(color).map(|e| e.exit_rgb).unwrap_or(self.wall_rgb),
        }
    }

    /// Copy of this palette with `color` removed
    pub fn without(mut self, color: BlockColor) -> Self {
        self.entries.retain(|e| e.color != color);
        self
    }
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pixel size of a tile; a block is done once it has shredded this far
    pub tile_size: f32,
    /// Shred progress added per tick
    pub shred_step: f32,
    /// Ticks the stage-clear message shows before the next stage (0 = wait for advance)
    pub stage_clear_ticks: u32,
    /// Board regenerations tried before a stage load fails
    pub max_generation_attempts: u32,
    pub palette: Palette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            shred_step: SHRED_STEP,
            stage_clear_ticks: STAGE_CLEAR_TICKS,
            max_generation_attempts: MAX_GENERATION_ATTEMPTS,
            palette: Palette::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config (missing fields take defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::Invalid("tile_size must be positive"));
        }
        if !(self.shred_step > 0.0) {
            return Err(ConfigError::Invalid("shred_step must be positive"));
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::Invalid("max_generation_attempts must be at least 1"));
        }
        Ok(())
    }

    /// Ticks a block spends shredding
    pub fn shred_ticks(&self) -> u32 {
        (self.tile_size / self.shred_step).ceil() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid config json: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
