//! Block Shredder - A grid sliding-block puzzle
//!
//! Core modules:
//! - `sim`: Deterministic puzzle engine (board generation, moves, exits, stages)
//! - `levels`: Authored level data and load-time validation
//! - `settings`: Data-driven engine configuration and palette

pub mod levels;
pub mod settings;
pub mod sim;

pub use levels::{BlockSpec, LevelData, LevelError};
pub use settings::{EngineConfig, Palette, PaletteEntry};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Board width in tiles, perimeter wall included
    pub const GRID_WIDTH: i32 = 15;
    /// Board height in tiles, perimeter wall included
    pub const GRID_HEIGHT: i32 = 13;

    /// Pixel size of one tile; also the shred completion threshold
    pub const TILE_SIZE: f32 = 16.0;
    /// Shred progress added per tick (32 ticks to fully shred at 16px tiles)
    pub const SHRED_STEP: f32 = 0.5;

    /// Ticks the stage-clear message stays up before the next stage loads (2 seconds at 60 Hz)
    pub const STAGE_CLEAR_TICKS: u32 = 2 * 60;
    /// Whole-board regeneration attempts before a stage load gives up
    pub const MAX_GENERATION_ATTEMPTS: u32 = 16;
}

/// The four unit moves, in arrow-key order (left, right, up, down)
pub const DIRECTIONS: [IVec2; 4] = [IVec2::NEG_X, IVec2::X, IVec2::NEG_Y, IVec2::Y];

/// True if `dir` is one of the four unit moves
#[inline]
pub fn is_unit_direction(dir: IVec2) -> bool {
    dir.x.abs() + dir.y.abs() == 1
}

/// True if `cell` lies strictly inside the perimeter wall
#[inline]
pub fn is_interior(cell: IVec2) -> bool {
    cell.x >= 1 && cell.x < consts::GRID_WIDTH - 1 && cell.y >= 1 && cell.y < consts::GRID_HEIGHT - 1
}

/// True if `cell` lies anywhere on the board, perimeter included
#[inline]
pub fn in_bounds(cell: IVec2) -> bool {
    cell.x >= 0 && cell.x < consts::GRID_WIDTH && cell.y >= 0 && cell.y < consts::GRID_HEIGHT
}

/// Convert pixel coordinates to the tile under them
#[inline]
pub fn pixel_to_cell(px: f32, py: f32, tile_size: f32) -> IVec2 {
    IVec2::new((px / tile_size).floor() as i32, (py / tile_size).floor() as i32)
}
