//! Read-only presentation helpers
//!
//! Geometry a renderer needs in pixel space: shred clip regions, the selection
//! cursor and exit arrow glyphs. Nothing here mutates state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::Exit;
use super::geometry::bounding_box;
use super::state::{Block, BlockState, GameState};
use crate::consts::{GRID_HEIGHT, GRID_WIDTH};

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Screen size in pixels for a given tile size
pub fn screen_size(tile_size: f32) -> Vec2 {
    Vec2::new(GRID_WIDTH as f32, GRID_HEIGHT as f32) * tile_size
}

/// Region a shredding block may still be drawn in.
///
/// The visible edge is measured from the anchor tile and retreats by the
/// shred progress toward the exit. None for blocks that are not shredding.
pub fn shred_clip(block: &Block, tile_size: f32) -> Option<Rect> {
    if block.state() != BlockState::Shredding {
        return None;
    }
    let dir = block.shred_direction()?;
    let p = block.shred_progress();
    let screen = screen_size(tile_size);
    let ax = block.anchor.x as f32 * tile_size;
    let ay = block.anchor.y as f32 * tile_size;

    let rect = match (dir.x, dir.y) {
        (-1, 0) => Rect::new(0.0, 0.0, ax + tile_size - p, screen.y),
        (1, 0) => Rect::new(ax + p, 0.0, screen.x, screen.y),
        (0, -1) => Rect::new(0.0, 0.0, screen.x, ay + tile_size - p),
        (0, 1) => Rect::new(0.0, ay + p, screen.x, screen.y),
        _ => return None,
    };
    Some(rect)
}

/// Triangle for an exit arrow: tip first, pointing out of the board
pub fn exit_arrow(exit: &Exit, tile_size: f32) -> [Vec2; 3] {
    let center = (exit.pos.as_vec2() + Vec2::splat(0.5)) * tile_size;
    let d = exit.direction.as_vec2();
    let perp = Vec2::new(d.y, -d.x);
    let tip = center + d * 4.0;
    let back = center - d * 4.0;
    [tip, back + perp * 2.0, back - perp * 2.0]
}

impl GameState {
    /// One-pixel border around the selected block's bounding box
    pub fn cursor_rect(&self) -> Option<Rect> {
        let block = self.selected_block().filter(|b| b.is_active())?;
        let (min, max) = bounding_box(&block.cells())?;
        let t = self.config.tile_size;
        let size = (max - min + glam::IVec2::ONE).as_vec2() * t;
        Some(Rect::new(
            min.x as f32 * t - 1.0,
            min.y as f32 * t - 1.0,
            size.x + 2.0,
            size.y + 2.0,
        ))
    }

    /// Clip region for a block during its shred animation
    pub fn shred_clip(&self, block: &Block) -> Option<Rect> {
        shred_clip(block, self.config.tile_size)
    }

    pub fn screen_size(&self) -> Vec2 {
        screen_size(self.config.tile_size)
    }
}
