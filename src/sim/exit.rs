//! Exit matching
//!
//! Runs right after a legal move commits. A block starts shredding when one
//! of its cells sits on its own exit and the move just made points the same
//! way as that exit. Arriving on an exit sideways does nothing; the block
//! stays active until a later move in the exit's direction.

use glam::IVec2;

use super::board::Board;
use super::state::Block;
use crate::settings::Palette;

/// Start shredding `block` if `move_dir` carries it out through its exit.
///
/// Cells are checked in shape order and the first match wins. Returns true if
/// the block entered the shredding state.
pub fn try_start_shred(board: &Board, palette: &Palette, block: &mut Block, move_dir: IVec2) -> bool {
    if !block.is_active() {
        return false;
    }
    let Some(exit_kind) = palette.exit_kind(block.color) else {
        return false;
    };

    let matched = block.cells().into_iter().find_map(|cell| {
        if board.get(cell) != Some(exit_kind) {
            return None;
        }
        board
            .exit_at(cell)
            .filter(|exit| exit.direction == move_dir)
            .map(|exit| exit.direction)
    });

    match matched {
        Some(direction) => {
            log::debug!(
                "Block {} shredding toward ({}, {})",
                block.id,
                direction.x,
                direction.y
            );
            block.start_shred(direction)
        }
        None => false,
    }
}
