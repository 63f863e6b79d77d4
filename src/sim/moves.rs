//! Move validation
//!
//! A move is one tile along an axis. It is legal when every cell the block
//! would cover is either interior floor or this block's own exit, and no other
//! active block sits there. Shredding and done blocks do not collide.

use glam::IVec2;

use super::board::Board;
use super::state::Block;
use crate::is_interior;
use crate::settings::Palette;

/// Would moving `block` by `delta` be legal? Pure; nothing is mutated.
pub fn is_legal(board: &Board, palette: &Palette, block: &Block, delta: IVec2, blocks: &[Block]) -> bool {
    let own_exit = palette.exit_kind(block.color);
    let others: Vec<&Block> = blocks
        .iter()
        .filter(|b| b.id != block.id && b.is_active())
        .collect();

    block.cells_at(block.anchor + delta).into_iter().all(|cell| {
        if !is_interior(cell) {
            // Perimeter or off-board: only our own exit lets us through
            let kind = board.get(cell);
            if kind.is_none() || kind != own_exit {
                return false;
            }
        }
        !others.iter().any(|other| other.covers(cell))
    })
}
