//! Board grid and exit generation
//!
//! The board is a fixed 15x13 grid. Interior cells are floor; the perimeter is
//! wall except where an exit segment has been carved for a block's color.
//! The board never records block occupancy; that is computed from block state.

use std::collections::HashSet;

use glam::IVec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::geometry::bounding_size;
use super::state::{Block, BlockColor};
use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::in_bounds;
use crate::settings::Palette;

/// What a board cell is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Floor,
    /// Perimeter cell that lets blocks of this color out
    Exit(BlockColor),
}

/// A side of the perimeter wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Outward normal; the direction a block must be moving to exit through this side
    pub fn direction(self) -> IVec2 {
        match self {
            Side::Top => IVec2::NEG_Y,
            Side::Bottom => IVec2::Y,
            Side::Left => IVec2::NEG_X,
            Side::Right => IVec2::X,
        }
    }

    /// Top and bottom run along x
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    /// Positions along the side that are not corners
    pub fn span(self) -> std::ops::Range<i32> {
        if self.is_horizontal() {
            1..GRID_WIDTH - 1
        } else {
            1..GRID_HEIGHT - 1
        }
    }

    /// Board cell at position `i` along this side
    pub fn cell(self, i: i32) -> IVec2 {
        match self {
            Side::Top => IVec2::new(i, 0),
            Side::Bottom => IVec2::new(i, GRID_HEIGHT - 1),
            Side::Left => IVec2::new(0, i),
            Side::Right => IVec2::new(GRID_WIDTH - 1, i),
        }
    }

    /// Exit length for a block with bounding box `size` (width for top/bottom, height for left/right)
    pub fn segment_len(self, size: IVec2) -> i32 {
        if self.is_horizontal() { size.x } else { size.y }
    }

    /// Every start position whose segment of `len` fits inside the span
    pub fn segment_starts(self, len: i32) -> Vec<i32> {
        let span = self.span();
        if len <= 0 || len > span.len() as i32 {
            return Vec::new();
        }
        (span.start..=span.end - len).collect()
    }
}

/// One exit cell on the perimeter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub pos: IVec2,
    /// Direction a block must move to leave through this cell
    pub direction: IVec2,
    pub color: BlockColor,
}

/// Static wall/floor/exit grid for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Row-major cells (y * GRID_WIDTH + x)
    cells: Vec<CellKind>,
    exits: Vec<Exit>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Walls all around, floor inside, no exits
    pub fn new() -> Self {
        let mut cells = vec![CellKind::Wall; (GRID_WIDTH * GRID_HEIGHT) as usize];
        for y in 1..GRID_HEIGHT - 1 {
            for x in 1..GRID_WIDTH - 1 {
                cells[(y * GRID_WIDTH + x) as usize] = CellKind::Floor;
            }
        }
        Self {
            cells,
            exits: Vec::new(),
        }
    }

    #[inline]
    fn index(cell: IVec2) -> Option<usize> {
        in_bounds(cell).then(|| (cell.y * GRID_WIDTH + cell.x) as usize)
    }

    pub fn width(&self) -> i32 {
        GRID_WIDTH
    }

    pub fn height(&self) -> i32 {
        GRID_HEIGHT
    }

    /// Cell kind at `cell`, None off the board
    pub fn get(&self, cell: IVec2) -> Option<CellKind> {
        Self::index(cell).map(|idx| self.cells[idx])
    }

    /// All exit cells, in carving order
    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    pub fn exit_at(&self, cell: IVec2) -> Option<&Exit> {
        self.exits.iter().find(|e| e.pos == cell)
    }

    /// Rows of cell kinds, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[CellKind]> {
        self.cells.chunks(GRID_WIDTH as usize)
    }

    fn carve(&mut self, side: Side, start: i32, len: i32, color: BlockColor) {
        for i in start..start + len {
            let pos = side.cell(i);
            if let Some(idx) = Self::index(pos) {
                self.cells[idx] = CellKind::Exit(color);
                self.exits.push(Exit {
                    pos,
                    direction: side.direction(),
                    color,
                });
            }
        }
    }
}

/// Outcome of exit placement for one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Placed {
        block_id: u32,
        side: Side,
        start: i32,
        len: i32,
    },
    /// No side had a free segment long enough
    Unplaced { block_id: u32, size: IVec2 },
    /// Block color has no exit in the palette
    NoExitColor { block_id: u32 },
}

impl Placement {
    pub fn block_id(&self) -> u32 {
        match *self {
            Placement::Placed { block_id, .. }
            | Placement::Unplaced { block_id, .. }
            | Placement::NoExitColor { block_id } => block_id,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed { .. })
    }
}

/// A generated board plus the per-block placement report
#[derive(Debug, Clone)]
pub struct Generation {
    pub board: Board,
    /// One entry per block, in the (shuffled) order blocks were processed
    pub placements: Vec<Placement>,
}

impl Generation {
    /// True if every block got an exit
    pub fn is_complete(&self) -> bool {
        self.placements.iter().all(Placement::is_placed)
    }

    /// Ids of blocks left without an exit
    pub fn unplaced(&self) -> Vec<u32> {
        self.placements
            .iter()
            .filter(|p| !p.is_placed())
            .map(Placement::block_id)
            .collect()
    }
}

/// Build the stage board and carve one exit segment per block
///
/// Blocks are visited in random order; each tries the four sides in random
/// order and takes the first free segment among shuffled candidates. A segment
/// never touches a corner and never shares a cell with another exit.
pub fn generate_board<R: Rng + ?Sized>(blocks: &[Block], palette: &Palette, rng: &mut R) -> Generation {
    let mut board = Board::new();
    let mut used: HashSet<IVec2> = HashSet::new();
    let mut placements = Vec::with_capacity(blocks.len());

    let mut order: Vec<&Block> = blocks.iter().collect();
    order.shuffle(rng);

    for block in order {
        if !palette.has_exit(block.color) {
            log::warn!("Block {} ({}) has no exit color", block.id, block.color.as_str());
            placements.push(Placement::NoExitColor { block_id: block.id });
            continue;
        }

        let size = bounding_size(&block.shape);
        let mut sides = Side::ALL;
        sides.shuffle(rng);

        let mut placed = None;
        'sides: for side in sides {
            let len = side.segment_len(size);
            let mut starts = side.segment_starts(len);
            starts.shuffle(rng);
            for start in starts {
                if (start..start + len).all(|i| !used.contains(&side.cell(i))) {
                    placed = Some((side, start, len));
                    break 'sides;
                }
            }
        }

        match placed {
            Some((side, start, len)) => {
                board.carve(side, start, len, block.color);
                used.extend((start..start + len).map(|i| side.cell(i)));
                placements.push(Placement::Placed {
                    block_id: block.id,
                    side,
                    start,
                    len,
                });
            }
            None => {
                log::warn!(
                    "No free exit segment for block {} ({}x{} {})",
                    block.id,
                    size.x,
                    size.y,
                    block.color.as_str()
                );
                placements.push(Placement::Unplaced {
                    block_id: block.id,
                    size,
                });
            }
        }
    }

    Generation { board, placements }
}
