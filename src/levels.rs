//! Level definitions
//!
//! A level is a list of block records `{ x, y, shape, color }`. Records are
//! checked when a run is created so bad data fails at load, never mid-play.

use std::collections::HashMap;
use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::is_interior;
use crate::settings::Palette;
use crate::sim::{Block, BlockColor};

/// One block as authored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub x: i32,
    pub y: i32,
    pub shape: Vec<(i32, i32)>,
    pub color: BlockColor,
}

impl BlockSpec {
    pub fn new(x: i32, y: i32, shape: &[(i32, i32)], color: BlockColor) -> Self {
        Self {
            x,
            y,
            shape: shape.to_vec(),
            color,
        }
    }

    pub fn anchor(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn offsets(&self) -> Vec<IVec2> {
        self.shape.iter().map(|&(dx, dy)| IVec2::new(dx, dy)).collect()
    }
}

/// One stage's starting block set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub name: String,
    pub blocks: Vec<BlockSpec>,
}

impl LevelData {
    pub fn new(name: &str, blocks: Vec<BlockSpec>) -> Self {
        Self {
            name: name.to_string(),
            blocks,
        }
    }

    /// Check the level can be played with `palette`
    ///
    /// Every block needs a non-empty shape without repeats, a palette color,
    /// and cells on interior floor that no other block covers.
    pub fn validate(&self, palette: &Palette) -> Result<(), LevelError> {
        if self.blocks.is_empty() {
            return Err(LevelError::EmptyLevel);
        }

        let mut owners: HashMap<IVec2, usize> = HashMap::new();
        for (index, spec) in self.blocks.iter().enumerate() {
            if spec.shape.is_empty() {
                return Err(LevelError::EmptyShape { block: index });
            }
            if !palette.has_exit(spec.color) {
                return Err(LevelError::UnknownColor {
                    block: index,
                    color: spec.color,
                });
            }

            let offsets = spec.offsets();
            for (i, offset) in offsets.iter().enumerate() {
                if offsets[..i].contains(offset) {
                    return Err(LevelError::DuplicateOffset {
                        block: index,
                        offset: *offset,
                    });
                }
            }

            for offset in offsets {
                let cell = spec.anchor() + offset;
                if !is_interior(cell) {
                    return Err(LevelError::OutOfBounds { block: index, cell });
                }
                if let Some(&other) = owners.get(&cell) {
                    return Err(LevelError::Overlap {
                        block: index,
                        other,
                        cell,
                    });
                }
                owners.insert(cell, index);
            }
        }
        Ok(())
    }

    /// Fresh active blocks, ids 1.. in record order
    pub fn spawn_blocks(&self) -> Vec<Block> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, spec)| Block::new(i as u32 + 1, spec.anchor(), spec.offsets(), spec.color))
            .collect()
    }
}

/// Parse a JSON array of levels
pub fn load_levels_json(json: &str) -> Result<Vec<LevelData>, LevelError> {
    serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))
}

/// The levels shipped with the game
pub fn builtin_levels() -> Vec<LevelData> {
    vec![level_1(), level_2()]
}

pub fn level_1() -> LevelData {
    LevelData::new(
        "Level 1",
        vec![
            BlockSpec::new(2, 5, &[(0, 0), (1, 0)], BlockColor::Red),
            BlockSpec::new(11, 2, &[(0, 0), (0, 1)], BlockColor::Blue),
            BlockSpec::new(4, 2, &[(0, 0), (1, 0), (1, 1), (2, 0)], BlockColor::Yellow),
            BlockSpec::new(6, 8, &[(0, 0), (1, 0), (0, 1)], BlockColor::Green),
        ],
    )
}

pub fn level_2() -> LevelData {
    LevelData::new(
        "Level 2",
        vec![
            BlockSpec::new(3, 3, &[(0, 0), (1, 0), (2, 0)], BlockColor::Red),
            BlockSpec::new(8, 5, &[(0, 0), (0, 1), (0, 2)], BlockColor::Blue),
            BlockSpec::new(5, 10, &[(0, 0), (1, 0), (0, 1)], BlockColor::Yellow),
            BlockSpec::new(10, 8, &[(0, 0), (1, 0), (2, 0), (3, 0)], BlockColor::Green),
        ],
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    EmptyLevel,
    EmptyShape { block: usize },
    DuplicateOffset { block: usize, offset: IVec2 },
    UnknownColor { block: usize, color: BlockColor },
    OutOfBounds { block: usize, cell: IVec2 },
    Overlap { block: usize, other: usize, cell: IVec2 },
    Parse(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::EmptyLevel => write!(f, "level has no blocks"),
            LevelError::EmptyShape { block } => write!(f, "block {block} has an empty shape"),
            LevelError::DuplicateOffset { block, offset } => {
                write!(f, "block {block} repeats offset ({}, {})", offset.x, offset.y)
            }
            LevelError::UnknownColor { block, color } => {
                write!(f, "block {block} uses color {} which has no exit", color.as_str())
            }
            LevelError::OutOfBounds { block, cell } => {
                write!(f, "block {block} covers ({}, {}) outside the floor", cell.x, cell.y)
            }
            LevelError::Overlap { block, other, cell } => {
                write!(f, "block {block} overlaps block {other} at ({}, {})", cell.x, cell.y)
            }
            LevelError::Parse(msg) => write!(f, "invalid level json: {msg}"),
        }
    }
}

impl std::error::Error for LevelError {}
