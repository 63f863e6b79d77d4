//! Game state and core simulation types
//!
//! Everything the presentation layer reads lives here. Only the engine mutates it.

use glam::IVec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::geometry;
use crate::levels::LevelData;
use crate::settings::EngineConfig;

/// Block colors. Exits share the color of the block they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockColor {
    Red,
    Blue,
    Yellow,
    Green,
}

impl BlockColor {
    pub const ALL: [BlockColor; 4] = [
        BlockColor::Red,
        BlockColor::Blue,
        BlockColor::Yellow,
        BlockColor::Green,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockColor::Red => "Red",
            BlockColor::Blue => "Blue",
            BlockColor::Yellow => "Yellow",
            BlockColor::Green => "Green",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(BlockColor::Red),
            "blue" => Some(BlockColor::Blue),
            "yellow" => Some(BlockColor::Yellow),
            "green" => Some(BlockColor::Green),
            _ => None,
        }
    }
}

/// Block lifecycle: active -> shredding -> done, never backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockState {
    #[default]
    Active,
    /// Sliding out through its exit, animation in progress
    Shredding,
    /// Gone from play
    Done,
}

/// A colored polyomino on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// Cell the shape offsets are measured from
    pub anchor: IVec2,
    /// Relative offsets, fixed at creation
    pub shape: Vec<IVec2>,
    pub color: BlockColor,
    state: BlockState,
    shred_progress: f32,
    shred_direction: Option<IVec2>,
}

impl Block {
    pub fn new(id: u32, anchor: IVec2, shape: Vec<IVec2>, color: BlockColor) -> Self {
        Self {
            id,
            anchor,
            shape,
            color,
            state: BlockState::Active,
            shred_progress: 0.0,
            shred_direction: None,
        }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BlockState::Active
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == BlockState::Done
    }

    /// Pixels shredded so far (0 while active)
    pub fn shred_progress(&self) -> f32 {
        self.shred_progress
    }

    /// Exit direction captured when shredding began (None while active)
    pub fn shred_direction(&self) -> Option<IVec2> {
        self.shred_direction
    }

    /// Cells covered at the current anchor
    pub fn cells(&self) -> Vec<IVec2> {
        geometry::occupied_cells(self, None)
    }

    /// Cells that would be covered if the anchor were `anchor`
    pub fn cells_at(&self, anchor: IVec2) -> Vec<IVec2> {
        geometry::occupied_cells(self, Some(anchor))
    }

    pub fn covers(&self, cell: IVec2) -> bool {
        self.shape.iter().any(|&offset| self.anchor + offset == cell)
    }

    /// Enter the shredding state. Only an active block can start; returns false otherwise.
    pub fn start_shred(&mut self, direction: IVec2) -> bool {
        if self.state != BlockState::Active {
            return false;
        }
        self.state = BlockState::Shredding;
        self.shred_progress = 0.0;
        self.shred_direction = Some(direction);
        true
    }

    /// Advance the shred animation by `step`.
    ///
    /// Returns true exactly once: on the tick progress first reaches `threshold`
    /// and the block becomes done.
    pub fn advance_shred(&mut self, step: f32, threshold: f32) -> bool {
        if self.state != BlockState::Shredding {
            return false;
        }
        self.shred_progress += step;
        if self.shred_progress >= threshold {
            self.state = BlockState::Done;
            return true;
        }
        false
    }
}

/// RNG state wrapper for serialization
///
/// Each board generation draws a fresh stream so reloads differ but a seed
/// always replays the same sequence of layouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream = self.stream.wrapping_add(1);
        rng
    }
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Blocks on the board, input live
    Playing,
    /// Every block is done; next stage loads when the timer runs out
    StageClear { remaining_ticks: u32 },
    /// Last stage cleared (terminal until restart)
    AllCleared,
}

/// End-of-stage / end-of-run messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinMessage {
    StageClear,
    AllCleared,
}

impl WinMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WinMessage::StageClear => "STAGE CLEAR! (R to Restart)",
            WinMessage::AllCleared => "ALL STAGES CLEAR! (R to Restart)",
        }
    }
}

/// Complete session state: board, blocks, score, stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    pub rng_state: RngState,
    pub config: EngineConfig,
    pub(crate) levels: Vec<LevelData>,
    /// Current stage (0-based; see `stage_number` for the 1-based display value)
    pub(crate) stage_index: usize,
    pub(crate) score: u64,
    pub time_ticks: u64,
    pub(crate) phase: GamePhase,
    pub(crate) board: Board,
    pub(crate) blocks: Vec<Block>,
    /// Id of the selected block; always an active block or None
    pub(crate) selected: Option<u32>,
}

impl GameState {
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// 1-based stage number
    pub fn stage_number(&self) -> usize {
        self.stage_index + 1
    }

    pub fn stage_count(&self) -> usize {
        self.levels.len()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn exits(&self) -> &[super::board::Exit] {
        self.board.exits()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected.and_then(|id| self.block(id))
    }

    /// True when the current stage has blocks and every one is done
    pub fn all_done(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(Block::is_done)
    }

    /// Derived from block state; input is frozen while this is Some
    pub fn win_message(&self) -> Option<WinMessage> {
        if !self.all_done() {
            return None;
        }
        if self.stage_index + 1 < self.levels.len() {
            Some(WinMessage::StageClear)
        } else {
            Some(WinMessage::AllCleared)
        }
    }

    /// Win message text, empty while the stage is in progress
    pub fn win_text(&self) -> &'static str {
        self.win_message().map(|m| m.as_str()).unwrap_or("")
    }

    /// Point the selection at the first active block if it no longer refers to one
    pub(crate) fn normalize_selection(&mut self) {
        let still_active = self
            .selected
            .and_then(|id| self.block(id))
            .is_some_and(Block::is_active);
        if !still_active {
            self.selected = self.blocks.iter().find(|b| b.is_active()).map(|b| b.id);
        }
    }
}
