//! Stage controller
//!
//! Owns stage loading, restart, advance, and the input commands. All block
//! mutation goes through these methods.

use std::fmt;

use glam::IVec2;

use super::board::generate_board;
use super::exit::try_start_shred;
use super::moves::is_legal;
use super::state::{Block, GamePhase, GameState, RngState};
use crate::levels::{LevelData, LevelError, builtin_levels};
use crate::settings::{ConfigError, EngineConfig};
use crate::{is_unit_direction, pixel_to_cell};

impl GameState {
    /// Start a run at stage 1. Every level is validated up front.
    pub fn new(levels: Vec<LevelData>, config: EngineConfig, seed: u64) -> Result<Self, StageError> {
        config.validate().map_err(StageError::Config)?;
        if levels.is_empty() {
            return Err(StageError::NoLevels);
        }
        for (index, level) in levels.iter().enumerate() {
            level
                .validate(&config.palette)
                .map_err(|source| StageError::Level {
                    stage: index + 1,
                    source,
                })?;
        }

        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            config,
            levels,
            stage_index: 0,
            score: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            board: Default::default(),
            blocks: Vec::new(),
            selected: None,
        };
        state.load_stage(0)?;
        Ok(state)
    }

    /// Run over the built-in levels with default config
    pub fn with_builtin_levels(seed: u64) -> Result<Self, StageError> {
        Self::new(builtin_levels(), EngineConfig::default(), seed)
    }

    /// Load stage `index` (0-based) from its level data and regenerate the board.
    ///
    /// Generation is retried with a fresh RNG stream while any block lacks an
    /// exit. If all attempts fail the current state is left untouched.
    pub fn load_stage(&mut self, index: usize) -> Result<(), StageError> {
        let level = self.levels.get(index).ok_or(StageError::InvalidStage {
            index,
            count: self.levels.len(),
        })?;
        let blocks = level.spawn_blocks();
        let attempts = self.config.max_generation_attempts;

        let mut unplaced = Vec::new();
        for attempt in 1..=attempts {
            let mut rng = self.rng_state.next_rng();
            let generation = generate_board(&blocks, &self.config.palette, &mut rng);
            if generation.is_complete() {
                log::info!(
                    "Stage {} loaded: {} blocks, {} exit cells (attempt {})",
                    index + 1,
                    blocks.len(),
                    generation.board.exits().len(),
                    attempt
                );
                self.stage_index = index;
                self.board = generation.board;
                self.blocks = blocks;
                self.selected = self.blocks.first().map(|b| b.id);
                self.phase = GamePhase::Playing;
                return Ok(());
            }
            unplaced = generation.unplaced();
            log::warn!(
                "Stage {} generation attempt {}/{} left blocks {:?} without an exit",
                index + 1,
                attempt,
                attempts,
                unplaced
            );
        }

        Err(StageError::ExitGeneration {
            stage: index + 1,
            attempts,
            unplaced,
        })
    }

    /// Reload the current stage from scratch.
    ///
    /// Score is kept, except on the first stage (a full restart) or after the
    /// whole run is cleared, which goes back to stage 1.
    pub fn restart(&mut self) -> Result<(), StageError> {
        let index = match self.phase {
            GamePhase::AllCleared => 0,
            _ => self.stage_index,
        };
        self.load_stage(index)?;
        if index == 0 {
            self.score = 0;
        }
        log::info!("Restarted stage {} (score {})", index + 1, self.score);
        Ok(())
    }

    /// Move on from a cleared stage. Returns false if the stage is not cleared.
    pub fn advance_stage(&mut self) -> Result<bool, StageError> {
        if !matches!(self.phase, GamePhase::StageClear { .. }) {
            return Ok(false);
        }
        let next = self.stage_index + 1;
        if next < self.levels.len() {
            self.load_stage(next)?;
            log::info!("Advanced to stage {}", next + 1);
        } else {
            self.phase = GamePhase::AllCleared;
        }
        Ok(true)
    }

    /// Switch to the clear phase once every block is done
    pub(crate) fn check_stage_clear(&mut self) {
        if self.phase != GamePhase::Playing || !self.all_done() {
            return;
        }
        if self.stage_index + 1 < self.levels.len() {
            log::info!("Stage {} clear (score {})", self.stage_number(), self.score);
            self.phase = GamePhase::StageClear {
                remaining_ticks: self.config.stage_clear_ticks,
            };
        } else {
            log::info!("All {} stages clear (score {})", self.levels.len(), self.score);
            self.phase = GamePhase::AllCleared;
        }
    }

    /// Input is frozen once the stage is cleared (restart still works)
    pub fn input_frozen(&self) -> bool {
        self.phase != GamePhase::Playing || self.win_message().is_some()
    }

    /// Select the active block covering `cell`. Returns false if none does.
    pub fn select_at(&mut self, cell: IVec2) -> bool {
        if self.input_frozen() {
            return false;
        }
        match self.blocks.iter().find(|b| b.is_active() && b.covers(cell)) {
            Some(block) => {
                self.selected = Some(block.id);
                true
            }
            None => false,
        }
    }

    /// Select by screen position in pixels
    pub fn select_at_pixel(&mut self, px: f32, py: f32) -> bool {
        self.select_at(pixel_to_cell(px, py, self.config.tile_size))
    }

    /// Cycle to the next active block in list order, wrapping around
    pub fn select_next(&mut self) -> bool {
        if self.input_frozen() {
            return false;
        }
        let active: Vec<u32> = self
            .blocks
            .iter()
            .filter(|b| b.is_active())
            .map(|b| b.id)
            .collect();
        if active.is_empty() {
            self.selected = None;
            return false;
        }
        let next = match self.selected.and_then(|id| active.iter().position(|&a| a == id)) {
            Some(pos) => active[(pos + 1) % active.len()],
            None => active[0],
        };
        self.selected = Some(next);
        true
    }

    /// Move the selected block one tile. Returns true if the move was legal and applied.
    pub fn move_selected(&mut self, dir: IVec2) -> bool {
        if self.input_frozen() || !is_unit_direction(dir) {
            return false;
        }
        let Some(id) = self.selected else {
            return false;
        };
        let Some(index) = self.blocks.iter().position(|b| b.id == id && b.is_active()) else {
            return false;
        };
        if !is_legal(
            &self.board,
            &self.config.palette,
            &self.blocks[index],
            dir,
            &self.blocks,
        ) {
            return false;
        }

        let block: &mut Block = &mut self.blocks[index];
        block.anchor += dir;
        log::debug!("Block {} moved to ({}, {})", block.id, block.anchor.x, block.anchor.y);
        if try_start_shred(&self.board, &self.config.palette, block, dir) {
            self.normalize_selection();
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    NoLevels,
    InvalidStage {
        index: usize,
        count: usize,
    },
    Config(ConfigError),
    Level {
        stage: usize,
        source: LevelError,
    },
    /// Every generation attempt left these blocks without an exit
    ExitGeneration {
        stage: usize,
        attempts: u32,
        unplaced: Vec<u32>,
    },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::NoLevels => write!(f, "no levels to play"),
            StageError::InvalidStage { index, count } => {
                write!(f, "stage index {index} out of range ({count} stages)")
            }
            StageError::Config(err) => err.fmt(f),
            StageError::Level { stage, source } => write!(f, "stage {stage}: {source}"),
            StageError::ExitGeneration {
                stage,
                attempts,
                unplaced,
            } => write!(
                f,
                "stage {stage}: no exit layout for blocks {unplaced:?} after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StageError::Config(err) => Some(err),
            StageError::Level { source, .. } => Some(source),
            _ => None,
        }
    }
}
