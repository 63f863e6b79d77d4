//! Fixed timestep simulation tick
//!
//! Per tick: restart, then at most one selection/move command, then shred
//! animation, then the stage-clear check. Nothing overlaps.

use glam::IVec2;

use super::stage::StageError;
use super::state::{Block, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Reload the current stage (works even when input is frozen)
    pub restart: bool,
    /// Select the block under this cell (mouse click resolved to a tile)
    pub select_cell: Option<IVec2>,
    /// Select the block under this pixel position
    pub select_pixel: Option<(f32, f32)>,
    /// Cycle the selection (tab)
    pub select_next: bool,
    /// Move the selected block one tile (arrow keys)
    pub move_dir: Option<IVec2>,
    /// Skip the stage-clear wait
    pub advance: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) -> Result<(), StageError> {
    if input.restart {
        state.restart()?;
        return Ok(());
    }

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Playing => {
            handle_input(state, input);

            let finished = advance_animations(
                &mut state.blocks,
                state.config.shred_step,
                state.config.tile_size,
            );
            state.score += u64::from(finished);

            state.normalize_selection();
            state.check_stage_clear();
        }

        GamePhase::StageClear { remaining_ticks } => {
            if input.advance {
                state.advance_stage()?;
            } else if state.config.stage_clear_ticks > 0 {
                if remaining_ticks <= 1 {
                    state.advance_stage()?;
                } else {
                    state.phase = GamePhase::StageClear {
                        remaining_ticks: remaining_ticks - 1,
                    };
                }
            }
        }

        GamePhase::AllCleared => {}
    }

    Ok(())
}

/// Resolve this tick's selection and movement. A click that lands on a block
/// consumes the tick's input.
fn handle_input(state: &mut GameState, input: &TickInput) {
    state.normalize_selection();
    if state.selected.is_none() {
        return;
    }

    let clicked = match (input.select_cell, input.select_pixel) {
        (Some(cell), _) => state.select_at(cell),
        (None, Some((px, py))) => state.select_at_pixel(px, py),
        (None, None) => false,
    };
    if clicked {
        return;
    }

    if input.select_next {
        state.select_next();
    }

    if let Some(dir) = input.move_dir {
        state.move_selected(dir);
    }
}

/// Step every shredding block's animation.
///
/// Returns how many blocks finished this tick; each block finishes once.
pub fn advance_animations(blocks: &mut [Block], step: f32, threshold: f32) -> u32 {
    let mut finished = 0;
    for block in blocks.iter_mut() {
        if block.advance_shred(step, threshold) {
            log::debug!("Block {} done", block.id);
            finished += 1;
        }
    }
    finished
}
